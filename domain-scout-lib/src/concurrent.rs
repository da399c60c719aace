//! Bounded concurrent dispatch of probes.
//!
//! Every candidate runs in its own spawned task, at most `ceiling(n)` at a
//! time. The task boundary is also the fault boundary: a probe that panics,
//! hangs past its deadline, or gets cancelled still yields an `Unknown`
//! outcome for its candidate, so the batch always comes back complete.

use crate::checker::Probe;
use crate::types::{Candidate, Outcome, ProbeBatch, Progress, ProgressCallback, MAX_CONCURRENCY};
use futures::stream::{self, Stream, StreamExt};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinError;
use tracing::{debug, warn};

/// Runs a probe over a batch with a hard concurrency ceiling.
pub struct Dispatcher<P: Probe> {
    probe: Arc<P>,
    concurrency: usize,
    probe_timeout: Duration,
}

impl<P: Probe> Dispatcher<P> {
    /// `concurrency` is clamped to 1-100.
    pub fn new(probe: Arc<P>, concurrency: usize, probe_timeout: Duration) -> Self {
        Self {
            probe,
            concurrency: concurrency.clamp(1, MAX_CONCURRENCY),
            probe_timeout,
        }
    }

    /// Number of probes allowed in flight for a batch of `n`.
    pub fn ceiling(&self, n: usize) -> usize {
        self.concurrency.min(n).max(1)
    }

    fn spawn_probe(&self, candidate: Candidate) -> impl Future<Output = Outcome> + Send + 'static {
        let probe = Arc::clone(&self.probe);
        let deadline = self.probe_timeout;

        async move {
            let task_candidate = candidate.clone();
            let handle = tokio::spawn(async move {
                let result = tokio::time::timeout(deadline, probe.probe(&task_candidate)).await;
                match result {
                    Ok(outcome) => outcome,
                    Err(_) => Outcome::unknown(
                        task_candidate,
                        format!("probe timed out after {:?}", deadline),
                    ),
                }
            });

            match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    let reason = describe_join_error(e);
                    warn!(domain = %candidate, reason = %reason, "Probe task failed");
                    Outcome::unknown(candidate, reason)
                }
            }
        }
    }

    /// Stream outcomes as probes finish, fastest first.
    ///
    /// Yields exactly one outcome per candidate in the batch.
    pub fn stream<'a>(&'a self, batch: &'a ProbeBatch) -> impl Stream<Item = Outcome> + 'a {
        let width = self.ceiling(batch.len());
        debug!(total = batch.len(), concurrency = width, "Dispatching probes");

        stream::iter(batch.iter().cloned())
            .map(move |candidate| self.spawn_probe(candidate))
            .buffer_unordered(width)
    }

    /// Probe the whole batch and collect the outcomes in completion order.
    ///
    /// `progress` is called after each completion with the running count.
    pub async fn run(&self, batch: &ProbeBatch, progress: Option<ProgressCallback>) -> Vec<Outcome> {
        let total = batch.len();
        let mut outcomes = Vec::with_capacity(total);

        let stream = self.stream(batch);
        futures::pin_mut!(stream);

        while let Some(outcome) = stream.next().await {
            let completed = outcomes.len() + 1;
            debug!(
                domain = %outcome.domain(),
                availability = %outcome.availability(),
                completed,
                total,
                "Probe finished"
            );

            if let Some(progress) = &progress {
                progress(Progress {
                    completed,
                    total,
                    domain: outcome.domain().to_string(),
                    availability: outcome.availability(),
                });
            }
            outcomes.push(outcome);
        }

        outcomes
    }
}

fn describe_join_error(err: JoinError) -> String {
    if err.is_cancelled() {
        return "probe task was cancelled".to_string();
    }

    let payload = err.into_panic();
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    format!("probe panicked: {}", message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expand::expand_candidates;
    use crate::types::Availability;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Sleeps briefly and reports every candidate as available, tracking how
    /// many calls overlap.
    #[derive(Default)]
    struct CountingProbe {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl Probe for CountingProbe {
        async fn probe(&self, candidate: &Candidate) -> Outcome {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(15)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Outcome::available(candidate.clone())
        }
    }

    /// Misbehaves for chosen candidates.
    struct FaultyProbe {
        panic_on: &'static str,
        hang_on: &'static str,
    }

    #[async_trait]
    impl Probe for FaultyProbe {
        async fn probe(&self, candidate: &Candidate) -> Outcome {
            if candidate.as_str() == self.panic_on {
                panic!("boom on {}", candidate);
            }
            if candidate.as_str() == self.hang_on {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            Outcome::taken(candidate.clone(), Some("NameCorp".to_string()), None)
        }
    }

    fn batch(names: &[&str], suffixes: &[&str]) -> ProbeBatch {
        let names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        let suffixes: Vec<String> = suffixes.iter().map(|s| s.to_string()).collect();
        expand_candidates(&names, &suffixes).unwrap()
    }

    fn many_names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("name{}", i)).collect()
    }

    #[test]
    fn test_ceiling() {
        let dispatcher = Dispatcher::new(Arc::new(CountingProbe::default()), 20, Duration::from_secs(1));
        assert_eq!(dispatcher.ceiling(60), 20);
        assert_eq!(dispatcher.ceiling(7), 7);
        assert_eq!(dispatcher.ceiling(0), 1);

        let clamped = Dispatcher::new(Arc::new(CountingProbe::default()), 0, Duration::from_secs(1));
        assert_eq!(clamped.ceiling(10), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_in_flight_fills_but_never_exceeds_ceiling() {
        let probe = Arc::new(CountingProbe::default());
        let dispatcher = Dispatcher::new(Arc::clone(&probe), 20, Duration::from_secs(5));
        let batch = expand_candidates(&many_names(30), &[".com".to_string(), ".ai".to_string()])
            .unwrap();

        let outcomes = dispatcher.run(&batch, None).await;

        assert_eq!(outcomes.len(), 60);
        // Every slot fills before the first 15ms sleep ends.
        let peak = probe.peak.load(Ordering::SeqCst);
        assert_eq!(peak, 20, "peak in-flight was {}", peak);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_small_batch_ceiling_is_batch_size() {
        let probe = Arc::new(CountingProbe::default());
        let dispatcher = Dispatcher::new(Arc::clone(&probe), 20, Duration::from_secs(5));

        let outcomes = dispatcher.run(&batch(&["acme", "beta"], &[".com", ".ai"]), None).await;

        assert_eq!(outcomes.len(), 4);
        assert!(probe.peak.load(Ordering::SeqCst) <= 4);
    }

    #[tokio::test]
    async fn test_panic_and_hang_are_isolated() {
        let probe = Arc::new(FaultyProbe {
            panic_on: "beta.com",
            hang_on: "acme.ai",
        });
        let dispatcher = Dispatcher::new(probe, 20, Duration::from_millis(200));
        let batch = batch(&["acme", "beta", "gamma"], &[".com", ".ai"]);

        let outcomes = dispatcher.run(&batch, None).await;
        assert_eq!(outcomes.len(), 6);

        for outcome in &outcomes {
            match outcome.domain() {
                "beta.com" => {
                    assert_eq!(outcome.availability(), Availability::Unknown);
                    assert!(outcome.error().unwrap().contains("panicked"));
                    assert!(outcome.error().unwrap().contains("boom on beta.com"));
                }
                "acme.ai" => {
                    assert_eq!(outcome.availability(), Availability::Unknown);
                    assert!(outcome.error().unwrap().contains("timed out"));
                }
                _ => {
                    assert_eq!(outcome.availability(), Availability::Taken);
                    assert_eq!(outcome.registrar(), Some("NameCorp"));
                }
            }
        }
    }

    #[tokio::test]
    async fn test_progress_reports_every_completion() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let progress: ProgressCallback = Arc::new(move |p: Progress| {
            sink.lock().unwrap().push((p.completed, p.total));
        });

        let dispatcher = Dispatcher::new(Arc::new(CountingProbe::default()), 3, Duration::from_secs(5));
        let batch = batch(&["acme", "beta", "gamma"], &[".com", ".co"]);
        let outcomes = dispatcher.run(&batch, Some(progress)).await;

        let seen = seen.lock().unwrap();
        assert_eq!(outcomes.len(), 6);
        assert_eq!(*seen, (1..=6).map(|i| (i, 6)).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_stream_yields_each_candidate_once() {
        let dispatcher = Dispatcher::new(Arc::new(CountingProbe::default()), 2, Duration::from_secs(5));
        let batch = batch(&["acme", "beta"], &[".com", ".ai"]);

        let mut domains: Vec<String> = dispatcher
            .stream(&batch)
            .map(|o| o.domain().to_string())
            .collect()
            .await;
        domains.sort();

        assert_eq!(domains, vec!["acme.ai", "acme.com", "beta.ai", "beta.com"]);
    }
}
