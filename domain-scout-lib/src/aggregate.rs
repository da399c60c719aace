//! Result assembly: checks that a run accounted for every candidate and
//! puts the outcomes into a stable order.

use crate::error::ScoutError;
use crate::types::{Availability, Candidate, Outcome, ProbeBatch};
use serde::Serialize;
use std::collections::HashSet;

/// Counts per availability state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub available: usize,
    pub taken: usize,
    pub unknown: usize,
}

/// Match outcomes against the batch and sort them by (base name, suffix).
///
/// The returned set has exactly one outcome per candidate. Completion order
/// never leaks into the result.
///
/// # Errors
///
/// `ScoutError::IncompleteResult` if the counts differ, or if an outcome is
/// duplicated or names a candidate that is not in the batch.
pub fn aggregate(batch: &ProbeBatch, outcomes: Vec<Outcome>) -> Result<Vec<Outcome>, ScoutError> {
    let expected = batch.len();
    let received = outcomes.len();

    if received != expected {
        return Err(ScoutError::incomplete(
            expected,
            received,
            "outcome count does not match candidate count",
        ));
    }

    let mut pending: HashSet<&Candidate> = batch.iter().collect();
    for outcome in &outcomes {
        if !pending.remove(outcome.candidate()) {
            return Err(ScoutError::incomplete(
                expected,
                received,
                format!("unexpected or duplicate outcome for {}", outcome.domain()),
            ));
        }
    }

    let mut ordered = outcomes;
    ordered.sort_by(|a, b| {
        let (a, b) = (a.candidate(), b.candidate());
        (a.base(), a.suffix()).cmp(&(b.base(), b.suffix()))
    });
    Ok(ordered)
}

pub fn summarize(outcomes: &[Outcome]) -> Summary {
    outcomes
        .iter()
        .fold(Summary::default(), |mut summary, outcome| {
            summary.total += 1;
            match outcome.availability() {
                Availability::Available => summary.available += 1,
                Availability::Taken => summary.taken += 1,
                Availability::Unknown => summary.unknown += 1,
            }
            summary
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expand::expand_candidates;

    fn batch() -> ProbeBatch {
        expand_candidates(
            &["zeta".to_string(), "acme".to_string()],
            &[".com".to_string(), ".ai".to_string()],
        )
        .unwrap()
    }

    fn completion_order(batch: &ProbeBatch) -> Vec<Outcome> {
        let mut outcomes: Vec<Outcome> = batch
            .iter()
            .enumerate()
            .map(|(i, c)| match i % 3 {
                0 => Outcome::available(c.clone()),
                1 => Outcome::taken(c.clone(), None, None),
                _ => Outcome::unknown(c.clone(), "timeout"),
            })
            .collect();
        outcomes.reverse();
        outcomes
    }

    fn domains(outcomes: &[Outcome]) -> Vec<&str> {
        outcomes.iter().map(|o| o.domain()).collect()
    }

    #[test]
    fn test_order_is_base_then_suffix() {
        let batch = batch();
        let ordered = aggregate(&batch, completion_order(&batch)).unwrap();
        assert_eq!(
            domains(&ordered),
            vec!["acme.ai", "acme.com", "zeta.ai", "zeta.com"]
        );
    }

    #[test]
    fn test_order_ignores_completion_order() {
        let batch = batch();
        let forward = aggregate(&batch, completion_order(&batch)).unwrap();

        let mut shuffled = completion_order(&batch);
        shuffled.rotate_left(3);
        let rotated = aggregate(&batch, shuffled).unwrap();

        assert_eq!(domains(&forward), domains(&rotated));
    }

    #[test]
    fn test_missing_outcome_is_incomplete() {
        let batch = batch();
        let mut outcomes = completion_order(&batch);
        outcomes.pop();

        match aggregate(&batch, outcomes) {
            Err(ScoutError::IncompleteResult {
                expected, received, ..
            }) => {
                assert_eq!(expected, 4);
                assert_eq!(received, 3);
            }
            other => panic!("expected IncompleteResult, got {:?}", other.map(|o| o.len())),
        }
    }

    #[test]
    fn test_duplicate_outcome_is_incomplete() {
        let batch = batch();
        let mut outcomes = completion_order(&batch);
        outcomes[0] = outcomes[1].clone();

        let err = aggregate(&batch, outcomes).unwrap_err();
        assert!(matches!(err, ScoutError::IncompleteResult { .. }));
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_foreign_outcome_is_incomplete() {
        let batch = batch();
        let mut outcomes = completion_order(&batch);
        outcomes[2] = Outcome::available(Candidate::new("other", ".net"));

        let err = aggregate(&batch, outcomes).unwrap_err();
        assert!(err.to_string().contains("other.net"));
    }

    #[test]
    fn test_summarize() {
        let batch = batch();
        let summary = summarize(&completion_order(&batch));
        assert_eq!(
            summary,
            Summary {
                total: 4,
                available: 2,
                taken: 1,
                unknown: 1,
            }
        );
        assert_eq!(summarize(&[]), Summary::default());
    }
}
