//! Terminal display for domain-scout.
//!
//! Results go to stdout as a table; the spinner and the live progress line
//! go to stderr so piped output stays clean. Uses only the `console` crate.

use console::{pad_str, style, Alignment, StyledObject, Term};
use domain_scout_lib::{Availability, Outcome, Progress, ProgressCallback, Summary};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ── Spinner ──────────────────────────────────────────────────────────────────

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// An async braille-dot spinner on stderr.
pub struct Spinner {
    running: Arc<AtomicBool>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl Spinner {
    /// Start a spinner with the given message. Returns `None` when stderr is
    /// not a terminal.
    pub fn start(message: String) -> Option<Self> {
        if !Term::stderr().is_term() {
            return None;
        }

        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        let handle = tokio::spawn(async move {
            let term = Term::stderr();
            let mut idx = 0usize;
            while running_clone.load(Ordering::Relaxed) {
                let frame = SPINNER_FRAMES[idx % SPINNER_FRAMES.len()];
                let _ = term.clear_line();
                let _ = term.write_str(&format!("{} {}", style(frame).cyan(), message));
                idx += 1;
                tokio::time::sleep(Duration::from_millis(80)).await;
            }
            let _ = term.clear_line();
        });

        Some(Self {
            running,
            handle: Some(handle),
        })
    }

    /// Stop the spinner and clear the line.
    pub async fn stop(mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(h) = self.handle.take() {
            let _ = h.await;
        }
    }
}

// ── Progress line ────────────────────────────────────────────────────────────

/// A `[done/total] domain` line on stderr, redrawn after every probe.
///
/// Returns `None` when stderr is not a terminal.
pub fn progress_line() -> Option<ProgressCallback> {
    let term = Term::stderr();
    if !term.is_term() {
        return None;
    }

    Some(Arc::new(move |p: Progress| {
        let _ = term.clear_line();
        if p.completed < p.total {
            let _ = term.write_str(&format!(
                "{} {} {}",
                style(format!("[{}/{}]", p.completed, p.total)).dim(),
                status_label(p.availability),
                style(&p.domain).dim(),
            ));
        }
    }))
}

// ── Results table ────────────────────────────────────────────────────────────

/// Print outcomes as a Domain / Status table in the order given.
///
/// With `show_info`, a third column carries registrar and expiry for taken
/// names and a short reason for unknown ones.
pub fn print_results(outcomes: &[Outcome], show_info: bool) {
    let domain_width = outcomes
        .iter()
        .map(|o| o.domain().len())
        .max()
        .unwrap_or(0)
        .max("Domain".len());
    let status_width = "Available".len();

    let mut header = format!(
        "{}  {}",
        pad_str("Domain", domain_width, Alignment::Left, None),
        pad_str("Status", status_width, Alignment::Left, None),
    );
    let mut rule = format!("{}  {}", "-".repeat(domain_width), "-".repeat(status_width));
    if show_info {
        header.push_str("  Details");
        rule.push_str("  -------");
    }
    println!("{}", style(header.trim_end()).bold());
    println!("{}", style(rule).dim());

    for outcome in outcomes {
        let padded_domain = pad_str(outcome.domain(), domain_width, Alignment::Left, None);
        let label = pad_str(
            &status_text(outcome.availability()),
            status_width,
            Alignment::Left,
            None,
        )
        .to_string();
        let colored = color_for(outcome.availability(), label);

        if show_info {
            println!(
                "{}  {}  {}",
                padded_domain,
                colored,
                style(format_details(outcome)).dim()
            );
        } else {
            println!("{}  {}", padded_domain, colored);
        }
    }
}

// ── Summary ──────────────────────────────────────────────────────────────────

/// Print the final summary bar with colored counts.
pub fn print_summary(summary: &Summary, duration: Duration) {
    println!();
    println!(
        "{} domain{} in {:.1}s  {}  {}  {}  {}  {}  {}",
        style(summary.total).bold(),
        if summary.total == 1 { "" } else { "s" },
        duration.as_secs_f64(),
        style("|").dim(),
        style(format!("{} available", summary.available)).green(),
        style("|").dim(),
        style(format!("{} taken", summary.taken)).red(),
        style("|").dim(),
        style(format!("{} unknown", summary.unknown)).yellow(),
    );
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn status_text(availability: Availability) -> String {
    match availability {
        Availability::Available => "Available",
        Availability::Taken => "Taken",
        Availability::Unknown => "Unknown",
    }
    .to_string()
}

fn color_for<D>(availability: Availability, value: D) -> StyledObject<D> {
    match availability {
        Availability::Available => style(value).green().bold(),
        Availability::Taken => style(value).red(),
        Availability::Unknown => style(value).yellow(),
    }
}

fn status_label(availability: Availability) -> StyledObject<String> {
    color_for(availability, status_text(availability))
}

/// Registrar and expiry for a taken name, a short reason for an unknown one.
pub fn format_details(outcome: &Outcome) -> String {
    match outcome.availability() {
        Availability::Available => String::new(),
        Availability::Taken => {
            let mut parts = Vec::new();
            if let Some(registrar) = outcome.registrar() {
                parts.push(format!("Registrar: {}", registrar));
            }
            if let Some(expires) = outcome.expiration() {
                parts.push(format!("Expires: {}", expires));
            }
            if parts.is_empty() {
                "No info available".to_string()
            } else {
                parts.join(", ")
            }
        }
        Availability::Unknown => brief_error(outcome).to_string(),
    }
}

/// Bucket an unknown outcome's error message into a short reason.
fn brief_error(outcome: &Outcome) -> &'static str {
    match outcome.error() {
        Some(msg) => {
            let m = msg.to_lowercase();
            if m.contains("rate limit") {
                "(rate limited)"
            } else if m.contains("timeout") || m.contains("timed out") {
                "(timeout)"
            } else if m.contains("panicked") {
                "(internal error)"
            } else if m.contains("unparseable") || m.contains("parse") {
                "(unreadable WHOIS response)"
            } else if m.contains("whois server") || m.contains("referral") {
                "(no WHOIS server)"
            } else if m.contains("network") || m.contains("connect") || m.contains("dns") {
                "(network error)"
            } else {
                "(error)"
            }
        }
        None => "(unknown status)",
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use domain_scout_lib::expand_candidates;

    fn outcomes() -> Vec<Outcome> {
        let batch = expand_candidates(
            &["acme".to_string()],
            &[".com".to_string(), ".ai".to_string(), ".co".to_string()],
        )
        .unwrap();
        let mut c = batch.iter().cloned();
        vec![
            Outcome::taken(
                c.next().unwrap(),
                Some("NameCorp".to_string()),
                Some("2030-01-01".to_string()),
            ),
            Outcome::available(c.next().unwrap()),
            Outcome::unknown(c.next().unwrap(), "Timeout after 10s during: WHOIS read"),
        ]
    }

    #[test]
    fn test_format_details_taken() {
        let all = outcomes();
        assert_eq!(
            format_details(&all[0]),
            "Registrar: NameCorp, Expires: 2030-01-01"
        );
        assert_eq!(format_details(&all[1]), "");
        assert_eq!(format_details(&all[2]), "(timeout)");
    }

    #[test]
    fn test_brief_error_buckets() {
        let batch = expand_candidates(&["x".to_string()], &[".com".to_string()]).unwrap();
        let c = batch.candidates()[0].clone();

        let reason = |msg: &str| brief_error(&Outcome::unknown(c.clone(), msg));
        assert_eq!(reason("Rate limited by whois.nic.ai: slow down"), "(rate limited)");
        assert_eq!(reason("probe panicked: boom"), "(internal error)");
        assert_eq!(
            reason("Unparseable WHOIS response for 'x.com': garbled"),
            "(unreadable WHOIS response)"
        );
        assert_eq!(reason("Network error for 'x.com': connection refused"), "(network error)");
        assert_eq!(reason("something else"), "(error)");
    }

    #[test]
    fn test_status_text() {
        assert_eq!(status_text(Availability::Available), "Available");
        assert_eq!(status_text(Availability::Taken), "Taken");
        assert_eq!(status_text(Availability::Unknown), "Unknown");
    }
}
