//! Utility functions for domain validation and parsing.
//!
//! These guard the network transports: a candidate that fails
//! `is_transport_safe` is never written to a socket.

/// Whether a domain is safe to send to a DNS resolver or WHOIS server.
///
/// Requires ASCII letters, digits and hyphens in dot-separated labels of
/// 1-63 characters, no leading/trailing hyphen per label, at most 253
/// characters overall, and at least two labels.
pub fn is_transport_safe(domain: &str) -> bool {
    if domain.is_empty() || domain.len() > 253 {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    labels.iter().all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

/// Extract the last label of a domain, lowercased.
///
/// `acme.co.uk` yields `uk`; use [`public_suffix`] for the full suffix.
pub fn extract_tld(domain: &str) -> Option<String> {
    let tld = domain.rsplit('.').next()?;
    if tld.is_empty() || tld == domain {
        None
    } else {
        Some(tld.to_lowercase())
    }
}

/// Everything after the first label, lowercased (`acme.co.uk` → `co.uk`).
pub fn public_suffix(domain: &str) -> Option<String> {
    let (_, rest) = domain.split_once('.')?;
    if rest.is_empty() {
        None
    } else {
        Some(rest.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_transport_safe() {
        assert!(is_transport_safe("example.com"));
        assert!(is_transport_safe("test-domain.co.uk"));
        assert!(is_transport_safe("abc123.ai"));

        assert!(!is_transport_safe("example"));
        assert!(!is_transport_safe(".com"));
        assert!(!is_transport_safe("example."));
        assert!(!is_transport_safe("-example.com"));
        assert!(!is_transport_safe("example-.com"));
        assert!(!is_transport_safe("héllo.com"));
        assert!(!is_transport_safe("two words.com"));
        assert!(!is_transport_safe("inject\r\nhelp.com"));
        assert!(!is_transport_safe(&format!("{}.com", "a".repeat(64))));
    }

    #[test]
    fn test_extract_tld() {
        assert_eq!(extract_tld("example.com"), Some("com".to_string()));
        assert_eq!(extract_tld("test.CO.UK"), Some("uk".to_string()));
        assert_eq!(extract_tld("example"), None);
        assert_eq!(extract_tld("example."), None);
    }

    #[test]
    fn test_public_suffix() {
        assert_eq!(public_suffix("acme.co.uk"), Some("co.uk".to_string()));
        assert_eq!(public_suffix("acme.ai"), Some("ai".to_string()));
        assert_eq!(public_suffix("acme"), None);
    }
}
