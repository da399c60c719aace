//! Built-in WHOIS server mappings and per-server query syntax.
//!
//! Suffixes missing from this table are resolved at probe time through an
//! IANA referral (see [`crate::protocols::whois`]). The table is immutable;
//! nothing discovered at runtime is written back.

use crate::utils::{extract_tld, public_suffix};
use std::collections::HashMap;

/// Root server queried for referrals on unknown suffixes.
pub const IANA_WHOIS_SERVER: &str = "whois.iana.org";

const VERISIGN_WHOIS_SERVER: &str = "whois.verisign-grs.com";

lazy_static::lazy_static! {
    static ref WHOIS_SERVERS: HashMap<&'static str, &'static str> = HashMap::from([
        // Generic TLDs
        ("com", VERISIGN_WHOIS_SERVER),
        ("net", VERISIGN_WHOIS_SERVER),
        ("org", "whois.pir.org"),
        ("info", "whois.nic.info"),
        ("biz", "whois.nic.biz"),
        // Google TLDs
        ("app", "whois.nic.google"),
        ("dev", "whois.nic.google"),
        ("page", "whois.nic.google"),
        // Popular new gTLDs
        ("xyz", "whois.nic.xyz"),
        ("tech", "whois.nic.tech"),
        ("online", "whois.nic.online"),
        ("site", "whois.nic.site"),
        ("store", "whois.nic.store"),
        ("shop", "whois.nic.shop"),
        ("cloud", "whois.nic.cloud"),
        ("blog", "whois.nic.blog"),
        // ccTLDs commonly used as generic suffixes
        ("ai", "whois.nic.ai"),
        ("co", "whois.nic.co"),
        ("io", "whois.nic.io"),
        ("me", "whois.nic.me"),
        ("tv", "whois.nic.tv"),
        ("cc", "ccwhois.verisign-grs.com"),
        ("gg", "whois.gg"),
        // Country code TLDs
        ("us", "whois.nic.us"),
        ("uk", "whois.nic.uk"),
        ("co.uk", "whois.nic.uk"),
        ("de", "whois.denic.de"),
        ("fr", "whois.nic.fr"),
        ("nl", "whois.domain-registry.nl"),
        ("ca", "whois.cira.ca"),
        ("au", "whois.auda.org.au"),
        ("eu", "whois.eu"),
    ]);
}

/// Look up the WHOIS server for a domain from the built-in table.
///
/// Tries the full suffix first (`co.uk`), then the last label (`uk`).
pub fn builtin_whois_server(domain: &str) -> Option<&'static str> {
    if let Some(suffix) = public_suffix(domain) {
        if let Some(server) = WHOIS_SERVERS.get(suffix.as_str()) {
            return Some(*server);
        }
    }
    let tld = extract_tld(domain)?;
    WHOIS_SERVERS.get(tld.as_str()).copied()
}

/// Build the query line for a server, without the trailing CRLF.
///
/// Verisign matches host and registrar objects too unless the query is
/// restricted to domains; DENIC needs its own output-type flag.
pub fn whois_query(server: &str, domain: &str) -> String {
    match server {
        VERISIGN_WHOIS_SERVER | "ccwhois.verisign-grs.com" => format!("domain {}", domain),
        "whois.denic.de" => format!("-T dn,ace {}", domain),
        _ => domain.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_suffixes_are_builtin() {
        for domain in ["acme.com", "acme.co", "acme.ai", "acme.net"] {
            assert!(
                builtin_whois_server(domain).is_some(),
                "no built-in WHOIS server for {}",
                domain
            );
        }
    }

    #[test]
    fn test_multi_level_suffix_lookup() {
        assert_eq!(builtin_whois_server("acme.co.uk"), Some("whois.nic.uk"));
        assert_eq!(builtin_whois_server("ACME.COM"), Some("whois.verisign-grs.com"));
        assert_eq!(builtin_whois_server("acme.museum"), None);
        assert_eq!(builtin_whois_server("acme"), None);
    }

    #[test]
    fn test_whois_query_syntax() {
        assert_eq!(whois_query("whois.verisign-grs.com", "acme.com"), "domain acme.com");
        assert_eq!(whois_query("whois.denic.de", "acme.de"), "-T dn,ace acme.de");
        assert_eq!(whois_query("whois.nic.ai", "acme.ai"), "acme.ai");
    }
}
