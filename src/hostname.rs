//! Device identifier normalization.
//!
//! Inventory keys and host_vars file names are derived from the short form
//! of each device identifier. IPv4 literals are kept whole; anything else is
//! cut at the first dot.

use once_cell::sync::Lazy;
use regex::Regex;

static IPV4_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b((25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])\.){3}(25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])\b",
    )
    .expect("Valid regex pattern")
});

/// Returns true when `identifier` contains an IPv4 dotted quad.
pub fn is_ipv4(identifier: &str) -> bool {
    IPV4_PATTERN.is_match(identifier)
}

/// Short host name used for file naming and inventory keys.
///
/// ```
/// use ezconfig::hostname::shorten;
///
/// assert_eq!(shorten("10.1.1.1"), "10.1.1.1");
/// assert_eq!(shorten("router1.example.com"), "router1");
/// assert_eq!(shorten("switch1"), "switch1");
/// ```
pub fn shorten(identifier: &str) -> String {
    if is_ipv4(identifier) {
        return identifier.to_string();
    }

    match identifier.split_once('.') {
        Some((host, _)) => host.to_string(),
        None => identifier.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ipv4_is_identity() {
        for ip in ["10.1.1.1", "0.0.0.0", "255.255.255.255", "192.168.100.254"] {
            assert_eq!(shorten(ip), ip);
        }
    }

    #[test]
    fn test_fqdn_is_cut_at_first_dot() {
        assert_eq!(shorten("router1.example.com"), "router1");
        assert_eq!(shorten("core1.example.net"), "core1");
        assert_eq!(shorten("a.b"), "a");
    }

    #[test]
    fn test_plain_name_is_identity() {
        assert_eq!(shorten("switch1"), "switch1");
        assert_eq!(shorten(""), "");
    }

    #[test]
    fn test_out_of_range_octets_are_not_ipv4() {
        assert!(!is_ipv4("256.1.1.1"));
        assert_eq!(shorten("300.1.1.1"), "300");
    }

    #[test]
    fn test_embedded_ipv4_is_kept_whole() {
        // The pattern searches rather than anchors, so a host that embeds a
        // dotted quad is never truncated.
        assert_eq!(shorten("mgmt-10.0.0.1"), "mgmt-10.0.0.1");
    }

    #[test]
    fn test_leading_dot() {
        assert_eq!(shorten(".example.com"), "");
    }
}
