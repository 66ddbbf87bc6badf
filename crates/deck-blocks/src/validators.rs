//! Syntax predicates for keys, names, addresses and hostnames.

use regex::Regex;
use std::sync::LazyLock;

/// Longest accepted environment variable name.
pub const MAX_KEY_LEN: usize = 255;
/// Longest accepted environment variable value, in characters.
pub const MAX_VALUE_LEN: usize = 10_000;
/// Longest accepted group name, in characters.
pub const MAX_GROUP_NAME_LEN: usize = 50;
/// Longest accepted hostname.
pub const MAX_HOSTNAME_LEN: usize = 253;

static ENV_KEY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Invalid env key regex"));

static IPV6_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([0-9a-fA-F]{1,4}:){7}[0-9a-fA-F]{1,4}$|^(([0-9a-fA-F]{1,4}:)*[0-9a-fA-F]{1,4})?::(([0-9a-fA-F]{1,4}:)*[0-9a-fA-F]{1,4})?$",
    )
    .expect("Invalid IPv6 regex")
});

static HOSTNAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([a-zA-Z0-9]([a-zA-Z0-9\-]{0,61}[a-zA-Z0-9])?\.)*[a-zA-Z0-9]([a-zA-Z0-9\-]{0,61}[a-zA-Z0-9])?$",
    )
    .expect("Invalid hostname regex")
});

/// `[A-Za-z_][A-Za-z0-9_]*`, 1 to 255 characters.
pub fn is_valid_env_key(key: &str) -> bool {
    !key.is_empty() && key.len() <= MAX_KEY_LEN && ENV_KEY_REGEX.is_match(key)
}

pub fn is_valid_env_value(value: &str) -> bool {
    value.chars().count() <= MAX_VALUE_LEN
}

/// 1 to 50 characters, none of `/`, `\` or `:`.
pub fn is_valid_group_name(name: &str) -> bool {
    let len = name.chars().count();
    (1..=MAX_GROUP_NAME_LEN).contains(&len) && !name.contains(['/', '\\', ':'])
}

/// Dotted quad with no leading zeros (`0` itself is fine).
pub fn is_valid_ipv4(ip: &str) -> bool {
    let parts: Vec<&str> = ip.split('.').collect();
    parts.len() == 4
        && parts
            .iter()
            .all(|part| part.parse::<u8>().is_ok_and(|n| n.to_string() == *part))
}

/// Full eight-group form or `::` compressed form. Embedded IPv4 and zone
/// suffixes are not accepted.
pub fn is_valid_ipv6(ip: &str) -> bool {
    IPV6_REGEX.is_match(ip)
}

pub fn is_valid_ip(ip: &str) -> bool {
    is_valid_ipv4(ip) || is_valid_ipv6(ip)
}

/// RFC 1123 hostname, at most 253 characters.
pub fn is_valid_hostname(hostname: &str) -> bool {
    !hostname.is_empty() && hostname.len() <= MAX_HOSTNAME_LEN && HOSTNAME_REGEX.is_match(hostname)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("PATH", true)]
    #[case("_private", true)]
    #[case("A1_B2", true)]
    #[case("1ABC", false)]
    #[case("MY-VAR", false)]
    #[case("", false)]
    #[case("HAS SPACE", false)]
    fn test_env_key(#[case] key: &str, #[case] expected: bool) {
        assert_eq!(is_valid_env_key(key), expected);
    }

    #[test]
    fn test_env_key_length_limit() {
        assert!(is_valid_env_key(&"K".repeat(255)));
        assert!(!is_valid_env_key(&"K".repeat(256)));
    }

    #[test]
    fn test_env_value_length_limit() {
        assert!(is_valid_env_value(&"é".repeat(10_000)));
        assert!(!is_valid_env_value(&"v".repeat(10_001)));
    }

    #[rstest]
    #[case("work", true)]
    #[case("", false)]
    #[case("a/b", false)]
    #[case("a\\b", false)]
    #[case("a:b", false)]
    fn test_group_name(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_valid_group_name(name), expected);
    }

    #[test]
    fn test_group_name_length_limit() {
        assert!(is_valid_group_name(&"n".repeat(50)));
        assert!(!is_valid_group_name(&"n".repeat(51)));
    }

    #[rstest]
    #[case("127.0.0.1", true)]
    #[case("0.0.0.0", true)]
    #[case("255.255.255.255", true)]
    #[case("256.1.1.1", false)]
    #[case("01.2.3.4", false)]
    #[case("+1.2.3.4", false)]
    #[case("1.2.3", false)]
    #[case("1.2.3.4.5", false)]
    #[case("1..3.4", false)]
    fn test_ipv4(#[case] ip: &str, #[case] expected: bool) {
        assert_eq!(is_valid_ipv4(ip), expected);
    }

    #[rstest]
    #[case("::1", true)]
    #[case("::", true)]
    #[case("fe80::1", true)]
    #[case("2001:0db8:85a3:0000:0000:8a2e:0370:7334", true)]
    #[case("2001:db8::8a2e:370:7334", true)]
    #[case("2001:db8:::1", false)]
    #[case("12345::1", false)]
    #[case("::ffff:1.2.3.4", false)]
    fn test_ipv6(#[case] ip: &str, #[case] expected: bool) {
        assert_eq!(is_valid_ipv6(ip), expected);
    }

    #[test]
    fn test_ip_accepts_either_family() {
        assert!(is_valid_ip("10.0.0.1"));
        assert!(is_valid_ip("::1"));
        assert!(!is_valid_ip("localhost"));
    }

    #[rstest]
    #[case("localhost", true)]
    #[case("api.example.com", true)]
    #[case("my-host.local", true)]
    #[case("-bad.com", false)]
    #[case("bad-.com", false)]
    #[case("under_score.com", false)]
    #[case("", false)]
    #[case("a..b", false)]
    fn test_hostname(#[case] hostname: &str, #[case] expected: bool) {
        assert_eq!(is_valid_hostname(hostname), expected);
    }

    #[test]
    fn test_hostname_length_limit() {
        let label = "a".repeat(63);
        let long = [label.as_str(); 4].join(".");
        assert_eq!(long.len(), 255);
        assert!(!is_valid_hostname(&long));
    }
}
