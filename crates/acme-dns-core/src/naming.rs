//! TXT record name derivation
//!
//! DNS-01 validation records live at `_acme-challenge.<host>`. Zone stores
//! address record sets by their name relative to the zone apex, so
//! `www.example.com` in zone `example.com` maps to `_acme-challenge.www`.

use crate::error::{Error, Result};

/// Label prepended to every validation host
pub const ACME_CHALLENGE_LABEL: &str = "_acme-challenge";

/// Normalize a domain name for comparison: lowercase, no trailing dot
fn normalize(name: &str) -> String {
    name.trim().trim_end_matches('.').to_ascii_lowercase()
}

/// Derive the relative TXT record name for an identifier within a zone
///
/// Wildcard identifiers (`*.example.com`) validate against their base
/// domain, so the wildcard label is dropped. The zone apex maps to the bare
/// challenge label.
///
/// # Errors
///
/// Returns [`Error::Mapping`] if the identifier is empty or not the zone
/// itself or a subdomain of it.
pub fn txt_record_name(identifier: &str, zone: &str) -> Result<String> {
    let zone_name = normalize(zone);
    let mut host = normalize(identifier);

    if let Some(base) = host.strip_prefix("*.") {
        host = base.to_string();
    }

    if host.is_empty() || zone_name.is_empty() {
        return Err(Error::mapping(identifier, zone));
    }

    if host == zone_name {
        return Ok(ACME_CHALLENGE_LABEL.to_string());
    }

    match host.strip_suffix(&zone_name) {
        Some(prefix) if prefix.ends_with('.') && prefix.len() > 1 => Ok(format!(
            "{}.{}",
            ACME_CHALLENGE_LABEL,
            &prefix[..prefix.len() - 1]
        )),
        _ => Err(Error::mapping(identifier, zone)),
    }
}

/// Fully qualified name of a relative record name within a zone
pub fn fqdn(relative: &str, zone: &str) -> String {
    let zone_name = normalize(zone);
    if relative.is_empty() || relative == "@" {
        zone_name
    } else {
        format!("{}.{}", relative, zone_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subdomain_maps_to_relative_name() {
        assert_eq!(
            txt_record_name("www.example.com", "example.com").unwrap(),
            "_acme-challenge.www"
        );
        assert_eq!(
            txt_record_name("a.b.example.com", "example.com").unwrap(),
            "_acme-challenge.a.b"
        );
    }

    #[test]
    fn test_apex_maps_to_bare_label() {
        assert_eq!(
            txt_record_name("example.com", "example.com").unwrap(),
            "_acme-challenge"
        );
    }

    #[test]
    fn test_wildcard_uses_base_domain() {
        assert_eq!(
            txt_record_name("*.example.com", "example.com").unwrap(),
            "_acme-challenge"
        );
        assert_eq!(
            txt_record_name("*.api.example.com", "example.com").unwrap(),
            "_acme-challenge.api"
        );
    }

    #[test]
    fn test_case_and_trailing_dots_are_ignored() {
        assert_eq!(
            txt_record_name("WWW.Example.COM.", "example.com.").unwrap(),
            "_acme-challenge.www"
        );
    }

    #[test]
    fn test_identifier_outside_zone_is_rejected() {
        let err = txt_record_name("www.example.org", "example.com").unwrap_err();
        assert!(matches!(err, Error::Mapping { .. }));
    }

    #[test]
    fn test_suffix_without_label_boundary_is_rejected() {
        // "notexample.com" ends with "example.com" but is not inside it
        assert!(txt_record_name("notexample.com", "example.com").is_err());
        assert!(txt_record_name("www.notexample.com", "example.com").is_err());
    }

    #[test]
    fn test_empty_identifier_is_rejected() {
        assert!(txt_record_name("", "example.com").is_err());
        assert!(txt_record_name(".", "example.com").is_err());
    }

    #[test]
    fn test_fqdn() {
        assert_eq!(
            fqdn("_acme-challenge.www", "example.com"),
            "_acme-challenge.www.example.com"
        );
        assert_eq!(fqdn("@", "example.com."), "example.com");
    }
}
