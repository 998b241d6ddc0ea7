//! Picking the SPF policy out of a domain's TXT answers.

use super::SpfError;

/// The raw SPF text one domain publishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    pub domain: String,
    pub text: String,
}

impl Policy {
    /// Whitespace-delimited terms, left to right.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.text.split_whitespace()
    }
}

/// Return the single TXT answer starting with the literal `v=spf1`.
///
/// - No such record → `AmbiguousPolicy { found: 0 }`
/// - More than one → `AmbiguousPolicy { found: n }`
pub fn select_policy(domain: &str, txt_records: &[String]) -> Result<Policy, SpfError> {
    let spf_records: Vec<&String> = txt_records
        .iter()
        .filter(|record| record.starts_with("v=spf1"))
        .collect();

    match spf_records.as_slice() {
        [record] => Ok(Policy {
            domain: domain.to_string(),
            text: (*record).clone(),
        }),
        other => Err(SpfError::AmbiguousPolicy {
            domain: domain.to_string(),
            found: other.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn single_spf_record_is_selected() {
        let policy = select_policy(
            "example.com",
            &records(&[
                "google-site-verification=abc123",
                "v=spf1 ip4:203.0.113.0/24 -all",
                "some other txt record",
            ]),
        )
        .unwrap();

        assert_eq!(policy.domain, "example.com");
        assert_eq!(policy.text, "v=spf1 ip4:203.0.113.0/24 -all");
    }

    #[test]
    fn no_spf_record_is_ambiguous() {
        let err = select_policy("example.com", &records(&["not-spf"])).unwrap_err();
        assert!(matches!(err, SpfError::AmbiguousPolicy { found: 0, .. }));
    }

    #[test]
    fn empty_answer_is_ambiguous() {
        let err = select_policy("example.com", &[]).unwrap_err();
        assert!(matches!(err, SpfError::AmbiguousPolicy { found: 0, .. }));
    }

    #[test]
    fn two_spf_records_are_ambiguous() {
        let err = select_policy("example.com", &records(&["v=spf1 +all", "v=spf1 -all"])).unwrap_err();
        match err {
            SpfError::AmbiguousPolicy { domain, found } => {
                assert_eq!(domain, "example.com");
                assert_eq!(found, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    // The prefix test is literal: case and the character after `v=spf1` are not checked.
    #[test]
    fn prefix_is_case_sensitive() {
        let err = select_policy("example.com", &records(&["V=SPF1 -all"])).unwrap_err();
        assert!(matches!(err, SpfError::AmbiguousPolicy { found: 0, .. }));
    }

    #[test]
    fn terms_split_on_any_whitespace() {
        let policy = Policy {
            domain: "example.com".into(),
            text: "v=spf1  ip4:192.0.2.1\tmx  -all".into(),
        };
        assert_eq!(
            policy.terms().collect::<Vec<_>>(),
            vec!["v=spf1", "ip4:192.0.2.1", "mx", "-all"]
        );
    }
}
