//! Classification of individual policy terms.

/// One whitespace-delimited term of a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Term<'a> {
    /// `v=spf1`
    Version,
    /// `ip4:<range>`, argument kept verbatim
    Ip4(&'a str),
    /// `ip6:<range>`, argument kept verbatim
    Ip6(&'a str),
    /// `include:<domain>`
    Include(&'a str),
    /// `a`, resolved against the current domain
    A,
    /// `mx`, resolved against the current domain
    Mx,
    /// `[+-~?]all`
    All,
    /// Anything else. Ignored for range purposes.
    Unknown(&'a str),
}

impl<'a> Term<'a> {
    /// Classify a term. Mechanism names are case-insensitive.
    ///
    /// An explicit `+` is the same as no qualifier. Ranges behind a `-`, `~`
    /// or `?` qualifier authorize nothing, so those terms are `Unknown`.
    pub fn classify(term: &'a str) -> Term<'a> {
        if term == "v=spf1" {
            return Term::Version;
        }

        let (qualifier, body) = match term.as_bytes().first() {
            Some(b'+' | b'-' | b'~' | b'?') => (Some(term.as_bytes()[0]), &term[1..]),
            _ => (None, term),
        };

        if body.eq_ignore_ascii_case("all") {
            return Term::All;
        }
        if matches!(qualifier, Some(q) if q != b'+') {
            return Term::Unknown(term);
        }

        if let Some(range) = strip_prefix_ignore_case(body, "ip4:") {
            Term::Ip4(range)
        } else if let Some(range) = strip_prefix_ignore_case(body, "ip6:") {
            Term::Ip6(range)
        } else if let Some(domain) = strip_prefix_ignore_case(body, "include:") {
            Term::Include(domain)
        } else if body.eq_ignore_ascii_case("a") {
            Term::A
        } else if body.eq_ignore_ascii_case("mx") {
            Term::Mx
        } else {
            Term::Unknown(term)
        }
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_term() {
        assert_eq!(Term::classify("v=spf1"), Term::Version);
    }

    // Partial version tokens were skipped by the old reversed prefix check;
    // they carry no ranges, so ignoring them is equivalent.
    #[test]
    fn partial_version_tokens_are_ignored() {
        assert_eq!(Term::classify("v="), Term::Unknown("v="));
        assert_eq!(Term::classify("v=spf10"), Term::Unknown("v=spf10"));
    }

    #[test]
    fn ip_ranges_are_kept_verbatim() {
        assert_eq!(Term::classify("ip4:203.0.113.0/24"), Term::Ip4("203.0.113.0/24"));
        assert_eq!(Term::classify("ip6:2001:db8::/32"), Term::Ip6("2001:db8::/32"));
        assert_eq!(Term::classify("ip4:198.51.100.7"), Term::Ip4("198.51.100.7"));
    }

    #[test]
    fn mechanism_names_ignore_case() {
        assert_eq!(Term::classify("IP4:192.0.2.1"), Term::Ip4("192.0.2.1"));
        assert_eq!(Term::classify("Include:_spf.Example.com"), Term::Include("_spf.Example.com"));
        assert_eq!(Term::classify("A"), Term::A);
        assert_eq!(Term::classify("MX"), Term::Mx);
    }

    #[test]
    fn include_term() {
        assert_eq!(Term::classify("include:other.example"), Term::Include("other.example"));
    }

    #[test]
    fn all_with_any_qualifier() {
        for term in ["all", "+all", "-all", "~all", "?all", "-ALL"] {
            assert_eq!(Term::classify(term), Term::All, "{term}");
        }
    }

    #[test]
    fn plus_qualifier_is_transparent() {
        assert_eq!(Term::classify("+ip4:192.0.2.1"), Term::Ip4("192.0.2.1"));
        assert_eq!(Term::classify("+mx"), Term::Mx);
    }

    #[test]
    fn negative_qualifiers_authorize_nothing() {
        assert_eq!(Term::classify("-ip4:192.0.2.1"), Term::Unknown("-ip4:192.0.2.1"));
        assert_eq!(Term::classify("~include:x.example"), Term::Unknown("~include:x.example"));
        assert_eq!(Term::classify("?a"), Term::Unknown("?a"));
    }

    #[test]
    fn unsupported_forms_are_unknown() {
        for term in ["ptr", "exists:%{i}.bl.example", "a:mail.example.com", "mx/24", "redirect=x.example", "exp=explain.example"] {
            assert_eq!(Term::classify(term), Term::Unknown(term), "{term}");
        }
    }
}
