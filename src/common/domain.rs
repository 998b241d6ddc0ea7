/// Normalize a domain: lowercase + strip trailing dot.
pub fn normalize(domain: &str) -> String {
    let d = domain.to_ascii_lowercase();
    d.strip_suffix('.').unwrap_or(&d).to_string()
}

/// Compare two domains after normalization.
pub fn domains_equal(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// Extract the domain part of an email address.
///
/// The address must split on `@` into exactly two parts and the domain part
/// must be non-empty. Returns None otherwise.
pub fn domain_from_email(email: &str) -> Option<&str> {
    let mut parts = email.split('@');
    let (_local, domain) = (parts.next()?, parts.next()?);
    if parts.next().is_some() || domain.is_empty() {
        return None;
    }
    Some(domain)
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- Normalize tests ---

    #[test]
    fn normalize_lowercase() {
        assert_eq!(normalize("EXAMPLE.COM"), "example.com");
    }

    #[test]
    fn normalize_strip_trailing_dot() {
        assert_eq!(normalize("example.com."), "example.com");
    }

    #[test]
    fn normalize_combined() {
        assert_eq!(normalize("Mail.EXAMPLE.COM."), "mail.example.com");
    }

    #[test]
    fn domains_equal_ignores_case_and_root_dot() {
        assert!(domains_equal("Example.com.", "example.COM"));
        assert!(!domains_equal("example.com", "example.org"));
    }

    // --- domain_from_email tests ---

    #[test]
    fn email_with_one_at() {
        assert_eq!(domain_from_email("user@example.com"), Some("example.com"));
    }

    #[test]
    fn email_with_empty_local_part() {
        assert_eq!(domain_from_email("@example.com"), Some("example.com"));
    }

    #[test]
    fn email_without_at() {
        assert_eq!(domain_from_email("user.example.com"), None);
    }

    #[test]
    fn email_with_two_ats() {
        assert_eq!(domain_from_email("user@host@example.com"), None);
    }

    #[test]
    fn email_with_empty_domain() {
        assert_eq!(domain_from_email("user@"), None);
    }
}
