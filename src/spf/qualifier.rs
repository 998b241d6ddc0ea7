use std::fmt;

use super::mechanism::Term;
use super::record::Policy;

/// What the policy's `all` term says about senders that matched nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// `-all`
    Fail,
    /// `~all`
    SoftFail,
    /// `+all`, `?all`, a bare `all`, or no `all` term at all.
    None,
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disposition::Fail => write!(f, "Fail"),
            Disposition::SoftFail => write!(f, "SoftFail"),
            Disposition::None => write!(f, "None"),
        }
    }
}

/// Disposition of the last `all` term in `policy`.
///
/// Terms after `all` (modifiers such as `exp=`) do not affect the result.
pub fn all_disposition(policy: &Policy) -> Disposition {
    let all = policy
        .terms()
        .filter(|term| Term::classify(term) == Term::All)
        .last();

    match all.and_then(|term| term.chars().next()) {
        Some('-') => Disposition::Fail,
        Some('~') => Disposition::SoftFail,
        _ => Disposition::None,
    }
}
