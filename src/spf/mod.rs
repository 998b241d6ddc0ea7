//! SPF policy resolution and evaluation.
//!
//! A domain's policy is flattened into a list of address ranges by following
//! `include`, `a` and `mx` terms, the candidate address is tested against
//! that list, and the trailing `all` term of the top-level policy decides
//! what happens when nothing matches.

mod eval;
mod matcher;
mod mechanism;
mod qualifier;
mod record;
mod resolve;

pub use eval::{Evaluation, Outcome, SpfChecker};
pub use matcher::{first_match, normalize_range};
pub use mechanism::Term;
pub use qualifier::{all_disposition, Disposition};
pub use record::{select_policy, Policy};
pub use resolve::RangeResolver;

use thiserror::Error;

use crate::common::dns::DnsError;

/// Every way an evaluation can fail. All of them abort the whole evaluation.
#[derive(Debug, Error)]
pub enum SpfError {
    #[error("email address {0:?} must contain exactly one '@' followed by a domain")]
    MalformedEmail(String),

    #[error("expected exactly one v=spf1 record for {domain}, found {found}")]
    AmbiguousPolicy { domain: String, found: usize },

    #[error("lookup of {name} failed: {source}")]
    Lookup {
        name: String,
        #[source]
        source: DnsError,
    },

    #[error("malformed address range {0:?}")]
    MalformedRange(String),

    #[error("unknown address mechanism {0:?}")]
    UnknownMechanism(String),

    #[error("include loop: {0} is already being resolved")]
    PolicyCycle(String),

    #[error("include chain deeper than {0} levels")]
    IncludeDepthExceeded(usize),

    #[error("policy needs more than {0} DNS lookups")]
    TooManyLookups(usize),
}

impl SpfError {
    pub(crate) fn lookup(name: &str, source: DnsError) -> Self {
        Self::Lookup {
            name: name.to_string(),
            source,
        }
    }
}
