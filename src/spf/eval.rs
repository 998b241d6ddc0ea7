use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;

use tracing::{debug, info};

use super::matcher::first_match;
use super::qualifier::{all_disposition, Disposition};
use super::resolve::RangeResolver;
use super::SpfError;
use crate::common::cidr::Cidr;
use crate::common::dns::DnsResolver;
use crate::common::domain::domain_from_email;
use crate::config::{ResolutionConfig, DEFAULT_MAX_DNS_LOOKUPS, DEFAULT_MAX_INCLUDE_DEPTH};

/// Result of one evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// Domain part of the email address.
    pub domain: String,
    /// Candidate sender address.
    pub ip: IpAddr,
    /// Every range the policy authorizes, in resolution order.
    pub ranges: Vec<String>,
    /// First range containing `ip`, in network form.
    pub matched_range: Option<Cidr>,
    /// Qualifier of the top-level `all` term.
    pub disposition: Disposition,
}

/// The decision an [`Evaluation`] amounts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The address is inside an authorized range.
    Pass { range: Cidr },
    /// No match, but the policy does not reject (`~all`, `+all`, `?all` or no `all`).
    Allowed { disposition: Disposition },
    /// No match and the policy ends in `-all`.
    Rejected,
}

impl Evaluation {
    pub fn matched(&self) -> bool {
        self.matched_range.is_some()
    }

    /// A match always authorizes, whatever the disposition.
    pub fn is_authorized(&self) -> bool {
        self.matched()
    }

    pub fn outcome(&self) -> Outcome {
        match (self.matched_range, self.disposition) {
            (Some(range), _) => Outcome::Pass { range },
            (None, Disposition::Fail) => Outcome::Rejected,
            (None, disposition) => Outcome::Allowed { disposition },
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Pass { range } => write!(
                f,
                "IP Sent from is in {range}.  This email will be allowed to send."
            ),
            Outcome::Rejected => write!(
                f,
                "IP Sent from is NOT found. This email would NOT be allowed as your \"ALL\" authorization is set to \"-all\""
            ),
            Outcome::Allowed {
                disposition: Disposition::SoftFail,
            } => write!(
                f,
                "IP Sent from is NOT found. This email would be allowed, but would be a \"SoftFail\" as your authorization is set to \"~all\""
            ),
            Outcome::Allowed { .. } => write!(
                f,
                "IP Sent from is NOT found. This email would be allowed as your \"ALL\" authorization does not restrict senders"
            ),
        }
    }
}

/// SPF checker: `(email, ip) -> Evaluation`.
///
/// Holds no per-evaluation state, so one checker can serve any number of
/// evaluations.
pub struct SpfChecker<R: DnsResolver> {
    resolver: Arc<R>,
    max_include_depth: usize,
    max_dns_lookups: usize,
}

impl<R: DnsResolver> SpfChecker<R> {
    pub fn new(resolver: Arc<R>) -> Self {
        Self {
            resolver,
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
            max_dns_lookups: DEFAULT_MAX_DNS_LOOKUPS,
        }
    }

    pub fn with_config(resolver: Arc<R>, config: &ResolutionConfig) -> Self {
        Self::new(resolver)
            .max_include_depth(config.max_include_depth)
            .max_dns_lookups(config.max_dns_lookups)
    }

    pub fn max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    /// Cap on DNS queries per evaluation, the policy's own TXT lookup included.
    pub fn max_dns_lookups(mut self, lookups: usize) -> Self {
        self.max_dns_lookups = lookups;
        self
    }

    /// Decide whether `ip` may send mail as `email`.
    ///
    /// Any failure along the way (bad address, DNS error, broken policy
    /// anywhere in the include tree, unparsable range) aborts the evaluation.
    pub async fn evaluate(&self, email: &str, ip: IpAddr) -> Result<Evaluation, SpfError> {
        let domain = domain_from_email(email).ok_or_else(|| SpfError::MalformedEmail(email.to_string()))?;
        debug!(email, %ip, domain, "evaluating");

        let mut walker = RangeResolver::with_max_depth(self.resolver.as_ref(), self.max_include_depth)
            .max_lookups(self.max_dns_lookups);
        let policy = walker.fetch_policy(domain).await?;
        let disposition = all_disposition(&policy);
        let ranges = walker.resolve(&policy).await?;
        let matched_range = first_match(&ranges, ip)?;

        let evaluation = Evaluation {
            domain: domain.to_string(),
            ip,
            ranges,
            matched_range,
            disposition,
        };
        info!(
            domain,
            %ip,
            ranges = evaluation.ranges.len(),
            lookups = walker.lookups(),
            matched = ?evaluation.matched_range,
            %disposition,
            "SPF evaluation finished"
        );
        Ok(evaluation)
    }
}
