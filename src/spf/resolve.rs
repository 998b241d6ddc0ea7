//! Flattening a policy into the address ranges it authorizes.

use tracing::{debug, trace, warn};

use super::mechanism::Term;
use super::record::{select_policy, Policy};
use super::SpfError;
use crate::common::dns::DnsResolver;
use crate::common::domain;
use crate::config::{DEFAULT_MAX_DNS_LOOKUPS, DEFAULT_MAX_INCLUDE_DEPTH};

/// Walks a policy and everything it references, collecting range strings.
///
/// Lookups are issued one at a time, in term order, so the resulting list is
/// deterministic for a given set of DNS answers. The domains on the current
/// `include` path are tracked to stop loops, and the path length is bounded.
///
/// Every query the walker issues, `fetch_policy` included, is charged to one
/// budget for the walker's lifetime. Use one walker per evaluation.
pub struct RangeResolver<'r, R: DnsResolver> {
    resolver: &'r R,
    max_depth: usize,
    max_lookups: usize,
    lookups: usize,
    path: Vec<String>,
}

impl<'r, R: DnsResolver> RangeResolver<'r, R> {
    pub fn new(resolver: &'r R) -> Self {
        Self::with_max_depth(resolver, DEFAULT_MAX_INCLUDE_DEPTH)
    }

    pub fn with_max_depth(resolver: &'r R, max_depth: usize) -> Self {
        Self {
            resolver,
            max_depth,
            max_lookups: DEFAULT_MAX_DNS_LOOKUPS,
            lookups: 0,
            path: Vec::new(),
        }
    }

    pub fn max_lookups(mut self, max_lookups: usize) -> Self {
        self.max_lookups = max_lookups;
        self
    }

    /// DNS queries issued so far.
    pub fn lookups(&self) -> usize {
        self.lookups
    }

    fn charge_lookup(&mut self, kind: &str, name: &str) -> Result<(), SpfError> {
        if self.lookups >= self.max_lookups {
            warn!(kind, name, limit = self.max_lookups, "DNS lookup budget exhausted");
            return Err(SpfError::TooManyLookups(self.max_lookups));
        }
        self.lookups += 1;
        Ok(())
    }

    /// TXT lookup for `domain`, reduced to its single SPF policy.
    pub async fn fetch_policy(&mut self, domain: &str) -> Result<Policy, SpfError> {
        debug!(domain, "fetching policy");
        self.charge_lookup("TXT", domain)?;
        let txt = self
            .resolver
            .query_txt(domain)
            .await
            .map_err(|e| SpfError::lookup(domain, e))?;
        select_policy(domain, &txt)
    }

    /// Every range `policy` authorizes, including those of included policies.
    pub async fn resolve(&mut self, policy: &Policy) -> Result<Vec<String>, SpfError> {
        self.path.clear();
        self.resolve_at(policy, 0).await
    }

    async fn resolve_at(&mut self, policy: &Policy, depth: usize) -> Result<Vec<String>, SpfError> {
        debug!(domain = %policy.domain, depth, "resolving policy");
        self.path.push(domain::normalize(&policy.domain));

        let mut ranges = Vec::new();
        for term in policy.terms() {
            let classified = Term::classify(term);
            trace!(domain = %policy.domain, term, kind = ?classified, "term");

            match classified {
                Term::Ip4(range) | Term::Ip6(range) => ranges.push(range.to_string()),
                Term::Include(target) => {
                    if self.path.iter().any(|d| domain::domains_equal(d, target)) {
                        return Err(SpfError::PolicyCycle(domain::normalize(target)));
                    }
                    if depth + 1 > self.max_depth {
                        return Err(SpfError::IncludeDepthExceeded(self.max_depth));
                    }

                    let included = self.fetch_policy(target).await?;
                    let nested = Box::pin(self.resolve_at(&included, depth + 1)).await?;
                    ranges.extend(nested);
                }
                Term::A => ranges.extend(self.expand_directive(&policy.domain, "a").await?),
                Term::Mx => ranges.extend(self.expand_directive(&policy.domain, "mx").await?),
                Term::Unknown(other) if other.starts_with(&['-', '~', '?'][..]) => {
                    warn!(domain = %policy.domain, term = other, "ignoring mechanism with non-pass qualifier");
                }
                Term::Version | Term::All | Term::Unknown(_) => {}
            }
        }

        self.path.pop();
        Ok(ranges)
    }

    /// Expand an address directive against `domain` into bare addresses.
    ///
    /// `a` yields the domain's own A/AAAA addresses; `mx` yields the addresses
    /// of every MX target. Any other name is `UnknownMechanism`.
    pub async fn expand_directive(&mut self, domain: &str, directive: &str) -> Result<Vec<String>, SpfError> {
        match directive.to_ascii_lowercase().as_str() {
            "a" => self.host_addresses(domain).await,
            "mx" => {
                debug!(domain, "MX expansion");
                self.charge_lookup("MX", domain)?;
                let exchanges = self
                    .resolver
                    .query_mx(domain)
                    .await
                    .map_err(|e| SpfError::lookup(domain, e))?;

                let mut addrs = Vec::new();
                for (_, host) in exchanges {
                    addrs.extend(self.host_addresses(&host).await?);
                }
                Ok(addrs)
            }
            other => Err(SpfError::UnknownMechanism(other.to_string())),
        }
    }

    async fn host_addresses(&mut self, name: &str) -> Result<Vec<String>, SpfError> {
        self.charge_lookup("A/AAAA", name)?;
        let addrs = self
            .resolver
            .query_addresses(name)
            .await
            .map_err(|e| SpfError::lookup(name, e))?;
        Ok(addrs.iter().map(|ip| ip.to_string()).collect())
    }
}
