use std::collections::HashMap;
use std::future::Future;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::proto::{ProtoError, ProtoErrorKind};
use hickory_resolver::{ResolveError, TokioResolver};
use thiserror::Error;
use tracing::debug;

use crate::config::{DnsConfig, Upstream};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DnsError {
    #[error("NXDOMAIN: {0} does not exist")]
    NxDomain(String),
    #[error("SERVFAIL while resolving {0}")]
    ServFail(String),
    #[error("timeout while resolving {0}")]
    Timeout(String),
    #[error("DNS error: {0}")]
    Other(String),
}

/// DNS resolver trait for abstracting DNS lookups.
///
/// An empty answer is `Ok(vec![])`; only failures to get an answer are errors.
pub trait DnsResolver: Send + Sync + 'static {
    fn query_txt(&self, name: &str) -> impl Future<Output = Result<Vec<String>, DnsError>> + Send;
    fn query_addresses(&self, name: &str) -> impl Future<Output = Result<Vec<IpAddr>, DnsError>> + Send;
    fn query_mx(&self, name: &str) -> impl Future<Output = Result<Vec<(u16, String)>, DnsError>> + Send;
}

/// Hickory DNS resolver implementation
#[derive(Clone)]
pub struct HickoryResolver {
    resolver: TokioResolver,
}

impl HickoryResolver {
    pub fn from_config(config: &DnsConfig) -> Result<Self, DnsError> {
        let mut opts = ResolverOpts::default();
        opts.timeout = Duration::from_secs(config.timeout_secs);
        opts.attempts = config.attempts;

        let builder = match config.upstream {
            Upstream::System => TokioResolver::builder(TokioConnectionProvider::default())
                .map_err(|e| DnsError::Other(format!("cannot load system resolver config: {e}")))?,
            Upstream::Cloudflare => TokioResolver::builder_with_config(
                ResolverConfig::cloudflare(),
                TokioConnectionProvider::default(),
            ),
            Upstream::Google => TokioResolver::builder_with_config(
                ResolverConfig::google(),
                TokioConnectionProvider::default(),
            ),
            Upstream::Quad9 => TokioResolver::builder_with_config(
                ResolverConfig::quad9(),
                TokioConnectionProvider::default(),
            ),
        };

        Ok(Self {
            resolver: builder.with_options(opts).build(),
        })
    }

    /// Map a failed lookup to an answer or an error.
    ///
    /// hickory reports NODATA and NXDOMAIN alike as "no records found"; only
    /// the response code tells them apart. NODATA is an empty answer, every
    /// other response code is a failure.
    fn answer_or_error<T>(name: &str, e: &ResolveError) -> Result<Vec<T>, DnsError> {
        let name = name.to_string();
        let err = match e.proto().map(ProtoError::kind) {
            Some(ProtoErrorKind::NoRecordsFound { response_code, .. }) => match *response_code {
                ResponseCode::NoError => return Ok(Vec::new()),
                ResponseCode::NXDomain => DnsError::NxDomain(name),
                ResponseCode::ServFail => DnsError::ServFail(name),
                other => DnsError::Other(format!("{name}: {other}")),
            },
            Some(ProtoErrorKind::Timeout) => DnsError::Timeout(name),
            _ => DnsError::Other(e.to_string()),
        };
        Err(err)
    }
}

impl DnsResolver for HickoryResolver {
    async fn query_txt(&self, name: &str) -> Result<Vec<String>, DnsError> {
        debug!(name, "TXT lookup");
        match self.resolver.txt_lookup(name).await {
            Ok(lookup) => Ok(lookup.iter().map(|txt| txt.to_string()).collect()),
            Err(e) => Self::answer_or_error(name, &e),
        }
    }

    async fn query_addresses(&self, name: &str) -> Result<Vec<IpAddr>, DnsError> {
        debug!(name, "A/AAAA lookup");
        match self.resolver.lookup_ip(name).await {
            Ok(lookup) => Ok(lookup.iter().collect()),
            Err(e) => Self::answer_or_error(name, &e),
        }
    }

    async fn query_mx(&self, name: &str) -> Result<Vec<(u16, String)>, DnsError> {
        debug!(name, "MX lookup");
        match self.resolver.mx_lookup(name).await {
            Ok(lookup) => Ok(lookup
                .iter()
                .map(|mx| {
                    (
                        mx.preference(),
                        mx.exchange().to_string().trim_end_matches('.').to_string(),
                    )
                })
                .collect()),
            Err(e) => Self::answer_or_error(name, &e),
        }
    }
}

/// Mock DNS resolver for testing
#[derive(Clone, Default)]
pub struct MockResolver {
    txt_records: Arc<Mutex<HashMap<String, Vec<String>>>>,
    addresses: Arc<Mutex<HashMap<String, Vec<IpAddr>>>>,
    mx_records: Arc<Mutex<HashMap<String, Vec<(u16, String)>>>>,
    failures: Arc<Mutex<HashMap<String, DnsError>>>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl MockResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_txt(&self, name: &str, records: Vec<String>) {
        lock(&self.txt_records).insert(name.to_lowercase(), records);
    }

    pub fn add_addresses(&self, name: &str, addrs: Vec<IpAddr>) {
        lock(&self.addresses).insert(name.to_lowercase(), addrs);
    }

    pub fn add_mx(&self, name: &str, records: Vec<(u16, String)>) {
        lock(&self.mx_records).insert(name.to_lowercase(), records);
    }

    /// Every query for `name` fails with `error`.
    pub fn fail(&self, name: &str, error: DnsError) {
        lock(&self.failures).insert(name.to_lowercase(), error);
    }

    pub fn set_nxdomain(&self, name: &str) {
        self.fail(name, DnsError::NxDomain(name.to_string()));
    }

    /// Queries issued so far, as `"<TYPE> <name>"`.
    pub fn queries(&self) -> Vec<String> {
        lock(&self.queries).clone()
    }

    fn answer<T: Clone>(
        &self,
        kind: &str,
        name: &str,
        table: &Mutex<HashMap<String, Vec<T>>>,
    ) -> Result<Vec<T>, DnsError> {
        let name_lower = name.to_lowercase();
        lock(&self.queries).push(format!("{kind} {name_lower}"));
        if let Some(err) = lock(&self.failures).get(&name_lower) {
            return Err(err.clone());
        }
        Ok(lock(table).get(&name_lower).cloned().unwrap_or_default())
    }
}

// A poisoned lock only means another test thread panicked; the data is still usable.
fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl DnsResolver for MockResolver {
    async fn query_txt(&self, name: &str) -> Result<Vec<String>, DnsError> {
        self.answer("TXT", name, &self.txt_records)
    }

    async fn query_addresses(&self, name: &str) -> Result<Vec<IpAddr>, DnsError> {
        self.answer("A", name, &self.addresses)
    }

    async fn query_mx(&self, name: &str) -> Result<Vec<(u16, String)>, DnsError> {
        self.answer("MX", name, &self.mx_records)
    }
}
