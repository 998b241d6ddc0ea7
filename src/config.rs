//! Runtime configuration, read from an optional TOML file.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration.

use std::path::Path;
use std::{fs, io};

use serde::Deserialize;
use thiserror::Error;

/// Default bound on how many `include` levels are followed.
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 10;

/// Default cap on DNS queries (TXT, A/AAAA and MX alike) per evaluation,
/// the top-level TXT lookup included.
pub const DEFAULT_MAX_DNS_LOOKUPS: usize = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read configuration file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub dns: DnsConfig,
    pub resolution: ResolutionConfig,
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text)
    }
}

/// Which nameservers the resolver talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Upstream {
    /// Whatever the host's resolv.conf says.
    #[default]
    System,
    Cloudflare,
    Google,
    Quad9,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DnsConfig {
    pub upstream: Upstream,

    /// Per-query timeout in seconds (default: 5)
    pub timeout_secs: u64,

    /// Attempts per query before giving up (default: 2)
    pub attempts: usize,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            upstream: Upstream::System,
            timeout_secs: 5,
            attempts: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolutionConfig {
    /// Longest `include` chain followed before giving up.
    pub max_include_depth: usize,

    /// Most DNS queries one evaluation may issue, across the whole include tree.
    pub max_dns_lookups: usize,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
            max_dns_lookups: DEFAULT_MAX_DNS_LOOKUPS,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.dns.upstream, Upstream::System);
        assert_eq!(config.resolution.max_include_depth, 10);
        assert_eq!(config.resolution.max_dns_lookups, 30);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::from_toml(
            r#"
            [dns]
            upstream = "quad9"

            [resolution]
            max_include_depth = 4
            max_dns_lookups = 12
            "#,
        )
        .unwrap();

        assert_eq!(config.dns.upstream, Upstream::Quad9);
        assert_eq!(config.dns.timeout_secs, 5);
        assert_eq!(config.dns.attempts, 2);
        assert_eq!(config.resolution.max_include_depth, 4);
        assert_eq!(config.resolution.max_dns_lookups, 12);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_toml("[dns]\nretries = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn unknown_upstream_is_rejected() {
        assert!(Config::from_toml("[dns]\nupstream = \"opendns\"\n").is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[dns]\nupstream = \"cloudflare\"\ntimeout_secs = 2").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.dns.upstream, Upstream::Cloudflare);
        assert_eq!(config.dns.timeout_secs, 2);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::from_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
