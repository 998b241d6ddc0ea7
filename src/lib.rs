//! SPF sender authorization checks.
//!
//! Given an email address and a sending IP address, fetch the domain's SPF
//! policy, flatten it (following `include`, `a` and `mx`) into address
//! ranges, and report whether the address is covered and what the policy's
//! `all` term says otherwise.
//!
//! DNS access goes through the [`DnsResolver`] trait; [`HickoryResolver`]
//! talks to real nameservers and [`MockResolver`] serves canned answers.

pub mod common;
pub mod config;
pub mod logging;
pub mod spf;

pub use common::dns::{DnsError, DnsResolver, HickoryResolver, MockResolver};
pub use config::Config;
pub use spf::{Disposition, Evaluation, Outcome, SpfChecker, SpfError};
