//! Protocol-neutral plumbing: DNS access, domain handling and CIDR math.

pub mod cidr;
pub mod dns;
pub mod domain;
