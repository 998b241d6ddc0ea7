//! Testing a candidate address against a resolved range set.

use std::net::IpAddr;

use tracing::trace;

use super::SpfError;
use crate::common::cidr::Cidr;

/// Turn a bare address into a host route: `/32` without a `:`, `/128` with one.
/// Entries that already carry a `/` are returned unchanged.
pub fn normalize_range(entry: &str) -> String {
    if entry.contains('/') {
        entry.to_string()
    } else if entry.contains(':') {
        format!("{entry}/128")
    } else {
        format!("{entry}/32")
    }
}

/// First range, in resolution order, that contains `ip`.
///
/// Every entry is parsed before matching starts; one malformed entry fails the
/// whole set even if an earlier entry would have matched.
pub fn first_match<S: AsRef<str>>(ranges: &[S], ip: IpAddr) -> Result<Option<Cidr>, SpfError> {
    let parsed = ranges
        .iter()
        .map(|entry| {
            let entry = entry.as_ref();
            normalize_range(entry)
                .parse::<Cidr>()
                .map_err(|_| SpfError::MalformedRange(entry.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let found = parsed.into_iter().find(|cidr| cidr.contains(ip));
    trace!(%ip, matched = ?found, "membership test");
    Ok(found)
}
