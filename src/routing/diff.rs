//! Route table comparison.
//!
//! # Rules
//! - Different host counts → changed
//! - A host present in one table and absent in the other → changed, even when
//!   the present side is an empty list ("no live backend" is not "not managed")
//! - Same host with a different number of IPs → changed
//! - Otherwise IP lists are compared after sorting, so order never matters
//!
//! Both operands are sorted in place. Callers always pass owned snapshots,
//! never the live table.

use crate::routing::table::RouteTable;

/// Return true if `a` and `b` route differently. Stops at the first difference.
pub fn differs(a: &mut RouteTable, b: &mut RouteTable) -> bool {
    if a.len() != b.len() {
        return true;
    }

    for (host, a_ips) in a.iter_mut() {
        let Some(b_ips) = b.get_mut(host) else {
            return true;
        };
        if a_ips.len() != b_ips.len() {
            return true;
        }

        a_ips.sort_unstable();
        b_ips.sort_unstable();
        if a_ips.iter().zip(b_ips.iter()).any(|(x, y)| x != y) {
            return true;
        }
    }
    false
}
