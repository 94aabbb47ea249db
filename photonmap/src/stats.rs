//! Store statistics.

use crate::photon::PhotonKind;
use std::fmt;

/// Counters describing the contents and history of a photon store.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PhotonMapStats {
    /// Kind of records held.
    pub kind: PhotonKind,

    /// Records stored, balanced or pending.
    pub stored: usize,

    /// Maximum number of records.
    pub capacity: usize,

    /// Records not yet in the balanced tree.
    pub pending: usize,

    /// Records offered to the store.
    pub considered: u64,

    /// Records turned away by density control.
    pub rejected: u64,

    /// Rejected records whose flux was merged into a neighbour.
    pub merged: u64,

    /// Paths traced.
    pub paths: u64,

    /// Number of times the tree was rebuilt.
    pub balances: u64,
}

impl fmt::Display for PhotonMapStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} map", self.kind)?;
        writeln!(f, "  stored     {} / {}", self.stored, self.capacity)?;
        writeln!(f, "  pending    {}", self.pending)?;
        writeln!(f, "  considered {}", self.considered)?;
        writeln!(f, "  rejected   {} ({} merged)", self.rejected, self.merged)?;
        writeln!(f, "  paths      {}", self.paths)?;
        write!(f, "  balances   {}", self.balances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_counts() {
        let stats = PhotonMapStats {
            kind: PhotonKind::Plain,
            stored: 10,
            capacity: 20,
            pending: 2,
            considered: 15,
            rejected: 5,
            merged: 1,
            paths: 7,
            balances: 3,
        };
        let text = stats.to_string();
        assert!(text.starts_with("photon map"));
        assert!(text.contains("stored     10 / 20"));
        assert!(text.contains("rejected   5 (1 merged)"));
        assert!(text.contains("paths      7"));
    }
}
