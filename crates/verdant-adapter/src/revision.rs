//! Supported host revisions and the static version table.

use std::fmt;
use std::sync::Arc;

use crate::adapter::VersionAdapter;
use crate::v1_19::V1_19Adapter;
use crate::v1_20::V1_20Adapter;
use crate::v1_21::V1_21Adapter;
use crate::version::RuntimeVersion;

/// An internal data-layout revision of the host.
///
/// Several releases share a revision when their internals did not change.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Revision {
    V1_19_R1,
    V1_19_R2,
    V1_19_R3,
    V1_20_R1,
    V1_20_R2,
    V1_20_R3,
    V1_20_R4,
    V1_21_R1,
}

/// Groups of revisions whose biome internals are mutually compatible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Family {
    /// Catalog lock through internal flags, snapshots carry `trust_edges`.
    V1_19,
    /// Catalog lock through internal flags, no `trust_edges`.
    V1_20,
    /// Direct catalog lock, strict identifier alphabet.
    V1_21,
}

impl Revision {
    /// Every supported revision, oldest first.
    pub const ALL: [Revision; 8] = [
        Revision::V1_19_R1,
        Revision::V1_19_R2,
        Revision::V1_19_R3,
        Revision::V1_20_R1,
        Revision::V1_20_R2,
        Revision::V1_20_R3,
        Revision::V1_20_R4,
        Revision::V1_21_R1,
    ];

    /// Looks up the revision a release runs on. `None` for unsupported releases.
    pub fn for_version(version: &RuntimeVersion) -> Option<Revision> {
        let revision = match (version.major, version.minor, version.patch) {
            (1, 19, None | Some(1) | Some(2)) => Revision::V1_19_R1,
            (1, 19, Some(3)) => Revision::V1_19_R2,
            (1, 19, Some(4)) => Revision::V1_19_R3,
            (1, 20, None | Some(1)) => Revision::V1_20_R1,
            (1, 20, Some(2)) => Revision::V1_20_R2,
            (1, 20, Some(3) | Some(4)) => Revision::V1_20_R3,
            (1, 20, Some(5) | Some(6)) => Revision::V1_20_R4,
            (1, 21, None) => Revision::V1_21_R1,
            _ => return None,
        };
        Some(revision)
    }

    /// The compatibility family of this revision.
    pub fn family(self) -> Family {
        match self {
            Revision::V1_19_R1 | Revision::V1_19_R2 | Revision::V1_19_R3 => Family::V1_19,
            Revision::V1_20_R1 | Revision::V1_20_R2 | Revision::V1_20_R3 => Family::V1_20,
            Revision::V1_20_R4 | Revision::V1_21_R1 => Family::V1_21,
        }
    }

    /// Package-style name, e.g. `v1_20_R3`.
    pub fn name(self) -> &'static str {
        match self {
            Revision::V1_19_R1 => "v1_19_R1",
            Revision::V1_19_R2 => "v1_19_R2",
            Revision::V1_19_R3 => "v1_19_R3",
            Revision::V1_20_R1 => "v1_20_R1",
            Revision::V1_20_R2 => "v1_20_R2",
            Revision::V1_20_R3 => "v1_20_R3",
            Revision::V1_20_R4 => "v1_20_R4",
            Revision::V1_21_R1 => "v1_21_R1",
        }
    }

    /// Constructs the adapter implementing this revision.
    pub fn build_adapter(self) -> Arc<dyn VersionAdapter> {
        match self.family() {
            Family::V1_19 => Arc::new(V1_19Adapter::new(self)),
            Family::V1_20 => Arc::new(V1_20Adapter::new(self)),
            Family::V1_21 => Arc::new(V1_21Adapter::new(self)),
        }
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(minor: u32, patch: Option<u32>) -> RuntimeVersion {
        RuntimeVersion::new(1, minor, patch)
    }

    #[test]
    fn test_table_matches_known_releases() {
        let cases = [
            (v(19, None), Revision::V1_19_R1),
            (v(19, Some(1)), Revision::V1_19_R1),
            (v(19, Some(2)), Revision::V1_19_R1),
            (v(19, Some(3)), Revision::V1_19_R2),
            (v(19, Some(4)), Revision::V1_19_R3),
            (v(20, None), Revision::V1_20_R1),
            (v(20, Some(1)), Revision::V1_20_R1),
            (v(20, Some(2)), Revision::V1_20_R2),
            (v(20, Some(3)), Revision::V1_20_R3),
            (v(20, Some(4)), Revision::V1_20_R3),
            (v(20, Some(5)), Revision::V1_20_R4),
            (v(20, Some(6)), Revision::V1_20_R4),
            (v(21, None), Revision::V1_21_R1),
        ];
        for (version, expected) in cases {
            assert_eq!(Revision::for_version(&version), Some(expected), "{version}");
        }
    }

    #[test]
    fn test_table_rejects_unknown_releases() {
        for version in [
            v(18, Some(2)),
            v(19, Some(5)),
            v(20, Some(7)),
            v(21, Some(0)),
            v(21, Some(1)),
            RuntimeVersion::new(2, 0, None),
        ] {
            assert_eq!(Revision::for_version(&version), None, "{version}");
        }
    }

    #[test]
    fn test_every_revision_builds_matching_adapter() {
        for revision in Revision::ALL {
            assert_eq!(revision.build_adapter().revision(), revision);
        }
    }

    #[test]
    fn test_families() {
        assert_eq!(Revision::V1_19_R3.family(), Family::V1_19);
        assert_eq!(Revision::V1_20_R3.family(), Family::V1_20);
        assert_eq!(Revision::V1_20_R4.family(), Family::V1_21);
        assert_eq!(Revision::V1_21_R1.to_string(), "v1_21_R1");
    }
}
