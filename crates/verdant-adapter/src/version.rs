//! Parsing the host's version banner.

use std::fmt;

use crate::error::VersionError;

/// Marker preceding the version inside a banner.
const BANNER_PREFIX: &str = "(MC: ";

/// A host release `major.minor[.patch]`.
///
/// `1.21` and `1.21.0` are different values: hosts announce releases
/// without a patch component and the revision table matches them verbatim.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuntimeVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: Option<u32>,
}

impl RuntimeVersion {
    /// Creates a version.
    pub const fn new(major: u32, minor: u32, patch: Option<u32>) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Extracts the version from a banner such as
    /// `"git-Paper-196 (MC: 1.20.4)"`.
    ///
    /// The first `(MC: ...)` token that is well formed wins.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::Parse`] carrying the banner if no token matches.
    pub fn from_banner(banner: &str) -> Result<Self, VersionError> {
        banner
            .match_indices(BANNER_PREFIX)
            .find_map(|(start, _)| parse_token(&banner[start + BANNER_PREFIX.len()..]))
            .ok_or_else(|| VersionError::Parse(banner.to_string()))
    }
}

/// Parses `<digits>.<digits>[.<digits>])` at the start of `rest`.
fn parse_token(rest: &str) -> Option<RuntimeVersion> {
    let end = rest.find(')')?;
    let mut parts = rest[..end].split('.');
    let major = parse_number(parts.next()?)?;
    let minor = parse_number(parts.next()?)?;
    let patch = match parts.next() {
        Some(p) => Some(parse_number(p)?),
        None => None,
    };
    if parts.next().is_some() {
        return None;
    }
    Some(RuntimeVersion::new(major, minor, patch))
}

fn parse_number(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

impl fmt::Display for RuntimeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some(patch) = self.patch {
            write!(f, ".{patch}")?;
        }
        Ok(())
    }
}
