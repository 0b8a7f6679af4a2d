//! Semantic version numbers of contracts.

use contracts_core::ChangeReport;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Result, VersioningError};

/// A contract version number.
///
/// Parsing is lenient: `1.2` reads as `1.2.0` and a leading `v` is ignored.
///
/// # Example
///
/// ```rust
/// use contracts_versioning::SemanticVersion;
///
/// let version: SemanticVersion = "v1.2".parse().unwrap();
/// assert_eq!(version.to_string(), "1.2.0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SemanticVersion(semver::Version);

impl SemanticVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self(semver::Version::new(major, minor, patch))
    }

    /// Version of a newly registered contract.
    pub fn initial() -> Self {
        Self::new(1, 0, 0)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let bare = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);

        let core_len = bare.find(['-', '+']).unwrap_or(bare.len());
        let normalized = if bare[..core_len].matches('.').count() == 1 {
            format!("{}.0{}", &bare[..core_len], &bare[core_len..])
        } else {
            bare.to_string()
        };

        semver::Version::parse(&normalized)
            .map(Self)
            .map_err(|e| VersioningError::InvalidVersion {
                version: text.to_string(),
                message: e.to_string(),
            })
    }

    pub fn major(&self) -> u64 {
        self.0.major
    }

    pub fn minor(&self) -> u64 {
        self.0.minor
    }

    pub fn patch(&self) -> u64 {
        self.0.patch
    }

    /// Next version for a set of changes: breaking bumps major, non-breaking
    /// bumps minor, anything else bumps patch.
    ///
    /// Fails with [`VersioningError::InvalidVersion`] when the bumped
    /// component is already `u64::MAX`.
    pub fn bump(&self, report: &ChangeReport) -> Result<Self> {
        match ChangeType::from_report(report) {
            ChangeType::Breaking => self.next_major(),
            ChangeType::NonBreaking => {
                Ok(Self::new(self.major(), self.increment("minor", self.minor())?, 0))
            }
            _ => Ok(Self::new(
                self.major(),
                self.minor(),
                self.increment("patch", self.patch())?,
            )),
        }
    }

    pub fn next_major(&self) -> Result<Self> {
        Ok(Self::new(self.increment("major", self.major())?, 0, 0))
    }

    fn increment(&self, component: &str, value: u64) -> Result<u64> {
        value
            .checked_add(1)
            .ok_or_else(|| VersioningError::InvalidVersion {
                version: self.to_string(),
                message: format!("{} version cannot be incremented past {}", component, u64::MAX),
            })
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SemanticVersion {
    type Err = VersioningError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SemanticVersion {
    type Error = VersioningError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<SemanticVersion> for String {
    fn from(version: SemanticVersion) -> Self {
        version.to_string()
    }
}

/// Why a version was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeType {
    Initial,
    Breaking,
    NonBreaking,
    Patch,
    Rollback,
}

impl ChangeType {
    /// Classifies a diff: BREAKING, NON_BREAKING, or PATCH when nothing
    /// changed.
    pub fn from_report(report: &ChangeReport) -> Self {
        if report.has_breaking_changes() {
            ChangeType::Breaking
        } else if report.has_non_breaking_changes() {
            ChangeType::NonBreaking
        } else {
            ChangeType::Patch
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Initial => "INITIAL",
            ChangeType::Breaking => "BREAKING",
            ChangeType::NonBreaking => "NON_BREAKING",
            ChangeType::Patch => "PATCH",
            ChangeType::Rollback => "ROLLBACK",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
