//! Change report types.
//!
//! A [`ChangeReport`] is the result of diffing two contract schemas. It is
//! derived entirely from its two inputs and serializes to the JSON summary
//! stored next to every contract version.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Points added to the risk score per breaking change.
pub const BREAKING_CHANGE_WEIGHT: u32 = 15;

/// Points added to the risk score per non-breaking change.
pub const NON_BREAKING_CHANGE_WEIGHT: u32 = 3;

/// Upper limit of the risk score.
pub const MAX_RISK_SCORE: u32 = 100;

/// Classification of a single schema difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeKind {
    FieldRemoved,
    RequiredFieldAdded,
    OptionalFieldAdded,
    TypeChanged,
    FieldMadeRequired,
    FieldMadeOptional,
    PatternStricter,
    PatternRelaxed,
    ConstraintTightened,
    ConstraintRelaxed,
    FormatChanged,
    EnumValuesRemoved,
    EnumValuesAdded,
}

impl ChangeKind {
    /// Returns true when previously valid data may fail under the new schema.
    pub fn is_breaking(&self) -> bool {
        matches!(
            self,
            ChangeKind::FieldRemoved
                | ChangeKind::RequiredFieldAdded
                | ChangeKind::TypeChanged
                | ChangeKind::FieldMadeRequired
                | ChangeKind::PatternStricter
                | ChangeKind::ConstraintTightened
                | ChangeKind::FormatChanged
                | ChangeKind::EnumValuesRemoved
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::FieldRemoved => "FIELD_REMOVED",
            ChangeKind::RequiredFieldAdded => "REQUIRED_FIELD_ADDED",
            ChangeKind::OptionalFieldAdded => "OPTIONAL_FIELD_ADDED",
            ChangeKind::TypeChanged => "TYPE_CHANGED",
            ChangeKind::FieldMadeRequired => "FIELD_MADE_REQUIRED",
            ChangeKind::FieldMadeOptional => "FIELD_MADE_OPTIONAL",
            ChangeKind::PatternStricter => "PATTERN_STRICTER",
            ChangeKind::PatternRelaxed => "PATTERN_RELAXED",
            ChangeKind::ConstraintTightened => "CONSTRAINT_TIGHTENED",
            ChangeKind::ConstraintRelaxed => "CONSTRAINT_RELAXED",
            ChangeKind::FormatChanged => "FORMAT_CHANGED",
            ChangeKind::EnumValuesRemoved => "ENUM_VALUES_REMOVED",
            ChangeKind::EnumValuesAdded => "ENUM_VALUES_ADDED",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected difference between two schemas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    /// Classification of the difference
    #[serde(rename = "type")]
    pub kind: ChangeKind,

    /// Dotted path of the affected field (`parent.child`, `list[]`)
    pub field: String,

    /// What changed
    pub description: String,

    /// Previous value, stringified
    pub old_value: Option<String>,

    /// New value, stringified
    pub new_value: Option<String>,

    /// Consequence for consumers and producers
    pub impact: String,
}

impl Change {
    /// Creates a change with no recorded values.
    pub fn new(
        kind: ChangeKind,
        field: impl Into<String>,
        description: impl Into<String>,
        impact: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            field: field.into(),
            description: description.into(),
            old_value: None,
            new_value: None,
            impact: impact.into(),
        }
    }

    /// Sets the stringified old and new values.
    pub fn with_values(
        mut self,
        old_value: Option<impl fmt::Display>,
        new_value: Option<impl fmt::Display>,
    ) -> Self {
        self.old_value = old_value.map(|v| v.to_string());
        self.new_value = new_value.map(|v| v.to_string());
        self
    }

    pub fn is_breaking(&self) -> bool {
        self.kind.is_breaking()
    }
}

/// Coarse risk bucket derived from the risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Buckets a score: up to 20 LOW, up to 50 MEDIUM, up to 80 HIGH,
    /// CRITICAL above.
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=20 => RiskLevel::Low,
            21..=50 => RiskLevel::Medium,
            51..=80 => RiskLevel::High,
            _ => RiskLevel::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate diff result.
///
/// # Example
///
/// ```rust
/// use contracts_core::{Change, ChangeKind, ChangeReport, RiskLevel};
///
/// let removed = Change::new(
///     ChangeKind::FieldRemoved,
///     "email",
///     "Field 'email' was removed",
///     "Consumers reading this field will fail",
/// );
/// let report = ChangeReport::new(vec![removed], vec![]);
///
/// assert_eq!(report.risk_score, 15);
/// assert_eq!(report.risk_level, RiskLevel::Low);
/// assert!(report.has_breaking_changes());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeReport {
    pub breaking_changes: Vec<Change>,
    pub non_breaking_changes: Vec<Change>,
    /// Weighted change count, 0 to 100
    pub risk_score: u32,
    pub risk_level: RiskLevel,
    pub total_changes: usize,
    pub summary: String,
}

impl ChangeReport {
    /// Builds a report from classified changes, deriving score, level and
    /// summary.
    pub fn new(breaking_changes: Vec<Change>, non_breaking_changes: Vec<Change>) -> Self {
        let risk_score = risk_score(breaking_changes.len(), non_breaking_changes.len());
        let risk_level = RiskLevel::from_score(risk_score);
        let summary = summarize(
            breaking_changes.len(),
            non_breaking_changes.len(),
            risk_level,
        );

        Self {
            total_changes: breaking_changes.len() + non_breaking_changes.len(),
            breaking_changes,
            non_breaking_changes,
            risk_score,
            risk_level,
            summary,
        }
    }

    /// A report with no changes.
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    pub fn has_breaking_changes(&self) -> bool {
        !self.breaking_changes.is_empty()
    }

    pub fn has_non_breaking_changes(&self) -> bool {
        !self.non_breaking_changes.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.total_changes == 0
    }

    /// Iterates breaking changes first, then non-breaking ones.
    pub fn changes(&self) -> impl Iterator<Item = &Change> {
        self.breaking_changes
            .iter()
            .chain(self.non_breaking_changes.iter())
    }
}

/// `min(100, 15 * breaking + 3 * non_breaking)`.
pub fn risk_score(breaking: usize, non_breaking: usize) -> u32 {
    let score = (breaking as u64) * BREAKING_CHANGE_WEIGHT as u64
        + (non_breaking as u64) * NON_BREAKING_CHANGE_WEIGHT as u64;
    score.min(MAX_RISK_SCORE as u64) as u32
}

fn summarize(breaking: usize, non_breaking: usize, level: RiskLevel) -> String {
    if breaking + non_breaking == 0 {
        return "No changes detected".to_string();
    }

    let mut parts = Vec::with_capacity(2);
    if breaking > 0 {
        parts.push(format!("{} breaking change(s)", breaking));
    }
    if non_breaking > 0 {
        parts.push(format!("{} non-breaking change(s)", non_breaking));
    }

    let mut summary = format!("Detected {}. Risk level: {}.", parts.join(", "), level);
    if breaking > 0 {
        summary.push_str(" This update requires a major version bump.");
    } else {
        summary.push_str(" This update requires a minor version bump.");
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn change(kind: ChangeKind) -> Change {
        Change::new(kind, "f", "changed", "impact")
    }

    #[test]
    fn test_breaking_classification() {
        assert!(ChangeKind::FieldRemoved.is_breaking());
        assert!(ChangeKind::FormatChanged.is_breaking());
        assert!(!ChangeKind::OptionalFieldAdded.is_breaking());
        assert!(!ChangeKind::EnumValuesAdded.is_breaking());
    }

    #[test]
    fn test_risk_score_formula_and_cap() {
        assert_eq!(risk_score(0, 0), 0);
        assert_eq!(risk_score(1, 2), 21);
        assert_eq!(risk_score(6, 4), 100);
        assert_eq!(risk_score(0, 40), 100);
    }

    #[test]
    fn test_risk_level_thresholds() {
        assert_eq!(RiskLevel::from_score(0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(20), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(21), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(50), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(80), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(81), RiskLevel::Critical);
    }

    #[test]
    fn test_empty_report() {
        let report = ChangeReport::empty();
        assert!(report.is_empty());
        assert_eq!(report.risk_score, 0);
        assert_eq!(report.risk_level, RiskLevel::Low);
        assert_eq!(report.summary, "No changes detected");
    }

    #[test]
    fn test_summary_wording() {
        let report = ChangeReport::new(
            vec![change(ChangeKind::FieldRemoved)],
            vec![change(ChangeKind::FieldMadeOptional)],
        );
        assert_eq!(
            report.summary,
            "Detected 1 breaking change(s), 1 non-breaking change(s). Risk level: LOW. \
             This update requires a major version bump."
        );

        let report = ChangeReport::new(vec![], vec![change(ChangeKind::EnumValuesAdded)]);
        assert_eq!(
            report.summary,
            "Detected 1 non-breaking change(s). Risk level: LOW. \
             This update requires a minor version bump."
        );
    }

    #[test]
    fn test_change_json_shape() {
        let change = Change::new(
            ChangeKind::TypeChanged,
            "age",
            "Type changed from integer to string",
            "Existing data may fail type validation",
        )
        .with_values(Some("integer"), Some("string"));

        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "TYPE_CHANGED",
                "field": "age",
                "description": "Type changed from integer to string",
                "old_value": "integer",
                "new_value": "string",
                "impact": "Existing data may fail type validation",
            })
        );
    }

    #[test]
    fn test_report_json_round_trip() {
        let report = ChangeReport::new(vec![change(ChangeKind::TypeChanged)], vec![]);
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"risk_level\":\"LOW\""));
        let back: ChangeReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
