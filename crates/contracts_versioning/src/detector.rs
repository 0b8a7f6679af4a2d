//! Schema change detection.
//!
//! Compares two contract schemas field by field and classifies every
//! difference as breaking or non-breaking for consumers of the data.

use contracts_core::{
    Bound, Change, ChangeKind, ChangeReport, ContractSchema, FieldDefinition, FieldKind, Literal,
    literals_within,
};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::Display;
use tracing::info;

/// Detects changes between two versions of a contract schema.
///
/// # Example
///
/// ```rust
/// use contracts_core::{ContractSchemaBuilder, FieldBuilder, ChangeKind};
/// use contracts_versioning::ChangeDetector;
///
/// let old = ContractSchemaBuilder::new("1.0")
///     .field("id", FieldBuilder::string().build())
///     .field("email", FieldBuilder::string().build())
///     .build()
///     .unwrap();
/// let new = ContractSchemaBuilder::new("1.1")
///     .field("id", FieldBuilder::string().build())
///     .build()
///     .unwrap();
///
/// let report = ChangeDetector::new().detect_changes(&old, &new);
/// assert_eq!(report.breaking_changes[0].kind, ChangeKind::FieldRemoved);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeDetector;

#[derive(Default)]
struct Changes {
    breaking: Vec<Change>,
    non_breaking: Vec<Change>,
}

impl Changes {
    fn push(&mut self, change: Change) {
        if change.is_breaking() {
            self.breaking.push(change);
        } else {
            self.non_breaking.push(change);
        }
    }
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self
    }

    /// Diffs `old` against `new`.
    ///
    /// Removed fields come first, then added fields, then changes to fields
    /// present in both, each group in field-name order.
    pub fn detect_changes(&self, old: &ContractSchema, new: &ContractSchema) -> ChangeReport {
        info!("Detecting changes between schemas");

        let mut changes = Changes::default();
        compare_fields(None, &old.schema, &new.schema, &mut changes);
        let report = ChangeReport::new(changes.breaking, changes.non_breaking);

        info!(
            "Change detection complete: {} breaking, {} non-breaking, risk: {}",
            report.breaking_changes.len(),
            report.non_breaking_changes.len(),
            report.risk_level
        );
        report
    }
}

fn child_path(parent: Option<&str>, name: &str) -> String {
    match parent {
        Some(parent) => format!("{}.{}", parent, name),
        None => name.to_string(),
    }
}

fn compare_fields(
    parent: Option<&str>,
    old: &BTreeMap<String, FieldDefinition>,
    new: &BTreeMap<String, FieldDefinition>,
    changes: &mut Changes,
) {
    for (name, field) in old.iter().filter(|(name, _)| !new.contains_key(*name)) {
        let path = child_path(parent, name);
        changes.push(
            Change::new(
                ChangeKind::FieldRemoved,
                &path,
                format!("Field '{}' was removed", path),
                "Consumers reading this field will fail",
            )
            .with_values(Some(field.field_type()), None::<&str>),
        );
    }

    for (name, field) in new.iter().filter(|(name, _)| !old.contains_key(*name)) {
        let path = child_path(parent, name);
        let change = if field.required {
            Change::new(
                ChangeKind::RequiredFieldAdded,
                &path,
                format!("Required field '{}' was added", path),
                "Existing data missing this field will fail validation",
            )
        } else {
            Change::new(
                ChangeKind::OptionalFieldAdded,
                &path,
                format!("Optional field '{}' was added", path),
                "No impact on existing consumers",
            )
        };
        changes.push(change.with_values(None::<&str>, Some(field.field_type())));
    }

    for (name, old_field) in old {
        if let Some(new_field) = new.get(name) {
            compare_field(&child_path(parent, name), old_field, new_field, changes);
        }
    }
}

fn compare_field(path: &str, old: &FieldDefinition, new: &FieldDefinition, changes: &mut Changes) {
    let (old_type, new_type) = (old.field_type(), new.field_type());
    if old_type != new_type {
        changes.push(
            Change::new(
                ChangeKind::TypeChanged,
                path,
                format!("Type changed from {} to {}", old_type, new_type),
                "Existing data may fail type validation",
            )
            .with_values(Some(old_type), Some(new_type)),
        );
    }

    match (old.required, new.required) {
        (false, true) => changes.push(
            Change::new(
                ChangeKind::FieldMadeRequired,
                path,
                format!("Field '{}' made required", path),
                "Data missing this field will fail validation",
            )
            .with_values(Some(false), Some(true)),
        ),
        (true, false) => changes.push(
            Change::new(
                ChangeKind::FieldMadeOptional,
                path,
                format!("Field '{}' made optional", path),
                "No impact - more permissive",
            )
            .with_values(Some(true), Some(false)),
        ),
        _ => {}
    }

    compare_patterns(path, old.pattern(), new.pattern(), changes);
    compare_ranges(path, old, new, changes);

    let (old_format, new_format) = (old.format(), new.format());
    if old_format != new_format {
        changes.push(
            Change::new(
                ChangeKind::FormatChanged,
                path,
                format!(
                    "Format changed from {} to {}",
                    display_or_none(old_format),
                    display_or_none(new_format)
                ),
                "Values valid in old format may fail",
            )
            .with_values(old_format, new_format),
        );
    }

    compare_enums(path, old.enum_values(), new.enum_values(), changes);

    match (&old.kind, &new.kind) {
        (FieldKind::Object(old_rules), FieldKind::Object(new_rules)) => {
            compare_fields(Some(path), &old_rules.properties, &new_rules.properties, changes)
        }
        (FieldKind::Array(old_rules), FieldKind::Array(new_rules)) => compare_field(
            &format!("{}[]", path),
            &old_rules.items,
            &new_rules.items,
            changes,
        ),
        _ => {}
    }
}

/// A longer pattern is assumed to accept fewer values.
fn compare_patterns(path: &str, old: Option<&str>, new: Option<&str>, changes: &mut Changes) {
    if old == new {
        return;
    }

    let stricter = match (old, new) {
        (None, Some(_)) => true,
        (Some(old), Some(new)) => new.len() > old.len(),
        _ => false,
    };

    let change = if stricter {
        Change::new(
            ChangeKind::PatternStricter,
            path,
            "Pattern made stricter",
            "Some previously valid values may fail",
        )
    } else {
        Change::new(
            ChangeKind::PatternRelaxed,
            path,
            "Pattern made more permissive",
            "More values will pass validation",
        )
    };
    changes.push(change.with_values(old, new));
}

fn compare_ranges(path: &str, old: &FieldDefinition, new: &FieldDefinition, changes: &mut Changes) {
    let (old_min, old_max) = (old.min(), old.max());
    let (new_min, new_max) = (new.min(), new.max());

    // Bounds of different kinds cannot be ordered and count as tightened.
    let min_tighter = new_min.as_ref().is_some_and(|new_min| {
        old_min.as_ref().is_none_or(|old_min| {
            !matches!(new_min.compare(old_min), Some(Ordering::Less | Ordering::Equal))
        })
    });
    let max_tighter = new_max.as_ref().is_some_and(|new_max| {
        old_max.as_ref().is_none_or(|old_max| {
            !matches!(new_max.compare(old_max), Some(Ordering::Greater | Ordering::Equal))
        })
    });

    let min_relaxed = old_min.as_ref().is_some_and(|old_min| {
        new_min
            .as_ref()
            .is_none_or(|new_min| new_min.compare(old_min) == Some(Ordering::Less))
    });
    let max_relaxed = old_max.as_ref().is_some_and(|old_max| {
        new_max
            .as_ref()
            .is_none_or(|new_max| new_max.compare(old_max) == Some(Ordering::Greater))
    });

    let change = if min_tighter || max_tighter {
        Change::new(
            ChangeKind::ConstraintTightened,
            path,
            "Range constraints tightened",
            "Values outside new range will fail",
        )
    } else if min_relaxed || max_relaxed {
        Change::new(
            ChangeKind::ConstraintRelaxed,
            path,
            "Range constraints relaxed",
            "More values will pass validation",
        )
    } else {
        return;
    };

    changes.push(change.with_values(
        Some(range_text(&old_min, &old_max)),
        Some(range_text(&new_min, &new_max)),
    ));
}

fn range_text(min: &Option<Bound>, max: &Option<Bound>) -> String {
    format!("{{\"min\": {}, \"max\": {}}}", bound_text(min), bound_text(max))
}

fn bound_text(bound: &Option<Bound>) -> String {
    match bound {
        None => "null".to_string(),
        Some(Bound::Number(n)) => n.to_string(),
        Some(Bound::Temporal(t)) => format!("\"{}\"", t.raw()),
    }
}

/// Only strict subsets and supersets are reported; a replaced or dropped
/// list records nothing.
fn compare_enums(
    path: &str,
    old: Option<&[Literal]>,
    new: Option<&[Literal]>,
    changes: &mut Changes,
) {
    let Some(new_values) = new else {
        return;
    };
    let old_values = old.unwrap_or(&[]);

    let new_within_old = literals_within(new_values, old_values);
    let old_within_new = literals_within(old_values, new_values);

    let change = match (new_within_old, old_within_new) {
        (true, false) => Change::new(
            ChangeKind::EnumValuesRemoved,
            path,
            "Enum values restricted",
            "Some previously valid values no longer allowed",
        ),
        (false, true) => Change::new(
            ChangeKind::EnumValuesAdded,
            path,
            "Enum values expanded",
            "More values now allowed",
        ),
        _ => return,
    };

    changes.push(change.with_values(old.map(literal_list), Some(literal_list(new_values))));
}

fn literal_list(values: &[Literal]) -> String {
    serde_json::to_string(values).unwrap_or_default()
}

fn display_or_none(value: Option<impl Display>) -> String {
    value.map_or_else(|| "none".to_string(), |v| v.to_string())
}
