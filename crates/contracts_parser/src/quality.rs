//! Quality rules parsing.

use contracts_core::QualityRules;
use serde_yaml_ng::Value;

use crate::{ParserError, Result};

/// Parses and checks a `quality_rules` block.
///
/// Callers parsing a whole contract downgrade any error returned here to a
/// warning and drop the block.
///
/// # Example
///
/// ```rust
/// use contracts_parser::validate_quality_rules;
///
/// let block: serde_yaml_ng::Value =
///     serde_yaml_ng::from_str("{ freshness: { max_latency_hours: 0 } }").unwrap();
/// assert!(validate_quality_rules(&block).is_err());
/// ```
pub fn validate_quality_rules(value: &Value) -> Result<QualityRules> {
    if !value.is_mapping() {
        return Err(ParserError::invalid(
            "quality_rules",
            "quality rules must be a mapping",
        ));
    }

    let rules: QualityRules = serde_yaml_ng::from_value(value.clone())
        .map_err(|e| ParserError::invalid("quality_rules", e.to_string()))?;
    rules.validate()?;
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(text: &str) -> Result<QualityRules> {
        validate_quality_rules(&serde_yaml_ng::from_str::<Value>(text).unwrap())
    }

    #[test]
    fn test_valid_rules() {
        let parsed = rules(
            r#"
freshness: { max_latency_hours: 24 }
completeness: { min_row_count: 1 }
uniqueness: { fields: [order_id] }
"#,
        )
        .unwrap();
        assert_eq!(parsed.freshness.unwrap().max_latency_hours, 24.0);
        assert_eq!(parsed.completeness.unwrap().max_null_percentage, None);
    }

    #[test]
    fn test_structural_problems() {
        assert!(rules("freshness: {}").is_err());
        assert!(rules("freshness: { max_latency_hours: soon }").is_err());
        assert!(rules("completeness: { min_row_count: -1 }").is_err());
        assert!(rules("completeness: { max_null_percentage: 101 }").is_err());
        assert!(rules("uniqueness: { fields: [] }").is_err());
        assert!(rules("uniqueness: {}").is_err());
        assert!(rules("statistics: { amount: 5 }").is_err());
        assert!(rules("[1, 2]").is_err());
    }

    #[test]
    fn test_error_names_quality_rules() {
        let err = rules("freshness: { max_latency_hours: -1 }").unwrap_err();
        assert!(matches!(
            err,
            ParserError::InvalidSchema { ref field, .. } if field == "quality_rules"
        ));
    }
}
