//! Compiled regular expressions for string constraints.

use contracts_core::{ContractSchema, FieldDefinition, FieldKind, StringFormat};
use regex::Regex;
use std::collections::HashMap;
use tracing::error;

/// Regexes compiled once per contract and shared by every record check.
///
/// Contract patterns are keyed by their source text and anchored at the
/// start of the value only, so `^usr_` and `usr_` behave the same and a
/// trailing suffix is accepted unless the pattern ends in `$`.
#[derive(Debug, Clone)]
pub struct PatternTable {
    patterns: HashMap<String, Regex>,
    formats: HashMap<StringFormat, Regex>,
}

impl PatternTable {
    /// Compiles the four format regexes and every pattern declared anywhere
    /// in the schema, nested definitions included.
    pub fn for_schema(schema: &ContractSchema) -> Self {
        let mut table = Self {
            patterns: HashMap::new(),
            formats: HashMap::new(),
        };

        for format in StringFormat::ALL {
            match Regex::new(&format!("(?i){}", format.pattern())) {
                Ok(regex) => {
                    table.formats.insert(format, regex);
                }
                Err(e) => error!("Invalid {} format regex: {}", format, e),
            }
        }

        for (name, field) in &schema.schema {
            table.collect(name, field);
        }
        table
    }

    fn collect(&mut self, path: &str, field: &FieldDefinition) {
        match &field.kind {
            FieldKind::String(rules) => {
                if let Some(pattern) = &rules.pattern {
                    if self.patterns.contains_key(pattern) {
                        return;
                    }
                    match Regex::new(&format!("^(?:{})", pattern)) {
                        Ok(regex) => {
                            self.patterns.insert(pattern.clone(), regex);
                        }
                        Err(e) => error!("Invalid regex pattern for {}: {}", path, e),
                    }
                }
            }
            FieldKind::Array(rules) => self.collect(&format!("{}[]", path), &rules.items),
            FieldKind::Object(rules) => {
                for (name, property) in &rules.properties {
                    self.collect(&format!("{}.{}", path, name), property);
                }
            }
            _ => {}
        }
    }

    /// Returns whether `value` matches `pattern`. Patterns that failed to
    /// compile never reject a value.
    pub fn matches_pattern(&self, pattern: &str, value: &str) -> bool {
        self.patterns
            .get(pattern)
            .is_none_or(|regex| regex.is_match(value))
    }

    /// Returns whether `value` satisfies `format`, ignoring case.
    pub fn matches_format(&self, format: StringFormat, value: &str) -> bool {
        self.formats
            .get(&format)
            .is_none_or(|regex| regex.is_match(value))
    }

    /// Number of distinct contract patterns compiled.
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }
}
