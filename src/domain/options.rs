//! Option declarations for a command's flags.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Value type of a flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Boolean,
    #[default]
    String,
    Number,
    Array,
    Count,
}

/// Declaration of one `--flag`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptionSpec {
    #[serde(rename = "type")]
    pub kind: OptionKind,
    /// Alternative spellings; single characters become short flags (`-z`)
    pub alias: Vec<String>,
    pub description: Option<String>,
    pub default: Option<Value>,
    pub required: bool,
    /// Allowed values (string options only)
    pub choices: Vec<String>,
    pub hidden: bool,
}

impl OptionSpec {
    pub fn new(kind: OptionKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias.push(alias.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the flag consumes a value (`--zone example.com`).
    pub fn takes_value(&self) -> bool {
        matches!(
            self.kind,
            OptionKind::String | OptionKind::Number | OptionKind::Array
        )
    }

    /// Whether `flag` (without leading dashes) spells this option.
    pub fn matches_long(&self, name: &str, flag: &str) -> bool {
        name == flag || self.alias.iter().any(|a| a.chars().count() > 1 && a == flag)
    }

    /// Single-character aliases.
    pub fn shorts(&self) -> impl Iterator<Item = char> + '_ {
        self.alias.iter().filter_map(|a| {
            let mut chars = a.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(c),
                _ => None,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_spec_deserializes_from_toml() {
        let spec: OptionSpec = toml::from_str(
            r#"
type = "number"
alias = ["t", "ttl-seconds"]
default = 300
"#,
        )
        .unwrap();
        assert_eq!(spec.kind, OptionKind::Number);
        assert_eq!(spec.shorts().collect::<Vec<_>>(), vec!['t']);
        assert!(spec.matches_long("ttl", "ttl-seconds"));
        assert!(!spec.matches_long("ttl", "t"));
        assert!(spec.takes_value());
    }

    #[test]
    fn test_flags_take_no_value() {
        assert!(!OptionSpec::new(OptionKind::Boolean).takes_value());
        assert!(!OptionSpec::new(OptionKind::Count).takes_value());
        assert!(OptionSpec::new(OptionKind::Array).takes_value());
    }
}
