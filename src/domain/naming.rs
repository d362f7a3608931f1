//! Naming rules for command names, aliases and command strings.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::error::DomainError;

/// The default-command marker. A command string is either exactly this marker
/// or this marker followed by a space and positional declarations.
pub const DEFAULT_COMMAND: &str = "$0";

/// A positional argument declared in a command string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionalSpec {
    pub name: String,
    pub required: bool,
    pub variadic: bool,
}

impl PositionalSpec {
    /// Render back to command-string syntax, e.g. `<zone>` or `[records..]`.
    pub fn syntax(&self) -> String {
        let dots = if self.variadic { ".." } else { "" };
        if self.required {
            format!("<{}{}>", self.name, dots)
        } else {
            format!("[{}{}]", self.name, dots)
        }
    }
}

/// Validate a command name or alias.
pub fn validate_name(name: &str) -> Result<(), DomainError> {
    if name.is_empty() {
        return Err(DomainError::EmptyName);
    }
    if name.chars().any(char::is_whitespace) {
        return Err(invalid(name, "must not contain whitespace"));
    }
    if name.contains(DEFAULT_COMMAND) {
        return Err(invalid(name, "must not contain \"$0\""));
    }
    if name.contains(['[', ']', '<', '>']) {
        return Err(invalid(name, "must not contain brackets"));
    }
    Ok(())
}

fn invalid(name: &str, reason: &'static str) -> DomainError {
    DomainError::InvalidName {
        name: name.to_string(),
        reason,
    }
}

/// Validate a command string and extract its positional declarations.
///
/// Accepts `$0` or `$0 <required> [optional] [rest..]`. Anything else is a
/// naming-invariant violation.
pub fn parse_command(command: &str) -> Result<Vec<PositionalSpec>, DomainError> {
    if command == DEFAULT_COMMAND {
        return Ok(Vec::new());
    }
    let Some(rest) = command.strip_prefix("$0 ") else {
        return Err(DomainError::InvalidCommand(command.to_string()));
    };

    let mut positionals = Vec::new();
    for token in rest.split_whitespace() {
        let caps = positional_regex()
            .captures(token)
            .ok_or_else(|| DomainError::InvalidPositional {
                command: command.to_string(),
                token: token.to_string(),
            })?;
        let open = &caps["open"];
        let close = &caps["close"];
        let required = match (open, close) {
            ("<", ">") => true,
            ("[", "]") => false,
            _ => {
                return Err(DomainError::InvalidPositional {
                    command: command.to_string(),
                    token: token.to_string(),
                })
            }
        };
        positionals.push(PositionalSpec {
            name: caps["name"].to_string(),
            required,
            variadic: caps.name("dots").is_some(),
        });
    }

    if let Some(pos) = positionals.iter().position(|p| p.variadic) {
        if pos + 1 != positionals.len() {
            return Err(DomainError::InvalidPositional {
                command: command.to_string(),
                token: positionals[pos].syntax(),
            });
        }
    }

    Ok(positionals)
}

fn positional_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<open>[<\[])(?P<name>[A-Za-z0-9_-]+)(?P<dots>\.\.)?(?P<close>[>\]])$")
            .expect("positional pattern is valid")
    })
}

/// Trim and capitalize the first character of help text.
pub fn capitalize_first(text: &str) -> String {
    let trimmed = text.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
