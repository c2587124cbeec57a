use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::{ExecError, Result};

/// Invocation token of the wrapped CLI.
pub const CLI_TOKEN: &str = "m365";

/// A command execution request: either a free-form command line or a
/// structured name + option bag.
#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
#[serde(untagged)]
pub enum ExecutionRequest {
    /// Full command line, e.g. `"spo site get --url https://x"`.
    Line(String),
    /// Catalog command name plus option values. A `null` value means the
    /// option is unset and it is omitted from the command line.
    Invocation {
        name: String,
        #[serde(default)]
        args: BTreeMap<String, Option<OptionValue>>,
    },
}

/// Closed scalar set for structured option values.
#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Number(f64),
    String(String),
}

impl OptionValue {
    fn render(&self) -> String {
        match self {
            Self::Bool(value) => value.to_string(),
            Self::Number(value) => {
                if value.fract() == 0.0 {
                    format!("{}", *value as i64)
                } else {
                    value.to_string()
                }
            }
            Self::String(value) => value.clone(),
        }
    }
}

impl ExecutionRequest {
    /// Render the request into the command line handed to the shell.
    ///
    /// Structured form: hyphens in the catalog name are restored to spaces
    /// and every present option is appended as `--name "value"` in sorted
    /// order. Raw lines are passed through; both forms get the `m365` token
    /// prepended when it is not already the leading token.
    pub fn to_command_line(&self) -> Result<String> {
        match self {
            Self::Line(line) => {
                let line = line.trim();
                if line.is_empty() {
                    return Err(ExecError::InvalidRequest(vec![
                        "command line must not be empty".to_string(),
                    ]));
                }
                Ok(with_cli_token(line))
            }
            Self::Invocation { name, args } => {
                let violations = validate(name, args);
                if !violations.is_empty() {
                    return Err(ExecError::InvalidRequest(violations));
                }

                let mut line = format!("{CLI_TOKEN} {}", name.replace('-', " "));
                for (option, value) in args {
                    let Some(value) = value else { continue };
                    line.push_str(&format!(" --{option} \"{}\"", value.render()));
                }
                Ok(line)
            }
        }
    }
}

fn with_cli_token(line: &str) -> String {
    if line.split_whitespace().next() == Some(CLI_TOKEN) {
        line.to_string()
    } else {
        format!("{CLI_TOKEN} {line}")
    }
}

fn validate(name: &str, args: &BTreeMap<String, Option<OptionValue>>) -> Vec<String> {
    let mut violations = Vec::new();
    if name.trim().is_empty() {
        violations.push("command name must not be empty".to_string());
    } else if name.contains(char::is_whitespace) {
        violations.push(format!(
            "command name '{name}' must not contain whitespace; use the hyphen-joined catalog name"
        ));
    }
    for option in args.keys() {
        if option.is_empty() {
            violations.push("option names must not be empty".to_string());
        } else if option.starts_with('-') {
            violations.push(format!("option '{option}' must not start with a dash"));
        } else if option.contains(char::is_whitespace) {
            violations.push(format!("option '{option}' must not contain whitespace"));
        }
    }
    violations
}
