use once_cell::sync::Lazy;
use regex::Regex;

// An explicit `--output` flag: followed by `=`, whitespace or end of line,
// so option names merely prefixed with "output" (`--output-file`) don't match.
static OUTPUT_FLAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"--output(?:=|\s|$)").unwrap());
static JSON_OUTPUT: Lazy<Regex> = Lazy::new(|| Regex::new(r"--output(?:=|\s+)json\b").unwrap());

/// Output encoding decision for one command line.
///
/// List-style results are typically large, so list operations default to the
/// compact CSV encoding; everything else defaults to JSON, which the consumer
/// can manipulate further.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputPolicy {
    /// No explicit flag, list operation: default to `--output csv`.
    DefaultCsv,
    /// No explicit flag: default to `--output json`, post-process the result.
    DefaultJson,
    /// Explicit JSON flag already present: post-process only.
    ExplicitJson,
    /// Some other explicit output flag: leave the result untouched.
    Explicit,
}

impl OutputPolicy {
    /// Classify a command line. Pure; the line is not modified.
    pub fn detect(command: &str) -> Self {
        if OUTPUT_FLAG.is_match(command) {
            if JSON_OUTPUT.is_match(command) {
                Self::ExplicitJson
            } else {
                Self::Explicit
            }
        } else if is_list_operation(command) {
            Self::DefaultCsv
        } else {
            Self::DefaultJson
        }
    }

    /// Render the effective command line. Lines that already carry an output
    /// flag are returned unchanged.
    pub fn apply(self, command: &str) -> String {
        match self {
            Self::DefaultCsv => format!("{command} --output csv"),
            Self::DefaultJson => format!("{command} --output json"),
            Self::ExplicitJson | Self::Explicit => command.to_string(),
        }
    }

    /// Whether the result should be JSON-minimized.
    pub fn wants_json(self) -> bool {
        matches!(self, Self::DefaultJson | Self::ExplicitJson)
    }
}

// A command is a list operation when its non-flag portion ends with "list".
fn is_list_operation(command: &str) -> bool {
    command
        .split_whitespace()
        .take_while(|token| !token.starts_with("--"))
        .last()
        .is_some_and(|token| token == "list")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn list_operations_default_to_csv() {
        let policy = OutputPolicy::detect("m365 spo list list --webUrl https://x");
        assert_eq!(policy, OutputPolicy::DefaultCsv);
        assert_eq!(
            policy.apply("m365 spo list list --webUrl https://x"),
            "m365 spo list list --webUrl https://x --output csv"
        );
        assert!(!policy.wants_json());
    }

    #[test]
    fn other_operations_default_to_json() {
        let policy = OutputPolicy::detect("m365 spo site get --url https://x");
        assert_eq!(policy, OutputPolicy::DefaultJson);
        assert_eq!(
            policy.apply("m365 spo site get --url https://x"),
            "m365 spo site get --url https://x --output json"
        );
        assert!(policy.wants_json());
    }

    #[test]
    fn explicit_output_flag_is_never_rewritten() {
        for line in [
            "m365 spo list list --output text",
            "m365 spo list list --output=md",
            "m365 spo site get --output",
        ] {
            let policy = OutputPolicy::detect(line);
            assert_eq!(policy, OutputPolicy::Explicit);
            assert_eq!(policy.apply(line), line);
            assert!(!policy.wants_json());
        }
    }

    #[test]
    fn explicit_json_keeps_post_processing() {
        for line in [
            "m365 spo site get --output json",
            "m365 spo site get --output=json",
        ] {
            let policy = OutputPolicy::detect(line);
            assert_eq!(policy, OutputPolicy::ExplicitJson);
            assert_eq!(policy.apply(line), line);
            assert!(policy.wants_json());
        }
    }

    #[test]
    fn output_prefixed_options_are_not_output_flags() {
        let policy = OutputPolicy::detect("m365 spo file get --output-file report.csv");
        assert_eq!(policy, OutputPolicy::DefaultJson);
    }

    #[test]
    fn list_token_inside_flags_is_not_a_list_operation() {
        // the non-flag portion ends with "get", not "list"
        let policy = OutputPolicy::detect("m365 spo site get --title list");
        assert_eq!(policy, OutputPolicy::DefaultJson);
    }
}
