//! Text predicates shared by rules, best-practice patterns and challenge
//! requirements.
//!
//! A `Check` is data, not a closure: it can be cloned, debugged and listed,
//! and two code paths that hold the same `Check` cannot disagree about it.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{GuardError, Result};

#[derive(Debug, Clone)]
pub enum Check {
    /// Text contains the literal substring.
    Contains(String),
    /// Text matches the regular expression.
    Matches(Regex),
    Not(Box<Check>),
    All(Vec<Check>),
    Any(Vec<Check>),
    /// Text carries the structural markers of a YAML or HCL document and
    /// its brackets balance.
    WellFormed,
    /// Whitespace-insensitive edit distance from `original` exceeds
    /// `min_changes`.
    EditedFrom { original: String, min_changes: usize },
}

impl Check {
    pub fn contains(needle: impl Into<String>) -> Self {
        Self::Contains(needle.into())
    }

    /// Holds when the substring is absent.
    pub fn missing(needle: impl Into<String>) -> Self {
        Self::not(Self::contains(needle))
    }

    /// Compile a user-supplied pattern.
    pub fn pattern(pattern: &str) -> Result<Self> {
        Ok(Self::Matches(Regex::new(pattern)?))
    }

    /// Compile a built-in pattern literal. Panics on an invalid pattern.
    pub(crate) fn builtin(pattern: &str) -> Self {
        match Regex::new(pattern) {
            Ok(re) => Self::Matches(re),
            Err(e) => panic!("invalid built-in pattern {pattern:?}: {e}"),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(check: Check) -> Self {
        Self::Not(Box::new(check))
    }

    pub fn edited_from(original: impl Into<String>, min_changes: usize) -> Self {
        Self::EditedFrom {
            original: original.into(),
            min_changes,
        }
    }

    /// Evaluate against `text`. Total over all inputs.
    pub fn holds(&self, text: &str) -> bool {
        match self {
            Self::Contains(needle) => text.contains(needle.as_str()),
            Self::Matches(re) => re.is_match(text),
            Self::Not(inner) => !inner.holds(text),
            Self::All(checks) => checks.iter().all(|c| c.holds(text)),
            Self::Any(checks) => checks.iter().any(|c| c.holds(text)),
            Self::WellFormed => is_well_formed(text),
            Self::EditedFrom {
                original,
                min_changes,
            } => edit_distance_exceeds(original, text, *min_changes),
        }
    }
}

/// Validate a user-supplied rule pattern, tagging errors with the rule id.
pub fn compile_rule_pattern(rule_id: &str, pattern: &str) -> Result<Check> {
    Check::pattern(pattern).map_err(|e| GuardError::Rule {
        rule_id: rule_id.into(),
        message: e.to_string(),
    })
}

static YAML_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*(- )?[A-Za-z_][A-Za-z0-9_.-]*:([ \t]|$)").unwrap());

static HCL_BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^[ \t]*[A-Za-z_][A-Za-z0-9_-]*([ \t]+"[^"\n]*")*[ \t]*\{"#).unwrap()
});

fn is_well_formed(text: &str) -> bool {
    if text.trim().is_empty() {
        return false;
    }
    brackets_balance(text) && (YAML_KEY_RE.is_match(text) || HCL_BLOCK_RE.is_match(text))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Scan {
    Code,
    DoubleQuoted { escaped: bool },
    SingleQuoted,
    Comment,
}

/// Brackets outside string literals and `#` comments pair up. Strings and
/// comments never span lines in either format.
fn brackets_balance(text: &str) -> bool {
    let mut stack = Vec::new();
    let mut state = Scan::Code;
    let mut prev = '\n';

    for ch in text.chars() {
        state = match state {
            _ if ch == '\n' => Scan::Code,
            Scan::DoubleQuoted { escaped: true } => Scan::DoubleQuoted { escaped: false },
            Scan::DoubleQuoted { .. } => match ch {
                '\\' => Scan::DoubleQuoted { escaped: true },
                '"' => Scan::Code,
                _ => state,
            },
            Scan::SingleQuoted if ch == '\'' => Scan::Code,
            Scan::SingleQuoted | Scan::Comment => state,
            Scan::Code => match ch {
                '"' => Scan::DoubleQuoted { escaped: false },
                // A quote or hash inside a word (`it's`, `a#b`) is plain text.
                '\'' if opens_token(prev) => Scan::SingleQuoted,
                '#' if prev.is_whitespace() => Scan::Comment,
                '{' | '[' | '(' => {
                    stack.push(ch);
                    state
                }
                '}' | ']' | ')' => {
                    let open = match ch {
                        '}' => '{',
                        ']' => '[',
                        _ => '(',
                    };
                    if stack.pop() != Some(open) {
                        return false;
                    }
                    state
                }
                _ => state,
            },
        };
        prev = ch;
    }

    stack.is_empty()
}

fn opens_token(prev: char) -> bool {
    prev.is_whitespace() || matches!(prev, ':' | '[' | '{' | ',' | '=' | '(')
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn edit_distance_exceeds(original: &str, text: &str, min_changes: usize) -> bool {
    let a = collapse_whitespace(original);
    let b = collapse_whitespace(text);

    // Length difference is a lower bound on the distance.
    let len_diff = a.chars().count().abs_diff(b.chars().count());
    if len_diff > min_changes {
        return true;
    }
    levenshtein::levenshtein(&a, &b) > min_changes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_and_missing_are_complements() {
        let text = "server_side_encryption_configuration {}";
        assert!(Check::contains("encryption").holds(text));
        assert!(!Check::missing("encryption").holds(text));
        assert!(Check::missing("encryption").holds(""));
    }

    #[test]
    fn composition() {
        let check = Check::All(vec![
            Check::contains("Allow"),
            Check::not(Check::builtin(r"(?i)condition")),
        ]);
        assert!(check.holds(r#"{"Effect": "Allow"}"#));
        assert!(!check.holds(r#"{"Effect": "Allow", "Condition": {}}"#));
        assert!(!check.holds(""));

        let any = Check::Any(vec![Check::contains("a"), Check::contains("b")]);
        assert!(any.holds("b"));
        assert!(!any.holds("c"));
    }

    #[test]
    fn user_pattern_errors_carry_rule_id() {
        let err = compile_rule_pattern("CUSTOM-1", "(unclosed").unwrap_err();
        assert!(err.to_string().contains("CUSTOM-1"));
    }

    #[test]
    fn well_formed_yaml_and_hcl() {
        assert!(Check::WellFormed.holds("kind: ConfigMap\ndata:\n  key: value\n"));
        assert!(Check::WellFormed.holds("resource \"aws_s3_bucket\" \"b\" {\n  bucket = \"b\"\n}\n"));
        assert!(!Check::WellFormed.holds("resource \"aws_s3_bucket\" \"b\" {\n"));
        assert!(!Check::WellFormed.holds("   \n"));
        assert!(!Check::WellFormed.holds("no structure here"));
    }

    #[test]
    fn brackets_inside_strings_are_ignored() {
        assert!(brackets_balance(r#"name = "a{b""#));
        assert!(!brackets_balance("a = ]"));
        assert!(brackets_balance("pattern: '[a-z'\nnext: ok\n"));
        assert!(brackets_balance("note: it's (fine)\n"));
    }

    #[test]
    fn brackets_inside_comments_are_ignored() {
        let text = "data:\n  # retries (default 3\n  retries: \"5\"\n";
        assert!(brackets_balance(text));
        assert!(Check::WellFormed.holds(text));
        assert!(brackets_balance("tags = { # owner {\n  team = \"x\"\n}\n"));
        assert!(!brackets_balance("url: a#(b\n"));
    }

    #[test]
    fn edit_distance_ignores_whitespace_only_changes() {
        let original = "kind: ConfigMap\ndata:\n  key: value\n";
        let reindented = "kind:   ConfigMap\n\n\ndata:\n      key:    value\n";
        assert!(!Check::edited_from(original, 10).holds(reindented));
        let rewritten = "kind: ConfigMap\ndata:\n  log_level: info\n  retries: 3\n";
        assert!(Check::edited_from(original, 10).holds(rewritten));
    }
}
