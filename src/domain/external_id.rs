//! External id derivation. The CRM dedups records on this key.
//!
//! The deployed derivation strips `:`, ` ` and `-`, then applies the pattern `.` as a
//! regular expression, which removes every remaining character except `\n`.
//! For ordinary timestamps the id is therefore empty. `Legacy` reproduces that;
//! `Literal` strips only the four separator characters.

use regex::Regex;
use std::sync::LazyLock;

/// Patterns applied in order by the legacy derivation.
static LEGACY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [":", " ", "-", "."]
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
});

const SEPARATORS: &[char] = &[':', ' ', '-', '.'];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExternalIdMode {
    /// `.` treated as a pattern: matches any character but `\n`.
    #[default]
    Legacy,
    /// `.` treated as a literal period.
    Literal,
}

impl ExternalIdMode {
    pub fn derive(self, received_at: &str) -> String {
        match self {
            Self::Legacy => LEGACY_PATTERNS
                .iter()
                .fold(received_at.to_string(), |acc, re| {
                    re.replace_all(&acc, "").into_owned()
                }),
            Self::Literal => received_at.replace(SEPARATORS, ""),
        }
    }

    /// Parse a config value (`legacy` / `literal`). Unknown values yield None.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Some(Self::Legacy),
            "literal" | "literal_period" => Some(Self::Literal),
            _ => None,
        }
    }
}
