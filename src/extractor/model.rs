use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use thiserror::Error;

/// Shown wherever a caller needs text for "the extraction chain ran and
/// nothing cleared the bar". Never produced by a heuristic.
pub const UNAVAILABLE_SENTINEL: &str = "Could not retrieve article text.";

static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t\u{a0}]+").unwrap());
static LINE_PADDING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" *\n *").unwrap());
static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Result of running the whole extraction chain over one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Extraction {
    Accepted {
        heuristic: &'static str,
        text: String,
    },
    Unavailable,
}

impl Extraction {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Accepted { text, .. } => Some(text),
            Self::Unavailable => None,
        }
    }

    /// The extracted text, or [`UNAVAILABLE_SENTINEL`].
    pub fn text_or_sentinel(&self) -> &str {
        match self {
            Self::Accepted { text, .. } => text,
            Self::Unavailable => UNAVAILABLE_SENTINEL,
        }
    }
}

/// Why a single heuristic produced nothing. Always contained by the chain.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractionMiss {
    #[error("no candidate content found")]
    NoContent,

    #[error("parse failure: {0}")]
    Parse(String),

    #[error("output too short ({chars} chars, need more than {min})")]
    TooShort { chars: usize, min: usize },

    #[error("heuristic panicked: {0}")]
    Panicked(String),
}

/// Collapse runs of spaces, trim around newlines and keep at most one blank
/// line between paragraphs.
pub fn normalize_whitespace(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let spaced = SPACES.replace_all(&text, " ");
    let lines = LINE_PADDING.replace_all(&spaced, "\n");
    BLANK_LINES.replace_all(&lines, "\n\n").trim().to_string()
}
