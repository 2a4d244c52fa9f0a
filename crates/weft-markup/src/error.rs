// SPDX-License-Identifier: MIT
//
// Markup errors. Every variant carries the byte offset of the token that
// caused it; a failed parse produces no partial output.

use std::fmt;

use weft_term::style::StyleError;

/// Which way the tag stack was out of balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Imbalance {
    /// A `[/]` with nothing open.
    NoMatchingOpen,
    /// Input ended with tags still open.
    Unclosed,
}

impl fmt::Display for Imbalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoMatchingOpen => "closing tag has no matching open tag",
            Self::Unclosed => "tag was never closed",
        })
    }
}

/// A markup string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkupError {
    #[error("unescaped ']' at position {position}")]
    UnescapedBracket { position: usize },

    #[error("malformed markup tag at position {position}")]
    MalformedTag { position: usize },

    #[error("unbalanced markup at position {position}: {imbalance}")]
    UnbalancedTags {
        position: usize,
        imbalance: Imbalance,
    },

    #[error("invalid style in tag at position {position}")]
    Style {
        position: usize,
        #[source]
        source: StyleError,
    },
}

impl MarkupError {
    /// Byte offset in the markup string.
    #[must_use]
    pub const fn position(&self) -> usize {
        match self {
            Self::UnescapedBracket { position }
            | Self::MalformedTag { position }
            | Self::UnbalancedTags { position, .. }
            | Self::Style { position, .. } => *position,
        }
    }
}
