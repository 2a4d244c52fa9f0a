// SPDX-License-Identifier: MIT
//
// weft-markup: inline styling for plain strings.
//
//   "[bold red]error:[/] [link=https://example.com]details[/]"
//
// `[style]` opens a tag using the style-spec grammar of `weft_term::style`,
// `[/]` closes the innermost one, and `[[` / `]]` are literal brackets.
// Parsing yields a `Text`: runs of text, each with its effective style,
// ready to paint into a render context.

pub mod error;
pub mod parser;
pub mod text;
pub mod tokenizer;

pub use error::{Imbalance, MarkupError};
pub use parser::parse_markup;
pub use text::{Run, Text};

use weft_term::style::Style;

/// Parse markup with no base style.
///
/// # Errors
///
/// See [`parse_markup`].
pub fn parse(markup: &str) -> Result<Text, MarkupError> {
    Text::from_markup(markup, Style::PLAIN)
}
