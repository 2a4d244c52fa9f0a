// SPDX-License-Identifier: MIT
//
// Markup parser: tokens in, styled runs out.
//
// Open tags push a style onto a stack, `[/]` pops one, and each text token
// becomes a run styled by the base style combined with the whole stack,
// outermost first. A `link=` segment is split off the tag before style
// parsing and applies to every run inside the tag; the innermost link wins.

use tracing::trace;
use weft_term::style::{Style, parse_style};

use crate::error::{Imbalance, MarkupError};
use crate::text::{Run, Text};
use crate::tokenizer::{TokenKind, Tokenizer};

/// One open tag.
struct Frame {
    style: Style,
    link: Option<String>,
    position: usize,
}

/// Parse `markup` on top of `base`.
///
/// # Errors
///
/// Any tokenizer error, a tag whose style doesn't parse, a `[/]` with no
/// open tag, or input that ends with tags still open.
pub fn parse_markup(markup: &str, base: Style) -> Result<Text, MarkupError> {
    let mut text = Text::new();
    let mut stack: Vec<Frame> = Vec::new();

    for token in Tokenizer::new(markup) {
        let token = token?;
        match token.kind {
            TokenKind::Open(body) => {
                let (spec, link) = split_link(&body);
                let style = parse_style(&spec).map_err(|source| MarkupError::Style {
                    position: token.position,
                    source,
                })?;
                stack.push(Frame {
                    style,
                    link,
                    position: token.position,
                });
            }
            TokenKind::Close => {
                if stack.pop().is_none() {
                    return Err(MarkupError::UnbalancedTags {
                        position: token.position,
                        imbalance: Imbalance::NoMatchingOpen,
                    });
                }
            }
            TokenKind::Text(content) => {
                let style = base.combine_all(stack.iter().map(|frame| frame.style));
                let link = stack.iter().rev().find_map(|frame| frame.link.clone());
                text.push(Run {
                    text: content,
                    style,
                    link,
                });
            }
        }
    }

    if let Some(innermost) = stack.last() {
        return Err(MarkupError::UnbalancedTags {
            position: innermost.position,
            imbalance: Imbalance::Unclosed,
        });
    }

    trace!(bytes = markup.len(), runs = text.runs().len(), "markup parsed");
    Ok(text)
}

/// Separate `link=` segments from the style spec. The last link wins.
fn split_link(body: &str) -> (String, Option<String>) {
    let mut link = None;
    let mut spec = Vec::new();

    for segment in body.split(' ') {
        let is_link = segment
            .get(..5)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("link="));
        if is_link {
            link = Some(segment[5..].to_owned());
        } else {
            spec.push(segment);
        }
    }

    (spec.join(" "), link)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
