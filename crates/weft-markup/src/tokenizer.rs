// SPDX-License-Identifier: MIT
//
// Markup tokenizer.
//
// A single pass over the input, yielding one token per `next()`:
//
//   Text    literal text. `]]` collapses to `]`; a lone `]` is an error.
//           `[[` is also text (a literal `[`), emitted as its own token.
//   Open    `[style spec]`; the token carries the raw body.
//   Close   `[/]`.
//
// Inside a tag body `]` ends the tag and `[` is an error, except while the
// current space-separated segment starts with `link=`. A link value may
// contain brackets: `]]` and `[[` are literal there and a single `]` still
// ends the tag. The segment ends at the next space.
//
// The iterator stops for good after the first error.

use crate::error::MarkupError;

// ─── Tokens ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Text(String),
    /// Raw tag body, not yet parsed as a style.
    Open(String),
    Close,
}

/// A token and the byte offset where it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: usize,
}

impl Token {
    const fn new(kind: TokenKind, position: usize) -> Self {
        Self { kind, position }
    }
}

// ─── Tokenizer ───────────────────────────────────────────────────────────────

/// Streaming tokenizer over a markup string.
///
/// ```
/// use weft_markup::tokenizer::{Tokenizer, TokenKind};
///
/// let kinds: Vec<_> = Tokenizer::new("[bold]hi[/]")
///     .map(|t| t.map(|t| t.kind))
///     .collect::<Result<_, _>>()?;
/// assert_eq!(kinds, vec![
///     TokenKind::Open("bold".into()),
///     TokenKind::Text("hi".into()),
///     TokenKind::Close,
/// ]);
/// # Ok::<(), weft_markup::MarkupError>(())
/// ```
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    failed: bool,
}

impl<'a> Tokenizer<'a> {
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            failed: false,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    /// Consume `ch` if it is next.
    fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.pos += ch.len_utf8();
            true
        } else {
            false
        }
    }

    fn read_text(&mut self) -> Result<Token, MarkupError> {
        let start = self.pos;
        let mut text = String::new();

        while let Some(ch) = self.peek() {
            if ch == '[' {
                break;
            }
            let at = self.pos;
            self.bump();
            if ch == ']' && !self.eat(']') {
                return Err(MarkupError::UnescapedBracket { position: at });
            }
            text.push(ch);
        }

        Ok(Token::new(TokenKind::Text(text), start))
    }

    fn read_tag(&mut self) -> Result<Token, MarkupError> {
        let start = self.pos;
        self.bump();

        match self.peek() {
            None => return Err(MarkupError::MalformedTag { position: self.pos }),
            Some('[') => {
                self.bump();
                return Ok(Token::new(TokenKind::Text("[".into()), start));
            }
            Some('/') => {
                self.bump();
                return if self.eat(']') {
                    Ok(Token::new(TokenKind::Close, start))
                } else {
                    Err(MarkupError::MalformedTag { position: self.pos })
                };
            }
            Some(_) => {}
        }

        let mut body = String::new();
        loop {
            let at = self.pos;
            let Some(ch) = self.bump() else {
                return Err(MarkupError::MalformedTag { position: self.pos });
            };
            let in_link = in_link_segment(&body);

            match ch {
                ']' if in_link && self.eat(']') => body.push(']'),
                '[' if in_link && self.eat('[') => body.push('['),
                ']' => return Ok(Token::new(TokenKind::Open(body), start)),
                '[' => return Err(MarkupError::MalformedTag { position: at }),
                _ => body.push(ch),
            }
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Token, MarkupError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let token = match self.peek()? {
            '[' => self.read_tag(),
            _ => self.read_text(),
        };
        self.failed = token.is_err();
        Some(token)
    }
}

impl std::iter::FusedIterator for Tokenizer<'_> {}

/// Whether the segment being scanned (after the last space) is a link.
fn in_link_segment(body: &str) -> bool {
    body.rsplit(' ')
        .next()
        .and_then(|segment| segment.get(..5))
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("link="))
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(input: &str) -> Result<Vec<TokenKind>, MarkupError> {
        Tokenizer::new(input).map(|t| t.map(|t| t.kind)).collect()
    }

    fn text(s: &str) -> TokenKind {
        TokenKind::Text(s.into())
    }

    fn open(s: &str) -> TokenKind {
        TokenKind::Open(s.into())
    }

    // ── Text ────────────────────────────────────────────────────────────

    #[test]
    fn empty_input_has_no_tokens() {
        assert_eq!(kinds(""), Ok(vec![]));
    }

    #[test]
    fn plain_text_is_one_token() {
        assert_eq!(kinds("hello world"), Ok(vec![text("hello world")]));
    }

    #[test]
    fn doubled_close_bracket_is_literal() {
        assert_eq!(kinds("a]]b"), Ok(vec![text("a]b")]));
        assert_eq!(kinds("]]"), Ok(vec![text("]")]));
    }

    #[test]
    fn lone_close_bracket_fails_at_its_offset() {
        assert_eq!(
            kinds("ab]c"),
            Err(MarkupError::UnescapedBracket { position: 2 })
        );
        assert_eq!(
            kinds("ab]"),
            Err(MarkupError::UnescapedBracket { position: 2 })
        );
    }

    #[test]
    fn doubled_open_bracket_is_its_own_text_token() {
        assert_eq!(kinds("a[[b"), Ok(vec![text("a"), text("["), text("b")]));
    }

    // ── Tags ────────────────────────────────────────────────────────────

    #[test]
    fn open_text_close() {
        assert_eq!(
            kinds("[red on blue]Hi[/]"),
            Ok(vec![open("red on blue"), text("Hi"), TokenKind::Close])
        );
    }

    #[test]
    fn empty_tag_body() {
        assert_eq!(kinds("[]x[/]"), Ok(vec![open(""), text("x"), TokenKind::Close]));
    }

    #[test]
    fn positions_are_byte_offsets() {
        let tokens: Vec<Token> = Tokenizer::new("é[b]x[/]")
            .collect::<Result<_, _>>()
            .unwrap();
        let positions: Vec<usize> = tokens.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![0, 2, 5, 6]);
    }

    #[test]
    fn unterminated_tag_is_malformed() {
        assert_eq!(kinds("[bold"), Err(MarkupError::MalformedTag { position: 5 }));
        assert_eq!(kinds("x["), Err(MarkupError::MalformedTag { position: 2 }));
    }

    #[test]
    fn bad_close_tag_is_malformed() {
        assert_eq!(kinds("[/x]"), Err(MarkupError::MalformedTag { position: 2 }));
        assert_eq!(kinds("[/"), Err(MarkupError::MalformedTag { position: 2 }));
    }

    #[test]
    fn open_bracket_inside_tag_is_malformed() {
        assert_eq!(kinds("[re[d]"), Err(MarkupError::MalformedTag { position: 3 }));
    }

    #[test]
    fn complete_open_tag_at_end_is_a_token() {
        // Not malformed: the tag is well formed, and the parser reports it
        // as unclosed instead.
        assert_eq!(kinds("[bold]"), Ok(vec![open("bold")]));
        assert_eq!(kinds("x[red]"), Ok(vec![text("x"), open("red")]));
    }

    // ── Links ───────────────────────────────────────────────────────────

    #[test]
    fn link_value_keeps_escaped_brackets() {
        assert_eq!(
            kinds("[link=https://x/a[[0]]]go[/]"),
            Ok(vec![open("link=https://x/a[0]"), text("go"), TokenKind::Close])
        );
    }

    #[test]
    fn link_prefix_ignores_case() {
        assert_eq!(kinds("[LINK=a]]b]"), Ok(vec![open("LINK=a]b")]));
    }

    #[test]
    fn link_segment_ends_at_space() {
        assert_eq!(
            kinds("[link=u bold]x[/]"),
            Ok(vec![open("link=u bold"), text("x"), TokenKind::Close])
        );
        assert_eq!(
            kinds("[bold link=a[[b]]c]"),
            Ok(vec![open("bold link=a[b]c")])
        );
    }

    #[test]
    fn single_open_bracket_in_link_is_malformed() {
        assert_eq!(
            kinds("[link=a[b]"),
            Err(MarkupError::MalformedTag { position: 7 })
        );
    }

    #[test]
    fn brackets_before_link_segment_are_delimiters() {
        assert_eq!(
            kinds("[linkx]]"),
            Err(MarkupError::UnescapedBracket { position: 7 })
        );
    }

    // ── Fusing ──────────────────────────────────────────────────────────

    #[test]
    fn stops_after_first_error() {
        let mut tokenizer = Tokenizer::new("a]b[/]");
        assert!(matches!(tokenizer.next(), Some(Err(_))));
        assert_eq!(tokenizer.next(), None);
        assert_eq!(tokenizer.next(), None);
    }
}
