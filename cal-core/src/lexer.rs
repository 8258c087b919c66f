//! Pull-based lexer for arithmetic expressions.

use tracing::trace;

use crate::error::{ErrorKind, ErrorLatch};
use crate::value::Value;

/// Kind of a token produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Special
    Eof,
    Unknown,

    // Literals
    Number,

    // Operators
    Plus,   // +
    Minus,  // -
    Star,   // *
    Slash,  // /
    Power,  // **

    // Punctuation
    LParen, // (
    RParen, // )
}

/// A single token.
///
/// `position` is the 1-based byte offset of the first character, or
/// `len + 1` for [`TokenKind::Eof`]. `value` is only meaningful for
/// [`TokenKind::Number`] and is `Invalid` otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: Value,
    pub position: usize,
}

/// Produces one token per call to [`Lexer::next_token`].
///
/// The cursor never moves backwards and advances by at least one byte for
/// every token other than `Eof`, so repeated calls always terminate.
#[derive(Debug, Clone)]
pub struct Lexer<'src> {
    chars: &'src [u8],
    len: usize,
    index: usize,
}

impl<'src> Lexer<'src> {
    /// Lex raw bytes; only ASCII is meaningful outside comments.
    pub fn new<S: AsRef<[u8]> + ?Sized>(source: &'src S) -> Self {
        let chars = source.as_ref();
        Self {
            chars,
            len: chars.len(),
            index: 0,
        }
    }

    /// 1-based offset of the next unread byte.
    pub fn cursor(&self) -> usize {
        self.index + 1
    }

    pub fn next_token(&mut self, errors: &mut ErrorLatch) -> Token {
        self.skip_trivia();

        let start = self.index;
        let Some(ch) = self.peek_char() else {
            return Token {
                kind: TokenKind::Eof,
                value: Value::Invalid,
                position: self.len + 1,
            };
        };

        let token = match ch {
            b'+' => {
                self.consume_char();
                self.simple_token(TokenKind::Plus, start)
            }
            b'-' => {
                self.consume_char();
                self.simple_token(TokenKind::Minus, start)
            }
            b'*' => {
                // Look for "**"
                if self.peek_next() == Some(b'*') {
                    self.consume_char();
                    self.consume_char();
                    self.simple_token(TokenKind::Power, start)
                } else {
                    self.consume_char();
                    self.simple_token(TokenKind::Star, start)
                }
            }
            b'/' => {
                self.consume_char();
                self.simple_token(TokenKind::Slash, start)
            }
            b'(' => {
                self.consume_char();
                self.simple_token(TokenKind::LParen, start)
            }
            b')' => {
                self.consume_char();
                self.simple_token(TokenKind::RParen, start)
            }
            b'0'..=b'9' | b'.' => match self.lex_number(start) {
                Some(token) => token,
                None => self.unexpected_char(start, errors),
            },
            _ => self.unexpected_char(start, errors),
        };

        trace!(kind = ?token.kind, position = token.position, "token");
        token
    }

    fn skip_trivia(&mut self) {
        while let Some(ch) = self.peek_char() {
            if is_whitespace(ch) {
                self.consume_char();
            } else if ch == b'#' {
                // Line comment; the newline itself is skipped as whitespace.
                while let Some(ch) = self.peek_char() {
                    if ch == b'\n' {
                        break;
                    }
                    self.consume_char();
                }
            } else {
                break;
            }
        }
    }

    fn simple_token(&self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            value: Value::Invalid,
            position: start + 1,
        }
    }

    fn unexpected_char(&mut self, start: usize, errors: &mut ErrorLatch) -> Token {
        self.consume_char();
        errors.raise(start + 1, ErrorKind::UnknownToken);
        self.simple_token(TokenKind::Unknown, start)
    }

    /// Scan `digits [ '.' digits ] [ ('e'|'E') [sign] digits ]`.
    ///
    /// Returns `None` without moving the cursor when no digit is present
    /// (a lone `.`).
    fn lex_number(&mut self, start: usize) -> Option<Token> {
        let mut end = start;
        let int_digits = self.digits_from(end);
        end += int_digits;

        let mut frac_digits = 0;
        if self.chars.get(end) == Some(&b'.') {
            frac_digits = self.digits_from(end + 1);
            end += 1 + frac_digits;
        }
        if int_digits + frac_digits == 0 {
            return None;
        }

        if matches!(self.chars.get(end), Some(b'e' | b'E')) {
            let mut exp = end + 1;
            if matches!(self.chars.get(exp), Some(b'+' | b'-')) {
                exp += 1;
            }
            let exp_digits = self.digits_from(exp);
            if exp_digits > 0 {
                end = exp + exp_digits;
            }
        }

        // The scanned range holds ASCII digits, '.', 'e', 'E' and signs only.
        let text = std::str::from_utf8(&self.chars[start..end]).ok()?;
        let value = literal_value(text)?;
        self.index = end;
        Some(Token {
            kind: TokenKind::Number,
            value,
            position: start + 1,
        })
    }

    fn digits_from(&self, at: usize) -> usize {
        self.chars
            .get(at..)
            .map_or(0, |rest| rest.iter().take_while(|ch| ch.is_ascii_digit()).count())
    }

    fn peek_char(&self) -> Option<u8> {
        self.chars.get(self.index).copied()
    }

    fn peek_next(&self) -> Option<u8> {
        self.chars.get(self.index + 1).copied()
    }

    fn consume_char(&mut self) {
        if self.index < self.len {
            self.index += 1;
        }
    }
}

/// Classify a scanned literal. Text with `.`, `e` or `E` is a float;
/// anything else is an integer unless it does not fit in `i64`.
fn literal_value(text: &str) -> Option<Value> {
    let is_float = text.contains(['.', 'e', 'E']);
    if !is_float {
        if let Ok(i) = text.parse::<i64>() {
            return Some(Value::Integer(i));
        }
    }
    text.parse::<f64>().ok().map(Value::Float)
}

fn is_whitespace(ch: u8) -> bool {
    matches!(ch, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}
