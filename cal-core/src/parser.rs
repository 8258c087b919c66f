//! Recursive-descent parser that evaluates while it parses.
//!
//! Grammar, lowest binding first:
//!
//! ```text
//! expression := term  { ('+' | '-') term  }*
//! term       := power { ('*' | '/') power }*
//! power      := unary ( '**' power )?
//! unary      := ('+' | '-')? primary
//! primary    := NUMBER | '(' expression ')'
//! ```
//!
//! `**` is right-associative through recursion; the other binary levels
//! fold left in a loop. Every level returns `Err(Halt)` once a fault is
//! latched, so no further tokens are consumed after the first error.
//! Parentheses and `**` chains share one nesting budget; going past it is
//! an error at the offending token instead of a stack overflow.

use crate::error::{ErrorKind, ErrorLatch, Halt};
use crate::evaluator::apply;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::value::Value;

type ParseResult = Result<Value, Halt>;

pub(crate) struct Parser<'src> {
    lexer: Lexer<'src>,
    current: Token,
    errors: ErrorLatch,
    depth: usize,
    max_depth: usize,
}

impl<'src> Parser<'src> {
    pub(crate) fn new(source: &'src [u8], max_depth: usize) -> Self {
        let mut lexer = Lexer::new(source);
        let mut errors = ErrorLatch::new();
        let current = lexer.next_token(&mut errors);
        Self {
            lexer,
            current,
            errors,
            depth: 0,
            max_depth,
        }
    }

    /// Parse one complete expression and require end of input after it.
    pub(crate) fn parse(mut self) -> (Value, ErrorLatch) {
        let result = self.expression().and_then(|value| {
            if self.current.kind == TokenKind::Eof {
                Ok(value)
            } else {
                Err(self.error_at_current(ErrorKind::TrailingInput))
            }
        });

        let value = match result {
            Ok(value) if self.errors.is_clear() => value,
            _ => Value::Invalid,
        };
        (value, self.errors)
    }

    fn expression(&mut self) -> ParseResult {
        let mut left = self.term()?;
        while matches!(self.current.kind, TokenKind::Plus | TokenKind::Minus) {
            let operator = self.current;
            self.consume(operator.kind)?;
            let right = self.term()?;
            left = self.fold(left, &operator, right)?;
        }
        Ok(left)
    }

    fn term(&mut self) -> ParseResult {
        let mut left = self.power()?;
        while matches!(self.current.kind, TokenKind::Star | TokenKind::Slash) {
            let operator = self.current;
            self.consume(operator.kind)?;
            let right = self.power()?;
            left = self.fold(left, &operator, right)?;
        }
        Ok(left)
    }

    fn power(&mut self) -> ParseResult {
        let left = self.unary()?;
        if self.current.kind != TokenKind::Power {
            return Ok(left);
        }
        let operator = self.current;
        let right = self.nested(|parser| {
            parser.consume(TokenKind::Power)?;
            parser.power()
        })?;
        self.fold(left, &operator, right)
    }

    fn unary(&mut self) -> ParseResult {
        match self.current.kind {
            TokenKind::Plus => {
                self.consume(TokenKind::Plus)?;
                self.primary()
            }
            TokenKind::Minus => {
                self.consume(TokenKind::Minus)?;
                Ok(self.primary()?.negate())
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> ParseResult {
        match self.current.kind {
            TokenKind::Number => {
                let value = self.current.value;
                self.advance();
                Ok(value)
            }
            TokenKind::LParen => self.nested(|parser| {
                parser.consume(TokenKind::LParen)?;
                let value = parser.expression()?;
                parser.consume_or(TokenKind::RParen, ErrorKind::MismatchedParenthesis)?;
                Ok(value)
            }),
            _ => Err(self.error_at_current(ErrorKind::ExpectedOperand)),
        }
    }

    /// Run one nesting level, opened by the current `(` or `**` token.
    fn nested(&mut self, level: impl FnOnce(&mut Self) -> ParseResult) -> ParseResult {
        if self.depth >= self.max_depth {
            return Err(self.error_at_current(ErrorKind::NestingTooDeep));
        }
        self.depth += 1;
        let result = level(self);
        self.depth -= 1;
        result
    }

    fn fold(&mut self, left: Value, operator: &Token, right: Value) -> ParseResult {
        match apply(&mut self.errors, left, operator, right) {
            Value::Invalid => {
                // `apply` latches before yielding Invalid for valid operands.
                debug_assert!(!self.errors.is_clear(), "apply returned Invalid without a fault");
                Err(self.errors.halted().unwrap_or_else(|| {
                    self.errors.raise(operator.position, ErrorKind::InternalTypeError)
                }))
            }
            value => Ok(value),
        }
    }

    fn consume(&mut self, expected: TokenKind) -> Result<(), Halt> {
        self.consume_or(expected, ErrorKind::UnexpectedToken)
    }

    fn consume_or(&mut self, expected: TokenKind, kind: ErrorKind) -> Result<(), Halt> {
        if self.current.kind == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.error_at_current(kind))
        }
    }

    fn advance(&mut self) {
        self.current = self.lexer.next_token(&mut self.errors);
    }

    fn error_at_current(&mut self, kind: ErrorKind) -> Halt {
        self.errors.raise(self.current.position, kind)
    }
}
