//! Diagnostics and the first-error-wins latch shared by every stage.

use thiserror::Error;
use tracing::{debug, trace};

/// Coarse classification of a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Lexical,
    Syntactic,
    Semantic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("Unknown token found.")]
    UnknownToken,
    #[error("Unexpected token or missing operand/operator.")]
    UnexpectedToken,
    #[error("Mismatched parenthesis.")]
    MismatchedParenthesis,
    #[error("Expected number or opening parenthesis.")]
    ExpectedOperand,
    #[error("Unexpected tokens after expression end.")]
    TrailingInput,
    #[error("Expression nested too deeply.")]
    NestingTooDeep,
    #[error("Integer division by zero.")]
    IntegerDivisionByZero,
    #[error("Float division by zero.")]
    FloatDivisionByZero,
    #[error("Unknown operator.")]
    UnknownOperator,
    #[error("Internal type error.")]
    InternalTypeError,
}

impl ErrorKind {
    pub fn category(self) -> Category {
        match self {
            ErrorKind::UnknownToken => Category::Lexical,
            ErrorKind::UnexpectedToken
            | ErrorKind::MismatchedParenthesis
            | ErrorKind::ExpectedOperand
            | ErrorKind::TrailingInput
            | ErrorKind::NestingTooDeep => Category::Syntactic,
            ErrorKind::IntegerDivisionByZero
            | ErrorKind::FloatDivisionByZero
            | ErrorKind::UnknownOperator
            | ErrorKind::InternalTypeError => Category::Semantic,
        }
    }
}

/// A fault pinned to a 1-based byte offset in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("error at position {position}: {kind}")]
pub struct Diagnostic {
    pub position: usize,
    pub kind: ErrorKind,
}

/// Marker returned once a fault has been latched; parse levels bail out with `?`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Halt(());

/// Write-once error channel for one evaluation.
#[derive(Debug, Default)]
pub struct ErrorLatch {
    first: Option<Diagnostic>,
}

impl ErrorLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fault unless one is already latched.
    pub fn raise(&mut self, position: usize, kind: ErrorKind) -> Halt {
        match self.first {
            None => {
                debug!(position, category = ?kind.category(), "Error at pos {position}: {kind}");
                self.first = Some(Diagnostic { position, kind });
            }
            Some(first) => {
                trace!(position, suppressed = %kind, latched = first.position, "fault after first error");
            }
        }
        Halt(())
    }

    /// The halt marker for an already latched fault, without raising a new one.
    pub fn halted(&self) -> Option<Halt> {
        self.first.map(|_| Halt(()))
    }

    pub fn is_clear(&self) -> bool {
        self.first.is_none()
    }

    /// Latched position, 0 when no fault occurred.
    pub fn position(&self) -> usize {
        self.first.map_or(0, |d| d.position)
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        self.first.as_ref()
    }

    pub fn into_diagnostic(self) -> Option<Diagnostic> {
        self.first
    }
}
