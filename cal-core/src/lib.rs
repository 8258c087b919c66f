//! Core evaluator for CAL arithmetic expressions.
//!
//! The pipeline is a single pass:
//!
//!   source text
//!     -> lexer     (one lookahead token at a time)
//!     -> parser    (recursive descent, evaluates while parsing)
//!     -> evaluator (binary operators, integer/float promotion)
//!
//! Every stage reports faults through one write-once [`ErrorLatch`], so
//! the first error wins and its position is what callers see.
//! Reading input and persisting results is left to the caller (see the
//! `cal` binary).

// ---------------------------------------------------------------------
// Error handling and values
// ---------------------------------------------------------------------

pub mod error;
pub mod value;

// ---------------------------------------------------------------------
// Front-end: lexing and parsing
// ---------------------------------------------------------------------

pub mod lexer;
mod parser;

// ---------------------------------------------------------------------
// Arithmetic and output rendering
// ---------------------------------------------------------------------

pub mod evaluator;
pub mod format;

// ---------------------------------------------------------------------
// Public API re-exports
// ---------------------------------------------------------------------

pub use error::{Category, Diagnostic, ErrorKind, ErrorLatch};
pub use format::render;
pub use value::{Value, ValueKind};

/// Outcome of evaluating one expression.
///
/// On success `error` is `None` and `value` is never `Invalid`; on
/// failure `value` is `Invalid` and `error` holds the first fault.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub value: Value,
    pub error: Option<Diagnostic>,
}

impl Evaluation {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// 1-based offset of the first fault, 0 on success.
    pub fn error_position(&self) -> usize {
        self.error.map_or(0, |d| d.position)
    }

    pub fn message(&self) -> Option<String> {
        self.error.map(|d| d.kind.to_string())
    }

    pub fn into_result(self) -> Result<Value, Diagnostic> {
        match self.error {
            Some(diagnostic) => Err(diagnostic),
            None => Ok(self.value),
        }
    }
}

/// Nesting budget shared by parentheses and `**` chains.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Evaluate a complete expression held in memory.
///
/// `source` is raw bytes: text outside comments must be ASCII, but comments
/// may hold anything.
pub fn evaluate<S: AsRef<[u8]> + ?Sized>(source: &S) -> Evaluation {
    evaluate_with_limits(source, MAX_NESTING_DEPTH)
}

/// Evaluate with a custom nesting budget.
///
/// Exceeding `max_depth` latches `Expression nested too deeply.` at the
/// `(` or `**` that opened the excess level.
pub fn evaluate_with_limits<S: AsRef<[u8]> + ?Sized>(source: &S, max_depth: usize) -> Evaluation {
    let (value, errors) = parser::Parser::new(source.as_ref(), max_depth).parse();
    let error = errors.into_diagnostic();
    Evaluation {
        value: if error.is_some() { Value::Invalid } else { value },
        error,
    }
}
