use qweb_core::{ExpressionError, LookupError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("syntax error at line {line}, column {col}: {message}")]
    Syntax {
        message: String,
        line: usize,
        col: usize,
    },
    #[error("`{directive}` at line {line}, column {col} does not follow a `t-if` or `t-elif`")]
    OrphanBranch {
        directive: &'static str,
        line: usize,
        col: usize,
    },
    #[error("`{first}` and `{second}` cannot be combined (line {line}, column {col})")]
    ConflictingDirectives {
        first: &'static str,
        second: &'static str,
        line: usize,
        col: usize,
    },
    #[error("unknown directive `{name}` at line {line}, column {col}")]
    UnknownDirective { name: String, line: usize, col: usize },
    #[error("`<t>` at line {line}, column {col} cannot carry attribute `{name}`")]
    AttributeOnGroup { name: String, line: usize, col: usize },
    #[error("element with `t-esc` at line {line}, column {col} cannot have content")]
    ContentWithEsc { line: usize, col: usize },
}

/// Everything that can stop a template from compiling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("in `{directive}` at line {line}, column {col}: {source}")]
    Expression {
        directive: &'static str,
        line: usize,
        col: usize,
        #[source]
        source: ExpressionError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error(transparent)]
    Lookup(#[from] LookupError),
}
