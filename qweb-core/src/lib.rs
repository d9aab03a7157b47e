//! Data side of the template engine: the render-time [`Context`], value
//! semantics shared by the compiler and the CLI, and the small expression
//! language used by `t-if` / `t-esc`.

pub mod context;
pub mod expr;
pub mod value;

pub use context::{Context, ContextError, LookupError, MissingPolicy};
pub use expr::{Expression, ExpressionError, compile_expression};
pub use serde_json::Value;
pub use value::{is_truthy, to_text};
