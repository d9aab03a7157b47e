//! Template compiler: markup with `t-*` directives in, render functions out.
//!
//! ```
//! use qweb_compiler::compile;
//! use qweb_core::Context;
//! use qweb_dom::Document;
//!
//! let render = compile(r#"<p>Hello <t t-esc="name"/></p>"#).unwrap();
//! let doc = Document::new();
//! let root = doc.create_container();
//! let mut tree = render.render::<Document>(&Context::new().with("name", "owl")).unwrap();
//! tree.mount(&doc, &root).unwrap();
//! assert_eq!(doc.inner_html(root), "<p>Hello owl</p>");
//! ```

pub mod error;
pub mod options;
pub mod render;
pub mod template_ast;
pub mod template_codegen;
pub mod template_parse;

pub use error::{CompileError, ParseError, RenderError};
pub use options::CompileOptions;
pub use render::{Compiler, RenderFunction, compile, compile_plan, compile_template, compile_with};
pub use template_ast::{Node, Template};
pub use template_codegen::{PlanBranch, PlanNode, RenderPlan};
pub use template_parse::parse_template_to_ast;

/// Parse `text` into an AST with default options.
pub fn parse(text: &str) -> Result<Template, CompileError> {
    parse_template_to_ast(text, &CompileOptions::default())
}
