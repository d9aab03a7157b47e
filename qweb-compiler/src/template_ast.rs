use qweb_core::Expression;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<Attribute>,
    pub children: Vec<Node>,
}

/// One arm of a `t-if` / `t-elif` / `t-else` chain. `condition` is `None`
/// for the `t-else` arm.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Branch {
    pub condition: Option<Expression>,
    pub body: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionalGroup {
    pub branches: Vec<Branch>,
}

/// Template AST. Directives are already resolved: `t-esc` became
/// [`Node::Esc`], `t-if` chains became [`Node::Conditional`], and `<t>`
/// wrappers were spliced into their parent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
    Esc(Expression),
    Conditional(ConditionalGroup),
}

/// Root of a parsed template; may hold any number of top-level nodes.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Template {
    pub children: Vec<Node>,
}
