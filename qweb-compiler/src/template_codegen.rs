use std::fmt::{self, Write as _};
use std::rc::Rc;

use qweb_core::Expression;
use qweb_dom::{Shape, ShapeNode};
use serde::Serialize;

use crate::template_ast::{Node, Template};

/// Compiled form of a template: the static shells, built once, and the
/// tree of per-render work that fills them.
///
/// Shapes are numbered in document pre-order, so equal templates give equal
/// plans. The [`Display`](fmt::Display) listing is the canonical snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPlan {
    pub shapes: Vec<Rc<Shape>>,
    pub root: PlanNode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanNode {
    /// Instance of `shapes[shape]`; one expression per text slot, one plan
    /// per child slot.
    Block {
        shape: usize,
        texts: Vec<Expression>,
        children: Vec<PlanNode>,
    },
    Multi { nodes: Vec<PlanNode> },
    Conditional { branches: Vec<PlanBranch> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanBranch {
    pub condition: Option<Expression>,
    pub body: PlanNode,
}

pub fn emit_plan(template: &Template) -> RenderPlan {
    let mut emitter = Emitter { shapes: Vec::new() };
    let root = emitter.sequence(&template.children);
    RenderPlan {
        shapes: emitter.shapes.into_iter().map(Rc::new).collect(),
        root,
    }
}

struct Emitter {
    shapes: Vec<Shape>,
}

impl Emitter {
    fn sequence(&mut self, nodes: &[Node]) -> PlanNode {
        match nodes {
            [single] => self.node(single),
            _ => PlanNode::Multi {
                nodes: nodes.iter().map(|n| self.node(n)).collect(),
            },
        }
    }

    fn node(&mut self, node: &Node) -> PlanNode {
        if let Node::Conditional(group) = node {
            let branches = group
                .branches
                .iter()
                .map(|b| PlanBranch {
                    condition: b.condition.clone(),
                    body: self.sequence(&b.body),
                })
                .collect();
            return PlanNode::Conditional { branches };
        }

        // reserve the index first so an outer shape numbers before its
        // nested ones
        let index = self.shapes.len();
        self.shapes.push(Shape::new(ShapeNode::Text { data: String::new() }));
        let mut texts = Vec::new();
        let mut children = Vec::new();
        let root = self.shape_node(node, &mut texts, &mut children);
        self.shapes[index] = Shape::new(root);
        PlanNode::Block {
            shape: index,
            texts,
            children,
        }
    }

    fn shape_node(
        &mut self,
        node: &Node,
        texts: &mut Vec<Expression>,
        children: &mut Vec<PlanNode>,
    ) -> ShapeNode {
        match node {
            Node::Text(data) => ShapeNode::Text { data: data.clone() },
            Node::Comment(data) => ShapeNode::Comment { data: data.clone() },
            Node::Esc(expr) => {
                texts.push(expr.clone());
                ShapeNode::TextSlot {
                    index: texts.len() - 1,
                }
            }
            Node::Element(el) => ShapeNode::Element {
                tag: el.tag.clone(),
                attrs: el
                    .attrs
                    .iter()
                    .map(|a| (a.name.clone(), a.value.clone()))
                    .collect(),
                children: el
                    .children
                    .iter()
                    .map(|c| self.shape_node(c, texts, children))
                    .collect(),
            },
            Node::Conditional(_) => {
                let plan = self.node(node);
                children.push(plan);
                ShapeNode::ChildSlot {
                    index: children.len() - 1,
                }
            }
        }
    }
}

impl fmt::Display for RenderPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, shape) in self.shapes.iter().enumerate() {
            let mut markup = String::new();
            write_shape(shape.root(), &mut markup)?;
            writeln!(f, "shape {i}: {markup}")?;
        }
        write_plan(f, &self.root, 0)
    }
}

fn write_shape(node: &ShapeNode, out: &mut String) -> fmt::Result {
    match node {
        ShapeNode::Element {
            tag,
            attrs,
            children,
        } => {
            write!(out, "<{tag}")?;
            for (name, value) in attrs {
                write!(out, " {name}=\"{}\"", value.replace('&', "&amp;").replace('"', "&quot;"))?;
            }
            out.push('>');
            for child in children {
                write_shape(child, out)?;
            }
            write!(out, "</{tag}>")
        }
        ShapeNode::Text { data } => {
            out.push_str(&escape_listing(data));
            Ok(())
        }
        ShapeNode::Comment { data } => write!(out, "<!--{}-->", escape_listing(data)),
        ShapeNode::TextSlot { index } => write!(out, "<block-text-{index}/>"),
        ShapeNode::ChildSlot { index } => write!(out, "<block-child-{index}/>"),
    }
}

// keep every shape on one line of the listing
fn escape_listing(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('\n', "\\n")
        .replace('\t', "\\t")
}

fn write_plan(f: &mut fmt::Formatter<'_>, node: &PlanNode, depth: usize) -> fmt::Result {
    let pad = "  ".repeat(depth);
    match node {
        PlanNode::Block {
            shape,
            texts,
            children,
        } => {
            write!(f, "{pad}block {shape}")?;
            if !texts.is_empty() {
                let list: Vec<String> = texts.iter().map(|t| t.to_string()).collect();
                write!(f, " texts=[{}]", list.join(", "))?;
            }
            writeln!(f)?;
            for (i, child) in children.iter().enumerate() {
                writeln!(f, "{pad}  child {i}:")?;
                write_plan(f, child, depth + 2)?;
            }
            Ok(())
        }
        PlanNode::Multi { nodes } => {
            writeln!(f, "{pad}multi")?;
            for n in nodes {
                write_plan(f, n, depth + 1)?;
            }
            Ok(())
        }
        PlanNode::Conditional { branches } => {
            writeln!(f, "{pad}conditional")?;
            for (i, branch) in branches.iter().enumerate() {
                match (&branch.condition, i) {
                    (Some(cond), 0) => writeln!(f, "{pad}  if {cond}")?,
                    (Some(cond), _) => writeln!(f, "{pad}  elif {cond}")?,
                    (None, _) => writeln!(f, "{pad}  else")?,
                }
                write_plan(f, &branch.body, depth + 2)?;
            }
            Ok(())
        }
    }
}
