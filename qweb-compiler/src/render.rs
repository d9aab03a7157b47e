use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;
use qweb_core::{Context, to_text};
use qweb_dom::{BDom, Block, ChoiceBlock, Host, MultiBlock, StaticBlock};

use crate::error::{CompileError, RenderError};
use crate::options::CompileOptions;
use crate::template_codegen::{PlanNode, RenderPlan, emit_plan};
use crate::template_parse::parse_template_to_ast;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// A compiled template. Rendering only evaluates expressions; the shapes in
/// the plan are shared by every tree it produces.
#[derive(Debug)]
pub struct RenderFunction {
    id: u64,
    plan: RenderPlan,
}

impl RenderFunction {
    pub fn new(plan: RenderPlan) -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            plan,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn plan(&self) -> &RenderPlan {
        &self.plan
    }

    pub fn render<H: Host>(&self, ctx: &Context) -> Result<BDom<H>, RenderError> {
        let root = self.block(&self.plan.root, ctx)?;
        Ok(BDom::new(self.id, root))
    }

    fn block<H: Host>(&self, node: &PlanNode, ctx: &Context) -> Result<Block<H>, RenderError> {
        match node {
            PlanNode::Block {
                shape,
                texts,
                children,
            } => {
                let texts = texts
                    .iter()
                    .map(|expr| -> Result<String, RenderError> {
                        Ok(to_text(expr.eval(ctx)?.as_deref()))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                let children = children
                    .iter()
                    .map(|child| self.block(child, ctx))
                    .collect::<Result<Vec<_>, _>>()?;
                let shape = Rc::clone(&self.plan.shapes[*shape]);
                Ok(Block::Static(StaticBlock::new(shape, texts, children)))
            }
            PlanNode::Multi { nodes } => {
                let children = nodes
                    .iter()
                    .map(|n| self.block(n, ctx))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Block::Multi(MultiBlock::new(children)))
            }
            PlanNode::Conditional { branches } => {
                // conditions after the first truthy one are never evaluated
                for (i, branch) in branches.iter().enumerate() {
                    let taken = match &branch.condition {
                        Some(cond) => cond.is_truthy(ctx)?,
                        None => true,
                    };
                    if taken {
                        let body = self.block(&branch.body, ctx)?;
                        return Ok(Block::Choice(ChoiceBlock::new(Some((i, body)))));
                    }
                }
                Ok(Block::Choice(ChoiceBlock::new(None)))
            }
        }
    }
}

/// Compile once, render many times. Holds a cache of render functions keyed
/// by template text.
#[derive(Debug, Default)]
pub struct Compiler {
    options: CompileOptions,
    cache: RefCell<HashMap<String, Rc<RenderFunction>>>,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        Self {
            options,
            cache: RefCell::default(),
        }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn compile(&self, text: &str) -> Result<Rc<RenderFunction>, CompileError> {
        if let Some(hit) = self.cache.borrow().get(text) {
            debug!("template cache hit (render function #{})", hit.id());
            return Ok(Rc::clone(hit));
        }
        let function = Rc::new(compile_with(text, &self.options)?);
        self.cache
            .borrow_mut()
            .insert(text.to_string(), Rc::clone(&function));
        Ok(function)
    }
}

pub fn compile(text: &str) -> Result<RenderFunction, CompileError> {
    compile_with(text, &CompileOptions::default())
}

pub fn compile_with(text: &str, options: &CompileOptions) -> Result<RenderFunction, CompileError> {
    let plan = compile_plan(text, options)?;
    let function = RenderFunction::new(plan);
    debug!(
        "compiled render function #{} ({} shapes)",
        function.id(),
        function.plan().shapes.len()
    );
    Ok(function)
}

/// The render plan for `text` under default options.
pub fn compile_template(text: &str) -> Result<RenderPlan, CompileError> {
    compile_plan(text, &CompileOptions::default())
}

pub fn compile_plan(text: &str, options: &CompileOptions) -> Result<RenderPlan, CompileError> {
    let ast = parse_template_to_ast(text, options)?;
    Ok(emit_plan(&ast))
}
