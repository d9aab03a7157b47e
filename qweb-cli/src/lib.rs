use anyhow::{Context as _, Result};
use clap::ValueEnum;
use log::info;
use qweb_compiler::{CompileOptions, compile_plan, compile_with};
use qweb_core::{Context, MissingPolicy};
use qweb_dom::Document;
use std::fs;
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PlanFormat {
    /// Canonical text listing
    Text,
    /// serde_json rendering of the plan
    Json,
}

/// Compile options for the given `--preserve` tags; none keeps the defaults.
pub fn compile_options(preserve: &[String]) -> CompileOptions {
    if preserve.is_empty() {
        CompileOptions::default()
    } else {
        CompileOptions {
            preserve_whitespace: preserve.to_vec(),
        }
    }
}

/// Compile a template file and return its render plan in `format`.
pub fn compile_cmd(input: &Path, format: PlanFormat, options: &CompileOptions) -> Result<String> {
    let src = read_template(input)?;
    let plan = compile_plan(&src, options)
        .with_context(|| format!("failed to compile {}", input.display()))?;
    info!("{}: {} shapes", input.display(), plan.shapes.len());
    match format {
        PlanFormat::Text => Ok(plan.to_string()),
        PlanFormat::Json => {
            let mut json = serde_json::to_string_pretty(&plan)?;
            json.push('\n');
            Ok(json)
        }
    }
}

/// Render a template file against a JSON context into an in-memory document
/// and return the resulting HTML.
pub fn render_cmd(input: &Path, context: Option<&Path>, strict: bool) -> Result<String> {
    let src = read_template(input)?;
    let ctx = load_context(context, strict)?;
    let render = compile_with(&src, &CompileOptions::default())
        .with_context(|| format!("failed to compile {}", input.display()))?;
    let mut tree = render
        .render::<Document>(&ctx)
        .with_context(|| format!("failed to render {}", input.display()))?;

    let doc = Document::new();
    let container = doc.create_container();
    tree.mount(&doc, &container)?;
    let mut html = doc.inner_html(container);
    html.push('\n');
    Ok(html)
}

/// Read the render context from a JSON file; no file gives an empty context.
pub fn load_context(path: Option<&Path>, strict: bool) -> Result<Context> {
    let ctx = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let value: serde_json::Value = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not valid JSON", path.display()))?;
            Context::from_json(value).with_context(|| format!("bad context in {}", path.display()))?
        }
        None => Context::new(),
    };
    let policy = if strict {
        MissingPolicy::Strict
    } else {
        MissingPolicy::Undefined
    };
    Ok(ctx.with_policy(policy))
}

/// Write to `output` when given, stdout otherwise.
pub fn write_output(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir)
                    .with_context(|| format!("failed to create {}", dir.display()))?;
            }
            fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
            println!("Generated: {}", path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn read_template(input: &Path) -> Result<String> {
    fs::read_to_string(input).with_context(|| format!("failed to read {}", input.display()))
}
