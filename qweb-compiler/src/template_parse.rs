use log::debug;
use pest::Parser;
use pest::iterators::Pair;
use qweb_core::{Expression, compile_expression};

use crate::error::{CompileError, ParseError};
use crate::options::CompileOptions;
use crate::template_ast::{Attribute, Branch, ConditionalGroup, Element, Node, Template};

#[derive(pest_derive::Parser)]
#[grammar = "template.pest"]
struct TemplateParser;

/// Parse template markup into a directive-resolved AST.
///
/// On top of the grammar this applies:
/// - whitespace folding (skipped below preserve elements such as `<pre>`),
/// - `t-if` / `t-elif` / `t-else` grouping into [`Node::Conditional`],
/// - `t-esc` into [`Node::Esc`],
/// - splicing of `<t>` wrappers into their parent.
pub fn parse_template_to_ast(
    input: &str,
    options: &CompileOptions,
) -> Result<Template, CompileError> {
    let mut pairs = TemplateParser::parse(Rule::template, input).map_err(syntax_error)?;
    let Some(template) = pairs.next() else {
        return Ok(Template::default());
    };
    let top: Vec<Pair<Rule>> = template
        .into_inner()
        .filter(|p| p.as_rule() != Rule::EOI)
        .collect();
    let children = Lowering { options }.children(&top, false)?;
    debug!("parsed template with {} top-level nodes", children.len());
    Ok(Template { children })
}

fn syntax_error(e: pest::error::Error<Rule>) -> ParseError {
    let (line, col) = match e.line_col {
        pest::error::LineColLocation::Pos(pos) => pos,
        pest::error::LineColLocation::Span(start, _) => start,
    };
    ParseError::Syntax {
        message: e.variant.message().to_string(),
        line,
        col,
    }
}

enum BranchDirective {
    If(Expression),
    Elif(Expression),
    Else,
}

impl BranchDirective {
    fn name(&self) -> &'static str {
        match self {
            BranchDirective::If(_) => "t-if",
            BranchDirective::Elif(_) => "t-elif",
            BranchDirective::Else => "t-else",
        }
    }
}

/// An element with its directives pulled out of the attribute list.
struct RawElement<'i> {
    tag: &'i str,
    attrs: Vec<(&'i str, String)>,
    branch: Option<BranchDirective>,
    esc: Option<Expression>,
    children: Vec<Pair<'i, Rule>>,
    line: usize,
    col: usize,
}

fn read_element(pair: Pair<'_, Rule>) -> Result<RawElement<'_>, CompileError> {
    let (line, col) = pair.as_span().start_pos().line_col();
    let mut el = RawElement {
        tag: "",
        attrs: Vec::new(),
        branch: None,
        esc: None,
        children: Vec::new(),
        line,
        col,
    };

    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::tag_name => el.tag = part.as_str(),
            Rule::attribute => {
                let (name, value) = read_attribute(part);
                let directive = match name {
                    "t-if" => BranchDirective::If(expression(value, "t-if", line, col)?),
                    "t-elif" => BranchDirective::Elif(expression(value, "t-elif", line, col)?),
                    "t-else" => BranchDirective::Else,
                    "t-esc" => {
                        if el.esc.is_some() {
                            return Err(conflict("t-esc", "t-esc", line, col));
                        }
                        el.esc = Some(expression(value, "t-esc", line, col)?);
                        continue;
                    }
                    other if other.starts_with("t-") => {
                        return Err(ParseError::UnknownDirective {
                            name: other.to_string(),
                            line,
                            col,
                        }
                        .into());
                    }
                    other => {
                        el.attrs.push((other, decode_entities(value)));
                        continue;
                    }
                };
                if let Some(previous) = &el.branch {
                    return Err(conflict(previous.name(), directive.name(), line, col));
                }
                el.branch = Some(directive);
            }
            _ => el.children.push(part),
        }
    }
    Ok(el)
}

fn read_attribute(pair: Pair<'_, Rule>) -> (&str, &str) {
    let mut name = "";
    let mut value = "";
    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::attr_name => name = part.as_str(),
            Rule::attr_value => {
                value = part.into_inner().next().map(|v| v.as_str()).unwrap_or("");
            }
            _ => {}
        }
    }
    (name, value)
}

fn expression(
    source: &str,
    directive: &'static str,
    line: usize,
    col: usize,
) -> Result<Expression, CompileError> {
    compile_expression(source).map_err(|source| CompileError::Expression {
        directive,
        line,
        col,
        source,
    })
}

fn conflict(first: &'static str, second: &'static str, line: usize, col: usize) -> CompileError {
    ParseError::ConflictingDirectives {
        first,
        second,
        line,
        col,
    }
    .into()
}

struct Lowering<'o> {
    options: &'o CompileOptions,
}

impl Lowering<'_> {
    fn children(&self, pairs: &[Pair<'_, Rule>], in_pre: bool) -> Result<Vec<Node>, CompileError> {
        let mut out = Vec::new();
        let mut i = 0;
        while i < pairs.len() {
            let pair = pairs[i].clone();
            i += 1;
            match pair.as_rule() {
                Rule::text => {
                    if let Some(text) = fold_text(pair.as_str(), in_pre) {
                        out.push(Node::Text(text));
                    }
                }
                Rule::comment => {
                    let body = pair.into_inner().next().map(|b| b.as_str()).unwrap_or("");
                    out.push(Node::Comment(body.to_string()));
                }
                Rule::element => {
                    let el = read_element(pair)?;
                    match el.branch.as_ref().map(BranchDirective::name) {
                        Some("t-if") => {
                            let mut branches = vec![self.branch(el, in_pre)?];
                            while let Some(next) = next_branch(pairs, i) {
                                let el = read_element(pairs[next].clone())?;
                                i = next + 1;
                                let last = matches!(el.branch, Some(BranchDirective::Else));
                                branches.push(self.branch(el, in_pre)?);
                                if last {
                                    break;
                                }
                            }
                            out.push(Node::Conditional(ConditionalGroup { branches }));
                        }
                        Some(directive) => {
                            return Err(ParseError::OrphanBranch {
                                directive,
                                line: el.line,
                                col: el.col,
                            }
                            .into());
                        }
                        None => out.extend(self.element(el, in_pre)?),
                    }
                }
                _ => {}
            }
        }
        Ok(out)
    }

    fn branch(&self, mut el: RawElement<'_>, in_pre: bool) -> Result<Branch, CompileError> {
        let condition = match el.branch.take() {
            Some(BranchDirective::If(e)) | Some(BranchDirective::Elif(e)) => Some(e),
            Some(BranchDirective::Else) | None => None,
        };
        Ok(Branch {
            condition,
            body: self.element(el, in_pre)?,
        })
    }

    /// Lower one element without its branch directive. `<t>` yields its
    /// children; anything else yields exactly one [`Node::Element`].
    fn element(&self, el: RawElement<'_>, in_pre: bool) -> Result<Vec<Node>, CompileError> {
        let child_pre = in_pre || self.options.preserves(el.tag);
        let children = self.children(&el.children, child_pre)?;
        let content = match el.esc {
            Some(expr) if children.is_empty() => vec![Node::Esc(expr)],
            Some(_) => {
                return Err(ParseError::ContentWithEsc {
                    line: el.line,
                    col: el.col,
                }
                .into());
            }
            None => children,
        };

        if el.tag == "t" {
            if let Some((name, _)) = el.attrs.first() {
                return Err(ParseError::AttributeOnGroup {
                    name: name.to_string(),
                    line: el.line,
                    col: el.col,
                }
                .into());
            }
            return Ok(content);
        }

        let attrs = el
            .attrs
            .into_iter()
            .filter(|(name, value)| !(*name == "class" && value.is_empty()))
            .map(|(name, value)| Attribute {
                name: name.to_string(),
                value,
            })
            .collect();
        Ok(vec![Node::Element(Element {
            tag: el.tag.to_string(),
            attrs,
            children: content,
        })])
    }
}

/// Index of the `t-elif`/`t-else` element continuing a chain, skipping
/// whitespace-only text and comments from `start`.
fn next_branch(pairs: &[Pair<'_, Rule>], start: usize) -> Option<usize> {
    for (offset, pair) in pairs[start..].iter().enumerate() {
        match pair.as_rule() {
            Rule::comment => continue,
            Rule::text if pair.as_str().chars().all(|c| c.is_ascii_whitespace()) => continue,
            Rule::element if continues_chain(pair) => return Some(start + offset),
            _ => return None,
        }
    }
    None
}

fn continues_chain(pair: &Pair<'_, Rule>) -> bool {
    pair.clone()
        .into_inner()
        .filter(|p| p.as_rule() == Rule::attribute)
        .any(|p| matches!(read_attribute(p).0, "t-elif" | "t-else"))
}

/// Whitespace rules for text outside preserve elements: whitespace-only
/// text with a newline disappears, every other whitespace run becomes one
/// space.
fn fold_text(raw: &str, in_pre: bool) -> Option<String> {
    if in_pre {
        return Some(decode_entities(raw));
    }
    let blank = raw.chars().all(|c| c.is_ascii_whitespace());
    if blank && raw.contains('\n') {
        return None;
    }
    let mut folded = String::with_capacity(raw.len());
    let mut in_run = false;
    for ch in raw.chars() {
        if ch.is_ascii_whitespace() {
            if !in_run {
                folded.push(' ');
            }
            in_run = true;
        } else {
            folded.push(ch);
            in_run = false;
        }
    }
    Some(decode_entities(&folded))
}

/// Decode the predefined XML entities and numeric character references.
/// Anything unrecognised is kept as written.
fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest
            .find(';')
            .filter(|end| *end <= 10)
            .and_then(|end| entity(&rest[1..end]).map(|ch| (ch, end)));
        match decoded {
            Some((ch, end)) => {
                out.push(ch);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = name.strip_prefix('#')?;
            let value = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value)
        }
    }
}
