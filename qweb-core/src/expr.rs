use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use pest::Parser;
use pest::iterators::Pair;
use serde::Serialize;
use serde_json::{Number, Value};
use thiserror::Error;

use crate::context::{Context, LookupError};
use crate::value::is_truthy;

#[derive(pest_derive::Parser)]
#[grammar = "expr.pest"]
struct ExprParser;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    #[error("invalid expression `{source_text}` at column {col}: {message}")]
    Syntax {
        source_text: String,
        col: usize,
        message: String,
    },
    #[error("number literal `{0}` is out of range")]
    Number(String),
}

/// A compiled directive expression.
///
/// The grammar is closed: identifiers, dotted paths, literals and `!`.
/// Evaluation only reads from a [`Context`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Expression {
    Literal(Value),
    Undefined,
    Path(Vec<String>),
    Not(Box<Expression>),
}

pub fn compile_expression(text: &str) -> Result<Expression, ExpressionError> {
    let mut pairs = ExprParser::parse(Rule::expression, text).map_err(|e| {
        let col = match e.line_col {
            pest::error::LineColLocation::Pos((_, c)) => c,
            pest::error::LineColLocation::Span((_, c), _) => c,
        };
        ExpressionError::Syntax {
            source_text: text.to_string(),
            col,
            message: e.variant.message().to_string(),
        }
    })?;

    // expression = { SOI ~ unary ~ EOI }
    let unary = pairs
        .next()
        .and_then(|expression| expression.into_inner().find(|p| p.as_rule() == Rule::unary));
    match unary {
        Some(unary) => build_unary(unary),
        None => Err(ExpressionError::Syntax {
            source_text: text.to_string(),
            col: 1,
            message: "empty expression".to_string(),
        }),
    }
}

fn build_unary(pair: Pair<Rule>) -> Result<Expression, ExpressionError> {
    let mut negations = 0usize;
    let mut operand = Expression::Undefined;
    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::negate => negations += 1,
            Rule::unary => operand = build_unary(part)?,
            _ => operand = build_primary(part)?,
        }
    }
    for _ in 0..negations {
        operand = Expression::Not(Box::new(operand));
    }
    Ok(operand)
}

fn build_primary(pair: Pair<Rule>) -> Result<Expression, ExpressionError> {
    let expr = match pair.as_rule() {
        Rule::boolean => Expression::Literal(Value::Bool(pair.as_str() == "true")),
        Rule::null => Expression::Literal(Value::Null),
        Rule::undefined => Expression::Undefined,
        Rule::number => Expression::Literal(Value::Number(parse_number(pair.as_str())?)),
        Rule::string => {
            let inner = pair.into_inner().next().map(|p| p.as_str()).unwrap_or("");
            Expression::Literal(Value::String(inner.to_string()))
        }
        Rule::path => Expression::Path(pair.into_inner().map(|p| p.as_str().to_string()).collect()),
        _ => Expression::Undefined,
    };
    Ok(expr)
}

fn parse_number(text: &str) -> Result<Number, ExpressionError> {
    if let Ok(i) = text.parse::<i64>() {
        return Ok(Number::from(i));
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .ok_or_else(|| ExpressionError::Number(text.to_string()))
}

impl Expression {
    /// Evaluate against a context. `Ok(None)` is `undefined`.
    pub fn eval<'c>(&self, ctx: &'c Context) -> Result<Option<Cow<'c, Value>>, LookupError> {
        match self {
            Expression::Literal(v) => Ok(Some(Cow::Owned(v.clone()))),
            Expression::Undefined => Ok(None),
            Expression::Path(segments) => Ok(ctx.lookup(segments)?.map(Cow::Borrowed)),
            Expression::Not(inner) => {
                let value = inner.eval(ctx)?;
                Ok(Some(Cow::Owned(Value::Bool(!is_truthy(value.as_deref())))))
            }
        }
    }

    pub fn is_truthy(&self, ctx: &Context) -> Result<bool, LookupError> {
        Ok(is_truthy(self.eval(ctx)?.as_deref()))
    }
}

impl FromStr for Expression {
    type Err = ExpressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        compile_expression(s)
    }
}

/// Canonical spelling, used by the render plan listing.
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(Value::String(s)) if s.contains('\'') => write!(f, "\"{s}\""),
            Expression::Literal(Value::String(s)) => write!(f, "'{s}'"),
            Expression::Literal(v) => write!(f, "{v}"),
            Expression::Undefined => f.write_str("undefined"),
            Expression::Path(segments) => f.write_str(&segments.join(".")),
            Expression::Not(inner) => write!(f, "!{inner}"),
        }
    }
}
