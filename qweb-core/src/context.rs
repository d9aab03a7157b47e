use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// What a lookup does when a name or property is absent.
///
/// Under both policies, reading *through* a missing or `null` intermediate
/// (`user.name` when `user` is absent) is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPolicy {
    /// A missing final segment evaluates to `undefined`.
    #[default]
    Undefined,
    /// Any missing segment is a [`LookupError::Missing`].
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("`{path}` is not defined in the render context")]
    Missing { path: String },
    #[error("cannot read `{segment}` of undefined while resolving `{path}`")]
    UndefinedIntermediate { path: String, segment: String },
    #[error("cannot read `{segment}` of null while resolving `{path}`")]
    NullIntermediate { path: String, segment: String },
}

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("render context must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Read-only name → value lookup supplied to a render call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    values: Map<String, Value>,
    policy: MissingPolicy,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from a JSON object.
    pub fn from_json(value: Value) -> Result<Self, ContextError> {
        match value {
            Value::Object(values) => Ok(Self {
                values,
                policy: MissingPolicy::default(),
            }),
            other => Err(ContextError::NotAnObject(kind_name(&other))),
        }
    }

    /// Builder-style insert, for tests and embedders.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn with_policy(mut self, policy: MissingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> MissingPolicy {
        self.policy
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Resolve a dotted path. `Ok(None)` means `undefined`.
    pub fn lookup(&self, path: &[String]) -> Result<Option<&Value>, LookupError> {
        let Some((head, rest)) = path.split_first() else {
            return Ok(None);
        };
        let mut current = match self.values.get(head) {
            Some(v) => v,
            None => return self.missing(path, 0),
        };
        for (i, segment) in rest.iter().enumerate() {
            let next = match current {
                Value::Object(map) => map.get(segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                Value::Null => {
                    return Err(LookupError::NullIntermediate {
                        path: path.join("."),
                        segment: segment.clone(),
                    });
                }
                _ => None,
            };
            match next {
                Some(v) => current = v,
                None => return self.missing(path, i + 1),
            }
        }
        Ok(Some(current))
    }

    // `depth` is the index of the first segment that did not resolve.
    fn missing(&self, path: &[String], depth: usize) -> Result<Option<&Value>, LookupError> {
        if self.policy == MissingPolicy::Strict {
            return Err(LookupError::Missing {
                path: path[..=depth].join("."),
            });
        }
        match path.get(depth + 1) {
            Some(segment) => Err(LookupError::UndefinedIntermediate {
                path: path.join("."),
                segment: segment.clone(),
            }),
            None => Ok(None),
        }
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
