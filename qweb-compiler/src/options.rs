use serde::Deserialize;

/// Compiler configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Elements whose text content is kept verbatim (no whitespace folding).
    pub preserve_whitespace: Vec<String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            preserve_whitespace: vec!["pre".to_string()],
        }
    }
}

impl CompileOptions {
    pub fn preserves(&self, tag: &str) -> bool {
        self.preserve_whitespace.iter().any(|t| t == tag)
    }
}
