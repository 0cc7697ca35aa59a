//! Front-end configuration
//!
//! Settings can be built in code with the builder methods or loaded from a
//! TOML file:
//!
//! ```toml
//! max_nesting_depth = 32
//! keep_body_comments = false
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default bound on nested `match:` / `case:` / `dip:` blocks
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 64;

/// Configuration for the lexer and parser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrontendConfig {
    /// Maximum depth of nested blocks inside a body.
    ///
    /// Deeper blocks are reported and skipped without recursing, which keeps
    /// hostile input from exhausting the stack.
    pub max_nesting_depth: usize,

    /// Keep comments that appear inside bodies as `Term::Comment` nodes.
    /// Top-level comments are always kept.
    pub keep_body_comments: bool,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        FrontendConfig {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            keep_body_comments: true,
        }
    }
}

impl FrontendConfig {
    pub fn new() -> Self {
        FrontendConfig::default()
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse front-end config: {}", e))
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;
        Self::from_toml(&text)
    }

    /// Set the nesting bound (builder pattern)
    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    pub fn with_body_comments(mut self, keep: bool) -> Self {
        self.keep_body_comments = keep;
        self
    }
}
