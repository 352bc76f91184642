//! Configuration model - typed collection of declared blocks
//!
//! A `Configuration` holds every top-level block of one input file in
//! source order. Blocks keep their raw body text so the original source
//! can be reconstructed for external plan/validate tools.

use indexmap::IndexMap;
use serde::Serialize;

/// Kind of a top-level declaration block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Provider,
    Variable,
    Output,
    Resource,
}

impl BlockKind {
    /// The declaration keyword as it appears in source.
    pub fn keyword(&self) -> &'static str {
        match self {
            BlockKind::Provider => "provider",
            BlockKind::Variable => "variable",
            BlockKind::Output => "output",
            BlockKind::Resource => "resource",
        }
    }

    /// Parse a declaration keyword.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "provider" => Some(BlockKind::Provider),
            "variable" => Some(BlockKind::Variable),
            "output" => Some(BlockKind::Output),
            "resource" => Some(BlockKind::Resource),
            _ => None,
        }
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// An attribute value retaining its literal syntax for later
/// classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum RawValue {
    /// Quoted string, stored without the surrounding quotes.
    Str(String),
    /// List literal, stored verbatim including the brackets.
    List(String),
    /// Map literal, stored verbatim including the braces.
    Map(String),
    /// Bare token: number, boolean, or a dotted reference expression.
    Bare(String),
}

impl RawValue {
    /// The stored text, however the value was spelled.
    pub fn text(&self) -> &str {
        match self {
            RawValue::Str(s) | RawValue::List(s) | RawValue::Map(s) | RawValue::Bare(s) => s,
        }
    }

    /// Render the value back to source syntax.
    pub fn to_source(&self) -> String {
        match self {
            RawValue::Str(s) => format!("\"{}\"", s),
            RawValue::List(s) | RawValue::Map(s) | RawValue::Bare(s) => s.clone(),
        }
    }
}

/// Flat attribute map of one block. Nested sub-blocks are not flattened
/// into it.
pub type PropertyMap = IndexMap<String, RawValue>;

/// One top-level declaration in the configuration DSL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub kind: BlockKind,
    /// First label: resource type for `resource` blocks, the name for
    /// single-label blocks (`provider "aws"`, `variable "x"`).
    pub type_label: Option<String>,
    /// Second label: the resource name for `resource` blocks.
    pub name_label: Option<String>,
    /// Body text between the enclosing braces, verbatim.
    pub body: String,
    /// Flat attribute map scanned from `body`.
    pub properties: PropertyMap,
}

impl Block {
    pub fn new(kind: BlockKind, body: impl Into<String>) -> Self {
        Self {
            kind,
            type_label: None,
            name_label: None,
            body: body.into(),
            properties: PropertyMap::new(),
        }
    }

    pub fn with_labels(
        mut self,
        type_label: Option<String>,
        name_label: Option<String>,
    ) -> Self {
        self.type_label = type_label;
        self.name_label = name_label;
        self
    }

    /// Look up a scanned attribute.
    pub fn property(&self, name: &str) -> Option<&RawValue> {
        self.properties.get(name)
    }

    /// Display address, e.g. `aws_instance.web` or `variable.region`.
    pub fn address(&self) -> String {
        match (&self.type_label, &self.name_label) {
            (Some(t), Some(n)) => format!("{}.{}", t, n),
            (Some(t), None) => format!("{}.{}", self.kind, t),
            _ => self.kind.to_string(),
        }
    }

    /// Render the block back to source syntax, preserving the original
    /// body text.
    pub fn to_source(&self) -> String {
        let mut out = String::from(self.kind.keyword());
        if let Some(t) = &self.type_label {
            out.push_str(&format!(" \"{}\"", t));
        }
        if let Some(n) = &self.name_label {
            out.push_str(&format!(" \"{}\"", n));
        }
        out.push_str(" {");
        out.push_str(&self.body);
        out.push('}');
        out
    }
}

/// All declared blocks of one configuration, in source order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Configuration {
    pub blocks: Vec<Block>,
}

impl Configuration {
    pub fn new(blocks: Vec<Block>) -> Self {
        let config = Self { blocks };
        config.warn_duplicates();
        config
    }

    fn warn_duplicates(&self) {
        let mut seen = std::collections::HashSet::new();
        for block in &self.blocks {
            if block.kind == BlockKind::Provider {
                continue;
            }
            let identity = (block.kind, &block.type_label, &block.name_label);
            if !seen.insert(identity) {
                tracing::warn!(
                    address = %block.address(),
                    "duplicate declaration ignored by lookup (first occurrence wins)"
                );
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn resources(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(|b| b.kind == BlockKind::Resource)
    }

    pub fn providers(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(|b| b.kind == BlockKind::Provider)
    }

    pub fn variables(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(|b| b.kind == BlockKind::Variable)
    }

    pub fn outputs(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(|b| b.kind == BlockKind::Output)
    }

    /// Find a resource by `(type_label, name_label)`. First occurrence
    /// wins when the same identity was declared twice.
    pub fn find_resource(&self, type_label: &str, name_label: &str) -> Option<&Block> {
        self.resources().find(|b| {
            b.type_label.as_deref() == Some(type_label)
                && b.name_label.as_deref() == Some(name_label)
        })
    }

    /// Find a variable declaration by name.
    pub fn find_variable(&self, name: &str) -> Option<&Block> {
        self.variables()
            .find(|b| b.type_label.as_deref() == Some(name))
    }

    /// Find a provider block by provider name.
    pub fn find_provider(&self, name: &str) -> Option<&Block> {
        self.providers()
            .find(|b| b.type_label.as_deref() == Some(name))
    }

    /// Reconstruct DSL source for the whole configuration, in block
    /// order. Body text is emitted verbatim, so the round trip is
    /// faithful for everything the scanner recognized.
    pub fn to_source(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            out.push_str(&block.to_source());
            out.push_str("\n\n");
        }
        out
    }
}
