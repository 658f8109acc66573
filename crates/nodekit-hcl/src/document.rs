//! In-memory HCL document.
//!
//! The document is built incrementally, one appended block at a time, and
//! serialized exactly once per provisioning run. Blocks are never mutated
//! after the fact; de-duplication happens up front through [`Document::has_block`].

use crate::error::{HclError, Result};
use crate::value::Value;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// A named attribute inside a block body.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub value: Value,
}

/// Body of a block: attributes in insertion order, then nested blocks.
#[derive(Debug, Clone, Default)]
pub struct Body {
    attributes: Vec<Attribute>,
    blocks: Vec<Block>,
}

impl Body {
    pub fn set_attribute(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        self.attributes.push(Attribute {
            name: name.into(),
            value,
        });
        self
    }

    /// Appends a nested block and returns its body for further population.
    pub fn append_block(&mut self, block_type: &str, labels: &[&str]) -> &mut Body {
        let idx = self.blocks.len();
        self.blocks.push(Block::new(block_type, labels));
        &mut self.blocks[idx].body
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Value of the first attribute with this name, if set.
    pub fn get_attribute(&self, name: &str) -> Option<&Value> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| &a.value)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    fn render(&self, out: &mut String, indent: usize) {
        let pad = "  ".repeat(indent);
        for attr in &self.attributes {
            let _ = writeln!(out, "{pad}{} = {}", attr.name, attr.value);
        }
        for block in &self.blocks {
            block.render(out, indent);
        }
    }
}

/// A block: type, quoted labels, and a body.
#[derive(Debug, Clone)]
pub struct Block {
    block_type: String,
    labels: Vec<String>,
    body: Body,
}

impl Block {
    pub fn new(block_type: &str, labels: &[&str]) -> Self {
        Self {
            block_type: block_type.to_string(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            body: Body::default(),
        }
    }

    pub fn block_type(&self) -> &str {
        &self.block_type
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn render(&self, out: &mut String, indent: usize) {
        let pad = "  ".repeat(indent);
        let _ = write!(out, "{pad}{}", self.block_type);
        for label in &self.labels {
            let _ = write!(out, " \"{label}\"");
        }
        let _ = writeln!(out, " {{");
        self.body.render(out, indent + 1);
        let _ = writeln!(out, "{pad}}}");
    }
}

/// An ordered collection of top-level blocks, rendered to a single `.tf` file.
#[derive(Debug, Clone, Default)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a top-level block and returns its body for population.
    pub fn append_block(&mut self, block_type: &str, labels: &[&str]) -> &mut Body {
        let idx = self.blocks.len();
        self.blocks.push(Block::new(block_type, labels));
        &mut self.blocks[idx].body
    }

    /// True when a block of this type already carries every required label.
    ///
    /// Used before emitting shared resources (the private-key-generation
    /// block) and incremental security group rules, so repeated builder
    /// calls never declare the same resource twice. With no matching block
    /// in the document this returns false.
    pub fn has_block(&self, block_type: &str, labels: &[&str]) -> bool {
        self.blocks.iter().any(|block| {
            block.block_type == block_type
                && labels
                    .iter()
                    .all(|wanted| block.labels.iter().any(|have| have == wanted))
        })
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Blocks of a given type, in declaration order.
    pub fn blocks_of_type<'a>(&'a self, block_type: &'a str) -> impl Iterator<Item = &'a Block> {
        self.blocks
            .iter()
            .filter(move |b| b.block_type == block_type)
    }

    /// Renders the whole document as HCL text.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            block.render(&mut out, 0);
        }
        out
    }

    /// Writes the rendered document to `path`, overwriting any previous run.
    pub fn save(&self, path: &Path) -> Result<PathBuf> {
        std::fs::write(path, self.render()).map_err(|source| HclError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        let mut doc = Document::new();
        let provider = doc.append_block("provider", &["aws"]);
        provider.set_attribute("region", Value::string("us-east-1"));

        let sg = doc.append_block("resource", &["aws_security_group", "node_sg"]);
        sg.set_attribute("name", Value::string("validator-sg"));
        let ingress = sg.append_block("ingress", &[]);
        ingress.set_attribute("from_port", Value::int(22));
        ingress.set_attribute("to_port", Value::int(22));
        doc
    }

    #[test]
    fn renders_nested_blocks() {
        let text = sample().render();
        assert_eq!(
            text,
            "provider \"aws\" {\n  region = \"us-east-1\"\n}\n\n\
             resource \"aws_security_group\" \"node_sg\" {\n  name = \"validator-sg\"\n  \
             ingress {\n    from_port = 22\n    to_port = 22\n  }\n}\n"
        );
    }

    #[test]
    fn has_block_requires_all_labels() {
        let doc = sample();
        assert!(doc.has_block("resource", &["aws_security_group", "node_sg"]));
        assert!(doc.has_block("resource", &["aws_security_group"]));
        assert!(!doc.has_block("resource", &["aws_security_group", "other"]));
    }

    #[test]
    fn has_block_is_false_on_empty_document() {
        let doc = Document::new();
        assert!(!doc.has_block("resource", &["tls_private_key", "pk"]));
        assert!(!doc.has_block("resource", &[]));
    }

    #[test]
    fn save_writes_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node_config.tf");
        let written = sample().save(&path).unwrap();
        assert_eq!(written, path);
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("resource \"aws_security_group\" \"node_sg\""));
    }
}
