//! Rich text source trees.
//!
//! A rich text value is stored as a JSON array of blocks:
//!
//! ```json
//! [
//!   { "tag": "h1", "children": ["Title"] },
//!   { "tag": "p", "children": ["Hello ", { "tag": "span", "styles": ["bold"], "children": ["world"] }] },
//!   { "tag": "ul", "children": [{ "tag": "li", "children": [{ "tag": "p", "children": ["item"] }] }] }
//! ]
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::file_ref::FileReference;

#[derive(Debug, Error)]
pub enum RichTextError {
    #[error("invalid rich text: {0}")]
    Invalid(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText(pub Vec<Block>);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tag", rename_all = "lowercase")]
pub enum Block {
    P { children: Vec<Inline> },
    H1 { children: Vec<Inline> },
    H2 { children: Vec<Inline> },
    H3 { children: Vec<Inline> },
    H4 { children: Vec<Inline> },
    H5 { children: Vec<Inline> },
    H6 { children: Vec<Inline> },
    Ul { children: Vec<ListItem> },
    Ol { children: Vec<ListItem> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tag")]
pub enum ListItem {
    #[serde(rename = "li")]
    Li { children: Vec<Block> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Inline {
    Text(String),
    Node(InlineNode),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tag", rename_all = "lowercase")]
pub enum InlineNode {
    Span { styles: Vec<Style>, children: Vec<Inline> },
    A { href: String, children: Vec<Inline> },
    Br,
    Img { src: FileReference },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Style {
    Bold,
    Italic,
    LineThrough,
}

impl RichText {
    pub fn from_source(value: &Value) -> Result<RichText, RichTextError> {
        Ok(RichText::deserialize(value)?)
    }

    pub fn to_source(&self) -> Result<Value, RichTextError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Text content with one line per block. Line breaks become `\n`.
    pub fn plain_text(&self) -> String {
        let mut lines = Vec::new();
        for block in &self.0 {
            block_lines(block, &mut lines);
        }
        lines.join("\n")
    }

    /// Every inline image with its patch steps relative to the rich text
    /// root, e.g. `["1", "children", "0", "src"]`.
    pub fn images(&self) -> Vec<(Vec<String>, &FileReference)> {
        let mut out = Vec::new();
        let mut steps = Vec::new();
        for (i, block) in self.0.iter().enumerate() {
            steps.push(i.to_string());
            block_images(block, &mut steps, &mut out);
            steps.pop();
        }
        out
    }
}

impl Block {
    fn inlines(&self) -> Option<&[Inline]> {
        match self {
            Block::P { children }
            | Block::H1 { children }
            | Block::H2 { children }
            | Block::H3 { children }
            | Block::H4 { children }
            | Block::H5 { children }
            | Block::H6 { children } => Some(children),
            Block::Ul { .. } | Block::Ol { .. } => None,
        }
    }

    fn items(&self) -> &[ListItem] {
        match self {
            Block::Ul { children } | Block::Ol { children } => children,
            _ => &[],
        }
    }
}

fn block_lines(block: &Block, lines: &mut Vec<String>) {
    match block.inlines() {
        Some(inlines) => {
            let mut text = String::new();
            for inline in inlines {
                inline_text(inline, &mut text);
            }
            lines.push(text);
        }
        None => {
            for ListItem::Li { children } in block.items() {
                for child in children {
                    block_lines(child, lines);
                }
            }
        }
    }
}

fn inline_text(inline: &Inline, out: &mut String) {
    match inline {
        Inline::Text(text) => out.push_str(text),
        Inline::Node(InlineNode::Span { children, .. } | InlineNode::A { children, .. }) => {
            for child in children {
                inline_text(child, out);
            }
        }
        Inline::Node(InlineNode::Br) => out.push('\n'),
        Inline::Node(InlineNode::Img { .. }) => {}
    }
}

fn block_images<'a>(
    block: &'a Block,
    steps: &mut Vec<String>,
    out: &mut Vec<(Vec<String>, &'a FileReference)>,
) {
    steps.push("children".into());
    match block.inlines() {
        Some(inlines) => {
            for (i, inline) in inlines.iter().enumerate() {
                steps.push(i.to_string());
                inline_images(inline, steps, out);
                steps.pop();
            }
        }
        None => {
            for (i, ListItem::Li { children }) in block.items().iter().enumerate() {
                steps.push(i.to_string());
                steps.push("children".into());
                for (j, child) in children.iter().enumerate() {
                    steps.push(j.to_string());
                    block_images(child, steps, out);
                    steps.pop();
                }
                steps.pop();
                steps.pop();
            }
        }
    }
    steps.pop();
}

fn inline_images<'a>(
    inline: &'a Inline,
    steps: &mut Vec<String>,
    out: &mut Vec<(Vec<String>, &'a FileReference)>,
) {
    match inline {
        Inline::Text(_) | Inline::Node(InlineNode::Br) => {}
        Inline::Node(InlineNode::Img { src }) => {
            let mut path = steps.clone();
            path.push("src".into());
            out.push((path, src));
        }
        Inline::Node(InlineNode::Span { children, .. } | InlineNode::A { children, .. }) => {
            steps.push("children".into());
            for (i, child) in children.iter().enumerate() {
                steps.push(i.to_string());
                inline_images(child, steps, out);
                steps.pop();
            }
            steps.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!([
            { "tag": "h1", "children": ["Title"] },
            { "tag": "p", "children": [
                "Hello ",
                { "tag": "span", "styles": ["bold", "line-through"], "children": ["world"] },
                { "tag": "br" },
                { "tag": "a", "href": "https://example.com", "children": ["link"] }
            ] },
            { "tag": "ul", "children": [
                { "tag": "li", "children": [
                    { "tag": "p", "children": [
                        { "tag": "img", "src": { "_ref": "/public/a.png", "_type": "file" } }
                    ] }
                ] }
            ] }
        ])
    }

    #[test]
    fn source_round_trip() {
        let source = sample();
        let text = RichText::from_source(&source).unwrap();
        assert_eq!(text.0.len(), 3);
        assert_eq!(text.to_source().unwrap(), source);
    }

    #[test]
    fn plain_text() {
        let text = RichText::from_source(&sample()).unwrap();
        assert_eq!(text.plain_text(), "Title\nHello world\nlink\n");
    }

    #[test]
    fn image_steps() {
        let text = RichText::from_source(&sample()).unwrap();
        let images = text.images();
        assert_eq!(images.len(), 1);
        assert_eq!(
            images[0].0,
            ["2", "children", "0", "children", "0", "children", "0", "src"]
        );
        assert_eq!(images[0].1.reference, "/public/a.png");
    }

    #[test]
    fn rejects_unknown_tags() {
        assert!(RichText::from_source(&json!([{ "tag": "table", "children": [] }])).is_err());
        assert!(RichText::from_source(&json!("plain")).is_err());
    }
}
