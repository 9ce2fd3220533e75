//! Code block extraction, so a reply's snippets can be printed without
//! styling for copy and paste.

use crate::ir::MarkdownNode;

pub struct CodeBlockAnalyzer;

impl CodeBlockAnalyzer {
    /// Extracts all code blocks from the tree as `(language, content)`, in
    /// document order, including blocks nested in lists and quotes.
    pub fn extract_blocks(nodes: &[MarkdownNode]) -> Vec<(String, String)> {
        let mut blocks = Vec::new();
        collect(nodes, &mut blocks);
        blocks
    }
}

fn collect(nodes: &[MarkdownNode], blocks: &mut Vec<(String, String)>) {
    for node in nodes {
        match node {
            MarkdownNode::CodeBlock(lang, content) => blocks.push((lang.clone(), content.clone())),
            MarkdownNode::Heading(_, children)
            | MarkdownNode::Paragraph(children)
            | MarkdownNode::Emphasis(children)
            | MarkdownNode::Strong(children)
            | MarkdownNode::List(_, children)
            | MarkdownNode::ListItem(children)
            | MarkdownNode::Blockquote(children) => collect(children, blocks),
            _ => {}
        }
    }
}
