//! Markdown Intermediate Representation
//!
//! Parses markdown syntax into a strongly-typed tree by folding
//! `pulldown-cmark` start/end events over a frame stack.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Parser, Tag};

#[derive(Debug, Clone, PartialEq)]
pub enum MarkdownNode {
    Heading(u32, Vec<MarkdownNode>),
    Paragraph(Vec<MarkdownNode>),
    Text(String),
    InlineCode(String),
    Emphasis(Vec<MarkdownNode>),
    Strong(Vec<MarkdownNode>),
    CodeBlock(String, String), // language, content
    List(Option<u64>, Vec<MarkdownNode>), // first number of an ordered list
    ListItem(Vec<MarkdownNode>),
    Blockquote(Vec<MarkdownNode>),
    Link(String, String),  // url, text
    Image(String, String), // url, alt_text
    LineBreak,
    Rule,
}

impl MarkdownNode {
    /// Inline nodes live inside a paragraph-like block.
    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            MarkdownNode::Text(_)
                | MarkdownNode::InlineCode(_)
                | MarkdownNode::Emphasis(_)
                | MarkdownNode::Strong(_)
                | MarkdownNode::Link(..)
                | MarkdownNode::Image(..)
                | MarkdownNode::LineBreak
        )
    }

    /// Concatenated text content, without any markup.
    pub fn text(&self) -> String {
        match self {
            MarkdownNode::Text(t) | MarkdownNode::InlineCode(t) => t.clone(),
            MarkdownNode::CodeBlock(_, content) => content.clone(),
            MarkdownNode::Link(_, text) | MarkdownNode::Image(_, text) => text.clone(),
            MarkdownNode::LineBreak => "\n".to_string(),
            MarkdownNode::Rule => String::new(),
            MarkdownNode::Heading(_, children)
            | MarkdownNode::Paragraph(children)
            | MarkdownNode::Emphasis(children)
            | MarkdownNode::Strong(children)
            | MarkdownNode::List(_, children)
            | MarkdownNode::ListItem(children)
            | MarkdownNode::Blockquote(children) => children.iter().map(Self::text).collect(),
        }
    }
}

enum Frame {
    Heading(u32),
    Paragraph,
    Emphasis,
    Strong,
    CodeBlock(String),
    List(Option<u64>),
    Item,
    Blockquote,
    Link(String),
    Image(String),
    /// Containers without an IR node (tables, strikethrough, footnotes):
    /// their children are spliced into the parent.
    Transparent,
}

#[derive(Default)]
struct TreeBuilder {
    stack: Vec<(Frame, Vec<MarkdownNode>)>,
    root: Vec<MarkdownNode>,
}

impl TreeBuilder {
    fn children(&mut self) -> &mut Vec<MarkdownNode> {
        match self.stack.last_mut() {
            Some((_, children)) => children,
            None => &mut self.root,
        }
    }

    fn push(&mut self, node: MarkdownNode) {
        let children = self.children();
        if let (MarkdownNode::Text(new), Some(MarkdownNode::Text(last))) = (&node, children.last_mut()) {
            last.push_str(new);
            return;
        }
        children.push(node);
    }

    fn open(&mut self, tag: Tag<'_>) {
        let frame = match tag {
            Tag::Paragraph => Frame::Paragraph,
            Tag::Heading(level, ..) => Frame::Heading(heading_level(level)),
            Tag::BlockQuote => Frame::Blockquote,
            Tag::CodeBlock(CodeBlockKind::Fenced(lang)) => Frame::CodeBlock(lang.to_string()),
            Tag::CodeBlock(CodeBlockKind::Indented) => Frame::CodeBlock(String::new()),
            Tag::List(start) => Frame::List(start),
            Tag::Item => Frame::Item,
            Tag::Emphasis => Frame::Emphasis,
            Tag::Strong => Frame::Strong,
            Tag::Link(_, url, _) => Frame::Link(url.to_string()),
            Tag::Image(_, url, _) => Frame::Image(url.to_string()),
            _ => Frame::Transparent,
        };
        self.stack.push((frame, Vec::new()));
    }

    fn close(&mut self) {
        let Some((frame, children)) = self.stack.pop() else {
            return;
        };
        let node = match frame {
            Frame::Heading(level) => MarkdownNode::Heading(level, children),
            Frame::Paragraph => MarkdownNode::Paragraph(children),
            Frame::Emphasis => MarkdownNode::Emphasis(children),
            Frame::Strong => MarkdownNode::Strong(children),
            Frame::CodeBlock(lang) => {
                MarkdownNode::CodeBlock(lang, children.iter().map(MarkdownNode::text).collect())
            }
            Frame::List(start) => MarkdownNode::List(start, children),
            Frame::Item => MarkdownNode::ListItem(children),
            Frame::Blockquote => MarkdownNode::Blockquote(children),
            Frame::Link(url) => MarkdownNode::Link(url, children.iter().map(MarkdownNode::text).collect()),
            Frame::Image(url) => MarkdownNode::Image(url, children.iter().map(MarkdownNode::text).collect()),
            Frame::Transparent => {
                for child in children {
                    self.push(child);
                }
                return;
            }
        };
        self.push(node);
    }

    fn finish(mut self) -> Vec<MarkdownNode> {
        while !self.stack.is_empty() {
            self.close();
        }
        self.root
    }
}

fn heading_level(level: HeadingLevel) -> u32 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

pub struct IrParser;

impl IrParser {
    /// Parse Markdown into the IR. Never fails: partial or malformed input
    /// (common mid-stream) parses as whatever CommonMark makes of it.
    pub fn parse(markdown: &str) -> Vec<MarkdownNode> {
        let mut builder = TreeBuilder::default();
        for event in Parser::new(markdown) {
            match event {
                Event::Start(tag) => builder.open(tag),
                Event::End(_) => builder.close(),
                Event::Text(text) | Event::Html(text) => {
                    builder.push(MarkdownNode::Text(text.to_string()))
                }
                Event::Code(code) => builder.push(MarkdownNode::InlineCode(code.to_string())),
                Event::SoftBreak => builder.push(MarkdownNode::Text("\n".to_string())),
                Event::HardBreak => builder.push(MarkdownNode::LineBreak),
                Event::Rule => builder.push(MarkdownNode::Rule),
                Event::TaskListMarker(done) => {
                    builder.push(MarkdownNode::Text(if done { "[x] " } else { "[ ] " }.to_string()))
                }
                Event::FootnoteReference(name) => {
                    builder.push(MarkdownNode::Text(format!("[^{name}]")))
                }
            }
        }
        builder.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_heading_and_paragraph() {
        let nodes = IrParser::parse("# Pizza\n\nKnead the **dough**.");
        assert_eq!(
            nodes,
            vec![
                MarkdownNode::Heading(1, vec![MarkdownNode::Text("Pizza".into())]),
                MarkdownNode::Paragraph(vec![
                    MarkdownNode::Text("Knead the ".into()),
                    MarkdownNode::Strong(vec![MarkdownNode::Text("dough".into())]),
                    MarkdownNode::Text(".".into()),
                ]),
            ]
        );
    }

    #[test]
    fn parses_fenced_code_block() {
        let nodes = IrParser::parse("```rust\nfn main() {}\n```\n");
        assert_eq!(
            nodes,
            vec![MarkdownNode::CodeBlock("rust".into(), "fn main() {}\n".into())]
        );
    }

    #[test]
    fn parses_ordered_list_and_link() {
        let nodes = IrParser::parse("3. first\n4. see [docs](https://example.com)\n");
        let MarkdownNode::List(Some(3), items) = &nodes[0] else {
            panic!("expected ordered list, got {nodes:?}");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[1],
            MarkdownNode::ListItem(vec![
                MarkdownNode::Text("see ".into()),
                MarkdownNode::Link("https://example.com".into(), "docs".into()),
            ])
        );
    }

    #[test]
    fn unterminated_code_block_still_parses() {
        let nodes = IrParser::parse("```\nstill streaming");
        assert!(matches!(&nodes[0], MarkdownNode::CodeBlock(lang, body) if lang.is_empty() && body.contains("still streaming")));
    }
}
