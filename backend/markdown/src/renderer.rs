use crate::ir::MarkdownNode;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const ITALIC: &str = "\x1b[3m";
const UNDERLINE: &str = "\x1b[4m";
const CYAN: &str = "\x1b[36m";

#[derive(Clone, Copy, PartialEq)]
enum Style {
    Plain,
    Ansi,
}

impl Style {
    fn wrap(self, codes: &str, text: &str) -> String {
        match self {
            Style::Plain => text.to_string(),
            Style::Ansi => format!("{codes}{text}{RESET}"),
        }
    }
}

pub struct Renderer;

impl Renderer {
    /// Render the IR as unstyled terminal text.
    pub fn to_plain_text(nodes: &[MarkdownNode]) -> String {
        render_document(nodes, Style::Plain)
    }

    /// Render the IR with ANSI styling for a color terminal.
    pub fn to_ansi(nodes: &[MarkdownNode]) -> String {
        render_document(nodes, Style::Ansi)
    }
}

fn render_document(nodes: &[MarkdownNode], style: Style) -> String {
    let blocks = render_blocks(nodes, style);
    if blocks.is_empty() {
        return String::new();
    }
    let mut out = blocks.join("\n\n");
    out.push('\n');
    out
}

/// Renders a sequence of nodes into blocks. Runs of inline nodes (tight list
/// items have no paragraph wrapper) are grouped into a single block.
fn render_blocks(nodes: &[MarkdownNode], style: Style) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut inline_run: Vec<&MarkdownNode> = Vec::new();

    for node in nodes {
        if node.is_inline() {
            inline_run.push(node);
            continue;
        }
        if !inline_run.is_empty() {
            blocks.push(render_inline_run(&inline_run, style));
            inline_run.clear();
        }
        blocks.push(render_block(node, style));
    }
    if !inline_run.is_empty() {
        blocks.push(render_inline_run(&inline_run, style));
    }
    blocks
}

fn render_block(node: &MarkdownNode, style: Style) -> String {
    match node {
        MarkdownNode::Paragraph(children) => render_inline(children, style),
        MarkdownNode::Heading(level, children) => {
            let text = render_inline(children, style);
            match style {
                Style::Plain => text,
                Style::Ansi if *level <= 2 => format!("{BOLD}{UNDERLINE}{text}{RESET}"),
                Style::Ansi => format!("{BOLD}{text}{RESET}"),
            }
        }
        MarkdownNode::CodeBlock(_, content) => content
            .trim_end_matches('\n')
            .lines()
            .map(|line| style.wrap(DIM, &format!("    {line}")))
            .collect::<Vec<_>>()
            .join("\n"),
        MarkdownNode::List(start, items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let marker = match start {
                    Some(first) => format!("{}. ", first + i as u64),
                    None => "• ".to_string(),
                };
                let body = match item {
                    MarkdownNode::ListItem(children) => render_blocks(children, style).join("\n"),
                    other => render_block(other, style),
                };
                hang(&marker, &body)
            })
            .collect::<Vec<_>>()
            .join("\n"),
        MarkdownNode::ListItem(children) => render_blocks(children, style).join("\n"),
        MarkdownNode::Blockquote(children) => {
            let bar = match style {
                Style::Plain => "> ".to_string(),
                Style::Ansi => format!("{DIM}│{RESET} "),
            };
            render_blocks(children, style)
                .join("\n\n")
                .lines()
                .map(|line| format!("{bar}{line}"))
                .collect::<Vec<_>>()
                .join("\n")
        }
        MarkdownNode::Rule => match style {
            Style::Plain => "---".to_string(),
            Style::Ansi => style.wrap(DIM, &"─".repeat(40)),
        },
        inline => render_inline(std::slice::from_ref(inline), style),
    }
}

/// Prefixes the first line with `marker` and indents the rest to match.
fn hang(marker: &str, body: &str) -> String {
    let indent = " ".repeat(marker.chars().count());
    let mut lines = body.lines();
    let mut out = format!("{marker}{}", lines.next().unwrap_or_default());
    for line in lines {
        out.push('\n');
        if !line.is_empty() {
            out.push_str(&indent);
            out.push_str(line);
        }
    }
    out
}

fn render_inline_run(nodes: &[&MarkdownNode], style: Style) -> String {
    nodes.iter().map(|node| render_inline_node(node, style)).collect()
}

fn render_inline(nodes: &[MarkdownNode], style: Style) -> String {
    nodes.iter().map(|node| render_inline_node(node, style)).collect()
}

fn render_inline_node(node: &MarkdownNode, style: Style) -> String {
    match node {
        MarkdownNode::Text(text) => text.clone(),
        MarkdownNode::InlineCode(code) => style.wrap(CYAN, code),
        MarkdownNode::Emphasis(children) => style.wrap(ITALIC, &render_inline(children, style)),
        MarkdownNode::Strong(children) => style.wrap(BOLD, &render_inline(children, style)),
        MarkdownNode::Link(url, text) if text.is_empty() || text == url => style.wrap(UNDERLINE, url),
        MarkdownNode::Link(url, text) => {
            format!("{} {}", style.wrap(UNDERLINE, text), style.wrap(DIM, &format!("({url})")))
        }
        MarkdownNode::Image(url, alt) => style.wrap(DIM, &format!("[image: {alt}] ({url})")),
        MarkdownNode::LineBreak => "\n".to_string(),
        block => render_block(block, style),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::IrParser;

    #[test]
    fn plain_text_drops_markup() {
        let nodes = IrParser::parse("# Steps\n\nUse *fresh* **basil** and `olive oil`.");
        assert_eq!(
            Renderer::to_plain_text(&nodes),
            "Steps\n\nUse fresh basil and olive oil.\n"
        );
    }

    #[test]
    fn renders_lists_with_markers() {
        let nodes = IrParser::parse("1. Make dough\n2. Add sauce\n\n- cheese\n- basil\n");
        assert_eq!(
            Renderer::to_plain_text(&nodes),
            "1. Make dough\n2. Add sauce\n\n• cheese\n• basil\n"
        );
    }

    #[test]
    fn renders_code_block_indented() {
        let nodes = IrParser::parse("```sh\ncargo run\n```\n");
        assert_eq!(Renderer::to_plain_text(&nodes), "    cargo run\n");
    }

    #[test]
    fn renders_blockquote_and_link() {
        let nodes = IrParser::parse("> see [docs](https://example.com)\n");
        assert_eq!(
            Renderer::to_plain_text(&nodes),
            "> see docs (https://example.com)\n"
        );
    }

    #[test]
    fn ansi_styles_strong_and_code() {
        let nodes = IrParser::parse("**bold** `x`");
        let out = Renderer::to_ansi(&nodes);
        assert!(out.contains("\x1b[1mbold\x1b[0m"));
        assert!(out.contains("\x1b[36mx\x1b[0m"));
    }

    #[test]
    fn empty_input_renders_empty() {
        assert_eq!(Renderer::to_plain_text(&IrParser::parse("")), "");
    }
}
