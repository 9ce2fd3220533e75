//! Markdown Intermediate Representation and Renderers
//!
//! Model replies are Markdown. This crate parses them into a small typed tree
//! and renders it as plain text or ANSI-styled terminal output.

pub mod code_block;
pub mod ir;
pub mod renderer;

pub use code_block::CodeBlockAnalyzer;
pub use ir::{IrParser, MarkdownNode};
pub use renderer::Renderer;
