//! Renderers for finished specification documents.

pub mod markdown;

pub use markdown::{to_markdown, Markdown};
