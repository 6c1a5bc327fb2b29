//! docspec — turn jsdoc doclets into a hierarchical API specification.
//!
//! The pipeline runs in one direction:
//!
//! 1. **Filter** — drop undocumented and `@ignore`d doclets ([`doclet`])
//! 2. **Collect** — give every mapped node a stable identifier ([`collect`])
//! 3. **Transform** — nest nodes under their parents ([`transform`])
//! 4. **Assemble** — wrap the tree with package info and serialize ([`spec`])
//!
//! A finished document can be rendered to markdown with [`render`].

pub mod collect;
pub mod config;
pub mod doclet;
pub mod mapper;
pub mod node;
pub mod render;
pub mod spec;
pub mod toc;
pub mod transform;

pub use config::Overrides;
pub use spec::{generate, Generated, Specification};
