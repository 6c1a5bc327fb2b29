//! GitHub-flavored markdown renderer for specification documents.
//!
//! Walks the document depth first: root entries, then root definitions, and
//! inside every node its entries, static entries, events and definitions.
//! Every node contributes a TOC line and a content block. Named types become
//! reference-style links, resolved against the headings seen during the walk.

use crate::node::{Container, Node, NodeKind};
use crate::spec::Specification;
use crate::toc::{self, Slugs};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Children visited under a node, in this order.
const CONTAINERS: [Container; 4] = [
    Container::Entries,
    Container::StaticEntries,
    Container::Events,
    Container::Definitions,
];

/// Deepest heading level markdown has.
const MAX_HEADING: usize = 6;

/// Rendered pieces of a document.
#[derive(Debug, Default)]
pub struct Markdown {
    title: Option<String>,
    summary: Vec<String>,
    toc: Vec<String>,
    content: String,
    references: BTreeMap<String, String>,
}

impl Markdown {
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Table of contents, one line per heading.
    pub fn toc(&self) -> String {
        self.toc.join("\n")
    }

    /// Reference link definitions (`[key]: link`), one per key.
    pub fn references(&self) -> String {
        self.references
            .iter()
            .map(|(key, link)| format!("[{}]: {}", key, link))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Complete markdown file: title, summary, TOC, content, references.
    pub fn document(&self) -> String {
        let mut out = String::new();
        if let Some(ref title) = self.title {
            out.push_str(&format!("# {}\n\n", title));
        }
        for line in &self.summary {
            out.push_str(line);
            out.push_str("\n\n");
        }
        if !self.toc.is_empty() {
            out.push_str("## Table of contents\n\n");
            out.push_str(&self.toc());
            out.push_str("\n\n");
        }
        out.push_str(&self.content);
        if !self.references.is_empty() {
            out.push_str(&self.references());
            out.push('\n');
        }
        out
    }
}

/// Render a specification document.
pub fn to_markdown(spec: &Specification) -> Markdown {
    let mut walker = Walker::default();
    // The TOC heading itself takes an anchor.
    walker.slugs.assign("Table of contents");

    for (name, node) in &spec.entries {
        walker.node(name, name, node, 0);
    }
    if !spec.definitions.is_empty() {
        let slug = walker.slugs.assign("Definitions");
        walker.toc.push(toc::render_toc_item("Definitions", &slug, 0));
        walker.content.push_str("## Definitions\n\n");
        for (name, node) in &spec.definitions {
            walker.node(name, name, node, 1);
        }
    }

    let references = walker
        .wanted
        .iter()
        .filter_map(|name| {
            let slug = walker.anchors.get(name)?;
            Some((name.clone(), format!("#{}", slug)))
        })
        .collect();

    let mut summary = Vec::new();
    let mut facts = Vec::new();
    if let Some(ref version) = spec.info.version {
        facts.push(format!("Version: `{}`", version));
    }
    if let Some(ref license) = spec.info.license {
        facts.push(format!("License: `{}`", license));
    }
    if !facts.is_empty() {
        summary.push(format!("> {}", facts.join(" · ")));
    }
    if let Some(ref description) = spec.info.description {
        if !description.is_empty() {
            summary.push(description.clone());
        }
    }

    Markdown {
        title: spec.info.name.clone().filter(|n| !n.is_empty()),
        summary,
        toc: walker.toc,
        content: walker.content,
        references,
    }
}

#[derive(Default)]
struct Walker {
    slugs: Slugs,
    /// Display name → first anchor assigned to it.
    anchors: HashMap<String, String>,
    /// Type names used in link position.
    wanted: BTreeSet<String>,
    toc: Vec<String>,
    content: String,
}

impl Walker {
    fn node(&mut self, key: &str, qualified: &str, node: &Node, depth: usize) {
        let slug = self.slugs.assign(qualified);
        self.anchors.entry(key.to_string()).or_insert_with(|| slug.clone());
        self.anchors
            .entry(qualified.to_string())
            .or_insert_with(|| slug.clone());
        self.toc.push(toc::render_toc_item(qualified, &slug, depth));

        let block = self.block(qualified, node, depth);
        self.content.push_str(&block);
        self.content.push('\n');

        for container in CONTAINERS {
            for (name, child) in node.children(container) {
                let child_name = qualify(qualified, node.kind, container, name);
                self.node(name, &child_name, child, depth + 1);
            }
        }
    }

    fn block(&mut self, qualified: &str, node: &Node, depth: usize) -> String {
        let mut lines: Vec<String> = Vec::new();
        let level = (depth + 2).min(MAX_HEADING);
        lines.push(format!("{} {}\n", "#".repeat(level), qualified));

        let badges = self.badges(node);
        if !badges.is_empty() {
            lines.push(badges);
            lines.push(String::new());
        }

        if let Some(ref desc) = node.description {
            if !desc.is_empty() {
                lines.push(desc.clone());
                lines.push(String::new());
            }
        }

        if !node.params.is_empty() {
            lines.push("#### Parameters\n".to_string());
            for param in &node.params {
                let name = param.name.as_deref().unwrap_or("");
                self.value_lines(&mut lines, name, param, 0);
            }
            lines.push(String::new());
        }

        if let Some(ref returns) = node.returns {
            lines.push("#### Returns\n".to_string());
            let mut item = format!("* ({})", self.type_label(returns));
            if let Some(ref desc) = returns.description {
                item.push_str(&format!(": {}", desc));
            }
            lines.push(item);
            lines.push(String::new());
        }

        if !node.emits.is_empty() {
            lines.push("#### Emits\n".to_string());
            for event in &node.emits {
                lines.push(format!("* {}", self.reference(event)));
            }
            lines.push(String::new());
        }

        if !node.extends.is_empty() || !node.implements.is_empty() {
            let mut parents: Vec<String> = Vec::new();
            for name in node.extends.iter().chain(&node.implements) {
                parents.push(self.reference(name));
            }
            lines.push(format!("Extends: {}", parents.join(", ")));
            lines.push(String::new());
        }

        if !node.examples.is_empty() {
            lines.push("#### Examples\n".to_string());
            for example in &node.examples {
                lines.push("```js".to_string());
                lines.push(example.trim_end().to_string());
                lines.push("```".to_string());
                lines.push(String::new());
            }
        }

        if !node.see.is_empty() {
            lines.push("#### See also\n".to_string());
            for see in &node.see {
                lines.push(format!("* {}", toc::see_link(see)));
            }
            lines.push(String::new());
        }

        lines.join("\n")
    }

    /// `* **name** (type): description`, followed by nested properties.
    fn value_lines(&mut self, lines: &mut Vec<String>, name: &str, value: &Node, indent: usize) {
        let mut item = format!(
            "{}* **{}** ({})",
            "  ".repeat(indent),
            name,
            self.type_label(value)
        );
        if let Some(ref desc) = value.description {
            item.push_str(&format!(": {}", desc));
        }
        if value.optional {
            item.push_str(" *(optional)*");
        }
        if let Some(ref default) = value.default_value {
            item.push_str(&format!(" Default: `{}`", default));
        }
        lines.push(item);
        for (child_name, child) in &value.entries {
            self.value_lines(lines, child_name, child, indent + 1);
        }
    }

    /// Kind, stability and availability as a quote line.
    fn badges(&mut self, node: &Node) -> String {
        let mut badges: Vec<String> = vec![format!("`{}`", self.type_label(node))];
        if let Some(ref stability) = node.stability {
            badges.push(format!("*`{}`*", stability));
        }
        if let Some(since) = node.availability.as_ref().and_then(|a| a.since.as_ref()) {
            badges.push(format!("`since {}`", since));
        }
        if node.is_async {
            badges.push("`async`".to_string());
        }
        if node.read_only {
            badges.push("`readonly`".to_string());
        }
        format!("> {}", badges.join(" "))
    }

    fn type_label(&mut self, node: &Node) -> String {
        match node.kind {
            NodeKind::Ref => match node.type_ {
                Some(ref name) => self.reference(name),
                None => "ref".to_string(),
            },
            NodeKind::Union if !node.items.is_empty() => node
                .items
                .iter()
                .map(|item| self.type_label(item))
                .collect::<Vec<_>>()
                .join(" | "),
            NodeKind::Array if !node.items.is_empty() => {
                let inner = self.type_label(&node.items[0]);
                format!("Array<{}>", inner)
            }
            kind => kind.as_str().to_string(),
        }
    }

    /// Reference-style link for a named type; resolved after the walk.
    fn reference(&mut self, name: &str) -> String {
        let display = display_name(name).to_string();
        self.wanted.insert(display.clone());
        format!("[{}]", display)
    }
}

/// Heading name of a child: `Parent.child`, `Class#member`,
/// `Parent#event:name`, `Parent~definition`.
fn qualify(parent: &str, parent_kind: NodeKind, container: Container, name: &str) -> String {
    match container {
        Container::Events => format!("{}#event:{}", parent, name),
        Container::Definitions => format!("{}~{}", parent, name),
        Container::StaticEntries => format!("{}.{}", parent, name),
        Container::Entries => match parent_kind {
            NodeKind::Class | NodeKind::Interface => format!("{}#{}", parent, name),
            _ => format!("{}.{}", parent, name),
        },
    }
}

/// Last path segment of a longname: `module:a~Thing` → `Thing`,
/// `Foo#event:grow` → `grow`.
fn display_name(name: &str) -> &str {
    let name = name.strip_prefix("module:").unwrap_or(name);
    let last = name
        .rsplit(['.', '~', '#'])
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(name);
    last.strip_prefix("event:").unwrap_or(last)
}
