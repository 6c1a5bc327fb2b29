//! Doclet → node mapping.
//!
//! A pure function of one doclet: it never looks at other doclets, and it
//! never sets identity or nesting information. Every [`DocletKind`] has an
//! explicit outcome in [`Mapped`].

use crate::doclet::{Deprecation, Doclet, DocletKind, Param, TypeSpec};
use crate::node::{Availability, Children, Node, NodeKind};
use regex::Regex;
use std::sync::LazyLock;

static RE_ARRAY_GENERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Array\.?<(.+)>$").unwrap());

static RE_ARRAY_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)\[\]$").unwrap());

/// Tags that set a node's stability, strongest first.
const STABILITY_TAGS: &[&str] = &["deprecated", "experimental", "stable"];

/// Package metadata captured from a `package` doclet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackageInfo {
    pub name: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub license: Option<String>,
}

/// Outcome of mapping a single doclet.
#[derive(Debug, Clone, PartialEq)]
pub enum Mapped {
    Node(Node),
    Package(PackageInfo),
    /// The kind has no specification counterpart.
    Untreated(String),
}

/// Map one doclet to its specification form.
pub fn map_doclet(doc: &Doclet) -> Mapped {
    match &doc.kind {
        DocletKind::Package => Mapped::Package(package_info(doc)),
        DocletKind::Module => Mapped::Node(common(doc, Node::new(NodeKind::Module))),
        DocletKind::Namespace => Mapped::Node(common(doc, Node::new(NodeKind::Namespace))),
        DocletKind::Class => {
            let mut node = common(doc, Node::new(NodeKind::Class));
            if doc.classdesc.is_some() {
                node.description = doc.classdesc.clone();
            }
            node.params = params(&doc.params);
            node.extends = doc.augments.clone();
            node.implements = doc.implements.clone();
            Mapped::Node(node)
        }
        DocletKind::Interface => {
            let mut node = common(doc, Node::new(NodeKind::Interface));
            node.extends = doc.augments.clone();
            Mapped::Node(node)
        }
        DocletKind::Function => Mapped::Node(function(doc, Node::new(NodeKind::Function))),
        DocletKind::Event => {
            let mut node = common(doc, Node::new(NodeKind::Event));
            node.params = params(&doc.params);
            node.entries = properties(&doc.properties);
            Mapped::Node(node)
        }
        DocletKind::Member | DocletKind::Constant => {
            let mut node = common(doc, typed(doc.type_.as_ref()));
            node.read_only = doc.readonly || doc.kind == DocletKind::Constant;
            node.entries = properties(&doc.properties);
            Mapped::Node(node)
        }
        DocletKind::Typedef => {
            let base = typed(doc.type_.as_ref());
            let node = if base.kind == NodeKind::Function || !doc.params.is_empty() {
                function(doc, Node::new(NodeKind::Function))
            } else {
                let mut node = common(doc, base);
                node.entries = properties(&doc.properties);
                node
            };
            Mapped::Node(node)
        }
        DocletKind::Unrecognized(kind) => Mapped::Untreated(kind.clone()),
    }
}

fn package_info(doc: &Doclet) -> PackageInfo {
    PackageInfo {
        name: doc.name.clone(),
        description: doc.description.clone(),
        version: doc.version.clone(),
        license: doc.licenses.first().and_then(|l| l.type_.clone()),
    }
}

/// Fields every mapped node shares.
fn common(doc: &Doclet, mut node: Node) -> Node {
    node.description = doc.description.clone();
    node.stability = stability(doc);
    node.availability = doc.since.as_ref().map(|since| Availability {
        since: Some(since.clone()),
    });
    node.optional = doc.optional;
    node.nullable = doc.nullable.unwrap_or(false);
    node.default_value = doc.defaultvalue.clone();
    node.variable = doc.variable;
    node.examples = doc.examples.clone();
    node.see = doc.see.clone();
    node
}

fn function(doc: &Doclet, node: Node) -> Node {
    let mut node = common(doc, node);
    node.params = params(&doc.params);
    node.returns = doc.returns.first().map(|r| Box::new(value(r)));
    node.emits = doc.fires.clone();
    node.is_async = doc.is_async;
    node.generator = doc.generator;
    node
}

fn stability(doc: &Doclet) -> Option<String> {
    let deprecated = match doc.deprecated {
        Some(Deprecation::Flag(flag)) => flag,
        Some(Deprecation::Note(_)) => true,
        None => false,
    };
    if deprecated {
        return Some("deprecated".to_string());
    }
    STABILITY_TAGS
        .iter()
        .find(|title| doc.has_tag(title))
        .map(|title| title.to_string())
}

/// Build a node describing a declared type.
pub fn typed(spec: Option<&TypeSpec>) -> Node {
    let names = match spec {
        Some(spec) if !spec.names.is_empty() => &spec.names,
        _ => return Node::new(NodeKind::Any),
    };
    if names.len() == 1 {
        return type_node(&names[0]);
    }
    let mut union = Node::new(NodeKind::Union);
    union.items = names.iter().map(|n| type_node(n)).collect();
    union
}

fn type_node(name: &str) -> Node {
    let name = name.trim();
    if let Some(caps) = RE_ARRAY_GENERIC
        .captures(name)
        .or_else(|| RE_ARRAY_SUFFIX.captures(name))
    {
        let mut array = Node::new(NodeKind::Array);
        array.items.push(type_node(&caps[1]));
        return array;
    }
    let kind = match name {
        "string" | "String" => NodeKind::String,
        "number" | "Number" | "int" | "integer" | "float" => NodeKind::Number,
        "boolean" | "Boolean" | "bool" => NodeKind::Boolean,
        "object" | "Object" => NodeKind::Object,
        "function" | "Function" => NodeKind::Function,
        "array" | "Array" => NodeKind::Array,
        "*" | "any" | "mixed" => NodeKind::Any,
        _ => {
            let mut reference = Node::new(NodeKind::Ref);
            reference.type_ = Some(name.to_string());
            return reference;
        }
    };
    Node::new(kind)
}

/// A parameter, property or return value.
fn value(param: &Param) -> Node {
    let mut node = typed(param.type_.as_ref());
    node.name = param.name.clone();
    node.description = param.description.clone();
    node.optional = param.optional;
    node.nullable = param.nullable.unwrap_or(false);
    node.variable = param.variable;
    node.default_value = param.defaultvalue.clone();
    node
}

/// Map `@param` entries, nesting dotted names (`opts.name`, `items[].id`)
/// under the parameter they belong to.
fn params(list: &[Param]) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::new();
    for param in list {
        let name = param.name.clone().unwrap_or_default();
        let node = value(param);
        match name.rsplit_once('.') {
            Some((parent_path, leaf)) => {
                let mut node = node;
                node.name = None;
                let path: Vec<&str> = parent_path.split('.').map(strip_array).collect();
                match find_param(&mut out, &path) {
                    Some(parent) => {
                        parent.entries.insert(leaf.to_string(), node);
                    }
                    None => {
                        node.name = Some(name.clone());
                        out.push(node);
                    }
                }
            }
            None => out.push(node),
        }
    }
    out
}

fn find_param<'a>(list: &'a mut [Node], path: &[&str]) -> Option<&'a mut Node> {
    let (first, rest) = path.split_first()?;
    let mut current = list
        .iter_mut()
        .find(|p| p.name.as_deref().map(strip_array) == Some(*first))?;
    for segment in rest {
        current = current.entries.get_mut(*segment)?;
    }
    Some(current)
}

fn strip_array(name: &str) -> &str {
    name.strip_suffix("[]").unwrap_or(name)
}

/// Map `@property` entries into a children container, nesting dotted names.
fn properties(list: &[Param]) -> Children {
    let mut out = Children::new();
    for prop in list {
        let name = prop.name.clone().unwrap_or_default();
        let mut node = value(prop);
        node.name = None;
        let segments: Vec<&str> = name.split('.').map(strip_array).collect();
        let Some((leaf, path)) = segments.split_last() else {
            continue;
        };
        match entries_at(&mut out, path) {
            Some(container) => {
                container.insert(leaf.to_string(), node);
            }
            None => {
                out.insert(name, node);
            }
        }
    }
    out
}

fn entries_at<'a>(children: &'a mut Children, path: &[&str]) -> Option<&'a mut Children> {
    match path.split_first() {
        None => Some(children),
        Some((first, rest)) => entries_at(&mut children.get_mut(*first)?.entries, rest),
    }
}
