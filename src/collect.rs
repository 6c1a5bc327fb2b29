//! Identity collection — first pass over the filtered doclets.
//!
//! Assigns every mapped node a stable identifier (its longname), keeps its
//! structural bookkeeping out of band, and reinterprets a value that shares
//! its longname with an already collected module as that module's default
//! export (`<module>@default`).

use crate::doclet::{Access, Doclet, Scope};
use crate::mapper::{self, Mapped, PackageInfo};
use crate::node::{Node, NodeKind};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Local scope name given to a module's default export.
pub const DEFAULT_EXPORT: &str = "@default";

/// Structural fields of a collected node. Never serialized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bookkeeping {
    pub id: String,
    pub scope_name: String,
    pub member_of: Option<String>,
    pub member_scope: Option<Scope>,
    /// `meta.code.name` of the documented binding.
    pub binding: Option<String>,
    pub access: Option<Access>,
    pub is_definition: bool,
}

impl Bookkeeping {
    fn from_doclet(doc: &Doclet) -> Self {
        Bookkeeping {
            id: doc.longname.clone().unwrap_or_default(),
            scope_name: match &doc.name {
                Some(name) => name.clone(),
                None => local_name(doc.longname.as_deref().unwrap_or_default()).to_string(),
            },
            member_of: doc.memberof.clone(),
            member_scope: doc.scope,
            binding: doc.binding_name().map(str::to_string),
            access: doc.access,
            is_definition: doc.is_definition(),
        }
    }

    /// Turn this record into the default export of `module_id`.
    fn as_default_export_of(mut self, module_id: &str) -> Self {
        self.member_of = Some(module_id.to_string());
        self.member_scope = Some(Scope::Static);
        self.scope_name = DEFAULT_EXPORT.to_string();
        self.id = format!("{}{}", module_id, DEFAULT_EXPORT);
        self
    }
}

/// Last segment of a longname: `module:a.b` is `b`, `Foo#event:grow` is
/// `grow`, `module:a` is `a`.
pub fn local_name(longname: &str) -> &str {
    let name = longname.strip_prefix("module:").unwrap_or(longname);
    let name = name.rsplit(['.', '#', '~']).next().unwrap_or(name);
    name.strip_prefix("event:").unwrap_or(name)
}

/// Collected nodes keyed by identifier, in first-insertion order.
///
/// `nodes` and `bookkeeping` always hold exactly the same keys.
#[derive(Debug, Clone, Default)]
pub struct IdentityTable {
    order: Vec<String>,
    nodes: HashMap<String, Node>,
    bookkeeping: HashMap<String, Bookkeeping>,
}

impl IdentityTable {
    /// Store a node under `meta.id`. An existing id keeps its position and
    /// its contents are replaced according to [`resolve_collision`].
    pub fn insert(&mut self, node: Node, meta: Bookkeeping) {
        let id = meta.id.clone();
        match (self.nodes.remove(&id), self.bookkeeping.remove(&id)) {
            (Some(old_node), Some(old_meta)) => {
                debug!(id = %id, "identifier collected twice, keeping the later doclet");
                let (node, meta) = resolve_collision((old_node, old_meta), (node, meta));
                self.nodes.insert(id.clone(), node);
                self.bookkeeping.insert(id, meta);
            }
            _ => {
                self.order.push(id.clone());
                self.nodes.insert(id.clone(), node);
                self.bookkeeping.insert(id, meta);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<(&Node, &Bookkeeping)> {
        Some((self.nodes.get(id)?, self.bookkeeping.get(id)?))
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Entries in iteration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node, &Bookkeeping)> {
        self.order.iter().filter_map(move |id| {
            let (node, meta) = self.get(id)?;
            Some((id.as_str(), node, meta))
        })
    }

    /// Take ownership of the nodes, leaving the bookkeeping behind.
    pub fn into_parts(self) -> (Vec<String>, HashMap<String, Node>, HashMap<String, Bookkeeping>) {
        (self.order, self.nodes, self.bookkeeping)
    }
}

/// Policy for two records competing for the same identifier or slot: the
/// later one is kept.
pub fn resolve_collision<T>(existing: T, incoming: T) -> T {
    drop(existing);
    incoming
}

/// Why a doclet produced no node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skipped {
    /// Anonymous `module.exports` whose module could not be determined.
    DefaultExportWithoutModule { location: String },
    UntreatedKind { kind: String },
}

/// Result of the collection pass.
#[derive(Debug, Clone, Default)]
pub struct Collected {
    pub package: Option<PackageInfo>,
    pub table: IdentityTable,
    pub skipped: Vec<Skipped>,
}

/// Collect filtered doclets into an identity table.
pub fn collect(doclets: &[Doclet]) -> Collected {
    let mut collected = Collected::default();

    for doc in doclets {
        let longname = doc.longname.as_deref().unwrap_or_default();
        if doc.binding_name() == Some("module.exports") && longname.starts_with("module.exports") {
            let location = doc.source_location();
            warn!(location = %location, "default export without module name");
            collected
                .skipped
                .push(Skipped::DefaultExportWithoutModule { location });
            continue;
        }

        let node = match mapper::map_doclet(doc) {
            Mapped::Node(node) => node,
            Mapped::Package(package) => {
                collected.package = Some(package);
                continue;
            }
            Mapped::Untreated(kind) => {
                warn!(kind = %kind, "untreated kind");
                collected.skipped.push(Skipped::UntreatedKind { kind });
                continue;
            }
        };

        let mut meta = Bookkeeping::from_doclet(doc);
        let module_id = collected
            .table
            .node(&meta.id)
            .filter(|existing| existing.kind == NodeKind::Module)
            .map(|_| meta.id.clone());
        if let Some(module_id) = module_id {
            meta = meta.as_default_export_of(&module_id);
        }

        collected.table.insert(node, meta);
    }

    collected
}
