//! Hierarchy transform — second pass, from the flat identity table to a tree.
//!
//! Runs in two steps. [`place`] walks the table once and decides, for every
//! visible node, which container of which parent (or of the document root)
//! it lands in. [`assemble`] then builds the nested nodes from those
//! decisions, using identifiers as arena indices.

use crate::collect::{resolve_collision, Bookkeeping, IdentityTable, DEFAULT_EXPORT};
use crate::doclet::{Access, Scope};
use crate::node::{Children, Container, Node, NodeKind};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// Finished tree, rooted at the document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tree {
    pub entries: Children,
    pub definitions: Children,
}

/// Where a node goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Parent(String),
    Root,
}

/// Placement decision for one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Key of the node in the identity table.
    pub source_id: String,
    /// Identifier after a retarget onto a default export; equal to
    /// `source_id` otherwise. Keys root nodes whose local name is shared.
    pub id: String,
    pub target: Target,
    pub container: Container,
    pub slot: String,
}

/// Run both steps.
pub fn transform(table: IdentityTable) -> Tree {
    let placements = place(&table);
    assemble(table, placements)
}

/// Decide the placement of every non-private node, in table order.
pub fn place(table: &IdentityTable) -> Vec<Placement> {
    let mut placements = Vec::new();

    for (id, node, meta) in table.iter() {
        if meta.access == Some(Access::Private) {
            continue;
        }

        let (parent_id, resolved_id) = resolve_parent(table, id, meta);
        let parent = parent_id.as_deref().and_then(|p| table.node(p));

        let placement = match (parent_id, parent) {
            (Some(parent_id), Some(parent)) => Placement {
                source_id: id.to_string(),
                id: resolved_id,
                container: classify(node, meta, parent),
                target: Target::Parent(parent_id),
                slot: meta.scope_name.clone(),
            },
            _ => Placement {
                source_id: id.to_string(),
                id: resolved_id,
                container: if is_definition(meta) {
                    Container::Definitions
                } else {
                    Container::Entries
                },
                target: Target::Root,
                slot: meta.scope_name.clone(),
            },
        };
        placements.push(placement);
    }

    disambiguate_root(&mut placements);
    placements
}

/// Root nodes are keyed by local name, except where several unrelated nodes
/// share one: those are keyed by their full identifier so none is lost.
fn disambiguate_root(placements: &mut [Placement]) {
    let mut uses: HashMap<(Container, &str), usize> = HashMap::new();
    for p in placements.iter().filter(|p| p.target == Target::Root) {
        *uses.entry((p.container, p.slot.as_str())).or_default() += 1;
    }
    let shared: HashSet<(Container, String)> = uses
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|((container, slot), _)| (container, slot.to_string()))
        .collect();

    for p in placements.iter_mut().filter(|p| p.target == Target::Root) {
        if shared.contains(&(p.container, p.slot.clone())) {
            debug!(id = %p.id, name = %p.slot, "root name shared, keyed by identifier");
            p.slot = p.id.clone();
        }
    }
}

/// Resolve the structural parent of a node, retargeting module members onto
/// the module's default export when one exists.
///
/// Returns the parent identifier and the node's (possibly rewritten) id.
fn resolve_parent(table: &IdentityTable, id: &str, meta: &Bookkeeping) -> (Option<String>, String) {
    let Some(member_of) = meta.member_of.as_deref() else {
        return (None, id.to_string());
    };

    let default_id = format!("{}{}", member_of, DEFAULT_EXPORT);
    let binding = meta.binding.as_deref().unwrap_or_default();
    if member_of.starts_with("module:")
        && default_id != id
        && table.contains(&default_id)
        && !binding.starts_with("exports")
    {
        let resolved = id.replacen(member_of, &default_id, 1);
        debug!(id = %id, resolved = %resolved, "member of default export");
        return (Some(default_id), resolved);
    }

    (Some(member_of.to_string()), id.to_string())
}

/// Pick the children container of `parent` that `node` belongs in.
fn classify(node: &Node, meta: &Bookkeeping, parent: &Node) -> Container {
    let is_static = meta.member_scope == Some(Scope::Static);
    if node.kind == NodeKind::Event {
        Container::Events
    } else if is_static && parent.kind == NodeKind::Class {
        Container::StaticEntries
    } else if is_static && parent.kind == NodeKind::Module {
        Container::Entries
    } else if is_definition(meta) {
        Container::Definitions
    } else {
        Container::Entries
    }
}

fn is_definition(meta: &Bookkeeping) -> bool {
    meta.member_scope == Some(Scope::Inner) || meta.is_definition
}

type Slots = BTreeMap<(Container, String), String>;

/// Build the tree from placement decisions. A later placement into an
/// occupied slot replaces the earlier one.
pub fn assemble(table: IdentityTable, placements: Vec<Placement>) -> Tree {
    let (_, mut nodes, _) = table.into_parts();
    let mut root: Slots = Slots::new();
    let mut children: HashMap<String, Slots> = HashMap::new();

    for placement in placements {
        let slots = match placement.target {
            Target::Root => &mut root,
            Target::Parent(parent) => children.entry(parent).or_default(),
        };
        let key = (placement.container, placement.slot);
        if let Some(existing) = slots.remove(&key) {
            debug!(
                id = %placement.id,
                slot = %key.1,
                replaced = %existing,
                "slot already taken"
            );
            let kept = resolve_collision(existing, placement.source_id);
            slots.insert(key, kept);
        } else {
            slots.insert(key, placement.source_id);
        }
    }

    let mut tree = Tree::default();
    for ((container, slot), id) in root {
        let Some(node) = build(&id, &mut nodes, &mut children) else {
            continue;
        };
        let target = match container {
            Container::Definitions => &mut tree.definitions,
            _ => &mut tree.entries,
        };
        target.insert(slot, node);
    }
    tree
}

/// Take a node out of the arena and attach its placed children.
///
/// Every node has a single parent, so nothing reachable from the root can
/// sit on a membership cycle; a node is taken at most once.
fn build(
    id: &str,
    nodes: &mut HashMap<String, Node>,
    children: &mut HashMap<String, Slots>,
) -> Option<Node> {
    let mut node = nodes.remove(id)?;
    for ((container, slot), child_id) in children.remove(id).unwrap_or_default() {
        let Some(child) = build(&child_id, nodes, children) else {
            continue;
        };
        let container = node.children_mut(container);
        let child = match container.remove(&slot) {
            Some(existing) => {
                debug!(id = %child_id, slot = %slot, "slot already taken");
                resolve_collision(existing, child)
            }
            None => child,
        };
        container.insert(slot, child);
    }
    Some(node)
}
