//! Type IR consumed by the renderer core.
//!
//! An immutable, arena-backed directed graph of type nodes. Nothing in this module
//! builds a graph from JSON Schema or samples — that construction is an external
//! collaborator. The arena's own `serde` shape is the on-disk interchange format the
//! CLI driver reads.

pub mod validate;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Stable index into a [`TypeGraph`]'s arena. Never a pointer, never path-derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeId(pub u32);

impl TypeId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A named, ordered class property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    /// Original, unstyled JSON key. Never touched by the naming pipeline.
    pub json_name: String,
    pub of_type: TypeId,
    pub optional: bool,
    pub description: Option<String>,
}

/// One node of the type graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Type {
    Any,
    Null,
    Bool,
    Int,
    Double,
    String,
    Array {
        items: TypeId,
    },
    /// Properties in declaration order: insertion order is the emission order.
    Class {
        name: Option<String>,
        description: Option<String>,
        properties: Vec<Property>,
    },
    /// Keys are always JSON strings; the IR does not represent non-string keys.
    Map {
        values: TypeId,
    },
    Enum {
        name: Option<String>,
        description: Option<String>,
        /// Ordered, unique JSON strings.
        cases: Vec<String>,
    },
    /// Unordered in meaning; kept as a `Vec` for deterministic iteration order.
    Union {
        name: Option<String>,
        description: Option<String>,
        members: Vec<TypeId>,
    },
}

impl Type {
    pub fn description(&self) -> Option<&str> {
        match self {
            Type::Class { description, .. }
            | Type::Enum { description, .. }
            | Type::Union { description, .. } => description.as_deref(),
            _ => None,
        }
    }

    pub fn proposed_name(&self) -> Option<&str> {
        match self {
            Type::Class { name, .. } | Type::Enum { name, .. } | Type::Union { name, .. } => {
                name.as_deref()
            }
            _ => None,
        }
    }

    pub fn is_named(&self) -> bool {
        matches!(self, Type::Class { .. } | Type::Enum { .. } | Type::Union { .. })
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Type::Null)
    }
}

/// The immutable input to a render pass: an arena of [`Type`] nodes plus the set of
/// top-level entry points.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeGraph {
    nodes: Vec<Type>,
    /// Top-level types, in the order they should be considered entry points.
    top_levels: Vec<(String, TypeId)>,
}

impl TypeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, returning its stable id. This is the single place node
    /// identity is created, so insertion order doubles as "graph order" for the
    /// naming pipeline's disambiguation rule.
    pub fn push(&mut self, ty: Type) -> TypeId {
        let id = TypeId::new(self.nodes.len() as u32);
        self.nodes.push(ty);
        id
    }

    /// Reserve an id ahead of the node it will hold, for named types that need to
    /// reference themselves (recursive definitions crossing exactly this named
    /// boundary). Fill it in with [`Self::define`] before the graph is used.
    pub fn reserve(&mut self) -> TypeId {
        let id = TypeId::new(self.nodes.len() as u32);
        self.nodes.push(Type::Any);
        id
    }

    /// Fill in a node reserved with [`Self::reserve`].
    pub fn define(&mut self, id: TypeId, ty: Type) {
        self.nodes[id.index()] = ty;
    }

    pub fn get(&self, id: TypeId) -> &Type {
        &self.nodes[id.index()]
    }

    pub fn mark_top_level(&mut self, proposed_name: impl Into<String>, id: TypeId) {
        self.top_levels.push((proposed_name.into(), id));
    }

    pub fn top_levels(&self) -> &[(String, TypeId)] {
        &self.top_levels
    }

    /// All node ids in insertion (graph) order.
    pub fn ids(&self) -> impl Iterator<Item = TypeId> {
        (0..self.nodes.len() as u32).map(TypeId::new)
    }

    pub fn named_ids(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.ids().filter(move |id| self.get(*id).is_named())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Direct outgoing edges of a node (the ids it immediately references).
    pub fn direct_edges(&self, id: TypeId) -> Vec<TypeId> {
        match self.get(id) {
            Type::Array { items } => vec![*items],
            Type::Map { values } => vec![*values],
            Type::Class { properties, .. } => {
                properties.iter().map(|p| p.of_type).collect()
            }
            Type::Union { members, .. } => members.clone(),
            Type::Any | Type::Null | Type::Bool | Type::Int | Type::Double | Type::String | Type::Enum { .. } => {
                Vec::new()
            }
        }
    }

    /// True when `union` is a nullable: exactly one non-null member plus exactly one
    /// `null` member (invariant 3).
    pub fn is_nullable_union(&self, members: &[TypeId]) -> Option<TypeId> {
        if members.len() != 2 {
            return None;
        }
        let (nulls, non_nulls): (Vec<_>, Vec<_>) =
            members.iter().partition(|m| self.get(**m).is_null());
        if nulls.len() == 1 && non_nulls.len() == 1 {
            Some(*non_nulls[0])
        } else {
            None
        }
    }

    /// Map-key shape check: the IR only ever models string-keyed maps, so this is
    /// present purely as the documented extension point callers use to reject
    /// anything that claims otherwise before it reaches a target hook.
    pub fn map_values(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id) {
            Type::Map { values } => Some(*values),
            _ => None,
        }
    }
}

/// Reverse index: node id -> property paths it is used at, for diagnostics.
pub fn property_paths(graph: &TypeGraph) -> BTreeMap<TypeId, Vec<String>> {
    let mut paths: BTreeMap<TypeId, Vec<String>> = BTreeMap::new();
    for id in graph.ids() {
        if let Type::Class { properties, .. } = graph.get(id) {
            for prop in properties {
                paths
                    .entry(prop.of_type)
                    .or_default()
                    .push(prop.json_name.clone());
            }
        }
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nullable_union_detection() {
        let mut g = TypeGraph::new();
        let s = g.push(Type::String);
        let n = g.push(Type::Null);
        assert_eq!(g.is_nullable_union(&[s, n]), Some(s));
        assert_eq!(g.is_nullable_union(&[n, s]), Some(s));

        let b = g.push(Type::Bool);
        assert_eq!(g.is_nullable_union(&[s, b]), None);
    }

    #[test]
    fn insertion_order_is_graph_order() {
        let mut g = TypeGraph::new();
        let a = g.push(Type::Int);
        let b = g.push(Type::Bool);
        assert!(a.index() < b.index());
    }
}
