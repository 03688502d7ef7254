//! Invariant checks for a [`TypeGraph`], run once before a render pass begins.
//!
//! Cycle detection reuses the teacher's SCC-based approach to boundary-crossing
//! analysis (`petgraph::algo::kosaraju_scc`), re-keyed from JSON-schema paths to
//! arena [`TypeId`]s.

use std::collections::HashSet;

use petgraph::graph::DiGraph;
use petgraph::algo::kosaraju_scc;

use super::{Type, TypeGraph, TypeId};
use crate::error::{RenderError, Result};

/// Run every universal invariant from the data model section. Fatal on the first
/// class of violation found; collects everything within that class before failing
/// so the error message is not limited to a single offending node.
pub fn validate(graph: &TypeGraph) -> Result<()> {
    check_null_only_as_union_member(graph)?;
    check_uniqueness(graph)?;
    check_acyclic_after_quotienting(graph)?;
    Ok(())
}

fn check_null_only_as_union_member(graph: &TypeGraph) -> Result<()> {
    for id in graph.ids() {
        match graph.get(id) {
            Type::Class { properties, .. } => {
                for prop in properties {
                    if graph.get(prop.of_type).is_null() {
                        return Err(RenderError::UnsupportedTypeShape {
                            kind: "null".to_string(),
                            detail: format!(
                                "property '{}' has bare null type; null may only appear as a union member",
                                prop.json_name
                            ),
                        });
                    }
                }
            }
            Type::Array { items } if graph.get(*items).is_null() => {
                return Err(RenderError::UnsupportedTypeShape {
                    kind: "null".to_string(),
                    detail: "array items type is bare null".to_string(),
                });
            }
            Type::Map { values } if graph.get(*values).is_null() => {
                return Err(RenderError::UnsupportedTypeShape {
                    kind: "null".to_string(),
                    detail: "map values type is bare null".to_string(),
                });
            }
            _ => {}
        }
    }
    Ok(())
}

fn check_uniqueness(graph: &TypeGraph) -> Result<()> {
    for id in graph.ids() {
        match graph.get(id) {
            Type::Enum { cases, .. } => {
                let mut seen = HashSet::new();
                for case in cases {
                    if !seen.insert(case.as_str()) {
                        return Err(RenderError::UnsupportedTypeShape {
                            kind: "enum".to_string(),
                            detail: format!("duplicate enum case string '{case}'"),
                        });
                    }
                }
            }
            Type::Class { properties, .. } => {
                let mut seen = HashSet::new();
                for prop in properties {
                    if !seen.insert(prop.json_name.as_str()) {
                        return Err(RenderError::UnsupportedTypeShape {
                            kind: "class".to_string(),
                            detail: format!("duplicate property name '{}'", prop.json_name),
                        });
                    }
                }
            }
            _ => {}
        }
    }
    Ok(())
}

/// Invariant 1: the graph is acyclic after quotienting through named types. A
/// strongly-connected component (more than one node, or a self-loop) that contains
/// no named member never crosses a named boundary and is a fatal cycle.
fn check_acyclic_after_quotienting(graph: &TypeGraph) -> Result<()> {
    let mut g = DiGraph::<TypeId, ()>::new();
    let indices: Vec<_> = graph.ids().map(|id| g.add_node(id)).collect();

    for id in graph.ids() {
        for target in graph.direct_edges(id) {
            g.add_edge(indices[id.index()], indices[target.index()], ());
        }
    }

    for scc in kosaraju_scc(&g) {
        let is_cycle = scc.len() > 1 || g.contains_edge(scc[0], scc[0]);
        if !is_cycle {
            continue;
        }
        let has_named_member = scc.iter().any(|ix| graph.get(g[*ix]).is_named());
        if !has_named_member {
            let path = scc
                .iter()
                .map(|ix| format!("{:?}", g[*ix]))
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(RenderError::CycleBeyondNamedBoundary { path });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Property, Type, TypeGraph};

    #[test]
    fn rejects_bare_null_property() {
        let mut g = TypeGraph::new();
        let null_id = g.push(Type::Null);
        g.push(Type::Class {
            name: Some("Broken".into()),
            description: None,
            properties: vec![Property {
                json_name: "x".into(),
                of_type: null_id,
                optional: false,
                description: None,
            }],
        });
        assert!(matches!(
            validate(&g),
            Err(RenderError::UnsupportedTypeShape { .. })
        ));
    }

    #[test]
    fn rejects_duplicate_enum_cases() {
        let mut g = TypeGraph::new();
        g.push(Type::Enum {
            name: Some("E".into()),
            description: None,
            cases: vec!["a".into(), "a".into()],
        });
        assert!(validate(&g).is_err());
    }

    #[test]
    fn allows_recursion_through_a_named_class() {
        let mut g = TypeGraph::new();
        let node_id = g.reserve();
        let array_id = g.push(Type::Array { items: node_id });
        g.define(
            node_id,
            Type::Class {
                name: Some("Node".into()),
                description: None,
                properties: vec![Property {
                    json_name: "children".into(),
                    of_type: array_id,
                    optional: false,
                    description: None,
                }],
            },
        );
        assert!(validate(&g).is_ok());
    }

    #[test]
    fn rejects_cycle_among_only_structural_nodes() {
        // array -> array forming a cycle with no named type anywhere on the path.
        let mut g = TypeGraph::new();
        let a = g.reserve();
        g.define(a, Type::Array { items: a });
        assert!(matches!(
            validate(&g),
            Err(RenderError::CycleBeyondNamedBoundary { .. })
        ));
    }
}
