//! The Convenience Renderer: a single driver that runs any [`RenderStrategy`]
//! through the five fixed phases (4.3) — name assignment, header, prelude, body
//! in dependency order, top-levels. Generic over the strategy, so dispatch is
//! monomorphized rather than virtual.

pub mod names;
pub mod ruby;
pub mod strategy;

use std::collections::{HashMap, HashSet};

use petgraph::algo::toposort;
use petgraph::graph::DiGraph;

use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::ir::{Type, TypeGraph, TypeId};

pub use names::NameTable;
pub use strategy::{RenderStrategy, UnionStrategy};

/// Run a complete render pass and return the output as a line stream (one
/// `String` per line, no trailing newline joined in — the caller decides how to
/// join and terminate the file).
pub fn render<S: RenderStrategy>(
    graph: &TypeGraph,
    strategy: &S,
    leading_comment: Option<&str>,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<String>> {
    crate::ir::validate::validate(graph)?;

    let names = NameTable::build(graph, strategy);

    let mut emitter = crate::source::Emitter::new(strategy.indent_unit());

    strategy.header(&mut emitter, leading_comment);
    emitter.ensure_blank_line();

    strategy.prelude(&mut emitter, graph, &names)?;

    let order = body_order(graph, &names, strategy.needs_type_declaration_before_use(), diagnostics);
    for (i, id) in order.iter().enumerate() {
        if i > 0 {
            emitter.ensure_blank_line();
        }
        match graph.get(*id) {
            Type::Class { .. } => strategy.emit_class(&mut emitter, graph, &names, *id)?,
            Type::Enum { .. } => strategy.emit_enum(&mut emitter, graph, &names, *id)?,
            Type::Union { .. } => strategy.emit_union(&mut emitter, graph, &names, *id)?,
            _ => unreachable!("body_order only yields named nodes"),
        }
    }

    let aliases: Vec<_> = graph
        .top_levels()
        .iter()
        .filter(|(_, id)| names.type_name_id(*id).is_none())
        .collect();
    if !aliases.is_empty() {
        emitter.ensure_blank_line();
    }
    for (proposed_name, id) in aliases {
        strategy.emit_top_level_alias(&mut emitter, graph, &names, proposed_name, *id)?;
    }

    emitter.finish(&names)
}

/// Declared types this node depends on directly, skipping through structural
/// wrappers (array, map, nullable or implicitly-marshalled union) but never
/// recursing into another declared type's own body. Self-references are
/// omitted; a class may always reference its own name. "Declared" means the
/// node actually got a type name in `names` — a nullable union never does, so
/// it is treated as transparent here even though [`Type::is_named`] says yes.
fn named_dependencies(graph: &TypeGraph, names: &NameTable, id: TypeId) -> Vec<TypeId> {
    let mut deps = Vec::new();
    let mut seen = HashSet::new();
    let mut stack = graph.direct_edges(id);

    while let Some(next) = stack.pop() {
        if !seen.insert(next) {
            continue;
        }
        if names.type_name_id(next).is_some() {
            if next != id {
                deps.push(next);
            }
        } else {
            stack.extend(graph.direct_edges(next));
        }
    }

    deps
}

/// Body emission order (4.3 phase 4): topologically sorted by declared-type
/// dependency when the target needs types declared before use, otherwise graph
/// (insertion) order. Mutual recursion between two or more declared types cannot
/// be linearized; when that happens we fall back to graph order for the whole
/// set and record a diagnostic rather than failing the render, since every such
/// cycle has already passed the fatal acyclic-after-quotienting check.
fn body_order(graph: &TypeGraph, names: &NameTable, needs_order: bool, diagnostics: &mut Diagnostics) -> Vec<TypeId> {
    let named: Vec<TypeId> = graph.ids().filter(|id| names.type_name_id(*id).is_some()).collect();
    if !needs_order || named.is_empty() {
        return named;
    }

    let mut g = DiGraph::<TypeId, ()>::new();
    let mut index_of = HashMap::new();
    for id in &named {
        index_of.insert(*id, g.add_node(*id));
    }
    for id in &named {
        for dep in named_dependencies(graph, names, *id) {
            g.add_edge(index_of[&dep], index_of[id], ());
        }
    }

    match toposort(&g, None) {
        Ok(order) => order.into_iter().map(|ix| g[ix]).collect(),
        Err(cycle) => {
            diagnostics.warning(
                g[cycle.node_id()],
                "mutual recursion among named types could not be topologically ordered; falling back to graph insertion order",
            );
            named
        }
    }
}
