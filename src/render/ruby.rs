//! Ruby `dry-struct` / `dry-types` target. The one concrete [`RenderStrategy`]
//! this crate ships, matching the field-declaration and converter shapes a
//! hand-written `dry-struct` model would use.

use std::collections::HashSet;

use crate::error::{RenderError, Result};
use crate::ir::{Type, TypeGraph, TypeId};
use crate::naming::Style;
use crate::render::names::NameTable;
use crate::render::strategy::{RenderStrategy, UnionStrategy};
use crate::source::{Emitter, Sourcelike};

fn ruby_const_start(c: char) -> bool {
    c.is_ascii_uppercase()
}

fn ruby_const_part(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn ruby_keywords() -> HashSet<String> {
    [
        "class", "module", "def", "end", "if", "unless", "while", "until", "for", "do", "then",
        "begin", "rescue", "ensure", "self", "nil", "true", "false", "yield", "super", "return",
        "next", "break", "redo", "retry", "case", "when", "in", "and", "or", "not", "require",
        "require_relative", "attr_accessor", "new", "type",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Concrete, stateless Ruby `dry-struct` render target.
#[derive(Debug, Default)]
pub struct RubyDryTypes;

impl RubyDryTypes {
    pub fn new() -> Self {
        Self
    }

    /// Resolve a property's effective optionality and the type to recurse into:
    /// a nullable union is unwrapped to its non-null member with optional forced
    /// true, since dry-struct's `.optional` already covers both a missing key and
    /// an explicit `null`.
    fn effective(&self, graph: &TypeGraph, t: TypeId, optional: bool) -> (bool, TypeId) {
        if let Type::Union { members, .. } = graph.get(t) {
            if let Some(inner) = graph.is_nullable_union(members) {
                return (true, inner);
            }
        }
        (optional, t)
    }
}

impl RenderStrategy for RubyDryTypes {
    fn indent_unit(&self) -> &str {
        "  "
    }

    fn is_start(&self) -> fn(char) -> bool {
        ruby_const_start
    }

    fn is_part(&self) -> fn(char) -> bool {
        ruby_const_part
    }

    fn keywords(&self) -> &HashSet<String> {
        static KEYWORDS: std::sync::OnceLock<HashSet<String>> = std::sync::OnceLock::new();
        KEYWORDS.get_or_init(ruby_keywords)
    }

    fn type_naming_style(&self) -> Style {
        Style::pascal_case(HashSet::new())
    }

    fn property_naming_style(&self) -> Style {
        Style::snake_case(HashSet::new())
    }

    fn enum_case_naming_style(&self) -> Style {
        let acronyms: HashSet<String> = ["KM"].iter().map(|s| s.to_string()).collect();
        Style::pascal_case(acronyms)
    }

    fn header(&self, emitter: &mut Emitter, leading_comment: Option<&str>) {
        if let Some(comment) = leading_comment {
            emitter.emit_comment_lines(&[comment.to_string()], "# ");
            emitter.ensure_blank_line();
        }
        emitter.emit_line([Sourcelike::lit("require \"dry-struct\"")]);
        emitter.emit_line([Sourcelike::lit("require \"dry-types\"")]);
        emitter.ensure_blank_line();
        emitter.emit_line([Sourcelike::lit("module Types")]);
        emitter.indent(|e| {
            e.emit_line([Sourcelike::lit("include Dry.Types()")]);
        });
        emitter.emit_line([Sourcelike::lit("end")]);
    }

    fn prelude(&self, _emitter: &mut Emitter, _graph: &TypeGraph, _names: &NameTable) -> Result<()> {
        Ok(())
    }

    fn type_expr(&self, graph: &TypeGraph, names: &NameTable, t: TypeId) -> Result<Sourcelike> {
        let expr = match graph.get(t) {
            Type::Any => Sourcelike::lit("Types::Any"),
            Type::Bool => Sourcelike::lit("Types::Bool"),
            Type::Int => Sourcelike::lit("Types::Int"),
            Type::Double => Sourcelike::lit("Types::Decimal"),
            Type::String => Sourcelike::lit("Types::String"),
            Type::Null => {
                return Err(RenderError::UnsupportedTypeShape {
                    kind: "null".to_string(),
                    detail: "null has no standalone type expression".to_string(),
                })
            }
            Type::Array { items } => {
                let inner = self.type_expr(graph, names, *items)?;
                Sourcelike::seq([Sourcelike::lit("Types.Array("), inner, Sourcelike::lit(")")])
            }
            Type::Map { values } => {
                let inner = self.type_expr(graph, names, *values)?;
                Sourcelike::seq([
                    Sourcelike::lit("Types::Hash.map(Types::String, "),
                    inner,
                    Sourcelike::lit(")"),
                ])
            }
            Type::Class { .. } => {
                let name = names.type_name_source(t).ok_or_else(|| RenderError::UnassignedName {
                    node: t,
                    namespace: "types".to_string(),
                })?;
                Sourcelike::seq([Sourcelike::lit("Types.Instance("), name, Sourcelike::lit(")")])
            }
            Type::Enum { .. } => {
                let name = names.type_name_source(t).ok_or_else(|| RenderError::UnassignedName {
                    node: t,
                    namespace: "types".to_string(),
                })?;
                Sourcelike::seq([Sourcelike::lit("Types::"), name])
            }
            Type::Union { members, .. } => {
                if let Some(inner) = graph.is_nullable_union(members) {
                    let base = self.type_expr(graph, names, inner)?;
                    Sourcelike::seq([base, Sourcelike::lit(".optional")])
                } else {
                    match self.union_strategy(graph, members) {
                        UnionStrategy::ImplicitlyMarshalled => {
                            let mut parts = Vec::new();
                            for (i, m) in members.iter().enumerate() {
                                if i > 0 {
                                    parts.push(Sourcelike::lit(" | "));
                                }
                                parts.push(self.type_expr(graph, names, *m)?);
                            }
                            Sourcelike::seq(parts)
                        }
                        _ => {
                            let name =
                                names.type_name_source(t).ok_or_else(|| RenderError::UnassignedName {
                                    node: t,
                                    namespace: "types".to_string(),
                                })?;
                            Sourcelike::seq([Sourcelike::lit("Types.Instance("), name, Sourcelike::lit(")")])
                        }
                    }
                }
            }
        };
        Ok(expr)
    }

    fn from_dynamic(
        &self,
        graph: &TypeGraph,
        names: &NameTable,
        t: TypeId,
        expr: Sourcelike,
        optional: bool,
    ) -> Result<Sourcelike> {
        if self.marshals_implicitly(graph, t) {
            return Ok(expr);
        }

        let wrap = |inner: Sourcelike| -> Sourcelike {
            if optional {
                Sourcelike::seq([
                    expr.clone(),
                    Sourcelike::lit(".nil? ? nil : "),
                    inner,
                ])
            } else {
                inner
            }
        };

        match graph.get(t) {
            Type::Enum { .. } => {
                let name = names.type_name_source(t).ok_or_else(|| RenderError::UnassignedName {
                    node: t,
                    namespace: "types".to_string(),
                })?;
                let inner = Sourcelike::seq([
                    Sourcelike::lit("Types::"),
                    name,
                    Sourcelike::lit("["),
                    expr.clone(),
                    Sourcelike::lit("]"),
                ]);
                Ok(wrap(inner))
            }
            Type::Class { .. } => {
                let name = names.type_name_source(t).ok_or_else(|| RenderError::UnassignedName {
                    node: t,
                    namespace: "types".to_string(),
                })?;
                let inner = Sourcelike::seq([name, Sourcelike::lit(".from_dynamic("), expr.clone(), Sourcelike::lit(")")]);
                Ok(wrap(inner))
            }
            Type::Array { items } => {
                let item_conv = self.from_dynamic(graph, names, *items, Sourcelike::lit("x"), false)?;
                let inner = Sourcelike::seq([
                    expr.clone(),
                    Sourcelike::lit(".map { |x| "),
                    item_conv,
                    Sourcelike::lit(" }"),
                ]);
                Ok(wrap(inner))
            }
            Type::Map { values } => {
                let value_conv = self.from_dynamic(graph, names, *values, Sourcelike::lit("v"), false)?;
                let inner = Sourcelike::seq([
                    expr.clone(),
                    Sourcelike::lit(".transform_values { |v| "),
                    value_conv,
                    Sourcelike::lit(" }"),
                ]);
                Ok(wrap(inner))
            }
            Type::Union { members, .. } => {
                if let Some(inner_t) = graph.is_nullable_union(members) {
                    self.from_dynamic(graph, names, inner_t, expr, true)
                } else {
                    match self.union_strategy(graph, members) {
                        UnionStrategy::ExplicitSum => {
                            let name =
                                names.type_name_source(t).ok_or_else(|| RenderError::UnassignedName {
                                    node: t,
                                    namespace: "types".to_string(),
                                })?;
                            let inner = Sourcelike::seq([
                                name,
                                Sourcelike::lit(".from_dynamic("),
                                expr.clone(),
                                Sourcelike::lit(")"),
                            ]);
                            Ok(wrap(inner))
                        }
                        _ => Ok(expr),
                    }
                }
            }
            Type::Null => Err(RenderError::UnsupportedTypeShape {
                kind: "null".to_string(),
                detail: "null cannot appear outside a nullable union".to_string(),
            }),
            Type::Any | Type::Bool | Type::Int | Type::Double | Type::String => Ok(expr),
        }
    }

    fn to_dynamic(
        &self,
        graph: &TypeGraph,
        names: &NameTable,
        t: TypeId,
        expr: Sourcelike,
        optional: bool,
    ) -> Result<Sourcelike> {
        if self.marshals_implicitly(graph, t) {
            return Ok(expr);
        }

        let wrap = |inner: Sourcelike| -> Sourcelike {
            if optional {
                Sourcelike::seq([expr.clone(), Sourcelike::lit(".nil? ? nil : "), inner])
            } else {
                inner
            }
        };

        match graph.get(t) {
            // dry-types validates enums on the way in but the domain value is
            // already the plain JSON string; nothing to convert on the way out.
            Type::Enum { .. } => Ok(expr),
            Type::Class { .. } => {
                let inner = Sourcelike::seq([expr.clone(), Sourcelike::lit(".to_dynamic")]);
                Ok(wrap(inner))
            }
            Type::Array { items } => {
                let item_conv = self.to_dynamic(graph, names, *items, Sourcelike::lit("x"), false)?;
                let inner = Sourcelike::seq([
                    expr.clone(),
                    Sourcelike::lit(".map { |x| "),
                    item_conv,
                    Sourcelike::lit(" }"),
                ]);
                Ok(wrap(inner))
            }
            Type::Map { values } => {
                let value_conv = self.to_dynamic(graph, names, *values, Sourcelike::lit("v"), false)?;
                let inner = Sourcelike::seq([
                    expr.clone(),
                    Sourcelike::lit(".transform_values { |v| "),
                    value_conv,
                    Sourcelike::lit(" }"),
                ]);
                Ok(wrap(inner))
            }
            Type::Union { members, .. } => {
                if let Some(inner_t) = graph.is_nullable_union(members) {
                    self.to_dynamic(graph, names, inner_t, expr, true)
                } else {
                    match self.union_strategy(graph, members) {
                        UnionStrategy::ExplicitSum => {
                            let inner = Sourcelike::seq([expr.clone(), Sourcelike::lit(".to_dynamic")]);
                            Ok(wrap(inner))
                        }
                        _ => Ok(expr),
                    }
                }
            }
            Type::Null => Err(RenderError::UnsupportedTypeShape {
                kind: "null".to_string(),
                detail: "null cannot appear outside a nullable union".to_string(),
            }),
            Type::Any | Type::Bool | Type::Int | Type::Double | Type::String => Ok(expr),
        }
    }

    fn marshals_implicitly(&self, graph: &TypeGraph, t: TypeId) -> bool {
        match graph.get(t) {
            Type::Any | Type::Null | Type::Bool | Type::Int | Type::Double | Type::String => true,
            Type::Array { items } => self.marshals_implicitly(graph, *items),
            Type::Map { values } => self.marshals_implicitly(graph, *values),
            Type::Class { .. } => false,
            // Always explicit: the forward direction must run the value through
            // the dry-types validator, so the driver can never elide the call.
            Type::Enum { .. } => false,
            Type::Union { members, .. } => {
                if let Some(inner) = graph.is_nullable_union(members) {
                    self.marshals_implicitly(graph, inner)
                } else {
                    matches!(self.union_strategy(graph, members), UnionStrategy::ImplicitlyMarshalled)
                }
            }
        }
    }

    fn union_strategy(&self, graph: &TypeGraph, members: &[TypeId]) -> UnionStrategy {
        if graph.is_nullable_union(members).is_some() {
            return UnionStrategy::Nullable;
        }
        let all_implicit_and_disjoint = members.iter().all(|m| self.marshals_implicitly(graph, *m))
            && disjoint_json_shapes(graph, members);
        if all_implicit_and_disjoint {
            UnionStrategy::ImplicitlyMarshalled
        } else {
            UnionStrategy::ExplicitSum
        }
    }

    fn emit_class(&self, emitter: &mut Emitter, graph: &TypeGraph, names: &NameTable, t: TypeId) -> Result<()> {
        let (properties, description) = match graph.get(t) {
            Type::Class { properties, description, .. } => (properties, description.clone()),
            _ => unreachable!("emit_class called on a non-class node"),
        };
        let class_name = names.type_name_source(t).ok_or_else(|| RenderError::UnassignedName {
            node: t,
            namespace: "types".to_string(),
        })?;

        if let Some(doc) = description {
            emitter.emit_comment_lines(&[doc], "# ");
        }
        emitter.emit_block(
            [Sourcelike::lit("class "), class_name.clone(), Sourcelike::lit(" < Dry::Struct")],
            [Sourcelike::lit("end")],
            |e| {
                for (i, prop) in properties.iter().enumerate() {
                    let (optional, inner_t) = self.effective(graph, prop.of_type, prop.optional);
                    let prop_expr = self.type_expr(graph, names, inner_t).unwrap();
                    let expr = if optional {
                        Sourcelike::seq([prop_expr, Sourcelike::lit(".optional")])
                    } else {
                        prop_expr
                    };
                    let name = names.property_name_source(t, i).unwrap();
                    e.emit_line([
                        Sourcelike::lit("attribute :"),
                        name,
                        Sourcelike::lit(", "),
                        expr,
                    ]);
                }

                e.ensure_blank_line();
                e.emit_block(
                    [Sourcelike::lit("def self.from_dynamic(d)")],
                    [Sourcelike::lit("end")],
                    |e| {
                        e.emit_line([class_name.clone(), Sourcelike::lit(".new(")]);
                        e.indent(|e| {
                            for (i, prop) in properties.iter().enumerate() {
                                let (optional, inner_t) = self.effective(graph, prop.of_type, prop.optional);
                                let raw = Sourcelike::seq([
                                    Sourcelike::lit("d[\""),
                                    Sourcelike::lit(prop.json_name.clone()),
                                    Sourcelike::lit("\"]"),
                                ]);
                                let conv = self.from_dynamic(graph, names, inner_t, raw, optional).unwrap();
                                let name = names.property_name_source(t, i).unwrap();
                                e.emit_line([name, Sourcelike::lit(": "), conv, Sourcelike::lit(",")]);
                            }
                        });
                        e.emit_line([Sourcelike::lit(")")]);
                    },
                );

                e.ensure_blank_line();
                e.emit_block(
                    [Sourcelike::lit("def to_dynamic")],
                    [Sourcelike::lit("end")],
                    |e| {
                        e.emit_line([Sourcelike::lit("{")]);
                        e.indent(|e| {
                            for (i, prop) in properties.iter().enumerate() {
                                let (optional, inner_t) = self.effective(graph, prop.of_type, prop.optional);
                                let ivar = names.property_name_source(t, i).unwrap();
                                let raw = Sourcelike::seq([Sourcelike::lit("@"), ivar]);
                                let conv = self.to_dynamic(graph, names, inner_t, raw, optional).unwrap();
                                e.emit_line([
                                    Sourcelike::lit("\""),
                                    Sourcelike::lit(prop.json_name.clone()),
                                    Sourcelike::lit("\" => "),
                                    conv,
                                    Sourcelike::lit(","),
                                ]);
                            }
                        });
                        e.emit_line([Sourcelike::lit("}")]);
                    },
                );
            },
        );
        Ok(())
    }

    fn emit_enum(&self, emitter: &mut Emitter, graph: &TypeGraph, names: &NameTable, t: TypeId) -> Result<()> {
        let cases = match graph.get(t) {
            Type::Enum { cases, .. } => cases,
            _ => unreachable!("emit_enum called on a non-enum node"),
        };
        let name = names.type_name_source(t).ok_or_else(|| RenderError::UnassignedName {
            node: t,
            namespace: "types".to_string(),
        })?;

        // The validator itself must live inside `Types` so references elsewhere
        // resolve as `Types::Egg`; the human-readable case table is a sibling
        // module so its name never collides with the validator constant.
        emitter.emit_line([Sourcelike::lit("module Types")]);
        emitter.indent(|e| {
            e.emit_line([name.clone(), Sourcelike::lit(" = Types::String.enum(")]);
            e.indent(|e| {
                for (i, case) in cases.iter().enumerate() {
                    let suffix = if i + 1 == cases.len() { "" } else { "," };
                    e.emit_line([Sourcelike::lit(format!("\"{case}\"{suffix}"))]);
                }
            });
            e.emit_line([Sourcelike::lit(")")]);
        });
        emitter.emit_line([Sourcelike::lit("end")]);

        emitter.ensure_blank_line();

        let rows: Vec<Vec<Sourcelike>> = cases
            .iter()
            .enumerate()
            .map(|(i, case)| {
                vec![
                    names.case_name_source(t, i).unwrap(),
                    Sourcelike::lit(format!(" = \"{case}\"")),
                ]
            })
            .collect();

        emitter.emit_line([Sourcelike::lit("module "), Sourcelike::seq([name, Sourcelike::lit("Cases")])]);
        emitter.indent(|e| {
            e.emit_table(rows, names).expect("case names are resolved by the same pass that resolves the module name");
        });
        emitter.emit_line([Sourcelike::lit("end")]);
        Ok(())
    }

    fn emit_union(&self, emitter: &mut Emitter, graph: &TypeGraph, names: &NameTable, t: TypeId) -> Result<()> {
        let members = match graph.get(t) {
            Type::Union { members, .. } => members.clone(),
            _ => unreachable!("emit_union called on a non-union node"),
        };
        let name = names.type_name_source(t).ok_or_else(|| RenderError::UnassignedName {
            node: t,
            namespace: "types".to_string(),
        })?;

        match self.union_strategy(graph, &members) {
            UnionStrategy::ExplicitSum => {
                emitter.emit_block(
                    [Sourcelike::lit("class "), name.clone(), Sourcelike::lit(" < Dry::Struct")],
                    [Sourcelike::lit("end")],
                    |e| {
                        e.emit_line([Sourcelike::lit("attribute :value, Types::Any")]);
                        e.ensure_blank_line();
                        e.emit_block(
                            [Sourcelike::lit("def self.from_dynamic(d)")],
                            [Sourcelike::lit("end")],
                            |e| {
                                e.emit_line([name.clone(), Sourcelike::lit(".new(value: d)")]);
                            },
                        );
                        e.ensure_blank_line();
                        e.emit_block(
                            [Sourcelike::lit("def to_dynamic")],
                            [Sourcelike::lit("end")],
                            |e| {
                                e.emit_line([Sourcelike::lit("@value")]);
                            },
                        );
                    },
                );
            }
            _ => {
                // Nullable and implicitly-marshalled unions never need their own
                // declaration; every reference renders the inline type expression.
            }
        }
        Ok(())
    }

    fn emit_top_level_alias(
        &self,
        emitter: &mut Emitter,
        graph: &TypeGraph,
        names: &NameTable,
        proposed_name: &str,
        t: TypeId,
    ) -> Result<()> {
        let expr = self.type_expr(graph, names, t)?;
        emitter.emit_line([
            Sourcelike::lit(proposed_name.to_string()),
            Sourcelike::lit(" = "),
            expr,
        ]);
        Ok(())
    }

    fn file_extension(&self) -> &str {
        "rb"
    }
}

fn json_shape_key(graph: &TypeGraph, t: TypeId) -> &'static str {
    match graph.get(t) {
        Type::Any => "any",
        Type::Null => "null",
        Type::Bool => "bool",
        Type::Int | Type::Double => "number",
        Type::String => "string",
        Type::Array { .. } => "array",
        Type::Map { .. } => "object",
        Type::Class { .. } => "object",
        Type::Enum { .. } => "string",
        Type::Union { .. } => "union",
    }
}

fn disjoint_json_shapes(graph: &TypeGraph, members: &[TypeId]) -> bool {
    let mut seen = HashSet::new();
    members.iter().all(|m| seen.insert(json_shape_key(graph, *m)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Property, TypeGraph};
    use crate::render::names::NameTable;

    fn names_for(graph: &TypeGraph, target: &RubyDryTypes) -> NameTable {
        NameTable::build(graph, target)
    }

    #[test]
    fn nullable_array_of_class_is_not_implicit() {
        let target = RubyDryTypes::new();
        let mut g = TypeGraph::new();
        let evolution = g.push(Type::Class {
            name: Some("Evolution".into()),
            description: None,
            properties: vec![],
        });
        let array = g.push(Type::Array { items: evolution });
        let null = g.push(Type::Null);
        let union = g.push(Type::Union { name: None, description: None, members: vec![array, null] });
        assert!(!target.marshals_implicitly(&g, union));
    }

    #[test]
    fn array_of_decimal_is_implicit() {
        let target = RubyDryTypes::new();
        let mut g = TypeGraph::new();
        let dbl = g.push(Type::Double);
        let array = g.push(Type::Array { items: dbl });
        assert!(target.marshals_implicitly(&g, array));
    }

    #[test]
    fn enum_from_dynamic_wraps_in_validator_lookup() {
        let target = RubyDryTypes::new();
        let mut g = TypeGraph::new();
        let egg = g.push(Type::Enum {
            name: Some("Egg".into()),
            description: None,
            cases: vec!["2 km".into()],
        });
        let names = names_for(&g, &target);
        let conv = target
            .from_dynamic(&g, &names, egg, Sourcelike::lit("d[\"egg\"]"), false)
            .unwrap();
        let mut out = String::new();
        crate::source::flatten_for_test(&conv, &names, &mut out).unwrap();
        assert_eq!(out, "Types::Egg[d[\"egg\"]]");
    }

    #[test]
    fn class_to_dynamic_recurses_through_to_dynamic_not_from_dynamic() {
        // Regression test for the latent nullable-array-of-class bug: to_dynamic
        // must call `x.to_dynamic` on each element, never `Evolution.from_dynamic`.
        let target = RubyDryTypes::new();
        let mut g = TypeGraph::new();
        let evolution = g.push(Type::Class {
            name: Some("Evolution".into()),
            description: None,
            properties: vec![],
        });
        let array = g.push(Type::Array { items: evolution });
        let null = g.push(Type::Null);
        let union = g.push(Type::Union { name: None, description: None, members: vec![array, null] });
        let names = names_for(&g, &target);
        let conv = target
            .to_dynamic(&g, &names, union, Sourcelike::lit("@next_evolution"), true)
            .unwrap();
        let mut out = String::new();
        crate::source::flatten_for_test(&conv, &names, &mut out).unwrap();
        assert_eq!(
            out,
            "@next_evolution.nil? ? nil : @next_evolution.map { |x| x.to_dynamic }"
        );
        assert!(!out.contains("from_dynamic"));
    }

    #[test]
    fn class_property_declaration_matches_worked_example() {
        let target = RubyDryTypes::new();
        let mut g = TypeGraph::new();
        let evolution = g.push(Type::Class { name: Some("Evolution".into()), description: None, properties: vec![] });
        let array = g.push(Type::Array { items: evolution });
        let null = g.push(Type::Null);
        let union = g.push(Type::Union { name: None, description: None, members: vec![array, null] });
        let names = names_for(&g, &target);
        let expr = target.type_expr(&g, &names, union).unwrap();
        let mut out = String::new();
        crate::source::flatten_for_test(&expr, &names, &mut out).unwrap();
        assert_eq!(out, "Types.Array(Types.Instance(Evolution)).optional");
    }
}
