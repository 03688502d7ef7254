//! Golden tests for the Ruby `dry-struct` render target.
//!
//! Fixtures are built directly against the `TypeGraph` arena API rather than
//! parsed from JSON Schema, since schema-to-graph construction is a separate
//! collaborator this crate does not implement.

use rendergen::diagnostics::Diagnostics;
use rendergen::ir::{Property, Type, TypeGraph};
use rendergen::render::ruby::RubyDryTypes;
use rendergen::render::render;

/// A small pokedex-shaped graph: two enums (`Egg`, `Weakness`), a referenced
/// class (`Evolution`), and a top-level class (`Pokemon`) exercising every
/// marshalling case in the property table.
fn pokedex_graph() -> (TypeGraph, rendergen::ir::TypeId, rendergen::ir::TypeId, rendergen::ir::TypeId, rendergen::ir::TypeId) {
    let mut g = TypeGraph::new();

    let egg = g.push(Type::Enum {
        name: Some("Egg".into()),
        description: None,
        cases: vec!["2 km".into(), "10 km".into(), "Not in Eggs".into()],
    });
    let weakness = g.push(Type::Enum {
        name: Some("Weakness".into()),
        description: None,
        cases: vec!["fire".into(), "water".into()],
    });

    let evolution = g.push(Type::Class {
        name: Some("Evolution".into()),
        description: None,
        properties: vec![
            Property { json_name: "id".into(), of_type: g.push(Type::Int), optional: false, description: None },
        ],
    });

    let id_ty = g.push(Type::Int);
    let double_ty = g.push(Type::Double);
    let multipliers_items = double_ty;
    let multipliers_array = g.push(Type::Array { items: multipliers_items });
    let multipliers_null = g.push(Type::Null);
    let multipliers_union = g.push(Type::Union {
        name: None,
        description: None,
        members: vec![multipliers_array, multipliers_null],
    });

    let next_evolution_array = g.push(Type::Array { items: evolution });
    let next_evolution_null = g.push(Type::Null);
    let next_evolution_union = g.push(Type::Union {
        name: None,
        description: None,
        members: vec![next_evolution_array, next_evolution_null],
    });

    let weaknesses_array = g.push(Type::Array { items: weakness });

    let pokemon = g.push(Type::Class {
        name: Some("Pokemon".into()),
        description: None,
        properties: vec![
            Property { json_name: "id".into(), of_type: id_ty, optional: false, description: None },
            Property { json_name: "candy_count".into(), of_type: id_ty, optional: true, description: None },
            Property { json_name: "egg".into(), of_type: egg, optional: false, description: None },
            Property {
                json_name: "multipliers".into(),
                of_type: multipliers_union,
                optional: false,
                description: None,
            },
            Property {
                json_name: "next_evolution".into(),
                of_type: next_evolution_union,
                optional: false,
                description: None,
            },
            Property { json_name: "weaknesses".into(), of_type: weaknesses_array, optional: false, description: None },
        ],
    });
    g.mark_top_level("Pokemon", pokemon);

    (g, egg, weakness, evolution, pokemon)
}

// =============================================================================
// Property table: from_dynamic shapes
// =============================================================================

#[test]
fn id_property_is_passed_through_unwrapped() {
    let (g, _, _, _, _) = pokedex_graph();
    let target = RubyDryTypes::new();
    let mut diagnostics = Diagnostics::new();
    let lines = render(&g, &target, None, &mut diagnostics).unwrap();
    assert!(lines.iter().any(|l| l.trim() == "id: d[\"id\"],"));
}

#[test]
fn optional_int_property_has_no_wrapper() {
    let (g, _, _, _, _) = pokedex_graph();
    let target = RubyDryTypes::new();
    let mut diagnostics = Diagnostics::new();
    let lines = render(&g, &target, None, &mut diagnostics).unwrap();
    assert!(lines.iter().any(|l| l.trim() == "candy_count: d[\"candy_count\"],"));
}

#[test]
fn enum_property_routes_through_the_validator() {
    let (g, _, _, _, _) = pokedex_graph();
    let target = RubyDryTypes::new();
    let mut diagnostics = Diagnostics::new();
    let lines = render(&g, &target, None, &mut diagnostics).unwrap();
    assert!(lines.iter().any(|l| l.trim() == "egg: Types::Egg[d[\"egg\"]],"));
}

#[test]
fn optional_array_of_implicit_items_is_passed_through_unwrapped() {
    let (g, _, _, _, _) = pokedex_graph();
    let target = RubyDryTypes::new();
    let mut diagnostics = Diagnostics::new();
    let lines = render(&g, &target, None, &mut diagnostics).unwrap();
    assert!(lines.iter().any(|l| l.trim() == "multipliers: d[\"multipliers\"],"));
}

#[test]
fn optional_array_of_classes_maps_and_nil_checks() {
    let (g, _, _, _, _) = pokedex_graph();
    let target = RubyDryTypes::new();
    let mut diagnostics = Diagnostics::new();
    let lines = render(&g, &target, None, &mut diagnostics).unwrap();
    assert!(lines.iter().any(|l| {
        l.trim() == "next_evolution: d[\"next_evolution\"].nil? ? nil : d[\"next_evolution\"].map { |x| Evolution.from_dynamic(x) },"
    }));
}

#[test]
fn array_of_enums_maps_each_element_through_the_validator() {
    let (g, _, _, _, _) = pokedex_graph();
    let target = RubyDryTypes::new();
    let mut diagnostics = Diagnostics::new();
    let lines = render(&g, &target, None, &mut diagnostics).unwrap();
    assert!(lines.iter().any(|l| l.trim() == "weaknesses: d[\"weaknesses\"].map { |x| Types::Weakness[x] },"));
}

// =============================================================================
// toDynamic nullable-class-array regression
// =============================================================================

#[test]
fn to_dynamic_for_nullable_array_of_classes_recurses_via_to_dynamic() {
    let (g, _, _, _, _) = pokedex_graph();
    let target = RubyDryTypes::new();
    let mut diagnostics = Diagnostics::new();
    let lines = render(&g, &target, None, &mut diagnostics).unwrap();
    let line = lines
        .iter()
        .find(|l| l.contains("\"next_evolution\" =>"))
        .expect("to_dynamic should emit a next_evolution entry");
    assert!(line.contains("@next_evolution.map { |x| x.to_dynamic }"), "got: {line}");
    assert!(!line.contains("from_dynamic"), "to_dynamic must never call from_dynamic: {line}");
}

// =============================================================================
// Declaration ordering
// =============================================================================

#[test]
fn enums_and_dependencies_are_declared_before_dependents() {
    let (g, _, _, _, _) = pokedex_graph();
    let target = RubyDryTypes::new();
    let mut diagnostics = Diagnostics::new();
    let lines = render(&g, &target, None, &mut diagnostics).unwrap();

    let egg_pos = lines.iter().position(|l| l.contains("Egg = Types::String.enum(")).unwrap();
    let weakness_pos = lines.iter().position(|l| l.contains("Weakness = Types::String.enum(")).unwrap();
    let evolution_pos = lines.iter().position(|l| l.contains("class Evolution < Dry::Struct")).unwrap();
    let pokemon_pos = lines.iter().position(|l| l.contains("class Pokemon < Dry::Struct")).unwrap();

    assert!(egg_pos < pokemon_pos);
    assert!(weakness_pos < pokemon_pos);
    assert!(evolution_pos < pokemon_pos);
}

// =============================================================================
// Enum case tables
// =============================================================================

#[test]
fn enum_case_names_use_the_km_acronym_and_digit_prefix_rules() {
    let (g, _, _, _, _) = pokedex_graph();
    let target = RubyDryTypes::new();
    let mut diagnostics = Diagnostics::new();
    let lines = render(&g, &target, None, &mut diagnostics).unwrap();

    assert!(lines.iter().any(|l| l.trim_start().starts_with("The2KM") && l.contains("\"2 km\"")));
    assert!(lines.iter().any(|l| l.trim_start().starts_with("The10KM") && l.contains("\"10 km\"")));
    assert!(lines.iter().any(|l| l.trim_start().starts_with("NotInEggs") && l.contains("\"Not in Eggs\"")));
}

#[test]
fn enum_case_table_columns_are_aligned() {
    let (g, _, _, _, _) = pokedex_graph();
    let target = RubyDryTypes::new();
    let mut diagnostics = Diagnostics::new();
    let lines = render(&g, &target, None, &mut diagnostics).unwrap();

    let rows: Vec<&String> = lines.iter().filter(|l| l.contains(" = \"") && l.trim_start().starts_with("The")).collect();
    assert!(rows.len() >= 2, "expected at least 2 aligned case rows, got {rows:?}");
    let first_eq = rows[0].find('=').unwrap();
    for row in &rows {
        assert_eq!(row.find('=').unwrap(), first_eq, "case table column is misaligned: {row}");
    }
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn render_is_deterministic_across_runs() {
    let (g, _, _, _, _) = pokedex_graph();
    let target = RubyDryTypes::new();

    let mut d1 = Diagnostics::new();
    let first = render(&g, &target, None, &mut d1).unwrap();

    let mut d2 = Diagnostics::new();
    let second = render(&g, &target, None, &mut d2).unwrap();

    assert_eq!(first, second);
}

// =============================================================================
// Fatal error taxonomy
// =============================================================================

#[test]
fn bare_null_property_is_a_fatal_unsupported_type_shape() {
    let mut g = TypeGraph::new();
    let null_id = g.push(Type::Null);
    g.push(Type::Class {
        name: Some("Broken".into()),
        description: None,
        properties: vec![Property { json_name: "x".into(), of_type: null_id, optional: false, description: None }],
    });

    let target = RubyDryTypes::new();
    let mut diagnostics = Diagnostics::new();
    let err = render(&g, &target, None, &mut diagnostics).unwrap_err();
    assert!(matches!(err, rendergen::error::RenderError::UnsupportedTypeShape { .. }), "got: {err:?}");
}
