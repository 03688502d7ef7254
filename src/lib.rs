//! rendergen
//!
//! Turns a target-agnostic type graph into source code for a concrete target
//! language. The graph is supplied pre-built (typically deserialized from JSON);
//! this crate does not infer types from samples or parse JSON Schema.
//!
//! ## Features
//!
//! - **Type IR**: an arena-backed graph of Any/Null/Bool/Int/Double/String,
//!   Array, Map, Class, Enum, and Union nodes, with invariant validation
//!   (acyclicity past named boundaries, nullable-union detection, uniqueness).
//! - **Naming pipeline**: word splitting, five word-casing policies, and a
//!   per-namespace `Namer` that assigns collision-free, keyword-avoiding,
//!   deterministically disambiguated identifiers.
//! - **Convenience Renderer**: a single driver that runs any `RenderStrategy`
//!   through name assignment, header, prelude, dependency-ordered body, and
//!   top-level phases.
//! - **Ruby `dry-struct` target**: the one concrete `RenderStrategy` shipped,
//!   matching hand-written `dry-struct`/`dry-types` model conventions.
//!
//! ## Architecture
//!
//! ```text
//! TypeGraph (ir)
//!   -> validate (ir::validate)
//!   -> NameTable (render::names)
//!   -> ConvenienceRenderer (render) drives a RenderStrategy (render::strategy)
//!   -> Sourcelike / Emitter (source) flatten into a line stream
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod ir;
pub mod naming;
pub mod render;
pub mod source;

pub use config::RenderConfig;
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{RenderError, Result};
pub use ir::{Property, Type, TypeGraph, TypeId};
pub use render::{render, RenderStrategy};

