//! The `RenderStrategy` capability set (spec 9's replacement for a subclass-based
//! renderer family). A target is one value implementing this trait; the driver in
//! [`super::mod`] is generic over it, so there is no virtual dispatch through a
//! class hierarchy — only ordinary monomorphized Rust generics.

use std::collections::HashSet;

use crate::error::Result;
use crate::ir::{TypeGraph, TypeId};
use crate::naming::Style;
use crate::render::names::NameTable;
use crate::source::{Emitter, Sourcelike};

/// How a union renders, decided once per union node (4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnionStrategy {
    /// Exactly one non-null member: render as the target's optional construct.
    Nullable,
    /// All members implicit and disjoint at the JSON layer: render as a union of
    /// type expressions, converters are identity.
    ImplicitlyMarshalled,
    /// A named wrapper with one constructor per member and a JSON-level value
    /// guard discriminator.
    ExplicitSum,
}

/// Fixed set of hooks a target language supplies. Every other renderer behavior is
/// inherited from the [`super::ConvenienceRenderer`] driver.
pub trait RenderStrategy {
    /// Indentation unit, e.g. two spaces.
    fn indent_unit(&self) -> &str;

    /// Whether leaf types must be declared in source before any type that refers
    /// to them (drives the body phase's topological-sort-vs-insertion-order
    /// choice, 4.3).
    fn needs_type_declaration_before_use(&self) -> bool {
        true
    }

    /// Whether the target can express "optional" directly on a class property
    /// (vs. requiring the type itself to be wrapped everywhere it is used).
    fn supports_optional_properties(&self) -> bool {
        true
    }

    fn is_start(&self) -> fn(char) -> bool;
    fn is_part(&self) -> fn(char) -> bool;

    /// Reserved words forbidden in the *types* namespace.
    fn keywords(&self) -> &HashSet<String>;

    fn type_naming_style(&self) -> Style;
    fn property_naming_style(&self) -> Style;
    fn enum_case_naming_style(&self) -> Style;

    /// Emit leading comments and import/require lines (4.3 phase 2).
    fn header(&self, emitter: &mut Emitter, leading_comment: Option<&str>);

    /// Emit target-level declarations that must precede named types (4.3 phase 3).
    fn prelude(&self, emitter: &mut Emitter, graph: &TypeGraph, names: &NameTable) -> Result<()>;

    /// `t` as used in a field annotation.
    fn type_expr(&self, graph: &TypeGraph, names: &NameTable, t: TypeId) -> Result<Sourcelike>;

    /// Convert a JSON-shaped expression into the domain representation.
    fn from_dynamic(
        &self,
        graph: &TypeGraph,
        names: &NameTable,
        t: TypeId,
        expr: Sourcelike,
        optional: bool,
    ) -> Result<Sourcelike>;

    /// Inverse of [`Self::from_dynamic`].
    fn to_dynamic(
        &self,
        graph: &TypeGraph,
        names: &NameTable,
        t: TypeId,
        expr: Sourcelike,
        optional: bool,
    ) -> Result<Sourcelike>;

    /// True when `t`'s JSON shape equals its domain shape at every depth, so the
    /// driver may elide the wrapping `from_dynamic`/`to_dynamic` call entirely.
    fn marshals_implicitly(&self, graph: &TypeGraph, t: TypeId) -> bool;

    fn union_strategy(&self, graph: &TypeGraph, members: &[TypeId]) -> UnionStrategy;

    fn emit_class(&self, emitter: &mut Emitter, graph: &TypeGraph, names: &NameTable, t: TypeId) -> Result<()>;
    fn emit_enum(&self, emitter: &mut Emitter, graph: &TypeGraph, names: &NameTable, t: TypeId) -> Result<()>;
    fn emit_union(&self, emitter: &mut Emitter, graph: &TypeGraph, names: &NameTable, t: TypeId) -> Result<()>;

    /// Emit an alias or wrapper for a top-level that is not itself a named type.
    fn emit_top_level_alias(
        &self,
        emitter: &mut Emitter,
        graph: &TypeGraph,
        names: &NameTable,
        proposed_name: &str,
        t: TypeId,
    ) -> Result<()>;

    /// File extension for the output, e.g. `"rb"`.
    fn file_extension(&self) -> &str;
}
