//! Name assignment (4.3 phase 1): one `Namer` for the *types* namespace, plus one
//! per-class *properties* namer and one per-enum *cases* namer, all sealed before
//! any body is emitted.

use std::collections::HashMap;

use crate::error::Result;
use crate::ir::{Type, TypeGraph, TypeId};
use crate::naming::{NameId, Namer};
use crate::render::strategy::{RenderStrategy, UnionStrategy};
use crate::source::{NameResolver, NamerSet, Sourcelike};

pub struct NameTable {
    types: Namer,
    type_ids: HashMap<TypeId, NameId>,
    properties: HashMap<TypeId, Namer>,
    property_ids: HashMap<(TypeId, usize), NameId>,
    enum_cases: HashMap<TypeId, Namer>,
    case_ids: HashMap<(TypeId, usize), NameId>,
}

impl NameTable {
    /// Walk every node that will actually need a declared identifier, in graph
    /// order, proposing a raw label for each, then seal every namer. Graph
    /// (insertion) order is what makes disambiguation suffixes deterministic.
    ///
    /// A `Union` only gets a type name when the strategy resolves it to an
    /// explicit sum: nullable and implicitly-marshalled unions render as inline
    /// type expressions and never need a declaration of their own.
    pub fn build<S: RenderStrategy>(graph: &TypeGraph, strategy: &S) -> Self {
        let mut types = Namer::new("types", strategy.type_naming_style(), strategy.is_start(), strategy.is_part(), strategy.keywords().clone());
        let mut type_ids = HashMap::new();
        let mut properties: HashMap<TypeId, Namer> = HashMap::new();
        let mut property_ids = HashMap::new();
        let mut enum_cases: HashMap<TypeId, Namer> = HashMap::new();
        let mut case_ids = HashMap::new();

        for id in graph.ids() {
            match graph.get(id) {
                Type::Class { name, properties: props, .. } => {
                    let proposal = name.clone().unwrap_or_else(|| "AnonymousObject".to_string());
                    type_ids.insert(id, types.create_name(&proposal));

                    let mut namer = Namer::new(
                        format!("properties:{}", id.index()),
                        strategy.property_naming_style(),
                        strategy.is_start(),
                        strategy.is_part(),
                        std::collections::HashSet::new(),
                    );
                    for (i, prop) in props.iter().enumerate() {
                        let pid = namer.create_name(&prop.json_name);
                        property_ids.insert((id, i), pid);
                    }
                    properties.insert(id, namer);
                }
                Type::Enum { name, cases, .. } => {
                    let proposal = name.clone().unwrap_or_else(|| "AnonymousEnum".to_string());
                    type_ids.insert(id, types.create_name(&proposal));

                    let mut namer = Namer::new(
                        format!("enum_cases:{}", id.index()),
                        strategy.enum_case_naming_style(),
                        strategy.is_start(),
                        strategy.is_part(),
                        std::collections::HashSet::new(),
                    );
                    for (i, case) in cases.iter().enumerate() {
                        let cid = namer.create_name(case);
                        case_ids.insert((id, i), cid);
                    }
                    enum_cases.insert(id, namer);
                }
                Type::Union { name, members, .. } => {
                    if strategy.union_strategy(graph, members) == UnionStrategy::ExplicitSum {
                        let proposal = name.clone().unwrap_or_else(|| "AnonymousUnion".to_string());
                        type_ids.insert(id, types.create_name(&proposal));
                    }
                }
                _ => {}
            }
        }

        types.seal();
        for namer in properties.values_mut() {
            namer.seal();
        }
        for namer in enum_cases.values_mut() {
            namer.seal();
        }

        Self { types, type_ids, properties, property_ids, enum_cases, case_ids }
    }

    pub fn type_name_id(&self, id: TypeId) -> Option<NameId> {
        self.type_ids.get(&id).copied()
    }

    pub fn type_name(&self, id: TypeId) -> Result<String> {
        let nid = self.type_name_id(id).ok_or_else(|| crate::error::RenderError::UnassignedName {
            node: id,
            namespace: "types".to_string(),
        })?;
        self.types.resolve(nid).map(|s| s.to_string())
    }

    pub fn type_name_source(&self, id: TypeId) -> Option<Sourcelike> {
        self.type_name_id(id).map(|nid| Sourcelike::name("types", nid))
    }

    pub fn property_name_source(&self, class: TypeId, index: usize) -> Option<Sourcelike> {
        self.property_ids
            .get(&(class, index))
            .map(|nid| Sourcelike::name(format!("properties:{}", class.index()), *nid))
    }

    pub fn property_name(&self, class: TypeId, index: usize) -> Result<String> {
        let namer = &self.properties[&class];
        let nid = self.property_ids[&(class, index)];
        namer.resolve(nid).map(|s| s.to_string())
    }

    pub fn case_name(&self, enum_id: TypeId, index: usize) -> Result<String> {
        let namer = &self.enum_cases[&enum_id];
        let nid = self.case_ids[&(enum_id, index)];
        namer.resolve(nid).map(|s| s.to_string())
    }

    pub fn case_name_source(&self, enum_id: TypeId, index: usize) -> Option<Sourcelike> {
        self.case_ids
            .get(&(enum_id, index))
            .map(|nid| Sourcelike::name(format!("enum_cases:{}", enum_id.index()), *nid))
    }

    /// Build a resolver seeing every namer this table owns, for `Emitter::finish`.
    pub fn resolver(&self) -> NamerSet<'_> {
        let mut namers = vec![&self.types];
        namers.extend(self.properties.values());
        namers.extend(self.enum_cases.values());
        NamerSet::new(namers)
    }
}

impl NameResolver for NameTable {
    fn resolve(&self, namespace: &str, id: NameId) -> Result<String> {
        self.resolver().resolve(namespace, id)
    }
}
