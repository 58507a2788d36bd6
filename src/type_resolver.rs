use crate::bindings::{BindingTable, Namespace, TypeTag};
use crate::type_model::{TypeModel, TypeRef};
use log::{debug, trace};
use std::collections::HashSet;

/// Strategy that turns a declared type into semantic type tags.
///
/// Implementations must be immutable after construction so one mapper can serve many concurrent
/// document generations.
pub trait TypeMapper: Send + Sync {
    /// Resolve `ty` against `model`. `None` means "omit the type attribute".
    fn resolve(&self, ty: &TypeRef, model: &TypeModel) -> Option<TypeTag>;

    /// Namespace the produced tags live in
    fn namespace(&self) -> &Namespace;
}

/// Which related types take part in matching a type against the binding table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CandidateSet {
    /// The type, its supertypes and interfaces transitively, and `Object`
    #[default]
    Ancestors,
    /// The type and the member types nested inside it. Supertypes are not consulted, so a
    /// subclass of a bound type stays unresolved unless it nests a bound type itself.
    Members,
}

/// Binding-table driven [`TypeMapper`]
#[derive(Debug, Clone)]
pub struct TypeResolver {
    table: BindingTable,
    candidates: CandidateSet,
}

impl TypeResolver {
    pub fn new(table: BindingTable, candidates: CandidateSet) -> Self {
        debug!(
            "Initializing TypeResolver with {} bindings in namespace {} ({:?} candidates)",
            table.len(),
            table.namespace().uri,
            candidates
        );
        Self { table, candidates }
    }

    /// Resolver over the JSON value types
    pub fn json() -> Self {
        Self::new(BindingTable::json(), CandidateSet::default())
    }

    /// Resolver over the XML Schema built-in types
    pub fn xsd() -> Self {
        Self::new(BindingTable::xsd(), CandidateSet::default())
    }

    /// Switch the candidate-set strategy
    pub fn with_candidates(mut self, candidates: CandidateSet) -> Self {
        self.candidates = candidates;
        self
    }

    pub fn table(&self) -> &BindingTable {
        &self.table
    }

    pub fn candidates(&self) -> CandidateSet {
        self.candidates
    }

    fn candidate_set(&self, name: &str, model: &TypeModel) -> HashSet<String> {
        match self.candidates {
            CandidateSet::Ancestors => model.ancestors(name),
            CandidateSet::Members => model.members(name),
        }
    }
}

impl Default for TypeResolver {
    fn default() -> Self {
        Self::json()
    }
}

impl TypeMapper for TypeResolver {
    fn resolve(&self, ty: &TypeRef, model: &TypeModel) -> Option<TypeTag> {
        // Arrays resolve as their element type
        let ty = ty.element().unwrap_or_else(|| ty.clone());

        let candidates = self.candidate_set(ty.name(), model);
        trace!("Candidate types for {}: {:?}", ty, candidates);

        match self.table.first_match(&candidates) {
            Some(binding) => {
                trace!("Mapped type '{}' to {} via {}", ty, binding.tag, binding.source);
                Some(binding.tag.clone())
            }
            None => {
                debug!("Could not map type '{}' to a semantic type", ty);
                None
            }
        }
    }

    fn namespace(&self) -> &Namespace {
        self.table.namespace()
    }
}
