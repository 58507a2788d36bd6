//! Static type-description model consulted during type resolution.
//!
//! Route sources describe parameter and return types by name. The [`TypeModel`] records, for each
//! named type, its supertype, the interfaces it implements and the member types nested inside it.
//! Resolvers ask the model for a type's ancestor closure or member closure and then match those
//! names against their binding tables.

use log::trace;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Name of the universal base type every other type descends from.
pub const OBJECT: &str = "Object";

/// A declared type as written by a route source.
///
/// Array types carry a `[]` suffix, so `User[]` is an array of `User`. The names `void` and `()`
/// (and the empty string) denote the absence of a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeRef(String);

impl TypeRef {
    /// Create a reference to a named type
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Create a reference to an array of `element`
    pub fn array(element: TypeRef) -> Self {
        Self(format!("{}[]", element.0))
    }

    /// The type name exactly as declared
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Whether this is an array type
    pub fn is_array(&self) -> bool {
        self.0.trim_end().ends_with("[]")
    }

    /// The element type of an array type, one level deep
    pub fn element(&self) -> Option<TypeRef> {
        self.0
            .trim_end()
            .strip_suffix("[]")
            .map(|inner| TypeRef::new(inner.trim_end()))
    }

    /// Whether this reference denotes "no value"
    pub fn is_void(&self) -> bool {
        matches!(self.0.trim(), "" | "void" | "()")
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        TypeRef::new(name)
    }
}

/// Structural description of one named type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// The type name
    pub name: String,
    /// Direct supertype, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supertype: Option<String>,
    /// Directly implemented (or, for interfaces, extended) interfaces
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,
    /// Member types declared inside this type
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<String>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn extends(mut self, supertype: impl Into<String>) -> Self {
        self.supertype = Some(supertype.into());
        self
    }

    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn with_nested(mut self, member: impl Into<String>) -> Self {
        self.nested.push(member.into());
        self
    }
}

/// Registry of type descriptors keyed by name.
///
/// Types that were never defined are treated as plain types whose only ancestor is [`OBJECT`].
#[derive(Debug, Clone, Default)]
pub struct TypeModel {
    types: HashMap<String, TypeDescriptor>,
}

impl TypeModel {
    /// A model with no definitions at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// A model describing the standard value families the binding tables refer to
    pub fn builtin() -> Self {
        let mut model = Self::empty();

        model.define(TypeDescriptor::new(OBJECT));
        model.define(TypeDescriptor::new("Comparable"));
        model.define(TypeDescriptor::new("CharSequence"));
        model.define(
            TypeDescriptor::new("String")
                .implements("CharSequence")
                .implements("Comparable"),
        );
        model.define(TypeDescriptor::new("Boolean").implements("Comparable"));

        model.define(TypeDescriptor::new("Number"));
        for numeric in [
            "BigInteger",
            "BigDecimal",
            "Integer",
            "Long",
            "Short",
            "Float",
            "Double",
            "Byte",
        ] {
            model.define(
                TypeDescriptor::new(numeric)
                    .extends("Number")
                    .implements("Comparable"),
            );
        }

        model.define(TypeDescriptor::new("Date").implements("Comparable"));
        model.define(TypeDescriptor::new("Calendar").implements("Comparable"));
        model.define(TypeDescriptor::new("Duration"));

        model.define(TypeDescriptor::new("Iterable"));
        model.define(TypeDescriptor::new("Collection").implements("Iterable"));
        model.define(TypeDescriptor::new("List").implements("Collection"));
        model.define(TypeDescriptor::new("Set").implements("Collection"));
        model.define(TypeDescriptor::new("Map").with_nested("Map.Entry"));
        model.define(TypeDescriptor::new("Map.Entry"));

        model.define(TypeDescriptor::new("ArrayList").implements("List"));
        model.define(TypeDescriptor::new("LinkedList").implements("List"));
        model.define(TypeDescriptor::new("HashSet").implements("Set"));
        model.define(TypeDescriptor::new("TreeSet").implements("Set"));
        model.define(TypeDescriptor::new("HashMap").implements("Map"));
        model.define(TypeDescriptor::new("TreeMap").implements("Map"));

        model
    }

    /// Add a descriptor, replacing any earlier definition of the same name
    pub fn define(&mut self, descriptor: TypeDescriptor) {
        self.types.insert(descriptor.name.clone(), descriptor);
    }

    /// Add several descriptors
    pub fn extend<I: IntoIterator<Item = TypeDescriptor>>(&mut self, descriptors: I) {
        for descriptor in descriptors {
            self.define(descriptor);
        }
    }

    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// The type itself, all of its supertypes and interfaces transitively, and [`OBJECT`].
    pub fn ancestors(&self, name: &str) -> HashSet<String> {
        let mut closure = self.closure(name, |descriptor| {
            descriptor
                .supertype
                .iter()
                .chain(descriptor.interfaces.iter())
                .cloned()
                .collect()
        });
        closure.insert(OBJECT.to_string());
        trace!("Ancestors of {}: {:?}", name, closure);
        closure
    }

    /// The type itself and every member type nested inside it, transitively.
    pub fn members(&self, name: &str) -> HashSet<String> {
        let closure = self.closure(name, |descriptor| descriptor.nested.clone());
        trace!("Members of {}: {:?}", name, closure);
        closure
    }

    fn closure<F>(&self, name: &str, edges: F) -> HashSet<String>
    where
        F: Fn(&TypeDescriptor) -> Vec<String>,
    {
        let mut seen = HashSet::new();
        let mut pending = vec![name.to_string()];

        while let Some(current) = pending.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Some(descriptor) = self.types.get(&current) {
                pending.extend(edges(descriptor));
            }
        }

        seen
    }
}
