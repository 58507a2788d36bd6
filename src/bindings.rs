//! Ordered type binding tables.
//!
//! A [`BindingTable`] associates source type names with semantic [`TypeTag`]s. The table is a
//! priority list: when several bindings match a type, the one declared first wins, no matter how
//! specific the later ones are. Tables are assembled once through the consuming [`BindingTable::bind`]
//! builder and cannot be changed afterwards.

use crate::type_model::OBJECT;
use log::trace;
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;

/// Namespace of the WADL vocabulary itself
pub const WADL_NAMESPACE: &str = "http://wadl.dev.java.net/2009/02";
/// Namespace of the XML Schema built-in data types
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// An XML-style namespace declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Namespace {
    /// Short prefix used when rendering tags
    pub prefix: String,
    /// Namespace URI
    pub uri: String,
}

impl Namespace {
    pub fn new(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            uri: uri.into(),
        }
    }

    /// The WADL namespace, prefixed `wadl`
    pub fn wadl() -> Self {
        Self::new("wadl", WADL_NAMESPACE)
    }

    /// The XML Schema namespace, prefixed `xs`
    pub fn xsd() -> Self {
        Self::new("xs", XSD_NAMESPACE)
    }
}

/// Semantic data-type label attached to params and representations.
///
/// Serialized as `prefix:local`, e.g. `wadl:number` or `xs:dateTime`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeTag {
    namespace: Namespace,
    local: String,
}

impl TypeTag {
    pub fn new(namespace: Namespace, local: impl Into<String>) -> Self {
        Self {
            namespace,
            local: local.into(),
        }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn local(&self) -> &str {
        &self.local
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.namespace.prefix, self.local)
    }
}

impl Serialize for TypeTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One (source type, tag) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeBinding {
    /// Exact name of the source type
    pub source: String,
    /// Tag produced when this binding matches
    pub tag: TypeTag,
}

/// Priority-ordered list of type bindings sharing one namespace.
#[derive(Debug, Clone)]
pub struct BindingTable {
    namespace: Namespace,
    bindings: Vec<TypeBinding>,
}

impl BindingTable {
    /// Start an empty table whose tags live in `namespace`
    pub fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            bindings: Vec::new(),
        }
    }

    /// Append a binding; it ranks below every binding added before it
    pub fn bind(mut self, source: &str, local: &str) -> Self {
        let tag = TypeTag::new(self.namespace.clone(), local);
        trace!("Added type binding {} -> {}", source, tag);
        self.bindings.push(TypeBinding {
            source: source.to_string(),
            tag,
        });
        self
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn bindings(&self) -> &[TypeBinding] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// First binding, in declaration order, whose source type is one of `candidates`
    pub fn first_match(&self, candidates: &HashSet<String>) -> Option<&TypeBinding> {
        self.bindings
            .iter()
            .find(|binding| candidates.contains(&binding.source))
    }

    /// Bindings onto the JSON value types, tagged in the WADL namespace
    pub fn json() -> Self {
        Self::new(Namespace::wadl())
            .bind("String", "string")
            .bind("BigInteger", "number")
            .bind("Integer", "number")
            .bind("Long", "number")
            .bind("Short", "number")
            .bind("BigDecimal", "number")
            .bind("Float", "number")
            .bind("Double", "number")
            .bind("Boolean", "boolean")
            .bind("List", "array")
            .bind("Set", "array")
            .bind("Map", "object")
            .bind(OBJECT, "object")
    }

    /// Bindings onto the XML Schema built-in types, tagged in the XSD namespace
    pub fn xsd() -> Self {
        Self::new(Namespace::xsd())
            .bind("String", "string")
            .bind("BigInteger", "integer")
            .bind("Integer", "integer")
            .bind("Long", "long")
            .bind("Short", "short")
            .bind("BigDecimal", "decimal")
            .bind("Float", "float")
            .bind("Double", "double")
            .bind("Boolean", "boolean")
            .bind("Byte", "byte")
            .bind("Calendar", "dateTime")
            .bind("Date", "dateTime")
            .bind("Duration", "duration")
            .bind("List", "anyType")
            .bind("Set", "anyType")
            .bind("Map", "anyType")
            .bind(OBJECT, "anyType")
    }
}
