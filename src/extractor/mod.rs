//! Route sources and the route records they produce.
//!
//! A route source reads the route table of an application and yields one [`RouteRecord`] per
//! path → handler binding, together with the [`TypeModel`] describing the types those routes
//! mention. Two sources ship with the crate:
//!
//! - **Actix-Web source code**: See [`actix::ActixExtractor`]
//! - **Route manifests** (YAML/JSON): See [`manifest::ManifestSource`]
//!
//! # Example
//!
//! ```no_run
//! use wadl_from_source::extractor::{RouteSource, manifest::ManifestSource};
//! use std::path::PathBuf;
//!
//! let source = ManifestSource::new(PathBuf::from("routes.yaml"));
//! let table = source.list_routes().unwrap();
//! println!("Found {} routes", table.routes.len());
//! ```

pub mod actix;
pub mod manifest;

use crate::error::{Error, Result};
use crate::type_model::{TypeModel, TypeRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Anything that can list the routes of an application.
pub trait RouteSource {
    /// Returns the route records in route-table order plus the type model they reference.
    fn list_routes(&self) -> Result<RouteTable>;
}

/// Snapshot of an application's route table.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    /// Route records in the order the source listed them
    pub routes: Vec<RouteRecord>,
    /// Types referenced by the routes
    pub types: TypeModel,
}

/// HTTP methods a route may be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Trace,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "HEAD" => Ok(HttpMethod::Head),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            "OPTIONS" => Ok(HttpMethod::Options),
            "TRACE" => Ok(HttpMethod::Trace),
            other => Err(Error::InvalidArgument(format!("unknown HTTP method: {}", other))),
        }
    }
}

impl TryFrom<String> for HttpMethod {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<HttpMethod> for String {
    fn from(method: HttpMethod) -> Self {
        method.as_str().to_string()
    }
}

/// How one handler parameter is bound to the request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ParamBinding {
    /// Not bound to a path segment or query parameter (body, context, ...)
    #[default]
    None,
    /// Bound to a `{segment}` of the path template
    Path {
        /// Declared name; blank means "use the parameter's own name"
        name: String,
    },
    /// Bound to a query-string parameter
    Query {
        /// Declared name; blank means "use the parameter's own name"
        name: String,
        required: bool,
        /// Raw default value, possibly padded with "no default" sentinel characters
        default_value: String,
    },
}

impl ParamBinding {
    pub fn path(name: impl Into<String>) -> Self {
        ParamBinding::Path { name: name.into() }
    }

    pub fn query(name: impl Into<String>, required: bool, default_value: impl Into<String>) -> Self {
        ParamBinding::Query {
            name: name.into(),
            required,
            default_value: default_value.into(),
        }
    }
}

/// Identity of the handler serving a route.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct HandlerRef {
    /// Owning group (controller, module, ...); used for exclusion
    #[serde(default)]
    pub group: String,
    /// Handler method name; used as the method id and doc title
    pub method: String,
}

impl HandlerRef {
    pub fn new(group: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            method: method.into(),
        }
    }
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.group.is_empty() {
            f.write_str(&self.method)
        } else {
            write!(f, "{}::{}", self.group, self.method)
        }
    }
}

/// Everything known about one path → handler binding.
///
/// `bindings`, `param_names` and `param_types` are parallel lists, one entry per handler
/// parameter. Mapping fails when their lengths disagree.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRecord {
    /// Path pattern, used verbatim as the resource path
    pub path: String,
    /// HTTP methods served, in declaration order
    pub methods: Vec<HttpMethod>,
    /// Consumable media types
    pub consumes: Vec<String>,
    /// Producible media types
    pub produces: Vec<String>,
    /// Binding of each handler parameter
    pub bindings: Vec<ParamBinding>,
    /// Discovered parameter names; blank when unavailable
    pub param_names: Vec<String>,
    /// Declared type of each parameter
    pub param_types: Vec<TypeRef>,
    /// Declared return type; `None` for handlers returning nothing
    pub returns: Option<TypeRef>,
    /// The handler serving the route
    pub handler: HandlerRef,
}

impl RouteRecord {
    /// Create a route with no methods, parameters or media types
    pub fn new(path: impl Into<String>, handler: HandlerRef) -> Self {
        Self {
            path: path.into(),
            methods: Vec::new(),
            consumes: Vec::new(),
            produces: Vec::new(),
            bindings: Vec::new(),
            param_names: Vec::new(),
            param_types: Vec::new(),
            returns: None,
            handler,
        }
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.methods.push(method);
        self
    }

    pub fn consuming(mut self, media_type: impl Into<String>) -> Self {
        self.consumes.push(media_type.into());
        self
    }

    pub fn producing(mut self, media_type: impl Into<String>) -> Self {
        self.produces.push(media_type.into());
        self
    }

    /// Append one parameter to all three parallel lists
    pub fn with_param(
        mut self,
        binding: ParamBinding,
        name: impl Into<String>,
        ty: impl Into<TypeRef>,
    ) -> Self {
        self.bindings.push(binding);
        self.param_names.push(name.into());
        self.param_types.push(ty.into());
        self
    }

    pub fn returning(mut self, ty: impl Into<TypeRef>) -> Self {
        self.returns = Some(ty.into());
        self
    }

    /// The return type, unless the handler returns nothing
    pub fn return_type(&self) -> Option<&TypeRef> {
        self.returns.as_ref().filter(|ty| !ty.is_void())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_method_parse_and_display() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!(" Delete ".parse::<HttpMethod>().unwrap(), HttpMethod::Delete);
        assert_eq!(HttpMethod::Options.to_string(), "OPTIONS");
        assert!("FETCH".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_route_builder_keeps_lists_parallel() {
        let route = RouteRecord::new("/users/{id}", HandlerRef::new("users", "get_user"))
            .with_method(HttpMethod::Get)
            .with_param(ParamBinding::path(""), "id", "Integer")
            .with_param(ParamBinding::None, "body", "User");

        assert_eq!(route.bindings.len(), 2);
        assert_eq!(route.param_names, vec!["id", "body"]);
        assert_eq!(route.param_types[1], TypeRef::new("User"));
    }

    #[test]
    fn test_void_return_type_is_absent() {
        let handler = HandlerRef::new("", "ping");
        assert!(RouteRecord::new("/ping", handler.clone()).return_type().is_none());
        assert!(RouteRecord::new("/ping", handler.clone())
            .returning("void")
            .return_type()
            .is_none());
        assert!(RouteRecord::new("/ping", handler)
            .returning("String")
            .return_type()
            .is_some());
    }

    #[test]
    fn test_handler_display() {
        assert_eq!(HandlerRef::new("users", "list").to_string(), "users::list");
        assert_eq!(HandlerRef::new("", "list").to_string(), "list");
    }
}
