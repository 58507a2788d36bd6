use crate::bindings::{Namespace, TypeTag};
use crate::error::Result;
use crate::extractor::RouteTable;
use crate::route_mapper::RouteMapper;
use crate::type_resolver::{TypeMapper, TypeResolver};
use log::{debug, info};
use serde::Serialize;
use std::collections::HashSet;

/// WADL document generator
///
/// Holds the type mapper for its whole lifetime; every call to [`WadlGenerator::generate`]
/// builds a fresh, independent [`Application`].
pub struct WadlGenerator {
    types: Box<dyn TypeMapper>,
}

/// Per-document settings
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Application title
    pub title: String,
    /// Base URL all resource paths are relative to
    pub base_url: String,
    /// Handler groups whose routes are left out of the document
    pub excluded_groups: HashSet<String>,
}

impl GenerateOptions {
    pub fn new(title: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            base_url: base_url.into(),
            excluded_groups: HashSet::new(),
        }
    }

    pub fn exclude(mut self, group: impl Into<String>) -> Self {
        self.excluded_groups.insert(group.into());
        self
    }
}

/// WADL `application` element
#[derive(Debug, Clone, Serialize)]
pub struct Application {
    pub doc: Doc,
    /// Namespaces the type tags in this document refer to
    pub namespaces: Vec<Namespace>,
    pub resources: Resources,
}

/// WADL `doc` element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Doc {
    pub title: String,
}

impl Doc {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

/// WADL `resources` element
#[derive(Debug, Clone, Serialize)]
pub struct Resources {
    pub base: String,
    #[serde(rename = "resource")]
    pub resources: Vec<Resource>,
}

/// WADL `resource` element - one per route record
#[derive(Debug, Clone, Serialize)]
pub struct Resource {
    pub path: String,
    #[serde(rename = "method", skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<Method>,
}

/// WADL `method` element
#[derive(Debug, Clone, Serialize)]
pub struct Method {
    /// HTTP method name
    pub name: String,
    /// Handler method name
    pub id: String,
    pub doc: Doc,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<Request>,
    #[serde(rename = "response", skip_serializing_if = "Vec::is_empty")]
    pub responses: Vec<Response>,
}

/// WADL `request` element; never empty when present
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    #[serde(rename = "param")]
    pub params: Vec<Param>,
    #[serde(rename = "representation", skip_serializing_if = "Vec::is_empty")]
    pub representations: Vec<Representation>,
}

/// WADL `response` element
#[derive(Debug, Clone, Default, Serialize)]
pub struct Response {
    #[serde(rename = "representation", skip_serializing_if = "Vec::is_empty")]
    pub representations: Vec<Representation>,
}

/// WADL `param` element
#[derive(Debug, Clone, Serialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub param_type: Option<TypeTag>,
    pub style: ParamStyle,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

/// WADL param styles produced by the mapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamStyle {
    /// Path template segment
    Template,
    /// Query-string parameter
    Query,
}

/// WADL `representation` element
#[derive(Debug, Clone, Serialize)]
pub struct Representation {
    #[serde(rename = "mediaType")]
    pub media_type: String,
    /// Type of the returned value; only set on response representations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<TypeTag>,
}

impl WadlGenerator {
    /// Create a generator using the given type mapper
    pub fn new(types: Box<dyn TypeMapper>) -> Self {
        debug!("Initializing WadlGenerator");
        Self { types }
    }

    /// Build the application document for `table`.
    ///
    /// Routes are emitted in table order, one resource per route record; records sharing a path
    /// are not merged. Routes of excluded groups are skipped. A route whose parameter metadata is
    /// inconsistent aborts generation.
    pub fn generate(&self, table: &RouteTable, options: &GenerateOptions) -> Result<Application> {
        let mapper = RouteMapper::new(self.types.as_ref(), &table.types);
        let mut resources = Vec::with_capacity(table.routes.len());

        for route in &table.routes {
            if options.excluded_groups.contains(&route.handler.group) {
                debug!("Ignoring route {} of excluded group: {}", route.path, route.handler.group);
                continue;
            }
            resources.push(mapper.map_route(route)?);
        }

        info!(
            "Generated {} resources from {} routes",
            resources.len(),
            table.routes.len()
        );

        Ok(Application {
            doc: Doc::new(options.title.clone()),
            namespaces: self.namespaces(),
            resources: Resources {
                base: options.base_url.clone(),
                resources,
            },
        })
    }

    fn namespaces(&self) -> Vec<Namespace> {
        let mut namespaces = vec![Namespace::wadl()];
        let own = self.types.namespace();
        if !namespaces.contains(own) {
            namespaces.push(own.clone());
        }
        namespaces
    }
}

impl Default for WadlGenerator {
    fn default() -> Self {
        Self::new(Box::new(TypeResolver::json()))
    }
}

/// Format `scheme://host:port` followed by the context path.
pub fn base_url(scheme: &str, host: &str, port: u16, context_path: &str) -> String {
    format!("{}://{}:{}{}", scheme, host, port, context_path)
}
