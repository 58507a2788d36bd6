//! Route tables declared in YAML or JSON manifest files.
//!
//! ```yaml
//! title: Pet Store
//! base_url: http://localhost:8080/store
//! exclude: [internal]
//! types:
//!   - name: PetList
//!     interfaces: [List]
//! routes:
//!   - path: /pets/{id}
//!     methods: [GET]
//!     produces: [application/json]
//!     handler: { group: pets, method: getPet }
//!     parameters:
//!       - { binding: path, type: Long }
//!       - { binding: query, name: verbose, required: false, default: "false", type: Boolean }
//!     parameter_names: [id, verbose]
//!     returns: Pet
//! ```

use super::{HandlerRef, HttpMethod, ParamBinding, RouteRecord, RouteSource, RouteTable};
use crate::error::{Error, Result};
use crate::type_model::{TypeDescriptor, TypeModel, TypeRef};
use log::{debug, info};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Route source backed by a manifest file
pub struct ManifestSource {
    path: PathBuf,
}

/// Parsed manifest file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    /// Default application title
    #[serde(default)]
    pub title: Option<String>,
    /// Default base URL
    #[serde(default)]
    pub base_url: Option<String>,
    /// Handler groups excluded by default
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Type descriptors added to the builtin type model
    #[serde(default)]
    pub types: Vec<TypeDescriptor>,
    #[serde(default)]
    pub routes: Vec<RouteSpec>,
}

/// One route as written in a manifest
#[derive(Debug, Clone, Deserialize)]
pub struct RouteSpec {
    pub path: String,
    #[serde(default)]
    pub methods: Vec<HttpMethod>,
    #[serde(default)]
    pub consumes: Vec<String>,
    #[serde(default)]
    pub produces: Vec<String>,
    pub handler: HandlerRef,
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
    /// Discovered parameter names; blanks are assumed when omitted
    #[serde(default)]
    pub parameter_names: Option<Vec<String>>,
    /// Return type; omitted or `void` for handlers returning nothing
    #[serde(default)]
    pub returns: Option<TypeRef>,
}

/// One handler parameter as written in a manifest
#[derive(Debug, Clone, Deserialize)]
pub struct ParameterSpec {
    #[serde(default)]
    pub binding: BindingKind,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default)]
    pub default: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
}

fn default_required() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingKind {
    #[default]
    None,
    Path,
    Query,
}

impl ParameterSpec {
    fn binding(&self) -> ParamBinding {
        match self.binding {
            BindingKind::None => ParamBinding::None,
            BindingKind::Path => ParamBinding::path(self.name.clone()),
            BindingKind::Query => {
                ParamBinding::query(self.name.clone(), self.required, self.default.clone())
            }
        }
    }
}

impl RouteSpec {
    fn into_record(self) -> RouteRecord {
        let names = self
            .parameter_names
            .unwrap_or_else(|| vec![String::new(); self.parameters.len()]);

        RouteRecord {
            path: self.path,
            methods: self.methods,
            consumes: self.consumes,
            produces: self.produces,
            bindings: self.parameters.iter().map(ParameterSpec::binding).collect(),
            param_names: names,
            param_types: self.parameters.into_iter().map(|p| p.ty).collect(),
            returns: self.returns,
            handler: self.handler,
        }
    }
}

impl Manifest {
    /// Parse a manifest; JSON when `json` is set, YAML otherwise
    pub fn parse(content: &str, json: bool) -> std::result::Result<Self, String> {
        if json {
            serde_json::from_str(content).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str(content).map_err(|e| e.to_string())
        }
    }

    /// Convert into a route table, extending the builtin type model with the declared types
    pub fn into_route_table(self) -> RouteTable {
        let mut types = TypeModel::builtin();
        types.extend(self.types);

        RouteTable {
            routes: self.routes.into_iter().map(RouteSpec::into_record).collect(),
            types,
        }
    }
}

impl ManifestSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Whether `path` looks like a manifest file
    pub fn is_manifest(path: &Path) -> bool {
        path.is_file()
            && matches!(
                path.extension().and_then(|s| s.to_str()),
                Some("yaml" | "yml" | "json")
            )
    }

    /// Read and parse the manifest file
    pub fn load(&self) -> Result<Manifest> {
        debug!("Loading route manifest: {}", self.path.display());

        let content = fs::read_to_string(&self.path).map_err(|e| Error::ManifestError {
            file: self.path.clone(),
            message: e.to_string(),
        })?;
        let json = self.path.extension().and_then(|s| s.to_str()) == Some("json");

        let manifest = Manifest::parse(&content, json).map_err(|message| Error::ManifestError {
            file: self.path.clone(),
            message,
        })?;

        info!(
            "Loaded {} routes and {} types from {}",
            manifest.routes.len(),
            manifest.types.len(),
            self.path.display()
        );
        Ok(manifest)
    }
}

impl RouteSource for ManifestSource {
    fn list_routes(&self) -> Result<RouteTable> {
        Ok(self.load()?.into_route_table())
    }
}
