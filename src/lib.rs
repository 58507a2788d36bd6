//! WADL generator - application description documents from web route tables.
//!
//! This library builds a WADL-style document (application → resources → resource → method →
//! request/response → representation) from a table of routes, resolving the declared types of
//! parameters and return values into semantic type tags through an ordered binding table.
//!
//! # Route sources
//!
//! - **Rust projects**: Actix-Web handlers annotated with `#[get]`, `#[post]`, `#[route]`, ...
//! - **Route manifests**: routes and types declared in a YAML or JSON file
//!
//! # Architecture
//!
//! 1. [`source`] - Walks a project directory and parses its Rust files
//! 2. [`extractor`] - Route sources producing a [`extractor::RouteTable`]
//! 3. [`type_model`] - Declared types and their supertypes, interfaces and nested members
//! 4. [`bindings`] - Ordered type binding tables and type tags
//! 5. [`type_resolver`] - Resolves declared types to tags through a binding table
//! 6. [`route_mapper`] - Maps one route record to a resource
//! 7. [`wadl_builder`] - Assembles the application document
//! 8. [`serializer`] - Serializes the document to YAML or JSON
//!
//! # Example Usage
//!
//! ```no_run
//! use wadl_from_source::{
//!     extractor::{manifest::ManifestSource, RouteSource},
//!     serializer::serialize_yaml,
//!     type_resolver::TypeResolver,
//!     wadl_builder::{GenerateOptions, WadlGenerator},
//! };
//! use std::path::PathBuf;
//!
//! let table = ManifestSource::new(PathBuf::from("routes.yaml")).list_routes().unwrap();
//!
//! let generator = WadlGenerator::new(Box::new(TypeResolver::xsd()));
//! let options = GenerateOptions::new("Pet Store", "http://localhost:8080/store");
//! let document = generator.generate(&table, &options).unwrap();
//!
//! println!("{}", serialize_yaml(&document).unwrap());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod bindings;
pub mod cli;
pub mod error;
pub mod extractor;
pub mod route_mapper;
pub mod serializer;
pub mod source;
pub mod type_model;
pub mod type_resolver;
pub mod wadl_builder;
