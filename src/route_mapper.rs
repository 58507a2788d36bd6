use crate::error::{Error, MetadataKind, Result};
use crate::extractor::{HttpMethod, ParamBinding, RouteRecord};
use crate::type_model::TypeModel;
use crate::type_resolver::TypeMapper;
use crate::wadl_builder::{Doc, Method, Param, ParamStyle, Representation, Request, Resource, Response};
use log::{debug, trace};

/// Name used for a parameter when neither a declared nor a discovered name is available
pub const FALLBACK_PARAM_NAME: &str = "param";

/// Private-use characters the binding layer pads "no default" values with
const NO_DEFAULT_SENTINELS: [char; 3] = ['\u{E000}', '\u{E001}', '\u{E002}'];

/// Maps one route record onto a WADL resource
pub struct RouteMapper<'a> {
    types: &'a dyn TypeMapper,
    model: &'a TypeModel,
}

impl<'a> RouteMapper<'a> {
    pub fn new(types: &'a dyn TypeMapper, model: &'a TypeModel) -> Self {
        Self { types, model }
    }

    /// Build the resource for `route`: one method per HTTP method, all sharing the same
    /// request and response description.
    pub fn map_route(&self, route: &RouteRecord) -> Result<Resource> {
        debug!("Mapping route {} -> {}", route.path, route.handler);

        let request = self.map_request(route)?;
        let response = self.map_response(route);

        let methods = route
            .methods
            .iter()
            .map(|method| self.map_method(*method, route, &request, &response))
            .collect();

        Ok(Resource {
            path: route.path.clone(),
            methods,
        })
    }

    fn map_method(
        &self,
        method: HttpMethod,
        route: &RouteRecord,
        request: &Option<Request>,
        response: &Option<Response>,
    ) -> Method {
        trace!("Mapping {} {}", method, route.path);
        Method {
            name: method.as_str().to_string(),
            id: route.handler.method.clone(),
            doc: Doc::new(route.handler.method.clone()),
            request: request.clone(),
            responses: response.iter().cloned().collect(),
        }
    }

    /// No mappable parameters means no request at all, even if the route consumes media types.
    fn map_request(&self, route: &RouteRecord) -> Result<Option<Request>> {
        let params = self.map_params(route)?;
        if params.is_empty() {
            return Ok(None);
        }

        let representations = route
            .consumes
            .iter()
            .map(|media_type| Representation {
                media_type: media_type.clone(),
                element: None,
            })
            .collect();

        Ok(Some(Request {
            params,
            representations,
        }))
    }

    fn map_response(&self, route: &RouteRecord) -> Option<Response> {
        let return_type = route.return_type()?;

        if route.produces.is_empty() {
            return Some(Response::default());
        }

        let element = self.types.resolve(return_type, self.model);
        let representations = route
            .produces
            .iter()
            .map(|media_type| Representation {
                media_type: media_type.clone(),
                element: element.clone(),
            })
            .collect();

        Some(Response { representations })
    }

    fn map_params(&self, route: &RouteRecord) -> Result<Vec<Param>> {
        check_parallel(route)?;

        let mut params = Vec::new();
        let slots = route
            .bindings
            .iter()
            .zip(&route.param_names)
            .zip(&route.param_types);

        for ((binding, discovered), ty) in slots {
            let param = match binding {
                ParamBinding::None => continue,
                ParamBinding::Path { name } => Param {
                    name: param_name(name, discovered),
                    param_type: self.types.resolve(ty, self.model),
                    style: ParamStyle::Template,
                    required: true,
                    default: None,
                },
                ParamBinding::Query {
                    name,
                    required,
                    default_value,
                } => {
                    let default = clean_default(default_value);
                    Param {
                        name: param_name(name, discovered),
                        param_type: self.types.resolve(ty, self.model),
                        style: ParamStyle::Query,
                        required: *required,
                        default: (!default.is_empty()).then_some(default),
                    }
                }
            };
            trace!("Mapped parameter {} ({:?})", param.name, param.style);
            params.push(param);
        }

        Ok(params)
    }
}

fn check_parallel(route: &RouteRecord) -> Result<()> {
    let expected = route.bindings.len();
    let mismatch = if route.param_names.len() != expected {
        Some((MetadataKind::Names, route.param_names.len()))
    } else if route.param_types.len() != expected {
        Some((MetadataKind::Types, route.param_types.len()))
    } else {
        None
    };

    match mismatch {
        Some((kind, actual)) => Err(Error::ParameterMetadataMismatch {
            handler: route.handler.to_string(),
            kind,
            expected,
            actual,
        }),
        None => Ok(()),
    }
}

/// Declared name wins over the discovered one; both blank falls back to [`FALLBACK_PARAM_NAME`].
pub fn param_name(declared: &str, discovered: &str) -> String {
    if !is_blank(declared) {
        declared.to_string()
    } else if !is_blank(discovered) {
        discovered.to_string()
    } else {
        FALLBACK_PARAM_NAME.to_string()
    }
}

/// Remove all whitespace and "no default" sentinels from a raw default value.
pub fn clean_default(raw: &str) -> String {
    raw.chars()
        .filter(|c| !is_separator(*c) && !NO_DEFAULT_SENTINELS.contains(c))
        .collect()
}

fn is_blank(s: &str) -> bool {
    s.chars().all(is_separator)
}

/// Whitespace in the sense of the route tables' binding layer: ASCII controls `\t`..`\r` and
/// `\u{1C}`..`\u{1F}`, plus Unicode space, line and paragraph separators other than the
/// non-breaking ones (U+00A0, U+2007, U+202F). U+0085 is a control, not a separator.
fn is_separator(c: char) -> bool {
    match c {
        '\t' | '\n' | '\u{B}' | '\u{C}' | '\r' | '\u{1C}'..='\u{1F}' => true,
        '\u{85}' | '\u{A0}' | '\u{2007}' | '\u{202F}' => false,
        other => other.is_whitespace(),
    }
}
