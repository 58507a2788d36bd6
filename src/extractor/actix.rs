use super::{HandlerRef, HttpMethod, ParamBinding, RouteRecord, RouteSource, RouteTable};
use crate::error::Result;
use crate::source::{ProjectSources, CRATE_MODULE};
use crate::type_model::{TypeDescriptor, TypeModel, TypeRef, OBJECT};
use log::{debug, trace};
use syn::punctuated::Punctuated;
use syn::visit::Visit;
use syn::{
    Attribute, Expr, FnArg, GenericArgument, ImplItem, Lit, Pat, PathArguments, PathSegment,
    ReturnType, Token, Type, TypeParamBound,
};

const JSON: &str = "application/json";
const FORM: &str = "application/x-www-form-urlencoded";
const TEXT: &str = "text/plain";

/// Actix-Web route source
///
/// Finds handlers annotated with route macros (`#[get("/path")]`, `#[route("/path", method =
/// "GET")]`, ...) and the structs, enums and traits they refer to.
pub struct ActixExtractor {
    sources: ProjectSources,
}

impl ActixExtractor {
    pub fn new(sources: ProjectSources) -> Self {
        Self { sources }
    }

    /// Route records for every annotated handler, in file and declaration order
    pub fn extract_routes(&self) -> Vec<RouteRecord> {
        self.visit().routes
    }

    /// Descriptors for the types declared in the sources
    pub fn extract_types(&self) -> Vec<TypeDescriptor> {
        self.visit().type_descriptors()
    }

    fn visit(&self) -> ActixVisitor {
        let mut visitor = ActixVisitor::default();
        for file in &self.sources.files {
            visitor.modules = vec![file.module.clone()];
            visitor.visit_file(&file.syntax_tree);
        }
        visitor
    }
}

impl RouteSource for ActixExtractor {
    fn list_routes(&self) -> Result<RouteTable> {
        let visitor = self.visit();

        let mut types = TypeModel::builtin();
        types.extend(visitor.type_descriptors());

        debug!(
            "Extracted {} Actix-Web routes from {} files",
            visitor.routes.len(),
            self.sources.files.len()
        );
        Ok(RouteTable {
            routes: visitor.routes,
            types,
        })
    }
}

/// Path and methods declared by one route macro
struct RouteMacro {
    path: String,
    methods: Vec<HttpMethod>,
}

/// How one handler argument binds to the request
struct Argument {
    binding: ParamBinding,
    ty: TypeRef,
    consumes: Option<&'static str>,
}

/// Visitor collecting routes and type declarations
#[derive(Default)]
struct ActixVisitor {
    /// Module path of the item being visited, outermost first
    modules: Vec<String>,
    routes: Vec<RouteRecord>,
    declared: Vec<TypeDescriptor>,
    /// (implementing type, trait) pairs
    impls: Vec<(String, String)>,
    /// (newtype, deref target) pairs
    derefs: Vec<(String, TypeRef)>,
}

impl ActixVisitor {
    fn module(&self) -> String {
        match self.modules.split_first() {
            Some((root, rest)) if root == CRATE_MODULE && !rest.is_empty() => rest.join("::"),
            _ => self.modules.join("::"),
        }
    }

    fn route_record(&self, item_fn: &syn::ItemFn, route_macro: RouteMacro) -> RouteRecord {
        let handler = HandlerRef::new(self.module(), item_fn.sig.ident.to_string());
        let mut route = RouteRecord::new(route_macro.path, handler);
        route.methods = route_macro.methods;

        let segment = single_segment(&route.path);

        for input in &item_fn.sig.inputs {
            if let FnArg::Typed(pat_type) = input {
                let argument = classify_argument(&pat_type.ty, segment.as_deref());
                if let Some(media_type) = argument.consumes {
                    if !route.consumes.iter().any(|m| m == media_type) {
                        route.consumes.push(media_type.to_string());
                    }
                }
                route.bindings.push(argument.binding);
                route.param_names.push(pattern_name(&pat_type.pat));
                route.param_types.push(argument.ty);
            }
        }

        if let Some((returns, produces)) = classify_return(&item_fn.sig.output) {
            route.returns = Some(returns);
            if let Some(media_type) = produces {
                route.produces.push(media_type.to_string());
            }
        }

        route
    }

    /// One descriptor per type name; same-named declarations from different modules are merged
    /// so impls found for any of them stay attached.
    fn type_descriptors(&self) -> Vec<TypeDescriptor> {
        let mut declared: Vec<TypeDescriptor> = Vec::with_capacity(self.declared.len());
        for descriptor in &self.declared {
            match declared.iter_mut().find(|d| d.name == descriptor.name) {
                Some(existing) => merge_descriptor(existing, descriptor),
                None => declared.push(descriptor.clone()),
            }
        }

        for (ty, trait_name) in &self.impls {
            if let Some(descriptor) = declared.iter_mut().find(|d| &d.name == ty) {
                if !descriptor.interfaces.contains(trait_name) {
                    descriptor.interfaces.push(trait_name.clone());
                }
            }
        }
        for (ty, target) in &self.derefs {
            if let Some(descriptor) = declared.iter_mut().find(|d| &d.name == ty) {
                descriptor.supertype = Some(target.element().unwrap_or_else(|| target.clone()).to_string());
            }
        }

        declared
    }
}

fn merge_descriptor(into: &mut TypeDescriptor, other: &TypeDescriptor) {
    if into.supertype.is_none() {
        into.supertype = other.supertype.clone();
    }
    for interface in &other.interfaces {
        if !into.interfaces.contains(interface) {
            into.interfaces.push(interface.clone());
        }
    }
    for member in &other.nested {
        if !into.nested.contains(member) {
            into.nested.push(member.clone());
        }
    }
}

impl<'ast> Visit<'ast> for ActixVisitor {
    fn visit_item_fn(&mut self, node: &'ast syn::ItemFn) {
        for attr in &node.attrs {
            if let Some(route_macro) = parse_route_macro(attr) {
                let route = self.route_record(node, route_macro);
                debug!(
                    "Found route {} {:?} -> {}",
                    route.path, route.methods, route.handler
                );
                self.routes.push(route);
            }
        }
        syn::visit::visit_item_fn(self, node);
    }

    fn visit_item_mod(&mut self, node: &'ast syn::ItemMod) {
        self.modules.push(node.ident.to_string());
        syn::visit::visit_item_mod(self, node);
        self.modules.pop();
    }

    fn visit_item_struct(&mut self, node: &'ast syn::ItemStruct) {
        trace!("Found struct {}", node.ident);
        self.declared.push(TypeDescriptor::new(node.ident.to_string()));
        syn::visit::visit_item_struct(self, node);
    }

    fn visit_item_enum(&mut self, node: &'ast syn::ItemEnum) {
        trace!("Found enum {}", node.ident);
        self.declared.push(TypeDescriptor::new(node.ident.to_string()));
        syn::visit::visit_item_enum(self, node);
    }

    fn visit_item_trait(&mut self, node: &'ast syn::ItemTrait) {
        let mut descriptor = TypeDescriptor::new(node.ident.to_string());
        for bound in &node.supertraits {
            if let TypeParamBound::Trait(trait_bound) = bound {
                if let Some(segment) = trait_bound.path.segments.last() {
                    descriptor = descriptor.implements(segment.ident.to_string());
                }
            }
        }
        self.declared.push(descriptor);
        syn::visit::visit_item_trait(self, node);
    }

    fn visit_item_impl(&mut self, node: &'ast syn::ItemImpl) {
        let implementor = last_segment(&node.self_ty).map(|s| s.ident.to_string());
        let trait_name = node
            .trait_
            .as_ref()
            .and_then(|(_, path, _)| path.segments.last())
            .map(|s| s.ident.to_string());

        if let (Some(implementor), Some(trait_name)) = (implementor, trait_name) {
            if trait_name == "Deref" {
                for item in &node.items {
                    if let ImplItem::Type(assoc) = item {
                        if assoc.ident == "Target" {
                            self.derefs.push((implementor.clone(), rust_type(&assoc.ty)));
                        }
                    }
                }
            }
            self.impls.push((implementor, trait_name));
        }

        syn::visit::visit_item_impl(self, node);
    }
}

/// Parse `#[get("/path")]`, `#[actix_web::post("/path")]` or `#[route("/path", method = "GET")]`
fn parse_route_macro(attr: &Attribute) -> Option<RouteMacro> {
    let name = attr.path().segments.last()?.ident.to_string();
    let is_route = name == "route";
    let single = if is_route {
        None
    } else {
        Some(name.parse::<HttpMethod>().ok()?)
    };

    let args = attr
        .parse_args_with(Punctuated::<Expr, Token![,]>::parse_terminated)
        .ok()?;
    let mut args = args.into_iter();
    let path = string_literal(&args.next()?)?;

    let methods = match single {
        Some(method) => vec![method],
        None => args
            .filter_map(|arg| match arg {
                Expr::Assign(assign) if is_ident(&assign.left, "method") => {
                    string_literal(&assign.right)?.parse().ok()
                }
                _ => None,
            })
            .collect(),
    };

    Some(RouteMacro { path, methods })
}

fn string_literal(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(expr_lit) => match &expr_lit.lit {
            Lit::Str(lit_str) => Some(lit_str.value()),
            _ => None,
        },
        _ => None,
    }
}

fn is_ident(expr: &Expr, ident: &str) -> bool {
    matches!(expr, Expr::Path(p) if p.path.is_ident(ident))
}

/// Name of the only `{segment}` in `path`, if there is exactly one
fn single_segment(path: &str) -> Option<String> {
    let mut segments = path
        .split('/')
        .filter(|s| s.starts_with('{') && s.ends_with('}'))
        .map(|s| {
            let inner = &s[1..s.len() - 1];
            // `{id:\d+}` carries a pattern after the colon
            inner.split(':').next().unwrap_or(inner).trim().to_string()
        });

    match (segments.next(), segments.next()) {
        (Some(name), None) => Some(name),
        _ => None,
    }
}

fn pattern_name(pat: &Pat) -> String {
    match pat {
        Pat::Ident(pat_ident) => pat_ident.ident.to_string(),
        Pat::TupleStruct(tuple) if tuple.elems.len() == 1 => match tuple.elems.first() {
            Some(Pat::Ident(pat_ident)) => pat_ident.ident.to_string(),
            _ => String::new(),
        },
        _ => String::new(),
    }
}

fn classify_argument(ty: &Type, segment: Option<&str>) -> Argument {
    let (ty, optional) = peel_option(ty);

    let extractor = last_segment(ty).and_then(|s| Some((s.ident.to_string(), first_generic(s)?)));

    match extractor {
        Some((name, inner)) if name == "Path" => Argument {
            binding: ParamBinding::path(segment.unwrap_or_default()),
            ty: rust_type(inner),
            consumes: None,
        },
        Some((name, inner)) if name == "Query" => {
            let required = !optional && !peel_option(inner).1;
            Argument {
                binding: ParamBinding::query("", required, ""),
                ty: rust_type(inner),
                consumes: None,
            }
        }
        Some((name, inner)) if name == "Json" => Argument {
            binding: ParamBinding::None,
            ty: rust_type(inner),
            consumes: Some(JSON),
        },
        Some((name, inner)) if name == "Form" => Argument {
            binding: ParamBinding::None,
            ty: rust_type(inner),
            consumes: Some(FORM),
        },
        _ => Argument {
            binding: ParamBinding::None,
            ty: rust_type(ty),
            consumes: None,
        },
    }
}

/// Return type of a handler and the media type it implies; `None` for handlers returning nothing
fn classify_return(output: &ReturnType) -> Option<(TypeRef, Option<&'static str>)> {
    match output {
        ReturnType::Default => None,
        ReturnType::Type(_, ty) => return_type(ty),
    }
}

fn return_type(ty: &Type) -> Option<(TypeRef, Option<&'static str>)> {
    match ty {
        Type::Tuple(tuple) if tuple.elems.is_empty() => None,
        Type::Reference(reference) => return_type(&reference.elem),
        Type::Paren(paren) => return_type(&paren.elem),
        Type::ImplTrait(_) => Some((TypeRef::new(OBJECT), None)),
        Type::Path(_) => {
            let segment = last_segment(ty)?;
            match (segment.ident.to_string().as_str(), first_generic(segment)) {
                ("Result", Some(inner)) => return_type(inner),
                ("Json", Some(inner)) => Some((rust_type(inner), Some(JSON))),
                ("String" | "str", _) => Some((TypeRef::new("String"), Some(TEXT))),
                _ => Some((rust_type(ty), None)),
            }
        }
        _ => Some((rust_type(ty), None)),
    }
}

fn peel_option(ty: &Type) -> (&Type, bool) {
    match last_segment(ty) {
        Some(segment) if segment.ident == "Option" => match first_generic(segment) {
            Some(inner) => (inner, true),
            None => (ty, false),
        },
        _ => (ty, false),
    }
}

fn last_segment(ty: &Type) -> Option<&PathSegment> {
    match ty {
        Type::Path(type_path) => type_path.path.segments.last(),
        _ => None,
    }
}

fn first_generic(segment: &PathSegment) -> Option<&Type> {
    match &segment.arguments {
        PathArguments::AngleBracketed(args) => args.args.iter().find_map(|arg| match arg {
            GenericArgument::Type(ty) => Some(ty),
            _ => None,
        }),
        _ => None,
    }
}

/// Translate a Rust type into the name the type model knows it by
pub fn rust_type(ty: &Type) -> TypeRef {
    match ty {
        Type::Path(_) => match last_segment(ty) {
            Some(segment) => segment_type(segment),
            None => TypeRef::new(OBJECT),
        },
        Type::Reference(reference) => rust_type(&reference.elem),
        Type::Paren(paren) => rust_type(&paren.elem),
        Type::Group(group) => rust_type(&group.elem),
        Type::Slice(slice) => TypeRef::array(rust_type(&slice.elem)),
        Type::Array(array) => TypeRef::array(rust_type(&array.elem)),
        _ => TypeRef::new(OBJECT),
    }
}

fn segment_type(segment: &PathSegment) -> TypeRef {
    let name = segment.ident.to_string();
    let model_name = match name.as_str() {
        "String" | "str" | "char" => "String",
        "i8" => "Byte",
        "i16" | "u8" => "Short",
        "i32" | "u16" => "Integer",
        "i64" | "u32" | "isize" | "usize" => "Long",
        "i128" | "u64" | "u128" | "BigInt" | "BigUint" => "BigInteger",
        "f32" => "Float",
        "f64" => "Double",
        "bool" => "Boolean",
        "Decimal" | "BigDecimal" => "BigDecimal",
        "Vec" | "VecDeque" | "LinkedList" => "List",
        "HashSet" | "BTreeSet" | "IndexSet" => "Set",
        "HashMap" | "BTreeMap" | "IndexMap" => "Map",
        "DateTime" | "NaiveDate" | "NaiveDateTime" | "SystemTime" | "OffsetDateTime" => "Date",
        "Duration" => "Duration",
        // Wrappers and extractors describe their contents
        "Option" | "Box" | "Rc" | "Arc" | "Cow" | "Path" | "Query" | "Json" | "Form" | "Data" => {
            return first_generic(segment)
                .map(rust_type)
                .unwrap_or_else(|| TypeRef::new(OBJECT));
        }
        other => other,
    };
    TypeRef::new(model_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceFile;
    use std::path::PathBuf;

    fn extractor(module: &str, code: &str) -> ActixExtractor {
        let file = SourceFile::parse(PathBuf::from("test.rs"), module, code).unwrap();
        ActixExtractor::new(ProjectSources::from_files(vec![file]))
    }

    fn single_route(code: &str) -> RouteRecord {
        let mut routes = extractor("handlers", code).extract_routes();
        assert_eq!(routes.len(), 1, "expected exactly one route");
        routes.remove(0)
    }

    #[test]
    fn test_simple_get_route() {
        let route = single_route(
            r#"
            #[get("/health")]
            async fn health() -> &'static str { "OK" }
            "#,
        );
        assert_eq!(route.path, "/health");
        assert_eq!(route.methods, vec![HttpMethod::Get]);
        assert_eq!(route.handler, HandlerRef::new("handlers", "health"));
        assert_eq!(route.returns, Some(TypeRef::new("String")));
        assert_eq!(route.produces, vec![TEXT]);
        assert!(route.bindings.is_empty());
    }

    #[test]
    fn test_qualified_macro_and_path_param() {
        let route = single_route(
            r#"
            #[actix_web::get("/users/{id}")]
            async fn get_user(path: web::Path<u32>) -> Json<User> { todo!() }
            "#,
        );
        assert_eq!(route.bindings, vec![ParamBinding::path("id")]);
        assert_eq!(route.param_names, vec!["path"]);
        assert_eq!(route.param_types, vec![TypeRef::new("Long")]);
        assert_eq!(route.returns, Some(TypeRef::new("User")));
        assert_eq!(route.produces, vec![JSON]);
    }

    #[test]
    fn test_destructured_path_with_several_segments() {
        let route = single_route(
            r#"
            #[get("/users/{user_id}/posts/{post_id}")]
            async fn get_post(web::Path((user_id, post_id)): web::Path<(u32, u32)>) -> HttpResponse { todo!() }
            "#,
        );
        assert_eq!(route.bindings, vec![ParamBinding::path("")]);
        assert_eq!(route.param_names, vec![""]);
        assert_eq!(route.param_types, vec![TypeRef::new(OBJECT)]);
        assert_eq!(route.returns, Some(TypeRef::new("HttpResponse")));
        assert!(route.produces.is_empty());
    }

    #[test]
    fn test_query_and_body_arguments() {
        let route = single_route(
            r#"
            #[post("/users")]
            async fn create_user(
                payload: web::Json<CreateUser>,
                dry_run: web::Query<Option<bool>>,
                state: web::Data<AppState>,
            ) -> impl Responder { todo!() }
            "#,
        );
        assert_eq!(
            route.bindings,
            vec![
                ParamBinding::None,
                ParamBinding::query("", false, ""),
                ParamBinding::None,
            ]
        );
        assert_eq!(route.param_names, vec!["payload", "dry_run", "state"]);
        assert_eq!(
            route.param_types,
            vec![
                TypeRef::new("CreateUser"),
                TypeRef::new("Boolean"),
                TypeRef::new("AppState"),
            ]
        );
        assert_eq!(route.consumes, vec![JSON]);
        assert_eq!(route.returns, Some(TypeRef::new(OBJECT)));
    }

    #[test]
    fn test_required_query() {
        let route = single_route(
            r#"
            #[get("/search")]
            async fn search(q: web::Query<String>, page: Option<web::Query<i32>>) -> Json<Vec<Hit>> { todo!() }
            "#,
        );
        assert_eq!(
            route.bindings,
            vec![ParamBinding::query("", true, ""), ParamBinding::query("", false, "")]
        );
        assert_eq!(route.param_types, vec![TypeRef::new("String"), TypeRef::new("Integer")]);
        assert_eq!(route.returns, Some(TypeRef::new("List")));
    }

    #[test]
    fn test_route_macro_with_several_methods() {
        let route = single_route(
            r#"
            #[route("/items", method = "GET", method = "HEAD", wrap = "Logger::default()")]
            async fn items() -> Result<Json<Vec<Item>>, Error> { todo!() }
            "#,
        );
        assert_eq!(route.methods, vec![HttpMethod::Get, HttpMethod::Head]);
        assert_eq!(route.returns, Some(TypeRef::new("List")));
    }

    #[test]
    fn test_route_macro_without_methods() {
        let route = single_route(
            r#"
            #[route("/any")]
            async fn any() {}
            "#,
        );
        assert!(route.methods.is_empty());
        assert!(route.returns.is_none());
    }

    #[test]
    fn test_void_returns() {
        let routes = extractor(
            "m",
            r#"
            #[delete("/a")]
            async fn a() -> () {}
            #[delete("/b")]
            async fn b() -> Result<(), Error> { Ok(()) }
            "#,
        )
        .extract_routes();
        assert!(routes.iter().all(|r| r.returns.is_none()));
    }

    #[test]
    fn test_non_route_attributes_are_ignored() {
        let routes = extractor(
            "m",
            r#"
            #[test]
            fn not_a_route() {}
            #[tracing::instrument]
            async fn traced() {}
            #[get]
            async fn missing_path() {}
            "#,
        )
        .extract_routes();
        assert!(routes.is_empty());
    }

    #[test]
    fn test_inline_modules_extend_group() {
        let routes = extractor(
            CRATE_MODULE,
            r#"
            #[get("/root")]
            async fn root() {}
            mod admin {
                #[get("/admin")]
                async fn panel() {}
            }
            "#,
        )
        .extract_routes();
        assert_eq!(routes[0].handler.group, "crate");
        assert_eq!(routes[1].handler.group, "admin");
    }

    #[test]
    fn test_same_named_declarations_keep_impls() {
        use crate::type_resolver::{TypeMapper, TypeResolver};

        let items = SourceFile::parse(
            PathBuf::from("src/items.rs"),
            "items",
            r#"
            pub struct Items(Vec<u8>);
            impl Deref for Items { type Target = Vec<u8>; fn deref(&self) -> &Self::Target { &self.0 } }
            #[get("/items")]
            async fn items() -> Json<Items> { todo!() }
            "#,
        )
        .unwrap();
        let other = SourceFile::parse(
            PathBuf::from("src/other.rs"),
            "other",
            "#[cfg(test)] mod tests { struct Items; }",
        )
        .unwrap();

        let extractor = ActixExtractor::new(ProjectSources::from_files(vec![items, other]));
        let types = extractor.extract_types();
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].supertype.as_deref(), Some("List"));

        let table = extractor.list_routes().unwrap();
        let resolved = TypeResolver::json()
            .resolve(&TypeRef::new("Items"), &table.types)
            .map(|t| t.to_string());
        assert_eq!(resolved.as_deref(), Some("wadl:array"));
    }

    #[test]
    fn test_type_declarations() {
        let types = extractor(
            "models",
            r#"
            pub struct User { id: u32 }
            pub struct UserList(Vec<User>);
            pub enum Role { Admin, Member }
            pub trait Entity: Display {}
            impl Entity for User {}
            impl Deref for UserList { type Target = Vec<User>; fn deref(&self) -> &Self::Target { &self.0 } }
            impl Display for Missing {}
            "#,
        )
        .extract_types();

        let names: Vec<_> = types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["User", "UserList", "Role", "Entity"]);
        assert_eq!(types[0].interfaces, vec!["Entity"]);
        assert_eq!(types[1].supertype.as_deref(), Some("List"));
        assert_eq!(types[3].interfaces, vec!["Display"]);
    }

    #[test]
    fn test_rust_type_mapping() {
        let cases = [
            ("i32", "Integer"),
            ("u64", "BigInteger"),
            ("f64", "Double"),
            ("bool", "Boolean"),
            ("&str", "String"),
            ("Option<i64>", "Long"),
            ("Arc<String>", "String"),
            ("Vec<User>", "List"),
            ("HashMap<String, u8>", "Map"),
            ("BTreeSet<u8>", "Set"),
            ("[u8]", "Short[]"),
            ("chrono::DateTime<Utc>", "Date"),
            ("std::time::Duration", "Duration"),
            ("(u8, u8)", "Object"),
            ("User", "User"),
        ];
        for (source, expected) in cases {
            let ty: Type = syn::parse_str(source).unwrap();
            assert_eq!(rust_type(&ty).name(), expected, "for {}", source);
        }
    }

    #[test]
    fn test_single_segment() {
        assert_eq!(single_segment("/users/{id}"), Some("id".to_string()));
        assert_eq!(single_segment("/users/{id:\\d+}"), Some("id".to_string()));
        assert_eq!(single_segment("/users/{a}/{b}"), None);
        assert_eq!(single_segment("/users"), None);
    }

    #[test]
    fn test_list_routes_includes_declared_types() {
        let table = extractor(
            "users",
            r#"
            pub struct User { id: u32 }
            #[get("/users")]
            async fn list() -> Json<Vec<User>> { todo!() }
            "#,
        )
        .list_routes()
        .unwrap();
        assert_eq!(table.routes.len(), 1);
        assert!(table.types.contains("User"));
        assert!(table.types.contains(OBJECT));
    }
}
