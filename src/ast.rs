//! Object model for a parsed WADL document.
//!
//! Only the parts of WADL the client builder consumes are modeled:
//! the resource hierarchy, methods with their requests and responses,
//! parameters, representations, and documentation text.

pub type Id = String;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ParamStyle {
    Plain,
    Matrix,
    Query,
    Header,
    Template,
}

/// A WADL application.
#[derive(Debug, Default)]
pub struct Application {
    /// Resource groups defined at the application level.
    pub resources: Vec<Resources>,

    /// Documentation for the application.
    pub docs: Vec<Doc>,
}

impl Application {
    /// All top-level resources across every group, in document order.
    pub fn iter_resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter().flat_map(|rs| rs.resources.iter())
    }
}

impl std::str::FromStr for Application {
    type Err = crate::parse::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parse::parse_string(s)
    }
}

/// A `<resources>` group.
#[derive(Debug, Default)]
pub struct Resources {
    /// The base URL for the resources.
    pub base: Option<String>,

    /// The resources defined at this level.
    pub resources: Vec<Resource>,
}

#[derive(Debug, Clone, Default)]
pub struct Resource {
    /// The ID of the resource.
    pub id: Option<Id>,

    /// The path template of the resource, possibly with `{name}` placeholders.
    pub path: Option<String>,

    /// The methods defined at this level.
    pub methods: Vec<Method>,

    /// The docs for the resource.
    pub docs: Vec<Doc>,

    /// Sub-resources of this resource.
    pub subresources: Vec<Resource>,

    /// The params declared for this resource.
    pub params: Vec<Param>,
}

impl Resource {
    pub fn get_param(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Method {
    /// The WADL method id, e.g. "getProject".
    pub id: Id,

    /// The REST verb name, e.g. "GET".
    pub name: String,

    pub docs: Vec<Doc>,

    pub request: Request,

    pub responses: Vec<Response>,
}

impl Method {
    /// First documentation entry, flattened to plain text.
    pub fn doc_text(&self) -> String {
        self.docs
            .first()
            .map(|d| d.content.trim().to_string())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Doc {
    /// The title of the documentation.
    pub title: Option<String>,

    /// The language of the documentation.
    pub lang: Option<String>,

    /// The content of the documentation.
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub style: ParamStyle,
    pub name: String,
    pub required: bool,
    pub doc: Option<Doc>,
}

impl Param {
    /// A parameter synthesized from a `{name}` placeholder with no
    /// matching `<param>` declaration.
    pub fn template(name: &str) -> Self {
        Param {
            style: ParamStyle::Template,
            name: name.to_string(),
            required: true,
            doc: None,
        }
    }

    pub fn doc_text(&self) -> String {
        self.doc
            .as_ref()
            .map(|d| d.content.trim().to_string())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct Representation {
    pub media_type: Option<mime::Mime>,
    pub element: Option<String>,
    pub docs: Vec<Doc>,
}

#[derive(Debug, Default, Clone)]
pub struct Request {
    pub docs: Vec<Doc>,
    pub params: Vec<Param>,
    pub representations: Vec<Representation>,
}

#[derive(Debug, Clone)]
pub struct Response {
    pub docs: Vec<Doc>,
    pub status: Option<i32>,
    pub representations: Vec<Representation>,
}
