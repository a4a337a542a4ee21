use crate::ast::*;
use std::io::Read;
use xmltree::Element;

#[allow(unused)]
pub const WADL_NS: &str = "http://wadl.dev.java.net/2009/02";

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Xml(xmltree::ParseError),
    Mime(mime::FromStrError),
    MissingAttribute { element: String, attribute: String },
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<xmltree::ParseError> for Error {
    fn from(e: xmltree::ParseError) -> Self {
        Error::Xml(e)
    }
}

impl From<mime::FromStrError> for Error {
    fn from(e: mime::FromStrError) -> Self {
        Error::Mime(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self {
            Error::Io(e) => write!(f, "IO error: {}", e),
            Error::Xml(e) => write!(f, "XML error: {}", e),
            Error::Mime(e) => write!(f, "MIME error: {}", e),
            Error::MissingAttribute { element, attribute } => {
                write!(f, "Missing attribute {} on <{}>", attribute, element)
            }
        }
    }
}

impl std::error::Error for Error {}

fn required_attr(element: &Element, name: &str) -> Result<String, Error> {
    element
        .attributes
        .get(name)
        .cloned()
        .ok_or_else(|| Error::MissingAttribute {
            element: element.name.clone(),
            attribute: name.to_string(),
        })
}

fn parse_params(element: &Element) -> Result<Vec<Param>, Error> {
    let mut params = Vec::new();

    for param_node in &element.children {
        if let Some(element) = param_node.as_element() {
            if element.name == "param" {
                let name = required_attr(element, "name")?;
                let style = match element.attributes.get("style").map(|s| s.as_str()) {
                    Some("plain") | None => ParamStyle::Plain,
                    Some("matrix") => ParamStyle::Matrix,
                    Some("query") => ParamStyle::Query,
                    Some("header") => ParamStyle::Header,
                    Some("template") => ParamStyle::Template,
                    Some(other) => {
                        log::warn!("Unknown param style {:?} for param {}", other, name);
                        ParamStyle::Plain
                    }
                };
                let required = element
                    .attributes
                    .get("required")
                    .map(|s| s == "true")
                    .unwrap_or(false);
                let doc = parse_docs(element).into_iter().next();
                params.push(Param {
                    style,
                    name,
                    required,
                    doc,
                });
            }
        }
    }

    Ok(params)
}

#[test]
fn test_parse_params() {
    let xml = r#"
        <resource path="project/{projectIdOrKey}">
            <param name="projectIdOrKey" style="template" required="true">
                <doc>Project id or key</doc>
            </param>
            <param name="expand" style="query"/>
        </resource>
    "#;
    let element = Element::parse(xml.as_bytes()).unwrap();
    let params = parse_params(&element).unwrap();
    assert_eq!(params.len(), 2);
    assert_eq!(params[0].name, "projectIdOrKey");
    assert_eq!(params[0].style, ParamStyle::Template);
    assert!(params[0].required);
    assert_eq!(params[0].doc.as_ref().unwrap().content, "Project id or key");
    assert_eq!(params[1].name, "expand");
    assert_eq!(params[1].style, ParamStyle::Query);
    assert!(!params[1].required);
}

fn parse_docs(element: &Element) -> Vec<Doc> {
    let mut docs = Vec::new();

    for doc_node in &element.children {
        if let Some(element) = doc_node.as_element() {
            if element.name == "doc" {
                let title = element.attributes.get("title").cloned();
                let lang = element.attributes.get("lang").cloned();
                let mut content = String::new();
                for child in &element.children {
                    if let xmltree::XMLNode::Text(t) = child {
                        content.push_str(t);
                    }
                }
                docs.push(Doc {
                    title,
                    lang,
                    content,
                });
            }
        }
    }

    docs
}

fn parse_representations(element: &Element) -> Result<Vec<Representation>, Error> {
    let mut representations = Vec::new();

    for node in &element.children {
        if let Some(element) = node.as_element() {
            if element.name == "representation" {
                let media_type = element
                    .attributes
                    .get("mediaType")
                    .map(|s| s.parse())
                    .transpose()?;
                let element_name = element.attributes.get("element").cloned();
                let docs = parse_docs(element);
                representations.push(Representation {
                    media_type,
                    element: element_name,
                    docs,
                });
            }
        }
    }

    Ok(representations)
}

#[test]
fn test_parse_representations() {
    let xml = r#"<request>
        <representation mediaType="application/json" element="project">
            <doc>The project to create</doc>
        </representation>
        <representation mediaType="application/xml"/>
        </request>
    "#;

    let root = Element::parse(xml.as_bytes()).unwrap();
    let representations = parse_representations(&root).unwrap();

    assert_eq!(representations.len(), 2);
    assert_eq!(
        representations[0].media_type,
        Some("application/json".parse().unwrap())
    );
    assert_eq!(representations[0].element, Some("project".to_string()));
    assert_eq!(representations[0].docs[0].content, "The project to create");
    assert!(representations[1].element.is_none());
}

fn parse_request(request_element: &Element) -> Result<Request, Error> {
    Ok(Request {
        docs: parse_docs(request_element),
        params: parse_params(request_element)?,
        representations: parse_representations(request_element)?,
    })
}

fn parse_response(response_element: &Element) -> Result<Response, Error> {
    Ok(Response {
        docs: parse_docs(response_element),
        status: response_element
            .attributes
            .get("status")
            .and_then(|s| s.parse().ok()),
        representations: parse_representations(response_element)?,
    })
}

fn parse_method(method_element: &Element) -> Result<Method, Error> {
    let id = method_element
        .attributes
        .get("id")
        .cloned()
        .unwrap_or_default();
    let name = method_element
        .attributes
        .get("name")
        .cloned()
        .unwrap_or_default();

    let request = method_element
        .children
        .iter()
        .filter_map(|node| node.as_element())
        .find(|e| e.name == "request")
        .map(parse_request)
        .transpose()?
        .unwrap_or_default();

    let responses = method_element
        .children
        .iter()
        .filter_map(|node| node.as_element())
        .filter(|e| e.name == "response")
        .map(parse_response)
        .collect::<Result<Vec<_>, _>>()?;

    let docs = parse_docs(method_element);

    Ok(Method {
        id,
        name,
        docs,
        request,
        responses,
    })
}

#[test]
fn test_parse_method() {
    let xml = r#"
        <method id="getWidgets" name="GET">
            <doc>Get a list of all the widgets</doc>
            <request>
                <param name="filter" style="query" required="false">
                    <doc>Filter the list of widgets</doc>
                </param>
            </request>
            <response status="200">
                <representation mediaType="application/json"/>
            </response>
        </method>
    "#;

    let method = parse_method(&Element::parse(xml.as_bytes()).unwrap()).unwrap();

    assert_eq!(method.id, "getWidgets");
    assert_eq!(method.name, "GET");
    assert_eq!(method.doc_text(), "Get a list of all the widgets");
    assert_eq!(method.request.params.len(), 1);
    assert_eq!(method.request.params[0].name, "filter");
    assert_eq!(method.responses.len(), 1);
    assert_eq!(method.responses[0].status, Some(200));
}

fn parse_methods(resource_element: &Element) -> Result<Vec<Method>, Error> {
    resource_element
        .children
        .iter()
        .filter_map(|node| node.as_element())
        .filter(|e| e.name == "method")
        .map(parse_method)
        .collect()
}

fn parse_resource(element: &Element) -> Result<Resource, Error> {
    let id = element.attributes.get("id").cloned();
    let path = Some(required_attr(element, "path")?);

    Ok(Resource {
        id,
        path,
        methods: parse_methods(element)?,
        docs: parse_docs(element),
        subresources: parse_resources(element)?,
        params: parse_params(element)?,
    })
}

fn parse_resources(resources_element: &Element) -> Result<Vec<Resource>, Error> {
    resources_element
        .children
        .iter()
        .filter_map(|node| node.as_element())
        .filter(|e| e.name == "resource")
        .map(parse_resource)
        .collect()
}

pub fn parse<R: Read>(reader: R) -> Result<Application, Error> {
    let root = Element::parse(reader).map_err(Error::Xml)?;

    let docs = parse_docs(&root);

    let mut resources = Vec::new();
    for node in &root.children {
        if let Some(element) = node.as_element() {
            if element.name == "resources" {
                let base = element.attributes.get("base").cloned();
                resources.push(Resources {
                    base,
                    resources: parse_resources(element)?,
                });
            }
        }
    }

    log::info!("Parsed WADL document: {} resource group(s)", resources.len());

    Ok(Application { resources, docs })
}

pub fn parse_file<P: AsRef<std::path::Path>>(path: P) -> Result<Application, Error> {
    log::info!("Loading WADL: {}", path.as_ref().display());
    let file = std::fs::File::open(path).map_err(Error::Io)?;
    parse(file)
}

pub fn parse_string(s: &str) -> Result<Application, Error> {
    parse(s.as_bytes())
}

pub fn parse_bytes(bytes: &[u8]) -> Result<Application, Error> {
    parse(bytes)
}
