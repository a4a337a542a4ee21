//! Walks parsed WADL documents into a flat set of resource records and
//! synthesizes one invocable operation per REST method.
//!
//! Resources are collected depth-first in document order. Each record
//! carries its full normalized path and every path parameter inherited
//! from its ancestors, which is the set available when building the
//! operations of the resource and all of its descendants.

use crate::ast;
use crate::{Error, Verb};
use std::collections::HashMap;

/// Index of an [`Operation`] in the [`ResourceSet`] arena. Tree nodes and
/// the flat name table both refer to operations through these, so the
/// canonical-name rewrite is observed by every view.
pub type OpId = usize;

/// One `<resource>` element, flattened.
#[derive(Debug)]
pub struct ResourceRecord {
    /// The raw path segment from the WADL, placeholders included.
    pub path: String,

    /// Full path from the root, slash-normalized.
    pub full_path: String,

    /// Path params accumulated root-to-leaf, this resource's own last.
    pub inherited_params: Vec<ast::Param>,

    /// Indices of child records.
    pub children: Vec<usize>,

    /// Operations declared directly on this resource.
    pub operations: Vec<OpId>,
}

/// One REST verb+path combination with bound parameter metadata.
#[derive(Debug)]
pub struct Operation {
    pub verb: Verb,

    /// Full resource path including `{name}` placeholders.
    pub resource_path: String,

    /// Ordered path parameters; names are unique.
    pub path_params: Vec<ast::Param>,

    pub query_params: Vec<ast::Param>,

    /// Headers declared by the WADL, e.g. Content-Type from the first
    /// request representation.
    pub headers: HashMap<String, String>,

    /// The WADL method id. Never changes after construction.
    pub declared_name: String,

    /// Starts equal to `declared_name`; rewritten once by the flat-name
    /// resolver before any table is populated.
    pub canonical_name: String,

    pub docstring: String,
}

impl Operation {
    /// Human-readable call signature, e.g. `getProject(projectIdOrKey, expand=None)`.
    pub fn signature(&self) -> String {
        let args = self
            .path_params
            .iter()
            .map(|p| p.name.clone())
            .chain(self.query_params.iter().map(|p| format!("{}=None", p.name)))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({})", self.canonical_name, args)
    }
}

/// Result of walking one or more WADL documents: the flattened resource
/// records plus the operation arena they index into.
#[derive(Debug, Default)]
pub struct ResourceSet {
    pub resources: Vec<ResourceRecord>,
    pub operations: Vec<Operation>,
}

impl ResourceSet {
    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }
}

/// Collapse runs of slashes, keeping at most one leading slash.
pub fn normalize_slashes(path: &str) -> String {
    let mut result = String::with_capacity(path.len());
    let mut prev_slash = false;
    for c in path.chars() {
        if c == '/' {
            if !prev_slash {
                result.push(c);
            }
            prev_slash = true;
        } else {
            result.push(c);
            prev_slash = false;
        }
    }
    result
}

#[test]
fn test_normalize_slashes() {
    assert_eq!(normalize_slashes("/a//b///c"), "/a/b/c");
    assert_eq!(normalize_slashes("a/b"), "a/b");
    assert_eq!(normalize_slashes("//a"), "/a");
    assert_eq!(normalize_slashes(""), "");
}

/// The `{name}` placeholders of a path template, in order of appearance.
pub fn template_placeholders(path: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = path;
    while let Some(open) = rest.find('{') {
        rest = &rest[open + 1..];
        match rest.find('}') {
            Some(close) => {
                names.push(rest[..close].to_string());
                rest = &rest[close + 1..];
            }
            None => break,
        }
    }
    names
}

#[test]
fn test_template_placeholders() {
    assert_eq!(
        template_placeholders("/issue/{issueIdOrKey}/worklog/{id}"),
        vec!["issueIdOrKey", "id"]
    );
    assert!(template_placeholders("/project").is_empty());
    assert!(template_placeholders("/broken/{oops").is_empty());
}

/// Remove every `{...}` span from a path template.
pub fn strip_placeholders(path: &str) -> String {
    let mut result = String::with_capacity(path.len());
    let mut rest = path;
    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        rest = &rest[open + 1..];
        match rest.find('}') {
            Some(close) => rest = &rest[close + 1..],
            None => return result,
        }
    }
    result.push_str(rest);
    result
}

#[test]
fn test_strip_placeholders() {
    assert_eq!(
        strip_placeholders("api/2/project/{projectIdOrKey}/avatar"),
        "api/2/project//avatar"
    );
    assert_eq!(strip_placeholders("api/2/project"), "api/2/project");
}

/// Build the resource records and operations for a set of parsed WADL
/// documents. Documents are walked independently and their records
/// concatenated; there is no cross-document merging.
pub fn build_operations(applications: &[ast::Application]) -> Result<ResourceSet, Error> {
    let mut set = ResourceSet::default();
    for application in applications {
        for resource in application.iter_resources() {
            walk_resource(&mut set, resource, None, 1)?;
        }
    }
    log::info!(
        "WADL walk done: {} resource(s), {} operation(s)",
        set.resources.len(),
        set.operations.len()
    );
    Ok(set)
}

fn walk_resource(
    set: &mut ResourceSet,
    resource: &ast::Resource,
    parent: Option<usize>,
    level: usize,
) -> Result<usize, Error> {
    let raw_path = resource.path.clone().unwrap_or_default();
    log::debug!("{}resource: {}", "  ".repeat(level), raw_path);

    let full_path = match parent {
        Some(idx) => normalize_slashes(&format!("{}/{}", set.resources[idx].full_path, raw_path)),
        None => normalize_slashes(&raw_path),
    };

    // Ancestor params first, then this resource's own. Placeholders with a
    // matching <param> declaration keep it; the rest get a synthesized
    // template param.
    let mut inherited_params = match parent {
        Some(idx) => set.resources[idx].inherited_params.clone(),
        None => Vec::new(),
    };
    for name in template_placeholders(&raw_path) {
        match resource.get_param(&name) {
            Some(param) => inherited_params.push(param.clone()),
            None => inherited_params.push(ast::Param::template(&name)),
        }
    }

    let record_idx = set.resources.len();
    set.resources.push(ResourceRecord {
        path: raw_path,
        full_path,
        inherited_params,
        children: Vec::new(),
        operations: Vec::new(),
    });

    for method in &resource.methods {
        let op_id = build_operation(set, method, record_idx)?;
        set.resources[record_idx].operations.push(op_id);
    }

    for child in &resource.subresources {
        let child_idx = walk_resource(set, child, Some(record_idx), level + 1)?;
        set.resources[record_idx].children.push(child_idx);
    }

    Ok(record_idx)
}

fn build_operation(
    set: &mut ResourceSet,
    method: &ast::Method,
    resource_idx: usize,
) -> Result<OpId, Error> {
    let resource = &set.resources[resource_idx];
    log::debug!("  + method: {} {}", method.name, method.id);

    let verb: Verb = method.name.parse()?;

    let mut path_params = resource.inherited_params.clone();
    let mut query_params = Vec::new();
    for param in &method.request.params {
        match param.style {
            ast::ParamStyle::Template => path_params.push(param.clone()),
            ast::ParamStyle::Query => query_params.push(param.clone()),
            _ => {}
        }
    }
    // Path param names are unique; first declaration wins.
    let mut seen = std::collections::HashSet::new();
    path_params.retain(|p| seen.insert(p.name.clone()));

    let mut headers = HashMap::new();
    if let Some(representation) = method.request.representations.first() {
        if let Some(media_type) = &representation.media_type {
            headers.insert("Content-Type".to_string(), media_type.to_string());
        }
    }

    let operation = Operation {
        verb,
        resource_path: resource.full_path.clone(),
        path_params,
        query_params,
        headers,
        declared_name: method.id.clone(),
        canonical_name: method.id.clone(),
        docstring: method.doc_text(),
    };

    let op_id = set.operations.len();
    set.operations.push(operation);
    Ok(op_id)
}
