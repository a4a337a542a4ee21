//! Organizes the built operations into two views: a tree navigable by URL
//! path segment with verb-named bindings, and a flat table keyed by
//! globally unique canonical names.
//!
//! Construction order is strict: parse, build operations, assemble the
//! tree, resolve flat names, then populate the table. The canonical-name
//! rewrite happens exactly once, before any table exists, and both views
//! index the same operation arena, so they always agree on names.

use crate::ast;
use crate::build::{self, OpId, Operation, ResourceSet};
use crate::invoke::Call;
use crate::transport::RequestExecutor;
use crate::Error;
use std::collections::{BTreeMap, HashMap, VecDeque};

/// Renaming rounds before the resolver gives up on an input whose names
/// keep changing without settling.
const MAX_NAMING_ROUNDS: usize = 50;

/// One URL segment of the client tree. Bindings are keyed by lower-case
/// verb ("get", "post", ..) with demoted collision losers under
/// `<verb>_all`.
#[derive(Debug, Default)]
pub struct ClientNode {
    children: BTreeMap<String, ClientNode>,
    bindings: BTreeMap<String, OpId>,
}

impl ClientNode {
    pub fn child(&self, segment: &str) -> Option<&ClientNode> {
        self.children.get(segment)
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &ClientNode)> {
        self.children.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Operation bound under a verb key, e.g. "get" or "get_all".
    pub fn binding(&self, key: &str) -> Option<OpId> {
        self.bindings.get(key).copied()
    }

    pub fn bindings(&self) -> impl Iterator<Item = (&str, OpId)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Descend through dot-separated segments, e.g. "issue.worklog".
    pub fn descend(&self, dotted: &str) -> Option<&ClientNode> {
        let mut node = self;
        for segment in dotted.split('.').filter(|s| !s.is_empty()) {
            node = node.child(segment)?;
        }
        Some(node)
    }

    fn child_mut(&mut self, segment: &str) -> &mut ClientNode {
        self.children.entry(segment.to_string()).or_default()
    }

    /// Attach an operation under its verb. On collision the operation
    /// with more path params wins the verb key (last one wins a tie) and
    /// the loser is demoted to `<verb>_all`.
    fn attach(&mut self, op_id: OpId, operations: &[Operation]) {
        let operation = &operations[op_id];
        let key = operation.verb.key().to_string();
        match self.bindings.get(&key).copied() {
            None => {
                self.bindings.insert(key, op_id);
            }
            Some(existing) => {
                let demoted_key = format!("{}_all", operation.verb.key());
                if operation.path_params.len() >= operations[existing].path_params.len() {
                    self.bindings.insert(key, op_id);
                    self.bindings.insert(demoted_key, existing);
                } else {
                    self.bindings.insert(demoted_key, op_id);
                }
            }
        }
    }
}

/// The runtime client: operation arena, segment tree, and flat name table.
pub struct Client {
    set: ResourceSet,
    root: ClientNode,
    flat: HashMap<String, OpId>,
    executor: Option<Box<dyn RequestExecutor>>,
}

impl Client {
    /// Build a client from already-parsed WADL documents. `api_prefix` is
    /// stripped from resource paths before tree descent; resources whose
    /// path does not start with it stay out of the tree but keep their
    /// flat-table entry.
    pub fn from_applications(
        applications: &[ast::Application],
        api_prefix: &str,
    ) -> Result<Self, Error> {
        let mut set = build::build_operations(applications)?;
        let root = assemble_tree(&set, api_prefix);
        resolve_flat_names(&mut set.operations)?;
        let flat = populate_flat_table(&set.operations);
        Ok(Client {
            set,
            root,
            flat,
            executor: None,
        })
    }

    /// Parse one or more WADL files and build a client over them.
    pub fn from_files<P: AsRef<std::path::Path>>(
        paths: &[P],
        api_prefix: &str,
    ) -> Result<Self, Error> {
        let applications = paths
            .iter()
            .map(crate::parse::parse_file)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_applications(&applications, api_prefix)
    }

    pub fn from_file<P: AsRef<std::path::Path>>(path: P, api_prefix: &str) -> Result<Self, Error> {
        Self::from_files(&[path], api_prefix)
    }

    /// Attach the transport used by [`Client::invoke`].
    pub fn with_executor(mut self, executor: impl RequestExecutor + 'static) -> Self {
        self.executor = Some(Box::new(executor));
        self
    }

    pub fn executor(&self) -> Option<&dyn RequestExecutor> {
        self.executor.as_deref()
    }

    pub fn root(&self) -> &ClientNode {
        &self.root
    }

    pub fn operation(&self, id: OpId) -> &Operation {
        &self.set.operations[id]
    }

    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.set.operations.iter()
    }

    pub fn operation_count(&self) -> usize {
        self.set.operation_count()
    }

    pub fn resources(&self) -> &[build::ResourceRecord] {
        &self.set.resources
    }

    /// Look up an operation by canonical name.
    pub fn flat(&self, name: &str) -> Option<&Operation> {
        self.flat.get(name).map(|&id| &self.set.operations[id])
    }

    /// Every canonical name in the flat table, sorted.
    pub fn flat_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.flat.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Canonical names containing the needle, sorted.
    pub fn search(&self, needle: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .flat
            .keys()
            .filter(|name| name.contains(needle))
            .map(|s| s.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Operation bound at a dotted tree path under a verb key, e.g.
    /// `("issue.worklog", "get")`.
    pub fn tree_operation(&self, dotted: &str, verb_key: &str) -> Option<&Operation> {
        self.root
            .descend(dotted)?
            .binding(verb_key)
            .map(|id| &self.set.operations[id])
    }

    /// Start a call on a flat-named operation using the attached executor.
    pub fn invoke(&self, name: &str) -> Result<Call<'_>, Error> {
        let executor = self
            .executor
            .as_deref()
            .ok_or_else(|| Error::Configuration("no executor attached".to_string()))?;
        let operation = self
            .flat(name)
            .ok_or_else(|| Error::Configuration(format!("no operation named {:?}", name)))?;
        Ok(operation.call(executor))
    }

    /// Start a call on a tree-bound operation using the attached executor.
    pub fn invoke_at(&self, dotted: &str, verb_key: &str) -> Result<Call<'_>, Error> {
        let executor = self
            .executor
            .as_deref()
            .ok_or_else(|| Error::Configuration("no executor attached".to_string()))?;
        let operation = self.tree_operation(dotted, verb_key).ok_or_else(|| {
            Error::Configuration(format!("no {} operation at {:?}", verb_key, dotted))
        })?;
        Ok(operation.call(executor))
    }
}

/// Build the segment tree. Placeholder segments are stripped, so
/// `project/{id}/avatar` and `project/avatar` land on the same node.
fn assemble_tree(set: &ResourceSet, api_prefix: &str) -> ClientNode {
    let mut root = ClientNode::default();
    for resource in &set.resources {
        let path = match resource.full_path.strip_prefix(api_prefix) {
            Some(rest) => rest,
            None => {
                log::debug!("Skipping resource outside prefix: {}", resource.full_path);
                continue;
            }
        };
        let stripped = build::strip_placeholders(path);
        let mut node = &mut root;
        for segment in stripped.split('/').filter(|s| !s.is_empty()) {
            node = node.child_mut(segment);
        }
        for &op_id in &resource.operations {
            node.attach(op_id, &set.operations);
        }
    }
    root
}

/// Rewrite colliding canonical names until every name is unique, by
/// appending the first path segment that distinguishes the group members
/// after their shared prefix is discarded.
///
/// An operation whose segments run out before the names diverge keeps its
/// name; if a whole round renames nothing the leftover collisions cannot
/// be separated and are left in place (the flat table then keeps the last
/// one in document order).
fn resolve_flat_names(operations: &mut [Operation]) -> Result<(), Error> {
    for round in 1..=MAX_NAMING_ROUNDS {
        log::debug!("Resolving naming conflicts, round {}...", round);

        let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (idx, operation) in operations.iter().enumerate() {
            groups
                .entry(operation.canonical_name.clone())
                .or_default()
                .push(idx);
        }

        let mut conflict_found = false;
        let mut renamed = false;
        for (name, members) in groups {
            if members.len() < 2 {
                continue;
            }
            conflict_found = true;

            let mut queues: Vec<VecDeque<String>> = members
                .iter()
                .map(|&idx| {
                    operations[idx]
                        .resource_path
                        .split('/')
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .collect();

            // Discard the shared leading segments; they carry no
            // disambiguating information.
            loop {
                let first = match queues[0].front() {
                    Some(segment) => segment.clone(),
                    None => break,
                };
                if !queues.iter().all(|q| q.front() == Some(&first)) {
                    break;
                }
                for queue in &mut queues {
                    queue.pop_front();
                }
            }

            for (queue, &idx) in queues.iter().zip(&members) {
                if let Some(segment) = queue.front() {
                    let suffix: String = segment
                        .chars()
                        .filter(|c| !matches!(c, '{' | '}' | '-'))
                        .collect();
                    let operation = &mut operations[idx];
                    operation.canonical_name = format!("{}_{}", operation.canonical_name, suffix);
                    renamed = true;
                    log::debug!(
                        "  {} --> {}",
                        operation.resource_path,
                        operation.canonical_name
                    );
                }
            }
            log::debug!("Conflicting name {:?}: {} member(s)", name, members.len());
        }

        if !conflict_found {
            log::info!("Naming conflict resolution done, round {}", round);
            return Ok(());
        }
        if !renamed {
            log::warn!("Residual naming collisions remain, keeping last in document order");
            return Ok(());
        }
    }
    Err(Error::NamingDiverged {
        rounds: MAX_NAMING_ROUNDS,
    })
}

/// Later operations overwrite earlier ones on a residual collision.
fn populate_flat_table(operations: &[Operation]) -> HashMap<String, OpId> {
    let mut table = HashMap::new();
    for (idx, operation) in operations.iter().enumerate() {
        table.insert(operation.canonical_name.clone(), idx);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Verb;
    use std::collections::HashMap;

    fn operation(name: &str, path: &str) -> Operation {
        Operation {
            verb: Verb::Get,
            resource_path: path.to_string(),
            path_params: Vec::new(),
            query_params: Vec::new(),
            headers: HashMap::new(),
            declared_name: name.to_string(),
            canonical_name: name.to_string(),
            docstring: String::new(),
        }
    }

    #[test]
    fn test_resolution_splits_by_first_differing_segment() {
        let mut operations = vec![
            operation("getUser", "api/2/user"),
            operation("getUser", "api/2/myself"),
        ];
        resolve_flat_names(&mut operations).unwrap();
        assert_eq!(operations[0].canonical_name, "getUser_user");
        assert_eq!(operations[1].canonical_name, "getUser_myself");
    }

    #[test]
    fn test_resolution_strips_placeholder_braces() {
        let mut operations = vec![
            operation("getAvatar", "api/2/user/avatar"),
            operation("getAvatar", "api/2/project/{projectid}/avatar"),
        ];
        resolve_flat_names(&mut operations).unwrap();
        assert_eq!(operations[0].canonical_name, "getAvatar_user");
        assert_eq!(operations[1].canonical_name, "getAvatar_project");
    }

    #[test]
    fn test_residual_collision_terminates() {
        // Identical paths can never diverge; the resolver must still stop.
        let mut operations = vec![
            operation("ping", "api/2/ping"),
            operation("ping", "api/2/ping"),
        ];
        resolve_flat_names(&mut operations).unwrap();
        assert_eq!(operations[0].canonical_name, "ping");
        assert_eq!(operations[1].canonical_name, "ping");
        let table = populate_flat_table(&operations);
        assert_eq!(table.len(), 1);
        assert_eq!(table["ping"], 1);
    }

    #[test]
    fn test_unique_names_untouched() {
        let mut operations = vec![
            operation("getProject", "api/2/project"),
            operation("getIssue", "api/2/issue/{id}"),
        ];
        resolve_flat_names(&mut operations).unwrap();
        assert_eq!(operations[0].canonical_name, "getProject");
        assert_eq!(operations[1].canonical_name, "getIssue");
    }
}
