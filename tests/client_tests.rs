use wadl_client::{parse_string, Client};

const JIRA_WADL: &str = r#"
<application xmlns="http://wadl.dev.java.net/2009/02">
    <resources base="https://jira.example.com/rest/">
        <resource path="api/2/project">
            <method id="getAllProjects" name="GET"/>
            <resource path="{projectIdOrKey}">
                <param name="projectIdOrKey" style="template" required="true"/>
                <method id="getProject" name="GET"/>
                <resource path="avatar">
                    <method id="createAvatar" name="POST">
                        <request>
                            <representation mediaType="application/json"/>
                        </request>
                    </method>
                </resource>
            </resource>
        </resource>
        <resource path="api/2/issue">
            <method id="getIssues" name="GET"/>
            <resource path="{issueIdOrKey}">
                <method id="getIssue" name="GET"/>
                <resource path="worklog/{id}">
                    <method id="getWorklog" name="GET"/>
                </resource>
            </resource>
        </resource>
        <resource path="internal/debug">
            <method id="debugDump" name="GET"/>
        </resource>
    </resources>
</application>"#;

fn client() -> Client {
    Client::from_applications(&[parse_string(JIRA_WADL).unwrap()], "api/2").unwrap()
}

#[test]
fn test_tree_navigation() {
    let client = client();
    let operation = client.tree_operation("project", "get_all").unwrap();
    assert_eq!(operation.resource_path, "api/2/project");

    let operation = client.tree_operation("project", "get").unwrap();
    assert_eq!(operation.resource_path, "api/2/project/{projectIdOrKey}");

    // Placeholder segments are stripped, so {projectIdOrKey}/avatar hangs
    // off the project node directly.
    let operation = client.tree_operation("project.avatar", "post").unwrap();
    assert_eq!(
        operation.resource_path,
        "api/2/project/{projectIdOrKey}/avatar"
    );

    let operation = client.tree_operation("issue.worklog", "get").unwrap();
    assert_eq!(
        operation.resource_path,
        "api/2/issue/{issueIdOrKey}/worklog/{id}"
    );
}

#[test]
fn test_verb_collision_demotion() {
    // getIssues (0 path params) and getIssue (1 path param) land on the
    // same node; the one with more params takes the verb key.
    let client = client();
    let primary = client.tree_operation("issue", "get").unwrap();
    assert_eq!(primary.resource_path, "api/2/issue/{issueIdOrKey}");
    assert_eq!(primary.path_params.len(), 1);

    let demoted = client.tree_operation("issue", "get_all").unwrap();
    assert_eq!(demoted.resource_path, "api/2/issue");
    assert!(demoted.path_params.is_empty());
}

#[test]
fn test_resources_outside_prefix_skipped_from_tree() {
    let client = client();
    assert!(client.root().child("internal").is_none());
    // Still present in the flat table.
    assert!(client.flat("debugDump").is_some());
}

#[test]
fn test_flat_lookup_and_search() {
    let client = client();
    assert_eq!(
        client.flat("getProject").unwrap().resource_path,
        "api/2/project/{projectIdOrKey}"
    );
    assert_eq!(
        client.search("Avatar"),
        vec!["createAvatar"]
    );
    let names = client.flat_names();
    assert!(names.contains(&"getAllProjects"));
    assert!(names.contains(&"getWorklog"));
    assert_eq!(client.operation_count(), 7);
}

#[test]
fn test_node_iteration() {
    let client = client();
    let segments: Vec<&str> = client.root().children().map(|(name, _)| name).collect();
    assert_eq!(segments, vec!["issue", "project"]);

    let issue = client.root().child("issue").unwrap();
    let bindings: Vec<&str> = issue.bindings().map(|(key, _)| key).collect();
    assert_eq!(bindings, vec!["get", "get_all"]);
}

#[test]
fn test_invoke_without_executor_is_configuration_error() {
    let client = client();
    assert!(matches!(
        client.invoke("getProject"),
        Err(wadl_client::Error::Configuration(_))
    ));
    assert!(matches!(
        client.invoke_at("project", "get"),
        Err(wadl_client::Error::Configuration(_))
    ));
}

#[test]
fn test_unknown_flat_name() {
    let client = client();
    assert!(client.flat("doesNotExist").is_none());
    assert!(client.tree_operation("project.missing", "get").is_none());
}
