use wadl_client::{parse_string, Client};

fn client(xml: &str, prefix: &str) -> Client {
    Client::from_applications(&[parse_string(xml).unwrap()], prefix).unwrap()
}

#[test]
fn test_two_round_convergence() {
    // Three operations all declared "delete". The first round splits off
    // delete_component but leaves two delete_version; the second round
    // splits those by the removeAndSwap segment.
    let xml = r#"
    <application xmlns="http://wadl.dev.java.net/2009/02">
        <resources>
            <resource path="api/2/component/{id}">
                <method id="delete" name="DELETE"/>
            </resource>
            <resource path="api/2/version/{id}">
                <method id="delete" name="DELETE"/>
                <resource path="removeAndSwap">
                    <method id="delete" name="POST"/>
                </resource>
            </resource>
        </resources>
    </application>"#;

    let client = client(xml, "api/2");
    assert_eq!(
        client.flat("delete_component").unwrap().resource_path,
        "api/2/component/{id}"
    );
    assert_eq!(
        client.flat("delete_version").unwrap().resource_path,
        "api/2/version/{id}"
    );
    assert_eq!(
        client.flat("delete_version_removeAndSwap").unwrap().resource_path,
        "api/2/version/{id}/removeAndSwap"
    );
    assert!(client.flat("delete").is_none());
}

#[test]
fn test_suffix_from_first_differing_segment() {
    let xml = r#"
    <application xmlns="http://wadl.dev.java.net/2009/02">
        <resources>
            <resource path="api/2/user">
                <method id="getUser" name="GET"/>
            </resource>
            <resource path="api/2/myself">
                <method id="getUser" name="GET"/>
            </resource>
        </resources>
    </application>"#;

    let client = client(xml, "api/2");
    assert!(client.flat("getUser_user").is_some());
    assert!(client.flat("getUser_myself").is_some());
}

#[test]
fn test_placeholder_braces_stripped_from_suffix() {
    // The differing segment for the project variant is {projectid}; the
    // braces must not leak into the canonical name.
    let xml = r#"
    <application xmlns="http://wadl.dev.java.net/2009/02">
        <resources>
            <resource path="api/2/user/avatar">
                <method id="getAvatar" name="GET"/>
            </resource>
            <resource path="api/2/project/{projectid}/avatar">
                <method id="getAvatar" name="GET"/>
            </resource>
        </resources>
    </application>"#;

    let client = client(xml, "api/2");
    assert!(client.flat("getAvatar_user").is_some());
    assert!(client.flat("getAvatar_project").is_some());
}

#[test]
fn test_residual_collision_keeps_last_in_document_order() {
    // Identical names on identical paths can never be separated; the
    // flat table keeps the later operation.
    let xml = r#"
    <application xmlns="http://wadl.dev.java.net/2009/02">
        <resources>
            <resource path="api/2/ping">
                <method id="ping" name="GET"/>
                <method id="ping" name="POST"/>
            </resource>
        </resources>
    </application>"#;

    let client = client(xml, "api/2");
    let operation = client.flat("ping").unwrap();
    assert_eq!(operation.verb, wadl_client::Verb::Post);
    assert_eq!(client.flat_names(), vec!["ping"]);
}

#[test]
fn test_canonical_name_agrees_across_views() {
    // Tree bindings and the flat table reference the same operations, so
    // both observe the post-resolution name.
    let xml = r#"
    <application xmlns="http://wadl.dev.java.net/2009/02">
        <resources>
            <resource path="api/2/component/{id}">
                <method id="delete" name="DELETE"/>
            </resource>
            <resource path="api/2/version/{id}">
                <method id="delete" name="DELETE"/>
            </resource>
        </resources>
    </application>"#;

    let client = client(xml, "api/2");
    let from_tree = client.tree_operation("component", "delete").unwrap();
    assert_eq!(from_tree.canonical_name, "delete_component");
    assert_eq!(from_tree.declared_name, "delete");
    let from_flat = client.flat("delete_component").unwrap();
    assert_eq!(from_flat.resource_path, from_tree.resource_path);
}
