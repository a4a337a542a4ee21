use serde_json::json;
use wadl_client::Payload;

fn round_trips(value: serde_json::Value) {
    assert_eq!(Payload::from_value(value.clone()).to_value(), value);
}

#[test]
fn test_scalar_round_trips() {
    round_trips(json!(null));
    round_trips(json!(true));
    round_trips(json!(42));
    round_trips(json!(-7.5));
    round_trips(json!("a string"));
}

#[test]
fn test_nested_round_trip() {
    round_trips(json!({
        "id": 10000,
        "key": "PROJ",
        "lead": {
            "name": "admin",
            "avatarUrls": {"48x48": "https://example.com/avatar.png"},
            "active": true,
        },
        "versions": [
            {"id": 1, "archived": false},
            {"id": 2, "archived": true},
        ],
        "mixed": [1, "two", null, [3, 4], {"five": 5}],
    }));
}

#[test]
fn test_empty_containers_round_trip() {
    round_trips(json!({}));
    round_trips(json!([]));
    round_trips(json!({"empty": {}, "list": []}));
}

#[test]
fn test_array_wrapped_elementwise() {
    let payload = Payload::from_value(json!([{"id": 1}, {"id": 2}]));
    match &payload {
        Payload::Array(items) => {
            assert_eq!(items.len(), 2);
            assert!(matches!(items[0], Payload::Object(_)));
        }
        other => panic!("Expected array, got {:?}", other),
    }
    assert_eq!(payload[1]["id"].as_i64(), Some(2));
}

#[test]
fn test_display_is_json() {
    let payload = Payload::from_value(json!({"a": 1}));
    assert_eq!(format!("{}", payload), r#"{"a":1}"#);
}

#[test]
fn test_missing_key_indexing_is_null() {
    let payload = Payload::from_value(json!({"a": 1}));
    assert!(payload["b"].is_null());
    assert!(payload["a"]["deep"].is_null());
    assert!(payload[3].is_null());
}
