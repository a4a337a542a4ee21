use std::error::Error as StdError;
use std::str::FromStr;
use wadl_client::{Error, Verb};

#[test]
fn test_error_display() {
    let error = Error::NotEnoughArguments {
        expected: 2,
        given: 1,
    };
    let display_str = format!("{}", error);
    assert!(display_str.contains("Not enough arguments"));

    let error = Error::Request {
        status: 404,
        body: "issue does not exist".to_string(),
    };
    assert_eq!(format!("{}", error), "Error 404: issue does not exist");
}

#[test]
fn test_error_source() {
    let url_error: Error = url::ParseError::EmptyHost.into();
    assert!(StdError::source(&url_error).is_some());

    let config_error = Error::Configuration("bad".to_string());
    assert!(StdError::source(&config_error).is_none());
}

#[test]
fn test_error_from_parse() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let error: Error = wadl_client::ParseError::Io(io_error).into();
    match error {
        Error::Wadl(_) => {}
        _ => panic!("Expected WADL error"),
    }
}

#[test]
fn test_error_debug() {
    let error = Error::NamingDiverged { rounds: 50 };
    let debug_str = format!("{:?}", error);
    assert!(debug_str.contains("NamingDiverged"));
}

#[test]
fn test_verb_parsing() {
    assert_eq!(Verb::from_str("GET").unwrap(), Verb::Get);
    assert_eq!(Verb::from_str("post").unwrap(), Verb::Post);
    assert_eq!(Verb::from_str("Put").unwrap(), Verb::Put);
    assert_eq!(Verb::from_str("DELETE").unwrap(), Verb::Delete);
    assert!(matches!(
        Verb::from_str("PATCH"),
        Err(Error::UnsupportedVerb(_))
    ));
}

#[test]
fn test_verb_keys() {
    assert_eq!(Verb::Get.key(), "get");
    assert_eq!(Verb::Delete.as_str(), "DELETE");
    assert_eq!(format!("{}", Verb::Post), "POST");
}
