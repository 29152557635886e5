//! End-to-end calls through an in-memory transport.

use xmlrpc_client::{call, decode, encode, to_value, BoxError, Client, EncodeError, Fault, ParseError, Request, Transport, Value};

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::Cursor;

/// Answers every request with the same body and records the requests.
struct Echo {
    response: String,
    requests: RefCell<Vec<String>>,
}

impl Echo {
    fn new(response: &str) -> Self {
        Echo {
            response: response.to_string(),
            requests: RefCell::new(Vec::new()),
        }
    }
}

impl Transport for Echo {
    type Stream = Cursor<Vec<u8>>;

    fn transmit(&self, _url: &str, content_type: &str, body: Vec<u8>) -> Result<Self::Stream, BoxError> {
        assert_eq!(content_type, "text/xml");
        self.requests.borrow_mut().push(String::from_utf8(body)?);
        Ok(Cursor::new(self.response.clone().into_bytes()))
    }
}

/// Wraps `value` in a single-param `<methodResponse>`.
fn response_with(value: &str) -> String {
    format!(
        "<?xml version=\"1.0\"?><methodResponse><params><param>{}</param></params></methodResponse>",
        value
    )
}

/// Runs a value through the encoder and back through the decoder.
fn roundtrip(value: Value) -> Value {
    let request = encode("echo", &[value]).unwrap();
    let start = request.find("<param>").unwrap() + "<param>".len();
    let end = request.rfind("</param>").unwrap();

    let mut response = decode(response_with(&request[start..end]).as_bytes()).unwrap();
    assert_eq!(response.fault, None);
    assert_eq!(response.params.len(), 1);
    response.params.remove(0)
}

#[test]
fn add() {
    let transport = Echo::new(
        "<methodResponse><params><param><value><int>5</int></value></param></params></methodResponse>",
    );

    let reply = call(&transport, "http://host/rpc", "add", &[Value::from(2), Value::from(3)]).unwrap();
    assert_eq!(reply.results, vec![Value::Int(5)]);
    assert_eq!(reply.fault, None);
    assert!(reply.request.contains("<methodName>add</methodName>"));
    assert!(reply.request.contains(
        "<params><param><value><int>2</int></value></param><param><value><int>3</int></value></param></params>"
    ));
    assert_eq!(transport.requests.borrow().as_slice(), &[reply.request.clone()]);
}

#[test]
fn fault() {
    let transport = Echo::new(
        "<methodResponse><fault><value><struct>\
         <member><name>faultCode</name><value><int>1</int></value></member>\
         <member><name>faultString</name><value><string>bad</string></value></member>\
         </struct></value></fault></methodResponse>",
    );
    let client = Client::with_transport("http://host/rpc", &transport);

    let reply = client.call("add", &[Value::from(2)]).unwrap();
    assert!(reply.results.is_empty());

    let mut expected = BTreeMap::new();
    expected.insert("faultCode".to_string(), Value::Int(1));
    expected.insert("faultString".to_string(), Value::from("bad"));
    assert_eq!(reply.fault, Some(Value::Struct(expected)));

    let err = reply.into_result().unwrap_err();
    assert_eq!(err.fault(), Some(&Fault::new(1, "bad".into())));
}

#[test]
fn malformed_response_is_an_error() {
    let transport = Echo::new("<html><body>502 Bad Gateway</body></html>");
    let err = call(&transport, "http://host/rpc", "add", &[]).unwrap_err();
    assert!(err.parse_error().is_some());
    assert!(err.fault().is_none());
}

#[test]
fn request_call_prefers_fault() {
    let transport = Echo::new(
        "<methodResponse>\
         <params><param><value><int>5</int></value></param></params>\
         <fault><value><struct>\
         <member><name>faultCode</name><value><int>7</int></value></member>\
         <member><name>faultString</name><value><string>both</string></value></member>\
         </struct></value></fault>\
         </methodResponse>",
    );

    let err = Request::new("add").arg(2).arg(3).call(&transport, "http://host/rpc").unwrap_err();
    assert_eq!(err.fault().map(Fault::code), Some(7));
}

#[test]
fn scalars_roundtrip() {
    for value in vec![
        Value::from("hello"),
        Value::from(""),
        Value::from("<&> \"quoted\""),
        Value::from(42),
        Value::from(0),
        Value::from(-1_i64 << 40),
        Value::from(true),
        Value::from(false),
        Value::from(0.1),
        Value::from(-1234.5),
        Value::from(0.0),
        Value::Base64(vec![0, 159, 255]),
        Value::Nil,
        Value::from(iso8601::datetime("19980717T14:08:55").unwrap()),
    ] {
        assert_eq!(roundtrip(value.clone()), value);
    }
}

#[test]
fn containers_roundtrip() {
    let mut map = BTreeMap::new();
    map.insert("a".to_string(), Value::from(1));
    map.insert("b".to_string(), Value::from("x"));
    let value = Value::Struct(map);
    assert_eq!(roundtrip(value.clone()), value);

    let nested = Value::from(vec![
        value.clone(),
        Value::Array(Vec::new()),
        Value::from(vec![Value::from(1.5), Value::Nil]),
    ]);
    assert_eq!(roundtrip(nested.clone()), nested);
}

#[test]
fn serde_values_roundtrip() {
    #[derive(serde::Serialize)]
    struct Login<'a> {
        user: &'a str,
        attempts: u32,
        tags: Vec<&'a str>,
    }

    let value = to_value(&Login { user: "jo", attempts: 3, tags: vec!["a", "b"] }).unwrap();
    let decoded = roundtrip(value.clone());
    assert_eq!(decoded, value);
    assert_eq!(decoded.get("user").and_then(Value::as_str), Some("jo"));
}

#[test]
fn zero_and_empty_are_not_absent() {
    let response = decode(
        response_with("<value><int>0</int></value>").as_bytes(),
    ).unwrap();
    assert_eq!(response.params, vec![Value::Int(0)]);

    let response = decode(
        response_with("<value><string></string></value>").as_bytes(),
    ).unwrap();
    assert_eq!(response.params, vec![Value::String(String::new())]);
}

#[test]
fn boolean_decoding() {
    let decode_bool = |text: &str| {
        decode(response_with(&format!("<value><boolean>{}</boolean></value>", text)).as_bytes())
            .map(|response| response.params)
    };

    assert_eq!(decode_bool("1"), Ok(vec![Value::Bool(true)]));
    assert_eq!(decode_bool("0"), Ok(vec![Value::Bool(false)]));
    // only 0 and 1 are booleans
    assert!(decode_bool("true").is_err());
}

#[test]
fn wide_ints_in_int_tags() {
    let response = decode(response_with("<value><int>3000000000</int></value>").as_bytes()).unwrap();
    assert_eq!(response.params, vec![Value::Int(3_000_000_000)]);
}

#[test]
fn deeply_nested_response_is_an_error() {
    let depth = 2000;
    let body = response_with(&format!(
        "{}<value><int>1</int></value>{}",
        "<value><array><data>".repeat(depth),
        "</data></array></value>".repeat(depth),
    ));

    assert!(matches!(decode(body.as_bytes()), Err(ParseError::NestingTooDeep { .. })));

    let transport = Echo::new(&body);
    let err = call(&transport, "http://host/rpc", "nest", &[]).unwrap_err();
    assert!(matches!(err.parse_error(), Some(ParseError::NestingTooDeep { .. })));
}

#[test]
fn control_characters_are_not_sent() {
    let transport = Echo::new(&response_with("<value><int>1</int></value>"));
    let err = call(&transport, "http://host/rpc", "echo", &[Value::from("a\u{1}b")]).unwrap_err();
    assert!(!err.is_transport());
    assert!(transport.requests.borrow().is_empty());

    assert_eq!(
        encode("echo", &[Value::from("a\u{1}b")]),
        Err(EncodeError::InvalidXmlChar('\u{1}'))
    );
}
