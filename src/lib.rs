//! A small XML-RPC client.
//!
//! The `xmlrpc_client` crate encodes a method name and its parameters as an XML-RPC
//! `<methodCall>`, sends it through a [`Transport`] (HTTP by default) and decodes the
//! `<methodResponse>` into [`Value`]s and an optional fault. It implements the
//! [XML-RPC spec][spec] plus the `<nil/>` and `<i8>` extensions.
//!
//! ```no_run
//! use xmlrpc_client::{Client, Value};
//!
//! let client = Client::new("http://127.0.0.1:8000");
//! let reply = client.call("pow", &[Value::from(2), Value::from(8)])?;
//! assert_eq!(reply.fault, None);
//! assert_eq!(reply.results, vec![Value::Int(256)]);
//! # Ok::<(), xmlrpc_client::Error>(())
//! ```
//!
//! The codec can also be used on its own: [`encode`] produces the request document and
//! [`decode`] parses a response body.
//!
//! [spec]: http://xmlrpc.scripting.com/spec.html

#![doc(html_root_url = "https://docs.rs/xmlrpc-client/0.1.0")]

mod client;
mod error;
mod fault;
mod parser;
mod request;
mod response;
mod ser;
mod transport;
mod utils;
mod value;

pub use client::{Client, Reply};
pub use error::{BoxError, EncodeError, Error, ParseError};
pub use fault::Fault;
pub use request::{encode, Request};
pub use response::MethodResponse;
pub use ser::to_value;
pub use transport::{Transport, CONTENT_TYPE};
pub use value::Value;

#[cfg(feature = "http")]
pub use transport::http;

/// Decodes a `<methodResponse>` document.
///
/// Both the `<params>` and the `<fault>` section are returned as found; see
/// [`MethodResponse::into_result`] for the fault-first interpretation.
///
/// # Errors
///
/// Any malformed XML, unexpected element or unparsable scalar (for example `<int>abc</int>`)
/// results in a `ParseError`; nothing is silently replaced by a default value.
pub fn decode(body: &[u8]) -> Result<MethodResponse, ParseError> {
    parser::parse_response(body)
}

/// Calls `method` with `params` on the endpoint at `url`, using `transport`.
///
/// See [`Client::call`] for details.
pub fn call<T: Transport>(transport: &T, url: &str, method: &str, params: &[Value]) -> Result<Reply, Error> {
    client::perform(transport, url, method, params)
}

/// Calls `method` with `params` on the endpoint at `url` via HTTP.
///
/// This is a convenience wrapper creating a fresh [`http::HttpTransport`] for the call.
#[cfg(feature = "http")]
pub fn call_url(url: &str, method: &str, params: &[Value]) -> Result<Reply, Error> {
    call(&http::HttpTransport::new(), url, method, params)
}
