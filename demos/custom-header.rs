//! This example shows how to transmit a request with a custom HTTP header.

use xmlrpc_client::http::{build_headers, check_response, DEFAULT_USER_AGENT};
use xmlrpc_client::{BoxError, Request, Transport};

use reqwest::blocking::{Client, Response};
use reqwest::header::COOKIE;

/// Custom transport that adds a cookie header.
struct MyTransport(Client);

impl Transport for MyTransport {
    type Stream = Response;

    fn transmit(&self, url: &str, content_type: &str, body: Vec<u8>) -> Result<Self::Stream, BoxError> {
        let response = build_headers(self.0.post(url), DEFAULT_USER_AGENT, content_type, body.len() as u64)
            .header(COOKIE, "SESSION=123abc") // Our custom header will be a `Cookie` header
            .body(body)
            .send()?;

        check_response(&response)?;

        Ok(response)
    }
}

fn main() {
    let request = Request::new("pow").arg(2).arg(8);

    let tp = MyTransport(Client::new());
    let result = request.call(&tp, "http://localhost/target");

    println!("Result: {:?}", result);
}
