//! Sends calls through a `Transport` and decodes the replies.

use crate::error::{Error, ErrorKind};
use crate::parser::parse_response;
use crate::request::encode;
use crate::transport::{Transport, CONTENT_TYPE};
use crate::{MethodResponse, Value};

use tracing::debug;

use std::io::Read;

/// Everything a call produced.
///
/// `results` and `fault` are decoded independently. If `fault` is set, it is authoritative even
/// when `results` is not empty; [`into_result`](#method.into_result) applies that rule.
#[derive(Clone, Debug, PartialEq)]
pub struct Reply {
    /// One value per returned `<param>`.
    pub results: Vec<Value>,
    /// The `<fault>` value, if the server sent one.
    pub fault: Option<Value>,
    /// The request document that was sent, for diagnostics.
    pub request: String,
}

impl Reply {
    /// Returns the results, or an error carrying the fault if the server sent one.
    pub fn into_result(self) -> Result<Vec<Value>, Error> {
        MethodResponse {
            params: self.results,
            fault: self.fault,
        }
        .into_result()
    }
}

/// Encodes the call, transmits it and decodes the response.
///
/// The response stream is read to the end and dropped before decoding starts.
pub(crate) fn perform<T: Transport>(
    transport: &T,
    url: &str,
    method: &str,
    params: &[Value],
) -> Result<Reply, Error> {
    let request = encode(method, params)?;
    debug!(method, url, bytes = request.len(), "sending XML-RPC call");

    let body = {
        let mut stream = transport
            .transmit(url, CONTENT_TYPE, request.clone().into_bytes())
            .map_err(|e| Error::new(ErrorKind::Transport(e)))?;

        let mut body = Vec::new();
        stream
            .read_to_end(&mut body)
            .map_err(|e| Error::new(ErrorKind::Read(e)))?;
        body
    };
    debug!(method, bytes = body.len(), "received XML-RPC response");

    let response = parse_response(&body[..])?;
    if let Some(ref fault) = response.fault {
        debug!(method, code = ?fault.get("faultCode"), "server returned a fault");
    }

    Ok(Reply {
        results: response.params,
        fault: response.fault,
        request,
    })
}

/// An XML-RPC client bound to one endpoint.
///
/// The client holds no state besides its transport; every call is independent, so a `Client`
/// can be shared between threads if its transport allows it.
#[derive(Clone, Debug)]
pub struct Client<T> {
    url: String,
    transport: T,
}

impl<T: Transport> Client<T> {
    /// Creates a client sending requests to `url` through `transport`.
    pub fn with_transport<U: Into<String>>(url: U, transport: T) -> Self {
        Client {
            url: url.into(),
            transport,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Calls `method` with `params`.
    ///
    /// A `<fault>` sent by the server is *not* an error here; it is returned in
    /// [`Reply::fault`](struct.Reply.html#structfield.fault).
    ///
    /// # Errors
    ///
    /// Fails if a parameter cannot be encoded, the transport fails, the response body cannot be
    /// read, or the response is not valid XML-RPC. Nothing is retried.
    pub fn call(&self, method: &str, params: &[Value]) -> Result<Reply, Error> {
        perform(&self.transport, &self.url, method, params)
    }

    /// Calls `method` with `params` and returns the results, turning a fault into an error.
    pub fn invoke(&self, method: &str, params: &[Value]) -> Result<Vec<Value>, Error> {
        self.call(method, params)?.into_result()
    }
}

#[cfg(feature = "http")]
impl Client<crate::http::HttpTransport> {
    /// Creates a client sending requests to `url` via HTTP.
    pub fn new<U: Into<String>>(url: U) -> Self {
        Client::with_transport(url, crate::http::HttpTransport::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::Fault;

    use std::cell::RefCell;
    use std::io::{self, Cursor};

    /// Replies with a fixed body and remembers what was sent.
    struct Canned {
        response: &'static str,
        sent: RefCell<Vec<(String, String, String)>>,
    }

    impl Canned {
        fn new(response: &'static str) -> Self {
            Canned { response, sent: RefCell::new(Vec::new()) }
        }
    }

    impl Transport for Canned {
        type Stream = Cursor<&'static [u8]>;

        fn transmit(&self, url: &str, content_type: &str, body: Vec<u8>) -> Result<Self::Stream, BoxError> {
            self.sent.borrow_mut().push((url.into(), content_type.into(), String::from_utf8(body)?));
            Ok(Cursor::new(self.response.as_bytes()))
        }
    }

    struct Refused;

    impl Transport for Refused {
        type Stream = io::Empty;

        fn transmit(&self, _: &str, _: &str, _: Vec<u8>) -> Result<Self::Stream, BoxError> {
            Err("connection refused".into())
        }
    }

    /// Fails while the body is being read.
    struct BrokenBody;

    impl Read for BrokenBody {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
        }
    }

    impl Transport for BrokenBody {
        type Stream = BrokenBody;

        fn transmit(&self, _: &str, _: &str, _: Vec<u8>) -> Result<Self::Stream, BoxError> {
            Ok(BrokenBody)
        }
    }

    const SUM: &str = "<methodResponse><params><param><value><int>5</int></value></param></params></methodResponse>";

    #[test]
    fn sends_request_and_decodes_results() {
        let transport = Canned::new(SUM);
        let client = Client::with_transport("http://host/rpc", &transport);

        let reply = client.call("add", &[Value::from(2), Value::from(3)]).unwrap();
        assert_eq!(reply.results, vec![Value::Int(5)]);
        assert_eq!(reply.fault, None);

        let sent = transport.sent.borrow();
        assert_eq!(sent.len(), 1);
        let (ref url, ref content_type, ref body) = sent[0];
        assert_eq!(url, "http://host/rpc");
        assert_eq!(content_type, "text/xml");
        assert_eq!(body, &reply.request);
        assert!(body.contains("<methodName>add</methodName>"));
    }

    #[test]
    fn transport_errors_are_returned() {
        let client = Client::with_transport("http://host/rpc", Refused);
        let err = client.call("add", &[]).unwrap_err();
        assert!(err.is_transport());
        assert_eq!(err.to_string(), "transport error: connection refused");
    }

    #[test]
    fn read_errors_are_returned() {
        let client = Client::with_transport("http://host/rpc", BrokenBody);
        let err = client.call("add", &[]).unwrap_err();
        assert!(err.is_transport());
    }

    #[test]
    fn encode_errors_skip_the_transport() {
        let transport = Canned::new(SUM);
        let client = Client::with_transport("http://host/rpc", &transport);
        assert!(client.call("f", &[Value::from(f64::NAN)]).is_err());
        assert!(transport.sent.borrow().is_empty());
    }

    #[test]
    fn invoke_turns_faults_into_errors() {
        let transport = Canned::new(
            "<methodResponse><fault><value><struct>\
             <member><name>faultCode</name><value><int>1</int></value></member>\
             <member><name>faultString</name><value><string>bad</string></value></member>\
             </struct></value></fault></methodResponse>",
        );
        let client = Client::with_transport("http://host/rpc", transport);

        let err = client.invoke("add", &[]).unwrap_err();
        assert_eq!(err.fault(), Some(&Fault::new(1, "bad".into())));
    }
}
