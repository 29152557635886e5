use crate::error::BoxError;

use std::io::Read;

/// The `Content-Type` XML-RPC requests are sent with.
pub const CONTENT_TYPE: &str = "text/xml";

/// Request and response transport abstraction.
///
/// The `Transport` trait is the only way this library talks to the outside world: it POSTs an
/// encoded request body to a URL and hands back the response body. A `Transport` implementor is
/// passed to [`Client::with_transport`] or [`Request::call`].
///
/// The most commonly used transport is simple HTTP: If the `http` feature is enabled (it is by
/// default), [`HttpTransport`] sends the request using reqwest.
///
/// You can implement this trait for your own types if you want to customize how requests are sent.
/// You can modify HTTP headers or wrap requests in a completely different protocol.
///
/// [`Client::with_transport`]: struct.Client.html#method.with_transport
/// [`Request::call`]: struct.Request.html#method.call
/// [`HttpTransport`]: http/struct.HttpTransport.html
pub trait Transport {
    /// The response stream returned by `transmit`.
    type Stream: Read;

    /// POSTs `body` with the given `content_type` to `url` and returns the response body.
    ///
    /// The library will read all of the data and parse it as a response. It must be UTF-8 encoded
    /// XML, otherwise the call will fail. The stream is dropped as soon as it has been read.
    ///
    /// # Errors
    ///
    /// If a transport error occurs, it should be returned as a boxed error - the library will then
    /// return an appropriate [`Error`] to the caller.
    ///
    /// [`Error`]: struct.Error.html
    fn transmit(&self, url: &str, content_type: &str, body: Vec<u8>) -> Result<Self::Stream, BoxError>;
}

impl<'a, T: Transport + ?Sized> Transport for &'a T {
    type Stream = T::Stream;

    fn transmit(&self, url: &str, content_type: &str, body: Vec<u8>) -> Result<Self::Stream, BoxError> {
        (**self).transmit(url, content_type, body)
    }
}

/// Provides an HTTP [`Transport`] and helpers for implementing custom ones using reqwest.
///
/// This module will be disabled if the `http` feature is not enabled.
///
/// [`HttpTransport`] looks roughly like this:
///
/// ```notrust
/// // `body` is the encoded request
///
/// let builder = build_headers(client.post(url), user_agent, content_type, body.len());
///
/// // send `body` using `builder` and get response
///
/// check_response(&response)?;
/// ```
///
/// From this, you can build your own custom transports.
///
/// [`Transport`]: ../trait.Transport.html
#[cfg(feature = "http")]
pub mod http {
    use crate::error::BoxError;
    use crate::Transport;

    use reqwest::blocking::{Client, RequestBuilder, Response};
    use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, USER_AGENT};
    use tracing::trace;

    use std::time::Duration;

    /// The `User-Agent` sent unless configured otherwise.
    pub const DEFAULT_USER_AGENT: &str = concat!("Rust xmlrpc-client/", env!("CARGO_PKG_VERSION"));

    /// Appends all HTTP headers required by the XML-RPC specification to the `RequestBuilder`.
    ///
    /// More specifically, the following headers are set:
    ///
    /// ```notrust
    /// User-Agent: $user_agent
    /// Content-Type: $content_type
    /// Content-Length: $body_len
    /// ```
    pub fn build_headers(
        builder: RequestBuilder,
        user_agent: &str,
        content_type: &str,
        body_len: u64,
    ) -> RequestBuilder {
        // NB: The `Host` header is also required, but reqwest adds it automatically, since
        // HTTP/1.1 requires it.
        builder
            .header(USER_AGENT, user_agent)
            .header(CONTENT_TYPE, content_type)
            .header(CONTENT_LENGTH, body_len.to_string())
    }

    /// Checks that a reqwest `Response` has a status code indicating success and, if it declares
    /// a `Content-Type`, that it is `text/xml`.
    pub fn check_response(response: &Response) -> Result<(), BoxError> {
        // This is essentially an open-coded version of `Response::error_for_status` that does not
        // consume the response.
        if response.status().is_client_error() || response.status().is_server_error() {
            return Err(format!("server response indicates error: {}", response.status()).into());
        }

        // "The Content-Type is text/xml."
        if let Some(content) = response.headers().get(CONTENT_TYPE) {
            // (we ignore this if the header is missing completely)
            let content = content.to_str()?.parse::<mime::Mime>()?;
            if content.type_() != mime::TEXT || content.subtype() != mime::XML {
                return Err(format!(
                    "expected Content-Type 'text/xml', got '{}/{}'", content.type_(), content.subtype()
                ).into());
            }
        }

        Ok(())
    }

    /// Sends requests as HTTP POST using a blocking reqwest `Client`.
    ///
    /// By default, no timeout is applied and a hung server blocks the call indefinitely. Use
    /// [`timeout`](#method.timeout) to bound the time a call may take.
    #[derive(Clone, Debug)]
    pub struct HttpTransport {
        client: Client,
        user_agent: String,
        timeout: Option<Duration>,
    }

    impl HttpTransport {
        /// Creates a transport with a fresh reqwest `Client`.
        pub fn new() -> Self {
            HttpTransport::with_client(Client::new())
        }

        /// Creates a transport sending requests with an existing reqwest `Client`.
        pub fn with_client(client: Client) -> Self {
            HttpTransport {
                client,
                user_agent: DEFAULT_USER_AGENT.to_string(),
                timeout: None,
            }
        }

        /// Sets the `User-Agent` header sent with every request.
        pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
            self.user_agent = user_agent.into();
            self
        }

        /// Sets a timeout for the whole request, from connecting until the body has been read.
        pub fn timeout(mut self, timeout: Duration) -> Self {
            self.timeout = Some(timeout);
            self
        }
    }

    impl Default for HttpTransport {
        fn default() -> Self {
            HttpTransport::new()
        }
    }

    /// The request will be sent as specified in the XML-RPC specification: A `User-Agent` will be
    /// set, along with the correct `Content-Type` and `Content-Length`.
    impl Transport for HttpTransport {
        type Stream = Response;

        fn transmit(&self, url: &str, content_type: &str, body: Vec<u8>) -> Result<Self::Stream, BoxError> {
            let mut builder = build_headers(
                self.client.post(url),
                &self.user_agent,
                content_type,
                body.len() as u64,
            );
            if let Some(timeout) = self.timeout {
                builder = builder.timeout(timeout);
            }

            let response = builder.body(body).send()?;
            trace!(status = %response.status(), url, "received HTTP response");

            check_response(&response)?;

            Ok(response)
        }
    }
}
