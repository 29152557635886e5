use crate::client::perform;
use crate::error::{EncodeError, Error};
use crate::transport::Transport;
use crate::utils::escape_xml;
use crate::Value;

use std::collections::BTreeMap;
use std::io::Write;

/// A request to call a procedure.
#[derive(Clone, Debug)]
pub struct Request<'a> {
    name: &'a str,
    args: Vec<Value>,
}

impl<'a> Request<'a> {
    /// Creates a new request to call a function named `name`.
    ///
    /// By default, no arguments are passed. Use the `arg` method to append arguments.
    pub fn new(name: &'a str) -> Self {
        Request {
            name,
            args: Vec::new(),
        }
    }

    /// Creates a `system.multicall` request that will call every request in `calls`.
    ///
    /// The server answers with an array holding, per call, either a one-element array with the
    /// result or a fault struct.
    pub fn new_multicall<'r, I>(calls: I) -> Self
    where
        'a: 'r,
        I: IntoIterator<Item = &'r Request<'a>>,
    {
        Request {
            name: "system.multicall",
            args: vec![Value::Array(
                calls
                    .into_iter()
                    .map(|call| call.clone().into_multicall_struct())
                    .collect(),
            )],
        }
    }

    /// Appends an argument to be passed to the current list of arguments.
    pub fn arg<T: Into<Value>>(mut self, value: T) -> Self {
        self.args.push(value.into());
        self
    }

    /// The name of the called method.
    pub fn name(&self) -> &str {
        self.name
    }

    /// The arguments appended so far.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Performs the request using a [`Transport`], POSTing it to `url`.
    ///
    /// # Errors
    ///
    /// Any errors that occur while sending the request using the [`Transport`] will be returned to
    /// the caller. Additionally, if the response is malformed, or indicates that the method call
    /// failed, an error will also be returned.
    ///
    /// [`Transport`]: trait.Transport.html
    pub fn call<T: Transport>(&self, transport: &T, url: &str) -> Result<Vec<Value>, Error> {
        perform(transport, url, self.name, &self.args)?.into_result()
    }

    /// Performs the request on a URL, using a default [`HttpTransport`].
    ///
    /// This method is only available when the `http` feature is enabled (this is the default).
    ///
    /// [`HttpTransport`]: http/struct.HttpTransport.html
    #[cfg(feature = "http")]
    pub fn call_url(&self, url: &str) -> Result<Vec<Value>, Error> {
        self.call(&crate::http::HttpTransport::new(), url)
    }

    /// Formats this `Request` as a UTF-8 encoded XML document.
    ///
    /// # Errors
    ///
    /// Fails if an argument cannot be expressed in XML-RPC, or if the writer reports an error.
    pub fn write_as_xml<W: Write>(&self, fmt: &mut W) -> Result<(), EncodeError> {
        write_method_call(fmt, self.name, &self.args)
    }

    /// Serialize this `Request` into an XML-RPC struct that can be passed to
    /// the [`system.multicall`](https://mirrors.talideon.com/articles/multicall.html)
    /// XML-RPC method, specifically a struct with two fields:
    ///
    /// * `methodName`: the request name
    /// * `params`: the request arguments
    pub fn into_multicall_struct(self) -> Value {
        let mut multicall_struct: BTreeMap<String, Value> = BTreeMap::new();

        multicall_struct.insert("methodName".into(), self.name.into());
        multicall_struct.insert("params".into(), Value::Array(self.args));

        Value::Struct(multicall_struct)
    }
}

fn write_method_call<W: Write>(fmt: &mut W, name: &str, args: &[Value]) -> Result<(), EncodeError> {
    write!(fmt, r#"<?xml version="1.0" encoding="utf-8"?>"#)?;
    write!(fmt, "<methodCall>")?;
    write!(fmt, "<methodName>{}</methodName>", escape_xml(name)?)?;
    write!(fmt, "<params>")?;
    for value in args {
        write!(fmt, "<param>")?;
        value.write_as_xml(fmt)?;
        write!(fmt, "</param>")?;
    }
    write!(fmt, "</params>")?;
    write!(fmt, "</methodCall>")?;
    Ok(())
}

/// Encodes a `<methodCall>` document calling `method` with `params`, in order.
///
/// # Errors
///
/// Returns an `EncodeError` if a parameter has no XML-RPC representation.
pub fn encode(method: &str, params: &[Value]) -> Result<String, EncodeError> {
    let mut body = Vec::new();
    write_method_call(&mut body, method, params)?;
    // Only ever written from `&str`s and formatted numbers
    String::from_utf8(body).map_err(|e| EncodeError::Custom(e.to_string()))
}
