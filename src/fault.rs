use crate::Value;

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// A `<fault>` response, indicating that a request failed.
///
/// The XML-RPC specification requires that a `<faultCode>` and `<faultString>` is returned in the
/// `<fault>` case, further describing the error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fault {
    /// `faultCode` received from the server.
    code: i32,
    /// `faultString` received from the server.
    string: String,
}

impl Fault {
    /// Creates a new `Fault` from an error code and a message.
    pub fn new(code: i32, string: String) -> Fault {
        Fault { code, string }
    }

    /// Returns the fault code.
    ///
    /// The meaning of this code is not specified by XML-RPC and depends on the service you are
    /// using.
    pub fn code(&self) -> i32 {
        self.code
    }

    /// Returns the error message sent by the server.
    pub fn string(&self) -> &str {
        &self.string
    }

    /// Creates a `Fault` from a `Value`.
    ///
    /// The `Value` must be a `Value::Struct` with an integer `faultCode` and a string
    /// `faultString` field. Additional members are ignored, since some servers send them even
    /// though XML-RPC does not allow it.
    ///
    /// Returns `None` if the value isn't a valid `Fault`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match (value.get("faultCode"), value.get("faultString")) {
            (Some(&Value::Int(code)), Some(&Value::String(ref string))) => {
                let code = i32::try_from(code).ok()?;
                Some(Fault::new(code, string.clone()))
            }
            _ => None,
        }
    }

    /// Turns this `Fault` into an equivalent `Value`.
    ///
    /// The returned value can be parsed back into a `Fault` using `Fault::from_value`.
    pub fn to_value(&self) -> Value {
        let mut map = BTreeMap::new();
        map.insert("faultCode".to_string(), Value::from(self.code));
        map.insert("faultString".to_string(), Value::from(self.string.as_str()));

        Value::Struct(map)
    }
}

impl Display for Fault {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.string, self.code)
    }
}

impl Error for Fault {}
