use crate::error::{Error, ParseError};
use crate::{Fault, Value};

/// A decoded `<methodResponse>`.
///
/// Both sections are kept: a server that sends `<params>` *and* a `<fault>` is broken, but the
/// caller can still see everything it sent. Use [`into_result`](#method.into_result) to get the
/// usual fault-first interpretation.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct MethodResponse {
    /// One value per `<param>`, in document order.
    pub params: Vec<Value>,
    /// The `<fault>` value, if one was sent.
    pub fault: Option<Value>,
}

impl MethodResponse {
    /// Returns `true` if the server sent a `<fault>`.
    pub fn is_fault(&self) -> bool {
        self.fault.is_some()
    }

    /// Converts the response into the returned values, or an error if the server sent a fault.
    ///
    /// A fault always takes precedence over any `<params>` in the same response.
    ///
    /// # Errors
    ///
    /// If a fault is present and well-formed, the error carries the [`Fault`]. Otherwise it carries
    /// a [`ParseError::MalformedFault`].
    pub fn into_result(self) -> Result<Vec<Value>, Error> {
        match self.fault {
            Some(value) => match Fault::from_value(&value) {
                Some(fault) => Err(fault.into()),
                None => Err(ParseError::MalformedFault(value).into()),
            },
            None => Ok(self.params),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fault_takes_precedence() {
        let response = MethodResponse {
            params: vec![Value::from(5)],
            fault: Some(Fault::new(1, "bad".into()).to_value()),
        };
        assert!(response.is_fault());

        let err = response.into_result().unwrap_err();
        assert_eq!(err.fault(), Some(&Fault::new(1, "bad".into())));
    }

    #[test]
    fn malformed_fault_is_a_parse_error() {
        let response = MethodResponse {
            params: Vec::new(),
            fault: Some(Value::from("oops")),
        };

        let err = response.into_result().unwrap_err();
        assert!(err.fault().is_none());
        assert_eq!(err.parse_error(), Some(&ParseError::MalformedFault(Value::from("oops"))));
    }

    #[test]
    fn params_without_fault() {
        let response = MethodResponse {
            params: vec![Value::from(5), Value::from("x")],
            fault: None,
        };
        assert_eq!(response.into_result().unwrap(), vec![Value::Int(5), Value::from("x")]);
    }
}
