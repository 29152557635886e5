//! Defines error types used by this library.

use crate::{Fault, Value};

use xml::common::TextPosition;
use xml::reader::Error as XmlError;

use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};
use std::io;

/// A boxed error returned by a [`Transport`](crate::Transport).
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// A value could not be written as XML-RPC.
///
/// XML-RPC can only express a small, fixed set of scalars. Values outside of that set are
/// rejected here instead of producing a request the server cannot read.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodeError {
    /// `NaN` and the infinities have no `<double>` representation.
    NonFiniteDouble(f64),

    /// The date/time cannot be written in the `yyyyMMddTHH:mm:ss` layout.
    UnsupportedDateTime(String),

    /// An integer does not fit into the signed 64-bit range.
    IntegerOutOfRange(String),

    /// A struct member name was not a string.
    KeyMustBeString,

    /// A string contains a character XML 1.0 does not allow, such as most control characters.
    InvalidXmlChar(char),

    /// A custom message, produced by a `Serialize` implementation.
    Custom(String),

    /// The underlying writer failed.
    Io(String),
}

impl From<io::Error> for EncodeError {
    fn from(e: io::Error) -> Self {
        EncodeError::Io(e.to_string())
    }
}

impl Display for EncodeError {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        match *self {
            EncodeError::NonFiniteDouble(d) => {
                write!(fmt, "cannot encode non-finite double {}", d)
            }
            EncodeError::UnsupportedDateTime(ref msg) => {
                write!(fmt, "cannot encode dateTime.iso8601: {}", msg)
            }
            EncodeError::IntegerOutOfRange(ref found) => {
                write!(fmt, "integer {} does not fit into 64 bits", found)
            }
            EncodeError::KeyMustBeString => write!(fmt, "struct member names must be strings"),
            EncodeError::InvalidXmlChar(c) => {
                write!(fmt, "character U+{:04X} is not allowed in XML", c as u32)
            }
            EncodeError::Custom(ref msg) => write!(fmt, "{}", msg),
            EncodeError::Io(ref msg) => write!(fmt, "I/O error while encoding: {}", msg),
        }
    }
}

impl StdError for EncodeError {}

/// Describes possible errors that can occur when parsing a response.
#[derive(Debug, PartialEq)]
pub enum ParseError {
    /// Error while parsing (malformed?) XML.
    XmlError(XmlError),

    /// Could not parse the given CDATA as XML-RPC value.
    ///
    /// For example, `<value><int>AAA</int></value>` describes an invalid value.
    InvalidValue {
        /// The type for which an invalid value was supplied (eg. `int` or `dateTime.iso8601`).
        for_type: &'static str,
        /// The value we encountered, as a string.
        found: String,
        /// The position of the invalid value inside the XML document.
        position: TextPosition,
    },

    /// Found an unexpected tag, attribute, etc.
    UnexpectedXml {
        /// A short description of the kind of data that was expected.
        expected: String,
        /// The data that was found instead, if there was any.
        found: Option<String>,
        /// The position of the unexpected data inside the XML document.
        position: TextPosition,
    },

    /// Arrays and structs are nested deeper than the parser allows.
    NestingTooDeep {
        /// The maximum number of nested arrays and structs.
        limit: usize,
        /// The position of the array or struct exceeding the limit.
        position: TextPosition,
    },

    /// The `<fault>` value is not a struct with an integer `faultCode` and a string
    /// `faultString`.
    MalformedFault(Value),
}

impl From<XmlError> for ParseError {
    fn from(e: XmlError) -> Self {
        ParseError::XmlError(e)
    }
}

impl From<io::Error> for ParseError {
    fn from(e: io::Error) -> Self {
        ParseError::XmlError(XmlError::from(e))
    }
}

impl Display for ParseError {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        match *self {
            ParseError::XmlError(ref err) => write!(fmt, "malformed XML: {}", err),
            ParseError::InvalidValue {
                for_type,
                ref found,
                ref position,
            } => write!(fmt, "invalid value for type '{}' at {}: {}", for_type, position, found),
            ParseError::UnexpectedXml {
                ref expected,
                ref position,
                found: None,
            } => {
                write!(fmt, "unexpected XML at {} (expected {})", position, expected)
            }
            ParseError::UnexpectedXml {
                ref expected,
                ref position,
                found: Some(ref found),
            } => {
                write!(fmt, "unexpected XML at {} (expected {}, found {})", position, expected, found)
            }
            ParseError::NestingTooDeep { limit, ref position } => {
                write!(fmt, "values nested deeper than {} levels at {}", limit, position)
            }
            ParseError::MalformedFault(ref value) => {
                write!(fmt, "malformed <fault> value: {:?}", value)
            }
        }
    }
}

impl StdError for ParseError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self {
            ParseError::XmlError(ref err) => Some(err),
            _ => None,
        }
    }
}

/// An error that can occur during a call.
///
/// This is either a lower-level error (for example, the HTTP request failed), a problem with the
/// server (maybe it's not implementing XML-RPC correctly), or a `<fault>` returned by the server.
#[derive(Debug)]
pub struct Error(Box<ErrorKind>);

#[derive(Debug)]
pub(crate) enum ErrorKind {
    /// The request parameters could not be encoded.
    Encode(EncodeError),

    /// Error while transmitting the request or receiving the response headers.
    Transport(BoxError),

    /// Error while reading the response body.
    Read(io::Error),

    /// The response could not be parsed.
    Parse(ParseError),

    /// The server returned a `<fault>`.
    Fault(Fault),
}

impl Error {
    pub(crate) fn new(kind: ErrorKind) -> Self {
        Error(Box::new(kind))
    }

    /// If this error was caused by the server responding with a `<fault>` response,
    /// returns the `Fault` in question.
    pub fn fault(&self) -> Option<&Fault> {
        match *self.0 {
            ErrorKind::Fault(ref fault) => Some(fault),
            _ => None,
        }
    }

    /// Returns the `ParseError` if the response could not be decoded.
    pub fn parse_error(&self) -> Option<&ParseError> {
        match *self.0 {
            ErrorKind::Parse(ref err) => Some(err),
            _ => None,
        }
    }

    /// Returns `true` if the request could not be delivered or the response could not be read.
    pub fn is_transport(&self) -> bool {
        matches!(*self.0, ErrorKind::Transport(_) | ErrorKind::Read(_))
    }
}

impl From<EncodeError> for Error {
    fn from(e: EncodeError) -> Self {
        Error::new(ErrorKind::Encode(e))
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::new(ErrorKind::Parse(e))
    }
}

impl From<Fault> for Error {
    fn from(fault: Fault) -> Self {
        Error::new(ErrorKind::Fault(fault))
    }
}

impl Display for Error {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        match *self.0 {
            ErrorKind::Encode(ref err) => write!(fmt, "encode error: {}", err),
            ErrorKind::Transport(ref err) => write!(fmt, "transport error: {}", err),
            ErrorKind::Read(ref err) => write!(fmt, "could not read response: {}", err),
            ErrorKind::Parse(ref err) => write!(fmt, "parse error: {}", err),
            ErrorKind::Fault(ref fault) => write!(fmt, "server fault: {}", fault),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self.0 {
            ErrorKind::Encode(ref err) => Some(err),
            ErrorKind::Transport(ref err) => Some(&**err),
            ErrorKind::Read(ref err) => Some(err),
            ErrorKind::Parse(ref err) => Some(err),
            ErrorKind::Fault(ref err) => Some(err),
        }
    }
}
