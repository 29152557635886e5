//! Contains the different types of values understood by XML-RPC.

use crate::error::EncodeError;
use crate::utils::{escape_xml, format_datetime};

use base64::encode;
use iso8601::DateTime;

use std::collections::{BTreeMap, HashMap};
use std::io::Write;

/// The possible XML-RPC values.
///
/// Every variant corresponds to exactly one element of the `<value>` grammar, so the kind of a
/// decoded value is determined by the element the server sent, not by the content of its text.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// `<i4>`, `<int>` or `<i8>`, a signed integer.
    ///
    /// Values outside of the 32-bit range are written as `<i8>`, an extension that may not be
    /// supported by all servers.
    Int(i64),
    /// `<boolean>`, 0 == `false`, 1 == `true`.
    Bool(bool),
    /// `<string>`, usually used for text.
    String(String),
    /// `<double>`
    Double(f64),
    /// `<dateTime.iso8601>`, a date/time in the `yyyyMMddTHH:mm:ss` layout.
    DateTime(DateTime),
    /// `<base64>`, base64-encoded binary data.
    Base64(Vec<u8>),

    /// `<struct>`, a mapping of named values.
    ///
    /// When a struct repeats a member name, the last occurrence wins.
    Struct(BTreeMap<String, Value>),
    /// `<array>`, a list of arbitrary (heterogeneous) values.
    Array(Vec<Value>),

    /// `<nil/>`, the empty (Unit) value.
    ///
    /// This is an XMLRPC [extension][ext] and may not be supported by all clients / servers.
    ///
    /// [ext]: https://web.archive.org/web/20050911054235/http://ontosys.com/xml-rpc/extensions.php
    Nil,
}

impl Value {
    /// Returns the integer if `self` is a `Value::Int`.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Int(i) => Some(i),
            _ => None,
        }
    }

    /// Returns the integer if `self` is a `Value::Int` that fits into an `i32`.
    pub fn as_i32(&self) -> Option<i32> {
        self.as_i64().and_then(|i| i32::try_from(i).ok())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match *self {
            Value::String(ref s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Double(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime> {
        match *self {
            Value::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match *self {
            Value::Base64(ref data) => Some(data),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match *self {
            Value::Array(ref array) => Some(array),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&BTreeMap<String, Value>> {
        match *self {
            Value::Struct(ref map) => Some(map),
            _ => None,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(*self, Value::Nil)
    }

    /// Looks up a member of a `<struct>`.
    ///
    /// Returns `None` if `self` is not a struct or has no member called `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.as_struct().and_then(|map| map.get(name))
    }

    /// Formats this `Value` as an XML `<value>` element.
    ///
    /// # Errors
    ///
    /// Fails on values XML-RPC cannot express (non-finite doubles, date/times that don't fit the
    /// `<dateTime.iso8601>` layout, strings with characters XML forbids) and on errors reported by
    /// the writer. Nothing is guaranteed
    /// about the state of `fmt` after an error.
    pub fn write_as_xml<W: Write>(&self, fmt: &mut W) -> Result<(), EncodeError> {
        write!(fmt, "<value>")?;

        match *self {
            Value::Int(i) => {
                if i32::try_from(i).is_ok() {
                    write!(fmt, "<int>{}</int>", i)?;
                } else {
                    write!(fmt, "<i8>{}</i8>", i)?;
                }
            }
            Value::Bool(b) => {
                write!(fmt, "<boolean>{}</boolean>", if b { "1" } else { "0" })?;
            }
            Value::String(ref s) => {
                write!(fmt, "<string>{}</string>", escape_xml(s)?)?;
            }
            Value::Double(d) => {
                if !d.is_finite() {
                    return Err(EncodeError::NonFiniteDouble(d));
                }
                // `Display` for floats never uses exponent notation, which XML-RPC forbids.
                write!(fmt, "<double>{}</double>", d)?;
            }
            Value::DateTime(ref date_time) => {
                write!(fmt, "<dateTime.iso8601>{}</dateTime.iso8601>", format_datetime(date_time)?)?;
            }
            Value::Base64(ref data) => {
                write!(fmt, "<base64>{}</base64>", encode(data))?;
            }
            Value::Struct(ref map) => {
                write!(fmt, "<struct>")?;
                for (name, value) in map {
                    write!(fmt, "<member><name>{}</name>", escape_xml(name)?)?;
                    value.write_as_xml(fmt)?;
                    write!(fmt, "</member>")?;
                }
                write!(fmt, "</struct>")?;
            }
            Value::Array(ref array) => {
                write!(fmt, "<array><data>")?;
                for value in array {
                    value.write_as_xml(fmt)?;
                }
                write!(fmt, "</data></array>")?;
            }
            Value::Nil => {
                write!(fmt, "<nil/>")?;
            }
        }

        write!(fmt, "</value>")?;
        Ok(())
    }
}

macro_rules! from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(other: $t) -> Self {
                    Value::Int(other.into())
                }
            }
        )*
    };
}

from_int!(i8, i16, i32, i64, u8, u16, u32);

impl TryFrom<u64> for Value {
    type Error = EncodeError;

    fn try_from(other: u64) -> Result<Self, EncodeError> {
        i64::try_from(other)
            .map(Value::Int)
            .map_err(|_| EncodeError::IntegerOutOfRange(other.to_string()))
    }
}

impl TryFrom<usize> for Value {
    type Error = EncodeError;

    fn try_from(other: usize) -> Result<Self, EncodeError> {
        i64::try_from(other)
            .map(Value::Int)
            .map_err(|_| EncodeError::IntegerOutOfRange(other.to_string()))
    }
}

impl From<bool> for Value {
    fn from(other: bool) -> Self {
        Value::Bool(other)
    }
}

impl From<String> for Value {
    fn from(other: String) -> Self {
        Value::String(other)
    }
}

impl<'a> From<&'a str> for Value {
    fn from(other: &'a str) -> Self {
        Value::String(other.to_string())
    }
}

impl From<f32> for Value {
    fn from(other: f32) -> Self {
        Value::Double(other.into())
    }
}

impl From<f64> for Value {
    fn from(other: f64) -> Self {
        Value::Double(other)
    }
}

impl From<DateTime> for Value {
    fn from(other: DateTime) -> Self {
        Value::DateTime(other)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(other: Option<T>) -> Self {
        other.map_or(Value::Nil, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(other: Vec<T>) -> Self {
        Value::Array(other.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<String>, V: Into<Value>> From<BTreeMap<K, V>> for Value {
    fn from(other: BTreeMap<K, V>) -> Self {
        other.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<Value>, S> From<HashMap<K, V, S>> for Value {
    fn from(other: HashMap<K, V, S>) -> Self {
        other.into_iter().collect()
    }
}

/// Collects name/value pairs into a `Value::Struct`.
impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Struct(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str;

    fn xml(value: &Value) -> String {
        let mut output: Vec<u8> = Vec::new();
        value.write_as_xml(&mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn escapes_strings() {
        assert_eq!(xml(&Value::from("<xml&nbsp;string")), "<value><string>&lt;xml&amp;nbsp;string</string></value>");
    }

    #[test]
    fn escapes_struct_member_names() {
        let mut map: BTreeMap<String, Value> = BTreeMap::new();
        map.insert("x&<x".to_string(), Value::from(true));

        assert_eq!(
            xml(&Value::Struct(map)),
            "<value><struct><member><name>x&amp;&lt;x</name><value><boolean>1</boolean></value></member></struct></value>"
        );
    }

    #[test]
    fn rejects_control_characters() {
        let mut output: Vec<u8> = Vec::new();
        assert_eq!(
            Value::from("a\u{1}b").write_as_xml(&mut output),
            Err(EncodeError::InvalidXmlChar('\u{1}'))
        );

        let mut map: BTreeMap<String, Value> = BTreeMap::new();
        map.insert("bell\u{7}".to_string(), Value::from(1));
        assert_eq!(
            Value::Struct(map).write_as_xml(&mut Vec::new()),
            Err(EncodeError::InvalidXmlChar('\u{7}'))
        );
    }

    #[test]
    fn writes_scalars() {
        assert_eq!(xml(&Value::from(5)), "<value><int>5</int></value>");
        assert_eq!(xml(&Value::from(0u8)), "<value><int>0</int></value>");
        assert_eq!(xml(&Value::from(-3_000_000_000i64)), "<value><i8>-3000000000</i8></value>");
        assert_eq!(xml(&Value::from(false)), "<value><boolean>0</boolean></value>");
        assert_eq!(xml(&Value::from(2.5)), "<value><double>2.5</double></value>");
        assert_eq!(xml(&Value::from(1e21)), "<value><double>1000000000000000000000</double></value>");
        assert_eq!(xml(&Value::Base64(b"hi".to_vec())), "<value><base64>aGk=</base64></value>");
        assert_eq!(xml(&Value::Nil), "<value><nil/></value>");
        assert_eq!(xml(&Value::from("")), "<value><string></string></value>");
    }

    #[test]
    fn writes_datetimes() {
        let date_time = iso8601::datetime("19980717T14:08:55").unwrap();
        assert_eq!(
            xml(&Value::from(date_time)),
            "<value><dateTime.iso8601>19980717T14:08:55</dateTime.iso8601></value>"
        );
    }

    #[test]
    fn writes_containers() {
        let array = Value::from(vec![Value::from(1), Value::from("a")]);
        assert_eq!(
            xml(&array),
            "<value><array><data><value><int>1</int></value><value><string>a</string></value></data></array></value>"
        );

        let nested: Value = vec![("inner", Value::Array(Vec::new()))].into_iter().collect();
        assert_eq!(
            xml(&nested),
            "<value><struct><member><name>inner</name><value><array><data></data></array></value></member></struct></value>"
        );
    }

    #[test]
    fn rejects_non_finite_doubles() {
        let mut output = Vec::new();
        assert_eq!(
            Value::from(f64::INFINITY).write_as_xml(&mut output),
            Err(EncodeError::NonFiniteDouble(f64::INFINITY))
        );

        let nested = Value::from(vec![Value::from(1), Value::from(f64::NAN)]);
        assert!(nested.write_as_xml(&mut Vec::new()).is_err());
    }

    #[test]
    fn rejects_oversized_unsigned() {
        assert_eq!(Value::try_from(7u64), Ok(Value::Int(7)));
        assert_eq!(
            Value::try_from(u64::MAX),
            Err(EncodeError::IntegerOutOfRange(u64::MAX.to_string()))
        );
    }

    #[test]
    fn converts_collections() {
        let mut map = HashMap::new();
        map.insert("a", 1);
        map.insert("b", 2);
        let value = Value::from(map);
        assert_eq!(value.get("a"), Some(&Value::Int(1)));
        assert_eq!(value.get("b").and_then(Value::as_i64), Some(2));
        assert_eq!(value.get("c"), None);

        assert_eq!(Value::from(None::<i32>), Value::Nil);
        assert_eq!(Value::from(Some("x")).as_str(), Some("x"));
        assert_eq!(Value::from(vec![1, 2]).as_array().map(<[Value]>::len), Some(2));
    }

    #[test]
    fn accessors() {
        assert_eq!(Value::Int(1 << 40).as_i32(), None);
        assert_eq!(Value::Int(-7).as_i32(), Some(-7));
        assert_eq!(Value::Bool(true).as_i64(), None);
        assert!(Value::Nil.is_nil());
        assert_eq!(str::from_utf8(Value::Base64(b"ab".to_vec()).as_bytes().unwrap()), Ok("ab"));
    }
}
