//! Serialization support via serde.
//!
//! Any `Serialize` type, including user-defined structs and maps, can be turned into a [`Value`]
//! with [`to_value`]. Data XML-RPC cannot express is rejected with an [`EncodeError`].

#![allow(missing_debug_implementations)]   // mostly useless for all the serializers in here

use crate::error::EncodeError;
use crate::utils::format_datetime;
use crate::Value;

use serde::ser::{self, Error as _, Serialize};

use std::collections::BTreeMap;
use std::fmt::Display;
use std::iter;

impl ser::Error for EncodeError {
    fn custom<T>(msg: T) -> Self where T: Display {
        EncodeError::Custom(msg.to_string())
    }
}

/// `Value::DateTime` is written in its `<dateTime.iso8601>` text form.
impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error> where
        S: ser::Serializer {

        match *self {
            Value::Int(i) => serializer.serialize_i64(i),
            Value::Bool(b) => serializer.serialize_bool(b),
            Value::String(ref s) => serializer.serialize_str(s),
            Value::Double(f) => serializer.serialize_f64(f),
            Value::DateTime(ref date_time) => {
                let text = format_datetime(date_time).map_err(S::Error::custom)?;
                serializer.serialize_str(&text)
            }
            Value::Base64(ref bytes) => serializer.serialize_bytes(bytes),
            Value::Struct(ref map) => map.serialize(serializer),
            Value::Array(ref values) => values.serialize(serializer),
            Value::Nil => serializer.serialize_unit(),
        }
    }
}

/// Converts any `Serialize` type into a `Value`.
///
/// Maps and structs become `<struct>`s, sequences and tuples become `<array>`s, `None` and unit
/// become `<nil/>`. Enum variants carrying data become a struct with a single member named after
/// the variant, like serde_json does.
///
/// # Errors
///
/// Fails on `u64`s above `i64::MAX`, 128-bit integers, and maps whose keys are not strings.
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    value.serialize(Serializer)
}

type Result<T> = ::std::result::Result<T, EncodeError>;

/// A serializer that produces a `Value`.
struct Serializer;

impl ser::Serializer for Serializer {
    type Ok = Value;
    type Error = EncodeError;
    type SerializeSeq = SerializeArray;
    type SerializeTuple = SerializeArray;
    type SerializeTupleStruct = SerializeArray;
    type SerializeTupleVariant = SerializeTupleVariant;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeStructVariant;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::Int(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        // half of all u64s can't be expressed; reject those instead of wrapping
        Value::try_from(v)
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(Value::Double(v))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(Value::Base64(v.into()))
    }

    fn serialize_none(self) -> Result<Value> {
        // do the same thing serde_json does
        self.serialize_unit()
    }

    fn serialize_some<T: ?Sized>(self, value: &T) -> Result<Value> where
        T: Serialize {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Nil)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        self.serialize_unit()
    }

    fn serialize_unit_variant(self, _name: &'static str, _variant_index: u32, variant: &'static str) -> Result<Value> {
        self.serialize_str(variant)
    }

    fn serialize_newtype_struct<T: ?Sized>(self, _name: &'static str, value: &T) -> Result<Value> where
        T: Serialize {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized>(self, _name: &'static str, _variant_index: u32, variant: &'static str, value: &T) -> Result<Value> where
        T: Serialize {
        // we mimic serde_json/serde-yaml here and create a struct with a single KV pair
        let value = to_value(value)?;

        Ok(Value::Struct(iter::once((variant.to_string(), value)).collect()))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeArray> {
        Ok(SerializeArray {
            array: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeArray> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeArray> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(self, _name: &'static str, _variant_index: u32, variant: &'static str, len: usize) -> Result<SerializeTupleVariant> {
        Ok(SerializeTupleVariant {
            name: variant,
            values: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap {
            next_key: None,
            map: BTreeMap::new(),
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<SerializeMap> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(self, _name: &'static str, _variant_index: u32, variant: &'static str, _len: usize) -> Result<SerializeStructVariant> {
        Ok(SerializeStructVariant {
            variant,
            fields: BTreeMap::new(),
        })
    }
}

pub struct SerializeArray {
    array: Vec<Value>,
}

impl ser::SerializeSeq for SerializeArray {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_element<T: ?Sized>(&mut self, value: &T) -> Result<()> where
        T: Serialize {
        self.array.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Array(self.array))
    }
}

impl ser::SerializeTuple for SerializeArray {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_element<T: ?Sized>(&mut self, value: &T) -> Result<()> where
        T: Serialize {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SerializeArray {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_field<T: ?Sized>(&mut self, value: &T) -> Result<()> where
        T: Serialize {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeSeq::end(self)
    }
}

pub struct SerializeTupleVariant {
    name: &'static str,
    values: Vec<Value>,
}

impl ser::SerializeTupleVariant for SerializeTupleVariant {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_field<T: ?Sized>(&mut self, value: &T) -> Result<()> where
        T: Serialize {
        self.values.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Struct(iter::once((self.name.to_string(), Value::Array(self.values))).collect()))
    }
}

pub struct SerializeMap {
    next_key: Option<String>,
    map: BTreeMap<String, Value>,
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_key<T: ?Sized>(&mut self, key: &T) -> Result<()> where
        T: Serialize {
        // Keys go through the regular serializer; only strings (and unit variants, which
        // serialize as strings) are accepted as member names.
        match to_value(key)? {
            Value::String(name) => {
                self.next_key = Some(name);
                Ok(())
            }
            _ => Err(EncodeError::KeyMustBeString),
        }
    }

    fn serialize_value<T: ?Sized>(&mut self, value: &T) -> Result<()> where
        T: Serialize {
        let key = self.next_key.take()
            .ok_or_else(|| EncodeError::custom("serialize_value called before serialize_key"))?;

        // last write wins, as when decoding a <struct> with repeated names
        self.map.insert(key, to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Struct(self.map))
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_field<T: ?Sized>(&mut self, key: &'static str, value: &T) -> Result<()> where
        T: Serialize {
        self.map.insert(key.to_string(), to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Struct(self.map))
    }
}

pub struct SerializeStructVariant {
    variant: &'static str,
    fields: BTreeMap<String, Value>,
}

impl ser::SerializeStructVariant for SerializeStructVariant {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_field<T: ?Sized>(&mut self, key: &'static str, value: &T) -> Result<()> where
        T: Serialize {
        self.fields.insert(key.to_string(), to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Struct(iter::once((self.variant.to_string(), Value::Struct(self.fields))).collect()))
    }
}
