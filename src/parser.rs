//! XML-RPC response parser.

use crate::error::ParseError;
use crate::{MethodResponse, Value};

use iso8601::datetime;
use xml::common::Position;
use xml::name::OwnedName;
use xml::reader::{EventReader, XmlEvent};
use xml::ParserConfig;

use std::collections::BTreeMap;
use std::io::Read;

pub type ParseResult<T> = Result<T, ParseError>;

/// How many arrays and structs may be nested inside each other.
pub const MAX_DEPTH: usize = 128;

pub struct Parser<R: Read> {
    reader: EventReader<R>,
    /// Number of arrays and structs currently open.
    depth: usize,
}

/// Returns the local name of an element, or `None` if it's namespaced.
fn local(name: &OwnedName) -> Option<&str> {
    if name.namespace.is_none() && name.prefix.is_none() {
        Some(&name.local_name)
    } else {
        None
    }
}

/// Short human-readable description of an event, for error messages.
fn describe(event: &XmlEvent) -> String {
    match *event {
        XmlEvent::StartElement { ref name, .. } => format!("<{}>", name),
        XmlEvent::EndElement { ref name } => format!("</{}>", name),
        XmlEvent::Characters(_) | XmlEvent::CData(_) => "characters".to_string(),
        XmlEvent::Whitespace(_) => "whitespace".to_string(),
        XmlEvent::EndDocument => "end of document".to_string(),
        _ => "XML declaration, comment or processing instruction".to_string(),
    }
}

impl<R: Read> Parser<R> {
    pub fn new(reader: R) -> Self {
        let config = ParserConfig::new().cdata_to_characters(true);
        Parser {
            reader: EventReader::new_with_config(reader, config),
            depth: 0,
        }
    }

    /// Reads the next `XmlEvent` that carries content, keeping whitespace.
    ///
    /// When encountering a new element, returns an `Err` if it has any attributes.
    fn next_event(&mut self) -> ParseResult<XmlEvent> {
        loop {
            let event = self.reader.next()?;
            match event {
                XmlEvent::StartDocument { .. }
                | XmlEvent::Comment(_)
                | XmlEvent::ProcessingInstruction { .. } => continue,   // skip these
                XmlEvent::StartElement { ref attributes, ref name, .. } => {
                    if !attributes.is_empty() {
                        return self.expected(format!("tag <{}> without attributes", name));
                    }
                }
                _ => {}
            }

            return Ok(event);
        }
    }

    /// Like `next_event`, but also skips whitespace between elements.
    fn pull_event(&mut self) -> ParseResult<XmlEvent> {
        loop {
            match self.next_event()? {
                XmlEvent::Whitespace(_) => continue,
                event => return Ok(event),
            }
        }
    }

    /// Expects an opening tag like `<tag>` without attributes (and a local name without namespaces).
    fn expect_open(&mut self, tag: &str) -> ParseResult<()> {
        match self.pull_event()? {
            XmlEvent::StartElement { ref name, .. } if local(name) == Some(tag) => Ok(()),
            ref event => self.unexpected(format!("<{}>", tag), event),
        }
    }

    /// Expects a closing tag like `</tag>` with a local name without namespaces.
    fn expect_close(&mut self, tag: &str) -> ParseResult<()> {
        match self.pull_event()? {
            XmlEvent::EndElement { ref name } if local(name) == Some(tag) => Ok(()),
            ref event => self.unexpected(format!("</{}>", tag), event),
        }
    }

    /// Builds and returns an `Err(UnexpectedXml)`.
    fn expected<T, E: ToString>(&self, expected: E) -> ParseResult<T> {
        Err(ParseError::UnexpectedXml {
            expected: expected.to_string(),
            found: None,
            position: self.reader.position(),
        })
    }

    /// Like `expected`, but also records what was found instead.
    fn unexpected<T, E: ToString>(&self, expected: E, found: &XmlEvent) -> ParseResult<T> {
        Err(ParseError::UnexpectedXml {
            expected: expected.to_string(),
            found: Some(describe(found)),
            position: self.reader.position(),
        })
    }

    fn invalid_value(&self, for_type: &'static str, found: String) -> ParseError {
        ParseError::InvalidValue {
            for_type,
            found,
            position: self.reader.position(),
        }
    }

    /// Collects the character data up to the closing `</tag>`.
    fn read_text(&mut self, tag: &str) -> ParseResult<String> {
        let mut text = String::new();
        loop {
            match self.next_event()? {
                XmlEvent::Characters(s) | XmlEvent::Whitespace(s) | XmlEvent::CData(s) => {
                    text.push_str(&s)
                }
                XmlEvent::EndElement { ref name } if local(name) == Some(tag) => return Ok(text),
                ref event => return self.unexpected(format!("characters or </{}>", tag), event),
            }
        }
    }

    pub fn parse_response(&mut self) -> ParseResult<MethodResponse> {
        let mut params: Option<Vec<Value>> = None;
        let mut fault: Option<Value> = None;

        // <methodResponse>
        self.expect_open("methodResponse")?;

        // <params> and/or <fault>, each at most once
        loop {
            match self.pull_event()? {
                XmlEvent::StartElement { ref name, .. } if local(name) == Some("params") && params.is_none() => {
                    params = Some(self.parse_params()?);
                }
                XmlEvent::StartElement { ref name, .. } if local(name) == Some("fault") && fault.is_none() => {
                    fault = Some(self.parse_value()?);
                    self.expect_close("fault")?;
                }
                XmlEvent::EndElement { ref name } if local(name) == Some("methodResponse") => break,
                ref event => return self.unexpected("<params>, <fault> or </methodResponse>", event),
            }
        }

        if params.is_none() && fault.is_none() {
            return self.expected("<params> or <fault>");
        }

        match self.pull_event()? {
            XmlEvent::EndDocument => {}
            ref event => return self.unexpected("end of document", event),
        }

        Ok(MethodResponse {
            params: params.unwrap_or_default(),
            fault,
        })
    }

    /// Parses the `<param>` list after an opening `<params>`, up to and including `</params>`.
    fn parse_params(&mut self) -> ParseResult<Vec<Value>> {
        let mut params = Vec::new();
        loop {
            match self.pull_event()? {
                XmlEvent::StartElement { ref name, .. } if local(name) == Some("param") => {
                    params.push(self.parse_value()?);
                    self.expect_close("param")?;
                }
                XmlEvent::EndElement { ref name } if local(name) == Some("params") => break,
                ref event => return self.unexpected("<param> or </params>", event),
            }
        }
        Ok(params)
    }

    pub fn parse_value(&mut self) -> ParseResult<Value> {
        // <value>
        self.expect_open("value")?;

        self.parse_value_inner()
    }

    /// Parses the contents of a `<value>` element, up to and including `</value>`.
    fn parse_value_inner(&mut self) -> ParseResult<Value> {
        // Raw string or specific type tag
        let mut text = String::new();
        loop {
            match self.next_event()? {
                XmlEvent::Characters(s) | XmlEvent::Whitespace(s) | XmlEvent::CData(s) => {
                    text.push_str(&s)
                }
                XmlEvent::EndElement { ref name } if local(name) == Some("value") => {
                    // No type tag: the value is a string (possibly empty)
                    return Ok(Value::String(text));
                }
                XmlEvent::StartElement { ref name, .. } if text.trim().is_empty() => {
                    let tag = match local(name) {
                        Some(tag) => tag.to_string(),
                        None => return self.expected(format!("type tag without namespace, found <{}>", name)),
                    };
                    let value = self.parse_typed(&tag)?;
                    self.expect_close("value")?;
                    return Ok(value);
                }
                ref event => return self.unexpected("type tag, characters or </value>", event),
            }
        }
    }

    /// Parses a value whose opening type tag `<tag>` has already been read.
    fn parse_typed(&mut self, tag: &str) -> ParseResult<Value> {
        let value = match tag {
            "struct" | "array" => {
                if self.depth >= MAX_DEPTH {
                    return Err(ParseError::NestingTooDeep {
                        limit: MAX_DEPTH,
                        position: self.reader.position(),
                    });
                }
                self.depth += 1;
                let value = if tag == "struct" { self.parse_struct() } else { self.parse_array() };
                self.depth -= 1;
                value?
            }
            "nil" => {
                self.expect_close("nil")?;
                Value::Nil
            }
            "string" => Value::String(self.read_text("string")?),
            "base64" => {
                let text = self.read_text("base64")?;
                // Line breaks are common in long payloads
                let compact: String = text.split_whitespace().collect();
                let data = base64::decode(&compact).map_err(|_| self.invalid_value("base64", text.clone()))?;
                Value::Base64(data)
            }
            "i4" | "int" | "i8" => {
                // Servers send 64-bit values in `<int>` too
                let text = self.read_text(tag)?;
                let int = text.trim().parse::<i64>().map_err(|_| self.invalid_value("integer", text.clone()))?;
                Value::Int(int)
            }
            "boolean" => {
                let text = self.read_text(tag)?;
                match text.trim() {
                    "0" => Value::Bool(false),
                    "1" => Value::Bool(true),
                    _ => return Err(self.invalid_value("boolean", text.clone())),
                }
            }
            "double" => {
                let text = self.read_text(tag)?;
                match text.trim().parse::<f64>() {
                    Ok(d) if d.is_finite() => Value::Double(d),
                    _ => return Err(self.invalid_value("double", text)),
                }
            }
            "dateTime.iso8601" => {
                let text = self.read_text(tag)?;
                let date_time = datetime(text.trim()).map_err(|_| self.invalid_value("dateTime.iso8601", text.clone()))?;
                Value::DateTime(date_time)
            }
            _ => return self.expected(format!("valid type tag, found <{}>", tag)),
        };

        Ok(value)
    }

    /// Parses the members after an opening `<struct>`, up to and including `</struct>`.
    fn parse_struct(&mut self) -> ParseResult<Value> {
        let mut members = BTreeMap::new();
        loop {
            match self.pull_event()? {
                XmlEvent::EndElement { ref name } if local(name) == Some("struct") => break,
                XmlEvent::StartElement { ref name, .. } if local(name) == Some("member") => {
                    // <name>NAME</name>
                    self.expect_open("name")?;
                    let name = self.read_text("name")?;

                    let value = self.parse_value()?;

                    // </member>
                    self.expect_close("member")?;

                    // Repeated names: the last one wins
                    members.insert(name, value);
                }
                ref event => return self.unexpected("</struct> or <member>", event),
            }
        }

        Ok(Value::Struct(members))
    }

    /// Parses the `<data>` after an opening `<array>`, up to and including `</array>`.
    fn parse_array(&mut self) -> ParseResult<Value> {
        let mut elements: Vec<Value> = Vec::new();
        self.expect_open("data")?;
        loop {
            match self.pull_event()? {
                XmlEvent::EndElement { ref name } if local(name) == Some("data") => break,
                XmlEvent::StartElement { ref name, .. } if local(name) == Some("value") => {
                    elements.push(self.parse_value_inner()?);
                }
                ref event => return self.unexpected("</data> or <value>", event),
            }
        }
        self.expect_close("array")?;
        Ok(Value::Array(elements))
    }
}

/// Parses a response from an XML reader.
pub fn parse_response<R: Read>(reader: R) -> ParseResult<MethodResponse> {
    Parser::new(reader).parse_response()
}
