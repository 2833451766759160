//! XML decoding.
//!
//! The document is first read into a small element tree, then each element is
//! converted into a record:
//!
//! - attributes become fields prefixed with [`ATTRIBUTE_PREFIX`], so they never
//!   collide with child element names;
//! - text content becomes the [`TEXT_FIELD`] field;
//! - child elements become fields named after their tag, and repeated tags are
//!   collected into an ordered list instead of overwriting each other;
//! - a child with neither attributes nor child elements collapses to its text.
//!
//! The records of a document are the root's child elements, or the root itself
//! when it has no element children.

use std::borrow::Cow;

use quick_xml::{
    Reader,
    escape::{resolve_predefined_entity, unescape},
    events::{BytesStart, Event},
};

use crate::{
    data::{RawRecord, RawValue},
    error::{DecodeError, DecodeResult},
};

pub const ATTRIBUTE_PREFIX: &str = "@";
pub const TEXT_FIELD: &str = "#text";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    fn open(start: &BytesStart<'_>, position: u64) -> DecodeResult<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|err| invalid(position, err))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let raw = String::from_utf8_lossy(&attr.value);
            let value = unescape(&raw).map_err(|err| invalid(position, err))?;
            attributes.push((key, value.into_owned()));
        }
        Ok(Self {
            name,
            attributes,
            ..Self::default()
        })
    }

    pub fn to_record(&self) -> RawRecord {
        let mut record = RawRecord::new();
        for (key, value) in &self.attributes {
            record.insert(format!("{ATTRIBUTE_PREFIX}{key}"), text_value(value));
        }
        for child in &self.children {
            record.append(child.name.as_str(), child.to_value());
        }
        let text = self.text.trim();
        if !text.is_empty() {
            record.insert(TEXT_FIELD, text_value(text));
        }
        record
    }

    pub fn to_value(&self) -> RawValue {
        if self.attributes.is_empty() && self.children.is_empty() {
            text_value(&self.text)
        } else {
            RawValue::Record(self.to_record())
        }
    }
}

pub fn decode(text: &str) -> DecodeResult<Vec<RawRecord>> {
    let root = parse_document(text)?;
    if root.children.is_empty() {
        return Ok(vec![root.to_record()]);
    }
    Ok(root.children.iter().map(Element::to_record).collect())
}

/// Reads the document into its root element.
pub fn parse_document(text: &str) -> DecodeResult<Element> {
    let mut reader = Reader::from_str(text);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let position = reader.buffer_position() as u64;
        let event = reader
            .read_event()
            .map_err(|err| invalid(reader.error_position() as u64, err))?;
        match event {
            Event::Start(start) => stack.push(Element::open(&start, position)?),
            Event::Empty(start) => {
                let element = Element::open(&start, position)?;
                attach(&mut stack, &mut root, element, position)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| invalid(position, "unexpected closing tag"))?;
                attach(&mut stack, &mut root, element, position)?;
            }
            Event::Text(content) => {
                if let Some(current) = stack.last_mut() {
                    let raw = String::from_utf8_lossy(&content);
                    let resolved = unescape(&raw).unwrap_or(Cow::Borrowed(raw.as_ref()));
                    current.text.push_str(&resolved);
                }
            }
            Event::CData(content) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&content));
                }
            }
            Event::GeneralRef(reference) => {
                let name = String::from_utf8_lossy(&reference).into_owned();
                let resolved = resolve_reference(&name)
                    .ok_or_else(|| invalid(position, format!("unknown entity '&{name};'")))?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&resolved);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(invalid(
            reader.buffer_position() as u64,
            format!("element <{}> is never closed", open.name),
        ));
    }
    root.ok_or_else(|| invalid(0, "document has no root element"))
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
    position: u64,
) -> DecodeResult<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(invalid(position, "document has more than one root element")),
    }
    Ok(())
}

fn resolve_reference(name: &str) -> Option<String> {
    if let Some(code) = name.strip_prefix('#') {
        let value = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => code.parse::<u32>().ok()?,
        };
        return char::from_u32(value).map(String::from);
    }
    resolve_predefined_entity(name).map(str::to_string)
}

fn text_value(text: &str) -> RawValue {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        RawValue::Null
    } else {
        RawValue::Text(trimmed.to_string())
    }
}

fn invalid(position: u64, err: impl std::fmt::Display) -> DecodeError {
    DecodeError::InvalidXml {
        position,
        message: err.to_string(),
    }
}
