//! Event-level XML reading for workbook parts.
//! Wraps a `quick_xml` reader with the configuration the OOXML parts need and
//! adds small helpers for attributes, text and entity references.

use crate::error::PairerError;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::BytesRef;
use quick_xml::events::BytesStart;
use quick_xml::events::BytesText;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::borrow::Cow;
use std::io::BufRead;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum XmlError {
    #[error("Unknown XML entity '&{0};'")]
    UnknownEntity(String),

    #[error("Cannot parse attribute '{name}' value '{value}'")]
    InvalidAttributeValue { name: String, value: String },
}

/// Pull reader over one XML part, reusing a single event buffer.
pub(crate) struct XmlReader<R: BufRead> {
    reader: Reader<R>,
    buffer: Vec<u8>,
}

impl<R: BufRead> XmlReader<R> {
    pub(crate) fn new(source: R) -> XmlReader<R> {
        let mut reader = Reader::from_reader(source);
        let config = reader.config_mut();
        config.check_comments = false;
        config.check_end_names = false;
        // `<c r="A1"/>` must produce a Start and an End event like `<c r="A1"></c>`
        config.expand_empty_elements = true;
        config.trim_text(false);

        XmlReader {
            reader,
            buffer: Vec::with_capacity(1024),
        }
    }

    /// Next event, or `None` at end of document.
    pub(crate) fn next(&'_ mut self) -> Result<Option<Event<'_>>, PairerError> {
        self.buffer.clear();
        match self.reader.read_event_into(&mut self.buffer) {
            Ok(Event::Eof) => Ok(None),
            Ok(event) => Ok(Some(event)),
            Err(error) => Err(PairerError::XmlError(error)),
        }
    }
}

pub(crate) trait XmlNodeHelper<'a> {
    /// Unescaped value of the attribute `name`, if present.
    fn get_attribute_value(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, PairerError>;

    /// Value of the attribute `name` parsed as `T`, if present.
    fn parse_attribute_value<T: FromStr>(&'a self, name: &str) -> Result<Option<T>, PairerError>;
}

impl<'a> XmlNodeHelper<'a> for BytesStart<'a> {
    fn get_attribute_value(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, PairerError> {
        self.try_get_attribute(name)?
            .map(|attribute| unescape(&attribute))
            .transpose()
    }

    fn parse_attribute_value<T: FromStr>(&'a self, name: &str) -> Result<Option<T>, PairerError> {
        match self.get_attribute_value(name)? {
            Some(value) => value.parse::<T>().map(Some).map_err(|_| {
                XmlError::InvalidAttributeValue {
                    name: name.to_owned(),
                    value: value.to_string(),
                }
                .into()
            }),
            None => Ok(None),
        }
    }
}

fn unescape<'a>(attribute: &Attribute<'a>) -> Result<Cow<'a, str>, PairerError> {
    Ok(attribute.unescape_value()?)
}

/// Accumulates character data from text and reference events.
pub(crate) trait XmlTextContentHelper {
    fn push_bytes_text(&mut self, text: &BytesText) -> Result<(), PairerError>;

    /// Resolves `&amp;`-style entities and `&#NN;` / `&#xNN;` character references.
    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> Result<(), PairerError>;
}

impl XmlTextContentHelper for String {
    fn push_bytes_text(&mut self, text: &BytesText) -> Result<(), PairerError> {
        self.push_str(&text.xml_content()?);
        Ok(())
    }

    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> Result<(), PairerError> {
        let raw = bytes.xml_content()?;
        if let Some(number) = raw.strip_prefix('#') {
            let code = match number.strip_prefix('x') {
                Some(hex) => u32::from_str_radix(hex, 16)?,
                None => number.parse::<u32>()?,
            };
            if let Some(character) = char::from_u32(code) {
                self.push(character);
            }
        } else if let Some(entity) = resolve_xml_entity(&raw) {
            self.push_str(entity);
        } else {
            Err(XmlError::UnknownEntity(raw.to_string()))?;
        }
        Ok(())
    }
}

/// Drives an [`XmlReader`] to the end of the part, dispatching each event to
/// the given match arms. Unmatched events are ignored; `break` stops early.
#[macro_export]
macro_rules! match_xml_events {
    ($reader:expr => { $($arms:tt)* }) => {
        while let Some(result) = $reader.next()? {
            match result {
                Event::Eof => break,
                $($arms)*
                _ => (),
            }
        }
    };
}
