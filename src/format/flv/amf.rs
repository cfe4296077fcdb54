//! Minimal AMF0 decoding for script-data tag bodies.
//!
//! Only decoding is provided, and only the value kinds that appear in
//! `onMetaData` payloads; reference types, typed objects, and the other
//! exotic markers fail with [`FlvError::Amf`].

use std::fmt;

use crate::error::{FlvError, Result};

/// AMF0 type markers.
mod marker {
    pub const NUMBER: u8 = 0x00;
    pub const BOOLEAN: u8 = 0x01;
    pub const STRING: u8 = 0x02;
    pub const OBJECT: u8 = 0x03;
    pub const NULL: u8 = 0x05;
    pub const UNDEFINED: u8 = 0x06;
    pub const ECMA_ARRAY: u8 = 0x08;
    pub const OBJECT_END: u8 = 0x09;
    pub const STRICT_ARRAY: u8 = 0x0A;
    pub const DATE: u8 = 0x0B;
    pub const LONG_STRING: u8 = 0x0C;
}

/// One decoded AMF0 value.
///
/// Key-value containers keep their wire order.
#[derive(Debug, Clone, PartialEq)]
pub enum Amf0Value {
    /// IEEE-754 double.
    Number(f64),
    /// Boolean.
    Boolean(bool),
    /// UTF-8 string with a 16-bit length.
    String(String),
    /// Anonymous object: named values terminated by an end marker.
    Object(Vec<(String, Amf0Value)>),
    /// Null.
    Null,
    /// Undefined.
    Undefined,
    /// Associative array: advisory count, then object-shaped pairs.
    EcmaArray(Vec<(String, Amf0Value)>),
    /// Dense array of unnamed values.
    StrictArray(Vec<Amf0Value>),
    /// Millisecond timestamp plus a time-zone offset nobody uses.
    Date {
        /// Milliseconds since the Unix epoch.
        unix_ms: f64,
        /// Time-zone offset in minutes.
        offset_minutes: i16,
    },
    /// UTF-8 string with a 32-bit length.
    LongString(String),
}

impl fmt::Display for Amf0Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amf0Value::Number(n) => write!(f, "{}", n),
            Amf0Value::Boolean(b) => write!(f, "{}", b),
            Amf0Value::String(s) | Amf0Value::LongString(s) => f.write_str(s),
            Amf0Value::Object(pairs) | Amf0Value::EcmaArray(pairs) => {
                f.write_str("{")?;
                for (key, value) in pairs {
                    write!(f, "{}={};", key, value)?;
                }
                f.write_str("}")
            }
            Amf0Value::StrictArray(values) => {
                f.write_str("[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", value)?;
                }
                f.write_str("]")
            }
            Amf0Value::Date { unix_ms, .. } => write!(f, "date({})", unix_ms),
            Amf0Value::Null => f.write_str("null"),
            Amf0Value::Undefined => f.write_str("undefined"),
        }
    }
}

/// Containers nested deeper than this fail with [`FlvError::Amf`] rather
/// than recursing without bound on crafted input.
const MAX_NESTING_DEPTH: usize = 32;

/// Decodes every AMF0 value in `data`, in order, until the buffer ends.
pub fn decode(data: &[u8]) -> Result<Vec<Amf0Value>> {
    let mut decoder = Decoder::new(data);
    let mut values = Vec::new();
    while decoder.pos < data.len() {
        values.push(decoder.value()?);
    }
    Ok(values)
}

/// Extracts the `onMetaData` key-value listing from a script-data tag body.
///
/// Returns an empty listing when the event name is not `onMetaData` or the
/// payload is not an object or ECMA array; wire-order is preserved.
pub fn metadata_pairs(data: &[u8]) -> Result<Vec<(String, Amf0Value)>> {
    let mut decoder = Decoder::new(data);
    let event = decoder.value()?;
    match event {
        Amf0Value::String(name) if name == "onMetaData" => {}
        _ => return Ok(Vec::new()),
    }

    match decoder.value()? {
        Amf0Value::Object(pairs) | Amf0Value::EcmaArray(pairs) => Ok(pairs),
        _ => Ok(Vec::new()),
    }
}

struct Decoder<'a> {
    data: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> Decoder<'a> {
    fn new(data: &'a [u8]) -> Self {
        Decoder {
            data,
            pos: 0,
            depth: 0,
        }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.pos + n > self.data.len() {
            return Err(FlvError::Amf("unexpected end of amf data".into()));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_f64(&mut self) -> Result<f64> {
        let bytes = self.take(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Ok(f64::from_be_bytes(buf))
    }

    fn read_string(&mut self, len: usize) -> Result<String> {
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| FlvError::Amf("invalid utf-8 in amf string".into()))
    }

    fn value(&mut self) -> Result<Amf0Value> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(FlvError::Amf("amf nesting too deep".into()));
        }
        self.depth += 1;
        let value = self.value_inner();
        self.depth -= 1;
        value
    }

    fn value_inner(&mut self) -> Result<Amf0Value> {
        let marker = self.read_u8()?;
        match marker {
            marker::NUMBER => Ok(Amf0Value::Number(self.read_f64()?)),
            marker::BOOLEAN => Ok(Amf0Value::Boolean(self.read_u8()? != 0)),
            marker::STRING => {
                let len = self.read_u16()? as usize;
                Ok(Amf0Value::String(self.read_string(len)?))
            }
            marker::OBJECT => Ok(Amf0Value::Object(self.pairs_until_end()?)),
            marker::NULL => Ok(Amf0Value::Null),
            marker::UNDEFINED => Ok(Amf0Value::Undefined),
            marker::ECMA_ARRAY => {
                // the count is advisory; the end marker is authoritative
                self.read_u32()?;
                Ok(Amf0Value::EcmaArray(self.pairs_until_end()?))
            }
            marker::STRICT_ARRAY => {
                let count = self.read_u32()? as usize;
                let mut values = Vec::with_capacity(count.min(1024));
                for _ in 0..count {
                    values.push(self.value()?);
                }
                Ok(Amf0Value::StrictArray(values))
            }
            marker::DATE => {
                let unix_ms = self.read_f64()?;
                let offset_minutes = self.read_u16()? as i16;
                Ok(Amf0Value::Date {
                    unix_ms,
                    offset_minutes,
                })
            }
            marker::LONG_STRING => {
                let len = self.read_u32()? as usize;
                Ok(Amf0Value::LongString(self.read_string(len)?))
            }
            other => Err(FlvError::Amf(format!("unsupported amf marker 0x{:02x}", other))),
        }
    }

    fn pairs_until_end(&mut self) -> Result<Vec<(String, Amf0Value)>> {
        let mut pairs = Vec::new();
        loop {
            let name_len = self.read_u16()? as usize;
            if name_len == 0 {
                let end = self.read_u8()?;
                if end != marker::OBJECT_END {
                    return Err(FlvError::Amf("missing amf object end marker".into()));
                }
                return Ok(pairs);
            }
            let name = self.read_string(name_len)?;
            let value = self.value()?;
            pairs.push((name, value));
        }
    }
}
