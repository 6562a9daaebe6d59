//! Minimal tag-length-value wire codec.
//!
//! Protobuf-compatible framing: each field is a varint tag
//! `(field_number << 3) | wire_type` followed by either a varint value
//! (wire type 0) or a length-delimited byte run (wire type 2). Repeated
//! fixed-width scalars use packed encoding: one length-delimited field
//! holding back-to-back varints.
//!
//! Unknown field numbers are skipped by callers; unknown wire types fail.

/// Varint-encoded scalar field.
pub const WIRE_VARINT: u8 = 0;
/// Length-delimited field (bytes, strings, nested records, packed runs).
pub const WIRE_LEN: u8 = 2;

/// Wire-level decode error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    #[error("truncated input at byte {0}")]
    Truncated(usize),
    #[error("varint longer than 10 bytes at byte {0}")]
    VarintTooLong(usize),
    #[error("unsupported wire type {wire_type} for field {field}")]
    UnsupportedWireType { field: u32, wire_type: u8 },
    #[error("field {field}: expected wire type {expected}, got {actual}")]
    WrongWireType { field: u32, expected: u8, actual: u8 },
    #[error("field {field}: value {value} does not fit in u32")]
    ValueOverflow { field: u32, value: u64 },
    #[error("invalid UTF-8 in field {field}")]
    InvalidUtf8 { field: u32 },
}

/// Append-only wire writer.
#[derive(Debug, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    fn varint(&mut self, mut value: u64) {
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                self.buf.push(byte);
                return;
            }
            self.buf.push(byte | 0x80);
        }
    }

    fn tag(&mut self, field: u32, wire_type: u8) {
        self.varint(((field as u64) << 3) | wire_type as u64);
    }

    pub fn field_u64(&mut self, field: u32, value: u64) {
        self.tag(field, WIRE_VARINT);
        self.varint(value);
    }

    pub fn field_u32(&mut self, field: u32, value: u32) {
        self.field_u64(field, value as u64);
    }

    pub fn field_bool(&mut self, field: u32, value: bool) {
        self.field_u64(field, value as u64);
    }

    pub fn field_bytes(&mut self, field: u32, bytes: &[u8]) {
        self.tag(field, WIRE_LEN);
        self.varint(bytes.len() as u64);
        self.buf.extend_from_slice(bytes);
    }

    pub fn field_str(&mut self, field: u32, s: &str) {
        self.field_bytes(field, s.as_bytes());
    }

    /// Packed run of u32 values as one length-delimited field.
    pub fn field_packed_u32(&mut self, field: u32, values: &[u32]) {
        let mut packed = Writer::new();
        for &v in values {
            packed.varint(v as u64);
        }
        self.field_bytes(field, &packed.buf);
    }
}

/// Decoded field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Varint(u64),
    Bytes(&'a [u8]),
}

impl<'a> FieldValue<'a> {
    pub fn as_u64(self, field: u32) -> Result<u64, WireError> {
        match self {
            FieldValue::Varint(v) => Ok(v),
            FieldValue::Bytes(_) => Err(WireError::WrongWireType {
                field,
                expected: WIRE_VARINT,
                actual: WIRE_LEN,
            }),
        }
    }

    pub fn as_u32(self, field: u32) -> Result<u32, WireError> {
        let value = self.as_u64(field)?;
        u32::try_from(value).map_err(|_| WireError::ValueOverflow { field, value })
    }

    pub fn as_bool(self, field: u32) -> Result<bool, WireError> {
        Ok(self.as_u64(field)? != 0)
    }

    pub fn as_bytes(self, field: u32) -> Result<&'a [u8], WireError> {
        match self {
            FieldValue::Bytes(b) => Ok(b),
            FieldValue::Varint(_) => Err(WireError::WrongWireType {
                field,
                expected: WIRE_LEN,
                actual: WIRE_VARINT,
            }),
        }
    }

    pub fn as_str(self, field: u32) -> Result<&'a str, WireError> {
        std::str::from_utf8(self.as_bytes(field)?).map_err(|_| WireError::InvalidUtf8 { field })
    }
}

/// Sequential wire reader over one record's bytes.
#[derive(Debug)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn varint(&mut self) -> Result<u64, WireError> {
        let start = self.pos;
        let mut value: u64 = 0;
        let mut shift = 0u32;
        loop {
            let byte = *self
                .buf
                .get(self.pos)
                .ok_or(WireError::Truncated(start))?;
            self.pos += 1;
            value |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
            if shift >= 70 {
                return Err(WireError::VarintTooLong(start));
            }
        }
    }

    /// Next field, or None at end of input.
    pub fn next_field(&mut self) -> Result<Option<(u32, FieldValue<'a>)>, WireError> {
        if self.pos >= self.buf.len() {
            return Ok(None);
        }
        let tag = self.varint()?;
        let field = (tag >> 3) as u32;
        let wire_type = (tag & 0x7) as u8;
        match wire_type {
            WIRE_VARINT => {
                let value = self.varint()?;
                Ok(Some((field, FieldValue::Varint(value))))
            }
            WIRE_LEN => {
                let len = self.varint()? as usize;
                let start = self.pos;
                let end = start.checked_add(len).ok_or(WireError::Truncated(start))?;
                if end > self.buf.len() {
                    return Err(WireError::Truncated(start));
                }
                self.pos = end;
                Ok(Some((field, FieldValue::Bytes(&self.buf[start..end]))))
            }
            other => Err(WireError::UnsupportedWireType {
                field,
                wire_type: other,
            }),
        }
    }
}

/// Decode a packed run of u32 varints.
pub fn read_packed_u32(field: u32, bytes: &[u8]) -> Result<Vec<u32>, WireError> {
    let mut reader = Reader::new(bytes);
    let mut values = Vec::new();
    while reader.pos < reader.buf.len() {
        let value = reader.varint()?;
        values.push(u32::try_from(value).map_err(|_| WireError::ValueOverflow { field, value })?);
    }
    Ok(values)
}
