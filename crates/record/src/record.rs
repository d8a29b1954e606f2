//! Record images and the attribute codec.

use common::{DbError, DbResult, RecordId};
use types::{AttrType, Value};

use crate::schema::Schema;

/// Tombstone byte of an occupied slot.
pub const TOMBSTONE_LIVE: u8 = b'+';
/// Tombstone byte of a deleted slot.
pub const TOMBSTONE_DEAD: u8 = b'-';

/// One fixed-size record image.
///
/// `data` holds the full slot image: byte 0 is the tombstone position,
/// the attributes follow in schema order, host-endian fixed-width.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub id: RecordId,
    pub data: Vec<u8>,
}

impl Record {
    /// A zeroed record sized for `schema`, not yet placed in any table.
    pub fn new(schema: &Schema) -> Self {
        Self {
            id: RecordId::NONE,
            data: vec![0u8; schema.record_size()],
        }
    }

    /// The tombstone byte of this image.
    pub fn tombstone(&self) -> u8 {
        self.data.first().copied().unwrap_or(0)
    }

    /// Decode attribute `attr` according to its declared type.
    pub fn get_attr(&self, schema: &Schema, attr: usize) -> DbResult<Value> {
        let a = schema.attr(attr)?;
        let off = schema.attr_offset(attr)?;
        let size = a.byte_size();
        if self.data.len() < off + size {
            return Err(DbError::InvalidParameter(format!(
                "record image of {} bytes is too small for schema",
                self.data.len()
            )));
        }
        let bytes = &self.data[off..off + size];
        let value = match a.ty() {
            AttrType::Int => {
                let mut b = [0u8; 4];
                b.copy_from_slice(bytes);
                Value::Int(i32::from_ne_bytes(b))
            }
            AttrType::Float => {
                let mut b = [0u8; 4];
                b.copy_from_slice(bytes);
                Value::Float(f32::from_ne_bytes(b))
            }
            AttrType::Bool => Value::Bool(bytes[0] != 0),
            AttrType::Str => {
                let end = bytes.iter().position(|&b| b == 0).unwrap_or(size);
                Value::Str(String::from_utf8_lossy(&bytes[..end]).into_owned())
            }
        };
        Ok(value)
    }

    /// Encode `value` into attribute `attr`'s position.
    ///
    /// The value's type must match the attribute's declared type. STRING
    /// values are truncated or NUL-padded to the declared width.
    pub fn set_attr(&mut self, schema: &Schema, attr: usize, value: &Value) -> DbResult<()> {
        let a = schema.attr(attr)?;
        if value.attr_type() != a.ty() {
            return Err(DbError::TypeMismatch(format!(
                "attribute '{}' is {}, got {}",
                a.name(),
                a.ty(),
                value.attr_type()
            )));
        }
        let off = schema.attr_offset(attr)?;
        let size = a.byte_size();
        if self.data.len() < off + size {
            return Err(DbError::InvalidParameter(format!(
                "record image of {} bytes is too small for schema",
                self.data.len()
            )));
        }
        let slot = &mut self.data[off..off + size];
        match value {
            Value::Int(v) => slot.copy_from_slice(&v.to_ne_bytes()),
            Value::Float(v) => slot.copy_from_slice(&v.to_ne_bytes()),
            Value::Bool(v) => slot[0] = *v as u8,
            Value::Str(s) => {
                let bytes = s.as_bytes();
                let n = bytes.len().min(size);
                slot[..n].copy_from_slice(&bytes[..n]);
                slot[n..].fill(0);
            }
        }
        Ok(())
    }

    /// Decode every attribute in schema order.
    pub fn decode_all(&self, schema: &Schema) -> DbResult<Vec<Value>> {
        (0..schema.attrs().len())
            .map(|i| self.get_attr(schema, i))
            .collect()
    }
}
