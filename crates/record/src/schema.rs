//! Schemas and the table header page codec.

use bytes::{Buf, BufMut};
use common::{DbError, DbResult};
use storage::PAGE_SIZE;
use types::AttrType;

/// Maximum length of an attribute name in bytes; names are stored
/// NUL-padded to this width in the header page.
pub const MAX_ATTR_NAME: usize = 15;

/// Fixed header prefix: tuple count, free-page hint, attribute count,
/// key count, each a native-endian `i32`.
const HEADER_FIXED: usize = 16;
/// Per-attribute header entry: `name[15]`, type code `i32`, length `i32`.
const ATTR_ENTRY: usize = MAX_ATTR_NAME + 8;

/// One typed, named attribute of a schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    name: String,
    ty: AttrType,
    len: u16,
}

impl Attribute {
    /// Create an attribute. `len` is meaningful only for STRING
    /// attributes, where it is the exact encoded width.
    pub fn new(name: &str, ty: AttrType, len: u16) -> DbResult<Self> {
        if name.is_empty() || name.len() > MAX_ATTR_NAME {
            return Err(DbError::SchemaError(format!(
                "attribute name '{name}' must be 1..={MAX_ATTR_NAME} bytes"
            )));
        }
        if ty == AttrType::Str && len == 0 {
            return Err(DbError::SchemaError(format!(
                "string attribute '{name}' needs a nonzero length"
            )));
        }
        Ok(Self {
            name: name.to_string(),
            ty,
            len,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> AttrType {
        self.ty
    }

    pub fn len(&self) -> u16 {
        self.len
    }

    /// Encoded width of this attribute inside a record body.
    pub fn byte_size(&self) -> usize {
        match self.ty {
            AttrType::Int => 4,
            AttrType::Float => 4,
            AttrType::Bool => 1,
            AttrType::Str => self.len as usize,
        }
    }
}

/// An ordered, typed attribute list plus the key-attribute indices.
///
/// Attribute order defines the record encoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schema {
    attrs: Vec<Attribute>,
    keys: Vec<usize>,
}

impl Schema {
    pub fn new(attrs: Vec<Attribute>, keys: Vec<usize>) -> DbResult<Self> {
        if attrs.is_empty() {
            return Err(DbError::SchemaError("schema needs at least one attribute".into()));
        }
        if let Some(&bad) = keys.iter().find(|&&k| k >= attrs.len()) {
            return Err(DbError::SchemaError(format!(
                "key attribute index {bad} out of range"
            )));
        }
        let schema = Self { attrs, keys };
        if schema.record_size() > PAGE_SIZE {
            return Err(DbError::SchemaError("record does not fit in one page".into()));
        }
        if HEADER_FIXED + schema.attrs.len() * ATTR_ENTRY > PAGE_SIZE {
            return Err(DbError::SchemaError("schema does not fit in the header page".into()));
        }
        Ok(schema)
    }

    pub fn attrs(&self) -> &[Attribute] {
        &self.attrs
    }

    pub fn keys(&self) -> &[usize] {
        &self.keys
    }

    pub fn attr(&self, i: usize) -> DbResult<&Attribute> {
        self.attrs
            .get(i)
            .ok_or_else(|| DbError::SchemaError(format!("attribute index {i} out of range")))
    }

    /// Attribute names in schema order, for predicate resolution.
    pub fn column_names(&self) -> Vec<String> {
        self.attrs.iter().map(|a| a.name.clone()).collect()
    }

    /// Encoded size of one record: a tombstone byte plus the attributes.
    pub fn record_size(&self) -> usize {
        1 + self.attrs.iter().map(Attribute::byte_size).sum::<usize>()
    }

    /// Equal-size slots per data page.
    pub fn slots_per_page(&self) -> usize {
        PAGE_SIZE / self.record_size()
    }

    /// Offset of attribute `i` inside a record image.
    pub fn attr_offset(&self, i: usize) -> DbResult<usize> {
        if i >= self.attrs.len() {
            return Err(DbError::SchemaError(format!("attribute index {i} out of range")));
        }
        Ok(1 + self.attrs[..i].iter().map(Attribute::byte_size).sum::<usize>())
    }

    /// Write the table header (counters plus this schema) into page 0's
    /// buffer.
    pub(crate) fn encode_header(
        &self,
        tuple_count: i32,
        free_page_hint: i32,
        page: &mut [u8],
    ) -> DbResult<()> {
        let needed = HEADER_FIXED + self.attrs.len() * ATTR_ENTRY;
        if page.len() < needed {
            return Err(DbError::SchemaError("header page buffer too small".into()));
        }
        let mut cur = &mut page[..];
        cur.put_i32_ne(tuple_count);
        cur.put_i32_ne(free_page_hint);
        cur.put_i32_ne(self.attrs.len() as i32);
        cur.put_i32_ne(self.keys.len() as i32);
        for attr in &self.attrs {
            let mut name = [0u8; MAX_ATTR_NAME];
            name[..attr.name.len()].copy_from_slice(attr.name.as_bytes());
            cur.put_slice(&name);
            cur.put_i32_ne(attr.ty.code());
            cur.put_i32_ne(attr.len as i32);
        }
        Ok(())
    }

    /// Decode a header page into `(schema, tuple_count, free_page_hint)`.
    ///
    /// Key indices are not part of the header layout; the key is taken to
    /// be the first `key_count` attributes.
    pub(crate) fn decode_header(page: &[u8]) -> DbResult<(Schema, u32, u32)> {
        if page.len() < HEADER_FIXED {
            return Err(DbError::SchemaError("header page buffer too small".into()));
        }
        let mut cur = page;
        let tuple_count = cur.get_i32_ne();
        let free_page_hint = cur.get_i32_ne();
        let num_attrs = cur.get_i32_ne();
        let key_count = cur.get_i32_ne();

        if num_attrs <= 0 || key_count < 0 || key_count > num_attrs {
            return Err(DbError::SchemaError(format!(
                "corrupt header: {num_attrs} attributes, {key_count} keys"
            )));
        }
        let num_attrs = num_attrs as usize;
        if HEADER_FIXED + num_attrs * ATTR_ENTRY > page.len() {
            return Err(DbError::SchemaError("header overruns the page".into()));
        }

        let mut attrs = Vec::with_capacity(num_attrs);
        for _ in 0..num_attrs {
            let mut name = [0u8; MAX_ATTR_NAME];
            cur.copy_to_slice(&mut name);
            let end = name.iter().position(|&b| b == 0).unwrap_or(MAX_ATTR_NAME);
            let name = String::from_utf8_lossy(&name[..end]).into_owned();

            let code = cur.get_i32_ne();
            let ty = AttrType::from_code(code)
                .ok_or_else(|| DbError::SchemaError(format!("unknown type code {code}")))?;
            let len = cur.get_i32_ne();
            attrs.push(Attribute::new(&name, ty, len as u16)?);
        }

        let keys = (0..key_count as usize).collect();
        let schema = Schema::new(attrs, keys)?;
        Ok((
            schema,
            tuple_count.max(0) as u32,
            free_page_hint.max(1) as u32,
        ))
    }
}
