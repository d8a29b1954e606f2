//! Schema, record, and expression fixtures.

use expr::{BinaryOp, Expr, UnaryOp};
use record::{Attribute, Record, Schema};
use types::{AttrType, Value};

/// The two-attribute schema used throughout the record tests:
/// `a: INT` (key) and `b: STRING(4)`.
pub fn id_name_schema() -> Schema {
    Schema::new(
        vec![
            Attribute::new("a", AttrType::Int, 0).expect("attribute"),
            Attribute::new("b", AttrType::Str, 4).expect("attribute"),
        ],
        vec![0],
    )
    .expect("schema")
}

/// A schema touching every attribute type:
/// `i: INT` (key), `s: STRING(8)`, `f: FLOAT`, `b: BOOL`.
pub fn wide_schema() -> Schema {
    Schema::new(
        vec![
            Attribute::new("i", AttrType::Int, 0).expect("attribute"),
            Attribute::new("s", AttrType::Str, 8).expect("attribute"),
            Attribute::new("f", AttrType::Float, 0).expect("attribute"),
            Attribute::new("b", AttrType::Bool, 0).expect("attribute"),
        ],
        vec![0],
    )
    .expect("schema")
}

/// Build a record for `schema` from `values` in attribute order.
///
/// # Example
///
/// ```
/// use testsupport::prelude::*;
/// use types::Value;
///
/// let schema = id_name_schema();
/// let rec = record_with(&schema, &[Value::Int(1), Value::Str("abcd".into())]);
/// assert_eq!(rec.get_attr(&schema, 0).unwrap(), Value::Int(1));
/// ```
pub fn record_with(schema: &Schema, values: &[Value]) -> Record {
    assert_eq!(
        values.len(),
        schema.attrs().len(),
        "one value per attribute"
    );
    let mut record = Record::new(schema);
    for (i, value) in values.iter().enumerate() {
        record.set_attr(schema, i, value).expect("set attribute");
    }
    record
}

// Expression builders

/// Attribute reference by name.
pub fn col(name: &str) -> Expr {
    Expr::Column(name.to_string())
}

/// Literal integer expression.
pub fn lit_int(value: i32) -> Expr {
    Expr::Literal(Value::Int(value))
}

/// Literal string expression.
pub fn lit_str(value: &str) -> Expr {
    Expr::Literal(Value::Str(value.to_string()))
}

/// Literal boolean expression.
pub fn lit_bool(value: bool) -> Expr {
    Expr::Literal(Value::Bool(value))
}

fn binary(left: Expr, op: BinaryOp, right: Expr) -> Expr {
    Expr::Binary {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

/// `left == right`
pub fn eq(left: Expr, right: Expr) -> Expr {
    binary(left, BinaryOp::Eq, right)
}

/// `left < right`
pub fn lt(left: Expr, right: Expr) -> Expr {
    binary(left, BinaryOp::Lt, right)
}

/// `left > right`
pub fn gt(left: Expr, right: Expr) -> Expr {
    binary(left, BinaryOp::Gt, right)
}

/// `left AND right`
pub fn and(left: Expr, right: Expr) -> Expr {
    binary(left, BinaryOp::And, right)
}

/// `left OR right`
pub fn or(left: Expr, right: Expr) -> Expr {
    binary(left, BinaryOp::Or, right)
}

/// `NOT expr`
pub fn not(expr: Expr) -> Expr {
    Expr::Unary {
        op: UnaryOp::Not,
        expr: Box::new(expr),
    }
}
