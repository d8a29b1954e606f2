
use common::{DbError, DbResult};
use std::cmp::Ordering;
use types::Value;

/// Binary comparison and logical operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BinaryOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

/// Unary operators (currently just logical NOT).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum UnaryOp {
    Not,
}

/// Predicate expression tree evaluated against one decoded record.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Expr {
    Literal(Value),
    /// Attribute reference by name, resolved against the scan's schema.
    Column(String),
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
}

/// Evaluation context consisting of the attribute names in schema order.
pub struct EvalContext<'a> {
    pub columns: &'a [String],
}

impl EvalContext<'_> {
    /// Evaluate an expression over a decoded attribute row.
    pub fn eval(&self, expr: &Expr, values: &[Value]) -> DbResult<Value> {
        match expr {
            Expr::Literal(v) => Ok(v.clone()),
            Expr::Column(name) => {
                let idx = self.find_column(name)?;
                Ok(values[idx].clone())
            }
            Expr::Unary { op, expr } => {
                let v = self.eval(expr, values)?;
                match op {
                    UnaryOp::Not => {
                        let b = v.as_bool().ok_or_else(|| {
                            DbError::TypeMismatch(format!("NOT expects bool, got {:?}", v))
                        })?;
                        Ok(Value::Bool(!b))
                    }
                }
            }
            Expr::Binary { left, op, right } => {
                let lv = self.eval(left, values)?;
                let rv = self.eval(right, values)?;
                eval_binary(&lv, *op, &rv)
            }
        }
    }

    /// Find an attribute index by name, case-insensitively.
    fn find_column(&self, name: &str) -> DbResult<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
            .ok_or_else(|| DbError::InvalidParameter(format!("unknown attribute '{}'", name)))
    }
}

fn eval_binary(l: &Value, op: BinaryOp, r: &Value) -> DbResult<Value> {
    use BinaryOp::*;

    if matches!(op, And | Or) {
        let lb = l
            .as_bool()
            .ok_or_else(|| DbError::TypeMismatch(format!("AND/OR expects bools, got {:?}", l)))?;
        let rb = r
            .as_bool()
            .ok_or_else(|| DbError::TypeMismatch(format!("AND/OR expects bools, got {:?}", r)))?;
        return Ok(Value::Bool(match op {
            And => lb && rb,
            Or => lb || rb,
            _ => unreachable!(),
        }));
    }

    let ord = l.cmp_same_type(r).ok_or_else(|| {
        DbError::TypeMismatch(format!("incompatible types for {:?}: {:?}, {:?}", op, l, r))
    })?;

    let result = match op {
        Eq => ord == Ordering::Equal,
        Ne => ord != Ordering::Equal,
        Lt => ord == Ordering::Less,
        Le => ord != Ordering::Greater,
        Gt => ord == Ordering::Greater,
        Ge => ord != Ordering::Less,
        _ => unreachable!(),
    };

    Ok(Value::Bool(result))
}
