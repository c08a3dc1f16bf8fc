//! Dynamic runtime values and numeric widening.
//!
//! Everything that flows across a data path is a [`Value`]. The enum is a
//! closed dynamic type in the spirit of `serde_json::Value`, extended with the
//! full ladder of numeric classes so arithmetic nodes can widen operands
//! instead of collapsing everything to one float width.
//!
//! # Widening
//!
//! Numeric classes form a total order:
//!
//! ```text
//! Byte < Short < Int < Long < Float < Double
//! ```
//!
//! A binary operator widens both operands to the larger class and produces a
//! result of that class. Widening is therefore associative and commutative
//! (it is `max` over a total order).
//!
//! # Examples
//!
//! ```rust
//! use pathloom::value::{apply_binary, MathOp, Value};
//!
//! let v = apply_binary(MathOp::Mul, &Value::Int(3), &Value::Int(4)).unwrap();
//! assert_eq!(v, Value::Int(12));
//!
//! // Int * Double widens to Double.
//! let v = apply_binary(MathOp::Mul, &Value::Int(2), &Value::Double(1.5)).unwrap();
//! assert_eq!(v, Value::Double(3.0));
//! ```

use std::collections::BTreeMap;
use std::fmt;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by value narrowing and arithmetic.
#[derive(Debug, Clone, Error, Diagnostic, PartialEq, Eq)]
pub enum ValueError {
    /// A value did not have the class an operation required.
    #[error("type mismatch: expected {expected}, got {got}")]
    #[diagnostic(
        code(pathloom::value::type_mismatch),
        help("Check the upstream producer for this data path.")
    )]
    TypeMismatch {
        expected: &'static str,
        got: &'static str,
    },

    /// Integer-class division with a zero divisor.
    #[error("division by zero in {class} arithmetic")]
    #[diagnostic(code(pathloom::value::divide_by_zero))]
    DivideByZero { class: &'static str },
}

impl ValueError {
    pub(crate) fn mismatch(expected: &'static str, got: &Value) -> Self {
        ValueError::TypeMismatch {
            expected,
            got: got.class_name(),
        }
    }
}

/// A dynamic runtime value.
///
/// Maps are string-keyed; dispatch-key *tables* in the graph model use
/// structural [`Value`] equality instead, so integer dispatch keys remain
/// expressible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Str(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Human-readable class name, used in diagnostics.
    pub fn class_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Byte(_) => "Byte",
            Value::Short(_) => "Short",
            Value::Int(_) => "Int",
            Value::Long(_) => "Long",
            Value::Float(_) => "Float",
            Value::Double(_) => "Double",
            Value::Str(_) => "Str",
            Value::List(_) => "List",
            Value::Map(_) => "Map",
        }
    }

    /// The numeric class of this value, if it has one.
    pub fn numeric_class(&self) -> Option<NumericClass> {
        match self {
            Value::Byte(_) => Some(NumericClass::Byte),
            Value::Short(_) => Some(NumericClass::Short),
            Value::Int(_) => Some(NumericClass::Int),
            Value::Long(_) => Some(NumericClass::Long),
            Value::Float(_) => Some(NumericClass::Float),
            Value::Double(_) => Some(NumericClass::Double),
            _ => None,
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Byte(v) => Some(v as i64),
            Value::Short(v) => Some(v as i64),
            Value::Int(v) => Some(v as i64),
            Value::Long(v) => Some(v),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Byte(v) => Some(v as f64),
            Value::Short(v) => Some(v as f64),
            Value::Int(v) => Some(v as f64),
            Value::Long(v) => Some(v as f64),
            Value::Float(v) => Some(v as f64),
            Value::Double(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Byte(v) => write!(f, "{v}"),
            Value::Short(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Long(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Str(v) => write!(f, "{v}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Ordered numeric classes. `Ord` is the widening order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NumericClass {
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl NumericClass {
    pub fn name(self) -> &'static str {
        match self {
            NumericClass::Byte => "Byte",
            NumericClass::Short => "Short",
            NumericClass::Int => "Int",
            NumericClass::Long => "Long",
            NumericClass::Float => "Float",
            NumericClass::Double => "Double",
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            NumericClass::Byte | NumericClass::Short | NumericClass::Int | NumericClass::Long
        )
    }
}

impl fmt::Display for NumericClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Widen two classes to the smallest class that holds both.
pub fn widen(a: NumericClass, b: NumericClass) -> NumericClass {
    a.max(b)
}

/// Binary arithmetic operators supported by math nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MathOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl fmt::Display for MathOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MathOp::Add => "Add",
            MathOp::Sub => "Sub",
            MathOp::Mul => "Mul",
            MathOp::Div => "Div",
        };
        f.write_str(s)
    }
}

/// Apply a binary operator with numeric widening.
///
/// Both operands are converted to the widened class before the operator runs,
/// and the result carries that class. Integer classes wrap on overflow; a zero
/// divisor in an integer class is an error, while float division follows IEEE.
pub fn apply_binary(op: MathOp, lhs: &Value, rhs: &Value) -> Result<Value, ValueError> {
    let lc = lhs
        .numeric_class()
        .ok_or_else(|| ValueError::mismatch("numeric", lhs))?;
    let rc = rhs
        .numeric_class()
        .ok_or_else(|| ValueError::mismatch("numeric", rhs))?;
    let class = widen(lc, rc);

    if class.is_integer() {
        // as_i64 cannot fail for integer classes.
        let a = lhs.as_i64().expect("integer class");
        let b = rhs.as_i64().expect("integer class");
        let out = match op {
            MathOp::Add => a.wrapping_add(b),
            MathOp::Sub => a.wrapping_sub(b),
            MathOp::Mul => a.wrapping_mul(b),
            MathOp::Div => {
                if b == 0 {
                    return Err(ValueError::DivideByZero {
                        class: class.name(),
                    });
                }
                a.wrapping_div(b)
            }
        };
        Ok(match class {
            NumericClass::Byte => Value::Byte(out as i8),
            NumericClass::Short => Value::Short(out as i16),
            NumericClass::Int => Value::Int(out as i32),
            NumericClass::Long => Value::Long(out),
            _ => unreachable!("integer class"),
        })
    } else {
        let a = lhs.as_f64().expect("numeric class");
        let b = rhs.as_f64().expect("numeric class");
        let out = match op {
            MathOp::Add => a + b,
            MathOp::Sub => a - b,
            MathOp::Mul => a * b,
            MathOp::Div => a / b,
        };
        Ok(match class {
            NumericClass::Float => Value::Float(out as f32),
            NumericClass::Double => Value::Double(out),
            _ => unreachable!("float class"),
        })
    }
}

// Lossless narrowing out of a Value. Integer targets accept any integer class
// that fits their width; f64 accepts every numeric class.

impl TryFrom<Value> for i8 {
    type Error = ValueError;
    fn try_from(v: Value) -> Result<Self, Self::Error> {
        match v {
            Value::Byte(n) => Ok(n),
            other => Err(ValueError::mismatch("Byte", &other)),
        }
    }
}

impl TryFrom<Value> for i16 {
    type Error = ValueError;
    fn try_from(v: Value) -> Result<Self, Self::Error> {
        match v {
            Value::Byte(n) => Ok(n as i16),
            Value::Short(n) => Ok(n),
            other => Err(ValueError::mismatch("Short", &other)),
        }
    }
}

impl TryFrom<Value> for i32 {
    type Error = ValueError;
    fn try_from(v: Value) -> Result<Self, Self::Error> {
        match v {
            Value::Byte(n) => Ok(n as i32),
            Value::Short(n) => Ok(n as i32),
            Value::Int(n) => Ok(n),
            other => Err(ValueError::mismatch("Int", &other)),
        }
    }
}

impl TryFrom<Value> for i64 {
    type Error = ValueError;
    fn try_from(v: Value) -> Result<Self, Self::Error> {
        match v {
            Value::Byte(n) => Ok(n as i64),
            Value::Short(n) => Ok(n as i64),
            Value::Int(n) => Ok(n as i64),
            Value::Long(n) => Ok(n),
            other => Err(ValueError::mismatch("Long", &other)),
        }
    }
}

impl TryFrom<Value> for f32 {
    type Error = ValueError;
    fn try_from(v: Value) -> Result<Self, Self::Error> {
        match v {
            Value::Float(n) => Ok(n),
            other => Err(ValueError::mismatch("Float", &other)),
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = ValueError;
    fn try_from(v: Value) -> Result<Self, Self::Error> {
        v.as_f64()
            .ok_or_else(|| ValueError::mismatch("Double", &v))
    }
}

impl TryFrom<Value> for bool {
    type Error = ValueError;
    fn try_from(v: Value) -> Result<Self, Self::Error> {
        match v {
            Value::Bool(b) => Ok(b),
            other => Err(ValueError::mismatch("Bool", &other)),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = ValueError;
    fn try_from(v: Value) -> Result<Self, Self::Error> {
        match v {
            Value::Str(s) => Ok(s),
            other => Err(ValueError::mismatch("Str", &other)),
        }
    }
}

impl TryFrom<Value> for BTreeMap<String, Value> {
    type Error = ValueError;
    fn try_from(v: Value) -> Result<Self, Self::Error> {
        match v {
            Value::Map(m) => Ok(m),
            other => Err(ValueError::mismatch("Map", &other)),
        }
    }
}

impl TryFrom<Value> for Vec<Value> {
    type Error = ValueError;
    fn try_from(v: Value) -> Result<Self, Self::Error> {
        match v {
            Value::List(items) => Ok(items),
            other => Err(ValueError::mismatch("List", &other)),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widen_is_max_over_the_order() {
        use NumericClass::*;
        assert_eq!(widen(Byte, Short), Short);
        assert_eq!(widen(Int, Long), Long);
        assert_eq!(widen(Long, Float), Float);
        assert_eq!(widen(Double, Byte), Double);
        assert_eq!(widen(Int, Int), Int);
    }

    #[test]
    fn mul_same_class_keeps_class() {
        let v = apply_binary(MathOp::Mul, &Value::Int(3), &Value::Int(4)).unwrap();
        assert_eq!(v, Value::Int(12));
        assert_eq!(v.class_name(), "Int");
    }

    #[test]
    fn add_widens_byte_to_long() {
        let v = apply_binary(MathOp::Add, &Value::Byte(1), &Value::Long(2)).unwrap();
        assert_eq!(v, Value::Long(3));
    }

    #[test]
    fn float_contaminates_integers() {
        let v = apply_binary(MathOp::Mul, &Value::Int(2), &Value::Float(1.5)).unwrap();
        assert_eq!(v, Value::Float(3.0));
    }

    #[test]
    fn non_numeric_operand_is_a_mismatch() {
        let err = apply_binary(MathOp::Add, &Value::Str("x".into()), &Value::Int(1)).unwrap_err();
        assert!(matches!(err, ValueError::TypeMismatch { got: "Str", .. }));
    }

    #[test]
    fn integer_division_by_zero_fails() {
        let err = apply_binary(MathOp::Div, &Value::Int(1), &Value::Int(0)).unwrap_err();
        assert!(matches!(err, ValueError::DivideByZero { .. }));
        // Float division by zero follows IEEE instead.
        let v = apply_binary(MathOp::Div, &Value::Double(1.0), &Value::Int(0)).unwrap();
        assert_eq!(v, Value::Double(f64::INFINITY));
    }

    #[test]
    fn narrowing_accepts_lossless_widening_only() {
        assert_eq!(i64::try_from(Value::Int(7)).unwrap(), 7);
        assert_eq!(i32::try_from(Value::Byte(7)).unwrap(), 7);
        assert!(i32::try_from(Value::Long(7)).is_err());
        assert_eq!(f64::try_from(Value::Int(2)).unwrap(), 2.0);
        assert_eq!(String::try_from(Value::Str("ok".into())).unwrap(), "ok");
    }

    #[test]
    fn serde_round_trip() {
        let v = Value::Map(BTreeMap::from([
            ("a".to_string(), Value::Int(1)),
            ("b".to_string(), Value::List(vec![Value::Bool(true)])),
        ]));
        let text = serde_json::to_string(&v).unwrap();
        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v, back);
    }
}
