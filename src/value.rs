use crate::ast::{Builtin, Op};
use std::{
    cmp::Ordering,
    fmt::Display,
    num::{ParseFloatError, ParseIntError},
};
use thiserror::Error;

/// Failure of a single binary operation, before it is tied to a statement.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpError {
    #[error("unsupported operand type(s) {lty} and {rty}")]
    Unsupported { lty: Kind, rty: Kind },
    #[error("division by zero")]
    DivideByZero,
    #[error("integer overflow")]
    Overflow,
}

/// Failure of a builtin conversion.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    #[error("unsupported argument type {0}")]
    Unsupported(Kind),
    #[error("invalid string '{0}'")]
    InvalidString(String),
}

/// Static category of a value. The analyzer only ever sees these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Number,
    Bool,
    Str,
}

impl Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Number => "number",
            Self::Bool => "bool",
            Self::Str => "str",
        })
    }
}

impl Kind {
    /// Kind produced by `lhs op rhs`, or `None` if the operands are rejected.
    pub fn binary(op: Op, lhs: Kind, rhs: Kind) -> Option<Kind> {
        match (op, lhs, rhs) {
            (op, Kind::Number, Kind::Number) if op.is_relational() => Some(Kind::Bool),
            (_, Kind::Number, Kind::Number) => Some(Kind::Number),
            (op, Kind::Str, Kind::Str) if op.is_relational() => Some(Kind::Bool),
            (Op::Eq | Op::Ne, Kind::Bool, Kind::Bool) => Some(Kind::Bool),
            _ => None,
        }
    }

    /// Kind produced by `func(arg)`. Both conversions take a string.
    pub fn call(_func: Builtin, arg: Kind) -> Option<Kind> {
        match arg {
            Kind::Str => Some(Kind::Number),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Real(f64),
}

/// Leading zeros are cosmetic: `01230` is `1230`, never octal.
pub fn parse_int_literal(text: &str) -> Result<i64, ParseIntError> {
    text.parse()
}

pub fn parse_real_literal(text: &str) -> Result<f64, ParseFloatError> {
    text.parse()
}

impl Number {
    /// Arithmetic with promotion: any real operand makes the whole operation
    /// real, and `/` is real even for two integers.
    pub fn arith(self, op: Op, rhs: Number) -> Result<Number, OpError> {
        use Number::{Int, Real};

        match (self, rhs) {
            (Int(lhs), Int(rhs)) => int_arith(op, lhs, rhs),
            (Int(lhs), Real(rhs)) => real_arith(op, lhs as f64, rhs),
            (Real(lhs), Int(rhs)) => real_arith(op, lhs, rhs as f64),
            (Real(lhs), Real(rhs)) => real_arith(op, lhs, rhs),
        }
    }

    pub fn compare(self, rhs: Number) -> Option<Ordering> {
        use Number::{Int, Real};

        match (self, rhs) {
            (Int(lhs), Int(rhs)) => Some(lhs.cmp(&rhs)),
            (Int(lhs), Real(rhs)) => (lhs as f64).partial_cmp(&rhs),
            (Real(lhs), Int(rhs)) => lhs.partial_cmp(&(rhs as f64)),
            (Real(lhs), Real(rhs)) => lhs.partial_cmp(&rhs),
        }
    }
}

fn int_arith(op: Op, lhs: i64, rhs: i64) -> Result<Number, OpError> {
    let int = match op {
        Op::Add => lhs.checked_add(rhs),
        Op::Sub => lhs.checked_sub(rhs),
        Op::Mul => lhs.checked_mul(rhs),
        Op::Div => return real_arith(op, lhs as f64, rhs as f64),
        Op::Mod if rhs == 0 => return Err(OpError::DivideByZero),
        // i64::MIN % -1 is 0 even though the quotient overflows
        Op::Mod if rhs == -1 => Some(0),
        Op::Mod => lhs.checked_rem(rhs),
        Op::Pow if rhs < 0 => return real_arith(op, lhs as f64, rhs as f64),
        Op::Pow => match lhs {
            0 | 1 if rhs > 0 => Some(lhs),
            -1 => Some(if rhs % 2 == 0 { 1 } else { -1 }),
            _ => u32::try_from(rhs)
                .ok()
                .and_then(|exp| lhs.checked_pow(exp)),
        },
        _ => {
            return Err(OpError::Unsupported {
                lty: Kind::Number,
                rty: Kind::Number,
            })
        }
    };
    int.map(Number::Int).ok_or(OpError::Overflow)
}

fn real_arith(op: Op, lhs: f64, rhs: f64) -> Result<Number, OpError> {
    Ok(Number::Real(match op {
        Op::Add => lhs + rhs,
        Op::Sub => lhs - rhs,
        Op::Mul => lhs * rhs,
        Op::Div | Op::Mod if rhs == 0.0 => return Err(OpError::DivideByZero),
        Op::Div => lhs / rhs,
        // Rust's `%` on floats is fmod: the sign follows the dividend.
        Op::Mod => lhs % rhs,
        Op::Pow if lhs == 0.0 && rhs < 0.0 => return Err(OpError::DivideByZero),
        Op::Pow => lhs.powf(rhs),
        _ => {
            return Err(OpError::Unsupported {
                lty: Kind::Number,
                rty: Kind::Number,
            })
        }
    }))
}

fn holds(op: Op, ord: Option<Ordering>) -> bool {
    match (op, ord) {
        (Op::Ne, None) => true,
        (Op::Eq, Some(ord)) => ord.is_eq(),
        (Op::Ne, Some(ord)) => ord.is_ne(),
        (Op::Lt, Some(ord)) => ord.is_lt(),
        (Op::Le, Some(ord)) => ord.is_le(),
        (Op::Gt, Some(ord)) => ord.is_gt(),
        (Op::Ge, Some(ord)) => ord.is_ge(),
        _ => false,
    }
}

impl Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Number::Int(int) => write!(f, "{}", int),
            Number::Real(real) => {
                // shortest round-trip digits, always with a fractional part
                let text = real.to_string();
                if real.is_finite() && !text.contains('.') {
                    write!(f, "{}.0", text)
                } else {
                    f.write_str(&text)
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(Number),
    Bool(bool),
    Str(String),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Number(_) => Kind::Number,
            Value::Bool(_) => Kind::Bool,
            Value::Str(_) => Kind::Str,
        }
    }

    pub fn binary(op: Op, lhs: &Value, rhs: &Value) -> Result<Value, OpError> {
        match (lhs, rhs) {
            (Value::Number(l), Value::Number(r)) if op.is_relational() => {
                Ok(Value::Bool(holds(op, l.compare(*r))))
            }
            (Value::Number(l), Value::Number(r)) => l.arith(op, *r).map(Value::Number),
            (Value::Str(l), Value::Str(r)) if op.is_relational() => {
                Ok(Value::Bool(holds(op, Some(l.cmp(r)))))
            }
            (Value::Bool(l), Value::Bool(r)) if matches!(op, Op::Eq | Op::Ne) => {
                Ok(Value::Bool(holds(op, Some(l.cmp(r)))))
            }
            _ => Err(OpError::Unsupported {
                lty: lhs.kind(),
                rty: rhs.kind(),
            }),
        }
    }

    /// `int()` and `float()` over a string, ignoring surrounding whitespace.
    pub fn call(func: Builtin, arg: &Value) -> Result<Value, CallError> {
        let Value::Str(text) = arg else {
            return Err(CallError::Unsupported(arg.kind()));
        };
        let converted = match func {
            Builtin::Int => parse_int_literal(text.trim()).map(Value::from).ok(),
            Builtin::Float => parse_real_literal(text.trim()).map(Value::from).ok(),
        };
        converted.ok_or_else(|| CallError::InvalidString(text.clone()))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(Number::Int(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(Number::Real(value))
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(number) => number.fmt(f),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Str(string) => f.write_str(string),
        }
    }
}
