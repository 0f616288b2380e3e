use crate::{
    ast::{Builtin, Op, Pos, WithPos},
    parser::Rule,
    value::Kind,
};
use std::{fmt::Display, io, num};
use thiserror::Error;

/// A statement's index in its program and its source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Site {
    pub index: usize,
    pub pos: Pos,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("{}", .0)]
    ParseError(#[from] pest::error::Error<Rule>),
    #[error("{}, {}", .0.pos, .0.inner)]
    ParseIntError(WithPos<num::ParseIntError>),
    #[error("{}, {}", .0.pos, .0.inner)]
    ParseFloatError(WithPos<num::ParseFloatError>),
    #[error("{}, incomplete expression", .0)]
    IncompleteExpression(Pos),

    #[error("{}, name '{}' is not defined", at.pos, name)]
    NotDefined { name: String, at: Site },
    #[error("{}, unsupported operand type(s) {} and {} for {}", at.pos, lty, rty, op)]
    UnsupportedOperandType {
        op: Op,
        lty: Kind,
        rty: Kind,
        at: Site,
    },
    #[error("{}, unsupported argument type {} for {}", at.pos, kind, func)]
    UnsupportedArgumentType {
        func: Builtin,
        kind: Kind,
        at: Site,
    },

    #[error("{}, division by zero in {}", at.pos, op)]
    DivideByZero { op: Op, at: Site },
    #[error("{}, integer overflow in {}", at.pos, op)]
    Overflow { op: Op, at: Site },
    #[error("{}, invalid string '{}' for {}", at.pos, text, func)]
    InvalidConversion {
        func: Builtin,
        text: String,
        at: Site,
    },
    #[error("{}, {}", at.pos, err)]
    IOError { err: io::Error, at: Site },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    Semantic,
    Runtime,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Syntax => "syntax",
            Self::Semantic => "semantic",
            Self::Runtime => "runtime",
        })
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ParseError(_)
            | Error::ParseIntError(_)
            | Error::ParseFloatError(_)
            | Error::IncompleteExpression(_) => ErrorKind::Syntax,
            Error::NotDefined { .. }
            | Error::UnsupportedOperandType { .. }
            | Error::UnsupportedArgumentType { .. } => ErrorKind::Semantic,
            Error::DivideByZero { .. }
            | Error::Overflow { .. }
            | Error::InvalidConversion { .. }
            | Error::IOError { .. } => ErrorKind::Runtime,
        }
    }

    pub fn site(&self) -> Option<Site> {
        match self {
            Error::NotDefined { at, .. }
            | Error::UnsupportedOperandType { at, .. }
            | Error::UnsupportedArgumentType { at, .. }
            | Error::DivideByZero { at, .. }
            | Error::Overflow { at, .. }
            | Error::InvalidConversion { at, .. }
            | Error::IOError { at, .. } => Some(*at),
            _ => None,
        }
    }

    /// The offending name or operator, if there is one.
    pub fn subject(&self) -> Option<String> {
        match self {
            Error::NotDefined { name, .. } => Some(name.clone()),
            Error::UnsupportedOperandType { op, .. }
            | Error::DivideByZero { op, .. }
            | Error::Overflow { op, .. } => Some(op.to_string()),
            Error::UnsupportedArgumentType { func, .. }
            | Error::InvalidConversion { func, .. } => Some(func.to_string()),
            _ => None,
        }
    }

    pub fn diagnostic(&self) -> Diagnostic {
        let site = self.site();
        Diagnostic {
            kind: self.kind(),
            message: self.to_string(),
            subject: self.subject(),
            statement: site.map(|site| site.index),
            pos: site.map(|site| site.pos),
        }
    }
}

/// The single report produced for a failed run.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub message: String,
    pub subject: Option<String>,
    pub statement: Option<usize>,
    pub pos: Option<Pos>,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.statement, self.pos) {
            // statements are numbered from 1 for humans
            (Some(index), Some(pos)) => write!(
                f,
                "{} error (statement {}, line {}): {}",
                self.kind,
                index + 1,
                pos.line(),
                self.message
            ),
            _ => write!(f, "{} error: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for Diagnostic {}
