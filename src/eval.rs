use crate::{
    ast::{Builtin, Expr, Op, Stmt, WithPos},
    env::SymbolTable,
    error::{Error, Site},
    types::Checked,
    value::{CallError, Number, OpError, Value},
};
use std::io::Write;
use tracing::{debug, trace, warn};

struct Interpreter<'t, W> {
    venv: &'t mut SymbolTable,
    out: W,
    at: Site,
}

impl<'t, W: Write> Interpreter<'t, W> {
    fn lift(&self, err: OpError, op: Op) -> Error {
        match err {
            OpError::Unsupported { lty, rty } => Error::UnsupportedOperandType {
                op,
                lty,
                rty,
                at: self.at,
            },
            OpError::DivideByZero => Error::DivideByZero { op, at: self.at },
            OpError::Overflow => Error::Overflow { op, at: self.at },
        }
    }

    fn lift_call(&self, err: CallError, func: Builtin) -> Error {
        match err {
            CallError::Unsupported(kind) => Error::UnsupportedArgumentType {
                func,
                kind,
                at: self.at,
            },
            CallError::InvalidString(text) => Error::InvalidConversion {
                func,
                text,
                at: self.at,
            },
        }
    }

    fn eval(&self, expr: &Expr) -> Result<Value, Error> {
        match expr {
            Expr::Integer(int) => Ok(Value::Number(Number::Int(*int))),
            Expr::Real(real) => Ok(Value::Number(Number::Real(*real))),
            Expr::Str(string) => Ok(Value::Str(string.clone())),
            Expr::Bool(flag) => Ok(Value::Bool(*flag)),
            Expr::Ident(name) => self.read(name),
            Expr::BinOp { lhs, rhs, op } => {
                let lhs = self.eval(lhs)?;
                let rhs = self.eval(rhs)?;
                trace!(%lhs, op = %op.inner, %rhs, "apply");
                Value::binary(**op, &lhs, &rhs).map_err(|err| self.lift(err, **op))
            }
            Expr::Call { func, arg } => {
                let arg = self.eval(arg)?;
                Value::call(**func, &arg).map_err(|err| self.lift_call(err, **func))
            }
        }
    }

    fn read(&self, name: &WithPos<String>) -> Result<Value, Error> {
        // analysis has bound every name already; this only guards misuse
        self.venv
            .lookup(name)
            .cloned()
            .ok_or_else(|| Error::NotDefined {
                name: name.inner.clone(),
                at: self.at,
            })
    }

    fn write(&mut self, val: Option<Value>) -> Result<(), Error> {
        let written = match val {
            Some(val) => writeln!(self.out, "{}", val),
            None => writeln!(self.out),
        };
        written.map_err(|err| Error::IOError { err, at: self.at })
    }

    fn exec(&mut self, stmt: &Stmt) -> Result<(), Error> {
        match stmt {
            Stmt::Assign { name, val } => {
                let val = self.eval(val)?;
                debug!(name = %name.inner, %val, "assign");
                self.venv.define_or_update(name, val);
            }
            Stmt::Print(expr) => {
                let val = expr.as_ref().map(|expr| self.eval(expr)).transpose()?;
                self.write(val)?;
            }
            Stmt::Expr(expr) => {
                self.eval(expr)?;
            }
        }
        Ok(())
    }
}

/// Runs an analyzed program, writing one line per print to `out` as it
/// happens. A runtime error stops execution at the failing statement; lines
/// already written stay written and `venv` keeps the bindings made so far.
#[tracing::instrument(level = "debug", skip_all, fields(stmts = checked.program().len()))]
pub fn eval<W: Write>(checked: &Checked, venv: &mut SymbolTable, out: W) -> Result<(), Error> {
    let mut interp = Interpreter {
        venv,
        out,
        at: Site {
            index: 0,
            pos: Default::default(),
        },
    };
    for (index, stmt) in checked.program().iter().enumerate() {
        interp.at = Site {
            index,
            pos: stmt.pos,
        };
        if let Err(err) = interp.exec(stmt) {
            warn!(%err, "execution halted");
            return Err(err);
        }
    }
    interp
        .out
        .flush()
        .map_err(|err| Error::IOError { err, at: interp.at })
}
