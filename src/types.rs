use crate::{
    ast::{Expr, Program, Stmt},
    env::Env,
    error::{Error, Site},
    value::Kind,
};
use tracing::{debug, trace};

/// Proof that a program passed analysis. Only [`check`] can build one, and
/// only a `Checked` program can be evaluated.
#[derive(Debug, Clone, Copy)]
pub struct Checked<'a> {
    program: &'a Program,
}

impl<'a> Checked<'a> {
    pub fn program(&self) -> &'a Program {
        self.program
    }
}

struct Checker {
    venv: Env<Kind>,
    at: Site,
}

impl Checker {
    fn new() -> Self {
        Self {
            venv: Env::new(),
            at: Site {
                index: 0,
                pos: Default::default(),
            },
        }
    }

    fn resolve(&self, expr: &Expr) -> Result<Kind, Error> {
        match expr {
            Expr::Integer(_) | Expr::Real(_) => Ok(Kind::Number),
            Expr::Str(_) => Ok(Kind::Str),
            Expr::Bool(_) => Ok(Kind::Bool),
            Expr::Ident(name) => {
                self.venv
                    .lookup(name)
                    .copied()
                    .ok_or_else(|| Error::NotDefined {
                        name: name.inner.clone(),
                        at: self.at,
                    })
            }
            Expr::BinOp { lhs, rhs, op } => {
                let lty = self.resolve(lhs)?;
                let rty = self.resolve(rhs)?;
                trace!(%lty, op = %op.inner, %rty, "operands");
                Kind::binary(**op, lty, rty).ok_or(Error::UnsupportedOperandType {
                    op: **op,
                    lty,
                    rty,
                    at: self.at,
                })
            }
            Expr::Call { func, arg } => {
                let kind = self.resolve(arg)?;
                Kind::call(**func, kind).ok_or(Error::UnsupportedArgumentType {
                    func: **func,
                    kind,
                    at: self.at,
                })
            }
        }
    }

    fn check_stmt(&mut self, stmt: &Stmt) -> Result<(), Error> {
        match stmt {
            Stmt::Assign { name, val } => {
                // the target is defined only after its value resolves
                let kind = self.resolve(val)?;
                self.venv.define_or_update(name, kind);
            }
            Stmt::Print(Some(expr)) | Stmt::Expr(expr) => {
                self.resolve(expr)?;
            }
            Stmt::Print(None) => (),
        }
        Ok(())
    }
}

/// Resolves every name in program order and stops at the first violation.
#[tracing::instrument(level = "debug", skip_all, fields(stmts = program.len()))]
pub fn check(program: &Program) -> Result<Checked<'_>, Error> {
    let mut checker = Checker::new();
    for (index, stmt) in program.iter().enumerate() {
        checker.at = Site {
            index,
            pos: stmt.pos,
        };
        debug!(index, line = stmt.pos.line(), "check");
        if let Err(err) = checker.check_stmt(stmt) {
            debug!(%err, "analysis halted");
            return Err(err);
        }
    }
    Ok(Checked { program })
}
