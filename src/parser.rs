use crate::{
    ast::{Builtin, Expr, Op, Pos, Program, Stmt, WithPos},
    error::Error,
    value::{parse_int_literal, parse_real_literal},
};
use pest::iterators::Pair;
use pest::Parser;
use std::collections::LinkedList;

#[derive(Parser)]
#[grammar = "nupython.pest"]
struct NuPythonParser;

impl From<Pair<'_, Rule>> for WithPos<String> {
    fn from(value: Pair<Rule>) -> Self {
        WithPos {
            pos: value.line_col().into(),
            inner: value.as_str().into(),
        }
    }
}

fn apply(op: WithPos<Op>, exprs: &mut LinkedList<Expr>) -> Result<(), Error> {
    let rhs = exprs.pop_back().ok_or(Error::IncompleteExpression(op.pos))?;
    let lhs = exprs.pop_back().ok_or(Error::IncompleteExpression(op.pos))?;
    exprs.push_back(Expr::BinOp {
        lhs: lhs.into(),
        rhs: rhs.into(),
        op,
    });
    Ok(())
}

fn rule_to_op(rule: Rule) -> Op {
    match rule {
        Rule::add => Op::Add,
        Rule::sub => Op::Sub,
        Rule::mul => Op::Mul,
        Rule::div => Op::Div,
        Rule::rem => Op::Mod,
        Rule::pow => Op::Pow,
        Rule::eq => Op::Eq,
        Rule::ne => Op::Ne,
        Rule::lt => Op::Lt,
        Rule::le => Op::Le,
        Rule::gt => Op::Gt,
        Rule::ge => Op::Ge,
        _ => unreachable!(),
    }
}

/// Pops every pending operator that binds at least as tightly as `op`.
fn reduce(
    op: Op,
    ops: &mut LinkedList<WithPos<Op>>,
    exprs: &mut LinkedList<Expr>,
) -> Result<(), Error> {
    while let Some(top) = ops.pop_back() {
        let binds = if op.is_right_assoc() {
            top.precedence() > op.precedence()
        } else {
            top.precedence() >= op.precedence()
        };
        if !binds {
            ops.push_back(top);
            break;
        }
        apply(top, exprs)?;
    }
    Ok(())
}

fn parse_call(pair: Pair<Rule>) -> Result<Expr, Error> {
    let mut pairs = pair.into_inner();
    let func = pairs.next().unwrap();
    let builtin = match func.as_str() {
        "int" => Builtin::Int,
        _ => Builtin::Float,
    };
    Ok(Expr::Call {
        func: WithPos {
            pos: func.line_col().into(),
            inner: builtin,
        },
        arg: parse_expr(pairs.next().unwrap())?.into(),
    })
}

fn parse_expr(pair: Pair<Rule>) -> Result<Expr, Error> {
    let pos: Pos = pair.line_col().into();
    let mut exprs = LinkedList::new();
    let mut ops = LinkedList::new();
    for pair in pair.into_inner() {
        match pair.as_rule() {
            Rule::expr => exprs.push_back(parse_expr(pair)?),
            rule @ (Rule::add
            | Rule::sub
            | Rule::mul
            | Rule::div
            | Rule::rem
            | Rule::pow
            | Rule::eq
            | Rule::ne
            | Rule::lt
            | Rule::le
            | Rule::gt
            | Rule::ge) => {
                let op = rule_to_op(rule);
                reduce(op, &mut ops, &mut exprs)?;
                ops.push_back(WithPos {
                    pos: pair.line_col().into(),
                    inner: op,
                });
            }
            Rule::int => {
                let lit: WithPos<String> = pair.into();
                let int = parse_int_literal(&lit)
                    .map_err(|err| Error::ParseIntError(lit.with_inner(err)))?;
                exprs.push_back(Expr::Integer(int));
            }
            Rule::real => {
                let lit: WithPos<String> = pair.into();
                let real = parse_real_literal(&lit)
                    .map_err(|err| Error::ParseFloatError(lit.with_inner(err)))?;
                exprs.push_back(Expr::Real(real));
            }
            Rule::string => {
                let quoted = pair.as_str();
                exprs.push_back(Expr::Str(quoted[1..quoted.len() - 1].into()));
            }
            Rule::boolean => exprs.push_back(Expr::Bool(pair.as_str() == "True")),
            Rule::ident => exprs.push_back(Expr::Ident(pair.into())),
            Rule::call => exprs.push_back(parse_call(pair)?),
            _ => unreachable!(),
        }
    }
    while let Some(op) = ops.pop_back() {
        apply(op, &mut exprs)?;
    }
    exprs.pop_back().ok_or(Error::IncompleteExpression(pos))
}

fn parse_stmt(pair: Pair<Rule>) -> Result<Stmt, Error> {
    match pair.as_rule() {
        Rule::print => Ok(Stmt::Print(
            pair.into_inner().next().map(parse_expr).transpose()?,
        )),
        Rule::assign => {
            let mut pairs = pair.into_inner();
            let name = pairs.next().unwrap().into();
            Ok(Stmt::Assign {
                name,
                val: parse_expr(pairs.next().unwrap())?,
            })
        }
        Rule::expr_stmt => Ok(Stmt::Expr(parse_expr(pair.into_inner().next().unwrap())?)),
        _ => unreachable!(),
    }
}

pub fn parse(src: &str) -> Result<Program, Error> {
    let mut program = Program::new();
    for pair in NuPythonParser::parse(Rule::main, src)?
        .next()
        .unwrap()
        .into_inner()
    {
        if pair.as_rule() == Rule::EOI {
            break;
        }
        let pos: Pos = pair.line_col().into();
        program.0.push(WithPos {
            pos,
            inner: parse_stmt(pair)?,
        });
    }
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use std::{fs, path::Path};

    fn only_expr(src: &str) -> Expr {
        match parse(src).unwrap().0.remove(0).inner {
            Stmt::Assign { val, .. } | Stmt::Expr(val) | Stmt::Print(Some(val)) => val,
            stmt => panic!("no expression in {stmt:?}"),
        }
    }

    #[test]
    fn test_samples() -> Result<()> {
        for sample in fs::read_dir(Path::new(env!("CARGO_MANIFEST_DIR")).join("samples"))? {
            let path = sample?.path();
            if path.extension().map_or(false, |ext| ext == "py") {
                parse(&fs::read_to_string(&path)?)
                    .map_err(|error| anyhow!("Parse {:?}: {}", path.file_name(), error))?;
            }
        }
        Ok(())
    }

    #[test]
    fn test_statements() {
        let program = parse(
            "# leading comment\nprint(\"TEST CASE: x\")\nprint()\n\nx = 100   # 100\nx * xx\n",
        )
        .unwrap();
        assert_eq!(
            program,
            Program::from_iter([
                Stmt::Print(Some(Expr::Str("TEST CASE: x".into()))),
                Stmt::Print(None),
                Stmt::assign("x", Expr::Integer(100)),
                Stmt::Expr(Expr::binop(Expr::ident("x"), Op::Mul, Expr::ident("xx"))),
            ])
        );
        let lines: Vec<_> = program.iter().map(|stmt| stmt.pos.line()).collect();
        assert_eq!(lines, [2, 3, 5, 6]);
    }

    #[test]
    fn test_literals() {
        assert_eq!(only_expr("print(00000)"), Expr::Integer(0));
        assert_eq!(only_expr("print(01230)"), Expr::Integer(1230));
        assert_eq!(only_expr("y = 140.9"), Expr::Real(140.9));
        assert_eq!(only_expr("print('y is:')"), Expr::Str("y is:".into()));
        assert_eq!(only_expr("b = False"), Expr::Bool(false));
        assert_eq!(only_expr("Trueish"), Expr::ident("Trueish"));
        assert!(matches!(
            parse("x = 99999999999999999999"),
            Err(Error::ParseIntError(_))
        ));
    }

    #[test]
    fn test_precedence() {
        use Expr::Integer as I;
        assert_eq!(
            only_expr("1 + 2 * 3 ** 2 ** 2"),
            Expr::binop(
                I(1),
                Op::Add,
                Expr::binop(
                    I(2),
                    Op::Mul,
                    Expr::binop(I(3), Op::Pow, Expr::binop(I(2), Op::Pow, I(2)))
                )
            )
        );
        assert_eq!(
            only_expr("10 - 4 - 3 < 5"),
            Expr::binop(
                Expr::binop(Expr::binop(I(10), Op::Sub, I(4)), Op::Sub, I(3)),
                Op::Lt,
                I(5)
            )
        );
        assert_eq!(
            only_expr("(1 + 2) % x"),
            Expr::binop(Expr::binop(I(1), Op::Add, I(2)), Op::Mod, Expr::ident("x"))
        );
        assert_eq!(
            only_expr("y = x - 140"),
            Expr::binop(Expr::ident("x"), Op::Sub, I(140))
        );
        assert_eq!(only_expr("a <= -3"), Expr::binop(Expr::ident("a"), Op::Le, I(-3)));
    }

    #[test]
    fn test_calls() {
        assert_eq!(
            only_expr("n = int(s) + 1"),
            Expr::binop(Expr::call(Builtin::Int, Expr::ident("s")), Op::Add, Expr::Integer(1))
        );
        assert_eq!(
            only_expr("print(float('2.5'))"),
            Expr::call(Builtin::Float, Expr::Str("2.5".into()))
        );
        assert_eq!(only_expr("integer = 3"), Expr::Integer(3));
        assert_eq!(only_expr("int"), Expr::ident("int"));
    }

    #[test]
    fn test_operator_without_operands() {
        let mut exprs = LinkedList::from([Expr::Integer(1)]);
        let op = WithPos {
            pos: Pos(3, 7),
            inner: Op::Add,
        };
        assert!(matches!(
            apply(op, &mut exprs),
            Err(Error::IncompleteExpression(Pos(3, 7)))
        ));
    }

    #[test]
    fn test_syntax_error() {
        assert!(matches!(parse("x = = 3"), Err(Error::ParseError(_))));
        assert!(matches!(parse("print(x"), Err(Error::ParseError(_))));
        assert!(matches!(parse("x = 'open"), Err(Error::ParseError(_))));
    }
}
