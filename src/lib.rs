#[macro_use]
extern crate pest_derive;

pub mod ast;
pub mod env;
pub mod error;
pub mod eval;
pub mod parser;
pub mod types;
pub mod value;

use ast::Program;
use env::SymbolTable;
use error::Error;
use std::io::Write;

/// Analyzes the whole program first and runs it only if that succeeds, so a
/// semantic error never produces output.
pub fn run<W: Write>(program: &Program, venv: &mut SymbolTable, out: W) -> Result<(), Error> {
    let checked = types::check(program)?;
    eval::eval(&checked, venv, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ast::Op;
    use error::{ErrorKind, Site};
    use pretty_assertions::assert_eq;
    use std::{fs, path::PathBuf};
    use value::Value;

    fn sample_path(file_name: &str) -> PathBuf {
        [env!("CARGO_MANIFEST_DIR"), "samples", file_name]
            .iter()
            .collect()
    }

    fn test_sample(file_name: &str) -> (String, Result<(), Error>) {
        let src = fs::read_to_string(sample_path(file_name)).unwrap();
        let mut out = Vec::new();
        let result = parser::parse(&src)
            .and_then(|program| run(&program, &mut SymbolTable::new(), &mut out));
        (String::from_utf8(out).unwrap(), result)
    }

    fn expected(file_name: &str) -> String {
        fs::read_to_string(sample_path(file_name)).unwrap()
    }

    fn not_defined(result: Result<(), Error>) -> Option<(String, usize)> {
        match result {
            Err(Error::NotDefined { name, at }) => Some((name, at.index)),
            _ => None,
        }
    }

    #[test]
    fn test_successful_samples() {
        for name in ["ints", "mixed", "convert"] {
            let (out, result) = test_sample(&format!("{name}.py"));
            assert!(result.is_ok(), "{name}: {result:?}");
            assert_eq!(out, expected(&format!("{name}.out")));
        }
    }

    #[rustfmt::skip]
    #[test]
    fn test_semantic_samples() {
        for (file_name, name, index) in [
            ("undefined.py", "xx", 8),
            ("never_reached.py", "xyz", 3),
            ("late_error.py", "fred", 3),
            ("self_ref.py", "x", 0),
        ] {
            let (out, result) = test_sample(file_name);
            assert_eq!(out, "", "{file_name} printed before analysis finished");
            assert_eq!(not_defined(result), Some((name.to_string(), index)), "{file_name}");
        }

        let (out, result) = test_sample("bad_operands.py");
        assert_eq!(out, "");
        assert!(matches!(result, Err(Error::UnsupportedOperandType { op: Op::Mul, .. })));
    }

    #[test]
    fn test_runtime_sample() {
        let (out, result) = test_sample("zero_divisor.py");
        assert_eq!(out, "TEST CASE: zero_divisor.py\n10\n");
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            Error::DivideByZero {
                op: Op::Mod,
                at: Site { index: 4, .. }
            }
        ));
        let diag = err.diagnostic();
        assert_eq!(diag.kind, ErrorKind::Runtime);
        assert_eq!(diag.pos.map(|pos| pos.line()), Some(5));
    }

    #[test]
    fn test_bad_conversion_sample() {
        let (out, result) = test_sample("bad_conversion.py");
        assert_eq!(out, "TEST CASE: bad_conversion.py\n12\n");
        let diag = result.unwrap_err().diagnostic();
        assert_eq!(diag.kind, ErrorKind::Runtime);
        assert_eq!(diag.subject.as_deref(), Some("int()"));
        assert_eq!(diag.statement, Some(4));
        assert_eq!(
            diag.to_string(),
            "runtime error (statement 5, line 5): 5:1, invalid string 'twelve' for int()"
        );
    }

    #[test]
    fn test_undefined_line() {
        let (_, result) = test_sample("undefined.py");
        let diag = result.unwrap_err().diagnostic();
        assert_eq!(diag.kind, ErrorKind::Semantic);
        assert_eq!(diag.subject.as_deref(), Some("xx"));
        assert_eq!(diag.pos.map(|pos| pos.line()), Some(14));
    }

    #[test]
    fn test_scenarios() {
        let run_src = |src: &str| {
            let mut venv = SymbolTable::new();
            let mut out = Vec::new();
            run(&parser::parse(src).unwrap(), &mut venv, &mut out).unwrap();
            (String::from_utf8(out).unwrap(), venv)
        };

        let (out, _) = run_src("x = 100\ny = x - 140\nprint(y)\n");
        assert_eq!(out, "-40\n");

        let (_, venv) = run_src("z = 1600\ntest4 = z / 3\n");
        assert_eq!(venv.lookup("test4").map(ToString::to_string).as_deref(), Some("533.3333333333334"));

        let (_, venv) = run_src("test5 = 1600 % 11\ntest6 = test5 ** 4");
        assert_eq!(venv.lookup("test5"), Some(&Value::from(5i64)));
        assert_eq!(venv.lookup("test6"), Some(&Value::from(625i64)));
    }
}
