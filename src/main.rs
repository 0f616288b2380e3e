use anyhow::{Context, Result};
use clap::Parser;
use nupy::{env::SymbolTable, error::Error, eval, parser, types};
use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
};
use tracing::info;

/// nuPython interpreter: analyzes the whole program, then runs it
#[derive(Parser, Debug)]
struct Args {
    file_name: PathBuf,

    /// Stop after semantic analysis
    #[arg(long)]
    check: bool,

    /// Print every binding once the program stops
    #[arg(long)]
    dump: bool,
}

/// Logging goes to stderr and is only installed when `RUST_LOG` is set.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn dump(venv: &SymbolTable, mut out: impl Write) -> io::Result<()> {
    for (name, val) in venv.iter() {
        writeln!(out, "{} ({}): {}", name, val.kind(), val)?;
    }
    out.flush()
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let src = fs::read_to_string(&args.file_name)
        .with_context(|| format!("cannot read {}", args.file_name.display()))?;

    let report = |err: Error| err.diagnostic();
    let program = parser::parse(&src).map_err(report)?;
    let checked = types::check(&program).map_err(report)?;
    info!(stmts = program.len(), "analysis passed");
    if args.check {
        return Ok(());
    }

    let mut venv = SymbolTable::new();
    let result = eval::eval(&checked, &mut venv, io::stdout().lock());
    if args.dump {
        dump(&venv, io::stdout().lock())?;
    }
    result.map_err(report)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump_lists_bindings_in_definition_order() {
        let program = parser::parse("x = 100\ns = 'hi'\nb = x < 2.5\nx = x / 8\n").unwrap();
        let mut venv = SymbolTable::new();
        nupy::run(&program, &mut venv, io::sink()).unwrap();
        let mut out = Vec::new();
        dump(&venv, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "x (number): 12.5\ns (str): hi\nb (bool): False\n"
        );
    }
}
