use std::{
    fs, io,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::Parser;
use oop::{lexer, parser, util::tree};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
usage: oopc <input.oop> <output.js>
compiles an .oop source file into a JavaScript program";

#[derive(Debug, Parser)]
#[command(name = "oopc", about = "Compiles an .oop source file into a JavaScript program")]
struct Args {
    /// The source file, followed by the file to write.
    #[arg(value_name = "FILE")]
    paths: Vec<PathBuf>,

    /// Logs more details to stderr; repeat for even more.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// What to write to the output file.
    #[arg(long, value_enum, default_value = "js")]
    emit: Emit,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
enum Emit {
    /// One token per line.
    Tokens,
    /// The tree of the parsed program.
    Ast,
    /// The compiled program.
    Js,
}

#[derive(Debug, thiserror::Error)]
enum Error {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("{stage}: {0}", stage = .0.stage())]
    Compile(#[from] oop::Error),
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let [input, output] = args.paths.as_slice() else {
        println!("{USAGE}");
        return ExitCode::from(2);
    };
    match run(input, output, args.emit) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "oop=warn,oopc=warn",
        1 => "oop=debug,oopc=debug",
        _ => "oop=trace,oopc=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
}

/// Compiles `input` into `output`. Nothing is written unless every stage
/// succeeds.
fn run(input: &Path, output: &Path, emit: Emit) -> Result<(), Error> {
    let src = fs::read_to_string(input).map_err(|source| Error::Read {
        path: input.to_owned(),
        source,
    })?;
    tracing::debug!(path = %input.display(), bytes = src.len(), "read source");

    let code: String = match emit {
        Emit::Tokens => {
            let tokens = lexer::tokenize(&src).map_err(oop::Error::from)?;
            tokens.iter().map(|token| format!("{token}\n")).collect()
        }
        Emit::Ast => {
            let tokens = lexer::tokenize(&src).map_err(oop::Error::from)?;
            let program = parser::parse(&tokens).map_err(oop::Error::from)?;
            tree::print_program_string(&program)
        }
        Emit::Js => oop::compile(&src)?,
    };

    fs::write(output, &code).map_err(|source| Error::Write {
        path: output.to_owned(),
        source,
    })?;
    tracing::debug!(path = %output.display(), bytes = code.len(), "wrote output");
    Ok(())
}
