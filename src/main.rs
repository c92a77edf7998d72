use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::LevelFilter;
use pulang::{tokenize_file, CompileError, Token};
use simple_logger::SimpleLogger;

/// Compile a Pulang program to register machine assembly.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Program to compile, without the .pulang extension. Asked for if omitted.
    file: Option<String>,

    /// Folder the program is looked up in
    #[arg(long, default_value = "pulang")]
    dir: PathBuf,

    /// Write the assembly here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Dump the token stream before compiling
    #[arg(long)]
    tokens: bool,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only report errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match (args.quiet, args.verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    };
    if let Err(err) = SimpleLogger::new()
        .with_level(level)
        .without_timestamps()
        .init()
    {
        eprintln!("error: {}", err);
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            match err.downcast_ref::<CompileError>() {
                Some(CompileError::MissingFile { .. }) => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let name = match &args.file {
        Some(name) => name.clone(),
        None => prompt("Please enter the name of the file to compile (without extension): ")?,
    };
    if name.is_empty() {
        bail!("no file name given");
    }
    let path = args.dir.join(format!("{}.pulang", name));

    let tokens = tokenize_file(&path)?;
    if args.tokens {
        dump_tokens(&tokens);
    }
    let compilation = pulang::Parser::new(tokens).parse()?;
    if !compilation.diagnostics.is_empty() {
        log::warn!(
            "{}: {} unrecognized token(s) skipped",
            path.display(),
            compilation.diagnostics.len()
        );
    }

    let text = compilation.program.to_string();
    match &args.output {
        Some(output) => write_output(output, &text)?,
        None => println!("{}", text),
    }
    Ok(())
}

fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading file name")?;
    Ok(line.trim().to_string())
}

fn dump_tokens(tokens: &[Token]) {
    for token in tokens {
        eprintln!("{:>4}: {}", token.line, token.lexeme);
    }
}

fn write_output(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", text))
        .with_context(|| format!("writing {}", path.display()))
}
