use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;
use pulang::pipeline::{build, BuildPaths, CommandToolchain};
use simple_logger::SimpleLogger;

/// Assemble a compiled program and create a schematic for it.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Program to build; read from programs/<PROGRAM>.as
    program: String,

    /// Directory holding programs/ and schem/, the current one if omitted
    #[arg(long)]
    root: Option<PathBuf>,

    /// Assembler command, called as `<cmd> <source.as> <binary.mc>`
    #[arg(long, default_value = "pulang-assembler")]
    assembler: String,

    /// Schematic builder command, called as `<cmd> <binary.mc> <schematic.schem>`
    #[arg(long, default_value = "pulang-schematic")]
    schematic_builder: String,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    if let Err(err) = SimpleLogger::new()
        .with_level(level)
        .without_timestamps()
        .init()
    {
        eprintln!("error: {}", err);
    }

    let paths = match &args.root {
        Some(root) => BuildPaths::in_dir(root, &args.program),
        None => BuildPaths::for_program(&args.program),
    };
    let toolchain = CommandToolchain {
        assembler: args.assembler,
        schematic_builder: args.schematic_builder,
        paths: paths.clone(),
    };

    match build(&toolchain, &paths.assembly) {
        Ok(schematic) => {
            println!("{}", schematic.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::from(err.exit_code())
        }
    }
}
