//! Hands compiled assembly to the downstream tools: the assembler turns it
//! into machine code and the schematic builder packs that into a schematic.
//! Neither tool lives in this crate; they are reached through [`Toolchain`].

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context};
use log::{debug, info};
use snafu::{ensure, Snafu};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum BuildError {
    #[snafu(display("the file '{}' does not exist", path.display()))]
    MissingSource { path: PathBuf },

    #[snafu(display("assembling '{}' failed: {message}", path.display()))]
    Assemble { path: PathBuf, message: String },

    #[snafu(display("building the schematic failed: {message}"))]
    Schematic { message: String },
}

impl BuildError {
    /// Process exit status for this failure. A missing input is kept apart
    /// from failures inside the tools.
    pub fn exit_code(&self) -> u8 {
        match self {
            BuildError::MissingSource { .. } => 2,
            BuildError::Assemble { .. } | BuildError::Schematic { .. } => 1,
        }
    }
}

pub trait Toolchain {
    type Binary;
    type Schematic;

    fn assemble(&self, source: &Path) -> anyhow::Result<Self::Binary>;

    fn make_schematic(&self, binary: &Self::Binary) -> anyhow::Result<Self::Schematic>;
}

/// Where each stage of a named program lives on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildPaths {
    pub assembly: PathBuf,
    pub binary: PathBuf,
    pub schematic: PathBuf,
}

impl BuildPaths {
    pub fn for_program(name: &str) -> Self {
        Self::in_dir(Path::new(""), name)
    }

    pub fn in_dir(root: &Path, name: &str) -> Self {
        let stem = Path::new(name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.to_string());
        Self {
            assembly: root.join("programs").join(format!("{}.as", name)),
            binary: root
                .join("programs")
                .join("binaries")
                .join(format!("{}.mc", stem)),
            schematic: root.join("schem").join(format!("{}.schem", stem)),
        }
    }
}

/// Runs the assembler and schematic builder as external commands:
/// `<assembler> <source.as> <binary.mc>` and
/// `<schematic_builder> <binary.mc> <schematic.schem>`.
#[derive(Debug, Clone)]
pub struct CommandToolchain {
    pub assembler: String,
    pub schematic_builder: String,
    pub paths: BuildPaths,
}

impl Toolchain for CommandToolchain {
    type Binary = PathBuf;
    type Schematic = PathBuf;

    fn assemble(&self, source: &Path) -> anyhow::Result<PathBuf> {
        run(&self.assembler, source, &self.paths.binary)?;
        Ok(self.paths.binary.clone())
    }

    fn make_schematic(&self, binary: &PathBuf) -> anyhow::Result<PathBuf> {
        run(&self.schematic_builder, binary, &self.paths.schematic)?;
        Ok(self.paths.schematic.clone())
    }
}

fn run(program: &str, input: &Path, output: &Path) -> anyhow::Result<()> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    debug!("{} {} {}", program, input.display(), output.display());
    let status = Command::new(program)
        .arg(input)
        .arg(output)
        .status()
        .with_context(|| format!("could not run '{}'", program))?;
    if !status.success() {
        bail!("'{}' exited with {}", program, status);
    }
    Ok(())
}

pub fn build<T: Toolchain>(toolchain: &T, source: &Path) -> Result<T::Schematic, BuildError> {
    ensure!(source.is_file(), MissingSourceSnafu { path: source });

    let binary = toolchain
        .assemble(source)
        .map_err(|err| {
            AssembleSnafu {
                path: source,
                message: format!("{:#}", err),
            }
            .build()
        })?;
    info!("assembled {}", source.display());

    let schematic = toolchain
        .make_schematic(&binary)
        .map_err(|err| {
            SchematicSnafu {
                message: format!("{:#}", err),
            }
            .build()
        })?;
    Ok(schematic)
}
