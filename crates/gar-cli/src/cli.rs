//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use gar_core::ArchiveFormat;
use gar_core::CompressionLevel;
use std::ffi::OsString;
use std::path::Path;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gar")]
#[command(author, version, about = "Archive manager with optional password-based encryption", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log every entry and phase timing
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pack a file or directory into an archive
    #[command(visible_alias = "c")]
    Compress(CompressArgs),
    /// Unpack an archive into a directory
    #[command(visible_alias = "x")]
    Extract(ExtractArgs),
    /// List archive contents without extraction
    #[command(visible_alias = "t")]
    List(ListArgs),
    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args)]
pub struct CompressArgs {
    /// File or directory to pack
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Archive to write (default: INPUT plus the format extension)
    #[arg(value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Container format: zip or tar.gz (default: from OUTPUT, else zip)
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<ArchiveFormat>,

    /// Compression level: fastest, normal or best
    #[arg(short = 'l', long = "level", value_name = "LEVEL", default_value_t = CompressionLevel::Normal)]
    pub level: CompressionLevel,

    #[command(flatten)]
    pub password: PasswordArgs,
}

impl CompressArgs {
    /// Explicit `--format`, else the output extension, else zip.
    pub fn resolved_format(&self) -> ArchiveFormat {
        self.format
            .or_else(|| self.output.as_deref().and_then(ArchiveFormat::from_path))
            .unwrap_or_default()
    }

    /// Explicit output, else the input name with the format extension.
    pub fn resolved_output(&self, format: ArchiveFormat) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output(&self.input, format))
    }
}

#[derive(clap::Args)]
pub struct ExtractArgs {
    /// Archive to unpack
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Output directory (default: current directory)
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Maximum concurrent extraction workers for zip archives
    #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub workers: Option<u16>,

    #[command(flatten)]
    pub password: PasswordArgs,
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// Archive to inspect
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Show sizes in human-readable format
    #[arg(short = 'H', long)]
    pub human_readable: bool,

    #[command(flatten)]
    pub password: PasswordArgs,
}

#[derive(clap::Args)]
pub struct PasswordArgs {
    /// Password for encrypting or decrypting the archive
    #[arg(short, long, value_name = "PASSWORD")]
    pub password: Option<String>,
}

/// `dir` -> `dir.zip`, `notes.txt` -> `notes.txt.tar.gz`, next to the input.
fn default_output(input: &Path, format: ArchiveFormat) -> PathBuf {
    let mut name = input
        .file_name()
        .map(ToOwned::to_owned)
        .or_else(|| {
            input
                .canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(ToOwned::to_owned))
        })
        .unwrap_or_else(|| OsString::from("archive"));
    name.push(".");
    name.push(format.extension());

    match input.parent() {
        Some(parent) if input.file_name().is_some() => parent.join(name),
        _ => PathBuf::from(name),
    }
}
