//! Extract command implementation.

use super::base_options;
use crate::cli::ExtractArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use std::path::PathBuf;

pub fn execute(args: &ExtractArgs, formatter: &dyn OutputFormatter, verbose: bool) -> Result<()> {
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));

    let mut options = base_options(&args.password, verbose);
    if let Some(workers) = args.workers {
        options = options.with_worker_count(usize::from(workers));
    }

    let report = add_archive_context(
        gar_core::extract(&args.archive, &output_dir, &options),
        &args.archive,
    )?;

    formatter.format_extraction_result(&output_dir, &report)?;

    Ok(())
}
