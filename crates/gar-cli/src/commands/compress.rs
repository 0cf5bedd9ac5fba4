//! Compress command implementation.

use super::base_options;
use crate::cli::CompressArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use gar_core::ArchiveFormat;

pub fn execute(args: &CompressArgs, formatter: &dyn OutputFormatter, verbose: bool) -> Result<()> {
    let format = args.resolved_format();
    let output = args.resolved_output(format);

    if let Some(implied) = ArchiveFormat::from_path(&output) {
        if implied != format {
            formatter.format_warning(&format!(
                "'{}' has a {implied} extension but will contain {format}",
                output.display()
            ));
        }
    }

    if output.exists() {
        formatter.format_warning(&format!("overwriting '{}'", output.display()));
    }

    let options = base_options(&args.password, verbose)
        .with_format(format)
        .with_compression_level(args.level);

    let report = add_archive_context(gar_core::compress(&args.input, &output, &options), &args.input)?;

    formatter.format_compression_result(&output, format, &report)?;

    Ok(())
}
