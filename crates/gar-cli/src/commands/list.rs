//! List command implementation

use super::base_options;
use crate::cli::ListArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Result;

pub fn execute(args: &ListArgs, formatter: &dyn OutputFormatter, verbose: bool) -> Result<()> {
    let options = base_options(&args.password, verbose);

    let entries = add_archive_context(gar_core::list(&args.archive, &options), &args.archive)?;

    formatter.format_listing(&args.archive, &entries, args.human_readable)?;

    Ok(())
}
