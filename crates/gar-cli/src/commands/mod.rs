//! Subcommand implementations.

pub mod completion;
pub mod compress;
pub mod extract;
pub mod list;

use crate::cli::PasswordArgs;
use gar_core::ArchiveOptions;

/// Options shared by every subcommand.
fn base_options(password: &PasswordArgs, verbose: bool) -> ArchiveOptions {
    let options = ArchiveOptions::default().with_verbose(verbose);
    match &password.password {
        Some(secret) => options.with_password(secret.as_str()),
        None => options,
    }
}
