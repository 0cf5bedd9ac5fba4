//! Input side of compression: turning a filesystem tree into entries.

pub mod walker;

pub use walker::SourceEntry;
pub use walker::TreeWalker;
