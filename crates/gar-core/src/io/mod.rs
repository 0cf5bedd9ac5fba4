//! I/O adaptors shared by the format codecs.

pub mod counting;
pub mod shared;

pub use counting::CountingWriter;
pub use shared::SharedSource;
