mod compression;
mod error;
mod metadata;
mod reader;

pub use compression::decompress_snappy_framed;
pub use error::ReaderError;
pub use metadata::EraMetadata;
pub use reader::{EraReader, EraRecord, EraStatistics, RecordType};
