//! Columnar bulk loader: type-coerces normalized rows, batches them
//! adaptively by dataset, and inserts into the analytics store with
//! retry-with-reconnect, tracking progress through the state store's
//! claim/complete/fail protocol.

mod batch;
mod clamp;
mod client;
mod coerce;
mod error;
mod load;
mod migrations;

pub use batch::{batch_size_for, streaming_threshold};
pub use clamp::ClampableRow;
pub use client::{LoaderConfig, StoreClient};
pub use coerce::clamp_timestamp;
pub use error::LoaderError;
pub use load::{ALL_DATASETS, load_era};
pub use migrations::run_migrations;
