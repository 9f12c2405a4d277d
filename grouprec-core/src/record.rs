//! Types and traits for recording training metrics.
//!
//! * [`Record`] - a container of key-value pairs
//! * [`RecordValue`] - the values a record can hold
//! * [`Recorder`] and [`AggregateRecorder`] - output destinations of records
//! * [`RecordStorage`] - stores records and aggregates their values
//! * [`BufferedRecorder`] - keeps records in memory
//! * [`NullRecorder`] - discards all records
//!
//! ```rust
//! use grouprec_core::record::{Record, RecordValue};
//!
//! let mut record = Record::empty();
//! record.insert("episode", RecordValue::Scalar(1.0));
//! record.insert("episode_reward", RecordValue::Scalar(4.5));
//! assert_eq!(record.get_scalar("episode_reward").unwrap(), 4.5);
//! ```
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;
mod storage;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::{AggregateRecorder, Recorder};
pub use storage::RecordStorage;
