use super::Record;

/// Writes a record to an output destination with [`Recorder::write`].
pub trait Recorder {
    /// Writes a record.
    fn write(&mut self, record: Record);
}

/// Stores records and writes values aggregated over them.
///
/// The [`Trainer`](crate::Trainer) stores a record every episode and calls
/// [`AggregateRecorder::flush`] at a fixed interval.
pub trait AggregateRecorder {
    /// Stores a record.
    fn store(&mut self, record: Record);

    /// Writes values aggregated from the stored records, tagged with `step`.
    fn flush(&mut self, step: i64);
}
