//! Writes training records to TFRecord files readable by tensorboard.
use grouprec_core::record::{AggregateRecorder, Record, RecordStorage, RecordValue, Recorder};
use log::warn;
use std::path::Path;
use tensorboard_rs::summary_writer::SummaryWriter;

/// Write records to TFRecord.
pub struct TensorboardRecorder {
    writer: SummaryWriter,
    step_key: String,
    storage: RecordStorage,
}

impl TensorboardRecorder {
    /// Construct a [`TensorboardRecorder`].
    ///
    /// TFRecord will be stored in `logdir`.
    pub fn new<P: AsRef<Path>>(logdir: P) -> Self {
        Self {
            writer: SummaryWriter::new(logdir),
            step_key: "step".to_string(),
            storage: RecordStorage::new(),
        }
    }
}

impl Recorder for TensorboardRecorder {
    /// Write a given [`Record`] into a TFRecord.
    ///
    /// The record must hold a scalar under the key `step`. Only
    /// [`RecordValue::Scalar`] values are written, other variants are ignored.
    fn write(&mut self, record: Record) {
        let step = match record.get(&self.step_key) {
            Some(RecordValue::Scalar(v)) => *v as usize,
            _ => {
                warn!("Record without scalar {:?} was discarded", self.step_key);
                return;
            }
        };

        for (k, v) in record.iter() {
            if *k != self.step_key {
                if let RecordValue::Scalar(v) = v {
                    self.writer.add_scalar(k, *v, step);
                }
            }
        }
        self.writer.flush();
    }
}

impl AggregateRecorder for TensorboardRecorder {
    fn store(&mut self, record: Record) {
        self.storage.store(record);
    }

    fn flush(&mut self, step: i64) {
        if self.storage.is_empty() {
            return;
        }
        let mut record = self.storage.aggregate();
        record.insert(self.step_key.clone(), RecordValue::Scalar(step as f32));
        self.write(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_flush_writes_event_file() {
        let dir = TempDir::new("tensorboard").unwrap();
        let mut recorder = TensorboardRecorder::new(dir.path());
        recorder.store(Record::from_scalar("episode_reward", 1.5));
        recorder.store(Record::from_scalar("episode_reward", 2.5));
        recorder.flush(2);
        recorder.write(Record::from_scalar("no_step", 1.0));
        // Dropping the writer joins its background thread.
        drop(recorder);

        let files = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.to_string_lossy().contains("events.out.tfevents"))
            .collect::<Vec<_>>();
        assert_eq!(files.len(), 1);
        let bytes = std::fs::read(&files[0]).unwrap();
        assert!(!bytes.is_empty());

        let contains = |tag: &[u8]| bytes.windows(tag.len()).any(|w| w == tag);
        assert!(contains(b"episode_reward"));
        assert!(!contains(b"no_step"));
    }
}
