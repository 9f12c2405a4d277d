//! State encoding shared by training and serving.
use crate::{RecEnv, RecEnvError, RecObs};
use anyhow::Result;
use grouprec_core::StateEncoder;
use ndarray::Array2;
use std::sync::Arc;

/// Encodes an observation as `user_embed ++ mean(group_embeddings[last_seq])`.
///
/// Sequence entries are clipped to `[0, num_groups - 1]` before lookup. The
/// mean is accumulated in `f64`, so a window of identical groups encodes to
/// exactly that group's embedding.
#[derive(Debug, Clone)]
pub struct SeqStateEncoder {
    group_embeddings: Arc<Array2<f32>>,
    seq_len: usize,
}

impl SeqStateEncoder {
    /// Constructs an encoder on the given group embedding table.
    pub fn new(group_embeddings: Arc<Array2<f32>>, seq_len: usize) -> Self {
        Self {
            group_embeddings,
            seq_len,
        }
    }

    /// Embedding dimension.
    pub fn embed_dim(&self) -> usize {
        self.group_embeddings.ncols()
    }

    /// Length of the sequence window.
    pub fn seq_len(&self) -> usize {
        self.seq_len
    }

    /// The number of groups in the embedding table.
    pub fn num_groups(&self) -> usize {
        self.group_embeddings.nrows()
    }

    /// Encodes a user vector and a sequence of group indices.
    pub fn encode_parts(&self, user: &[f32], seq: &[usize]) -> Result<Vec<f32>, RecEnvError> {
        let embed_dim = self.embed_dim();
        if user.len() != embed_dim {
            return Err(RecEnvError::ObsDimension {
                expected: embed_dim,
                got: user.len(),
            });
        }
        if seq.len() != self.seq_len {
            return Err(RecEnvError::ObsDimension {
                expected: self.seq_len,
                got: seq.len(),
            });
        }

        let last = self.num_groups() - 1;
        let mut acc = vec![0f64; embed_dim];
        for &ix in seq {
            let row = self.group_embeddings.row(ix.min(last));
            for (a, &v) in acc.iter_mut().zip(row.iter()) {
                *a += v as f64;
            }
        }

        let n = seq.len() as f64;
        let mut state = Vec::with_capacity(2 * embed_dim);
        state.extend_from_slice(user);
        state.extend(acc.into_iter().map(|a| (a / n) as f32));
        Ok(state)
    }

    /// Encodes a flat observation `[user_embed (embed_dim), last_seq (seq_len)]`.
    pub fn encode_raw(&self, raw: &[f32]) -> Result<Vec<f32>, RecEnvError> {
        let expected = self.embed_dim() + self.seq_len;
        if raw.len() != expected {
            return Err(RecEnvError::ObsDimension {
                expected,
                got: raw.len(),
            });
        }
        let obs = RecObs::from_raw(raw, self.embed_dim())?;
        self.encode_parts(&obs.user_embed, &obs.last_seq)
    }
}

impl StateEncoder<RecEnv> for SeqStateEncoder {
    fn state_dim(&self) -> usize {
        2 * self.embed_dim()
    }

    fn encode(&self, obs: &RecObs) -> Result<Vec<f32>> {
        Ok(self.encode_parts(&obs.user_embed, &obs.last_seq)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn encoder() -> SeqStateEncoder {
        let table = array![[0.1f32, 0.2], [1.0, -1.0], [0.3, 0.7]];
        SeqStateEncoder::new(Arc::new(table), 3)
    }

    #[test]
    fn test_identical_rows_average_exactly() {
        let encoder = encoder();
        let state = encoder.encode_parts(&[5.0, 6.0], &[0, 0, 0]).unwrap();
        assert_eq!(state, vec![5.0, 6.0, 0.1, 0.2]);
        assert_eq!(encoder.state_dim(), 4);
    }

    #[test]
    fn test_clips_out_of_range() {
        let encoder = encoder();
        let clipped = encoder.encode_parts(&[0.0, 0.0], &[2, 9, 40]).unwrap();
        assert_eq!(clipped, vec![0.0, 0.0, 0.3, 0.7]);

        let raw = encoder.encode_raw(&[0.0, 0.0, -3.0, 1.6, 1.0]).unwrap();
        let parts = encoder.encode_parts(&[0.0, 0.0], &[0, 1, 1]).unwrap();
        assert_eq!(raw, parts);
    }

    #[test]
    fn test_dimension_errors() {
        let encoder = encoder();
        assert_eq!(
            encoder.encode_parts(&[0.0], &[0, 0, 0]),
            Err(RecEnvError::ObsDimension {
                expected: 2,
                got: 1
            })
        );
        assert_eq!(
            encoder.encode_raw(&[0.0; 4]),
            Err(RecEnvError::ObsDimension {
                expected: 5,
                got: 4
            })
        );
    }
}
