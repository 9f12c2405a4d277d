use crate::ModelError;
use anyhow::{anyhow, Result};
use candle_core::Tensor;
use candle_nn::VarMap;
use std::collections::HashMap;

/// Deep copy of the named parameters of a model.
///
/// Snapshots are detached from the computation graph and do not share
/// storage with the variables they were taken from.
#[derive(Clone, Debug)]
pub struct ParamSnapshot {
    tensors: HashMap<String, Tensor>,
}

impl ParamSnapshot {
    /// Copies the variables of a [`VarMap`].
    pub fn copy_from(vs: &VarMap) -> Result<Self> {
        let data = vs.data().lock().map_err(|e| anyhow!("{}", e))?;
        let mut tensors = HashMap::with_capacity(data.len());
        for (name, var) in data.iter() {
            tensors.insert(name.clone(), var.as_tensor().copy()?.detach());
        }
        Ok(Self { tensors })
    }

    /// Wraps tensors loaded from a checkpoint.
    pub fn from_tensors(tensors: HashMap<String, Tensor>) -> Self {
        Self { tensors }
    }

    /// Copies the snapshot into the variables of a [`VarMap`].
    ///
    /// Every variable must have a tensor of the same shape in the snapshot.
    /// Nothing is written if a check fails.
    pub fn copy_to(&self, vs: &VarMap) -> Result<()> {
        let data = vs.data().lock().map_err(|e| anyhow!("{}", e))?;

        for (name, var) in data.iter() {
            let src = self
                .tensors
                .get(name)
                .ok_or_else(|| ModelError::MissingTensor(name.clone()))?;
            if src.dims() != var.dims() {
                return Err(ModelError::ShapeMismatch {
                    name: name.clone(),
                    expected: var.dims().to_vec(),
                    got: src.dims().to_vec(),
                }
                .into());
            }
        }

        for (name, var) in data.iter() {
            let src = &self.tensors[name];
            var.set(&src.to_device(var.device())?.to_dtype(var.dtype())?)?;
        }

        Ok(())
    }

    /// The number of parameters.
    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    /// Returns `true` if the snapshot holds no parameter.
    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }

    /// Returns `true` if both snapshots hold the same names with bitwise
    /// equal values.
    pub fn bitwise_eq(&self, other: &Self) -> Result<bool> {
        if self.tensors.len() != other.tensors.len() {
            return Ok(false);
        }
        for (name, t) in self.tensors.iter() {
            let Some(u) = other.tensors.get(name) else {
                return Ok(false);
            };
            if t.dims() != u.dims() {
                return Ok(false);
            }
            let t = t.flatten_all()?.to_vec1::<f32>()?;
            let u = u.flatten_all()?.to_vec1::<f32>()?;
            if t.iter().zip(u.iter()).any(|(a, b)| a.to_bits() != b.to_bits()) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
