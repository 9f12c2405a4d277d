//! Utilities.
mod param_snapshot;
use anyhow::Result;
use candle_nn::VarMap;
pub use param_snapshot::ParamSnapshot;

/// Copies all variables of `src` into `dest`.
///
/// Variables are identified by their names.
pub fn hard_update(dest: &VarMap, src: &VarMap) -> Result<()> {
    ParamSnapshot::copy_from(src)?.copy_to(dest)
}

/// Index of the first maximal value.
///
/// Returns `None` for an empty slice. NaN values are never selected unless
/// they come first.
pub fn stable_argmax(values: &[f32]) -> Option<usize> {
    let (first, rest) = values.split_first()?;
    let mut best = (0, *first);
    for (i, &v) in rest.iter().enumerate() {
        if v > best.1 {
            best = (i + 1, v);
        }
    }
    Some(best.0)
}

/// Interface for handling output dimensions.
pub trait OutDim {
    /// Returns the output dimension.
    fn get_out_dim(&self) -> usize;

    /// Sets the output dimension.
    fn set_out_dim(&mut self, v: usize);
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device, Tensor};
    use candle_nn::Init;

    #[test]
    fn test_stable_argmax() {
        assert_eq!(stable_argmax(&[]), None);
        assert_eq!(stable_argmax(&[0.3]), Some(0));
        assert_eq!(stable_argmax(&[1.0, 3.0, 3.0, 2.0]), Some(1));
        assert_eq!(stable_argmax(&[-1e9, -5.0, -1e9]), Some(1));
        assert_eq!(stable_argmax(&[2.0, f32::NAN, 1.0]), Some(0));
    }

    #[test]
    fn test_hard_update() -> Result<()> {
        let init = Init::Randn {
            mean: 0.0,
            stdev: 1.0,
        };
        let t_src = Tensor::from_slice(&[1.0f32, 2.0, 3.0], (3,), &Device::Cpu)?;

        let vm_src = VarMap::new();
        vm_src.get((3,), "var1", init, DType::F32, &Device::Cpu)?;
        vm_src.data().lock().unwrap()["var1"].set(&t_src)?;

        let vm_dest = VarMap::new();
        vm_dest.get((3,), "var1", init, DType::F32, &Device::Cpu)?;

        hard_update(&vm_dest, &vm_src)?;
        let t_dest = vm_dest.data().lock().unwrap()["var1"].as_tensor().clone();
        assert_eq!(t_dest.to_vec1::<f32>()?, vec![1.0, 2.0, 3.0]);
        Ok(())
    }
}
