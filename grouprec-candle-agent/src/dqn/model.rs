use crate::{
    model::SubModel1,
    opt::{Optimizer, OptimizerConfig},
    util::{OutDim, ParamSnapshot},
    ModelError,
};
use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};
use log::info;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`DqnModel`].
pub struct DqnModelConfig<Q>
where
    Q: OutDim,
{
    /// Configuration of the action-value function.
    pub q_config: Option<Q>,

    /// Configuration of the optimizer.
    pub opt_config: OptimizerConfig,
}

impl<Q> Default for DqnModelConfig<Q>
where
    Q: OutDim,
{
    fn default() -> Self {
        Self {
            q_config: None,
            opt_config: OptimizerConfig::default(),
        }
    }
}

impl<Q> DqnModelConfig<Q>
where
    Q: DeserializeOwned + Serialize + OutDim,
{
    /// Sets configurations for action-value function.
    pub fn q_config(mut self, v: Q) -> Self {
        self.q_config = Some(v);
        self
    }

    /// Sets output dimension of the model.
    pub fn out_dim(mut self, v: usize) -> Self {
        if let Some(q_config) = &mut self.q_config {
            q_config.set_out_dim(v);
        }
        self
    }

    /// Sets optimizer configuration.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Constructs [`DqnModelConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`DqnModelConfig`] to as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Action-value function with its own [`VarMap`].
///
/// A model built with [`DqnModel::build_frozen`] has no optimizer. It is used
/// as the target network, whose parameters only change through
/// [`DqnModel::set_params`].
pub struct DqnModel<Q>
where
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    device: Device,
    varmap: VarMap,

    // Dimension of the output vector (equal to the number of actions).
    out_dim: usize,

    // Action-value function
    q: Q,

    // Optimizer, `None` for a frozen model
    opt: Option<Optimizer>,
}

impl<Q> DqnModel<Q>
where
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    fn _build(config: DqnModelConfig<Q::Config>, device: Device, frozen: bool) -> Result<Self> {
        let q_config = config.q_config.context("q_config is not set.")?;
        let out_dim = q_config.get_out_dim();
        let varmap = VarMap::new();
        let q = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
            Q::build(vb, q_config)?
        };
        let opt = match frozen {
            true => None,
            false => Some(config.opt_config.build(varmap.all_vars())?),
        };

        Ok(Self {
            device,
            varmap,
            out_dim,
            q,
            opt,
        })
    }

    /// Constructs a trainable [`DqnModel`].
    pub fn build(config: DqnModelConfig<Q::Config>, device: Device) -> Result<Self> {
        Self::_build(config, device, false)
    }

    /// Constructs a [`DqnModel`] without optimizer.
    pub fn build_frozen(config: DqnModelConfig<Q::Config>, device: Device) -> Result<Self> {
        Self::_build(config, device, true)
    }

    /// Outputs the action values, `[batch_size, out_dim]`, given states.
    pub fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        self.q.forward(xs)
    }

    /// Performs a gradient step on the given loss.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        match &mut self.opt {
            Some(opt) => opt.backward_step(loss),
            None => Err(ModelError::Frozen.into()),
        }
    }

    /// Returns `true` if the model has no optimizer.
    pub fn is_frozen(&self) -> bool {
        self.opt.is_none()
    }

    /// Dimension of the output.
    pub fn out_dim(&self) -> usize {
        self.out_dim
    }

    /// The device of the parameters.
    pub fn device(&self) -> &Device {
        &self.device
    }

    pub(crate) fn varmap(&self) -> &VarMap {
        &self.varmap
    }

    /// Deep copy of the parameters.
    pub fn params(&self) -> Result<ParamSnapshot> {
        ParamSnapshot::copy_from(&self.varmap)
    }

    /// Overwrites the parameters with a snapshot.
    pub fn set_params(&mut self, params: &ParamSnapshot) -> Result<()> {
        params.copy_to(&self.varmap)
    }

    /// Saves the parameters in a safetensors file.
    pub fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        self.varmap.save(&path)?;
        info!("Save dqnmodel to {:?}", path.as_ref());
        Ok(())
    }

    /// Loads the parameters from a safetensors file.
    ///
    /// Every parameter of the model must be in the file with the same shape.
    pub fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ModelError::MissingCheckpoint(path.to_path_buf()).into());
        }
        let tensors = candle_core::safetensors::load(path, &self.device)?;
        self.set_params(&ParamSnapshot::from_tensors(tensors))?;
        info!("Load dqnmodel from {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mlp::{Mlp, MlpConfig};
    use tempdir::TempDir;

    fn config(out_dim: usize) -> DqnModelConfig<MlpConfig> {
        DqnModelConfig::default().q_config(MlpConfig::new(4, vec![8], out_dim, false))
    }

    #[test]
    fn test_frozen_model_rejects_backward() -> Result<()> {
        let mut model = DqnModel::<Mlp>::build_frozen(config(3), Device::Cpu)?;
        assert!(model.is_frozen());
        let xs = Tensor::ones((2, 4), DType::F32, &Device::Cpu)?;
        let loss = model.forward(&xs)?.sqr()?.mean_all()?;
        let err = model.backward_step(&loss).unwrap_err();
        assert_eq!(err.downcast_ref::<ModelError>(), Some(&ModelError::Frozen));
        Ok(())
    }

    #[test]
    fn test_set_params_copies_values() -> Result<()> {
        let online = DqnModel::<Mlp>::build(config(3), Device::Cpu)?;
        let mut target = DqnModel::<Mlp>::build_frozen(config(3), Device::Cpu)?;
        target.set_params(&online.params()?)?;
        assert!(target.params()?.bitwise_eq(&online.params()?)?);

        let xs = Tensor::new(&[[0.1f32, -0.4, 2.0, 1.0]], &Device::Cpu)?;
        assert_eq!(
            online.forward(&xs)?.to_vec2::<f32>()?,
            target.forward(&xs)?.to_vec2::<f32>()?
        );
        Ok(())
    }

    #[test]
    fn test_load_errors() -> Result<()> {
        let dir = TempDir::new("dqn_model")?;
        let mut model = DqnModel::<Mlp>::build(config(3), Device::Cpu)?;

        let missing = dir.path().join("missing.safetensors");
        let err = model.load(&missing).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ModelError>(),
            Some(&ModelError::MissingCheckpoint(missing.clone()))
        );

        let path = dir.path().join("qnet.safetensors");
        DqnModel::<Mlp>::build(config(5), Device::Cpu)?.save(&path)?;
        let err = model.load(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ModelError>(),
            Some(ModelError::ShapeMismatch { .. })
        ));
        Ok(())
    }
}
