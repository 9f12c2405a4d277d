//! Adam optimizer used to train the online Q-network.
use anyhow::Result;
use candle_core::{Tensor, Var};
use candle_nn::Optimizer as _;
use candle_optimisers::adam::{Adam, ParamsAdam};
use serde::{Deserialize, Serialize};

/// Hyperparameters of the Adam optimizer.
///
/// Omitted fields in YAML fall back to the defaults of [`ParamsAdam`].
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct OptimizerConfig {
    /// Learning rate.
    pub lr: f64,

    /// Decay rate of the first moment.
    #[serde(default = "default_beta_1")]
    pub beta_1: f64,

    /// Decay rate of the second moment.
    #[serde(default = "default_beta_2")]
    pub beta_2: f64,

    /// Term added to the denominator.
    #[serde(default = "default_eps")]
    pub eps: f64,

    /// Use the AMSGrad variant.
    #[serde(default)]
    pub amsgrad: bool,
}

fn default_beta_1() -> f64 {
    ParamsAdam::default().beta_1
}

fn default_beta_2() -> f64 {
    ParamsAdam::default().beta_2
}

fn default_eps() -> f64 {
    ParamsAdam::default().eps
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            lr: 1e-3,
            beta_1: default_beta_1(),
            beta_2: default_beta_2(),
            eps: default_eps(),
            amsgrad: false,
        }
    }
}

impl OptimizerConfig {
    /// Sets the learning rate.
    pub fn learning_rate(mut self, lr: f64) -> Self {
        self.lr = lr;
        self
    }

    /// Enables or disables AMSGrad.
    pub fn amsgrad(mut self, v: bool) -> Self {
        self.amsgrad = v;
        self
    }

    /// Constructs an optimizer on the given variables.
    pub fn build(&self, vars: Vec<Var>) -> Result<Optimizer> {
        let params = ParamsAdam {
            lr: self.lr,
            beta_1: self.beta_1,
            beta_2: self.beta_2,
            eps: self.eps,
            amsgrad: self.amsgrad,
            ..ParamsAdam::default()
        };
        Ok(Optimizer(Adam::new(vars, params)?))
    }
}

/// Adam optimizer bound to the variables of a model.
pub struct Optimizer(Adam);

impl Optimizer {
    /// Applies a backward step pass.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        Ok(self.0.backward_step(loss)?)
    }

    /// Current learning rate.
    pub fn learning_rate(&self) -> f64 {
        self.0.learning_rate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;

    #[test]
    fn test_missing_fields_use_adam_defaults() -> Result<()> {
        let config: OptimizerConfig = serde_yaml::from_str("lr: 0.0005\n")?;
        assert_eq!(config, OptimizerConfig::default().learning_rate(5e-4));
        assert!(!config.amsgrad);
        Ok(())
    }

    #[test]
    fn test_backward_step_reduces_loss() -> Result<()> {
        for amsgrad in [false, true] {
            let var = Var::new(&[1f32, -2.0, 3.0], &Device::Cpu)?;
            let config = OptimizerConfig::default().learning_rate(0.1).amsgrad(amsgrad);
            let mut opt = config.build(vec![var.clone()])?;
            assert_eq!(opt.learning_rate(), 0.1);

            let loss0 = var.as_tensor().sqr()?.sum_all()?.to_scalar::<f32>()?;
            for _ in 0..10 {
                let loss = var.as_tensor().sqr()?.sum_all()?;
                opt.backward_step(&loss)?;
            }
            let loss1 = var.as_tensor().sqr()?.sum_all()?.to_scalar::<f32>()?;
            assert!(loss1 < loss0);
        }
        Ok(())
    }
}
