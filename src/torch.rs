//! Code for loading and running the trained face classifier

use crate::classes::{BodyClass, NUM_CLASSES};
use crate::config::{DeviceSetting, ModelSettings};
use anyhow::{anyhow, Context, Result};
use once_cell::sync::OnceCell;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use tch::{no_grad, Device, Kind, Tensor};
use tracing::*;

/// Anything that maps a `[1, 3, H, W]` input tensor to `[1, NUM_CLASSES]`
/// raw scores
pub trait Classifier: Send + Sync {
    fn logits(&self, input: &Tensor) -> Result<Tensor>;
}

/// The class picked by the model and its (unrounded) softmax probability
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub class: BodyClass,
    pub confidence: f64,
}

/// Softmax over the class dimension, then argmax. The confidence is the
/// probability of the selected class
pub fn classify(logits: &Tensor) -> Result<Prediction> {
    let size = logits.size();
    if size != [1, NUM_CLASSES] {
        return Err(anyhow!(
            "expected logits of shape [1, {NUM_CLASSES}], got {size:?}"
        ));
    }

    let probs = logits.f_softmax(1, Kind::Float)?;
    let index = probs.f_argmax(1, false)?.f_int64_value(&[0])?;
    let confidence = probs.f_double_value(&[0, index])?;
    let class = BodyClass::from_index(index)
        .ok_or_else(|| anyhow!("model selected unknown class index {index}"))?;

    Ok(Prediction { class, confidence })
}

/// Run a full forward pass: logits, then `classify`
pub fn predict(model: &dyn Classifier, input: &Tensor) -> Result<Prediction> {
    let logits = model.logits(input)?;
    classify(&logits)
}

/// A TorchScript module loaded in eval mode
#[derive(Debug)]
pub struct TorchModel {
    /// The loaded torch model
    model: tch::CModule,
    device: Device,
}

impl TorchModel {
    #[tracing::instrument]
    pub fn new(filename: &Path, device: Device) -> Result<Self> {
        let mut model = tch::CModule::load_on_device(filename, device)
            .with_context(|| format!("failed to load TorchScript model {}", filename.display()))?;
        model.set_eval();
        info!("loaded model {} on {device:?}", filename.display());
        Ok(TorchModel { model, device })
    }
}

impl Classifier for TorchModel {
    fn logits(&self, input: &Tensor) -> Result<Tensor> {
        let input = input.to_device(self.device);
        let output = no_grad(|| self.model.forward_ts(&[input]))?;
        Ok(output.to_device(Device::Cpu))
    }
}

impl From<DeviceSetting> for Device {
    fn from(setting: DeviceSetting) -> Device {
        match setting {
            DeviceSetting::Cpu => Device::Cpu,
            DeviceSetting::Cuda => Device::cuda_if_available(),
        }
    }
}

type Loader = Box<dyn Fn() -> Result<Box<dyn Classifier>> + Send + Sync>;

/// A model that is loaded on first use and then shared. Concurrent first
/// callers block on a single load; a failed load is not cached
pub struct LazyModel {
    loader: Loader,
    model: OnceCell<Box<dyn Classifier>>,
}

impl Debug for LazyModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LazyModel {{ loaded: {} }}", self.is_loaded())
    }
}

impl LazyModel {
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn() -> Result<Box<dyn Classifier>> + Send + Sync + 'static,
    {
        LazyModel {
            loader: Box::new(loader),
            model: OnceCell::new(),
        }
    }

    /// Lazily load the TorchScript file described by `settings`
    pub fn torchscript(settings: &ModelSettings) -> Self {
        let path: PathBuf = settings.path.clone();
        let device: Device = settings.device.into();
        Self::new(move || Ok(Box::new(TorchModel::new(&path, device)?) as Box<dyn Classifier>))
    }

    /// Wrap a model that is already loaded
    #[cfg(test)]
    pub fn ready<C: Classifier + 'static>(model: C) -> Self {
        let lazy = Self::new(|| Err(anyhow!("model is preloaded")));
        // the cell is fresh, so this always succeeds
        let _ = lazy.model.set(Box::new(model));
        lazy
    }

    /// Get the model, loading it if this is the first call
    pub fn get(&self) -> Result<&dyn Classifier> {
        let model = self.model.get_or_try_init(|| {
            debug!("loading model on first use");
            (self.loader)()
        })?;
        Ok(model.as_ref())
    }

    pub fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }
}
