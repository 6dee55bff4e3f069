use std::sync::{Arc, PoisonError, RwLock};

use log::info;

use crate::{PredictError, TrainedModel};

/// Hot-swappable handle to the model currently used for prediction.
///
/// Readers take a cheap [`Arc`] snapshot and predict without holding the
/// lock, so a retrain can publish a replacement while frames are in flight.
#[derive(Debug)]
pub struct SharedModel {
    current: RwLock<Arc<TrainedModel>>,
}

impl SharedModel {
    pub fn new(model: TrainedModel) -> Self {
        Self {
            current: RwLock::new(Arc::new(model)),
        }
    }

    pub fn snapshot(&self) -> Arc<TrainedModel> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Publish `model` and return the one it replaced.
    pub fn replace(&self, model: TrainedModel) -> Arc<TrainedModel> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        info!(
            "swapping model ({} classes -> {} classes)",
            guard.classes().len(),
            model.classes().len()
        );
        std::mem::replace(&mut *guard, Arc::new(model))
    }

    pub fn predict_one(&self, x: &[f64]) -> Result<String, PredictError> {
        self.snapshot().predict_one(x)
    }
}

impl From<TrainedModel> for SharedModel {
    fn from(model: TrainedModel) -> Self {
        Self::new(model)
    }
}
