//! End-to-end image classification: HOG descriptors into a linear SVC.

use std::{fs, path::Path};

use log::info;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::core::ImageView;
use crate::hog::{HogError, HogExtractor, HogParams};
use crate::svm::{
    ClassificationReport, LinearSvc, MetricsError, ModelIoError, PredictError, SvcParams,
    TrainError, TrainOptions, TrainedModel,
};

use crate::dataset::{Dataset, DatasetLoader, LoadError};

/// Errors from the classification pipeline.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Hog(#[from] HogError),

    #[error(transparent)]
    Train(#[from] TrainError),

    #[error(transparent)]
    Predict(#[from] PredictError),

    #[error(transparent)]
    ModelIo(#[from] ModelIoError),

    #[error(transparent)]
    Metrics(#[from] MetricsError),
}

/// Untrained pipeline: extractor settings plus classifier settings.
#[derive(Clone, Debug, Default)]
pub struct ImageClassifier {
    hog: HogExtractor,
    svc: LinearSvc,
    loader: DatasetLoader,
}

impl ImageClassifier {
    pub fn new(hog: HogParams, svc: SvcParams) -> Result<Self, PipelineError> {
        svc.validate()?;
        Ok(Self {
            hog: HogExtractor::new(hog)?,
            svc: LinearSvc::new(svc),
            loader: DatasetLoader::default(),
        })
    }

    pub fn with_loader(mut self, loader: DatasetLoader) -> Self {
        self.loader = loader;
        self
    }

    pub fn hog(&self) -> &HogExtractor {
        &self.hog
    }

    /// Extract descriptors for every image and fit the classifier.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip_all, fields(images = images.len()))
    )]
    pub fn train(
        &self,
        images: &[ImageView<'_>],
        labels: &[String],
        options: &TrainOptions,
    ) -> Result<TrainedClassifier, PipelineError> {
        let features = self.hog.extract_batch(images)?;
        info!(
            "extracted {} descriptors of length {}",
            features.len(),
            features.first().map_or(0, Vec::len)
        );
        let model = self.svc.fit(&features, labels, options)?;
        Ok(TrainedClassifier {
            hog: self.hog.params().clone(),
            model,
        })
    }

    pub fn train_from_dir(
        &self,
        dir: impl AsRef<Path>,
    ) -> Result<TrainedClassifier, PipelineError> {
        self.train_from_dir_with(dir, &TrainOptions::default())
    }

    pub fn train_from_dir_with(
        &self,
        dir: impl AsRef<Path>,
        options: &TrainOptions,
    ) -> Result<TrainedClassifier, PipelineError> {
        let dataset = self.loader.load(dir)?;
        self.train(&dataset.views(), &dataset.labels, options)
    }
}

/// A trained pipeline. Serializes as `{ "hog": ..., "model": ... }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainedClassifier {
    pub hog: HogParams,
    pub model: TrainedModel,
}

impl TrainedClassifier {
    fn extractor(&self) -> Result<HogExtractor, HogError> {
        HogExtractor::new(self.hog.clone())
    }

    pub fn classify(&self, images: &[ImageView<'_>]) -> Result<Vec<String>, PipelineError> {
        let features = self.extractor()?.extract_batch(images)?;
        Ok(self.model.predict(&features)?)
    }

    pub fn classify_one(&self, image: &ImageView<'_>) -> Result<String, PipelineError> {
        let features = self.extractor()?.extract(image)?;
        Ok(self.model.predict_one(&features)?)
    }

    pub fn evaluate(
        &self,
        images: &[ImageView<'_>],
        labels: &[String],
    ) -> Result<ClassificationReport, PipelineError> {
        let predicted = self.classify(images)?;
        Ok(ClassificationReport::new(labels, &predicted)?)
    }

    pub fn evaluate_dataset(
        &self,
        dataset: &Dataset,
    ) -> Result<ClassificationReport, PipelineError> {
        self.evaluate(&dataset.views(), &dataset.labels)
    }

    /// Load `dir` with the default loader and score predictions against the
    /// file-name labels.
    pub fn evaluate_dir(
        &self,
        dir: impl AsRef<Path>,
    ) -> Result<ClassificationReport, PipelineError> {
        self.evaluate_dir_with(dir, &DatasetLoader::default())
    }

    /// [`Self::evaluate_dir`] with a custom extension or label rule, e.g. the
    /// loader the classifier was trained with.
    pub fn evaluate_dir_with(
        &self,
        dir: impl AsRef<Path>,
        loader: &DatasetLoader,
    ) -> Result<ClassificationReport, PipelineError> {
        let dataset = loader.load(dir)?;
        self.evaluate_dataset(&dataset)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, PipelineError> {
        let parsed: Self = serde_json::from_str(raw).map_err(ModelIoError::from)?;
        parsed.hog.validate()?;
        parsed.model.validate()?;
        Ok(parsed)
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let raw = fs::read_to_string(path).map_err(ModelIoError::from)?;
        Self::from_json_str(&raw)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), PipelineError> {
        let json = serde_json::to_string_pretty(self).map_err(ModelIoError::from)?;
        fs::write(path, json).map_err(ModelIoError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Image;

    /// Vertical stripes for "stripes", horizontal for "bars".
    fn synthetic(n: usize) -> (Vec<Image>, Vec<String>) {
        let mut images = Vec::new();
        let mut labels = Vec::new();
        for k in 0..n {
            let period = 4 + k % 3;
            let vertical = Image::from_fn(32, 32, 1, |x, _, _| {
                if (x + k) % (2 * period) < period {
                    220
                } else {
                    30
                }
            })
            .unwrap();
            let horizontal = Image::from_fn(32, 32, 1, |_, y, _| {
                if (y + k) % (2 * period) < period {
                    200
                } else {
                    40
                }
            })
            .unwrap();
            images.push(vertical);
            labels.push("stripes".to_string());
            images.push(horizontal);
            labels.push("bars".to_string());
        }
        (images, labels)
    }

    fn small_hog() -> HogParams {
        HogParams {
            pixels_per_cell: [8, 8],
            cells_per_block: [2, 2],
            ..HogParams::default()
        }
    }

    #[test]
    fn trains_and_classifies_orientation_patterns() {
        let (images, labels) = synthetic(6);
        let views: Vec<_> = images.iter().map(Image::view).collect();
        let clf = ImageClassifier::new(small_hog(), SvcParams::default()).unwrap();
        let trained = clf.train(&views, &labels, &TrainOptions::default()).unwrap();

        let report = trained.evaluate(&views, &labels).unwrap();
        assert!(report.accuracy >= 0.9, "{report}");
        assert_eq!(trained.model.classes(), ["bars", "stripes"]);
    }

    #[test]
    fn json_round_trip_keeps_predictions() {
        let (images, labels) = synthetic(3);
        let views: Vec<_> = images.iter().map(Image::view).collect();
        let trained = ImageClassifier::new(small_hog(), SvcParams::default())
            .unwrap()
            .train(&views, &labels, &TrainOptions::default())
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        trained.write_json(&path).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(value.get("hog").is_some() && value.get("model").is_some());

        let loaded = TrainedClassifier::load_json(&path).unwrap();
        assert_eq!(loaded, trained);
        let bits = |c: &TrainedClassifier| -> Vec<u64> {
            c.model.weights().iter().flatten().map(|w| w.to_bits()).collect()
        };
        assert_eq!(bits(&loaded), bits(&trained));
        assert_eq!(
            loaded.classify(&views).unwrap(),
            trained.classify(&views).unwrap()
        );
    }

    #[test]
    fn inconsistent_model_file_is_rejected() {
        let (images, labels) = synthetic(2);
        let views: Vec<_> = images.iter().map(Image::view).collect();
        let trained = ImageClassifier::new(small_hog(), SvcParams::default())
            .unwrap()
            .train(&views, &labels, &TrainOptions::default())
            .unwrap();
        let mut value = serde_json::to_value(&trained).unwrap();
        value["model"]["n_features"] = serde_json::json!(3);
        let err = TrainedClassifier::from_json_str(&value.to_string()).unwrap_err();
        assert!(
            matches!(err, PipelineError::ModelIo(ModelIoError::Inconsistent(_))),
            "{err}"
        );
    }

    #[test]
    fn wrong_geometry_is_a_predict_error() {
        let (images, labels) = synthetic(3);
        let views: Vec<_> = images.iter().map(Image::view).collect();
        let trained = ImageClassifier::new(small_hog(), SvcParams::default())
            .unwrap()
            .train(&views, &labels, &TrainOptions::default())
            .unwrap();

        let bigger = Image::from_fn(48, 32, 1, |x, _, _| (x * 5) as u8).unwrap();
        let err = trained.classify_one(&bigger.view()).unwrap_err();
        assert!(
            matches!(
                err,
                PipelineError::Predict(PredictError::DimensionMismatch { .. })
            ),
            "{err}"
        );
    }

    #[test]
    fn invalid_params_are_rejected_up_front() {
        let bad_svc = SvcParams {
            c: -1.0,
            ..SvcParams::default()
        };
        assert!(matches!(
            ImageClassifier::new(HogParams::default(), bad_svc),
            Err(PipelineError::Train(TrainError::InvalidParams(_)))
        ));
        let bad_hog = HogParams {
            orientations: 0,
            ..HogParams::default()
        };
        assert!(matches!(
            ImageClassifier::new(bad_hog, SvcParams::default()),
            Err(PipelineError::Hog(_))
        ));
    }
}
