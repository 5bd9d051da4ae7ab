use image::DynamicImage;
use std::path::{Path, PathBuf};
use tract_onnx::prelude::*;

use super::interface::{Classification, ClassifierError, ImageClassifier};
use super::labels::load_labels;
use super::preprocess::{Normalization, TensorLayout, image_to_tensor, load_image};
use super::ranking::rank_scores;

#[derive(Debug, Clone)]
pub struct TractSettings {
    pub model_path: PathBuf,
    pub labels_path: PathBuf,
    pub normalization: Normalization,
    pub layout: TensorLayout,
    pub top_k: usize,
}

/// Pretrained ONNX classifier run with tract. The optimized plan is built once
/// and shared across requests; `run` allocates its own state per call.
pub struct TractClassifier {
    model: TypedRunnableModel<TypedModel>,
    labels: Vec<String>,
    normalization: Normalization,
    layout: TensorLayout,
    top_k: usize,
}

fn model_error(e: TractError) -> ClassifierError {
    ClassifierError::Model(format!("{:#}", e))
}

/// Flattens the first network output into a score vector.
fn scores_from_outputs(outputs: &[TValue]) -> Result<Vec<f32>, ClassifierError> {
    let output = outputs.first().ok_or(ClassifierError::EmptyOutput)?;
    let scores: Vec<f32> = output
        .to_array_view::<f32>()
        .map_err(model_error)?
        .iter()
        .copied()
        .collect();
    if scores.is_empty() {
        return Err(ClassifierError::EmptyOutput);
    }
    Ok(scores)
}

impl TractClassifier {
    pub fn load(settings: &TractSettings) -> Result<Self, ClassifierError> {
        let labels = load_labels(&settings.labels_path)?;

        let [n, a, b, c] = settings.layout.input_shape();
        let model = tract_onnx::onnx()
            .model_for_path(&settings.model_path)
            .and_then(|model| {
                model.with_input_fact(
                    0,
                    InferenceFact::dt_shape(f32::datum_type(), tvec!(n, a, b, c)),
                )
            })
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(model_error)?;

        tracing::info!(
            model = %settings.model_path.display(),
            labels = labels.len(),
            layout = ?settings.layout,
            normalization = ?settings.normalization,
            "Loaded classification model"
        );

        Ok(Self {
            model,
            labels,
            normalization: settings.normalization,
            layout: settings.layout,
            top_k: settings.top_k,
        })
    }

    pub fn classify_image(&self, image: &DynamicImage) -> Result<Vec<Classification>, ClassifierError> {
        let input = image_to_tensor(image, self.layout, self.normalization);
        let outputs = self
            .model
            .run(tvec!(input.into_tvalue()))
            .map_err(model_error)?;

        let scores = scores_from_outputs(&outputs)?;
        Ok(rank_scores(&scores, &self.labels, self.top_k))
    }
}

impl ImageClassifier for TractClassifier {
    fn classify(&self, image_path: &Path) -> Result<Vec<Classification>, ClassifierError> {
        let image = load_image(image_path)?;
        let predictions = self.classify_image(&image)?;
        tracing::debug!(path = %image_path.display(), ?predictions, "Classified image");
        Ok(predictions)
    }
}
