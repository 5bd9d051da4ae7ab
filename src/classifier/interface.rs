use std::path::Path;
use thiserror::Error;

/// One ranked prediction. `confidence` is a probability in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: String,
    pub confidence: f32,
}

impl Classification {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }

    /// Renders `"<label> (<percent>%)"` with two decimals, e.g. `"tabby (87.31%)"`.
    pub fn display(&self) -> String {
        format!("{} ({:.2}%)", self.label, self.confidence * 100.0)
    }
}

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Image decode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Label file error: {0}")]
    Labels(String),

    #[error("Model produced no predictions")]
    EmptyOutput,
}

/// A pretrained image classifier treated as an opaque function from an image
/// file to a ranked label list.
pub trait ImageClassifier: Send + Sync {
    /// Returns predictions ranked by descending confidence.
    fn classify(&self, image_path: &Path) -> Result<Vec<Classification>, ClassifierError>;

    fn top_prediction(&self, image_path: &Path) -> Result<Classification, ClassifierError> {
        self.classify(image_path)?
            .into_iter()
            .next()
            .ok_or(ClassifierError::EmptyOutput)
    }
}
