use std::path::Path;

use super::interface::{Classification, ClassifierError, ImageClassifier};

/// Returns a fixed ranking for any file that exists.
pub struct FakeImageClassifier {
    predictions: Vec<Classification>,
}

impl FakeImageClassifier {
    pub fn new(predictions: Vec<Classification>) -> Self {
        Self { predictions }
    }
}

impl Default for FakeImageClassifier {
    fn default() -> Self {
        Self::new(vec![
            Classification::new("tabby", 0.8731),
            Classification::new("tiger_cat", 0.0912),
        ])
    }
}

impl ImageClassifier for FakeImageClassifier {
    fn classify(&self, image_path: &Path) -> Result<Vec<Classification>, ClassifierError> {
        std::fs::metadata(image_path)?;
        Ok(self.predictions.clone())
    }
}
