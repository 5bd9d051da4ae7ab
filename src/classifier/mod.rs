pub mod impl_tract;
pub mod interface;
pub mod labels;
pub mod preprocess;
pub mod ranking;

#[cfg(test)]
pub mod impl_fake;

pub use impl_tract::{TractClassifier, TractSettings};
pub use interface::{Classification, ClassifierError, ImageClassifier};
pub use preprocess::{Normalization, TensorLayout};
