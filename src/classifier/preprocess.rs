use image::{DynamicImage, ImageReader, imageops::FilterType};
use std::path::Path;
use std::str::FromStr;
use tract_onnx::prelude::*;

use super::interface::ClassifierError;

/// Side length of the square frame the network expects.
pub const INPUT_SIZE: u32 = 224;

const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];
// BGR order, raw 0..255 scale
const CAFFE_MEAN: [f32; 3] = [103.939, 116.779, 123.68];

/// Input normalization required by the pretrained network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalization {
    /// `(px / 255 - mean) / std` per RGB channel (ONNX model zoo, torchvision).
    ImageNet,
    /// RGB to BGR, then per-channel mean subtraction on 0..255 values (Keras VGG16).
    Caffe,
}

impl Normalization {
    /// Value of output channel `c` for an RGB pixel.
    fn apply(self, rgb: [u8; 3], c: usize) -> f32 {
        match self {
            Normalization::ImageNet => {
                (rgb[c] as f32 / 255.0 - IMAGENET_MEAN[c]) / IMAGENET_STD[c]
            }
            Normalization::Caffe => rgb[2 - c] as f32 - CAFFE_MEAN[c],
        }
    }
}

impl FromStr for Normalization {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "imagenet" | "torch" => Ok(Normalization::ImageNet),
            "caffe" | "keras" => Ok(Normalization::Caffe),
            other => Err(format!("unknown normalization '{}', expected imagenet or caffe", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensorLayout {
    Nchw,
    Nhwc,
}

impl TensorLayout {
    pub fn input_shape(self) -> [usize; 4] {
        let size = INPUT_SIZE as usize;
        match self {
            TensorLayout::Nchw => [1, 3, size, size],
            TensorLayout::Nhwc => [1, size, size, 3],
        }
    }
}

impl FromStr for TensorLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nchw" => Ok(TensorLayout::Nchw),
            "nhwc" => Ok(TensorLayout::Nhwc),
            other => Err(format!("unknown tensor layout '{}', expected nchw or nhwc", other)),
        }
    }
}

/// Opens an image file, detecting the format from its content rather than
/// its extension.
pub fn load_image(path: &Path) -> Result<DynamicImage, ClassifierError> {
    let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    Ok(image)
}

/// Resizes to `INPUT_SIZE`×`INPUT_SIZE` (aspect ratio is not preserved) and
/// converts to a normalized `f32` batch of one.
pub fn image_to_tensor(
    image: &DynamicImage,
    layout: TensorLayout,
    normalization: Normalization,
) -> Tensor {
    let resized = image.resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::Triangle);
    let rgb = resized.to_rgb8();
    let size = INPUT_SIZE as usize;

    match layout {
        TensorLayout::Nchw => {
            tract_ndarray::Array4::from_shape_fn((1, 3, size, size), |(_, c, y, x)| {
                normalization.apply(rgb.get_pixel(x as u32, y as u32).0, c)
            })
            .into_tensor()
        }
        TensorLayout::Nhwc => {
            tract_ndarray::Array4::from_shape_fn((1, size, size, 3), |(_, y, x, c)| {
                normalization.apply(rgb.get_pixel(x as u32, y as u32).0, c)
            })
            .into_tensor()
        }
    }
}
