use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::classifier::{Normalization, TensorLayout};
use crate::upload::NamingStrategy;

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub upload_dir: PathBuf,
    pub naming: NamingStrategy,
    pub max_upload_bytes: usize,
    pub model_path: PathBuf,
    pub labels_path: PathBuf,
    pub normalization: Normalization,
    pub layout: TensorLayout,
    pub top_k: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if it exists (for development)
        dotenvy::dotenv().ok();

        let port = parse_var("PORT", 3000)?;

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:./images.db".to_string());

        let upload_dir = env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./image/"));

        let model_path = env::var("MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./models/vgg16-7.onnx"));

        let labels_path = env::var("LABELS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./models/imagenet_classes.txt"));

        let top_k: usize = parse_var("TOP_K", 5)?;
        if top_k == 0 {
            anyhow::bail!("Invalid TOP_K value: must be at least 1");
        }

        Ok(Config {
            port,
            database_url,
            upload_dir,
            naming: parse_var("UPLOAD_NAMING", NamingStrategy::Uuid)?,
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", 20 * 1024 * 1024)?,
            model_path,
            labels_path,
            normalization: parse_var("MODEL_NORMALIZATION", Normalization::ImageNet)?,
            layout: parse_var("MODEL_LAYOUT", TensorLayout::Nchw)?,
            top_k,
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid {} value: {}", name, e)),
        Err(_) => Ok(default),
    }
}
