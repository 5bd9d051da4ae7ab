use rand::Rng;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// How stored image names are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingStrategy {
    /// Random v4 UUID, 32 hex characters.
    Uuid,
    /// Random integer in `100000..=999999`. Collisions overwrite earlier files.
    RandomDigits,
}

impl NamingStrategy {
    pub fn generate_stem(self) -> String {
        match self {
            NamingStrategy::Uuid => uuid::Uuid::new_v4().simple().to_string(),
            NamingStrategy::RandomDigits => rand::rng().random_range(100_000..=999_999).to_string(),
        }
    }
}

impl FromStr for NamingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "uuid" => Ok(NamingStrategy::Uuid),
            "random" | "digits" => Ok(NamingStrategy::RandomDigits),
            other => Err(format!("unknown naming strategy '{}', expected uuid or random", other)),
        }
    }
}

impl fmt::Display for NamingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamingStrategy::Uuid => write!(f, "uuid"),
            NamingStrategy::RandomDigits => write!(f, "random"),
        }
    }
}

/// A file written into the upload directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub filename: String,
    pub filepath: PathBuf,
}

/// Extension of the client-supplied name including the leading dot, or an
/// empty string. Only the last path component is considered, and either
/// separator style counts. Extensions with anything but ASCII letters and
/// digits are dropped so the stored name is always safe in a URL path.
pub fn extension_of(original_name: &str) -> String {
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name);

    Path::new(base)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default()
}

#[derive(Debug, Clone)]
pub struct UploadDir {
    root: PathBuf,
    naming: NamingStrategy,
}

impl UploadDir {
    pub fn new(root: impl Into<PathBuf>, naming: NamingStrategy) -> Self {
        Self {
            root: root.into(),
            naming,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    /// Writes `bytes` unmodified under a freshly generated name.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> std::io::Result<StoredImage> {
        let stem = self.naming.generate_stem();
        self.save_as(&stem, original_name, bytes).await
    }

    /// Writes `bytes` as `<stem><extension of original_name>`, replacing any
    /// existing file of that name.
    pub async fn save_as(
        &self,
        stem: &str,
        original_name: &str,
        bytes: &[u8],
    ) -> std::io::Result<StoredImage> {
        self.ensure().await?;

        let filename = format!("{}{}", stem, extension_of(original_name));
        let filepath = self.root.join(&filename);
        tokio::fs::write(&filepath, bytes).await?;

        tracing::debug!(
            filename = %filename,
            size_bytes = bytes.len(),
            "Stored uploaded image"
        );

        Ok(StoredImage { filename, filepath })
    }
}
