pub mod database;

use serde::Deserialize;
use std::path::PathBuf;

/// Upper bound for `CATEGORY_ANCESTOR_DEPTH`; the resolver recurses once per level.
pub const MAX_ANCESTOR_DEPTH: usize = 32;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub max_upload_size: usize,
    pub allowed_image_extensions: String,
    pub category_ancestor_depth: usize,
}

impl Config {
    /// Reads configuration from the process environment, falling back to
    /// defaults for everything except `DATABASE_URL`.
    pub fn from_env() -> anyhow::Result<Self> {
        let raw = config::Config::builder()
            .set_default("db_max_connections", 10)?
            .set_default("port", 8000)?
            .set_default("upload_dir", "public/images")?
            .set_default("max_upload_size", 10 * 1024 * 1024)?
            .set_default("allowed_image_extensions", "jpg")?
            .set_default("category_ancestor_depth", 3)?
            .add_source(config::Environment::default())
            .build()?;

        let config: Config = raw
            .try_deserialize()
            .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.max_upload_size == 0 {
            anyhow::bail!("MAX_UPLOAD_SIZE must be greater than zero");
        }
        if self.image_extensions().is_empty() {
            anyhow::bail!("ALLOWED_IMAGE_EXTENSIONS must name at least one extension");
        }
        if self.category_ancestor_depth > MAX_ANCESTOR_DEPTH {
            anyhow::bail!(
                "CATEGORY_ANCESTOR_DEPTH must be at most {}",
                MAX_ANCESTOR_DEPTH
            );
        }
        if matches!(self.database_url.as_deref(), Some(url) if url.trim().is_empty()) {
            anyhow::bail!("DATABASE_URL is set but empty");
        }
        Ok(())
    }

    /// Lower-cased extensions without the leading dot.
    pub fn image_extensions(&self) -> Vec<String> {
        self.allowed_image_extensions
            .split(',')
            .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            db_max_connections: 10,
            port: 8000,
            upload_dir: PathBuf::from("public/images"),
            max_upload_size: 10 * 1024 * 1024,
            allowed_image_extensions: "jpg".to_string(),
            category_ancestor_depth: 3,
        }
    }
}
