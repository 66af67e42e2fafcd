//! Single-image multipart uploads.
//!
//! A request carries at most one file, under [`IMAGE_FIELD`]. The file's
//! extension and declared content type are checked against the allow-list
//! before any bytes are read, and the body is buffered up to the size limit.
//! Nothing touches the disk until [`ImageUploader::store`] is called, so a
//! rejected upload never leaves a file behind.
//!
//! The content type is taken from the client as declared; file contents are
//! not sniffed.

use axum::extract::multipart::{Field, Multipart, MultipartError};
use axum::http::StatusCode;
use bytes::{Bytes, BytesMut};
use chrono::Utc;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;

use crate::config::Config;

pub const IMAGE_FIELD: &str = "img";
pub const PUBLIC_PREFIX: &str = "/images";

const NAME_ATTEMPTS: usize = 5;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("File size too large")]
    FileTooLarge,

    #[error("Error: Images only! ({0})")]
    InvalidFileType(String),

    #[error("Unexpected field: {0}")]
    UnexpectedField(String),

    #[error("Malformed multipart body: {0}")]
    Malformed(String),

    #[error("Failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

/// A validated image held in memory.
#[derive(Debug)]
pub struct PendingImage {
    pub original_name: String,
    pub extension: String,
    pub data: Bytes,
}

/// Text fields of a multipart request plus its image, if one was sent.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub fields: HashMap<String, String>,
    pub image: Option<PendingImage>,
}

impl UploadForm {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

pub struct ImageUploader {
    dir: PathBuf,
    max_size: usize,
    extensions: Vec<String>,
}

fn content_types_for(extension: &str) -> &'static [&'static str] {
    match extension {
        "jpg" | "jpeg" => &["image/jpeg", "image/jpg", "image/pjpeg"],
        "png" => &["image/png"],
        "gif" => &["image/gif"],
        "webp" => &["image/webp"],
        _ => &[],
    }
}

impl ImageUploader {
    pub fn new(dir: impl Into<PathBuf>, max_size: usize, extensions: Vec<String>) -> Self {
        Self {
            dir: dir.into(),
            max_size,
            extensions,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.upload_dir.clone(),
            config.max_upload_size,
            config.image_extensions(),
        )
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Returns the lower-cased extension when both the file name and the
    /// declared content type are on the allow-list.
    pub fn check_type(
        &self,
        file_name: &str,
        content_type: Option<&str>,
    ) -> Result<String, UploadError> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        if extension.is_empty() || !self.extensions.contains(&extension) {
            return Err(UploadError::InvalidFileType(file_name.to_string()));
        }

        let declared = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase())
            .unwrap_or_default();

        if !content_types_for(&extension).contains(&declared.as_str()) {
            return Err(UploadError::InvalidFileType(format!("{} ({})", file_name, declared)));
        }

        Ok(extension)
    }

    /// Drains the multipart stream into text fields and at most one image.
    pub async fn read_form(&self, mut multipart: Multipart) -> Result<UploadForm, UploadError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();

            let Some(file_name) = field.file_name().map(str::to_string) else {
                let value = field.text().await.map_err(multipart_error)?;
                form.fields.insert(name, value);
                continue;
            };

            if name != IMAGE_FIELD || form.image.is_some() {
                tracing::warn!(field = %name, "upload rejected: unexpected file field");
                return Err(UploadError::UnexpectedField(name));
            }

            let image = self.receive(field, file_name).await.map_err(|e| {
                tracing::warn!(error = %e, "upload rejected");
                e
            })?;
            form.image = Some(image);
        }

        Ok(form)
    }

    async fn receive(
        &self,
        mut field: Field<'_>,
        file_name: String,
    ) -> Result<PendingImage, UploadError> {
        let extension = self.check_type(&file_name, field.content_type())?;

        let mut buffer = BytesMut::new();
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            if buffer.len() + chunk.len() > self.max_size {
                return Err(UploadError::FileTooLarge);
            }
            buffer.extend_from_slice(&chunk);
        }

        Ok(PendingImage {
            original_name: file_name,
            extension,
            data: buffer.freeze(),
        })
    }

    /// Writes the image under a fresh timestamp-based name and returns its
    /// public path, `/images/<file>`.
    pub async fn store(&self, image: PendingImage) -> Result<String, UploadError> {
        self.ensure_dir().await?;

        for _ in 0..NAME_ATTEMPTS {
            let file_name = format!(
                "{}{:04x}.{}",
                Utc::now().timestamp_millis(),
                rand::random::<u16>(),
                image.extension
            );
            let path = self.dir.join(&file_name);

            let mut file = match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            };

            file.write_all(&image.data).await?;
            file.flush().await?;

            tracing::info!(
                original = %image.original_name,
                stored = %file_name,
                bytes = image.data.len(),
                "image stored"
            );
            return Ok(format!("{}/{}", PUBLIC_PREFIX, file_name));
        }

        Err(UploadError::Io(std::io::Error::new(
            ErrorKind::AlreadyExists,
            "could not allocate a unique file name",
        )))
    }
}

fn multipart_error(err: MultipartError) -> UploadError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::FileTooLarge
    } else {
        UploadError::Malformed(err.body_text())
    }
}
