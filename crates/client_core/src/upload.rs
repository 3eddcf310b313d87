use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::{
    api::StoryApi,
    compress::{ImageCompressor, JpegCompressor, DEFAULT_MAX_UPLOAD_BYTES},
    error::ValidationError,
    observable::Subscription,
    state::{RequestState, RequestTracker},
};

/// Photo picked by the user, before compression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedImage {
    pub bytes: Vec<u8>,
    pub filename: String,
}

impl SelectedImage {
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read image '{}'", path.display()))?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo.jpg".to_string());
        Ok(Self { bytes, filename })
    }
}

pub struct StoryUploadController {
    api: Arc<dyn StoryApi>,
    compressor: Arc<dyn ImageCompressor>,
    max_upload_bytes: usize,
    state: RequestTracker,
}

impl StoryUploadController {
    pub fn new(api: Arc<dyn StoryApi>) -> Self {
        Self::with_compressor(api, Arc::new(JpegCompressor), DEFAULT_MAX_UPLOAD_BYTES)
    }

    pub fn with_compressor(
        api: Arc<dyn StoryApi>,
        compressor: Arc<dyn ImageCompressor>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            api,
            compressor,
            max_upload_bytes,
            state: RequestTracker::default(),
        }
    }

    pub fn state(&self) -> RequestState {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> Subscription<RequestState> {
        self.state.subscribe()
    }

    /// Submits a story. Local checks run before any I/O and are returned as
    /// `Err`; their message is also published without touching the
    /// loading/error flags. The feed is not refreshed afterwards.
    pub async fn add_new_story(
        &self,
        token: &str,
        image: Option<SelectedImage>,
        caption: &str,
    ) -> Result<(), ValidationError> {
        let caption = caption.trim();
        let checked = if caption.is_empty() {
            Err(ValidationError::EmptyCaption)
        } else if let Some(image) = image {
            if token.is_empty() {
                Err(ValidationError::MissingToken)
            } else {
                Ok(image)
            }
        } else {
            Err(ValidationError::NoImageSelected)
        };
        let image = checked.map_err(|err| self.reject(err))?;

        let compressor = Arc::clone(&self.compressor);
        let max_bytes = self.max_upload_bytes;
        let SelectedImage { bytes, filename } = image;
        let compressed =
            tokio::task::spawn_blocking(move || compressor.compress(&bytes, max_bytes))
                .await
                .map_err(|err| self.reject(ValidationError::UnreadableImage(err.to_string())))?
                .map_err(|err| self.reject(ValidationError::UnreadableImage(err.to_string())))?;
        let filename = jpeg_filename(&filename);

        self.state.begin();
        info!(filename = %filename, size = compressed.len(), "upload: submitting story");
        match self
            .api
            .create_story(token, compressed, &filename, caption)
            .await
        {
            Ok(response) => {
                info!("upload: story created");
                self.state.succeed(response.message);
            }
            Err(err) => {
                warn!(error = %err, "upload: story rejected");
                self.state.fail(err.user_message());
            }
        }
        Ok(())
    }

    fn reject(&self, err: ValidationError) -> ValidationError {
        warn!(field = err.field().unwrap_or("-"), reason = %err, "upload: validation failed");
        self.state.notify(err.to_string());
        err
    }
}

fn jpeg_filename(original: &str) -> String {
    let stem = Path::new(original)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "photo".to_string());
    format!("{stem}.jpg")
}

#[cfg(test)]
#[path = "tests/upload_tests.rs"]
mod tests;
