//! System service
//!
//! Singleton settings stored under fixed keys in the `system` collection:
//! the selected search engine and the background image record. Image
//! bytes go to the blob store.

use crate::config::{BACKGROUND_IMAGE_KEY, IMAGE_MIME_PREFIX, SEARCH_ENGINE_KEY};
use crate::database::{BackgroundImage, Collection, Repository, SearchEngine};
use crate::error::{AppError, Result};
use crate::storage::BlobStore;
use url::Url;
use uuid::Uuid;

/// Service for system settings
#[derive(Clone)]
pub struct SystemService {
    repo: Repository,
    blob_store: BlobStore,
}

impl SystemService {
    pub fn new(repo: Repository, blob_store: BlobStore) -> Self {
        Self { repo, blob_store }
    }

    /// Persist the default search engine if none is stored
    pub async fn init(&self) -> Result<()> {
        if self.get_search_engine().await?.is_none() {
            self.update_search_engine(SearchEngine::default()).await?;
            tracing::info!("Search engine defaulted to {:?}", SearchEngine::default());
        }
        Ok(())
    }

    pub async fn get_search_engine(&self) -> Result<Option<SearchEngine>> {
        self.repo.get(Collection::System, SEARCH_ENGINE_KEY).await
    }

    pub async fn update_search_engine(&self, engine: SearchEngine) -> Result<()> {
        self.repo
            .put_with_key(Collection::System, SEARCH_ENGINE_KEY, &engine)
            .await?;
        tracing::info!("Search engine set to {:?}", engine);
        Ok(())
    }

    /// Store a new background image; returns its freshly minted id
    pub async fn save_background_image(&self, data: &[u8], mime_type: &str) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        self.restore_background_image(&id, data, mime_type).await?;
        Ok(id)
    }

    /// Store a background image under a known id (used by import)
    pub async fn restore_background_image(&self, id: &str, data: &[u8], mime_type: &str) -> Result<()> {
        validate_image_mime(mime_type)?;

        let previous = self.get_background_image().await?;
        let blob_hash = self.blob_store.write(data).await?;

        let record = BackgroundImage {
            id: id.to_string(),
            blob_hash,
            mime_type: mime_type.to_string(),
            size: data.len() as u64,
        };
        self.repo
            .put_with_key(Collection::System, BACKGROUND_IMAGE_KEY, &record)
            .await?;

        if let Some(previous) = previous.filter(|p| p.blob_hash != record.blob_hash) {
            self.blob_store.delete(&previous.blob_hash).await?;
        }

        tracing::info!("Saved background image {} ({} bytes)", record.id, record.size);
        Ok(())
    }

    /// The stored record; its `id` changes on every save
    pub async fn get_background_image(&self) -> Result<Option<BackgroundImage>> {
        self.repo.get(Collection::System, BACKGROUND_IMAGE_KEY).await
    }

    /// The stored record with its bytes
    pub async fn read_background_image(&self) -> Result<Option<(BackgroundImage, Vec<u8>)>> {
        match self.get_background_image().await? {
            Some(record) => {
                let data = self.blob_store.read(&record.blob_hash).await?;
                Ok(Some((record, data)))
            }
            None => Ok(None),
        }
    }

    /// `file://` URL of the stored image bytes, for renderers that load by URL
    pub async fn background_image_url(&self) -> Result<Option<String>> {
        let Some(record) = self.get_background_image().await? else {
            return Ok(None);
        };

        let path = self.blob_store.path_of(&record.blob_hash)?;
        let path = if path.is_absolute() {
            path
        } else {
            std::env::current_dir()?.join(path)
        };
        let url = Url::from_file_path(&path).map_err(|_| {
            AppError::BlobStore(format!("Blob path is not a valid file URL: {:?}", path))
        })?;
        Ok(Some(url.to_string()))
    }

    pub async fn delete_background_image(&self) -> Result<()> {
        let previous = self.get_background_image().await?;
        self.repo.delete(Collection::System, BACKGROUND_IMAGE_KEY).await?;

        if let Some(previous) = previous {
            self.blob_store.delete(&previous.blob_hash).await?;
            tracing::info!("Deleted background image {}", previous.id);
        }
        Ok(())
    }

    pub async fn has_background_image(&self) -> Result<bool> {
        Ok(self.get_background_image().await?.is_some())
    }
}

/// Background images must carry an `image/*` mime type
pub fn validate_image_mime(mime_type: &str) -> Result<()> {
    if mime_type.starts_with(IMAGE_MIME_PREFIX) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Only image files are supported, got '{}'",
            mime_type
        )))
    }
}
