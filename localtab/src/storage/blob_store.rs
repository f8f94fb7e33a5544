//! Content-addressed blob storage
//!
//! Stores background image bytes under their SHA-256 hash.
//! Files are organized in a two-level directory structure.
//!
//! Example: hash "abcd1234..." is stored at "blobs/ab/cd/abcd1234..."

use crate::error::{AppError, Result};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Content-addressed blob store
#[derive(Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Create the root directory if needed
    pub async fn initialize(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        tracing::info!("Blob store initialized at: {:?}", self.root);
        Ok(())
    }

    /// Write data, returning its SHA-256 hash. Writing the same bytes twice
    /// is a no-op.
    pub async fn write(&self, data: &[u8]) -> Result<String> {
        let hash = calculate_hash(data);
        let path = self.path_for(&hash)?;

        if fs::try_exists(&path).await? {
            tracing::debug!("Blob already exists: {}", hash);
            return Ok(hash);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Write to a temp file and rename so readers never see a partial blob
        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        fs::rename(&temp_path, &path).await?;

        tracing::debug!("Wrote blob: {} ({} bytes)", hash, data.len());

        Ok(hash)
    }

    pub async fn read(&self, hash: &str) -> Result<Vec<u8>> {
        let path = self.path_for(hash)?;

        if !fs::try_exists(&path).await? {
            return Err(AppError::BlobStore(format!("Blob not found: {}", hash)));
        }

        let data = fs::read(&path).await?;
        tracing::debug!("Read blob: {} ({} bytes)", hash, data.len());
        Ok(data)
    }

    /// Malformed hashes simply do not exist
    pub async fn exists(&self, hash: &str) -> Result<bool> {
        match self.path_for(hash) {
            Ok(path) => Ok(fs::try_exists(&path).await?),
            Err(_) => Ok(false),
        }
    }

    /// Delete a blob; deleting a missing blob is fine
    pub async fn delete(&self, hash: &str) -> Result<()> {
        let path = self.path_for(hash)?;

        if !fs::try_exists(&path).await? {
            return Ok(());
        }

        fs::remove_file(&path).await?;
        tracing::debug!("Deleted blob: {}", hash);
        Ok(())
    }

    /// Hashes of every stored blob
    pub async fn list_all(&self) -> Result<Vec<String>> {
        let mut hashes = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            if !fs::try_exists(&dir).await? {
                continue;
            }

            let mut entries = fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                let file_type = entry.file_type().await?;

                if file_type.is_dir() {
                    pending.push(path);
                } else if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    if is_valid_hash(name) {
                        hashes.push(name.to_string());
                    }
                }
            }
        }

        Ok(hashes)
    }

    /// Delete every blob not in `keep`; returns how many were removed
    pub async fn prune(&self, keep: &HashSet<String>) -> Result<usize> {
        let mut removed = 0;
        for hash in self.list_all().await? {
            if !keep.contains(&hash) {
                self.delete(&hash).await?;
                removed += 1;
            }
        }

        if removed > 0 {
            tracing::info!("Pruned {} unreferenced blobs", removed);
        }
        Ok(removed)
    }

    /// On-disk location of a blob; the file may not exist
    pub fn path_of(&self, hash: &str) -> Result<PathBuf> {
        self.path_for(hash)
    }

    fn path_for(&self, hash: &str) -> Result<PathBuf> {
        if !is_valid_hash(hash) {
            return Err(AppError::BlobStore(format!("Invalid blob hash: {}", hash)));
        }
        Ok(self.root.join(&hash[0..2]).join(&hash[2..4]).join(hash))
    }
}

fn calculate_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// 64 lowercase hex characters
fn is_valid_hash(hash: &str) -> bool {
    hash.len() == 64 && hash.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_store() -> (BlobStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = BlobStore::new(temp_dir.path().join("blobs"));
        store.initialize().await.unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let (store, _temp) = create_test_store().await;

        let data = b"\x89PNG fake image";
        let hash = store.write(data).await.unwrap();

        assert_eq!(hash.len(), 64);
        assert_eq!(store.read(&hash).await.unwrap(), data);
        assert_eq!(store.write(data).await.unwrap(), hash);
    }

    #[tokio::test]
    async fn test_directory_structure() {
        let (store, temp) = create_test_store().await;

        let hash = store.write(b"layout").await.unwrap();

        let path = store.path_for(&hash).unwrap();
        assert!(path.exists());
        assert_eq!(path.parent().unwrap().file_name().unwrap(), &hash[2..4]);
        assert!(path.starts_with(temp.path().join("blobs").join(&hash[0..2])));
    }

    #[tokio::test]
    async fn test_invalid_hash() {
        let (store, _temp) = create_test_store().await;

        assert!(!store.exists("abc").await.unwrap());
        assert!(matches!(store.read("../etc/passwd").await, Err(AppError::BlobStore(_))));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (store, _temp) = create_test_store().await;

        let hash = store.write(b"gone").await.unwrap();
        store.delete(&hash).await.unwrap();
        store.delete(&hash).await.unwrap();

        assert!(!store.exists(&hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_prune_keeps_referenced() {
        let (store, _temp) = create_test_store().await;

        let keep = store.write(b"current background").await.unwrap();
        let old1 = store.write(b"old background 1").await.unwrap();
        let old2 = store.write(b"old background 2").await.unwrap();

        let removed = store.prune(&HashSet::from([keep.clone()])).await.unwrap();

        assert_eq!(removed, 2);
        assert_eq!(store.list_all().await.unwrap(), vec![keep]);
        assert!(!store.exists(&old1).await.unwrap());
        assert!(!store.exists(&old2).await.unwrap());
    }
}
