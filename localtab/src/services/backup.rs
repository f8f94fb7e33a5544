//! Backup service
//!
//! Exports the whole data set as one JSON document and imports it back.
//! Import replaces the `category`, `link`, `link_group` and `system`
//! collections. The document is fully validated before the first write;
//! once writes begin there is no rollback.

use crate::config::{BACKUPS_DIR_NAME, EXPORT_FILE_PREFIX, EXPORT_FORMAT_VERSION};
use crate::database::{Category, Collection, Link, LinkGroup, Repository, SearchEngine};
use crate::error::{AppError, Result};
use crate::services::system::validate_image_mime;
use crate::services::{CategoriesService, LinkGroupsService, LinksService, SystemService};
use crate::storage::BlobStore;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Export document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    pub version: String,
    #[serde(default)]
    pub export_date: String,
    pub categories: Vec<Category>,
    pub links: Vec<Link>,
    #[serde(default)]
    pub link_groups: Vec<LinkGroup>,
    #[serde(default)]
    pub system: ExportedSystem,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedSystem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_engine: Option<SearchEngine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<ExportedImage>,
}

/// Background image inlined as base64
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedImage {
    pub id: String,
    pub base64: String,
    pub mime_type: String,
}

/// What an import wrote
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub categories: usize,
    pub links: usize,
    pub link_groups: usize,
    pub background_image: bool,
}

/// Backup service
#[derive(Clone)]
pub struct BackupService {
    repo: Repository,
    blob_store: BlobStore,
    categories: CategoriesService,
    links: LinksService,
    link_groups: LinkGroupsService,
    system: SystemService,
    backups_dir: PathBuf,
}

impl BackupService {
    pub fn new(
        repo: Repository,
        blob_store: BlobStore,
        categories: CategoriesService,
        links: LinksService,
        link_groups: LinkGroupsService,
        system: SystemService,
        app_data_dir: &Path,
    ) -> Self {
        Self {
            repo,
            blob_store,
            categories,
            links,
            link_groups,
            system,
            backups_dir: app_data_dir.join(BACKUPS_DIR_NAME),
        }
    }

    /// Snapshot every collection into an export document
    pub async fn export_data(&self) -> Result<ExportData> {
        tracing::info!("Exporting data");

        let background_image = self
            .system
            .read_background_image()
            .await?
            .map(|(record, data)| ExportedImage {
                id: record.id,
                base64: BASE64.encode(data),
                mime_type: record.mime_type,
            });

        Ok(ExportData {
            version: EXPORT_FORMAT_VERSION.to_string(),
            export_date: Utc::now().to_rfc3339(),
            categories: self.categories.get_all_categories().await?,
            links: self.links.get_all_links().await?,
            link_groups: self.link_groups.get_link_groups().await?,
            system: ExportedSystem {
                search_engine: self.system.get_search_engine().await?,
                background_image,
            },
        })
    }

    /// Write an export document into `dir` (the backups directory when
    /// `None`); returns the file path
    pub async fn export_to_file(&self, dir: Option<&Path>) -> Result<PathBuf> {
        let dir = dir.unwrap_or(&self.backups_dir);
        fs::create_dir_all(dir).await?;

        let data = self.export_data().await?;
        let file_name = format!("{}{}.json", EXPORT_FILE_PREFIX, Utc::now().format("%Y-%m-%d"));
        let path = dir.join(file_name);

        fs::write(&path, serde_json::to_string_pretty(&data)?).await?;

        tracing::info!(
            "Exported {} categories and {} links to {:?}",
            data.categories.len(),
            data.links.len(),
            path
        );
        Ok(path)
    }

    /// Replace all data with the contents of an export document
    pub async fn import_data(&self, json: &str) -> Result<ImportSummary> {
        let data = parse_export(json)?;

        let image = match &data.system.background_image {
            Some(image) => {
                validate_image_mime(&image.mime_type)
                    .map_err(|e| AppError::Import(format!("Invalid background image: {}", e)))?;
                let bytes = BASE64
                    .decode(&image.base64)
                    .map_err(|e| AppError::Import(format!("Invalid background image data: {}", e)))?;
                Some((image, bytes))
            }
            None => None,
        };

        tracing::info!(
            "Importing backup version {} from {}",
            data.version,
            data.export_date
        );

        for collection in [
            Collection::Category,
            Collection::Link,
            Collection::LinkGroup,
            Collection::System,
        ] {
            self.repo.clear(collection).await?;
        }

        self.repo.put_many(Collection::Category, &data.categories).await?;
        self.repo.put_many(Collection::Link, &data.links).await?;
        self.repo.put_many(Collection::LinkGroup, &data.link_groups).await?;

        if let Some(engine) = data.system.search_engine {
            self.system.update_search_engine(engine).await?;
        }

        let mut keep = HashSet::new();
        if let Some((image, bytes)) = &image {
            self.system
                .restore_background_image(&image.id, bytes, &image.mime_type)
                .await?;
            if let Some(record) = self.system.get_background_image().await? {
                keep.insert(record.blob_hash);
            }
        }
        self.blob_store.prune(&keep).await?;

        let summary = ImportSummary {
            categories: data.categories.len(),
            links: data.links.len(),
            link_groups: data.link_groups.len(),
            background_image: image.is_some(),
        };

        tracing::info!("Import complete: {:?}", summary);
        Ok(summary)
    }

    pub async fn import_from_file(&self, path: &Path) -> Result<ImportSummary> {
        tracing::info!("Importing from {:?}", path);
        let json = fs::read_to_string(path).await?;
        self.import_data(&json).await
    }

    /// Export files in the backups directory, newest name first
    pub async fn list_backups(&self) -> Result<Vec<BackupFile>> {
        let mut backups = Vec::new();
        if !fs::try_exists(&self.backups_dir).await? {
            return Ok(backups);
        }

        let mut entries = fs::read_dir(&self.backups_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name().to_string_lossy().to_string();
            if !file_name.starts_with(EXPORT_FILE_PREFIX) || !file_name.ends_with(".json") {
                continue;
            }
            let metadata = entry.metadata().await?;
            if metadata.is_file() {
                backups.push(BackupFile {
                    path: entry.path(),
                    file_name,
                    size: metadata.len(),
                });
            }
        }

        backups.sort_by(|a, b| b.file_name.cmp(&a.file_name));
        Ok(backups)
    }
}

/// An export file on disk
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupFile {
    pub path: PathBuf,
    pub file_name: String,
    pub size: u64,
}

/// Validation gate: top-level shape first, then the typed decode
fn parse_export(json: &str) -> Result<ExportData> {
    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| AppError::Import(format!("Invalid JSON: {}", e)))?;

    let object = value
        .as_object()
        .ok_or_else(|| AppError::Import("Export document must be a JSON object".to_string()))?;

    for field in ["version", "categories", "links"] {
        if object.get(field).map_or(true, |v| v.is_null()) {
            return Err(AppError::Import(format!("Missing required field: {}", field)));
        }
    }

    serde_json::from_value(value)
        .map_err(|e| AppError::Import(format!("Invalid export document: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{create_memory_pool, LinkDraft, LinkType};
    use tempfile::TempDir;

    struct Fixture {
        backup: BackupService,
        categories: CategoriesService,
        links: LinksService,
        link_groups: LinkGroupsService,
        system: SystemService,
        _temp: TempDir,
    }

    async fn create_fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let repo = Repository::new(create_memory_pool().await.unwrap());
        let blob_store = BlobStore::new(temp.path().join("blobs"));
        blob_store.initialize().await.unwrap();

        let links = LinksService::new(repo.clone());
        let categories = CategoriesService::new(repo.clone(), links.clone());
        let link_groups = LinkGroupsService::new(repo.clone());
        let system = SystemService::new(repo.clone(), blob_store.clone());
        let backup = BackupService::new(
            repo,
            blob_store,
            categories.clone(),
            links.clone(),
            link_groups.clone(),
            system.clone(),
            temp.path(),
        );

        Fixture {
            backup,
            categories,
            links,
            link_groups,
            system,
            _temp: temp,
        }
    }

    async fn seed(fx: &Fixture) {
        let work = fx.categories.create_category("Work", "briefcase").await.unwrap();
        fx.categories.create_category("Fun", "gamepad").await.unwrap();
        for title in ["Mail", "Calendar"] {
            fx.links
                .upsert_link(LinkDraft {
                    parent_id: Some(work.id.clone()),
                    title: Some(title.to_string()),
                    url: Some(format!("https://{}.example.com", title.to_lowercase())),
                    ..Default::default()
                })
                .await
                .unwrap();
        }
        fx.link_groups
            .create_link_group(&LinkGroup {
                id: "g1".to_string(),
                link_type: LinkType::LinkGroup,
                name: "Tools".to_string(),
                sort: 0,
                description: String::new(),
                parent_id: work.id.clone(),
            })
            .await
            .unwrap();
        fx.system.update_search_engine(SearchEngine::Bing).await.unwrap();
        fx.system
            .save_background_image(&[0u8, 1, 2, 254, 255], "image/png")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_export_shape() {
        let fx = create_fixture().await;
        seed(&fx).await;

        let data = fx.backup.export_data().await.unwrap();
        let json = serde_json::to_value(&data).unwrap();

        assert_eq!(json["version"], EXPORT_FORMAT_VERSION);
        assert!(json["exportDate"].is_string());
        assert_eq!(json["categories"].as_array().unwrap().len(), 2);
        assert_eq!(json["links"].as_array().unwrap().len(), 2);
        assert_eq!(json["linkGroups"].as_array().unwrap().len(), 1);
        assert_eq!(json["system"]["searchEngine"], "BING");
        assert_eq!(json["system"]["backgroundImage"]["mimeType"], "image/png");
        assert_eq!(json["system"]["backgroundImage"]["base64"], "AAEC/v8=");
    }

    #[tokio::test]
    async fn test_round_trip() {
        let source = create_fixture().await;
        seed(&source).await;
        let exported = serde_json::to_string(&source.backup.export_data().await.unwrap()).unwrap();

        let target = create_fixture().await;
        target.categories.create_category("Will be replaced", "").await.unwrap();

        let summary = target.backup.import_data(&exported).await.unwrap();
        assert_eq!(
            summary,
            ImportSummary {
                categories: 2,
                links: 2,
                link_groups: 1,
                background_image: true,
            }
        );

        assert_eq!(
            target.categories.get_all_categories().await.unwrap(),
            source.categories.get_all_categories().await.unwrap()
        );

        let mut source_links = source.links.get_all_links().await.unwrap();
        let mut target_links = target.links.get_all_links().await.unwrap();
        source_links.sort_by(|a, b| a.id.cmp(&b.id));
        target_links.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(target_links, source_links);

        let (source_image, source_bytes) = source.system.read_background_image().await.unwrap().unwrap();
        let (target_image, target_bytes) = target.system.read_background_image().await.unwrap().unwrap();
        assert_eq!(target_image.id, source_image.id);
        assert_eq!(target_bytes, source_bytes);
        assert_eq!(
            target.system.get_search_engine().await.unwrap(),
            Some(SearchEngine::Bing)
        );
    }

    #[tokio::test]
    async fn test_malformed_document_aborts_before_writes() {
        let fx = create_fixture().await;
        seed(&fx).await;

        for bad in [
            "not json",
            "[]",
            r#"{"categories": [], "links": []}"#,
            r#"{"version": "1.0.0", "links": []}"#,
            r#"{"version": "1.0.0", "categories": [{"id": 1}], "links": []}"#,
            r#"{"version": "1.0.0", "categories": [], "links": [],
                "system": {"backgroundImage": {"id": "x", "base64": "@@@", "mimeType": "image/png"}}}"#,
        ] {
            let result = fx.backup.import_data(bad).await;
            assert!(matches!(result, Err(AppError::Import(_))), "accepted: {}", bad);
        }

        assert_eq!(fx.categories.get_category_count().await.unwrap(), 2);
        assert!(fx.system.has_background_image().await.unwrap());
    }

    #[tokio::test]
    async fn test_non_image_mime_rejected_before_writes() {
        let fx = create_fixture().await;
        seed(&fx).await;
        let before = fx.system.get_background_image().await.unwrap().unwrap();

        for mime in ["", "application/pdf"] {
            let json = format!(
                r#"{{"version": "1.0.0", "categories": [], "links": [],
                    "system": {{"backgroundImage": {{"id": "x", "base64": "AAEC", "mimeType": "{}"}}}}}}"#,
                mime
            );
            let result = fx.backup.import_data(&json).await;
            assert!(matches!(result, Err(AppError::Import(_))), "accepted mime {:?}", mime);
        }

        assert_eq!(fx.categories.get_category_count().await.unwrap(), 2);
        assert_eq!(fx.links.get_all_links().await.unwrap().len(), 2);
        assert_eq!(fx.system.get_background_image().await.unwrap(), Some(before));
    }

    #[tokio::test]
    async fn test_import_without_image_removes_existing() {
        let fx = create_fixture().await;
        seed(&fx).await;

        let summary = fx
            .backup
            .import_data(r#"{"version": "1.0.0", "categories": [], "links": []}"#)
            .await
            .unwrap();

        assert!(!summary.background_image);
        assert!(!fx.system.has_background_image().await.unwrap());
        assert_eq!(fx.system.get_search_engine().await.unwrap(), None);
        assert!(fx.backup.blob_store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_export_to_file_and_import_from_file() {
        let fx = create_fixture().await;
        seed(&fx).await;

        let path = fx.backup.export_to_file(None).await.unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with(EXPORT_FILE_PREFIX));
        assert!(name.ends_with(".json"));

        let summary = fx.backup.import_from_file(&path).await.unwrap();
        assert_eq!(summary.links, 2);
        assert_eq!(fx.links.get_all_links().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_backups_ignores_other_files() {
        let fx = create_fixture().await;
        assert!(fx.backup.list_backups().await.unwrap().is_empty());

        let path = fx.backup.export_to_file(None).await.unwrap();
        fs::write(fx.backup.backups_dir.join("notes.txt"), "x").await.unwrap();

        let backups = fx.backup.list_backups().await.unwrap();
        assert_eq!(backups.len(), 1);
        assert_eq!(backups[0].path, path);
        assert!(backups[0].size > 0);
    }
}
