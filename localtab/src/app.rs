//! Application state and initialization
//!
//! This module manages the central application state and lifecycle.
//! All services are initialized here and made available through AppState.

use crate::config::{BACKUPS_DIR_NAME, BLOBS_DIR_NAME, DATABASE_FILE_NAME};
use crate::database::{create_pool, Repository};
use crate::error::Result;
use crate::services::{
    BackupService, CategoriesService, FaviconService, LinkGroupsService, LinksService,
    SystemService,
};
use crate::storage::BlobStore;
use sqlx::SqlitePool;
use std::path::PathBuf;

/// Central application state holding all services
#[derive(Clone)]
pub struct AppState {
    pub app_data_dir: PathBuf,
    pub repo: Repository,
    pub blob_store: BlobStore,
    pub categories: CategoriesService,
    pub links: LinksService,
    pub link_groups: LinkGroupsService,
    pub system: SystemService,
    pub backup: BackupService,
    pub favicons: FaviconService,
}

impl AppState {
    pub fn new(app_data_dir: PathBuf, pool: SqlitePool, blob_store: BlobStore) -> Result<Self> {
        let repo = Repository::new(pool);
        let links = LinksService::new(repo.clone());
        let categories = CategoriesService::new(repo.clone(), links.clone());
        let link_groups = LinkGroupsService::new(repo.clone());
        let system = SystemService::new(repo.clone(), blob_store.clone());
        let backup = BackupService::new(
            repo.clone(),
            blob_store.clone(),
            categories.clone(),
            links.clone(),
            link_groups.clone(),
            system.clone(),
            &app_data_dir,
        );
        let favicons = FaviconService::new()?;

        Ok(Self {
            app_data_dir,
            repo,
            blob_store,
            categories,
            links,
            link_groups,
            system,
            backup,
            favicons,
        })
    }

    /// First-run defaults: search engine, then the home category
    pub async fn initialize(&self) -> Result<()> {
        self.system.init().await?;
        self.categories.init().await?;
        Ok(())
    }
}

/// Application setup - called once on startup
pub async fn setup(app_data_dir: PathBuf) -> Result<AppState> {
    tracing::info!("Initializing application");
    tracing::info!("App data directory: {:?}", app_data_dir);

    tokio::fs::create_dir_all(&app_data_dir).await?;
    tokio::fs::create_dir_all(app_data_dir.join(BACKUPS_DIR_NAME)).await?;

    let pool = create_pool(&app_data_dir.join(DATABASE_FILE_NAME)).await?;

    let blob_store = BlobStore::new(app_data_dir.join(BLOBS_DIR_NAME));
    blob_store.initialize().await?;

    let state = AppState::new(app_data_dir, pool, blob_store)?;

    tracing::info!("Application initialized successfully");

    Ok(state)
}
