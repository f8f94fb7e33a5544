//! Categories service
//!
//! Business logic for dashboard categories: creation with a dense rank,
//! partial updates, reorder, and deletion that keeps at least one
//! category and cascades to the category's links.

use crate::config::{DEFAULT_CATEGORY_ICON, DEFAULT_CATEGORY_ID, DEFAULT_CATEGORY_NAME};
use crate::database::{Category, CategoryPatch, Collection, Repository};
use crate::error::{AppError, Result};
use crate::services::links::LinksService;
use crate::services::ordering;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Result of a delete request
#[derive(Debug)]
pub enum CategoryDeletion {
    /// The category is gone; its links are being removed in the background
    Deleted(CascadeHandle),
    /// Refused: the last category cannot be deleted
    LastCategory,
}

/// Background removal of a deleted category's links.
///
/// Await [`CascadeHandle::wait`] to observe completion, or drop the handle
/// to let the removal finish on its own.
#[derive(Debug)]
pub struct CascadeHandle {
    category_id: String,
    task: JoinHandle<Result<usize>>,
}

impl CascadeHandle {
    pub fn category_id(&self) -> &str {
        &self.category_id
    }

    /// Wait for the cascade; returns how many links were removed
    pub async fn wait(self) -> Result<usize> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(AppError::Generic(format!(
                "Cascade delete for category {} did not finish: {}",
                self.category_id, e
            ))),
        }
    }
}

/// Service for managing categories
#[derive(Clone)]
pub struct CategoriesService {
    repo: Repository,
    links: LinksService,
}

impl CategoriesService {
    pub fn new(repo: Repository, links: LinksService) -> Self {
        Self { repo, links }
    }

    /// Create the default category on first run
    pub async fn init(&self) -> Result<()> {
        if self.get_category_count().await? == 0 {
            let home = Category {
                id: DEFAULT_CATEGORY_ID.to_string(),
                name: DEFAULT_CATEGORY_NAME.to_string(),
                icon: DEFAULT_CATEGORY_ICON.to_string(),
                sort: 0,
            };
            self.repo.put(Collection::Category, &home).await?;
            tracing::info!("Created default category: {}", home.id);
        }
        Ok(())
    }

    /// Create a category at the end of the list
    pub async fn create_category(&self, name: &str, icon: &str) -> Result<Category> {
        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            icon: icon.to_string(),
            sort: self.get_category_count().await?,
        };

        self.repo.put(Collection::Category, &category).await?;

        tracing::info!("Created category: {} ({})", category.name, category.id);
        Ok(category)
    }

    /// Merge `patch` onto a category; `None` when the id is unknown
    pub async fn update_category(&self, id: &str, patch: CategoryPatch) -> Result<Option<Category>> {
        let Some(existing) = self.get_category(id).await? else {
            tracing::debug!("Update skipped, category not found: {}", id);
            return Ok(None);
        };

        let updated = patch.apply(existing);
        self.repo.put(Collection::Category, &updated).await?;

        tracing::debug!("Updated category: {}", id);
        Ok(Some(updated))
    }

    pub async fn get_category(&self, id: &str) -> Result<Option<Category>> {
        self.repo.get(Collection::Category, id).await
    }

    /// All categories, ascending by `sort`
    pub async fn get_all_categories(&self) -> Result<Vec<Category>> {
        let mut categories: Vec<Category> = self.repo.get_all(Collection::Category).await?;
        categories.sort_by_key(|category| category.sort);
        Ok(categories)
    }

    pub async fn get_category_count(&self) -> Result<usize> {
        self.repo.count(Collection::Category).await
    }

    /// Delete a category, close the rank gap, and cascade to its links.
    ///
    /// The last remaining category is never deleted.
    pub async fn delete_category(&self, id: &str) -> Result<CategoryDeletion> {
        let categories = self.get_all_categories().await?;

        if categories.len() <= 1 {
            tracing::warn!("Refusing to delete the last category: {}", id);
            return Ok(CategoryDeletion::LastCategory);
        }

        let position = categories
            .iter()
            .position(|category| category.id == id)
            .ok_or_else(|| AppError::CategoryNotFound(id.to_string()))?;

        self.repo.delete(Collection::Category, id).await?;

        let mut remaining = categories;
        remaining.remove(position);
        let changed = ordering::compact(remaining);
        self.repo.put_many(Collection::Category, &changed).await?;

        tracing::info!("Deleted category: {}", id);

        let links = self.links.clone();
        let category_id = id.to_string();
        let task = tokio::spawn(async move {
            let result = links.delete_links_by_parent(&category_id).await;
            if let Err(e) = &result {
                tracing::warn!("Cascade delete for category {} failed: {}", category_id, e);
            }
            result
        });

        Ok(CategoryDeletion::Deleted(CascadeHandle {
            category_id: id.to_string(),
            task,
        }))
    }

    /// Drag-and-drop reorder
    pub async fn update_category_order(&self, drag_index: usize, hover_index: usize) -> Result<()> {
        if drag_index == hover_index {
            return Ok(());
        }

        let categories = self.get_all_categories().await?;
        let changed = ordering::reorder(&categories, drag_index, hover_index)?;
        self.repo.put_many(Collection::Category, &changed).await?;

        tracing::debug!(
            "Reordered categories: {} -> {} ({} updated)",
            drag_index,
            hover_index,
            changed.len()
        );
        Ok(())
    }

    /// Rewrite `sort` to `0..n-1`; returns categories rewritten
    pub async fn compact_order(&self) -> Result<usize> {
        let categories = self.get_all_categories().await?;
        let changed = ordering::compact(categories);
        self.repo.put_many(Collection::Category, &changed).await?;

        if !changed.is_empty() {
            tracing::info!("Compacted {} category ranks", changed.len());
        }
        Ok(changed.len())
    }
}
