//! Links service
//!
//! Quick links grouped by category. Each category keeps its own dense
//! `sort` sequence over its links, so every mutation that removes or moves
//! a link re-ranks the remaining siblings.

use crate::database::{Collection, Link, LinkDraft, Repository};
use crate::error::{AppError, Result};
use crate::services::ordering;
use url::Url;

/// Service for managing links
#[derive(Clone)]
pub struct LinksService {
    repo: Repository,
}

impl LinksService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Get a link by ID
    pub async fn get_link(&self, id: &str) -> Result<Option<Link>> {
        self.repo.get(Collection::Link, id).await
    }

    /// All links, unordered
    pub async fn get_all_links(&self) -> Result<Vec<Link>> {
        self.repo.get_all(Collection::Link).await
    }

    /// Batch lookup; unknown ids are skipped
    pub async fn get_links_by_ids(&self, ids: &[String]) -> Result<Vec<Link>> {
        self.repo.get_many(Collection::Link, ids).await
    }

    /// Links of one category, ascending by `sort`
    pub async fn get_links_by_parent(&self, parent_id: &str) -> Result<Vec<Link>> {
        let mut links: Vec<Link> = self
            .get_all_links()
            .await?
            .into_iter()
            .filter(|link| link.parent_id == parent_id)
            .collect();

        links.sort_by_key(|link| link.sort);
        Ok(links)
    }

    /// Number of links in one category
    pub async fn get_link_count(&self, parent_id: &str) -> Result<usize> {
        Ok(self.get_links_by_parent(parent_id).await?.len())
    }

    /// Create a link, or update it when `draft.id` names an existing one.
    ///
    /// Unset `sort` keeps the existing rank, or appends to the end of the
    /// parent's links. A link moved to another parent is appended there and
    /// its old siblings are re-ranked.
    pub async fn upsert_link(&self, draft: LinkDraft) -> Result<Link> {
        if let Some(url) = draft.url.as_deref().filter(|url| !url.is_empty()) {
            validate_url(url)?;
        }

        let existing = match draft.id.as_deref() {
            Some(id) => self.get_link(id).await?,
            None => None,
        };

        let parent_id = draft.resolved_parent_id(existing.as_ref());
        let previous_parent = existing
            .as_ref()
            .filter(|link| link.parent_id != parent_id)
            .map(|link| link.parent_id.clone());

        let sort = match (draft.sort, existing.as_ref()) {
            (Some(sort), _) => sort,
            (None, Some(link)) if previous_parent.is_none() => link.sort,
            _ => self.get_link_count(&parent_id).await?,
        };

        let link = draft.merge(existing.as_ref(), sort);
        self.repo.put(Collection::Link, &link).await?;

        match existing {
            Some(_) => tracing::debug!("Updated link: {}", link.id),
            None => tracing::info!("Created link: {} in {}", link.id, link.parent_id),
        }

        if let Some(old_parent) = previous_parent {
            tracing::info!("Moved link {} from {} to {}", link.id, old_parent, link.parent_id);
            self.compact_order(&old_parent).await?;
        }

        Ok(link)
    }

    /// Delete a link, optionally closing the gap it leaves in its parent.
    ///
    /// Returns `false` when the link was not found among `parent_id`'s
    /// links; the delete still runs and nothing is re-ranked.
    pub async fn delete_link(&self, parent_id: &str, id: &str, reindex_siblings: bool) -> Result<bool> {
        let siblings = self.get_links_by_parent(parent_id).await?;

        let Some(position) = siblings.iter().position(|link| link.id == id) else {
            tracing::warn!("Link {} not found under {}, skipping reindex", id, parent_id);
            self.repo.delete(Collection::Link, id).await?;
            return Ok(false);
        };

        self.repo.delete(Collection::Link, id).await?;

        if reindex_siblings {
            let mut remaining = siblings;
            remaining.remove(position);
            let changed = ordering::compact(remaining);
            self.repo.put_many(Collection::Link, &changed).await?;
        }

        tracing::info!("Deleted link: {}", id);
        Ok(true)
    }

    /// Delete every link of a category without re-ranking.
    ///
    /// Returns the number of links removed.
    pub async fn delete_links_by_parent(&self, parent_id: &str) -> Result<usize> {
        let ids: Vec<String> = self
            .get_all_links()
            .await?
            .into_iter()
            .filter(|link| link.parent_id == parent_id)
            .map(|link| link.id)
            .collect();

        self.repo.delete_many(Collection::Link, &ids).await?;

        tracing::info!("Deleted {} links of {}", ids.len(), parent_id);
        Ok(ids.len())
    }

    /// Drag-and-drop reorder within one category
    pub async fn update_link_order(&self, parent_id: &str, drag_index: usize, hover_index: usize) -> Result<()> {
        if drag_index == hover_index {
            return Ok(());
        }

        let links = self.get_links_by_parent(parent_id).await?;
        let changed = ordering::reorder(&links, drag_index, hover_index)?;
        self.repo.put_many(Collection::Link, &changed).await?;

        tracing::debug!(
            "Reordered links of {}: {} -> {} ({} updated)",
            parent_id,
            drag_index,
            hover_index,
            changed.len()
        );
        Ok(())
    }

    /// Rewrite `sort` to `0..n-1` for one category; returns links rewritten
    pub async fn compact_order(&self, parent_id: &str) -> Result<usize> {
        let links = self.get_links_by_parent(parent_id).await?;
        let changed = ordering::compact(links);
        self.repo.put_many(Collection::Link, &changed).await?;

        if !changed.is_empty() {
            tracing::info!("Compacted {} link ranks in {}", changed.len(), parent_id);
        }
        Ok(changed.len())
    }
}

/// Prefix `https://` when the user typed no http(s) scheme
pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// URLs must be absolute and well-formed
fn validate_url(url: &str) -> Result<()> {
    Url::parse(url)
        .map(|_| ())
        .map_err(|e| AppError::Validation(format!("Invalid URL '{}': {}", url, e)))
}
