//! Dashboard view-model
//!
//! Holds what the new-tab page renders: categories with their links, the
//! selected category, the background image id and the search engine.
//! Mutations go through the services and are followed by a refresh.

use crate::app::AppState;
use crate::database::{CategoryInfo, SearchEngine};
use crate::error::Result;

pub struct Dashboard {
    state: AppState,
    categories: Vec<CategoryInfo>,
    current_category_id: Option<String>,
    background_image_id: Option<String>,
    search_engine: SearchEngine,
}

impl Dashboard {
    /// Apply first-run defaults and load everything
    pub async fn load(state: AppState) -> Result<Self> {
        state.initialize().await?;

        let mut dashboard = Self {
            state,
            categories: Vec::new(),
            current_category_id: None,
            background_image_id: None,
            search_engine: SearchEngine::default(),
        };
        dashboard.on_focus().await?;

        Ok(dashboard)
    }

    /// Reload categories and their links.
    ///
    /// The selection survives if its category still exists; otherwise the
    /// first category is selected.
    pub async fn refresh(&mut self) -> Result<()> {
        let categories = self.state.categories.get_all_categories().await?;

        let mut infos = Vec::with_capacity(categories.len());
        for category in categories {
            let links = self.state.links.get_links_by_parent(&category.id).await?;
            infos.push(CategoryInfo { category, links });
        }

        let selection_valid = self
            .current_category_id
            .as_deref()
            .is_some_and(|id| infos.iter().any(|info| info.category.id == id));
        if !selection_valid {
            self.current_category_id = infos.first().map(|info| info.category.id.clone());
        }

        self.categories = infos;
        tracing::debug!("Dashboard refreshed: {} categories", self.categories.len());
        Ok(())
    }

    /// Full reload, as when the tab regains focus
    pub async fn on_focus(&mut self) -> Result<()> {
        self.refresh().await?;
        self.reload_background().await?;
        self.refresh_search_engine().await?;
        Ok(())
    }

    pub fn categories(&self) -> &[CategoryInfo] {
        &self.categories
    }

    pub fn current_category_id(&self) -> Option<&str> {
        self.current_category_id.as_deref()
    }

    pub fn current_category(&self) -> Option<&CategoryInfo> {
        let id = self.current_category_id.as_deref()?;
        self.categories.iter().find(|info| info.category.id == id)
    }

    /// Select a loaded category; `false` if no such category
    pub fn select_category(&mut self, id: &str) -> bool {
        if self.categories.iter().any(|info| info.category.id == id) {
            self.current_category_id = Some(id.to_string());
            true
        } else {
            false
        }
    }

    pub async fn update_category_order(&mut self, drag_index: usize, hover_index: usize) -> Result<()> {
        self.state
            .categories
            .update_category_order(drag_index, hover_index)
            .await?;
        self.refresh().await
    }

    pub async fn update_link_order(
        &mut self,
        parent_id: &str,
        drag_index: usize,
        hover_index: usize,
    ) -> Result<()> {
        self.state
            .links
            .update_link_order(parent_id, drag_index, hover_index)
            .await?;
        self.refresh().await
    }

    pub fn background_image_id(&self) -> Option<&str> {
        self.background_image_id.as_deref()
    }

    /// Re-read the background record; `true` only when its id changed
    pub async fn reload_background(&mut self) -> Result<bool> {
        let id = self
            .state
            .system
            .get_background_image()
            .await?
            .map(|record| record.id);

        if id == self.background_image_id {
            return Ok(false);
        }

        tracing::debug!("Background image changed: {:?}", id);
        self.background_image_id = id;
        Ok(true)
    }

    pub fn search_engine(&self) -> SearchEngine {
        self.search_engine
    }

    pub async fn set_search_engine(&mut self, engine: SearchEngine) -> Result<()> {
        self.state.system.update_search_engine(engine).await?;
        self.search_engine = engine;
        Ok(())
    }

    pub async fn refresh_search_engine(&mut self) -> Result<()> {
        self.search_engine = self
            .state
            .system
            .get_search_engine()
            .await?
            .unwrap_or_default();
        Ok(())
    }
}
