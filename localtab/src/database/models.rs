//! Database models
//!
//! Rust structs representing stored entities.
//! All models use serde with camelCase field names, which is both the
//! on-disk JSON encoding and the export file format.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repository::Record;

/// Kind of entry shown inside a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkType {
    #[default]
    Link,
    LinkGroup,
}

/// Search engine used by the search box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SearchEngine {
    #[default]
    Google,
    Bing,
    Baidu,
    DuckDuckGo,
}

/// A top-level tab of the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icon: String,
    /// Dense rank over all categories
    pub sort: usize,
}

/// A quick link owned by a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: String,
    #[serde(rename = "type", default)]
    pub link_type: LinkType,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub icon: String,
    /// Weak reference to the owning category
    pub parent_id: String,
    /// Dense rank among links sharing `parent_id`
    pub sort: usize,
}

/// A named group of links (reserved; only created, listed and deleted)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkGroup {
    pub id: String,
    #[serde(rename = "type", default = "link_group_type")]
    pub link_type: LinkType,
    pub name: String,
    pub sort: usize,
    #[serde(default)]
    pub description: String,
    pub parent_id: String,
}

fn link_group_type() -> LinkType {
    LinkType::LinkGroup
}

/// Background image record stored under a fixed system key.
///
/// The bytes live in the blob store under `blob_hash`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundImage {
    /// Minted on every save so readers can skip unchanged reloads
    pub id: String,
    pub blob_hash: String,
    pub mime_type: String,
    pub size: u64,
}

/// A category together with its links, ascending by `sort`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryInfo {
    #[serde(flatten)]
    pub category: Category,
    pub links: Vec<Link>,
}

/// Partial update of a category
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub sort: Option<usize>,
}

impl CategoryPatch {
    /// Overlay the present fields onto `existing`
    pub fn apply(self, existing: Category) -> Category {
        Category {
            id: existing.id,
            name: self.name.unwrap_or(existing.name),
            icon: self.icon.unwrap_or(existing.icon),
            sort: self.sort.unwrap_or(existing.sort),
        }
    }
}

/// Create-or-update request for a link.
///
/// Each field resolves as: explicit value, then the existing record's
/// value, then the type default (empty string, `LinkType::Link`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkDraft {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub link_type: Option<LinkType>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub icon: Option<String>,
    pub parent_id: Option<String>,
    pub sort: Option<usize>,
}

impl LinkDraft {
    /// Parent the merged link will belong to
    pub fn resolved_parent_id(&self, existing: Option<&Link>) -> String {
        self.parent_id
            .clone()
            .or_else(|| existing.map(|link| link.parent_id.clone()))
            .unwrap_or_default()
    }

    /// Build the full record. `sort` is decided by the caller, who knows the
    /// sibling count; a missing id is minted here.
    pub fn merge(self, existing: Option<&Link>, sort: usize) -> Link {
        let parent_id = self.resolved_parent_id(existing);
        let text = |explicit: Option<String>, current: Option<&String>| {
            explicit.or_else(|| current.cloned()).unwrap_or_default()
        };

        Link {
            id: self
                .id
                .or_else(|| existing.map(|link| link.id.clone()))
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            link_type: self
                .link_type
                .or_else(|| existing.map(|link| link.link_type))
                .unwrap_or_default(),
            title: text(self.title, existing.map(|link| &link.title)),
            description: text(self.description, existing.map(|link| &link.description)),
            url: text(self.url, existing.map(|link| &link.url)),
            icon: text(self.icon, existing.map(|link| &link.icon)),
            parent_id,
            sort,
        }
    }
}

impl Record for Category {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Record for Link {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Record for LinkGroup {
    fn key(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_link() -> Link {
        Link {
            id: "l1".to_string(),
            link_type: LinkType::Link,
            title: "Rust".to_string(),
            description: "lang".to_string(),
            url: "https://www.rust-lang.org".to_string(),
            icon: "globe".to_string(),
            parent_id: "home".to_string(),
            sort: 3,
        }
    }

    #[test]
    fn test_link_json_uses_camel_case_and_type() {
        let json = serde_json::to_value(sample_link()).unwrap();
        assert_eq!(json["parentId"], "home");
        assert_eq!(json["type"], "LINK");
        assert!(json.get("link_type").is_none());
    }

    #[test]
    fn test_search_engine_wire_names() {
        let names: Vec<String> = SearchEngine::ALL
            .iter()
            .map(|e| serde_json::to_string(e).unwrap())
            .collect();
        assert_eq!(names, vec!["\"GOOGLE\"", "\"BING\"", "\"BAIDU\"", "\"DUCKDUCKGO\""]);
    }

    #[test]
    fn test_merge_prefers_explicit_then_existing() {
        let existing = sample_link();
        let draft = LinkDraft {
            id: Some("l1".to_string()),
            title: Some("Rust Lang".to_string()),
            description: Some(String::new()),
            ..Default::default()
        };

        let merged = draft.merge(Some(&existing), existing.sort);

        assert_eq!(merged.title, "Rust Lang");
        // explicit empty string overwrites
        assert_eq!(merged.description, "");
        assert_eq!(merged.url, existing.url);
        assert_eq!(merged.icon, "globe");
        assert_eq!(merged.parent_id, "home");
        assert_eq!(merged.sort, 3);
    }

    #[test]
    fn test_merge_without_existing_uses_defaults() {
        let draft = LinkDraft {
            parent_id: Some("home".to_string()),
            title: Some("X".to_string()),
            ..Default::default()
        };

        let merged = draft.merge(None, 0);

        assert!(!merged.id.is_empty());
        assert_eq!(merged.link_type, LinkType::Link);
        assert_eq!(merged.url, "");
        assert_eq!(merged.description, "");
        assert_eq!(merged.title, "X");
    }

    #[test]
    fn test_category_patch_keeps_unset_fields() {
        let category = Category {
            id: "c".to_string(),
            name: "Work".to_string(),
            icon: "briefcase".to_string(),
            sort: 2,
        };

        let patched = CategoryPatch {
            name: Some("Office".to_string()),
            ..Default::default()
        }
        .apply(category);

        assert_eq!(patched.name, "Office");
        assert_eq!(patched.icon, "briefcase");
        assert_eq!(patched.sort, 2);
    }

    #[test]
    fn test_link_group_type_defaults_when_missing() {
        let group: LinkGroup = serde_json::from_str(
            r#"{"id":"g","name":"Dev","sort":0,"parentId":"home"}"#,
        )
        .unwrap();
        assert_eq!(group.link_type, LinkType::LinkGroup);
        assert_eq!(group.description, "");
    }
}
