//! Services module
//!
//! Business logic services that coordinate between the dashboard and the repository.

pub mod backup;
pub mod categories;
pub mod favicon;
pub mod link_groups;
pub mod links;
pub mod ordering;
pub mod search;
pub mod system;

pub use backup::{BackupFile, BackupService, ExportData, ImportSummary};
pub use categories::{CascadeHandle, CategoriesService, CategoryDeletion};
pub use favicon::{favicon_candidates, FaviconService};
pub use link_groups::LinkGroupsService;
pub use links::{normalize_url, LinksService};
pub use search::resolve_query;
pub use system::SystemService;
