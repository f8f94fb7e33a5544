//! Application configuration constants
//!
//! Central location for file names, defaults, and validation boundaries
//! used throughout the application.

// ===== Data Directory Layout =====

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "LOCALTAB_DATA_DIR";

/// Data directory used when the environment variable is unset
pub const DEFAULT_DATA_DIR: &str = "localtab-data";

/// SQLite database file name inside the data directory
pub const DATABASE_FILE_NAME: &str = "localtab.sqlite";

/// Directory holding content-addressed blobs (background images)
pub const BLOBS_DIR_NAME: &str = "blobs";

/// Directory where exports are written by default
pub const BACKUPS_DIR_NAME: &str = "backups";

// ===== First-Run Defaults =====

/// Reserved id of the category created on first run
pub const DEFAULT_CATEGORY_ID: &str = "home";
pub const DEFAULT_CATEGORY_NAME: &str = "Home";
pub const DEFAULT_CATEGORY_ICON: &str = "house";

// ===== System Keys =====

/// Key of the background image record in the `system` collection
pub const BACKGROUND_IMAGE_KEY: &str = "backgroundImage";

/// Key of the selected search engine in the `system` collection
pub const SEARCH_ENGINE_KEY: &str = "searchEngines";

/// Background images must carry a mime type with this prefix
pub const IMAGE_MIME_PREFIX: &str = "image/";

// ===== Export Format =====

/// Version written into every export document
pub const EXPORT_FORMAT_VERSION: &str = "1.0.0";

/// Export file name prefix; the date (YYYY-MM-DD) and `.json` are appended
pub const EXPORT_FILE_PREFIX: &str = "localTab-backup-";

// ===== Search Engines =====

pub const GOOGLE_SEARCH_URL: &str = "https://www.google.com/search?q=";
pub const BING_SEARCH_URL: &str = "https://www.bing.com/search?q=";
pub const BAIDU_SEARCH_URL: &str = "https://www.baidu.com/s?wd=";
pub const DUCKDUCKGO_SEARCH_URL: &str = "https://duckduckgo.com/?q=";

// ===== Favicon Discovery =====

/// Paths probed, in order, on the site's origin
pub const FAVICON_PATHS: &[&str] = &[
    "/favicon.ico",
    "/favicon.png",
    "/apple-touch-icon.png",
    "/icon.png",
];

/// Per-candidate probe timeout in milliseconds
pub const FAVICON_PROBE_TIMEOUT_MS: u64 = 3_000;
