mod loader;

pub use loader::{DEFAULT_PUZZLES_PATH, LoadError, load_catalog_from_json};
