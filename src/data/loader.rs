use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::models::{Catalog, CatalogError, Puzzle};

pub const DEFAULT_PUZZLES_PATH: &str = "puzzles.json";

/// Error raised while reading a puzzle catalog from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid catalog in {}: {source}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: CatalogError,
    },
}

pub fn load_catalog_from_json<P: AsRef<Path>>(path: P) -> Result<Catalog, LoadError> {
    let path = path.as_ref();

    let json_content = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let puzzles: Vec<Puzzle> =
        serde_json::from_str(&json_content).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let catalog = Catalog::new(puzzles).map_err(|source| LoadError::Invalid {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), count = catalog.len(), "loaded puzzle catalog");
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "brain-teaser-{}-{}.json",
            name,
            std::process::id()
        ));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_valid_catalog() {
        let path = write_temp(
            "valid",
            r#"[{"question":"2+2?","options":["3","4"],"correctAnswer":1,"explanation":"math"}]"#,
        );
        let catalog = load_catalog_from_json(&path).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get(0).unwrap().correct_answer, 1);
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_load_reports_each_failure_kind() {
        let missing = std::env::temp_dir().join("brain-teaser-does-not-exist.json");
        assert!(matches!(
            load_catalog_from_json(&missing),
            Err(LoadError::Read { .. })
        ));

        let garbage = write_temp("garbage", "not json");
        assert!(matches!(
            load_catalog_from_json(&garbage),
            Err(LoadError::Parse { .. })
        ));
        fs::remove_file(garbage).unwrap();

        let out_of_range = write_temp(
            "range",
            r#"[{"question":"q","options":["a","b"],"correct_answer":5}]"#,
        );
        assert!(matches!(
            load_catalog_from_json(&out_of_range),
            Err(LoadError::Invalid {
                source: CatalogError::AnswerOutOfRange { .. },
                ..
            })
        ));
        fs::remove_file(out_of_range).unwrap();
    }

    #[test]
    fn test_bundled_catalog_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_PUZZLES_PATH);
        let catalog = load_catalog_from_json(path).unwrap();
        for puzzle in catalog.iter() {
            assert!(puzzle.correct_answer < puzzle.options.len());
        }
    }
}
