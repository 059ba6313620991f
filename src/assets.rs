use std::fs;
use std::path::Path;
use anyhow::{Context, Result};
use tracing::{info, warn};

/// Text-art logo shown above the title when present
pub const LOGO_FILE: &str = "pai_logo.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Logo {
    Art(Vec<String>),
    /// No logo on disk; the header falls back to a text title and this warning
    Missing { warning: String },
}

/// Create the assets directory if needed and look for the logo in it.
pub fn prepare(assets_dir: &Path) -> Result<Logo> {
    if !assets_dir.exists() {
        fs::create_dir_all(assets_dir)
            .with_context(|| format!("failed to create {}", assets_dir.display()))?;
        info!("created assets directory {}", assets_dir.display());
    }

    Ok(load_logo(&assets_dir.join(LOGO_FILE)))
}

fn load_logo(path: &Path) -> Logo {
    match fs::read_to_string(path) {
        Ok(art) if !art.trim().is_empty() => {
            Logo::Art(art.lines().map(|l| l.trim_end().to_string()).collect())
        }
        Ok(_) | Err(_) => {
            warn!("logo not found at {}", path.display());
            Logo::Missing {
                warning: format!(
                    "Advertencia: No se encontró el logo en {}. Guarda el logo de Pai en la carpeta '{}' de tu proyecto.",
                    path.display(),
                    path.parent().map(|p| p.display().to_string()).unwrap_or_default(),
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_dir_is_created() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("assets");

        let logo = prepare(&dir).unwrap();

        assert!(dir.is_dir());
        match logo {
            Logo::Missing { warning } => assert!(warning.contains(LOGO_FILE)),
            other => panic!("expected missing logo, got {:?}", other),
        }
    }

    #[test]
    fn test_logo_is_loaded() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join(LOGO_FILE), " ___  \n| _ \\ \n|  _/ \n").unwrap();

        let logo = prepare(tmp.path()).unwrap();
        assert_eq!(
            logo,
            Logo::Art(vec![" ___".to_string(), "| _ \\".to_string(), "|  _/".to_string()])
        );
    }

    #[test]
    fn test_blank_logo_counts_as_missing() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join(LOGO_FILE), "\n  \n").unwrap();
        assert!(matches!(prepare(tmp.path()).unwrap(), Logo::Missing { .. }));
    }
}
