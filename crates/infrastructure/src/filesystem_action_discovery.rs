use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use remedy_application::{ArtifactKind, DiscoveredArtifact};
use remedy_core::{AppError, AppResult};

const PLAYBOOK_EXTENSIONS: &[&str] = &["yml", "yaml"];
const SCRIPT_EXTENSIONS: &[&str] = &["sh", "py"];

/// Scans playbook and script directories for runnable artifacts.
#[derive(Debug, Clone)]
pub struct FilesystemActionDiscovery {
    playbooks_dir: PathBuf,
    scripts_dir: PathBuf,
}

impl FilesystemActionDiscovery {
    /// Creates a discovery over the two artifact directories.
    #[must_use]
    pub fn new(playbooks_dir: impl Into<PathBuf>, scripts_dir: impl Into<PathBuf>) -> Self {
        Self {
            playbooks_dir: playbooks_dir.into(),
            scripts_dir: scripts_dir.into(),
        }
    }

    /// Lists artifacts in both directories. Missing directories are empty.
    pub async fn discover(&self) -> AppResult<Vec<DiscoveredArtifact>> {
        let mut artifacts =
            scan_directory(&self.playbooks_dir, ArtifactKind::Playbook, PLAYBOOK_EXTENSIONS)
                .await?;
        artifacts.extend(
            scan_directory(&self.scripts_dir, ArtifactKind::Script, SCRIPT_EXTENSIONS).await?,
        );

        Ok(artifacts)
    }
}

async fn scan_directory(
    dir: &Path,
    kind: ArtifactKind,
    extensions: &[&str],
) -> AppResult<Vec<DiscoveredArtifact>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(error) if error.kind() == ErrorKind::NotFound => {
            tracing::debug!(dir = %dir.display(), "artifact directory does not exist");
            return Ok(Vec::new());
        }
        Err(error) => {
            return Err(AppError::Internal(format!(
                "failed to read artifact directory '{}': {error}",
                dir.display()
            )));
        }
    };

    let mut artifacts = Vec::new();
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(error) => {
                return Err(AppError::Internal(format!(
                    "failed to list artifact directory '{}': {error}",
                    dir.display()
                )));
            }
        };

        let is_file = entry
            .file_type()
            .await
            .map(|file_type| file_type.is_file())
            .unwrap_or(false);
        if !is_file {
            continue;
        }

        let path = entry.path();
        let matches_extension = path
            .extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| extensions.contains(&extension));
        let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        if !matches_extension || name.is_empty() {
            continue;
        }

        artifacts.push(DiscoveredArtifact {
            name: name.to_owned(),
            kind,
            reference: path.to_string_lossy().into_owned(),
        });
    }

    artifacts.sort_by(|left, right| left.reference.cmp(&right.reference));
    Ok(artifacts)
}
