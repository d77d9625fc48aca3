// src/core/fs_ops.rs
//! File system helpers for downloaded CV files

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

pub struct FsOps;

impl FsOps {
    pub async fn ensure_dir_exists(path: &Path) -> Result<()> {
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)
                .await
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
            info!("Created directory: {}", path.display());
        }
        Ok(())
    }

    /// Write bytes, keeping a timestamped backup of any file already at `path`
    pub async fn write_bytes_safe(path: &Path, content: &[u8]) -> Result<Option<PathBuf>> {
        if let Some(parent) = path.parent() {
            Self::ensure_dir_exists(parent).await?;
        }

        let backup = if path.exists() {
            Some(Self::backup_file(path).await?)
        } else {
            None
        };

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write file: {}", path.display()))?;

        info!("Written {} bytes to {}", content.len(), path.display());
        Ok(backup)
    }

    /// Create backup of file with timestamp. Never overwrites an earlier backup.
    pub async fn backup_file(path: &Path) -> Result<PathBuf> {
        if !path.exists() {
            anyhow::bail!("File to backup does not exist: {}", path.display());
        }

        let stamp = chrono::Utc::now().format("%Y%m%d_%H%M%S_%6f").to_string();
        let backup_path = Self::free_backup_path(path, &stamp);
        fs::copy(path, &backup_path).await.with_context(|| {
            format!("Failed to copy {} to {}", path.display(), backup_path.display())
        })?;

        info!("Backed up {} to {}", path.display(), backup_path.display());
        Ok(backup_path)
    }

    /// `<stem>.backup.<stamp>[-n].<ext>`, counting up until the name is unused
    fn free_backup_path(path: &Path, stamp: &str) -> PathBuf {
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("file");
        let ext = path.extension().and_then(|e| e.to_str());

        let mut counter = 0u32;
        loop {
            let mut name = format!("{}.backup.{}", stem, stamp);
            if counter > 0 {
                name.push_str(&format!("-{}", counter));
            }
            if let Some(ext) = ext {
                name.push('.');
                name.push_str(ext);
            }

            let candidate = path.with_file_name(name);
            if !candidate.exists() {
                return candidate;
            }
            counter += 1;
        }
    }
}
