//! Archive download for a chosen subtitle
//!
//! The site spreads files over numbered servers; each is tried from the
//! highest down until one answers with a zip or rar archive.

use futures::StreamExt;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use super::SubdivxClient;
use crate::error::{Result, SubdxError};

const SERVERS: std::ops::RangeInclusive<u32> = 1..=9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    Rar,
}

impl ArchiveKind {
    /// Detect the archive type from its leading bytes
    pub fn sniff(header: &[u8]) -> Option<Self> {
        if header.starts_with(b"PK\x03\x04") {
            Some(ArchiveKind::Zip)
        } else if header.starts_with(b"Rar!") {
            Some(ArchiveKind::Rar)
        } else {
            None
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ArchiveKind::Zip => "zip",
            ArchiveKind::Rar => "rar",
        }
    }
}

impl SubdivxClient {
    /// Download the archive for subtitle `id` into `dir`.
    ///
    /// Returns the saved path, `<id>.zip` or `<id>.rar`. Nothing is left in
    /// `dir` when every server fails.
    pub async fn download(&self, id: u64, dir: &Path) -> Result<PathBuf> {
        for server in SERVERS.rev() {
            let url = format!("{}/sub{}/{}", self.base_url, server, id);
            debug!("Trying download from: {}", url);

            match self.try_download(&url, id, dir).await {
                Ok(Some(path)) => {
                    info!("Downloaded {} to {}", url, path.display());
                    return Ok(path);
                }
                Ok(None) => debug!("No archive at {}", url),
                Err(e) => warn!("Download from {} failed: {}", url, e),
            }

            if server > *SERVERS.start() {
                tokio::time::sleep(self.retry.download_pause).await;
            }
        }

        Err(SubdxError::NoArchive(id))
    }

    async fn try_download(&self, url: &str, id: u64, dir: &Path) -> Result<Option<PathBuf>> {
        let response = self.client.get(url).send().await?.error_for_status()?;

        // deleted on drop unless persisted
        let tmp = NamedTempFile::new()?;
        let mut header = Vec::with_capacity(8);
        write_stream(response, tokio::fs::File::from_std(tmp.reopen()?), &mut header).await?;

        let Some(kind) = ArchiveKind::sniff(&header) else {
            return Ok(None);
        };
        let path = dir.join(format!("{}.{}", id, kind.extension()));
        save(tmp, &path).await?;
        Ok(Some(path))
    }
}

/// Stream the body into `file`, keeping the first bytes in `header`
async fn write_stream(response: reqwest::Response, mut file: tokio::fs::File, header: &mut Vec<u8>) -> Result<()> {
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if header.len() < 8 {
            let take = (8 - header.len()).min(chunk.len());
            header.extend_from_slice(&chunk[..take]);
        }
        file.write_all(&chunk).await?;
    }

    file.sync_all().await?;
    Ok(())
}

/// Move a finished download to `path`, copying when the temp dir is on
/// another filesystem
async fn save(tmp: NamedTempFile, path: &Path) -> Result<()> {
    if let Err(e) = tmp.persist(path) {
        debug!("Rename to {} failed ({}), copying", path.display(), e.error);
        tokio::fs::copy(e.file.path(), path).await?;
    }
    Ok(())
}
