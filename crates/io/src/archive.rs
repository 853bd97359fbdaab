// Archive listing - zip entry names only, contents are never extracted

use std::io::Cursor;
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::error::IngestError;

/// Holds the entry listing of the most recently loaded archive.
///
/// `load` takes `&mut self`, so two loads on the same ingestor cannot overlap.
#[derive(Debug, Clone)]
pub struct ArchiveIngestor {
    entries: Vec<String>,
    image_extensions: Vec<String>,
}

impl Default for ArchiveIngestor {
    fn default() -> Self {
        Self::with_image_extensions(
            presetlab_config::IngestSettings::default().image_extensions,
        )
    }
}

impl ArchiveIngestor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image_extensions(extensions: Vec<String>) -> Self {
        Self {
            entries: Vec::new(),
            image_extensions: extensions.into_iter().map(|e| e.to_ascii_lowercase()).collect(),
        }
    }

    /// Entry paths from the last successful load, in archive order.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Entries whose extension is a configured image type.
    pub fn images(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|name| !name.ends_with('/'))
            .filter(|name| {
                Path::new(name.as_str())
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| {
                        let ext = ext.to_ascii_lowercase();
                        self.image_extensions.iter().any(|e| *e == ext)
                    })
            })
            .map(String::as_str)
            .collect()
    }

    /// Decode `blob` on a blocking worker and replace the listing.
    ///
    /// On failure the error goes to `on_error` exactly once and the previous
    /// listing is left as it was. Returns whether the listing was replaced.
    pub async fn load(&mut self, blob: Vec<u8>, mut on_error: impl FnMut(IngestError)) -> bool {
        let size = blob.len();
        match smol::unblock(move || list_entries(&blob)).await {
            Ok(entries) => {
                log::info!("archive listed: {} entr(ies) from {} bytes", entries.len(), size);
                self.entries = entries;
                true
            }
            Err(e) => {
                log::warn!("{e}");
                on_error(e);
                false
            }
        }
    }

    /// Read a file, then [`load`](Self::load) it.
    pub async fn load_path(&mut self, path: impl Into<PathBuf>, mut on_error: impl FnMut(IngestError)) -> bool {
        let path = path.into();
        let read = smol::unblock(move || {
            std::fs::read(&path).map_err(|source| IngestError::Io { path, source })
        })
        .await;
        match read {
            Ok(blob) => self.load(blob, on_error).await,
            Err(e) => {
                log::warn!("{e}");
                on_error(e);
                false
            }
        }
    }
}

/// Entry names of a zip byte stream, in central-directory order.
///
/// Any decode failure abandons the whole listing.
pub fn list_entries(blob: &[u8]) -> Result<Vec<String>, IngestError> {
    let mut archive = ZipArchive::new(Cursor::new(blob))?;
    let mut names = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let entry = archive.by_index_raw(i)?;
        names.push(entry.name().to_string());
    }
    Ok(names)
}
