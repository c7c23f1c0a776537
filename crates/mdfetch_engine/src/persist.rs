use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use mdfetch_logging::mdfetch_info;
use tempfile::NamedTempFile;

use crate::filename::deterministic_filename;
use crate::frontmatter::build_markdown_document;
use crate::pipeline::Rendered;

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("{path:?} is not a usable output directory: {reason}")]
    OutputDir { path: PathBuf, reason: String },
    #[error("failed to write {path:?}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Creates `dir` (and parents) unless it already exists as a directory.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    let unusable = |reason: String| PersistError::OutputDir {
        path: dir.to_path_buf(),
        reason,
    };
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(unusable("not a directory".to_string())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(|err| unusable(err.to_string()))
        }
        Err(err) => Err(unusable(err.to_string())),
    }
}

/// Writes documents into one directory. Content is staged in a temp file in
/// the same directory and renamed over the target, so readers never see a
/// partial document.
#[derive(Debug, Clone)]
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, content: &str) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;

        let path = self.dir.join(filename);
        let failed = |source: io::Error| PersistError::Write {
            path: path.clone(),
            source,
        };
        let mut staged = NamedTempFile::new_in(&self.dir).map_err(failed)?;
        staged.write_all(content.as_bytes()).map_err(failed)?;
        staged.as_file().sync_all().map_err(failed)?;
        staged.persist(&path).map_err(|err| failed(err.error))?;
        Ok(path)
    }

    /// Saves rendered content under its deterministic name with front matter.
    pub fn save_rendered(
        &self,
        rendered: &Rendered,
        fetched_utc: &str,
    ) -> Result<PathBuf, PersistError> {
        let document = build_markdown_document(rendered, fetched_utc);
        let path = self.write(&deterministic_filename(&rendered.url), &document)?;
        mdfetch_info!("saved {} to {:?}", rendered.target, path);
        Ok(path)
    }
}
