//! Dataset files kept in a data directory.

use std::fs::{self, OpenOptions};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dataset::reader::{SUPPORTED_EXTENSIONS, is_supported};
use crate::error::{OdsError, Result};

/// One dataset file in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetEntry {
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Lists and imports dataset files under a root directory.
#[derive(Debug, Clone)]
pub struct DatasetCatalog {
    root: PathBuf,
}

impl DatasetCatalog {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        DatasetCatalog { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Supported dataset files, sorted by name. A missing directory lists
    /// as empty.
    pub fn list(&self) -> Result<Vec<DatasetEntry>> {
        let read_dir = match fs::read_dir(&self.root) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry?;
            let metadata = entry.metadata()?;
            let path = entry.path();
            if !metadata.is_file() || !is_supported(&path) {
                continue;
            }
            entries.push(DatasetEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                path,
                size_bytes: metadata.len(),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    /// Copy `source` into the catalog under its own file name.
    ///
    /// Fails with `UnsupportedFormat` for an unknown extension and with
    /// `InvalidOperation` if a file of that name already exists.
    pub fn import(&self, source: &Path) -> Result<DatasetEntry> {
        if !is_supported(source) {
            return Err(OdsError::unsupported_format(
                source.display().to_string(),
                SUPPORTED_EXTENSIONS,
            ));
        }
        let name = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| OdsError::invalid_argument(format!("{} has no file name", source.display())))?;

        let mut input = fs::File::open(source)?;
        self.write_new(name, &mut input)
    }

    /// Copy `input` into a new catalog file called `name`, removing the file
    /// again if the copy fails.
    fn write_new<R: Read>(&self, name: String, input: &mut R) -> Result<DatasetEntry> {
        fs::create_dir_all(&self.root)?;
        let path = self.root.join(&name);
        let mut output = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(OdsError::invalid_operation(format!(
                    "a dataset named '{name}' already exists"
                )));
            }
            Err(e) => return Err(e.into()),
        };
        let size_bytes = match io::copy(input, &mut output) {
            Ok(size_bytes) => size_bytes,
            Err(e) => {
                drop(output);
                let _ = fs::remove_file(&path);
                return Err(e.into());
            }
        };

        tracing::info!(name = %name, path = %path.display(), size_bytes, "imported dataset");
        Ok(DatasetEntry {
            name,
            path,
            size_bytes,
        })
    }

    /// Path of a dataset in the catalog by file name.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        let path = self.root.join(name);
        if path.is_file() {
            Ok(path)
        } else {
            Err(OdsError::dataset(format!(
                "dataset '{name}' not found in {}",
                self.root.display()
            )))
        }
    }
}
