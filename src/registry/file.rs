//! Directory-backed artifact store.
//!
//! ```text
//! <root>/<family>_<YYYYMMDDTHHMMSSZ>_<seq>.bin             from scratch
//! <root>/retrained/<family>_<YYYYMMDDTHHMMSSZ>_<seq>.bin   retrained
//! ```

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::{OdsError, Result};
use crate::ml::pipeline::Pipeline;
use crate::registry::format;
use crate::registry::{ARTIFACT_EXTENSION, ArtifactId, ArtifactRegistry, Metadata, ModelArtifact, Namespace};

/// Default artifact name prefix.
pub const DEFAULT_FAMILY: &str = "model_nb";

/// Timestamp layout inside artifact names.
const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Sequence numbers tried per second before giving up.
const MAX_SEQUENCE: u32 = 10_000;

/// Artifacts as files under a root directory.
#[derive(Debug, Clone)]
pub struct FileModelStore {
    root: PathBuf,
    family: String,
}

impl FileModelStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        FileModelStore {
            root: root.into(),
            family: DEFAULT_FAMILY.to_string(),
        }
    }

    /// Set the name prefix of new artifacts.
    pub fn with_family<S: Into<String>>(mut self, family: S) -> Self {
        self.family = family.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    fn namespace_dir(&self, namespace: Namespace) -> PathBuf {
        match namespace.dir_name() {
            "" => self.root.clone(),
            dir => self.root.join(dir),
        }
    }

    /// Full path of an artifact file.
    pub fn path_of(&self, id: &ArtifactId) -> PathBuf {
        self.root.join(id.relative_path())
    }

    /// Reserve a fresh identifier by creating its file exclusively.
    fn create_unique(&self, namespace: Namespace) -> Result<(ArtifactId, fs::File)> {
        let dir = self.namespace_dir(namespace);
        fs::create_dir_all(&dir)?;

        let timestamp = Utc::now().format(TIMESTAMP_FORMAT).to_string();
        for seq in 0..MAX_SEQUENCE {
            let id = ArtifactId::new(namespace, format!("{}_{timestamp}_{seq:04}", self.family))?;
            match OpenOptions::new().write(true).create_new(true).open(self.path_of(&id)) {
                Ok(file) => return Ok((id, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(OdsError::invalid_operation(format!(
            "no free artifact name for {} at {timestamp}",
            self.family
        )))
    }
}

impl ArtifactRegistry for FileModelStore {
    fn save(&self, namespace: Namespace, pipeline: &Pipeline, metadata: &Metadata) -> Result<ArtifactId> {
        let bytes = format::encode(pipeline, metadata)?;
        let (id, mut file) = self.create_unique(namespace)?;
        let path = self.path_of(&id);

        let written = file.write_all(&bytes).and_then(|_| file.sync_all());
        if let Err(e) = written {
            drop(file);
            // Leave no half-written artifact behind.
            let _ = fs::remove_file(&path);
            return Err(e.into());
        }

        tracing::info!(
            id = %id,
            path = %path.display(),
            bytes = bytes.len(),
            "saved artifact"
        );
        Ok(id)
    }

    fn list(&self, namespace: Namespace) -> Result<Vec<ArtifactId>> {
        let read_dir = match fs::read_dir(self.namespace_dir(namespace)) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        for entry in read_dir {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(ARTIFACT_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            match ArtifactId::new(namespace, stem) {
                Ok(id) => ids.push(id),
                Err(_) => tracing::debug!(path = %path.display(), "skipping unrecognized file"),
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn load(&self, id: &ArtifactId) -> Result<ModelArtifact> {
        let path = self.path_of(id);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(OdsError::artifact_not_found(id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let (pipeline, metadata) = format::decode(&bytes, &path.display().to_string())?;
        tracing::debug!(id = %id, bytes = bytes.len(), legacy = metadata.is_legacy(), "loaded artifact");
        Ok(ModelArtifact {
            id: id.clone(),
            pipeline,
            metadata,
        })
    }
}
