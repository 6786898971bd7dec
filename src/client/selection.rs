use bytes::Bytes;
use std::path::Path;

/// A file picked by the user and not yet sent to the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    pub name: String,
    pub size: u64,
    /// Declared MIME type, empty when unknown
    pub content_type: String,
    pub bytes: Bytes,
}

impl PendingUpload {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Reads a local file; the name is the file name of `path`.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("{} has no file name", path.display()),
                )
            })?;
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::new(name, "", bytes))
    }

    /// Two selections are the same file when name and size match.
    pub fn same_file(&self, other: &PendingUpload) -> bool {
        self.name == other.name && self.size == other.size
    }
}

/// Files awaiting upload, in selection order and free of `(name, size)` duplicates.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    files: Vec<PendingUpload>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `file` unless an equal `(name, size)` entry exists. Returns whether it was added.
    pub fn add(&mut self, file: PendingUpload) -> bool {
        if self.files.iter().any(|f| f.same_file(&file)) {
            return false;
        }
        self.files.push(file);
        true
    }

    /// Adds each file in order, returning how many were new.
    pub fn add_all(&mut self, files: impl IntoIterator<Item = PendingUpload>) -> usize {
        files.into_iter().filter(|f| self.add(f.clone())).count()
    }

    pub fn remove(&mut self, index: usize) -> Option<PendingUpload> {
        (index < self.files.len()).then(|| self.files.remove(index))
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn files(&self) -> &[PendingUpload] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }
}
