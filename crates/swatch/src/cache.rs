/// Last generated artifact, keyed by the content hash of the custom
/// stylesheets it was generated from.
///
/// Owned by the caller and lent to each generation. Sharing one across tasks
/// needs external locking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemeCache {
    hash: Option<String>,
    artifact: String,
}

impl ThemeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached artifact if it was produced from sources hashing to `hash`.
    pub fn lookup(&self, hash: &str) -> Option<&str> {
        match &self.hash {
            Some(cached) if cached == hash => Some(&self.artifact),
            _ => None,
        }
    }

    pub fn store(&mut self, hash: String, artifact: String) {
        self.hash = Some(hash);
        self.artifact = artifact;
    }

    pub fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    /// The last artifact, or `""` before the first successful run.
    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    pub fn clear(&mut self) {
        self.hash = None;
        self.artifact.clear();
    }
}
