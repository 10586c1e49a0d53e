//! Snippet storage and persistence.
//!
//! The `SnippetStore` keeps every snippet as one JSON file in a root
//! directory and mirrors them in memory. Writes go through a temp file and a
//! rename so a crash never leaves a half-written record.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::{Result, StorageError, StoreError};
use crate::snippet::{EmbeddingState, NewSnippet, Snippet, SnippetUpdate};

/// File-backed snippet store.
pub struct SnippetStore {
    /// Root directory for snippet files.
    root: PathBuf,

    /// In-memory copy of every snippet, keyed by id.
    cache: HashMap<String, Snippet>,
}

impl SnippetStore {
    /// Open a store at the given root directory.
    ///
    /// This will create the directory if it doesn't exist.
    pub async fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        fs::create_dir_all(&root)
            .await
            .map_err(|e| StorageError::CreateDirectory(format!("{}: {e}", root.display())))?;

        let mut store = Self {
            root,
            cache: HashMap::new(),
        };

        store.load_all().await?;

        Ok(store)
    }

    fn snippet_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }

    async fn load_all(&mut self) -> Result<()> {
        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| StorageError::ReadFile(format!("{}: {e}", self.root.display())))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::ReadFile(format!("{e}")))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                match Self::load_file(&path).await {
                    Ok(snippet) => {
                        debug!("Loaded snippet: {}", snippet.id);
                        self.cache.insert(snippet.id.clone(), snippet);
                    }
                    Err(e) => {
                        warn!("Failed to load snippet file {}: {e}", path.display());
                    }
                }
            }
        }

        info!("Loaded {} snippets from {}", self.cache.len(), self.root.display());
        Ok(())
    }

    async fn load_file(path: &Path) -> Result<Snippet> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| StorageError::ReadFile(format!("{}: {e}", path.display())))?;

        Ok(serde_json::from_str(&content)?)
    }

    async fn save_file(&self, snippet: &Snippet) -> Result<()> {
        let path = self.snippet_path(&snippet.id);
        let content = serde_json::to_string_pretty(snippet)?;

        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, &content)
            .await
            .map_err(|e| StorageError::WriteFile(format!("{}: {e}", temp_path.display())))?;

        fs::rename(&temp_path, &path)
            .await
            .map_err(|e| StorageError::WriteFile(format!("{}: {e}", path.display())))?;

        debug!("Saved snippet: {}", snippet.id);
        Ok(())
    }

    /// Every snippet, newest first.
    pub fn list_all(&self) -> Vec<Snippet> {
        let mut snippets: Vec<Snippet> = self.cache.values().cloned().collect();
        sort_newest_first(&mut snippets);
        snippets
    }

    /// Number of stored snippets.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether the store holds no snippets.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Get a snippet by id.
    pub fn get(&self, id: &str) -> Option<&Snippet> {
        self.cache.get(id)
    }

    /// Validate and persist a new snippet.
    pub async fn create(&mut self, input: NewSnippet) -> Result<Snippet> {
        let snippet = input.into_snippet()?;
        self.save_file(&snippet).await?;
        self.cache.insert(snippet.id.clone(), snippet.clone());
        info!("Created snippet {} ({})", snippet.id, snippet.title);
        Ok(snippet)
    }

    /// Apply a partial update. Content changes mark a present embedding stale.
    pub async fn update(&mut self, id: &str, update: SnippetUpdate) -> Result<Snippet> {
        let mut snippet = self
            .cache
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        update.apply(&mut snippet)?;
        self.save_file(&snippet).await?;
        self.cache.insert(snippet.id.clone(), snippet.clone());
        debug!(
            "Updated snippet {id} (embedding {})",
            snippet.embedding.label()
        );
        Ok(snippet)
    }

    /// Replace the embedding state of a snippet.
    pub async fn set_embedding(&mut self, id: &str, state: EmbeddingState) -> Result<Snippet> {
        let mut snippet = self
            .cache
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        snippet.embedding = state;
        self.save_file(&snippet).await?;
        self.cache.insert(snippet.id.clone(), snippet.clone());
        Ok(snippet)
    }

    /// Delete a snippet.
    pub async fn delete(&mut self, id: &str) -> Result<()> {
        if !self.cache.contains_key(id) {
            return Err(StoreError::NotFound(id.to_string()));
        }

        let path = self.snippet_path(id);
        fs::remove_file(&path)
            .await
            .map_err(|e| StorageError::DeleteFile(format!("{}: {e}", path.display())))?;

        self.cache.remove(id);
        info!("Deleted snippet: {id}");
        Ok(())
    }

    /// Case-sensitive substring search over title, description, tags and
    /// language, newest first.
    pub fn search(&self, query: &str) -> Vec<Snippet> {
        let mut matches: Vec<Snippet> = self
            .cache
            .values()
            .filter(|s| {
                s.title.contains(query)
                    || s.description.as_deref().is_some_and(|d| d.contains(query))
                    || s.tags.contains(query)
                    || s.language.contains(query)
            })
            .cloned()
            .collect();
        sort_newest_first(&mut matches);
        matches
    }
}

fn sort_newest_first(snippets: &mut [Snippet]) {
    snippets.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}
