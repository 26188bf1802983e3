use crate::models::DirectoryEntry;

/// A listing surface that accepts a batch of entries plus a content hint
/// (`"movies"`, `"episodes"`, ...).
pub trait Directory {
    fn add_items(&mut self, entries: Vec<DirectoryEntry>, content: Option<&str>);
}

/// Collects entries in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryDirectory {
    pub entries: Vec<DirectoryEntry>,
    pub content: Option<String>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Directory for MemoryDirectory {
    fn add_items(&mut self, entries: Vec<DirectoryEntry>, content: Option<&str>) {
        self.entries.extend(entries);
        if let Some(content) = content {
            self.content = Some(content.to_string());
        }
    }
}
