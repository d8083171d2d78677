//! The document queue.
//!
//! Insertion order is the only order. Documents are handed out read-only;
//! status and progress change only through the orchestrator.

use smartparse_core::{Document, DocumentId, RawFileDescriptor};
use tracing::debug;

#[derive(Debug, Default)]
pub struct FileRegistry {
    documents: Vec<Document>,
}

impl FileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue new documents behind the existing ones and return them.
    pub fn add<I>(&mut self, descriptors: I) -> Vec<Document>
    where
        I: IntoIterator<Item = RawFileDescriptor>,
    {
        let added: Vec<Document> = descriptors
            .into_iter()
            .map(Document::from_descriptor)
            .collect();
        for doc in &added {
            debug!(document = %doc.name, id = %doc.id, kind = %doc.kind, "Document queued");
        }
        self.documents.extend(added.iter().cloned());
        added
    }

    /// Remove a document. Unknown ids are ignored.
    pub fn remove(&mut self, id: DocumentId) -> Option<Document> {
        let pos = self.documents.iter().position(|d| d.id == id)?;
        Some(self.documents.remove(pos))
    }

    pub fn clear(&mut self) {
        self.documents.clear();
    }

    pub fn count(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn list(&self) -> &[Document] {
        &self.documents
    }

    pub fn get(&self, id: DocumentId) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    pub(crate) fn get_mut_at(&mut self, index: usize) -> Option<&mut Document> {
        self.documents.get_mut(index)
    }
}
