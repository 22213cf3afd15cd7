//! Document boundary used by the drag coordinator and snap sources.
//!
//! The real document/undo store lives outside this crate. It only has to
//! expose element geometry, the current selection, and a partial update call.

use crate::path::{ElementId, GeometryPatch, PathElement};
use uuid::Uuid;

/// Read and write access to the element store.
pub trait DocumentStore {
    /// All elements, in paint order.
    fn elements(&self) -> &[PathElement];

    /// Look up an element by id.
    fn element(&self, id: &str) -> Option<&PathElement> {
        self.elements().iter().find(|e| e.id == id)
    }

    /// Currently selected element ids.
    fn selection(&self) -> &[ElementId];

    /// Apply a partial geometry update. Unknown ids are ignored.
    fn update_element(&mut self, id: &str, patch: GeometryPatch);
}

/// In-memory document for tests and embedders without their own store.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    elements: Vec<PathElement>,
    selection: Vec<ElementId>,
    revision: u64,
}

impl MemoryDocument {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element and return its id. An empty id gets a generated one.
    pub fn insert(&mut self, mut element: PathElement) -> ElementId {
        if element.id.is_empty() {
            element.id = Uuid::new_v4().to_string();
        }
        let id = element.id.clone();
        self.elements.retain(|e| e.id != id);
        self.elements.push(element);
        self.revision += 1;
        id
    }

    pub fn remove(&mut self, id: &str) -> Option<PathElement> {
        let index = self.elements.iter().position(|e| e.id == id)?;
        self.selection.retain(|s| s != id);
        self.revision += 1;
        Some(self.elements.remove(index))
    }

    pub fn set_selection(&mut self, ids: Vec<ElementId>) {
        self.selection = ids;
    }

    /// Number of mutations applied so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl DocumentStore for MemoryDocument {
    fn elements(&self) -> &[PathElement] {
        &self.elements
    }

    fn selection(&self) -> &[ElementId] {
        &self.selection
    }

    fn update_element(&mut self, id: &str, patch: GeometryPatch) {
        match self.elements.iter_mut().find(|e| e.id == id) {
            Some(element) => {
                patch.apply_to(element);
                self.revision += 1;
            }
            None => log::debug!("Ignoring update for missing element {}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Subpath;
    use kurbo::Point;

    #[test]
    fn test_insert_generates_id() {
        let mut doc = MemoryDocument::new();
        let id = doc.insert(PathElement::new("", vec![]));
        assert!(!id.is_empty());
        assert!(doc.element(&id).is_some());
    }

    #[test]
    fn test_insert_replaces_same_id() {
        let mut doc = MemoryDocument::new();
        doc.insert(PathElement::new("a", vec![]));
        doc.insert(PathElement::new("a", vec![Subpath::default()]));
        assert_eq!(doc.elements().len(), 1);
        assert_eq!(doc.element("a").unwrap().subpaths.len(), 1);
    }

    #[test]
    fn test_update_element() {
        let mut doc = MemoryDocument::new();
        doc.insert(PathElement::new("a", vec![]));
        let before = doc.revision();
        let sub = Subpath::polyline(&[Point::ZERO, Point::new(5.0, 5.0)]);
        doc.update_element("a", GeometryPatch::Subpaths(vec![sub.clone()]));
        assert_eq!(doc.element("a").unwrap().subpaths, vec![sub]);
        assert_eq!(doc.revision(), before + 1);
    }

    #[test]
    fn test_update_missing_element_is_ignored() {
        let mut doc = MemoryDocument::new();
        doc.update_element("ghost", GeometryPatch::Subpaths(vec![]));
        assert_eq!(doc.revision(), 0);
    }

    #[test]
    fn test_remove_clears_selection() {
        let mut doc = MemoryDocument::new();
        doc.insert(PathElement::new("a", vec![]));
        doc.set_selection(vec!["a".to_string()]);
        assert!(doc.remove("a").is_some());
        assert!(doc.selection().is_empty());
        assert!(doc.remove("a").is_none());
    }
}
