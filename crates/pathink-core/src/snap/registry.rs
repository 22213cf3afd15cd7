//! Registration table of snap sources.

use super::source::SnapSource;
use super::types::SnapContext;

/// Predicate deciding whether a provider takes part in a query.
pub type ActivationFn = Box<dyn Fn(&SnapContext<'_>) -> bool>;

/// A plugin-contributed source with optional activation rule and priority.
pub struct SnapProvider {
    pub source: Box<dyn SnapSource>,
    pub is_active: Option<ActivationFn>,
    /// Priority given to candidates that don't set their own.
    pub priority: Option<i32>,
}

impl SnapProvider {
    pub fn new(source: impl SnapSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            is_active: None,
            priority: None,
        }
    }

    pub fn active_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&SnapContext<'_>) -> bool + 'static,
    {
        self.is_active = Some(Box::new(predicate));
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }
}

struct SourceEntry {
    source: Box<dyn SnapSource>,
    is_active: Option<ActivationFn>,
    priority: Option<i32>,
    enabled: bool,
}

impl SourceEntry {
    fn participates(&self, ctx: &SnapContext<'_>) -> bool {
        self.enabled
            && self.source.is_enabled()
            && self.is_active.as_ref().is_none_or(|active| active(ctx))
    }
}

/// Snap sources keyed by id, in registration order.
///
/// Registering an id that already exists replaces the old source in place.
#[derive(Default)]
pub struct SnapSourceRegistry {
    entries: Vec<SourceEntry>,
}

impl SnapSourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plain source. Returns the source it replaced, if any.
    pub fn register(&mut self, source: Box<dyn SnapSource>) -> Option<Box<dyn SnapSource>> {
        self.insert(SourceEntry {
            source,
            is_active: None,
            priority: None,
            enabled: true,
        })
    }

    /// Register a provider with its activation predicate and priority.
    pub fn register_provider(&mut self, provider: SnapProvider) -> Option<Box<dyn SnapSource>> {
        self.insert(SourceEntry {
            source: provider.source,
            is_active: provider.is_active,
            priority: provider.priority,
            enabled: true,
        })
    }

    fn insert(&mut self, entry: SourceEntry) -> Option<Box<dyn SnapSource>> {
        let id = entry.source.id().to_string();
        match self.entries.iter_mut().find(|e| e.source.id() == id) {
            Some(existing) => {
                log::debug!("Replacing snap source '{}'", id);
                let old = std::mem::replace(existing, entry);
                Some(old.source)
            }
            None => {
                log::debug!("Registered snap source '{}'", id);
                self.entries.push(entry);
                None
            }
        }
    }

    /// Remove a source. Returns false if no source had that id.
    pub fn unregister(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.source.id() != id);
        let removed = self.entries.len() != before;
        if removed {
            log::debug!("Unregistered snap source '{}'", id);
        }
        removed
    }

    /// Toggle a registered source. Returns false if the id is unknown.
    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> bool {
        match self.entries.iter_mut().find(|e| e.source.id() == id) {
            Some(entry) => {
                entry.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.source.id() == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.source.id())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Sources taking part in a query, with their provider priority.
    pub(crate) fn participating<'r>(
        &'r self,
        ctx: &'r SnapContext<'_>,
    ) -> impl Iterator<Item = (&'r dyn SnapSource, Option<i32>)> + 'r {
        self.entries
            .iter()
            .filter(move |e| e.participates(ctx))
            .map(|e| (e.source.as_ref(), e.priority))
    }
}

impl std::fmt::Debug for SnapSourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}
