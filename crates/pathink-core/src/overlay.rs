//! Transient overlay state shared with the rendering layer.
//!
//! Values here change at pointer-move frequency and are never part of the
//! document or its undo history. Listeners are notified synchronously.

use crate::drag::DragContext;
use crate::snap::SnapResult;
use kurbo::Point;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Ephemeral values drawn on top of the canvas.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayState {
    /// Result of the latest snap query, if it found a target.
    pub snap_result: Option<SnapResult>,
    /// Pointer position in canvas coordinates while dragging.
    pub cursor: Option<Point>,
    /// Whether the snap crosshair should be drawn.
    pub crosshair_visible: bool,
    /// The live drag session, if any.
    pub drag: Option<DragContext>,
}

impl OverlayState {
    /// Reset every field.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

type Listener<T> = Rc<RefCell<dyn FnMut(&T)>>;

struct StoreInner<T> {
    value: T,
    listeners: Vec<(u64, Listener<T>)>,
    next_id: u64,
    version: u64,
}

/// A single observable value with synchronous change notification.
///
/// Cloning the store yields another handle to the same value.
pub struct TransientStore<T> {
    inner: Rc<RefCell<StoreInner<T>>>,
}

impl<T> Clone for TransientStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Default + Clone + 'static> Default for TransientStore<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + 'static> TransientStore<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(StoreInner {
                value,
                listeners: Vec::new(),
                next_id: 0,
                version: 0,
            })),
        }
    }

    /// A copy of the current value.
    pub fn snapshot(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Read the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Number of changes published so far.
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Replace the value and notify listeners.
    pub fn set(&self, value: T) {
        self.inner.borrow_mut().value = value;
        self.notify();
    }

    /// Modify the value in place and notify listeners.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.inner.borrow_mut().value);
        self.notify();
    }

    /// Register a listener. It stays registered until the returned handle is
    /// dropped or [`Subscription::unsubscribe`] is called.
    pub fn subscribe(&self, listener: impl FnMut(&T) + 'static) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        let listener: Listener<T> = Rc::new(RefCell::new(listener));
        inner.listeners.push((id, listener));

        let weak: Weak<RefCell<StoreInner<T>>> = Rc::downgrade(&self.inner);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.borrow_mut().listeners.retain(|(lid, _)| *lid != id);
                }
            })),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    fn notify(&self) {
        // Release the borrow before calling out so listeners may read or write the store.
        let (value, listeners) = {
            let mut inner = self.inner.borrow_mut();
            inner.version += 1;
            let listeners: Vec<Listener<T>> =
                inner.listeners.iter().map(|(_, l)| Rc::clone(l)).collect();
            (inner.value.clone(), listeners)
        };
        for listener in listeners {
            // A listener that re-enters the store is not called recursively.
            if let Ok(mut f) = listener.try_borrow_mut() {
                f(&value);
            }
        }
    }
}

impl<T: Clone + PartialEq + 'static> TransientStore<T> {
    /// Replace the value, notifying only if it actually changed.
    pub fn set_if_changed(&self, value: T) -> bool {
        if self.inner.borrow().value == value {
            return false;
        }
        self.set(value);
        true
    }
}

impl<T> std::fmt::Debug for TransientStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("TransientStore")
            .field("version", &inner.version)
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}

/// Handle returned by [`TransientStore::subscribe`].
#[must_use = "dropping a Subscription unsubscribes the listener"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// The overlay store used by the editor context.
pub type OverlayStore = TransientStore<OverlayState>;
