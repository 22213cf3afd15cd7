//! Single cancellation signal shared by every session listener.

use crate::input::CancelReason;
use std::cell::Cell;
use std::rc::Rc;

/// Cancellation signal for the live drag session.
///
/// Host listeners (blur, visibility, unload, ...) hold clones and call
/// [`CancelToken::cancel`]; the coordinator observes the token and runs its one
/// cleanup routine. The first reason recorded wins until the token is reset.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    reason: Rc<Cell<Option<CancelReason>>>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Later calls keep the first reason.
    pub fn cancel(&self, reason: CancelReason) {
        if self.reason.get().is_none() {
            self.reason.set(Some(reason));
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.reason.get().is_some()
    }

    pub fn reason(&self) -> Option<CancelReason> {
        self.reason.get()
    }

    pub(crate) fn reset(&self) {
        self.reason.set(None);
    }
}
