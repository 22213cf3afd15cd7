//! Drag lifecycle: start, snapped moves, commit, and cancellation.

use super::cancel::CancelToken;
use super::session::{DragContext, DragRequest, DragSession, FrameShadow};
use super::throttle::{FrameThrottle, Instant};
use crate::config::DragConfig;
use crate::document::DocumentStore;
use crate::error::{DragError, DragResult};
use crate::input::{
    CancelReason, Modifiers, PointerButton, SESSION_EVENTS, SessionEvent, SessionEventKind,
};
use crate::overlay::{OverlayState, OverlayStore};
use crate::snap::SnapManager;
use crate::viewport::Viewport;
use kurbo::{Point, Rect, Size};
use uuid::Uuid;

/// How a drag session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    Committed,
    Cancelled(CancelReason),
}

/// The host window or canvas surface a drag runs against.
pub trait DragSurface {
    /// On-screen rectangle of the canvas, read on every event.
    fn reference_rect(&self) -> Rect;

    /// Install listeners for `events`. Listeners for cancellation events
    /// should call [`CancelToken::cancel`] on `token` or forward the event.
    fn attach_listeners(&mut self, session: Uuid, events: &[SessionEventKind], token: &CancelToken);

    /// Remove every listener installed for `session`.
    fn detach_listeners(&mut self, session: Uuid);

    /// Called once per session after its listeners are removed.
    fn dragging_stopped(&mut self, _context: &DragContext, _outcome: DragOutcome) {}
}

/// Borrowed collaborators for one coordinator call.
pub struct DragEnv<'a> {
    pub document: &'a mut dyn DocumentStore,
    pub surface: &'a mut dyn DragSurface,
    pub snap: &'a SnapManager,
}

impl<'a> DragEnv<'a> {
    pub fn new(
        document: &'a mut dyn DocumentStore,
        surface: &'a mut dyn DragSurface,
        snap: &'a SnapManager,
    ) -> Self {
        Self {
            document,
            surface,
            snap,
        }
    }

    pub fn document_ref(&self) -> &dyn DocumentStore {
        &*self.document
    }
}

/// Runs at most one drag session at a time.
#[derive(Debug)]
pub struct DragCoordinator {
    session: Option<DragSession>,
    throttle: FrameThrottle,
    token: CancelToken,
    frame: FrameShadow,
    overlay: OverlayStore,
    config: DragConfig,
}

impl DragCoordinator {
    pub fn new(config: DragConfig, overlay: OverlayStore) -> Self {
        Self {
            session: None,
            throttle: FrameThrottle::new(config.frame_interval()),
            token: CancelToken::new(),
            frame: FrameShadow::default(),
            overlay,
            config,
        }
    }

    /// Refresh the viewport and canvas size used for event conversion.
    pub fn sync_frame(&mut self, viewport: Viewport, canvas_size: Size) {
        self.frame = FrameShadow {
            viewport,
            canvas_size,
        };
    }

    pub fn frame(&self) -> &FrameShadow {
        &self.frame
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn context(&self) -> Option<&DragContext> {
        self.session.as_ref().map(DragSession::context)
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// The token host listeners forward cancellations into.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.token
    }

    pub fn overlay(&self) -> &OverlayStore {
        &self.overlay
    }

    pub fn config(&self) -> &DragConfig {
        &self.config
    }

    /// Start a drag for `plugin_id`. A live session is cancelled first.
    pub fn begin(
        &mut self,
        plugin_id: &str,
        request: DragRequest,
        env: &mut DragEnv<'_>,
    ) -> DragResult<Uuid> {
        if request.button != PointerButton::Primary {
            return Err(DragError::UnsupportedButton(request.button));
        }
        if self.session.is_some() {
            self.finish(DragOutcome::Cancelled(CancelReason::Superseded), env);
        }

        let rect = env.surface.reference_rect();
        let start = self.frame.viewport.screen_to_canvas(request.client, rect);
        let session = DragSession::capture(plugin_id, &request, start, &*env.document)?;
        let id = session.id();

        self.token.reset();
        self.throttle.reset();
        env.surface.attach_listeners(id, &SESSION_EVENTS, &self.token);

        let context = session.context().clone();
        log::debug!(
            "Drag {} started by {}: {:?} on {:?}",
            id, plugin_id, context.kind, context.element_ids
        );
        self.overlay.update(|state| {
            state.drag = Some(context);
            state.cursor = Some(start);
            state.snap_result = None;
            state.crosshair_visible = false;
        });
        self.session = Some(session);
        Ok(id)
    }

    /// Route one listener event. Returns the outcome if the session ended.
    pub fn dispatch(
        &mut self,
        event: SessionEvent,
        now: Instant,
        env: &mut DragEnv<'_>,
    ) -> Option<DragOutcome> {
        self.session.as_ref()?;

        if let Some(reason) = self.token.reason() {
            return self.finish(DragOutcome::Cancelled(reason), env);
        }
        if let Some(reason) = event.cancel_reason() {
            return self.cancel(reason, env);
        }

        match event {
            SessionEvent::PointerMove { client, modifiers } => {
                self.process_move(client, modifiers, now, env);
                None
            }
            SessionEvent::PointerUp { client, modifiers } => {
                self.process_move(client, modifiers, now, env);
                self.finish(DragOutcome::Committed, env)
            }
            _ => None,
        }
    }

    /// Apply a pending throttled position once the interval has elapsed.
    pub fn tick(&mut self, now: Instant, env: &mut DragEnv<'_>) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if session.pending.is_none() || !self.throttle.ready(now) {
            return false;
        }
        session.flush(&mut *env.document);
        self.throttle.mark(now);
        true
    }

    /// End the session if a listener cancelled the token.
    pub fn poll_cancel(&mut self, env: &mut DragEnv<'_>) -> Option<DragOutcome> {
        let reason = self.token.reason()?;
        self.finish(DragOutcome::Cancelled(reason), env)
    }

    /// Cancel the live session. Safe to call repeatedly or with no session.
    pub fn cancel(&mut self, reason: CancelReason, env: &mut DragEnv<'_>) -> Option<DragOutcome> {
        self.token.cancel(reason);
        let reason = self.token.reason().unwrap_or(reason);
        self.finish(DragOutcome::Cancelled(reason), env)
    }

    fn process_move(
        &mut self,
        client: Point,
        modifiers: Modifiers,
        now: Instant,
        env: &mut DragEnv<'_>,
    ) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let pointer = self
            .frame
            .viewport
            .screen_to_canvas(client, env.surface.reference_rect());
        let (position, snap) =
            session.resolve(pointer, modifiers, &self.frame, &*env.document, env.snap);
        log::trace!(
            "Drag {} move to ({:.2}, {:.2}), snapped: {}",
            session.id(),
            position.x,
            position.y,
            snap.is_some()
        );
        session.pending = Some(position);

        self.overlay.update(|state| {
            state.cursor = Some(pointer);
            state.crosshair_visible = snap.is_some();
            state.snap_result = snap;
        });

        if self.throttle.ready(now) {
            session.flush(&mut *env.document);
            self.throttle.mark(now);
        }
    }

    /// The one cleanup path for every exit. Resets coordinator state even when
    /// no session is live; returns the outcome only for the call that ended one.
    fn finish(&mut self, outcome: DragOutcome, env: &mut DragEnv<'_>) -> Option<DragOutcome> {
        let ended = self.session.take().map(|mut session| {
            match outcome {
                DragOutcome::Committed => {
                    session.flush(&mut *env.document);
                }
                DragOutcome::Cancelled(_) => {
                    session.pending = None;
                    if self.config.revert_on_cancel {
                        for (id, patch) in session.restore_patches() {
                            env.document.update_element(&id, patch);
                        }
                    }
                }
            }
            env.surface.detach_listeners(session.id());
            session.context.is_dragging = false;
            env.surface.dragging_stopped(session.context(), outcome);
            log::debug!("Drag {} ended: {:?}", session.id(), outcome);
            outcome
        });

        self.throttle.reset();
        self.token.reset();
        self.overlay.update(OverlayState::clear);
        ended
    }
}
