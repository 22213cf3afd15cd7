//! Pointer and window events routed into drag sessions.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Pointer button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerButton {
    Primary,
    Secondary,
    Auxiliary,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };
}

/// Why a drag session ended without a pointer release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CancelReason {
    PointerCancel,
    ContextMenu,
    WindowBlur,
    Hidden,
    Unload,
    /// A new drag started while this one was still live.
    Superseded,
    /// The embedder ended the session directly.
    Requested,
}

/// Events a live session listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionEventKind {
    PointerMove,
    PointerUp,
    PointerCancel,
    ContextMenu,
    WindowBlur,
    VisibilityChange,
    BeforeUnload,
}

/// Every listener a session installs, attached together when the drag starts.
pub const SESSION_EVENTS: [SessionEventKind; 7] = [
    SessionEventKind::PointerMove,
    SessionEventKind::PointerUp,
    SessionEventKind::PointerCancel,
    SessionEventKind::ContextMenu,
    SessionEventKind::WindowBlur,
    SessionEventKind::VisibilityChange,
    SessionEventKind::BeforeUnload,
];

/// An event delivered by a session listener. Positions are screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    PointerMove { client: Point, modifiers: Modifiers },
    PointerUp { client: Point, modifiers: Modifiers },
    PointerCancel,
    ContextMenu,
    WindowBlur,
    VisibilityChange { hidden: bool },
    BeforeUnload,
}

impl SessionEvent {
    pub fn kind(&self) -> SessionEventKind {
        match self {
            SessionEvent::PointerMove { .. } => SessionEventKind::PointerMove,
            SessionEvent::PointerUp { .. } => SessionEventKind::PointerUp,
            SessionEvent::PointerCancel => SessionEventKind::PointerCancel,
            SessionEvent::ContextMenu => SessionEventKind::ContextMenu,
            SessionEvent::WindowBlur => SessionEventKind::WindowBlur,
            SessionEvent::VisibilityChange { .. } => SessionEventKind::VisibilityChange,
            SessionEvent::BeforeUnload => SessionEventKind::BeforeUnload,
        }
    }

    /// The cancellation this event triggers, if any.
    ///
    /// Becoming visible again does not cancel anything.
    pub fn cancel_reason(&self) -> Option<CancelReason> {
        match *self {
            SessionEvent::PointerCancel => Some(CancelReason::PointerCancel),
            SessionEvent::ContextMenu => Some(CancelReason::ContextMenu),
            SessionEvent::WindowBlur => Some(CancelReason::WindowBlur),
            SessionEvent::VisibilityChange { hidden: true } => Some(CancelReason::Hidden),
            SessionEvent::BeforeUnload => Some(CancelReason::Unload),
            SessionEvent::VisibilityChange { hidden: false }
            | SessionEvent::PointerMove { .. }
            | SessionEvent::PointerUp { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_reasons() {
        assert_eq!(SessionEvent::WindowBlur.cancel_reason(), Some(CancelReason::WindowBlur));
        assert_eq!(
            SessionEvent::VisibilityChange { hidden: true }.cancel_reason(),
            Some(CancelReason::Hidden)
        );
        assert_eq!(SessionEvent::VisibilityChange { hidden: false }.cancel_reason(), None);
        assert_eq!(
            SessionEvent::PointerUp {
                client: Point::ZERO,
                modifiers: Modifiers::NONE
            }
            .cancel_reason(),
            None
        );
    }

    #[test]
    fn test_session_events_cover_every_kind() {
        let events = [
            SessionEvent::PointerMove { client: Point::ZERO, modifiers: Modifiers::NONE },
            SessionEvent::PointerUp { client: Point::ZERO, modifiers: Modifiers::NONE },
            SessionEvent::PointerCancel,
            SessionEvent::ContextMenu,
            SessionEvent::WindowBlur,
            SessionEvent::VisibilityChange { hidden: true },
            SessionEvent::BeforeUnload,
        ];
        for event in events {
            assert!(SESSION_EVENTS.contains(&event.kind()));
        }
    }
}
