//! Editor-wide state shared by tools and plugins.

use crate::config::EngineConfig;
use crate::document::DocumentStore;
use crate::drag::{DragCoordinator, DragEnv, DragOutcome, DragRequest, DragSurface, Instant};
use crate::error::DragResult;
use crate::input::{CancelReason, SessionEvent};
use crate::overlay::OverlayStore;
use crate::snap::{
    AnchorSource, BoundsSource, GridSource, IntersectionSource, MidpointSource, PathEdgeSource,
    SnapContext, SnapManager, SnapProvider, SnapResult,
};
use crate::viewport::Viewport;
use kurbo::{Point, Size};
use uuid::Uuid;

const GRID_SOURCE_ID: &str = "grid";

/// Owns the snap manager, overlay store, and drag coordinator for one editor.
#[derive(Debug)]
pub struct EditorContext {
    config: EngineConfig,
    snap: SnapManager,
    overlay: OverlayStore,
    drag: DragCoordinator,
    viewport: Viewport,
    canvas_size: Size,
    active_plugin: String,
}

impl Default for EditorContext {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl EditorContext {
    /// Create a context with no snap sources registered.
    pub fn new(config: EngineConfig) -> Self {
        let overlay = OverlayStore::default();
        Self {
            snap: SnapManager::new(&config.snap),
            drag: DragCoordinator::new(config.drag.clone(), overlay.clone()),
            overlay,
            config,
            viewport: Viewport::default(),
            canvas_size: Size::ZERO,
            active_plugin: String::new(),
        }
    }

    /// Create a context with the built-in geometry sources registered.
    ///
    /// The grid source is not registered by default; see [`Self::set_grid_snapping`].
    pub fn with_default_sources(config: EngineConfig) -> Self {
        let mut ctx = Self::new(config);
        let snap_config = ctx.config.snap.clone();
        ctx.snap.register_source(AnchorSource);
        ctx.snap.register_source(MidpointSource);
        ctx.snap.register_source(BoundsSource);
        ctx.snap.register_source(IntersectionSource {
            radius_px: snap_config.threshold_px,
            ..IntersectionSource::default()
        });
        ctx.snap.register_source(PathEdgeSource {
            samples: snap_config.bezier_samples,
        });
        ctx
    }

    /// Register or remove the grid source, spaced by `config.snap.grid_size`.
    pub fn set_grid_snapping(&mut self, enabled: bool) {
        if enabled {
            self.snap.register_source(GridSource {
                grid_size: self.config.snap.grid_size,
            });
        } else {
            self.snap.unregister_source(GRID_SOURCE_ID);
        }
    }

    pub fn grid_snapping(&self) -> bool {
        self.snap.registry().contains(GRID_SOURCE_ID)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn snap_manager(&self) -> &SnapManager {
        &self.snap
    }

    pub fn snap_manager_mut(&mut self) -> &mut SnapManager {
        &mut self.snap
    }

    pub fn overlay(&self) -> &OverlayStore {
        &self.overlay
    }

    pub fn drag(&self) -> &DragCoordinator {
        &self.drag
    }

    /// Add a plugin snap provider. An existing provider with the same id is replaced.
    pub fn register_snap_provider(&mut self, provider: SnapProvider) {
        self.snap.register_provider(provider);
    }

    pub fn unregister_snap_provider(&mut self, id: &str) -> bool {
        self.snap.unregister_source(id)
    }

    /// Make `plugin_id` the tool that owns pointer input.
    pub fn activate_plugin(&mut self, plugin_id: impl Into<String>) {
        self.active_plugin = plugin_id.into();
        log::debug!("Active plugin: {}", self.active_plugin);
    }

    pub fn active_plugin(&self) -> &str {
        &self.active_plugin
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.drag.sync_frame(self.viewport, self.canvas_size);
    }

    pub fn canvas_size(&self) -> Size {
        self.canvas_size
    }

    pub fn set_canvas_size(&mut self, canvas_size: Size) {
        self.canvas_size = canvas_size;
        self.drag.sync_frame(self.viewport, self.canvas_size);
    }

    /// Resolve `point` against the registered sources outside of a drag.
    pub fn snap(&self, point: Point, document: &dyn DocumentStore) -> Option<SnapResult> {
        let ctx = SnapContext::new(self.viewport, self.canvas_size, document.elements())
            .with_active_plugin(&self.active_plugin)
            .with_selection(document.selection());
        self.snap.snap(point, &ctx)
    }

    /// Snap a hover position and publish it to the overlay.
    ///
    /// Ignored while a drag is live; the drag owns the overlay then.
    pub fn hover(&self, point: Point, document: &dyn DocumentStore) -> Option<SnapResult> {
        if self.drag.is_dragging() {
            return None;
        }
        let result = self.snap(point, document);
        self.overlay.update(|state| {
            state.cursor = Some(point);
            state.crosshair_visible = result.is_some();
            state.snap_result = result.clone();
        });
        result
    }

    /// Start a drag owned by the active plugin.
    pub fn begin_drag(
        &mut self,
        request: DragRequest,
        document: &mut dyn DocumentStore,
        surface: &mut dyn DragSurface,
    ) -> DragResult<Uuid> {
        let mut env = DragEnv::new(document, surface, &self.snap);
        self.drag.begin(&self.active_plugin, request, &mut env)
    }

    pub fn dispatch(
        &mut self,
        event: SessionEvent,
        now: Instant,
        document: &mut dyn DocumentStore,
        surface: &mut dyn DragSurface,
    ) -> Option<DragOutcome> {
        let mut env = DragEnv::new(document, surface, &self.snap);
        self.drag.dispatch(event, now, &mut env)
    }

    /// Per-frame hook: ends a cancelled session or flushes a throttled move.
    pub fn tick(
        &mut self,
        now: Instant,
        document: &mut dyn DocumentStore,
        surface: &mut dyn DragSurface,
    ) -> Option<DragOutcome> {
        let mut env = DragEnv::new(document, surface, &self.snap);
        if let Some(outcome) = self.drag.poll_cancel(&mut env) {
            return Some(outcome);
        }
        self.drag.tick(now, &mut env);
        None
    }

    pub fn cancel_drag(
        &mut self,
        reason: CancelReason,
        document: &mut dyn DocumentStore,
        surface: &mut dyn DragSurface,
    ) -> Option<DragOutcome> {
        let mut env = DragEnv::new(document, surface, &self.snap);
        self.drag.cancel(reason, &mut env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocument;
    use crate::path::{PathElement, Subpath};
    use crate::snap::{FnSnapSource, SnapPoint, SnapPointKind};

    fn document() -> MemoryDocument {
        let mut doc = MemoryDocument::new();
        doc.insert(PathElement::new(
            "square",
            vec![Subpath::polyline(&[
                Point::new(0.0, 0.0),
                Point::new(40.0, 0.0),
                Point::new(40.0, 40.0),
            ])],
        ));
        doc
    }

    #[test]
    fn test_default_sources() {
        let ctx = EditorContext::with_default_sources(EngineConfig::default());
        let ids: Vec<&str> = ctx.snap_manager().registry().ids().collect();
        assert_eq!(ids, vec!["anchors", "midpoints", "bounds", "intersections", "edges"]);
        assert!(EditorContext::default().snap_manager().registry().is_empty());
    }

    #[test]
    fn test_hover_snaps_to_anchor() {
        let ctx = EditorContext::with_default_sources(EngineConfig::default());
        let doc = document();
        let result = ctx.hover(Point::new(38.0, 41.0), &doc).unwrap();
        assert_eq!(result.snapped_point, Point::new(40.0, 40.0));
        assert_eq!(result.target().unwrap().kind, SnapPointKind::Anchor);

        let overlay = ctx.overlay().snapshot();
        assert!(overlay.crosshair_visible);
        assert_eq!(overlay.cursor, Some(Point::new(38.0, 41.0)));
    }

    #[test]
    fn test_zoom_shrinks_tolerance() {
        let mut ctx = EditorContext::with_default_sources(EngineConfig::default());
        let doc = document();
        assert!(ctx.snap(Point::new(46.0, 40.0), &doc).is_some());
        ctx.set_viewport(Viewport::new(4.0, 0.0, 0.0));
        assert!(ctx.snap(Point::new(46.0, 40.0), &doc).is_none());
        assert_eq!(ctx.drag().frame().viewport.zoom, 4.0);
    }

    #[test]
    fn test_grid_snapping_uses_configured_size() {
        let config = EngineConfig::from_json(r#"{ "snap": { "grid_size": 50.0 } }"#).unwrap();
        let mut ctx = EditorContext::new(config);
        let doc = MemoryDocument::new();
        assert!(!ctx.grid_snapping());
        assert!(ctx.snap(Point::new(47.0, 52.0), &doc).is_none());

        ctx.set_grid_snapping(true);
        assert!(ctx.grid_snapping());
        let result = ctx.snap(Point::new(47.0, 52.0), &doc).unwrap();
        assert_eq!(result.snapped_point, Point::new(50.0, 50.0));

        ctx.set_grid_snapping(false);
        assert!(!ctx.grid_snapping());
        assert!(ctx.snap(Point::new(47.0, 52.0), &doc).is_none());
    }

    #[test]
    fn test_plugin_provider_follows_active_plugin() {
        let mut ctx = EditorContext::new(EngineConfig::default());
        let source = FnSnapSource::new("guides", |_ctx, _point| {
            Ok(vec![SnapPoint::new(Point::new(5.0, 5.0), SnapPointKind::Custom, "guide")])
        });
        ctx.register_snap_provider(
            SnapProvider::new(source)
                .active_when(|ctx| ctx.active_plugin == "ruler")
                .with_priority(3),
        );
        let doc = MemoryDocument::new();

        assert!(ctx.snap(Point::new(6.0, 6.0), &doc).is_none());
        ctx.activate_plugin("ruler");
        let result = ctx.snap(Point::new(6.0, 6.0), &doc).unwrap();
        assert_eq!(result.target().unwrap().effective_priority(), 3);

        assert!(ctx.unregister_snap_provider("guides"));
        assert!(!ctx.unregister_snap_provider("guides"));
        assert!(ctx.snap(Point::new(6.0, 6.0), &doc).is_none());
    }
}
