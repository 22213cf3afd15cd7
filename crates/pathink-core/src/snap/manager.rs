//! Snap resolution across all registered sources.

use super::registry::{SnapProvider, SnapSourceRegistry};
use super::source::SnapSource;
use super::types::{SnapContext, SnapPoint, SnapResult};
use crate::config::SnapConfig;
use kurbo::Point;

/// Squared distances closer than this are treated as equal.
pub const TIE_EPSILON: f64 = 1e-10;

/// Resolves a raw point against every participating snap source.
#[derive(Debug)]
pub struct SnapManager {
    registry: SnapSourceRegistry,
    enabled: bool,
    threshold_px: f64,
}

impl Default for SnapManager {
    fn default() -> Self {
        Self::new(&SnapConfig::default())
    }
}

impl SnapManager {
    pub fn new(config: &SnapConfig) -> Self {
        Self {
            registry: SnapSourceRegistry::new(),
            enabled: true,
            threshold_px: config.threshold_px.max(0.0),
        }
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Screen-space tolerance in pixels.
    pub fn threshold_px(&self) -> f64 {
        self.threshold_px
    }

    /// Set the tolerance. Negative values are treated as zero.
    pub fn set_threshold_px(&mut self, threshold_px: f64) {
        self.threshold_px = threshold_px.max(0.0);
    }

    pub fn register_source(&mut self, source: impl SnapSource + 'static) {
        self.registry.register(Box::new(source));
    }

    pub fn register_provider(&mut self, provider: SnapProvider) {
        self.registry.register_provider(provider);
    }

    pub fn unregister_source(&mut self, id: &str) -> bool {
        self.registry.unregister(id)
    }

    pub fn registry(&self) -> &SnapSourceRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SnapSourceRegistry {
        &mut self.registry
    }

    /// Find the best snap target for `point`.
    ///
    /// Returns `None` when snapping is disabled, no source offers a candidate,
    /// or every candidate is farther than the zoom-adjusted threshold.
    pub fn snap(&self, point: Point, ctx: &SnapContext<'_>) -> Option<SnapResult> {
        if !self.enabled {
            return None;
        }

        let mut candidates: Vec<SnapPoint> = Vec::new();
        for (source, provider_priority) in self.registry.participating(ctx) {
            match source.snap_points(ctx, point) {
                Ok(mut points) => {
                    if let Some(priority) = provider_priority {
                        for p in &mut points {
                            p.priority.get_or_insert(priority);
                        }
                    }
                    candidates.append(&mut points);
                }
                Err(err) => {
                    log::warn!("Snap source '{}' failed: {}", source.id(), err);
                }
            }
        }

        if candidates.is_empty() {
            return None;
        }

        let threshold = ctx.viewport.screen_to_canvas_distance(self.threshold_px);
        let threshold_sq = threshold * threshold;

        let in_range: Vec<(usize, f64)> = candidates
            .iter()
            .enumerate()
            .map(|(index, candidate)| (index, (candidate.point - point).hypot2()))
            .filter(|&(_, dist_sq)| dist_sq <= threshold_sq)
            .collect();
        let min_dist_sq = in_range.iter().map(|&(_, d)| d).fold(f64::INFINITY, f64::min);

        // Among candidates tied with the closest one, the highest priority wins.
        let mut best: Option<(usize, f64)> = None;
        for &(index, dist_sq) in &in_range {
            if dist_sq - min_dist_sq >= TIE_EPSILON {
                continue;
            }
            let replace = match best {
                None => true,
                Some((best_index, best_dist_sq)) => {
                    let priority = candidates[index].effective_priority();
                    let best_priority = candidates[best_index].effective_priority();
                    priority > best_priority
                        || (priority == best_priority && dist_sq < best_dist_sq)
                }
            };
            if replace {
                best = Some((index, dist_sq));
            }
        }

        let (index, dist_sq) = best?;
        let winner = candidates[index].clone();
        log::trace!(
            "Snapped ({:.2}, {:.2}) to {:?} of '{}'",
            point.x,
            point.y,
            winner.kind,
            winner.element_id
        );
        Some(SnapResult {
            snapped_point: winner.point,
            original_point: point,
            snap_points: vec![winner],
            snap_lines: Vec::new(),
            all_available_snap_points: candidates,
            distance: dist_sq.sqrt(),
        })
    }
}
