use eframe::egui::{Pos2, Vec2, vec2};

pub(in crate::app) const MIN_SCALE: f32 = 0.1;
pub(in crate::app) const MAX_SCALE: f32 = 4.0;
pub(in crate::app) const ZOOM_STEP: f32 = 1.25;
const TRANSLATE_EPSILON: f32 = 1.0;
const SCALE_EPSILON: f32 = 0.01;
const ANIMATION_SECS: f32 = 0.25;

/// Maps world coordinates to canvas-local screen coordinates:
/// `screen = translate + world * k`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct ViewTransform {
    pub(in crate::app) x: f32,
    pub(in crate::app) y: f32,
    pub(in crate::app) k: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub(in crate::app) const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        k: 1.0,
    };

    fn translation(self) -> Vec2 {
        vec2(self.x, self.y)
    }

    pub(in crate::app) fn apply(self, world: Vec2) -> Vec2 {
        self.translation() + world * self.k
    }

    pub(in crate::app) fn invert(self, local: Vec2) -> Vec2 {
        (local - self.translation()) / self.k
    }

    fn clamped(self) -> Self {
        Self {
            k: self.k.clamp(MIN_SCALE, MAX_SCALE),
            ..self
        }
    }

    /// Scales by `factor` while keeping the world point under `anchor` fixed.
    pub(in crate::app) fn scaled_about(self, factor: f32, anchor: Vec2) -> Self {
        let world = self.invert(anchor);
        let k = (self.k * factor).clamp(MIN_SCALE, MAX_SCALE);
        let translation = anchor - world * k;
        Self {
            x: translation.x,
            y: translation.y,
            k,
        }
    }

    pub(in crate::app) fn translated(self, delta: Vec2) -> Self {
        Self {
            x: self.x + delta.x,
            y: self.y + delta.y,
            ..self
        }
    }

    fn differs_from(self, other: Self) -> bool {
        (self.x - other.x).abs() >= TRANSLATE_EPSILON
            || (self.y - other.y).abs() >= TRANSLATE_EPSILON
            || (self.k - other.k).abs() >= SCALE_EPSILON
    }

    fn lerp(self, to: Self, t: f32) -> Self {
        Self {
            x: self.x + (to.x - self.x) * t,
            y: self.y + (to.y - self.y) * t,
            k: self.k + (to.k - self.k) * t,
        }
    }
}

struct ZoomAnimation {
    from: ViewTransform,
    to: ViewTransform,
    elapsed: f32,
}

/// Owns the canvas transform. Candidate transforms are clamped to the scale
/// range and dropped when they are within a pixel / 0.01 scale of the one
/// already applied.
#[derive(Default)]
pub(in crate::app) struct ZoomController {
    applied: ViewTransform,
    /// Accumulated direct-manipulation target, so sub-pixel drags still add up.
    requested: ViewTransform,
    animation: Option<ZoomAnimation>,
}

impl ZoomController {
    pub(in crate::app) fn transform(&self) -> ViewTransform {
        self.applied
    }

    /// Where the transform ends up once any running animation finishes.
    pub(in crate::app) fn target(&self) -> ViewTransform {
        self.animation
            .as_ref()
            .map_or(self.applied, |animation| animation.to)
    }

    /// Returns whether the transform changed.
    fn apply(&mut self, candidate: ViewTransform) -> bool {
        let candidate = candidate.clamped();
        if !candidate.differs_from(self.applied) {
            return false;
        }
        self.applied = candidate;
        true
    }

    /// Direct manipulation cancels any button animation and continues from
    /// wherever it had got to.
    fn begin_direct(&mut self) {
        if self.animation.take().is_some() {
            self.requested = self.applied;
        }
    }

    pub(in crate::app) fn pan_by(&mut self, delta: Vec2) -> bool {
        self.begin_direct();
        self.requested = self.requested.translated(delta);
        self.apply(self.requested)
    }

    /// Wheel zoom around `anchor` (canvas-local).
    pub(in crate::app) fn zoom_about(&mut self, factor: f32, anchor: Vec2) -> bool {
        self.begin_direct();
        self.requested = self.requested.scaled_about(factor, anchor);
        self.apply(self.requested)
    }

    pub(in crate::app) fn zoom_in(&mut self, viewport: Vec2) {
        self.animate_scale(ZOOM_STEP, viewport);
    }

    pub(in crate::app) fn zoom_out(&mut self, viewport: Vec2) {
        self.animate_scale(1.0 / ZOOM_STEP, viewport);
    }

    fn animate_scale(&mut self, factor: f32, viewport: Vec2) {
        let anchor = viewport * 0.5;
        let to = self.target().scaled_about(factor, anchor);
        self.animation = Some(ZoomAnimation {
            from: self.applied,
            to,
            elapsed: 0.0,
        });
    }

    pub(in crate::app) fn reset(&mut self) {
        self.animation = None;
        self.applied = ViewTransform::IDENTITY;
        self.requested = ViewTransform::IDENTITY;
    }

    /// Steps the running animation. Returns whether another frame is needed.
    pub(in crate::app) fn advance(&mut self, dt: f32) -> bool {
        let Some(animation) = self.animation.as_mut() else {
            return false;
        };

        animation.elapsed += dt.max(0.0);
        let t = (animation.elapsed / ANIMATION_SECS).min(1.0);
        let eased = 1.0 - (1.0 - t).powi(3);
        let next = animation.from.lerp(animation.to, eased);
        let to = animation.to;

        if t >= 1.0 {
            self.animation = None;
            // Land exactly on the target even if the last step is tiny.
            self.applied = to.clamped();
            self.requested = self.applied;
            return false;
        }

        self.apply(next);
        self.requested = self.applied;
        true
    }

    pub(in crate::app) fn world_to_screen(&self, origin: Pos2, world: Vec2) -> Pos2 {
        origin + self.applied.apply(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const VIEWPORT: Vec2 = vec2(800.0, 600.0);

    fn settle(zoom: &mut ZoomController) {
        let mut frames = 0;
        while zoom.advance(1.0 / 60.0) {
            frames += 1;
            assert!(frames < 120);
        }
    }

    #[test]
    fn small_changes_are_suppressed() {
        let mut zoom = ZoomController::default();
        assert!(!zoom.apply(ViewTransform {
            x: 0.4,
            y: -0.6,
            k: 1.005,
        }));
        assert_eq!(zoom.transform(), ViewTransform::IDENTITY);

        assert!(zoom.apply(ViewTransform {
            x: 1.5,
            y: 0.0,
            k: 1.0,
        }));
        assert_eq!(zoom.transform().x, 1.5);
    }

    #[test]
    fn sub_pixel_drags_accumulate() {
        let mut zoom = ZoomController::default();
        let mut moved = false;
        for _ in 0..10 {
            moved |= zoom.pan_by(vec2(0.3, 0.0));
        }
        assert!(moved);
        assert!(zoom.transform().x >= 2.0);
    }

    #[test]
    fn wheel_zoom_keeps_the_anchor_fixed() {
        let mut zoom = ZoomController::default();
        let anchor = vec2(120.0, 80.0);
        let world = zoom.transform().invert(anchor);

        assert!(zoom.zoom_about(1.15, anchor));
        assert!((zoom.transform().invert(anchor) - world).length() < 1e-3);
    }

    #[test]
    fn zoom_in_keeps_viewport_center_fixed() {
        let mut zoom = ZoomController::default();
        let center = VIEWPORT * 0.5;
        let world_before = zoom.transform().invert(center);

        zoom.zoom_in(VIEWPORT);
        assert!(zoom.target().k > zoom.transform().k);
        settle(&mut zoom);

        assert!((zoom.transform().k - ZOOM_STEP).abs() < 1e-5);
        let world_after = zoom.transform().invert(center);
        assert!((world_after - world_before).length() < 1e-3);
    }

    #[test]
    fn repeated_clicks_compound_from_the_pending_target() {
        let mut zoom = ZoomController::default();
        zoom.zoom_in(VIEWPORT);
        zoom.advance(0.05);
        zoom.zoom_in(VIEWPORT);
        settle(&mut zoom);
        assert!((zoom.transform().k - ZOOM_STEP * ZOOM_STEP).abs() < 1e-4);
    }

    #[test]
    fn reset_is_idempotent_and_cancels_animation() {
        let mut zoom = ZoomController::default();
        zoom.zoom_in(VIEWPORT);
        zoom.advance(0.1);
        zoom.pan_by(vec2(40.0, -25.0));

        zoom.reset();
        let once = zoom.transform();
        zoom.reset();
        assert_eq!(zoom.transform(), once);
        assert_eq!(once, ViewTransform::IDENTITY);
        assert_eq!(zoom.target(), once);
        assert!(!zoom.advance(0.1));
    }

    #[test]
    fn screen_and_world_round_trip_through_origin() {
        let mut zoom = ZoomController::default();
        zoom.zoom_about(2.0, Vec2::ZERO);
        zoom.pan_by(vec2(30.0, -12.0));
        let origin = Pos2::new(100.0, 50.0);
        let world = vec2(7.0, 9.0);

        let screen = zoom.world_to_screen(origin, world);
        assert_eq!(screen, Pos2::new(144.0, 56.0));
        assert_eq!(zoom.transform().invert(screen - origin), world);
    }

    proptest! {
        #[test]
        fn prop_scale_stays_in_bounds(steps in prop::collection::vec(any::<bool>(), 1..60)) {
            let mut zoom = ZoomController::default();
            for zoom_in in steps {
                if zoom_in {
                    zoom.zoom_in(VIEWPORT);
                } else {
                    zoom.zoom_out(VIEWPORT);
                }
                zoom.advance(0.08);
                let k = zoom.transform().k;
                prop_assert!((MIN_SCALE..=MAX_SCALE).contains(&k), "scale {} out of range", k);
            }
            settle(&mut zoom);
            let k = zoom.transform().k;
            prop_assert!((MIN_SCALE..=MAX_SCALE).contains(&k));
        }

        #[test]
        fn prop_wheel_zoom_clamps(factors in prop::collection::vec(0.2f32..5.0, 1..40)) {
            let mut zoom = ZoomController::default();
            for factor in factors {
                zoom.zoom_about(factor, vec2(123.0, 45.0));
                let k = zoom.transform().k;
                prop_assert!((MIN_SCALE..=MAX_SCALE).contains(&k));
            }
        }
    }
}
