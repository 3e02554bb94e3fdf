use crate::{
    anim::{Channel, Key, Lerp},
    anim_ease::Ease,
    core::{Affine, ScrollSample},
    error::ScrollyteResult,
    model::HandoffConfig,
    snapshot::Snapshot,
    trigger::TriggerRange,
};

/// Ground-contact shadow parameters for one evaluated sample.
#[derive(Clone, Copy, Debug, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct ShadowState {
    pub opacity: f64,
    pub scale_x: f64,
    pub blur_px: f64,
}

/// The engine's sole output: everything the presentation layer needs to paint
/// the flying element for one scroll sample.
///
/// Fully determined by (snapshot, trigger range, sample); re-evaluating with
/// the same inputs yields bit-identical output, which is what makes scripted
/// replays and the determinism tests possible. Positions are viewport-space.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TransformState {
    pub x: f64,
    pub y: f64,
    pub rotate_deg: f64,
    pub width: f64,
    pub height: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub opacity: f64,
    pub z_index: i32,
    pub shadow: ShadowState,
    /// True once anchor geometry has been captured; the host must not render
    /// the element before this.
    pub is_ready: bool,
    /// True while the scroll sits inside the (widened) activation window.
    pub overlay_active: bool,
    /// Clamped progress, exposed for scrubber-style consumers.
    pub progress: f64,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            rotate_deg: 0.0,
            width: 0.0,
            height: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            opacity: 0.0,
            z_index: 0,
            shadow: ShadowState::default(),
            is_ready: false,
            overlay_active: false,
            progress: 0.0,
        }
    }
}

impl TransformState {
    /// Position/rotation/scale as a single affine map for consumers that
    /// composite matrices instead of applying the fields individually.
    pub fn to_affine(&self) -> Affine {
        Affine::translate((self.x, self.y))
            * Affine::rotate(self.rotate_deg.to_radians())
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
    }
}

/// The handoff engine: per-channel keyframe tables compiled once from a
/// [`HandoffConfig`], then evaluated statelessly per scroll sample.
///
/// Vertical offsets in the bounce channel are stored as fractions of the
/// travel distance so the same configuration scales with the scroll budget.
#[derive(Clone, Debug)]
pub struct HandoffEngine {
    cfg: HandoffConfig,
    rotation: Channel<f64>,
    bounce: Channel<f64>,
    scale_x: Channel<f64>,
    scale_y: Channel<f64>,
    shadow_opacity: Channel<f64>,
    shadow_scale_x: Channel<f64>,
    shadow_blur: Channel<f64>,
}

impl HandoffEngine {
    pub fn new(cfg: HandoffConfig) -> ScrollyteResult<Self> {
        cfg.validate()?;

        let travel = cfg.travel_distance.max(1.0);
        let settle_mid = (cfg.bounce_end + 1.0) / 2.0;

        let rotation = Channel::new(vec![
            Key::new(0.0, 0.0, Ease::Linear),
            Key::new(
                cfg.spin_linear_until,
                cfg.spin_target_deg * cfg.spin_linear_until,
                Ease::OutQuad,
            ),
            Key::new(1.0, cfg.spin_target_deg, Ease::Linear),
        ])?;

        // Offsets from the rest position, as fractions of the travel budget.
        // Positive is below rest. Ease-in into the overshoot, ease-out on the
        // rebound.
        let bounce = Channel::new(vec![
            Key::new(cfg.fall_end, 0.0, Ease::InQuad),
            Key::new(cfg.impact_end, cfg.overshoot_px / travel, Ease::OutQuad),
            Key::new(cfg.bounce_end, -cfg.rebound_px / travel, Ease::InOutQuad),
            Key::new(settle_mid, cfg.settle_dip_px / travel, Ease::OutQuad),
            Key::new(1.0, 0.0, Ease::Linear),
        ])?;

        // Half the impact squash, inverted, as the counter-stretch while the
        // element is airborne in the bounce.
        let counter_x = 1.0 - (cfg.impact_scale_x - 1.0) * 0.5;
        let counter_y = 1.0 + (1.0 - cfg.impact_scale_y) * 0.5;

        let scale_x = Channel::new(vec![
            Key::new(cfg.fall_end, 1.0, Ease::InQuad),
            Key::new(cfg.impact_end, cfg.impact_scale_x, Ease::OutQuad),
            Key::new(cfg.bounce_end, counter_x, Ease::InOutQuad),
            Key::new(1.0, 1.0, Ease::Linear),
        ])?;

        let scale_y = Channel::new(vec![
            Key::new(cfg.fall_end, 1.0, Ease::InQuad),
            Key::new(cfg.impact_end, cfg.impact_scale_y, Ease::OutQuad),
            Key::new(cfg.bounce_end, counter_y, Ease::InOutQuad),
            Key::new(1.0, 1.0, Ease::Linear),
        ])?;

        let sh = &cfg.shadow;
        let shadow_opacity = Channel::new(vec![
            Key::new(sh.appear_at, 0.0, Ease::InQuad),
            Key::new(cfg.impact_end, sh.peak_opacity, Ease::OutQuad),
            Key::new(cfg.bounce_end, sh.bounce_opacity, Ease::InOutQuad),
            Key::new(1.0, sh.rest_opacity, Ease::Linear),
        ])?;

        let shadow_scale_x = Channel::new(vec![
            Key::new(sh.appear_at, sh.far_scale_x, Ease::OutQuad),
            Key::new(cfg.impact_end, sh.flare_scale_x, Ease::OutQuad),
            Key::new(cfg.bounce_end, sh.far_scale_x.max(0.9), Ease::InOutQuad),
            Key::new(1.0, sh.rest_scale_x, Ease::Linear),
        ])?;

        let shadow_blur = Channel::new(vec![
            Key::new(sh.appear_at, sh.soft_blur_px, Ease::InQuad),
            Key::new(cfg.impact_end, sh.sharp_blur_px, Ease::OutQuad),
            Key::new(cfg.bounce_end, sh.bounce_blur_px, Ease::InOutQuad),
            Key::new(1.0, sh.rest_blur_px, Ease::Linear),
        ])?;

        Ok(Self {
            cfg,
            rotation,
            bounce,
            scale_x,
            scale_y,
            shadow_opacity,
            shadow_scale_x,
            shadow_blur,
        })
    }

    pub fn config(&self) -> &HandoffConfig {
        &self.cfg
    }

    /// Evaluate the full transform for one scroll sample.
    ///
    /// Pure: no internal state is read or written, so results are safe to
    /// memoize by (scroll position, snapshot, range). With no snapshot
    /// latched the inert default is returned and nothing should be painted.
    pub fn evaluate(
        &self,
        snapshot: Option<&Snapshot>,
        range: TriggerRange,
        sample: ScrollSample,
    ) -> TransformState {
        let Some(snap) = snapshot else {
            return TransformState::default();
        };

        let cfg = &self.cfg;
        let raw_p = range.raw_progress(sample.scroll_y);
        let p = raw_p.clamp(0.0, cfg.p_max);
        let overlay_active = raw_p > -cfg.activation_lead && raw_p < cfg.p_max;
        let fall_p = p.min(1.0);

        let start = snap.start;
        let end = snap.end;

        // Horizontal motion is not physically styled: a plain lerp.
        let x_doc = f64::lerp(&start.left, &end.left, fall_p);

        // Vertical: gravity-like ease-in through the fall, then keyframed
        // offsets around the rest position.
        let fp = (p / cfg.fall_end).min(1.0);
        let g = 0.6 * fp + 0.4 * fp * fp;
        let travel = cfg.travel_distance.max(1.0);
        let y_doc = f64::lerp(&start.top, &end.top, g) + self.bounce.sample(p) * travel;

        let rotate_deg = self.rotation.sample(p);
        let scale_x = self.scale_x.sample(p);
        let scale_y = self.scale_y.sample(p);

        let width = f64::lerp(&start.width, &end.width, fall_p) * scale_x;
        let height = f64::lerp(&start.height, &end.height, fall_p) * scale_y;

        // Shadow darkens with ground proximity. The drop between the anchors
        // is floored at 1px so a flat handoff cannot divide by ~0.
        let drop = (end.top - start.top).abs().max(1.0);
        let proximity = (1.0 - (end.top - y_doc).abs() / drop).clamp(0.0, 1.0);
        let shadow = ShadowState {
            opacity: self.shadow_opacity.sample(p) * proximity,
            scale_x: self.shadow_scale_x.sample(p),
            blur_px: self.shadow_blur.sample(p),
        };

        // All physics runs in document space; convert for the fixed-position
        // consumer only at the very end.
        TransformState {
            x: x_doc - sample.scroll_x,
            y: y_doc - sample.scroll_y,
            rotate_deg,
            width,
            height,
            scale_x,
            scale_y,
            opacity: if overlay_active { 1.0 } else { 0.0 },
            z_index: cfg.z_index,
            shadow,
            is_ready: true,
            overlay_active,
            progress: p,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Rect;

    fn engine() -> HandoffEngine {
        HandoffEngine::new(HandoffConfig::default()).unwrap()
    }

    fn snap() -> Snapshot {
        Snapshot {
            start: Rect::new(300.0, 500.0, 220.0, 340.0),
            end: Rect::new(5000.0, 180.0, 180.0, 280.0),
        }
    }

    fn range() -> TriggerRange {
        TriggerRange::new(3756.0, 4856.0).unwrap()
    }

    fn at(scroll_y: f64) -> ScrollSample {
        ScrollSample::at_y(scroll_y, 800.0)
    }

    #[test]
    fn no_snapshot_yields_inert_default() {
        let t = engine().evaluate(None, range(), at(4000.0));
        assert!(!t.is_ready);
        assert!(!t.overlay_active);
        assert_eq!(t.opacity, 0.0);
        assert_eq!(t.x, 0.0);
        assert_eq!(t.y, 0.0);
        assert_eq!(t.width, 0.0);
    }

    #[test]
    fn evaluation_is_deterministic() {
        let e = engine();
        let s = snap();
        for y in [3700.0, 3756.0, 4100.0, 4323.0, 4700.0, 4856.0, 5300.0] {
            let a = e.evaluate(Some(&s), range(), at(y));
            let b = e.evaluate(Some(&s), range(), at(y));
            assert_eq!(a, b);
        }
    }

    #[test]
    fn start_of_range_matches_start_anchor() {
        let t = engine().evaluate(Some(&snap()), range(), at(3756.0));
        assert!(t.is_ready);
        assert_eq!(t.progress, 0.0);
        assert_eq!(t.rotate_deg, 0.0);
        assert_eq!(t.scale_x, 1.0);
        assert_eq!(t.scale_y, 1.0);
        assert_eq!(t.x, 500.0);
        // Document 300 at scroll 3756 sits far above the viewport.
        assert_eq!(t.y, 300.0 - 3756.0);
        assert_eq!(t.width, 220.0);
        assert_eq!(t.height, 340.0);
    }

    #[test]
    fn worked_example_mid_fall() {
        // scroll 4323 -> rawP ~= 0.5155, fp ~= 0.6286, g ~= 0.5353.
        let t = engine().evaluate(Some(&snap()), range(), at(4323.0));
        let raw_p = (4323.0 - 3756.0) / 1100.0;
        let fp = raw_p / 0.82;
        let g = 0.6 * fp + 0.4 * fp * fp;
        let y_doc = 300.0 + (5000.0 - 300.0) * g;
        assert!((t.y - (y_doc - 4323.0)).abs() < 1e-9);
        assert!(t.overlay_active);
        assert_eq!(t.opacity, 1.0);
    }

    #[test]
    fn fall_is_monotonic_in_progress() {
        let e = engine();
        let s = snap();
        let r = range();
        let mut last = f64::NEG_INFINITY;
        // Document-space vertical position through the fall phase.
        for i in 0..=82 {
            let p = (i as f64) / 100.0;
            let y = r.start + p * r.len();
            let t = e.evaluate(Some(&s), r, at(y));
            let y_doc = t.y + y;
            assert!(y_doc >= last);
            last = y_doc;
        }
    }

    #[test]
    fn landing_rests_exactly_on_end_anchor() {
        let cfg = HandoffConfig::default();
        let t = engine().evaluate(Some(&snap()), range(), at(4856.0));
        assert_eq!(t.progress, 1.0);
        assert!((t.y - (5000.0 - 4856.0)).abs() < 1e-9);
        assert!((t.x - 180.0).abs() < 1e-9);
        assert!((t.width - 180.0).abs() < 1e-9);
        assert!((t.height - 280.0).abs() < 1e-9);
        assert_eq!(t.rotate_deg, cfg.spin_target_deg);
    }

    #[test]
    fn impact_squashes_and_overshoots() {
        let cfg = HandoffConfig::default();
        let r = range();
        // p = impact_end -> scroll at start + impact_end * len.
        let y = r.start + cfg.impact_end * r.len();
        let t = engine().evaluate(Some(&snap()), r, at(y));
        assert!((t.scale_x - cfg.impact_scale_x).abs() < 1e-9);
        assert!((t.scale_y - cfg.impact_scale_y).abs() < 1e-9);
        // Overshoot puts the element below its rest position.
        let y_doc = t.y + y;
        assert!((y_doc - (5000.0 + cfg.overshoot_px)).abs() < 1e-9);
    }

    #[test]
    fn bounce_rises_above_rest() {
        let cfg = HandoffConfig::default();
        let r = range();
        let y = r.start + cfg.bounce_end * r.len();
        let t = engine().evaluate(Some(&snap()), r, at(y));
        let y_doc = t.y + y;
        assert!((y_doc - (5000.0 - cfg.rebound_px)).abs() < 1e-9);
    }

    #[test]
    fn overlay_deactivates_past_clamp_ceiling() {
        let cfg = HandoffConfig::default();
        let r = range();
        // rawP = p_max exactly: outside the open activation interval.
        let y = r.start + cfg.p_max * r.len();
        let t = engine().evaluate(Some(&snap()), r, at(y));
        assert!(t.is_ready);
        assert!(!t.overlay_active);
        assert_eq!(t.opacity, 0.0);
        assert_eq!(t.progress, cfg.p_max);

        // Just inside stays active.
        let t = engine().evaluate(Some(&snap()), r, at(y - 1.0));
        assert!(t.overlay_active);
        assert_eq!(t.opacity, 1.0);
    }

    #[test]
    fn shadow_hidden_high_sharp_at_impact() {
        let cfg = HandoffConfig::default();
        let r = range();

        let early = engine().evaluate(Some(&snap()), r, at(r.start + 0.2 * r.len()));
        assert_eq!(early.shadow.opacity, 0.0);

        let impact = engine().evaluate(
            Some(&snap()),
            r,
            at(r.start + cfg.impact_end * r.len()),
        );
        assert!(impact.shadow.opacity > 0.4);
        assert!((impact.shadow.blur_px - cfg.shadow.sharp_blur_px).abs() < 1e-9);
        assert!((impact.shadow.scale_x - cfg.shadow.flare_scale_x).abs() < 1e-9);
    }

    #[test]
    fn flat_handoff_does_not_blow_up_shadow() {
        // Both anchors at the same height: the drop denominator floors at 1.
        let s = Snapshot {
            start: Rect::new(5000.0, 500.0, 220.0, 340.0),
            end: Rect::new(5000.0, 180.0, 180.0, 280.0),
        };
        let t = engine().evaluate(Some(&s), range(), at(4856.0));
        assert!(t.shadow.opacity.is_finite());
        assert!(t.y.is_finite());
    }

    #[test]
    fn to_affine_translates_by_position() {
        let mut t = TransformState::default();
        t.x = 10.0;
        t.y = 20.0;
        let p = t.to_affine() * kurbo::Point::new(0.0, 0.0);
        assert!((p.x - 10.0).abs() < 1e-12);
        assert!((p.y - 20.0).abs() < 1e-12);
    }
}
