use crate::{
    core::Rect,
    error::{ScrollyteError, ScrollyteResult},
};

/// Every feel constant of the handoff animation in one place.
///
/// The whole trajectory (phase boundaries, travel budget, squash and shadow
/// magnitudes) is tunable from this struct alone, which also makes property
/// sweeps over the configuration practical in tests.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HandoffConfig {
    /// Scroll distance in document pixels over which the fall plays.
    pub travel_distance: f64,
    /// Fraction of the viewport height above the end anchor where the element
    /// visually lands.
    pub landing_fraction: f64,
    /// Extra scroll distance below the trigger start required before a
    /// captured snapshot is released again.
    pub hysteresis: f64,
    /// Scroll distance past the trigger end within which a late capture is
    /// still allowed.
    pub capture_slack: f64,
    /// Clamp ceiling for progress; `>= 1` keeps the element visible past
    /// landing.
    pub p_max: f64,
    /// How far below raw progress 0 the overlay already counts as active,
    /// absorbing scroll velocity overshoot.
    pub activation_lead: f64,

    /// End of the Fall phase in clamped progress.
    pub fall_end: f64,
    /// End of the Impact phase.
    pub impact_end: f64,
    /// End of the Bounce phase; Settle runs from here to 1.
    pub bounce_end: f64,

    /// Terminal rotation in degrees; near a multiple of 360 so the element
    /// ends with a small residual tilt.
    pub spin_target_deg: f64,
    /// Fraction of the fall over which the spin rate stays constant before
    /// decaying.
    pub spin_linear_until: f64,

    /// Horizontal squash scale at impact.
    pub impact_scale_x: f64,
    /// Vertical squash scale at impact.
    pub impact_scale_y: f64,

    /// Overshoot below the rest position at impact, in document pixels.
    pub overshoot_px: f64,
    /// Rebound above the rest position during the bounce, in document pixels.
    pub rebound_px: f64,
    /// Small dip before the final settle, in document pixels.
    pub settle_dip_px: f64,

    /// Stacking order handed to the presentation layer while active.
    pub z_index: i32,

    pub shadow: ShadowStyle,
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self {
            travel_distance: 1100.0,
            landing_fraction: 0.18,
            hysteresis: 600.0,
            capture_slack: 1200.0,
            p_max: 1.5,
            activation_lead: 0.05,
            fall_end: 0.82,
            impact_end: 0.87,
            bounce_end: 0.94,
            spin_target_deg: 732.0,
            spin_linear_until: 0.7,
            impact_scale_x: 1.05,
            impact_scale_y: 0.92,
            overshoot_px: 14.0,
            rebound_px: 16.0,
            settle_dip_px: 4.0,
            z_index: 100,
            shadow: ShadowStyle::default(),
        }
    }
}

impl HandoffConfig {
    pub fn validate(&self) -> ScrollyteResult<()> {
        if !(self.travel_distance > 0.0) {
            return Err(ScrollyteError::validation("travel_distance must be > 0"));
        }
        if !(0.0..1.0).contains(&self.landing_fraction) {
            return Err(ScrollyteError::validation(
                "landing_fraction must be in [0, 1)",
            ));
        }
        if self.hysteresis < 0.0 || self.capture_slack < 0.0 {
            return Err(ScrollyteError::validation(
                "hysteresis and capture_slack must be >= 0",
            ));
        }
        if self.p_max < 1.0 {
            return Err(ScrollyteError::validation("p_max must be >= 1"));
        }
        if self.activation_lead < 0.0 {
            return Err(ScrollyteError::validation("activation_lead must be >= 0"));
        }
        if !(0.0 < self.fall_end
            && self.fall_end < self.impact_end
            && self.impact_end < self.bounce_end
            && self.bounce_end < 1.0)
        {
            return Err(ScrollyteError::validation(
                "phase boundaries must satisfy 0 < fall_end < impact_end < bounce_end < 1",
            ));
        }
        if !(0.0 < self.spin_linear_until && self.spin_linear_until < 1.0) {
            return Err(ScrollyteError::validation(
                "spin_linear_until must be in (0, 1)",
            ));
        }
        if self.impact_scale_x <= 0.0 || self.impact_scale_y <= 0.0 {
            return Err(ScrollyteError::validation(
                "impact squash scales must be > 0",
            ));
        }
        self.shadow.validate()?;
        if self.shadow.appear_at >= self.fall_end {
            return Err(ScrollyteError::validation(
                "shadow appear_at must be < fall_end",
            ));
        }
        Ok(())
    }
}

/// Shape of the ground-contact shadow over the animation.
///
/// The shadow models elevation through diffuseness: soft and faint while the
/// element is high, sharp and dark at impact, then back to a resting contact
/// shadow.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ShadowStyle {
    /// Progress at which the shadow starts fading in.
    pub appear_at: f64,
    /// Horizontal scale while the element is still high up.
    pub far_scale_x: f64,
    /// Peak opacity reached at impact.
    pub peak_opacity: f64,
    /// Opacity while the element is airborne during the bounce.
    pub bounce_opacity: f64,
    /// Resting opacity after settle.
    pub rest_opacity: f64,
    /// Blur radius while the element is high up, in pixels.
    pub soft_blur_px: f64,
    /// Blur radius at impact.
    pub sharp_blur_px: f64,
    /// Blur radius during the bounce.
    pub bounce_blur_px: f64,
    /// Resting blur radius after settle.
    pub rest_blur_px: f64,
    /// Horizontal flare of the shadow at impact.
    pub flare_scale_x: f64,
    /// Resting horizontal scale after settle.
    pub rest_scale_x: f64,
}

impl Default for ShadowStyle {
    fn default() -> Self {
        Self {
            appear_at: 0.45,
            far_scale_x: 0.55,
            peak_opacity: 0.5,
            bounce_opacity: 0.22,
            rest_opacity: 0.32,
            soft_blur_px: 26.0,
            sharp_blur_px: 6.0,
            bounce_blur_px: 18.0,
            rest_blur_px: 12.0,
            flare_scale_x: 1.08,
            rest_scale_x: 1.0,
        }
    }
}

impl ShadowStyle {
    pub fn validate(&self) -> ScrollyteResult<()> {
        if !(0.0..1.0).contains(&self.appear_at) {
            return Err(ScrollyteError::validation(
                "shadow appear_at must be in [0, 1)",
            ));
        }
        for (name, v) in [
            ("peak_opacity", self.peak_opacity),
            ("bounce_opacity", self.bounce_opacity),
            ("rest_opacity", self.rest_opacity),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(ScrollyteError::validation(format!(
                    "shadow {name} must be in [0, 1]"
                )));
            }
        }
        for (name, v) in [
            ("far_scale_x", self.far_scale_x),
            ("flare_scale_x", self.flare_scale_x),
            ("rest_scale_x", self.rest_scale_x),
        ] {
            if v <= 0.0 {
                return Err(ScrollyteError::validation(format!(
                    "shadow {name} must be > 0"
                )));
            }
        }
        if self.soft_blur_px < 0.0
            || self.sharp_blur_px < 0.0
            || self.bounce_blur_px < 0.0
            || self.rest_blur_px < 0.0
        {
            return Err(ScrollyteError::validation("shadow blur must be >= 0"));
        }
        Ok(())
    }
}

/// Ordered raster frame sequence for the scrubber.
///
/// Frames are named `<stem>-NNN.<ext>` with a zero-padded 1-based index,
/// e.g. `frame-001.jpg` through `frame-240.jpg`.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    /// Directory holding the frame files, relative to the scene document.
    pub dir: String,
    pub stem: String,
    pub ext: String,
    pub frame_count: u32,
    /// Zero-pad width of the index component.
    pub pad_width: usize,
    /// Straight-alpha RGBA fill painted under every frame.
    pub background_rgba: [u8; 4],
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            dir: "sequence".to_string(),
            stem: "frame".to_string(),
            ext: "jpg".to_string(),
            frame_count: 240,
            pad_width: 3,
            background_rgba: [0xfb, 0xf6, 0xf6, 0xff],
        }
    }
}

impl SequenceConfig {
    /// File name for the 0-based frame `index` (the on-disk names are
    /// 1-based).
    pub fn frame_file_name(&self, index: usize) -> String {
        format!(
            "{}-{:0width$}.{}",
            self.stem,
            index + 1,
            self.ext,
            width = self.pad_width
        )
    }

    pub fn validate(&self) -> ScrollyteResult<()> {
        if self.frame_count == 0 {
            return Err(ScrollyteError::validation("frame_count must be > 0"));
        }
        if self.stem.trim().is_empty() || self.ext.trim().is_empty() {
            return Err(ScrollyteError::validation(
                "sequence stem and ext must be non-empty",
            ));
        }
        Ok(())
    }
}

/// A complete offline scene: viewport, anchor geometry, configuration and
/// asset references. This is what the driver binary consumes; a live host
/// supplies the same data incrementally instead.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Scene {
    pub viewport_w: f64,
    pub viewport_h: f64,
    /// Document-space rect the handoff flight starts from.
    pub start_anchor: Rect,
    /// Document-space rect the handoff flight lands on.
    pub end_anchor: Rect,
    #[serde(default)]
    pub handoff: HandoffConfig,
    #[serde(default)]
    pub sequence: SequenceConfig,
    /// Static image shown inside the flying element; the core only carries
    /// the reference.
    #[serde(default)]
    pub handoff_image: Option<String>,
}

impl Scene {
    pub fn validate(&self) -> ScrollyteResult<()> {
        if !(self.viewport_w > 0.0 && self.viewport_h > 0.0) {
            return Err(ScrollyteError::validation("viewport must be > 0"));
        }
        self.start_anchor.validate()?;
        self.end_anchor.validate()?;
        self.handoff.validate()?;
        self.sequence.validate()?;
        Ok(())
    }
}
