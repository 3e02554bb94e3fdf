use crate::{
    core::{Rect, ScrollSample},
    error::{ScrollyteError, ScrollyteResult},
    model::HandoffConfig,
};

/// Scroll-offset interval over which handoff progress maps from 0 to 1.
///
/// Recomputed whenever the end anchor's document position is (re)established;
/// stable between those events. `start < end` always holds.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TriggerRange {
    pub start: f64,
    pub end: f64,
}

impl TriggerRange {
    pub fn new(start: f64, end: f64) -> ScrollyteResult<Self> {
        if !(start.is_finite() && end.is_finite()) {
            return Err(ScrollyteError::geometry(
                "TriggerRange bounds must be finite",
            ));
        }
        if start >= end {
            return Err(ScrollyteError::geometry(
                "TriggerRange start must be < end",
            ));
        }
        Ok(Self { start, end })
    }

    /// Derive the range from the end anchor's document-space rect.
    ///
    /// The element lands when the anchor's top sits `landing_fraction` of the
    /// viewport below the viewport top; the fall occupies a fixed pixel
    /// budget of scroll travel above that point, so the animation's length is
    /// independent of page content elsewhere.
    pub fn from_end_anchor(
        end_anchor_doc: Rect,
        sample: ScrollSample,
        cfg: &HandoffConfig,
    ) -> ScrollyteResult<Self> {
        let landing_scroll = end_anchor_doc.top - cfg.landing_fraction * sample.viewport_h;
        Self::new(landing_scroll - cfg.travel_distance, landing_scroll)
    }

    /// Unclamped progress of `scroll_y` through the range.
    pub fn raw_progress(self, scroll_y: f64) -> f64 {
        (scroll_y - self.start) / (self.end - self.start)
    }

    pub fn len(self) -> f64 {
        self.end - self.start
    }
}

/// Progress of the scroll through a pinned section, for driving the frame
/// scrubber: 0 when the section top reaches the viewport top, 1 when its
/// bottom reaches the viewport bottom. The denominator is floored at 1 so a
/// section no taller than the viewport yields a step, not a division blowup.
pub fn section_progress(sample: ScrollSample, section_doc: Rect) -> f64 {
    let scrollable = (section_doc.height - sample.viewport_h).max(1.0);
    ((sample.scroll_y - section_doc.top) / scrollable).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_inverted_bounds() {
        assert!(TriggerRange::new(10.0, 10.0).is_err());
        assert!(TriggerRange::new(20.0, 10.0).is_err());
        assert!(TriggerRange::new(10.0, 20.0).is_ok());
    }

    #[test]
    fn derivation_matches_worked_example() {
        // Viewport 800, landing fraction 0.18, travel 1100, anchor top 5000.
        let cfg = HandoffConfig::default();
        let sample = ScrollSample::at_y(0.0, 800.0);
        let end = Rect::new(5000.0, 100.0, 180.0, 280.0);

        let range = TriggerRange::from_end_anchor(end, sample, &cfg).unwrap();
        assert_eq!(range.end, 4856.0);
        assert_eq!(range.start, 3756.0);
        assert_eq!(range.len(), 1100.0);
    }

    #[test]
    fn raw_progress_spans_the_range() {
        let range = TriggerRange::new(3756.0, 4856.0).unwrap();
        assert_eq!(range.raw_progress(3756.0), 0.0);
        assert_eq!(range.raw_progress(4856.0), 1.0);
        assert!((range.raw_progress(4323.0) - 0.5154545454545455).abs() < 1e-12);
        assert!(range.raw_progress(3000.0) < 0.0);
    }

    #[test]
    fn section_progress_clamps_and_floors_denominator() {
        let section = Rect::new(1000.0, 0.0, 1280.0, 3000.0);
        let before = ScrollSample::at_y(500.0, 800.0);
        let mid = ScrollSample::at_y(2100.0, 800.0);
        let after = ScrollSample::at_y(9000.0, 800.0);

        assert_eq!(section_progress(before, section), 0.0);
        assert!((section_progress(mid, section) - 0.5).abs() < 1e-12);
        assert_eq!(section_progress(after, section), 1.0);

        // Section shorter than the viewport steps from 0 to 1 without NaN.
        let short = Rect::new(1000.0, 0.0, 1280.0, 400.0);
        assert_eq!(section_progress(before, short), 0.0);
        assert_eq!(section_progress(mid, short), 1.0);
    }
}
