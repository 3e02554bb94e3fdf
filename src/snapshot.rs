use crate::{
    core::{Rect, ScrollSample},
    model::HandoffConfig,
    trigger::TriggerRange,
};

/// The frozen geometry pair for one activation cycle.
///
/// Captured once when the scroll enters the trigger window and then held
/// untouched through the whole fall, even if the source anchors keep moving
/// under layout changes. Locking the animation to a point-in-time measurement
/// keeps it free of reflow jitter.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Snapshot {
    /// Document-space rect of the start anchor at capture time.
    pub start: Rect,
    /// Document-space rect of the end anchor at capture time.
    pub end: Rect,
}

/// Live viewport-relative rects of both anchors, as reported by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnchorPair {
    pub start: Rect,
    pub end: Rect,
}

/// One-shot capture latch for the anchor geometry.
///
/// Two states: Idle (no snapshot) and Captured (exactly one live snapshot).
/// Capture fires when the scroll enters the trigger window with both anchors
/// measurable; release requires retreating a full hysteresis distance below
/// the window start, so oscillation near the boundary cannot flicker the
/// state. Repeated samples inside the window are no-ops.
#[derive(Clone, Debug, Default)]
pub struct SnapshotLatch {
    slot: Option<Snapshot>,
    generation: u64,
}

impl SnapshotLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one scroll sample. Returns the latched snapshot, if any.
    ///
    /// `anchors` carries the anchors' live viewport-relative rects when the
    /// host can measure them; `None` (or a zero-area start anchor) skips
    /// capture silently.
    pub fn update(
        &mut self,
        sample: ScrollSample,
        range: TriggerRange,
        anchors: Option<&AnchorPair>,
        cfg: &HandoffConfig,
    ) -> Option<&Snapshot> {
        let past_start = sample.scroll_y >= range.start;
        let past_window = sample.scroll_y > range.end + cfg.capture_slack;

        if self.slot.is_none()
            && past_start
            && !past_window
            && let Some(anchors) = anchors
            && anchors.start.has_area()
            && anchors.end.has_area()
        {
            self.slot = Some(Snapshot {
                start: anchors.start.to_document(sample),
                end: anchors.end.to_document(sample),
            });
            self.generation += 1;
            tracing::debug!(
                generation = self.generation,
                scroll_y = sample.scroll_y,
                "anchor geometry captured"
            );
        }

        if self.slot.is_some() && sample.scroll_y < range.start - cfg.hysteresis {
            self.slot = None;
            tracing::debug!(scroll_y = sample.scroll_y, "snapshot released");
        }

        self.slot.as_ref()
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.slot.as_ref()
    }

    /// True once a snapshot is latched; gates rendering of the animated
    /// element so it never shows un-positioned.
    pub fn is_ready(&self) -> bool {
        self.slot.is_some()
    }

    /// Number of captures performed over the latch's lifetime.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn reset(&mut self) {
        self.slot = None;
    }
}
