use crate::{
    core::{Rect, ScrollSample},
    error::ScrollyteResult,
    handoff::{HandoffEngine, TransformState},
    model::HandoffConfig,
    snapshot::{AnchorPair, SnapshotLatch},
    trigger::{TriggerRange, section_progress},
};

/// Everything computed for one scroll sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PipelineFrame {
    pub transform: TransformState,
    /// Scrubber progress through the pinned section, when one is tracked.
    pub scrub_progress: Option<f64>,
}

/// Coalesces scrubber draw requests so a burst of scroll samples produces at
/// most one draw per display tick: each schedule replaces the pending one,
/// and the consumer drains at its own cadence.
#[derive(Clone, Copy, Debug, Default)]
pub struct RedrawCoalescer {
    pending: Option<f64>,
}

impl RedrawCoalescer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, progress: f64) {
        self.pending = Some(progress);
    }

    /// Take the most recent scheduled progress, leaving the slot empty.
    pub fn take(&mut self) -> Option<f64> {
        self.pending.take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Per-tick orchestration of the whole experience.
///
/// Owns the only mutable state in the system (the snapshot latch and the
/// current trigger range); everything else is recomputed from the sample
/// passed into [`ScrollPipeline::tick`].
#[derive(Clone, Debug)]
pub struct ScrollPipeline {
    engine: HandoffEngine,
    latch: SnapshotLatch,
    trigger: Option<TriggerRange>,
    scrub_section: Option<Rect>,
    coalescer: RedrawCoalescer,
}

impl ScrollPipeline {
    pub fn new(cfg: HandoffConfig) -> ScrollyteResult<Self> {
        Ok(Self {
            engine: HandoffEngine::new(cfg)?,
            latch: SnapshotLatch::new(),
            trigger: None,
            scrub_section: None,
            coalescer: RedrawCoalescer::new(),
        })
    }

    /// Track a pinned section (document space) as the scrubber's progress
    /// source.
    pub fn set_scrub_section(&mut self, section: Rect) {
        self.scrub_section = Some(section);
    }

    /// (Re)establish the end anchor from its live viewport-relative rect and
    /// derive the trigger range. Called when the anchor becomes available,
    /// not on every sample.
    pub fn end_anchor_established(
        &mut self,
        end_anchor_view: Rect,
        sample: ScrollSample,
    ) -> ScrollyteResult<()> {
        let doc = end_anchor_view.to_document(sample);
        let range = TriggerRange::from_end_anchor(doc, sample, self.engine.config())?;
        tracing::debug!(start = range.start, end = range.end, "trigger range derived");
        self.trigger = Some(range);
        Ok(())
    }

    /// Advance the pipeline by one scroll sample.
    #[tracing::instrument(level = "trace", skip_all, fields(scroll_y = sample.scroll_y))]
    pub fn tick(&mut self, sample: ScrollSample, anchors: Option<&AnchorPair>) -> PipelineFrame {
        let transform = match self.trigger {
            Some(range) => {
                let snapshot = self
                    .latch
                    .update(sample, range, anchors, self.engine.config())
                    .copied();
                self.engine.evaluate(snapshot.as_ref(), range, sample)
            }
            None => TransformState::default(),
        };

        let scrub_progress = self
            .scrub_section
            .map(|section| section_progress(sample, section));
        if let Some(p) = scrub_progress {
            self.coalescer.schedule(p);
        }

        PipelineFrame {
            transform,
            scrub_progress,
        }
    }

    /// Drain the coalesced scrubber draw for this display tick, if any.
    pub fn take_scheduled_draw(&mut self) -> Option<f64> {
        self.coalescer.take()
    }

    pub fn trigger(&self) -> Option<TriggerRange> {
        self.trigger
    }

    pub fn is_ready(&self) -> bool {
        self.latch.is_ready()
    }

    pub fn engine(&self) -> &HandoffEngine {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchors() -> AnchorPair {
        AnchorPair {
            start: Rect::new(120.0, 500.0, 220.0, 340.0),
            end: Rect::new(300.0, 180.0, 180.0, 280.0),
        }
    }

    fn pipeline_with_trigger() -> ScrollPipeline {
        let mut p = ScrollPipeline::new(HandoffConfig::default()).unwrap();
        // End anchor seen 5000px into the document while parked at the top.
        let sample = ScrollSample::at_y(0.0, 800.0);
        p.end_anchor_established(Rect::new(5000.0, 180.0, 180.0, 280.0), sample)
            .unwrap();
        p
    }

    #[test]
    fn no_trigger_yields_inert_frames() {
        let mut p = ScrollPipeline::new(HandoffConfig::default()).unwrap();
        let f = p.tick(ScrollSample::at_y(4000.0, 800.0), Some(&anchors()));
        assert!(!f.transform.is_ready);
        assert_eq!(f.transform.opacity, 0.0);
    }

    #[test]
    fn trigger_derivation_matches_worked_example() {
        let p = pipeline_with_trigger();
        let range = p.trigger().unwrap();
        assert_eq!(range.start, 3756.0);
        assert_eq!(range.end, 4856.0);
    }

    #[test]
    fn capture_then_animate_then_reset() {
        let mut p = pipeline_with_trigger();
        let a = anchors();

        let before = p.tick(ScrollSample::at_y(1000.0, 800.0), Some(&a));
        assert!(!before.transform.is_ready);

        let inside = p.tick(ScrollSample::at_y(4000.0, 800.0), Some(&a));
        assert!(inside.transform.is_ready);
        assert!(inside.transform.overlay_active);
        assert!(p.is_ready());

        // Far above the hysteresis threshold: snapshot released.
        let reset = p.tick(ScrollSample::at_y(100.0, 800.0), Some(&a));
        assert!(!reset.transform.is_ready);
        assert!(!p.is_ready());
    }

    #[test]
    fn repeated_ticks_reuse_one_snapshot() {
        let mut p = pipeline_with_trigger();
        let a = anchors();

        let first = p.tick(ScrollSample::at_y(4000.0, 800.0), Some(&a));
        // Anchor moves afterwards; the flight must not be re-measured.
        let moved = AnchorPair {
            start: Rect::new(0.0, 0.0, 220.0, 340.0),
            end: Rect::new(0.0, 0.0, 180.0, 280.0),
        };
        let second = p.tick(ScrollSample::at_y(4000.0, 800.0), Some(&moved));
        assert_eq!(first.transform, second.transform);
    }

    #[test]
    fn scrub_progress_tracks_section_and_coalesces() {
        let mut p = pipeline_with_trigger();
        p.set_scrub_section(Rect::new(0.0, 0.0, 1280.0, 2400.0));

        let f = p.tick(ScrollSample::at_y(800.0, 800.0), None);
        assert!((f.scrub_progress.unwrap() - 0.5).abs() < 1e-12);

        p.tick(ScrollSample::at_y(400.0, 800.0), None);
        p.tick(ScrollSample::at_y(1600.0, 800.0), None);

        // Only the most recent progress survives the burst.
        assert_eq!(p.take_scheduled_draw(), Some(1.0));
        assert_eq!(p.take_scheduled_draw(), None);
    }
}
