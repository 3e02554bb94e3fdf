use std::path::Path;

use crate::{
    error::{ScrollyteError, ScrollyteResult},
    model::SequenceConfig,
    raster::{PreparedFrame, Surface, blit_cover, decode_frame},
};

/// Map clamped scrubber progress to a 0-based frame index.
///
/// `progress = 0` selects the first frame, `progress = 1` the last; the
/// mapping is non-decreasing in progress.
pub fn frame_index(progress: f64, frame_count: u32) -> usize {
    if frame_count == 0 {
        return 0;
    }
    let last = (frame_count - 1) as f64;
    (progress * last).floor().clamp(0.0, last) as usize
}

/// Aggregate preload accounting for a frame sequence.
///
/// A failed load settles the slot just like a success; readiness only
/// requires that every load attempt has been accounted, so one broken frame
/// cannot block the experience.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LoadProgress {
    pub total: u32,
    pub loaded: u32,
    pub failed: u32,
}

impl LoadProgress {
    pub fn new(total: u32) -> Self {
        Self {
            total,
            loaded: 0,
            failed: 0,
        }
    }

    pub fn record_loaded(&mut self) {
        self.loaded += 1;
    }

    pub fn record_failed(&mut self) {
        self.failed += 1;
    }

    /// Settled attempts, successful or not.
    pub fn completed(&self) -> u32 {
        self.loaded + self.failed
    }

    /// Completion fraction in `[0, 1]`, for loading indicators.
    pub fn fraction(&self) -> f64 {
        f64::from(self.completed()) / f64::from(self.total.max(1))
    }

    pub fn is_settled(&self) -> bool {
        self.completed() >= self.total
    }
}

/// A preloaded, ordered raster frame sequence.
///
/// Slots of frames that failed to load stay empty and render as the
/// background if selected.
#[derive(Clone, Debug)]
pub struct FrameSequence {
    frames: Vec<Option<PreparedFrame>>,
    progress: LoadProgress,
}

impl FrameSequence {
    /// Load every frame of `cfg` from disk, rooted at `root`.
    ///
    /// Individual decode/read failures are logged and tolerated; the
    /// returned sequence is always settled.
    pub fn load_from_dir(root: &Path, cfg: &SequenceConfig) -> ScrollyteResult<Self> {
        cfg.validate()?;

        let dir = root.join(&cfg.dir);
        let mut frames = Vec::with_capacity(cfg.frame_count as usize);
        let mut progress = LoadProgress::new(cfg.frame_count);

        for index in 0..cfg.frame_count as usize {
            let path = dir.join(cfg.frame_file_name(index));
            let frame = std::fs::read(&path)
                .map_err(|e| ScrollyteError::asset(format!("read '{}': {e}", path.display())))
                .and_then(|bytes| decode_frame(&bytes));

            match frame {
                Ok(frame) => {
                    progress.record_loaded();
                    frames.push(Some(frame));
                }
                Err(err) => {
                    progress.record_failed();
                    frames.push(None);
                    tracing::warn!(frame = index, %err, "sequence frame failed to load");
                }
            }
        }

        tracing::info!(
            total = progress.total,
            loaded = progress.loaded,
            failed = progress.failed,
            "frame sequence settled"
        );
        Ok(Self { frames, progress })
    }

    /// Build a sequence from already-prepared frames (tests, in-memory
    /// hosts). Empty slots count as failed loads.
    pub fn from_frames(frames: Vec<Option<PreparedFrame>>) -> Self {
        let mut progress = LoadProgress::new(frames.len() as u32);
        for f in &frames {
            if f.is_some() {
                progress.record_loaded();
            } else {
                progress.record_failed();
            }
        }
        Self { frames, progress }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame(&self, index: usize) -> Option<&PreparedFrame> {
        self.frames.get(index).and_then(|f| f.as_ref())
    }

    pub fn progress(&self) -> LoadProgress {
        self.progress
    }

    /// True once every load attempt has settled.
    pub fn is_ready(&self) -> bool {
        self.progress.is_settled()
    }
}

/// Scroll-driven frame scrubber: selects a frame from progress and blits it
/// to an owned surface.
#[derive(Clone, Debug)]
pub struct Scrubber {
    surface: Surface,
    background: [u8; 4],
    last_progress: f64,
}

impl Scrubber {
    pub fn new(background: [u8; 4]) -> Self {
        Self {
            surface: Surface::new(),
            background,
            last_progress: 0.0,
        }
    }

    /// Match the surface to the host canvas. Returns `true` when the backing
    /// buffer was reallocated (the caller should redraw).
    pub fn set_viewport(&mut self, css_w: u32, css_h: u32, scale: f64) -> ScrollyteResult<bool> {
        self.surface.ensure_size(css_w, css_h, scale)
    }

    /// Draw the frame selected by `progress`. Returns the frame index.
    pub fn draw(&mut self, sequence: &FrameSequence, progress: f64) -> ScrollyteResult<usize> {
        self.last_progress = progress;
        let index = frame_index(progress, sequence.len() as u32);
        match sequence.frame(index) {
            Some(frame) => blit_cover(frame, &mut self.surface, self.background)?,
            // Missing frame: accepted degradation, paint the background.
            None => self.surface.fill(self.background),
        }
        Ok(index)
    }

    /// Redraw the current frame after a resize; reuses the last progress
    /// rather than making a new frame decision.
    pub fn redraw(&mut self, sequence: &FrameSequence) -> ScrollyteResult<usize> {
        self.draw(sequence, self.last_progress)
    }

    pub fn last_progress(&self) -> f64 {
        self.last_progress
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn solid(rgba: [u8; 4]) -> PreparedFrame {
        PreparedFrame {
            width: 2,
            height: 2,
            rgba8_premul: Arc::new(rgba.repeat(4)),
        }
    }

    #[test]
    fn frame_index_endpoints_and_monotonicity() {
        assert_eq!(frame_index(0.0, 240), 0);
        assert_eq!(frame_index(1.0, 240), 239);

        let mut last = 0;
        for i in 0..=100 {
            let idx = frame_index(i as f64 / 100.0, 240);
            assert!(idx >= last);
            last = idx;
        }
    }

    #[test]
    fn frame_index_clamps_out_of_domain() {
        assert_eq!(frame_index(-0.5, 240), 0);
        assert_eq!(frame_index(2.0, 240), 239);
        assert_eq!(frame_index(0.5, 1), 0);
    }

    #[test]
    fn load_progress_counts_failures_as_settled() {
        let mut p = LoadProgress::new(4);
        p.record_loaded();
        p.record_failed();
        p.record_loaded();
        assert!(!p.is_settled());
        assert_eq!(p.fraction(), 0.75);

        p.record_failed();
        assert!(p.is_settled());
        assert_eq!(p.fraction(), 1.0);
        assert_eq!(p.loaded, 2);
        assert_eq!(p.failed, 2);
    }

    #[test]
    fn from_frames_accounts_empty_slots() {
        let seq = FrameSequence::from_frames(vec![
            Some(solid([255, 0, 0, 255])),
            None,
            Some(solid([0, 255, 0, 255])),
        ]);
        assert!(seq.is_ready());
        assert_eq!(seq.progress().loaded, 2);
        assert_eq!(seq.progress().failed, 1);
        assert!(seq.frame(1).is_none());
        assert!(seq.frame(2).is_some());
    }

    #[test]
    fn load_from_dir_tolerates_missing_files() {
        let dir = std::env::temp_dir().join("scrollyte-seq-test");
        let seq_dir = dir.join("sequence");
        std::fs::create_dir_all(&seq_dir).unwrap();

        let cfg = SequenceConfig {
            frame_count: 3,
            ext: "png".to_string(),
            ..SequenceConfig::default()
        };

        // Only frame 2 exists on disk.
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([9, 9, 9, 255]));
        img.save(seq_dir.join("frame-002.png")).unwrap();

        let seq = FrameSequence::load_from_dir(&dir, &cfg).unwrap();
        assert!(seq.is_ready());
        assert_eq!(seq.progress().loaded, 1);
        assert_eq!(seq.progress().failed, 2);
        assert!(seq.frame(0).is_none());
        assert!(seq.frame(1).is_some());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn scrubber_draws_selected_frame_and_redraws_idempotently() {
        let red = solid([255, 0, 0, 255]);
        let blue = solid([0, 0, 255, 255]);
        let seq = FrameSequence::from_frames(vec![Some(red), Some(blue)]);

        let mut scrub = Scrubber::new([0, 0, 0, 255]);
        scrub.set_viewport(4, 4, 1.0).unwrap();

        let idx = scrub.draw(&seq, 1.0).unwrap();
        assert_eq!(idx, 1);
        assert_eq!(&scrub.surface().data()[..4], &[0, 0, 255, 255]);

        let before = scrub.surface().data().to_vec();
        let idx = scrub.redraw(&seq).unwrap();
        assert_eq!(idx, 1);
        assert_eq!(scrub.surface().data(), &before[..]);
    }

    #[test]
    fn scrubber_paints_background_for_missing_frame() {
        let seq = FrameSequence::from_frames(vec![None, Some(solid([1, 2, 3, 255]))]);
        let mut scrub = Scrubber::new([50, 60, 70, 255]);
        scrub.set_viewport(2, 2, 1.0).unwrap();

        scrub.draw(&seq, 0.0).unwrap();
        assert_eq!(&scrub.surface().data()[..4], &[50, 60, 70, 255]);
    }
}
