#![forbid(unsafe_code)]

pub mod anim;
pub mod anim_ease;
pub mod core;
pub mod error;
pub mod guide;
pub mod handoff;
pub mod model;
pub mod pipeline;
pub mod raster;
pub mod sequence;
pub mod snapshot;
pub mod trigger;

pub use anim::{Channel, Key, Lerp};
pub use anim_ease::Ease;
pub use core::{Rect, ScrollSample};
pub use error::{ScrollyteError, ScrollyteResult};
pub use handoff::{HandoffEngine, ShadowState, TransformState};
pub use model::{HandoffConfig, Scene, SequenceConfig, ShadowStyle};
pub use pipeline::{PipelineFrame, RedrawCoalescer, ScrollPipeline};
pub use raster::{CoverFit, PreparedFrame, Surface, blit_cover, cover_fit, decode_frame};
pub use sequence::{FrameSequence, LoadProgress, Scrubber, frame_index};
pub use snapshot::{AnchorPair, Snapshot, SnapshotLatch};
pub use trigger::{TriggerRange, section_progress};
