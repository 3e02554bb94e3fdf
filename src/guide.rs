//! # Scrollyte guide (v0.1.0)
//!
//! A standalone walkthrough of Scrollyte's architecture and public API.
//! If you are integrating the crate into a host shell, start here.
//!
//! ---
//!
//! ## Core concepts
//!
//! - [`ScrollSample`](crate::ScrollSample): one scroll/viewport observation;
//!   the engine's only time-varying input
//! - [`TriggerRange`](crate::TriggerRange): the scroll interval over which
//!   handoff progress maps from 0 to 1
//! - [`SnapshotLatch`](crate::SnapshotLatch): one-shot capture of the anchor
//!   geometry, with hysteresis on release
//! - [`HandoffEngine`](crate::HandoffEngine): pure per-sample evaluation of
//!   the fall/impact/bounce/settle trajectory into a
//!   [`TransformState`](crate::TransformState)
//! - [`FrameSequence`](crate::FrameSequence) + [`Scrubber`](crate::Scrubber):
//!   preloaded raster frames selected by progress and blitted cover-fit
//! - [`ScrollPipeline`](crate::ScrollPipeline): per-tick orchestration of all
//!   of the above
//!
//! The per-tick flow is explicitly staged:
//!
//! 1. Derive the trigger range when the end anchor is (re)established:
//!    [`ScrollPipeline::end_anchor_established`](crate::ScrollPipeline::end_anchor_established)
//! 2. Feed each scroll sample:
//!    [`ScrollPipeline::tick`](crate::ScrollPipeline::tick)
//! 3. Drain at most one scrubber draw per display tick:
//!    [`ScrollPipeline::take_scheduled_draw`](crate::ScrollPipeline::take_scheduled_draw)
//!
//! ---
//!
//! ## "No hidden state" (and why)
//!
//! Scrollyte wants every painted pixel to be reproducible from (snapshot,
//! trigger range, sample). The latch's snapshot slot and the trigger range
//! are the only mutable state in the system; everything downstream is a pure
//! function, so a scripted sweep of samples replays bit-identically. That is
//! what the determinism tests in `tests/handoff_determinism.rs` check.
//!
//! The snapshot is deliberately a point-in-time measurement: source anchors
//! may keep moving under layout changes while the animation plays, and
//! re-measuring mid-flight would feed that jitter straight into the
//! trajectory.
//!
//! ---
//!
//! ## Premultiplied alpha (the pixel contract)
//!
//! Frames are premultiplied at decode ([`decode_frame`](crate::decode_frame))
//! and [`Surface`](crate::Surface) holds premultiplied RGBA8. Treat surface
//! data as premultiplied unless stated otherwise.
//!
//! ---
//!
//! ## Driving it offline
//!
//! The `scrollyte` binary evaluates a [`Scene`](crate::Scene) document
//! without a host: `sweep` prints one evaluated transform per scroll step as
//! JSON lines, and `frame` preloads the configured frame sequence and blits
//! one cover-fit frame to a PNG.
