use crate::error::{ScrollyteError, ScrollyteResult};

pub use kurbo::{Affine, Point, Vec2};

/// Axis-aligned rectangle in `top`/`left`/`width`/`height` form.
///
/// The same shape is used in two coordinate frames: viewport-relative (what a
/// host reports for a live anchor) and document-space (viewport-relative plus
/// the scroll offsets at measurement time). [`Rect::to_document`] converts the
/// former into the latter.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    /// Distance from the frame origin to the top edge, in pixels.
    pub top: f64,
    /// Distance from the frame origin to the left edge, in pixels.
    pub left: f64,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    /// Convert a viewport-relative rect into document space by adding the
    /// scroll offsets of `sample`.
    pub fn to_document(self, sample: ScrollSample) -> Self {
        Self {
            top: self.top + sample.scroll_y,
            left: self.left + sample.scroll_x,
            ..self
        }
    }

    /// Convert a document-space rect back into viewport-relative form under
    /// the scroll offsets of `sample`.
    pub fn to_viewport(self, sample: ScrollSample) -> Self {
        Self {
            top: self.top - sample.scroll_y,
            left: self.left - sample.scroll_x,
            ..self
        }
    }

    /// Return `true` when both dimensions are strictly positive.
    pub fn has_area(self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    pub fn validate(self) -> ScrollyteResult<()> {
        if !(self.top.is_finite()
            && self.left.is_finite()
            && self.width.is_finite()
            && self.height.is_finite())
        {
            return Err(ScrollyteError::geometry("Rect fields must be finite"));
        }
        if self.width < 0.0 || self.height < 0.0 {
            return Err(ScrollyteError::geometry(
                "Rect width/height must be >= 0",
            ));
        }
        Ok(())
    }
}

/// One scroll/viewport observation from the host environment.
///
/// All engine state is recomputed from the most recent sample; nothing about
/// the scroll position is retained between ticks.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScrollSample {
    /// Horizontal scroll offset in document pixels.
    pub scroll_x: f64,
    /// Vertical scroll offset in document pixels.
    pub scroll_y: f64,
    /// Viewport width in CSS pixels.
    pub viewport_w: f64,
    /// Viewport height in CSS pixels.
    pub viewport_h: f64,
}

impl ScrollSample {
    pub fn new(scroll_x: f64, scroll_y: f64, viewport_w: f64, viewport_h: f64) -> Self {
        Self {
            scroll_x,
            scroll_y,
            viewport_w,
            viewport_h,
        }
    }

    /// A sample with only the vertical offset set; handy in tests and sweeps.
    pub fn at_y(scroll_y: f64, viewport_h: f64) -> Self {
        Self::new(0.0, scroll_y, 0.0, viewport_h)
    }
}
