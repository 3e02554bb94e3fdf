use std::sync::Arc;

use anyhow::Context;

use crate::error::{ScrollyteError, ScrollyteResult};

/// One decoded raster frame.
#[derive(Clone, Debug)]
pub struct PreparedFrame {
    pub width: u32,
    pub height: u32,
    /// Premultiplied RGBA8, row-major, tightly packed.
    pub rgba8_premul: Arc<Vec<u8>>,
}

pub fn decode_frame(bytes: &[u8]) -> ScrollyteResult<PreparedFrame> {
    let dyn_img = image::load_from_memory(bytes).context("decode frame from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedFrame {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

fn premul_rgba8(rgba: [u8; 4]) -> [u8; 4] {
    let [r, g, b, a] = rgba;
    let mul = |c: u8| ((c as u16 * a as u16 + 127) / 255) as u8;
    [mul(r), mul(g), mul(b), a]
}

/// Cover-fit placement of a frame on a surface: the frame is scaled to fully
/// cover the surface while preserving aspect ratio, cropping the excess
/// dimension. Offsets can be negative (the cropped overhang).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverFit {
    pub offset_x: f64,
    pub offset_y: f64,
    pub draw_w: f64,
    pub draw_h: f64,
}

pub fn cover_fit(frame_w: u32, frame_h: u32, surf_w: u32, surf_h: u32) -> CoverFit {
    if frame_w == 0 || frame_h == 0 || surf_w == 0 || surf_h == 0 {
        return CoverFit {
            offset_x: 0.0,
            offset_y: 0.0,
            draw_w: 0.0,
            draw_h: 0.0,
        };
    }

    let aspect = frame_w as f64 / frame_h as f64;
    let canvas_aspect = surf_w as f64 / surf_h as f64;

    if canvas_aspect > aspect {
        // Surface is relatively wider: fit width, center-crop height.
        let draw_w = surf_w as f64;
        let draw_h = draw_w / aspect;
        CoverFit {
            offset_x: 0.0,
            offset_y: (surf_h as f64 - draw_h) / 2.0,
            draw_w,
            draw_h,
        }
    } else {
        // Surface is relatively taller: fit height, center-crop width.
        let draw_h = surf_h as f64;
        let draw_w = draw_h * aspect;
        CoverFit {
            offset_x: (surf_w as f64 - draw_w) / 2.0,
            offset_y: 0.0,
            draw_w,
            draw_h,
        }
    }
}

/// Pixel-density-aware drawing surface.
///
/// The physical buffer is the CSS size times the device scale factor and is
/// reallocated only when either changes; repeated draws at a stable size
/// reuse the allocation.
#[derive(Clone, Debug, Default)]
pub struct Surface {
    css_width: u32,
    css_height: u32,
    scale: f64,
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match the surface to a CSS size and device scale factor.
    ///
    /// Returns `true` when the physical buffer was reallocated.
    pub fn ensure_size(&mut self, css_w: u32, css_h: u32, scale: f64) -> ScrollyteResult<bool> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(ScrollyteError::validation(
                "surface scale factor must be > 0",
            ));
        }
        if css_w == self.css_width && css_h == self.css_height && scale == self.scale {
            return Ok(false);
        }

        let width = (css_w as f64 * scale).round() as u32;
        let height = (css_h as f64 * scale).round() as u32;
        self.css_width = css_w;
        self.css_height = css_h;
        self.scale = scale;
        self.width = width;
        self.height = height;
        self.data = vec![0; width as usize * height as usize * 4];
        Ok(true)
    }

    /// Fill the whole surface with a straight-alpha color.
    pub fn fill(&mut self, rgba: [u8; 4]) {
        let premul = premul_rgba8(rgba);
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&premul);
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn css_size(&self) -> (u32, u32) {
        (self.css_width, self.css_height)
    }

    /// Premultiplied RGBA8 pixels, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Draw `frame` onto `surface` with cover-fit geometry over a background
/// fill, sampling bilinearly.
pub fn blit_cover(
    frame: &PreparedFrame,
    surface: &mut Surface,
    background: [u8; 4],
) -> ScrollyteResult<()> {
    if surface.is_empty() {
        return Ok(());
    }
    let expected = frame.width as usize * frame.height as usize * 4;
    if frame.rgba8_premul.len() != expected {
        return Err(ScrollyteError::asset("frame byte length mismatch"));
    }

    surface.fill(background);
    let fit = cover_fit(frame.width, frame.height, surface.width, surface.height);
    if fit.draw_w <= 0.0 || fit.draw_h <= 0.0 {
        return Ok(());
    }

    let src = frame.rgba8_premul.as_slice();
    let dst_w = surface.width as usize;
    for (i, dst_px) in surface.data.chunks_exact_mut(4).enumerate() {
        let px = (i % dst_w) as f64;
        let py = (i / dst_w) as f64;
        let sx = ((px + 0.5) - fit.offset_x) / fit.draw_w * frame.width as f64 - 0.5;
        let sy = ((py + 0.5) - fit.offset_y) / fit.draw_h * frame.height as f64 - 0.5;
        let texel = bilinear(src, frame.width, frame.height, sx, sy);
        let out = over([dst_px[0], dst_px[1], dst_px[2], dst_px[3]], texel);
        dst_px.copy_from_slice(&out);
    }
    Ok(())
}

/// Source-over for premultiplied RGBA8.
fn over(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    if src[3] == 255 {
        return src;
    }
    if src[3] == 0 {
        return dst;
    }
    let inv = 255u16 - src[3] as u16;
    let mut out = [0u8; 4];
    for i in 0..4 {
        let blended = src[i] as u16 + ((dst[i] as u16 * inv + 127) / 255);
        out[i] = blended.min(255) as u8;
    }
    out
}

fn bilinear(src: &[u8], width: u32, height: u32, sx: f64, sy: f64) -> [u8; 4] {
    let max_x = (width - 1) as f64;
    let max_y = (height - 1) as f64;
    let xf = sx.clamp(0.0, max_x);
    let yf = sy.clamp(0.0, max_y);

    let x0 = xf.floor() as u32;
    let y0 = yf.floor() as u32;
    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);
    let fx = xf - x0 as f64;
    let fy = yf - y0 as f64;

    let texel = |x: u32, y: u32| -> [u8; 4] {
        let off = (y as usize * width as usize + x as usize) * 4;
        [src[off], src[off + 1], src[off + 2], src[off + 3]]
    };

    let (t00, t10, t01, t11) = (texel(x0, y0), texel(x1, y0), texel(x0, y1), texel(x1, y1));
    let mut out = [0u8; 4];
    for i in 0..4 {
        let top = t00[i] as f64 * (1.0 - fx) + t10[i] as f64 * fx;
        let bot = t01[i] as f64 * (1.0 - fx) + t11[i] as f64 * fx;
        out[i] = (top * (1.0 - fy) + bot * fy).round().clamp(0.0, 255.0) as u8;
    }
    out
}
