use crate::{
    composite,
    core::{Canvas, Rgba8Premul},
    error::{KaleidaError, KaleidaResult},
};

/// Pixel blend mode for paint operations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Source-over: opaque writes replace what is underneath.
    #[default]
    Normal,
    /// Additive: source light accumulates onto the destination, clamped.
    Add,
}

/// A CPU frame buffer of premultiplied RGBA8 pixels plus the mutable draw
/// state (global opacity, blend mode) that every paint operation honors.
///
/// The surface is the single shared resource all renderables draw onto in
/// sequence; draw order is the synchronization mechanism.
pub struct Surface {
    canvas: Canvas,
    data: Vec<u8>,
    opacity: f32,
    blend: BlendMode,
}

impl Surface {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            data: vec![0u8; canvas.byte_len()],
            opacity: 1.0,
            blend: BlendMode::Normal,
        }
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn width(&self) -> u32 {
        self.canvas.width
    }

    pub fn height(&self) -> u32 {
        self.canvas.height
    }

    /// RGBA8 bytes, tightly packed, row-major, premultiplied.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    // ---- draw state ----

    pub fn draw_opacity(&self) -> f32 {
        self.opacity
    }

    /// Set the global draw opacity, clamped to `[0, 1]`.
    pub fn set_draw_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn blend(&self) -> BlendMode {
        self.blend
    }

    pub fn set_blend(&mut self, blend: BlendMode) {
        self.blend = blend;
    }

    /// Restore the default draw state: opacity 1.0, normal blending.
    pub fn reset_draw_state(&mut self) {
        self.opacity = 1.0;
        self.blend = BlendMode::Normal;
    }

    // ---- paint operations ----

    /// Overwrite every pixel with `px`, ignoring draw state.
    pub fn clear(&mut self, px: Rgba8Premul) {
        for d in self.data.chunks_exact_mut(4) {
            d.copy_from_slice(&px.to_array());
        }
    }

    /// Blend `px` over the whole surface, honoring the current draw state.
    pub fn fill(&mut self, px: Rgba8Premul) {
        let src = px.to_array();
        let (opacity, blend) = (self.opacity, self.blend);
        for d in self.data.chunks_exact_mut(4) {
            let dst = [d[0], d[1], d[2], d[3]];
            d.copy_from_slice(&blend_px(blend, dst, src, opacity));
        }
    }

    /// Blend `px` over an axis-aligned rectangle, clipped to the surface,
    /// honoring the current draw state.
    pub fn fill_rect(&mut self, x: i64, y: i64, w: u32, h: u32, px: Rgba8Premul) {
        let (sw, sh) = (self.canvas.width as i64, self.canvas.height as i64);
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + w as i64).min(sw);
        let y1 = (y + h as i64).min(sh);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let src = px.to_array();
        let (opacity, blend) = (self.opacity, self.blend);
        for yy in y0..y1 {
            let row = (yy as usize) * (sw as usize) * 4;
            for xx in x0..x1 {
                let idx = row + (xx as usize) * 4;
                let d = &mut self.data[idx..idx + 4];
                let dst = [d[0], d[1], d[2], d[3]];
                d.copy_from_slice(&blend_px(blend, dst, src, opacity));
            }
        }
    }

    /// Read a pixel. `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8Premul> {
        if x >= self.canvas.width || y >= self.canvas.height {
            return None;
        }
        let idx = ((y as usize) * (self.canvas.width as usize) + x as usize) * 4;
        let d = &self.data[idx..idx + 4];
        Some(Rgba8Premul {
            r: d[0],
            g: d[1],
            b: d[2],
            a: d[3],
        })
    }

    /// Blend another surface of identical dimensions onto this one, honoring
    /// this surface's draw state.
    pub fn composite_from(&mut self, src: &Surface) -> KaleidaResult<()> {
        if src.canvas != self.canvas {
            return Err(KaleidaError::render(
                "composite_from expects surfaces of identical dimensions",
            ));
        }
        match self.blend {
            BlendMode::Normal => composite::over_in_place(&mut self.data, &src.data, self.opacity),
            BlendMode::Add => composite::add_in_place(&mut self.data, &src.data, self.opacity),
        }
    }
}

fn blend_px(
    blend: BlendMode,
    dst: composite::PremulRgba8,
    src: composite::PremulRgba8,
    opacity: f32,
) -> composite::PremulRgba8 {
    match blend {
        BlendMode::Normal => composite::over(dst, src, opacity),
        BlendMode::Add => composite::add(dst, src, opacity),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface_2x2() -> Surface {
        Surface::new(Canvas::new(2, 2).unwrap())
    }

    fn opaque(r: u8, g: u8, b: u8) -> Rgba8Premul {
        Rgba8Premul { r, g, b, a: 255 }
    }

    #[test]
    fn new_surface_is_transparent() {
        let s = surface_2x2();
        assert!(s.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn clear_ignores_draw_state() {
        let mut s = surface_2x2();
        s.set_draw_opacity(0.0);
        s.clear(opaque(5, 6, 7));
        assert_eq!(s.pixel(1, 1).unwrap(), opaque(5, 6, 7));
    }

    #[test]
    fn fill_honors_opacity() {
        let mut s = surface_2x2();
        s.clear(opaque(0, 0, 0));
        s.set_draw_opacity(0.5);
        s.fill(opaque(255, 255, 255));
        let px = s.pixel(0, 0).unwrap();
        assert!(px.r > 100 && px.r < 155);
    }

    #[test]
    fn fill_rect_clips_to_surface() {
        let mut s = surface_2x2();
        s.fill_rect(-1, -1, 2, 2, opaque(255, 0, 0));
        assert_eq!(s.pixel(0, 0).unwrap(), opaque(255, 0, 0));
        assert_eq!(s.pixel(1, 1).unwrap(), Rgba8Premul::transparent());
    }

    #[test]
    fn fill_rect_fully_outside_is_noop() {
        let mut s = surface_2x2();
        s.fill_rect(5, 5, 3, 3, opaque(255, 0, 0));
        assert!(s.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn additive_fill_saturates() {
        let mut s = surface_2x2();
        s.clear(opaque(200, 0, 0));
        s.set_blend(BlendMode::Add);
        s.fill(opaque(100, 0, 0));
        assert_eq!(s.pixel(0, 0).unwrap().r, 255);
    }

    #[test]
    fn reset_draw_state_restores_defaults() {
        let mut s = surface_2x2();
        s.set_draw_opacity(0.3);
        s.set_blend(BlendMode::Add);
        s.reset_draw_state();
        assert_eq!(s.draw_opacity(), 1.0);
        assert_eq!(s.blend(), BlendMode::Normal);
    }

    #[test]
    fn composite_from_rejects_size_mismatch() {
        let mut a = surface_2x2();
        let b = Surface::new(Canvas::new(3, 3).unwrap());
        assert!(a.composite_from(&b).is_err());
    }

    #[test]
    fn composite_from_blends_source_over() {
        let mut a = surface_2x2();
        a.clear(opaque(0, 0, 0));
        let mut b = surface_2x2();
        b.clear(opaque(0, 255, 0));
        a.composite_from(&b).unwrap();
        assert_eq!(a.pixel(0, 0).unwrap(), opaque(0, 255, 0));
    }
}
