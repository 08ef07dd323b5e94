use crate::error::{KaleidaError, KaleidaResult};

/// Output surface dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create validated dimensions (both must be > 0).
    pub fn new(width: u32, height: u32) -> KaleidaResult<Self> {
        if width == 0 || height == 0 {
            return Err(KaleidaError::validation("canvas width/height must be > 0"));
        }
        Ok(Self { width, height })
    }

    /// Pixel count.
    pub fn area(self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// RGBA8 byte count.
    pub fn byte_len(self) -> usize {
        self.area() * 4
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    pub(crate) fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Per-frame draw context handed to every renderable.
///
/// `speed` is the global animation-speed multiplier. It travels here, as an
/// explicit per-frame value, so independent renderables never coordinate
/// through process-wide state. Transition timing ignores it (§5 wall-clock
/// rule lives in the engine).
#[derive(Clone, Copy, Debug)]
pub struct FrameCtx {
    /// Frame timestamp in seconds, monotonically non-decreasing.
    pub time: f64,
    /// Seconds elapsed since the previous frame.
    pub dt: f64,
    /// Animation-speed multiplier, finite and > 0.
    pub speed: f64,
}

impl FrameCtx {
    /// Scaled delta: `dt * speed`. What most renderables advance by.
    pub fn scaled_dt(&self) -> f64 {
        self.dt * self.speed
    }
}
