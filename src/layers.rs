use crate::{
    core::{FrameCtx, Rgba8Premul},
    error::{KaleidaError, KaleidaResult},
    renderable::{RenderableRef, id_of},
    surface::{BlendMode, Surface},
};

/// Fixed opacity for the background layer (normal blending).
pub const BACKGROUND_OPACITY: f32 = 0.6;

/// Fixed opacity for the middle layer (additive blending).
pub const MIDDLE_OPACITY: f32 = 0.8;

/// Low-opacity black flooded over the surface before layers draw, leaving a
/// persistence/trail of previous frames instead of a hard clear.
pub const TRAIL_FILL: Rgba8Premul = Rgba8Premul {
    r: 0,
    g: 0,
    b: 0,
    a: 26,
};

/// One of the three fixed depth positions in a layered composition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerSlot {
    Background,
    Middle,
    Foreground,
}

impl LayerSlot {
    /// All slots in draw order. This order is fixed; compositing and hook
    /// ordering both depend on it.
    pub const ALL: [LayerSlot; 3] = [
        LayerSlot::Background,
        LayerSlot::Middle,
        LayerSlot::Foreground,
    ];

    fn index(self) -> usize {
        match self {
            Self::Background => 0,
            Self::Middle => 1,
            Self::Foreground => 2,
        }
    }

    /// Short label used in composed scene descriptions.
    pub fn label(self) -> &'static str {
        match self {
            Self::Background => "bg",
            Self::Middle => "mid",
            Self::Foreground => "fg",
        }
    }

    /// Parse a slot name. Accepts the canonical names and their short
    /// aliases; anything else is caller misuse, rejected at the boundary.
    pub fn parse(s: &str) -> KaleidaResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "background" | "bg" => Ok(Self::Background),
            "middle" | "mid" => Ok(Self::Middle),
            "foreground" | "fg" => Ok(Self::Foreground),
            other => Err(KaleidaError::validation(format!(
                "unknown layer slot '{other}'"
            ))),
        }
    }

    fn draw_state(self) -> (f32, BlendMode) {
        match self {
            Self::Background => (BACKGROUND_OPACITY, BlendMode::Normal),
            Self::Middle => (MIDDLE_OPACITY, BlendMode::Add),
            Self::Foreground => (1.0, BlendMode::Normal),
        }
    }
}

/// A layered composition: up to three renderables keyed by slot.
#[derive(Clone, Default)]
pub struct LayerStack {
    slots: [Option<RenderableRef>; 3],
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, slot: LayerSlot, renderable: RenderableRef) -> Self {
        self.slots[slot.index()] = Some(renderable);
        self
    }

    pub fn set(&mut self, slot: LayerSlot, renderable: Option<RenderableRef>) {
        self.slots[slot.index()] = renderable;
    }

    pub fn get(&self, slot: LayerSlot) -> Option<&RenderableRef> {
        self.slots[slot.index()].as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Occupied slots in fixed draw order.
    pub fn occupied(&self) -> impl Iterator<Item = (LayerSlot, &RenderableRef)> {
        LayerSlot::ALL
            .iter()
            .filter_map(|&slot| self.slots[slot.index()].as_ref().map(|r| (slot, r)))
    }
}

/// Renders a [`LayerStack`] in fixed order with per-layer blend and opacity,
/// and owns the lifecycle hooks of slot occupants.
#[derive(Default)]
pub struct LayerCompositor {
    stack: LayerStack,
}

impl LayerCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stack(&self) -> &LayerStack {
        &self.stack
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Assign or remove a slot occupant. The replaced renderable (if any)
    /// exits, then the new one enters. Bookkeeping settles before either
    /// hook runs.
    pub fn set_layer(&mut self, slot: LayerSlot, next: Option<RenderableRef>) {
        let old = std::mem::replace(&mut self.stack.slots[slot.index()], next.clone());

        if let Some(old) = old {
            tracing::debug!(slot = slot.label(), id = %id_of(&old), "layer exit");
            old.borrow_mut().on_exit();
        }
        if let Some(next) = next {
            tracing::debug!(slot = slot.label(), id = %id_of(&next), "layer enter");
            next.borrow_mut().on_enter();
        }
    }

    /// Replace all three slots atomically: every previous occupant exits
    /// first, then the new occupants enter in background→middle→foreground
    /// order.
    pub fn set_composition(&mut self, next: LayerStack) {
        let old = std::mem::replace(&mut self.stack, next);

        for slot in LayerSlot::ALL {
            if let Some(r) = &old.slots[slot.index()] {
                tracing::debug!(slot = slot.label(), id = %id_of(r), "layer exit");
                r.borrow_mut().on_exit();
            }
        }
        for slot in LayerSlot::ALL {
            if let Some(r) = self.stack.get(slot) {
                let r = r.clone();
                tracing::debug!(slot = slot.label(), id = %id_of(&r), "layer enter");
                r.borrow_mut().on_enter();
            }
        }
    }

    /// Exit every occupant and leave all slots empty.
    pub fn clear(&mut self) {
        self.set_composition(LayerStack::default());
    }

    /// Composed label of occupied layers, e.g. `"bg:X | fg:Y"`. `None` when
    /// no slot is occupied.
    pub fn describe(&self) -> Option<String> {
        let parts: Vec<String> = self
            .stack
            .occupied()
            .map(|(slot, r)| format!("{}:{}", slot.label(), id_of(r)))
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" | "))
        }
    }

    /// Render the composition: mandatory persistence fill, then each
    /// occupied layer in fixed order with its own draw state. State is reset
    /// after every layer so settings never leak to the next one. Absent
    /// layers neither clear nor contribute.
    pub fn render(&mut self, ctx: &FrameCtx, surface: &mut Surface) {
        surface.reset_draw_state();
        surface.fill(TRAIL_FILL);

        for slot in LayerSlot::ALL {
            let Some(r) = self.stack.get(slot) else {
                continue;
            };
            let r = r.clone();
            let (opacity, blend) = slot.draw_state();
            surface.set_draw_opacity(opacity);
            surface.set_blend(blend);
            r.borrow_mut().render(ctx, surface);
            surface.reset_draw_state();
        }
    }
}
