use crate::{
    core::FrameCtx,
    error::{KaleidaError, KaleidaResult},
    layers::{LayerCompositor, LayerSlot, LayerStack, TRAIL_FILL},
    renderable::{RenderableRef, id_of},
    surface::Surface,
    transition::ActiveTransition,
};

/// Composition mode. Exactly one of the two content models is semantically
/// active at any time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Single,
    Layered,
}

/// The orchestrator: tracks the active content, drives fades between single
/// renderables, and owns the layer compositor.
///
/// Single-threaded and frame-driven; every operation is synchronous inside
/// `update` or the explicit setters. The engine starts in single mode with
/// nothing active — the caller sets the first scene explicitly — and runs
/// for the process lifetime.
pub struct SceneEngine {
    mode: Mode,
    current: Option<RenderableRef>,
    transition: Option<ActiveTransition>,
    compositor: LayerCompositor,
    last_time: Option<f64>,
    speed: f64,
}

impl Default for SceneEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneEngine {
    pub fn new() -> Self {
        Self {
            mode: Mode::Single,
            current: None,
            transition: None,
            compositor: LayerCompositor::new(),
            last_time: None,
            speed: 1.0,
        }
    }

    /// Set the global animation-speed multiplier carried into every
    /// [`FrameCtx`]. Must be finite and > 0.
    pub fn set_speed(&mut self, speed: f64) -> KaleidaResult<()> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(KaleidaError::validation(
                "speed multiplier must be finite and > 0",
            ));
        }
        self.speed = speed;
        Ok(())
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Make `next` the active single renderable.
    ///
    /// Any layered composition is cleared first (exiting all occupants).
    /// When a current renderable exists and a transition was requested, a
    /// timed fade starts (or retargets an in-flight one, silently dropping
    /// its pending target); otherwise the swap is synchronous, firing
    /// `on_exit` on the old content and `on_enter` on the new — even when
    /// both are the same reference.
    pub fn set_single(&mut self, next: RenderableRef, with_transition: bool) {
        if self.mode == Mode::Layered {
            self.compositor.clear();
            self.mode = Mode::Single;
        }

        if with_transition && self.current.is_some() {
            match &mut self.transition {
                Some(t) => {
                    tracing::debug!(id = %id_of(&next), "transition retargeted, pending dropped");
                    t.retarget(next);
                }
                None => {
                    tracing::debug!(id = %id_of(&next), "transition started");
                    self.transition = Some(ActiveTransition::new(next));
                }
            }
            return;
        }

        if self.transition.take().is_some() {
            tracing::debug!("in-flight transition abandoned");
        }
        let old = self.current.replace(next.clone());
        tracing::debug!(id = %id_of(&next), "scene swapped");
        if let Some(old) = old {
            old.borrow_mut().on_exit();
        }
        next.borrow_mut().on_enter();
    }

    /// Adopt a layered composition, clearing single-mode state.
    ///
    /// An in-flight transition is abandoned; its pending target never
    /// entered, so no hook fires for it. The current single renderable (if
    /// any) exits, then the new occupants enter in fixed order.
    pub fn set_layered(&mut self, stack: LayerStack) {
        if self.transition.take().is_some() {
            tracing::debug!("in-flight transition abandoned");
        }
        if let Some(old) = self.current.take() {
            old.borrow_mut().on_exit();
        }
        self.compositor.set_composition(stack);
        self.mode = Mode::Layered;
        tracing::debug!(layers = %self.current_description(), "layered mode");
    }

    /// Assign or remove one layer slot, switching to layered mode first if
    /// needed (starting from an empty composition).
    pub fn set_layer_slot(&mut self, slot: LayerSlot, next: Option<RenderableRef>) {
        if self.mode != Mode::Layered {
            if self.transition.take().is_some() {
                tracing::debug!("in-flight transition abandoned");
            }
            if let Some(old) = self.current.take() {
                old.borrow_mut().on_exit();
            }
            self.mode = Mode::Layered;
        }
        self.compositor.set_layer(slot, next);
    }

    /// Per-frame entry point. Advances any active transition by the delta
    /// between frame timestamps, then executes exactly one rendering path:
    /// the transition fade (which temporarily lowers the surface's global
    /// draw opacity, restored afterward), the layer composite, or the plain
    /// single draw. With nothing active only the persistence fill runs.
    #[tracing::instrument(level = "trace", skip(self, surface))]
    pub fn update(&mut self, frame_time: f64, surface: &mut Surface) {
        let dt = self
            .last_time
            .map(|last| (frame_time - last).max(0.0))
            .unwrap_or(0.0);
        self.last_time = Some(frame_time);

        let ctx = FrameCtx {
            time: frame_time,
            dt,
            speed: self.speed(),
        };

        let completed = match &mut self.transition {
            Some(t) => {
                t.advance(dt);
                t.is_complete()
            }
            None => false,
        };
        if completed && let Some(t) = self.transition.take() {
            // Bookkeeping settles before hooks run: the swap is final even
            // if a hook panics.
            let next = t.into_pending();
            let old = self.current.replace(next.clone());
            tracing::debug!(id = %id_of(&next), "transition complete");
            if let Some(old) = old {
                old.borrow_mut().on_exit();
            }
            next.borrow_mut().on_enter();
        }

        if let Some(t) = &self.transition {
            surface.reset_draw_state();
            surface.fill(TRAIL_FILL);
            if let Some(current) = &self.current {
                let current = current.clone();
                surface.set_draw_opacity(t.fade_opacity());
                current.borrow_mut().render(&ctx, surface);
                surface.reset_draw_state();
            }
            return;
        }

        match self.mode {
            Mode::Layered => self.compositor.render(&ctx, surface),
            Mode::Single => {
                surface.reset_draw_state();
                surface.fill(TRAIL_FILL);
                if let Some(current) = &self.current {
                    let current = current.clone();
                    current.borrow_mut().render(&ctx, surface);
                }
            }
        }
    }

    // ---- queries ----

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_layered(&self) -> bool {
        self.mode == Mode::Layered
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// Linear progress of the active transition, if any.
    pub fn transition_progress(&self) -> Option<f64> {
        self.transition.as_ref().map(ActiveTransition::progress)
    }

    /// Identifier of the active content: the single renderable's id, a
    /// composed label of occupied layers, or `"none"`.
    pub fn current_description(&self) -> String {
        match self.mode {
            Mode::Layered => self
                .compositor
                .describe()
                .unwrap_or_else(|| "none".to_owned()),
            Mode::Single => self
                .current
                .as_ref()
                .map(id_of)
                .unwrap_or_else(|| "none".to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_single_idle_with_nothing_active() {
        let engine = SceneEngine::new();
        assert_eq!(engine.mode(), Mode::Single);
        assert!(!engine.is_layered());
        assert!(!engine.is_transitioning());
        assert_eq!(engine.current_description(), "none");
    }

    #[test]
    fn speed_defaults_to_unity_and_validates() {
        let mut engine = SceneEngine::new();
        assert_eq!(engine.speed(), 1.0);
        assert!(engine.set_speed(0.0).is_err());
        assert!(engine.set_speed(f64::NAN).is_err());
        assert!(engine.set_speed(f64::INFINITY).is_err());
        engine.set_speed(2.5).unwrap();
        assert_eq!(engine.speed(), 2.5);
    }
}
