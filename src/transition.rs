use crate::ease::Ease;
use crate::renderable::RenderableRef;

/// Total duration of a scene fade, in seconds of real elapsed time.
///
/// Completion is pinned to accumulated wall-clock deltas, not frame count,
/// so it lands at the same moment across variable frame rates.
pub const TRANSITION_SECS: f64 = 1.0;

/// An in-flight fade from the current renderable to a pending one.
///
/// Only the outgoing renderable is visible while the fade runs; the pending
/// target is revealed whole at completion. Existence of this value is what
/// "a transition is active" means.
pub(crate) struct ActiveTransition {
    elapsed: f64,
    pending: RenderableRef,
}

impl ActiveTransition {
    pub(crate) fn new(pending: RenderableRef) -> Self {
        Self {
            elapsed: 0.0,
            pending,
        }
    }

    /// Accumulate elapsed time. Negative deltas are ignored.
    pub(crate) fn advance(&mut self, dt: f64) {
        self.elapsed += dt.max(0.0);
    }

    /// Linear progress in `[0, 1]`.
    pub(crate) fn progress(&self) -> f64 {
        (self.elapsed / TRANSITION_SECS).min(1.0)
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.elapsed >= TRANSITION_SECS
    }

    /// Opacity for the outgoing renderable: `1 − (1 − p)³`, inverted.
    pub(crate) fn fade_opacity(&self) -> f32 {
        (1.0 - Ease::OutCubic.apply(self.progress())) as f32
    }

    /// Replace the pending target, restarting the fade. The previous pending
    /// renderable is dropped without lifecycle hooks — it never became
    /// active.
    pub(crate) fn retarget(&mut self, pending: RenderableRef) {
        self.pending = pending;
        self.elapsed = 0.0;
    }

    /// Consume the transition, yielding the target to activate.
    pub(crate) fn into_pending(self) -> RenderableRef {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FrameCtx;
    use crate::renderable::{Renderable, shared};
    use crate::surface::Surface;

    struct Null;

    impl Renderable for Null {
        fn id(&self) -> &str {
            "null"
        }
        fn render(&mut self, _ctx: &FrameCtx, _surface: &mut Surface) {}
    }

    #[test]
    fn completes_once_elapsed_reaches_duration() {
        let mut t = ActiveTransition::new(shared(Null));
        t.advance(TRANSITION_SECS * 0.7);
        assert!(!t.is_complete());
        t.advance(TRANSITION_SECS * 0.3);
        assert!(t.is_complete());
        assert_eq!(t.progress(), 1.0);
    }

    #[test]
    fn completion_is_frame_rate_independent() {
        let mut coarse = ActiveTransition::new(shared(Null));
        coarse.advance(TRANSITION_SECS);

        let mut fine = ActiveTransition::new(shared(Null));
        for _ in 0..100 {
            fine.advance(TRANSITION_SECS / 100.0);
        }

        assert!(coarse.is_complete());
        assert!(fine.is_complete());
    }

    #[test]
    fn fade_opacity_is_strictly_decreasing() {
        let mut t = ActiveTransition::new(shared(Null));
        let mut prev = t.fade_opacity();
        assert_eq!(prev, 1.0);
        for _ in 0..9 {
            t.advance(TRANSITION_SECS / 10.0);
            let fade = t.fade_opacity();
            assert!(fade < prev);
            prev = fade;
        }
        t.advance(TRANSITION_SECS / 10.0);
        assert_eq!(t.fade_opacity(), 0.0);
    }

    #[test]
    fn fade_matches_inverted_out_cubic() {
        let mut t = ActiveTransition::new(shared(Null));
        t.advance(TRANSITION_SECS * 0.25);
        let p = t.progress();
        let expect = (1.0 - (1.0 - (1.0 - p).powi(3))) as f32;
        assert!((t.fade_opacity() - expect).abs() < 1e-6);
    }

    #[test]
    fn retarget_resets_elapsed() {
        let mut t = ActiveTransition::new(shared(Null));
        t.advance(TRANSITION_SECS * 0.9);
        t.retarget(shared(Null));
        assert_eq!(t.progress(), 0.0);
        assert!(!t.is_complete());
    }

    #[test]
    fn negative_delta_is_ignored() {
        let mut t = ActiveTransition::new(shared(Null));
        t.advance(-5.0);
        assert_eq!(t.progress(), 0.0);
    }
}
