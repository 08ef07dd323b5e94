use std::cell::RefCell;
use std::rc::Rc;

use crate::{core::FrameCtx, surface::Surface};

/// A named unit of visual content.
///
/// Drawing is mandatory; the lifecycle hooks are optional and default to
/// no-ops. The engine references renderables, it never creates or destroys
/// them — construction and teardown belong to the caller.
///
/// Hook contract: `on_enter` fires exactly once when the renderable becomes
/// active, `on_exit` exactly once when it stops being active. The engine
/// settles its own bookkeeping before invoking either, so a panicking hook
/// cannot leave engine state inconsistent.
pub trait Renderable {
    /// Stable identifier, surfaced through `current_description()`.
    fn id(&self) -> &str;

    /// Paint one frame onto the surface, honoring its current draw state.
    fn render(&mut self, ctx: &FrameCtx, surface: &mut Surface);

    /// Called when this renderable becomes active.
    fn on_enter(&mut self) {}

    /// Called when this renderable stops being active.
    fn on_exit(&mut self) {}
}

/// Shared handle to an externally owned renderable.
pub type RenderableRef = Rc<RefCell<dyn Renderable>>;

/// Wrap a renderable into a shareable handle.
pub fn shared<R: Renderable + 'static>(renderable: R) -> RenderableRef {
    Rc::new(RefCell::new(renderable))
}

/// Identifier of a shared renderable, cloned out of the borrow.
pub(crate) fn id_of(renderable: &RenderableRef) -> String {
    renderable.borrow().id().to_owned()
}
