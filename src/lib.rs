//! Real-time scene composition and transition engine.
//!
//! The engine is a frame-driven state machine: callers hand it externally
//! owned [`Renderable`]s, pick a composition mode (one scene, or up to three
//! depth layers), and call [`SceneEngine::update`] once per display frame.
//! The engine decides what is active, fades between single-scene
//! replacements, and composites layers onto a shared [`Surface`] with fixed
//! per-layer blend and opacity rules.

#![forbid(unsafe_code)]

pub mod clock;
pub mod combo;
pub mod composite;
pub mod core;
pub mod ease;
pub mod engine;
pub mod error;
pub mod layers;
pub mod renderable;
pub mod script;
pub mod surface;
pub mod transition;

pub use clock::FrameClock;
pub use combo::{ComboRenderable, SurfacePool, SurfacePoolOpts};
pub use core::{Canvas, FrameCtx, Rgba8Premul};
pub use ease::Ease;
pub use engine::{Mode, SceneEngine};
pub use error::{KaleidaError, KaleidaResult};
pub use layers::{
    BACKGROUND_OPACITY, LayerCompositor, LayerSlot, LayerStack, MIDDLE_OPACITY, TRAIL_FILL,
};
pub use renderable::{Renderable, RenderableRef, shared};
pub use script::{SceneScript, ScriptAction, TimedCommand};
pub use surface::{BlendMode, Surface};
pub use transition::TRANSITION_SECS;
