//! Cycles two scenes through timed fades and dumps a handful of PNG frames.
//!
//! Run with `cargo run --example fade_cycle`.

use anyhow::Context as _;
use kaleida::{
    Canvas, FrameCtx, Renderable, Rgba8Premul, SceneEngine, Surface, TRANSITION_SECS, shared,
};

struct Solid {
    name: &'static str,
    px: Rgba8Premul,
}

impl Renderable for Solid {
    fn id(&self) -> &str {
        self.name
    }

    fn render(&mut self, _ctx: &FrameCtx, surface: &mut Surface) {
        surface.fill(self.px);
    }

    fn on_enter(&mut self) {
        tracing::info!(id = self.name, "enter");
    }

    fn on_exit(&mut self) {
        tracing::info!(id = self.name, "exit");
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let canvas = Canvas::new(160, 90)?;
    let mut surface = Surface::new(canvas);
    let mut engine = SceneEngine::new();

    let amber = shared(Solid {
        name: "amber",
        px: Rgba8Premul::from_straight_rgba(255, 160, 20, 255),
    });
    let teal = shared(Solid {
        name: "teal",
        px: Rgba8Premul::from_straight_rgba(20, 160, 170, 255),
    });

    let out_dir = std::path::Path::new("target/demo/fade_cycle");
    std::fs::create_dir_all(out_dir).context("create demo output dir")?;

    let fps = 30.0;
    let total_frames = (3.0 * fps) as u64;

    engine.set_single(amber.clone(), false);

    for i in 0..total_frames {
        let t = i as f64 / fps;

        // One second in, fade to the second scene.
        if i == fps as u64 {
            engine.set_single(teal.clone(), true);
        }

        engine.update(t, &mut surface);

        if i % 15 == 0 {
            let out = out_dir.join(format!("frame_{i:04}.png"));
            image::save_buffer_with_format(
                &out,
                surface.data(),
                surface.width(),
                surface.height(),
                image::ColorType::Rgba8,
                image::ImageFormat::Png,
            )
            .with_context(|| format!("write '{}'", out.display()))?;
        }

        if let Some(p) = engine.transition_progress() {
            tracing::debug!(frame = i, progress = format!("{p:.2}"), "fading");
        }
    }

    assert!(!engine.is_transitioning(), "fade spans {TRANSITION_SECS}s");
    eprintln!("final scene: {}", engine.current_description());
    eprintln!("frames written to {}", out_dir.display());
    Ok(())
}
