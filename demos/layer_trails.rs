//! Layered compositing driven by the wall clock: a combo of two generators
//! in the middle slot over a background wash, leaving persistence trails.
//!
//! Run with `cargo run --example layer_trails`.

use kaleida::{
    Canvas, ComboRenderable, FrameClock, FrameCtx, LayerSlot, LayerStack, Renderable, Rgba8Premul,
    SceneEngine, Surface, shared,
};

struct Wash {
    px: Rgba8Premul,
}

impl Renderable for Wash {
    fn id(&self) -> &str {
        "wash"
    }

    fn render(&mut self, _ctx: &FrameCtx, surface: &mut Surface) {
        surface.fill(self.px);
    }
}

struct Sweep {
    name: &'static str,
    px: Rgba8Premul,
    speed_px: f64,
    phase: f64,
}

impl Renderable for Sweep {
    fn id(&self) -> &str {
        self.name
    }

    fn render(&mut self, ctx: &FrameCtx, surface: &mut Surface) {
        self.phase += ctx.scaled_dt() * self.speed_px;
        let x = (self.phase as i64) % surface.width() as i64;
        surface.fill_rect(x, 0, 6, surface.height(), self.px);
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let canvas = Canvas::new(160, 90)?;
    let mut surface = Surface::new(canvas);
    let mut engine = SceneEngine::new();

    let combo = ComboRenderable::new(
        "sweeps",
        canvas,
        vec![
            shared(Sweep {
                name: "sweep_r",
                px: Rgba8Premul::from_straight_rgba(255, 40, 40, 255),
                speed_px: 90.0,
                phase: 0.0,
            }),
            shared(Sweep {
                name: "sweep_b",
                px: Rgba8Premul::from_straight_rgba(40, 40, 255, 255),
                speed_px: 55.0,
                phase: 0.0,
            }),
        ],
    );

    engine.set_layered(
        LayerStack::new()
            .with(
                LayerSlot::Background,
                shared(Wash {
                    px: Rgba8Premul::from_straight_rgba(10, 20, 40, 255),
                }),
            )
            .with(LayerSlot::Middle, shared(combo)),
    );
    engine.set_speed(1.5)?;

    let mut clock = FrameClock::new();
    for i in 0..90u32 {
        let t = clock.tick();
        engine.update(t, &mut surface);
        if i % 30 == 0 {
            eprintln!(
                "t={t:.3}s layered={} -> {}",
                engine.is_layered(),
                engine.current_description()
            );
        }
        std::thread::sleep(std::time::Duration::from_millis(10));
    }

    Ok(())
}
