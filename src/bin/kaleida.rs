use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use kaleida::{
    Canvas, FrameClock, FrameCtx, LayerSlot, LayerStack, Renderable, RenderableRef, Rgba8Premul,
    SceneEngine, SceneScript, ScriptAction, Surface, shared,
};

#[derive(Parser, Debug)]
#[command(name = "kaleida", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play a scene script and optionally write PNG frames.
    Play(PlayArgs),
    /// Parse and validate a scene script without playing it.
    Check(CheckArgs),
}

#[derive(Parser, Debug)]
struct PlayArgs {
    /// Input scene script JSON.
    #[arg(long)]
    script: PathBuf,

    /// Number of frames to play.
    #[arg(long, default_value_t = 300)]
    frames: u64,

    /// Frames per second of the synthesized timeline.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Surface width in pixels.
    #[arg(long, default_value_t = 320)]
    width: u32,

    /// Surface height in pixels.
    #[arg(long, default_value_t = 180)]
    height: u32,

    /// Directory to write `frame_NNNNN.png` files into.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Pace frames against the wall clock instead of a fixed-step timeline.
    #[arg(long)]
    realtime: bool,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Input scene script JSON.
    #[arg(long)]
    script: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Play(args) => cmd_play(args),
        Command::Check(args) => cmd_check(args),
    }
}

fn read_script(path: &Path) -> anyhow::Result<SceneScript> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("open scene script '{}'", path.display()))?;
    let script = SceneScript::from_json(&text)?;
    script.validate()?;
    Ok(script)
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let script = read_script(&args.script)?;
    eprintln!("ok: {} commands", script.commands.len());
    Ok(())
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    if args.fps == 0 {
        anyhow::bail!("--fps must be > 0");
    }
    let script = read_script(&args.script)?;
    let canvas = Canvas::new(args.width, args.height)?;

    let scenes = builtin_scenes(canvas);
    let mut engine = SceneEngine::new();
    let mut surface = Surface::new(canvas);

    if let Some(dir) = &args.out_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create output dir '{}'", dir.display()))?;
    }

    let frame_secs = 1.0 / f64::from(args.fps);
    let mut clock = args.realtime.then(FrameClock::new);
    let mut pending = script.commands.as_slice();
    let mut last_desc = String::new();

    for i in 0..args.frames {
        let t = match &mut clock {
            Some(clock) => clock.tick(),
            None => i as f64 * frame_secs,
        };

        while let Some((cmd, rest)) = pending.split_first() {
            if cmd.at_secs > t {
                break;
            }
            apply_command(&mut engine, &scenes, &cmd.action)
                .with_context(|| format!("apply command at t={}", cmd.at_secs))?;
            pending = rest;
        }

        engine.update(t, &mut surface);

        let desc = engine.current_description();
        if desc != last_desc {
            let mode = if engine.is_layered() { "layered" } else { "single" };
            eprintln!("[{i:05}] {mode}: {desc}");
            last_desc = desc;
        }

        if let Some(dir) = &args.out_dir {
            let out = dir.join(format!("frame_{i:05}.png"));
            image::save_buffer_with_format(
                &out,
                surface.data(),
                surface.width(),
                surface.height(),
                image::ColorType::Rgba8,
                image::ImageFormat::Png,
            )
            .with_context(|| format!("write png '{}'", out.display()))?;
        }

        if args.realtime {
            std::thread::sleep(std::time::Duration::from_secs_f64(frame_secs));
        }
    }

    eprintln!("played {} frames", args.frames);
    Ok(())
}

fn apply_command(
    engine: &mut SceneEngine,
    scenes: &HashMap<String, RenderableRef>,
    action: &ScriptAction,
) -> anyhow::Result<()> {
    match action {
        ScriptAction::SetSingle { scene, transition } => {
            engine.set_single(resolve(scenes, scene)?, *transition);
        }
        ScriptAction::SetLayered {
            background,
            middle,
            foreground,
        } => {
            let mut stack = LayerStack::new();
            for (slot, name) in [
                (LayerSlot::Background, background),
                (LayerSlot::Middle, middle),
                (LayerSlot::Foreground, foreground),
            ] {
                if let Some(name) = name {
                    stack.set(slot, Some(resolve(scenes, name)?));
                }
            }
            engine.set_layered(stack);
        }
        ScriptAction::SetLayer { slot, scene } => {
            let slot = LayerSlot::parse(slot)?;
            let renderable = match scene {
                Some(name) => Some(resolve(scenes, name)?),
                None => None,
            };
            engine.set_layer_slot(slot, renderable);
        }
        ScriptAction::SetSpeed { speed } => engine.set_speed(*speed)?,
    }
    Ok(())
}

fn resolve(scenes: &HashMap<String, RenderableRef>, name: &str) -> anyhow::Result<RenderableRef> {
    scenes
        .get(name)
        .cloned()
        .with_context(|| format!("unknown scene '{name}' (built-ins: waves, pulse, scanline)"))
}

// ---- built-in demo scenes ----
//
// Deliberately primitive generators; they exist so the engine has something
// to composite, not as showcase effects.

fn builtin_scenes(canvas: Canvas) -> HashMap<String, RenderableRef> {
    let mut scenes: HashMap<String, RenderableRef> = HashMap::new();
    scenes.insert("waves".into(), shared(Waves { canvas, phase: 0.0 }));
    scenes.insert("pulse".into(), shared(Pulse { canvas, phase: 0.0 }));
    scenes.insert(
        "scanline".into(),
        shared(Scanline { canvas, phase: 0.0 }),
    );
    scenes
}

struct Waves {
    canvas: Canvas,
    phase: f64,
}

impl Renderable for Waves {
    fn id(&self) -> &str {
        "waves"
    }

    fn render(&mut self, ctx: &FrameCtx, surface: &mut Surface) {
        self.phase += ctx.scaled_dt();
        let h = self.canvas.height as i64;
        let band = (h / 8).max(1);
        for i in 0..8 {
            let offset = ((self.phase * 40.0) as i64 + i * band) % h;
            let shade = 80 + (i * 20) as u8;
            surface.fill_rect(
                0,
                offset,
                self.canvas.width,
                (band / 2).max(1) as u32,
                Rgba8Premul::from_straight_rgba(0, shade, 255 - shade, 255),
            );
        }
    }
}

struct Pulse {
    canvas: Canvas,
    phase: f64,
}

impl Renderable for Pulse {
    fn id(&self) -> &str {
        "pulse"
    }

    fn render(&mut self, ctx: &FrameCtx, surface: &mut Surface) {
        self.phase += ctx.scaled_dt();
        let max = (self.canvas.width.min(self.canvas.height) / 2) as f64;
        let r = (max * (0.25 + 0.75 * (self.phase * 2.0).sin().abs())) as i64;
        let cx = self.canvas.width as i64 / 2;
        let cy = self.canvas.height as i64 / 2;
        surface.fill_rect(
            cx - r,
            cy - r,
            (r * 2) as u32,
            (r * 2) as u32,
            Rgba8Premul::from_straight_rgba(255, 90, 40, 255),
        );
    }
}

struct Scanline {
    canvas: Canvas,
    phase: f64,
}

impl Renderable for Scanline {
    fn id(&self) -> &str {
        "scanline"
    }

    fn render(&mut self, ctx: &FrameCtx, surface: &mut Surface) {
        self.phase += ctx.scaled_dt();
        let w = self.canvas.width as i64;
        let x = ((self.phase * 120.0) as i64) % w;
        surface.fill_rect(
            x,
            0,
            4,
            self.canvas.height,
            Rgba8Premul::from_straight_rgba(220, 220, 255, 255),
        );
    }
}
