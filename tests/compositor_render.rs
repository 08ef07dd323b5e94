use kaleida::{
    Canvas, FrameCtx, LayerSlot, LayerStack, Renderable, Rgba8Premul, SceneEngine, Surface, shared,
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
}

fn solid(name: &'static str, r: u8, g: u8, b: u8) -> kaleida::RenderableRef {
    shared(Solid {
        name,
        px: Rgba8Premul::from_straight_rgba(r, g, b, 255),
    })
}

fn surface() -> Surface {
    Surface::new(Canvas::new(4, 4).unwrap())
}

fn opaque_black(s: &mut Surface) {
    s.clear(Rgba8Premul::from_straight_rgba(0, 0, 0, 255));
}

#[test]
fn background_draws_at_point_six_over_black() {
    let mut engine = SceneEngine::new();
    let mut s = surface();
    opaque_black(&mut s);

    engine.set_layered(LayerStack::new().with(LayerSlot::Background, solid("w", 255, 255, 255)));
    engine.update(0.0, &mut s);

    let px = s.pixel(0, 0).unwrap();
    // 0.6 of white over black, within integer-blend rounding.
    assert!((150..=156).contains(&px.r), "r = {}", px.r);
    assert_eq!(px.a, 255);
}

#[test]
fn middle_layer_accumulates_additively_until_saturation() {
    let mut engine = SceneEngine::new();
    let mut s = surface();
    opaque_black(&mut s);

    engine.set_layered(LayerStack::new().with(LayerSlot::Middle, solid("r", 100, 0, 0)));

    engine.update(0.0, &mut s);
    let first = s.pixel(0, 0).unwrap().r;
    // One pass: 0.8 * 100, premultiplied and rounded.
    assert!((75..=85).contains(&first), "r = {first}");

    for i in 1..=20 {
        engine.update(f64::from(i) * 0.033, &mut s);
    }
    // Additive gain outruns the trail fade; the channel clamps instead of
    // wrapping.
    assert_eq!(s.pixel(0, 0).unwrap().r, 255);
}

#[test]
fn foreground_draws_at_full_opacity_with_normal_blending() {
    let mut engine = SceneEngine::new();
    let mut s = surface();
    opaque_black(&mut s);

    engine.set_layered(
        LayerStack::new()
            .with(LayerSlot::Middle, solid("m", 255, 255, 255))
            .with(LayerSlot::Foreground, solid("f", 50, 60, 70)),
    );
    engine.update(0.0, &mut s);

    // The foreground is opaque normal-blend: it replaces whatever the
    // additive middle layer accumulated. Additive state must not leak.
    let px = s.pixel(2, 2).unwrap();
    assert_eq!((px.r, px.g, px.b, px.a), (50, 60, 70, 255));
}

#[test]
fn absent_layers_neither_clear_nor_contribute() {
    let mut engine = SceneEngine::new();
    let mut s = surface();
    s.clear(Rgba8Premul::from_straight_rgba(200, 200, 200, 255));

    // Only a foreground; background and middle slots stay empty.
    engine.set_layered(LayerStack::new().with(LayerSlot::Foreground, solid("f", 0, 0, 0)));
    engine.update(0.0, &mut s);

    // Foreground painted pure black everywhere; had an absent layer
    // "cleared", the surface would have lost its alpha instead.
    let px = s.pixel(0, 0).unwrap();
    assert_eq!((px.r, px.g, px.b, px.a), (0, 0, 0, 255));
}

#[test]
fn empty_composition_leaves_only_the_trail_fade() {
    let mut engine = SceneEngine::new();
    let mut s = surface();
    s.clear(Rgba8Premul::from_straight_rgba(200, 200, 200, 255));

    engine.set_layered(LayerStack::new());
    engine.update(0.0, &mut s);

    let px = s.pixel(0, 0).unwrap();
    assert!(px.r < 200, "trail fill should darken the frame");
    assert!(px.r > 150, "trail fill is low-opacity");
}

#[test]
fn draw_state_is_reset_after_layered_frame() {
    let mut engine = SceneEngine::new();
    let mut s = surface();

    engine.set_layered(
        LayerStack::new()
            .with(LayerSlot::Background, solid("b", 10, 10, 10))
            .with(LayerSlot::Middle, solid("m", 10, 10, 10)),
    );
    engine.update(0.0, &mut s);

    assert_eq!(s.draw_opacity(), 1.0);
    assert_eq!(s.blend(), kaleida::BlendMode::Normal);
}

#[test]
fn single_mode_draws_current_at_full_opacity() {
    let mut engine = SceneEngine::new();
    let mut s = surface();
    opaque_black(&mut s);

    engine.set_single(solid("w", 255, 255, 255), false);
    engine.update(0.0, &mut s);

    assert_eq!(s.pixel(1, 1).unwrap().r, 255);
}
