use std::collections::HashMap;

use crate::{
    core::{Canvas, FrameCtx, Rgba8Premul},
    renderable::{Renderable, RenderableRef},
    surface::{BlendMode, Surface},
};

/// Pool configuration for cached scratch surfaces.
#[derive(Debug, Clone, Copy)]
pub struct SurfacePoolOpts {
    /// Maximum bytes retained across all buckets.
    pub max_pool_bytes: usize,
    /// Maximum number of retained surfaces per dimension bucket.
    pub max_surfaces_per_bucket: usize,
}

impl Default for SurfacePoolOpts {
    fn default() -> Self {
        Self {
            max_pool_bytes: 64 * 1024 * 1024,
            max_surfaces_per_bucket: 4,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct SurfacePoolStats {
    pub retained_surfaces: usize,
    pub retained_bytes: usize,
    pub alloc_surfaces: u64,
    pub dropped_on_release: u64,
}

/// Bounded pooled allocator for off-screen surfaces.
///
/// Keyed by canvas dimensions. Borrow/release must happen at draw-pass
/// granularity, not per-pixel.
pub struct SurfacePool {
    opts: SurfacePoolOpts,
    stats: SurfacePoolStats,
    buckets: HashMap<Canvas, Vec<Surface>>,
}

impl SurfacePool {
    pub fn new(opts: SurfacePoolOpts) -> Self {
        Self {
            opts,
            stats: SurfacePoolStats::default(),
            buckets: HashMap::new(),
        }
    }

    pub fn stats(&self) -> SurfacePoolStats {
        self.stats.clone()
    }

    /// Take a surface of the given dimensions, reusing a retained one when
    /// available. Contents are unspecified; callers clear before drawing.
    pub fn borrow(&mut self, canvas: Canvas) -> Surface {
        if let Some(bucket) = self.buckets.get_mut(&canvas)
            && let Some(s) = bucket.pop()
        {
            self.stats.retained_surfaces = self.stats.retained_surfaces.saturating_sub(1);
            self.stats.retained_bytes = self.stats.retained_bytes.saturating_sub(canvas.byte_len());
            return s;
        }

        self.stats.alloc_surfaces = self.stats.alloc_surfaces.saturating_add(1);
        Surface::new(canvas)
    }

    /// Return a surface to the pool. Dropped outright when either cap would
    /// be exceeded.
    pub fn release(&mut self, surface: Surface) {
        if self.opts.max_pool_bytes == 0 || self.opts.max_surfaces_per_bucket == 0 {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        let canvas = surface.canvas();
        let bytes = canvas.byte_len();
        if self.stats.retained_bytes.saturating_add(bytes) > self.opts.max_pool_bytes {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        let bucket = self.buckets.entry(canvas).or_default();
        if bucket.len() >= self.opts.max_surfaces_per_bucket {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        bucket.push(surface);
        self.stats.retained_surfaces = self.stats.retained_surfaces.saturating_add(1);
        self.stats.retained_bytes = self.stats.retained_bytes.saturating_add(bytes);
    }
}

/// Several generators presented as one renderable.
///
/// Each contributor draws into a pooled scratch surface, which is then
/// merged additively into the target at `1/n` opacity (further scaled by the
/// caller's draw opacity) so that contributor count does not blow out
/// brightness. Lifecycle hooks forward to every contributor.
pub struct ComboRenderable {
    id: String,
    canvas: Canvas,
    contributors: Vec<RenderableRef>,
    pool: SurfacePool,
}

impl ComboRenderable {
    pub fn new(id: impl Into<String>, canvas: Canvas, contributors: Vec<RenderableRef>) -> Self {
        Self {
            id: id.into(),
            canvas,
            contributors,
            pool: SurfacePool::new(SurfacePoolOpts::default()),
        }
    }

    pub fn with_pool_opts(mut self, opts: SurfacePoolOpts) -> Self {
        self.pool = SurfacePool::new(opts);
        self
    }

    pub fn contributor_count(&self) -> usize {
        self.contributors.len()
    }
}

impl Renderable for ComboRenderable {
    fn id(&self) -> &str {
        &self.id
    }

    fn render(&mut self, ctx: &FrameCtx, surface: &mut Surface) {
        if self.contributors.is_empty() {
            return;
        }

        let caller_opacity = surface.draw_opacity();
        let caller_blend = surface.blend();
        let share = 1.0 / self.contributors.len() as f32;

        for contributor in &self.contributors {
            let mut scratch = self.pool.borrow(self.canvas);
            scratch.reset_draw_state();
            scratch.clear(Rgba8Premul::transparent());
            contributor.borrow_mut().render(ctx, &mut scratch);

            surface.set_blend(BlendMode::Add);
            surface.set_draw_opacity(caller_opacity * share);
            if let Err(err) = surface.composite_from(&scratch) {
                tracing::warn!(%err, id = %self.id, "combo merge skipped");
            }
            self.pool.release(scratch);
        }

        surface.set_draw_opacity(caller_opacity);
        surface.set_blend(caller_blend);
    }

    fn on_enter(&mut self) {
        for contributor in &self.contributors {
            contributor.borrow_mut().on_enter();
        }
    }

    fn on_exit(&mut self) {
        for contributor in &self.contributors {
            contributor.borrow_mut().on_exit();
        }
    }
}
