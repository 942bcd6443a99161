//! Mount — application lifecycle and the render effect.
//!
//! `mount` builds the component tree inside an effect scope (so tearing the
//! scope down cascades through every primitive cleanup), wires the reactive
//! pipeline, and starts the one effect with side effects: hit-grid refill,
//! scroll-layout publication, terminal output.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use spark_signals::{effect, effect_scope, flush_sync, EffectScope};

use crate::input::InputBuffer;
use crate::renderer::{self, DiffRenderer, InlineRenderer};
use crate::state::{mouse, router, scroll};
use crate::types::RenderMode;

use super::frame_buffer::create_frame_buffer_derived;
use super::layout_derived::create_layout_derived;
use super::terminal;

// =============================================================================
// Options
// =============================================================================

/// Options for `mount`.
#[derive(Debug, Clone, Copy)]
pub struct MountOptions {
    pub mode: RenderMode,
    /// Capture mouse input (writes the enable sequence on mount).
    pub mouse: bool,
    /// Ctrl+C clears the running flag (on by default).
    pub exit_on_ctrl_c: bool,
}

impl Default for MountOptions {
    fn default() -> Self {
        Self {
            mode: RenderMode::Fullscreen,
            mouse: false,
            exit_on_ctrl_c: true,
        }
    }
}

// =============================================================================
// Handle
// =============================================================================

/// Handle returned by `mount`. Feed terminal bytes through it and call
/// `unmount` (or drop it) to tear everything down.
pub struct MountHandle {
    stop_effect: Option<Box<dyn FnOnce()>>,
    scope: Option<EffectScope>,
    router: Option<router::RouterHandle>,
    running: Arc<AtomicBool>,
    input: InputBuffer,
    mode: RenderMode,
    mouse: bool,
}

impl MountHandle {
    /// False once Ctrl+C (or `stop`) fired.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Request shutdown.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Shared running flag, for embedding event loops.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    /// Feed raw TTY bytes: parse, route, and flush the reactive queue so
    /// handlers' writes reflow before the next frame.
    pub fn feed_input(&mut self, bytes: &[u8]) {
        for event in self.input.feed(bytes) {
            router::route_parsed_event(&event);
        }
        flush_sync();
    }

    /// Periodic tick: flushes a lone ESC after the disambiguation timeout.
    pub fn tick(&mut self) {
        let events = self.input.poll_timeout();
        if events.is_empty() {
            return;
        }
        for event in events {
            router::route_parsed_event(&event);
        }
        flush_sync();
    }

    /// Publish a terminal resize: the layout, frame buffer, and hit grid
    /// all track the size signals.
    pub fn resize(&self, width: u16, height: u16) {
        terminal::set_terminal_size(width, height);
        flush_sync();
    }

    /// Stop the render effect, dispose the component tree, and restore the
    /// terminal.
    pub fn unmount(mut self) -> io::Result<()> {
        self.teardown()
    }

    fn teardown(&mut self) -> io::Result<()> {
        self.running.store(false, Ordering::SeqCst);

        if let Some(stop) = self.stop_effect.take() {
            stop();
        }
        if let Some(scope) = self.scope.take() {
            // Runs every primitive cleanup registered in the scope; the last
            // release triggers the arrays' reset-on-zero.
            scope.stop();
            flush_sync();
        }
        if let Some(router) = self.router.take() {
            router.cleanup();
        }
        scroll::clear_current_layout();

        let mut result = Ok(());
        if self.mouse {
            result = result.and(terminal::disable_mouse());
            self.mouse = false;
        }
        if self.mode == RenderMode::Fullscreen {
            result = result.and(renderer::leave_alt_screen());
        }
        result
    }
}

impl Drop for MountHandle {
    fn drop(&mut self) {
        if self.stop_effect.is_some() || self.scope.is_some() {
            let _ = self.teardown();
        }
    }
}

// =============================================================================
// Mount
// =============================================================================

/// Mount an application: build the tree, start the render pipeline.
pub fn mount(root: impl FnOnce() + 'static, options: MountOptions) -> io::Result<MountHandle> {
    terminal::detect_terminal_size();
    terminal::set_render_mode(options.mode);

    // The tree builds inside a detached scope so primitive cleanups cascade
    // when the scope stops.
    let scope = effect_scope(true);
    scope.run(root);

    let layout_derived = create_layout_derived();
    let fb_derived = create_frame_buffer_derived(layout_derived);

    let running = Arc::new(AtomicBool::new(true));
    let router = options
        .exit_on_ctrl_c
        .then(|| router::install_exit_flag(running.clone()));

    if options.mouse {
        terminal::enable_mouse()?;
    }

    let running_for_effect = running.clone();
    let mut last_hit_size = (0u16, 0u16);

    let stop_effect: Box<dyn FnOnce()> = match options.mode {
        RenderMode::Fullscreen => {
            renderer::enter_alt_screen()?;
            let mut out = DiffRenderer::new();

            Box::new(effect(move || {
                if !running_for_effect.load(Ordering::SeqCst) {
                    return;
                }
                let result = fb_derived.get();
                sync_hit_grid(&result, &mut last_hit_size);
                scroll::set_current_layout(result.layout.clone());
                if let Err(err) = out.render(&result.buffer) {
                    log::warn!("render failed: {err}");
                }
            }))
        }
        RenderMode::Inline => {
            let mut out = InlineRenderer::new();

            Box::new(effect(move || {
                if !running_for_effect.load(Ordering::SeqCst) {
                    return;
                }
                let result = fb_derived.get();
                sync_hit_grid(&result, &mut last_hit_size);
                scroll::set_current_layout(result.layout.clone());
                let rows = result.layout.content_height;
                if let Err(err) = out.render(&result.buffer, rows) {
                    log::warn!("render failed: {err}");
                }
            }))
        }
    };

    // First frame.
    flush_sync();

    Ok(MountHandle {
        stop_effect: Some(stop_effect),
        scope: Some(scope),
        router,
        running,
        input: InputBuffer::new(),
        mode: options.mode,
        mouse: options.mouse,
    })
}

/// Resize/clear the hit grid, then stamp this frame's regions in paint
/// order (later regions overwrite earlier — the painter's algorithm).
fn sync_hit_grid(
    result: &super::frame_buffer::FrameBufferResult,
    last_size: &mut (u16, u16),
) {
    let size = result.terminal_size;
    if *last_size != size {
        mouse::resize_hit_grid(size.0, size.1);
        *last_size = size;
    } else {
        mouse::clear_hit_grid();
    }

    for region in &result.hit_regions {
        mouse::fill_hit_rect(
            region.x,
            region.y,
            region.width,
            region.height,
            region.component_index,
        );
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::super::frame_buffer::{FrameBufferResult, HitRegion};
    use super::*;
    use crate::layout::ComputedLayout;
    use crate::renderer::FrameBuffer;

    #[test]
    fn test_sync_hit_grid_stamps_regions() {
        mouse::reset_mouse_state();

        let result = FrameBufferResult {
            buffer: FrameBuffer::new(20, 10),
            hit_regions: vec![
                HitRegion {
                    x: 0,
                    y: 0,
                    width: 20,
                    height: 10,
                    component_index: 1,
                },
                HitRegion {
                    x: 5,
                    y: 5,
                    width: 3,
                    height: 2,
                    component_index: 2,
                },
            ],
            layout: ComputedLayout::new(),
            terminal_size: (20, 10),
        };

        let mut last = (0, 0);
        sync_hit_grid(&result, &mut last);

        assert_eq!(mouse::hit_test(0, 0), Some(1));
        // The later region wins where they overlap.
        assert_eq!(mouse::hit_test(6, 6), Some(2));
        assert_eq!(last, (20, 10));
        mouse::reset_mouse_state();
    }
}
