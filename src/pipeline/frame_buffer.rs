//! Reactive frame buffer computation.
//!
//! Walks the component tree in paint order (children over parents, siblings
//! by z-index), producing the cell buffer plus the hit regions the render
//! effect stamps into the hit grid. Scroll offsets shift child subtrees;
//! overflow hidden/scroll/auto tightens the clip rectangle on the way down.

use spark_signals::{derived, Derived};

use crate::engine::arrays::{core, dirty, interaction, text as text_arrays, visual};
use crate::engine::{get_allocated_indices, get_flex_node};
use crate::layout::{truncate_text, wrap_text, ComputedLayout};
use crate::renderer::FrameBuffer;
use crate::state::focus;
use crate::types::{
    Attr, BorderStyle, ClipRect, ComponentKind, Overflow, Rgba, TextAlign, TextWrap,
};

use super::terminal::{terminal_height_signal, terminal_width_signal};

// =============================================================================
// Output types
// =============================================================================

/// A rectangle to stamp into the hit grid, in paint order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitRegion {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    pub component_index: usize,
}

/// Everything the render effect consumes per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBufferResult {
    pub buffer: FrameBuffer,
    pub hit_regions: Vec<HitRegion>,
    pub layout: ComputedLayout,
    pub terminal_size: (u16, u16),
}

// =============================================================================
// Derived
// =============================================================================

/// Create the frame-buffer derived on top of the layout derived.
pub fn create_frame_buffer_derived(
    layout_derived: Derived<ComputedLayout>,
) -> Derived<FrameBufferResult> {
    let width = terminal_width_signal();
    let height = terminal_height_signal();

    derived(move || {
        let tw = width.get();
        let th = height.get();
        let layout = layout_derived.get();

        let mut painter = Painter {
            buffer: FrameBuffer::new(tw, th),
            hit_regions: Vec::new(),
            layout: &layout,
            focused: focus::get_focused_index(),
        };

        let mut indices = get_allocated_indices();
        indices.sort_unstable();

        // Roots in allocation order; siblings ordered by (z-index, index).
        let roots: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| core::get_visible(i) && core::get_parent(i).is_none())
            .collect();

        let screen = ClipRect::new(0, 0, tw, th);
        for root in roots {
            painter.paint(root, screen, 0, 0);
        }

        let Painter {
            buffer,
            hit_regions,
            ..
        } = painter;
        let result = FrameBufferResult {
            buffer,
            hit_regions,
            layout,
            terminal_size: (tw, th),
        };

        // Visual and scroll dirt is consumed by this pass.
        dirty::VISUAL_DIRTY.with(|s| s.borrow_mut().clear());
        dirty::SCROLL_DIRTY.with(|s| s.borrow_mut().clear());

        result
    })
}

// =============================================================================
// Painter
// =============================================================================

struct Painter<'a> {
    buffer: FrameBuffer,
    hit_regions: Vec<HitRegion>,
    layout: &'a ComputedLayout,
    focused: i32,
}

impl Painter<'_> {
    fn paint(&mut self, index: usize, clip: ClipRect, offset_x: i32, offset_y: i32) {
        let (lx, ly, w, h) = self.layout.rect(index);
        let x = lx as i32 + offset_x;
        let y = ly as i32 + offset_y;

        let rect = clip_to_screen(x, y, w, h);
        let visible_rect = rect.and_then(|r| r.intersect(&clip));

        let opacity = visual::get_opacity(index);

        if let Some(area) = visible_rect {
            // Background.
            let bg = apply_opacity(visual::get_bg(index), opacity);
            if !bg.is_terminal_default() && !bg.is_transparent() {
                self.buffer
                    .fill_bg(area.x, area.y, area.width, area.height, bg);
            }

            // Hit region in paint order.
            if interaction::get_mouse_enabled(index) {
                self.hit_regions.push(HitRegion {
                    x: area.x,
                    y: area.y,
                    width: area.width,
                    height: area.height,
                    component_index: index,
                });
            }

            match core::get_kind(index) {
                ComponentKind::Text => self.paint_text(index, x, y, w, h, &clip, opacity),
                ComponentKind::Input => self.paint_input(index, x, y, w, h, &clip, opacity),
                _ => {}
            }

            self.paint_border(index, x, y, w, h, &clip, opacity);
        }

        // Children: tightened clip for clipping overflows, shifted by the
        // scroll offset for scrollables.
        let Some(node) = get_flex_node(index) else {
            return;
        };
        let overflow = Overflow::from(node.overflow.get().unwrap_or(0));
        let child_clip = if overflow == Overflow::Visible {
            clip
        } else {
            match inner_rect(index, x, y, w, h).and_then(|r| r.intersect(&clip)) {
                Some(r) => r,
                None => return, // fully clipped subtree
            }
        };

        let (mut child_dx, mut child_dy) = (offset_x, offset_y);
        if self.layout.scrollable.get(index).copied().unwrap_or(0) == 1 {
            child_dx -= interaction::get_scroll_offset_x(index) as i32;
            child_dy -= interaction::get_scroll_offset_y(index) as i32;
        }

        let mut children: Vec<usize> = get_allocated_indices()
            .into_iter()
            .filter(|&c| core::get_visible(c) && core::get_parent(c) == Some(index))
            .collect();
        children.sort_by_key(|&c| (visual::get_z_index(c), c));

        for child in children {
            self.paint(child, child_clip, child_dx, child_dy);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn paint_text(
        &mut self,
        index: usize,
        x: i32,
        y: i32,
        w: u16,
        h: u16,
        clip: &ClipRect,
        opacity: u8,
    ) {
        let content = text_arrays::get_content(index);
        if content.is_empty() {
            return;
        }

        let Some(inner) = inner_rect(index, x, y, w, h) else {
            return;
        };

        let fg = apply_opacity(visual::get_fg(index), opacity);
        let attrs = text_arrays::get_attrs(index);
        let align = text_arrays::get_align(index);

        let lines: Vec<String> = match text_arrays::get_wrap(index) {
            TextWrap::Wrap => wrap_text(&content, inner.width),
            TextWrap::NoWrap => content.split('\n').map(str::to_string).collect(),
            TextWrap::Truncate => {
                let ellipsis = text_arrays::get_ellipsis(index);
                content
                    .split('\n')
                    .map(|line| truncate_text(line, inner.width, &ellipsis))
                    .collect()
            }
        };

        for (row, line) in lines.iter().enumerate() {
            if row as u16 >= inner.height {
                break;
            }
            let line_w = crate::layout::string_width(line);
            let lead = match align {
                TextAlign::Left => 0,
                TextAlign::Center => inner.width.saturating_sub(line_w) / 2,
                TextAlign::Right => inner.width.saturating_sub(line_w),
            };
            self.draw_line(
                line,
                inner.x + lead,
                inner.y + row as u16,
                clip,
                fg,
                attrs,
            );
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn paint_input(
        &mut self,
        index: usize,
        x: i32,
        y: i32,
        w: u16,
        h: u16,
        clip: &ClipRect,
        opacity: u8,
    ) {
        let Some(inner) = inner_rect(index, x, y, w, h) else {
            return;
        };

        let content = text_arrays::get_content(index);
        let fg = apply_opacity(visual::get_fg(index), opacity);
        let shown = truncate_text(&content, inner.width, "");
        self.draw_line(&shown, inner.x, inner.y, clip, fg, Attr::NONE);

        // Caret: inverse cell at the cursor while focused.
        if self.focused == index as i32 {
            let cursor = interaction::get_cursor_position(index);
            let cx = inner.x + cursor.min(inner.width.saturating_sub(1));
            if clip.contains(cx, inner.y) {
                if let Some(cell) = self.buffer.get(cx, inner.y) {
                    let mut caret = *cell;
                    caret.attrs |= Attr::INVERSE;
                    self.buffer.set(cx, inner.y, caret);
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn paint_border(
        &mut self,
        index: usize,
        x: i32,
        y: i32,
        w: u16,
        h: u16,
        clip: &ClipRect,
        opacity: u8,
    ) {
        if w < 1 || h < 1 {
            return;
        }
        let style = visual::get_border_style(index);
        let any_side =
            (0u8..4).any(|side| visual::get_side_border_style(index, side) != BorderStyle::None);
        if style == BorderStyle::None && !any_side {
            return;
        }

        let color = apply_opacity(visual::get_border_color(index), opacity);
        let right = x + w as i32 - 1;
        let bottom = y + h as i32 - 1;

        let top_style = visual::get_side_border_style(index, 0);
        let right_style = visual::get_side_border_style(index, 1);
        let bottom_style = visual::get_side_border_style(index, 2);
        let left_style = visual::get_side_border_style(index, 3);

        // Horizontal runs.
        if top_style != BorderStyle::None {
            let (hch, _, _, _, _, _) = top_style.chars();
            for cx in (x + 1)..right {
                self.put_clipped(cx, y, first_char(hch), color, clip);
            }
        }
        if bottom_style != BorderStyle::None {
            let (hch, _, _, _, _, _) = bottom_style.chars();
            for cx in (x + 1)..right {
                self.put_clipped(cx, bottom, first_char(hch), color, clip);
            }
        }
        // Vertical runs.
        if left_style != BorderStyle::None {
            let (_, vch, _, _, _, _) = left_style.chars();
            for cy in (y + 1)..bottom {
                self.put_clipped(x, cy, first_char(vch), color, clip);
            }
        }
        if right_style != BorderStyle::None {
            let (_, vch, _, _, _, _) = right_style.chars();
            for cy in (y + 1)..bottom {
                self.put_clipped(right, cy, first_char(vch), color, clip);
            }
        }
        // Corners take the style of the touching horizontal side.
        if top_style != BorderStyle::None {
            let (_, _, tl, tr, _, _) = top_style.chars();
            self.put_clipped(x, y, first_char(tl), color, clip);
            self.put_clipped(right, y, first_char(tr), color, clip);
        }
        if bottom_style != BorderStyle::None {
            let (_, _, _, _, br, bl) = bottom_style.chars();
            self.put_clipped(x, bottom, first_char(bl), color, clip);
            self.put_clipped(right, bottom, first_char(br), color, clip);
        }
    }

    fn draw_line(&mut self, line: &str, x: u16, y: u16, clip: &ClipRect, fg: Rgba, attrs: Attr) {
        let mut cx = x as i32;
        for ch in line.chars() {
            let width = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0) as i32;
            if width == 0 {
                continue;
            }
            if cx >= 0 && clip.contains(cx as u16, y) {
                self.buffer
                    .put_char(cx as u16, y, ch, fg, Rgba::TRANSPARENT, attrs);
                // Wide glyphs occupy a continuation cell.
                if width == 2 && clip.contains(cx as u16 + 1, y) {
                    self.buffer.put_char(
                        cx as u16 + 1,
                        y,
                        ' ',
                        fg,
                        Rgba::TRANSPARENT,
                        attrs,
                    );
                }
            }
            cx += width;
        }
    }

    fn put_clipped(&mut self, x: i32, y: i32, ch: char, fg: Rgba, clip: &ClipRect) {
        if x < 0 || y < 0 {
            return;
        }
        if clip.contains(x as u16, y as u16) {
            self.buffer
                .put_char(x as u16, y as u16, ch, fg, Rgba::TRANSPARENT, Attr::NONE);
        }
    }
}

// =============================================================================
// Geometry helpers
// =============================================================================

fn clip_to_screen(x: i32, y: i32, w: u16, h: u16) -> Option<ClipRect> {
    if w == 0 || h == 0 {
        return None;
    }
    let x2 = x + w as i32;
    let y2 = y + h as i32;
    if x2 <= 0 || y2 <= 0 {
        return None;
    }
    let cx = x.max(0);
    let cy = y.max(0);
    Some(ClipRect::new(
        cx as u16,
        cy as u16,
        (x2 - cx) as u16,
        (y2 - cy) as u16,
    ))
}

/// Content rectangle (inside padding and borders), clipped to the screen.
fn inner_rect(index: usize, x: i32, y: i32, w: u16, h: u16) -> Option<ClipRect> {
    let node = get_flex_node(index)?;
    let pad_l = node.padding_left.get().unwrap_or(0);
    let pad_r = node.padding_right.get().unwrap_or(0);
    let pad_t = node.padding_top.get().unwrap_or(0);
    let pad_b = node.padding_bottom.get().unwrap_or(0);
    let bord_l = u16::from(node.border_left.get().unwrap_or(0) > 0);
    let bord_r = u16::from(node.border_right.get().unwrap_or(0) > 0);
    let bord_t = u16::from(node.border_top.get().unwrap_or(0) > 0);
    let bord_b = u16::from(node.border_bottom.get().unwrap_or(0) > 0);

    let iw = w.saturating_sub(pad_l + pad_r + bord_l + bord_r);
    let ih = h.saturating_sub(pad_t + pad_b + bord_t + bord_b);
    clip_to_screen(x + (pad_l + bord_l) as i32, y + (pad_t + bord_t) as i32, iw, ih)
}

fn apply_opacity(color: Rgba, opacity: u8) -> Rgba {
    if opacity == 255 || color.is_terminal_default() || color.is_ansi() {
        return color;
    }
    let mut c = color;
    c.a = ((c.a as u32 * opacity as u32) / 255) as i16;
    c
}

fn first_char(s: &str) -> char {
    s.chars().next().unwrap_or(' ')
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{allocate_index, create_flex_node, reset_registry};
    use crate::pipeline::layout_derived::create_layout_derived;
    use crate::pipeline::terminal::{set_render_mode, set_terminal_size};
    use crate::types::{Dimension, RenderMode};

    fn setup() {
        reset_registry();
        crate::state::focus::reset_focus_state();
        set_terminal_size(40, 10);
        set_render_mode(RenderMode::Fullscreen);
    }

    fn make_box(parent: Option<usize>) -> usize {
        let idx = allocate_index(None);
        core::set_kind(idx, ComponentKind::Box);
        if let Some(p) = parent {
            core::set_parent(idx, Some(p));
        }
        create_flex_node(idx);
        idx
    }

    #[test]
    fn test_background_fill_and_hit_region() {
        setup();

        let root = make_box(None);
        let node = get_flex_node(root).unwrap();
        node.width.set_value(Dimension::Cells(10));
        node.height.set_value(Dimension::Cells(4));
        visual::set_bg(root, Rgba::rgb(9, 9, 9));

        let fb = create_frame_buffer_derived(create_layout_derived());
        let result = fb.get();

        assert_eq!(result.buffer.get(0, 0).unwrap().bg, Rgba::rgb(9, 9, 9));
        assert_eq!(result.buffer.get(9, 3).unwrap().bg, Rgba::rgb(9, 9, 9));
        assert_eq!(
            result.buffer.get(10, 0).unwrap().bg,
            Rgba::TERMINAL_DEFAULT
        );

        assert_eq!(result.hit_regions.len(), 1);
        let region = result.hit_regions[0];
        assert_eq!(
            (region.x, region.y, region.width, region.height),
            (0, 0, 10, 4)
        );
        assert_eq!(region.component_index, root);
    }

    #[test]
    fn test_text_painted_into_cells() {
        setup();

        let root = make_box(None);
        let rn = get_flex_node(root).unwrap();
        rn.width.set_value(Dimension::Cells(20));
        rn.height.set_value(Dimension::Cells(3));

        let t = allocate_index(None);
        core::set_kind(t, ComponentKind::Text);
        core::set_parent(t, Some(root));
        text_arrays::set_content(t, "hi".to_string());
        create_flex_node(t);

        let fb = create_frame_buffer_derived(create_layout_derived());
        let result = fb.get();

        assert_eq!(result.buffer.get(0, 0).unwrap().char, 'h' as u32);
        assert_eq!(result.buffer.get(1, 0).unwrap().char, 'i' as u32);
    }

    #[test]
    fn test_children_paint_over_parents_in_hit_order() {
        setup();

        let root = make_box(None);
        let rn = get_flex_node(root).unwrap();
        rn.width.set_value(Dimension::Cells(20));
        rn.height.set_value(Dimension::Cells(5));

        let child = make_box(Some(root));
        let cn = get_flex_node(child).unwrap();
        cn.width.set_value(Dimension::Cells(5));
        cn.height.set_value(Dimension::Cells(2));

        let fb = create_frame_buffer_derived(create_layout_derived());
        let result = fb.get();

        // Parent region first, child second: the grid stamps child on top.
        assert_eq!(result.hit_regions[0].component_index, root);
        assert_eq!(result.hit_regions[1].component_index, child);
    }

    #[test]
    fn test_overflow_hidden_clips_children() {
        setup();

        let root = make_box(None);
        let rn = get_flex_node(root).unwrap();
        rn.width.set_value(Dimension::Cells(5));
        rn.height.set_value(Dimension::Cells(2));
        rn.overflow.set_value(1); // hidden

        let child = make_box(Some(root));
        let cn = get_flex_node(child).unwrap();
        cn.width.set_value(Dimension::Cells(20));
        cn.height.set_value(Dimension::Cells(1));
        visual::set_bg(child, Rgba::rgb(1, 1, 1));

        let fb = create_frame_buffer_derived(create_layout_derived());
        let result = fb.get();

        assert_eq!(result.buffer.get(4, 0).unwrap().bg, Rgba::rgb(1, 1, 1));
        // Beyond the parent's clip: untouched.
        assert_eq!(result.buffer.get(6, 0).unwrap().bg, Rgba::TERMINAL_DEFAULT);

        // The child's hit region is clipped too.
        let child_region = result
            .hit_regions
            .iter()
            .find(|r| r.component_index == child)
            .unwrap();
        assert_eq!(child_region.width, 5);
    }

    #[test]
    fn test_scroll_offset_shifts_children() {
        setup();

        let root = make_box(None);
        let rn = get_flex_node(root).unwrap();
        rn.width.set_value(Dimension::Cells(10));
        rn.height.set_value(Dimension::Cells(3));
        rn.overflow.set_value(2); // scroll

        // Two stacked rows of 1 cell height.
        for _ in 0..4 {
            let c = make_box(Some(root));
            let n = get_flex_node(c).unwrap();
            n.width.set_value(Dimension::Cells(10));
            n.height.set_value(Dimension::Cells(1));
            n.flex_shrink.set_value(0.0);
        }
        visual::set_bg(1, Rgba::rgb(1, 0, 0));
        visual::set_bg(2, Rgba::rgb(2, 0, 0));

        let fb = create_frame_buffer_derived(create_layout_derived());

        let result = fb.get();
        assert_eq!(result.buffer.get(0, 0).unwrap().bg, Rgba::rgb(1, 0, 0));

        // Scrolling down one row lifts child 2 to the top.
        interaction::set_scroll_offset(root, 0, 1);
        let result = fb.get();
        assert_eq!(result.buffer.get(0, 0).unwrap().bg, Rgba::rgb(2, 0, 0));
    }

    #[test]
    fn test_border_glyphs() {
        setup();

        let root = make_box(None);
        let rn = get_flex_node(root).unwrap();
        rn.width.set_value(Dimension::Cells(4));
        rn.height.set_value(Dimension::Cells(3));
        rn.border_top.set_value(1);
        rn.border_right.set_value(1);
        rn.border_bottom.set_value(1);
        rn.border_left.set_value(1);
        visual::set_border_style(root, BorderStyle::Single);

        let fb = create_frame_buffer_derived(create_layout_derived());
        let result = fb.get();

        assert_eq!(result.buffer.get(0, 0).unwrap().char, '┌' as u32);
        assert_eq!(result.buffer.get(3, 0).unwrap().char, '┐' as u32);
        assert_eq!(result.buffer.get(0, 2).unwrap().char, '└' as u32);
        assert_eq!(result.buffer.get(3, 2).unwrap().char, '┘' as u32);
        assert_eq!(result.buffer.get(1, 0).unwrap().char, '─' as u32);
        assert_eq!(result.buffer.get(0, 1).unwrap().char, '│' as u32);
    }
}
