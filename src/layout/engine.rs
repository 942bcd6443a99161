//! Flex layout engine.
//!
//! Computes final geometry for every allocated component from the FlexNode
//! slots and the core/text arrays:
//!
//! 1. Build children lists from `parent[]` (visible, order-sorted)
//! 2. BFS to get parents-before-children order
//! 3. Bottom-up intrinsic measurement (text measure, content bounds)
//! 4. Top-down placement: base sizes, wrap lines, grow/shrink with integer
//!    remainder distribution, justify/align, absolute children, scroll bounds
//! 5. Invisible nodes collapse to `(parent.x, parent.y, 0, 0)`
//!
//! Reading slots inside a derived subscribes it, so the layout derived
//! re-runs whenever any input changes. A dirty-set fast path returns the
//! cached geometry when no layout-affecting column was touched since the
//! last pass.

use std::cell::RefCell;
use std::rc::Rc;

use spark_signals::TrackedSlot;

use crate::engine::arrays::{core, dirty, text};
use crate::engine::{get_allocated_indices, get_flex_node, get_high_water_mark, FlexNode};
use crate::types::{
    AlignContent, AlignItems, AlignSelf, ComponentKind, Dimension, FlexDirection, FlexWrap,
    JustifyContent, Overflow, Position, TextWrap,
};

use super::text_measure::{measure_text_height, string_width};
use super::types::ComputedLayout;

// =============================================================================
// Cache (dirty-set fast path)
// =============================================================================

thread_local! {
    static LAYOUT_CACHE: RefCell<Option<(u16, u16, bool, ComputedLayout)>> =
        const { RefCell::new(None) };
}

/// Drop the cached geometry (registry reset, tests).
pub fn reset_layout_cache() {
    LAYOUT_CACHE.with(|c| *c.borrow_mut() = None);
}

// =============================================================================
// Slot read helpers
// =============================================================================

fn u8v(slot: &TrackedSlot<u8>) -> u8 {
    slot.get().unwrap_or(0)
}

fn u16v(slot: &TrackedSlot<u16>) -> u16 {
    slot.get().unwrap_or(0)
}

fn f32v(slot: &TrackedSlot<f32>, default: f32) -> f32 {
    let v = slot.get().unwrap_or(default);
    if v.is_finite() && v >= 0.0 {
        v
    } else {
        default
    }
}

fn dim(slot: &TrackedSlot<Dimension>) -> Dimension {
    slot.get().unwrap_or(Dimension::Auto)
}

/// Resolve a dimension against its containing block; Auto yields None.
fn resolve_dim(d: Dimension, containing: u16) -> Option<u16> {
    match d {
        Dimension::Auto => None,
        Dimension::Cells(n) => Some(n),
        Dimension::Percent(p) => {
            if p.is_finite() && p > 0.0 {
                Some((containing as f32 * p / 100.0).floor() as u16)
            } else {
                Some(0)
            }
        }
    }
}

/// Apply min/max constraints (Auto = unconstrained).
fn clamp_dim(value: u16, min_d: Dimension, max_d: Dimension, containing: u16) -> u16 {
    let mut v = value;
    if let Some(min) = resolve_dim(min_d, containing) {
        if v < min {
            v = min;
        }
    }
    if let Some(max) = resolve_dim(max_d, containing) {
        if max > 0 && v > max {
            v = max;
        }
    }
    v
}

fn border_w(slot: &TrackedSlot<u16>) -> u16 {
    if u16v(slot) > 0 {
        1
    } else {
        0
    }
}

struct Edges {
    top: u16,
    right: u16,
    bottom: u16,
    left: u16,
}

impl Edges {
    fn horizontal(&self) -> u16 {
        self.left + self.right
    }

    fn vertical(&self) -> u16 {
        self.top + self.bottom
    }
}

fn paddings(node: &FlexNode) -> Edges {
    Edges {
        top: u16v(&node.padding_top),
        right: u16v(&node.padding_right),
        bottom: u16v(&node.padding_bottom),
        left: u16v(&node.padding_left),
    }
}

fn borders(node: &FlexNode) -> Edges {
    Edges {
        top: border_w(&node.border_top),
        right: border_w(&node.border_right),
        bottom: border_w(&node.border_bottom),
        left: border_w(&node.border_left),
    }
}

fn margins(node: &FlexNode) -> Edges {
    Edges {
        top: u16v(&node.margin_top),
        right: u16v(&node.margin_right),
        bottom: u16v(&node.margin_bottom),
        left: u16v(&node.margin_left),
    }
}

// =============================================================================
// Working state
// =============================================================================

struct Ctx {
    children: Vec<Vec<usize>>,
    intrinsic_w: Vec<u16>,
    intrinsic_h: Vec<u16>,
    /// Final size came from content measurement rather than the viewport, an
    /// explicit dimension, stretch or grow. Child percentages resolve
    /// against 0 for such parents.
    content_sized_w: Vec<bool>,
    content_sized_h: Vec<bool>,
}

// =============================================================================
// Entry point
// =============================================================================

/// Compute layout for every allocated component.
///
/// `constrain_height` pins roots to the viewport height (fullscreen mode);
/// inline roots size to their content.
pub fn compute_layout(viewport_w: u16, viewport_h: u16, constrain_height: bool) -> ComputedLayout {
    // Fast path: nothing layout-affecting changed since the cached pass.
    // Only valid outside a reactive computation — a derived re-runs because
    // an upstream source changed, and signal-bound slots change without
    // touching the dirty sets (and the cached return would skip the reads
    // that re-register its dependencies).
    if !spark_signals::is_tracking() {
        let cached = LAYOUT_CACHE.with(|c| {
            c.borrow().as_ref().and_then(|(w, h, ch, layout)| {
                if *w == viewport_w
                    && *h == viewport_h
                    && *ch == constrain_height
                    && dirty::layout_inputs_clean()
                {
                    Some(layout.clone())
                } else {
                    None
                }
            })
        });
        if let Some(layout) = cached {
            return layout;
        }
    }

    let mut indices = get_allocated_indices();
    indices.sort_unstable();

    if indices.is_empty() {
        let empty = ComputedLayout::new();
        LAYOUT_CACHE.with(|c| {
            *c.borrow_mut() = Some((viewport_w, viewport_h, constrain_height, empty.clone()));
        });
        dirty::clear_layout_inputs();
        return empty;
    }

    let max_index = *indices.last().unwrap();
    let size = get_high_water_mark().max(max_index + 1);

    let mut out = ComputedLayout::with_capacity(size);
    let mut ctx = Ctx {
        children: vec![Vec::new(); size],
        intrinsic_w: vec![0; size],
        intrinsic_h: vec![0; size],
        content_sized_w: vec![false; size],
        content_sized_h: vec![false; size],
    };

    // -------------------------------------------------------------------------
    // Pass 1: children lists and roots (visible nodes only)
    // -------------------------------------------------------------------------

    let mut visible = vec![false; size];
    for &i in &indices {
        visible[i] = core::get_visible(i);
    }

    let mut roots: Vec<usize> = Vec::new();
    for &i in &indices {
        if !visible[i] {
            continue;
        }
        match core::get_parent(i) {
            Some(p) if p < size && visible[p] => {
                ctx.children[p].push(i);
            }
            // Missing or invisible parents collapse to root.
            _ => roots.push(i),
        }
    }

    for list in ctx.children.iter_mut() {
        list.sort_by_key(|&c| {
            let order = get_flex_node(c)
                .map(|n| n.order.get().unwrap_or(0))
                .unwrap_or(0);
            (order, c)
        });
    }

    // -------------------------------------------------------------------------
    // Pass 2: BFS (parents before children)
    // -------------------------------------------------------------------------

    let mut bfs: Vec<usize> = roots.clone();
    let mut head = 0;
    while head < bfs.len() {
        let parent = bfs[head];
        head += 1;
        bfs.extend_from_slice(&ctx.children[parent]);
    }

    // -------------------------------------------------------------------------
    // Pass 3: intrinsic sizes (bottom-up)
    // -------------------------------------------------------------------------

    for idx in (0..bfs.len()).rev() {
        measure_intrinsic(bfs[idx], &mut ctx);
    }

    // -------------------------------------------------------------------------
    // Pass 4: place roots, then lay out children top-down
    // -------------------------------------------------------------------------

    for &root in &roots {
        let Some(node) = get_flex_node(root) else {
            continue;
        };
        let ew = resolve_dim(dim(&node.width), viewport_w);
        let eh = resolve_dim(dim(&node.height), viewport_h);

        out.x[root] = 0;
        out.y[root] = 0;
        out.width[root] = clamp_dim(
            ew.unwrap_or(viewport_w),
            dim(&node.min_width),
            dim(&node.max_width),
            viewport_w,
        );
        let h = match eh {
            Some(h) => h,
            None if constrain_height => viewport_h,
            None => {
                ctx.content_sized_h[root] = true;
                ctx.intrinsic_h[root]
            }
        };
        out.height[root] = clamp_dim(h, dim(&node.min_height), dim(&node.max_height), viewport_h);
    }

    for idx in 0..bfs.len() {
        layout_children(bfs[idx], &mut ctx, &mut out);
    }

    // -------------------------------------------------------------------------
    // Pass 5: invisible nodes collapse onto their parent's origin
    // -------------------------------------------------------------------------

    let mut hidden: Vec<usize> = indices.iter().copied().filter(|&i| !visible[i]).collect();
    hidden.sort_by_key(|&i| depth_of(i));
    for i in hidden {
        let (px, py) = match core::get_parent(i) {
            Some(p) if p < size => (out.x[p], out.y[p]),
            _ => (0, 0),
        };
        out.x[i] = px;
        out.y[i] = py;
        out.width[i] = 0;
        out.height[i] = 0;
    }

    // -------------------------------------------------------------------------
    // Content scalars
    // -------------------------------------------------------------------------

    for &root in &roots {
        out.content_width = out.content_width.max(out.x[root] + out.width[root]);
        out.content_height = out.content_height.max(out.y[root] + out.height[root]);
    }

    LAYOUT_CACHE.with(|c| {
        *c.borrow_mut() = Some((viewport_w, viewport_h, constrain_height, out.clone()));
    });
    dirty::clear_layout_inputs();

    out
}

fn depth_of(index: usize) -> usize {
    let mut depth = 0;
    let mut current = core::get_parent(index);
    while let Some(p) = current {
        depth += 1;
        if depth > 1024 {
            break; // cycle guard
        }
        current = core::get_parent(p);
    }
    depth
}

// =============================================================================
// Intrinsic measurement (bottom-up)
// =============================================================================

fn measure_intrinsic(i: usize, ctx: &mut Ctx) {
    let kind = core::get_kind(i);
    let Some(node) = get_flex_node(i) else {
        return;
    };
    let pad = paddings(&node);
    let bord = borders(&node);

    match kind {
        ComponentKind::Text => {
            let content = text::get_content(i);
            if !content.is_empty() {
                ctx.intrinsic_w[i] = string_width(&content) + pad.horizontal() + bord.horizontal();
                // Height refines to the wrapped line count once the final
                // width is known in the placement pass.
                ctx.intrinsic_h[i] =
                    measure_text_height(&content, u16::MAX) + pad.vertical() + bord.vertical();
            }
        }
        ComponentKind::Input => {
            let content = text::get_content(i);
            // One extra cell keeps the caret visible at the end of the value.
            ctx.intrinsic_w[i] = string_width(&content) + pad.horizontal() + bord.horizontal() + 1;
            ctx.intrinsic_h[i] = 1 + pad.vertical() + bord.vertical();
        }
        ComponentKind::Box => {
            let overflow = Overflow::from(u8v(&node.overflow));
            let scroll_container = matches!(overflow, Overflow::Scroll | Overflow::Auto);

            if scroll_container || ctx.children[i].is_empty() {
                // Scroll containers do not grow with their content.
                ctx.intrinsic_w[i] = pad.horizontal() + bord.horizontal();
                ctx.intrinsic_h[i] = pad.vertical() + bord.vertical();
                return;
            }

            let direction = FlexDirection::from(u8v(&node.flex_direction));
            let is_row = direction.is_row();
            let main_gap = if is_row {
                u16v(&node.column_gap)
            } else {
                u16v(&node.row_gap)
            };

            let mut sum_main: u16 = 0;
            let mut max_cross: u16 = 0;
            let mut flow_count: u16 = 0;

            let kids: Vec<usize> = ctx.children[i].clone();
            for k in kids {
                let Some(kn) = get_flex_node(k) else {
                    continue;
                };
                if Position::from(u8v(&kn.position)) == Position::Absolute {
                    continue;
                }
                flow_count += 1;

                // Percentages cannot contribute to a content-sized parent.
                let kw = resolve_dim(dim(&kn.width), 0).unwrap_or(ctx.intrinsic_w[k]);
                let kh = resolve_dim(dim(&kn.height), 0).unwrap_or(ctx.intrinsic_h[k]);
                let km = margins(&kn);

                if is_row {
                    sum_main = sum_main.saturating_add(kw + km.horizontal() + main_gap);
                    max_cross = max_cross.max(kh + km.vertical());
                } else {
                    sum_main = sum_main.saturating_add(kh + km.vertical() + main_gap);
                    max_cross = max_cross.max(kw + km.horizontal());
                }
            }

            if flow_count > 0 {
                sum_main = sum_main.saturating_sub(main_gap);
            }

            if is_row {
                ctx.intrinsic_w[i] = sum_main + pad.horizontal() + bord.horizontal();
                ctx.intrinsic_h[i] = max_cross + pad.vertical() + bord.vertical();
            } else {
                ctx.intrinsic_w[i] = max_cross + pad.horizontal() + bord.horizontal();
                ctx.intrinsic_h[i] = sum_main + pad.vertical() + bord.vertical();
            }
        }
        _ => {}
    }
}

// =============================================================================
// Placement
// =============================================================================

struct Line {
    start: usize,
    end: usize, // exclusive
}

#[allow(clippy::too_many_arguments)]
fn layout_children(parent: usize, ctx: &mut Ctx, out: &mut ComputedLayout) {
    let Some(pnode) = get_flex_node(parent) else {
        return;
    };

    let kids: Vec<usize> = ctx.children[parent].clone();

    let pad = paddings(&pnode);
    let bord = borders(&pnode);

    let content_x = out.x[parent] + pad.left + bord.left;
    let content_y = out.y[parent] + pad.top + bord.top;
    let content_w = out.width[parent].saturating_sub(pad.horizontal() + bord.horizontal());
    let content_h = out.height[parent].saturating_sub(pad.vertical() + bord.vertical());

    // Percentage containing blocks: 0 when the parent is content-sized.
    let containing_w = if ctx.content_sized_w[parent] {
        0
    } else {
        content_w
    };
    let containing_h = if ctx.content_sized_h[parent] {
        0
    } else {
        content_h
    };

    let direction = FlexDirection::from(u8v(&pnode.flex_direction));
    let is_row = direction.is_row();
    let is_reverse = direction.is_reverse();
    let wrap = FlexWrap::from(u8v(&pnode.flex_wrap));
    let justify = JustifyContent::from(u8v(&pnode.justify_content));
    let align_items = AlignItems::from(u8v(&pnode.align_items));
    let align_content = AlignContent::from(u8v(&pnode.align_content));
    let overflow = Overflow::from(u8v(&pnode.overflow));
    let scroll_container = matches!(overflow, Overflow::Scroll | Overflow::Auto);

    let main_gap = if is_row {
        u16v(&pnode.column_gap)
    } else {
        u16v(&pnode.row_gap)
    };
    let line_gap = if is_row {
        u16v(&pnode.row_gap)
    } else {
        u16v(&pnode.column_gap)
    };

    let main_size = if is_row { content_w } else { content_h };
    let cross_size = if is_row { content_h } else { content_w };
    let containing_main = if is_row { containing_w } else { containing_h };
    let containing_cross = if is_row { containing_h } else { containing_w };

    let mut flow: Vec<usize> = Vec::new();
    let mut absolute: Vec<usize> = Vec::new();
    for &k in &kids {
        let is_abs = get_flex_node(k)
            .map(|n| Position::from(u8v(&n.position)) == Position::Absolute)
            .unwrap_or(false);
        if is_abs {
            absolute.push(k);
        } else {
            flow.push(k);
        }
    }

    // Content extents relative to the content origin, for scroll bounds.
    let mut extent_x: u16 = 0;
    let mut extent_y: u16 = 0;

    if !flow.is_empty() {
        // ---------------------------------------------------------------------
        // Base main sizes (flexBasis, else explicit main dim, else intrinsic),
        // clamped before flexing.
        // ---------------------------------------------------------------------

        let n = flow.len();
        let mut base_main = vec![0u16; n];
        let mut margin_main = vec![0u16; n];
        let mut margin_cross = vec![0u16; n];
        let mut explicit_main = vec![false; n];

        for (fi, &k) in flow.iter().enumerate() {
            let Some(kn) = get_flex_node(k) else {
                continue;
            };
            let km = margins(&kn);
            margin_main[fi] = if is_row {
                km.horizontal()
            } else {
                km.vertical()
            };
            margin_cross[fi] = if is_row {
                km.vertical()
            } else {
                km.horizontal()
            };

            let main_dim = if is_row {
                dim(&kn.width)
            } else {
                dim(&kn.height)
            };
            let basis = resolve_dim(dim(&kn.flex_basis), containing_main);
            let explicit = resolve_dim(main_dim, containing_main);
            explicit_main[fi] = basis.is_some() || explicit.is_some();

            let intrinsic = if is_row {
                ctx.intrinsic_w[k]
            } else {
                ctx.intrinsic_h[k]
            };
            let raw = basis.or(explicit).unwrap_or(intrinsic);

            let (min_d, max_d) = if is_row {
                (dim(&kn.min_width), dim(&kn.max_width))
            } else {
                (dim(&kn.min_height), dim(&kn.max_height))
            };
            base_main[fi] = clamp_dim(raw, min_d, max_d, containing_main);
        }

        // ---------------------------------------------------------------------
        // Partition into lines (greedy)
        // ---------------------------------------------------------------------

        let mut lines: Vec<Line> = Vec::new();
        if wrap == FlexWrap::NoWrap {
            lines.push(Line { start: 0, end: n });
        } else {
            let mut start = 0;
            let mut used: u32 = 0;
            for fi in 0..n {
                let item = (base_main[fi] + margin_main[fi]) as u32;
                let needed = if fi > start {
                    used + main_gap as u32 + item
                } else {
                    item
                };
                if fi > start && needed > main_size as u32 {
                    lines.push(Line { start, end: fi });
                    start = fi;
                    used = item;
                } else {
                    used = needed;
                }
            }
            lines.push(Line { start, end: n });
        }

        let line_count = lines.len() as u16;

        // ---------------------------------------------------------------------
        // Resolve grow/shrink per line
        // ---------------------------------------------------------------------

        let mut final_main = base_main.clone();

        for line in &lines {
            let count = (line.end - line.start) as u16;
            let gaps = main_gap as i32 * (count as i32 - 1).max(0);
            let used: i32 = (line.start..line.end)
                .map(|fi| (base_main[fi] + margin_main[fi]) as i32)
                .sum::<i32>()
                + gaps;
            let free = main_size as i32 - used;

            let mut total_grow = 0.0f32;
            let mut total_shrink = 0.0f32;
            for fi in line.start..line.end {
                if let Some(kn) = get_flex_node(flow[fi]) {
                    total_grow += f32v(&kn.flex_grow, 0.0);
                    total_shrink += f32v(&kn.flex_shrink, 1.0);
                } else {
                    total_shrink += 1.0;
                }
            }

            if free > 0 && total_grow > 0.0 {
                // Integer shares, remainder distributed left to right so the
                // line fills exactly.
                let mut distributed = 0i32;
                let mut shares = vec![0i32; line.end - line.start];
                for (si, fi) in (line.start..line.end).enumerate() {
                    if let Some(kn) = get_flex_node(flow[fi]) {
                        let grow = f32v(&kn.flex_grow, 0.0);
                        let share = ((free as f32) * grow / total_grow).floor() as i32;
                        shares[si] = share;
                        distributed += share;
                    }
                }
                let mut remainder = free - distributed;
                for (si, fi) in (line.start..line.end).enumerate() {
                    let grows = get_flex_node(flow[fi])
                        .map(|kn| f32v(&kn.flex_grow, 0.0) > 0.0)
                        .unwrap_or(false);
                    if remainder > 0 && grows {
                        shares[si] += 1;
                        remainder -= 1;
                    }
                }
                for (si, fi) in (line.start..line.end).enumerate() {
                    final_main[fi] = (base_main[fi] as i32 + shares[si]).max(0) as u16;
                }
            } else if free < 0 && total_shrink > 0.0 && !scroll_container {
                let deficit = -free;
                let mut shares = vec![0i32; line.end - line.start];
                let mut distributed = 0i32;
                for (si, fi) in (line.start..line.end).enumerate() {
                    if let Some(kn) = get_flex_node(flow[fi]) {
                        let shrink = f32v(&kn.flex_shrink, 1.0);
                        let share = ((deficit as f32) * shrink / total_shrink).floor() as i32;
                        shares[si] = share;
                        distributed += share;
                    }
                }
                let mut remainder = deficit - distributed;
                for (si, fi) in (line.start..line.end).enumerate() {
                    let shrinks = get_flex_node(flow[fi])
                        .map(|kn| f32v(&kn.flex_shrink, 1.0) > 0.0)
                        .unwrap_or(true);
                    if remainder > 0 && shrinks {
                        shares[si] += 1;
                        remainder -= 1;
                    }
                }
                for (si, fi) in (line.start..line.end).enumerate() {
                    final_main[fi] = (base_main[fi] as i32 - shares[si]).max(0) as u16;
                }
            }

            // Clamp again after flexing.
            for fi in line.start..line.end {
                if let Some(kn) = get_flex_node(flow[fi]) {
                    let (min_d, max_d) = if is_row {
                        (dim(&kn.min_width), dim(&kn.max_width))
                    } else {
                        (dim(&kn.min_height), dim(&kn.max_height))
                    };
                    final_main[fi] = clamp_dim(final_main[fi], min_d, max_d, containing_main);
                }
            }
        }

        // ---------------------------------------------------------------------
        // Line cross sizes
        // ---------------------------------------------------------------------

        let gap_total = line_gap * line_count.saturating_sub(1);
        let stretch_line_cross = if line_count > 0 {
            cross_size.saturating_sub(gap_total) / line_count
        } else {
            0
        };

        let cross_for_line = |line: &Line, ctx: &Ctx| -> u16 {
            if align_content == AlignContent::Stretch {
                // Terminal cells are integral: flooring divides the cross
                // space equally with any remainder left at the end.
                return stretch_line_cross;
            }
            let mut max_cross = 0u16;
            for fi in line.start..line.end {
                let k = flow[fi];
                let Some(kn) = get_flex_node(k) else {
                    continue;
                };
                let cross_dim = if is_row {
                    dim(&kn.height)
                } else {
                    dim(&kn.width)
                };
                let intrinsic = if is_row {
                    ctx.intrinsic_h[k]
                } else {
                    ctx.intrinsic_w[k]
                };
                let c = resolve_dim(cross_dim, containing_cross).unwrap_or(intrinsic);
                max_cross = max_cross.max(c + margin_cross[fi]);
            }
            max_cross
        };

        let line_cross: Vec<u16> = lines.iter().map(|l| cross_for_line(l, ctx)).collect();
        let lines_total: u16 = line_cross.iter().sum::<u16>() + gap_total;

        // Cross offset of the first line per alignContent.
        let free_cross = cross_size as i32 - lines_total as i32;
        let (mut line_offset, extra_line_gap) = match align_content {
            AlignContent::Center if free_cross > 0 => (free_cross / 2, 0),
            AlignContent::FlexEnd if free_cross > 0 => (free_cross, 0),
            AlignContent::SpaceBetween if free_cross > 0 && line_count > 1 => {
                (0, free_cross / (line_count as i32 - 1))
            }
            AlignContent::SpaceAround if free_cross > 0 => {
                let around = free_cross / line_count as i32;
                (around / 2, around)
            }
            _ => (0, 0),
        };

        // ---------------------------------------------------------------------
        // Position items line by line
        // ---------------------------------------------------------------------

        let line_iter: Vec<usize> = if wrap == FlexWrap::WrapReverse {
            (0..lines.len()).rev().collect()
        } else {
            (0..lines.len()).collect()
        };

        for &li in &line_iter {
            let line = &lines[li];
            let this_cross = line_cross[li];
            let count = (line.end - line.start) as i32;

            let line_main: i32 = (line.start..line.end)
                .map(|fi| (final_main[fi] + margin_main[fi]) as i32)
                .sum::<i32>()
                + main_gap as i32 * (count - 1).max(0);

            let remaining = main_size as i32 - line_main;

            // Negative free space is forced to flex-start; space-between
            // with a single item starts at the beginning.
            let (lead, item_gap) = if remaining <= 0 {
                (0, main_gap as i32)
            } else {
                match justify {
                    JustifyContent::FlexStart => (0, main_gap as i32),
                    JustifyContent::Center => (remaining / 2, main_gap as i32),
                    JustifyContent::FlexEnd => (remaining, main_gap as i32),
                    JustifyContent::SpaceBetween => {
                        if count > 1 {
                            (0, remaining / (count - 1) + main_gap as i32)
                        } else {
                            (0, main_gap as i32)
                        }
                    }
                    JustifyContent::SpaceAround => {
                        let around = remaining / count.max(1);
                        (around / 2, around + main_gap as i32)
                    }
                    JustifyContent::SpaceEvenly => {
                        let evenly = remaining / (count + 1);
                        (evenly, evenly + main_gap as i32)
                    }
                }
            };

            let mut cursor = lead;

            for fi in line.start..line.end {
                let k = flow[fi];
                let Some(kn) = get_flex_node(k) else {
                    continue;
                };
                let km = margins(&kn);

                // Cross size: explicit, else stretch into the line, else
                // intrinsic; clamped against the cross containing block.
                let cross_dim = if is_row {
                    dim(&kn.height)
                } else {
                    dim(&kn.width)
                };
                let self_align = AlignSelf::from(u8v(&kn.align_self))
                    .to_align_items()
                    .unwrap_or(align_items);
                let intrinsic_cross = if is_row {
                    ctx.intrinsic_h[k]
                } else {
                    ctx.intrinsic_w[k]
                };

                let explicit_cross = resolve_dim(cross_dim, containing_cross);
                let mut child_cross = match explicit_cross {
                    Some(c) => c,
                    None if self_align == AlignItems::Stretch => {
                        this_cross.saturating_sub(margin_cross[fi])
                    }
                    None => intrinsic_cross,
                };
                let (cmin, cmax) = if is_row {
                    (dim(&kn.min_height), dim(&kn.max_height))
                } else {
                    (dim(&kn.min_width), dim(&kn.max_width))
                };
                child_cross = clamp_dim(child_cross, cmin, cmax, containing_cross);

                let cross_free =
                    this_cross as i32 - child_cross as i32 - margin_cross[fi] as i32;
                let cross_pos = match self_align {
                    AlignItems::Center => (cross_free / 2).max(0),
                    AlignItems::FlexEnd => cross_free.max(0),
                    _ => 0, // Stretch, FlexStart, Baseline
                };

                // Track whether the child ended up content-sized.
                let grew = free_space_grew(&kn, explicit_main[fi]);
                let main_content_sized = !explicit_main[fi] && !grew;
                let cross_content_sized =
                    explicit_cross.is_none() && self_align != AlignItems::Stretch;
                if is_row {
                    ctx.content_sized_w[k] = main_content_sized;
                    ctx.content_sized_h[k] = cross_content_sized;
                } else {
                    ctx.content_sized_h[k] = main_content_sized;
                    ctx.content_sized_w[k] = cross_content_sized;
                }

                // Main position (mirrored for reverse directions).
                let main_pos = if is_reverse {
                    main_size as i32
                        - cursor
                        - final_main[fi] as i32
                        - margin_main[fi] as i32
                } else {
                    cursor
                };

                let (mx, my, mw, mh);
                if is_row {
                    mx = content_x as i32 + main_pos + km.left as i32;
                    my = content_y as i32 + line_offset + cross_pos + km.top as i32;
                    mw = final_main[fi];
                    mh = child_cross;
                } else {
                    mx = content_x as i32 + line_offset + cross_pos + km.left as i32;
                    my = content_y as i32 + main_pos + km.top as i32;
                    mw = child_cross;
                    mh = final_main[fi];
                }

                out.x[k] = mx.max(0) as u16;
                out.y[k] = my.max(0) as u16;
                out.width[k] = mw;
                out.height[k] = mh;

                // Text height follows the final width when wrapping.
                if core::get_kind(k) == ComponentKind::Text {
                    refine_text_height(k, &kn, out);
                }

                let right = out.x[k].saturating_sub(content_x) + out.width[k] + km.right;
                let bottom = out.y[k].saturating_sub(content_y) + out.height[k] + km.bottom;
                extent_x = extent_x.max(right);
                extent_y = extent_y.max(bottom);

                cursor += final_main[fi] as i32 + margin_main[fi] as i32 + item_gap;
            }

            line_offset += this_cross as i32 + line_gap as i32 + extra_line_gap;
        }
    }

    // -------------------------------------------------------------------------
    // Absolutely positioned children (containing block = this parent)
    // -------------------------------------------------------------------------

    for &k in &absolute {
        let Some(kn) = get_flex_node(k) else {
            continue;
        };

        let cb_x = out.x[parent];
        let cb_y = out.y[parent];
        let cb_w = out.width[parent];
        let cb_h = out.height[parent];

        let left = resolve_dim(dim(&kn.inset_left), cb_w);
        let right = resolve_dim(dim(&kn.inset_right), cb_w);
        let top = resolve_dim(dim(&kn.inset_top), cb_h);
        let bottom = resolve_dim(dim(&kn.inset_bottom), cb_h);

        let mut w = match (resolve_dim(dim(&kn.width), cb_w), left, right) {
            (Some(w), _, _) => w,
            (None, Some(l), Some(r)) => cb_w.saturating_sub(l + r),
            _ => ctx.intrinsic_w[k],
        };
        w = clamp_dim(w, dim(&kn.min_width), dim(&kn.max_width), cb_w);

        let mut h = match (resolve_dim(dim(&kn.height), cb_h), top, bottom) {
            (Some(h), _, _) => h,
            (None, Some(t), Some(b)) => cb_h.saturating_sub(t + b),
            _ => ctx.intrinsic_h[k],
        };
        h = clamp_dim(h, dim(&kn.min_height), dim(&kn.max_height), cb_h);

        let x = match (left, right) {
            (Some(l), _) => cb_x as i32 + l as i32,
            (None, Some(r)) => cb_x as i32 + cb_w as i32 - r as i32 - w as i32,
            (None, None) => content_x as i32,
        };
        let y = match (top, bottom) {
            (Some(t), _) => cb_y as i32 + t as i32,
            (None, Some(b)) => cb_y as i32 + cb_h as i32 - b as i32 - h as i32,
            (None, None) => content_y as i32,
        };

        out.x[k] = x.max(0) as u16;
        out.y[k] = y.max(0) as u16;
        out.width[k] = w;
        out.height[k] = h;

        ctx.content_sized_w[k] = resolve_dim(dim(&kn.width), cb_w).is_none();
        ctx.content_sized_h[k] = resolve_dim(dim(&kn.height), cb_h).is_none();

        // Out-of-flow children still extend the scroll content bounds.
        let ext_r = (out.x[k] + out.width[k]).saturating_sub(content_x);
        let ext_b = (out.y[k] + out.height[k]).saturating_sub(content_y);
        extent_x = extent_x.max(ext_r);
        extent_y = extent_y.max(ext_b);
    }

    // -------------------------------------------------------------------------
    // Scroll bounds
    // -------------------------------------------------------------------------

    if scroll_container {
        let max_scroll_x = extent_x.saturating_sub(content_w);
        let max_scroll_y = extent_y.saturating_sub(content_h);
        let scrollable = overflow == Overflow::Scroll
            || (overflow == Overflow::Auto && (max_scroll_x > 0 || max_scroll_y > 0));
        if scrollable {
            out.scrollable[parent] = 1;
            out.max_scroll_x[parent] = max_scroll_x;
            out.max_scroll_y[parent] = max_scroll_y;
        }
    }
}

/// Whether grow participated in the item's final main size.
fn free_space_grew(node: &Rc<FlexNode>, explicit: bool) -> bool {
    !explicit && f32v(&node.flex_grow, 0.0) > 0.0
}

/// Re-measure a text child once its final width is known.
fn refine_text_height(k: usize, kn: &Rc<FlexNode>, out: &mut ComputedLayout) {
    if text::get_wrap(k) != TextWrap::Wrap {
        return;
    }
    let content = text::get_content(k);
    if content.is_empty() {
        return;
    }
    // An explicit height wins over the measured line count.
    if !matches!(dim(&kn.height), Dimension::Auto) {
        return;
    }

    let pad = paddings(kn);
    let bord = borders(kn);
    let inner_w = out.width[k].saturating_sub(pad.horizontal() + bord.horizontal());
    let lines = measure_text_height(&content, inner_w.max(1));
    out.height[k] = lines.max(1) + pad.vertical() + bord.vertical();
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::arrays::core as core_arrays;
    use crate::engine::arrays::text as text_arrays;
    use crate::engine::{allocate_index, create_flex_node, reset_registry};
    use crate::types::ComponentKind;

    fn setup() {
        reset_registry();
    }

    fn make_box(parent: Option<usize>) -> usize {
        let idx = allocate_index(None);
        core_arrays::set_kind(idx, ComponentKind::Box);
        if let Some(p) = parent {
            core_arrays::set_parent(idx, Some(p));
        }
        create_flex_node(idx);
        idx
    }

    fn make_text(parent: usize, content: &str) -> usize {
        let idx = allocate_index(None);
        core_arrays::set_kind(idx, ComponentKind::Text);
        core_arrays::set_parent(idx, Some(parent));
        text_arrays::set_content(idx, content.to_string());
        create_flex_node(idx);
        idx
    }

    #[test]
    fn test_empty_layout() {
        setup();
        let layout = compute_layout(80, 24, true);
        assert_eq!(layout.content_width, 0);
        assert_eq!(layout.content_height, 0);
    }

    #[test]
    fn test_single_root_explicit_size() {
        setup();

        let idx = make_box(None);
        let node = get_flex_node(idx).unwrap();
        node.width.set_value(Dimension::Cells(40));
        node.height.set_value(Dimension::Cells(10));

        let layout = compute_layout(80, 24, true);
        assert_eq!(layout.rect(idx), (0, 0, 40, 10));
    }

    #[test]
    fn test_root_defaults_to_viewport() {
        setup();

        let idx = make_box(None);
        let layout = compute_layout(80, 24, true);
        assert_eq!(layout.rect(idx), (0, 0, 80, 24));
    }

    #[test]
    fn test_zero_viewport_all_zero() {
        setup();

        let root = make_box(None);
        let child = make_box(Some(root));
        let node = get_flex_node(child).unwrap();
        node.width.set_value(Dimension::Percent(100.0));
        node.height.set_value(Dimension::Percent(100.0));

        let layout = compute_layout(0, 0, true);
        assert_eq!(layout.rect(root), (0, 0, 0, 0));
        assert_eq!(layout.rect(child), (0, 0, 0, 0));
    }

    #[test]
    fn test_row_of_three_equal_grow() {
        setup();

        let parent = make_box(None);
        let pn = get_flex_node(parent).unwrap();
        pn.width.set_value(Dimension::Cells(99));
        pn.height.set_value(Dimension::Cells(3));
        pn.flex_direction.set_value(1); // row

        let mut kids = Vec::new();
        for _ in 0..3 {
            let k = make_box(Some(parent));
            let kn = get_flex_node(k).unwrap();
            kn.height.set_value(Dimension::Cells(1));
            kn.flex_grow.set_value(1.0);
            kids.push(k);
        }

        let layout = compute_layout(120, 40, true);
        assert_eq!(layout.width[kids[0]], 33);
        assert_eq!(layout.width[kids[1]], 33);
        assert_eq!(layout.width[kids[2]], 33);
        assert_eq!(layout.x[kids[0]], 0);
        assert_eq!(layout.x[kids[1]], 33);
        assert_eq!(layout.x[kids[2]], 66);
    }

    #[test]
    fn test_grow_remainder_distributed_left_to_right() {
        setup();

        let parent = make_box(None);
        let pn = get_flex_node(parent).unwrap();
        pn.width.set_value(Dimension::Cells(100));
        pn.height.set_value(Dimension::Cells(3));
        pn.flex_direction.set_value(1);

        let mut kids = Vec::new();
        for _ in 0..3 {
            let k = make_box(Some(parent));
            let kn = get_flex_node(k).unwrap();
            kn.height.set_value(Dimension::Cells(1));
            kn.flex_grow.set_value(1.0);
            kids.push(k);
        }

        let layout = compute_layout(120, 40, true);
        // 100 = 34 + 33 + 33; the remainder lands on the first item.
        assert_eq!(layout.width[kids[0]], 34);
        assert_eq!(layout.width[kids[1]], 33);
        assert_eq!(layout.width[kids[2]], 33);
        assert_eq!(
            layout.width[kids[0]] + layout.width[kids[1]] + layout.width[kids[2]],
            100
        );
    }

    #[test]
    fn test_percent_cascade_floors() {
        setup();

        let root = make_box(None);
        let rn = get_flex_node(root).unwrap();
        rn.width.set_value(Dimension::Cells(100));
        rn.height.set_value(Dimension::Cells(100));

        let child = make_box(Some(root));
        let cn = get_flex_node(child).unwrap();
        cn.width.set_value(Dimension::Percent(90.0));
        cn.height.set_value(Dimension::Cells(50));

        let grandchild = make_box(Some(child));
        let gn = get_flex_node(grandchild).unwrap();
        gn.width.set_value(Dimension::Percent(90.0));
        gn.height.set_value(Dimension::Cells(10));

        let layout = compute_layout(100, 100, true);
        assert_eq!(layout.width[root], 100);
        assert_eq!(layout.width[child], 90);
        assert_eq!(layout.width[grandchild], 81);
    }

    #[test]
    fn test_percent_of_content_sized_parent_is_zero() {
        setup();

        let root = make_box(None);
        let rn = get_flex_node(root).unwrap();
        rn.width.set_value(Dimension::Cells(100));
        rn.height.set_value(Dimension::Cells(50));
        rn.flex_direction.set_value(1); // row
        rn.align_items.set_value(1); // flex-start: no cross stretch

        // Auto-width parent in a row: main-sized by content.
        let parent = make_box(Some(root));
        let child = make_box(Some(parent));
        let cn = get_flex_node(child).unwrap();
        cn.width.set_value(Dimension::Percent(100.0));
        cn.height.set_value(Dimension::Cells(1));

        let layout = compute_layout(100, 50, true);
        assert_eq!(layout.width[child], 0);
    }

    #[test]
    fn test_wrap_lines_and_align_content_stretch() {
        setup();

        let parent = make_box(None);
        let pn = get_flex_node(parent).unwrap();
        pn.width.set_value(Dimension::Cells(50));
        pn.height.set_value(Dimension::Cells(50));
        pn.flex_direction.set_value(1); // row
        pn.flex_wrap.set_value(1); // wrap

        let mut kids = Vec::new();
        for _ in 0..3 {
            let k = make_box(Some(parent));
            let kn = get_flex_node(k).unwrap();
            kn.width.set_value(Dimension::Cells(30));
            kn.height.set_value(Dimension::Cells(10));
            kids.push(k);
        }

        let layout = compute_layout(80, 60, true);
        // Three lines; stretch floors 50/3 = 16 per line.
        assert_eq!(layout.y[kids[0]], 0);
        assert_eq!(layout.y[kids[1]], 16);
        assert_eq!(layout.y[kids[2]], 32);
        assert_eq!(layout.x[kids[1]], 0);
    }

    #[test]
    fn test_scroll_bounds() {
        setup();

        let parent = make_box(None);
        let pn = get_flex_node(parent).unwrap();
        pn.width.set_value(Dimension::Cells(50));
        pn.height.set_value(Dimension::Cells(20));
        pn.overflow.set_value(2); // scroll

        let child = make_box(Some(parent));
        let cn = get_flex_node(child).unwrap();
        cn.width.set_value(Dimension::Cells(50));
        cn.height.set_value(Dimension::Cells(100));

        let layout = compute_layout(80, 24, true);
        assert_eq!(layout.scrollable[parent], 1);
        assert_eq!(layout.max_scroll_y[parent], 80);
        assert_eq!(layout.max_scroll_x[parent], 0);
        // Scroll containers do not shrink their children.
        assert_eq!(layout.height[child], 100);
    }

    #[test]
    fn test_overflow_auto_without_overflow_not_scrollable() {
        setup();

        let parent = make_box(None);
        let pn = get_flex_node(parent).unwrap();
        pn.width.set_value(Dimension::Cells(50));
        pn.height.set_value(Dimension::Cells(20));
        pn.overflow.set_value(3); // auto

        let child = make_box(Some(parent));
        let cn = get_flex_node(child).unwrap();
        cn.width.set_value(Dimension::Cells(10));
        cn.height.set_value(Dimension::Cells(10));

        let layout = compute_layout(80, 24, true);
        assert_eq!(layout.scrollable[parent], 0);
    }

    #[test]
    fn test_visibility_skip() {
        setup();

        let parent = make_box(None);
        let pn = get_flex_node(parent).unwrap();
        pn.width.set_value(Dimension::Cells(80));
        pn.height.set_value(Dimension::Cells(5));
        pn.flex_direction.set_value(1);

        let a = make_box(Some(parent));
        get_flex_node(a).unwrap().width.set_value(Dimension::Cells(20));
        get_flex_node(a).unwrap().height.set_value(Dimension::Cells(1));

        let b = make_box(Some(parent));
        get_flex_node(b).unwrap().width.set_value(Dimension::Cells(20));
        core_arrays::set_visible(b, false);

        let c = make_box(Some(parent));
        get_flex_node(c).unwrap().width.set_value(Dimension::Cells(20));
        get_flex_node(c).unwrap().height.set_value(Dimension::Cells(1));

        let layout = compute_layout(80, 24, true);
        assert_eq!(layout.x[c], layout.x[a] + 20);
        // Invisible node collapses onto the parent origin.
        assert_eq!(layout.rect(b), (layout.x[parent], layout.y[parent], 0, 0));
    }

    #[test]
    fn test_space_between_single_child() {
        setup();

        let parent = make_box(None);
        let pn = get_flex_node(parent).unwrap();
        pn.width.set_value(Dimension::Cells(50));
        pn.height.set_value(Dimension::Cells(5));
        pn.flex_direction.set_value(1);
        pn.justify_content.set_value(3); // space-between

        let child = make_box(Some(parent));
        let cn = get_flex_node(child).unwrap();
        cn.width.set_value(Dimension::Cells(10));
        cn.height.set_value(Dimension::Cells(1));

        let layout = compute_layout(80, 24, true);
        assert_eq!(layout.x[child], 0);
    }

    #[test]
    fn test_justify_center_and_end() {
        setup();

        let parent = make_box(None);
        let pn = get_flex_node(parent).unwrap();
        pn.width.set_value(Dimension::Cells(50));
        pn.height.set_value(Dimension::Cells(5));
        pn.flex_direction.set_value(1);
        pn.justify_content.set_value(1); // center

        let child = make_box(Some(parent));
        let cn = get_flex_node(child).unwrap();
        cn.width.set_value(Dimension::Cells(10));
        cn.height.set_value(Dimension::Cells(1));

        let layout = compute_layout(80, 24, true);
        assert_eq!(layout.x[child], 20);

        pn.justify_content.set_value(2); // flex-end
        let layout = compute_layout(80, 24, true);
        assert_eq!(layout.x[child], 40);
    }

    #[test]
    fn test_shrink_zero_keeps_base_size() {
        setup();

        let parent = make_box(None);
        let pn = get_flex_node(parent).unwrap();
        pn.width.set_value(Dimension::Cells(30));
        pn.height.set_value(Dimension::Cells(5));
        pn.flex_direction.set_value(1);

        let a = make_box(Some(parent));
        let an = get_flex_node(a).unwrap();
        an.width.set_value(Dimension::Cells(40));
        an.height.set_value(Dimension::Cells(1));
        an.flex_shrink.set_value(0.0);

        let layout = compute_layout(80, 24, true);
        assert_eq!(layout.width[a], 40);
    }

    #[test]
    fn test_shrink_distributes_deficit() {
        setup();

        let parent = make_box(None);
        let pn = get_flex_node(parent).unwrap();
        pn.width.set_value(Dimension::Cells(40));
        pn.height.set_value(Dimension::Cells(5));
        pn.flex_direction.set_value(1);

        let mut kids = Vec::new();
        for _ in 0..2 {
            let k = make_box(Some(parent));
            let kn = get_flex_node(k).unwrap();
            kn.width.set_value(Dimension::Cells(30));
            kn.height.set_value(Dimension::Cells(1));
            kids.push(k);
        }

        let layout = compute_layout(80, 24, true);
        // 60 base into 40: each sheds 10.
        assert_eq!(layout.width[kids[0]], 20);
        assert_eq!(layout.width[kids[1]], 20);
        assert_eq!(layout.x[kids[1]], 20);
    }

    #[test]
    fn test_absolute_positioning_with_insets() {
        setup();

        let parent = make_box(None);
        let pn = get_flex_node(parent).unwrap();
        pn.width.set_value(Dimension::Cells(60));
        pn.height.set_value(Dimension::Cells(20));

        let child = make_box(Some(parent));
        let cn = get_flex_node(child).unwrap();
        cn.position.set_value(1); // absolute
        cn.width.set_value(Dimension::Cells(10));
        cn.height.set_value(Dimension::Cells(4));
        cn.inset_right.set_value(Dimension::Cells(2));
        cn.inset_bottom.set_value(Dimension::Cells(3));

        let layout = compute_layout(80, 24, true);
        assert_eq!(layout.x[child], 60 - 2 - 10);
        assert_eq!(layout.y[child], 20 - 3 - 4);
    }

    #[test]
    fn test_absolute_child_extends_scroll_bounds() {
        setup();

        let parent = make_box(None);
        let pn = get_flex_node(parent).unwrap();
        pn.width.set_value(Dimension::Cells(20));
        pn.height.set_value(Dimension::Cells(10));
        pn.overflow.set_value(2); // scroll

        let child = make_box(Some(parent));
        let cn = get_flex_node(child).unwrap();
        cn.position.set_value(1);
        cn.inset_top.set_value(Dimension::Cells(0));
        cn.inset_left.set_value(Dimension::Cells(0));
        cn.width.set_value(Dimension::Cells(5));
        cn.height.set_value(Dimension::Cells(30));

        let layout = compute_layout(80, 24, true);
        assert_eq!(layout.scrollable[parent], 1);
        assert_eq!(layout.max_scroll_y[parent], 20);
    }

    #[test]
    fn test_text_wraps_to_final_width() {
        setup();

        let parent = make_box(None);
        let pn = get_flex_node(parent).unwrap();
        pn.width.set_value(Dimension::Cells(6));
        pn.height.set_value(Dimension::Cells(10));

        let t = make_text(parent, "hello world");

        let layout = compute_layout(80, 24, true);
        assert_eq!(layout.width[t], 6);
        assert_eq!(layout.height[t], 2);
    }

    #[test]
    fn test_order_reorders_children() {
        setup();

        let parent = make_box(None);
        let pn = get_flex_node(parent).unwrap();
        pn.width.set_value(Dimension::Cells(30));
        pn.height.set_value(Dimension::Cells(3));
        pn.flex_direction.set_value(1);

        let a = make_box(Some(parent));
        let an = get_flex_node(a).unwrap();
        an.width.set_value(Dimension::Cells(10));
        an.height.set_value(Dimension::Cells(1));
        an.order.set_value(1);

        let b = make_box(Some(parent));
        let bn = get_flex_node(b).unwrap();
        bn.width.set_value(Dimension::Cells(10));
        bn.height.set_value(Dimension::Cells(1));
        bn.order.set_value(0);

        let layout = compute_layout(80, 24, true);
        assert_eq!(layout.x[b], 0);
        assert_eq!(layout.x[a], 10);
    }

    #[test]
    fn test_padding_and_border_inset_content() {
        setup();

        let parent = make_box(None);
        let pn = get_flex_node(parent).unwrap();
        pn.width.set_value(Dimension::Cells(20));
        pn.height.set_value(Dimension::Cells(10));
        pn.padding_left.set_value(2);
        pn.padding_top.set_value(1);
        pn.border_left.set_value(1);
        pn.border_top.set_value(1);

        let child = make_box(Some(parent));
        let cn = get_flex_node(child).unwrap();
        cn.width.set_value(Dimension::Cells(5));
        cn.height.set_value(Dimension::Cells(2));

        let layout = compute_layout(80, 24, true);
        assert_eq!(layout.x[child], 3);
        assert_eq!(layout.y[child], 2);
    }

    #[test]
    fn test_dirty_fast_path_returns_cached() {
        setup();

        let root = make_box(None);
        let rn = get_flex_node(root).unwrap();
        rn.width.set_value(Dimension::Cells(10));
        rn.height.set_value(Dimension::Cells(5));

        let first = compute_layout(80, 24, true);
        // No writes since: same geometry comes back.
        let second = compute_layout(80, 24, true);
        assert_eq!(first, second);

        // A layout write invalidates the fast path.
        rn.width.set_value(Dimension::Cells(12));
        let third = compute_layout(80, 24, true);
        assert_eq!(third.width[root], 12);
    }

    #[test]
    fn test_viewport_change_invalidates_cache() {
        setup();

        let root = make_box(None);
        let rn = get_flex_node(root).unwrap();
        rn.width.set_value(Dimension::Percent(100.0));
        rn.height.set_value(Dimension::Percent(100.0));

        let a = compute_layout(80, 24, true);
        assert_eq!(a.width[root], 80);

        let b = compute_layout(120, 40, true);
        assert_eq!(b.width[root], 120);
        assert_eq!(b.height[root], 40);
    }
}
