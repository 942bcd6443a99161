//! FlexNode - persistent layout object with reactive slot properties.
//!
//! Each component gets one FlexNode for its entire lifetime. Every property
//! is a `TrackedSlot` sharing the layout dirty set, so any layout-affecting
//! write lands the component index in `dirtyLayout` and the slot identity is
//! what layout deriveds depend on — sources are swapped in place, the cell is
//! never replaced.
//!
//! Enum-valued properties store the integer representation; props are
//! converted by the primitives at bind time.

use spark_signals::{tracked_slot, TrackedSlot};

use crate::engine::arrays::dirty::layout_dirty;
use crate::types::Dimension;

/// Persistent layout state for one component.
///
/// Property groups:
/// - **Container**: flexDirection, flexWrap, justifyContent, alignItems, alignContent
/// - **Item**: flexGrow, flexShrink, flexBasis, alignSelf, order
/// - **Dimensions**: width, height, min/max pairs
/// - **Spacing**: margin (4), padding (4), gap, rowGap, columnGap
/// - **Border widths**: 0 or 1 cell per side, for layout insets
/// - **Positioning**: position, inset top/right/bottom/left
/// - **Overflow**
pub struct FlexNode {
    /// Component index in the parallel arrays.
    pub index: usize,

    // Container properties.
    /// 0=column, 1=row, 2=column-reverse, 3=row-reverse
    pub flex_direction: TrackedSlot<u8>,
    /// 0=nowrap, 1=wrap, 2=wrap-reverse
    pub flex_wrap: TrackedSlot<u8>,
    /// 0=flex-start, 1=center, 2=flex-end, 3=space-between, 4=space-around, 5=space-evenly
    pub justify_content: TrackedSlot<u8>,
    /// 0=stretch, 1=flex-start, 2=center, 3=flex-end, 4=baseline
    pub align_items: TrackedSlot<u8>,
    /// 0=stretch, 1=flex-start, 2=center, 3=flex-end, 4=space-between, 5=space-around
    pub align_content: TrackedSlot<u8>,

    // Item properties.
    pub flex_grow: TrackedSlot<f32>,
    /// Default 1.
    pub flex_shrink: TrackedSlot<f32>,
    pub flex_basis: TrackedSlot<Dimension>,
    /// 0=auto (inherit container alignItems).
    pub align_self: TrackedSlot<u8>,
    pub order: TrackedSlot<i32>,

    // Dimensions.
    pub width: TrackedSlot<Dimension>,
    pub height: TrackedSlot<Dimension>,
    pub min_width: TrackedSlot<Dimension>,
    pub max_width: TrackedSlot<Dimension>,
    pub min_height: TrackedSlot<Dimension>,
    pub max_height: TrackedSlot<Dimension>,

    // Spacing.
    pub margin_top: TrackedSlot<u16>,
    pub margin_right: TrackedSlot<u16>,
    pub margin_bottom: TrackedSlot<u16>,
    pub margin_left: TrackedSlot<u16>,
    pub padding_top: TrackedSlot<u16>,
    pub padding_right: TrackedSlot<u16>,
    pub padding_bottom: TrackedSlot<u16>,
    pub padding_left: TrackedSlot<u16>,
    pub gap: TrackedSlot<u16>,
    pub row_gap: TrackedSlot<u16>,
    pub column_gap: TrackedSlot<u16>,

    // Border widths (0 = none, 1 = one cell).
    pub border_top: TrackedSlot<u16>,
    pub border_right: TrackedSlot<u16>,
    pub border_bottom: TrackedSlot<u16>,
    pub border_left: TrackedSlot<u16>,

    // Positioning.
    /// 0=relative, 1=absolute.
    pub position: TrackedSlot<u8>,
    pub inset_top: TrackedSlot<Dimension>,
    pub inset_right: TrackedSlot<Dimension>,
    pub inset_bottom: TrackedSlot<Dimension>,
    pub inset_left: TrackedSlot<Dimension>,

    /// 0=visible, 1=hidden, 2=scroll, 3=auto.
    pub overflow: TrackedSlot<u8>,
}

impl FlexNode {
    pub fn new(index: usize) -> Self {
        let d = layout_dirty();
        Self {
            index,

            flex_direction: tracked_slot(Some(0), d.clone(), index),
            flex_wrap: tracked_slot(Some(0), d.clone(), index),
            justify_content: tracked_slot(Some(0), d.clone(), index),
            align_items: tracked_slot(Some(0), d.clone(), index),
            align_content: tracked_slot(Some(0), d.clone(), index),

            flex_grow: tracked_slot(Some(0.0), d.clone(), index),
            flex_shrink: tracked_slot(Some(1.0), d.clone(), index),
            flex_basis: tracked_slot(Some(Dimension::Auto), d.clone(), index),
            align_self: tracked_slot(Some(0), d.clone(), index),
            order: tracked_slot(Some(0), d.clone(), index),

            width: tracked_slot(Some(Dimension::Auto), d.clone(), index),
            height: tracked_slot(Some(Dimension::Auto), d.clone(), index),
            min_width: tracked_slot(Some(Dimension::Auto), d.clone(), index),
            max_width: tracked_slot(Some(Dimension::Auto), d.clone(), index),
            min_height: tracked_slot(Some(Dimension::Auto), d.clone(), index),
            max_height: tracked_slot(Some(Dimension::Auto), d.clone(), index),

            margin_top: tracked_slot(Some(0), d.clone(), index),
            margin_right: tracked_slot(Some(0), d.clone(), index),
            margin_bottom: tracked_slot(Some(0), d.clone(), index),
            margin_left: tracked_slot(Some(0), d.clone(), index),
            padding_top: tracked_slot(Some(0), d.clone(), index),
            padding_right: tracked_slot(Some(0), d.clone(), index),
            padding_bottom: tracked_slot(Some(0), d.clone(), index),
            padding_left: tracked_slot(Some(0), d.clone(), index),
            gap: tracked_slot(Some(0), d.clone(), index),
            row_gap: tracked_slot(Some(0), d.clone(), index),
            column_gap: tracked_slot(Some(0), d.clone(), index),

            border_top: tracked_slot(Some(0), d.clone(), index),
            border_right: tracked_slot(Some(0), d.clone(), index),
            border_bottom: tracked_slot(Some(0), d.clone(), index),
            border_left: tracked_slot(Some(0), d.clone(), index),

            position: tracked_slot(Some(0), d.clone(), index),
            inset_top: tracked_slot(Some(Dimension::Auto), d.clone(), index),
            inset_right: tracked_slot(Some(Dimension::Auto), d.clone(), index),
            inset_bottom: tracked_slot(Some(Dimension::Auto), d.clone(), index),
            inset_left: tracked_slot(Some(Dimension::Auto), d.clone(), index),

            overflow: tracked_slot(Some(0), d, index),
        }
    }

    /// Reset every slot source in place. The cells survive; only their
    /// sources are replaced by defaults, so dependents stay subscribed.
    pub fn disconnect(&self) {
        self.flex_direction.set_value(0);
        self.flex_wrap.set_value(0);
        self.justify_content.set_value(0);
        self.align_items.set_value(0);
        self.align_content.set_value(0);

        self.flex_grow.set_value(0.0);
        self.flex_shrink.set_value(1.0);
        self.flex_basis.set_value(Dimension::Auto);
        self.align_self.set_value(0);
        self.order.set_value(0);

        self.width.set_value(Dimension::Auto);
        self.height.set_value(Dimension::Auto);
        self.min_width.set_value(Dimension::Auto);
        self.max_width.set_value(Dimension::Auto);
        self.min_height.set_value(Dimension::Auto);
        self.max_height.set_value(Dimension::Auto);

        self.margin_top.set_value(0);
        self.margin_right.set_value(0);
        self.margin_bottom.set_value(0);
        self.margin_left.set_value(0);
        self.padding_top.set_value(0);
        self.padding_right.set_value(0);
        self.padding_bottom.set_value(0);
        self.padding_left.set_value(0);
        self.gap.set_value(0);
        self.row_gap.set_value(0);
        self.column_gap.set_value(0);

        self.border_top.set_value(0);
        self.border_right.set_value(0);
        self.border_bottom.set_value(0);
        self.border_left.set_value(0);

        self.position.set_value(0);
        self.inset_top.set_value(Dimension::Auto);
        self.inset_right.set_value(Dimension::Auto);
        self.inset_bottom.set_value(Dimension::Auto);
        self.inset_left.set_value(Dimension::Auto);

        self.overflow.set_value(0);
    }
}
