//! Stateless box layout: semi-vectors, alignment anchors and flex flow.
//!
//! Rectangles are recomputed from styles every frame. There is no caching and
//! no dirty tracking; styles may change between any two frames (a disabled
//! state toggling, a container resizing) and the resolution is cheap enough
//! to simply re-run.

use glam::Vec2;

use crate::Rect;

/// A 2D value tagged as either absolute units or a fraction of its container.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SemiVec {
    fraction: bool,
    x: f32,
    y: f32,
}

impl SemiVec {
    /// Creates a semi-vector holding absolute units.
    #[must_use]
    pub const fn from_value(value: Vec2) -> Self {
        Self {
            fraction: false,
            x: value.x,
            y: value.y,
        }
    }

    /// Creates a semi-vector holding fractions of the container extent.
    #[must_use]
    pub const fn from_fraction(value: Vec2) -> Self {
        Self {
            fraction: true,
            x: value.x,
            y: value.y,
        }
    }

    /// Resolves the value against the container extent.
    #[must_use]
    pub fn resolve(&self, container_size: Vec2) -> Vec2 {
        if self.fraction {
            Vec2::new(self.x * container_size.x, self.y * container_size.y)
        } else {
            Vec2::new(self.x, self.y)
        }
    }
}

/// Signed spacing applied on the axes relevant to the chosen anchor.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Margin {
    /// Spacing added on the left edge.
    pub left: f32,
    /// Spacing subtracted on the right edge.
    pub right: f32,
    /// Spacing added on the top edge.
    pub top: f32,
    /// Spacing subtracted on the bottom edge.
    pub bottom: f32,
}

/// Anchor used to pin a box to its container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Alignment {
    /// Free placement from the resolved position; margins still apply.
    Floating,
    /// Free placement from the resolved position; margins are ignored.
    Center,
    /// Pinned to the container's top-left corner.
    TopLeft,
    /// Pinned to the container's left edge.
    #[default]
    MiddleLeft,
    /// Pinned to the container's bottom-left corner.
    BottomLeft,
    /// Pinned to the container's top-right corner.
    TopRight,
    /// Pinned to the container's right edge.
    MiddleRight,
    /// Pinned to the container's bottom-right corner.
    BottomRight,
    /// Pinned to the container's bottom edge.
    MiddleBottom,
    /// Pinned to the container's top edge.
    MiddleTop,
}

/// Flow mode applied to a container's children.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Display {
    /// Children resolve directly against the container.
    Normal,
    /// Children flow along the configured axis, wrapping at the extent.
    #[default]
    Flex,
}

/// Primary axis used by [`Display::Flex`] containers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FlexDirection {
    /// Children flow left to right, wrapping downward.
    #[default]
    Row,
    /// Children flow top to bottom, wrapping rightward.
    Column,
}

/// Computes the absolute rectangle of a styled box within its container.
///
/// Position and size resolve against the container extent first; the
/// alignment then pins the rectangle to the named edge or corner, and the
/// margins shift it along the axes relevant to that anchor. `Floating`
/// skips the pinning but keeps all four margins, `Center` skips both.
#[must_use]
pub fn resolve_rect(
    position: SemiVec,
    size: SemiVec,
    alignment: Alignment,
    margin: Margin,
    container: Rect,
) -> Rect {
    let size = size.resolve(container.size());
    let offset = position.resolve(container.size());
    let mut rect = Rect::new(
        container.x + offset.x,
        container.y + offset.y,
        size.x,
        size.y,
    );

    match alignment {
        Alignment::Floating => {
            rect.x += margin.left - margin.right;
            rect.y += margin.top - margin.bottom;
        }
        Alignment::Center => {}
        Alignment::TopLeft => {
            rect.x = container.x + margin.left;
            rect.y = container.y + margin.top;
        }
        Alignment::MiddleLeft => {
            rect.x = container.x + margin.left;
        }
        Alignment::BottomLeft => {
            rect.x = container.x + margin.left;
            rect.y = container.y + container.height - rect.height - margin.bottom;
        }
        Alignment::TopRight => {
            rect.x = container.x + container.width - rect.width - margin.right;
            rect.y = container.y + margin.top;
        }
        Alignment::MiddleRight => {
            rect.x = container.x + container.width - rect.width - margin.right;
        }
        Alignment::BottomRight => {
            rect.x = container.x + container.width - rect.width - margin.right;
            rect.y = container.y + container.height - rect.height - margin.bottom;
        }
        Alignment::MiddleBottom => {
            rect.y = container.y + container.height - rect.height - margin.bottom;
        }
        Alignment::MiddleTop => {
            rect.y = container.y + margin.top;
        }
    }

    rect
}

/// Cursor that flows flex children along the primary axis, wrapping at the
/// container extent by advancing the cross axis by the current child's size.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlexCursor {
    offset: Vec2,
}

impl FlexCursor {
    /// Container shifted to the cursor position for the next child.
    #[must_use]
    pub fn child_container(&self, container: Rect) -> Rect {
        Rect::new(
            container.x + self.offset.x,
            container.y + self.offset.y,
            container.width,
            container.height,
        )
    }

    /// Advances the cursor past the provided child rectangle.
    pub fn advance(&mut self, direction: FlexDirection, child: Rect, container: Rect) {
        match direction {
            FlexDirection::Row => {
                self.offset.x += child.width;
                if self.offset.x > container.width {
                    self.offset.x = 0.0;
                    self.offset.y += child.height;
                }
            }
            FlexDirection::Column => {
                self.offset.y += child.height;
                if self.offset.y > container.height {
                    self.offset.y = 0.0;
                    self.offset.x += child.width;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTAINER: Rect = Rect::new(100.0, 50.0, 800.0, 400.0);

    fn fixed(width: f32, height: f32) -> SemiVec {
        SemiVec::from_value(Vec2::new(width, height))
    }

    fn resolve(alignment: Alignment) -> Rect {
        resolve_rect(
            SemiVec::default(),
            fixed(64.0, 32.0),
            alignment,
            Margin::default(),
            CONTAINER,
        )
    }

    #[test]
    fn fractional_sizes_scale_with_the_container() {
        let rect = resolve_rect(
            SemiVec::default(),
            SemiVec::from_fraction(Vec2::new(0.5, 0.25)),
            Alignment::TopLeft,
            Margin::default(),
            CONTAINER,
        );
        assert_eq!(rect.width, 400.0);
        assert_eq!(rect.height, 100.0);
    }

    #[test]
    fn fractional_positions_scale_with_the_container() {
        let rect = resolve_rect(
            SemiVec::from_fraction(Vec2::new(0.5, 0.5)),
            fixed(10.0, 10.0),
            Alignment::Floating,
            Margin::default(),
            CONTAINER,
        );
        assert_eq!(rect.x, 100.0 + 400.0);
        assert_eq!(rect.y, 50.0 + 200.0);
    }

    #[test]
    fn every_anchor_pins_to_its_container_edge() {
        let right = CONTAINER.x + CONTAINER.width - 64.0;
        let bottom = CONTAINER.y + CONTAINER.height - 32.0;

        let rect = resolve(Alignment::TopLeft);
        assert_eq!((rect.x, rect.y), (CONTAINER.x, CONTAINER.y));

        assert_eq!(resolve(Alignment::MiddleLeft).x, CONTAINER.x);

        let rect = resolve(Alignment::BottomLeft);
        assert_eq!((rect.x, rect.y), (CONTAINER.x, bottom));

        let rect = resolve(Alignment::TopRight);
        assert_eq!((rect.x, rect.y), (right, CONTAINER.y));

        assert_eq!(resolve(Alignment::MiddleRight).x, right);

        let rect = resolve(Alignment::BottomRight);
        assert_eq!((rect.x, rect.y), (right, bottom));

        assert_eq!(resolve(Alignment::MiddleTop).y, CONTAINER.y);
        assert_eq!(resolve(Alignment::MiddleBottom).y, bottom);
    }

    #[test]
    fn floating_applies_all_margins_and_center_none() {
        let margin = Margin {
            left: 10.0,
            right: 4.0,
            top: 6.0,
            bottom: 2.0,
        };

        let floating = resolve_rect(
            SemiVec::default(),
            fixed(64.0, 32.0),
            Alignment::Floating,
            margin,
            CONTAINER,
        );
        assert_eq!(floating.x, CONTAINER.x + 10.0 - 4.0);
        assert_eq!(floating.y, CONTAINER.y + 6.0 - 2.0);

        let center = resolve_rect(
            SemiVec::default(),
            fixed(64.0, 32.0),
            Alignment::Center,
            margin,
            CONTAINER,
        );
        assert_eq!((center.x, center.y), (CONTAINER.x, CONTAINER.y));
    }

    #[test]
    fn anchored_margins_apply_only_on_relevant_axes() {
        let margin = Margin {
            left: 10.0,
            right: 8.0,
            top: 6.0,
            bottom: 4.0,
        };

        let rect = resolve_rect(
            SemiVec::default(),
            fixed(64.0, 32.0),
            Alignment::TopRight,
            margin,
            CONTAINER,
        );
        assert_eq!(rect.x, CONTAINER.x + CONTAINER.width - 64.0 - 8.0);
        assert_eq!(rect.y, CONTAINER.y + 6.0);

        let rect = resolve_rect(
            SemiVec::default(),
            fixed(64.0, 32.0),
            Alignment::MiddleLeft,
            margin,
            CONTAINER,
        );
        assert_eq!(rect.x, CONTAINER.x + 10.0);
    }

    #[test]
    fn row_flex_cursor_wraps_at_the_container_extent() {
        let container = Rect::new(0.0, 0.0, 100.0, 100.0);
        let child = Rect::new(0.0, 0.0, 40.0, 20.0);
        let mut cursor = FlexCursor::default();

        cursor.advance(FlexDirection::Row, child, container);
        assert_eq!(cursor.child_container(container).x, 40.0);

        cursor.advance(FlexDirection::Row, child, container);
        assert_eq!(cursor.child_container(container).x, 80.0);

        // 120 exceeds the extent: wrap to the next line.
        cursor.advance(FlexDirection::Row, child, container);
        let wrapped = cursor.child_container(container);
        assert_eq!(wrapped.x, 0.0);
        assert_eq!(wrapped.y, 20.0);
    }

    #[test]
    fn column_flex_cursor_wraps_to_the_next_column() {
        let container = Rect::new(0.0, 0.0, 100.0, 50.0);
        let child = Rect::new(0.0, 0.0, 30.0, 30.0);
        let mut cursor = FlexCursor::default();

        cursor.advance(FlexDirection::Column, child, container);
        assert_eq!(cursor.child_container(container).y, 30.0);

        cursor.advance(FlexDirection::Column, child, container);
        let wrapped = cursor.child_container(container);
        assert_eq!(wrapped.y, 0.0);
        assert_eq!(wrapped.x, 30.0);
    }
}
