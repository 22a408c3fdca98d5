//! Styled UI tree with closure callbacks and backend-agnostic draw ops.
//!
//! Nodes own their children exclusively; callbacks are boxed closures that
//! write into a caller-supplied signal value, which is how button presses
//! reach the simulation without any global state. Rendering emits a flat
//! list of [`UiDrawOp`] values so backends stay oblivious to the tree.
//!
//! Hit-testing walks the tree against the whole screen rectangle. Once a
//! node's resolved rect contains the pointer, its callbacks fire and the
//! firing propagates to the entire visible subtree regardless of the
//! children's own rects; siblings that were not hit keep searching their own
//! subtrees. A disabled node suppresses callbacks for itself and all of its
//! descendants but keeps rendering, tinted.

use std::collections::BTreeMap;

use glam::Vec2;

use crate::layout::{resolve_rect, Alignment, Display, FlexCursor, FlexDirection, Margin, SemiVec};
use crate::{Color, Rect};

/// Tint applied to sprite backgrounds of disabled elements.
pub const DISABLED_TINT: Color = Color::from_rgb_u8(130, 130, 130);

/// Visual and layout description of a single UI element.
#[derive(Clone, Debug, PartialEq)]
pub struct Style {
    /// Whether the element participates in rendering and hit-testing.
    pub visible: bool,
    /// Whether callbacks are suppressed for this element and its subtree.
    pub disabled: bool,
    /// Anchor used to pin the element to its container.
    pub alignment: Alignment,
    /// Offset resolved against the container extent.
    pub position: SemiVec,
    /// Extent resolved against the container extent.
    pub size: SemiVec,
    /// Signed spacing applied around the anchor.
    pub margin: Margin,
    /// Flow mode applied to the element's children.
    pub display: Display,
    /// Primary axis used when `display` is flex.
    pub flex_direction: FlexDirection,
    /// Background drawn over the element's children.
    pub background: Background,
    /// Optional label centered inside the element.
    pub text: Option<String>,
    /// Color of the label text.
    pub text_color: Color,
    /// Font size of the label text.
    pub font_size: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            visible: false,
            disabled: false,
            alignment: Alignment::default(),
            position: SemiVec::default(),
            size: SemiVec::default(),
            margin: Margin::default(),
            display: Display::default(),
            flex_direction: FlexDirection::default(),
            background: Background::Color(Color::BLACK),
            text: None,
            text_color: Color::BLACK,
            font_size: 25.0,
        }
    }
}

impl Style {
    /// Resolves the element's absolute rectangle within the container.
    #[must_use]
    pub fn rect(&self, container: Rect) -> Rect {
        resolve_rect(
            self.position,
            self.size,
            self.alignment,
            self.margin,
            container,
        )
    }
}

/// Background painted behind (over, see the module docs) an element.
#[derive(Clone, Debug, PartialEq)]
pub enum Background {
    /// Flat fill color.
    Color(Color),
    /// Named sprite resolved by the backend's atlas.
    Sprite {
        /// Atlas name of the sprite.
        name: String,
    },
}

/// Flat draw operation emitted by the UI tree for a backend to execute.
#[derive(Clone, Debug, PartialEq)]
pub struct UiDrawOp {
    /// Screen rectangle the operation covers.
    pub rect: Rect,
    /// What to draw inside the rectangle.
    pub kind: UiDrawKind,
}

/// Payload of a [`UiDrawOp`].
#[derive(Clone, Debug, PartialEq)]
pub enum UiDrawKind {
    /// Fill the rectangle with a flat color.
    Fill {
        /// Fill color.
        color: Color,
    },
    /// Draw a named atlas sprite stretched over the rectangle.
    Sprite {
        /// Atlas name of the sprite.
        name: String,
        /// Tint applied when drawing.
        tint: Color,
    },
    /// Draw a text label centered in the rectangle.
    Text {
        /// Label content.
        content: String,
        /// Text color.
        color: Color,
        /// Font size in pixels.
        font_size: f32,
    },
}

type Callback<S> = Box<dyn FnMut(&mut S)>;

/// A single element of the UI tree, exclusively owning its children.
pub struct UiNode<S> {
    /// Style controlling layout, visuals and interactivity.
    pub style: Style,
    children: Vec<UiNode<S>>,
    on_hover: Option<Callback<S>>,
    on_click: Option<Callback<S>>,
}

impl<S> Default for UiNode<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> UiNode<S> {
    /// Creates a new element with the default (hidden) style.
    #[must_use]
    pub fn new() -> Self {
        Self {
            style: Style::default(),
            children: Vec::new(),
            on_hover: None,
            on_click: None,
        }
    }

    /// Creates a new element with the provided style.
    #[must_use]
    pub fn with_style(style: Style) -> Self {
        Self {
            style,
            children: Vec::new(),
            on_hover: None,
            on_click: None,
        }
    }

    /// Installs the hover callback, replacing any previous one.
    pub fn set_on_hover(&mut self, callback: impl FnMut(&mut S) + 'static) {
        self.on_hover = Some(Box::new(callback));
    }

    /// Installs the click callback, replacing any previous one.
    pub fn set_on_click(&mut self, callback: impl FnMut(&mut S) + 'static) {
        self.on_click = Some(Box::new(callback));
    }

    /// Appends a child element, transferring ownership into the tree.
    pub fn add_child(&mut self, child: UiNode<S>) {
        self.children.push(child);
    }

    /// Children owned by this element.
    #[must_use]
    pub fn children(&self) -> &[UiNode<S>] {
        &self.children
    }

    /// Hit-tests the element against the pointer and fires callbacks.
    pub fn update(&mut self, container: Rect, pointer: Option<Vec2>, clicked: bool, signals: &mut S) {
        if !self.style.visible || self.style.disabled {
            return;
        }

        let rect = self.style.rect(container);
        if pointer.is_some_and(|point| rect.contains(point)) {
            self.fire(clicked, signals);
        } else {
            for child in &mut self.children {
                child.update(container, pointer, clicked, signals);
            }
        }
    }

    fn fire(&mut self, clicked: bool, signals: &mut S) {
        if !self.style.visible || self.style.disabled {
            return;
        }

        if let Some(callback) = &mut self.on_hover {
            callback(signals);
        }
        if clicked {
            if let Some(callback) = &mut self.on_click {
                callback(signals);
            }
        }
        for child in &mut self.children {
            child.fire(clicked, signals);
        }
    }

    /// Emits draw operations depth-first: children first, then the element's
    /// own background and label, preserving the original overdraw order.
    pub fn draw_ops(&self, container: Rect, out: &mut Vec<UiDrawOp>) {
        if !self.style.visible {
            return;
        }

        let rect = self.style.rect(container);
        let mut cursor = FlexCursor::default();
        for child in &self.children {
            let child_container = match self.style.display {
                Display::Flex => cursor.child_container(rect),
                Display::Normal => rect,
            };
            child.draw_ops(child_container, out);
            if self.style.display == Display::Flex {
                let child_rect = child.style.rect(child_container);
                cursor.advance(self.style.flex_direction, child_rect, rect);
            }
        }

        match &self.style.background {
            Background::Color(color) => out.push(UiDrawOp {
                rect,
                kind: UiDrawKind::Fill { color: *color },
            }),
            Background::Sprite { name } => out.push(UiDrawOp {
                rect,
                kind: UiDrawKind::Sprite {
                    name: name.clone(),
                    tint: if self.style.disabled {
                        DISABLED_TINT
                    } else {
                        Color::WHITE
                    },
                },
            }),
        }

        if let Some(text) = &self.style.text {
            out.push(UiDrawOp {
                rect,
                kind: UiDrawKind::Text {
                    content: text.clone(),
                    color: self.style.text_color,
                    font_size: self.style.font_size,
                },
            });
        }
    }
}

/// Named collection of top-level UI elements.
///
/// The registry replaces the original's lazily created global cluster: it is
/// constructed by the frame driver, iterated in deterministic name order and
/// passed wherever it is needed.
pub struct UiRegistry<S> {
    nodes: BTreeMap<String, UiNode<S>>,
}

impl<S> Default for UiRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> UiRegistry<S> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
        }
    }

    /// Retrieves the named element, creating a hidden one if missing.
    pub fn get_or_create(&mut self, name: &str) -> &mut UiNode<S> {
        self.nodes.entry(name.to_owned()).or_default()
    }

    /// Retrieves the named element if it exists.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&UiNode<S>> {
        self.nodes.get(name)
    }

    /// Marks the named element visible.
    pub fn show(&mut self, name: &str) {
        self.get_or_create(name).style.visible = true;
    }

    /// Marks the named element hidden.
    pub fn hide(&mut self, name: &str) {
        self.get_or_create(name).style.visible = false;
    }

    /// Hit-tests every top-level element against the screen rectangle.
    pub fn update(&mut self, screen: Rect, pointer: Option<Vec2>, clicked: bool, signals: &mut S) {
        for node in self.nodes.values_mut() {
            node.update(screen, pointer, clicked, signals);
        }
    }

    /// Collects draw operations for every visible element in name order.
    #[must_use]
    pub fn draw_ops(&self, screen: Rect) -> Vec<UiDrawOp> {
        let mut out = Vec::new();
        for node in self.nodes.values() {
            node.draw_ops(screen, &mut out);
        }
        out
    }
}
