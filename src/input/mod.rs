//! Pointer input for the container's gesture state machine.
//!
//! Terminal mouse events from crossterm map onto the same [`PointerEvent`]s a
//! graphical host would send, one terminal cell per pixel unless a scale is
//! given.

use crossterm::event::{Event, MouseButton, MouseEvent, MouseEventKind};

use crate::geometry::PixelPos;

/// Pointer position plus what sits under it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pointer {
    pub pos: PixelPos,
    /// Over the widget's drag handle.
    pub on_drag_handle: bool,
    /// Over the widget's resize handle.
    pub on_resize_handle: bool,
}

impl Pointer {
    pub fn at(left: f64, top: f64) -> Self {
        Self {
            pos: PixelPos::new(left, top),
            ..Self::default()
        }
    }

    pub fn on_drag_handle(mut self) -> Self {
        self.on_drag_handle = true;
        self
    }

    pub fn on_resize_handle(mut self) -> Self {
        self.on_resize_handle = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Pointer),
    Move(Pointer),
    Up(Pointer),
}

impl PointerEvent {
    pub fn pointer(&self) -> Pointer {
        match self {
            PointerEvent::Down(p) | PointerEvent::Move(p) | PointerEvent::Up(p) => *p,
        }
    }
}

/// Pixels represented by one terminal cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellScale {
    pub width: f64,
    pub height: f64,
}

impl Default for CellScale {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
        }
    }
}

pub fn pointer_from_mouse(event: &MouseEvent) -> Option<PointerEvent> {
    scaled_pointer_from_mouse(event, CellScale::default())
}

/// Left-button press/drag/release and plain motion; everything else is dropped.
pub fn scaled_pointer_from_mouse(event: &MouseEvent, scale: CellScale) -> Option<PointerEvent> {
    let pointer = Pointer::at(
        event.column as f64 * scale.width,
        event.row as f64 * scale.height,
    );
    match event.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(PointerEvent::Down(pointer)),
        MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
            Some(PointerEvent::Move(pointer))
        }
        MouseEventKind::Up(MouseButton::Left) => Some(PointerEvent::Up(pointer)),
        _ => None,
    }
}

pub fn pointer_from_event(event: &Event) -> Option<PointerEvent> {
    match event {
        Event::Mouse(mouse) => pointer_from_mouse(mouse),
        _ => None,
    }
}
