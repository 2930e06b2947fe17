use std::sync::{Arc, Mutex};

use crate::layout::PlannedMove;
use crate::widget::WidgetEvent;

/// Observer of container activity. Every method defaults to a no-op so
/// hosts implement only what they render.
pub trait GridEventSink {
    fn item_added(&mut self, _widget: &WidgetEvent) {}
    fn item_removed(&mut self, _widget: &WidgetEvent) {}
    fn item_changed(&mut self, _widget: &WidgetEvent) {}
    /// A widget was moved by collision resolution or cascade.
    fn cascaded(&mut self, _widget: &WidgetEvent) {}
    fn drag_start(&mut self, _widget: &WidgetEvent) {}
    fn drag_move(&mut self, _widget: &WidgetEvent) {}
    fn drag_stop(&mut self, _widget: &WidgetEvent) {}
    fn resize_start(&mut self, _widget: &WidgetEvent) {}
    fn resize_move(&mut self, _widget: &WidgetEvent) {}
    fn resize_stop(&mut self, _widget: &WidgetEvent) {}
    /// Snapshot of every widget after a structural change.
    fn items_changed(&mut self, _widgets: &[WidgetEvent]) {}
    /// Moves a cascade would make around the active gesture.
    fn cascade_preview(&mut self, _moves: &[PlannedMove]) {}
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl GridEventSink for NullSink {}

/// Recorded form of a sink call.
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    ItemAdded(WidgetEvent),
    ItemRemoved(WidgetEvent),
    ItemChanged(WidgetEvent),
    Cascaded(WidgetEvent),
    DragStart(WidgetEvent),
    DragMove(WidgetEvent),
    DragStop(WidgetEvent),
    ResizeStart(WidgetEvent),
    ResizeMove(WidgetEvent),
    ResizeStop(WidgetEvent),
    ItemsChanged(Vec<WidgetEvent>),
    CascadePreview(Vec<PlannedMove>),
}

impl GridEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            GridEvent::ItemAdded(_) => "item_added",
            GridEvent::ItemRemoved(_) => "item_removed",
            GridEvent::ItemChanged(_) => "item_changed",
            GridEvent::Cascaded(_) => "cascaded",
            GridEvent::DragStart(_) => "drag_start",
            GridEvent::DragMove(_) => "drag_move",
            GridEvent::DragStop(_) => "drag_stop",
            GridEvent::ResizeStart(_) => "resize_start",
            GridEvent::ResizeMove(_) => "resize_move",
            GridEvent::ResizeStop(_) => "resize_stop",
            GridEvent::ItemsChanged(_) => "items_changed",
            GridEvent::CascadePreview(_) => "cascade_preview",
        }
    }

    /// The single widget an event is about, if any.
    pub fn widget(&self) -> Option<&WidgetEvent> {
        match self {
            GridEvent::ItemAdded(w)
            | GridEvent::ItemRemoved(w)
            | GridEvent::ItemChanged(w)
            | GridEvent::Cascaded(w)
            | GridEvent::DragStart(w)
            | GridEvent::DragMove(w)
            | GridEvent::DragStop(w)
            | GridEvent::ResizeStart(w)
            | GridEvent::ResizeMove(w)
            | GridEvent::ResizeStop(w) => Some(w),
            GridEvent::ItemsChanged(_) | GridEvent::CascadePreview(_) => None,
        }
    }
}

/// Records every call in order. Clones share the same buffer, so a test can
/// keep one handle while the container owns the other.
#[derive(Debug, Clone, Default)]
pub struct EventBuffer {
    events: Arc<Mutex<Vec<GridEvent>>>,
}

impl EventBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: GridEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }

    pub fn events(&self) -> Vec<GridEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Drain the buffer.
    pub fn take(&self) -> Vec<GridEvent> {
        std::mem::take(
            &mut *self
                .events
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.events().iter().map(GridEvent::kind).collect()
    }
}

impl GridEventSink for EventBuffer {
    fn item_added(&mut self, widget: &WidgetEvent) {
        self.push(GridEvent::ItemAdded(widget.clone()));
    }

    fn item_removed(&mut self, widget: &WidgetEvent) {
        self.push(GridEvent::ItemRemoved(widget.clone()));
    }

    fn item_changed(&mut self, widget: &WidgetEvent) {
        self.push(GridEvent::ItemChanged(widget.clone()));
    }

    fn cascaded(&mut self, widget: &WidgetEvent) {
        self.push(GridEvent::Cascaded(widget.clone()));
    }

    fn drag_start(&mut self, widget: &WidgetEvent) {
        self.push(GridEvent::DragStart(widget.clone()));
    }

    fn drag_move(&mut self, widget: &WidgetEvent) {
        self.push(GridEvent::DragMove(widget.clone()));
    }

    fn drag_stop(&mut self, widget: &WidgetEvent) {
        self.push(GridEvent::DragStop(widget.clone()));
    }

    fn resize_start(&mut self, widget: &WidgetEvent) {
        self.push(GridEvent::ResizeStart(widget.clone()));
    }

    fn resize_move(&mut self, widget: &WidgetEvent) {
        self.push(GridEvent::ResizeMove(widget.clone()));
    }

    fn resize_stop(&mut self, widget: &WidgetEvent) {
        self.push(GridEvent::ResizeStop(widget.clone()));
    }

    fn items_changed(&mut self, widgets: &[WidgetEvent]) {
        self.push(GridEvent::ItemsChanged(widgets.to_vec()));
    }

    fn cascade_preview(&mut self, moves: &[PlannedMove]) {
        self.push(GridEvent::CascadePreview(moves.to_vec()));
    }
}
