use std::collections::HashMap;

use blake3::Hash;

use crate::error::{GridError, Result};
use crate::geometry::GridRect;
use crate::layout::RectLookup;
use crate::widget::{Widget, WidgetEvent, WidgetId};

#[derive(Debug, Clone)]
struct Entry {
    widget: Widget,
    reported: Option<Hash>,
}

fn fingerprint(widget: &Widget) -> Hash {
    let event = widget.event();
    let mut hasher = blake3::Hasher::new();
    hasher.update(event.id.as_bytes());
    hasher.update(event.payload.to_string().as_bytes());
    for cell in [event.col, event.row, event.sizex, event.sizey] {
        hasher.update(&cell.to_le_bytes());
    }
    for px in [event.width, event.height, event.left, event.top] {
        hasher.update(&px.to_bits().to_le_bytes());
    }
    hasher.finalize()
}

/// Widgets of a container in insertion order, with change tracking for
/// observers that redraw only what moved.
#[derive(Debug, Clone, Default)]
pub struct WidgetRegistry {
    entries: HashMap<WidgetId, Entry>,
    order: Vec<WidgetId>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, widget: Widget) -> Result<()> {
        let id = widget.id().clone();
        if self.entries.contains_key(&id) {
            return Err(GridError::DuplicateWidget(id));
        }
        self.order.push(id.clone());
        self.entries.insert(
            id,
            Entry {
                widget,
                reported: None,
            },
        );
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Option<Widget> {
        let entry = self.entries.remove(id)?;
        self.order.retain(|existing| existing != id);
        Some(entry.widget)
    }

    pub fn get(&self, id: &str) -> Option<&Widget> {
        self.entries.get(id).map(|entry| &entry.widget)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Widget> {
        self.entries.get_mut(id).map(|entry| &mut entry.widget)
    }

    pub fn require(&self, id: &str) -> Result<&Widget> {
        self.get(id)
            .ok_or_else(|| GridError::WidgetNotFound(id.to_string()))
    }

    pub fn require_mut(&mut self, id: &str) -> Result<&mut Widget> {
        self.get_mut(id)
            .ok_or_else(|| GridError::WidgetNotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn ids(&self) -> Vec<WidgetId> {
        self.order.clone()
    }

    /// Widgets in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Widget> {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id).map(|entry| &entry.widget))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Widget> {
        self.entries.values_mut().map(|entry| &mut entry.widget)
    }

    /// Widgets whose reported state changed since the last call, in
    /// insertion order. New widgets are always reported once.
    pub fn take_dirty(&mut self) -> Vec<WidgetEvent> {
        let mut dirty = Vec::new();
        for id in &self.order {
            let Some(entry) = self.entries.get_mut(id) else {
                continue;
            };
            let current = fingerprint(&entry.widget);
            if entry.reported != Some(current) {
                entry.reported = Some(current);
                dirty.push(entry.widget.event());
            }
        }
        dirty
    }

    pub fn has_dirty(&self) -> bool {
        self.entries
            .values()
            .any(|entry| entry.reported != Some(fingerprint(&entry.widget)))
    }
}

impl RectLookup for WidgetRegistry {
    fn rect_of(&self, id: &WidgetId) -> Option<GridRect> {
        self.get(id).map(Widget::rect)
    }
}
