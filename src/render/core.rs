use std::io::Write;

use crate::cursor;
use crate::error::Result;
use crate::widget::WidgetEvent;
use crate::width::{display_width, truncate_to_width};

/// Renderer runtime parameters.
#[derive(Debug, Clone)]
pub struct RendererSettings {
    /// Pixels per terminal column.
    pub cell_width: f64,
    /// Pixels per terminal row.
    pub cell_height: f64,
    /// Where to park the cursor after a frame, 0-based `(row, col)`.
    pub restore_cursor: Option<(u16, u16)>,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            cell_width: 1.0,
            cell_height: 1.0,
            restore_cursor: None,
        }
    }
}

/// Terminal cell box covered by a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellBox {
    x: u16,
    y: u16,
    width: u16,
    height: u16,
}

/// Draws widgets as bordered boxes with ANSI cursor addressing.
pub struct AnsiRenderer {
    settings: RendererSettings,
}

impl AnsiRenderer {
    pub fn new(settings: RendererSettings) -> Self {
        Self { settings }
    }

    pub fn with_default() -> Self {
        Self::new(RendererSettings::default())
    }

    pub fn settings_mut(&mut self) -> &mut RendererSettings {
        &mut self.settings
    }

    /// Draw only the given widgets, typically the registry's dirty set.
    pub fn render(&mut self, writer: &mut impl Write, widgets: &[WidgetEvent]) -> Result<()> {
        write!(writer, "{}", cursor::hide())?;
        for widget in widgets {
            if let Some(cells) = self.cell_box(widget) {
                draw_box(writer, cells, &label_of(widget))?;
            }
        }
        self.finish(writer)
    }

    /// Clear the screen and draw every widget in the given stacking order.
    pub fn render_frame(&mut self, writer: &mut impl Write, widgets: &[WidgetEvent]) -> Result<()> {
        write!(writer, "{}", cursor::clear_screen())?;
        self.render(writer, widgets)
    }

    fn finish(&self, writer: &mut impl Write) -> Result<()> {
        if let Some((row, col)) = self.settings.restore_cursor {
            write!(writer, "{}", cursor::move_to(row + 1, col + 1))?;
        }
        write!(writer, "{}", cursor::show())?;
        writer.flush()?;
        Ok(())
    }

    fn cell_box(&self, widget: &WidgetEvent) -> Option<CellBox> {
        let to_cells = |px: f64, per: f64| -> u16 {
            if per > 0.0 && px.is_finite() && px > 0.0 {
                (px / per).round().min(u16::MAX as f64) as u16
            } else {
                0
            }
        };
        let cells = CellBox {
            x: to_cells(widget.left, self.settings.cell_width),
            y: to_cells(widget.top, self.settings.cell_height),
            width: to_cells(widget.width, self.settings.cell_width),
            height: to_cells(widget.height, self.settings.cell_height),
        };
        (cells.width >= 2 && cells.height >= 2).then_some(cells)
    }
}

/// `title` from the payload when present, otherwise the widget id.
fn label_of(widget: &WidgetEvent) -> String {
    widget
        .payload
        .get("title")
        .and_then(|title| title.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| widget.id.clone())
}

fn draw_box(writer: &mut impl Write, cells: CellBox, label: &str) -> Result<()> {
    let inner = (cells.width - 2) as usize;
    let horizontal = "─".repeat(inner);

    for offset in 0..cells.height {
        let row = cells.y.saturating_add(offset).saturating_add(1);
        write!(writer, "{}", cursor::move_to(row, cells.x.saturating_add(1)))?;

        if offset == 0 {
            write!(writer, "┌{horizontal}┐")?;
        } else if offset == cells.height - 1 {
            write!(writer, "└{horizontal}┘")?;
        } else {
            let text = if offset == 1 {
                truncate_to_width(label, inner)
            } else {
                String::new()
            };
            let pad = inner.saturating_sub(display_width(&text));
            write!(writer, "│{text}{}│", " ".repeat(pad))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(id: &str, payload: serde_json::Value) -> WidgetEvent {
        WidgetEvent {
            id: id.to_string(),
            payload,
            col: 1,
            row: 1,
            sizex: 1,
            sizey: 1,
            width: 8.0,
            height: 3.0,
            left: 2.0,
            top: 1.0,
        }
    }

    #[test]
    fn renderer_draws_bordered_boxes() {
        let mut output = Vec::new();
        let mut renderer = AnsiRenderer::with_default();
        renderer
            .render(&mut output, &[event("w1", json!({ "title": "Sales" }))])
            .unwrap();

        let rendered = String::from_utf8(output).unwrap();
        assert!(rendered.contains("\u{1b}[2;3H┌──────┐"));
        assert!(rendered.contains("\u{1b}[3;3H│Sales │"));
        assert!(rendered.contains("\u{1b}[4;3H└──────┘"));
    }

    #[test]
    fn label_falls_back_to_id_and_truncates() {
        let mut output = Vec::new();
        let mut renderer = AnsiRenderer::with_default();
        renderer
            .render(&mut output, &[event("a-very-long-id", json!(null))])
            .unwrap();
        let rendered = String::from_utf8(output).unwrap();
        assert!(rendered.contains("│a-very│"));
    }

    #[test]
    fn tiny_boxes_are_skipped() {
        let mut output = Vec::new();
        let mut renderer = AnsiRenderer::new(RendererSettings {
            cell_width: 10.0,
            cell_height: 10.0,
            restore_cursor: Some((0, 0)),
        });
        renderer.render(&mut output, &[event("w", json!(null))]).unwrap();
        let rendered = String::from_utf8(output).unwrap();
        assert!(!rendered.contains('┌'));
        assert!(rendered.contains("\u{1b}[1;1H"));
    }
}
