//! ANSI cursor sequences used by the terminal renderer.

const CSI: &str = "\x1b[";

/// Move the cursor to an absolute 1-based `row` and `column`.
pub fn move_to(row: u16, column: u16) -> String {
    format!("{CSI}{row};{column}H")
}

pub fn hide() -> &'static str {
    "\x1b[?25l"
}

pub fn show() -> &'static str {
    "\x1b[?25h"
}

/// Erase the whole screen without moving the cursor.
pub fn clear_screen() -> &'static str {
    "\x1b[2J"
}
