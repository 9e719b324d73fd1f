use crate::palette;
use crate::terminal::Terminal;
use crossterm::style::Color;

/// Key reference shown with `?`
pub const HELP: &str = "\
AUDIOBLOOM
─────────────────
m/Tab  Next pattern
Space  Pause
1-9,0  Speed
?      Close help
q/Esc  Quit";

/// Render a centered help overlay box with the provided text.
pub fn render_help_overlay(term: &mut Terminal, width: u16, height: u16, help_text: &str) {
    if help_text.is_empty() {
        return;
    }

    let lines: Vec<&str> = help_text.lines().collect();
    let max_width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let box_width = max_width + 4; // 2 chars padding each side
    let box_height = lines.len() + 2; // 1 row padding top/bottom

    // Center the box
    let start_x = (width as usize).saturating_sub(box_width) / 2;
    let start_y = (height as usize).saturating_sub(box_height) / 2;

    let border_color = Some(palette::DARK[3].lerp(palette::CYBER[1], 0.5).to_color());
    let text_color = Some(Color::Grey);

    // Draw top border: ┌─────┐
    term.set(start_x as i32, start_y as i32, '┌', border_color);
    for x in 1..box_width - 1 {
        term.set((start_x + x) as i32, start_y as i32, '─', border_color);
    }
    term.set((start_x + box_width - 1) as i32, start_y as i32, '┐', border_color);

    // Draw content rows with side borders
    for (i, line) in lines.iter().enumerate() {
        let y = start_y + 1 + i;
        term.set(start_x as i32, y as i32, '│', border_color);

        let padding = max_width.saturating_sub(line.chars().count());
        let padded = format!(" {}{} ", line, " ".repeat(padding));
        term.set_str((start_x + 1) as i32, y as i32, &padded, text_color);

        term.set((start_x + box_width - 1) as i32, y as i32, '│', border_color);
    }

    // Draw bottom border: └─────┘
    let bottom_y = start_y + box_height - 1;
    term.set(start_x as i32, bottom_y as i32, '└', border_color);
    for x in 1..box_width - 1 {
        term.set((start_x + x) as i32, bottom_y as i32, '─', border_color);
    }
    term.set((start_x + box_width - 1) as i32, bottom_y as i32, '┘', border_color);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_is_centered_and_boxed() {
        let mut term = Terminal::offscreen(40, 20);
        render_help_overlay(&mut term, 40, 20, "ab\ncd");
        // box is 6 wide, 4 tall
        assert_eq!(term.cell(17, 8).ch, '┌');
        assert_eq!(term.cell(22, 8).ch, '┐');
        assert_eq!(term.cell(19, 9).ch, 'a');
        assert_eq!(term.cell(17, 11).ch, '└');
    }

    #[test]
    fn empty_text_draws_nothing() {
        let mut term = Terminal::offscreen(10, 5);
        render_help_overlay(&mut term, 10, 5, "");
        assert_eq!(term.cell(0, 0).ch, ' ');
    }
}
