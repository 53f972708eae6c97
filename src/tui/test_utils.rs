use ratatui::{backend::TestBackend, buffer::Buffer, Frame, Terminal};

/// Renders with `draw` onto a `width`x`height` test terminal and returns the
/// resulting buffer.
pub fn render<F>(width: u16, height: u16, draw: F) -> Buffer
where
    F: FnOnce(&mut Frame),
{
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(draw).unwrap();
    terminal.backend().buffer().clone()
}

/// Buffer contents as one string per row.
pub fn rows(buffer: &Buffer) -> Vec<String> {
    let width = buffer.area.width as usize;
    buffer
        .content
        .chunks(width)
        .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
        .collect()
}

pub fn text(buffer: &Buffer) -> String {
    rows(buffer).join("\n")
}
