// UI rendering
//
// Thin rendering layer: pane tab bar, topic line, message list, compose box,
// settings overlay, status bar. Message bodies are shown as the fragments
// they are; styling fidelity is not this layer's job.

use super::Shell;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthChar;

/// Widest a pane tab title gets before truncation
const MAX_TAB_WIDTH: usize = 14;

pub fn draw(f: &mut Frame, shell: &mut Shell) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Tab bar
            Constraint::Length(1), // Topic line
            Constraint::Min(3),    // Messages
            Constraint::Length(3), // Compose box
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    render_tabs(f, chunks[0], shell);
    render_topic(f, chunks[1], shell);
    render_messages(f, chunks[2], shell);
    render_input(f, chunks[3], shell);
    render_status(f, chunks[4], shell);

    if shell.coord.overlay_open() {
        render_overlay(f, shell);
    }
}

/// Truncate to a display width, respecting wide characters
fn truncate_width(s: &str, max: usize) -> String {
    let mut width = 0;
    let mut out = String::new();
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > max {
            out.push('…');
            break;
        }
        width += w;
        out.push(c);
    }
    out
}

fn render_tabs(f: &mut Frame, area: Rect, shell: &Shell) {
    let active = shell.coord.registry.active_id();
    let dimmed = !shell.coord.is_focused();

    let mut spans: Vec<Span> = Vec::new();
    for window in shell.coord.registry.iter() {
        let title = truncate_width(&window.title, MAX_TAB_WIDTH);
        let mut style = if Some(window.id) == active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        if dimmed {
            style = style.add_modifier(Modifier::DIM);
        }
        spans.push(Span::styled(format!(" {title} "), style));
        spans.push(Span::raw(" "));
    }

    if spans.is_empty() {
        spans.push(Span::styled(
            " no windows ",
            Style::default().fg(Color::DarkGray),
        ));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_topic(f: &mut Frame, area: Rect, shell: &Shell) {
    let topic = shell
        .coord
        .registry
        .active_window()
        .map(|w| w.topic.as_str())
        .unwrap_or("");
    f.render_widget(
        Paragraph::new(Span::styled(topic, Style::default().fg(Color::DarkGray))),
        area,
    );
}

fn render_messages(f: &mut Frame, area: Rect, shell: &mut Shell) {
    let block = Block::default().borders(Borders::ALL);
    let inner_height = area.height.saturating_sub(2) as usize;

    let Some(window) = shell.coord.registry.active_window_mut() else {
        let placeholder = Paragraph::new(Span::styled(
            "  waiting for a conversation to open...",
            Style::default().fg(Color::DarkGray),
        ))
        .block(block);
        f.render_widget(placeholder, area);
        return;
    };

    window
        .scroll
        .update_dimensions(window.messages.len(), inner_height);
    let (start, end) = window.scroll.visible_range();

    let lines: Vec<Line> = window.messages[start..end]
        .iter()
        .map(|m| {
            Line::from(vec![
                Span::styled(
                    format!("{} ", m.timestamp.format("%H:%M")),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    format!("<{}> ", m.from),
                    Style::default().fg(Color::Yellow),
                ),
                Span::raw(m.body.clone()),
            ])
        })
        .collect();

    let title = format!(" {} ", window.title);
    let paragraph = Paragraph::new(lines).block(block.title(title));
    f.render_widget(paragraph, area);
}

fn render_input(f: &mut Frame, area: Rect, shell: &Shell) {
    let (text, focused) = shell
        .coord
        .registry
        .active_window()
        .map(|w| (w.input.text().to_string(), w.input.is_focused()))
        .unwrap_or_default();

    let mut spans = vec![Span::raw(text)];
    if focused {
        spans.push(Span::styled("█", Style::default().fg(Color::Cyan)));
    }

    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" compose "),
    );
    f.render_widget(paragraph, area);
}

fn render_status(f: &mut Frame, area: Rect, shell: &Shell) {
    let mut spans = vec![Span::styled(
        format!(
            " {} window{} | Tab:next  F2:settings  ^C:quit ",
            shell.coord.registry.len(),
            if shell.coord.registry.len() == 1 { "" } else { "s" },
        ),
        Style::default().fg(Color::Gray),
    )];

    if let Some(entry) = shell.log_buffer.latest() {
        let color = match entry.level.as_str() {
            "ERROR" => Color::Red,
            "WARN" => Color::Yellow,
            _ => Color::DarkGray,
        };
        spans.push(Span::styled(
            format!(
                "| {} {} {}",
                entry.timestamp.format("%H:%M:%S"),
                entry.level.as_str(),
                entry.message
            ),
            Style::default().fg(color),
        ));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Centered settings overlay. While visible, the shell suspends key routing
/// into chat windows.
fn render_overlay(f: &mut Frame, shell: &Shell) {
    let area = centered_rect(50, 40, f.area());
    f.render_widget(Clear, area);

    let on_off = |v: bool| if v { "on" } else { "off" };
    let lines = vec![
        Line::from(""),
        Line::from(format!(
            "  auto-link URLs:      {}",
            on_off(shell.rewriter.is_some())
        )),
        Line::from(format!(
            "  pane auto-ordering:  {}",
            on_off(shell.mru_reorder)
        )),
        Line::from(""),
        Line::from(Span::styled(
            "  edit ~/.config/parlor/config.toml to change",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "  Esc or F2 to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" settings "),
        );
    f.render_widget(paragraph, area);
}

/// Rect centered in `r`, sized as percentages of it
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_width_ascii() {
        assert_eq!(truncate_width("short", 14), "short");
        assert_eq!(truncate_width("a-very-long-window-title", 6), "a-very…");
    }

    #[test]
    fn test_truncate_width_wide_chars() {
        // Each CJK character is two cells wide
        assert_eq!(truncate_width("日本語チャット", 6), "日本語…");
    }

    #[test]
    fn test_centered_rect_fits_inside() {
        let outer = Rect::new(0, 0, 100, 40);
        let inner = centered_rect(50, 50, outer);
        assert!(inner.width <= outer.width);
        assert!(inner.height <= outer.height);
        assert!(inner.x >= outer.x && inner.y >= outer.y);
    }
}
