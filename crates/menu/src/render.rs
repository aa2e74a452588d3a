//! Draws a carousel onto a ratatui frame.

use crate::carousel::Carousel;
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};

/// Renders the carousel and, when due, its tooltip. Decays the control pulses.
pub fn render_carousel(f: &mut Frame<'_>, carousel: &mut Carousel) {
    if !carousel.is_open() {
        return;
    }
    let screen = f.area();
    let layout = *carousel.layout();

    let body = layout.area.intersection(screen);
    if !body.is_empty() {
        f.render_widget(Clear, body);
        f.render_widget(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(" Forge ")
                .border_style(Style::default().fg(Color::DarkGray)),
            body,
        );
    }

    let frame = carousel.frame_rect().intersection(screen);
    if !frame.is_empty() {
        let label_style = if carousel.is_hovered() {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        let label = Paragraph::new(Line::from(Span::styled(
            carousel.current().display.as_str(),
            label_style,
        )))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(label, frame);
    }

    let counter = format!("{}/{}", carousel.index() + 1, carousel.options().len());
    let counter_area = Rect::new(
        layout.area.x,
        layout.area.y + layout.area.height.saturating_sub(2),
        layout.area.width,
        1,
    )
    .intersection(screen);
    if !counter_area.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled(counter, Style::default().fg(Color::DarkGray)))
                .alignment(Alignment::Center),
            counter_area,
        );
    }

    let (back_pulse, forward_pulse) = carousel.pulses();
    render_button(f, layout.back_button.intersection(screen), "◀", back_pulse > 0);
    render_button(f, layout.forward_button.intersection(screen), "▶", forward_pulse > 0);
    carousel.tick();

    if let Some(tooltip) = carousel.tooltip()
        && let Some((x, y)) = carousel.pointer()
    {
        render_tooltip(f, tooltip, x, y);
    }
}

fn render_button(f: &mut Frame<'_>, area: Rect, glyph: &str, pressed: bool) {
    if area.is_empty() {
        return;
    }
    let style = if pressed {
        Style::default().fg(Color::Black).bg(Color::Cyan)
    } else {
        Style::default().fg(Color::Cyan)
    };
    let button = Paragraph::new(Span::styled(glyph, style))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(style));
    f.render_widget(button, area);
}

/// Draws a boxed tooltip just below and right of the pointer, kept on screen.
fn render_tooltip(f: &mut Frame<'_>, text: &str, x: u16, y: u16) {
    let screen = f.area();
    let lines: Vec<Line<'_>> = text.lines().map(Line::from).collect();
    let inner_width = lines.iter().map(Line::width).max().unwrap_or(0);
    let width = u16::try_from(inner_width + 2).unwrap_or(u16::MAX).min(screen.width);
    let height = u16::try_from(lines.len() + 2).unwrap_or(u16::MAX).min(screen.height);

    let right = screen.x + screen.width;
    let bottom = screen.y + screen.height;
    let left = x.saturating_add(2).min(right.saturating_sub(width));
    let top = y.saturating_add(1).min(bottom.saturating_sub(height));
    let area = Rect::new(left, top, width, height).intersection(screen);
    if area.is_empty() {
        return;
    }

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::White).bg(Color::Black)),
        ),
        area,
    );
}
