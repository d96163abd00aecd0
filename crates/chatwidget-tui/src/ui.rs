use chatwidget_core::{ChatMessage, ChatRole};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::App;

const INPUT_PLACEHOLDER: &str = "Ask a question...";

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, chat, input, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let header = Text::from(vec![
        Line::from(vec![
            Span::styled(format!(" {} ", app.title), Style::default().fg(Color::Cyan).bold()),
            Span::styled(
                format!("v{}", env!("CARGO_PKG_VERSION")),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(Span::styled(
            format!(" {}", app.subtitle),
            Style::default().fg(Color::Gray),
        )),
    ]);

    frame.render_widget(
        Paragraph::new(header).style(Style::default().bg(Color::Black)),
        area,
    );
}

fn message_lines(msg: &ChatMessage) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    match msg.role() {
        ChatRole::User => {
            lines.push(
                Line::from(Span::styled(
                    "You:",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ))
                .alignment(Alignment::Right),
            );
            for line in msg.content().lines() {
                lines.push(Line::from(line.to_string()).alignment(Alignment::Right));
            }
        }
        ChatRole::Assistant => {
            let (label_color, text_style) = if msg.is_failure() {
                (Color::Red, Style::default().fg(Color::Red))
            } else {
                (Color::Yellow, Style::default())
            };
            lines.push(Line::from(Span::styled(
                "AI:",
                Style::default().fg(label_color).add_modifier(Modifier::BOLD),
            )));
            for line in msg.content().lines() {
                lines.push(Line::styled(line.to_string(), text_style));
            }
        }
    }

    lines.push(Line::default());
    lines
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Conversation ");

    let mut lines: Vec<Line> = app.store.messages().iter().flat_map(message_lines).collect();

    if app.store.is_busy() {
        lines.push(Line::from(Span::styled(
            "AI:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    let chat = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: true });

    // Store area for mouse hit-testing and the wrapped size for scroll calculations
    let inner_width = area.width.saturating_sub(2);
    app.chat_area = Some(area);
    app.chat_height = area.height.saturating_sub(2);
    app.chat_lines = u16::try_from(chat.line_count(inner_width)).unwrap_or(u16::MAX);
    if app.follow_tail {
        app.scroll_chat_to_bottom();
    }

    frame.render_widget(chat.block(block).scroll((app.chat_scroll, 0)), area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let busy = app.store.is_busy();
    let border_color = if busy { Color::DarkGray } else { Color::Yellow };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(if busy { " Waiting for answer " } else { " Ask " });

    let draft = app.store.draft();
    if draft.is_empty() {
        let placeholder = Paragraph::new(INPUT_PLACEHOLDER)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(placeholder, area);
    } else {
        // Horizontal scrolling keeps the cursor inside the box
        let inner_width = area.width.saturating_sub(2) as usize;
        let scroll_offset = if inner_width == 0 || app.query_cursor < inner_width {
            0
        } else {
            app.query_cursor - inner_width + 1
        };
        let visible_text: String = draft.chars().skip(scroll_offset).take(inner_width).collect();

        let input = Paragraph::new(visible_text)
            .style(Style::default().fg(Color::Cyan))
            .block(block);
        frame.render_widget(input, area);
    }

    if !busy {
        let inner_width = area.width.saturating_sub(2) as usize;
        let cursor_x = if inner_width == 0 {
            0
        } else {
            app.query_cursor.min(inner_width - 1)
        };
        frame.set_cursor_position((area.x + 1 + cursor_x as u16, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let key_style = Style::default().fg(Color::Cyan).bold();
    let send_style = if app.store.can_submit() {
        key_style
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let footer = Line::from(vec![
        Span::styled(" Enter", send_style),
        Span::styled(" Send  ", Style::default().fg(Color::Gray)),
        Span::styled("PgUp/PgDn", key_style),
        Span::styled(" Scroll  ", Style::default().fg(Color::Gray)),
        Span::styled("Esc", key_style),
        Span::styled(" Quit", Style::default().fg(Color::Gray)),
    ]);

    frame.render_widget(
        Paragraph::new(footer).style(Style::default().bg(Color::Black)),
        area,
    );
}
