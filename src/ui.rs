use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};
use crate::app::{App, CAPABILITIES, CAPABILITIES_HEADING, DISCLAIMER, INPUT_PLACEHOLDER, TITLE};
use crate::assets::Logo;
use crate::state::ChatRole;

const PAI_BLUE: Color = Color::Rgb(0x00, 0x52, 0xFF);
const ASSISTANT_TEXT: Color = Color::Rgb(0xE1, 0xE8, 0xF0);
const DISCLAIMER_TEXT: Color = Color::Rgb(0xA0, 0xA0, 0xA0);

/// Below this width the capabilities panel is dropped to leave room for chat
const MIN_WIDTH_FOR_CAPABILITIES: u16 = 90;

/// Turn `**bold**` runs into bold spans. An unmatched `**` stays literal.
fn parse_markdown_line(text: &str) -> Line<'static> {
    let parts: Vec<&str> = text.split("**").collect();
    // An even number of parts means the last `**` was never closed
    let unclosed = parts.len() % 2 == 0;

    let mut spans: Vec<Span<'static>> = Vec::new();
    for (i, part) in parts.iter().enumerate() {
        let is_last = i == parts.len() - 1;
        if i % 2 == 0 {
            if !part.is_empty() {
                spans.push(Span::raw(part.to_string()));
            }
        } else if unclosed && is_last {
            spans.push(Span::raw(format!("**{}", part)));
        } else if part.is_empty() {
            spans.push(Span::raw("****"));
        } else {
            spans.push(Span::styled(
                part.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ));
        }
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let header_height = match &app.logo {
        Logo::Art(lines) => lines.len() as u16 + 1,
        Logo::Missing { .. } => 3,
    };

    // Main layout: header, disclaimer, body, input, footer
    let [header_area, disclaimer_area, body_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(header_height),
        Constraint::Length(3),
        Constraint::Min(5),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_disclaimer(frame, disclaimer_area);

    if body_area.width >= MIN_WIDTH_FOR_CAPABILITIES {
        let [chat_area, capabilities_area] = Layout::horizontal([
            Constraint::Percentage(65),
            Constraint::Percentage(35),
        ])
        .areas(body_area);
        render_chat(app, frame, chat_area);
        render_capabilities(frame, capabilities_area);
    } else {
        render_chat(app, frame, body_area);
    }

    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title_style = Style::default().fg(PAI_BLUE).add_modifier(Modifier::BOLD);

    let lines: Vec<Line> = match &app.logo {
        Logo::Art(art) => {
            let mut lines: Vec<Line> = art
                .iter()
                .map(|l| Line::from(Span::styled(l.clone(), Style::default().fg(PAI_BLUE))))
                .collect();
            lines.push(Line::from(Span::styled(TITLE, title_style)));
            lines
        }
        // No logo: "Pai" takes its place, plus a hint on where to put one
        Logo::Missing { warning } => vec![
            Line::from(Span::styled("Pai", title_style)),
            Line::from(Span::styled(
                warning.clone(),
                Style::default().fg(Color::Yellow),
            )),
            Line::from(Span::styled(TITLE, title_style)),
        ],
    };

    let header = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(header, area);
}

fn render_disclaimer(frame: &mut Frame, area: Rect) {
    let disclaimer = Paragraph::new(DISCLAIMER)
        .style(Style::default().fg(DISCLAIMER_TEXT))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(PAI_BLUE)),
        );
    frame.render_widget(disclaimer, area);
}

fn render_capabilities(frame: &mut Frame, area: Rect) {
    let items: Vec<ListItem> = CAPABILITIES
        .iter()
        .map(|c| ListItem::new(Text::from(format!("• {}", c))))
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Span::styled(
                format!(" {} ", CAPABILITIES_HEADING),
                Style::default().add_modifier(Modifier::BOLD),
            )),
    );
    frame.render_widget(list, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    // Store area for mouse hit-testing and inner size for scroll calculations
    app.chat_area = Some(area);
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);
    if app.follow_tail {
        app.scroll_to_bottom();
    }

    let mut lines: Vec<Line> = Vec::new();

    for record in app.visible_history() {
        match record.role {
            ChatRole::User => {
                lines.push(Line::from(Span::styled(
                    format!("{} Tú", record.avatar),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )));
                for line in record.content.lines() {
                    lines.push(Line::from(line.to_string()));
                }
            }
            ChatRole::Assistant => {
                lines.push(Line::from(Span::styled(
                    format!("{} Pai", record.avatar),
                    Style::default().fg(PAI_BLUE).add_modifier(Modifier::BOLD),
                )));
                for line in record.content.lines() {
                    lines.push(parse_markdown_line(line).style(Style::default().fg(ASSISTANT_TEXT)));
                }
            }
        }
        lines.push(Line::default());
    }

    if app.is_waiting() {
        lines.push(Line::from(Span::styled(
            format!("{} Pai", ChatRole::Assistant.avatar()),
            Style::default().fg(PAI_BLUE).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat(app.animation_frame as usize + 1);
        lines.push(Line::from(Span::styled(
            format!("Pensando{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    let chat = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(PAI_BLUE))
                .title(" Chat "),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let (title, border_color) = if app.is_waiting() {
        (" Esperando respuesta... ", Color::DarkGray)
    } else {
        (" Mensaje (Enter para enviar) ", Color::Yellow)
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    if app.input.is_empty() {
        let placeholder = Paragraph::new(INPUT_PLACEHOLDER)
            .style(Style::default().fg(Color::DarkGray))
            .block(input_block);
        frame.render_widget(placeholder, area);
        if !app.is_waiting() {
            frame.set_cursor_position((area.x + 1, area.y + 1));
        }
        return;
    }

    // Horizontal scrolling keeps the cursor inside the box
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;
    let scroll_offset = if inner_width == 0 || cursor_pos < inner_width {
        0
    } else {
        cursor_pos - inner_width + 1
    };

    let visible_text: String = app
        .input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);
    frame.render_widget(input, area);

    let cursor_x = (cursor_pos - scroll_offset) as u16;
    frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let key_style = Style::default().fg(Color::Yellow);
    let footer = Line::from(vec![
        Span::styled(" Enter", key_style),
        Span::raw(" enviar  "),
        Span::styled("Esc", key_style),
        Span::raw(" saltar animación / salir  "),
        Span::styled("PgUp/PgDn", key_style),
        Span::raw(" desplazar  "),
        Span::styled("Ctrl+C", key_style),
        Span::raw(" salir   "),
        Span::styled(
            format!("conversación {}", app.session.conversation_id()),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(footer), area);
}
