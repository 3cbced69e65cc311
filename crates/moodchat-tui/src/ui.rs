use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
};
use moodchat_core::Sender;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};
use crate::app::{App, InputMode};

const EMPTY_TRANSCRIPT_HINT: &str = "Start a conversation about your music preferences!";
const INPUT_PLACEHOLDER: &str = "Type your message here...";
const MAX_INPUT_ROWS: usize = 5;

/// Tabs are laid out as this many spaces
const TAB_STOP: &str = "    ";

/// Terminal columns taken by a character
fn char_width(c: char) -> usize {
    c.width().unwrap_or(0)
}

/// Split into alternating runs of whitespace and non-whitespace, keeping both
fn split_keep_whitespace(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut prev_space = None;

    for (i, c) in text.char_indices() {
        let space = c.is_whitespace();
        if prev_space.is_some_and(|prev| prev != space) {
            tokens.push(&text[start..i]);
            start = i;
        }
        prev_space = Some(space);
    }

    if start < text.len() {
        tokens.push(&text[start..]);
    }

    tokens
}

/// Wrap text to fit within `width` terminal columns, returning multiple lines.
/// Breaks between words and keeps the spacing inside a line; spacing at a
/// break is dropped and words wider than the line are split.
fn wrap_text_to_width(text: &str, width: usize) -> Vec<String> {
    let text = text.replace('\t', TAB_STOP);
    if width == 0 {
        return vec![text];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_width = 0;

    for token in split_keep_whitespace(&text) {
        let token_width = token.width();

        if current_width + token_width <= width {
            current_line.push_str(token);
            current_width += token_width;
            continue;
        }

        if token.starts_with(char::is_whitespace) {
            lines.push(std::mem::take(&mut current_line));
            current_width = 0;
            continue;
        }

        if current_width > 0 {
            let flushed = std::mem::take(&mut current_line);
            let flushed = flushed.trim_end();
            if !flushed.is_empty() {
                lines.push(flushed.to_string());
            }
            current_width = 0;
        }

        // Fill lines column by column; only words wider than a line split
        for c in token.chars() {
            let w = char_width(c);
            if current_width > 0 && current_width + w > width {
                lines.push(std::mem::take(&mut current_line));
                current_width = 0;
            }
            current_line.push(c);
            current_width += w;
        }
    }

    if !current_line.is_empty() || lines.is_empty() {
        lines.push(current_line);
    }

    lines
}

fn sender_style(sender: Sender) -> Style {
    let color = match sender {
        Sender::User => Color::Cyan,
        Sender::Bot => Color::Yellow,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

/// Transcript laid out for a pane `width` columns wide, one entry per screen row.
///
/// Scroll math in [`App`] counts these rows, so rendering must not wrap again.
pub fn transcript_lines(app: &App, width: usize) -> Vec<Line<'static>> {
    let busy = app.controller.is_busy();
    let transcript = app.controller.transcript();

    if transcript.is_empty() && !busy {
        return vec![Line::from(Span::styled(
            EMPTY_TRANSCRIPT_HINT,
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ))];
    }

    let mut lines: Vec<Line<'static>> = Vec::new();

    for msg in transcript {
        lines.push(Line::from(Span::styled(
            format!("{}:", msg.sender.label()),
            sender_style(msg.sender),
        )));
        for text_line in msg.text.lines() {
            for wrapped in wrap_text_to_width(text_line, width) {
                lines.push(Line::from(wrapped));
            }
        }
        lines.push(Line::default());
    }

    if busy {
        lines.push(Line::from(Span::styled(
            format!("{}:", Sender::Bot.label()),
            sender_style(Sender::Bot),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

/// Row and terminal column of a char index within a multi-line draft
fn cursor_row_col(draft: &str, cursor: usize) -> (usize, usize) {
    let mut row = 0;
    let mut col = 0;
    for c in draft.chars().take(cursor) {
        if c == '\n' {
            row += 1;
            col = 0;
        } else {
            col += char_width(c);
        }
    }
    (row, col)
}

/// The part of `line` between columns `offset` and `offset + width`
fn slice_columns(line: &str, offset: usize, width: usize) -> String {
    let mut col = 0;
    let mut visible = String::new();
    for c in line.chars() {
        let w = char_width(c);
        if col >= offset {
            if col + w > offset + width {
                break;
            }
            visible.push(c);
        }
        col += w;
    }
    visible
}

fn input_rows(app: &App) -> u16 {
    let rows = app.draft().split('\n').count().clamp(1, MAX_INPUT_ROWS);
    rows as u16 + 2
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, transcript, input, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(input_rows(app)),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_transcript(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let session_indicator = match app.controller.session_id() {
        Some(id) => format!(" [session {}]", id),
        None => String::new(),
    };

    let title = Line::from(vec![
        Span::styled(" 🎵 Mood-Based Music Chat ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(session_indicator, Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_transcript(app: &mut App, frame: &mut Frame, area: Rect) {
    // Store dimensions for scroll calculations and mouse hit-testing
    app.chat_area = Some(area);
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    let lines = transcript_lines(app, app.chat_width as usize);
    let total = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    let max_scroll = total.saturating_sub(app.chat_height);
    if app.follow_latest {
        app.scroll = max_scroll;
    } else {
        app.scroll = app.scroll.min(max_scroll);
    }

    let border_color = if app.input_mode == InputMode::Normal {
        Color::Cyan
    } else {
        Color::DarkGray
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" {} ", app.endpoint));

    let chat = Paragraph::new(Text::from(lines))
        .block(block)
        .scroll((app.scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let busy = app.controller.is_busy();
    let editing = app.input_mode == InputMode::Editing;

    let border_color = if busy {
        Color::DarkGray
    } else if editing {
        Color::Yellow
    } else {
        Color::Gray
    };
    let title = if busy { " Waiting for reply... " } else { " Message " };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Inner size = total size - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let inner_height = area.height.saturating_sub(2) as usize;
    let (cursor_row, cursor_col) = cursor_row_col(app.draft(), app.cursor);

    // Scroll offsets that keep the cursor visible
    let row_offset = (cursor_row + 1).saturating_sub(inner_height);
    let col_offset = if inner_width == 0 {
        0
    } else {
        (cursor_col + 1).saturating_sub(inner_width)
    };

    let text_style = if busy {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Cyan)
    };

    let input_text = if app.draft().is_empty() {
        Text::from(Span::styled(
            INPUT_PLACEHOLDER,
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ))
    } else {
        let visible: Vec<Line> = app
            .draft()
            .split('\n')
            .skip(row_offset)
            .take(inner_height)
            .map(|line| {
                let slice = slice_columns(line, col_offset, inner_width);
                Line::from(Span::styled(slice, text_style))
            })
            .collect();
        Text::from(visible)
    };

    frame.render_widget(Paragraph::new(input_text).block(input_block), area);

    // Show cursor when editing
    if editing {
        let x = cursor_col.saturating_sub(col_offset) as u16;
        let y = cursor_row.saturating_sub(row_offset) as u16;
        frame.set_cursor_position((area.x + x + 1, area.y + y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " VIEW ",
        InputMode::Editing => " TYPE ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let send_indicator = if app.controller.is_busy() {
        Span::styled(" ... ", Style::default().bg(Color::DarkGray).fg(Color::Gray))
    } else if app.controller.can_send() {
        Span::styled(" → ", Style::default().bg(Color::Blue).fg(Color::White).bold())
    } else {
        Span::styled(" → ", Style::default().bg(Color::DarkGray).fg(Color::Gray))
    };

    let hints = match app.input_mode {
        InputMode::Editing => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Shift+Enter ", key_style),
            Span::styled(" newline ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" view ", label_style),
        ],
        InputMode::Normal => vec![
            Span::styled(" j/k ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" i ", key_style),
            Span::styled(" type ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
    };

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            send_indicator,
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}
