use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::AppState;
use crate::session::{DocumentStatus, MessageRole};
use crate::tui::app::{App, InputMode};
use crate::tui::markdown::parse_markdown;

const HELP_LINES: &[(&str, &str)] = &[
    (":upload <path>...", "Upload PDF files (alias :u)"),
    (":docs", "Toggle the document bar"),
    (":help", "Show this help"),
    (":quit", "Quit (alias :q)"),
    ("Enter", "Send the question"),
    ("Esc", "Normal mode (scroll with arrows / PageUp / PageDown)"),
    ("i", "Back to typing questions"),
    ("Ctrl+C", "Quit"),
];

/// Render the main UI
pub fn render_ui(frame: &mut Frame, app: &App) {
    let state = app.snapshot();
    let show_documents = app.ui.show_documents && !state.registry().is_empty();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),                                   // Header
            Constraint::Length(if show_documents { 3 } else { 0 }), // Documents
            Constraint::Min(5),                                      // Conversation
            Constraint::Length(1),                                   // Activity
            Constraint::Length(3),                                   // Input
            Constraint::Length(1),                                   // Status bar
        ])
        .split(frame.area());

    render_header(frame, chunks[0], app, &state);
    if show_documents {
        render_documents(frame, chunks[1], &state);
    }
    if app.show_help {
        render_help(frame, chunks[2]);
    } else {
        render_conversation(frame, chunks[2], app, &state);
    }
    render_activity(frame, chunks[3], app, &state);
    render_input(frame, chunks[4], app, &state);
    render_status_bar(frame, chunks[5], app);
}

fn render_header(frame: &mut Frame, area: Rect, app: &App, state: &AppState) {
    let session = match state.session_id() {
        Some(id) => Span::styled(id.to_string(), Style::default().fg(Color::Green)),
        None => Span::styled("no session", Style::default().fg(Color::DarkGray)),
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "PDF Chat",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | Backend: "),
        Span::styled(
            app.controller.backend_endpoint(),
            Style::default().fg(Color::Gray),
        ),
        Span::raw(" | Session: "),
        session,
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray)),
    )
    .alignment(Alignment::Center);

    frame.render_widget(header, area);
}

fn render_documents(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut spans = Vec::new();
    for (idx, doc) in state.documents().iter().enumerate() {
        if idx > 0 {
            spans.push(Span::styled("  ", Style::default()));
        }
        let style = match doc.status {
            DocumentStatus::Attached => Style::default().fg(Color::White),
            DocumentStatus::Uploading => Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
        };
        spans.push(Span::styled(
            format!("📄 {} ({})", doc.name, doc.size_label),
            style,
        ));
        if doc.status == DocumentStatus::Uploading {
            spans.push(Span::styled(" uploading…", Style::default().fg(Color::Yellow)));
        }
    }

    let bar = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .title(format!("Documents [{}]", state.registry().attached().count()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(bar, area);
}

/// Lines for the conversation pane
fn conversation_lines(app: &App, state: &AppState) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if state.log().is_empty() {
        lines.push(Line::from(Span::styled(
            "Welcome! Upload PDF documents with :upload <path> to get started.",
            Style::default().fg(Color::Cyan),
        )));
        let attached: Vec<_> = state.registry().attached().collect();
        if !attached.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Ready to chat with:",
                Style::default().add_modifier(Modifier::BOLD),
            )));
            for doc in attached {
                lines.push(Line::from(format!("  • {}", doc.name)));
            }
        }
        return lines;
    }

    for msg in state.messages() {
        let (label, color) = match msg.role {
            MessageRole::User => ("You", Color::Blue),
            MessageRole::Assistant => ("Assistant", Color::Green),
            MessageRole::System => ("System", Color::Yellow),
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("[{}] ", label),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                msg.timestamp.format("%H:%M").to_string(),
                Style::default().fg(Color::DarkGray),
            ),
        ]));

        match msg.role {
            MessageRole::Assistant if app.ui.render_markdown => {
                lines.extend(parse_markdown(&msg.content))
            }
            MessageRole::System => {
                for line in msg.content.lines() {
                    lines.push(Line::from(Span::styled(
                        line.to_string(),
                        Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
                    )));
                }
            }
            _ => {
                for line in msg.content.lines() {
                    lines.push(Line::from(line.to_string()));
                }
            }
        }
        lines.push(Line::from(""));
    }

    lines
}

fn render_conversation(frame: &mut Frame, area: Rect, app: &App, state: &AppState) {
    let lines = conversation_lines(app, state);

    // Unwrapped line count, so long answers may scroll a little short
    let visible = area.height.saturating_sub(2);
    let total = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    let bottom = total.saturating_sub(visible);
    let offset = bottom.saturating_sub(app.scroll_from_bottom);

    let log = state.log();
    let title = match (log.is_empty(), log.title()) {
        (true, _) => "Conversation".to_string(),
        (false, Some(first_question)) => {
            format!("{} ({})", first_question, log.summary())
        }
        (false, None) => format!("Conversation ({})", log.summary()),
    };

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .wrap(Wrap { trim: false })
        .scroll((offset, 0));

    frame.render_widget(paragraph, area);
}

fn render_help(frame: &mut Frame, area: Rect) {
    let mut lines = vec![Line::from(Span::styled(
        "Commands",
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    for (key, description) in HELP_LINES {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<20}", key), Style::default().fg(Color::Cyan)),
            Span::raw(*description),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press any key to close",
        Style::default().fg(Color::DarkGray),
    )));

    let help = Paragraph::new(lines).block(
        Block::default()
            .title("Help")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(help, area);
}

fn render_activity(frame: &mut Frame, area: Rect, app: &App, state: &AppState) {
    let line = if state.is_busy() {
        Line::from(Span::styled(
            format!(" {} Thinking...", app.spinner()),
            Style::default().fg(Color::Cyan),
        ))
    } else if state.is_uploading() {
        Line::from(Span::styled(
            format!(" {} Uploading...", app.spinner()),
            Style::default().fg(Color::Yellow),
        ))
    } else if let Some(error) = state.last_error() {
        Line::from(Span::styled(
            format!(" ✗ {}", error),
            Style::default().fg(Color::Red),
        ))
    } else {
        Line::from("")
    };

    frame.render_widget(Paragraph::new(line), area);
}

fn render_input(frame: &mut Frame, area: Rect, app: &App, state: &AppState) {
    let (title, text, border) = match app.mode {
        InputMode::Command => (
            "Command",
            Line::from(format!(":{}", app.command)),
            Color::Magenta,
        ),
        _ if app.input.is_empty() => (
            "Question",
            Line::from(Span::styled(
                state.input_placeholder(),
                Style::default().fg(Color::DarkGray),
            )),
            Color::DarkGray,
        ),
        _ => {
            let color = if state.can_send(&app.input) {
                Color::Green
            } else {
                Color::DarkGray
            };
            ("Question", Line::from(app.input.clone()), color)
        }
    };

    let input = Paragraph::new(text).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    frame.render_widget(input, area);

    if app.mode != InputMode::Normal {
        let typed = match app.mode {
            InputMode::Command => app.command.chars().count() + 1,
            _ => app.input.chars().count(),
        };
        let x = area.x + 1 + u16::try_from(typed).unwrap_or(u16::MAX);
        frame.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let (mode, color) = match app.mode {
        InputMode::Normal => ("NORMAL", Color::Blue),
        InputMode::Insert => ("INSERT", Color::Green),
        InputMode::Command => ("COMMAND", Color::Magenta),
    };

    let mut spans = vec![Span::styled(
        format!(" {} ", mode),
        Style::default()
            .fg(Color::Black)
            .bg(color)
            .add_modifier(Modifier::BOLD),
    )];
    match &app.status_message {
        Some(message) => spans.push(Span::raw(format!(" {}", message))),
        None => spans.push(Span::styled(
            " :help for commands",
            Style::default().fg(Color::DarkGray),
        )),
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
