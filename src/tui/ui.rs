use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;

use crate::constants::{UI_REFRESH_INTERVAL_MS, UI_SCROLL_LINES, UI_DEFAULT_VIEWPORT_HEIGHT};
use crate::tui::app::{App, InputMode};
use crate::tui::render::render_ui;

/// Run the terminal UI
pub async fn run_ui(mut app: App) -> Result<()> {
    if !crossterm::tty::IsTty::is_tty(&io::stdout()) {
        eprintln!("❌ pdfchat requires an interactive terminal.");
        eprintln!("   For scripted use pass a question with --prompt, for example:");
        eprintln!("   pdfchat -f report.pdf -p \"What is the total?\"");
        return Err(anyhow::anyhow!("No interactive terminal available"));
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let res = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| render_ui(f, app))?;

        if event::poll(Duration::from_millis(UI_REFRESH_INTERVAL_MS))? {
            if let Event::Key(key) = event::read()? {
                handle_key(app, key).await;
            }
        }

        app.poll_tasks().await;
        app.tick();
    }

    Ok(())
}

/// Route one key press according to the input mode
async fn handle_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL {
        app.quit();
        return;
    }

    if app.show_help {
        app.show_help = false;
        return;
    }

    let page = UI_DEFAULT_VIEWPORT_HEIGHT / 2;

    match app.mode {
        InputMode::Normal => match key.code {
            KeyCode::Char('q') => app.quit(),
            KeyCode::Char('i') | KeyCode::Enter => app.mode = InputMode::Insert,
            KeyCode::Char(':') => {
                app.command.clear();
                app.mode = InputMode::Command;
            }
            KeyCode::Up | KeyCode::Char('k') => app.scroll_up(1),
            KeyCode::Down | KeyCode::Char('j') => app.scroll_down(1),
            KeyCode::PageUp => app.scroll_up(page),
            KeyCode::PageDown => app.scroll_down(page),
            KeyCode::End | KeyCode::Char('G') => app.scroll_to_bottom(),
            _ => {}
        },
        InputMode::Insert => match key.code {
            KeyCode::Esc => app.mode = InputMode::Normal,
            KeyCode::Enter => app.submit_question(),
            // ':' on an empty line opens the command prompt
            KeyCode::Char(':') if app.input.is_empty() => {
                app.command.clear();
                app.mode = InputMode::Command;
            }
            // The question box is read-only until a session exists and while busy
            KeyCode::Char(c) if app.accepts_input() => app.input.push(c),
            KeyCode::Backspace if app.accepts_input() => {
                app.input.pop();
            }
            KeyCode::PageUp => app.scroll_up(UI_SCROLL_LINES),
            KeyCode::PageDown => app.scroll_down(UI_SCROLL_LINES),
            _ => {}
        },
        InputMode::Command => match key.code {
            KeyCode::Esc => {
                app.command.clear();
                app.mode = InputMode::Insert;
            }
            KeyCode::Enter => {
                let line = std::mem::take(&mut app.command);
                app.mode = InputMode::Insert;
                app.run_command(&line).await;
            }
            KeyCode::Char(c) => app.command.push(c),
            KeyCode::Backspace => {
                if app.command.pop().is_none() {
                    app.mode = InputMode::Insert;
                }
            }
            _ => {}
        },
    }
}
