pub mod app;
pub mod event;
pub mod theme;
pub mod ui;

pub use app::App;
pub use theme::{resolve_theme, Theme, ThemeColors};

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use event::{Event, EventHandler};

use crate::history::{HistoryError, HistoryStore};

/// Upper bound for one background save
const SAVE_TIMEOUT: Duration = Duration::from_secs(20);

type SaveOutcome = Result<Result<(), HistoryError>, tokio::time::error::Elapsed>;

pub async fn run_tui(mut app: App, store: HistoryStore) -> anyhow::Result<()> {
    // Buffer stderr while TUI is active to prevent output corrupting the display
    crate::stderr_buffer::activate();

    // Init terminal (sets up panic hooks automatically)
    let mut terminal = ratatui::init();

    let mut events = EventHandler::new(250);
    let mut pending_save: Option<(u64, tokio::task::JoinHandle<SaveOutcome>)> = None;

    let outcome = loop {
        if let Err(e) = terminal.draw(|frame| ui::draw(frame, &mut app)) {
            break Err(e.into());
        }

        match events.next().await {
            Event::Key(key) => handle_key_event(&mut app, key),
            Event::Tick => {
                app.update_flash();
                app.advance_spinner();
            }
        }

        // Check if background save has completed
        if pending_save.as_ref().is_some_and(|(_, handle)| handle.is_finished()) {
            if let Some((seq, handle)) = pending_save.take() {
                apply_save_outcome(&mut app, seq, handle.await);
            }
        }

        // Spawn a queued save; the dashboard keeps rendering meanwhile
        if pending_save.is_none() {
            if let Some((seq, record)) = app.take_save_request() {
                tracing::debug!("saving result for {} to {}", record.display_name, store.describe());
                let store = store.clone();
                pending_save = Some((
                    seq,
                    tokio::spawn(async move {
                        tokio::time::timeout(SAVE_TIMEOUT, store.append(record)).await
                    }),
                ));
            }
        }

        if app.should_quit {
            break Ok(());
        }
    };

    // Restore terminal
    ratatui::restore();

    // A save still in flight is awaited so the row is not lost on quit
    if let Some((_, handle)) = pending_save.take() {
        eprintln!("Waiting for the pending save to finish...");
        match handle.await {
            Ok(Ok(Ok(()))) => eprintln!("Saved to {}", store.describe()),
            Ok(Ok(Err(e))) => eprintln!("Could not save result: {}", e),
            Ok(Err(_)) => eprintln!("Could not save result: timed out after {}s", SAVE_TIMEOUT.as_secs()),
            Err(e) => eprintln!("Could not save result: {}", e),
        }
    }

    // Flush buffered stderr messages now that the terminal is restored
    for msg in crate::stderr_buffer::drain() {
        eprintln!("{}", msg);
    }

    outcome
}

fn apply_save_outcome(
    app: &mut App,
    seq: u64,
    joined: Result<SaveOutcome, tokio::task::JoinError>,
) {
    match joined {
        Ok(Ok(Ok(()))) => app.save_succeeded(seq),
        Ok(Ok(Err(e))) => {
            tracing::warn!("save failed: {}", e);
            app.save_failed(e.to_string());
        }
        Ok(Err(_elapsed)) => {
            app.save_failed(format!("timed out after {}s", SAVE_TIMEOUT.as_secs()));
        }
        Err(e) => app.save_failed(format!("save task failed: {}", e)),
    }
}

fn handle_key_event(app: &mut App, key: KeyEvent) {
    match app.input_mode {
        app::InputMode::Normal => {
            match key.code {
                // Quit
                KeyCode::Char('q') => app.should_quit = true,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    app.should_quit = true
                }

                // Field navigation
                KeyCode::Char('j') | KeyCode::Down | KeyCode::Tab => app.next_field(),
                KeyCode::Char('k') | KeyCode::Up | KeyCode::BackTab => app.previous_field(),

                // Value adjustment
                KeyCode::Char('l') | KeyCode::Right => app.adjust_selected(1),
                KeyCode::Char('h') | KeyCode::Left => app.adjust_selected(-1),
                KeyCode::Char('L') => app.adjust_selected(10),
                KeyCode::Char('H') => app.adjust_selected(-10),
                KeyCode::Char(' ') => {
                    if app.selected_field() == app::Field::IsTeam {
                        app.adjust_selected(1);
                    }
                }

                KeyCode::Enter => {
                    // Failure already surfaces as a flash message
                    let _ = app.compute();
                }

                KeyCode::Char('s') => app.request_save(),
                KeyCode::Char('r') => app.reset_form(),
                KeyCode::Char('?') => app.show_help(),
                KeyCode::Char('b') => app.show_breakdown(),

                _ => {}
            }
        }
        app::InputMode::NameInput => {
            match key.code {
                KeyCode::Enter => app.confirm_name_input(),
                KeyCode::Esc => app.cancel_name_input(),
                KeyCode::Backspace => {
                    app.name_input.pop();
                }
                KeyCode::Char(c) if !c.is_control() => app.push_name_char(c),

                // Ignore all other keys (don't propagate to Normal mode)
                _ => {}
            }
        }
        app::InputMode::Breakdown => match key.code {
            KeyCode::Esc | KeyCode::Char('b') | KeyCode::Char('q') => app.dismiss_breakdown(),
            _ => {}
        },
        app::InputMode::Help => {
            // Any key exits help
            app.dismiss_help();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crossterm::event::KeyEventKind;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Press)
    }

    fn app() -> App {
        let config = Config {
            display_name: Some("amina".to_string()),
            ..Config::default()
        };
        App::new(&config, "memory".to_string(), ThemeColors::dark()).unwrap()
    }

    #[test]
    fn test_keys_drive_form_and_compute() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('L')));
        assert_eq!(app.form.daily_hours, 9.0);
        handle_key_event(&mut app, key(KeyCode::Char('j')));
        handle_key_event(&mut app, key(KeyCode::Char('l')));
        assert_eq!(app.form.production_ratio, 0.15);
        handle_key_event(&mut app, key(KeyCode::Enter));
        assert!(app.session.last().is_some());
    }

    #[test]
    fn test_name_input_swallows_normal_keys() {
        let mut app = App::new(&Config::default(), "memory".to_string(), ThemeColors::dark()).unwrap();
        handle_key_event(&mut app, key(KeyCode::Enter));
        handle_key_event(&mut app, key(KeyCode::Char('s')));
        assert_eq!(app.input_mode, app::InputMode::NameInput);
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.should_quit);
        assert_eq!(app.name_input, "q");
        handle_key_event(&mut app, key(KeyCode::Esc));
        assert_eq!(app.input_mode, app::InputMode::Normal);
    }

    #[test]
    fn test_save_outcomes_update_app() {
        let mut app = app();
        app.compute().unwrap();
        app.request_save();
        let (seq, _) = app.take_save_request().unwrap();

        apply_save_outcome(&mut app, seq, Ok(Ok(Err(HistoryError::Http { status: 500 }))));
        assert!(!app.is_saving);
        assert!(!app.session.is_saved());

        app.request_save();
        let (seq, _) = app.take_save_request().unwrap();
        apply_save_outcome(&mut app, seq, Ok(Ok(Ok(()))));
        assert!(app.session.is_saved());
    }
}
