//! Key bindings per screen

use crossterm::event::{KeyCode, KeyModifiers};

use crate::selection::{Action, Screen};

/// Help line shown in the status bar
pub fn help(screen: Screen) -> &'static str {
    match screen {
        Screen::Browse => {
            "[↑↓] Move  [←→] Page  [PgUp/PgDn] By date  [f] Default order  [Enter] Download  [d] Description  [c] Comments  [s] Exit"
        }
        Screen::Description => "[a] Back  [d] Download",
        Screen::Comments => "[←→] Page  [a] Back  [d] Download",
    }
}

/// Decode a key press on `screen`
pub fn action_for(screen: Screen, code: KeyCode, modifiers: KeyModifiers) -> Option<Action> {
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Action::Interrupt);
    }

    match screen {
        Screen::Browse => browse_keys(code),
        Screen::Description => description_keys(code),
        Screen::Comments => comments_keys(code),
    }
}

fn browse_keys(code: KeyCode) -> Option<Action> {
    let action = match code {
        KeyCode::Up | KeyCode::Char('k') => Action::Up,
        KeyCode::Down | KeyCode::Char('j') => Action::Down,
        KeyCode::Left | KeyCode::Char('h') => Action::Left,
        KeyCode::Right | KeyCode::Char('l') => Action::Right,
        KeyCode::PageUp => Action::SortDateAsc,
        KeyCode::PageDown => Action::SortDateDesc,
        KeyCode::Char('f') | KeyCode::Char('F') => Action::DefaultOrder,
        KeyCode::Enter => Action::Enter,
        KeyCode::Char('d') | KeyCode::Char('D') => Action::ShowDescription,
        KeyCode::Char('c') | KeyCode::Char('C') => Action::ShowComments,
        KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Char('q') | KeyCode::Esc => Action::Exit,
        _ => return None,
    };
    Some(action)
}

fn description_keys(code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Esc => Some(Action::Back),
        KeyCode::Char('d') | KeyCode::Char('D') => Some(Action::Download),
        _ => None,
    }
}

fn comments_keys(code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Esc => Some(Action::Back),
        KeyCode::Left | KeyCode::Char('h') => Some(Action::Left),
        KeyCode::Right | KeyCode::Char('l') => Some(Action::Right),
        KeyCode::Char('d') | KeyCode::Char('D') => Some(Action::Download),
        _ => None,
    }
}
