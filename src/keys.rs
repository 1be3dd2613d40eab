use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// The interactive key surface, decoded once at the boundary so the rest
/// of the session never touches terminal key encodings. Anything not
/// bound falls through to `Edit` and is handed to the input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    Commit,
    ClearInput,
    SelectNext,
    SelectPrev,
    DeleteSelected,
    Save,
    Edit,
}

pub fn decode(key: KeyEvent) -> Command {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => Command::Quit,
        KeyCode::Char('c') if ctrl => Command::Quit,
        KeyCode::Char('u') if ctrl => Command::ClearInput,
        KeyCode::Char('n') if ctrl => Command::SelectNext,
        KeyCode::Char('p') if ctrl => Command::SelectPrev,
        KeyCode::Char('d') if ctrl => Command::DeleteSelected,
        KeyCode::Char('s') if ctrl => Command::Save,
        KeyCode::Enter => Command::Commit,
        KeyCode::Down => Command::SelectNext,
        KeyCode::Up => Command::SelectPrev,
        _ => Command::Edit,
    }
}

/// Replies to the quit-time save prompt. Any unbound key keeps the
/// prompt up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmReply {
    Yes,
    No,
    Cancel,
    Pending,
}

pub fn decode_confirm(key: KeyEvent) -> ConfirmReply {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => ConfirmReply::Yes,
        KeyCode::Char('n') => ConfirmReply::No,
        KeyCode::Esc => ConfirmReply::Cancel,
        _ => ConfirmReply::Pending,
    }
}
