use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, Paragraph},
    Terminal,
};
use std::{env, error::Error, fs, io, path::Path, time::Duration};
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;

mod bag;
mod config;
mod highlight;
mod keys;
mod model;
mod parser;
mod store;

use bag::Bag;
use keys::{Command, ConfirmReply};
use model::Entry;
use parser::Parser;

pub type AppResult<T> = Result<T, Box<dyn Error>>;

fn main() -> AppResult<()> {
    ensure_tty_stdin()?;
    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_usage();
        return Ok(());
    }
    if !args.is_empty() {
        eprintln!("Unknown argument.");
        print_usage();
        std::process::exit(2);
    }

    let data_file = config::data_file()?;
    let entries = store::load(&data_file)?;
    run_session(&data_file, entries)
}

fn ensure_tty_stdin() -> AppResult<()> {
    #[cfg(unix)]
    {
        use std::io::IsTerminal;
        use std::os::unix::io::AsRawFd;

        if io::stdin().is_terminal() {
            return Ok(());
        }

        let tty = fs::File::open("/dev/tty")?;
        let result = unsafe { libc::dup2(tty.as_raw_fd(), libc::STDIN_FILENO) };
        if result == -1 {
            return Err(io::Error::last_os_error().into());
        }
    }
    Ok(())
}

fn print_usage() {
    eprintln!(
        "Usage:\n  ideabag [--help]\n\n\
         Type to filter; the same line is parsed as a new entry on Enter:\n  \
         <project text> #tag &tool ...\n\n\
         Keys:\n  \
         Enter       add the typed entry\n  \
         Ctrl+N/Down next entry\n  \
         Ctrl+P/Up   previous entry\n  \
         Ctrl+D      delete selected entry\n  \
         Ctrl+U      clear the input line\n  \
         Ctrl+S      save\n  \
         Esc/Ctrl+C  quit (asks whether to save)"
    );
}

enum Mode {
    Browse,
    ConfirmQuit,
}

fn run_session(data_file: &Path, entries: Vec<Entry>) -> AppResult<()> {
    let (mut terminal, _guard) = setup_terminal()?;
    let mut bag = Bag::new(entries);
    let mut input = Input::default();
    let mut status = String::new();
    let mut mode = Mode::Browse;

    let accent = Color::Rgb(72, 166, 255);
    let warm = Color::Rgb(255, 181, 92);

    loop {
        let prefix = prompt_prefix(&bag);
        terminal.draw(|frame| {
            draw(frame, &mut bag, &input, &prefix, &status, accent, warm);
        })?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };

        match mode {
            Mode::ConfirmQuit => match keys::decode_confirm(key) {
                ConfirmReply::Yes => {
                    store::save(data_file, bag.entries())?;
                    return Ok(());
                }
                ConfirmReply::No => return Ok(()),
                ConfirmReply::Cancel => {
                    mode = Mode::Browse;
                    status.clear();
                }
                ConfirmReply::Pending => {}
            },
            Mode::Browse => match keys::decode(key) {
                Command::Quit => {
                    mode = Mode::ConfirmQuit;
                    status = "save? [y]/n".to_string();
                }
                Command::Commit => {
                    match Parser::new(input.value(), prefix.chars().count()).parse() {
                        Ok(entry) => {
                            bag.add(entry);
                            input.reset();
                            bag.set_query("");
                            status.clear();
                        }
                        // Leave the input untouched so it can be corrected.
                        Err(err) => status = err.to_string(),
                    }
                }
                Command::ClearInput => {
                    input.reset();
                    bag.set_query("");
                    status.clear();
                }
                Command::SelectNext => bag.select_next(),
                Command::SelectPrev => bag.select_prev(),
                Command::DeleteSelected => bag.delete_selected(),
                Command::Save => {
                    store::save(data_file, bag.entries())?;
                    status = "saved".to_string();
                }
                Command::Edit => {
                    let before = input.value().to_string();
                    let _ = input.handle_event(&Event::Key(key));
                    if input.value() != before {
                        bag.set_query(input.value());
                        status.clear();
                    }
                }
            },
        }
    }
}

fn prompt_prefix(bag: &Bag) -> String {
    match bag.selected_position() {
        Some(pos) => format!("{}/{} > ", pos + 1, bag.filtered_len()),
        None => format!("-/{} > ", bag.filtered_len()),
    }
}

fn draw(
    frame: &mut ratatui::Frame,
    bag: &mut Bag,
    input: &Input,
    prefix: &str,
    status: &str,
    accent: Color,
    warm: Color,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(frame.area());
    let prompt_area = chunks[0];
    let status_area = chunks[1];
    let list_area = chunks[2];

    draw_prompt(frame, prompt_area, input, prefix, accent);

    let state_style = if status.starts_with("save") {
        Style::default().fg(accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(warm)
    };
    // Parse errors carry their own caret indentation; render verbatim.
    frame.render_widget(
        Paragraph::new(Span::styled(status.to_string(), state_style)),
        status_area,
    );

    draw_list(frame, list_area, bag, accent, warm);
}

fn draw_prompt(frame: &mut ratatui::Frame, area: Rect, input: &Input, prefix: &str, accent: Color) {
    let prefix_len = prefix.chars().count();
    let input_width = (area.width as usize).saturating_sub(prefix_len).max(1);
    let scroll = input.visual_scroll(input_width);
    let visible = substring_by_char(input.value(), scroll, input_width);

    let prompt = Paragraph::new(Line::from(vec![
        Span::styled(
            prefix.to_string(),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        ),
        Span::raw(visible),
    ]));
    frame.render_widget(prompt, area);

    if area.width > 0 && area.height > 0 {
        let cursor_x = prefix_len + input.visual_cursor().max(scroll).saturating_sub(scroll);
        frame.set_cursor_position((area.x + cursor_x as u16, area.y));
    }
}

fn draw_list(frame: &mut ratatui::Frame, area: Rect, bag: &mut Bag, accent: Color, warm: Color) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Ideas {}/{}", bag.filtered_len(), bag.len()))
        .border_style(Style::default().fg(accent))
        .border_type(BorderType::Rounded);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let window = bag.visible_window(inner.height as usize);
    let selected = bag.selected_position();
    let tokens = bag.tokens().to_vec();

    let mut items = Vec::with_capacity(window.len());
    for (pos, (_, entry)) in bag
        .filtered()
        .enumerate()
        .skip(window.start)
        .take(window.len())
    {
        items.push(ListItem::new(entry_line(
            &entry.display(),
            &tokens,
            selected == Some(pos),
            warm,
        )));
    }
    frame.render_widget(List::new(items), inner);
}

/// One display row: match ranges get a background emphasis, the selected
/// row is bracketed and bold.
fn entry_line(text: &str, tokens: &[String], selected: bool, warm: Color) -> Line<'static> {
    let mut base = Style::default();
    if selected {
        base = base.fg(warm).add_modifier(Modifier::BOLD);
    }
    let emphasis = base.bg(Color::Blue);

    let mut spans = Vec::new();
    spans.push(if selected {
        Span::styled("[ ".to_string(), base)
    } else {
        Span::raw("  ")
    });
    spans.extend(highlighted_spans(text, tokens, base, emphasis));
    if selected {
        spans.push(Span::styled(" ]".to_string(), base));
    }
    Line::from(spans)
}

fn highlighted_spans(
    text: &str,
    tokens: &[String],
    base: Style,
    emphasis: Style,
) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut cursor = 0usize;
    for range in highlight::match_ranges(text, tokens) {
        // Ranges are byte offsets; skip any that land inside a multi-byte
        // character rather than panic on the slice.
        let (Some(before), Some(matched)) = (
            text.get(cursor..range.start),
            text.get(range.start..range.end),
        ) else {
            continue;
        };
        if !before.is_empty() {
            spans.push(Span::styled(before.to_string(), base));
        }
        spans.push(Span::styled(matched.to_string(), emphasis));
        cursor = range.end;
    }
    if let Some(rest) = text.get(cursor..) {
        if !rest.is_empty() {
            spans.push(Span::styled(rest.to_string(), base));
        }
    }
    spans
}

fn substring_by_char(value: &str, start: usize, len: usize) -> String {
    if len == 0 {
        return String::new();
    }
    value.chars().skip(start).take(len).collect()
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
    }
}

fn setup_terminal() -> AppResult<(Terminal<CrosstermBackend<io::Stderr>>, TerminalGuard)> {
    enable_raw_mode()?;
    execute!(io::stderr(), EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(io::stderr());
    let terminal = Terminal::new(backend)?;
    Ok((terminal, TerminalGuard))
}
