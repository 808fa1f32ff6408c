use std::sync::mpsc::Sender;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Mode {
    Normal,
    Insert,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Operator {
    Delete,
    Yank,
}

impl Operator {
    fn parse(code: KeyCode) -> Option<Operator> {
        match code {
            KeyCode::Char('d') => Some(Operator::Delete),
            KeyCode::Char('y') => Some(Operator::Yank),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Motion {
    Up,
    Down,
    Left,
    Right,

    Start,
    End,

    Word,
}

impl Motion {
    fn parse(code: KeyCode) -> Option<Motion> {
        match code {
            KeyCode::Char('k') | KeyCode::Up => Some(Motion::Up),
            KeyCode::Char('j') | KeyCode::Down => Some(Motion::Down),
            KeyCode::Char('h') | KeyCode::Left => Some(Motion::Left),
            KeyCode::Char('l') | KeyCode::Right => Some(Motion::Right),
            KeyCode::Char('0') | KeyCode::Home => Some(Motion::Start),
            KeyCode::Char('$') | KeyCode::End => Some(Motion::End),
            KeyCode::Char('w') => Some(Motion::Word),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Event {
    Quit,
    ChangeMode(Mode),
    Write(char),
    BackSpace,
    Enter,
    /// `motion: None` with an operator applies it to whole lines (`dd`, `yy`).
    Motion {
        op: Option<Operator>,
        mult: u8,
        motion: Option<Motion>,
    },
    Paste,
    Save,
    WindowResize(u16, u16),
}

/// Pending normal-mode state between key presses.
#[derive(Debug)]
pub struct KeyTranslator {
    op: Option<Operator>,
    mult: u8,
}

impl Default for KeyTranslator {
    fn default() -> Self {
        Self { op: None, mult: 1 }
    }
}

impl KeyTranslator {
    pub fn translate(&mut self, ev: crossterm::event::Event, mode: Mode) -> Option<Event> {
        match ev {
            crossterm::event::Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
                if is_save(&key_event) {
                    return Some(Event::Save);
                }

                match mode {
                    Mode::Normal => {
                        handle_input_event_normal(key_event.code, &mut self.op, &mut self.mult)
                    }
                    Mode::Insert => handle_input_event_insert(key_event.code),
                }
            }
            crossterm::event::Event::Resize(cols, rows) => Some(Event::WindowResize(cols, rows)),
            _ => None,
        }
    }
}

/// Forwards raw terminal events until the receiving side hangs up.
///
/// Keys are translated on the receiving side, where the current mode lives.
pub fn event_listener(tx: Sender<crossterm::event::Event>) {
    while let Ok(ev) = crossterm::event::read() {
        if tx.send(ev).is_err() {
            break;
        }
    }
}

fn is_save(key_event: &KeyEvent) -> bool {
    key_event.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key_event.code, KeyCode::Char('s'))
}

fn handle_input_event_insert(code: KeyCode) -> Option<Event> {
    match code {
        KeyCode::Esc => Some(Event::ChangeMode(Mode::Normal)),
        KeyCode::Char(c) => Some(Event::Write(c)),
        KeyCode::Tab => Some(Event::Write('\t')),
        KeyCode::Backspace => Some(Event::BackSpace),
        KeyCode::Enter => Some(Event::Enter),
        KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down => Some(Event::Motion {
            op: None,
            mult: 1,
            motion: Motion::parse(code),
        }),

        _ => None,
    }
}

fn handle_input_event_normal(
    code: KeyCode,
    op: &mut Option<Operator>,
    mult: &mut u8,
) -> Option<Event> {
    if let KeyCode::Char('q') = code {
        return Some(Event::Quit);
    }

    // Cancel current motion
    if matches!(code, KeyCode::Esc) {
        op.take();
        *mult = 1;
        return None;
    }

    if let KeyCode::Char(c @ '1'..='9') = code {
        *mult = c as u8 - b'0';
        return None;
    }

    if op.is_none() {
        if let Some(motion) = Motion::parse(code) {
            let m = *mult;
            *mult = 1;

            return Some(Event::Motion {
                op: None,
                mult: m,
                motion: Some(motion),
            });
        }

        if matches!(code, KeyCode::Char('i')) {
            *mult = 1;
            return Some(Event::ChangeMode(Mode::Insert));
        }

        if matches!(code, KeyCode::Char('p')) {
            *mult = 1;
            return Some(Event::Paste);
        }

        if let Some(o) = Operator::parse(code) {
            op.replace(o);
            return None;
        }

        *mult = 1;
        return None;
    }

    // Doubled operator: `dd`, `yy`
    if Operator::parse(code) == *op {
        let res = Some(Event::Motion {
            op: op.take(),
            mult: *mult,
            motion: None,
        });
        *mult = 1;
        return res;
    }

    if let Some(motion) = Motion::parse(code) {
        let res = Some(Event::Motion {
            op: op.take(),
            mult: *mult,
            motion: Some(motion),
        });
        *mult = 1;
        return res;
    }

    op.take();
    *mult = 1;
    None
}
