use crate::buffer::{self, TextBuffer};
use crate::config::EditorSettings;
use crate::event::{event_listener, Event, KeyTranslator, Mode, Motion, Operator};
use crate::shared::SharedBuffer;

use std::{
    fs,
    io::{Stdout, Write},
    path::{Path, PathBuf},
    sync::mpsc::{self, Receiver, RecvTimeoutError, Sender},
    thread,
    time::Duration,
};

use anyhow::Context;
use crossterm::{
    cursor, execute, queue,
    style::{PrintStyledContent, Stylize},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};

/// Rows below the text area: status line plus one spare row.
const STATUS_ROWS: usize = 2;

/// Text held by the last delete or yank.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct Register {
    text: String,
    linewise: bool,
}

/// Lines or columns an operator acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    /// Inclusive line range.
    Lines(usize, usize),
    /// Half-open column range on the cursor line.
    Chars(usize, usize),
}

pub struct Editor {
    stdout: Stdout,
    width: u16,
    height: u16,
    cc: usize,
    cr: usize,
    top: usize,
    mode: Mode,
    keys: KeyTranslator,
    buffer: SharedBuffer,
    register: Register,
    path: Option<PathBuf>,
    settings: EditorSettings,
    status: String,
}

/// Reads `path` into a buffer; a file that does not exist yet starts blank.
pub fn load_buffer(path: &Path) -> anyhow::Result<TextBuffer> {
    if !path.exists() {
        return Ok(TextBuffer::from_text(""));
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(TextBuffer::from_text(&text))
}

impl Editor {
    pub fn open(path: Option<PathBuf>, settings: EditorSettings) -> anyhow::Result<Self> {
        let buffer = match &path {
            Some(path) => load_buffer(path)?,
            None => TextBuffer::from_text(""),
        };
        let (width, height) = terminal::size()?;

        let mut editor = Editor::with_buffer(buffer, settings, width, height);
        if let Some(path) = &path {
            log::info!(
                "Opened {} ({} lines)",
                path.display(),
                editor.buffer.read(|b| b.len())
            );
        }
        editor.path = path;
        Ok(editor)
    }

    pub fn with_buffer(
        mut buffer: TextBuffer,
        settings: EditorSettings,
        width: u16,
        height: u16,
    ) -> Self {
        if buffer.is_empty() {
            buffer.append_line();
        }

        Self {
            stdout: std::io::stdout(),
            width,
            height,
            cc: 0,
            cr: 0,
            top: 0,
            mode: Mode::Normal,
            keys: KeyTranslator::default(),
            buffer: SharedBuffer::new(buffer),
            register: Register::default(),
            path: None,
            settings,
            status: String::new(),
        }
    }

    pub fn buffer(&self) -> &SharedBuffer {
        &self.buffer
    }

    /// Cursor as (line, column).
    pub fn cursor(&self) -> (usize, usize) {
        (self.cr, self.cc)
    }

    pub fn top(&self) -> usize {
        self.top
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = Some(path.into());
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        self.enter()?;
        let result = self.event_loop();
        self.exit()?;
        result
    }

    fn event_loop(&mut self) -> anyhow::Result<()> {
        self.draw()?;

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || event_listener(tx));

        // Dropping the sender on return stops the autosave thread.
        let _autosave = self.spawn_autosave();

        while let Ok(ev) = rx.recv() {
            let done = self.handle_key(ev)?;
            self.draw()?;

            if done {
                break;
            }
        }

        Ok(())
    }

    fn spawn_autosave(&self) -> Option<Sender<()>> {
        let path = self.path.clone()?;
        if self.settings.autosave_secs == 0 {
            return None;
        }

        let interval = Duration::from_secs(self.settings.autosave_secs);
        let buffer = self.buffer.clone();
        let (stop, stopped) = mpsc::channel();
        thread::spawn(move || autosave(buffer, path, interval, stopped));
        Some(stop)
    }

    fn enter(&mut self) -> anyhow::Result<()> {
        execute!(self.stdout, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        Ok(())
    }

    fn exit(&mut self) -> anyhow::Result<()> {
        terminal::disable_raw_mode()?;
        execute!(self.stdout, LeaveAlternateScreen)?;
        Ok(())
    }

    fn text_rows(&self) -> usize {
        (self.height as usize).saturating_sub(STATUS_ROWS).max(1)
    }

    fn draw(&mut self) -> anyhow::Result<()> {
        execute!(self.stdout, Clear(ClearType::All))?;

        let rows = self.text_rows();
        let top = self.top;
        let visible: Vec<String> = self.buffer.read(|b| {
            (top..b.len().min(top + rows))
                .filter_map(|i| b.line(i).ok())
                .collect()
        });

        for (r, row) in visible.iter().enumerate() {
            let text: String = row.chars().take(self.width as usize).collect();
            queue!(
                self.stdout,
                cursor::MoveTo(0, r as u16),
                PrintStyledContent(text.magenta())
            )?;
        }

        let name = self
            .path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "[No Name]".to_string());
        let status_line = format!(
            "{:?}  {}:{}  {}  {}",
            self.mode(),
            self.cr + 1,
            self.cc + 1,
            name,
            self.status
        );
        let cursor_col = self.cc.min((self.width as usize).saturating_sub(1));

        queue!(
            self.stdout,
            cursor::MoveTo(0, rows as u16),
            PrintStyledContent(status_line.magenta()),
            cursor::MoveTo(cursor_col as u16, (self.cr - self.top) as u16)
        )?;

        self.stdout.flush()?;

        Ok(())
    }

    /// Translates a terminal event in the current mode and applies it.
    pub fn handle_key(&mut self, ev: crossterm::event::Event) -> anyhow::Result<bool> {
        match self.keys.translate(ev, self.mode) {
            Some(action) => self.handle_action(action),
            None => Ok(false),
        }
    }

    pub fn handle_action(&mut self, ev: Event) -> anyhow::Result<bool> {
        let result = match ev {
            Event::Quit => return Ok(true),
            Event::ChangeMode(mode) => {
                self.mode = mode;
                self.status.clear();
                Ok(())
            }
            Event::BackSpace => self.handle_backspace(),
            Event::Enter => self.handle_enter(),
            Event::Write(c) => self.handle_write(c),
            Event::Motion { op, mult, motion } => {
                self.handle_motion(op, mult.max(1) as usize, motion)
            }
            Event::Paste => self.handle_paste(),
            Event::Save => {
                self.save();
                Ok(())
            }
            Event::WindowResize(width, height) => {
                self.width = width;
                self.height = height;
                Ok(())
            }
        };

        if let Err(e) = result {
            log::warn!("Edit rejected: {e}");
            self.status = e.to_string();
        }

        self.clamp_cursor();
        Ok(false)
    }

    fn handle_backspace(&mut self) -> buffer::Result<()> {
        let (cr, cc) = (self.cr, self.cc);
        let joined_at = self
            .buffer
            .write(|b| -> buffer::Result<Option<usize>> {
                let joined_at = if cc == 0 && cr > 0 {
                    Some(b.width_at(cr - 1)?)
                } else {
                    None
                };
                b.delete_char_at(cr, cc)?;
                Ok(joined_at)
            })?;

        match joined_at {
            Some(col) => {
                self.cr -= 1;
                self.cc = col;
            }
            None => self.cc = self.cc.saturating_sub(1),
        }
        Ok(())
    }

    fn handle_write(&mut self, c: char) -> buffer::Result<()> {
        if c == '\t' {
            for _ in 0..self.settings.tab_size {
                self.insert(' ')?;
            }
            return Ok(());
        }

        if !c.is_control() {
            self.insert(c)?;
        }

        Ok(())
    }

    fn insert(&mut self, c: char) -> buffer::Result<()> {
        let (cr, cc) = (self.cr, self.cc);
        self.buffer.write(|b| b.insert_char_at(cr, cc, c))?;
        self.cc += 1;
        Ok(())
    }

    fn handle_enter(&mut self) -> buffer::Result<()> {
        let (cr, cc) = (self.cr, self.cc);
        self.buffer.write(|b| b.split_line_at(cr, cc))?;
        self.cr += 1;
        self.cc = 0;

        Ok(())
    }

    fn handle_motion(
        &mut self,
        op: Option<Operator>,
        mult: usize,
        motion: Option<Motion>,
    ) -> buffer::Result<()> {
        match (op, motion) {
            (None, Some(motion)) => self.move_cursor(motion, mult),
            (Some(op), motion) => {
                let region = self.region(motion, mult)?;
                self.apply_operator(op, region)
            }
            (None, None) => Ok(()),
        }
    }

    fn move_cursor(&mut self, motion: Motion, mult: usize) -> buffer::Result<()> {
        let last = self.buffer.read(|b| b.len()).saturating_sub(1);

        match motion {
            Motion::Up => self.cr = self.cr.saturating_sub(mult),
            Motion::Down => self.cr = (self.cr + mult).min(last),
            Motion::Left => self.cc = self.cc.saturating_sub(mult),
            Motion::Right => self.cc = (self.cc + mult).min(self.width_of(self.cr)?),
            Motion::Start => self.cc = 0,
            Motion::End => self.cc = self.width_of(self.cr)?,
            Motion::Word => {
                let lines = self.char_lines();
                let (mut row, mut col) = (self.cr, self.cc);
                for _ in 0..mult {
                    (row, col) = next_word_start(&lines, row, col);
                }
                self.cr = row;
                self.cc = col;
            }
        }

        Ok(())
    }

    fn region(&self, motion: Option<Motion>, mult: usize) -> buffer::Result<Region> {
        let last = self.buffer.read(|b| b.len()).saturating_sub(1);
        let (cr, cc) = (self.cr, self.cc);
        let width = self.width_of(cr)?;

        let region = match motion {
            None => Region::Lines(cr, (cr + mult - 1).min(last)),
            Some(Motion::Up) => Region::Lines(cr.saturating_sub(mult), cr),
            Some(Motion::Down) => Region::Lines(cr, (cr + mult).min(last)),
            Some(Motion::Left) => Region::Chars(cc.saturating_sub(mult), cc),
            Some(Motion::Right) => Region::Chars(cc, (cc + mult).min(width)),
            Some(Motion::Start) => Region::Chars(0, cc),
            Some(Motion::End) => Region::Chars(cc, width),
            Some(Motion::Word) => {
                let line = [self.char_lines().swap_remove(cr)];
                let mut col = cc;
                for _ in 0..mult {
                    col = next_word_start(&line, 0, col).1;
                }
                Region::Chars(cc, col)
            }
        };

        Ok(region)
    }

    fn apply_operator(&mut self, op: Operator, region: Region) -> buffer::Result<()> {
        let cr = self.cr;

        match region {
            Region::Lines(start, end) => {
                let removed = self.buffer.write(|b| -> buffer::Result<Vec<String>> {
                    let lines = (start..=end)
                        .map(|i| b.line(i))
                        .collect::<buffer::Result<Vec<_>>>()?;
                    if op == Operator::Delete {
                        for _ in start..=end {
                            b.delete_line_at(start)?;
                        }
                    }
                    Ok(lines)
                })?;

                log::debug!("{:?} lines {}..={}", op, start, end);
                self.register = Register {
                    text: removed.join("\n"),
                    linewise: true,
                };
                if op == Operator::Delete {
                    self.cr = start;
                    self.cc = 0;
                }
            }
            Region::Chars(from, to) => {
                let removed = self.buffer.write(|b| -> buffer::Result<String> {
                    let chars: Vec<char> = b.line(cr)?.chars().collect();
                    let removed = chars[from..to].iter().collect();
                    if op == Operator::Delete {
                        let kept: String = chars[..from].iter().chain(&chars[to..]).collect();
                        b.set_line(cr, &kept)?;
                    }
                    Ok(removed)
                })?;

                self.register = Register {
                    text: removed,
                    linewise: false,
                };
                if op == Operator::Delete {
                    self.cc = from;
                }
            }
        }

        Ok(())
    }

    fn handle_paste(&mut self) -> buffer::Result<()> {
        if self.register.text.is_empty() && !self.register.linewise {
            return Ok(());
        }

        let (cr, cc) = (self.cr, self.cc);
        let register = self.register.clone();

        if register.linewise {
            self.buffer.write(|b| -> buffer::Result<()> {
                for (k, line) in register.text.split('\n').enumerate() {
                    b.add_line_at(cr + 1 + k)?;
                    b.set_line(cr + 1 + k, line)?;
                }
                Ok(())
            })?;
            self.cr += 1;
            self.cc = 0;
        } else {
            let at = (cc + 1).min(self.width_of(cr)?);
            let count = self.buffer.write(|b| -> buffer::Result<usize> {
                let mut count = 0;
                for (k, c) in register.text.chars().enumerate() {
                    b.insert_char_at(cr, at + k, c)?;
                    count += 1;
                }
                Ok(count)
            })?;
            self.cc = at + count.saturating_sub(1);
        }

        Ok(())
    }

    fn save(&mut self) {
        match self.write_to_disk() {
            Ok(path) => {
                log::info!("File saved: {}", path.display());
                self.status = format!("\"{}\" written", path.display());
            }
            Err(e) => {
                log::error!("Save failed: {e:#}");
                self.status = format!("save failed: {e}");
            }
        }
    }

    /// Writes the buffer to its file and returns the path written.
    pub fn write_to_disk(&self) -> anyhow::Result<PathBuf> {
        let path = self.path.clone().context("buffer has no file name")?;
        self.buffer
            .write_file(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }

    fn clamp_cursor(&mut self) {
        let (len, width) = self.buffer.write(|b| {
            if b.is_empty() {
                b.append_line();
            }
            let len = b.len();
            let row = self.cr.min(len - 1);
            (len, b.width_at(row).unwrap_or(0))
        });

        self.cr = self.cr.min(len - 1);
        self.cc = self.cc.min(width);

        let rows = self.text_rows();
        if self.cr < self.top {
            self.top = self.cr;
        } else if self.cr >= self.top + rows {
            self.top = self.cr + 1 - rows;
        }
    }

    fn width_of(&self, i: usize) -> buffer::Result<usize> {
        self.buffer.read(|b| b.width_at(i))
    }

    fn char_lines(&self) -> Vec<Vec<char>> {
        self.buffer
            .read(|b| b.lines())
            .into_iter()
            .map(|l| l.chars().collect())
            .collect()
    }
}

/// Position of the next word start after (`row`, `col`), crossing line ends.
///
/// Stops at the end of the last line when no further word exists.
fn next_word_start(lines: &[Vec<char>], mut row: usize, mut col: usize) -> (usize, usize) {
    let line = &lines[row];
    while col < line.len() && !line[col].is_whitespace() {
        col += 1;
    }

    loop {
        let line = &lines[row];
        while col < line.len() && line[col].is_whitespace() {
            col += 1;
        }
        if col < line.len() || row + 1 >= lines.len() {
            return (row, col.min(line.len()));
        }
        row += 1;
        col = 0;
    }
}

fn autosave(buffer: SharedBuffer, path: PathBuf, interval: Duration, stopped: Receiver<()>) {
    while let Err(RecvTimeoutError::Timeout) = stopped.recv_timeout(interval) {
        match buffer.write_file(&path) {
            Ok(()) => log::debug!("Autosaved {}", path.display()),
            Err(e) => log::warn!("Autosave of {} failed: {}", path.display(), e),
        }
    }
}
