//! Line-oriented text buffer.
//!
//! Text is stored as a vector of lines, each line a vector of code points.
//! Every index is bounds checked and rejected with
//! [`BufferError::IndexOutOfRange`] before anything is modified.

use std::fmt;
use std::str::FromStr;

type Line = Vec<char>;

pub type Result<T> = std::result::Result<T, BufferError>;

/// Which index of an operation was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Line,
    Column { line: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    #[error("index {index} out of bounds for {axis} {len}")]
    IndexOutOfRange { axis: Axis, index: usize, len: usize },
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Line => write!(f, "grid of length"),
            Axis::Column { line } => write!(f, "row at line {line} of width"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    lines: Vec<Line>,
}

impl TextBuffer {
    /// A buffer with no lines at all.
    pub fn empty() -> Self {
        Self { lines: Vec::new() }
    }

    /// Splits `text` on `'\n'`, one line per segment.
    ///
    /// Text without a line break yields a single line, and a trailing line
    /// break yields a trailing empty line, so `to_text` reproduces `text`.
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.split('\n').map(|l| l.chars().collect()).collect(),
        }
    }

    /// Joins all lines with a single `'\n'`, without a trailing break.
    pub fn to_text(&self) -> String {
        self.lines().join("\n")
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of code points on line `i`.
    pub fn width_at(&self, i: usize) -> Result<usize> {
        Ok(self.row(i)?.len())
    }

    pub fn line(&self, i: usize) -> Result<String> {
        Ok(self.row(i)?.iter().collect())
    }

    /// A copy of every line, in order.
    pub fn lines(&self) -> Vec<String> {
        self.lines.iter().map(|l| l.iter().collect()).collect()
    }

    /// Replaces the contents of line `i` with `text`.
    pub fn set_line(&mut self, i: usize, text: &str) -> Result<()> {
        *self.row_mut(i)? = text.chars().collect();
        Ok(())
    }

    /// Inserts an empty line so that it becomes line `i`.
    ///
    /// `i == len()` appends.
    pub fn add_line_at(&mut self, i: usize) -> Result<()> {
        if i > self.lines.len() {
            return Err(self.line_error(i));
        }
        self.lines.insert(i, Line::new());
        Ok(())
    }

    pub fn append_line(&mut self) {
        self.lines.push(Line::new());
    }

    pub fn prepend_line(&mut self) {
        self.lines.insert(0, Line::new());
    }

    /// Removes line `i`. On a buffer with no lines this does nothing.
    pub fn delete_line_at(&mut self, i: usize) -> Result<()> {
        if self.lines.is_empty() {
            return Ok(());
        }
        self.row(i)?;
        self.lines.remove(i);
        Ok(())
    }

    pub fn clear_line_at(&mut self, i: usize) -> Result<()> {
        self.row_mut(i)?.clear();
        Ok(())
    }

    /// Overwrites the existing character at column `j` of line `i`.
    pub fn set_char_at(&mut self, i: usize, j: usize, c: char) -> Result<()> {
        let row = self.row_mut(i)?;
        if j >= row.len() {
            return Err(column_error(i, j, row.len()));
        }
        row[j] = c;
        Ok(())
    }

    /// Inserts `c` before column `j` of line `i`; `j == width` appends.
    pub fn insert_char_at(&mut self, i: usize, j: usize, c: char) -> Result<()> {
        let row = self.row_mut(i)?;
        if j > row.len() {
            return Err(column_error(i, j, row.len()));
        }
        row.insert(j, c);
        Ok(())
    }

    /// Breaks line `i` at column `j`.
    ///
    /// Columns `[0, j)` stay on line `i`, columns `[j, width)` move to a new
    /// line `i + 1`. Splitting at `j == width` leaves an empty line behind.
    pub fn split_line_at(&mut self, i: usize, j: usize) -> Result<()> {
        let row = self.row_mut(i)?;
        if j > row.len() {
            return Err(column_error(i, j, row.len()));
        }
        let right = row.split_off(j);
        self.lines.insert(i + 1, right);
        Ok(())
    }

    /// Backspace at column `j` of line `i`.
    ///
    /// Removes the character before `j`. At column 0 the line is joined onto
    /// the end of the previous one, except on the first line where nothing
    /// happens.
    pub fn delete_char_at(&mut self, i: usize, j: usize) -> Result<()> {
        let row = self.row_mut(i)?;
        if j > row.len() {
            return Err(column_error(i, j, row.len()));
        }

        if j > 0 {
            row.remove(j - 1);
        } else if i > 0 {
            let joined = self.lines.remove(i);
            self.lines[i - 1].extend(joined);
        }
        Ok(())
    }

    fn row(&self, i: usize) -> Result<&Line> {
        self.lines.get(i).ok_or_else(|| self.line_error(i))
    }

    fn row_mut(&mut self, i: usize) -> Result<&mut Line> {
        let err = self.line_error(i);
        self.lines.get_mut(i).ok_or(err)
    }

    fn line_error(&self, i: usize) -> BufferError {
        BufferError::IndexOutOfRange {
            axis: Axis::Line,
            index: i,
            len: self.lines.len(),
        }
    }
}

fn column_error(line: usize, index: usize, len: usize) -> BufferError {
    BufferError::IndexOutOfRange {
        axis: Axis::Column { line },
        index,
        len,
    }
}

impl fmt::Display for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (n, line) in self.lines.iter().enumerate() {
            if n > 0 {
                f.write_str("\n")?;
            }
            for c in line {
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

impl From<&str> for TextBuffer {
    fn from(text: &str) -> Self {
        Self::from_text(text)
    }
}

impl FromStr for TextBuffer {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from_text(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn out_of_range(axis: Axis, index: usize, len: usize) -> BufferError {
        BufferError::IndexOutOfRange { axis, index, len }
    }

    #[test]
    fn test_empty_is_distinct_from_one_empty_line() {
        let empty = TextBuffer::empty();
        let blank = TextBuffer::from_text("");
        assert_eq!(empty.len(), 0);
        assert!(empty.is_empty());
        assert_eq!(blank.len(), 1);
        assert_eq!(blank.width_at(0), Ok(0));
        assert_ne!(empty, blank);
        assert_eq!(TextBuffer::default(), empty);
    }

    #[test]
    fn test_from_text() {
        let buffer = TextBuffer::from_text("hello\nworld");
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.width_at(0), Ok(5));
        assert_eq!(buffer.width_at(1), Ok(5));
        assert_eq!(buffer.line(1).as_deref(), Ok("world"));
    }

    #[test]
    fn test_trailing_break_yields_empty_line() {
        let buffer = TextBuffer::from_text("abc\n");
        assert_eq!(buffer.lines(), vec!["abc", ""]);
        assert_eq!(buffer.to_text(), "abc\n");
    }

    #[test]
    fn test_carriage_return_stays_in_line() {
        let buffer = TextBuffer::from_text("a\r\nb");
        assert_eq!(buffer.width_at(0), Ok(2));
        assert_eq!(buffer.to_text(), "a\r\nb");
    }

    #[test]
    fn test_width_counts_code_points() {
        let buffer = TextBuffer::from_text("héllo wörld 日本");
        assert_eq!(buffer.width_at(0), Ok(14));
    }

    #[test]
    fn test_display_matches_to_text() {
        let buffer = TextBuffer::from_text("one\n\nthree\n");
        assert_eq!(buffer.to_string(), buffer.to_text());
        assert_eq!(TextBuffer::empty().to_text(), "");
    }

    #[test]
    fn test_from_str() {
        let buffer: TextBuffer = "a\nb".parse().unwrap();
        assert_eq!(buffer, TextBuffer::from("a\nb"));
    }

    #[test]
    fn test_line_out_of_range() {
        let buffer = TextBuffer::from_text("a\nb");
        assert_eq!(buffer.line(2), Err(out_of_range(Axis::Line, 2, 2)));
        assert_eq!(buffer.width_at(5), Err(out_of_range(Axis::Line, 5, 2)));
        assert_eq!(TextBuffer::empty().line(0), Err(out_of_range(Axis::Line, 0, 0)));
    }

    #[test]
    fn test_error_message() {
        let err = out_of_range(Axis::Line, 3, 2);
        assert_eq!(err.to_string(), "index 3 out of bounds for grid of length 2");
        let err = out_of_range(Axis::Column { line: 0 }, 9, 5);
        assert_eq!(
            err.to_string(),
            "index 9 out of bounds for row at line 0 of width 5"
        );
    }

    #[test]
    fn test_lines_is_a_snapshot() {
        let buffer = TextBuffer::from_text("abc");
        let mut lines = buffer.lines();
        lines[0].push('!');
        lines.push("extra".into());
        assert_eq!(buffer.lines(), vec!["abc"]);
    }

    #[test]
    fn test_set_line() {
        let mut buffer = TextBuffer::from_text("abc\ndef");
        buffer.set_line(1, "xyzw").unwrap();
        assert_eq!(buffer.lines(), vec!["abc", "xyzw"]);
        assert_eq!(buffer.width_at(1), Ok(4));
        assert!(buffer.set_line(2, "nope").is_err());
    }

    #[test]
    fn test_add_line_at_shifts_following_lines() {
        let mut buffer = TextBuffer::from_text("a\nb\nc");
        buffer.add_line_at(1).unwrap();
        assert_eq!(buffer.lines(), vec!["a", "", "b", "c"]);

        buffer.add_line_at(4).unwrap();
        assert_eq!(buffer.lines(), vec!["a", "", "b", "c", ""]);

        assert_eq!(buffer.add_line_at(6), Err(out_of_range(Axis::Line, 6, 5)));
        assert_eq!(buffer.len(), 5);
    }

    #[test]
    fn test_append_and_prepend() {
        let mut buffer = TextBuffer::empty();
        buffer.append_line();
        buffer.set_line(0, "mid").unwrap();
        buffer.prepend_line();
        buffer.append_line();
        assert_eq!(buffer.lines(), vec!["", "mid", ""]);

        let mut empty = TextBuffer::empty();
        empty.add_line_at(0).unwrap();
        assert_eq!(empty.len(), 1);
    }

    #[test]
    fn test_delete_line_at() {
        let mut buffer = TextBuffer::from_text("line1\nline2\nline3");
        buffer.delete_line_at(1).unwrap();
        assert_eq!(buffer.lines(), vec!["line1", "line3"]);
        assert_eq!(buffer.delete_line_at(2), Err(out_of_range(Axis::Line, 2, 2)));

        buffer.delete_line_at(0).unwrap();
        buffer.delete_line_at(0).unwrap();
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_delete_line_on_empty_buffer_is_noop() {
        let mut buffer = TextBuffer::empty();
        assert_eq!(buffer.delete_line_at(0), Ok(()));
        assert_eq!(buffer.delete_line_at(7), Ok(()));
        assert_eq!(buffer.len(), 0);
    }

    #[test]
    fn test_clear_line_at() {
        let mut buffer = TextBuffer::from_text("abc\ndef");
        buffer.clear_line_at(0).unwrap();
        assert_eq!(buffer.width_at(0), Ok(0));
        assert_eq!(buffer.len(), 2);
        assert!(buffer.clear_line_at(2).is_err());
    }

    #[test]
    fn test_set_char_at() {
        let mut buffer = TextBuffer::from_text("cat");
        buffer.set_char_at(0, 0, 'b').unwrap();
        buffer.set_char_at(0, 2, 'r').unwrap();
        assert_eq!(buffer.line(0).as_deref(), Ok("bar"));

        let end = buffer.set_char_at(0, 3, 'x');
        assert_eq!(end, Err(out_of_range(Axis::Column { line: 0 }, 3, 3)));
        assert_eq!(buffer.line(0).as_deref(), Ok("bar"));
    }

    #[test]
    fn test_insert_char_at() {
        let mut buffer = TextBuffer::from_text("ac");
        buffer.insert_char_at(0, 1, 'b').unwrap();
        buffer.insert_char_at(0, 3, 'd').unwrap();
        buffer.insert_char_at(0, 0, '>').unwrap();
        assert_eq!(buffer.line(0).as_deref(), Ok(">abcd"));
        assert!(buffer.insert_char_at(0, 6, 'x').is_err());
        assert!(buffer.insert_char_at(1, 0, 'x').is_err());
    }

    #[test]
    fn test_split_line_at() {
        let mut buffer = TextBuffer::from_text("hello");
        buffer.split_line_at(0, 2).unwrap();
        assert_eq!(buffer.lines(), vec!["he", "llo"]);
    }

    #[test]
    fn test_split_line_at_edges() {
        let mut buffer = TextBuffer::from_text("abc\nxyz");
        buffer.split_line_at(0, 3).unwrap();
        assert_eq!(buffer.lines(), vec!["abc", "", "xyz"]);

        buffer.split_line_at(2, 0).unwrap();
        assert_eq!(buffer.lines(), vec!["abc", "", "", "xyz"]);

        let err = buffer.split_line_at(3, 4);
        assert_eq!(err, Err(out_of_range(Axis::Column { line: 3 }, 4, 3)));
        assert_eq!(buffer.len(), 4);
    }

    #[test]
    fn test_split_keeps_later_lines_in_place() {
        let mut buffer = TextBuffer::from_text("one\ntwo words\nthree");
        buffer.split_line_at(1, 4).unwrap();
        assert_eq!(buffer.lines(), vec!["one", "two ", "words", "three"]);
    }

    #[test]
    fn test_delete_char_at_regular() {
        let mut buffer = TextBuffer::from_text("hello");
        buffer.delete_char_at(0, 5).unwrap();
        assert_eq!(buffer.line(0).as_deref(), Ok("hell"));
        buffer.delete_char_at(0, 1).unwrap();
        assert_eq!(buffer.line(0).as_deref(), Ok("ell"));
    }

    #[test]
    fn test_delete_char_at_start_of_buffer() {
        let mut buffer = TextBuffer::from_text("ab\ncd");
        buffer.delete_char_at(0, 0).unwrap();
        assert_eq!(buffer.lines(), vec!["ab", "cd"]);
    }

    #[test]
    fn test_delete_char_at_joins_lines() {
        let mut buffer = TextBuffer::from_text("ab\ncd");
        buffer.delete_char_at(1, 0).unwrap();
        assert_eq!(buffer.lines(), vec!["abcd"]);

        let mut buffer = TextBuffer::from_text("x\n\ny");
        buffer.delete_char_at(1, 0).unwrap();
        assert_eq!(buffer.lines(), vec!["x", "y"]);
    }

    #[test]
    fn test_delete_char_at_out_of_range() {
        let mut buffer = TextBuffer::from_text("ab");
        assert_eq!(
            buffer.delete_char_at(0, 3),
            Err(out_of_range(Axis::Column { line: 0 }, 3, 2))
        );
        assert!(buffer.delete_char_at(1, 0).is_err());
        assert!(TextBuffer::empty().delete_char_at(0, 0).is_err());
        assert_eq!(buffer.lines(), vec!["ab"]);
    }
}
