//! Physical line sources
//!
//! A [`LineSource`] hands out one physical line per call with its terminator
//! removed. It never joins lines; multiline records are assembled by
//! [`CsvReader`](crate::CsvReader).

use std::io::{self, BufRead};

/// Pull-based provider of physical lines
pub trait LineSource {
    /// Next line without its terminator, or `None` when exhausted
    fn next_line(&mut self) -> io::Result<Option<&str>>;
}

/// Line source over any buffered reader
///
/// Lines end at `\n`. A `\r` right before it (or at the very end of input)
/// is dropped unless `keep_carriage_return` is set; a `\r` elsewhere is
/// ordinary content.
pub struct LineReader<R> {
    reader: R,
    keep_carriage_return: bool,
    line_buffer: String,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R, keep_carriage_return: bool) -> Self {
        LineReader {
            reader,
            keep_carriage_return,
            line_buffer: String::with_capacity(1024),
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: BufRead> LineSource for LineReader<R> {
    fn next_line(&mut self) -> io::Result<Option<&str>> {
        self.line_buffer.clear();
        if self.reader.read_line(&mut self.line_buffer)? == 0 {
            return Ok(None); // EOF
        }

        if self.line_buffer.ends_with('\n') {
            self.line_buffer.pop();
        }
        if !self.keep_carriage_return && self.line_buffer.ends_with('\r') {
            self.line_buffer.pop();
        }
        Ok(Some(&self.line_buffer))
    }
}

/// Line source over already split lines
pub struct IterLines<I> {
    lines: I,
    current: String,
}

impl<I> IterLines<I>
where
    I: Iterator,
    I::Item: Into<String>,
{
    pub fn new<T: IntoIterator<IntoIter = I>>(lines: T) -> Self {
        IterLines {
            lines: lines.into_iter(),
            current: String::new(),
        }
    }
}

impl<I> LineSource for IterLines<I>
where
    I: Iterator,
    I::Item: Into<String>,
{
    fn next_line(&mut self) -> io::Result<Option<&str>> {
        match self.lines.next() {
            Some(line) => {
                self.current = line.into();
                Ok(Some(&self.current))
            }
            None => Ok(None),
        }
    }
}
