use super::{Position, SourceBuffer};
use std::collections::VecDeque;
use std::io::{Error, ErrorKind, Read};

const CHUNK_SIZE: usize = 4096;

impl<R: Read> SourceBuffer<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            window: VecDeque::new(),
            carry: Vec::new(),
            eof: false,
            line: 1,
            column: 1,
            last_was_cr: false,
        }
    }

    /// Pull characters from the reader until the window holds `target` characters
    /// or the input is exhausted.
    pub fn fill(&mut self, target: usize) -> Result<(), Error> {
        while self.window.len() < target && !self.eof {
            let mut chunk = [0u8; CHUNK_SIZE];
            let read = match self.reader.read(&mut chunk) {
                Ok(read) => read,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            };
            if read == 0 {
                self.eof = true;
                if !self.carry.is_empty() {
                    return Err(Error::new(
                        ErrorKind::InvalidData,
                        "input ended inside a multi byte character",
                    ));
                }
                break;
            }
            self.carry.extend_from_slice(&chunk[..read]);
            self.decode_carry()?;
        }
        Ok(())
    }

    fn decode_carry(&mut self) -> Result<(), Error> {
        let decoded = match std::str::from_utf8(&self.carry) {
            Ok(text) => {
                self.window.extend(text.chars());
                self.carry.len()
            }
            Err(err) => {
                let valid = err.valid_up_to();
                if err.error_len().is_some() {
                    return Err(Error::new(
                        ErrorKind::InvalidData,
                        "input is not valid utf-8",
                    ));
                }
                let text = unsafe { std::str::from_utf8_unchecked(&self.carry[..valid]) };
                self.window.extend(text.chars());
                valid
            }
        };
        self.carry.drain(..decoded);
        Ok(())
    }

    /// The buffered characters at the current scan position.
    pub fn window(&mut self) -> &[char] {
        self.window.make_contiguous()
    }

    pub fn at_end(&self) -> bool {
        self.eof && self.window.is_empty()
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// Drop `length` characters from the front of the window and return them as the
    /// consumed image, advancing the line and column counters.
    ///
    /// A CR LF pair counts as a single line break.
    pub fn consume(&mut self, length: usize) -> String {
        let mut image = String::new();
        for _ in 0..length {
            let c = match self.window.pop_front() {
                Some(c) => c,
                None => break,
            };
            image.push(c);
            match c {
                '\r' => {
                    self.line += 1;
                    self.column = 1;
                    self.last_was_cr = true;
                }
                '\n' => {
                    if !self.last_was_cr {
                        self.line += 1;
                    }
                    self.column = 1;
                    self.last_was_cr = false;
                }
                _ => {
                    self.column += 1;
                    self.last_was_cr = false;
                }
            }
        }
        image
    }
}
