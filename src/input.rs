//! Input adapters for `&` (read integer) and `~` (read character).
//!
//! Both opcodes share the same scanning rules (skip leading whitespace,
//! accept an optional sign, then a digit run for `&`; a single raw byte
//! for `~`), so [`InputSource`] implements them once as default methods
//! over a minimal `peek`/`next` byte cursor.

use std::collections::VecDeque;
use std::io::{self, BufRead};

pub trait InputSource {
    fn peek_byte(&mut self) -> Option<u8>;
    fn next_byte(&mut self) -> Option<u8>;

    /// `~`: a single byte, or `None` on EOF.
    fn read_char(&mut self) -> Option<i64> {
        self.next_byte().map(|b| b as i64)
    }

    /// `&`: an optionally-signed decimal integer, skipping leading
    /// whitespace. `None` if the stream ends before any digit is read.
    fn read_int(&mut self) -> Option<i64> {
        loop {
            match self.peek_byte() {
                Some(b) if b.is_ascii_whitespace() => {
                    self.next_byte();
                }
                Some(_) => break,
                None => return None,
            }
        }
        let neg = match self.peek_byte() {
            Some(b'-') => {
                self.next_byte();
                true
            }
            Some(b'+') => {
                self.next_byte();
                false
            }
            _ => false,
        };
        let mut digits = String::new();
        while let Some(b) = self.peek_byte() {
            if b.is_ascii_digit() {
                digits.push(b as char);
                self.next_byte();
            } else {
                break;
            }
        }
        if digits.is_empty() {
            return None;
        }
        let v: i64 = digits.parse().ok()?;
        Some(if neg { -v } else { v })
    }
}

/// Input pre-seeded from the program's command-line arguments, joined by
/// newlines so each argument reads like a line of interactive input.
pub struct BufferedInput {
    buf: VecDeque<u8>,
}

impl BufferedInput {
    pub fn from_args(args: &[String]) -> Self {
        let joined = args.join("\n");
        Self {
            buf: joined.into_bytes().into(),
        }
    }
}

impl InputSource for BufferedInput {
    fn peek_byte(&mut self) -> Option<u8> {
        self.buf.front().copied()
    }

    fn next_byte(&mut self) -> Option<u8> {
        self.buf.pop_front()
    }
}

/// Blocking, line-buffered stdin, refilled one `read_line` at a time.
pub struct InteractiveInput {
    stdin: io::Stdin,
    buf: VecDeque<u8>,
}

impl InteractiveInput {
    pub fn new() -> Self {
        Self {
            stdin: io::stdin(),
            buf: VecDeque::new(),
        }
    }

    fn refill(&mut self) -> bool {
        let mut line = String::new();
        match self.stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => false,
            Ok(_) => {
                self.buf.extend(line.into_bytes());
                true
            }
        }
    }
}

impl Default for InteractiveInput {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for InteractiveInput {
    fn peek_byte(&mut self) -> Option<u8> {
        if self.buf.is_empty() && !self.refill() {
            return None;
        }
        self.buf.front().copied()
    }

    fn next_byte(&mut self) -> Option<u8> {
        if self.buf.is_empty() && !self.refill() {
            return None;
        }
        self.buf.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_signed_int_skipping_whitespace() {
        let mut input = BufferedInput::from_args(&["  -42 rest".to_string()]);
        assert_eq!(input.read_int(), Some(-42));
        assert_eq!(input.read_char(), Some(b' ' as i64));
    }

    #[test]
    fn read_int_on_empty_is_none() {
        let mut input = BufferedInput::from_args(&[]);
        assert_eq!(input.read_int(), None);
        assert_eq!(input.read_char(), None);
    }

    #[test]
    fn read_char_consumes_one_byte_at_a_time() {
        let mut input = BufferedInput::from_args(&["ab".to_string()]);
        assert_eq!(input.read_char(), Some(b'a' as i64));
        assert_eq!(input.read_char(), Some(b'b' as i64));
        assert_eq!(input.read_char(), None);
    }
}
