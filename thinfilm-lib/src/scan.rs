//! Character scanner shared by the sample-description and mixture parsers.

use crate::error::{Result, ThinFilmError};

pub(crate) struct Scanner {
    chars: Vec<char>,
    pos: usize,
}

impl Scanner {
    pub(crate) fn new(input: &str) -> Self {
        Scanner {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    pub(crate) fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    pub(crate) fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.chars.len());
    }

    pub(crate) fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    pub(crate) fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Unconsumed input, for error messages.
    pub(crate) fn rest(&self) -> String {
        self.chars[self.pos..].iter().collect()
    }

    /// Case-insensitive check that the remaining input begins with `word`.
    pub(crate) fn starts_with_ignore_case(&self, word: &str) -> bool {
        let mut idx = self.pos;
        for w in word.chars() {
            match self.chars.get(idx) {
                Some(c) if c.to_lowercase().eq(w.to_lowercase()) => idx += 1,
                _ => return false,
            }
        }
        true
    }

    /// True at a trailing comment: `#`, `%`, `/*` or `//`.
    pub(crate) fn at_comment(&self) -> bool {
        match self.peek() {
            Some('#') | Some('%') => true,
            Some('/') => matches!(self.chars.get(self.pos + 1), Some('*') | Some('/')),
            _ => false,
        }
    }

    /// True if the next character ends a token (whitespace or end of input).
    pub(crate) fn at_token_end(&self, offset: usize) -> bool {
        self.chars
            .get(self.pos + offset)
            .is_none_or(|c| c.is_whitespace())
    }

    /// Read a decimal number with optional sign, fraction and exponent.
    ///
    /// Leaves the position unchanged and returns `None` if no digits are found.
    pub(crate) fn read_number(&mut self) -> Option<f64> {
        let start = self.pos;
        let mut idx = self.pos;
        if matches!(self.chars.get(idx), Some('+') | Some('-')) {
            idx += 1;
        }
        let mut digits = 0;
        while self.chars.get(idx).is_some_and(char::is_ascii_digit) {
            idx += 1;
            digits += 1;
        }
        if self.chars.get(idx) == Some(&'.') {
            idx += 1;
            while self.chars.get(idx).is_some_and(char::is_ascii_digit) {
                idx += 1;
                digits += 1;
            }
        }
        if digits == 0 {
            return None;
        }

        // Exponent only counts when digits follow it.
        if matches!(self.chars.get(idx), Some('e') | Some('E')) {
            let mut exp = idx + 1;
            if matches!(self.chars.get(exp), Some('+') | Some('-')) {
                exp += 1;
            }
            if self.chars.get(exp).is_some_and(char::is_ascii_digit) {
                while self.chars.get(exp).is_some_and(char::is_ascii_digit) {
                    exp += 1;
                }
                idx = exp;
            }
        }

        let text: String = self.chars[start..idx].iter().collect();
        match text.parse::<f64>() {
            Ok(v) => {
                self.pos = idx;
                Some(v)
            }
            Err(_) => None,
        }
    }

    /// Read an optionally signed integer.
    pub(crate) fn read_integer(&mut self) -> Option<i64> {
        let start = self.pos;
        let mut idx = self.pos;
        if matches!(self.chars.get(idx), Some('+') | Some('-')) {
            idx += 1;
        }
        let digits_start = idx;
        while self.chars.get(idx).is_some_and(char::is_ascii_digit) {
            idx += 1;
        }
        if idx == digits_start {
            return None;
        }
        let text: String = self.chars[start..idx].iter().collect();
        let value = text.parse::<i64>().ok()?;
        self.pos = idx;
        Some(value)
    }

    /// Read a material name: either a whitespace-free token, or everything
    /// up to the `]` that balances a leading `[`.
    pub(crate) fn read_material_name(&mut self) -> Result<String> {
        self.skip_whitespace();
        let start = self.pos;
        if self.peek() == Some('[') {
            let mut depth = 0usize;
            while let Some(ch) = self.peek() {
                self.pos += 1;
                match ch {
                    '[' => depth += 1,
                    ']' => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
            }
            if depth != 0 {
                return Err(ThinFilmError::Parse(format!(
                    "unbalanced brackets in material name '{}'",
                    self.chars[start..].iter().collect::<String>()
                )));
            }
        } else {
            while self.peek().is_some_and(|c| !c.is_whitespace()) {
                self.pos += 1;
            }
        }
        let name: String = self.chars[start..self.pos].iter().collect();
        self.skip_whitespace();
        Ok(name)
    }
}
