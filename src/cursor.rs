//! Byte-offset cursor over program source.
//!
//! A cursor is confined to a region `[pos, end)` of the full source so that a
//! brace-delimited body can be parsed with the same code as the whole file.
//! Offsets are always absolute into the full source, which keeps error
//! positions correct at any nesting depth.

use crate::error::Error;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Cursor<'src> {
    source: &'src str,
    pos: usize,
    end: usize,
}

impl<'src> Cursor<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            end: source.len(),
        }
    }

    /// A cursor over `[start, end)` of the same source.
    pub fn region(&self, start: usize, end: usize) -> Self {
        Self {
            source: self.source,
            pos: start,
            end,
        }
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.end
    }

    /// Unconsumed text of the region.
    pub fn rest(&self) -> &'src str {
        &self.source[self.pos..self.end]
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    /// Consume characters while `pred` holds and return them.
    pub fn read_while(&mut self, mut pred: impl FnMut(char) -> bool) -> &'src str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.source[start..self.pos]
    }

    /// Skip spaces and tabs, stopping at a newline.
    pub fn skip_inline_whitespace(&mut self) {
        self.read_while(|c| c.is_whitespace() && c != '\n');
    }

    pub fn skip_whitespace(&mut self) {
        self.read_while(char::is_whitespace);
    }

    /// Skip whitespace, newlines and `#` comment lines.
    pub fn skip_trivia(&mut self) {
        loop {
            self.skip_whitespace();
            if self.peek() != Some('#') {
                break;
            }
            self.rest_of_line();
        }
    }

    /// The leading command word: everything up to whitespace, `(` or `{`.
    pub fn keyword(&mut self) -> &'src str {
        self.read_while(|c| !c.is_whitespace() && c != '(' && c != '{')
    }

    /// Look at the keyword that would start the next statement without
    /// consuming anything.
    pub fn peek_head(&self) -> &'src str {
        let mut probe = *self;
        probe.skip_trivia();
        probe.keyword()
    }

    /// Consume up to (not including) the next newline or the region end.
    pub fn rest_of_line(&mut self) -> &'src str {
        self.read_while(|c| c != '\n')
    }

    /// Absolute offset of the next `needle` in the region.
    pub fn find(&self, needle: char) -> Option<usize> {
        self.rest().find(needle).map(|i| self.pos + i)
    }

    /// Offset of the `}` that closes the `{` at `open`, honoring nesting.
    pub fn matching_brace(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (i, c) in self.source[open..self.end].char_indices() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(open + i);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Consume a `{ … }` body and return the interior as a region cursor.
    pub fn block(&mut self) -> Result<Cursor<'src>, Error> {
        self.skip_whitespace();
        let open = self.pos;
        if self.peek() != Some('{') {
            return Err(self.error_at(open, "expected `{`"));
        }
        let close = self
            .matching_brace(open)
            .ok_or_else(|| self.error_at(open, "unclosed `{`"))?;
        self.pos = close + 1;
        Ok(self.region(open + 1, close))
    }

    /// Consume a `( … )` list and return its trimmed comma-separated items.
    /// The cursor must be on the `(`. `()` is the empty list; any other
    /// empty item, as in `(1,,2)` or `(1,)`, is an error at that item.
    pub fn paren_list(&mut self) -> Result<Vec<&'src str>, Error> {
        let open = self.pos;
        if !self.eat('(') {
            return Err(self.error_at(open, "expected `(`"));
        }
        let close = self
            .find(')')
            .ok_or_else(|| self.error_at(open, "unclosed `(`"))?;
        let inner = &self.source[self.pos..close];

        let mut items = Vec::new();
        if !inner.trim().is_empty() {
            let mut item_start = self.pos;
            for item in inner.split(',') {
                let trimmed = item.trim();
                if trimmed.is_empty() {
                    return Err(self.error_at(item_start, "empty item in list"));
                }
                items.push(trimmed);
                item_start += item.len() + 1;
            }
        }
        self.pos = close + 1;
        Ok(items)
    }

    pub fn error_at(&self, offset: usize, message: impl Into<String>) -> Error {
        Error::syntax(self.source, offset, message)
    }
}
