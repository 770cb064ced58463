//! Forgiving HTML tokenizer for server-rendered fragments.
//!
//! Tag and attribute names are restricted to ASCII `[A-Za-z0-9:_-]` and lowercased.
//! `script`/`style` bodies are rawtext, `textarea`/`title` bodies are RCDATA (entities decoded,
//! no nested tags). There is no parse-error recovery beyond skipping stray bytes.
use crate::entities::decode_entities;
use crate::types::{Attribute, Token};
use memchr::memchr;

const HTML_COMMENT_START: &str = "<!--";
const HTML_COMMENT_END: &str = "-->";

pub(crate) fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum TextMode {
    Raw,
    Rcdata,
}

fn text_mode(name: &str) -> Option<TextMode> {
    match name {
        "script" | "style" => Some(TextMode::Raw),
        "textarea" | "title" => Some(TextMode::Rcdata),
        _ => None,
    }
}

// Non-ASCII bytes always come in whole runs, so names never end inside a char.
fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':' || !b.is_ascii()
}

fn starts_with_ignore_ascii_case_at(haystack: &[u8], start: usize, needle: &[u8]) -> bool {
    haystack.len() >= start + needle.len()
        && haystack[start..start + needle.len()].eq_ignore_ascii_case(needle)
}

/// Finds `</name` followed by optional ASCII whitespace and `>`.
/// Returns (start of close tag, index after `>`).
fn find_close_tag(haystack: &str, name: &str) -> Option<(usize, usize)> {
    let bytes = haystack.as_bytes();
    let name = name.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        i += memchr(b'<', &bytes[i..])?;
        if bytes.get(i + 1) == Some(&b'/') && starts_with_ignore_ascii_case_at(bytes, i + 2, name)
        {
            let mut k = i + 2 + name.len();
            while k < bytes.len() && bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            if k < bytes.len() && bytes[k] == b'>' {
                return Some((i, k + 1));
            }
        }
        i += 1;
    }
    None
}

struct Cursor<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    // Slices are only cut at ASCII structural bytes, so they stay on char boundaries.
    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
        debug_assert!(self.input.is_char_boundary(start));
        debug_assert!(self.input.is_char_boundary(self.pos));
        &self.input[start..self.pos]
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn read_attribute_value(&mut self) -> String {
        match self.peek() {
            Some(quote @ (b'"' | b'\'')) => {
                self.pos += 1;
                let raw = self.take_while(|b| b != quote);
                if !self.at_end() {
                    self.pos += 1;
                }
                decode_entities(raw)
            }
            _ => {
                let start = self.pos;
                while let Some(b) = self.peek() {
                    if b.is_ascii_whitespace() || b == b'>' {
                        break;
                    }
                    if b == b'/' && self.bytes.get(self.pos + 1) == Some(&b'>') {
                        break;
                    }
                    self.pos += 1;
                }
                decode_entities(&self.input[start..self.pos])
            }
        }
    }

    /// Reads attributes up to and including the closing `>`. Returns the self-closing flag.
    fn read_attributes(&mut self, out: &mut Vec<Attribute>) -> bool {
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return false,
                Some(b'>') => {
                    self.pos += 1;
                    return false;
                }
                Some(b'/') => {
                    self.pos += 1;
                    if self.peek() == Some(b'>') {
                        self.pos += 1;
                        return true;
                    }
                    continue;
                }
                Some(_) => {}
            }
            let name = self.take_while(is_name_byte);
            if name.is_empty() {
                self.pos += self.rest().chars().next().map_or(1, char::len_utf8);
                continue;
            }
            let name = name.to_ascii_lowercase();
            self.skip_whitespace();
            let value = if self.peek() == Some(b'=') {
                self.pos += 1;
                self.skip_whitespace();
                self.read_attribute_value()
            } else {
                String::new()
            };
            // First occurrence wins, as in browsers.
            if !out.iter().any(|a| a.name == name) {
                out.push(Attribute { name, value });
            }
        }
    }
}

pub fn tokenize(input: &str) -> Vec<Token> {
    let mut out = Vec::new();
    let mut cur = Cursor::new(input);

    while !cur.at_end() {
        if cur.peek() != Some(b'<') {
            let text = cur.take_while(|b| b != b'<');
            if !text.is_empty() {
                out.push(Token::Text(decode_entities(text)));
            }
            continue;
        }

        if cur.rest().starts_with(HTML_COMMENT_START) {
            let body_start = cur.pos + HTML_COMMENT_START.len();
            match input[body_start..].find(HTML_COMMENT_END) {
                Some(end) => {
                    out.push(Token::Comment(input[body_start..body_start + end].to_string()));
                    cur.pos = body_start + end + HTML_COMMENT_END.len();
                }
                None => {
                    out.push(Token::Comment(input[body_start..].to_string()));
                    cur.pos = input.len();
                }
            }
            continue;
        }

        if starts_with_ignore_ascii_case_at(cur.bytes, cur.pos, b"<!doctype") {
            let rest = &input[cur.pos + 2..];
            let Some(end) = rest.find('>') else {
                break;
            };
            out.push(Token::Doctype(rest[..end].trim().to_string()));
            cur.pos += 2 + end + 1;
            continue;
        }

        if cur.bytes.get(cur.pos + 1) == Some(&b'/') {
            cur.pos += 2;
            let name = cur.take_while(is_name_byte).to_ascii_lowercase();
            cur.take_while(|b| b != b'>');
            if !cur.at_end() {
                cur.pos += 1;
            }
            if !name.is_empty() {
                out.push(Token::EndTag(name));
            }
            continue;
        }

        cur.pos += 1;
        // Tag names start with an ASCII letter; anything else leaves a lone `<` as text.
        if !cur.peek().is_some_and(|b| b.is_ascii_alphabetic()) {
            out.push(Token::Text("<".to_string()));
            continue;
        }
        let name = cur.take_while(is_name_byte).to_ascii_lowercase();
        let mut attributes = Vec::new();
        let mut self_closing = cur.read_attributes(&mut attributes);
        if is_void_element(&name) {
            self_closing = true;
        }
        let mode = if self_closing { None } else { text_mode(&name) };
        out.push(Token::StartTag {
            name: name.clone(),
            attributes,
            self_closing,
        });

        if let Some(mode) = mode {
            let (body, next) = match find_close_tag(cur.rest(), &name) {
                Some((rel_start, rel_end)) => (&cur.rest()[..rel_start], cur.pos + rel_end),
                // Missing close tag: the remainder is the element body.
                None => (cur.rest(), input.len()),
            };
            if !body.is_empty() {
                let text = match mode {
                    TextMode::Raw => body.to_string(),
                    TextMode::Rcdata => decode_entities(body),
                };
                out.push(Token::Text(text));
            }
            out.push(Token::EndTag(name));
            cur.pos = next;
        }
    }

    merge_adjacent_text(out)
}

fn merge_adjacent_text(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if let (Some(Token::Text(prev)), Token::Text(next)) = (out.last_mut(), &token) {
            prev.push_str(next);
            continue;
        }
        out.push(token);
    }
    out
}
