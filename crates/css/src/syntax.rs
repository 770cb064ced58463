//! Selector syntax: the subset needed to address nodes in server-rendered fragments.
//!
//! Supported: `*`, type, `#id`, `.class`, attribute selectors (`[a]`, `=`, `~=`, `|=`, `^=`,
//! `$=`, `*=`), `:first-child`, `:last-child`, `:not(<compound>)`, descendant/`>`/`+`/`~`
//! combinators and comma-separated lists.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unexpected character {found:?} at {at} in selector {selector:?}")]
    Unexpected {
        selector: String,
        found: char,
        at: usize,
    },
    #[error("unterminated {what} in selector {selector:?}")]
    Unterminated { selector: String, what: &'static str },
    #[error("unsupported pseudo-class :{0}")]
    UnsupportedPseudo(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttrOp {
    Exists,
    Equals(String),
    Includes(String),
    DashMatch(String),
    Prefix(String),
    Suffix(String),
    Substring(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selector {
    Universal,
    Type(String),  // element/tag selector
    Id(String),    // #id selector
    Class(String), // .class selector
    Attribute { name: String, op: AttrOp },
    FirstChild,
    LastChild,
    Not(Compound),
}

/// Simple selectors that must all hold for one element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Compound {
    pub parts: Vec<Selector>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
    NextSibling,
    SubsequentSibling,
}

/// A compound chain stored left to right; `links[i]` joins `compounds[i]` to `compounds[i + 1]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComplexSelector {
    pub compounds: Vec<Compound>,
    pub links: Vec<Combinator>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorList(pub Vec<ComplexSelector>);

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

struct Parser<'a> {
    src: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            chars: src.char_indices().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|(_, c)| *c)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.pos += 1;
        }
        self.pos != start
    }

    fn unexpected(&self) -> SelectorError {
        match self.chars.get(self.pos) {
            Some((at, found)) => SelectorError::Unexpected {
                selector: self.src.to_string(),
                found: *found,
                at: *at,
            },
            None => SelectorError::Unterminated {
                selector: self.src.to_string(),
                what: "selector",
            },
        }
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.pos += 1;
                match self.bump() {
                    Some(escaped) => out.push(escaped),
                    None => return Err(self.unexpected()),
                }
            } else if is_ident_char(c) {
                out.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        if out.is_empty() {
            return Err(self.unexpected());
        }
        Ok(out)
    }

    fn attr_value(&mut self) -> Result<String, SelectorError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let mut out = String::new();
                loop {
                    match self.bump() {
                        Some(c) if c == quote => return Ok(out),
                        Some('\\') => match self.bump() {
                            Some(c) => out.push(c),
                            None => break,
                        },
                        Some(c) => out.push(c),
                        None => break,
                    }
                }
                Err(SelectorError::Unterminated {
                    selector: self.src.to_string(),
                    what: "string",
                })
            }
            _ => self.ident(),
        }
    }

    fn attribute(&mut self) -> Result<Selector, SelectorError> {
        self.skip_ws();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_ws();
        let op = match self.bump() {
            Some(']') => return Ok(Selector::Attribute { name, op: AttrOp::Exists }),
            Some('=') => None,
            Some(c @ ('~' | '|' | '^' | '$' | '*')) => {
                if self.bump() != Some('=') {
                    return Err(self.unexpected());
                }
                Some(c)
            }
            _ => {
                self.pos = self.pos.saturating_sub(1);
                return Err(self.unexpected());
            }
        };
        self.skip_ws();
        let value = self.attr_value()?;
        self.skip_ws();
        // Case-sensitivity flags are accepted and ignored.
        if matches!(self.peek(), Some('i' | 's' | 'I' | 'S')) {
            self.pos += 1;
            self.skip_ws();
        }
        if self.bump() != Some(']') {
            return Err(SelectorError::Unterminated {
                selector: self.src.to_string(),
                what: "attribute selector",
            });
        }
        let op = match op {
            None => AttrOp::Equals(value),
            Some('~') => AttrOp::Includes(value),
            Some('|') => AttrOp::DashMatch(value),
            Some('^') => AttrOp::Prefix(value),
            Some('$') => AttrOp::Suffix(value),
            _ => AttrOp::Substring(value),
        };
        Ok(Selector::Attribute { name, op })
    }

    fn pseudo(&mut self) -> Result<Selector, SelectorError> {
        let name = self.ident()?.to_ascii_lowercase();
        match name.as_str() {
            "first-child" => Ok(Selector::FirstChild),
            "last-child" => Ok(Selector::LastChild),
            "not" => {
                if self.bump() != Some('(') {
                    return Err(self.unexpected());
                }
                self.skip_ws();
                let inner = self.compound()?;
                self.skip_ws();
                if self.bump() != Some(')') {
                    return Err(SelectorError::Unterminated {
                        selector: self.src.to_string(),
                        what: ":not()",
                    });
                }
                Ok(Selector::Not(inner))
            }
            _ => Err(SelectorError::UnsupportedPseudo(name)),
        }
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let mut parts = Vec::new();
        loop {
            match self.peek() {
                Some('*') => {
                    self.pos += 1;
                    parts.push(Selector::Universal);
                }
                Some('#') => {
                    self.pos += 1;
                    parts.push(Selector::Id(self.ident()?));
                }
                Some('.') => {
                    self.pos += 1;
                    parts.push(Selector::Class(self.ident()?));
                }
                Some('[') => {
                    self.pos += 1;
                    parts.push(self.attribute()?);
                }
                Some(':') => {
                    self.pos += 1;
                    parts.push(self.pseudo()?);
                }
                Some(c) if is_ident_char(c) && parts.is_empty() => {
                    parts.push(Selector::Type(self.ident()?.to_ascii_lowercase()));
                }
                _ => break,
            }
        }
        if parts.is_empty() {
            return Err(self.unexpected());
        }
        Ok(Compound { parts })
    }

    fn complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        self.skip_ws();
        let mut compounds = vec![self.compound()?];
        let mut links = Vec::new();
        loop {
            let had_ws = self.skip_ws();
            let link = match self.peek() {
                None | Some(',') | Some(')') => break,
                Some('>') => Combinator::Child,
                Some('+') => Combinator::NextSibling,
                Some('~') => Combinator::SubsequentSibling,
                Some(_) if had_ws => Combinator::Descendant,
                Some(_) => return Err(self.unexpected()),
            };
            if link != Combinator::Descendant {
                self.pos += 1;
                self.skip_ws();
            }
            links.push(link);
            compounds.push(self.compound()?);
        }
        Ok(ComplexSelector { compounds, links })
    }
}

pub fn parse_selector_list(input: &str) -> Result<SelectorList, SelectorError> {
    if input.trim().is_empty() {
        return Err(SelectorError::Empty);
    }
    let mut parser = Parser::new(input);
    let mut list = vec![parser.complex()?];
    while parser.peek() == Some(',') {
        parser.pos += 1;
        list.push(parser.complex()?);
    }
    parser.skip_ws();
    if parser.peek().is_some() {
        return Err(parser.unexpected());
    }
    Ok(SelectorList(list))
}
