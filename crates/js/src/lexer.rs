use crate::CompileError;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Tok {
    Ident(String),
    Str(String),
    Num(f64),
    Dot,
    Comma,
    Semi,
    LParen,
    RParen,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Spanned {
    pub tok: Tok,
    pub at: usize,
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

pub(crate) fn lex(src: &str) -> Result<Vec<Spanned>, CompileError> {
    let mut out = Vec::new();
    let mut chars = src.char_indices().peekable();
    while let Some(&(at, c)) = chars.peek() {
        let single = match c {
            '.' => Some(Tok::Dot),
            ',' => Some(Tok::Comma),
            ';' => Some(Tok::Semi),
            '(' => Some(Tok::LParen),
            ')' => Some(Tok::RParen),
            _ => None,
        };
        if let Some(tok) = single {
            chars.next();
            out.push(Spanned { tok, at });
            continue;
        }
        if c.is_whitespace() {
            chars.next();
        } else if c == '\'' || c == '"' {
            chars.next();
            let mut text = String::new();
            let mut closed = false;
            while let Some((_, ch)) = chars.next() {
                match ch {
                    '\\' => match chars.next() {
                        Some((_, 'n')) => text.push('\n'),
                        Some((_, 't')) => text.push('\t'),
                        Some((_, other)) => text.push(other),
                        None => break,
                    },
                    ch if ch == c => {
                        closed = true;
                        break;
                    }
                    ch => text.push(ch),
                }
            }
            if !closed {
                return Err(CompileError::UnterminatedString { at });
            }
            out.push(Spanned {
                tok: Tok::Str(text),
                at,
            });
        } else if c.is_ascii_digit() || c == '-' {
            let mut text = String::new();
            while let Some(&(_, ch)) = chars.peek() {
                if ch.is_ascii_digit() || ch == '.' || (ch == '-' && text.is_empty()) {
                    text.push(ch);
                    chars.next();
                } else {
                    break;
                }
            }
            let value = text
                .parse::<f64>()
                .map_err(|_| CompileError::InvalidNumber { text, at })?;
            out.push(Spanned {
                tok: Tok::Num(value),
                at,
            });
        } else if is_ident_start(c) {
            let mut text = String::new();
            while let Some(&(_, ch)) = chars.peek() {
                if !is_ident_continue(ch) {
                    break;
                }
                text.push(ch);
                chars.next();
            }
            out.push(Spanned {
                tok: Tok::Ident(text),
                at,
            });
        } else {
            return Err(CompileError::UnexpectedChar { found: c, at });
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(src: &str) -> Vec<Tok> {
        lex(src).expect("lex").into_iter().map(|s| s.tok).collect()
    }

    #[test]
    fn lexes_calls_with_literals() {
        assert_eq!(
            toks(r#"$.setAttr("aria-busy", 'true'); n(-1.5)"#),
            vec![
                Tok::Ident("$".into()),
                Tok::Dot,
                Tok::Ident("setAttr".into()),
                Tok::LParen,
                Tok::Str("aria-busy".into()),
                Tok::Comma,
                Tok::Str("true".into()),
                Tok::RParen,
                Tok::Semi,
                Tok::Ident("n".into()),
                Tok::LParen,
                Tok::Num(-1.5),
                Tok::RParen,
            ]
        );
    }

    #[test]
    fn string_escapes_and_errors() {
        assert_eq!(toks(r#"'it\'s'"#), vec![Tok::Str("it's".into())]);
        assert!(matches!(
            lex("'open"),
            Err(CompileError::UnterminatedString { at: 0 })
        ));
        assert!(matches!(
            lex("a = 1"),
            Err(CompileError::UnexpectedChar { found: '=', at: 2 })
        ));
    }
}
