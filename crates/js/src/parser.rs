use crate::lexer::{Spanned, Tok};
use crate::{Builtin, Call, CompileError, Expr, Target, Value};

const CONTEXT_VAR: &str = "$";

struct Parser {
    toks: Vec<Spanned>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Tok> {
        self.toks.get(self.pos).map(|s| &s.tok)
    }

    fn at(&self) -> usize {
        self.toks.get(self.pos).map_or(self.end, |s| s.at)
    }

    fn bump(&mut self) -> Option<Tok> {
        let tok = self.toks.get(self.pos).map(|s| s.tok.clone());
        self.pos += 1;
        tok
    }

    fn expect(&mut self, want: Tok, what: &'static str) -> Result<(), CompileError> {
        let at = self.at();
        match self.bump() {
            Some(tok) if tok == want => Ok(()),
            _ => Err(CompileError::Expected { what, at }),
        }
    }

    fn ident(&mut self) -> Result<String, CompileError> {
        let at = self.at();
        match self.bump() {
            Some(Tok::Ident(name)) => Ok(name),
            _ => Err(CompileError::Expected {
                what: "identifier",
                at,
            }),
        }
    }

    fn path(&mut self) -> Result<(Vec<String>, usize), CompileError> {
        let at = self.at();
        let mut parts = vec![self.ident()?];
        while self.peek() == Some(&Tok::Dot) {
            self.pos += 1;
            parts.push(self.ident()?);
        }
        Ok((parts, at))
    }

    fn target(parts: Vec<String>, at: usize) -> Result<Target, CompileError> {
        match parts.as_slice() {
            [ctx, name] if ctx == CONTEXT_VAR => Builtin::from_name(name)
                .map(Target::Builtin)
                .ok_or_else(|| CompileError::UnknownBuiltin(name.clone())),
            [name] if name != CONTEXT_VAR => Ok(Target::Action {
                namespace: None,
                name: name.clone(),
            }),
            [ns, name] => Ok(Target::Action {
                namespace: Some(ns.clone()),
                name: name.clone(),
            }),
            _ => Err(CompileError::InvalidPath {
                path: parts.join("."),
                at,
            }),
        }
    }

    fn expr(&mut self) -> Result<Expr, CompileError> {
        let at = self.at();
        match self.peek() {
            Some(Tok::Str(_)) | Some(Tok::Num(_)) => match self.bump() {
                Some(Tok::Str(s)) => Ok(Expr::Literal(Value::Str(s))),
                Some(Tok::Num(n)) => Ok(Expr::Literal(Value::Number(n))),
                _ => Err(CompileError::Expected { what: "value", at }),
            },
            Some(Tok::Ident(_)) => {
                let (parts, at) = self.path()?;
                if self.peek() == Some(&Tok::LParen) {
                    return Ok(Expr::Call(self.call(parts, at)?));
                }
                match parts.as_slice() {
                    [word] if word == "true" => Ok(Expr::Literal(Value::Bool(true))),
                    [word] if word == "false" => Ok(Expr::Literal(Value::Bool(false))),
                    [word] if word == "null" => Ok(Expr::Literal(Value::Null)),
                    [ctx, field] if ctx == CONTEXT_VAR => Ok(Expr::Context(field.clone())),
                    _ => Err(CompileError::InvalidPath {
                        path: parts.join("."),
                        at,
                    }),
                }
            }
            _ => Err(CompileError::Expected { what: "value", at }),
        }
    }

    fn call(&mut self, parts: Vec<String>, at: usize) -> Result<Call, CompileError> {
        let target = Self::target(parts, at)?;
        self.expect(Tok::LParen, "'('")?;
        let mut args = Vec::new();
        if self.peek() != Some(&Tok::RParen) {
            args.push(self.expr()?);
            while self.peek() == Some(&Tok::Comma) {
                self.pos += 1;
                args.push(self.expr()?);
            }
        }
        self.expect(Tok::RParen, "')'")?;
        if let Target::Builtin(builtin) = target {
            let (min, max) = builtin.arity();
            if args.len() < min || args.len() > max {
                return Err(CompileError::Arity {
                    name: builtin.name(),
                    found: args.len(),
                });
            }
        }
        Ok(Call { target, args })
    }

    fn statement(&mut self) -> Result<Call, CompileError> {
        let (parts, at) = self.path()?;
        if self.peek() != Some(&Tok::LParen) {
            return Err(CompileError::Expected {
                what: "'(' after a call target",
                at: self.at(),
            });
        }
        self.call(parts, at)
    }
}

pub(crate) fn parse_program(toks: Vec<Spanned>, src_len: usize) -> Result<Vec<Call>, CompileError> {
    let mut parser = Parser {
        toks,
        pos: 0,
        end: src_len,
    };
    let mut calls = Vec::new();
    loop {
        while parser.peek() == Some(&Tok::Semi) {
            parser.pos += 1;
        }
        if parser.peek().is_none() {
            break;
        }
        calls.push(parser.statement()?);
        match parser.peek() {
            None | Some(Tok::Semi) => {}
            Some(_) => {
                return Err(CompileError::Expected {
                    what: "';'",
                    at: parser.at(),
                });
            }
        }
    }
    if calls.is_empty() {
        return Err(CompileError::Empty);
    }
    Ok(calls)
}
