//! A small, sandboxed statement language for inline `z-action` handlers.
//!
//! A program is a `;`-separated list of calls. Call targets are either `$.<builtin>` (DOM
//! helpers run against the triggering element) or a registered action (`name` or
//! `namespace.name`). Arguments are string/number/boolean/null literals, `$.<field>` reads
//! from the trigger context, or nested calls. There is no assignment, no control flow and no
//! access to anything the [`Host`] does not expose.
//!
//! ```text
//! $.toggleClass('#menu', 'open'); analytics.track('menu', $.event)
//! ```

mod lexer;
mod parser;

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CompileError {
    #[error("empty expression")]
    Empty,
    #[error("unexpected character {found:?} at {at}")]
    UnexpectedChar { found: char, at: usize },
    #[error("unterminated string starting at {at}")]
    UnterminatedString { at: usize },
    #[error("invalid number {text:?} at {at}")]
    InvalidNumber { text: String, at: usize },
    #[error("expected {what} at {at}")]
    Expected { what: &'static str, at: usize },
    #[error("invalid call target {path:?} at {at}")]
    InvalidPath { path: String, at: usize },
    #[error("unknown builtin $.{0}")]
    UnknownBuiltin(String),
    #[error("$.{name} does not take {found} argument(s)")]
    Arity { name: &'static str, found: usize },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    #[error("unknown context field $.{0}")]
    UnknownContextField(String),
    #[error("$.{name}: {message}")]
    Builtin { name: &'static str, message: String },
    #[error("action {0} failed: {1}")]
    Action(String, String),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Str(s) => f.write_str(s),
        }
    }
}

/// DOM helpers reachable as `$.<name>(..)`.
///
/// Helpers taking an optional leading selector act on the triggering element when it is
/// omitted, e.g. `$.addClass('busy')` vs `$.addClass('#form', 'busy')`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Builtin {
    AddClass,
    RemoveClass,
    ToggleClass,
    SetAttr,
    RemoveAttr,
    Remove,
    Focus,
    Dispatch,
    Log,
}

impl Builtin {
    const ALL: [Builtin; 9] = [
        Builtin::AddClass,
        Builtin::RemoveClass,
        Builtin::ToggleClass,
        Builtin::SetAttr,
        Builtin::RemoveAttr,
        Builtin::Remove,
        Builtin::Focus,
        Builtin::Dispatch,
        Builtin::Log,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::AddClass => "addClass",
            Builtin::RemoveClass => "removeClass",
            Builtin::ToggleClass => "toggleClass",
            Builtin::SetAttr => "setAttr",
            Builtin::RemoveAttr => "removeAttr",
            Builtin::Remove => "remove",
            Builtin::Focus => "focus",
            Builtin::Dispatch => "dispatch",
            Builtin::Log => "log",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    /// Accepted argument counts, inclusive.
    pub fn arity(self) -> (usize, usize) {
        match self {
            Builtin::AddClass | Builtin::RemoveClass | Builtin::ToggleClass => (1, 2),
            Builtin::SetAttr => (2, 3),
            Builtin::RemoveAttr | Builtin::Dispatch => (1, 2),
            Builtin::Remove | Builtin::Focus => (0, 1),
            Builtin::Log => (0, usize::MAX),
        }
    }

    /// Number of arguments when the optional leading selector is absent.
    pub fn self_arity(self) -> usize {
        self.arity().0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Target {
    Builtin(Builtin),
    Action {
        namespace: Option<String>,
        name: String,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(Value),
    Context(String),
    Call(Call),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Call {
    pub target: Target,
    pub args: Vec<Expr>,
}

/// What a program can reach. Implemented by the page runtime.
pub trait Host {
    /// `$.<field>` lookups such as `$.event` or `$.id`.
    fn context(&self, field: &str) -> Option<Value>;

    fn call_builtin(&mut self, builtin: Builtin, args: &[Value]) -> Result<Value, EvalError>;

    fn call_action(
        &mut self,
        namespace: Option<&str>,
        name: &str,
        args: &[Value],
    ) -> Result<Value, EvalError>;
}

/// A compiled inline handler.
#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    calls: Vec<Call>,
}

pub fn compile(source: &str) -> Result<Program, CompileError> {
    let toks = lexer::lex(source)?;
    let calls = parser::parse_program(toks, source.len())?;
    Ok(Program { calls })
}

impl Program {
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    /// Runs every statement in order, stopping at the first error.
    pub fn run(&self, host: &mut dyn Host) -> Result<Value, EvalError> {
        let mut last = Value::Null;
        for call in &self.calls {
            last = eval_call(call, host)?;
        }
        Ok(last)
    }
}

fn eval(expr: &Expr, host: &mut dyn Host) -> Result<Value, EvalError> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),
        Expr::Context(field) => host
            .context(field)
            .ok_or_else(|| EvalError::UnknownContextField(field.clone())),
        Expr::Call(call) => eval_call(call, host),
    }
}

fn eval_call(call: &Call, host: &mut dyn Host) -> Result<Value, EvalError> {
    let args = call
        .args
        .iter()
        .map(|a| eval(a, host))
        .collect::<Result<Vec<_>, _>>()?;
    match &call.target {
        Target::Builtin(builtin) => {
            log::trace!(target: "zjax.actions", "$.{}({} args)", builtin.name(), args.len());
            host.call_builtin(*builtin, &args)
        }
        Target::Action { namespace, name } => host.call_action(namespace.as_deref(), name, &args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recording {
        calls: Vec<String>,
    }

    impl Host for Recording {
        fn context(&self, field: &str) -> Option<Value> {
            (field == "event").then(|| Value::Str("click".into()))
        }

        fn call_builtin(&mut self, builtin: Builtin, args: &[Value]) -> Result<Value, EvalError> {
            let rendered: Vec<String> = args.iter().map(|a| a.to_string()).collect();
            self.calls
                .push(format!("$.{}({})", builtin.name(), rendered.join(",")));
            Ok(Value::Null)
        }

        fn call_action(
            &mut self,
            namespace: Option<&str>,
            name: &str,
            args: &[Value],
        ) -> Result<Value, EvalError> {
            self.calls.push(format!(
                "{}{name}/{}",
                namespace.map(|n| format!("{n}.")).unwrap_or_default(),
                args.len()
            ));
            Ok(Value::Number(args.len() as f64))
        }
    }

    #[test]
    fn runs_statements_in_order() {
        let program =
            compile("$.addClass('#menu', 'open'); cart.add(2, true); log($.event, null);")
                .expect("compile");
        let mut host = Recording::default();
        let last = program.run(&mut host).expect("run");
        assert_eq!(host.calls, ["$.addClass(#menu,open)", "cart.add/2", "log/2"]);
        assert_eq!(last, Value::Number(2.0));
    }

    #[test]
    fn nested_calls_evaluate_first() {
        let program = compile("$.log(count(1, 2))").expect("compile");
        let mut host = Recording::default();
        program.run(&mut host).expect("run");
        assert_eq!(host.calls, ["count/2", "$.log(2)"]);
    }

    #[test]
    fn compile_errors() {
        assert!(matches!(compile("  ;; "), Err(CompileError::Empty)));
        assert!(matches!(
            compile("$.explode()"),
            Err(CompileError::UnknownBuiltin(name)) if name == "explode"
        ));
        assert!(matches!(
            compile("$.setAttr('x')"),
            Err(CompileError::Arity { name: "setAttr", found: 1 })
        ));
        assert!(matches!(compile("a.b.c()"), Err(CompileError::InvalidPath { .. })));
        assert!(matches!(compile("open"), Err(CompileError::Expected { .. })));
        assert!(matches!(compile("a() b()"), Err(CompileError::Expected { what: "';'", .. })));
        assert!(matches!(compile("f(x)"), Err(CompileError::InvalidPath { .. })));
    }

    #[test]
    fn unknown_context_field_fails_at_run_time() {
        let program = compile("log($.nope)").expect("compile");
        let err = program.run(&mut Recording::default()).expect_err("unknown field");
        assert!(
            matches!(err, EvalError::UnknownContextField(ref f) if f == "nope"),
            "expected UnknownContextField, got: {err:?}"
        );
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(Value::Str("x".into()).is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
    }
}
