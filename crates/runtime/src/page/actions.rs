//! `z-action` firings: named handlers from the registry, or compiled inline expressions.

use super::Page;
use crate::registry::{ActionContext, ActionRegistry};
use crate::{Error, FiringError};
use bus::Signal;
use grammar::ActionHandler;
use html::{Document, DomError, NodeId};
use js::{Builtin, EvalError, Host, Value};

impl Page {
    pub(super) fn fire_action(&mut self, node: NodeId, event: &str, handler: &ActionHandler) {
        log::debug!(target: "zjax.actions", "z-action '{event}' on {node}: {handler}");
        let mut dispatches = Vec::new();
        let result = self.run_action(node, event, handler, &mut dispatches);
        self.flush_mutations();
        if let Err(error) = result {
            let err = FiringError::new(&self.doc, node, error);
            log::error!(target: "zjax.actions", "Unable to execute z-action: {err}");
            self.signals.emit(Signal::Failed {
                firing: None,
                element: node,
                error: err.to_string(),
            });
        }
        for (target, event) in dispatches {
            self.dispatch(target, &event);
        }
    }

    fn run_action(
        &mut self,
        node: NodeId,
        event: &str,
        handler: &ActionHandler,
        dispatches: &mut Vec<(NodeId, String)>,
    ) -> Result<Value, Error> {
        match handler {
            ActionHandler::Named { namespace, name } => {
                let f = self.actions.resolve(namespace.as_deref(), name)?;
                let mut ctx = ActionContext::new(&mut self.doc, node, event, &[], dispatches);
                Ok(f(&mut ctx)?)
            }
            ActionHandler::Inline(source) => {
                let program =
                    js::compile(source).map_err(|e| Error::InvalidActionExpression {
                        expression: source.clone(),
                        source: e,
                    })?;
                let mut host = PageHost {
                    doc: &mut self.doc,
                    actions: &self.actions,
                    node,
                    event,
                    dispatches,
                };
                Ok(program.run(&mut host)?)
            }
        }
    }
}

/// What an inline expression can reach through `$`.
struct PageHost<'a> {
    doc: &'a mut Document,
    actions: &'a ActionRegistry,
    node: NodeId,
    event: &'a str,
    dispatches: &'a mut Vec<(NodeId, String)>,
}

impl PageHost<'_> {
    /// Splits off the optional leading selector argument.
    fn target<'v>(&self, builtin: Builtin, args: &'v [Value]) -> Result<(NodeId, &'v [Value]), EvalError> {
        if args.len() <= builtin.self_arity() {
            return Ok((self.node, args));
        }
        let selector = args[0].to_string();
        let found = css::query_selector(&*self.doc, self.doc.root(), &selector).map_err(|e| {
            EvalError::Builtin {
                name: builtin.name(),
                message: e.to_string(),
            }
        })?;
        let node = found.ok_or_else(|| EvalError::Builtin {
            name: builtin.name(),
            message: format!("no element matches {selector:?}"),
        })?;
        Ok((node, &args[1..]))
    }
}

fn text(args: &[Value], index: usize) -> String {
    args.get(index).map(Value::to_string).unwrap_or_default()
}

impl Host for PageHost<'_> {
    fn context(&self, field: &str) -> Option<Value> {
        let doc = &*self.doc;
        match field {
            "event" => Some(Value::Str(self.event.to_string())),
            "id" => Some(
                doc.element_id(self.node)
                    .map_or(Value::Null, |id| Value::Str(id.to_string())),
            ),
            "tag" => doc.tag_name(self.node).map(|t| Value::Str(t.to_string())),
            "value" => Some(Value::Str(doc.value(self.node))),
            "text" => Some(Value::Str(doc.text_content(self.node))),
            _ => None,
        }
    }

    fn call_builtin(&mut self, builtin: Builtin, args: &[Value]) -> Result<Value, EvalError> {
        if builtin == Builtin::Log {
            let line: Vec<String> = args.iter().map(Value::to_string).collect();
            log::info!(target: "zjax.actions", "{}", line.join(" "));
            return Ok(Value::Null);
        }
        let (node, rest) = self.target(builtin, args)?;
        let dom = |e: DomError| EvalError::Builtin {
            name: builtin.name(),
            message: e.to_string(),
        };
        match builtin {
            Builtin::AddClass => {
                self.doc.add_class(node, &text(rest, 0)).map_err(dom)?;
                Ok(Value::Null)
            }
            Builtin::RemoveClass => {
                self.doc.remove_class(node, &text(rest, 0)).map_err(dom)?;
                Ok(Value::Null)
            }
            Builtin::ToggleClass => Ok(Value::Bool(
                self.doc.toggle_class(node, &text(rest, 0)).map_err(dom)?,
            )),
            Builtin::SetAttr => {
                self.doc
                    .set_attr(node, &text(rest, 0), &text(rest, 1))
                    .map_err(dom)?;
                Ok(Value::Null)
            }
            Builtin::RemoveAttr => Ok(Value::Bool(
                self.doc.remove_attr(node, &text(rest, 0)).map_err(dom)?,
            )),
            Builtin::Remove => {
                self.doc.remove(node).map_err(dom)?;
                Ok(Value::Null)
            }
            Builtin::Focus => Ok(Value::Bool(self.doc.focus(node))),
            Builtin::Dispatch => {
                self.dispatches.push((node, text(rest, 0)));
                Ok(Value::Null)
            }
            Builtin::Log => Ok(Value::Null),
        }
    }

    fn call_action(
        &mut self,
        namespace: Option<&str>,
        name: &str,
        args: &[Value],
    ) -> Result<Value, EvalError> {
        let f = self
            .actions
            .resolve(namespace, name)
            .map_err(|e| EvalError::Action(name.to_string(), e.to_string()))?;
        let mut ctx = ActionContext::new(
            &mut *self.doc,
            self.node,
            self.event,
            args,
            &mut *self.dispatches,
        );
        f(&mut ctx)
    }
}
