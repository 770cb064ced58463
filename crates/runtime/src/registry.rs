//! Named actions for `z-action` bindings.
//!
//! Handlers are looked up when a binding fires, not when it is scanned, so actions may be
//! registered before or after the document is parsed.

use crate::Error;
use html::{Document, NodeId};
use js::{EvalError, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Namespace owned by the runtime itself.
pub const RESERVED_NAMESPACE: &str = "zjax";

pub type ActionFn = Arc<dyn Fn(&mut ActionContext<'_>) -> Result<Value, EvalError> + Send + Sync>;

/// Wraps a closure as an [`ActionFn`].
pub fn action<F>(f: F) -> ActionFn
where
    F: Fn(&mut ActionContext<'_>) -> Result<Value, EvalError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// What a handler sees as `$`: the owning node, the triggering event, call arguments and the
/// document.
pub struct ActionContext<'a> {
    pub doc: &'a mut Document,
    pub node: NodeId,
    pub event: &'a str,
    pub args: &'a [Value],
    dispatches: &'a mut Vec<(NodeId, String)>,
}

impl<'a> ActionContext<'a> {
    pub(crate) fn new(
        doc: &'a mut Document,
        node: NodeId,
        event: &'a str,
        args: &'a [Value],
        dispatches: &'a mut Vec<(NodeId, String)>,
    ) -> Self {
        Self {
            doc,
            node,
            event,
            args,
            dispatches,
        }
    }

    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    /// Queues `event` on `node`; delivered once the handler returns.
    pub fn dispatch(&mut self, node: NodeId, event: impl Into<String>) {
        self.dispatches.push((node, event.into()));
    }
}

#[derive(Clone, Default)]
pub struct ActionRegistry {
    root: HashMap<String, ActionFn>,
    namespaces: HashMap<String, HashMap<String, ActionFn>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handlers` under `namespace`, replacing whatever that namespace held.
    /// Without a namespace the handlers are merged into the root namespace.
    pub fn register<I, S>(&mut self, namespace: Option<&str>, handlers: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = (S, ActionFn)>,
        S: Into<String>,
    {
        let handlers = handlers.into_iter().map(|(name, f)| (name.into(), f));
        match namespace {
            Some(ns) if ns == RESERVED_NAMESPACE => {
                Err(Error::ReservedNamespace(ns.to_string()))
            }
            Some(ns) => {
                let map: HashMap<String, ActionFn> = handlers.collect();
                log::debug!(target: "zjax.actions", "registered {} action(s) in {ns}", map.len());
                self.namespaces.insert(ns.to_string(), map);
                Ok(())
            }
            None => {
                let before = self.root.len();
                self.root.extend(handlers);
                log::debug!(
                    target: "zjax.actions",
                    "registered {} root action(s)",
                    self.root.len() - before
                );
                Ok(())
            }
        }
    }

    pub fn resolve(&self, namespace: Option<&str>, name: &str) -> Result<ActionFn, Error> {
        let found = match namespace {
            Some(ns) => self.namespaces.get(ns).and_then(|m| m.get(name)),
            None => self.root.get(name),
        };
        found.cloned().ok_or_else(|| {
            Error::UnknownAction(match namespace {
                Some(ns) => format!("{ns}.{name}"),
                None => name.to_string(),
            })
        })
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty() && self.namespaces.values().all(HashMap::is_empty)
    }
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut root: Vec<&String> = self.root.keys().collect();
        root.sort();
        let mut namespaces: Vec<&String> = self.namespaces.keys().collect();
        namespaces.sort();
        f.debug_struct("ActionRegistry")
            .field("root", &root)
            .field("namespaces", &namespaces)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(v: f64) -> ActionFn {
        action(move |_| Ok(Value::Number(v)))
    }

    fn call(registry: &ActionRegistry, ns: Option<&str>, name: &str) -> Result<Value, Error> {
        let f = registry.resolve(ns, name)?;
        let mut doc = Document::new();
        let root = doc.root();
        let mut dispatches = Vec::new();
        let mut ctx = ActionContext::new(&mut doc, root, "click", &[], &mut dispatches);
        Ok(f(&mut ctx)?)
    }

    #[test]
    fn namespace_registration_replaces_root_merges() {
        let mut registry = ActionRegistry::new();
        registry
            .register(None, [("a", constant(1.0))])
            .expect("root");
        registry
            .register(None, [("b", constant(2.0))])
            .expect("root");
        registry
            .register(Some("cart"), [("add", constant(3.0)), ("clear", constant(4.0))])
            .expect("ns");
        registry
            .register(Some("cart"), [("add", constant(5.0))])
            .expect("ns");

        assert_eq!(call(&registry, None, "a").expect("a"), Value::Number(1.0));
        assert_eq!(call(&registry, None, "b").expect("b"), Value::Number(2.0));
        assert_eq!(
            call(&registry, Some("cart"), "add").expect("add"),
            Value::Number(5.0)
        );
        let err = call(&registry, Some("cart"), "clear").expect_err("replaced");
        assert!(
            matches!(&err, Error::UnknownAction(name) if name == "cart.clear"),
            "expected UnknownAction, got: {err:?}"
        );
        assert_eq!(err.to_string(), "Unknown action: cart.clear");
    }

    #[test]
    fn reserved_namespace_is_rejected() {
        let mut registry = ActionRegistry::new();
        let err = registry
            .register(Some(RESERVED_NAMESPACE), [("x", constant(0.0))])
            .expect_err("reserved");
        assert!(
            matches!(&err, Error::ReservedNamespace(ns) if ns == "zjax"),
            "expected ReservedNamespace, got: {err:?}"
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn handlers_queue_dispatches() {
        let mut registry = ActionRegistry::new();
        registry
            .register(
                None,
                [(
                    "ping",
                    action(|ctx| {
                        let node = ctx.node;
                        ctx.dispatch(node, "pong");
                        Ok(Value::Null)
                    }),
                )],
            )
            .expect("register");
        let f = registry.resolve(None, "ping").expect("resolve");
        let mut doc = Document::new();
        let root = doc.root();
        let mut dispatches = Vec::new();
        let mut ctx = ActionContext::new(&mut doc, root, "click", &[], &mut dispatches);
        f(&mut ctx).expect("run");
        assert_eq!(dispatches, vec![(root, "pong".to_string())]);
    }
}
