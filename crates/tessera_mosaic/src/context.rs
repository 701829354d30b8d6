//! Request context handed to actions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tessera_tile::{Scope, Value};

/// The request a render belongs to.
///
/// Clones share one cancellation flag: cancelling any clone stops every
/// composition running under the same request.
#[derive(Debug, Clone, Default)]
pub struct Context {
    inner: Arc<ContextInner>,
}

#[derive(Debug, Default)]
struct ContextInner {
    path: String,
    query: Scope,
    cancelled: AtomicBool,
}

impl Context {
    pub fn new(path: impl Into<String>) -> Self {
        Self::with_query(path, Scope::new())
    }

    pub fn with_query(path: impl Into<String>, query: Scope) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                path: path.into(),
                query,
                cancelled: AtomicBool::new(false),
            }),
        }
    }

    #[inline]
    pub fn path(&self) -> &str {
        &self.inner.path
    }

    #[inline]
    pub fn query(&self) -> &Scope {
        &self.inner.query
    }

    /// The context as scripts see it under `$context`.
    pub fn to_value(&self) -> Value {
        let mut object = Scope::new();
        object.insert("path".into(), Value::String(self.inner.path.clone()));
        object.insert("query".into(), Value::Object(self.inner.query.clone()));
        Value::Object(object)
    }

    /// Abort every render running under this request.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cancel_is_shared() {
        let context = Context::new("/");
        let clone = context.clone();
        assert!(!clone.is_cancelled());
        context.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_to_value() {
        let query = json!({"page": "2"}).as_object().cloned().unwrap();
        let context = Context::with_query("/todos", query);
        assert_eq!(
            context.to_value(),
            json!({"path": "/todos", "query": {"page": "2"}})
        );
    }
}
