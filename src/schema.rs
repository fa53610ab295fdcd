//! Chain introspection.
//!
//! A [`ChainSchema`] lists the handlers of a composed chain in dispatch
//! order. It is what [`Composed::schema`](crate::Composed::schema) returns and
//! can be dumped as JSON for diagnostics.
//!
//! # Example
//!
//! ```
//! use middleware_compose::schema::ChainSchema;
//!
//! let mut schema = ChainSchema::new("http");
//! schema.add_handler("logger");
//! schema.add_handler("router");
//!
//! let json = schema.to_json();
//! assert!(json.contains("router"));
//! ```

use serde::Serialize;
use serde_json::json;

/// One entry of a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerSchema {
    /// Dispatch position (0 = outermost).
    pub position: usize,
    /// Middleware name.
    pub name: String,
}

/// Ordered description of a composed chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainSchema {
    /// Chain label from its configuration.
    pub label: String,
    /// Handlers in dispatch order.
    pub handlers: Vec<HandlerSchema>,
}

impl ChainSchema {
    /// Create an empty schema.
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            handlers: Vec::new(),
        }
    }

    /// Append a handler at the next position.
    pub fn add_handler(&mut self, name: &str) {
        let position = self.handlers.len();
        self.handlers.push(HandlerSchema {
            position,
            name: name.to_string(),
        });
    }

    /// Get a handler by position.
    pub fn get(&self, position: usize) -> Option<&HandlerSchema> {
        self.handlers.get(position)
    }

    /// Number of handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if schema is empty.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Render as a JSON object.
    pub fn to_json(&self) -> String {
        let handlers: Vec<_> = self
            .handlers
            .iter()
            .map(|h| json!({ "position": h.position, "name": h.name }))
            .collect();

        json!({
            "label": self.label,
            "handlers": handlers,
        })
        .to_string()
    }
}
