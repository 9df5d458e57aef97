use std::collections::HashMap;

/// Variable bindings of a statement file
#[derive(Debug, Clone, Default)]
pub struct Scope {
    bindings: HashMap<String, i64>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&self, name: &str) -> Option<i64> {
        self.bindings.get(name).copied()
    }

    /// Bind `name`, replacing any earlier value
    pub fn add(&mut self, name: impl ToString, value: i64) {
        self.bindings.insert(name.to_string(), value);
    }
}
