use crate::object::Object;
use std::{cell::RefCell, collections::HashMap, fmt, rc::Rc};

/// Shared handle to a scope. Closures keep their defining scope alive through
/// this handle.
pub type Env = Rc<RefCell<Environment>>;

#[derive(Default)]
pub struct Environment {
    store: HashMap<String, Object>,
    outer: Option<Env>,
}

impl Environment {
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates a fresh outermost scope behind a shared handle.
    pub fn new_shared() -> Env {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn new_enclosed(outer: Env) -> Self {
        Environment {
            store: HashMap::new(),
            outer: Some(outer),
        }
    }

    /// Binds `key` in this scope only; outer bindings of the same name are
    /// shadowed, never modified.
    pub fn set(&mut self, key: &str, value: Object) {
        self.store.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<Object> {
        match self.store.get(key) {
            Some(value) => Some(value.clone()),
            None => self.outer.as_ref().and_then(|outer| outer.borrow().get(key)),
        }
    }
}

// Scopes can reach themselves through closures stored in them, so only the
// local names are printed.
impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.store.keys().collect();
        names.sort();
        f.debug_struct("Environment")
            .field("names", &names)
            .field("enclosed", &self.outer.is_some())
            .finish()
    }
}
