use crate::codegen::utils::sanitize_identifier;
use std::collections::HashSet;

/// Global names the printer emits unqualified. An import under one of
/// these names would shadow the global.
pub const GLOBAL_TYPE_NAMES: [&str; 9] = [
    "Array", "Record", "Promise", "string", "number", "boolean", "unknown", "void", "undefined",
];

/// Identifiers in use within one generated file.
#[derive(Debug, Clone)]
pub struct NameRegistry {
    taken: HashSet<String>,
}

impl Default for NameRegistry {
    fn default() -> Self {
        Self {
            taken: GLOBAL_TYPE_NAMES.iter().map(|name| name.to_string()).collect(),
        }
    }
}

impl NameRegistry {
    /// Marks `name` as taken without checking for collisions.
    pub fn reserve(&mut self, name: impl Into<String>) {
        self.taken.insert(name.into());
    }

    pub fn is_taken(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// Issues `base`, or `base_1`, `base_2`, ... when `base` is taken.
    pub fn mint(&mut self, base: &str) -> String {
        let base = sanitize_identifier(base);
        let mut candidate = base.clone();
        let mut counter = 1;
        while self.taken.contains(&candidate) {
            candidate = format!("{base}_{counter}");
            counter += 1;
        }
        self.taken.insert(candidate.clone());
        candidate
    }
}
