//! Custom Elements
//!
//! Custom element registry and the connected lifecycle callback.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::{Document, NodeId};

/// A custom element implementation.
///
/// `connected` runs once per element instance, when the element is upgraded:
/// either at definition time for instances already in the document, or when an
/// instance of a defined tag is inserted.
pub trait CustomElement {
    fn connected(&self, document: &mut Document, host: NodeId);
}

impl<F> CustomElement for F
where
    F: Fn(&mut Document, NodeId),
{
    fn connected(&self, document: &mut Document, host: NodeId) {
        self(document, host)
    }
}

/// Custom elements registry
#[derive(Default)]
pub struct CustomElementRegistry {
    definitions: HashMap<String, Rc<dyn CustomElement>>,
}

impl fmt::Debug for CustomElementRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.definitions.keys().collect();
        names.sort();
        f.debug_struct("CustomElementRegistry")
            .field("definitions", &names)
            .finish()
    }
}

impl CustomElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a custom element. Defining a name twice keeps the first
    /// definition and is not an error.
    pub fn define(
        &mut self,
        name: &str,
        constructor: Rc<dyn CustomElement>,
    ) -> Result<(), CustomElementError> {
        if !Self::is_valid_name(name) {
            return Err(CustomElementError::InvalidName(name.to_string()));
        }
        if self.definitions.contains_key(name) {
            tracing::debug!("Custom element {} already defined", name);
            return Ok(());
        }

        self.definitions.insert(name.to_string(), constructor);
        tracing::debug!("Custom element {} defined", name);
        Ok(())
    }

    /// Get element constructor
    pub fn get(&self, name: &str) -> Option<Rc<dyn CustomElement>> {
        self.definitions.get(name).cloned()
    }

    /// Check if element is defined
    pub fn is_defined(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Number of definitions
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Validate custom element name
    pub fn is_valid_name(name: &str) -> bool {
        // Must contain hyphen
        if !name.contains('-') {
            return false;
        }

        // Must start with lowercase letter
        if !name.starts_with(|c: char| c.is_ascii_lowercase()) {
            return false;
        }

        if name.chars().any(|c| c.is_ascii_uppercase() || c.is_whitespace()) {
            return false;
        }

        let reserved = ["annotation-xml", "color-profile", "font-face",
                       "font-face-src", "font-face-uri", "font-face-format",
                       "font-face-name", "missing-glyph"];
        !reserved.contains(&name)
    }
}

/// Custom element errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CustomElementError {
    #[error("'{0}' is not a valid custom element name")]
    InvalidName(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Rc<dyn CustomElement> {
        Rc::new(|_: &mut Document, _: NodeId| {})
    }

    #[test]
    fn test_valid_names() {
        assert!(CustomElementRegistry::is_valid_name("flowjs-header"));
        assert!(CustomElementRegistry::is_valid_name("flowjs-not-found"));
        assert!(!CustomElementRegistry::is_valid_name("header")); // no hyphen
        assert!(!CustomElementRegistry::is_valid_name("Flowjs-Header")); // uppercase
        assert!(!CustomElementRegistry::is_valid_name("font-face"));
    }

    #[test]
    fn test_define() {
        let mut registry = CustomElementRegistry::new();

        assert!(registry.define("flowjs-home", noop()).is_ok());
        assert!(registry.is_defined("flowjs-home"));
        assert_eq!(registry.len(), 1);

        assert_eq!(
            registry.define("home", noop()),
            Err(CustomElementError::InvalidName("home".into()))
        );
    }

    #[test]
    fn test_redefine_keeps_first_definition() {
        let mut registry = CustomElementRegistry::new();
        let first = noop();
        registry.define("flowjs-home", first.clone()).unwrap();

        assert_eq!(registry.define("flowjs-home", noop()), Ok(()));
        assert_eq!(registry.len(), 1);
        let kept = registry.get("flowjs-home").unwrap();
        assert!(Rc::ptr_eq(&kept, &first));
    }
}
