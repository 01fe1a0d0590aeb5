use crate::models::{BindTarget, Binding};
use serde::{Deserialize, Serialize};

/// Ordered bindings owned by one container.
///
/// Insertion order is persisted and decides the order of generated fields. A non-null
/// target appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BindingRegistry {
    bindings: Vec<Binding>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a binding unless `target` is already referenced.
    ///
    /// Returns `true` when a binding was appended. Bindings without a target are
    /// placeholders and are always appended.
    pub fn add(&mut self, target: Option<BindTarget>, field_name: &str) -> bool {
        if let Some(ref t) = target {
            if self.contains_target(t) {
                return false;
            }
        }
        self.bindings.push(Binding::new(target, field_name));
        true
    }

    pub fn contains_target(&self, target: &BindTarget) -> bool {
        self.bindings.iter().any(|b| b.references(target))
    }

    pub fn find_by_target(&self, target: &BindTarget) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.references(target))
    }

    /// Remove the first entry equal to `binding`
    pub fn remove(&mut self, binding: &Binding) -> bool {
        match self.bindings.iter().position(|b| b == binding) {
            Some(index) => {
                self.bindings.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn remove_at(&mut self, index: usize) -> Option<Binding> {
        if index < self.bindings.len() {
            Some(self.bindings.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    /// Bindings with a target and a non-empty field name, in insertion order
    pub fn valid_bindings(&self) -> Vec<&Binding> {
        self.bindings.iter().filter(|b| b.is_valid()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Binding> {
        self.bindings.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Binding> {
        self.bindings.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// First target referenced by more than one binding, if any
    pub(crate) fn first_duplicate(&self) -> Option<&BindTarget> {
        self.bindings.iter().enumerate().find_map(|(i, b)| {
            let target = b.target.as_ref()?;
            self.bindings[..i]
                .iter()
                .any(|earlier| earlier.references(target))
                .then_some(target)
        })
    }
}
