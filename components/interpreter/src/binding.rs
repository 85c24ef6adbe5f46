//! The persistent binding context of a session.

use boa_engine::JsValue;
use indexmap::IndexMap;
use std::fmt;

type Subscriber = Box<dyn Fn(&str)>;

/// Identifier to live value mapping carried between submissions.
///
/// Bindings keep their first-insertion order. Updates arrive as a whole
/// batch per submission through [`BindingContext::apply`]; nothing else
/// writes to the context except [`BindingContext::clear`].
///
/// # Examples
///
/// ```
/// use boa_engine::JsValue;
/// use interpreter::BindingContext;
///
/// let mut bindings = BindingContext::new();
/// let changed = bindings.apply(vec![
///     ("a".to_string(), JsValue::from(1)),
///     ("b".to_string(), JsValue::from(2)),
/// ]);
/// assert_eq!(changed, vec!["a", "b"]);
///
/// // Same values: nothing changes.
/// assert!(bindings.apply(vec![("a".to_string(), JsValue::from(1))]).is_empty());
/// assert_eq!(bindings.names(), vec!["a", "b"]);
/// ```
#[derive(Default)]
pub struct BindingContext {
    values: IndexMap<String, JsValue>,
    subscribers: Vec<Subscriber>,
}

impl BindingContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binding names in insertion order.
    pub fn names(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    /// The current value of `name`.
    pub fn get(&self, name: &str) -> Option<&JsValue> {
        self.values.get(name)
    }

    /// Returns true if `name` is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates bindings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &JsValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Registers an observer called with each changed name.
    pub fn subscribe(&mut self, subscriber: impl Fn(&str) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Applies one submission's updates.
    ///
    /// A name is written only when its new value is not SameValue-identical
    /// to the current one. Observers run after every write is done, once per
    /// changed name. Returns the changed names in update order.
    pub fn apply(&mut self, updates: impl IntoIterator<Item = (String, JsValue)>) -> Vec<String> {
        let mut changed = Vec::new();
        for (name, value) in updates {
            let unchanged = self
                .values
                .get(&name)
                .is_some_and(|current| JsValue::same_value(current, &value));
            if unchanged {
                continue;
            }
            self.values.insert(name.clone(), value);
            if !changed.contains(&name) {
                changed.push(name);
            }
        }
        for name in &changed {
            for subscriber in &self.subscribers {
                subscriber(name);
            }
        }
        changed
    }

    /// Drops every binding. Observers are kept.
    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl fmt::Debug for BindingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingContext")
            .field("names", &self.names())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
