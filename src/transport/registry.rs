//! Callback registry for script-injection requests.
//!
//! # Responsibilities
//! - Generate compact, unique callback ids
//! - Hold the slot each injected script writes its payload into
//! - Tombstone slots after completion so stale scripts cannot touch them
//!
//! # Design Decisions
//! - Entries are never deleted; a tombstone tolerates late or duplicate invocations
//! - Ids come from a per-registry counter rendered in base 36 (`_0`, `_1`, ..., `_a`)
//! - The registry is injected into the transport rather than living in a global

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde_json::Value;

/// Default namespace scripts use to reach the registry.
pub const DEFAULT_NAMESPACE: &str = "callbacks";

/// State of one registry entry.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryEntry {
    /// Waiting for the remote script.
    Pending {
        data: Option<Value>,
        called: bool,
    },
    /// Request finished; invocations are ignored.
    Tombstone,
}

/// Table of pending script callbacks, keyed by generated id.
#[derive(Debug)]
pub struct CallbackRegistry {
    namespace: String,
    counter: AtomicU64,
    entries: DashMap<String, RegistryEntry>,
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl CallbackRegistry {
    /// Create an empty registry reachable under `namespace`.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            counter: AtomicU64::new(0),
            entries: DashMap::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Generate the next id without registering it.
    pub fn generate_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("_{}", to_base36(n))
    }

    /// Allocate a fresh pending entry and return its id.
    pub fn register(&self) -> String {
        let id = self.generate_id();
        self.entries.insert(
            id.clone(),
            RegistryEntry::Pending {
                data: None,
                called: false,
            },
        );
        id
    }

    /// Fully-qualified reference a script uses to reach entry `id`.
    pub fn qualified_name(&self, id: &str) -> String {
        format!("{}.{}", self.namespace, id)
    }

    /// Map a qualified reference back to an entry id.
    pub fn resolve_reference<'a>(&self, reference: &'a str) -> Option<&'a str> {
        reference
            .strip_prefix(self.namespace.as_str())
            .and_then(|rest| rest.strip_prefix('.'))
            .filter(|id| !id.is_empty())
    }

    /// Deliver a payload to entry `id`, as the injected script does.
    ///
    /// Returns `false` when the id is unknown or already tombstoned.
    pub fn invoke(&self, id: &str, payload: Value) -> bool {
        match self.entries.get_mut(id) {
            Some(mut entry) => match entry.value_mut() {
                RegistryEntry::Pending { data, called } => {
                    *data = Some(payload);
                    *called = true;
                    true
                }
                RegistryEntry::Tombstone => {
                    tracing::debug!(callback_id = %id, "Ignoring invocation of completed callback");
                    false
                }
            },
            None => {
                tracing::debug!(callback_id = %id, "Ignoring invocation of unknown callback");
                false
            }
        }
    }

    /// Whether the script has invoked entry `id`.
    pub fn is_called(&self, id: &str) -> bool {
        matches!(
            self.entries.get(id).as_deref(),
            Some(RegistryEntry::Pending { called: true, .. })
        )
    }

    /// Replace entry `id` with a permanent no-op, returning any recorded payload.
    pub fn tombstone(&self, id: &str) -> Option<Value> {
        let previous = self.entries.insert(id.to_string(), RegistryEntry::Tombstone);
        match previous {
            Some(RegistryEntry::Pending { data, .. }) => data,
            _ => None,
        }
    }

    pub fn entry(&self, id: &str) -> Option<RegistryEntry> {
        self.entries.get(id).map(|r| r.value().clone())
    }

    /// Number of entries, tombstones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Characters allowed in one segment of a callback reference.
pub fn is_reference_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '$')
}

/// Whether `reference` is a dotted path of non-empty segments a script can call.
pub fn is_valid_reference(reference: &str) -> bool {
    reference
        .split('.')
        .all(|segment| !segment.is_empty() && segment.chars().all(is_reference_char))
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ids_are_base36_and_monotonic() {
        let registry = CallbackRegistry::default();
        let ids: Vec<String> = (0..37).map(|_| registry.generate_id()).collect();
        assert_eq!(ids[0], "_0");
        assert_eq!(ids[9], "_9");
        assert_eq!(ids[10], "_a");
        assert_eq!(ids[35], "_z");
        assert_eq!(ids[36], "_10");
    }

    #[test]
    fn test_invoke_records_payload() {
        let registry = CallbackRegistry::default();
        let id = registry.register();
        assert!(!registry.is_called(&id));

        assert!(registry.invoke(&id, json!({"ok": true})));
        assert!(registry.is_called(&id));
        assert_eq!(registry.tombstone(&id), Some(json!({"ok": true})));
    }

    #[test]
    fn test_tombstone_ignores_late_invocation() {
        let registry = CallbackRegistry::default();
        let id = registry.register();
        assert_eq!(registry.tombstone(&id), None);

        assert!(!registry.invoke(&id, json!("late")));
        assert_eq!(registry.entry(&id), Some(RegistryEntry::Tombstone));
        assert!(!registry.is_called(&id));
        // Never deleted
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unknown_id_is_ignored() {
        let registry = CallbackRegistry::default();
        assert!(!registry.invoke("_zz", json!(1)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_qualified_name_round_trip() {
        let registry = CallbackRegistry::new("app.callbacks");
        let id = registry.register();
        let name = registry.qualified_name(&id);
        assert_eq!(name, "app.callbacks._0");
        assert_eq!(registry.resolve_reference(&name), Some("_0"));
        assert_eq!(registry.resolve_reference("other._0"), None);
        assert_eq!(registry.resolve_reference("app.callbacks."), None);
        assert_eq!(registry.resolve_reference("app.callbacks_0"), None);
    }

    #[test]
    fn test_valid_references() {
        assert!(is_valid_reference("callbacks"));
        assert!(is_valid_reference("app.$jsonp._1a"));
        assert!(is_valid_reference(&CallbackRegistry::default().qualified_name("_0")));

        assert!(!is_valid_reference(""));
        assert!(!is_valid_reference("app-callbacks"));
        assert!(!is_valid_reference("my callbacks"));
        assert!(!is_valid_reference("app..callbacks"));
        assert!(!is_valid_reference(".callbacks"));
        assert!(!is_valid_reference("callbacks."));
    }
}
