//! Document facility for script injection.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::oneshot;

static SCRIPT_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Identifies a script element attached to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScriptId(u64);

impl ScriptId {
    /// Generate a new unique script ID.
    pub fn new() -> Self {
        Self(SCRIPT_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ScriptId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ScriptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "script-{}", self.0)
    }
}

/// Event fired by a script element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptEvent {
    Load,
    Error,
}

impl ScriptEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptEvent::Load => "load",
            ScriptEvent::Error => "error",
        }
    }
}

/// Receives the first load/error event of a script element.
///
/// Dropping the receiving side removes the listener.
pub type ScriptListener = oneshot::Sender<ScriptEvent>;

/// A document that can host injected scripts.
pub trait ScriptHost: Send + Sync {
    /// Create a script element for `src`, attach `listener` and append it to the document.
    fn append_script(&self, src: &str, listener: ScriptListener) -> ScriptId;

    /// Detach the element. Unknown ids are ignored.
    fn remove_script(&self, id: ScriptId);
}
