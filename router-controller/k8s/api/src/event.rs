use crate::{watcher, BackendObject};

/// A typed change notification for a backend object.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Added(BackendObject),
    Modified(BackendObject),
    Deleted(BackendObject),
}

// === impl Event ===

impl Event {
    /// Converts a watcher event.
    ///
    /// The watcher does not distinguish additions from modifications: objects
    /// listed while the watch (re)initializes are reported as added, later
    /// applies as modified. Initialization markers carry no object.
    pub fn from_watcher<K: Into<BackendObject>>(event: watcher::Event<K>) -> Option<Self> {
        match event {
            watcher::Event::InitApply(obj) => Some(Self::Added(obj.into())),
            watcher::Event::Apply(obj) => Some(Self::Modified(obj.into())),
            watcher::Event::Delete(obj) => Some(Self::Deleted(obj.into())),
            watcher::Event::Init | watcher::Event::InitDone => None,
        }
    }

    pub fn object(&self) -> &BackendObject {
        match self {
            Self::Added(obj) | Self::Modified(obj) | Self::Deleted(obj) => obj,
        }
    }
}
