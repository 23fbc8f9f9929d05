/// Input listener registration between the engine and its host
use std::fmt;

use crate::error::EngineError;

/// Where a listener is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerTarget {
    /// The mount surface itself
    Surface,
    /// The host's global scope (window, terminal)
    Global,
}

/// Every input source the engine subscribes to while mounted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    PointerDown,
    PointerMove,
    PointerUp,
    PointerLeave,
    Scroll,
    Resize,
}

impl ListenerKind {
    pub const ALL: [ListenerKind; 6] = [
        ListenerKind::PointerDown,
        ListenerKind::PointerMove,
        ListenerKind::PointerUp,
        ListenerKind::PointerLeave,
        ListenerKind::Scroll,
        ListenerKind::Resize,
    ];

    /// DOM event name
    pub fn event_name(self) -> &'static str {
        match self {
            ListenerKind::PointerDown => "mousedown",
            ListenerKind::PointerMove => "mousemove",
            ListenerKind::PointerUp => "mouseup",
            ListenerKind::PointerLeave => "mouseleave",
            ListenerKind::Scroll => "scroll",
            ListenerKind::Resize => "resize",
        }
    }

    pub fn target(self) -> ListenerTarget {
        match self {
            ListenerKind::Scroll | ListenerKind::Resize => ListenerTarget::Global,
            _ => ListenerTarget::Surface,
        }
    }
}

impl fmt::Display for ListenerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

/// A host that can attach and detach engine input listeners.
///
/// `unlisten` is only ever called for kinds whose `listen` succeeded.
pub trait EventHost {
    fn listen(&mut self, kind: ListenerKind) -> Result<(), EngineError>;

    fn unlisten(&mut self, kind: ListenerKind);
}

/// Host without any input source, for offscreen rendering
#[derive(Debug, Clone, Copy, Default)]
pub struct Headless;

impl EventHost for Headless {
    fn listen(&mut self, _kind: ListenerKind) -> Result<(), EngineError> {
        Ok(())
    }

    fn unlisten(&mut self, _kind: ListenerKind) {}
}

/// Kinds currently registered with a host, in registration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListenerSet {
    active: Vec<ListenerKind>,
}

impl ListenerSet {
    /// Register every kind in [`ListenerKind::ALL`].
    ///
    /// On failure the kinds already attached are detached again, so the
    /// host is left exactly as it was.
    pub fn attach_all(host: &mut dyn EventHost) -> Result<Self, EngineError> {
        let mut set = Self::default();
        for kind in ListenerKind::ALL {
            if let Err(err) = host.listen(kind) {
                set.detach_all(host);
                return Err(err);
            }
            set.active.push(kind);
        }
        Ok(set)
    }

    /// Detach everything; safe to call repeatedly
    pub fn detach_all(&mut self, host: &mut dyn EventHost) {
        for kind in self.active.drain(..).rev() {
            host.unlisten(kind);
        }
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn contains(&self, kind: ListenerKind) -> bool {
        self.active.contains(&kind)
    }
}
