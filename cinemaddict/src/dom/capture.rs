use std::rc::{Rc, Weak};

use super::{Document, EventKind, ListenerId};
use crate::input::KeyEvent;

/// Scoped document-level keyboard capture.
///
/// The listener stays registered for exactly as long as the guard is alive.
/// Dropping the guard unregisters it, so every owner exit path (explicit
/// close, programmatic close, destruction) releases the keyboard.
#[must_use = "dropping the guard releases the capture immediately"]
pub struct KeyCapture {
    document: Weak<Document>,
    listener: ListenerId,
}

impl KeyCapture {
    pub fn is_active(&self) -> bool {
        self.document
            .upgrade()
            .is_some_and(|document| document.has_listener(self.listener))
    }
}

impl Document {
    /// Route every keydown on the document to `handler` until the returned
    /// guard is dropped.
    pub fn capture_keys<F>(self: &Rc<Self>, handler: F) -> KeyCapture
    where
        F: Fn(&KeyEvent) + 'static,
    {
        let listener = self.add_document_listener(EventKind::KeyDown, move |event| {
            if let Some(key) = event.key {
                handler(&key);
            }
        });
        tracing::trace!("Key capture {:?} acquired", listener);
        KeyCapture {
            document: Rc::downgrade(self),
            listener,
        }
    }
}

impl Drop for KeyCapture {
    fn drop(&mut self) {
        if let Some(document) = self.document.upgrade() {
            document.remove_event_listener(self.listener);
            tracing::trace!("Key capture {:?} released", self.listener);
        }
    }
}

impl std::fmt::Debug for KeyCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyCapture")
            .field("listener", &self.listener)
            .finish()
    }
}
