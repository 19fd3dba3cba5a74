//! Small observable UI flags.
//!
//! Both types wrap a `tokio::sync::watch` channel: readers get the latest
//! value, and subscribers are woken only when it actually changes.

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

fn set_if_changed(tx: &watch::Sender<bool>, value: bool) {
    tx.send_if_modified(|current| {
        if *current == value {
            false
        } else {
            *current = value;
            true
        }
    });
}

/// Whether the application window has focus.
///
/// The host feeds window focus and blur events in via [`focus`](Self::focus)
/// and [`blur`](Self::blur).
#[derive(Debug)]
pub struct WindowFocus {
    tx: watch::Sender<bool>,
}

impl WindowFocus {
    pub fn new(initially_focused: bool) -> Self {
        let (tx, _) = watch::channel(initially_focused);
        Self { tx }
    }

    /// Take the initial state from `has_focus`, typically a query of the
    /// platform's current focus. Call [`refresh`](Self::refresh) with the
    /// same probe after the window is fully set up.
    pub fn probe(has_focus: impl FnOnce() -> bool) -> Self {
        Self::new(has_focus())
    }

    pub fn refresh(&self, has_focus: impl FnOnce() -> bool) {
        set_if_changed(&self.tx, has_focus());
    }

    pub fn focus(&self) {
        set_if_changed(&self.tx, true);
    }

    pub fn blur(&self) {
        set_if_changed(&self.tx, false);
    }

    pub fn is_focused(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Current value, then every change, as a `Stream`.
    pub fn changes(&self) -> WatchStream<bool> {
        WatchStream::new(self.tx.subscribe())
    }
}

impl Default for WindowFocus {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Visibility of the full-screen loading overlay. Starts hidden.
#[derive(Debug)]
pub struct LoadingOverlay {
    tx: watch::Sender<bool>,
}

impl LoadingOverlay {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    pub fn is_visible(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn set_visible(&self, visible: bool) {
        set_if_changed(&self.tx, visible);
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for LoadingOverlay {
    fn default() -> Self {
        Self::new()
    }
}
