//! Session-scoped event subscriptions.
//!
//! Everything a session subscribes to is recorded here and released in one
//! place when the session ends, whether it closed normally or never finished
//! starting.

use smallvec::SmallVec;

use crate::dom::{Document, WindowEvent, WindowId};
use crate::error::DocumentError;
use crate::shell::HandleShell;

/// Shell-level notification topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    SingleTap,
    WindowResize,
    TabSelected,
    ViewportChange,
    HandleMove,
    HandlePosition,
    CompositionEnd,
}

impl Topic {
    pub const SESSION: [Topic; 7] = [
        Topic::SingleTap,
        Topic::WindowResize,
        Topic::TabSelected,
        Topic::ViewportChange,
        Topic::HandleMove,
        Topic::HandlePosition,
        Topic::CompositionEnd,
    ];
}

/// What a single inbound event needs to be listened to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listener {
    Topic(Topic),
    Window(WindowEvent),
}

#[derive(Debug, Default)]
pub struct Subscriptions {
    topics: SmallVec<[Topic; 8]>,
    window_events: SmallVec<[(WindowId, WindowEvent); 4]>,
}

impl Subscriptions {
    /// Subscribe to every shell topic and the per-window events of `window`.
    pub fn acquire<D, S>(
        &mut self,
        document: &mut D,
        shell: &mut S,
        window: WindowId,
    ) -> Result<(), DocumentError>
    where
        D: Document,
        S: HandleShell,
    {
        for topic in Topic::SESSION {
            if !self.topics.contains(&topic) {
                shell.subscribe(topic);
                self.topics.push(topic);
            }
        }

        for event in [WindowEvent::PageHide, WindowEvent::KeyDown, WindowEvent::Blur] {
            if self.window_events.contains(&(window, event)) {
                continue;
            }
            document.add_event_listener(window, event)?;
            self.window_events.push((window, event));
        }

        Ok(())
    }

    pub fn is_listening(&self, listener: Listener) -> bool {
        match listener {
            Listener::Topic(topic) => self.topics.contains(&topic),
            Listener::Window(event) => self.window_events.iter().any(|(_, e)| *e == event),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty() && self.window_events.is_empty()
    }

    /// Undo every subscription made through [`Subscriptions::acquire`].
    pub fn release<D, S>(&mut self, document: &mut D, shell: &mut S)
    where
        D: Document,
        S: HandleShell,
    {
        for topic in self.topics.drain(..) {
            shell.unsubscribe(topic);
        }
        for (window, event) in self.window_events.drain(..) {
            document.remove_event_listener(window, event);
        }
    }
}
