use crate::error::ShellError;
use crate::listeners::Topic;
use crate::model::mode::HandleType;
use crate::shell::HandleShell;
use crate::wire::{OutboundMessage, PositionUpdate};

/// Shell that keeps every outbound message and live subscription in memory.
#[derive(Debug, Default)]
pub struct RecordingShell {
    sent: Vec<OutboundMessage>,
    subscriptions: Vec<Topic>,
    fail_sends: bool,
}

impl RecordingShell {
    pub fn sent(&self) -> &[OutboundMessage] {
        &self.sent
    }

    pub fn clear(&mut self) {
        self.sent.clear();
    }

    pub fn subscriptions(&self) -> &[Topic] {
        &self.subscriptions
    }

    /// Make every following send fail, as if the UI went away.
    pub fn set_disconnected(&mut self, disconnected: bool) {
        self.fail_sends = disconnected;
    }

    pub fn last_positions(&self) -> Option<&PositionUpdate> {
        self.sent.iter().rev().find_map(|msg| match msg {
            OutboundMessage::PositionHandles(update) => Some(update),
            _ => None,
        })
    }

    pub fn shown_handles(&self) -> Option<&[HandleType]> {
        self.sent.iter().rev().find_map(|msg| match msg {
            OutboundMessage::ShowHandles { handles } => Some(handles.as_slice()),
            _ => None,
        })
    }

    pub fn count(&self, matches: impl Fn(&OutboundMessage) -> bool) -> usize {
        self.sent.iter().filter(|msg| matches(msg)).count()
    }
}

impl HandleShell for RecordingShell {
    fn send(&mut self, message: OutboundMessage) -> Result<(), ShellError> {
        if self.fail_sends {
            return Err(ShellError::Disconnected);
        }
        self.sent.push(message);
        Ok(())
    }

    fn subscribe(&mut self, topic: Topic) {
        self.subscriptions.push(topic);
    }

    fn unsubscribe(&mut self, topic: Topic) {
        if let Some(idx) = self.subscriptions.iter().position(|t| *t == topic) {
            self.subscriptions.remove(idx);
        }
    }
}
