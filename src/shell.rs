use std::io::Write;

use crate::error::ShellError;
use crate::listeners::Topic;
use crate::model::mode::HandleType;
use crate::wire::{OutboundMessage, PositionUpdate, ToastDuration};

/// The host UI: draws handles, owns clipboard/share/toast, and delivers
/// notification topics.
pub trait HandleShell {
    fn send(&mut self, message: OutboundMessage) -> Result<(), ShellError>;
    fn subscribe(&mut self, topic: Topic);
    fn unsubscribe(&mut self, topic: Topic);

    fn show_handles(&mut self, handles: &[HandleType]) -> Result<(), ShellError> {
        self.send(OutboundMessage::ShowHandles {
            handles: handles.to_vec(),
        })
    }

    fn hide_handles(&mut self) -> Result<(), ShellError> {
        self.send(OutboundMessage::HideHandles)
    }

    fn position_handles(&mut self, update: PositionUpdate) -> Result<(), ShellError> {
        self.send(OutboundMessage::PositionHandles(update))
    }

    fn copy_to_clipboard(&mut self, text: &str) -> Result<(), ShellError> {
        self.send(OutboundMessage::CopyText {
            text: text.to_string(),
        })
    }

    fn share_text(&mut self, text: &str) -> Result<(), ShellError> {
        self.send(OutboundMessage::ShareText {
            text: text.to_string(),
        })
    }

    fn toast(&mut self, message: &str) -> Result<(), ShellError> {
        self.send(OutboundMessage::Toast {
            message: message.to_string(),
            duration: ToastDuration::Short,
        })
    }
}

/// Writes each outbound message as one line of JSON.
///
/// The replay driver feeds every topic to the handler, which filters by its
/// own subscriptions, so subscribing is a no-op here.
pub struct JsonShell<W: Write> {
    writer: W,
}

impl<W: Write> JsonShell<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> HandleShell for JsonShell<W> {
    fn send(&mut self, message: OutboundMessage) -> Result<(), ShellError> {
        serde_json::to_writer(&mut self.writer, &message)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    fn subscribe(&mut self, _topic: Topic) {}

    fn unsubscribe(&mut self, _topic: Topic) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_one_json_object_per_line() {
        let mut shell = JsonShell::new(Vec::new());
        shell.show_handles(&[HandleType::Middle]).unwrap();
        shell.subscribe(Topic::HandleMove);
        shell.unsubscribe(Topic::HandleMove);
        shell.hide_handles().unwrap();

        let out = String::from_utf8(shell.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                r#"{"type":"TextSelection:ShowHandles","handles":["MIDDLE"]}"#,
                r#"{"type":"TextSelection:HideHandles"}"#,
            ]
        );
    }
}
