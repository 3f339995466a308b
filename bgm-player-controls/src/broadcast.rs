use crate::Result;
use tokio::sync::broadcast::{self, Receiver, Sender};

use crate::notification::{Message, Notification};

#[derive(Debug)]
pub struct Broadcast {
    tx: Sender<Notification>,
    rx: Receiver<Notification>,
}

impl Broadcast {
    pub fn new() -> Self {
        let (tx, rx) = broadcast::channel(20);
        Self { tx, rx }
    }

    pub fn send(&self, notification: Notification) -> Result<()> {
        self.tx.send(notification)?;
        Ok(())
    }

    pub fn notify_receiver(&self) -> Receiver<Notification> {
        self.rx.resubscribe()
    }

    pub fn send_message(&self, message: Message) -> Result<()> {
        self.send(Notification::Message { message })
    }

    pub fn send_error(&self, message: impl Into<String>) -> Result<()> {
        self.send_message(Message::Error(message.into()))
    }

    pub fn send_warning(&self, message: impl Into<String>) -> Result<()> {
        self.send_message(Message::Warning(message.into()))
    }
}

impl Default for Broadcast {
    fn default() -> Self {
        Self::new()
    }
}
