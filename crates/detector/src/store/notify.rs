//! Watcher fan-out shared by the store backends

use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};

use super::traits::StoreChange;

/// Registry of change watchers
///
/// Senders whose receiver has been dropped are pruned during notify, so a
/// torn-down context never blocks or poisons the others.
pub struct ChangeHub {
    watchers: Mutex<Vec<Sender<StoreChange>>>,
}

impl ChangeHub {
    pub fn new() -> Self {
        Self {
            watchers: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe(&self) -> Receiver<StoreChange> {
        let (tx, rx) = mpsc::channel();
        self.watchers.lock().unwrap().push(tx);
        rx
    }

    pub fn notify(&self, change: StoreChange) {
        let mut watchers = self.watchers.lock().unwrap();
        watchers.retain(|tx| tx.send(change.clone()).is_ok());
    }
}

impl Default for ChangeHub {
    fn default() -> Self {
        Self::new()
    }
}
