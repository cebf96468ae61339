use crate::core::{Node, Outbox, Token};
use anyhow::Result;
use std::sync::{Arc, Mutex, MutexGuard};

/// Appends every item it receives to a vector shared with the caller.
/// The vector is cleared when a run starts.
pub struct Collect<T> {
    items: Arc<Mutex<Vec<T>>>,
}

impl<T> Collect<T> {
    pub fn new(items: Arc<Mutex<Vec<T>>>) -> Self {
        Self { items }
    }

    /// A collector together with the handle to read its items back
    pub fn shared() -> (Self, Arc<Mutex<Vec<T>>>) {
        let items = Arc::new(Mutex::new(Vec::new()));
        (Self::new(items.clone()), items)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        // A panicking hook elsewhere must not hide what was collected
        self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T: Send> Node<T> for Collect<T> {
    fn init(&mut self) -> Result<()> {
        self.lock().clear();
        Ok(())
    }

    fn service(&mut self, input: Option<T>, _out: &mut Outbox<'_, T>) -> Result<Token> {
        match input {
            Some(item) => {
                self.lock().push(item);
                Ok(Token::Continue)
            }
            None => Ok(Token::EndOfStream),
        }
    }
}
