use crate::core::{Node, Outbox, Token};
use anyhow::Result;
use std::fmt::Debug;

/// Logs every item and forwards it unchanged
pub struct Inspect {
    label: String,
    seen: u64,
}

impl Inspect {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            seen: 0,
        }
    }
}

impl<T: Send + Debug> Node<T> for Inspect {
    fn init(&mut self) -> Result<()> {
        self.seen = 0;
        Ok(())
    }

    fn service(&mut self, input: Option<T>, out: &mut Outbox<'_, T>) -> Result<Token> {
        let Some(item) = input else {
            return Ok(Token::EndOfStream);
        };
        self.seen += 1;
        tracing::info!(label = %self.label, seq = self.seen, item = ?item, "item");
        out.send(item)?;
        Ok(Token::Continue)
    }

    fn end(&mut self) -> Result<()> {
        tracing::debug!(label = %self.label, items = self.seen, "inspect finished");
        Ok(())
    }
}
