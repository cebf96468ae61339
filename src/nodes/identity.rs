use crate::core::{Node, Outbox, Token};
use anyhow::Result;

/// Forwards every item unchanged. Farms use it as their default emitter.
#[derive(Debug, Default, Clone, Copy)]
pub struct Identity;

impl<T: Send> Node<T> for Identity {
    fn service(&mut self, input: Option<T>, out: &mut Outbox<'_, T>) -> Result<Token> {
        match input {
            Some(item) => {
                out.send(item)?;
                Ok(Token::Continue)
            }
            None => Ok(Token::EndOfStream),
        }
    }
}
