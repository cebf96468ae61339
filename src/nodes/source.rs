use crate::core::{Node, Outbox, Token};
use anyhow::{bail, Result};

/// Source node emitting the items of an iterator, one per `service` call.
///
/// The iterator is rebuilt from the factory on every `init`, so each run of a
/// topology replays the same stream.
pub struct IterSource<F, I> {
    factory: F,
    iter: Option<I>,
}

impl<F, I> IterSource<F, I>
where
    F: FnMut() -> I,
{
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            iter: None,
        }
    }
}

impl<T, F, I> Node<T> for IterSource<F, I>
where
    T: Send,
    F: FnMut() -> I + Send,
    I: Iterator<Item = T> + Send,
{
    fn init(&mut self) -> Result<()> {
        self.iter = Some((self.factory)());
        Ok(())
    }

    fn service(&mut self, input: Option<T>, out: &mut Outbox<'_, T>) -> Result<Token> {
        if input.is_some() {
            bail!("IterSource must be the first stage of a pipeline");
        }
        let Some(iter) = self.iter.as_mut() else {
            bail!("IterSource serviced before init");
        };
        match iter.next() {
            Some(item) => {
                out.send(item)?;
                Ok(Token::Continue)
            }
            None => Ok(Token::EndOfStream),
        }
    }

    fn end(&mut self) -> Result<()> {
        self.iter = None;
        Ok(())
    }
}
