use crate::core::{Node, Outbox, Token};
use anyhow::Result;

/// Emits exactly one item per input item
pub struct Map<F> {
    f: F,
}

impl<F> Map<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<T, F> Node<T> for Map<F>
where
    T: Send,
    F: FnMut(T) -> T + Send,
{
    fn service(&mut self, input: Option<T>, out: &mut Outbox<'_, T>) -> Result<Token> {
        let Some(item) = input else {
            // Placed first in a pipeline there is nothing to map
            return Ok(Token::EndOfStream);
        };
        out.send((self.f)(item))?;
        Ok(Token::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Channel, Message};
    use crate::observability::NodeMetrics;

    #[test]
    fn test_map_applies_function() {
        let metrics = NodeMetrics::new("double");
        let output = Channel::new(4);
        let outputs = [&output];
        let mut out = Outbox::new("double", &outputs, false, &metrics);
        let mut node = Map::new(|x: i64| x * 2);

        assert_eq!(node.service(Some(21), &mut out).unwrap(), Token::Continue);
        assert_eq!(node.service(None, &mut out).unwrap(), Token::EndOfStream);
        assert_eq!(output.pop(), Message::Data(42));
    }
}
