use crate::core::{Node, Outbox, Token};
use anyhow::Result;

type ServiceFn<T, S> = Box<dyn FnMut(&mut S, Option<T>, &mut Outbox<'_, T>) -> Result<Token> + Send>;
type HookFn<S> = Box<dyn FnMut(&mut S) -> Result<()> + Send>;
type NotifyFn<T, S> = Box<dyn FnMut(&mut S, &mut Outbox<'_, T>) -> Result<()> + Send>;

/// A node built from closures over private state `S`.
///
/// `service` is required. The other hooks are only run when they were set.
/// Every `init` first restores the state given at construction, so each run
/// of a topology starts from it:
///
/// ```
/// use skelflow::core::Token;
/// use skelflow::nodes::FnNode;
///
/// let summing = FnNode::new(0i64, |sum, item: Option<i64>, _out| {
///     *sum += item.unwrap_or_default();
///     Ok(Token::Continue)
/// })
/// .on_init(|sum| {
///     *sum = 0;
///     Ok(())
/// });
/// assert_eq!(*summing.state(), 0);
/// ```
pub struct FnNode<T, S> {
    initial: S,
    state: S,
    service: ServiceFn<T, S>,
    on_init: Option<HookFn<S>>,
    on_end: Option<HookFn<S>>,
    on_end_of_stream: Option<NotifyFn<T, S>>,
}

impl<T, S: Clone> FnNode<T, S> {
    pub fn new<F>(state: S, service: F) -> Self
    where
        F: FnMut(&mut S, Option<T>, &mut Outbox<'_, T>) -> Result<Token> + Send + 'static,
    {
        Self {
            initial: state.clone(),
            state,
            service: Box::new(service),
            on_init: None,
            on_end: None,
            on_end_of_stream: None,
        }
    }

    pub fn on_init<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&mut S) -> Result<()> + Send + 'static,
    {
        self.on_init = Some(Box::new(hook));
        self
    }

    pub fn on_end<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&mut S) -> Result<()> + Send + 'static,
    {
        self.on_end = Some(Box::new(hook));
        self
    }

    pub fn on_end_of_stream<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&mut S, &mut Outbox<'_, T>) -> Result<()> + Send + 'static,
    {
        self.on_end_of_stream = Some(Box::new(hook));
        self
    }

    pub fn state(&self) -> &S {
        &self.state
    }
}

impl<T> FnNode<T, ()> {
    pub fn stateless<F>(mut service: F) -> Self
    where
        F: FnMut(Option<T>, &mut Outbox<'_, T>) -> Result<Token> + Send + 'static,
    {
        Self::new((), move |_, input, out| service(input, out))
    }
}

impl<T, S: Clone + Send> Node<T> for FnNode<T, S> {
    fn init(&mut self) -> Result<()> {
        self.state = self.initial.clone();
        match self.on_init.as_mut() {
            Some(hook) => hook(&mut self.state),
            None => Ok(()),
        }
    }

    fn service(&mut self, input: Option<T>, out: &mut Outbox<'_, T>) -> Result<Token> {
        (self.service)(&mut self.state, input, out)
    }

    fn end_of_stream_notify(&mut self, out: &mut Outbox<'_, T>) -> Result<()> {
        match self.on_end_of_stream.as_mut() {
            Some(hook) => hook(&mut self.state, out),
            None => Ok(()),
        }
    }

    fn end(&mut self) -> Result<()> {
        match self.on_end.as_mut() {
            Some(hook) => hook(&mut self.state),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::NodeMetrics;

    #[test]
    fn test_absent_hooks_are_noops() {
        let mut node: FnNode<u8, u32> = FnNode::new(7, |calls, _input, _out| {
            *calls += 1;
            Ok(Token::Continue)
        });
        let metrics = NodeMetrics::new("fn");
        let mut out = Outbox::new("fn", &[], false, &metrics);

        node.init().unwrap();
        node.service(Some(1), &mut out).unwrap();
        node.end_of_stream_notify(&mut out).unwrap();
        node.end().unwrap();

        assert_eq!(*node.state(), 8);
    }

    #[test]
    fn test_hooks_see_state() {
        let mut node: FnNode<u8, Vec<&'static str>> = FnNode::new(Vec::new(), |log, _input, _out| {
            log.push("service");
            Ok(Token::EndOfStream)
        })
        .on_init(|log| {
            log.clear();
            log.push("init");
            Ok(())
        })
        .on_end(|log| {
            log.push("end");
            Ok(())
        });
        let metrics = NodeMetrics::new("fn");
        let mut out = Outbox::new("fn", &[], false, &metrics);

        node.init().unwrap();
        assert_eq!(node.service(None, &mut out).unwrap(), Token::EndOfStream);
        node.end().unwrap();

        assert_eq!(node.state(), &vec!["init", "service", "end"]);
    }

    #[test]
    fn test_init_restores_initial_state() {
        let mut node: FnNode<u8, u32> = FnNode::new(0, |calls, _input, _out| {
            *calls += 1;
            Ok(Token::Continue)
        });
        let metrics = NodeMetrics::new("fn");
        let mut out = Outbox::new("fn", &[], false, &metrics);

        for _ in 0..2 {
            node.init().unwrap();
            node.service(Some(1), &mut out).unwrap();
            node.service(Some(2), &mut out).unwrap();
            assert_eq!(*node.state(), 2);
        }
    }
}
