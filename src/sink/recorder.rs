use std::{cell::RefCell, rc::Rc};

use super::{Filter, ParamId};
use crate::message::Message;

#[doc = r#"
A terminal link that keeps every message it receives.

Clones share one log, so a clone can be moved into a [`FilterChain`](super::FilterChain)
while the first handle is used to look at what arrived.
"#]
#[derive(Debug, Clone)]
pub struct Recorder {
    log: Rc<RefCell<Vec<Message>>>,
    level: i64,
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Recorder {
    /// An empty recorder at full output level
    pub fn new() -> Self {
        Self {
            log: Rc::default(),
            level: 100,
        }
    }

    /// Everything received so far
    pub fn messages(&self) -> Vec<Message> {
        self.log.borrow().clone()
    }

    /// Number of messages received
    pub fn len(&self) -> usize {
        self.log.borrow().len()
    }

    /// True if nothing was received
    pub fn is_empty(&self) -> bool {
        self.log.borrow().is_empty()
    }

    /// Forget everything received
    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }
}

impl Filter for Recorder {
    fn is_available(&self, param: ParamId) -> bool {
        param == ParamId::OutputLevel
    }

    fn get_param(&self, param: ParamId) -> Option<i64> {
        (param == ParamId::OutputLevel).then_some(self.level)
    }

    fn set_param(&mut self, param: ParamId, value: i64) -> bool {
        if param != ParamId::OutputLevel || !(0..=100).contains(&value) {
            return false;
        }
        self.level = value;
        true
    }

    fn send(&mut self, message: Message) -> Option<Message> {
        self.log.borrow_mut().push(message);
        None
    }
}
