//! Recording subscribers

use std::cell::RefCell;
use std::rc::Rc;

/// Records every value handed to its subscriber closures.
///
/// Clones share the same record, so a probe can be moved into a
/// subscription while the test keeps a handle for assertions.
#[derive(Debug)]
pub struct Probe<T> {
    calls: Rc<RefCell<Vec<T>>>,
}

impl<T: Clone + 'static> Probe<T> {
    pub fn new() -> Self {
        Probe {
            calls: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// A subscriber that appends each value it receives
    pub fn subscriber(&self) -> impl Fn(&T) + 'static {
        let calls = Rc::clone(&self.calls);
        move |value: &T| calls.borrow_mut().push(value.clone())
    }

    /// Everything received so far, oldest first
    pub fn calls(&self) -> Vec<T> {
        self.calls.borrow().clone()
    }

    pub fn count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn last(&self) -> Option<T> {
        self.calls.borrow().last().cloned()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl<T: Clone + 'static> Default for Probe<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Probe<T> {
    fn clone(&self) -> Self {
        Probe {
            calls: Rc::clone(&self.calls),
        }
    }
}
