//! Unsubscribe handle

use std::cell::RefCell;
use std::fmt;

/// Detaches one subscription.
///
/// The first call to [`Unsubscribe::unsubscribe`] runs the detach action;
/// every later call is a no-op. Dropping the handle does not unsubscribe.
#[must_use = "dropping the handle leaves the subscription active forever"]
pub struct Unsubscribe {
    detach: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl Unsubscribe {
    pub fn new(detach: impl FnOnce() + 'static) -> Self {
        Unsubscribe {
            detach: RefCell::new(Some(Box::new(detach))),
        }
    }

    /// A handle with nothing left to detach
    pub fn detached() -> Self {
        Unsubscribe {
            detach: RefCell::new(None),
        }
    }

    /// Detach the subscription. Safe to call any number of times.
    pub fn unsubscribe(&self) {
        // Release the borrow before running: detaching may re-enter.
        let detach = self.detach.borrow_mut().take();
        if let Some(detach) = detach {
            detach();
        }
    }

    /// True until the first `unsubscribe`
    pub fn is_active(&self) -> bool {
        self.detach.borrow().is_some()
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe")
            .field("active", &self.is_active())
            .finish()
    }
}
