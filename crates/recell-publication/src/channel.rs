//! Publication channel

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::Unsubscribe;

/// One registration on a channel
struct Entry<T> {
    id: u64,
    active: Cell<bool>,
    callback: Box<dyn Fn(&T)>,
}

/// Shared channel state; the only strong owner is the `Publication`
struct Channel<T> {
    name: Option<String>,
    next_id: Cell<u64>,
    entries: RefCell<Vec<Rc<Entry<T>>>>,
}

impl<T> Channel<T> {
    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed")
    }

    fn remove(&self, id: u64) {
        let removed = {
            let mut entries = self.entries.borrow_mut();
            let pos = entries.iter().position(|e| e.id == id);
            pos.map(|pos| entries.remove(pos))
        };
        // Dropped outside the borrow: the callback's captures may touch this channel
        if let Some(entry) = removed {
            // A pass already in flight holds its own snapshot
            entry.active.set(false);
            tracing::trace!(channel = self.label(), id, "unsubscribed");
        }
    }
}

/// Synchronous fan-out channel.
///
/// INVARIANT: callbacks run in registration order, and every pass runs
/// to completion before `publish` returns.
pub struct Publication<T> {
    channel: Rc<Channel<T>>,
}

impl<T: 'static> Publication<T> {
    /// Create an unnamed channel
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Create a channel with a diagnostic name
    pub fn named(name: impl Into<String>) -> Self {
        Self::build(Some(name.into()))
    }

    fn build(name: Option<String>) -> Self {
        Publication {
            channel: Rc::new(Channel {
                name,
                next_id: Cell::new(0),
                entries: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.channel.name.as_deref()
    }

    /// Deliver `value` to every active subscriber.
    ///
    /// The pass works on the registrations present when it starts.
    /// Callbacks may publish again; the nested pass finishes before this
    /// one moves to the next subscriber.
    pub fn publish(&self, value: &T) {
        let snapshot: Vec<Rc<Entry<T>>> = self.channel.entries.borrow().clone();

        for entry in snapshot {
            // Skip anything unsubscribed earlier in this pass
            if entry.active.get() {
                (entry.callback)(value);
            }
        }
    }

    /// Register `callback` and return its detach handle
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Unsubscribe {
        let id = self.channel.next_id.get();
        self.channel.next_id.set(id + 1);

        self.channel.entries.borrow_mut().push(Rc::new(Entry {
            id,
            active: Cell::new(true),
            callback: Box::new(callback),
        }));
        tracing::trace!(channel = self.channel.label(), id, "subscribed");

        let channel: Weak<Channel<T>> = Rc::downgrade(&self.channel);
        Unsubscribe::new(move || {
            // The channel may already be gone with its owner
            if let Some(channel) = channel.upgrade() {
                channel.remove(id);
            }
        })
    }

    /// Number of active subscriptions
    pub fn len(&self) -> usize {
        self.channel.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.entries.borrow().is_empty()
    }
}

impl<T: 'static> Default for Publication<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Publication<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Publication")
            .field("name", &self.channel.name)
            .field("subscribers", &self.channel.entries.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&str) -> Box<dyn Fn(&u32)>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        let make = move |tag: &str| -> Box<dyn Fn(&u32)> {
            let sink = sink.clone();
            let tag = tag.to_string();
            Box::new(move |v: &u32| sink.borrow_mut().push(format!("{tag}:{v}")))
        };
        (log, make)
    }

    #[test]
    fn test_fan_out_in_registration_order() {
        let publication = Publication::named("numbers");
        let (log, make) = recorder();

        let _a = publication.subscribe(make("a"));
        let _b = publication.subscribe(make("b"));
        let _c = publication.subscribe(make("c"));

        publication.publish(&1);
        publication.publish(&2);

        assert_eq!(*log.borrow(), ["a:1", "b:1", "c:1", "a:2", "b:2", "c:2"]);
        assert_eq!(publication.len(), 3);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let publication = Publication::new();
        let (log, make) = recorder();

        let a = publication.subscribe(make("a"));
        let _b = publication.subscribe(make("b"));

        publication.publish(&1);
        a.unsubscribe();
        a.unsubscribe();
        publication.publish(&2);

        assert_eq!(*log.borrow(), ["a:1", "b:1", "b:2"]);
        assert_eq!(publication.len(), 1);
    }

    #[test]
    fn test_unsubscribe_during_pass_skips_later_entry() {
        let publication = Rc::new(Publication::new());
        let (log, make) = recorder();

        let later: Rc<RefCell<Option<Unsubscribe>>> = Rc::new(RefCell::new(None));
        let handle = later.clone();
        let _first = publication.subscribe(move |_: &u32| {
            if let Some(h) = handle.borrow().as_ref() {
                h.unsubscribe();
            }
        });
        *later.borrow_mut() = Some(publication.subscribe(make("later")));

        publication.publish(&7);

        assert!(log.borrow().is_empty());
        assert_eq!(publication.len(), 1);
    }

    #[test]
    fn test_subscribe_during_pass_waits_for_next_pass() {
        let publication = Rc::new(Publication::new());
        let (log, make) = recorder();

        let pending: Rc<RefCell<Vec<Unsubscribe>>> = Rc::new(RefCell::new(Vec::new()));
        let inner = Rc::downgrade(&publication);
        let keep = pending.clone();
        let make = Rc::new(make);
        let make_inner = make.clone();
        let _first = publication.subscribe(move |v: &u32| {
            if *v == 1 {
                if let Some(p) = inner.upgrade() {
                    keep.borrow_mut().push(p.subscribe(make_inner("late")));
                }
            }
        });

        publication.publish(&1);
        publication.publish(&2);

        assert_eq!(*log.borrow(), ["late:2"]);
    }

    #[test]
    fn test_nested_publish_is_depth_first() {
        let publication = Rc::new(Publication::new());
        let (log, make) = recorder();

        let weak = Rc::downgrade(&publication);
        let _first = publication.subscribe(move |v: &u32| {
            if *v == 1 {
                if let Some(p) = weak.upgrade() {
                    p.publish(&2);
                }
            }
        });
        let _second = publication.subscribe(make("second"));

        publication.publish(&1);

        assert_eq!(*log.borrow(), ["second:2", "second:1"]);
    }

    #[test]
    fn test_unsubscribe_after_owner_dropped() {
        let publication = Publication::<u32>::new();
        let handle = publication.subscribe(|_| {});
        drop(publication);

        handle.unsubscribe();
        assert!(!handle.is_active());
    }

    proptest! {
        #[test]
        fn prop_survivors_keep_order(count in 1usize..12, removed in proptest::collection::vec(any::<bool>(), 12)) {
            let publication = Publication::new();
            let (log, make) = recorder();

            let handles: Vec<_> = (0..count)
                .map(|i| publication.subscribe(make(&i.to_string())))
                .collect();
            for (i, handle) in handles.iter().enumerate() {
                if removed[i] {
                    handle.unsubscribe();
                }
            }

            publication.publish(&0);

            let expected: Vec<String> = (0..count)
                .filter(|i| !removed[*i])
                .map(|i| format!("{i}:0"))
                .collect();
            prop_assert_eq!(log.borrow().clone(), expected);
        }
    }
}
