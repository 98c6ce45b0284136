//! The cell - observable state container
//!
//! # Consistency
//!
//! Every publish produces a numbered snapshot `(version, previous, current)`
//! that travels through the publication with the notification. Each
//! subscription diffs its selection of `current` against its selection of
//! the last state it evaluated. Outside of re-entrancy that baseline is
//! exactly the snapshot's `previous`.
//!
//! # Re-entrancy
//!
//! Nested publishes resolve depth-first: a publish issued from inside a
//! subscriber fans out completely before the outer pass resumes. When it
//! does resume, subscriptions that already evaluated the newer snapshot
//! are skipped. A subscriber therefore never receives an older state after
//! a newer one, and never misses a change made by the outer publish: the
//! nested pass compared against the state it had last seen.

use std::cell::RefCell;
use std::fmt::{self, Debug};
use std::rc::{Rc, Weak};

use recell_core::{
    CellConfig, LogAction, RecellError, RecellResult, SelectedLog, ANONYMOUS_SUBSCRIBER,
};
use recell_publication::{Publication, Unsubscribe};

use crate::logger::Logger;
use crate::subscription::Subscription;

/// State pair produced by one publish
struct Snapshot<S> {
    /// Completed publishes so far; 0 for the initial state
    version: u64,
    previous: Rc<S>,
    current: Rc<S>,
}

impl<S> Clone for Snapshot<S> {
    fn clone(&self) -> Self {
        Snapshot {
            version: self.version,
            previous: Rc::clone(&self.previous),
            current: Rc::clone(&self.current),
        }
    }
}

struct CellInner<S> {
    snapshot: RefCell<Snapshot<S>>,
    publication: Publication<Snapshot<S>>,
    logger: Rc<Logger>,
}

/// Observable state container.
///
/// `Cell` is a cheap handle; clones share the same state. Subscribers that
/// need to publish back into their own cell should hold a [`WeakCell`],
/// otherwise the cell keeps itself alive until they unsubscribe.
pub struct Cell<S> {
    inner: Rc<CellInner<S>>,
}

/// Non-owning handle to a [`Cell`]
pub struct WeakCell<S> {
    inner: Weak<CellInner<S>>,
}

impl<S: Debug + 'static> Cell<S> {
    /// Create an unnamed cell with logging disabled
    pub fn new(initial: S) -> Self {
        Self::with_config(initial, CellConfig::default())
    }

    pub fn with_config(initial: S, config: CellConfig) -> Self {
        let initial = Rc::new(initial);
        let publication = match &config.name {
            Some(name) => Publication::named(name.clone()),
            None => Publication::new(),
        };

        let cell = Cell {
            inner: Rc::new(CellInner {
                snapshot: RefCell::new(Snapshot {
                    version: 0,
                    previous: Rc::clone(&initial),
                    current: initial,
                }),
                publication,
                logger: Rc::new(Logger::new(&config)),
            }),
        };

        cell.log_state(LogAction::Create, None);
        cell
    }

    /// Diagnostic name, `"Unknown"` when none was configured
    pub fn name(&self) -> &str {
        self.inner.logger.cell()
    }

    pub fn logging_enabled(&self) -> bool {
        self.inner.logger.is_enabled()
    }

    /// Latest state
    pub fn state(&self) -> Rc<S> {
        Rc::clone(&self.inner.snapshot.borrow().current)
    }

    /// State before the last completed publish
    pub fn previous_state(&self) -> Rc<S> {
        Rc::clone(&self.inner.snapshot.borrow().previous)
    }

    /// Number of completed publishes
    pub fn version(&self) -> u64 {
        self.inner.snapshot.borrow().version
    }

    /// Project the latest state
    pub fn select<Sel>(&self, selector: impl FnOnce(&S) -> Sel) -> Sel {
        let state = self.state();
        selector(&state)
    }

    /// Number of active subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.inner.publication.len()
    }

    pub fn downgrade(&self) -> WeakCell<S> {
        WeakCell {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Replace the state with `reducer(current)` and notify subscribers
    pub fn publish(&self, reducer: impl FnOnce(&S) -> S) {
        let current = self.state();
        let next = reducer(&current);
        self.commit(next);
    }

    /// Like [`Cell::publish`], but the reducer may produce no state.
    ///
    /// An absent state is rejected before anything is committed: the
    /// cell keeps its state and nobody is notified.
    pub fn try_publish(&self, reducer: impl FnOnce(&S) -> Option<S>) -> RecellResult<()> {
        let current = self.state();
        let next = reducer(&current).ok_or(RecellError::InvalidState)?;
        self.commit(next);
        Ok(())
    }

    fn commit(&self, next: S) {
        let snapshot = {
            let mut snapshot = self.inner.snapshot.borrow_mut();
            let previous = std::mem::replace(&mut snapshot.current, Rc::new(next));
            snapshot.previous = previous;
            snapshot.version += 1;
            snapshot.clone()
        };
        tracing::trace!(
            cell = self.name(),
            version = snapshot.version,
            subscribers = self.subscriber_count(),
            "publish"
        );

        self.inner.logger.log(
            LogAction::Publish,
            &*snapshot.current,
            &*snapshot.previous,
            None,
            None,
        );
        self.inner.publication.publish(&snapshot);
    }

    /// Subscribe to the whole state, compared by value.
    ///
    /// `subscriber` runs once with the current state before this returns.
    pub fn subscribe(&self, subscriber: impl Fn(&Rc<S>) + 'static) -> Unsubscribe
    where
        S: PartialEq,
    {
        self.subscribe_with(Subscription::new(subscriber))
    }

    /// Register a subscription.
    ///
    /// The subscriber runs once with the current selection before this
    /// returns, then after every publish whose selection the comparator
    /// reports as changed.
    pub fn subscribe_with<Sel: Debug + 'static>(
        &self,
        subscription: Subscription<S, Sel>,
    ) -> Unsubscribe {
        let Subscription {
            name,
            subscriber,
            selector,
            comparator,
            ..
        } = subscription;
        let name: Rc<str> = Rc::from(name.as_deref().unwrap_or(ANONYMOUS_SUBSCRIBER));

        self.log_state(LogAction::Subscribe, Some(&*name));

        let evaluated = {
            let snapshot = self.inner.snapshot.borrow();
            RefCell::new((snapshot.version, Rc::clone(&snapshot.current)))
        };
        let dispatch = {
            let logger = Rc::clone(&self.inner.logger);
            let name = Rc::clone(&name);
            let subscriber = Rc::clone(&subscriber);
            let selector = Rc::clone(&selector);

            move |snapshot: &Snapshot<S>| {
                let baseline = {
                    let mut evaluated = evaluated.borrow_mut();
                    // Already brought up to date by a nested publish
                    if snapshot.version <= evaluated.0 {
                        return;
                    }
                    let next = (snapshot.version, Rc::clone(&snapshot.current));
                    std::mem::replace(&mut *evaluated, next).1
                };

                let previous = selector(&baseline);
                let current = selector(&snapshot.current);
                if comparator(&current, &previous) {
                    return;
                }

                logger.log(
                    LogAction::Notify,
                    &*snapshot.current,
                    &*snapshot.previous,
                    Some(SelectedLog {
                        current: &current,
                        previous: &previous,
                    }),
                    Some(&*name),
                );
                subscriber(&current);
            }
        };
        let detach = self.inner.publication.subscribe(dispatch);

        // Initial notify: always fires, the selection is its own previous
        let snapshot = self.inner.snapshot.borrow().clone();
        let selected = selector(&snapshot.current);
        self.inner.logger.log(
            LogAction::Notify,
            &*snapshot.current,
            &*snapshot.previous,
            Some(SelectedLog {
                current: &selected,
                previous: &selected,
            }),
            Some(&*name),
        );
        subscriber(&selected);

        let cell = self.downgrade();
        Unsubscribe::new(move || {
            if let Some(cell) = cell.upgrade() {
                tracing::trace!(cell = cell.name(), subscriber = &*name, "unsubscribe");
                cell.log_state(LogAction::Unsubscribe, Some(&*name));
            }
            detach.unsubscribe();
        })
    }

    fn log_state(&self, action: LogAction, subscriber: Option<&str>) {
        if !self.inner.logger.is_enabled() {
            return;
        }
        let snapshot = self.inner.snapshot.borrow().clone();
        self.inner.logger.log(
            action,
            &*snapshot.current,
            &*snapshot.previous,
            None,
            subscriber,
        );
    }
}

impl<S> Clone for Cell<S> {
    fn clone(&self) -> Self {
        Cell {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: Debug> Debug for Cell<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.inner.snapshot.borrow();
        f.debug_struct("Cell")
            .field("name", &self.inner.logger.cell())
            .field("version", &snapshot.version)
            .field("state", &snapshot.current)
            .finish()
    }
}

impl<S> WeakCell<S> {
    pub fn upgrade(&self) -> Option<Cell<S>> {
        self.inner.upgrade().map(|inner| Cell { inner })
    }
}

impl<S> Clone for WeakCell<S> {
    fn clone(&self) -> Self {
        WeakCell {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<S> Debug for WeakCell<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakCell")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}
