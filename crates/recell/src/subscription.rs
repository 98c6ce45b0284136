//! Subscription builder
//!
//! A subscription bundles the subscriber with the selector that projects
//! the state it cares about and the comparator that decides whether a
//! projection changed.
//!
//! Comparator resolution: an explicit [`Subscription::are_equal`] wins over
//! a scope [`Configuration`], which wins over `PartialEq`.

use std::fmt;
use std::rc::Rc;

use recell_core::{Configuration, EqualityPolicy, ANONYMOUS_SUBSCRIBER};

pub(crate) type Selector<S, Sel> = Rc<dyn Fn(&Rc<S>) -> Sel>;
pub(crate) type Comparator<Sel> = Rc<dyn Fn(&Sel, &Sel) -> bool>;
pub(crate) type Subscriber<Sel> = Rc<dyn Fn(&Sel)>;

fn value_comparator<Sel: PartialEq + 'static>() -> Comparator<Sel> {
    Rc::new(|current: &Sel, previous: &Sel| current == previous)
}

/// Everything `Cell::subscribe_with` needs to register a subscriber
pub struct Subscription<S, Sel> {
    pub(crate) name: Option<String>,
    pub(crate) subscriber: Subscriber<Sel>,
    pub(crate) selector: Selector<S, Sel>,
    pub(crate) comparator: Comparator<Sel>,
    explicit_comparator: bool,
}

impl<S: 'static> Subscription<S, Rc<S>> {
    /// Subscribe to the whole state, compared by value
    pub fn new(subscriber: impl Fn(&Rc<S>) + 'static) -> Self
    where
        S: PartialEq,
    {
        Subscription {
            name: None,
            subscriber: Rc::new(subscriber),
            selector: Rc::new(|state: &Rc<S>| Rc::clone(state)),
            comparator: value_comparator(),
            explicit_comparator: false,
        }
    }

    /// Subscribe to the whole state with a custom comparator.
    ///
    /// No `PartialEq` is needed on the state; `are_equal` receives the
    /// `Rc`s the cell holds, so `Rc::ptr_eq` works as a comparator.
    pub fn comparing_state(
        are_equal: impl Fn(&Rc<S>, &Rc<S>) -> bool + 'static,
        subscriber: impl Fn(&Rc<S>) + 'static,
    ) -> Self {
        Subscription {
            name: None,
            subscriber: Rc::new(subscriber),
            selector: Rc::new(|state: &Rc<S>| Rc::clone(state)),
            comparator: Rc::new(are_equal),
            explicit_comparator: true,
        }
    }
}

impl<S: 'static, Sel: 'static> Subscription<S, Sel> {
    /// Subscribe to a projection of the state, compared by value
    pub fn selecting(
        selector: impl Fn(&S) -> Sel + 'static,
        subscriber: impl Fn(&Sel) + 'static,
    ) -> Self
    where
        Sel: PartialEq,
    {
        Subscription {
            name: None,
            subscriber: Rc::new(subscriber),
            selector: Rc::new(move |state: &Rc<S>| selector(&**state)),
            comparator: value_comparator(),
            explicit_comparator: false,
        }
    }

    /// Subscribe to a projection with a custom comparator.
    ///
    /// `are_equal(current, previous)` returns `true` when nothing changed.
    pub fn comparing(
        selector: impl Fn(&S) -> Sel + 'static,
        are_equal: impl Fn(&Sel, &Sel) -> bool + 'static,
        subscriber: impl Fn(&Sel) + 'static,
    ) -> Self {
        Subscription {
            name: None,
            subscriber: Rc::new(subscriber),
            selector: Rc::new(move |state: &Rc<S>| selector(&**state)),
            comparator: Rc::new(are_equal),
            explicit_comparator: true,
        }
    }

    /// Override the comparator for this call site
    pub fn are_equal(mut self, are_equal: impl Fn(&Sel, &Sel) -> bool + 'static) -> Self {
        self.comparator = Rc::new(are_equal);
        self.explicit_comparator = true;
        self
    }

    /// Use the scope's default comparator unless this call site has its own.
    ///
    /// Only available when the selection is `PartialEq`, the bound every
    /// [`EqualityPolicy`] works under.
    pub fn within<P>(mut self, configuration: &Configuration<P>) -> Self
    where
        P: EqualityPolicy + Clone + 'static,
        Sel: PartialEq,
    {
        if !self.explicit_comparator {
            let configuration = configuration.clone();
            self.comparator = Rc::new(move |current: &Sel, previous: &Sel| {
                configuration.are_equal(current, previous)
            });
        }
        self
    }

    /// Name reported in log metadata
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(ANONYMOUS_SUBSCRIBER)
    }

    /// Apply the selector
    pub fn select(&self, state: &Rc<S>) -> Sel {
        (self.selector)(state)
    }

    /// Apply the comparator
    pub fn are_unchanged(&self, current: &Sel, previous: &Sel) -> bool {
        (self.comparator)(current, previous)
    }
}

impl<S, Sel> fmt::Debug for Subscription<S, Sel> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("name", &self.name)
            .field("explicit_comparator", &self.explicit_comparator)
            .finish()
    }
}
