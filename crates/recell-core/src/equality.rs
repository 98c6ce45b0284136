//! Equality policies for selected state
//!
//! A comparator receives `(current, previous)` selected values and returns
//! `true` when the selection is unchanged (notification suppressed) and
//! `false` when it changed (subscriber notified).

/// Scope-wide default comparator.
///
/// Used for every subscription created within a [`Configuration`] that
/// does not supply its own comparator.
///
/// Policies are generic over `T: PartialEq`, so a scope default only
/// applies to selections that implement `PartialEq`. Selections without
/// it need a call-site comparator.
pub trait EqualityPolicy {
    fn are_equal<T: PartialEq>(&self, current: &T, previous: &T) -> bool;
}

/// `current == previous`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValueEquality;

impl EqualityPolicy for ValueEquality {
    #[inline]
    fn are_equal<T: PartialEq>(&self, current: &T, previous: &T) -> bool {
        current == previous
    }
}

/// Treats every publish as a change
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlwaysChanged;

impl EqualityPolicy for AlwaysChanged {
    #[inline]
    fn are_equal<T: PartialEq>(&self, _current: &T, _previous: &T) -> bool {
        false
    }
}

/// Explicit context object carrying the default comparator for a scope.
///
/// Passed down the call chain to wherever subscriptions are created,
/// instead of being looked up implicitly.
#[derive(Debug, Clone, Copy, Default)]
pub struct Configuration<P: EqualityPolicy = ValueEquality> {
    policy: P,
}

impl Configuration<ValueEquality> {
    pub fn new() -> Self {
        Configuration::default()
    }
}

impl<P: EqualityPolicy> Configuration<P> {
    /// Configure a scope with a custom default comparator
    pub fn with_policy(policy: P) -> Self {
        Configuration { policy }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    #[inline]
    pub fn are_equal<T: PartialEq>(&self, current: &T, previous: &T) -> bool {
        self.policy.are_equal(current, previous)
    }
}
