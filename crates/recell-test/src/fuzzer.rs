//! Cell Fuzzer - Randomized checking of notification invariants
//!
//! Drives a cell with random publishes, unsubscribes and re-entrant
//! publishes issued from inside a subscriber, then checks:
//! - The final state matches a sequential model of every reducer applied
//! - Every live subscriber's last notification matches the final state
//! - No subscriber is notified twice in a row with an equal selection
//! - Nobody is notified after unsubscribing

use std::cell::RefCell;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use recell::{Cell, CellConfig, Subscription, Unsubscribe};

use crate::probe::Probe;

/// Fuzzer configuration
#[derive(Clone, Debug)]
pub struct FuzzerConfig {
    /// Number of watching subscribers
    pub subscriber_count: usize,
    /// Number of top-level publishes
    pub publish_count: usize,
    /// Probability that a notified reactor publishes again (0.0 - 1.0)
    pub reentrant_prob: f64,
    /// Probability of unsubscribing a watcher after each publish
    pub unsubscribe_prob: f64,
    /// Largest absolute delta applied by one publish
    pub max_delta: i64,
    /// Random seed
    pub seed: u64,
}

impl Default for FuzzerConfig {
    fn default() -> Self {
        FuzzerConfig {
            subscriber_count: 8,
            publish_count: 1000,
            reentrant_prob: 0.3,
            unsubscribe_prob: 0.005,
            max_delta: 2,
            seed: 42,
        }
    }
}

impl FuzzerConfig {
    /// Light fuzzing for quick tests
    pub fn light() -> Self {
        FuzzerConfig {
            subscriber_count: 3,
            publish_count: 100,
            reentrant_prob: 0.2,
            unsubscribe_prob: 0.01,
            max_delta: 1,
            seed: 42,
        }
    }

    /// Heavy fuzzing for thorough testing
    pub fn heavy() -> Self {
        FuzzerConfig {
            subscriber_count: 32,
            publish_count: 10000,
            reentrant_prob: 0.5,
            unsubscribe_prob: 0.002,
            max_delta: 3,
            seed: 42,
        }
    }
}

/// State driven by the fuzzer
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Counters {
    pub a: i64,
    pub b: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    A,
    B,
}

impl Field {
    fn get(self, counters: &Counters) -> i64 {
        match self {
            Field::A => counters.a,
            Field::B => counters.b,
        }
    }

    fn random(rng: &mut StdRng) -> Self {
        if rng.gen_bool(0.5) {
            Field::A
        } else {
            Field::B
        }
    }
}

/// Apply a delta to the cell and to the sequential model
fn apply(cell: &Cell<Counters>, model: &RefCell<Counters>, field: Field, delta: i64) {
    match field {
        Field::A => model.borrow_mut().a += delta,
        Field::B => model.borrow_mut().b += delta,
    }
    cell.publish(|s| match field {
        Field::A => Counters { a: s.a + delta, ..s.clone() },
        Field::B => Counters { b: s.b + delta, ..s.clone() },
    });
}

/// A subscriber watching one field
struct Watcher {
    field: Field,
    probe: Probe<i64>,
    handle: Unsubscribe,
    /// Notifications received before unsubscribing
    detached_at: Option<usize>,
}

/// Outcome of a fuzzing run
#[derive(Clone, Debug, Default)]
pub struct FuzzResult {
    pub publishes: u64,
    pub nested_publishes: u64,
    pub notifications: u64,
    pub unsubscribed: u64,
    pub final_state: Counters,
    pub violations: Vec<String>,
}

impl FuzzResult {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Cell fuzzer
pub struct CellFuzzer {
    config: FuzzerConfig,
    rng: Rc<RefCell<StdRng>>,
}

impl CellFuzzer {
    pub fn new(config: FuzzerConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        CellFuzzer {
            config,
            rng: Rc::new(RefCell::new(rng)),
        }
    }

    pub fn config(&self) -> &FuzzerConfig {
        &self.config
    }

    fn delta(&self) -> i64 {
        let max = self.config.max_delta;
        self.rng.borrow_mut().gen_range(-max..=max)
    }

    /// Run the fuzzer
    pub fn run(&mut self) -> FuzzResult {
        let cell = Cell::with_config(Counters::default(), CellConfig::named("fuzz"));
        let model = Rc::new(RefCell::new(Counters::default()));
        let nested = Rc::new(std::cell::Cell::new(0u64));

        // Registered first so watchers see nested publishes before the
        // outer pass reaches them
        let _reactor = {
            let weak = cell.downgrade();
            let rng = Rc::clone(&self.rng);
            let model = Rc::clone(&model);
            let nested = Rc::clone(&nested);
            let busy = std::cell::Cell::new(false);
            let prob = self.config.reentrant_prob;
            let max = self.config.max_delta;

            cell.subscribe(move |_| {
                if busy.get() || !rng.borrow_mut().gen_bool(prob) {
                    return;
                }
                let Some(cell) = weak.upgrade() else {
                    return;
                };
                let (field, delta) = {
                    let mut rng = rng.borrow_mut();
                    (Field::random(&mut rng), rng.gen_range(-max..=max))
                };

                busy.set(true);
                apply(&cell, &model, field, delta);
                busy.set(false);
                nested.set(nested.get() + 1);
            })
        };

        let mut watchers: Vec<Watcher> = (0..self.config.subscriber_count)
            .map(|i| {
                let field = Field::random(&mut self.rng.borrow_mut());
                let probe = Probe::new();
                let subscription =
                    Subscription::selecting(move |s: &Counters| field.get(s), probe.subscriber())
                        .named(format!("watcher-{i}"));
                let handle = cell.subscribe_with(subscription);
                Watcher {
                    field,
                    probe,
                    handle,
                    detached_at: None,
                }
            })
            .collect();

        let mut result = FuzzResult::default();

        for _ in 0..self.config.publish_count {
            let field = Field::random(&mut self.rng.borrow_mut());
            let delta = self.delta();
            apply(&cell, &model, field, delta);
            result.publishes += 1;

            if self.rng.borrow_mut().gen_bool(self.config.unsubscribe_prob) {
                let index = self.rng.borrow_mut().gen_range(0..watchers.len().max(1));
                if let Some(watcher) = watchers.get_mut(index) {
                    if watcher.detached_at.is_none() {
                        watcher.handle.unsubscribe();
                        watcher.detached_at = Some(watcher.probe.count());
                        result.unsubscribed += 1;
                    }
                }
            }
        }

        let state = cell.state();
        result.nested_publishes = nested.get();
        result.final_state = (*state).clone();

        if *state != *model.borrow() {
            result.violations.push(format!(
                "final state {:?} does not match model {:?}",
                state,
                model.borrow()
            ));
        }

        let expected_version = result.publishes + result.nested_publishes;
        if cell.version() != expected_version {
            result.violations.push(format!(
                "version {} after {} publishes",
                cell.version(),
                expected_version
            ));
        }

        let live = watchers.iter().filter(|w| w.detached_at.is_none()).count();
        if cell.subscriber_count() != live + 1 {
            result.violations.push(format!(
                "{} subscriptions registered, expected {}",
                cell.subscriber_count(),
                live + 1
            ));
        }

        for (i, watcher) in watchers.iter().enumerate() {
            let calls = watcher.probe.calls();
            result.notifications += calls.len() as u64;

            if calls.windows(2).any(|pair| pair[0] == pair[1]) {
                result
                    .violations
                    .push(format!("watcher-{i} notified without a change"));
            }

            match watcher.detached_at {
                Some(count) if calls.len() != count => {
                    result
                        .violations
                        .push(format!("watcher-{i} notified after unsubscribing"));
                }
                Some(_) => {}
                None => {
                    let expected = watcher.field.get(&state);
                    if calls.last() != Some(&expected) {
                        result.violations.push(format!(
                            "watcher-{i} last saw {:?}, state has {}",
                            calls.last(),
                            expected
                        ));
                    }
                }
            }
        }

        result
    }
}
