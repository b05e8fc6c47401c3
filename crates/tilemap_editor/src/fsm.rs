//! A small guarded finite-state machine
//!
//! States and transition ids are closed enums. Each transition carries a guard
//! and an action that receive the caller's context, so the machine never
//! borrows the thing it arbitrates.

use std::collections::HashMap;
use std::hash::Hash;

type Guard<C> = Box<dyn Fn(&C) -> bool + Send + Sync>;
type Action<C> = Box<dyn Fn(&mut C) + Send + Sync>;

/// One guarded edge of the machine
pub struct Transition<S, T, C> {
    pub id: T,
    pub from: S,
    pub to: S,
    guard: Guard<C>,
    action: Action<C>,
}

impl<S: 'static, T: 'static, C: 'static> Transition<S, T, C> {
    pub fn new(
        id: T,
        from: S,
        to: S,
        guard: impl Fn(&C) -> bool + Send + Sync + 'static,
        action: impl Fn(&mut C) + Send + Sync + 'static,
    ) -> Self {
        Self {
            id,
            from,
            to,
            guard: Box::new(guard),
            action: Box::new(action),
        }
    }

    /// A transition whose guard always passes
    pub fn always(id: T, from: S, to: S, action: impl Fn(&mut C) + Send + Sync + 'static) -> Self {
        Self::new(id, from, to, |_| true, action)
    }
}

/// Guarded automaton over state type `S`, transition ids `T` and context `C`
pub struct StateMachine<S, T, C> {
    initial: S,
    current: S,
    transitions: HashMap<(S, T), Transition<S, T, C>>,
}

impl<S, T, C> StateMachine<S, T, C>
where
    S: Copy + Eq + Hash,
    T: Copy + Eq + Hash,
{
    pub fn new(initial: S) -> Self {
        Self {
            initial,
            current: initial,
            transitions: HashMap::new(),
        }
    }

    pub fn current(&self) -> S {
        self.current
    }

    /// Register a transition, replacing any previous one with the same `(from, id)`
    pub fn add_transition(&mut self, transition: Transition<S, T, C>) {
        self.transitions
            .insert((transition.from, transition.id), transition);
    }

    /// Attempt transition `id` from the current state.
    ///
    /// If a transition `(current, id)` exists and its guard passes, the
    /// action runs and the machine moves to its target. Otherwise nothing
    /// happens. Returns whether the transition fired.
    pub fn fire(&mut self, id: T, ctx: &mut C) -> bool {
        let Some(transition) = self.transitions.get(&(self.current, id)) else {
            return false;
        };
        if !(transition.guard)(ctx) {
            return false;
        }
        (transition.action)(ctx);
        self.current = transition.to;
        true
    }

    /// Force the machine back to its initial state without running actions
    pub fn reset(&mut self) {
        self.current = self.initial;
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }
}
