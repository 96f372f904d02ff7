//! Aggregate root traits for snapshot-based domain models.

/// Aggregate root marker + minimal interface.
pub trait AggregateRoot {
    /// Strongly-typed aggregate identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the aggregate identifier.
    fn id(&self) -> &Self::Id;

    /// Monotonically increasing version of the aggregate's state.
    ///
    /// Corresponds to the number of events applied since creation.
    fn version(&self) -> u64;
}

/// Aggregate execution semantics (pure, deterministic).
///
/// - **Decision logic**: `handle(&self, cmd)` returns events.
/// - **State mutation**: `apply(&mut self, event)` evolves state.
///
/// Aggregates must not perform IO or side effects.
pub trait Aggregate: AggregateRoot {
    type Command: Clone + core::fmt::Debug;
    type Event: Clone + core::fmt::Debug;
    type Error: core::fmt::Debug;

    /// Evolve in-memory state from a single event.
    ///
    /// Implementations bump `version()` by one per applied event.
    fn apply(&mut self, event: &Self::Event);

    /// Decide which events to emit given the current state and a command.
    ///
    /// This must not mutate state. State evolution is done through `apply`.
    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;

    /// Copy-on-write execution: decide on `self`, then apply the events to a
    /// clone. `self` is left untouched, so earlier snapshots stay valid.
    ///
    /// Returns `None` in place of the new state when the command produced no
    /// events (e.g. removing an item that does not exist).
    fn execute(
        &self,
        command: &Self::Command,
    ) -> Result<(Option<Self>, Vec<Self::Event>), Self::Error>
    where
        Self: Clone,
    {
        let events = self.handle(command)?;
        if events.is_empty() {
            return Ok((None, events));
        }

        let mut next = self.clone();
        for event in &events {
            next.apply(event);
        }
        Ok((Some(next), events))
    }
}
