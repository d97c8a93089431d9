use crate::state::GameState;

/// Collaborators that follow the engine: persistence, renderers, effects.
///
/// Implement this trait for:
/// - `SnapshotStore` – writes every new snapshot to disk
/// - a UI layer – re-renders and plays completion effects
pub trait StateObserver {
    /// A command replaced the state with `state`.
    fn state_changed(&mut self, state: &GameState);
    /// A King..Ace sequence was cleared from `column`.
    fn sequence_completed(&mut self, _column: usize) {}
    /// The eighth sequence was cleared.
    fn game_won(&mut self) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl StateObserver for NullObserver {
    fn state_changed(&mut self, _state: &GameState) {}
}
