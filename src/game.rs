use std::sync::Arc;

use tracing::{debug, info};

use crate::advisor::{self, Suggestion};
use crate::card::{Card, SuitCount};
use crate::command::{Command, Outcome};
use crate::config::Settings;
use crate::error::RuleViolation;
use crate::observer::{NullObserver, StateObserver};
use crate::state::GameState;
use crate::store::SnapshotStore;

/// The engine. `observer` is injected so the engine stays unaware of who
/// renders or persists its snapshots.
///
/// Commands never fail: an illegal request leaves the state untouched. Each
/// accepted command publishes a new [`GameState`]; snapshots handed out
/// earlier keep their old contents.
pub struct Game<O: StateObserver = NullObserver> {
    state: Arc<GameState>,
    observer: O,
}

impl Game<NullObserver> {
    /// A freshly dealt game nobody observes.
    pub fn headless(settings: Settings) -> Self {
        Game::init(settings, NullObserver)
    }
}

impl Game<SnapshotStore> {
    /// Resume the game saved in `store`, or deal a new one if there is none
    /// or it cannot be read.
    pub fn open(settings: Settings, store: SnapshotStore) -> Self {
        let state = store.load_or_new(&settings);
        Game::new(state, store)
    }
}

impl<O: StateObserver> Game<O> {
    pub fn new(state: GameState, observer: O) -> Self {
        Game {
            state: Arc::new(state),
            observer,
        }
    }

    /// Deal a first game according to `settings`.
    pub fn init(settings: Settings, observer: O) -> Self {
        let state = GameState::deal(settings.suit_count, settings.seed);
        info!(suit_count = settings.suit_count.count(), seed = ?settings.seed, "new game");
        Game::new(state, observer)
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    /// Dispatch a command.
    pub fn apply(&mut self, cmd: Command) -> Outcome {
        let result = match cmd {
            Command::NewGame { suit_count } => {
                self.new_game(suit_count);
                Ok(Outcome::NewGame)
            }
            Command::MoveCards {
                run,
                from_column,
                from_index,
                to_column,
            } => self
                .try_move(&run, from_column, from_index, to_column)
                .map(|completed| Outcome::Moved { completed }),
            Command::MoveRun {
                from_column,
                from_index,
                to_column,
            } => self
                .run_at(from_column, from_index)
                .ok_or(RuleViolation::RunMismatch)
                .and_then(|run| self.try_move(&run, from_column, from_index, to_column))
                .map(|completed| Outcome::Moved { completed }),
            Command::DealFromStock => self.try_deal().map(|completed| Outcome::Dealt { completed }),
            Command::Undo => self.try_undo().map(|()| Outcome::Undone),
        };

        result.unwrap_or_else(|reason| {
            debug!(%reason, "command ignored");
            Outcome::Rejected(reason)
        })
    }

    pub fn new_game(&mut self, suit_count: SuitCount) {
        info!(suit_count = suit_count.count(), "new game");
        self.publish(GameState::deal(suit_count, None));
    }

    /// Like [`Game::new_game`], but reproducible.
    pub fn new_game_seeded(&mut self, suit_count: SuitCount, seed: u64) {
        info!(suit_count = suit_count.count(), seed, "new game");
        self.publish(GameState::deal(suit_count, Some(seed)));
    }

    /// Move `run` from `from_column[from_index..]` onto `to_column`.
    /// Returns the column where a sequence was completed, if any.
    pub fn move_cards(
        &mut self,
        run: &[Card],
        from_column: usize,
        from_index: usize,
        to_column: usize,
    ) -> Option<usize> {
        match self.apply(Command::MoveCards {
            run: run.to_vec(),
            from_column,
            from_index,
            to_column,
        }) {
            Outcome::Moved { completed } => completed,
            _ => None,
        }
    }

    /// Move the run currently at `from_column[from_index..]`.
    pub fn move_run(&mut self, from_column: usize, from_index: usize, to_column: usize) -> Option<usize> {
        match self.apply(Command::MoveRun {
            from_column,
            from_index,
            to_column,
        }) {
            Outcome::Moved { completed } => completed,
            _ => None,
        }
    }

    /// Deal one card onto every column. Returns the columns that completed
    /// a sequence as a result.
    pub fn deal_from_stock(&mut self) -> Vec<usize> {
        match self.apply(Command::DealFromStock) {
            Outcome::Dealt { completed } => completed,
            _ => Vec::new(),
        }
    }

    pub fn undo(&mut self) {
        self.apply(Command::Undo);
    }

    fn try_move(
        &mut self,
        run: &[Card],
        from_column: usize,
        from_index: usize,
        to_column: usize,
    ) -> Result<Option<usize>, RuleViolation> {
        let (next, completed) = self.state.apply_move(run, from_column, from_index, to_column)?;
        self.publish(next);
        if let Some(column) = completed {
            self.sequence_completed(column);
        }
        Ok(completed)
    }

    fn try_deal(&mut self) -> Result<Vec<usize>, RuleViolation> {
        let (next, completed) = self.state.apply_deal()?;
        self.publish(next);
        for &column in &completed {
            self.sequence_completed(column);
        }
        Ok(completed)
    }

    fn try_undo(&mut self) -> Result<(), RuleViolation> {
        let next = self.state.apply_undo()?;
        self.publish(next);
        Ok(())
    }

    fn publish(&mut self, next: GameState) {
        self.state = Arc::new(next);
        self.observer.state_changed(&self.state);
    }

    fn sequence_completed(&mut self, column: usize) {
        info!(column, total = self.state.completed_sequences(), "sequence completed");
        self.observer.sequence_completed(column);
        if self.state.is_won() {
            info!("game won");
            self.observer.game_won();
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// The current snapshot. It stays valid after later commands.
    pub fn current_state(&self) -> Arc<GameState> {
        Arc::clone(&self.state)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn can_lift_from(&self, column: usize, card_index: usize) -> bool {
        self.state.can_lift_from(column, card_index)
    }

    pub fn valid_destinations(&self, run: &[Card]) -> Vec<usize> {
        self.state.valid_destinations(run)
    }

    /// Best move on the board for the joker button.
    pub fn find_interesting_move(&self) -> Option<Suggestion> {
        let suggestion = advisor::find_interesting_move(&self.state);
        debug!(?suggestion, "advisor");
        suggestion
    }

    /// First legal destination for the run the player has picked up.
    pub fn hint_for(&self, from_column: usize, from_index: usize) -> Option<usize> {
        advisor::first_legal_destination(&self.state, from_column, from_index)
    }

    pub fn can_undo(&self) -> bool {
        self.state.can_undo()
    }

    pub fn can_deal(&self) -> bool {
        self.state.can_deal()
    }

    pub fn has_empty_column(&self) -> bool {
        self.state.has_empty_column()
    }

    pub fn remaining_deals(&self) -> usize {
        self.state.remaining_deals()
    }

    pub fn stock_len(&self) -> usize {
        self.state.stock().len()
    }

    pub fn completed_sequences(&self) -> u8 {
        self.state.completed_sequences()
    }

    pub fn is_won(&self) -> bool {
        self.state.is_won()
    }

    pub fn suit_count(&self) -> SuitCount {
        self.state.suit_count()
    }

    fn run_at(&self, column: usize, index: usize) -> Option<Vec<Card>> {
        let cards = self.state.tableau().get(column)?.get(index..)?;
        (!cards.is_empty()).then(|| cards.to_vec())
    }
}
