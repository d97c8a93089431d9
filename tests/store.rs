use std::fs;

use pretty_assertions::assert_eq;
use spider_engine::{
    Board, Game, GameState, STORAGE_KEY, Settings, SnapshotError, SnapshotStore, StoreError,
    StorePaths, SuitCount,
};

fn store_in(dir: &tempfile::TempDir) -> SnapshotStore {
    SnapshotStore::new(StorePaths::in_dir(dir.path().join("data")))
}

#[test]
fn save_and_load_roundtrip() {
    let td = tempfile::tempdir().expect("tmpdir");
    let store = store_in(&td);

    let mut game = Game::headless(Settings::with_seed(SuitCount::Two, 31));
    game.deal_from_stock();
    let state = game.current_state();

    store.save(&state).expect("save");
    assert!(store.path().ends_with(format!("{STORAGE_KEY}.dat")));
    let loaded = store.load().expect("load").expect("saved state");
    assert_eq!(loaded, *state);
    assert_eq!(loaded.moves().len(), 1);
}

#[test]
fn missing_file_starts_a_fresh_game() {
    let td = tempfile::tempdir().expect("tmpdir");
    let store = store_in(&td);
    assert!(store.load().expect("load").is_none());

    let settings = Settings::with_seed(SuitCount::Four, 9);
    assert_eq!(store.load_or_new(&settings), GameState::deal(SuitCount::Four, Some(9)));
}

#[test]
fn tampered_snapshot_is_discarded() {
    let td = tempfile::tempdir().expect("tmpdir");
    let store = store_in(&td);
    store.save(&GameState::deal(SuitCount::One, Some(1))).expect("save");

    let mut bytes = fs::read(store.path()).unwrap();
    bytes[0] ^= 0xff;
    fs::write(store.path(), &bytes).unwrap();
    assert!(matches!(store.load(), Err(StoreError::Signature)));

    fs::write(store.path(), b"short").unwrap();
    assert!(matches!(store.load(), Err(StoreError::Truncated)));

    let settings = Settings::with_seed(SuitCount::Two, 4);
    assert_eq!(store.load_or_new(&settings), GameState::deal(SuitCount::Two, Some(4)));
}

#[test]
fn structurally_invalid_snapshot_is_rejected() {
    let td = tempfile::tempdir().expect("tmpdir");
    let store = store_in(&td);
    store
        .save(&GameState::new(Board::default(), SuitCount::One))
        .expect("save");

    assert!(matches!(
        store.load(),
        Err(StoreError::Invalid(SnapshotError::CardCount(0)))
    ));
}

#[test]
fn snapshot_with_a_bad_undo_entry_is_rejected() {
    let td = tempfile::tempdir().expect("tmpdir");
    let store = store_in(&td);

    let mut game = Game::headless(Settings::with_seed(SuitCount::One, 14));
    game.deal_from_stock();
    let mut value = serde_json::to_value(game.state()).unwrap();
    value["moves"][0]["deal"]["previousStock"]
        .as_array_mut()
        .unwrap()
        .truncate(3);
    let tampered: GameState = serde_json::from_value(value).unwrap();
    assert_eq!(tampered.board(), game.state().board());
    store.save(&tampered).expect("save");

    assert!(matches!(
        store.load(),
        Err(StoreError::Invalid(SnapshotError::BadHistory { step: 1, .. }))
    ));
    let settings = Settings::with_seed(SuitCount::One, 2);
    assert_eq!(store.load_or_new(&settings), GameState::deal(SuitCount::One, Some(2)));
}

#[test]
fn opened_game_saves_after_every_command() {
    let td = tempfile::tempdir().expect("tmpdir");
    let settings = Settings::with_seed(SuitCount::One, 12);

    let mut game = Game::open(settings, store_in(&td));
    assert_eq!(game.state(), &GameState::deal(SuitCount::One, Some(12)));
    game.deal_from_stock();
    let after_deal = game.current_state();

    let reopened = Game::open(Settings::default(), store_in(&td));
    assert_eq!(reopened.state(), &*after_deal);
    assert!(reopened.can_undo());

    let mut reopened = reopened;
    reopened.undo();
    let again = Game::open(Settings::default(), store_in(&td));
    assert_eq!(again.stock_len(), 50);
    assert!(!again.can_undo());
}

#[test]
fn json_snapshot_carries_suit_count() {
    let state = GameState::deal(SuitCount::Two, Some(6));
    let json = state.to_json().expect("json");
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["suitCount"], 2);
    assert_eq!(value["completedSequences"], 0);
    assert_eq!(value["isWon"], false);
    assert_eq!(GameState::from_json(&json).expect("parse"), state);
}
