//! Event reconciliation tests.
//!
//! These tests verify that folding a concurrent claim log is deterministic:
//! delivery order, duplicate delivery, and incremental ingestion must all
//! produce the same history as one full replay of the sorted log.

use proptest::prelude::*;

use set_engine::cards::{Card, Deck};
use set_engine::core::{GameMode, ModeId, ModeRegistry, PlayerId};
use set_engine::reconcile::{replay, Reconciler, Reconciliation, SubmittedEvent};
use set_engine::rules::{find_all_matches, find_board, MatchRule};

fn mode(id: ModeId) -> GameMode {
    ModeRegistry::standard().get(id).unwrap().clone()
}

fn claim(id: &str, who: &str, at: u64, cards: &[Card]) -> SubmittedEvent {
    SubmittedEvent::new(id, who, at, cards.iter().map(Card::encode))
}

// =============================================================================
// Helpers
// =============================================================================

/// Play a whole round by claiming the hint, with a losing echo of every
/// claim from the next player five milliseconds later.
fn scripted_round(m: &GameMode, seed: u64, players: &[&str]) -> Vec<SubmittedEvent> {
    let mut sim = Reconciler::new(m, m.default_rule, seed).unwrap();
    let mut events = Vec::new();
    let mut step = 0u64;
    while let Some(hint) = sim.state().hint() {
        let at = 1_000 + step * 10;
        let winner = players[step as usize % players.len()];
        let loser = players[(step as usize + 1) % players.len()];
        let win = claim(&format!("w{step}"), winner, at, &hint);
        let echo = claim(&format!("l{step}"), loser, at + 5, &hint);
        sim.ingest([win.clone(), echo.clone()]);
        events.push(win);
        events.push(echo);
        step += 1;
    }
    events
}

// =============================================================================
// Claim Ordering Tests
// =============================================================================

/// Seed 42: the found board is the dealt board, and claiming its first match
/// with the earliest timestamp is accepted.
#[test]
fn test_seed_42_first_match_accepted() {
    let m = mode(ModeId::Normal);
    let deck = Deck::generate(&m, Some(42));
    let board = find_board(deck.cards(), &m, MatchRule::Normal);

    let reconciler = Reconciler::new(&m, MatchRule::Normal, 42).unwrap();
    assert_eq!(reconciler.state().board(), board);

    let first = &find_all_matches(&board, MatchRule::Normal, &m)[0];
    let cards: Vec<Card> = first.iter().map(|&i| board[i].clone()).collect();

    let result = replay(
        &m,
        MatchRule::Normal,
        42,
        [
            claim("late", "bob", 5_000, &cards),
            claim("early", "alice", 1_000, &cards),
        ],
    )
    .unwrap();

    assert_eq!(result.accepted.len(), 1);
    assert_eq!(result.accepted[0].event_id.as_str(), "early");
    assert_eq!(result.accepted[0].board_size, 12);
    assert_eq!(result.board.len(), 12);
    assert_eq!(result.deck.len(), 78);
    assert_eq!(result.rejections.stale, 1);
}

/// Two claims sharing a card: only the earlier one survives.
#[test]
fn test_overlapping_claims_earlier_wins() {
    let m = mode(ModeId::Normal);

    // Find a seed whose opening board has two matches sharing a card.
    let (seed, first, second) = (0..200u64)
        .find_map(|seed| {
            let reconciler = Reconciler::new(&m, MatchRule::Normal, seed).unwrap();
            let board = reconciler.state().board();
            let matches = find_all_matches(&board, MatchRule::Normal, &m);
            for (i, a) in matches.iter().enumerate() {
                for b in &matches[i + 1..] {
                    if a.iter().any(|x| b.contains(x)) {
                        let pick = |c: &[usize]| c.iter().map(|&k| board[k].clone()).collect::<Vec<_>>();
                        return Some((seed, pick(a), pick(b)));
                    }
                }
            }
            None
        })
        .expect("some seed has overlapping matches");

    // "alice" sorts first by id, but "bob" is earlier in time.
    let events = vec![
        claim("e-alice", "alice", 2_000, &second),
        claim("e-bob", "bob", 1_000, &first),
    ];
    let result = replay(&m, MatchRule::Normal, seed, events).unwrap();

    assert_eq!(result.accepted.len(), 1);
    assert_eq!(result.accepted[0].submitter, PlayerId::new("bob"));
    assert_eq!(result.rejections.stale, 1);
    assert_eq!(result.counts.get(&PlayerId::new("alice")), None);
}

/// Same timestamp: the lexically smaller submitter id is folded first.
#[test]
fn test_timestamp_tie_breaks_on_submitter() {
    let m = mode(ModeId::Normal);
    let reconciler = Reconciler::new(&m, MatchRule::Normal, 42).unwrap();
    let hint = reconciler.state().hint().unwrap();

    let result = replay(
        &m,
        MatchRule::Normal,
        42,
        [claim("z", "zed", 1_000, &hint), claim("a", "amy", 1_000, &hint)],
    )
    .unwrap();
    assert_eq!(result.accepted.len(), 1);
    assert_eq!(result.accepted[0].submitter.as_str(), "amy");
}

// =============================================================================
// Completion Tests
// =============================================================================

/// A full round ends in completion exactly once, at the terminal condition.
#[test]
fn test_full_round_completes_once() {
    let m = mode(ModeId::Normal);
    let events = scripted_round(&m, 42, &["alice", "bob", "carol"]);
    let last_win = events.iter().rev().find(|e| e.id.as_str().starts_with('w')).unwrap().timestamp_ms;

    let mut reconciler = Reconciler::new(&m, MatchRule::Normal, 42).unwrap();
    let mut completions = 0;
    let mut was_completed = false;
    for event in events {
        reconciler.ingest([event]);
        if reconciler.is_completed() && !was_completed {
            completions += 1;
            was_completed = true;
        }
    }
    assert_eq!(completions, 1);

    let result = reconciler.result();
    assert!(result.completed);
    assert_eq!(result.completed_at_ms, Some(last_win));
    assert!(find_all_matches(&result.board, MatchRule::Normal, &m).is_empty());
    assert!(result.board.len() >= result.deck.len());
    // Every echo of the final winning claim lands after completion.
    assert_eq!(result.rejections.after_completion, 1);

    let total: u32 = result.counts.values().sum();
    assert_eq!(total as usize, result.accepted.len());
    assert_eq!((81 - result.deck.len()) % 3, 0);
    assert_eq!(result.accepted.len(), (81 - result.deck.len()) / 3);
}

// =============================================================================
// Duplicate Delivery Tests
// =============================================================================

/// Delivering the same event twice is the same as delivering it once.
#[test]
fn test_duplicate_delivery_is_idempotent() {
    let m = mode(ModeId::Normal);
    let events = scripted_round(&m, 7, &["a", "b"]);

    let once = replay(&m, MatchRule::Normal, 7, events.clone()).unwrap();

    let mut doubled = events.clone();
    doubled.extend(events.iter().cloned());
    let twice = replay(&m, MatchRule::Normal, 7, doubled).unwrap();
    assert_eq!(once, twice);

    let mut reconciler = Reconciler::new(&m, MatchRule::Normal, 7).unwrap();
    reconciler.ingest(events.clone());
    reconciler.ingest(events);
    assert_eq!(reconciler.result(), once);
}

/// Conflicting copies of one event id resolve to the earliest key, whatever
/// order they arrive in.
#[test]
fn test_conflicting_duplicate_ids_resolve_deterministically() {
    let m = mode(ModeId::Normal);
    let reconciler = Reconciler::new(&m, MatchRule::Normal, 42).unwrap();
    let hint = reconciler.state().hint().unwrap();

    let early = claim("same", "alice", 1_000, &hint);
    let late = claim("same", "bob", 9_000, &hint);

    let mut forward = Reconciler::new(&m, MatchRule::Normal, 42).unwrap();
    forward.ingest([early.clone()]);
    forward.ingest([late.clone()]);

    let mut backward = Reconciler::new(&m, MatchRule::Normal, 42).unwrap();
    backward.ingest([late]);
    backward.ingest([early]);

    assert_eq!(forward.result(), backward.result());
    assert_eq!(backward.result().accepted[0].submitter.as_str(), "alice");
    assert_eq!(backward.result().accepted[0].timestamp_ms, 1_000);
}

/// Copies of one event with the same key but different cards resolve the
/// same way in either delivery order: the smaller card list wins.
#[test]
fn test_same_key_copies_resolve_by_cards() {
    let m = mode(ModeId::Normal);
    let reconciler = Reconciler::new(&m, MatchRule::Normal, 42).unwrap();
    let hint = reconciler.state().hint().unwrap();

    let real = claim("x", "a", 1, &hint);
    let junk = SubmittedEvent::new("x", "a", 1, ["0000", "0000", "0000"]);

    let first = replay(&m, MatchRule::Normal, 42, [real.clone(), junk.clone()]).unwrap();
    let second = replay(&m, MatchRule::Normal, 42, [junk.clone(), real.clone()]).unwrap();
    assert_eq!(first, second);
    assert!(first.accepted.is_empty());
    assert_eq!(first.rejections.malformed, 1);

    // The same holds when the losing copy was already folded.
    let mut incremental = Reconciler::new(&m, MatchRule::Normal, 42).unwrap();
    incremental.ingest([real]);
    assert_eq!(incremental.accepted().len(), 1);
    incremental.ingest([junk]);
    assert_eq!(incremental.result(), first);
}

// =============================================================================
// Ghost Rule Tests
// =============================================================================

/// Ghost rounds accept two-card claims straight off the board.
#[test]
fn test_ghost_two_card_claim() {
    let m = mode(ModeId::Ghost);
    let reconciler = Reconciler::new(&m, MatchRule::Ghost, 3).unwrap();
    let board = reconciler.state().board();

    let result = replay(&m, MatchRule::Ghost, 3, [claim("g", "a", 1, &board[..2])]).unwrap();
    assert_eq!(result.accepted.len(), 1);
    assert_eq!(result.accepted[0].cards.len(), 2);
    assert_eq!(result.deck.len(), 79);
}

/// Normal rule on the ghost mode refuses two-card claims.
#[test]
fn test_ghost_mode_with_normal_rule() {
    let m = mode(ModeId::Ghost);
    let reconciler = Reconciler::new(&m, MatchRule::Normal, 3).unwrap();
    let board = reconciler.state().board();

    let result = replay(&m, MatchRule::Normal, 3, [claim("g", "a", 1, &board[..2])]).unwrap();
    assert!(result.accepted.is_empty());
    assert_eq!(result.rejections.malformed, 1);
}

// =============================================================================
// Delivery Order Properties
// =============================================================================

fn fold_in_chunks(m: &GameMode, seed: u64, events: &[SubmittedEvent], chunk: usize) -> Reconciliation {
    let mut reconciler = Reconciler::new(m, m.default_rule, seed).unwrap();
    for part in events.chunks(chunk) {
        reconciler.ingest(part.to_vec());
    }
    reconciler.result()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Any delivery order, any chunking, with or without duplicates: the
    /// result equals a full replay of the sorted log.
    #[test]
    fn prop_delivery_order_does_not_matter(
        seed in 0u64..1_000,
        id in prop::sample::select(vec![ModeId::Junior, ModeId::Normal, ModeId::Ultra, ModeId::Xor]),
        order in any::<u64>(),
        chunk in 1usize..8,
        duplicate_every in 0usize..5,
    ) {
        let m = mode(id);
        let events = scripted_round(&m, seed, &["p1", "p2", "p3"]);
        let expected = replay(&m, m.default_rule, seed, events.clone()).unwrap();
        prop_assert!(expected.completed);

        let mut delivered = events.clone();
        if duplicate_every > 0 {
            delivered.extend(events.iter().step_by(duplicate_every).cloned());
        }
        set_engine::core::DeckRng::new(order).shuffle(&mut delivered);

        prop_assert_eq!(&fold_in_chunks(&m, seed, &delivered, chunk), &expected);
        prop_assert_eq!(&replay(&m, m.default_rule, seed, delivered).unwrap(), &expected);
    }
}
