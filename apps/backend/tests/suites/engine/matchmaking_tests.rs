// Waiting slot, human pairing and the bot fallback

use std::time::{Duration, Instant};

use four_in_a_row::domain::{Color, Seat, BOT_USERNAME};
use four_in_a_row::services::Timer;
use four_in_a_row::ws::ServerMsg;

use crate::support::engine::{conn, manager, only_timer, sent_to, started_game, timers};

#[test]
fn two_joins_pair_first_as_red_second_as_yellow() {
    let mut mgr = manager();
    let t0 = Instant::now();
    let (a, b) = (conn(), conn());

    let waiting = mgr.join(a, "alice", t0);
    assert!(sent_to(&waiting, a).is_empty());
    assert_eq!(mgr.waiting(), Some((a, "alice")));

    let effects = mgr.join(b, "bob", t0 + Duration::from_secs(3));
    let game_id = started_game(&effects, a);
    assert_eq!(started_game(&effects, b), game_id);
    assert!(mgr.waiting().is_none());

    match &sent_to(&effects, a)[0] {
        ServerMsg::Start {
            color,
            current_player,
            opponent,
            ..
        } => {
            assert_eq!(*color, Color::Red);
            assert_eq!(*current_player, Color::Red);
            assert_eq!(opponent, "bob");
        }
        other => panic!("expected start, got {other:?}"),
    }
    match &sent_to(&effects, b)[0] {
        ServerMsg::Start {
            color, opponent, ..
        } => {
            assert_eq!(*color, Color::Yellow);
            assert_eq!(opponent, "alice");
        }
        other => panic!("expected start, got {other:?}"),
    }

    let session = mgr.session(game_id).unwrap();
    assert_eq!(session.seat(0), Seat::Connected(a));
    assert_eq!(session.seat(1), Seat::Connected(b));
    assert!(!session.has_bot());
}

#[test]
fn lone_joiner_gets_a_bot_after_the_fallback_delay() {
    let mut mgr = manager();
    let t0 = Instant::now();
    let a = conn();

    let joined = mgr.join(a, "alice", t0);
    let (after, timer) = only_timer(&joined, |t| matches!(t, Timer::BotFallback { .. }));
    assert_eq!(after, Duration::from_secs(10));

    let effects = mgr.fire(timer, t0 + after);
    let game_id = started_game(&effects, a);
    match &sent_to(&effects, a)[0] {
        ServerMsg::Start {
            color, opponent, ..
        } => {
            assert_eq!(*color, Color::Red);
            assert_eq!(opponent, BOT_USERNAME);
        }
        other => panic!("expected start, got {other:?}"),
    }

    let session = mgr.session(game_id).unwrap();
    assert_eq!(session.seat(1), Seat::Bot);
    assert!(!session.is_bot_turn());
    assert!(mgr.waiting().is_none());
    // Red moves first, so nothing is scheduled for the bot yet.
    assert!(timers(&effects).is_empty());
}

#[test]
fn fallback_after_pairing_is_a_no_op() {
    let mut mgr = manager();
    let t0 = Instant::now();
    let (a, b) = (conn(), conn());

    let joined = mgr.join(a, "alice", t0);
    let (_, timer) = only_timer(&joined, |t| matches!(t, Timer::BotFallback { .. }));
    mgr.join(b, "bob", t0 + Duration::from_secs(1));

    let effects = mgr.fire(timer, t0 + Duration::from_secs(10));
    assert!(effects.is_empty());
    assert_eq!(mgr.active_games(), 1);
    assert!(mgr.sessions().all(|s| !s.has_bot()));
}

#[test]
fn stale_fallback_does_not_seat_a_later_occupant() {
    let mut mgr = manager();
    let t0 = Instant::now();
    let (a, c) = (conn(), conn());

    let first = mgr.join(a, "alice", t0);
    let (_, stale) = only_timer(&first, |t| matches!(t, Timer::BotFallback { .. }));
    mgr.disconnect(a, t0 + Duration::from_secs(2));
    assert!(mgr.waiting().is_none());

    let second = mgr.join(c, "carol", t0 + Duration::from_secs(5));
    let (_, fresh) = only_timer(&second, |t| matches!(t, Timer::BotFallback { .. }));

    assert!(mgr.fire(stale, t0 + Duration::from_secs(10)).is_empty());
    assert_eq!(mgr.waiting(), Some((c, "carol")));

    let effects = mgr.fire(fresh, t0 + Duration::from_secs(15));
    started_game(&effects, c);
}

#[test]
fn waiting_connection_that_closes_gets_no_bot_match() {
    let mut mgr = manager();
    let t0 = Instant::now();
    let a = conn();

    let joined = mgr.join(a, "alice", t0);
    let (after, timer) = only_timer(&joined, |t| matches!(t, Timer::BotFallback { .. }));
    assert!(mgr.disconnect(a, t0 + Duration::from_secs(1)).is_empty());

    assert!(mgr.fire(timer, t0 + after).is_empty());
    assert_eq!(mgr.active_games(), 0);
}

#[test]
fn repeated_join_from_same_connection_is_ignored() {
    let mut mgr = manager();
    let t0 = Instant::now();
    let (a, b) = (conn(), conn());

    mgr.join(a, "alice", t0);
    assert!(mgr.join(a, "alice", t0).is_empty());
    assert_eq!(mgr.waiting(), Some((a, "alice")));

    mgr.join(b, "bob", t0);
    assert!(mgr.join(b, "bob", t0).is_empty());
    assert_eq!(mgr.active_games(), 1);
}

#[test]
fn game_ids_increase_per_match() {
    let mut mgr = manager();
    let t0 = Instant::now();
    let (a, b, c, d) = (conn(), conn(), conn(), conn());

    mgr.join(a, "alice", t0);
    let first = started_game(&mgr.join(b, "bob", t0), a);
    mgr.join(c, "carol", t0);
    let second = started_game(&mgr.join(d, "dave", t0), c);

    assert!(second > first);
    assert_eq!(mgr.active_games(), 2);
}
