// Disconnect grace window, resume and forfeit

use std::time::{Duration, Instant};

use four_in_a_row::domain::{Color, Seat, Status, BOT_USERNAME};
use four_in_a_row::services::{Effect, Timer};
use four_in_a_row::ws::ServerMsg;

use crate::support::engine::{
    bot_match, conn, manager, only_timer, paired, play, records, sent_to, started_game,
};

fn forfeit_check(effects: &[Effect]) -> (Duration, Timer) {
    only_timer(effects, |t| matches!(t, Timer::ForfeitCheck { .. }))
}

#[test]
fn rejoin_within_grace_resumes_the_same_seat() {
    let mut mgr = manager();
    let t0 = Instant::now();
    let (a, b, a2) = (conn(), conn(), conn());
    let game_id = paired(&mut mgr, a, b, t0);
    play(&mut mgr, game_id, a, b, &[3, 4]);
    let board = mgr.session(game_id).unwrap().board().clone();

    let dropped = mgr.disconnect(a, t0 + Duration::from_secs(1));
    let (after, check) = forfeit_check(&dropped);
    assert_eq!(after, Duration::from_secs(30));
    assert_eq!(
        mgr.session(game_id).unwrap().seat(0),
        Seat::AwaitingReconnect
    );

    let effects = mgr.join(a2, "alice", t0 + Duration::from_secs(20));
    match sent_to(&effects, a2).as_slice() {
        [ServerMsg::Resume {
            game_id: resumed,
            board: resumed_board,
            current_player,
            color,
            opponent,
            win_cells,
        }] => {
            assert_eq!(*resumed, game_id);
            assert_eq!(resumed_board, &board);
            assert_eq!(*current_player, Color::Red);
            assert_eq!(*color, Color::Red);
            assert_eq!(opponent, "bob");
            assert!(win_cells.is_empty());
        }
        other => panic!("expected resume, got {other:?}"),
    }
    assert!(sent_to(&effects, b).is_empty());
    assert!(mgr.waiting().is_none());

    // The pending check finds the seat reclaimed and does nothing.
    assert!(mgr.fire(check, t0 + Duration::from_secs(31)).is_empty());
    let session = mgr.session(game_id).unwrap();
    assert_eq!(session.status(), Status::Active);
    assert_eq!(session.seat(0), Seat::Connected(a2));

    // The new connection plays on.
    mgr.submit_move(a2, game_id, 3, Color::Red).unwrap();
}

#[test]
fn grace_expiry_forfeits_to_the_opponent() {
    let mut mgr = manager();
    let t0 = Instant::now();
    let (a, b) = (conn(), conn());
    let game_id = paired(&mut mgr, a, b, t0);

    let dropped = mgr.disconnect(b, t0);
    let (after, check) = forfeit_check(&dropped);
    let effects = mgr.fire(check, t0 + after);

    assert_eq!(
        sent_to(&effects, a),
        vec![ServerMsg::Forfeit {
            winner: "alice".into()
        }]
    );
    assert!(sent_to(&effects, b).is_empty());
    // Forfeits are recorded as matches only.
    assert_eq!(
        records(&effects),
        vec![Effect::RecordGame {
            player1: "alice".into(),
            player2: "bob".into(),
            winner: "alice".into(),
        }]
    );
    only_timer(&effects, |t| matches!(t, Timer::Release { .. }));

    let session = mgr.session(game_id).unwrap();
    assert_eq!(session.status(), Status::Ended);
    assert_eq!(session.outcome().map(|o| o.winner_label()), Some("alice"));
}

#[test]
fn rejoin_after_grace_starts_matchmaking_instead() {
    let mut mgr = manager();
    let t0 = Instant::now();
    let (a, b, a2) = (conn(), conn(), conn());
    let game_id = paired(&mut mgr, a, b, t0);

    mgr.disconnect(a, t0);
    let effects = mgr.join(a2, "alice", t0 + Duration::from_secs(30));

    assert!(sent_to(&effects, a2).is_empty());
    only_timer(&effects, |t| matches!(t, Timer::BotFallback { .. }));
    assert_eq!(mgr.waiting(), Some((a2, "alice")));
    assert_eq!(
        mgr.session(game_id).unwrap().seat(0),
        Seat::AwaitingReconnect
    );
}

#[test]
fn second_drop_rearms_the_forfeit_check() {
    let mut mgr = manager();
    let t0 = Instant::now();
    let (a, b, a2) = (conn(), conn(), conn());
    let game_id = paired(&mut mgr, a, b, t0);

    let (_, first) = forfeit_check(&mgr.disconnect(a, t0));
    mgr.join(a2, "alice", t0 + Duration::from_secs(10));
    let (after, second) = forfeit_check(&mgr.disconnect(a2, t0 + Duration::from_secs(20)));
    assert_ne!(first, second);

    // The first check would have been due at t0 + 30s; it is stale now.
    assert!(mgr.fire(first, t0 + Duration::from_secs(30)).is_empty());
    assert!(mgr.session(game_id).unwrap().is_active());

    let effects = mgr.fire(second, t0 + Duration::from_secs(20) + after);
    assert_eq!(
        sent_to(&effects, b),
        vec![ServerMsg::Forfeit {
            winner: "bob".into()
        }]
    );
}

#[test]
fn closing_after_the_game_ended_arms_nothing() {
    let mut mgr = manager();
    let t0 = Instant::now();
    let (a, b) = (conn(), conn());
    let game_id = paired(&mut mgr, a, b, t0);

    play(&mut mgr, game_id, a, b, &[0, 0, 1, 1, 2, 2, 3]);
    // Connections of an ended match hold no live seat.
    assert!(mgr.disconnect(b, t0).is_empty());
    assert_eq!(
        mgr.session(game_id).unwrap().outcome().map(|o| o.winner_label()),
        Some("alice")
    );
}

#[test]
fn both_players_dropping_forfeits_whoever_expires_first() {
    let mut mgr = manager();
    let t0 = Instant::now();
    let (a, b) = (conn(), conn());
    let game_id = paired(&mut mgr, a, b, t0);

    let (after_a, check_a) = forfeit_check(&mgr.disconnect(a, t0));
    let (after_b, check_b) = forfeit_check(&mgr.disconnect(b, t0 + Duration::from_secs(5)));

    let effects = mgr.fire(check_a, t0 + after_a);
    // Nobody is connected to hear about it, but the match still ends.
    assert!(effects
        .iter()
        .all(|e| !matches!(e, Effect::Send { .. })));
    assert_eq!(
        mgr.session(game_id).unwrap().outcome().map(|o| o.winner_label()),
        Some("bob")
    );

    let late = mgr.fire(check_b, t0 + Duration::from_secs(5) + after_b);
    assert!(late.is_empty());
}

#[test]
fn human_leaving_a_bot_match_forfeits_to_the_bot() {
    let mut mgr = manager();
    let t0 = Instant::now();
    let a = conn();
    let game_id = bot_match(&mut mgr, a, t0);

    let dropped = mgr.disconnect(a, t0 + Duration::from_secs(11));
    let (after, check) = forfeit_check(&dropped);
    let effects = mgr.fire(check, t0 + Duration::from_secs(11) + after);

    assert!(sent_to(&effects, a).is_empty());
    assert_eq!(
        records(&effects),
        vec![Effect::RecordGame {
            player1: "alice".into(),
            player2: BOT_USERNAME.into(),
            winner: BOT_USERNAME.into(),
        }]
    );
    assert!(!mgr.session(game_id).unwrap().is_active());
}

#[test]
fn duplicate_usernames_resume_in_game_id_order() {
    let mut mgr = manager();
    let t0 = Instant::now();
    let (a1, b, a2, c) = (conn(), conn(), conn(), conn());

    // Usernames are not unique: a second "alice" can queue while the first plays.
    let first = paired(&mut mgr, a1, b, t0);
    mgr.join(a2, "alice", t0);
    let second = started_game(&mgr.join(c, "carol", t0), a2);
    assert!(second > first);

    mgr.disconnect(a2, t0 + Duration::from_secs(1));
    mgr.disconnect(a1, t0 + Duration::from_secs(2));

    let (r1, r2) = (conn(), conn());
    let resumed: Vec<_> = [r1, r2]
        .into_iter()
        .map(|r| {
            let effects = mgr.join(r, "alice", t0 + Duration::from_secs(3));
            match sent_to(&effects, r).as_slice() {
                [ServerMsg::Resume { game_id, .. }] => *game_id,
                other => panic!("expected resume, got {other:?}"),
            }
        })
        .collect();
    assert_eq!(resumed, vec![first, second]);
    assert!(mgr.waiting().is_none());
}
