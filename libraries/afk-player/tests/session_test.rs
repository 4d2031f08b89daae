//! Page-level scenarios through PlayerSession
//!
//! - First visit: overlay, gesture, first play
//! - Return visit: automatic resume, and the manual control when autoplay is refused
//! - Nothing playable: file picker fallback

mod common;

use afk_player::{
    BootOutcome, ChainOutcome, GateInput, PlaybackError, PlayerState, ResumeOutcome, SeekOutcome,
    DEFAULT_ASSET,
};
use common::Harness;

fn returning_visitor(h: &Harness, index: &str, position: &str) {
    let keys = h.keys().clone();
    h.store.put(&keys.gesture, "1");
    h.store.put(&keys.index, index);
    h.store.put(&keys.position, position);
    h.store.put(&keys.playing, "true");
}

// ===== First visit =====

#[tokio::test]
async fn overlay_click_hides_overlay_then_plays() {
    let h = Harness::new().with_random_start(1);
    let mut session = h.session();

    let boot = session.boot(Some("a.mp3, b.mp3")).await;
    assert_eq!(boot, BootOutcome::AwaitingGesture);
    assert_eq!(h.entries("show_overlay").len(), 1);
    assert!(h.plays().is_empty());

    let outcome = session.activate_overlay(GateInput::Click).await;

    assert!(matches!(
        outcome,
        Some(Ok(ChainOutcome::Playlist { index: 1, .. }))
    ));
    let hidden = h.position_of("hide_overlay").expect("overlay hidden");
    let played = h.position_of("play:b.mp3").expect("b.mp3 attempted");
    assert!(hidden < played);
    assert_eq!(h.store.raw(&h.keys().gesture).as_deref(), Some("1"));
    assert!(session.gate().is_unlocked());
}

#[tokio::test]
async fn unlock_gate_hides_overlay_before_any_play() {
    let h = Harness::new();
    let mut session = h.session();
    session.boot(Some("a.mp3")).await;

    assert!(session.unlock_gate(&GateInput::Click));

    assert_eq!(h.entries("hide_overlay").len(), 1);
    assert_eq!(h.store.raw(&h.keys().gesture).as_deref(), Some("1"));
    assert!(h.plays().is_empty());
    assert!(!session.unlock_gate(&GateInput::Click));

    let outcome = session.start_after_unlock().await.unwrap();
    assert_eq!(outcome, ChainOutcome::Playlist { index: 0, attempts: 1 });
    assert_eq!(h.plays(), vec!["a.mp3"]);
}

#[tokio::test]
async fn non_activating_keys_leave_overlay_up() {
    let h = Harness::new();
    let mut session = h.session();
    session.boot(Some("a.mp3")).await;

    assert!(session
        .activate_overlay(GateInput::Key("Escape".into()))
        .await
        .is_none());
    assert!(h.entries("hide_overlay").is_empty());
    assert!(h.plays().is_empty());

    assert!(session
        .activate_overlay(GateInput::Key("Enter".into()))
        .await
        .is_some());
    assert_eq!(h.plays(), vec!["a.mp3"]);
}

#[tokio::test]
async fn overlay_only_unlocks_once() {
    let h = Harness::new();
    let mut session = h.session();
    session.boot(Some("a.mp3")).await;

    assert!(session.activate_overlay(GateInput::Click).await.is_some());
    assert!(session.activate_overlay(GateInput::Click).await.is_none());
    assert_eq!(h.plays().len(), 1);
}

#[tokio::test]
async fn empty_page_playlist_plays_default_asset() {
    let h = Harness::new();
    let mut session = h.session();
    session.boot(Some(" , | ")).await;

    session.activate_overlay(GateInput::Click).await;

    assert_eq!(h.plays(), vec![DEFAULT_ASSET]);
}

// ===== Return visit =====

#[tokio::test]
async fn unlocked_profile_resumes_saved_track_and_position() {
    let h = Harness::new();
    returning_visitor(&h, "2", "45.5");
    h.sink.borrow_mut().duration = Some(200.0);
    let mut session = h.session();

    let boot = session.boot(Some("a.mp3,b.mp3,c.mp3")).await;

    assert_eq!(
        boot,
        BootOutcome::Resume(ResumeOutcome::Resumed {
            index: 2,
            seek: Some(SeekOutcome::Applied),
        })
    );
    assert_eq!(h.entries("hide_overlay").len(), 1);
    assert!(h.entries("show_overlay").is_empty());
    assert_eq!(h.plays(), vec!["c.mp3"]);
    assert_eq!(h.entries("seek"), vec!["seek:45.5"]);
}

#[tokio::test]
async fn saved_index_beyond_shorter_playlist_wraps() {
    let h = Harness::new();
    returning_visitor(&h, "5", "0");
    let mut session = h.session();

    session.boot(Some("a.mp3,b.mp3")).await;

    assert_eq!(h.plays(), vec!["b.mp3"]);
    assert_eq!(session.controller().index(), 1);
}

#[tokio::test]
async fn stale_position_starts_track_from_zero() {
    let h = Harness::new();
    returning_visitor(&h, "0", "900");
    h.sink.borrow_mut().duration = Some(120.0);
    let mut session = h.session();

    let boot = session.boot(Some("a.mp3")).await;

    assert_eq!(
        boot,
        BootOutcome::Resume(ResumeOutcome::Resumed {
            index: 0,
            seek: None
        })
    );
    assert!(h.entries("seek").is_empty());
}

#[tokio::test]
async fn corrupt_record_resumes_from_the_top() {
    let h = Harness::new();
    returning_visitor(&h, "not-a-number", "12");
    let mut session = h.session();

    session.boot(Some("a.mp3,b.mp3")).await;

    assert_eq!(h.plays(), vec!["a.mp3"]);
    assert!(h.entries("seek").is_empty());
}

#[tokio::test]
async fn refused_autoplay_waits_for_manual_resume() {
    let h = Harness::new();
    returning_visitor(&h, "1", "30");
    h.sink.borrow_mut().not_allowed = true;
    h.sink.borrow_mut().duration = Some(200.0);
    let mut session = h.session();

    let boot = session.boot(Some("a.mp3,b.mp3,c.mp3")).await;

    assert_eq!(boot, BootOutcome::Resume(ResumeOutcome::AwaitingGesture));
    assert!(session.is_awaiting_gesture());
    assert_eq!(h.plays(), vec!["b.mp3"]);
    assert_eq!(h.entries("show_resume").len(), 1);
    assert!(h.entries("file_picker").is_empty());

    // The saved record survives the refused attempt
    let saved = h.persistence().load();
    assert_eq!((saved.index, saved.position_secs), (1, 30.0));

    // The click supplies the gesture
    h.sink.borrow_mut().not_allowed = false;
    h.clear_journal();
    let outcome = session.resume_clicked().await.unwrap();

    assert_eq!(
        outcome,
        ChainOutcome::Playlist {
            index: 1,
            attempts: 1
        }
    );
    assert_eq!(h.plays(), vec!["b.mp3"]);
    assert_eq!(h.entries("seek"), vec!["seek:30"]);
    assert!(h.position_of("hide_resume") < h.position_of("play:b.mp3"));
    assert!(!session.is_awaiting_gesture());
    assert_eq!(session.controller().state(), PlayerState::Playing);
}

#[tokio::test]
async fn manual_resume_falls_through_when_saved_track_fails() {
    let h = Harness::new();
    returning_visitor(&h, "0", "30");
    h.sink.borrow_mut().not_allowed = true;
    h.sink.borrow_mut().duration = Some(200.0);
    let mut session = h.session();
    session.boot(Some("a.mp3,b.mp3")).await;

    h.sink.borrow_mut().not_allowed = false;
    h.fail(&["a.mp3"]);
    h.clear_journal();
    let outcome = session.resume_clicked().await.unwrap();

    assert_eq!(
        outcome,
        ChainOutcome::Playlist {
            index: 1,
            attempts: 2
        }
    );
    // Position belonged to a.mp3
    assert!(h.entries("seek").is_empty());
}

#[tokio::test]
async fn resume_runs_once_per_page_view() {
    let h = Harness::new();
    returning_visitor(&h, "0", "0");
    let mut session = h.session();

    session.boot(Some("a.mp3")).await;
    let again = session.boot(Some("a.mp3")).await;

    assert_eq!(again, BootOutcome::Resume(ResumeOutcome::Skipped));
    assert_eq!(h.plays().len(), 1);
}

// ===== Nothing playable =====

#[tokio::test]
async fn exhausted_chain_opens_file_picker_exactly_once() {
    let h = Harness::new();
    h.fail(&["a.mp3", "b.mp3", DEFAULT_ASSET]);
    let mut session = h.session();
    session.boot(Some("a.mp3|b.mp3")).await;

    let outcome = session.activate_overlay(GateInput::Click).await;

    assert!(matches!(
        outcome,
        Some(Err(PlaybackError::ChainExhausted { attempts: 3 }))
    ));
    assert_eq!(h.entries("file_picker").len(), 1);
    assert_eq!(h.entries("show_resume").len(), 1);
    assert!(session.is_file_prompt_open());

    // Later failures surface the resume control, not another dialog
    assert!(session.toggle().await.is_err());
    assert_eq!(h.entries("file_picker").len(), 1);
}

#[tokio::test]
async fn picked_file_plays_and_is_not_persisted() {
    let h = Harness::new();
    h.fail(&["a.mp3", DEFAULT_ASSET]);
    let mut session = h.session();
    session.boot(Some("a.mp3")).await;
    session.activate_overlay(GateInput::Click).await;

    session
        .file_selected("blob:https://afk.example/5e1f".into())
        .await
        .unwrap();

    assert_eq!(session.controller().state(), PlayerState::Playing);
    assert!(!session.is_file_prompt_open());
    assert!(!session.is_awaiting_gesture());
    assert_eq!(h.entries("hide_resume").len(), 1);

    h.clock.set(60_000);
    session.tick();
    session.teardown();
    assert_eq!(h.store.raw(&h.keys().index), None);
}

// ===== Page lifecycle =====

#[tokio::test]
async fn hidden_tab_stops_timer_and_visible_restarts_it() {
    let h = Harness::new();
    let mut session = h.session();
    session.boot(Some("a.mp3")).await;
    session.activate_overlay(GateInput::Click).await;
    h.sink.borrow_mut().current_time = 8.0;

    session.visibility_changed(true);
    assert!(!h.ticker_running.get());
    assert_eq!(h.persistence().load().position_secs, 8.0);

    session.visibility_changed(false);
    assert!(h.ticker_running.get());
}

#[tokio::test]
async fn toggle_pauses_and_resumes() {
    let h = Harness::new();
    let mut session = h.session();
    session.boot(Some("a.mp3")).await;
    session.activate_overlay(GateInput::Click).await;

    session.toggle().await.unwrap();
    assert_eq!(session.controller().state(), PlayerState::Paused);

    session.toggle().await.unwrap();
    assert_eq!(session.controller().state(), PlayerState::Playing);
    assert_eq!(h.entries("resume").len(), 1);
}

#[tokio::test]
async fn playlist_plays_through_on_track_end() {
    let h = Harness::new();
    let mut session = h.session();
    session.boot(Some("a.mp3,b.mp3")).await;
    session.activate_overlay(GateInput::Click).await;

    session.media_ended().await;
    session.media_ended().await;

    assert_eq!(h.plays(), vec!["a.mp3", "b.mp3", "a.mp3"]);
}

#[tokio::test]
async fn track_change_while_hidden_keeps_timer_off() {
    let h = Harness::new();
    let mut session = h.session();
    session.boot(Some("a.mp3,b.mp3")).await;
    session.activate_overlay(GateInput::Click).await;

    session.visibility_changed(true);
    session.media_ended().await;

    assert_eq!(h.plays(), vec!["a.mp3", "b.mp3"]);
    assert_eq!(session.controller().state(), PlayerState::Playing);
    assert!(!h.ticker_running.get());
    assert_eq!(h.persistence().load().index, 1);

    session.visibility_changed(false);
    assert!(h.ticker_running.get());
}

// ===== Back/forward cache =====

#[tokio::test]
async fn checkpoint_persists_without_touching_playback() {
    let h = Harness::new();
    let mut session = h.session();
    session.boot(Some("a.mp3")).await;
    session.activate_overlay(GateInput::Click).await;
    h.sink.borrow_mut().current_time = 5.0;

    session.checkpoint();

    assert_eq!(h.persistence().load().position_secs, 5.0);
    assert_eq!(session.controller().state(), PlayerState::Playing);
    assert!(h.ticker_running.get());
}

#[tokio::test]
async fn suspended_page_keeps_media_and_resumes_when_restored() {
    let h = Harness::new();
    let mut session = h.session();
    session.boot(Some("a.mp3")).await;
    session.activate_overlay(GateInput::Click).await;
    h.sink.borrow_mut().current_time = 12.0;

    session.suspend();

    assert_eq!(session.controller().state(), PlayerState::Paused);
    assert!(!h.ticker_running.get());
    assert!(h.entries("release").is_empty());
    assert_eq!(h.entries("pause").len(), 1);
    assert_eq!(h.persistence().load().position_secs, 12.0);
    assert_eq!(h.store.raw(&h.keys().playing).as_deref(), Some("true"));

    session.restored().await;

    assert_eq!(h.entries("resume").len(), 1);
    assert_eq!(session.controller().state(), PlayerState::Playing);
    assert!(h.ticker_running.get());
    assert!(h.entries("show_resume").is_empty());
}

#[tokio::test]
async fn refused_restore_shows_manual_resume() {
    let h = Harness::new();
    let mut session = h.session();
    session.boot(Some("a.mp3")).await;
    session.activate_overlay(GateInput::Click).await;
    session.suspend();

    h.sink.borrow_mut().not_allowed = true;
    session.restored().await;

    assert_eq!(h.entries("show_resume").len(), 1);
    assert!(session.is_awaiting_gesture());

    h.sink.borrow_mut().not_allowed = false;
    session.resume_clicked().await.unwrap();
    assert_eq!(session.controller().state(), PlayerState::Playing);
}

#[tokio::test]
async fn paused_page_stays_paused_after_restore() {
    let h = Harness::new();
    let mut session = h.session();
    session.boot(Some("a.mp3")).await;
    session.activate_overlay(GateInput::Click).await;
    session.toggle().await.unwrap();

    session.suspend();
    session.restored().await;

    assert!(h.entries("resume").is_empty());
    assert_eq!(session.controller().state(), PlayerState::Paused);
    assert!(!h.ticker_running.get());
}
