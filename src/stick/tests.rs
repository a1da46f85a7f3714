//! Runtime scenario tests for the stick actor
//!
//! All tests run on tokio's paused clock: sleeps auto-advance virtual time,
//! so interval counts are deterministic.

use super::*;
use crate::config::StickConfig;
use crate::error::StickError;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

type Received = Arc<Mutex<Vec<PolarCommand>>>;

fn make_config(mode: EmissionMode) -> StickConfig {
    StickConfig {
        emission_mode: mode,
        ..StickConfig::default()
    }
}

/// Spawn an actor on a 400x400 control (center 200,200 / radius 150)
async fn spawn_stick(mode: EmissionMode) -> (StickHandle, Received) {
    let (handle, _task) = StickActor::spawn(&make_config(mode)).unwrap();
    let received: Received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    handle
        .on_value_changed(move |cmd| sink.lock().push(cmd))
        .unwrap();
    handle.resize(400.0, 400.0).unwrap();
    (handle, received)
}

/// Wait until the actor processed everything sent so far
async fn settle(handle: &StickHandle) -> SessionState {
    handle.session().await.unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_press_move_release_scenario() {
    let (handle, received) = spawn_stick(EmissionMode::Threshold).await;

    handle.press(200.0, 200.0).unwrap();
    settle(&handle).await;
    assert_eq!(*received.lock(), vec![PolarCommand::CENTER]);

    handle.move_to(400.0, 200.0).unwrap();
    settle(&handle).await;
    assert_eq!(
        received.lock().last(),
        Some(&PolarCommand { angle: 90, power: 100, direction: Direction::Right })
    );

    handle.release().unwrap();
    assert_eq!(settle(&handle).await, SessionState::Idle);
    let count_at_release = received.lock().len();
    assert_eq!(received.lock().last(), Some(&PolarCommand::CENTER));

    // Nothing may follow the terminal command
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(received.lock().len(), count_at_release);
}

#[tokio::test(start_paused = true)]
async fn test_threshold_mode_rate_limits_moves() {
    let (handle, received) = spawn_stick(EmissionMode::Threshold).await;

    handle.press(275.0, 200.0).unwrap(); // angle 90, power 50
    handle.move_to(277.0, 200.0).unwrap(); // power 51
    handle.move_to(278.0, 200.0).unwrap(); // power 52
    settle(&handle).await;
    assert_eq!(received.lock().len(), 1);

    // No positional change, but the minimum interval elapsed
    tokio::time::sleep(Duration::from_millis(50)).await;
    handle.move_to(278.0, 200.0).unwrap();
    settle(&handle).await;
    assert_eq!(received.lock().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_threshold_mode_has_no_background_emissions() {
    let (handle, received) = spawn_stick(EmissionMode::Threshold).await;

    handle.press(300.0, 200.0).unwrap();
    tokio::time::sleep(Duration::from_millis(1000)).await;
    settle(&handle).await;
    assert_eq!(received.lock().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_continuous_mode_emits_steadily_while_held() {
    let (handle, received) = spawn_stick(EmissionMode::Continuous).await;

    handle.press(200.0, 50.0).unwrap();
    settle(&handle).await;

    // 5 loop intervals, plus a little slack to stay clear of the boundary
    tokio::time::sleep(Duration::from_millis(550)).await;
    settle(&handle).await;

    let commands = received.lock().clone();
    let ticks = commands.len() - 1; // first one is the press
    assert!((4..=6).contains(&ticks), "got {} ticks", ticks);

    let expected = PolarCommand { angle: 0, power: 100, direction: Direction::Front };
    assert!(commands.iter().all(|cmd| *cmd == expected));
}

#[tokio::test(start_paused = true)]
async fn test_continuous_mode_moves_only_show_up_on_ticks() {
    let (handle, received) = spawn_stick(EmissionMode::Continuous).await;

    handle.press(200.0, 200.0).unwrap();
    handle.move_to(350.0, 200.0).unwrap();
    settle(&handle).await;
    assert_eq!(*received.lock(), vec![PolarCommand::CENTER]);

    tokio::time::sleep(Duration::from_millis(110)).await;
    settle(&handle).await;
    assert_eq!(
        received.lock().last(),
        Some(&PolarCommand { angle: 90, power: 100, direction: Direction::Right })
    );
}

#[tokio::test(start_paused = true)]
async fn test_continuous_mode_stops_on_release() {
    let (handle, received) = spawn_stick(EmissionMode::Continuous).await;

    handle.press(300.0, 300.0).unwrap();
    tokio::time::sleep(Duration::from_millis(250)).await;
    handle.release().unwrap();
    settle(&handle).await;

    let count_at_release = received.lock().len();
    assert_eq!(received.lock().last(), Some(&PolarCommand::CENTER));

    // Two full loop intervals with no further ticks
    tokio::time::sleep(Duration::from_millis(200)).await;
    settle(&handle).await;
    assert_eq!(received.lock().len(), count_at_release);
}

#[tokio::test(start_paused = true)]
async fn test_repress_keeps_a_single_tick_stream() {
    let (handle, received) = spawn_stick(EmissionMode::Continuous).await;

    handle.press(200.0, 50.0).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    // New session without a release in between
    handle.press(350.0, 200.0).unwrap();
    settle(&handle).await;
    let before = received.lock().len();
    assert_eq!(before, 2);

    tokio::time::sleep(Duration::from_millis(1050)).await;
    settle(&handle).await;

    let after = received.lock().clone();
    let ticks = after.len() - before;
    // Overlapping loops would double this
    assert!((9..=11).contains(&ticks), "got {} ticks", ticks);

    let right = PolarCommand { angle: 90, power: 100, direction: Direction::Right };
    assert!(after[before..].iter().all(|cmd| *cmd == right));
}

#[tokio::test(start_paused = true)]
async fn test_release_while_idle_is_noop() {
    let (handle, received) = spawn_stick(EmissionMode::Threshold).await;

    handle.release().unwrap();
    handle.release().unwrap();
    assert_eq!(settle(&handle).await, SessionState::Idle);
    assert!(received.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_each_session_starts_fresh() {
    let (handle, received) = spawn_stick(EmissionMode::Threshold).await;

    handle.press(275.0, 200.0).unwrap();
    handle.release().unwrap();
    // Same position as the first press: still emitted unconditionally
    handle.press(275.0, 200.0).unwrap();
    settle(&handle).await;

    let commands = received.lock().clone();
    assert_eq!(commands.len(), 3);
    assert_eq!(commands[0], commands[2]);
}

#[tokio::test(start_paused = true)]
async fn test_snapshots_follow_contact() {
    let (handle, _received) = spawn_stick(EmissionMode::Threshold).await;
    let mut snapshots = handle.subscribe_snapshots();

    handle.press(1000.0, 200.0).unwrap();
    settle(&handle).await;

    let snapshot = *snapshots.borrow_and_update();
    assert_eq!(snapshot.pad.radius, 150.0);
    assert_eq!(snapshot.contact, Point::new(350.0, 200.0));

    handle.release().unwrap();
    settle(&handle).await;
    assert!(snapshots.has_changed().unwrap());
    assert_eq!(snapshots.borrow_and_update().contact, Point::new(200.0, 200.0));
}

#[tokio::test(start_paused = true)]
async fn test_out_of_range_pointer_keeps_contact_in_pad() {
    let (handle, received) = spawn_stick(EmissionMode::Threshold).await;
    let mut snapshots = handle.subscribe_snapshots();

    handle.press(350.0, 200.0).unwrap();
    handle.move_to(f32::NAN, 200.0).unwrap();
    handle.move_to(200.0, f32::INFINITY).unwrap();
    settle(&handle).await;

    assert_eq!(snapshots.borrow_and_update().contact, Point::new(350.0, 200.0));
    assert_eq!(received.lock().len(), 1);

    tokio::time::sleep(Duration::from_millis(60)).await;
    handle.move_to(-3.0e38, 200.0).unwrap();
    settle(&handle).await;

    let contact = snapshots.borrow_and_update().contact;
    assert!(contact.distance_to(Point::new(200.0, 200.0)) <= 150.0 + 1e-3);
    assert_eq!(
        received.lock().last(),
        Some(&PolarCommand { angle: 270, power: 100, direction: Direction::Left })
    );
}

#[tokio::test(start_paused = true)]
async fn test_listener_registration_is_exclusive() {
    let (handle, _received) = spawn_stick(EmissionMode::Threshold).await;

    assert_eq!(
        handle.on_value_changed(|_| {}),
        Err(StickError::ListenerAlreadyRegistered)
    );
    assert!(handle.unregister_listener());
    assert!(handle.on_value_changed(|_| {}).is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_releases_and_closes() {
    let (handle, task) = StickActor::spawn(&make_config(EmissionMode::Continuous)).unwrap();
    let received: Received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    handle.on_value_changed(move |cmd| sink.lock().push(cmd)).unwrap();
    handle.resize(400.0, 400.0).unwrap();

    handle.press(350.0, 200.0).unwrap();
    handle.shutdown();
    task.await.unwrap();

    assert_eq!(received.lock().last(), Some(&PolarCommand::CENTER));
    assert_eq!(handle.press(200.0, 200.0), Err(StickError::RuntimeClosed));
    assert!(!handle.unregister_listener());
}

#[tokio::test]
async fn test_spawn_rejects_invalid_config() {
    let config = StickConfig {
        loop_interval_ms: 0,
        ..StickConfig::default()
    };
    assert!(matches!(StickActor::spawn(&config), Err(StickError::InvalidConfig(_))));
}
