#![expect(
    clippy::expect_used,
    reason = "tests should fail fast when setup breaks"
)]

//! Start/stop behaviour of the tracker against slow providers.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rstest::rstest;
use tourguide_core::User;
use tourguide_core::test_support::{FixedRewardOracle, StaticLocationProvider, attraction_at};
use tourguide_service::{EngineConfig, TourGuideService, Tracker};
use uuid::Uuid;

fn slow_service(users: usize, latency: Duration) -> Arc<TourGuideService> {
    let provider = StaticLocationProvider::new(vec![attraction_at("Bronx Zoo", 40.852_905, -73.872_971)])
        .at(geo::Coord {
            x: -73.872_971,
            y: 40.852_905,
        })
        .with_latency(latency);
    let service = TourGuideService::new(
        Arc::new(provider),
        Arc::new(FixedRewardOracle::new(5)),
        EngineConfig::default()
            .with_tracker_workers(1)
            .with_tracking_interval(Duration::from_millis(10)),
    )
    .expect("valid configuration");
    for i in 0..users {
        service.add_user(User::new(Uuid::new_v4(), format!("internalUser{i}")));
    }
    Arc::new(service)
}

#[rstest]
fn stop_mid_cycle_halts_the_schedule() {
    let service = slow_service(20, Duration::from_millis(50));
    let tracker = Tracker::new(Arc::clone(&service));
    tracker.start().expect("tracker starts");
    thread::sleep(Duration::from_millis(120));

    let stop_started = Instant::now();
    tracker.stop();
    // Stop does not wait for the whole 1 second cycle.
    assert!(stop_started.elapsed() < Duration::from_millis(500));
    assert!(!tracker.is_running());
    assert_eq!(tracker.cycles_started(), 1);
    assert_eq!(tracker.cycles_completed(), 0);

    let tracked_at_stop: usize = service
        .all_users()
        .iter()
        .map(|user| user.visited_locations().len())
        .sum();
    thread::sleep(Duration::from_millis(400));

    assert_eq!(tracker.cycles_started(), 1);
    assert_eq!(tracker.cycles_completed(), 0);
    let tracked_later: usize = service
        .all_users()
        .iter()
        .map(|user| user.visited_locations().len())
        .sum();
    // At most the task already running on the single worker finishes.
    assert!(tracked_later <= tracked_at_stop + 1);
    assert!(tracked_later < 20);
}

#[rstest]
fn stop_is_safe_from_another_thread() {
    let service = slow_service(4, Duration::from_millis(5));
    let tracker = Arc::new(Tracker::new(service));
    tracker.start().expect("tracker starts");
    assert!(tracker.wait_for_cycles(2, Duration::from_secs(10)));

    let stoppers: Vec<_> = (0..3)
        .map(|_| {
            let tracker = Arc::clone(&tracker);
            thread::spawn(move || tracker.stop())
        })
        .collect();
    for stopper in stoppers {
        stopper.join().expect("stop completes");
    }

    assert!(tracker.is_stopped());
    let completed = tracker.cycles_completed();
    let started = tracker.cycles_started();
    thread::sleep(Duration::from_millis(100));
    assert_eq!(tracker.cycles_completed(), completed);
    assert_eq!(tracker.cycles_started(), started);
}

#[rstest]
fn failing_users_are_reported_per_cycle() {
    let unlucky = User::new(Uuid::new_v4(), "internalUserX");
    let provider = StaticLocationProvider::new(vec![attraction_at("Origin", 0.0, 0.0)])
        .failing_for(unlucky.id());
    let service = TourGuideService::new(
        Arc::new(provider),
        Arc::new(FixedRewardOracle::new(1)),
        EngineConfig::default()
            .with_tracker_workers(2)
            .with_tracking_interval(Duration::from_secs(3_600)),
    )
    .expect("valid configuration");
    service.add_user(unlucky);
    service.add_user(User::new(Uuid::new_v4(), "internalUser0"));
    let tracker = Tracker::new(Arc::new(service));

    tracker.start().expect("tracker starts");
    assert!(tracker.wait_for_cycles(1, Duration::from_secs(10)));
    tracker.stop();

    let summary = tracker.last_cycle().expect("cycle summary");
    assert_eq!(summary.users, 2);
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.failures, 1);
}
