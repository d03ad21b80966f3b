use domain::{SpotClaim, SpotStatus};
use pms_clock::{OccupancyClock, spawn_ticker};
use pms_registry::SpotRegistry;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const MINUTE_MS: i64 = 60_000;

fn registry_with_claim(allowance: i64) -> SpotRegistry {
    let registry = SpotRegistry::with_inventory("V", 3, allowance);
    registry
        .claim("V-01", SpotClaim::new("visitor-1", None))
        .expect("claim");
    registry
}

#[test]
fn advance_zero_is_noop() {
    let registry = registry_with_claim(10);
    let clock = OccupancyClock::new();

    assert!(clock.advance(&registry, 0).expect("advance").is_empty());
    let spot = registry.get("V-01").expect("get").expect("spot");
    assert_eq!(spot.remaining_minutes, Some(10));
}

#[test]
fn advance_only_ticks_bound_spots() {
    let registry = registry_with_claim(10);
    registry.reserve("V-02", "404").expect("reserve");
    let clock = OccupancyClock::new();

    let outcomes = clock.advance(&registry, 4).expect("advance");
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].spot.code, "V-01");
    assert_eq!(outcomes[0].spot.remaining_minutes, Some(6));
}

#[test]
fn bulk_advance_matches_single_steps() {
    for minutes in [0_u32, 1, 9, 10, 11, 45] {
        let bulk = registry_with_claim(10);
        let stepped = registry_with_claim(10);
        let clock = OccupancyClock::new();

        let bulk_outcomes = clock.advance(&bulk, minutes).expect("bulk");
        let mut overtime_steps = 0;
        for _ in 0..minutes {
            overtime_steps += clock
                .advance(&stepped, 1)
                .expect("step")
                .iter()
                .filter(|outcome| outcome.entered_overtime)
                .count();
        }

        assert_eq!(
            bulk.get("V-01").expect("get"),
            stepped.get("V-01").expect("get")
        );
        let bulk_overtime = bulk_outcomes
            .iter()
            .filter(|outcome| outcome.entered_overtime)
            .count();
        assert_eq!(bulk_overtime, overtime_steps, "minutes={minutes}");
    }
}

#[test]
fn catch_up_carries_partial_minutes() {
    let registry = registry_with_claim(120);
    let clock = OccupancyClock::new();

    assert!(clock.catch_up(&registry, 0).expect("anchor").is_empty());
    assert_eq!(clock.settled_at_ms(), Some(0));

    clock.catch_up(&registry, 90_000).expect("catch up");
    let spot = registry.get("V-01").expect("get").expect("spot");
    assert_eq!(spot.remaining_minutes, Some(119));
    assert_eq!(clock.settled_at_ms(), Some(MINUTE_MS));

    clock.catch_up(&registry, 120_000).expect("catch up");
    let spot = registry.get("V-01").expect("get").expect("spot");
    assert_eq!(spot.remaining_minutes, Some(118));
}

#[test]
fn catch_up_after_pause_equals_continuous_ticking() {
    let paused = registry_with_claim(120);
    let continuous = registry_with_claim(120);
    let paused_clock = OccupancyClock::starting_at(0);
    let continuous_clock = OccupancyClock::starting_at(0);

    for minute in 1..=130 {
        continuous_clock
            .catch_up(&continuous, minute * MINUTE_MS)
            .expect("tick");
    }
    paused_clock
        .catch_up(&paused, 130 * MINUTE_MS)
        .expect("catch up");

    let paused_spot = paused.get("V-01").expect("get").expect("spot");
    let continuous_spot = continuous.get("V-01").expect("get").expect("spot");
    assert_eq!(paused_spot, continuous_spot);
    assert_eq!(paused_spot.status, SpotStatus::Overtime);
    assert_eq!(paused_spot.remaining_minutes, Some(-10));
}

#[test]
fn backwards_time_is_ignored() {
    let registry = registry_with_claim(10);
    let clock = OccupancyClock::starting_at(5 * MINUTE_MS);

    assert!(clock.catch_up(&registry, MINUTE_MS).expect("backwards").is_empty());
    assert_eq!(clock.settled_at_ms(), Some(5 * MINUTE_MS));
    let spot = registry.get("V-01").expect("get").expect("spot");
    assert_eq!(spot.remaining_minutes, Some(10));
}

#[tokio::test]
async fn ticker_invokes_callback() {
    let count = Arc::new(AtomicUsize::new(0));
    let observed = count.clone();
    let handle = spawn_ticker(Duration::from_millis(10), move || {
        observed.fetch_add(1, Ordering::Relaxed);
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    handle.abort();
    assert!(count.load(Ordering::Relaxed) >= 1);
}
