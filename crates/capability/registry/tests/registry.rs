use domain::{ParkingSpot, SpotClaim, SpotStatus};
use pms_registry::{RegistryError, ReleaseOutcome, SpotRegistry};
use std::sync::Arc;
use std::thread;

fn claim_for(visitor_id: &str) -> SpotClaim {
    SpotClaim::new(visitor_id, Some("502".to_string()))
}

#[test]
fn inventory_codes_are_padded_and_available() {
    let registry = SpotRegistry::with_inventory("V", 12, 120);
    let spots = registry.list().expect("list");

    assert_eq!(spots.len(), 12);
    assert_eq!(spots[0].code, "V-01");
    assert_eq!(spots[11].code, "V-12");
    assert!(spots.iter().all(|spot| spot.status == SpotStatus::Available));
    assert_eq!(registry.counts().expect("counts").available, 12);
}

#[test]
fn duplicate_seed_codes_rejected() {
    let result = SpotRegistry::from_spots(vec![
        ParkingSpot::new("a", "V-01", 120),
        ParkingSpot::new("b", "V-01", 120),
    ]);
    assert!(matches!(result, Err(RegistryError::Invalid(_))));
}

#[test]
fn claim_sets_allowance_and_binding() {
    let registry = SpotRegistry::with_inventory("V", 4, 120);
    let spot = registry
        .claim(
            "V-01",
            claim_for("visitor-1").with_vehicle("Juan Perez", Some("ABC-123".to_string()), 1_000),
        )
        .expect("claim");

    assert_eq!(spot.status, SpotStatus::Occupied);
    assert_eq!(spot.remaining_minutes, Some(120));
    assert_eq!(spot.bound_visitor_id.as_deref(), Some("visitor-1"));
    assert_eq!(spot.resident_unit.as_deref(), Some("502"));
    assert_eq!(spot.vehicle_plate.as_deref(), Some("ABC-123"));
    assert_eq!(spot.entry_time_ms, Some(1_000));
    assert!(spot.is_consistent());
}

#[test]
fn second_claim_is_rejected_without_side_effects() {
    let registry = SpotRegistry::with_inventory("V", 2, 120);
    registry.claim("V-01", claim_for("visitor-1")).expect("first");

    let err = registry
        .claim("V-01", claim_for("visitor-2"))
        .expect_err("second");
    assert_eq!(
        err,
        RegistryError::SpotUnavailable {
            code: "V-01".to_string(),
            status: SpotStatus::Occupied,
        }
    );

    let spot = registry.get("V-01").expect("get").expect("spot");
    assert_eq!(spot.bound_visitor_id.as_deref(), Some("visitor-1"));
}

#[test]
fn concurrent_claims_have_single_winner() {
    let registry = Arc::new(SpotRegistry::with_inventory("V", 1, 120));
    let handles: Vec<_> = (0..8)
        .map(|index| {
            let registry = registry.clone();
            thread::spawn(move || {
                registry
                    .claim("V-01", SpotClaim::new(format!("visitor-{}", index), None))
                    .is_ok()
            })
        })
        .collect();

    let winners = handles
        .into_iter()
        .map(|handle| handle.join().expect("join"))
        .filter(|won| *won)
        .count();
    assert_eq!(winners, 1);
}

#[test]
fn claim_unknown_spot_fails() {
    let registry = SpotRegistry::with_inventory("V", 1, 120);
    let err = registry
        .claim("X-99", claim_for("visitor-1"))
        .expect_err("unknown");
    assert_eq!(err, RegistryError::UnknownSpot("X-99".to_string()));
}

#[test]
fn reserved_spot_can_be_claimed_and_keeps_unit() {
    let registry = SpotRegistry::with_inventory("V", 2, 90);
    let reserved = registry.reserve("V-02", "301").expect("reserve");
    assert_eq!(reserved.status, SpotStatus::Reserved);
    assert!(reserved.is_consistent());

    assert!(matches!(
        registry.reserve("V-02", "302"),
        Err(RegistryError::SpotUnavailable { .. })
    ));

    let spot = registry
        .claim("V-02", SpotClaim::new("visitor-9", None))
        .expect("claim reserved");
    assert_eq!(spot.status, SpotStatus::Occupied);
    assert_eq!(spot.resident_unit.as_deref(), Some("301"));
    assert_eq!(spot.remaining_minutes, Some(90));
}

#[test]
fn reserve_requires_unit() {
    let registry = SpotRegistry::with_inventory("V", 1, 120);
    assert!(matches!(
        registry.reserve("V-01", "  "),
        Err(RegistryError::Invalid(_))
    ));
}

#[test]
fn release_is_idempotent_on_available() {
    let registry = SpotRegistry::with_inventory("V", 1, 120);
    let before = registry.get("V-01").expect("get");

    let outcome = registry.release("V-01").expect("release");
    assert_eq!(outcome, ReleaseOutcome::AlreadyAvailable);
    assert_eq!(registry.get("V-01").expect("get"), before);
}

#[test]
fn release_clears_binding() {
    let registry = SpotRegistry::with_inventory("V", 1, 120);
    registry.claim("V-01", claim_for("visitor-1")).expect("claim");
    registry.tick("V-01", 121).expect("tick");

    let outcome = registry.release("V-01").expect("release");
    match outcome {
        ReleaseOutcome::Released { previous } => {
            assert_eq!(previous.status, SpotStatus::Overtime);
            assert_eq!(previous.overtime_minutes(), 1);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    let spot = registry.get("V-01").expect("get").expect("spot");
    assert_eq!(spot.status, SpotStatus::Available);
    assert!(spot.bound_visitor_id.is_none());
    assert!(spot.resident_unit.is_none());
    assert!(spot.remaining_minutes.is_none());
}

#[test]
fn release_visitor_checks_binding() {
    let registry = SpotRegistry::with_inventory("V", 2, 120);
    registry.claim("V-01", claim_for("visitor-1")).expect("claim");
    registry.reserve("V-02", "404").expect("reserve");

    let err = registry
        .release_visitor("V-01", "visitor-2")
        .expect_err("wrong visitor");
    assert!(matches!(err, RegistryError::SpotNotBound { .. }));
    assert_eq!(
        registry.get("V-01").expect("get").expect("spot").status,
        SpotStatus::Occupied
    );

    assert!(matches!(
        registry.release_visitor("V-02", "visitor-1"),
        Err(RegistryError::SpotNotBound { .. })
    ));

    assert!(
        registry
            .release_visitor("V-01", "visitor-1")
            .expect("release")
            .was_released()
    );
    assert_eq!(
        registry
            .release_visitor("V-01", "visitor-1")
            .expect("duplicate exit"),
        ReleaseOutcome::AlreadyAvailable
    );
}

#[test]
fn tick_ignores_idle_spots() {
    let registry = SpotRegistry::with_inventory("V", 2, 120);
    registry.reserve("V-02", "101").expect("reserve");

    assert!(registry.tick("V-01", 5).expect("tick").is_none());
    assert!(registry.tick("V-02", 5).expect("tick").is_none());
    assert!(registry.tick_all(5).expect("tick all").is_empty());
}

#[test]
fn tick_crosses_into_overtime_in_one_step() {
    let registry = SpotRegistry::with_inventory("V", 1, 2);
    registry.claim("V-01", claim_for("visitor-1")).expect("claim");

    let outcome = registry.tick("V-01", 2).expect("tick").expect("outcome");
    assert!(!outcome.entered_overtime);
    assert_eq!(outcome.spot.status, SpotStatus::Occupied);
    assert_eq!(outcome.spot.remaining_minutes, Some(0));

    let outcome = registry.tick("V-01", 1).expect("tick").expect("outcome");
    assert!(outcome.entered_overtime);
    assert_eq!(outcome.spot.status, SpotStatus::Overtime);
    assert_eq!(outcome.spot.remaining_minutes, Some(-1));

    let outcome = registry.tick("V-01", 1).expect("tick").expect("outcome");
    assert!(!outcome.entered_overtime);
    assert_eq!(outcome.spot.remaining_minutes, Some(-2));
}

#[test]
fn tick_is_linear() {
    for allowance in [0_i64, 1, 5, 30] {
        for steps in 0_u32..40 {
            let bulk = SpotRegistry::with_inventory("V", 1, allowance);
            let stepped = SpotRegistry::with_inventory("V", 1, allowance);
            bulk.claim("V-01", claim_for("visitor-1")).expect("claim");
            stepped.claim("V-01", claim_for("visitor-1")).expect("claim");

            bulk.tick_all(steps).expect("bulk");
            for _ in 0..steps {
                stepped.tick_all(1).expect("step");
            }

            let bulk_spot = bulk.get("V-01").expect("get").expect("spot");
            let stepped_spot = stepped.get("V-01").expect("get").expect("spot");
            assert_eq!(bulk_spot.status, stepped_spot.status, "R={allowance} N={steps}");
            assert_eq!(bulk_spot.remaining_minutes, stepped_spot.remaining_minutes);
        }
    }
}

#[test]
fn overtime_never_returns_to_occupied_without_release() {
    let registry = SpotRegistry::with_inventory("V", 1, 1);
    registry.claim("V-01", claim_for("visitor-1")).expect("claim");
    registry.tick_all(3).expect("tick");

    for _ in 0..10 {
        registry.tick_all(1).expect("tick");
        let spot = registry.get("V-01").expect("get").expect("spot");
        assert_eq!(spot.status, SpotStatus::Overtime);
    }
    assert!(matches!(
        registry.claim("V-01", claim_for("visitor-2")),
        Err(RegistryError::SpotUnavailable { .. })
    ));

    registry.release("V-01").expect("release");
    let spot = registry.claim("V-01", claim_for("visitor-2")).expect("reclaim");
    assert_eq!(spot.status, SpotStatus::Occupied);
    assert_eq!(spot.remaining_minutes, Some(1));
}

#[test]
fn free_minutes_update_affects_future_claims_only() {
    let registry = SpotRegistry::with_inventory("V", 2, 120);
    registry.claim("V-01", claim_for("visitor-1")).expect("claim");
    registry.set_max_free_minutes(60).expect("update");

    let first = registry.get("V-01").expect("get").expect("spot");
    assert_eq!(first.remaining_minutes, Some(120));
    let second = registry.claim("V-02", claim_for("visitor-2")).expect("claim");
    assert_eq!(second.remaining_minutes, Some(60));

    assert!(registry.set_max_free_minutes(0).is_err());
}

#[test]
fn restore_returns_reserved_spot_to_reservation() {
    let registry = SpotRegistry::with_inventory("V", 2, 120);
    registry.reserve("V-01", "302").expect("reserve");

    let claimed = registry
        .claim_spot("V-01", SpotClaim::new("visitor-1", None))
        .expect("claim");
    assert_eq!(claimed.previous.status, SpotStatus::Reserved);
    assert_eq!(claimed.spot.status, SpotStatus::Occupied);

    assert!(registry.restore(&claimed.previous, "visitor-1").expect("restore"));
    let spot = registry.get("V-01").expect("get").expect("spot");
    assert_eq!(spot.status, SpotStatus::Reserved);
    assert_eq!(spot.resident_unit.as_deref(), Some("302"));
    assert!(spot.bound_visitor_id.is_none());
    assert!(spot.remaining_minutes.is_none());
}

#[test]
fn restore_skips_spot_no_longer_bound_to_visitor() {
    let registry = SpotRegistry::with_inventory("V", 1, 120);
    let claimed = registry
        .claim_spot("V-01", claim_for("visitor-1"))
        .expect("claim");
    registry.release("V-01").expect("release");
    registry.claim("V-01", claim_for("visitor-2")).expect("reclaim");

    assert!(!registry.restore(&claimed.previous, "visitor-1").expect("restore"));
    let spot = registry.get("V-01").expect("get").expect("spot");
    assert_eq!(spot.bound_visitor_id.as_deref(), Some("visitor-2"));
}

#[test]
fn cancel_reservation_only_for_matching_unit() {
    let registry = SpotRegistry::with_inventory("V", 1, 120);
    registry.reserve("V-01", "302").expect("reserve");

    assert!(!registry.cancel_reservation("V-01", "404").expect("other unit"));
    assert_eq!(
        registry.get("V-01").expect("get").expect("spot").status,
        SpotStatus::Reserved
    );
    assert!(registry.cancel_reservation("V-01", "302").expect("cancel"));
    assert_eq!(
        registry.get("V-01").expect("get").expect("spot").status,
        SpotStatus::Available
    );
    assert!(!registry.cancel_reservation("V-01", "302").expect("again"));
}
