use domain::{NewParkingRequest, RequestStatus};
use pms_requests::{ParkingRequestBook, RequestError};

fn request(unit: &str, name: &str, plate: &str) -> NewParkingRequest {
    NewParkingRequest {
        resident_unit: unit.to_string(),
        visitor_name: name.to_string(),
        vehicle_plate: plate.to_string(),
        scheduled_at_ms: 1_000,
        duration_hours: 2,
    }
}

#[test]
fn submit_starts_pending() {
    let book = ParkingRequestBook::new();
    let submitted = book
        .submit(request(" 302 ", "Maria Garcia", "xyz-789"), 10)
        .expect("submit");

    assert_eq!(submitted.status, RequestStatus::Pending);
    assert_eq!(submitted.resident_unit, "302");
    assert_eq!(submitted.vehicle_plate, "XYZ-789");
    assert_eq!(submitted.spot_assigned, None);
    assert_eq!(book.pending_count().expect("count"), 1);
}

#[test]
fn submit_validates_input() {
    let book = ParkingRequestBook::new();

    let err = book
        .submit(request("302", "  ", "XYZ-789"), 0)
        .expect_err("blank name");
    assert!(matches!(err, RequestError::Invalid(_)));

    let mut long_stay = request("302", "Maria Garcia", "XYZ-789");
    long_stay.duration_hours = 5;
    let err = book.submit(long_stay, 0).expect_err("too long");
    assert!(matches!(err, RequestError::Invalid(_)));
    assert!(book.list(None).expect("list").is_empty());
}

#[test]
fn approve_then_complete_for_spot() {
    let book = ParkingRequestBook::new();
    let submitted = book
        .submit(request("302", "Juan Perez", "ABC-123"), 0)
        .expect("submit");

    let approved = book.approve(&submitted.id, "V-02", 5).expect("approve");
    assert_eq!(approved.status, RequestStatus::Approved);
    assert_eq!(approved.spot_assigned.as_deref(), Some("V-02"));
    assert_eq!(approved.updated_at_ms, 5);

    assert_eq!(book.complete_for_spot("V-01", 6).expect("other spot"), None);
    let completed = book
        .complete_for_spot("V-02", 7)
        .expect("complete")
        .expect("approved request on V-02");
    assert_eq!(completed.id, submitted.id);
    assert_eq!(completed.status, RequestStatus::Completed);
    assert_eq!(book.complete_for_spot("V-02", 8).expect("again"), None);
}

#[test]
fn illegal_transitions_are_rejected() {
    let book = ParkingRequestBook::new();
    let submitted = book
        .submit(request("302", "Carlos Lopez", "DEF-456"), 0)
        .expect("submit");

    let err = book.complete(&submitted.id, 1).expect_err("pending");
    assert!(matches!(err, RequestError::InvalidTransition { .. }));

    book.reject(&submitted.id, 2).expect("reject");
    let err = book.approve(&submitted.id, "V-01", 3).expect_err("rejected");
    assert!(matches!(err, RequestError::InvalidTransition { .. }));

    let err = book.reject("missing", 4).expect_err("missing");
    assert_eq!(err, RequestError::NotFound("missing".to_string()));
}

#[test]
fn list_is_newest_first_and_filters_by_status() {
    let book = ParkingRequestBook::new();
    let first = book
        .submit(request("302", "Juan Perez", "ABC-123"), 0)
        .expect("first");
    let second = book
        .submit(request("404", "Maria Garcia", "XYZ-789"), 1)
        .expect("second");
    book.approve(&first.id, "V-01", 2).expect("approve");

    let all = book.list(None).expect("all");
    assert_eq!(all[0].id, second.id);
    assert_eq!(all[1].id, first.id);

    let pending = book.list(Some(RequestStatus::Pending)).expect("pending");
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, second.id);
}
