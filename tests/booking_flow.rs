use std::sync::Arc;

use carepool::config::Config;
use carepool::console::Console;
use carepool::engine::{RejectionReason, ReservationRegistry};
use carepool::model::*;
use carepool::report::SummaryReporter;

// ── Test infrastructure ──────────────────────────────────────

fn hospital() -> ReservationRegistry {
    ReservationRegistry::from_config(&Config::default()).unwrap()
}

fn book(resource: &str, name: &str, date: &str, start: Option<&str>, end: Option<&str>, quantity: u32) -> BookingRequest {
    BookingRequest {
        resource_type: resource.parse().unwrap(),
        requester: Requester::new(name, &format!("{name}-01")).unwrap(),
        interval: TimeInterval::parse(date, start, end).unwrap(),
        quantity,
    }
}

// ── Tests ────────────────────────────────────────────────────

#[tokio::test]
async fn summary_counts_follow_resource_order() {
    let registry = hospital();
    registry
        .book(book("Ventilator", "vera", "2024-01-01", Some("09:00"), Some("10:00"), 1))
        .await
        .unwrap();
    registry
        .book(book("Bed", "ben", "2024-01-01", Some("09:00"), Some("10:00"), 2))
        .await
        .unwrap();

    let reporter = SummaryReporter::capture(&registry).await;
    assert_eq!(
        reporter.counts_by_resource(),
        vec![(ResourceType::Bed, 2), (ResourceType::Ventilator, 1)]
    );
    assert_eq!(
        reporter.top_time_slots(5),
        vec![("2024-01-01 09:00 to 10:00".to_string(), 3)]
    );
}

#[tokio::test]
async fn front_desk_day() {
    let registry = hospital();

    // Morning: two beds for one patient, an ECG, a whole-day ultrasound.
    let beds = registry
        .book(book("1", "ada", "2024-03-10", Some("08:00"), Some("12:00"), 2))
        .await
        .unwrap();
    assert_eq!(beds.booking_ids, vec![1, 2]);
    assert_eq!(beds.remaining_capacity, 98);

    assert!(matches!(
        "ecg".parse::<ResourceType>(),
        Err(RejectionReason::UnknownResource(_))
    ));
    let ecg = registry
        .book(book("Electrocardiograph", "eli", "2024-03-10", Some("08:30"), Some("09:00"), 1))
        .await
        .unwrap();
    assert_eq!(ecg.booking_ids, vec![3]);

    registry
        .book(book("3", "uma", "2024-03-10", None, None, 1))
        .await
        .unwrap();

    // A second ultrasound booking that day is rejected whatever the time.
    let late = registry
        .book(book("3", "vic", "2024-03-10", Some("22:00"), Some("23:00"), 1))
        .await;
    assert_eq!(late, Err(RejectionReason::TimeConflict { booking_id: 4 }));

    // Afternoon bed booking right after the morning one is fine.
    let afternoon = registry
        .book(book("bed", "bo", "2024-03-10", Some("12:00"), Some("13:00"), 1))
        .await
        .unwrap();
    assert_eq!(afternoon.booking_ids, vec![5]);

    let date = TimeInterval::parse("2024-03-10", None, None).unwrap().date();
    let report = registry.available_resources(date).await;
    let bed = &report[0];
    assert_eq!(bed.available, 97);
    assert_eq!(bed.unavailable_slots.len(), 2);
    assert_eq!(bed.unavailable_slots[0].units, 2);
    assert_eq!(bed.unavailable_slots[0].holders.len(), 1);

    // Cancel the ultrasound and the slot opens up again.
    registry.cancel(4).await.unwrap();
    let retry = registry
        .book(book("3", "vic", "2024-03-10", Some("22:00"), Some("23:00"), 1))
        .await
        .unwrap();
    assert_eq!(retry.booking_ids, vec![6]);

    let schedule = registry.schedule().await;
    let ids: Vec<_> = schedule.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 5, 6]);
}

#[tokio::test]
async fn console_round_trip() {
    let config = Config::default();
    let registry = Arc::new(ReservationRegistry::from_config(&config).unwrap());
    let console = Console::new(registry.clone(), &config);

    let out = console
        .handle_line("book ventilator \"Grace Hopper\" G-7 2024-05-01 10:00 11:00 3")
        .await
        .unwrap();
    assert!(out.contains("Ventilator Left: 47"), "{out}");

    let out = console.handle_line("book ventilator Alan T-1 2024-05-01 10:30 11:30").await.unwrap();
    assert_eq!(out, "Error: time conflict with booking 1");

    let out = console.handle_line("book ventilator Alan T-1 2024-05-01 11:30 10:30").await.unwrap();
    assert!(out.starts_with("Error: invalid interval"), "{out}");

    let usage = registry.resource_usage(ResourceType::Ventilator).await.unwrap();
    assert_eq!(usage.in_use, 3);
}
