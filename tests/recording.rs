use journeylog_rs::error::PositionError;
use journeylog_rs::recording::RecordingSession;
use journeylog_rs::types::journey::GeoSample;

fn fix(lat: f64, lon: f64, timestamp: i64) -> GeoSample {
    GeoSample {
        accuracy: Some(8.0),
        timestamp: Some(timestamp),
        ..GeoSample::new(lat, lon)
    }
}

#[test]
fn samples_are_kept_in_delivery_order() {
    let (session, sink) = RecordingSession::start("walk");
    assert_eq!(session.status(), "Journey recording started...");

    // Out-of-order timestamps stay as delivered.
    assert!(sink.push(fix(59.0, 18.0, 3_000)));
    assert!(sink.push(fix(59.1, 18.1, 1_000)));
    assert!(sink.push(fix(59.1, 18.1, 1_000)));
    assert_eq!(session.status(), "Location: (59.10000, 18.10000) | Accuracy: 8m");

    let finished = session.stop();
    let timestamps: Vec<_> = finished.samples.iter().map(|s| s.timestamp).collect();
    assert_eq!(timestamps, [Some(3_000), Some(1_000), Some(1_000)]);
}

#[test]
fn late_samples_after_stop_are_ignored() {
    let (session, sink) = RecordingSession::start("late");
    let second_sink = session.sink();
    assert!(sink.push(fix(59.0, 18.0, 0)));

    let finished = session.stop();

    assert!(!sink.push(fix(59.2, 18.2, 5_000)));
    assert!(!second_sink.is_active());
    assert_eq!(finished.samples.len(), 1);
}

#[test]
fn position_errors_do_not_stop_the_session() {
    let (session, sink) = RecordingSession::start("tunnel");
    sink.report_error(&PositionError::Unavailable);

    assert!(session.is_active());
    assert_eq!(session.status(), "Location error: Position unavailable");
    assert!(sink.push(fix(59.0, 18.0, 0)));
    assert_eq!(session.len(), 1);
}

#[test]
fn invalid_fixes_are_rejected() {
    let (session, sink) = RecordingSession::start("bad");

    assert!(!sink.push(GeoSample::new(f64::NAN, 18.0)));
    assert!(!sink.push(GeoSample::new(91.0, 18.0)));
    assert!(session.is_empty());
}

#[test]
fn finished_recording_becomes_a_journey() {
    let (session, sink) = RecordingSession::start("commute");
    sink.push(fix(59.0, 18.0, 1_000));
    sink.push(fix(59.01, 18.01, 61_000));

    let journey = session.stop().into_journey(Some("  Commute  ".to_string()));

    assert!(journey.id.is_empty());
    assert_eq!(journey.name, "Commute");
    assert_eq!(journey.stats.points, 2);
    assert_eq!(journey.stats.duration, 60_000);
    assert!(journey.created_at.is_some());
}

#[test]
fn unnamed_recording_gets_a_timestamp_name() {
    let (session, _sink) = RecordingSession::start("anon");

    let journey = session.stop().into_journey(None);

    assert!(journey.name.starts_with("Journey "));
    assert_eq!(journey.stats.points, 0);
}
