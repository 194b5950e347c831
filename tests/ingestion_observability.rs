use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use freight_invoice_ingest::ingestion::{
    CompositeObserver, FileObserver, IngestContext, IngestObserver, IngestSeverity, IngestStats,
};
use freight_invoice_ingest::pipeline::{normalized_table_for, IngestOptions};
use freight_invoice_ingest::{IngestError, Vendor};

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<(Vendor, IngestStats)>>,
    failures: Mutex<Vec<IngestSeverity>>,
    alerts: Mutex<Vec<IngestSeverity>>,
}

impl IngestObserver for RecordingObserver {
    fn on_success(&self, ctx: &IngestContext, stats: IngestStats) {
        self.successes.lock().unwrap().push((ctx.vendor, stats));
    }

    fn on_failure(&self, _ctx: &IngestContext, severity: IngestSeverity, _error: &IngestError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &IngestContext, severity: IngestSeverity, _error: &IngestError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

fn options_with(obs: Arc<RecordingObserver>, alert_at_or_above: IngestSeverity) -> IngestOptions {
    IngestOptions {
        observer: Some(obs),
        alert_at_or_above,
        ..Default::default()
    }
}

#[test]
fn observer_receives_failure_and_alert_on_critical_io_error() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = options_with(obs.clone(), IngestSeverity::Critical);

    // Missing file -> Io error -> Critical
    let _ = normalized_table_for("tests/fixtures/does_not_exist.csv", None, &opts).unwrap_err();

    assert_eq!(*obs.failures.lock().unwrap(), vec![IngestSeverity::Critical]);
    assert_eq!(*obs.alerts.lock().unwrap(), vec![IngestSeverity::Critical]);
}

#[test]
fn schema_failures_do_not_alert_at_critical_threshold() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = options_with(obs.clone(), IngestSeverity::Critical);

    let _ = normalized_table_for("tests/fixtures/UPS_missing_service.csv", None, &opts).unwrap_err();

    assert_eq!(*obs.failures.lock().unwrap(), vec![IngestSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn lower_threshold_alerts_on_errors() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = options_with(obs.clone(), IngestSeverity::Error);

    let _ = normalized_table_for("tests/fixtures/report.pdf", None, &opts).unwrap_err();

    assert_eq!(*obs.alerts.lock().unwrap(), vec![IngestSeverity::Error]);
}

#[test]
fn success_reports_rows_and_header_row() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = options_with(obs.clone(), IngestSeverity::Critical);

    normalized_table_for("tests/fixtures/FDX_20250802_LOL509.csv", None, &opts).unwrap();

    let successes = obs.successes.lock().unwrap();
    assert_eq!(successes.len(), 1);
    let (vendor, stats) = successes[0];
    assert_eq!(vendor, Vendor::FedEx);
    assert_eq!(stats.rows, 2);
    assert_eq!(stats.header_row, 3);
    assert_eq!(stats.coercion_nulls, 0);
    assert!(obs.failures.lock().unwrap().is_empty());
}

#[test]
fn composite_fans_out_and_file_observer_appends() {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let log = std::env::temp_dir().join(format!("freight-invoice-ingest-observer-{nanos}.log"));

    let recorder = Arc::new(RecordingObserver::default());
    let observers: Vec<Arc<dyn IngestObserver>> = vec![recorder.clone(), Arc::new(FileObserver::new(&log))];
    let composite = CompositeObserver::new(observers);
    let opts = IngestOptions {
        observer: Some(Arc::new(composite)),
        ..Default::default()
    };

    normalized_table_for("tests/fixtures/UPS_LOL509_08022025.csv", None, &opts).unwrap();
    let _ = normalized_table_for("tests/fixtures/does_not_exist.csv", None, &opts).unwrap_err();

    assert_eq!(recorder.successes.lock().unwrap().len(), 1);
    assert_eq!(*recorder.alerts.lock().unwrap(), vec![IngestSeverity::Critical]);

    let contents = std::fs::read_to_string(&log).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains(" ok vendor=ups"));
    assert!(lines[0].contains("header_row=2"));
    assert!(lines[1].contains(" fail severity=Critical"));
    assert!(lines[2].contains(" ALERT severity=Critical"));

    let _ = std::fs::remove_file(&log);
}
