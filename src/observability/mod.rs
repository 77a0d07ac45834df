//! Observability for the reconciliation run
//!
//! Structured JSON-lines logging with typed events.
//!
//! ```ignore
//! use leaderboot::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::KineSelfManaged, &[("cert_dir", "/var/lib/x/tls/kine")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let severity = match event {
        e if e.is_failure() => Severity::Error,
        Event::OptionOverridden | Event::KineForced => Severity::Warn,
        _ => Severity::Info,
    };
    Logger::log(severity, event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event_quiet_does_not_panic() {
        Logger::set_quiet(true);
        log_event(Event::ReconcileStart);
        log_event_with_fields(Event::OptionOverridden, &[("field", "kine.secure-port")]);
        assert!(Logger::is_quiet());
    }
}
