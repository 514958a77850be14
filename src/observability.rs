use std::net::SocketAddr;

use metrics_exporter_prometheus::BuildError;

/// Counter: booking requests handled. Labels: resource, status.
pub const BOOKINGS_TOTAL: &str = "carepool_bookings_total";

/// Counter: units committed by successful bookings. Labels: resource.
pub const UNITS_BOOKED_TOTAL: &str = "carepool_units_booked_total";

/// Counter: cancelled bookings. Labels: resource.
pub const CANCELLATIONS_TOTAL: &str = "carepool_cancellations_total";

/// Gauge: units currently held. Labels: resource.
pub const UNITS_IN_USE: &str = "carepool_units_in_use";

/// Histogram: time spent deciding one booking request, in seconds.
pub const RESERVE_DURATION_SECONDS: &str = "carepool_reserve_duration_seconds";

/// Counter: console commands executed. Labels: command, status.
pub const COMMANDS_TOTAL: &str = "carepool_commands_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) -> Result<(), BuildError> {
    let Some(port) = port else { return Ok(()) };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
    Ok(())
}
