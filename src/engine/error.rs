use crate::model::BookingId;

/// Why a request was not admitted. Every variant is recoverable: the caller
/// can adjust its input and retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectionReason {
    #[error("unknown resource: {0}")]
    UnknownResource(String),
    #[error("invalid interval: {0}")]
    InvalidInterval(String),
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),
    #[error("invalid requester: {0}")]
    InvalidRequester(&'static str),
    #[error("time conflict with booking {booking_id}")]
    TimeConflict { booking_id: BookingId },
    #[error("capacity exceeded: requested {requested}, remaining {remaining}")]
    CapacityExceeded { requested: u32, remaining: u32 },
    #[error("unknown booking: {0}")]
    UnknownBooking(BookingId),
}

impl RejectionReason {
    /// Short label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            RejectionReason::UnknownResource(_) => "unknown_resource",
            RejectionReason::InvalidInterval(_) => "invalid_interval",
            RejectionReason::InvalidQuantity(_) => "invalid_quantity",
            RejectionReason::InvalidRequester(_) => "invalid_requester",
            RejectionReason::TimeConflict { .. } => "time_conflict",
            RejectionReason::CapacityExceeded { .. } => "capacity_exceeded",
            RejectionReason::UnknownBooking(_) => "unknown_booking",
        }
    }
}
