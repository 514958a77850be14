use crate::model::*;

use super::ledger::ResourceLedger;
use super::RejectionReason;

pub(crate) fn validate_quantity(quantity: u32) -> Result<(), RejectionReason> {
    if quantity == 0 {
        return Err(RejectionReason::InvalidQuantity("quantity must be at least 1".into()));
    }
    Ok(())
}

pub(crate) fn check_capacity(ledger: &ResourceLedger, quantity: u32) -> Result<(), RejectionReason> {
    let remaining = ledger.remaining();
    if quantity > remaining {
        return Err(RejectionReason::CapacityExceeded {
            requested: quantity,
            remaining,
        });
    }
    Ok(())
}

/// Any existing booking overlapping `interval` is a conflict, however many
/// units remain. Reports the earliest conflicting booking.
pub(crate) fn check_no_conflict(ledger: &ResourceLedger, interval: &TimeInterval) -> Result<(), RejectionReason> {
    match ledger.conflicts(interval).next() {
        Some(booking) => Err(RejectionReason::TimeConflict { booking_id: booking.id }),
        None => Ok(()),
    }
}
