use std::time::Instant;

use tracing::{debug, info};

use crate::model::*;
use crate::observability::*;

use super::{RejectionReason, ReservationRegistry};

impl ReservationRegistry {
    /// Admit or reject a booking request. The availability check and the
    /// commit of every unit happen under one write lock on the ledger.
    pub async fn book(&self, request: BookingRequest) -> Result<BookingConfirmation, RejectionReason> {
        let started = Instant::now();
        let resource = request.resource_type.as_str();
        let result = self.reserve_in_ledger(&request).await;
        metrics::histogram!(RESERVE_DURATION_SECONDS).record(started.elapsed().as_secs_f64());

        match result {
            Ok((booking_ids, remaining_capacity)) => {
                metrics::counter!(BOOKINGS_TOTAL, "resource" => resource, "status" => "ok").increment(1);
                metrics::counter!(UNITS_BOOKED_TOTAL, "resource" => resource)
                    .increment(u64::from(request.quantity));
                info!(
                    resource,
                    requester = %request.requester,
                    interval = %request.interval,
                    quantity = request.quantity,
                    first_id = booking_ids.first().copied(),
                    remaining = remaining_capacity,
                    "booking committed"
                );
                Ok(BookingConfirmation {
                    booking_ids,
                    remaining_capacity,
                    request,
                })
            }
            Err(reason) => {
                metrics::counter!(BOOKINGS_TOTAL, "resource" => resource, "status" => reason.label())
                    .increment(1);
                debug!(resource, requester = %request.requester, %reason, "booking rejected");
                Err(reason)
            }
        }
    }

    async fn reserve_in_ledger(&self, request: &BookingRequest) -> Result<(Vec<BookingId>, u32), RejectionReason> {
        let ledger = self.ledger_or_reject(request.resource_type)?;
        let mut guard = ledger.write().await;
        let committed = guard.reserve(&request.requester, &request.interval, request.quantity, &self.ids)?;
        for booking in &committed {
            self.booking_index.insert(booking.id, request.resource_type);
        }
        metrics::gauge!(UNITS_IN_USE, "resource" => request.resource_type.as_str()).set(guard.len() as f64);
        Ok((committed.into_iter().map(|b| b.id).collect(), guard.remaining()))
    }

    /// Remove one unit booking. Its id is never handed out again.
    pub async fn cancel(&self, id: BookingId) -> Result<Booking, RejectionReason> {
        let resource_type = self
            .booking_index
            .get(&id)
            .map(|e| *e.value())
            .ok_or(RejectionReason::UnknownBooking(id))?;
        let ledger = self.ledger_or_reject(resource_type)?;
        let mut guard = ledger.write().await;
        let booking = guard.cancel(id).ok_or(RejectionReason::UnknownBooking(id))?;
        self.booking_index.remove(&id);

        let resource = resource_type.as_str();
        metrics::counter!(CANCELLATIONS_TOTAL, "resource" => resource).increment(1);
        metrics::gauge!(UNITS_IN_USE, "resource" => resource).set(guard.len() as f64);
        info!(resource, id, requester = %booking.requester, "booking cancelled");
        Ok(booking)
    }
}
