use chrono::NaiveDate;

use crate::model::*;

use super::{RejectionReason, ReservationRegistry, ResourceLedger};

impl ReservationRegistry {
    pub async fn is_available(
        &self,
        resource_type: ResourceType,
        interval: &TimeInterval,
    ) -> Result<bool, RejectionReason> {
        let ledger = self.ledger_or_reject(resource_type)?;
        let guard = ledger.read().await;
        Ok(guard.is_available(interval))
    }

    pub async fn unavailable_slots(
        &self,
        resource_type: ResourceType,
        date: NaiveDate,
    ) -> Result<Vec<SlotOccupancy>, RejectionReason> {
        let ledger = self.ledger_or_reject(resource_type)?;
        let guard = ledger.read().await;
        Ok(guard.unavailable_slots(date))
    }

    /// Free units and occupied slots on `date` for every resource type.
    pub async fn available_resources(&self, date: NaiveDate) -> Vec<ResourceAvailability> {
        let mut result = Vec::with_capacity(self.resource_types().len());
        for ledger in self.ordered_ledgers() {
            let guard = ledger.read().await;
            result.push(ResourceAvailability {
                resource_type: guard.resource_type(),
                available: guard.remaining(),
                capacity: guard.max_capacity(),
                unavailable_slots: guard.unavailable_slots(date),
            });
        }
        result
    }

    pub async fn usage(&self) -> Vec<Usage> {
        let mut result = Vec::with_capacity(self.resource_types().len());
        for ledger in self.ordered_ledgers() {
            result.push(ledger.read().await.usage());
        }
        result
    }

    pub async fn resource_usage(&self, resource_type: ResourceType) -> Result<Usage, RejectionReason> {
        let ledger = self.ledger_or_reject(resource_type)?;
        let guard = ledger.read().await;
        Ok(guard.usage())
    }

    pub async fn get_booking(&self, id: BookingId) -> Option<Booking> {
        let resource_type = self.booking_index.get(&id).map(|e| *e.value())?;
        let ledger = self.get_ledger(resource_type)?;
        let guard = ledger.read().await;
        guard.get(id).cloned()
    }

    /// Every booking across all resources, ordered by date, start time, then id.
    /// Whole-day bookings sort before timed bookings on the same date.
    pub async fn schedule(&self) -> Vec<Booking> {
        let mut all: Vec<Booking> = Vec::new();
        for ledger in self.ordered_ledgers() {
            all.extend(ledger.read().await.bookings().iter().cloned());
        }
        all.sort_by_key(|b| (b.interval.date(), b.interval.start_time(), b.id));
        all
    }

    /// Per-ledger copies in registration order. Each copy is internally
    /// consistent; ledgers are read one after another.
    pub async fn snapshot(&self) -> Vec<ResourceLedger> {
        let mut result = Vec::with_capacity(self.resource_types().len());
        for ledger in self.ordered_ledgers() {
            result.push(ledger.read().await.clone());
        }
        result
    }
}
