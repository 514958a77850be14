use std::collections::HashMap;

use serde::Serialize;

use crate::engine::{ReservationRegistry, ResourceLedger};
use crate::model::*;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceCount {
    pub resource_type: ResourceType,
    pub bookings: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotCount {
    pub slot: String,
    pub bookings: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_bookings: usize,
    pub by_resource: Vec<ResourceCount>,
    pub top_slots: Vec<SlotCount>,
}

/// Aggregate statistics over a point-in-time copy of the registry.
pub struct SummaryReporter {
    ledgers: Vec<ResourceLedger>,
}

impl SummaryReporter {
    pub async fn capture(registry: &ReservationRegistry) -> Self {
        Self::from_ledgers(registry.snapshot().await)
    }

    pub fn from_ledgers(ledgers: Vec<ResourceLedger>) -> Self {
        Self { ledgers }
    }

    pub fn total_bookings(&self) -> usize {
        self.ledgers.iter().map(|l| l.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_bookings() == 0
    }

    /// Booking count per resource type in registration order. Types with no
    /// bookings are left out.
    pub fn counts_by_resource(&self) -> Vec<(ResourceType, usize)> {
        self.ledgers
            .iter()
            .filter(|l| !l.is_empty())
            .map(|l| (l.resource_type(), l.len()))
            .collect()
    }

    /// Most-booked slots across all resources, highest count first. Equal
    /// counts keep the order in which the slot was first booked.
    pub fn top_time_slots(&self, limit: usize) -> Vec<(String, usize)> {
        let mut bookings: Vec<&Booking> = self.ledgers.iter().flat_map(|l| l.bookings()).collect();
        bookings.sort_by_key(|b| b.id);

        let mut counts: Vec<(String, usize)> = Vec::new();
        let mut index: HashMap<TimeInterval, usize> = HashMap::new();
        for booking in bookings {
            let pos = *index.entry(booking.interval).or_insert_with(|| {
                counts.push((booking.interval.to_string(), 0));
                counts.len() - 1
            });
            counts[pos].1 += 1;
        }

        // stable: ties stay in first-seen order
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts.truncate(limit);
        counts
    }

    pub fn summary(&self, limit: usize) -> Summary {
        Summary {
            total_bookings: self.total_bookings(),
            by_resource: self
                .counts_by_resource()
                .into_iter()
                .map(|(resource_type, bookings)| ResourceCount {
                    resource_type,
                    bookings,
                })
                .collect(),
            top_slots: self
                .top_time_slots(limit)
                .into_iter()
                .map(|(slot, bookings)| SlotCount { slot, bookings })
                .collect(),
        }
    }
}
