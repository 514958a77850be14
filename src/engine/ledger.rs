use std::collections::HashMap;

use chrono::NaiveDate;

use crate::model::*;

use super::conflict::{check_capacity, check_no_conflict, validate_quantity};
use super::{BookingIds, RejectionReason};

/// All current bookings for one resource type.
#[derive(Debug, Clone)]
pub struct ResourceLedger {
    resource_type: ResourceType,
    max_capacity: u32,
    /// Sorted by `created_order` (insertion order).
    bookings: Vec<Booking>,
    next_order: u64,
}

impl ResourceLedger {
    pub fn new(resource_type: ResourceType, max_capacity: u32) -> Self {
        debug_assert!(max_capacity > 0, "ledger capacity must be positive");
        Self {
            resource_type,
            max_capacity,
            bookings: Vec::new(),
            next_order: 0,
        }
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    pub fn max_capacity(&self) -> u32 {
        self.max_capacity
    }

    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }

    /// Units not currently held by any booking.
    pub fn remaining(&self) -> u32 {
        self.max_capacity.saturating_sub(self.bookings.len() as u32)
    }

    pub fn usage(&self) -> Usage {
        Usage {
            resource_type: self.resource_type,
            in_use: self.bookings.len() as u32,
            capacity: self.max_capacity,
        }
    }

    /// Bookings overlapping `interval`, in insertion order.
    pub fn conflicts<'a>(&'a self, interval: &'a TimeInterval) -> impl Iterator<Item = &'a Booking> + 'a {
        self.bookings.iter().filter(move |b| b.interval.overlaps(interval))
    }

    /// No overlapping booking on the interval's date and at least one free unit.
    pub fn is_available(&self, interval: &TimeInterval) -> bool {
        self.remaining() > 0 && self.conflicts(interval).next().is_none()
    }

    /// Admit `quantity` identical unit bookings or reject the whole request.
    /// Nothing is mutated on rejection; ids are drawn from `ids` only after
    /// every check has passed.
    pub fn reserve(
        &mut self,
        requester: &Requester,
        interval: &TimeInterval,
        quantity: u32,
        ids: &BookingIds,
    ) -> Result<Vec<Booking>, RejectionReason> {
        validate_quantity(quantity)?;
        check_capacity(self, quantity)?;
        check_no_conflict(self, interval)?;

        let committed: Vec<Booking> = ids
            .allocate(quantity)
            .map(|id| {
                let created_order = self.next_order;
                self.next_order += 1;
                Booking {
                    id,
                    requester: requester.clone(),
                    resource_type: self.resource_type,
                    interval: *interval,
                    created_order,
                }
            })
            .collect();
        self.bookings.extend(committed.iter().cloned());

        debug_assert!(
            self.bookings.len() <= self.max_capacity as usize,
            "ledger {} holds {} bookings over capacity {}",
            self.resource_type,
            self.bookings.len(),
            self.max_capacity
        );
        Ok(committed)
    }

    /// Remove a booking by id, preserving the order of the rest.
    pub fn cancel(&mut self, id: BookingId) -> Option<Booking> {
        let pos = self.bookings.iter().position(|b| b.id == id)?;
        Some(self.bookings.remove(pos))
    }

    pub fn get(&self, id: BookingId) -> Option<&Booking> {
        self.bookings.iter().find(|b| b.id == id)
    }

    /// Bookings on `date` grouped by interval, groups in first-seen order.
    pub fn unavailable_slots(&self, date: NaiveDate) -> Vec<SlotOccupancy> {
        let mut slots: Vec<SlotOccupancy> = Vec::new();
        let mut index: HashMap<TimeInterval, usize> = HashMap::new();

        for booking in self.bookings.iter().filter(|b| b.interval.date() == date) {
            let pos = *index.entry(booking.interval).or_insert_with(|| {
                slots.push(SlotOccupancy {
                    interval: booking.interval,
                    holders: Vec::new(),
                    units: 0,
                });
                slots.len() - 1
            });
            let slot = &mut slots[pos];
            slot.units += 1;
            if !slot.holders.contains(&booking.requester) {
                slot.holders.push(booking.requester.clone());
            }
        }
        slots
    }
}
