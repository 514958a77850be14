mod conflict;
mod error;
mod ledger;
mod mutations;
mod queries;

pub use error::RejectionReason;
pub use ledger::ResourceLedger;

use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tokio::sync::RwLock;

use crate::config::{Config, ConfigError};
use crate::limits::MAX_CAPACITY;
use crate::model::*;

pub type SharedLedger = Arc<RwLock<ResourceLedger>>;

/// Monotonic booking id source shared by all ledgers of a registry.
#[derive(Debug)]
pub struct BookingIds {
    next: AtomicU64,
}

impl Default for BookingIds {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingIds {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Claim `n` consecutive ids. Callers hold their ledger's write lock and
    /// only call this once the reservation is certain to commit.
    pub fn allocate(&self, n: u32) -> Range<BookingId> {
        let start = self.next.fetch_add(u64::from(n), Ordering::SeqCst);
        start..start + u64::from(n)
    }

    /// The id the next successful reservation will receive.
    pub fn peek(&self) -> BookingId {
        self.next.load(Ordering::SeqCst)
    }
}

/// Owns one ledger per resource type and routes requests to them.
pub struct ReservationRegistry {
    ledgers: DashMap<ResourceType, SharedLedger>,
    /// Registration order; fixed after construction.
    order: Vec<ResourceType>,
    pub(super) ids: BookingIds,
    /// Reverse lookup: booking id → resource type
    pub(super) booking_index: DashMap<BookingId, ResourceType>,
}

impl ReservationRegistry {
    pub fn new(capacities: &[(ResourceType, u32)]) -> Result<Self, ConfigError> {
        let ledgers = DashMap::new();
        let mut order = Vec::with_capacity(capacities.len());
        for &(resource_type, capacity) in capacities {
            if capacity == 0 {
                return Err(ConfigError::ZeroCapacity(resource_type));
            }
            if capacity > MAX_CAPACITY {
                return Err(ConfigError::CapacityTooLarge(resource_type, capacity));
            }
            if ledgers.contains_key(&resource_type) {
                return Err(ConfigError::DuplicateResource(resource_type));
            }
            let ledger = ResourceLedger::new(resource_type, capacity);
            ledgers.insert(resource_type, Arc::new(RwLock::new(ledger)));
            order.push(resource_type);
        }
        Ok(Self {
            ledgers,
            order,
            ids: BookingIds::new(),
            booking_index: DashMap::new(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::new(&config.capacities)
    }

    /// Resource types in registration order.
    pub fn resource_types(&self) -> &[ResourceType] {
        &self.order
    }

    pub fn get_ledger(&self, resource_type: ResourceType) -> Option<SharedLedger> {
        self.ledgers.get(&resource_type).map(|e| e.value().clone())
    }

    pub fn next_booking_id(&self) -> BookingId {
        self.ids.peek()
    }

    pub(super) fn ledger_or_reject(&self, resource_type: ResourceType) -> Result<SharedLedger, RejectionReason> {
        self.get_ledger(resource_type)
            .ok_or_else(|| RejectionReason::UnknownResource(resource_type.to_string()))
    }

    /// Ledgers in registration order.
    pub(super) fn ordered_ledgers(&self) -> impl Iterator<Item = SharedLedger> + '_ {
        self.order.iter().filter_map(|rt| self.get_ledger(*rt))
    }
}
