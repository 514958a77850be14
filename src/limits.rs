/// Max bytes in a requester name or requester id.
pub const MAX_REQUESTER_LEN: usize = 256;

/// Max units a single resource type may be configured with.
pub const MAX_CAPACITY: u32 = 100_000;

/// Max rows returned by a top-slots query.
pub const MAX_TOP_SLOTS: usize = 1_000;
