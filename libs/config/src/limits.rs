//! Parameter bounds and deck units
//!
//! Bounds are inclusive on both ends.

/// Trucks (N): `0 <= N < 10000`
pub mod trucks {
    pub const MIN: i64 = 0;
    pub const MAX: i64 = 9_999;
}

/// Cars (O): `0 <= O < 10000`
pub mod cars {
    pub const MIN: i64 = 0;
    pub const MAX: i64 = 9_999;
}

/// Ferry capacity in car units (K)
pub mod capacity {
    pub const MIN: i64 = 3;
    pub const MAX: i64 = 100;
}

/// Maximum vehicle arrival delay in microseconds (TA)
pub mod arrival_delay {
    pub const MIN: i64 = 0;
    pub const MAX: i64 = 10_000;
}

/// Maximum ferry leg delay in microseconds (TP)
pub mod leg_delay {
    pub const MIN: i64 = 0;
    pub const MAX: i64 = 1_000;
}

/// Deck space taken by each vehicle class, in car units
pub mod units {
    pub const CAR: u32 = 1;
    pub const TRUCK: u32 = 3;
}

/// Default action log file
pub const DEFAULT_OUTPUT: &str = "proj2.out";

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "FERRY";
