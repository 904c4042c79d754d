pub mod merged;
pub mod station;

pub use merged::{MergedStation, MergedStationSource};
pub use station::{
    Address, Charging, MergeStatus, NearbyStation, Station, StationId, StationSeed,
};
