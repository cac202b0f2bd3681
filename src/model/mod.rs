//! Data carried by the tracker: coordinates, the order aggregate and its states.

pub mod geo;
pub mod order;
pub mod status;

pub use geo::*;
pub use order::*;
pub use status::*;
