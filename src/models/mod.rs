pub mod fertilization;
pub mod liming;
pub mod parcel;
pub mod products;
pub mod rotation;
pub mod soil;
pub mod warning;

pub use fertilization::*;
pub use liming::*;
pub use parcel::*;
pub use products::*;
pub use rotation::*;
pub use soil::*;
pub use warning::*;
