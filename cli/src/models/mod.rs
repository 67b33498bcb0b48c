pub mod changes;
pub mod collector;
pub mod dataset;
pub mod holding;
pub mod stock;
pub mod table;

pub use changes::*;
pub use collector::*;
pub use dataset::*;
pub use holding::*;
pub use stock::*;
pub use table::*;
