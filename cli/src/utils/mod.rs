pub mod change_engine;
pub mod date;
pub mod format;
pub mod holdings_table;
pub mod logger;
pub mod overview;
pub mod snapshots;
pub mod stock_lookup;

pub use change_engine::*;
pub use date::*;
pub use format::*;
pub use holdings_table::*;
pub use logger::*;
pub use overview::*;
pub use snapshots::*;
pub use stock_lookup::*;
