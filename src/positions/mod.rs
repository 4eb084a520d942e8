//! Open-position tracking and time-bounded supervision

pub mod dispatcher;
pub mod pnl;
pub mod store;
pub mod supervisor;

pub use dispatcher::{CloseAllReport, DirectionalCloseDispatcher};
pub use store::{InMemoryPositionStore, PositionStore};
pub use supervisor::{CloseOutcome, PositionSupervisor, ScanReport};
