/// Battery state-of-charge bookkeeping.
pub mod battery;
pub mod engine;
pub mod power_balance;
pub mod summary;
pub mod types;

pub use engine::{DispatchEngine, simulate};
pub use summary::{HourlyDispatch, representative_day};
pub use types::{DispatchParams, DispatchRun, DispatchTimestep, DispatchTotals, TraceMode};
