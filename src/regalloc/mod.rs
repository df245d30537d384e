// The module builds live intervals from the IR, and assigns each temp a
// register or a stack slot with a single linear scan over them
mod active;
mod allocation;
mod liveness;
mod result;
mod spill;

pub use allocation::{allocate, Allocator};
pub use liveness::{Interval, Liveness};
pub use result::{Allocation, AllocationRecord, AllocationResult, Diagnostic, Listing, Location};
