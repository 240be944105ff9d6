//! The scheduled-tick queue, the random-tick LCG and the block-event
//! buffers.

pub mod events;
pub mod random;
pub mod scheduler;

pub use events::{BlockEvent, BlockEventQueue};
pub use random::RandomTickLcg;
pub use scheduler::{ScheduledTick, TickScheduler};
