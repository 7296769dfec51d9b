//! GPU memory sub-allocation for the city renderer: fixed-capacity arenas,
//! block bookkeeping, and batched uploads against mapped memory.
//!
//! Everything here is backend-agnostic. A concrete graphics backend supplies
//! the pool capacities at startup and the mapped byte slices at flush time;
//! the arithmetic of who owns which byte range lives entirely in this crate.
//!
//! All types are single-threaded by design: arenas and queues belong to the
//! frame-loop thread, and every operation is a bounded computation with no
//! suspension point. A multi-threaded extension would wrap each arena behind
//! one mutex at its public boundary; the internals assume exclusive access.

mod arena;
mod block;
mod error;
mod upload;

pub use arena::Arena;
pub use block::Block;
pub use error::{ArenaError, UploadError};
pub use upload::{PendingWrite, UploadQueue};
