//! The backend edge of the city renderer: the capability trait concrete
//! graphics APIs implement, a headless implementation for tests and tools,
//! and scoped resource pools tying arena blocks to backend resources.

mod backend;
mod headless;
mod pool;

pub use backend::{BackendError, PoolKind, RenderBackend, TextureHandle, ViewHandle};
pub use headless::HeadlessBackend;
pub use pool::{PoolError, ResourcePool};
