pub mod debounce;
pub mod export;
pub mod image_source;
pub mod native_buffer;
pub mod publisher;
pub mod session;

pub use debounce::{Completion, DebounceScheduler, Ticket};
pub use image_source::{ImageDecoder, ImageSource, InMemoryImage};
pub use native_buffer::{BufferInfo, BufferKind, BufferLedger, LedgerStats, NativeBuffer};
pub use publisher::{Notice, Rendered, ResultPublisher};
pub use session::{Session, SessionStatus};
