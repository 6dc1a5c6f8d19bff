pub mod event_bus;
pub mod runtime_context;

pub use event_bus::{create_event_channel, EditorEvent, EventReceiver, EventSender};
pub use runtime_context::{EditorContext, FakeIdGenerator, IdGenerator, RealIdGenerator};
