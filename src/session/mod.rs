//! Per-connection session handling: wire protocol, cancellation and the
//! orchestrating state machine.

pub mod cancel;
pub mod orchestrator;
pub mod protocol;
pub mod sink;
pub mod state;
pub mod transport;

pub use orchestrator::{SessionServices, handle_session};
pub use protocol::{ClientRequest, ControlAction, ControlMessage, ServerMessage, SessionEvent};
pub use sink::CueSink;
pub use state::CancelFlag;
pub use transport::{FrameSink, FrameSource};
