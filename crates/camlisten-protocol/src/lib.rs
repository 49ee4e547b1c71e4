pub mod codec;
pub mod event;
pub mod frame;
pub mod payload;
pub mod stream_parser;

pub use codec::EventStreamCodec;
pub use event::CameraEvent;
pub use frame::EventFrame;
pub use payload::PayloadDecoder;
pub use stream_parser::{LineKind, ParserState, RawRecord, StreamParser};
