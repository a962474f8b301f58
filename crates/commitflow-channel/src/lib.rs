//! Front-end wire surface: one JSON object per line on stdio.
//!
//! Three frame kinds go out (`input_request`, `status`, `error`) and exactly
//! one line comes back per input request. All writers share a single
//! [`Transport`] so lifecycle output and input-request traffic never
//! interleave mid-line.

mod channel;
mod protocol;
mod status;

pub use channel::{InteractionChannel, StdioChannel, StdioTransport, Transport};
pub use protocol::{InputResponse, OutputFrame};
pub use status::StatusReporter;
