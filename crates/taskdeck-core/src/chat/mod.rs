//! Chat domain module.
//!
//! The chat model behind `/ai/chat` is an opaque remote service; this module
//! only describes the request/reply shapes and the local transcript entries.

pub mod api;
mod model;

pub use api::ChatApi;
pub use model::{
    ChatMessage, ChatReply, ChatRequest, GREETING, NO_REPLY, REQUEST_FAILED, Sender,
};
