//! These models represent the objects passed around during one request.
//!
//! The worker agents, the supervisor and the provider adapters all speak in
//! terms of these types. Provider wire formats are converted into them as soon
//! as a response arrives, so nothing outside `providers` sees OpenAI JSON.
pub mod content;
pub mod conversation;
pub mod message;
pub mod role;
pub mod tool;
