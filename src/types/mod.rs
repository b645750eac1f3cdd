//! Public types for the Huginn API.

mod message;
mod request;
mod response;
mod status;

pub use message::{Message, Role};
pub use request::InferenceRequest;
pub use response::{InferenceResponse, ResponseStatus};
pub use status::ServiceStatus;
