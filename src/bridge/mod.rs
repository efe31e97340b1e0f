//! Dispatch bridge: HTTP request → pool message → HTTP response.
//!
//! # Data Flow
//! ```text
//! matched request
//!     → envelope.rs (RequestEnvelope: headers, params, query, lenient body)
//!     → dispatch.rs (submit {type, data}, await this request's reply)
//!     → translate.rs (reply → status, headers, JSON body)
//!
//! unmatched request
//!     → fallback.rs (fixed 401, pool untouched)
//! ```
//!
//! # Design Decisions
//! - Every failure class ends as a JSON response; nothing is raised to the
//!   transport layer
//! - Pool failures are expressed as error replies so translation happens in
//!   exactly one place

pub mod dispatch;
pub mod envelope;
pub mod fallback;
pub mod translate;

pub use dispatch::{DispatchFailure, Dispatcher};
pub use envelope::RequestEnvelope;
pub use fallback::unrecognised_request;
pub use translate::{translate, TranslatedResponse};
