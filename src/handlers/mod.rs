//! Demo handlers shipped with the binary.
//!
//! Handlers run on pool workers and answer through their `Finished` slot:
//! - `helloworld`: `{ok, hello}`; `?a=error` answers 403
//! - `user`: `/user/:userId`, only `rob` is known
//! - `echo`: returns the request envelope

pub mod echo;
pub mod hello_world;
pub mod user;

use crate::pool::HandlerRegistry;

/// Registry with every demo handler.
pub fn demo_handlers() -> HandlerRegistry {
    HandlerRegistry::new()
        .with(hello_world::ID, hello_world::handle)
        .with(user::ID, user::handle)
        .with(echo::ID, echo::handle)
}
