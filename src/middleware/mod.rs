//! Middleware making up the request pipeline.
//!
//! # Modules
//!
//! - [`request_values`]: per-request trace id, clock, and final status
//! - [`recovery`]: panic recovery and shutdown escalation
//! - [`auth`]: bearer-token authentication and the [`auth::AuthUser`] extractor
//! - [`role`]: role gates and the [`role::Protected`] route builder
//!
//! # Order
//!
//! From the outside in, every request passes through:
//!
//! 1. `request_values`: creates the [`request_values::RequestValues`]
//! 2. `escalate_shutdown` and the panic catcher
//! 3. `logging_middleware`
//! 4. `metrics_middleware`
//! 5. for protected routes, `authenticate` and then any role gates
//! 6. the handler

pub mod auth;
pub mod recovery;
pub mod request_values;
pub mod role;
