//! HTTP request handlers, one module per resource.
//!
//! Handlers deserialize the request, call the matching service in [`crate::services`] and map
//! the result onto the API models. Errors become responses through
//! [`crate::errors::Error`]'s `IntoResponse`.
//!
//! - [`drivers`]: drivers, licence checks and certifications under `/transport`
//! - [`users`]: user accounts and password sign-in
//! - [`vehicles`]: vehicles and vehicle types under `/transport`

pub mod drivers;
pub mod users;
pub mod vehicles;
