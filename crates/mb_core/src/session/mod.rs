//! Session state.
//!
//! [`Subject`] is a small observable container: owners mutate it and every
//! subscriber is called back synchronously. [`AuthStore`] builds the
//! authentication state on top of it.

mod auth;
mod subject;

pub use auth::{AuthState, AuthStore, User};
pub use subject::{Subject, Subscription};
