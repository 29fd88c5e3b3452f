//! Clients of the services the domain talks to.
pub mod oauth;
