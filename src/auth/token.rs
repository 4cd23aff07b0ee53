//! Token secrets and the access tokens issued by the token endpoint.

pub mod access;
pub mod secret;
