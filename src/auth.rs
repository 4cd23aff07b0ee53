//! Client credentials, scope sets, and token models.

pub mod credentials;
pub mod scope;
pub mod token;

pub use credentials::*;
pub use scope::*;
pub use token::{access::*, secret::*};
