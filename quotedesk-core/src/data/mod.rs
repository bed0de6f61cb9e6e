//! Market-data access: provider trait, Yahoo Finance implementation, and
//! the request-scoped fetch session.

pub mod provider;
pub mod session;
pub mod yahoo;

pub use provider::{DataError, DataProvider, Request};
pub use session::FetchSession;
pub use yahoo::YahooProvider;
