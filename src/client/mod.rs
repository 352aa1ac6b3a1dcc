//! Client side of the bookstore: a typed API client, the persisted login,
//! and the view state a front end renders from.

pub mod api;
pub mod session;
pub mod state;

pub use api::{ApiClient, ClientError};
pub use session::SessionStore;
pub use state::{Banner, Bookstore, ClientState, Page};
