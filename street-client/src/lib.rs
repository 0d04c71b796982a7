//! Client side of Streetmix sign-in: restores a session from cookies and
//! local storage, refreshes and verifies the login token against the API,
//! layers feature flags, and decides what the page should do next.

pub mod api;
pub mod config;
pub mod error;
pub mod flags;
pub mod mode;
pub mod session;
pub mod storage;
pub mod token;

pub use api::StreetsApi;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use mode::{Mode, SessionAction};
pub use session::{Notice, Session, SignInData};
pub use storage::{MemoryStorage, SessionStorage};
