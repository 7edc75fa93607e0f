pub mod json_user_store;
pub mod mock_store;
pub mod user_store;

pub use json_user_store::JsonUserStore;
pub use user_store::{UserStore, UserStoreError};
