pub mod auth;
pub mod error;
pub mod reviews;
pub mod store;
pub mod users;

pub use auth::{AccessToken, Authenticator, Claims, KeyRing};
pub use error::CoreError;
pub use reviews::ReviewService;
pub use store::{JsonReviewStore, JsonUserStore, ReviewStore, UserStore};
pub use users::{normalize_email, UserService};
