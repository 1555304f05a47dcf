pub mod movie;
pub mod review;
pub mod user;

pub use movie::{CastMember, Extracted, MovieCategory, MovieDetail, MovieRecord, Trailer, WatchLink};
pub use review::{round_rating, MovieKey, ReviewAggregate, ReviewEntry, MAX_RATING, MIN_RATING};
pub use user::{User, UserId, UserProfile};
