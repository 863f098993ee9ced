//! Repository trait definitions.

pub mod blogs;
pub mod images;
pub mod posts;
pub mod tokens;
pub mod users;

pub use blogs::BlogRepo;
pub use images::ImageRepo;
pub use posts::PostRepo;
pub use tokens::TokenRepo;
pub use users::UserRepo;
