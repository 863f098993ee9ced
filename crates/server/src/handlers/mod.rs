//! HTTP request handlers.

pub mod images;
pub mod keys;
pub mod posts;
pub mod site;
pub mod users;

pub use images::{upload_image, upload_image_chunk};
pub use keys::{issue_key, revoke_key};
pub use posts::{create_post, update_post};
pub use site::{get_config, get_site, health_check};
pub use users::{get_current_user, validate_token};
