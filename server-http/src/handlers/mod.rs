pub mod health;
pub mod modules;
pub mod permissions;
pub mod users;

pub use health::health_check;
pub use modules::list_modules;
pub use permissions::{
    delete_permission, list_permissions, my_permissions, reload_permissions, set_permission,
};
pub use users::{create_user, delete_user, list_users};
