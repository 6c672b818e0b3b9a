pub mod model;
pub mod rating;
pub mod store;
pub mod validate;

pub use model::{Rating, Role, Store, User};
pub use store::{Database, NewStore, NewUser, StoreDashboard, StoreFilter, StoreListing, UserFilter};
