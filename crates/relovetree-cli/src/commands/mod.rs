//! Command implementations.

pub mod check;
pub mod clone;
pub mod delete;
pub mod dump;
pub mod list;
pub mod sync;
pub mod trees;

pub use self::check::{execute_check, execute_check_all};
pub use self::clone::execute_clone;
pub use self::delete::execute_delete;
pub use self::dump::execute_dump;
pub use self::list::execute_list;
pub use self::sync::execute_sync;
pub use self::trees::execute_trees;
