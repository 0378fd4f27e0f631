pub mod promote;
pub mod remove;

pub use promote::promote;
pub use remove::remove_dir_all_if_exists;
