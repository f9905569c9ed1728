pub mod error;
pub mod lockfile;
pub mod path;

pub use error::{LockError, UtilError};
pub use lockfile::{write_atomic, LockFile};
pub use path::BagPath;

pub type Result<T> = std::result::Result<T, UtilError>;
