pub mod category;
pub mod entry;
pub mod limits;
pub mod platform;

pub use category::Category;
pub use entry::{Entry, Identifier, RawEntry};
pub use limits::CategoryLimits;
pub use platform::Platform;
