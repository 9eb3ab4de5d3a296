pub mod cache;
pub mod model;
pub mod parser;
pub mod source;

pub use cache::{detect_changes, ChangeSet, StatusCache};
pub use model::{InstanceStatus, StatusSnapshot};
pub use parser::parse_global_status;
pub use source::{StatusSource, VagrantGlobalStatus};
