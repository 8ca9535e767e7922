mod model;
mod repository;

pub use model::{SnapshotDB, UserSettingDB};
pub use repository::SnapshotRepository;
