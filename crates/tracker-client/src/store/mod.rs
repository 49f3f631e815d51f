pub mod atomic_writer;
pub mod snapshot_store;

pub use atomic_writer::AtomicWriter;
pub use snapshot_store::{Snapshot, SnapshotStore, SNAPSHOT_VERSION};
