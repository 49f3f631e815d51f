pub mod api;
pub mod controller;
pub mod dispatcher;
pub mod feed;
pub mod http;
pub mod loading;
pub mod notify;
pub mod sequencer;
pub mod store;

pub use api::{ApiEnvelope, ApiRequest, HttpMethod, RemoteApi};
pub use controller::BoardController;
pub use dispatcher::{shared_cache, Dispatcher, FetchOutcome, SharedCache, SuccessCallback};
pub use feed::{ChangeFeed, ChangePayload, ChangeType, ChangeWatcher, ProjectChange};
pub use http::HttpApi;
pub use loading::{LoadingGuard, LoadingTracker};
pub use notify::{Notice, NoticeKind, Notifier, RecordingNotifier, TracingNotifier};
pub use sequencer::ScopeSequencer;
pub use store::{AtomicWriter, Snapshot, SnapshotStore};
