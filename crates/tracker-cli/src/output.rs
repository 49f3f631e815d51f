//! JSON envelope written by every command: one object on stdout on success,
//! one on stderr on failure.

use serde::Serialize;
use tracker_client::{Notice, NoticeKind};
use tracker_core::{ErrorKind, TrackerError};

const API_VERSION: &str = env!("CARGO_PKG_VERSION");

/// What went wrong, so scripts can branch without parsing the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Bad arguments or a snapshot file that is missing or unreadable.
    Usage,
    NotFound,
    Validation,
    Server,
    Network,
}

impl From<&TrackerError> for FailureKind {
    fn from(err: &TrackerError) -> Self {
        match err {
            TrackerError::Config(_) | TrackerError::Io(_) | TrackerError::Serialization(_) => {
                Self::Usage
            }
            other => match other.kind() {
                ErrorKind::NotFound => Self::NotFound,
                ErrorKind::Validation => Self::Validation,
                ErrorKind::Server => Self::Server,
                ErrorKind::Network => Self::Network,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

#[derive(Serialize)]
pub struct CliResponse<T: Serialize> {
    pub success: bool,
    pub api_version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Failure>,
}

impl<T: Serialize> CliResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            api_version: API_VERSION,
            data: Some(data),
            error: None,
        }
    }
}

impl CliResponse<()> {
    fn failed(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            api_version: API_VERSION,
            data: None,
            error: Some(Failure {
                kind,
                message: message.into(),
            }),
        }
    }
}

#[derive(Serialize)]
pub struct ListResponse<T: Serialize> {
    pub items: Vec<T>,
    pub count: usize,
}

fn render<T: Serialize>(response: &CliResponse<T>) -> String {
    serde_json::to_string(response).unwrap_or_else(|e| {
        format!(
            r#"{{"success":false,"api_version":"{}","error":{{"kind":"server","message":"unserializable response: {}"}}}}"#,
            API_VERSION, e
        )
    })
}

pub fn output_success<T: Serialize>(data: T) {
    println!("{}", render(&CliResponse::ok(data)));
}

pub fn output_list<T: Serialize>(items: Vec<T>) {
    let count = items.len();
    output_success(ListResponse { items, count });
}

pub fn output_failure(kind: FailureKind, message: impl Into<String>) -> ! {
    eprintln!("{}", render(&CliResponse::failed(kind, message)));
    std::process::exit(1);
}

/// Reject the invocation itself and exit with code 1.
pub fn output_error(message: &str) -> ! {
    output_failure(FailureKind::Usage, message)
}

pub fn output_tracker_error(err: &TrackerError) -> ! {
    output_failure(FailureKind::from(err), err.to_string())
}

/// Report the first notice raised by a remote call. Query and mutation
/// failures carry no status, so they surface as server faults.
pub fn output_notice(notice: &Notice) -> ! {
    let kind = match notice.kind {
        NoticeKind::QueryError | NoticeKind::MutationError => FailureKind::Server,
        NoticeKind::Advisory => FailureKind::Usage,
    };
    output_failure(kind, notice.message.as_str())
}
