// Monitoring platform API: retrying JSON client and team endpoints.
pub mod retry;
pub mod teams;

pub use retry::{ApiClient, RetryPolicy, Sleeper, TokioSleeper};
pub use teams::{build_payload, namespace_filter, TeamsApi};
