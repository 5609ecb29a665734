//! Jobs that run beside the HTTP server for the life of the process. Each
//! stops when its `CancellationToken` fires.

pub mod session_cleanup;
