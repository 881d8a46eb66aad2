//! Background jobs spawned from `main` with `tokio::spawn`.
//!
//! Each job takes a [`CancellationToken`](tokio_util::sync::CancellationToken)
//! and returns once it is cancelled.

pub mod session_cleanup;
