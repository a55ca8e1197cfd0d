/*!
 * Monitoring
 * Structured logging setup for binaries built on the sync primitives
 */

mod tracer;

pub use tracer::{init_tracing, TRACE_JSON_ENV};
