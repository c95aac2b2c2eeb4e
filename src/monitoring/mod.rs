/*!
 * Monitoring
 * Tracing setup for embedding applications and tests
 */

mod tracer;

pub use tracer::{init_tracing, TRACE_JSON_ENV};
