//! Trigger points. The host platform owns the actual hook dispatch and the
//! daily timer; it invokes these endpoints with the affected document name.

pub mod handlers;
