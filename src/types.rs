//! Data Type Mapping and Manipulation Functions

pub(crate) mod date;
pub(crate) mod number;
pub(crate) mod timestamp;
pub(crate) mod interval;
pub(crate) mod rowid;

pub use date::Date;
pub use number::Number;
pub use rowid::RowID;

use crate::env::{Env, FormatKind};
use libc::c_void;

/**
    Both OCIDateTime and OCIInterval can be invoked in an OCI environment or
    a user session context. This trait specifies protocol that all scalar types
    use to function in either context.
*/
pub trait Ctx: Env {
    /// Returns pointer to the current context - either environment or session.
    fn ctx_ptr(&self) -> *mut c_void;

    /// Returns the text conversion format in effect in this context.
    fn format(&self, kind: FormatKind) -> String;
}

/// Converts text returned by an OCI `...ToText` call.
pub(crate) fn text_from(buf: &[u8], len: usize) -> String {
    let len = len.min(buf.len());
    String::from_utf8_lossy(&buf[..len]).into_owned()
}
