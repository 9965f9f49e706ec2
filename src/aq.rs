//! Oracle Advanced Queuing

mod admin;
mod agent;
mod dequeue;
mod enqueue;
mod message;

pub use admin::*;
pub use agent::Agent;
pub use dequeue::{Dequeue, DequeueMode, Navigation};
pub use enqueue::{Enqueue, SequenceDeviation};
pub use message::{Message, MessageState};

use crate::{Error, Result, err::LibError, oci::*};
use std::{ffi::CString, ptr};

/// When the enqueued or dequeued message becomes visible to other sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// The operation is part of the current transaction
    OnCommit,
    /// The operation is a separate transaction
    Immediate,
}

impl Visibility {
    fn from_oci(val: u32) -> Self {
        if val == OCI_ENQ_IMMEDIATE { Visibility::Immediate } else { Visibility::OnCommit }
    }

    fn oci_value(self) -> u32 {
        match self {
            Visibility::OnCommit  => OCI_ENQ_ON_COMMIT,
            Visibility::Immediate => OCI_ENQ_IMMEDIATE,
        }
    }
}

/// RAW value allocated by OCI, such as a message id or a RAW payload.
pub(crate) struct OciRaw {
    env: *mut OCIEnv,
    err: *mut OCIError,
    raw: *mut OCIRaw,
}

impl Drop for OciRaw {
    fn drop(&mut self) {
        if !self.raw.is_null() {
            unsafe { OCIRawResize(self.env, self.err, 0, &mut self.raw); }
        }
    }
}

impl OciRaw {
    pub(crate) fn new(env: *mut OCIEnv, err: *mut OCIError) -> Self {
        Self { env, err, raw: ptr::null_mut() }
    }

    /// Takes ownership of a RAW that OCI allocated.
    pub(crate) fn from_ptr(env: *mut OCIEnv, err: *mut OCIError, raw: *mut OCIRaw) -> Self {
        Self { env, err, raw }
    }

    pub(crate) fn assign(&mut self, bytes: &[u8]) -> Result<()> {
        catch!{self.err =>
            OCIRawAssignBytes(self.env, self.err, bytes.as_ptr(), bytes.len() as u32, &mut self.raw)
        }
        Ok(())
    }

    pub(crate) fn get(&self) -> *mut OCIRaw {
        self.raw
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut *mut OCIRaw {
        &mut self.raw
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        raw_bytes(self.env, self.raw)
    }
}

/// Returns the content of a RAW that OCI owns.
pub(crate) fn raw_bytes<'r>(env: *mut OCIEnv, raw: *const OCIRaw) -> &'r [u8] {
    if raw.is_null() {
        return &[];
    }
    unsafe {
        let len = OCIRawSize(env, raw) as usize;
        let data = OCIRawPtr(env, raw);
        if data.is_null() || len == 0 { &[] } else { std::slice::from_raw_parts(data, len) }
    }
}

/// Queue names are passed to OCI as NUL-terminated text.
fn queue_name(name: &str) -> Result<CString> {
    if name.is_empty() {
        return Err( Error::lib(LibError::ArgInvalidValue("queue name")) );
    }
    CString::new(name).map_err(|_| Error::lib(LibError::ArgInvalidValue("queue name")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_names_are_validated() {
        assert!(queue_name("hr.orders_q").is_ok());
        assert!(queue_name("").is_err());
        assert!(queue_name("bad\0name").is_err());
    }

    #[test]
    fn visibility_values() {
        assert_eq!(Visibility::from_oci(OCI_ENQ_IMMEDIATE), Visibility::Immediate);
        assert_eq!(Visibility::from_oci(OCI_ENQ_ON_COMMIT), Visibility::OnCommit);
        assert_eq!(Visibility::Immediate.oci_value(), OCI_ENQ_IMMEDIATE);
    }
}
