//! Errors raised by OCI calls and by the library itself.

use crate::oci::*;
use crate::version::Feature;
use libc::c_void;
use parking_lot::RwLock;
use std::{cell::RefCell, cmp, error, ffi::CStr, fmt, io, panic::Location, ptr, sync::{Arc, atomic::{AtomicBool, Ordering}}};

/// Runs an OCI call and returns early with the error recorded in `$err` when the call fails.
macro_rules! catch {
    ( $err:expr => $( $stmt:stmt );+ ) => {{
        let res = unsafe { $($stmt)+ };
        crate::err::check(res, $err)?;
    }};
}

type ErrorHandler = Box<dyn Fn(&Error) + Send + Sync>;
type SharedHandler = Arc<dyn Fn(&Error) + Send + Sync>;

static HANDLER : RwLock<Option<SharedHandler>> = parking_lot::const_rwlock(None);
static WARNINGS : AtomicBool = AtomicBool::new(false);

thread_local! {
    static LAST_ERROR : RefCell<Option<Error>> = RefCell::new(None);
}

/// Origin of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Reported by the server or by the OCI client
    Oracle,
    /// `OCI_SUCCESS_WITH_INFO` diagnostics. Only reported when warnings are enabled.
    Warning,
    /// Detected by this library
    Library,
}

/// Errors detected by the library itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LibError {
    #[error("OCI environment is not initialized")]
    NotInitialized,
    #[error("cannot load OCI shared library {0}")]
    LoadingSharedLib(String),
    #[error("cannot load OCI symbol {0}")]
    LoadingSymbols(&'static str),
    #[error("OCI environment was not initialized in threaded mode")]
    Multithreaded,
    #[error("memory allocation failed")]
    Memory,
    #[error("{0} is not available with the loaded OCI client or connected server")]
    NotAvailable(Feature),
    #[error("unexpected null pointer")]
    NullPointer,
    #[error("datatype {0} is not supported")]
    DatatypeNotSupported(u16),
    #[error("cannot parse '{0}'")]
    ParseToken(String),
    #[error("cannot map argument {0}")]
    MapArgument(String),
    #[error("index {0} is out of bounds")]
    OutOfBounds(usize),
    #[error("{0} {1} still allocated at teardown")]
    UnfreedData(&'static str, usize),
    #[error("maximum number of binds reached")]
    MaxBind,
    #[error("attribute {0} not found")]
    AttrNotFound(String),
    #[error("value {0} is below the minimum of {1}")]
    MinValue(usize, usize),
    #[error("{0} is not compatible with {1}")]
    NotCompatible(String, String),
    #[error("statement is not {0}")]
    StmtState(&'static str),
    #[error("statement is not scrollable")]
    StmtNotScrollable,
    #[error("bind '{0}' is already used")]
    BindAlreadyUsed(String),
    #[error("bind array size {0} exceeds the size {1} the arrays were bound with")]
    BindArraySize(usize, usize),
    #[error("column '{0}' not found")]
    ColumnNotFound(String),
    #[error("direct path is not {0}")]
    DirPathState(&'static str),
    #[error("cannot create OCI environment")]
    CreateEnv,
    #[error("rebinding '{0}' with a different datatype")]
    RebindBadDatatype(String),
    #[error("{0} is not a {1}")]
    TypeInfoDatatype(String, &'static str),
    #[error("item not found")]
    ItemNotFound,
    #[error("invalid value for {0}")]
    ArgInvalidValue(&'static str),
    #[error("cannot convert {0} into {1}")]
    Conversion(&'static str, &'static str),
    #[error("connection is not {0}")]
    ConnState(&'static str),
}

/// Represents errors reported by Oracle and by this library.
#[derive(Debug, Clone)]
pub struct Error {
    kind: ErrorKind,
    code: i32,
    internal: Option<LibError>,
    message: String,
    location: &'static Location<'static>,
    row: u32,
}

fn get_oracle_error(rc: i32, errhp: *mut c_void, htype: u32) -> (i32, String) {
    let mut errcode = rc;
    let mut errmsg : Vec<u8> = Vec::with_capacity(OCI_ERROR_MAXMSG_SIZE);
    let errmsg_ptr = errmsg.as_mut_ptr();
    let res = unsafe {
        *errmsg_ptr = 0;
        OCIErrorGet(errhp, 1, ptr::null(), &mut errcode, errmsg_ptr, OCI_ERROR_MAXMSG_SIZE as u32, htype)
    };
    let msg = if res == OCI_SUCCESS {
        let msg = unsafe { CStr::from_ptr(errmsg_ptr as *const libc::c_char) };
        msg.to_string_lossy().trim_end().to_string()
    } else {
        match rc {
            OCI_NO_DATA   => String::from("No Data"),
            OCI_NEED_DATA => String::from("Need Data"),
            _ => format!("Error {}", rc),
        }
    };
    (errcode, msg)
}

/// Returns the ORA code recorded in the error handle without raising it.
pub(crate) fn oracle_code(err: *mut OCIError) -> i32 {
    get_oracle_error(OCI_ERROR, err as *mut c_void, OCI_HTYPE_ERROR).0
}

/// Converts an OCI return code into a `Result`.
///
/// Failures are raised: recorded as the thread's last error and passed to the
/// registered handler. `OCI_SUCCESS_WITH_INFO` is reported as a warning when
/// warnings are enabled and is otherwise treated as success.
#[track_caller]
pub(crate) fn check(res: i32, err: *mut OCIError) -> crate::Result<i32> {
    match res {
        OCI_ERROR | OCI_INVALID_HANDLE => Err( Error::oci(err, res) ),
        OCI_SUCCESS_WITH_INFO => {
            if WARNINGS.load(Ordering::Relaxed) {
                let (code, message) = get_oracle_error(res, err as *mut c_void, OCI_HTYPE_ERROR);
                let warning = Error {
                    kind: ErrorKind::Warning, code, internal: None, message,
                    location: Location::caller(), row: 0
                };
                log::warn!("{}", warning);
                notify(&warning);
            }
            Ok(res)
        }
        _ => Ok(res)
    }
}

pub(crate) fn set_warnings(enabled: bool) {
    WARNINGS.store(enabled, Ordering::Relaxed);
}

pub(crate) fn warnings_enabled() -> bool {
    WARNINGS.load(Ordering::Relaxed)
}

/// Registers the process-wide error handler. `None` removes the current one.
pub(crate) fn set_handler(handler: Option<ErrorHandler>) {
    *HANDLER.write() = handler.map(SharedHandler::from);
}

fn notify(err: &Error) {
    // the lock is released before the call, so the handler may replace itself
    let handler = HANDLER.read().clone();
    if let Some(handler) = handler {
        handler(err);
    }
}

/**
    Returns the last error raised on the calling thread.

    # Example

    ```
    let err = oracall::last_error();
    assert!(err.is_none());
    ```
*/
pub fn last_error() -> Option<Error> {
    LAST_ERROR.with(|last| last.borrow().clone())
}

fn raise(err: Error) -> Error {
    LAST_ERROR.with(|last| *last.borrow_mut() = Some(err.clone()));
    notify(&err);
    err
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            ErrorKind::Library => write!(f, "Error occurred at {}: {}", self.location, self.message),
            _ if self.message.starts_with("ORA-") => f.write_str(&self.message),
            _ => write!(f, "ORA-{:05}: {}", self.code, self.message),
        }
    }
}

impl error::Error for Error {}

impl cmp::PartialEq for Error {
    fn eq(&self, other: &Error) -> bool {
        self.kind == other.kind && self.code == other.code && self.internal == other.internal
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        io::Error::new(io::ErrorKind::Other, err)
    }
}

impl Error {
    /// Creates a library error with a free-form message.
    #[track_caller]
    pub(crate) fn new(msg: &str) -> Self {
        raise(Error {
            kind: ErrorKind::Library, code: 0, internal: None, message: msg.to_owned(),
            location: Location::caller(), row: 0
        })
    }

    #[track_caller]
    pub(crate) fn lib(code: LibError) -> Self {
        raise(Error {
            kind: ErrorKind::Library, code: 0, message: code.to_string(), internal: Some(code),
            location: Location::caller(), row: 0
        })
    }

    #[track_caller]
    pub(crate) fn env(env: *mut OCIEnv, rc: i32) -> Self {
        let (code, message) = get_oracle_error(rc, env as *mut c_void, OCI_HTYPE_ENV);
        raise(Error { kind: ErrorKind::Oracle, code, internal: None, message, location: Location::caller(), row: 0 })
    }

    #[track_caller]
    pub(crate) fn oci(err: *mut OCIError, rc: i32) -> Self {
        let (code, message) = get_oracle_error(rc, err as *mut c_void, OCI_HTYPE_ERROR);
        raise(Error { kind: ErrorKind::Oracle, code, internal: None, message, location: Location::caller(), row: 0 })
    }

    /// Creates an error for one row of an array DML executed in batch-error mode.
    /// These are collected, not raised.
    #[track_caller]
    pub(crate) fn batch(err: *mut OCIError, row: u32) -> Self {
        let (code, message) = get_oracle_error(OCI_ERROR, err as *mut c_void, OCI_HTYPE_ERROR);
        Error { kind: ErrorKind::Oracle, code, internal: None, message, location: Location::caller(), row }
    }

    /// Returns the origin of the error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the ORA error code, or 0 for library errors.
    pub fn code(&self) -> i32 {
        self.code
    }

    /// Returns the library error code for errors detected by the library.
    pub fn internal(&self) -> Option<&LibError> {
        self.internal.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the source location where the error was raised.
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// Returns the 1-based row of a failed array DML iteration, or 0.
    pub fn row(&self) -> u32 {
        self.row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, atomic::AtomicUsize};

    // the handler is process-wide
    static HANDLER_TESTS : parking_lot::Mutex<()> = parking_lot::const_mutex(());

    #[test]
    fn library_error_display() {
        let err = Error::lib(LibError::StmtNotScrollable);
        let text = err.to_string();
        assert!(text.starts_with("Error occurred at "), "{}", text);
        assert!(text.ends_with(": statement is not scrollable"), "{}", text);
        assert!(text.contains("err.rs"), "{}", text);
        assert_eq!(err.kind(), ErrorKind::Library);
        assert_eq!(err.code(), 0);
        assert_eq!(err.internal(), Some(&LibError::StmtNotScrollable));
    }

    #[test]
    fn last_error_is_per_thread() {
        let _ = Error::lib(LibError::ColumnNotFound("ID".into()));
        let last = last_error().expect("recorded error");
        assert_eq!(last.internal(), Some(&LibError::ColumnNotFound("ID".into())));

        let other = std::thread::spawn(|| last_error().is_none()).join().unwrap();
        assert!(other);
    }

    #[test]
    fn handler_sees_raised_errors() {
        let _serial = HANDLER_TESTS.lock();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        set_handler(Some(Box::new(move |err: &Error| {
            if err.internal() == Some(&LibError::AttrNotFound("handler check".into())) {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        })));
        let _ = Error::lib(LibError::AttrNotFound("handler check".into()));
        let _ = Error::lib(LibError::AttrNotFound("handler check".into()));
        set_handler(None);
        let _ = Error::lib(LibError::AttrNotFound("handler check".into()));
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn handler_can_unregister_itself() {
        let _serial = HANDLER_TESTS.lock();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        set_handler(Some(Box::new(move |err: &Error| {
            if err.internal() == Some(&LibError::AttrNotFound("one-shot handler".into())) {
                counter.fetch_add(1, Ordering::SeqCst);
                set_handler(None);
            }
        })));
        let _ = Error::lib(LibError::AttrNotFound("one-shot handler".into()));
        let _ = Error::lib(LibError::AttrNotFound("one-shot handler".into()));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn batch_errors_keep_row() {
        let err = Error {
            kind: ErrorKind::Oracle, code: 1, internal: None,
            message: "ORA-00001: unique constraint (T_PK) violated".into(),
            location: Location::caller(), row: 3
        };
        assert_eq!(err.row(), 3);
        assert_eq!(err.to_string(), "ORA-00001: unique constraint (T_PK) violated");
    }

    #[test]
    fn io_error_conversion() {
        let err : io::Error = Error::lib(LibError::NullPointer).into();
        assert_eq!(err.kind(), io::ErrorKind::Other);
    }
}
