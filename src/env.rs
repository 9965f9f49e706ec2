//! OCI environment

use crate::{Connection, Error, Result, conn::SessionMode, err::{self, LibError}, list::List, oci::{self, *}, types::Ctx, version::{Feature, OciVersion}};
use libc::c_void;
use parking_lot::RwLock;
use std::{fmt, path::PathBuf, ptr};

/// Access to the OCI environment and error handles of an object.
pub trait Env {
    fn env_ptr(&self) -> *mut OCIEnv;
    fn err_ptr(&self) -> *mut OCIError;
}

/// Kinds of values that are converted to and from text with a configurable format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    Date,
    Timestamp,
    TimestampTz,
    Numeric,
    BinaryDouble,
    BinaryFloat,
}

const FORMAT_KINDS : usize = 6;

impl FormatKind {
    fn index(self) -> usize {
        self as usize
    }

    /// Returns the built-in format.
    ///
    /// Binary floating point values have no Oracle format by default and are converted
    /// to the shortest text that reads back as the same value.
    pub fn default_format(self) -> &'static str {
        match self {
            FormatKind::Date         => "YYYY-MM-DD",
            FormatKind::Timestamp    => "YYYY-MM-DD HH24:MI:SS.FF",
            FormatKind::TimestampTz  => "YYYY-MM-DD HH24:MI:SS.FF TZR",
            FormatKind::Numeric      => "FM99999999999999999999999999999999999990.999999999999999999999999",
            FormatKind::BinaryDouble => "",
            FormatKind::BinaryFloat  => "",
        }
    }
}

/// A set of text conversion formats. Formats that are not set fall back to the next level:
/// connection to environment, environment to the built-in defaults.
#[derive(Debug, Clone, Default)]
pub(crate) struct Formats {
    formats: [Option<String>; FORMAT_KINDS],
}

impl Formats {
    pub(crate) fn get(&self, kind: FormatKind) -> Option<&str> {
        self.formats[kind.index()].as_deref()
    }

    pub(crate) fn set(&mut self, kind: FormatKind, fmt: Option<&str>) {
        self.formats[kind.index()] = fmt.map(String::from);
    }
}

type ErrorHandler = Box<dyn Fn(&Error) + Send + Sync>;

/**
    Options for creating an [`Environment`].

    # Example

    ```no_run
    let oracle = oracall::EnvOptions::new()
        .lib_path("/opt/oracle/instantclient_19_8")
        .warnings(true)
        .error_handler(|err| eprintln!("{}", err))
        .build()?;
    # Ok::<(),oracall::Error>(())
    ```
*/
pub struct EnvOptions {
    lib_path: Option<PathBuf>,
    threaded: bool,
    events: bool,
    warnings: bool,
    handler: Option<ErrorHandler>,
}

impl Default for EnvOptions {
    fn default() -> Self {
        Self { lib_path: None, threaded: true, events: false, warnings: false, handler: None }
    }
}

impl fmt::Debug for EnvOptions {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("EnvOptions")
            .field("lib_path", &self.lib_path)
            .field("threaded", &self.threaded)
            .field("events", &self.events)
            .field("warnings", &self.warnings)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

impl EnvOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the directory where the OCI client library is located. By default
    /// the library is looked up on the system library search path.
    pub fn lib_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.lib_path = Some(dir.into());
        self
    }

    /// Whether OCI handles may be used from multiple threads. Enabled by default.
    pub fn threaded(mut self, threaded: bool) -> Self {
        self.threaded = threaded;
        self
    }

    /// Initializes OCI in events mode, which is required for FAN notifications.
    pub fn events(mut self, events: bool) -> Self {
        self.events = events;
        self
    }

    /// Whether OCI warnings (`OCI_SUCCESS_WITH_INFO`) are reported to the error handler.
    pub fn warnings(mut self, warnings: bool) -> Self {
        self.warnings = warnings;
        self
    }

    /// Registers a handler that is called with every error (and warning) raised by the library.
    pub fn error_handler(mut self, handler: impl Fn(&Error) + Send + Sync + 'static) -> Self {
        self.handler = Some(Box::new(handler));
        self
    }

    fn mode(&self) -> u32 {
        let mut mode = OCI_OBJECT;
        if self.threaded {
            mode |= OCI_THREADED;
        }
        if self.events {
            mode |= OCI_EVENTS;
        }
        mode
    }

    /// Loads the OCI library and creates the environment.
    pub fn build(self) -> Result<Environment> {
        Environment::with_options(self)
    }
}

/// Represents an OCI environment.
pub struct Environment {
    err: Handle<OCIError>,
    env: Handle<OCIEnv>,
    version: OciVersion,
    threaded: bool,
    formats: RwLock<Formats>,
    pub(crate) connections: List<String>,
    pub(crate) pools: List<String>,
}

impl Env for Environment {
    fn env_ptr(&self) -> *mut OCIEnv {
        self.env.get()
    }

    fn err_ptr(&self) -> *mut OCIError {
        self.err.get()
    }
}

impl Ctx for Environment {
    fn ctx_ptr(&self) -> *mut c_void {
        self.env.get() as *mut c_void
    }

    fn format(&self, kind: FormatKind) -> String {
        Environment::format(self, kind)
    }
}

impl Drop for Environment {
    fn drop(&mut self) {
        for (kind, list) in [("connections", &self.connections), ("pools", &self.pools)] {
            let leftovers = list.drain();
            if !leftovers.is_empty() {
                log::warn!("{} {} still registered: {}", leftovers.len(), kind, leftovers.join(", "));
                let _ = Error::lib(LibError::UnfreedData(kind, leftovers.len()));
            }
        }
        log::debug!("OCI environment is closed");
    }
}

impl Environment {
    /**
    Returns a new environment with the default options.

    # Example

    ```no_run
    use oracall::Environment;

    let oracle = Environment::new()?;
    # Ok::<(),oracall::Error>(())
    ```
    */
    pub fn new() -> Result<Self> {
        Self::with_options(EnvOptions::default())
    }

    pub(crate) fn with_options(options: EnvOptions) -> Result<Self> {
        let api = oci::api::load(options.lib_path.as_deref())?;
        let mode = options.mode();
        let mut env = Handle::<OCIEnv>::null();
        let res = unsafe {
            OCIEnvNlsCreate(
                env.as_mut_ptr(), mode,
                ptr::null(), ptr::null(), ptr::null(), ptr::null(), 0, ptr::null(),
                AL32UTF8, UTF8
            )
        };
        if res != OCI_SUCCESS || env.is_null() {
            return Err( Error::lib(LibError::CreateEnv) );
        }
        let err = Handle::<OCIError>::new(env.get())?;
        err::set_warnings(options.warnings);
        if options.handler.is_some() {
            err::set_handler(options.handler);
        }
        log::info!("created OCI environment, client version {}, threaded: {}", api.version, options.threaded);
        Ok(Self {
            err, env,
            version: api.version,
            threaded: options.threaded,
            formats: RwLock::new(Formats::default()),
            connections: List::new(),
            pools: List::new(),
        })
    }

    /**
    Connects to the database with the default session mode.

    # Example

    ```no_run
    let oracle = oracall::env()?;
    let conn = oracle.connect("//localhost/ORCLPDB1", "hr", "hr")?;
    conn.ping()?;
    # Ok::<(),oracall::Error>(())
    ```
    */
    pub fn connect(&self, db: &str, user: &str, pass: &str) -> Result<Connection<'_>> {
        Connection::new(self, db, user, pass, SessionMode::DEFAULT)
    }

    /// Returns the version of the loaded OCI client library.
    pub fn runtime_version(&self) -> OciVersion {
        self.version
    }

    /// Fails with `NotAvailable` when the loaded client library does not support the feature.
    pub fn check_feature(&self, feature: Feature) -> Result<()> {
        check_feature(self.version, feature)
    }

    pub fn is_threaded(&self) -> bool {
        self.threaded
    }

    /// Returns the number of open connections created in this environment.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Returns the number of pools created in this environment.
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    /// Returns the text conversion format of the given kind.
    pub fn format(&self, kind: FormatKind) -> String {
        self.formats.read().get(kind).unwrap_or(kind.default_format()).to_string()
    }

    /// Sets the environment-wide format. `None` restores the built-in default.
    pub fn set_format(&self, kind: FormatKind, fmt: Option<&str>) {
        self.formats.write().set(kind, fmt);
    }

    fn get_attr<V: attr::AttrGet>(&self, attr_type: u32) -> Result<V> {
        self.env.get_attr(attr_type, self.err.get())
    }

    fn set_attr<V: attr::AttrSet>(&self, attr_type: u32, attr_val: V) -> Result<()> {
        self.env.set_attr(attr_type, attr_val, self.err.get())
    }

    /**
    Returns the maximum size (high watermark) for the client-side object cache
    as a percentage of the optimal size.

    # Example

    ```no_run
    let oracle = oracall::env()?;

    let max_size_percentage = oracle.max_cache_size()?;

    assert_eq!(max_size_percentage, 10);
    # Ok::<(),Box<dyn std::error::Error>>(())
    ```
    */
    pub fn max_cache_size(&self) -> Result<u32> {
        self.get_attr(OCI_ATTR_CACHE_MAX_SIZE)
    }

    /**
    Sets the maximum size (high watermark) for the client-side object cache as a percentage
    of the optimal size. Setting this attribute to 0 results in a value of 10 being used.

    If the memory occupied by the objects currently in the cache reaches or exceeds the maximum
    cache size, the cache automatically begins to free (or ages out) unmarked objects that have
    a pin count of zero.
    */
    pub fn set_cache_max_size(&self, size: u32) -> Result<()> {
        self.set_attr(OCI_ATTR_CACHE_MAX_SIZE, size)
    }

    /// Returns the optimal size for the client-side object cache in bytes.
    pub fn opt_cache_size(&self) -> Result<u32> {
        self.get_attr(OCI_ATTR_CACHE_OPT_SIZE)
    }

    /// Sets the optimal size for the client-side object cache in bytes. The default value is 8 megabytes (MB).
    pub fn set_cache_opt_size(&self, size: u32) -> Result<()> {
        self.set_attr(OCI_ATTR_CACHE_OPT_SIZE, size)
    }

    /**
    Returns the name of the language used for the database sessions created in the current environment.

    See [Database Globalization Support Guide / Locale Data / Languages][1]

    [1]: https://docs.oracle.com/en/database/oracle/oracle-database/19/nlspg/appendix-A-locale-data.html#GUID-D2FCFD55-EDC3-473F-9832-AAB564457830
    */
    pub fn nls_language(&self) -> Result<String> {
        self.get_attr(OCI_ATTR_ENV_NLS_LANGUAGE)
    }

    /// Sets the language used for the database sessions created in the current environment.
    pub fn set_nls_language(&self, lang: &str) -> Result<()> {
        self.set_attr(OCI_ATTR_ENV_NLS_LANGUAGE, lang)
    }

    /// Returns the name of the territory used for the database sessions created in the current environment.
    pub fn nls_territory(&self) -> Result<String> {
        self.get_attr(OCI_ATTR_ENV_NLS_TERRITORY)
    }

    /// Sets the name of the territory used for the database sessions created in the current environment.
    pub fn set_nls_territory(&self, territory: &str) -> Result<()> {
        self.set_attr(OCI_ATTR_ENV_NLS_TERRITORY, territory)
    }
}

pub(crate) fn check_feature(version: OciVersion, feature: Feature) -> Result<()> {
    if feature.is_available(version) {
        Ok(())
    } else {
        Err( Error::lib(LibError::NotAvailable(feature)) )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_fall_back_to_defaults() {
        let mut formats = Formats::default();
        assert_eq!(formats.get(FormatKind::Date), None);
        formats.set(FormatKind::Date, Some("DD.MM.YYYY"));
        assert_eq!(formats.get(FormatKind::Date), Some("DD.MM.YYYY"));
        assert_eq!(formats.get(FormatKind::Timestamp), None);
        formats.set(FormatKind::Date, None);
        assert_eq!(formats.get(FormatKind::Date), None);
        assert_eq!(FormatKind::Timestamp.default_format(), "YYYY-MM-DD HH24:MI:SS.FF");
    }

    #[test]
    fn options_mode() {
        let options = EnvOptions::new();
        assert_eq!(options.mode(), OCI_OBJECT | OCI_THREADED);
        let options = EnvOptions::new().threaded(false).events(true);
        assert_eq!(options.mode(), OCI_OBJECT | OCI_EVENTS);
    }

    #[test]
    fn feature_check() {
        let v = OciVersion::new(11, 2, 0);
        assert!(check_feature(v, Feature::LobSize64).is_ok());
        let err = check_feature(v, Feature::ImplicitResults).unwrap_err();
        assert_eq!(err.internal(), Some(&LibError::NotAvailable(Feature::ImplicitResults)));
    }

    #[test]
    fn missing_library() {
        if oci::api::is_loaded() {
            return;
        }
        let res = EnvOptions::new().lib_path("/nonexistent/oracle/client").build();
        match res {
            Err(err) => assert!(matches!(err.internal(), Some(LibError::LoadingSharedLib(_)))),
            Ok(_) => panic!("environment created without a client library"),
        }
    }
}
