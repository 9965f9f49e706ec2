//! User sessions (a.k.a. database connections)

mod output;

use crate::{
    Environment, Error, Result,
    env::{self, Env, FormatKind, Formats},
    err::LibError,
    list::{ItemId, List},
    oci::{self, *},
    pool::{Pool, PoolKind},
    stmt::{Statement, ToSql},
    transaction::{self, TransEntry, Transaction, TransactionInfo, TransactionMode},
    typeinfo::{TypeInfo, TypeInfoKind},
    types::Ctx,
    version::{Feature, OciVersion},
};
use libc::c_void;
use output::ServerOutput;
use parking_lot::{Mutex, RwLock};
use std::{ffi::CString, fmt, ops::BitOr, ptr, sync::{Arc, atomic::{AtomicBool, AtomicUsize, Ordering}}};

const DRIVER_NAME : &str = "oracall";
const SERVER_BANNER_SIZE : usize = 512;
const XA_FLAG : u32 = 0x4000_0000;

/// Lifecycle state of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConnectionState {
    Allocated,
    Attached,
    LoggedOn,
}

/**
    Session modes.

    Privileged modes can be combined with `PRELIM_AUTH`, which is needed to start up
    an idle instance:

    ```
    use oracall::SessionMode;

    let mode = SessionMode::SYSDBA | SessionMode::PRELIM_AUTH;
    assert!(mode.contains(SessionMode::SYSDBA));
    assert!(!mode.contains(SessionMode::XA));
    ```
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionMode(u32);

impl SessionMode {
    pub const DEFAULT     : SessionMode = SessionMode(OCI_DEFAULT);
    pub const SYSDBA      : SessionMode = SessionMode(OCI_SYSDBA);
    pub const SYSOPER     : SessionMode = SessionMode(OCI_SYSOPER);
    pub const SYSASM      : SessionMode = SessionMode(OCI_SYSASM);
    pub const SYSBKP      : SessionMode = SessionMode(OCI_SYSBKP);
    pub const SYSDGD      : SessionMode = SessionMode(OCI_SYSDGD);
    pub const SYSKMT      : SessionMode = SessionMode(OCI_SYSKMT);
    pub const SYSRAC      : SessionMode = SessionMode(OCI_SYSRAC);
    pub const PRELIM_AUTH : SessionMode = SessionMode(OCI_PRELIM_AUTH);
    /// The session is taken from an XA resource manager opened by a transaction monitor
    pub const XA          : SessionMode = SessionMode(XA_FLAG);

    pub fn contains(self, other: SessionMode) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    /// Removes the flags of `other`.
    pub fn without(self, other: SessionMode) -> SessionMode {
        SessionMode(self.0 & !other.0)
    }

    /// OCI mode bits. XA is a library flag and never reaches OCI.
    pub(crate) fn oci_mode(self) -> u32 {
        self.0 & !XA_FLAG
    }
}

impl BitOr for SessionMode {
    type Output = SessionMode;
    fn bitor(self, rhs: SessionMode) -> SessionMode {
        SessionMode(self.0 | rhs.0)
    }
}

/// Represents a user session
pub struct Connection<'a> {
    env: &'a Environment,
    pool: Option<&'a Pool<'a>>,
    oci_env: Ptr<OCIEnv>,
    err: Handle<OCIError>,
    srv: Handle<OCIServer>,
    svc: Handle<OCISvcCtx>,
    usr: Handle<OCISession>,
    state: ConnectionState,
    mode: SessionMode,
    alloc_handles: bool,
    db: String,
    user: String,
    pass: Mutex<String>,
    autocommit: AtomicBool,
    server_banner: String,
    server_version: OciVersion,
    formats: RwLock<Formats>,
    default_trans: Handle<OCITrans>,
    current_trans: Mutex<Ptr<OCITrans>>,
    session_tag: Mutex<Option<String>>,
    output: Mutex<Option<ServerOutput>>,
    reg_id: ItemId,
    pub(crate) tinfs: List<Arc<TypeInfo>>,
    pub(crate) transactions: List<TransEntry>,
    pub(crate) open_files: AtomicUsize,
}

impl Env for Connection<'_> {
    fn env_ptr(&self) -> *mut OCIEnv {
        self.oci_env.get()
    }

    fn err_ptr(&self) -> *mut OCIError {
        self.err.get()
    }
}

impl Ctx for Connection<'_> {
    fn ctx_ptr(&self) -> *mut c_void {
        self.usr.get() as *mut c_void
    }

    fn format(&self, kind: FormatKind) -> String {
        Connection::format(self, kind)
    }
}

impl fmt::Debug for Connection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Connection")
            .field("db", &self.db)
            .field("user", &self.user)
            .field("state", &self.state)
            .field("mode", &self.mode)
            .finish()
    }
}

impl Drop for Connection<'_> {
    fn drop(&mut self) {
        if self.state == ConnectionState::LoggedOn {
            if let Err(err) = self.disable_server_output() {
                log::debug!("cannot disable server output: {}", err);
            }
        }
        if let Err(err) = self.logoff() {
            log::warn!("logoff of {}@{} failed: {}", self.user, self.db, err);
        }
        if let Err(err) = self.detach() {
            log::warn!("detach from {} failed: {}", self.db, err);
        }
        if !self.alloc_handles {
            // owned by the XA resource manager or the session pool
            self.srv.release();
            self.svc.release();
            self.usr.release();
        }
        self.env.connections.remove(self.reg_id);
    }
}

impl<'a> Connection<'a> {
    /**
        Connects to the database and starts a new user session.

        `db` is a TNS alias, an easy connect string or, with `SessionMode::XA`, the name
        of the XA database. Empty `user` and `pass` request external authentication.

        # Example

        ```no_run
        use oracall::{Connection, SessionMode};

        let oracle = oracall::env()?;
        let conn = Connection::new(&oracle, "//localhost/ORCLPDB1", "hr", "hr", SessionMode::DEFAULT)?;
        assert!(conn.is_connected()?);
        # Ok::<(),oracall::Error>(())
        ```
    */
    pub fn new(env: &'a Environment, db: &str, user: &str, pass: &str, mode: SessionMode) -> Result<Self> {
        Self::create(env, None, db, user, pass, mode, None, None)
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn create(
        env: &'a Environment, pool: Option<&'a Pool<'a>>,
        db: &str, user: &str, pass: &str, mode: SessionMode,
        new_pass: Option<&str>, tag: Option<&str>
    ) -> Result<Self> {
        let mut conn = Self::allocate(env, pool, db, user, pass, mode)?;
        conn.attach()?;
        conn.logon(new_pass, tag)?;
        Ok(conn)
    }

    fn allocate(env: &'a Environment, pool: Option<&'a Pool<'a>>, db: &str, user: &str, pass: &str, mode: SessionMode) -> Result<Self> {
        let is_xa = mode.contains(SessionMode::XA);
        let oci_env = if is_xa {
            env.check_feature(Feature::Xa)?;
            let name = cstring(db)?;
            let xa_env = unsafe { xaoEnv(name.as_ptr() as *const u8) };
            if xa_env.is_null() {
                return Err( Error::lib(LibError::ArgInvalidValue("XA database name")) );
            }
            xa_env
        } else {
            env.env_ptr()
        };
        let from_session_pool = matches!(pool.map(Pool::kind), Some(PoolKind::Session));
        let alloc_handles = !is_xa && !from_session_pool;
        let err = Handle::<OCIError>::new(oci_env)?;
        let srv = if alloc_handles { Handle::<OCIServer>::new(oci_env)? } else { Handle::null() };
        let reg_id = env.connections.append(format!("{}@{}", user, db));
        log::debug!("allocated connection {}@{}", user, db);
        Ok(Self {
            env, pool,
            oci_env: Ptr::new(oci_env),
            err, srv,
            svc: Handle::null(),
            usr: Handle::null(),
            state: ConnectionState::Allocated,
            mode, alloc_handles,
            db: db.to_string(),
            user: user.to_string(),
            pass: Mutex::new(pass.to_string()),
            autocommit: AtomicBool::new(false),
            server_banner: String::new(),
            server_version: OciVersion::default(),
            formats: RwLock::new(Formats::default()),
            default_trans: Handle::null(),
            current_trans: Mutex::new(Ptr::null()),
            session_tag: Mutex::new(None),
            output: Mutex::new(None),
            reg_id,
            tinfs: List::new(),
            transactions: List::new(),
            open_files: AtomicUsize::new(0),
        })
    }

    fn attach(&mut self) -> Result<()> {
        if self.state != ConnectionState::Allocated {
            return Err( Error::lib(LibError::ConnState("allocated")) );
        }
        if self.alloc_handles {
            let (dblink, mode) = match self.pool {
                Some(pool) if pool.kind() == PoolKind::Connection => (pool.name().to_string(), OCI_CPOOL),
                _ => (self.db.clone(), OCI_DEFAULT),
            };
            catch!{self.err.get() =>
                OCIServerAttach(self.srv.get(), self.err.get(), dblink.as_ptr(), dblink.len() as i32, mode)
            }
            log::debug!("attached to {}", dblink);
        }
        self.state = ConnectionState::Attached;
        Ok(())
    }

    fn logon(&mut self, new_pass: Option<&str>, tag: Option<&str>) -> Result<()> {
        if self.state != ConnectionState::Attached {
            return Err( Error::lib(LibError::ConnState("attached")) );
        }
        if self.mode.contains(SessionMode::XA) {
            self.logon_xa()?;
        } else if let Some(pool) = self.pool.filter(|pool| pool.kind() == PoolKind::Session) {
            self.logon_session_pool(pool, tag)?;
        } else {
            self.logon_regular(new_pass)?;
        }
        self.state = ConnectionState::LoggedOn;

        if !self.mode.contains(SessionMode::PRELIM_AUTH) {
            self.fetch_server_version()?;
        }
        log::info!("{} logged on to {}", self.user, self.db);
        Ok(())
    }

    fn logon_xa(&mut self) -> Result<()> {
        let name = cstring(&self.db)?;
        let svc = unsafe { xaoSvcCtx(name.as_ptr() as *const u8) };
        if svc.is_null() {
            return Err( Error::lib(LibError::ArgInvalidValue("XA database name")) );
        }
        self.svc = Handle::from(svc);
        let srv : *mut OCIServer = self.svc.get_attr(OCI_ATTR_SERVER, self.err.get())?;
        let usr : *mut OCISession = self.svc.get_attr(OCI_ATTR_SESSION, self.err.get())?;
        self.srv = Handle::from(srv);
        self.usr = Handle::from(usr);
        self.user = self.usr.get_attr::<String>(OCI_ATTR_USERNAME, self.err.get())?;
        Ok(())
    }

    fn logon_regular(&mut self, new_pass: Option<&str>) -> Result<()> {
        let err = self.err.get();
        self.usr = Handle::new(self.oci_env.get())?;
        self.svc = Handle::new(self.oci_env.get())?;
        self.svc.set_attr(OCI_ATTR_SERVER, self.srv.get(), err)?;

        if let Some(new_pass) = new_pass {
            self.svc.set_attr(OCI_ATTR_SESSION, self.usr.get(), err)?;
            let old_pass = self.pass.lock().clone();
            catch!{err =>
                OCIPasswordChange(
                    self.svc.get(), err,
                    self.user.as_ptr(), self.user.len() as u32,
                    old_pass.as_ptr(), old_pass.len() as u32,
                    new_pass.as_ptr(), new_pass.len() as u32,
                    OCI_AUTH
                )
            }
            *self.pass.lock() = new_pass.to_string();
        } else {
            let pass = self.pass.lock().clone();
            self.usr.set_attr(OCI_ATTR_DRIVER_NAME, DRIVER_NAME, err)?;
            let cred = if self.user.is_empty() && pass.is_empty() {
                OCI_CRED_EXT
            } else {
                self.usr.set_attr(OCI_ATTR_USERNAME, self.user.as_str(), err)?;
                self.usr.set_attr(OCI_ATTR_PASSWORD, pass.as_str(), err)?;
                OCI_CRED_RDBMS
            };
            catch!{err =>
                OCISessionBegin(self.svc.get(), err, self.usr.get(), cred, self.mode.oci_mode() | OCI_STMT_CACHE)
            }
            self.svc.set_attr(OCI_ATTR_SESSION, self.usr.get(), err)?;
        }

        if !self.mode.contains(SessionMode::PRELIM_AUTH) {
            self.start_default_transaction()?;
        }
        Ok(())
    }

    fn logon_session_pool(&mut self, pool: &Pool, tag: Option<&str>) -> Result<()> {
        let err = self.err.get();
        let inf = Handle::<OCIAuthInfo>::new(self.oci_env.get())?;
        inf.set_attr(OCI_ATTR_DRIVER_NAME, DRIVER_NAME, err)?;

        let mut mode = OCI_SESSGET_SPOOL;
        if self.mode.contains(SessionMode::SYSDBA) {
            mode |= OCI_SESSGET_SYSDBA;
        }
        if pool.external_auth() {
            mode |= OCI_SESSGET_CREDEXT;
        }
        let tag = tag.unwrap_or("");
        let mut ret_tag = ptr::null::<u8>();
        let mut ret_tag_len = 0u32;
        let mut found = 0u8;
        let name = pool.name();
        catch!{err =>
            OCISessionGet(
                self.oci_env.get(), err, self.svc.as_mut_ptr(), inf.get(),
                name.as_ptr(), name.len() as u32,
                tag.as_ptr(), tag.len() as u32,
                &mut ret_tag, &mut ret_tag_len, &mut found, mode
            )
        }
        let srv : *mut OCIServer = self.svc.get_attr(OCI_ATTR_SERVER, err)?;
        let usr : *mut OCISession = self.svc.get_attr(OCI_ATTR_SESSION, err)?;
        self.srv = Handle::from(srv);
        self.usr = Handle::from(usr);
        if found != 0 && !ret_tag.is_null() && ret_tag_len > 0 {
            let ret_tag = unsafe { std::slice::from_raw_parts(ret_tag, ret_tag_len as usize) };
            *self.session_tag.lock() = Some(String::from_utf8_lossy(ret_tag).into_owned());
        }
        Ok(())
    }

    fn start_default_transaction(&mut self) -> Result<()> {
        let err = self.err.get();
        self.default_trans = Handle::new(self.oci_env.get())?;
        self.svc.set_attr(OCI_ATTR_TRANS, self.default_trans.get(), err)?;
        catch!{err =>
            OCITransStart(self.svc.get(), err, 1, OCI_TRANS_READWRITE)
        }
        let info = TransactionInfo::new(TransactionMode::READWRITE, 1, false);
        self.transactions.append(TransEntry::new(Ptr::new(self.default_trans.get()), info));
        *self.current_trans.lock() = Ptr::new(self.default_trans.get());
        Ok(())
    }

    fn fetch_server_version(&mut self) -> Result<()> {
        let mut banner = [0u8; SERVER_BANNER_SIZE];
        let err = self.err.get();
        if self.env.runtime_version() >= OciVersion::new(18, 1, 0) {
            let mut version = 0u32;
            catch!{err =>
                OCIServerRelease2(
                    self.svc.get() as *mut c_void, err, banner.as_mut_ptr(), banner.len() as u32,
                    OCI_HTYPE_SVCCTX as u8, &mut version, OCI_DEFAULT
                )
            }
            self.server_version = OciVersion::from_server_release(version);
        } else {
            catch!{err =>
                OCIServerVersion(self.svc.get() as *mut c_void, err, banner.as_mut_ptr(), banner.len() as u32, OCI_HTYPE_SVCCTX as u8)
            }
        }
        let len = banner.iter().position(|&b| b == 0).unwrap_or(banner.len());
        self.server_banner = String::from_utf8_lossy(&banner[..len]).into_owned();
        if self.server_version == OciVersion::default() {
            self.server_version = OciVersion::from_banner(&self.server_banner).unwrap_or_default();
        }
        log::debug!("server version {}", self.server_version);
        Ok(())
    }

    fn logoff(&mut self) -> Result<()> {
        if self.state != ConnectionState::LoggedOn {
            return Ok(());
        }
        let err = self.err.get();

        if self.open_files.load(Ordering::Relaxed) > 0 {
            catch!{err =>
                OCILobFileCloseAll(self.svc.get(), err)
            }
            self.open_files.store(0, Ordering::Relaxed);
        }

        for entry in self.transactions.drain() {
            if let Err(err) = transaction::stop(self, &entry) {
                log::debug!("cannot stop transaction: {}", err);
            }
        }
        *self.current_trans.lock() = Ptr::null();
        self.tinfs.drain();

        if self.mode.contains(SessionMode::XA) {
            // the resource manager owns the session
        } else if self.pool.map(Pool::kind) == Some(PoolKind::Session) {
            if self.autocommit() {
                self.commit()?;
            } else {
                self.rollback()?;
            }
            let tag = self.session_tag.lock().clone();
            match tag {
                Some(tag) => catch!{err =>
                    OCISessionRelease(self.svc.get(), err, tag.as_ptr(), tag.len() as u32, OCI_SESSRLS_RETAG)
                },
                None => catch!{err =>
                    OCISessionRelease(self.svc.get(), err, ptr::null(), 0, OCI_DEFAULT)
                },
            }
            self.svc.release();
            self.usr.release();
            self.srv.release();
        } else {
            catch!{err =>
                OCISessionEnd(self.svc.get(), err, self.usr.get(), OCI_DEFAULT)
            }
            self.default_trans.free();
            self.usr.free();
            self.svc.free();
        }
        self.state = ConnectionState::Attached;
        log::info!("{} logged off from {}", self.user, self.db);
        Ok(())
    }

    fn detach(&mut self) -> Result<()> {
        if self.state != ConnectionState::Attached {
            return Ok(());
        }
        if self.alloc_handles {
            let err = self.err.get();
            catch!{err =>
                OCIServerDetach(self.srv.get(), err, OCI_DEFAULT)
            }
            self.srv.free();
            log::debug!("detached from {}", self.db);
        }
        self.state = ConnectionState::Allocated;
        Ok(())
    }

    pub(crate) fn svc_ptr(&self) -> *mut OCISvcCtx {
        self.svc.get()
    }

    pub(crate) fn srv_ptr(&self) -> *mut OCIServer {
        self.srv.get()
    }

    pub(crate) fn usr_ptr(&self) -> *mut OCISession {
        self.usr.get()
    }

    pub(crate) fn env(&self) -> &'a Environment {
        self.env
    }

    pub(crate) fn current_trans_ptr(&self) -> *mut OCITrans {
        self.current_trans.lock().get()
    }

    pub(crate) fn set_current_trans(&self, trans: *mut OCITrans) {
        *self.current_trans.lock() = Ptr::new(trans);
    }

    pub(crate) fn default_trans_ptr(&self) -> *mut OCITrans {
        self.default_trans.get()
    }

    /// Fails with `NotAvailable` when either the client or the server does not support the feature.
    pub(crate) fn check_feature(&self, feature: Feature) -> Result<()> {
        env::check_feature(self.version(), feature)
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Returns the connection string (or the XA database name) the connection was created with.
    pub fn db(&self) -> &str {
        &self.db
    }

    /// Returns the name of the session user.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Returns the pool this connection was taken from.
    pub fn pool(&self) -> Option<&'a Pool<'a>> {
        self.pool
    }

    /**
        Prepares SQL or PL/SQL statement for execution.

        # Example

        ```no_run
        # let oracle = oracall::env()?;
        # let conn = oracle.connect("//localhost/ORCLPDB1", "hr", "hr")?;
        let mut stmt = conn.prepare("
            SELECT first_name
              FROM hr.employees
             WHERE employee_id = :id
        ")?;
        let mut rows = stmt.query(107)?;
        if let Some(row) = rows.next()? {
            let name : Option<String> = row.get(0)?;
            assert_eq!(name.as_deref(), Some("Diana"));
        }
        # Ok::<(),oracall::Error>(())
        ```
    */
    pub fn prepare(&self, sql: &str) -> Result<Statement<'_>> {
        Statement::new(self, sql)
    }

    /// Prepares and executes a statement in one call. Returns the number of affected rows.
    pub fn execute_immediate(&self, sql: &str, args: impl ToSql) -> Result<usize> {
        let mut stmt = self.prepare(sql)?;
        stmt.execute(args)
    }

    /// Commits the current transaction.
    pub fn commit(&self) -> Result<()> {
        catch!{self.err.get() =>
            OCITransCommit(self.svc.get(), self.err.get(), OCI_DEFAULT)
        }
        Ok(())
    }

    /// Rolls back the current transaction.
    pub fn rollback(&self) -> Result<()> {
        catch!{self.err.get() =>
            OCITransRollback(self.svc.get(), self.err.get(), OCI_DEFAULT)
        }
        Ok(())
    }

    /// Whether statements are committed as soon as they are successfully executed.
    pub fn autocommit(&self) -> bool {
        self.autocommit.load(Ordering::Relaxed)
    }

    pub fn set_autocommit(&self, enable: bool) {
        self.autocommit.store(enable, Ordering::Relaxed);
    }

    /// Makes a round-trip to the server to confirm that the connection and the server are active.
    pub fn ping(&self) -> Result<()> {
        if oci::api::has_function("OCIPing") {
            catch!{self.err.get() =>
                OCIPing(self.svc.get(), self.err.get(), OCI_DEFAULT)
            }
            Ok(())
        } else if self.is_connected()? {
            Ok(())
        } else {
            Err( Error::lib(LibError::ConnState("connected")) )
        }
    }

    /// Aborts the call that is currently running on this connection in another thread.
    pub fn break_execution(&self) -> Result<()> {
        catch!{self.err.get() =>
            OCIBreak(self.svc.get() as *mut c_void, self.err.get())
        }
        Ok(())
    }

    /// Reports whether the server handle is connected to the server.
    /// This does not make a round-trip.
    pub fn is_connected(&self) -> Result<bool> {
        if self.srv.is_null() {
            return Ok(false);
        }
        let status : u32 = self.srv.get_attr(OCI_ATTR_SERVER_STATUS, self.err.get())?;
        Ok( status == OCI_SERVER_NORMAL )
    }

    /// Returns the server banner, e.g. "Oracle Database 19c Enterprise Edition Release 19.0.0.0.0 - Production".
    pub fn server_version(&self) -> &str {
        &self.server_banner
    }

    pub fn server_major_version(&self) -> u32 {
        self.server_version.major()
    }

    pub fn server_minor_version(&self) -> u32 {
        self.server_version.minor()
    }

    pub fn server_revision_version(&self) -> u32 {
        self.server_version.update()
    }

    /// Returns the version that governs which features are available:
    /// the lower of the client and server versions.
    pub fn version(&self) -> OciVersion {
        let client = self.env.runtime_version();
        if self.server_version == OciVersion::default() {
            client
        } else {
            client.min(self.server_version)
        }
    }

    /// Changes the password of the session user.
    pub fn set_password(&self, new_pass: &str) -> Result<()> {
        let old_pass = self.pass.lock().clone();
        catch!{self.err.get() =>
            OCIPasswordChange(
                self.svc.get(), self.err.get(),
                self.user.as_ptr(), self.user.len() as u32,
                old_pass.as_ptr(), old_pass.len() as u32,
                new_pass.as_ptr(), new_pass.len() as u32,
                OCI_DEFAULT
            )
        }
        *self.pass.lock() = new_pass.to_string();
        Ok(())
    }

    /**
        Sets the name of the current module (`V$SESSION.MODULE`) running in the client application.
        Can be up to 48 bytes long.

        # Example

        ```no_run
        # let oracle = oracall::env()?;
        # let conn = oracle.connect("//localhost/ORCLPDB1", "hr", "hr")?;
        conn.set_module("oracall")?;

        let mut stmt = conn.prepare("
            SELECT module
              FROM v$session
             WHERE sid = SYS_CONTEXT('USERENV', 'SID')
        ")?;
        let mut rows = stmt.query(())?;
        let row = rows.next()?.expect("current session");
        let module : Option<String> = row.get(0)?;
        assert_eq!(module.as_deref(), Some("oracall"));
        # Ok::<(),oracall::Error>(())
        ```
    */
    pub fn set_module(&self, name: &str) -> Result<()> {
        self.usr.set_attr(OCI_ATTR_MODULE, name, self.err.get())
    }

    /// Sets the name of the current action (`V$SESSION.ACTION`) within the current module.
    /// Can be up to 32 bytes long.
    pub fn set_action(&self, action: &str) -> Result<()> {
        self.usr.set_attr(OCI_ATTR_ACTION, action, self.err.get())
    }

    /// Sets the user identifier (`V$SESSION.CLIENT_IDENTIFIER`). Can be up to 64 bytes long.
    pub fn set_client_identifier(&self, id: &str) -> Result<()> {
        self.usr.set_attr(OCI_ATTR_CLIENT_IDENTIFIER, id, self.err.get())
    }

    /// Sets additional client application information (`V$SESSION.CLIENT_INFO`).
    /// Can be up to 64 bytes long.
    pub fn set_client_info(&self, info: &str) -> Result<()> {
        self.usr.set_attr(OCI_ATTR_CLIENT_INFO, info, self.err.get())
    }

    /// Returns the current schema.
    pub fn current_schema(&self) -> Result<String> {
        self.usr.get_attr(OCI_ATTR_CURRENT_SCHEMA, self.err.get())
    }

    /**
        Sets the current schema. It has the same effect as `ALTER SESSION SET CURRENT_SCHEMA`.
        The schema is altered on the next call that does a round-trip to the server.
    */
    pub fn set_current_schema(&self, schema_name: &str) -> Result<()> {
        self.usr.set_attr(OCI_ATTR_CURRENT_SCHEMA, schema_name, self.err.get())
    }

    /**
        Sets the default prefetch buffer size for each LOB locator fetched in this session.
        The default is zero, which means no prefetching of LOB data.
    */
    pub fn set_lob_prefetch_size(&self, size: u32) -> Result<()> {
        self.usr.set_attr(OCI_ATTR_DEFAULT_LOBPREFETCH_SIZE, size, self.err.get())
    }

    /// Causes the server to measure call time, in milliseconds, for each subsequent OCI call.
    pub fn start_call_time_measurements(&self) -> Result<()> {
        self.usr.set_attr(OCI_ATTR_COLLECT_CALL_TIME, 1u8, self.err.get())
    }

    /// Returns the server-side time for the preceding call in microseconds.
    pub fn call_time(&self) -> Result<u64> {
        self.usr.get_attr(OCI_ATTR_CALL_TIME, self.err.get())
    }

    /// Terminates call time measurements.
    pub fn stop_call_time_measurements(&self) -> Result<()> {
        self.usr.set_attr(OCI_ATTR_COLLECT_CALL_TIME, 0u8, self.err.get())
    }

    /// Returns the time, in milliseconds, a round-trip call may take before it is interrupted.
    /// Zero means no limit.
    pub fn call_timeout(&self) -> Result<u32> {
        self.check_feature(Feature::CallTimeout)?;
        self.svc.get_attr(OCI_ATTR_CALL_TIMEOUT, self.err.get())
    }

    pub fn set_call_timeout(&self, timeout_ms: u32) -> Result<()> {
        self.check_feature(Feature::CallTimeout)?;
        self.svc.set_attr(OCI_ATTR_CALL_TIMEOUT, timeout_ms, self.err.get())
    }

    /// Returns the number of statements kept in the statement cache.
    pub fn statement_cache_size(&self) -> Result<u32> {
        self.check_feature(Feature::StatementCaching)?;
        self.svc.get_attr(OCI_ATTR_STMTCACHESIZE, self.err.get())
    }

    pub fn set_statement_cache_size(&self, size: u32) -> Result<()> {
        self.check_feature(Feature::StatementCaching)?;
        self.svc.set_attr(OCI_ATTR_STMTCACHESIZE, size, self.err.get())
    }

    /// Returns the tag of a session taken from a session pool.
    pub fn session_tag(&self) -> Option<String> {
        self.session_tag.lock().clone()
    }

    /// Sets the tag the session will be released to its session pool with.
    /// `None` releases it untagged.
    pub fn set_session_tag(&self, tag: Option<&str>) {
        *self.session_tag.lock() = tag.map(String::from);
    }

    /// Returns the name of the database the connection is attached to.
    pub fn db_name(&self) -> Result<String> {
        self.srv.get_attr(OCI_ATTR_DBNAME, self.err.get())
    }

    pub fn instance_name(&self) -> Result<String> {
        self.srv.get_attr(OCI_ATTR_INSTNAME, self.err.get())
    }

    pub fn service_name(&self) -> Result<String> {
        self.srv.get_attr(OCI_ATTR_SERVICENAME, self.err.get())
    }

    pub fn domain_name(&self) -> Result<String> {
        self.srv.get_attr(OCI_ATTR_DBDOMAIN, self.err.get())
    }

    /// Returns the format in effect in this connection: its own, or the environment's one.
    pub fn format(&self, kind: FormatKind) -> String {
        match self.formats.read().get(kind) {
            Some(fmt) => fmt.to_string(),
            None => self.env.format(kind),
        }
    }

    /// Overrides the environment format for this connection. `None` restores the environment's one.
    pub fn set_format(&self, kind: FormatKind, fmt: Option<&str>) {
        self.formats.write().set(kind, fmt);
    }

    /**
        Describes a table, a view or a named type. Descriptions are cached per connection.

        # Example

        ```no_run
        use oracall::TypeInfoKind;

        # let oracle = oracall::env()?;
        # let conn = oracle.connect("//localhost/ORCLPDB1", "hr", "hr")?;
        let employees = conn.describe_type("hr.employees", TypeInfoKind::Table)?;
        assert!(employees.column_count() > 0);
        assert_eq!(employees.column(0)?.name(), "EMPLOYEE_ID");
        # Ok::<(),oracall::Error>(())
        ```
    */
    pub fn describe_type(&self, name: &str, kind: TypeInfoKind) -> Result<Arc<TypeInfo>> {
        TypeInfo::get(self, name, kind)
    }

    /// Returns the properties of the current transaction, if there is one.
    pub fn transaction(&self) -> Option<TransactionInfo> {
        let current = self.current_trans_ptr();
        if current.is_null() {
            return None;
        }
        self.transactions.find(|entry| entry.ptr() == current).map(|entry| entry.info())
    }

    /// Stops the current transaction and makes `trans` the current one.
    pub fn set_transaction(&self, trans: &Transaction) -> Result<()> {
        let current = self.current_trans_ptr();
        if let Some(entry) = self.transactions.find(|entry| entry.ptr() == current) {
            transaction::stop(self, &entry)?;
        }
        self.svc.set_attr(OCI_ATTR_TRANS, trans.as_ptr(), self.err.get())?;
        self.set_current_trans(trans.as_ptr());
        Ok(())
    }

    /**
        Enables `DBMS_OUTPUT` in this session.

        `buffer_size` is the server buffer size in bytes, 0 for unlimited. `line_size` is
        the maximum length of a line that will be retrieved.

        # Example

        ```no_run
        # let oracle = oracall::env()?;
        # let conn = oracle.connect("//localhost/ORCLPDB1", "hr", "hr")?;
        conn.enable_server_output(0, 255)?;
        conn.execute_immediate("BEGIN DBMS_OUTPUT.PUT_LINE('hello'); END;", ())?;
        assert_eq!(conn.server_output_line()?.as_deref(), Some("hello"));
        assert_eq!(conn.server_output_line()?, None);
        # Ok::<(),oracall::Error>(())
        ```
    */
    pub fn enable_server_output(&self, buffer_size: u32, line_size: u32) -> Result<()> {
        let sql = if buffer_size == 0 {
            String::from("BEGIN DBMS_OUTPUT.ENABLE(NULL); END;")
        } else {
            format!("BEGIN DBMS_OUTPUT.ENABLE({}); END;", buffer_size)
        };
        self.execute_immediate(&sql, ())?;
        let max_line_size = if self.version() >= OciVersion::new(10, 2, 0) { 32767 } else { 255 };
        let output = ServerOutput::new(line_size.clamp(1, max_line_size));
        *self.output.lock() = Some(output);
        Ok(())
    }

    /// Returns the next line of the server output or `None` when all lines were retrieved.
    pub fn server_output_line(&self) -> Result<Option<String>> {
        let mut output = self.output.lock();
        match output.as_mut() {
            Some(output) => output.next_line(self),
            None => Ok(None),
        }
    }

    /// Disables `DBMS_OUTPUT`. Does nothing when it was not enabled.
    pub fn disable_server_output(&self) -> Result<()> {
        if self.output.lock().take().is_some() {
            self.execute_immediate("BEGIN DBMS_OUTPUT.DISABLE(); END;", ())?;
        }
        Ok(())
    }
}

/// Changes the password of `user` without keeping a session open.
pub fn set_user_password(env: &Environment, db: &str, user: &str, old_pass: &str, new_pass: &str) -> Result<()> {
    let conn = Connection::create(env, None, db, user, old_pass, SessionMode::DEFAULT, Some(new_pass), None)?;
    drop(conn);
    Ok(())
}

fn cstring(text: &str) -> Result<CString> {
    CString::new(text).map_err(|_| Error::lib(LibError::ArgInvalidValue("name with a NUL character")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_mode_flags() {
        let mode = SessionMode::SYSDBA | SessionMode::PRELIM_AUTH;
        assert!(mode.contains(SessionMode::SYSDBA));
        assert!(mode.contains(SessionMode::PRELIM_AUTH));
        assert!(!mode.contains(SessionMode::SYSOPER));
        assert!(!mode.contains(SessionMode::DEFAULT));
        assert_eq!(mode.oci_mode(), OCI_SYSDBA | OCI_PRELIM_AUTH);
        assert_eq!(mode.without(SessionMode::PRELIM_AUTH), SessionMode::SYSDBA);
    }

    #[test]
    fn xa_flag_is_not_passed_to_oci() {
        let mode = SessionMode::XA | SessionMode::SYSOPER;
        assert!(mode.contains(SessionMode::XA));
        assert_eq!(mode.oci_mode(), OCI_SYSOPER);
    }

    #[test]
    fn states_are_ordered() {
        assert!(ConnectionState::Allocated < ConnectionState::Attached);
        assert!(ConnectionState::Attached < ConnectionState::LoggedOn);
    }

    #[test]
    fn names_with_nul_are_rejected() {
        assert!(cstring("ORCL").is_ok());
        let err = cstring("OR\0CL").unwrap_err();
        assert!(matches!(err.internal(), Some(LibError::ArgInvalidValue(_))));
    }
}
