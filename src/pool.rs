//! Connection and session pools

use crate::{Connection, Environment, Error, Result, conn::SessionMode, env::Env, err::LibError, list::ItemId, oci::*, version::Feature};
use parking_lot::Mutex;
use std::{fmt, ptr};

const DRIVER_NAME : &str = "oracall";
const DEFAULT_STMT_CACHE_SIZE : u32 = 20;

/// Kind of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolKind {
    /// A group of physical connections (servers) that sessions are multiplexed over
    Connection,
    /// A group of stateless sessions
    Session,
}

enum PoolHandle {
    Connection(Handle<OCICPool>),
    Session(Handle<OCISPool>),
}

impl PoolHandle {
    fn get_attr<V: attr::AttrGet>(&self, attr_type: u32, err: *mut OCIError) -> Result<V> {
        match self {
            PoolHandle::Connection(pool) => pool.get_attr(attr_type, err),
            PoolHandle::Session(pool) => pool.get_attr(attr_type, err),
        }
    }

    fn set_attr<V: attr::AttrSet>(&self, attr_type: u32, attr_val: V, err: *mut OCIError) -> Result<()> {
        match self {
            PoolHandle::Connection(pool) => pool.set_attr(attr_type, attr_val, err),
            PoolHandle::Session(pool) => pool.set_attr(attr_type, attr_val, err),
        }
    }
}

/**
    A pool of connections or sessions.

    Connections taken from the pool are returned to it when they are dropped.

    # Example

    ```no_run
    use oracall::{Pool, PoolKind, SessionMode};

    let oracle = oracall::env()?;
    let pool = Pool::new(&oracle, PoolKind::Session, "//localhost/ORCLPDB1", "hr", "hr", SessionMode::DEFAULT, 0, 4, 1)?;
    {
        let conn = pool.get_connection(None)?;
        conn.ping()?;
        assert_eq!(pool.busy_count()?, 1);
    }
    assert_eq!(pool.busy_count()?, 0);
    # Ok::<(),oracall::Error>(())
    ```
*/
pub struct Pool<'a> {
    env: &'a Environment,
    kind: PoolKind,
    err: Handle<OCIError>,
    pool: PoolHandle,
    _auth: Handle<OCIAuthInfo>,
    name: String,
    db: String,
    user: String,
    pass: String,
    mode: SessionMode,
    min: u32,
    max: u32,
    incr: u32,
    cache_size: Mutex<u32>,
    reg_id: ItemId,
}

impl fmt::Debug for Pool<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Pool")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("db", &self.db)
            .field("user", &self.user)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("incr", &self.incr)
            .finish()
    }
}

impl Drop for Pool<'_> {
    fn drop(&mut self) {
        let err = self.err.get();
        let res = match &self.pool {
            PoolHandle::Connection(pool) => unsafe { OCIConnectionPoolDestroy(pool.get(), err, OCI_DEFAULT) },
            PoolHandle::Session(pool) => unsafe { OCISessionPoolDestroy(pool.get(), err, OCI_SPD_FORCE) },
        };
        if res != OCI_SUCCESS {
            log::warn!("cannot destroy pool {}: {}", self.name, Error::oci(err, res));
        }
        self.env.pools.remove(self.reg_id);
        log::debug!("destroyed pool {}", self.name);
    }
}

impl<'a> Pool<'a> {
    /**
        Creates a pool. `max` must be at least 1.

        Session pools created with a user name and a password, and not in `SYSDBA`
        mode, are homogeneous: all their sessions are authenticated as that user.
    */
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        env: &'a Environment, kind: PoolKind,
        db: &str, user: &str, pass: &str, mode: SessionMode,
        min: u32, max: u32, incr: u32
    ) -> Result<Self> {
        if max < 1 {
            return Err( Error::lib(LibError::MinValue(max as usize, 1)) );
        }
        if kind == PoolKind::Session {
            env.check_feature(Feature::StatementCaching)?;
        }
        let mode = mode.without(SessionMode::XA);
        let err = Handle::<OCIError>::new(env.env_ptr())?;
        let mut auth = Handle::<OCIAuthInfo>::null();

        let mut name_ptr = ptr::null::<u8>();
        let (pool, name_len) = match kind {
            PoolKind::Connection => {
                let pool = Handle::<OCICPool>::new(env.env_ptr())?;
                let mut name_len = 0i32;
                catch!{err.get() =>
                    OCIConnectionPoolCreate(
                        env.env_ptr(), err.get(), pool.get(),
                        &mut name_ptr, &mut name_len,
                        db.as_ptr(), db.len() as i32,
                        min, max, incr,
                        user.as_ptr(), user.len() as i32,
                        pass.as_ptr(), pass.len() as i32,
                        OCI_DEFAULT
                    )
                }
                (PoolHandle::Connection(pool), name_len.max(0) as usize)
            }
            PoolKind::Session => {
                let pool = Handle::<OCISPool>::new(env.env_ptr())?;
                auth = Handle::<OCIAuthInfo>::new(env.env_ptr())?;
                auth.set_attr(OCI_ATTR_DRIVER_NAME, DRIVER_NAME, err.get())?;
                pool.set_attr(OCI_ATTR_SPOOL_AUTH, auth.get(), err.get())?;
                let mut spc_mode = OCI_SPC_STMTCACHE;
                if !mode.contains(SessionMode::SYSDBA) && !user.is_empty() && !pass.is_empty() {
                    spc_mode |= OCI_SPC_HOMOGENEOUS;
                }
                let mut name_len = 0u32;
                catch!{err.get() =>
                    OCISessionPoolCreate(
                        env.env_ptr(), err.get(), pool.get(),
                        &mut name_ptr, &mut name_len,
                        db.as_ptr(), db.len() as u32,
                        min, max, incr,
                        user.as_ptr(), user.len() as u32,
                        pass.as_ptr(), pass.len() as u32,
                        spc_mode
                    )
                }
                (PoolHandle::Session(pool), name_len as usize)
            }
        };
        let name = if name_ptr.is_null() || name_len == 0 {
            String::new()
        } else {
            let bytes = unsafe { std::slice::from_raw_parts(name_ptr, name_len) };
            String::from_utf8_lossy(bytes).into_owned()
        };

        let reg_id = env.pools.append(name.clone());
        let pool = Self {
            env, kind, err, pool, _auth: auth, name,
            db: db.to_string(),
            user: user.to_string(),
            pass: pass.to_string(),
            mode, min, max, incr,
            cache_size: Mutex::new(0),
            reg_id,
        };
        if pool.statement_cache_size()? == 0 {
            pool.set_statement_cache_size(DEFAULT_STMT_CACHE_SIZE)?;
        }
        log::info!("created {:?} pool {} for {}@{} ({}..{} by {})", kind, pool.name, user, db, min, max, incr);
        Ok(pool)
    }

    pub fn kind(&self) -> PoolKind {
        self.kind
    }

    /// Returns the name OCI assigned to the pool.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn db(&self) -> &str {
        &self.db
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Whether sessions are authenticated externally.
    pub(crate) fn external_auth(&self) -> bool {
        self.user.is_empty() && self.pass.is_empty()
    }

    /**
        Returns a connection from the pool. `tag` selects a session of a session pool
        that was released with that tag (see [`Connection::set_session_tag`]).

        The connection is returned to the pool when it is dropped.
    */
    pub fn get_connection(&self, tag: Option<&str>) -> Result<Connection<'_>> {
        let conn = Connection::create(self.env, Some(self), &self.db, &self.user, &self.pass, self.mode, None, tag)?;
        conn.set_statement_cache_size(self.statement_cache_size()?)?;
        Ok(conn)
    }

    fn count_attr(&self, conn_attr: u32, spool_attr: u32) -> Result<u32> {
        let attr_type = match self.kind {
            PoolKind::Connection => conn_attr,
            PoolKind::Session => spool_attr,
        };
        self.pool.get_attr(attr_type, self.err.get())
    }

    /// Returns the number of connections or sessions checked out from the pool.
    pub fn busy_count(&self) -> Result<u32> {
        self.count_attr(OCI_ATTR_CONN_BUSY_COUNT, OCI_ATTR_SPOOL_BUSY_COUNT)
    }

    /// Returns the number of open connections or sessions.
    pub fn open_count(&self) -> Result<u32> {
        self.count_attr(OCI_ATTR_CONN_OPEN_COUNT, OCI_ATTR_SPOOL_OPEN_COUNT)
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn increment(&self) -> u32 {
        self.incr
    }

    /// Returns the time, in seconds, after which idle connections or sessions are closed.
    pub fn timeout(&self) -> Result<u32> {
        self.count_attr(OCI_ATTR_CONN_TIMEOUT, OCI_ATTR_SPOOL_TIMEOUT)
    }

    pub fn set_timeout(&self, seconds: u32) -> Result<()> {
        let attr_type = match self.kind {
            PoolKind::Connection => OCI_ATTR_CONN_TIMEOUT,
            PoolKind::Session => OCI_ATTR_SPOOL_TIMEOUT,
        };
        self.pool.set_attr(attr_type, seconds, self.err.get())
    }

    /// Whether a request fails instead of waiting when all connections or sessions are busy
    /// and the pool cannot grow.
    pub fn nowait(&self) -> Result<bool> {
        match self.kind {
            PoolKind::Connection => {
                let nowait : u8 = self.pool.get_attr(OCI_ATTR_CONN_NOWAIT, self.err.get())?;
                Ok( nowait != 0 )
            }
            PoolKind::Session => {
                let mode : u8 = self.pool.get_attr(OCI_ATTR_SPOOL_GETMODE, self.err.get())?;
                Ok( mode == OCI_SPOOL_ATTRVAL_NOWAIT )
            }
        }
    }

    pub fn set_nowait(&self, nowait: bool) -> Result<()> {
        match self.kind {
            PoolKind::Connection => self.pool.set_attr(OCI_ATTR_CONN_NOWAIT, nowait as u8, self.err.get()),
            PoolKind::Session => {
                let mode = if nowait { OCI_SPOOL_ATTRVAL_NOWAIT } else { OCI_SPOOL_ATTRVAL_WAIT };
                self.pool.set_attr(OCI_ATTR_SPOOL_GETMODE, mode, self.err.get())
            }
        }
    }

    /// Returns the statement cache size of the pool's sessions.
    pub fn statement_cache_size(&self) -> Result<u32> {
        let mut cache_size = self.cache_size.lock();
        if self.kind == PoolKind::Session {
            *cache_size = self.pool.get_attr(OCI_ATTR_SPOOL_STMTCACHESIZE, self.err.get())?;
        }
        Ok(*cache_size)
    }

    /// Sets the statement cache size of the pool's sessions. Connections of a connection pool
    /// get it when they are taken from the pool.
    pub fn set_statement_cache_size(&self, size: u32) -> Result<()> {
        if self.kind == PoolKind::Session {
            self.pool.set_attr(OCI_ATTR_SPOOL_STMTCACHESIZE, size, self.err.get())?;
        }
        *self.cache_size.lock() = size;
        Ok(())
    }
}
