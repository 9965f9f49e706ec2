//! Remote database startup and shutdown

use crate::{Connection, Environment, Result, conn::SessionMode, env::Env, oci::*, version::Feature};
use std::ops::BitOr;

/// Phases of the database startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartupMode(u32);

impl StartupMode {
    /// Starts the instance
    pub const START : StartupMode = StartupMode(1);
    /// Mounts the database
    pub const MOUNT : StartupMode = StartupMode(2);
    /// Opens the database
    pub const OPEN  : StartupMode = StartupMode(4);
    pub const FULL  : StartupMode = StartupMode(7);

    pub fn contains(self, other: StartupMode) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for StartupMode {
    type Output = StartupMode;

    fn bitor(self, rhs: StartupMode) -> StartupMode {
        StartupMode(self.0 | rhs.0)
    }
}

/// Options of the instance start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StartupFlags(u32);

impl StartupFlags {
    pub const DEFAULT  : StartupFlags = StartupFlags(OCI_DEFAULT);
    /// Shuts down a running instance in abort mode before starting it
    pub const FORCE    : StartupFlags = StartupFlags(OCI_DBSTARTUPFLAG_FORCE);
    /// Only users with the RESTRICTED SESSION privilege can connect
    pub const RESTRICT : StartupFlags = StartupFlags(OCI_DBSTARTUPFLAG_RESTRICT);
}

impl BitOr for StartupFlags {
    type Output = StartupFlags;

    fn bitor(self, rhs: StartupFlags) -> StartupFlags {
        StartupFlags(self.0 | rhs.0)
    }
}

/// Phases of the database shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownMode(u32);

impl ShutdownMode {
    /// Stops new connections and waits for the current ones according to `ShutdownFlag`
    pub const SHUTDOWN : ShutdownMode = ShutdownMode(1);
    /// Closes the database
    pub const CLOSE    : ShutdownMode = ShutdownMode(2);
    /// Dismounts the database
    pub const DISMOUNT : ShutdownMode = ShutdownMode(4);
    pub const FULL     : ShutdownMode = ShutdownMode(7);

    pub fn contains(self, other: ShutdownMode) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ShutdownMode {
    type Output = ShutdownMode;

    fn bitor(self, rhs: ShutdownMode) -> ShutdownMode {
        ShutdownMode(self.0 | rhs.0)
    }
}

/// How the shutdown treats the active sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShutdownFlag {
    /// Waits for all users to disconnect
    #[default]
    Default,
    /// Waits for all transactions to complete
    Transactional,
    /// Waits for the local transactions to complete
    TransactionalLocal,
    /// Rolls back active transactions and disconnects users
    Immediate,
    /// Terminates the instance immediately. The database is neither closed nor dismounted.
    Abort,
}

impl ShutdownFlag {
    fn oci_mode(self) -> u32 {
        match self {
            ShutdownFlag::Default            => OCI_DEFAULT,
            ShutdownFlag::Transactional      => OCI_DBSHUTDOWN_TRANSACTIONAL,
            ShutdownFlag::TransactionalLocal => OCI_DBSHUTDOWN_TRANSACTIONAL_LOCAL,
            ShutdownFlag::Immediate          => OCI_DBSHUTDOWN_IMMEDIATE,
            ShutdownFlag::Abort              => OCI_DBSHUTDOWN_ABORT,
        }
    }
}

/**
    Starts the database.

    `mode` must include `SessionMode::SYSDBA` or `SessionMode::SYSOPER`. The instance is
    started over a preliminary connection, then the database is mounted and opened
    over a regular one, as requested by `start_mode`. `spfile` names a client side
    parameter file.

    # Example

    ```no_run
    use oracall::{SessionMode, StartupMode, StartupFlags};

    let oracle = oracall::env()?;
    oracall::startup(
        &oracle, "//localhost/ORCL", "sys", "secret", SessionMode::SYSDBA,
        StartupMode::FULL, StartupFlags::DEFAULT, None
    )?;
    # Ok::<(),oracall::Error>(())
    ```
*/
#[allow(clippy::too_many_arguments)]
pub fn startup(
    env: &Environment, db: &str, user: &str, pass: &str, mode: SessionMode,
    start_mode: StartupMode, flags: StartupFlags, spfile: Option<&str>
) -> Result<()> {
    env.check_feature(Feature::RemoteDbStartup)?;
    if start_mode.contains(StartupMode::START) {
        let conn = Connection::new(env, db, user, pass, mode | SessionMode::PRELIM_AUTH)?;
        let mut admin = Handle::<OCIAdmin>::null();
        if let Some(spfile) = spfile.filter(|name| !name.is_empty()) {
            admin = Handle::<OCIAdmin>::new(env.env_ptr())?;
            admin.set_attr(OCI_ATTR_ADMIN_PFILE, spfile, conn.err_ptr())?;
        }
        catch!{conn.err_ptr() =>
            OCIDBStartup(conn.svc_ptr(), conn.err_ptr(), admin.get(), OCI_DEFAULT, flags.0)
        }
        log::info!("started instance of {}", db);
    }
    if start_mode.contains(StartupMode::MOUNT) || start_mode.contains(StartupMode::OPEN) {
        let conn = Connection::new(env, db, user, pass, mode.without(SessionMode::PRELIM_AUTH))?;
        if start_mode.contains(StartupMode::MOUNT) {
            conn.execute_immediate("ALTER DATABASE MOUNT", ())?;
            log::info!("mounted {}", db);
        }
        if start_mode.contains(StartupMode::OPEN) {
            conn.execute_immediate("ALTER DATABASE OPEN", ())?;
            log::info!("opened {}", db);
        }
    }
    Ok(())
}

/**
    Shuts the database down.

    With `ShutdownFlag::Abort` only the first phase is performed. Otherwise the database
    is closed and dismounted as requested by `shut_mode`, and the instance is then
    shut down.

    # Example

    ```no_run
    use oracall::{SessionMode, ShutdownMode, ShutdownFlag};

    let oracle = oracall::env()?;
    oracall::shutdown(
        &oracle, "//localhost/ORCL", "sys", "secret", SessionMode::SYSDBA,
        ShutdownMode::FULL, ShutdownFlag::Immediate
    )?;
    # Ok::<(),oracall::Error>(())
    ```
*/
pub fn shutdown(
    env: &Environment, db: &str, user: &str, pass: &str, mode: SessionMode,
    shut_mode: ShutdownMode, flag: ShutdownFlag
) -> Result<()> {
    env.check_feature(Feature::RemoteDbStartup)?;
    let conn = Connection::new(env, db, user, pass, mode)?;
    if shut_mode.contains(ShutdownMode::SHUTDOWN) {
        catch!{conn.err_ptr() =>
            OCIDBShutdown(conn.svc_ptr(), conn.err_ptr(), std::ptr::null_mut(), flag.oci_mode())
        }
        log::info!("shutting down {} ({:?})", db, flag);
    }
    if flag != ShutdownFlag::Abort {
        if shut_mode.contains(ShutdownMode::CLOSE) {
            conn.execute_immediate("ALTER DATABASE CLOSE NORMAL", ())?;
            log::info!("closed {}", db);
        }
        if shut_mode.contains(ShutdownMode::DISMOUNT) {
            conn.execute_immediate("ALTER DATABASE DISMOUNT", ())?;
            log::info!("dismounted {}", db);
        }
        catch!{conn.err_ptr() =>
            OCIDBShutdown(conn.svc_ptr(), conn.err_ptr(), std::ptr::null_mut(), OCI_DBSHUTDOWN_FINAL)
        }
        log::info!("instance of {} is shut down", db);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modes_combine() {
        let mode = StartupMode::START | StartupMode::MOUNT;
        assert!(mode.contains(StartupMode::START));
        assert!(!mode.contains(StartupMode::OPEN));
        assert!(StartupMode::FULL.contains(mode));
        assert!(ShutdownMode::FULL.contains(ShutdownMode::DISMOUNT));
        assert_eq!(ShutdownFlag::default().oci_mode(), OCI_DEFAULT);
        assert_eq!(ShutdownFlag::Abort.oci_mode(), OCI_DBSHUTDOWN_ABORT);
    }
}
