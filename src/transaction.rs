//! Local and global (XA) transactions

use crate::{Connection, Error, Result, env::Env, err::LibError, list::ItemId, oci::*};
use libc::c_long;
use std::{fmt, ops::BitOr};

const XID_PART_MAX_SIZE : usize = 64;

/// Transaction start flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransactionMode(u32);

impl TransactionMode {
    pub const NEW          : TransactionMode = TransactionMode(OCI_TRANS_NEW);
    pub const READONLY     : TransactionMode = TransactionMode(OCI_TRANS_READONLY);
    pub const READWRITE    : TransactionMode = TransactionMode(OCI_TRANS_READWRITE);
    pub const SERIALIZABLE : TransactionMode = TransactionMode(OCI_TRANS_SERIALIZABLE);
    pub const LOOSE        : TransactionMode = TransactionMode(OCI_TRANS_LOOSE);
    pub const TIGHT        : TransactionMode = TransactionMode(OCI_TRANS_TIGHT);

    pub fn contains(self, other: TransactionMode) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub(crate) fn bits(self) -> u32 {
        self.0
    }
}

impl BitOr for TransactionMode {
    type Output = TransactionMode;
    fn bitor(self, rhs: TransactionMode) -> TransactionMode {
        TransactionMode(self.0 | rhs.0)
    }
}

/// Properties a transaction was created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionInfo {
    mode: TransactionMode,
    timeout: u32,
    global: bool,
}

impl TransactionInfo {
    pub(crate) fn new(mode: TransactionMode, timeout: u32, global: bool) -> Self {
        Self { mode, timeout, global }
    }

    pub fn mode(&self) -> TransactionMode {
        self.mode
    }

    /// Seconds a global transaction may stay inactive after it is detached.
    pub fn timeout(&self) -> u32 {
        self.timeout
    }

    /// Whether the transaction has an XID.
    pub fn is_global(&self) -> bool {
        self.global
    }
}

/// Registry entry of a transaction handle that is in use by a connection.
#[derive(Clone, Copy)]
pub(crate) struct TransEntry {
    ptr: Ptr<OCITrans>,
    info: TransactionInfo,
}

impl TransEntry {
    pub(crate) fn new(ptr: Ptr<OCITrans>, info: TransactionInfo) -> Self {
        Self { ptr, info }
    }

    pub(crate) fn ptr(&self) -> *mut OCITrans {
        self.ptr.get()
    }

    pub(crate) fn info(&self) -> TransactionInfo {
        self.info
    }
}

/**
    X/Open transaction identifier.

    # Example

    ```
    use oracall::Xid;

    let xid = Xid::new(0x1234, b"global-1", b"branch-1")?;
    assert_eq!(xid.gtrid(), b"global-1");

    assert!(Xid::new(0, &[0u8; 65], b"").is_err());
    # Ok::<(),oracall::Error>(())
    ```
*/
#[derive(Clone, PartialEq, Eq)]
pub struct Xid {
    format_id: i64,
    gtrid: Vec<u8>,
    bqual: Vec<u8>,
}

impl fmt::Debug for Xid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Xid({}, {:02x?}, {:02x?})", self.format_id, self.gtrid, self.bqual)
    }
}

impl Xid {
    /// Creates an identifier. The global transaction id and the branch qualifier are up to 64 bytes each.
    pub fn new(format_id: i64, gtrid: &[u8], bqual: &[u8]) -> Result<Self> {
        if gtrid.len() > XID_PART_MAX_SIZE {
            return Err( Error::lib(LibError::ArgInvalidValue("global transaction id")) );
        }
        if bqual.len() > XID_PART_MAX_SIZE {
            return Err( Error::lib(LibError::ArgInvalidValue("branch qualifier")) );
        }
        Ok( Self { format_id, gtrid: gtrid.to_vec(), bqual: bqual.to_vec() } )
    }

    pub fn format_id(&self) -> i64 {
        self.format_id
    }

    pub fn gtrid(&self) -> &[u8] {
        &self.gtrid
    }

    pub fn bqual(&self) -> &[u8] {
        &self.bqual
    }

    pub(crate) fn to_oci(&self) -> OCIXid {
        let mut data = [0u8; XID_DATA_SIZE];
        data[..self.gtrid.len()].copy_from_slice(&self.gtrid);
        data[self.gtrid.len()..self.gtrid.len() + self.bqual.len()].copy_from_slice(&self.bqual);
        OCIXid {
            format_id:    self.format_id as c_long,
            gtrid_length: self.gtrid.len() as c_long,
            bqual_length: self.bqual.len() as c_long,
            data
        }
    }
}

/**
    A transaction created explicitly on a connection.

    Without an [`Xid`] the transaction is local. Global transactions can be detached
    (by `stop`), resumed and committed in two phases.

    # Example

    ```no_run
    use oracall::{Transaction, TransactionMode, Xid};

    # let oracle = oracall::env()?;
    # let conn = oracle.connect("//localhost/ORCLPDB1", "hr", "hr")?;
    let xid = Xid::new(1, b"tx-0001", b"branch-01")?;
    let trans = Transaction::new(&conn, 60, TransactionMode::NEW, Some(&xid))?;
    conn.set_transaction(&trans)?;
    trans.start()?;
    conn.execute_immediate("UPDATE hr.employees SET salary = salary WHERE employee_id = 107", ())?;
    trans.prepare()?;
    conn.commit()?;
    # Ok::<(),oracall::Error>(())
    ```
*/
pub struct Transaction<'a> {
    conn: &'a Connection<'a>,
    trans: Handle<OCITrans>,
    info: TransactionInfo,
    reg_id: ItemId,
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        let conn = self.conn;
        if conn.current_trans_ptr() == self.trans.get() {
            if let Err(err) = stop(conn, &TransEntry::new(Ptr::new(self.trans.get()), self.info)) {
                log::debug!("cannot stop transaction: {}", err);
            }
            let default_trans = conn.default_trans_ptr();
            if !default_trans.is_null() {
                let _ = handle::set_attr(conn.svc_ptr(), OCI_ATTR_TRANS, default_trans, conn.err_ptr());
            }
            conn.set_current_trans(default_trans);
        }
        conn.transactions.remove(self.reg_id);
    }
}

impl<'a> Transaction<'a> {
    /// Creates a transaction. `timeout` is in seconds.
    pub fn new(conn: &'a Connection<'a>, timeout: u32, mode: TransactionMode, xid: Option<&Xid>) -> Result<Self> {
        let trans = Handle::<OCITrans>::new(conn.env_ptr())?;
        if let Some(xid) = xid {
            let oci_xid = xid.to_oci();
            attr_set(
                trans.get() as *mut libc::c_void, OCI_HTYPE_TRANS,
                &oci_xid as *const OCIXid as *const libc::c_void, std::mem::size_of::<OCIXid>() as u32,
                OCI_ATTR_XID, conn.err_ptr()
            )?;
        }
        let info = TransactionInfo::new(mode, timeout, xid.is_some());
        let reg_id = conn.transactions.append(TransEntry::new(Ptr::new(trans.get()), info));
        Ok( Self { conn, trans, info, reg_id } )
    }

    pub(crate) fn as_ptr(&self) -> *mut OCITrans {
        self.trans.get()
    }

    pub fn info(&self) -> TransactionInfo {
        self.info
    }

    /// Starts the transaction.
    pub fn start(&self) -> Result<()> {
        catch!{self.conn.err_ptr() =>
            OCITransStart(self.conn.svc_ptr(), self.conn.err_ptr(), self.info.timeout, self.info.mode.bits())
        }
        Ok(())
    }

    /// Resumes a detached global transaction.
    pub fn resume(&self) -> Result<()> {
        catch!{self.conn.err_ptr() =>
            OCITransStart(self.conn.svc_ptr(), self.conn.err_ptr(), self.info.timeout, OCI_TRANS_RESUME)
        }
        Ok(())
    }

    /// Ends the transaction: commits it when the connection is in autocommit mode,
    /// rolls it back otherwise. Global transactions are then detached.
    pub fn stop(&self) -> Result<()> {
        stop(self.conn, &TransEntry::new(Ptr::new(self.trans.get()), self.info))
    }

    /// Prepares a global transaction for the second commit phase.
    pub fn prepare(&self) -> Result<()> {
        catch!{self.conn.err_ptr() =>
            OCITransPrepare(self.conn.svc_ptr(), self.conn.err_ptr(), OCI_DEFAULT)
        }
        Ok(())
    }

    /// Tells the server to forget a heuristically completed global transaction.
    pub fn forget(&self) -> Result<()> {
        catch!{self.conn.err_ptr() =>
            OCITransForget(self.conn.svc_ptr(), self.conn.err_ptr(), OCI_DEFAULT)
        }
        Ok(())
    }
}

pub(crate) fn stop(conn: &Connection, entry: &TransEntry) -> Result<()> {
    if conn.autocommit() {
        conn.commit()?;
    } else {
        conn.rollback()?;
    }
    if entry.info.global {
        catch!{conn.err_ptr() =>
            OCITransDetach(conn.svc_ptr(), conn.err_ptr(), OCI_DEFAULT)
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xid_layout() {
        let xid = Xid::new(0x4f43, b"gtrid", b"bq").unwrap();
        let oci = xid.to_oci();
        assert_eq!(oci.format_id, 0x4f43);
        assert_eq!(oci.gtrid_length, 5);
        assert_eq!(oci.bqual_length, 2);
        assert_eq!(&oci.data[..7], b"gtridbq");
        assert!(oci.data[7..].iter().all(|&b| b == 0));
    }

    #[test]
    fn xid_part_limits() {
        assert!(Xid::new(1, &[1u8; 64], &[2u8; 64]).is_ok());
        let err = Xid::new(1, &[1u8; 64], &[2u8; 65]).unwrap_err();
        assert_eq!(err.internal(), Some(&LibError::ArgInvalidValue("branch qualifier")));
    }

    #[test]
    fn mode_flags() {
        let mode = TransactionMode::NEW | TransactionMode::TIGHT;
        assert!(mode.contains(TransactionMode::NEW));
        assert!(!mode.contains(TransactionMode::LOOSE));
        assert_eq!(mode.bits(), OCI_TRANS_NEW | OCI_TRANS_TIGHT);
    }
}
