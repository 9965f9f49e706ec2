//! Large objects: CLOB, NCLOB, BLOB and BFILE

mod file;

pub use file::BFile;

use crate::{Connection, Error, Result, env::Env, err::LibError, oci::*};
use libc::c_void;
use std::{cell::Cell, fmt, ptr, sync::atomic::Ordering};

/// Access mode of an explicitly opened LOB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LobOpenMode {
    ReadOnly,
    ReadWrite,
}

impl LobOpenMode {
    fn oci_mode(self) -> u8 {
        match self {
            LobOpenMode::ReadOnly  => OCI_LOB_READONLY,
            LobOpenMode::ReadWrite => OCI_LOB_READWRITE,
        }
    }
}

/// Marker for locators of LOBs that are stored in the database.
pub trait InternalLob : DescriptorType<OCIType=OCILobLocator> {
    #[doc(hidden)]
    const TEMP_TYPE : u8;
    #[doc(hidden)]
    const SQL_TYPE : u16;
}

impl InternalLob for OCICLobLocator {
    const TEMP_TYPE : u8 = OCI_TEMP_CLOB;
    const SQL_TYPE : u16 = SQLT_CLOB;
}

impl InternalLob for OCIBLobLocator {
    const TEMP_TYPE : u8 = OCI_TEMP_BLOB;
    const SQL_TYPE : u16 = SQLT_BLOB;
}

/**
    Internal LOB locator. `CLOB` and `NCLOB` are character LOBs, for which offsets
    and lengths are counted in characters. `BLOB` offsets and lengths are in bytes.
    Offsets are 0-based.

    Temporary LOBs are freed when their locator is dropped.
*/
pub struct LOB<'a, T: InternalLob> {
    locator: Descriptor<T>,
    conn: &'a Connection<'a>,
    opened: Cell<bool>,
}

impl<T: InternalLob> Drop for LOB<'_, T> {
    fn drop(&mut self) {
        let svc = self.conn.svc_ptr();
        let err = self.conn.err_ptr();
        let loc = self.locator.get();
        if loc.is_null() {
            return;
        }
        if self.opened.get() {
            unsafe { OCILobClose(svc, err, loc) };
        }
        let mut is_temp = 0u8;
        let res = unsafe { OCILobIsTemporary(self.conn.env_ptr(), err, loc, &mut is_temp) };
        if res == OCI_SUCCESS && is_temp != 0 {
            let res = unsafe { OCILobFreeTemporary(svc, err, loc) };
            if res != OCI_SUCCESS {
                log::debug!("cannot free temporary LOB: {}", Error::oci(err, res));
            }
        }
    }
}

impl<T: InternalLob> fmt::Debug for LOB<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.len() {
            Ok(len) => write!(f, "LOB(len={})", len),
            Err(_)  => f.write_str("LOB"),
        }
    }
}

impl<'a, T: InternalLob> LOB<'a, T> {
    fn make(locator: Descriptor<T>, conn: &'a Connection<'a>) -> Self {
        Self { locator, conn, opened: Cell::new(false) }
    }

    /// Makes a new locator that points to the same LOB as `src`.
    pub(crate) fn from_locator(src: *const OCILobLocator, conn: &'a Connection<'a>) -> Result<Self> {
        let mut locator = Descriptor::<T>::new(conn.env_ptr())?;
        catch!{conn.err_ptr() =>
            OCILobLocatorAssign(conn.svc_ptr(), conn.err_ptr(), src, locator.as_mut_ptr())
        }
        Ok( Self::make(locator, conn) )
    }

    pub(crate) fn as_ptr(&self) -> *mut OCILobLocator {
        self.locator.get()
    }

    pub(crate) fn connection(&self) -> &'a Connection<'a> {
        self.conn
    }

    fn create_temp(conn: &'a Connection<'a>, csform: u8, cache: Cache) -> Result<Self> {
        let locator = Descriptor::<T>::new(conn.env_ptr())?;
        catch!{conn.err_ptr() =>
            OCILobCreateTemporary(
                conn.svc_ptr(), conn.err_ptr(), locator.get(),
                OCI_DEFAULT as u16, csform, T::TEMP_TYPE, cache as u8, OCI_DURATION_SESSION
            )
        }
        Ok( Self::make(locator, conn) )
    }

    /**
        Creates a new empty locator. Binding it to an INSERT or UPDATE statement
        stores an empty LOB that can later be selected for update and written.
    */
    pub fn empty(conn: &'a Connection<'a>) -> Result<Self> {
        let locator = Descriptor::<T>::new(conn.env_ptr())?;
        locator.set_attr(OCI_ATTR_LOBEMPTY, 0u32, conn.err_ptr())?;
        Ok( Self::make(locator, conn) )
    }

    pub fn is_temporary(&self) -> Result<bool> {
        let mut flag = 0u8;
        catch!{self.conn.err_ptr() =>
            OCILobIsTemporary(self.conn.env_ptr(), self.conn.err_ptr(), self.as_ptr(), &mut flag)
        }
        Ok( flag != 0 )
    }

    /// Returns `true` when the LOB locator is for a LOB on a remote database.
    pub fn is_remote(&self) -> Result<bool> {
        let flag : u8 = self.locator.get_attr(OCI_ATTR_LOB_REMOTE, self.conn.err_ptr())?;
        Ok( flag != 0 )
    }

    /// Returns the LOB length, in characters for CLOBs and NCLOBs, in bytes for BLOBs.
    pub fn len(&self) -> Result<usize> {
        let mut len = 0u64;
        catch!{self.conn.err_ptr() =>
            OCILobGetLength2(self.conn.svc_ptr(), self.conn.err_ptr(), self.as_ptr(), &mut len)
        }
        Ok( len as usize )
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok( self.len()? == 0 )
    }

    /// Returns the usable size of a LOB chunk. Reads and writes are most efficient in multiples of it.
    pub fn chunk_size(&self) -> Result<usize> {
        let mut size = 0u32;
        catch!{self.conn.err_ptr() =>
            OCILobGetChunkSize(self.conn.svc_ptr(), self.conn.err_ptr(), self.as_ptr(), &mut size)
        }
        Ok( size as usize )
    }

    /// Returns the maximum size of the LOB in bytes.
    pub fn max_size(&self) -> Result<u64> {
        let mut limit = 0u64;
        catch!{self.conn.err_ptr() =>
            OCILobGetStorageLimit(self.conn.svc_ptr(), self.conn.err_ptr(), self.as_ptr(), &mut limit)
        }
        Ok(limit)
    }

    /// Returns `true` if both locators point to the same LOB.
    pub fn is_equal(&self, other: &Self) -> Result<bool> {
        let mut flag = 0u8;
        catch!{self.conn.err_ptr() =>
            OCILobIsEqual(self.conn.env_ptr(), self.as_ptr(), other.as_ptr(), &mut flag)
        }
        Ok( flag != 0 )
    }

    /**
        Makes this locator point to the same LOB as `src`. When `src` is temporary,
        this locator gets a copy of it.
    */
    pub fn assign(&mut self, src: &Self) -> Result<()> {
        if self.opened.replace(false) {
            catch!{self.conn.err_ptr() =>
                OCILobClose(self.conn.svc_ptr(), self.conn.err_ptr(), self.as_ptr())
            }
        }
        catch!{self.conn.err_ptr() =>
            OCILobLocatorAssign(self.conn.svc_ptr(), self.conn.err_ptr(), src.as_ptr(), self.locator.as_mut_ptr())
        }
        Ok(())
    }

    /// Returns a new locator for the same LOB, or a copy of it if this LOB is temporary.
    pub fn try_clone(&self) -> Result<Self> {
        Self::from_locator(self.as_ptr(), self.conn)
    }

    /// Opens the LOB. LOB triggers and functional indexes are updated once when it is closed.
    pub fn open(&self, mode: LobOpenMode) -> Result<()> {
        catch!{self.conn.err_ptr() =>
            OCILobOpen(self.conn.svc_ptr(), self.conn.err_ptr(), self.as_ptr(), mode.oci_mode())
        }
        self.opened.set(true);
        Ok(())
    }

    pub fn close(&self) -> Result<()> {
        catch!{self.conn.err_ptr() =>
            OCILobClose(self.conn.svc_ptr(), self.conn.err_ptr(), self.as_ptr())
        }
        self.opened.set(false);
        Ok(())
    }

    pub fn is_open(&self) -> Result<bool> {
        let mut flag = 0u8;
        catch!{self.conn.err_ptr() =>
            OCILobIsOpen(self.conn.svc_ptr(), self.conn.err_ptr(), self.as_ptr(), &mut flag)
        }
        Ok( flag != 0 )
    }

    /// Appends the content of another LOB of the same kind.
    pub fn append_lob(&self, src: &Self) -> Result<()> {
        catch!{self.conn.err_ptr() =>
            OCILobAppend(self.conn.svc_ptr(), self.conn.err_ptr(), self.as_ptr(), src.as_ptr())
        }
        Ok(())
    }

    /**
        Copies `amount` characters (bytes for BLOBs) from `src` at `src_offset` into this LOB at `offset`.
        The gap between the current end of this LOB and `offset`, if any, is filled with spaces
        or zero bytes.
    */
    pub fn copy(&self, src: &Self, src_offset: usize, amount: usize, offset: usize) -> Result<()> {
        catch!{self.conn.err_ptr() =>
            OCILobCopy2(
                self.conn.svc_ptr(), self.conn.err_ptr(), self.as_ptr(), src.as_ptr(),
                amount as u64, (offset + 1) as u64, (src_offset + 1) as u64
            )
        }
        Ok(())
    }

    /// Loads `amount` bytes of an open file starting at `src_offset` into this LOB at `offset`.
    pub fn copy_from_file(&self, src: &BFile, src_offset: usize, amount: usize, offset: usize) -> Result<()> {
        catch!{self.conn.err_ptr() =>
            OCILobLoadFromFile2(
                self.conn.svc_ptr(), self.conn.err_ptr(), self.as_ptr(), src.as_ptr(),
                amount as u64, (offset + 1) as u64, (src_offset + 1) as u64
            )
        }
        Ok(())
    }

    /// Truncates the LOB to `new_len`.
    pub fn trim(&self, new_len: usize) -> Result<()> {
        catch!{self.conn.err_ptr() =>
            OCILobTrim2(self.conn.svc_ptr(), self.conn.err_ptr(), self.as_ptr(), new_len as u64)
        }
        Ok(())
    }

    /**
        Replaces `amount` characters or bytes starting at `offset` with spaces (CLOB)
        or zero bytes (BLOB). Returns the amount actually erased.
    */
    pub fn erase(&self, offset: usize, amount: usize) -> Result<usize> {
        let mut count = amount as u64;
        catch!{self.conn.err_ptr() =>
            OCILobErase2(self.conn.svc_ptr(), self.conn.err_ptr(), self.as_ptr(), &mut count, (offset + 1) as u64)
        }
        Ok( count as usize )
    }

    pub fn enable_buffering(&self) -> Result<()> {
        catch!{self.conn.err_ptr() =>
            OCILobEnableBuffering(self.conn.svc_ptr(), self.conn.err_ptr(), self.as_ptr())
        }
        Ok(())
    }

    pub fn disable_buffering(&self) -> Result<()> {
        catch!{self.conn.err_ptr() =>
            OCILobDisableBuffering(self.conn.svc_ptr(), self.conn.err_ptr(), self.as_ptr())
        }
        Ok(())
    }

    /// Writes buffered changes to the server. `free_buffers` releases the buffer resources afterwards.
    pub fn flush(&self, free_buffers: bool) -> Result<()> {
        let flag = if free_buffers { OCI_LOB_BUFFER_FREE } else { OCI_LOB_BUFFER_NOFREE };
        catch!{self.conn.err_ptr() =>
            OCILobFlushBuffer(self.conn.svc_ptr(), self.conn.err_ptr(), self.as_ptr(), flag)
        }
        Ok(())
    }

    fn charset_form(&self) -> Result<u8> {
        let mut csform = 0u8;
        catch!{self.conn.err_ptr() =>
            OCILobCharSetForm(self.conn.env_ptr(), self.conn.err_ptr(), self.as_ptr(), &mut csform)
        }
        Ok(csform)
    }

    fn read_bytes(&self, offset: usize, byte_len: usize, char_len: usize, csform: u8) -> Result<(Vec<u8>, usize)> {
        let mut buf = Vec::with_capacity(byte_len);
        let mut byte_cnt = byte_len as u64;
        let mut char_cnt = char_len as u64;
        catch!{self.conn.err_ptr() =>
            OCILobRead2(
                self.conn.svc_ptr(), self.conn.err_ptr(), self.as_ptr(),
                &mut byte_cnt, &mut char_cnt, (offset + 1) as u64,
                buf.as_mut_ptr(), byte_len as u64, OCI_ONE_PIECE,
                ptr::null_mut::<c_void>(), ptr::null::<c_void>(),
                AL32UTF8, csform
            )
        }
        unsafe {
            buf.set_len((byte_cnt as usize).min(byte_len));
        }
        Ok( (buf, char_cnt as usize) )
    }

    fn write_bytes(&self, offset: Option<usize>, data: &[u8], csform: u8) -> Result<(usize, usize)> {
        let mut byte_cnt = data.len() as u64;
        let mut char_cnt = 0u64;
        match offset {
            Some(offset) => {
                catch!{self.conn.err_ptr() =>
                    OCILobWrite2(
                        self.conn.svc_ptr(), self.conn.err_ptr(), self.as_ptr(),
                        &mut byte_cnt, &mut char_cnt, (offset + 1) as u64,
                        data.as_ptr(), data.len() as u64, OCI_ONE_PIECE,
                        ptr::null_mut::<c_void>(), ptr::null::<c_void>(),
                        AL32UTF8, csform
                    )
                }
            }
            None => {
                catch!{self.conn.err_ptr() =>
                    OCILobWriteAppend2(
                        self.conn.svc_ptr(), self.conn.err_ptr(), self.as_ptr(),
                        &mut byte_cnt, &mut char_cnt,
                        data.as_ptr(), data.len() as u64, OCI_ONE_PIECE,
                        ptr::null_mut::<c_void>(), ptr::null::<c_void>(),
                        AL32UTF8, csform
                    )
                }
            }
        }
        Ok( (byte_cnt as usize, char_cnt as usize) )
    }
}

impl<'a> LOB<'a, OCICLobLocator> {
    /**
        Creates an empty temporary CLOB.

        # Example

        ```no_run
        use oracall::{CLOB, Cache};

        # let oracle = oracall::env()?;
        # let conn = oracle.connect("//localhost/ORCLPDB1", "hr", "hr")?;
        let lob = CLOB::temp(&conn, Cache::No)?;
        let text = "tête-à-tête";
        let written = lob.write(4, text)?;
        assert_eq!(written, 11);
        // the gap before the offset is filled with spaces
        assert_eq!(lob.len()?, 15);
        assert_eq!(lob.read(0, 15)?, "    tête-à-tête");
        # Ok::<(),oracall::Error>(())
        ```
    */
    pub fn temp(conn: &'a Connection<'a>, cache: Cache) -> Result<Self> {
        Self::create_temp(conn, SQLCS_IMPLICIT, cache)
    }

    /**
        Creates an empty temporary NCLOB, a character LOB in the national character set.

        # Example

        ```no_run
        use oracall::{NCLOB, Cache};

        # let oracle = oracall::env()?;
        # let conn = oracle.connect("//localhost/ORCLPDB1", "hr", "hr")?;
        let lob = NCLOB::temp_nclob(&conn, Cache::No)?;
        assert!(lob.is_nclob()?);
        # Ok::<(),oracall::Error>(())
        ```
    */
    pub fn temp_nclob(conn: &'a Connection<'a>, cache: Cache) -> Result<Self> {
        Self::create_temp(conn, SQLCS_NCHAR, cache)
    }

    pub fn is_nclob(&self) -> Result<bool> {
        Ok( self.charset_form()? == SQLCS_NCHAR )
    }

    /// Reads up to `len` characters starting at `offset`.
    pub fn read(&self, offset: usize, len: usize) -> Result<String> {
        if len == 0 {
            return Ok(String::new());
        }
        let csform = self.charset_form()?;
        let (bytes, _) = self.read_bytes(offset, len * 4, len, csform)?;
        String::from_utf8(bytes).map_err(|_| Error::lib(LibError::Conversion("CLOB", "String")))
    }

    /// Writes `text` at `offset`. Returns the number of characters written.
    pub fn write(&self, offset: usize, text: &str) -> Result<usize> {
        if text.is_empty() {
            return Ok(0);
        }
        let csform = self.charset_form()?;
        let (_, chars) = self.write_bytes(Some(offset), text.as_bytes(), csform)?;
        Ok(chars)
    }

    /// Appends `text` at the end of the LOB. Returns the number of characters written.
    pub fn append(&self, text: &str) -> Result<usize> {
        if text.is_empty() {
            return Ok(0);
        }
        let csform = self.charset_form()?;
        let (_, chars) = self.write_bytes(None, text.as_bytes(), csform)?;
        Ok(chars)
    }
}

impl<'a> LOB<'a, OCIBLobLocator> {
    /// Creates an empty temporary BLOB.
    pub fn temp(conn: &'a Connection<'a>, cache: Cache) -> Result<Self> {
        Self::create_temp(conn, 0, cache)
    }

    /**
        Reads up to `len` bytes starting at `offset`.

        # Example

        ```no_run
        use oracall::{BLOB, Cache};

        # let oracle = oracall::env()?;
        # let conn = oracle.connect("//localhost/ORCLPDB1", "hr", "hr")?;
        let lob = BLOB::temp(&conn, Cache::No)?;
        lob.append(&[1, 2, 3, 4, 5])?;
        assert_eq!(lob.read(1, 3)?, vec![2, 3, 4]);
        assert_eq!(lob.erase(0, 2)?, 2);
        assert_eq!(lob.read(0, 5)?, vec![0, 0, 3, 4, 5]);
        # Ok::<(),oracall::Error>(())
        ```
    */
    pub fn read(&self, offset: usize, len: usize) -> Result<Vec<u8>> {
        if len == 0 {
            return Ok(Vec::new());
        }
        let (bytes, _) = self.read_bytes(offset, len, 0, 0)?;
        Ok(bytes)
    }

    /// Writes `data` at `offset`. Returns the number of bytes written.
    pub fn write(&self, offset: usize, data: &[u8]) -> Result<usize> {
        if data.is_empty() {
            return Ok(0);
        }
        let (bytes, _) = self.write_bytes(Some(offset), data, 0)?;
        Ok(bytes)
    }

    pub fn append(&self, data: &[u8]) -> Result<usize> {
        if data.is_empty() {
            return Ok(0);
        }
        let (bytes, _) = self.write_bytes(None, data, 0)?;
        Ok(bytes)
    }
}

/// Keeps the count of open files of a connection current.
fn file_opened(conn: &Connection) {
    conn.open_files.fetch_add(1, Ordering::Relaxed);
}

fn file_closed(conn: &Connection) {
    let _ = conn.open_files.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_modes() {
        assert_eq!(LobOpenMode::ReadOnly.oci_mode(), OCI_LOB_READONLY);
        assert_eq!(LobOpenMode::ReadWrite.oci_mode(), OCI_LOB_READWRITE);
    }

    #[test]
    fn lob_kinds() {
        assert_eq!(<OCICLobLocator as InternalLob>::SQL_TYPE, SQLT_CLOB);
        assert_eq!(<OCIBLobLocator as InternalLob>::SQL_TYPE, SQLT_BLOB);
        assert_eq!(<OCIBLobLocator as InternalLob>::TEMP_TYPE, OCI_TEMP_BLOB);
    }
}
