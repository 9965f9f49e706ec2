use super::{file_closed, file_opened};
use crate::{Connection, Error, Result, env::Env, oci::*};
use libc::c_void;
use std::{cell::Cell, fmt, ptr};

const MAX_DIR_NAME_LEN  : usize = 128;
const MAX_FILE_NAME_LEN : usize = 1024;

/**
    Locator of a read-only binary file stored outside the database (BFILE).

    # Example

    ```no_run
    use oracall::BFile;

    # let oracle = oracall::env()?;
    # let conn = oracle.connect("//localhost/ORCLPDB1", "hr", "hr")?;
    let file = BFile::new(&conn, "MEDIA_DIR", "hello_world.txt")?;
    assert_eq!(file.directory()?, "MEDIA_DIR");
    if file.exists()? {
        file.open()?;
        let len = file.len()?;
        let data = file.read(0, len)?;
        assert_eq!(data.len(), len);
        file.close()?;
    }
    # Ok::<(),oracall::Error>(())
    ```
*/
pub struct BFile<'a> {
    locator: Descriptor<OCIBFileLocator>,
    conn: &'a Connection<'a>,
    opened: Cell<bool>,
}

impl Drop for BFile<'_> {
    fn drop(&mut self) {
        if self.opened.get() {
            let res = unsafe { OCILobFileClose(self.conn.svc_ptr(), self.conn.err_ptr(), self.locator.get()) };
            if res != OCI_SUCCESS {
                log::debug!("cannot close file: {}", Error::oci(self.conn.err_ptr(), res));
            }
            file_closed(self.conn);
        }
    }
}

impl fmt::Debug for BFile<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.file_name() {
            Ok((dir, name)) => write!(f, "BFile({}/{})", dir, name),
            Err(_) => f.write_str("BFile"),
        }
    }
}

impl<'a> BFile<'a> {
    /// Creates a locator for `name` in the directory object `dir`.
    pub fn new(conn: &'a Connection<'a>, dir: &str, name: &str) -> Result<Self> {
        let locator = Descriptor::<OCIBFileLocator>::new(conn.env_ptr())?;
        let mut file = Self { locator, conn, opened: Cell::new(false) };
        file.set_file_name(dir, name)?;
        Ok(file)
    }

    /// Makes a new locator that points to the same file as `src`.
    pub(crate) fn from_locator(src: *const OCILobLocator, conn: &'a Connection<'a>) -> Result<Self> {
        let mut locator = Descriptor::<OCIBFileLocator>::new(conn.env_ptr())?;
        catch!{conn.err_ptr() =>
            OCILobLocatorAssign(conn.svc_ptr(), conn.err_ptr(), src, locator.as_mut_ptr())
        }
        Ok( Self { locator, conn, opened: Cell::new(false) } )
    }

    pub(crate) fn as_ptr(&self) -> *mut OCILobLocator {
        self.locator.get()
    }

    fn set_file_name(&mut self, dir: &str, name: &str) -> Result<()> {
        let env = self.conn.env_ptr();
        let err = self.conn.err_ptr();
        catch!{err =>
            OCILobFileSetName(
                env, err, self.locator.as_mut_ptr(),
                dir.as_ptr(), dir.len() as u16,
                name.as_ptr(), name.len() as u16
            )
        }
        Ok(())
    }

    /// Points the locator to another file. An open file is closed first.
    pub fn set_name(&mut self, dir: &str, name: &str) -> Result<()> {
        if self.opened.get() {
            self.close()?;
        }
        self.set_file_name(dir, name)
    }

    fn file_name(&self) -> Result<(String, String)> {
        let mut dir  = vec![0u8; MAX_DIR_NAME_LEN];
        let mut name = vec![0u8; MAX_FILE_NAME_LEN];
        let mut dir_len  = dir.len() as u16;
        let mut name_len = name.len() as u16;
        catch!{self.conn.err_ptr() =>
            OCILobFileGetName(
                self.conn.env_ptr(), self.conn.err_ptr(), self.as_ptr(),
                dir.as_mut_ptr(), &mut dir_len,
                name.as_mut_ptr(), &mut name_len
            )
        }
        dir.truncate(dir_len as usize);
        name.truncate(name_len as usize);
        Ok( (String::from_utf8_lossy(&dir).into_owned(), String::from_utf8_lossy(&name).into_owned()) )
    }

    /// Returns the name of the directory object.
    pub fn directory(&self) -> Result<String> {
        self.file_name().map(|(dir, _)| dir)
    }

    pub fn name(&self) -> Result<String> {
        self.file_name().map(|(_, name)| name)
    }

    pub fn exists(&self) -> Result<bool> {
        let mut flag = 0u8;
        catch!{self.conn.err_ptr() =>
            OCILobFileExists(self.conn.svc_ptr(), self.conn.err_ptr(), self.as_ptr(), &mut flag)
        }
        Ok( flag != 0 )
    }

    /// Opens the file for reading.
    pub fn open(&self) -> Result<()> {
        if self.opened.get() {
            return Ok(());
        }
        catch!{self.conn.err_ptr() =>
            OCILobFileOpen(self.conn.svc_ptr(), self.conn.err_ptr(), self.as_ptr(), OCI_FILE_READONLY)
        }
        self.opened.set(true);
        file_opened(self.conn);
        Ok(())
    }

    pub fn is_open(&self) -> Result<bool> {
        let mut flag = 0u8;
        catch!{self.conn.err_ptr() =>
            OCILobFileIsOpen(self.conn.svc_ptr(), self.conn.err_ptr(), self.as_ptr(), &mut flag)
        }
        Ok( flag != 0 )
    }

    pub fn close(&self) -> Result<()> {
        catch!{self.conn.err_ptr() =>
            OCILobFileClose(self.conn.svc_ptr(), self.conn.err_ptr(), self.as_ptr())
        }
        if self.opened.replace(false) {
            file_closed(self.conn);
        }
        Ok(())
    }

    /// Returns the file size in bytes.
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

    /// Reads up to `len` bytes starting at the 0-based `offset`. The file must be open.
    pub fn read(&self, offset: usize, len: usize) -> Result<Vec<u8>> {
        if len == 0 {
            return Ok(Vec::new());
        }
        let mut buf = Vec::with_capacity(len);
        let mut byte_cnt = len as u64;
        let mut char_cnt = 0u64;
        catch!{self.conn.err_ptr() =>
            OCILobRead2(
                self.conn.svc_ptr(), self.conn.err_ptr(), self.as_ptr(),
                &mut byte_cnt, &mut char_cnt, (offset + 1) as u64,
                buf.as_mut_ptr(), len as u64, OCI_ONE_PIECE,
                ptr::null_mut::<c_void>(), ptr::null::<c_void>(),
                0, 0
            )
        }
        unsafe {
            buf.set_len((byte_cnt as usize).min(len));
        }
        Ok(buf)
    }

    /// Returns `true` if both locators point to the same file.
    pub fn is_equal(&self, other: &BFile) -> Result<bool> {
        let mut flag = 0u8;
        catch!{self.conn.err_ptr() =>
            OCILobIsEqual(self.conn.env_ptr(), self.as_ptr(), other.as_ptr(), &mut flag)
        }
        Ok( flag != 0 )
    }
}
