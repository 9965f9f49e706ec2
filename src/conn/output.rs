//! Retrieval of `DBMS_OUTPUT` lines in batches

use super::Connection;
use crate::{Result, env::Env, oci::*};
use libc::c_void;
use std::{collections::VecDeque, ptr};

const GET_LINES : &str = "BEGIN DBMS_OUTPUT.GET_LINES(:s, :i); END;";
const LINES_PER_CALL : u32 = 20;

pub(crate) struct ServerOutput {
    line_size: u32,
    lines: VecDeque<String>,
}

impl ServerOutput {
    pub(crate) fn new(line_size: u32) -> Self {
        Self { line_size, lines: VecDeque::new() }
    }

    pub(crate) fn next_line(&mut self, conn: &Connection) -> Result<Option<String>> {
        if self.lines.is_empty() {
            self.fetch(conn)?;
        }
        Ok( self.lines.pop_front() )
    }

    /// Fetches the next batch of lines with a PL/SQL array bind.
    fn fetch(&mut self, conn: &Connection) -> Result<()> {
        let err = conn.err_ptr();
        let line_size = self.line_size as usize;
        let mut data = vec![0u8; LINES_PER_CALL as usize * line_size];
        let mut lens = vec![0u16; LINES_PER_CALL as usize];
        let mut inds = vec![0i16; LINES_PER_CALL as usize];
        let mut elems = LINES_PER_CALL;
        let mut count = LINES_PER_CALL as i32;

        let mut stmt = Ptr::<OCIStmt>::null();
        catch!{err =>
            OCIStmtPrepare2(
                conn.svc_ptr(), stmt.as_mut_ptr(), err,
                GET_LINES.as_ptr(), GET_LINES.len() as u32,
                ptr::null(), 0, OCI_NTV_SYNTAX, OCI_DEFAULT
            )
        }
        let res = self.bind_and_execute(conn, stmt.get(), &mut data, &mut lens, &mut inds, &mut elems, &mut count);
        unsafe {
            OCIStmtRelease(stmt.get(), err, ptr::null(), 0, OCI_DEFAULT);
        }
        res?;

        let count = (count.max(0) as usize).min(LINES_PER_CALL as usize);
        for i in 0..count {
            let line = if inds[i] == OCI_IND_NULL {
                String::new()
            } else {
                let start = i * line_size;
                let len = (lens[i] as usize).min(line_size);
                String::from_utf8_lossy(&data[start..start + len]).into_owned()
            };
            self.lines.push_back(line);
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn bind_and_execute(
        &self, conn: &Connection, stmt: *mut OCIStmt,
        data: &mut [u8], lens: &mut [u16], inds: &mut [i16], elems: &mut u32, count: &mut i32
    ) -> Result<()> {
        let err = conn.err_ptr();
        let mut bind = ptr::null_mut::<OCIBind>();
        catch!{err =>
            OCIBindByName(
                stmt, &mut bind, err, ":s".as_ptr(), 2,
                data.as_mut_ptr() as *mut c_void, self.line_size as i32, SQLT_CHR,
                inds.as_mut_ptr() as *mut c_void, lens.as_mut_ptr(), ptr::null_mut(),
                LINES_PER_CALL, elems, OCI_DEFAULT
            )
        }
        let mut bind = ptr::null_mut::<OCIBind>();
        catch!{err =>
            OCIBindByName(
                stmt, &mut bind, err, ":i".as_ptr(), 2,
                count as *mut i32 as *mut c_void, std::mem::size_of::<i32>() as i32, SQLT_INT,
                ptr::null_mut(), ptr::null_mut(), ptr::null_mut(),
                0, ptr::null_mut(), OCI_DEFAULT
            )
        }
        catch!{err =>
            OCIStmtExecute(conn.svc_ptr(), stmt, err, 1, 0, ptr::null(), ptr::null_mut(), OCI_DEFAULT)
        }
        Ok(())
    }
}
