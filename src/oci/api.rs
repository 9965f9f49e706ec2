//! Run-time binding of the OCI client library.
//!
//! The client library is opened when the first environment is created and its
//! entry points are kept in a process-wide table. Functions that only newer clients
//! export are optional: they are resolved when present and their absence is used,
//! together with a few marker symbols, to detect the client version.

use super::*;
use crate::{Result, Error, err::LibError, version::OciVersion};
use libc::{c_void, size_t};
use libloading::Library;
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

#[cfg(target_os = "windows")]
pub(crate) const OCI_LIB_NAME : &str = "oci.dll";
#[cfg(target_os = "macos")]
pub(crate) const OCI_LIB_NAME : &str = "libclntsh.dylib";
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
pub(crate) const OCI_LIB_NAME : &str = "libclntsh.so";

static API: OnceCell<Api> = OnceCell::new();

/// Symbols whose presence marks a client version, newest first.
pub(crate) const VERSION_MARKERS : [(&str, u32, u32); 11] = [
    ("OCISodaOperKeysSet",          18, 3),
    ("OCIServerRelease2",           18, 1),
    ("OCIStmtGetNextResult",        12, 1),
    ("OCILobGetContentType",        11, 2),
    ("OCIArrayDescriptorFree",      11, 1),
    ("OCIClientVersion",            10, 2),
    ("OCILobWrite2",                10, 1),
    ("OCIStmtPrepare2",              9, 2),
    ("OCIDateTimeGetTimeZoneName",   9, 0),
    ("OCIThreadCreate",              8, 1),
    ("OCIEnvInit",                   8, 0),
];

/// Returns the version of the newest marker `is_present` accepts.
pub(crate) fn detect_version(is_present: impl Fn(&str) -> bool) -> Option<OciVersion> {
    VERSION_MARKERS.iter()
        .find(|(name, _, _)| is_present(name))
        .map(|&(_, major, minor)| OciVersion::new(major, minor, 0))
}

/// Builds the full path of the client library.
pub(crate) fn library_path(dir: Option<&Path>) -> PathBuf {
    match dir {
        Some(dir) => dir.join(OCI_LIB_NAME),
        None => PathBuf::from(OCI_LIB_NAME),
    }
}

#[cfg(unix)]
fn open_library(path: &Path) -> std::result::Result<Library, libloading::Error> {
    use libloading::os::unix::{Library as UnixLibrary, RTLD_GLOBAL, RTLD_NOW};
    unsafe { UnixLibrary::open(Some(path), RTLD_NOW | RTLD_GLOBAL) }.map(Library::from)
}

#[cfg(not(unix))]
fn open_library(path: &Path) -> std::result::Result<Library, libloading::Error> {
    unsafe { Library::new(path) }
}

fn has_symbol(lib: &Library, name: &str) -> bool {
    let mut sym = Vec::with_capacity(name.len() + 1);
    sym.extend_from_slice(name.as_bytes());
    sym.push(0);
    unsafe { lib.get::<unsafe extern "C" fn()>(&sym).is_ok() }
}

/// Opens the client library and resolves its entry points. Subsequent calls
/// return the already loaded table regardless of `dir`.
pub(crate) fn load(dir: Option<&Path>) -> Result<&'static Api> {
    API.get_or_try_init(|| {
        let path = library_path(dir);
        log::debug!("loading OCI client library from {}", path.display());
        let lib = open_library(&path).map_err(|err| {
            log::warn!("cannot load {}: {}", path.display(), err);
            Error::lib(LibError::LoadingSharedLib(path.display().to_string()))
        })?;
        let api = unsafe { Api::resolve(lib)? };
        log::info!("loaded OCI client library {}, version {}", path.display(), api.version);
        Ok(api)
    })
}

pub(crate) fn is_loaded() -> bool {
    API.get().is_some()
}

/// Version of the loaded client library.
pub(crate) fn runtime_version() -> OciVersion {
    API.get().map(|api| api.version).unwrap_or_default()
}

fn api() -> &'static Api {
    API.get().expect("OCI client library is loaded")
}

macro_rules! oci_api {
    (
        required {
            $( fn $rname:ident ( $( $rarg:ident : $rty:ty ),* $(,)? ) -> $rret:ty ; )*
        }
        optional {
            $( fn $oname:ident ( $( $oarg:ident : $oty:ty ),* $(,)? ) -> $oret:ty = $odef:expr ; )*
        }
    ) => {
        #[allow(non_snake_case)]
        pub(crate) struct Api {
            _lib: Library,
            pub(crate) version: OciVersion,
            $( $rname: unsafe extern "C" fn( $( $rty ),* ) -> $rret, )*
            $( $oname: Option<unsafe extern "C" fn( $( $oty ),* ) -> $oret>, )*
        }

        impl Api {
            #[allow(non_snake_case)]
            unsafe fn resolve(lib: Library) -> Result<Self> {
                $(
                    let $rname = *lib
                        .get::<unsafe extern "C" fn( $( $rty ),* ) -> $rret>(concat!(stringify!($rname), "\0").as_bytes())
                        .map_err(|_| Error::lib(LibError::LoadingSymbols(stringify!($rname))))?;
                )*
                $(
                    let $oname = lib
                        .get::<unsafe extern "C" fn( $( $oty ),* ) -> $oret>(concat!(stringify!($oname), "\0").as_bytes())
                        .ok()
                        .map(|sym| *sym);
                )*
                let version = detect_version(|name| has_symbol(&lib, name)).unwrap_or_default();
                let mut api = Self { _lib: lib, version, $( $rname, )* $( $oname, )* };
                if let Some(client_version) = api.OCIClientVersion {
                    let (mut major, mut minor, mut update, mut patch, mut port) = (0, 0, 0, 0, 0);
                    client_version(&mut major, &mut minor, &mut update, &mut patch, &mut port);
                    if major > 0 {
                        api.version = OciVersion::new(major as u32, minor as u32, update as u32);
                    }
                }
                Ok(api)
            }

            #[allow(non_snake_case)]
            pub(crate) fn has(&self, name: &str) -> bool {
                $( if name == stringify!($oname) { return self.$oname.is_some(); } )*
                true
            }
        }

        $(
            #[allow(non_snake_case)]
            #[inline]
            pub(crate) unsafe fn $rname( $( $rarg : $rty ),* ) -> $rret {
                (api().$rname)( $( $rarg ),* )
            }
        )*

        $(
            #[allow(non_snake_case)]
            #[inline]
            pub(crate) unsafe fn $oname( $( $oarg : $oty ),* ) -> $oret {
                match api().$oname {
                    Some(f) => f( $( $oarg ),* ),
                    None => $odef,
                }
            }
        )*
    };
}

/// Checks whether an optional entry point is exported by the loaded client.
pub(crate) fn has_function(name: &str) -> bool {
    API.get().map(|api| api.has(name)).unwrap_or(false)
}

oci_api! {
    required {
        // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/connect-authorize-and-initialize-functions.html#GUID-0B6911A9-4B46-476C-BC5E-B87581666CD9
        fn OCIEnvNlsCreate(envhpp: *mut *mut OCIEnv, mode: u32, ctxp: *const c_void, malocfp: *const c_void, ralocfp: *const c_void, mfreefp: *const c_void, xtramemsz: size_t, usrmempp: *const c_void, charset: u16, ncharset: u16) -> i32;
        fn OCIHandleAlloc(parenth: *mut OCIEnv, hndlpp: *mut *mut c_void, hndl_type: u32, xtramem_sz: size_t, usrmempp: *const c_void) -> i32;
        fn OCIHandleFree(hndlp: *mut c_void, hnd_type: u32) -> i32;
        fn OCIDescriptorAlloc(parenth: *mut OCIEnv, descpp: *mut *mut c_void, desc_type: u32, xtramem_sz: size_t, usrmempp: *const c_void) -> i32;
        fn OCIDescriptorFree(descp: *mut c_void, desc_type: u32) -> i32;
        fn OCIAttrGet(trgthndlp: *const c_void, trghndltyp: u32, attributep: *mut c_void, sizep: *mut u32, attrtype: u32, errhp: *mut OCIError) -> i32;
        fn OCIAttrSet(trgthndlp: *mut c_void, trghndltyp: u32, attributep: *const c_void, size: u32, attrtype: u32, errhp: *mut OCIError) -> i32;
        fn OCIParamGet(hndlp: *const c_void, htype: u32, errhp: *mut OCIError, descr: *mut *mut c_void, pos: u32) -> i32;
        fn OCIErrorGet(hndlp: *const c_void, recordno: u32, sqlstate: *const c_void, errcodep: *mut i32, bufp: *mut u8, bufsiz: u32, hnd_type: u32) -> i32;

        // Connections and sessions
        fn OCIServerAttach(srvhp: *mut OCIServer, errhp: *mut OCIError, dblink: *const u8, dblink_len: i32, mode: u32) -> i32;
        fn OCIServerDetach(srvhp: *mut OCIServer, errhp: *mut OCIError, mode: u32) -> i32;
        fn OCIServerVersion(hndlp: *mut c_void, errhp: *mut OCIError, bufp: *mut u8, bufsz: u32, hndltype: u8) -> i32;
        fn OCISessionBegin(svchp: *mut OCISvcCtx, errhp: *mut OCIError, userhp: *mut OCISession, credt: u32, mode: u32) -> i32;
        fn OCISessionEnd(svchp: *mut OCISvcCtx, errhp: *mut OCIError, userhp: *mut OCISession, mode: u32) -> i32;
        fn OCIPasswordChange(svchp: *mut OCISvcCtx, errhp: *mut OCIError, user_name: *const u8, usernm_len: u32, opasswd: *const u8, opasswd_len: u32, npasswd: *const u8, npasswd_len: u32, mode: u32) -> i32;
        fn OCIBreak(hndlp: *mut c_void, errhp: *mut OCIError) -> i32;
        fn OCIConnectionPoolCreate(envhp: *mut OCIEnv, errhp: *mut OCIError, poolhp: *mut OCICPool, pool_name: *mut *const u8, pool_name_len: *mut i32, dblink: *const u8, dblink_len: i32, conn_min: u32, conn_max: u32, conn_incr: u32, pool_user: *const u8, pool_user_len: i32, pool_pass: *const u8, pool_pass_len: i32, mode: u32) -> i32;
        fn OCIConnectionPoolDestroy(poolhp: *mut OCICPool, errhp: *mut OCIError, mode: u32) -> i32;
        fn OCISessionPoolCreate(envhp: *mut OCIEnv, errhp: *mut OCIError, spoolhp: *mut OCISPool, pool_name: *mut *const u8, pool_name_len: *mut u32, conn_str: *const u8, conn_str_len: u32, sess_min: u32, sess_max: u32, sess_incr: u32, userid: *const u8, userid_len: u32, password: *const u8, password_len: u32, mode: u32) -> i32;
        fn OCISessionPoolDestroy(spoolhp: *mut OCISPool, errhp: *mut OCIError, mode: u32) -> i32;
        fn OCISessionGet(envhp: *mut OCIEnv, errhp: *mut OCIError, svchp: *mut *mut OCISvcCtx, authhp: *mut OCIAuthInfo, pool_name: *const u8, pool_name_len: u32, tag_info: *const u8, tag_info_len: u32, ret_tag_info: *mut *const u8, ret_tag_info_len: *mut u32, found: *mut u8, mode: u32) -> i32;
        fn OCISessionRelease(svchp: *mut OCISvcCtx, errhp: *mut OCIError, tag: *const u8, tag_len: u32, mode: u32) -> i32;

        // Transactions
        fn OCITransStart(svchp: *mut OCISvcCtx, errhp: *mut OCIError, timeout: u32, flags: u32) -> i32;
        fn OCITransDetach(svchp: *mut OCISvcCtx, errhp: *mut OCIError, flags: u32) -> i32;
        fn OCITransPrepare(svchp: *mut OCISvcCtx, errhp: *mut OCIError, flags: u32) -> i32;
        fn OCITransForget(svchp: *mut OCISvcCtx, errhp: *mut OCIError, flags: u32) -> i32;
        fn OCITransCommit(svchp: *mut OCISvcCtx, errhp: *mut OCIError, flags: u32) -> i32;
        fn OCITransRollback(svchp: *mut OCISvcCtx, errhp: *mut OCIError, flags: u32) -> i32;

        // Statements
        fn OCIStmtPrepare2(svchp: *mut OCISvcCtx, stmthp: *mut *mut OCIStmt, errhp: *mut OCIError, stmttext: *const u8, stmt_len: u32, key: *const u8, keylen: u32, language: u32, mode: u32) -> i32;
        fn OCIStmtRelease(stmtp: *mut OCIStmt, errhp: *mut OCIError, key: *const u8, keylen: u32, mode: u32) -> i32;
        fn OCIStmtExecute(svchp: *mut OCISvcCtx, stmtp: *mut OCIStmt, errhp: *mut OCIError, iters: u32, rowoff: u32, snap_in: *const c_void, snap_out: *mut c_void, mode: u32) -> i32;
        fn OCIStmtFetch2(stmtp: *mut OCIStmt, errhp: *mut OCIError, nrows: u32, orient: u16, offset: i32, mode: u32) -> i32;
        fn OCIStmtGetBindInfo(stmtp: *mut OCIStmt, errhp: *mut OCIError, size: u32, startloc: u32, found: *mut i32, bvnp: *mut *mut u8, bvnl: *mut u8, invp: *mut *mut u8, invl: *mut u8, dupl: *mut u8, hndl: *mut *mut OCIBind) -> i32;
        fn OCIBindByPos(stmtp: *mut OCIStmt, bindpp: *mut *mut OCIBind, errhp: *mut OCIError, position: u32, valuep: *mut c_void, value_sz: i32, dty: u16, indp: *mut c_void, alenp: *mut u16, rcodep: *mut u16, maxarr_len: u32, curelep: *mut u32, mode: u32) -> i32;
        fn OCIBindByName(stmtp: *mut OCIStmt, bindpp: *mut *mut OCIBind, errhp: *mut OCIError, placeholder: *const u8, placeh_len: i32, valuep: *mut c_void, value_sz: i32, dty: u16, indp: *mut c_void, alenp: *mut u16, rcodep: *mut u16, maxarr_len: u32, curelep: *mut u32, mode: u32) -> i32;
        fn OCIBindDynamic(bindp: *mut OCIBind, errhp: *mut OCIError, ictxp: *mut c_void, icbfp: OCICallbackInBind, octxp: *mut c_void, ocbfp: OCICallbackOutBind) -> i32;
        fn OCIBindObject(bindp: *mut OCIBind, errhp: *mut OCIError, otype: *const OCIType, pgvpp: *mut *mut c_void, pvszsp: *mut u32, indpp: *mut *mut c_void, indszp: *mut u32) -> i32;
        fn OCIDefineByPos(stmtp: *mut OCIStmt, defnpp: *mut *mut OCIDefine, errhp: *mut OCIError, position: u32, valuep: *mut c_void, value_sz: i32, dty: u16, indp: *mut c_void, rlenp: *mut u16, rcodep: *mut u16, mode: u32) -> i32;
        fn OCIDefineObject(defnp: *mut OCIDefine, errhp: *mut OCIError, otype: *const OCIType, pgvpp: *mut *mut c_void, pvszsp: *mut u32, indpp: *mut *mut c_void, indszp: *mut u32) -> i32;
        fn OCIRowidToChar(desc: *mut OCIRowid, text: *mut u8, size: *mut u16, err: *mut OCIError) -> i32;
        fn OCIDescribeAny(svchp: *mut OCISvcCtx, errhp: *mut OCIError, objptr: *const c_void, objnm_len: u32, objptr_typ: u8, info_level: u8, objtyp: u8, dschp: *mut OCIDescribe) -> i32;

        // LOBs
        fn OCILobAppend(svchp: *mut OCISvcCtx, errhp: *mut OCIError, dst: *mut OCILobLocator, src: *const OCILobLocator) -> i32;
        fn OCILobCharSetForm(envhp: *mut OCIEnv, errhp: *mut OCIError, src: *const OCILobLocator, csform: *mut u8) -> i32;
        fn OCILobClose(svchp: *mut OCISvcCtx, errhp: *mut OCIError, loc: *mut OCILobLocator) -> i32;
        fn OCILobCopy2(svchp: *mut OCISvcCtx, errhp: *mut OCIError, dst: *mut OCILobLocator, src: *mut OCILobLocator, amount: u64, dst_off: u64, src_off: u64) -> i32;
        fn OCILobCreateTemporary(svchp: *mut OCISvcCtx, errhp: *mut OCIError, loc: *mut OCILobLocator, csid: u16, csfrm: u8, lob_type: u8, cache: u8, duration: u16) -> i32;
        fn OCILobDisableBuffering(svchp: *mut OCISvcCtx, errhp: *mut OCIError, loc: *mut OCILobLocator) -> i32;
        fn OCILobEnableBuffering(svchp: *mut OCISvcCtx, errhp: *mut OCIError, loc: *mut OCILobLocator) -> i32;
        fn OCILobErase2(svchp: *mut OCISvcCtx, errhp: *mut OCIError, loc: *mut OCILobLocator, amount: *mut u64, offset: u64) -> i32;
        fn OCILobFileClose(svchp: *mut OCISvcCtx, errhp: *mut OCIError, filep: *mut OCILobLocator) -> i32;
        fn OCILobFileCloseAll(svchp: *mut OCISvcCtx, errhp: *mut OCIError) -> i32;
        fn OCILobFileExists(svchp: *mut OCISvcCtx, errhp: *mut OCIError, filep: *mut OCILobLocator, flag: *mut u8) -> i32;
        fn OCILobFileGetName(envhp: *mut OCIEnv, errhp: *mut OCIError, loc: *const OCILobLocator, dir: *mut u8, dir_len: *mut u16, filename: *mut u8, name_len: *mut u16) -> i32;
        fn OCILobFileIsOpen(svchp: *mut OCISvcCtx, errhp: *mut OCIError, filep: *mut OCILobLocator, flag: *mut u8) -> i32;
        fn OCILobFileOpen(svchp: *mut OCISvcCtx, errhp: *mut OCIError, filep: *mut OCILobLocator, mode: u8) -> i32;
        fn OCILobFileSetName(envhp: *mut OCIEnv, errhp: *mut OCIError, filepp: *mut *mut OCILobLocator, dir: *const u8, dir_len: u16, filename: *const u8, name_len: u16) -> i32;
        fn OCILobFlushBuffer(svchp: *mut OCISvcCtx, errhp: *mut OCIError, loc: *mut OCILobLocator, flag: u32) -> i32;
        fn OCILobFreeTemporary(svchp: *mut OCISvcCtx, errhp: *mut OCIError, loc: *mut OCILobLocator) -> i32;
        fn OCILobGetChunkSize(svchp: *mut OCISvcCtx, errhp: *mut OCIError, loc: *mut OCILobLocator, size: *mut u32) -> i32;
        fn OCILobGetLength2(svchp: *mut OCISvcCtx, errhp: *mut OCIError, loc: *mut OCILobLocator, len: *mut u64) -> i32;
        fn OCILobGetStorageLimit(svchp: *mut OCISvcCtx, errhp: *mut OCIError, loc: *mut OCILobLocator, limit: *mut u64) -> i32;
        fn OCILobIsEqual(envhp: *mut OCIEnv, loc1: *const OCILobLocator, loc2: *const OCILobLocator, flag: *mut u8) -> i32;
        fn OCILobIsOpen(svchp: *mut OCISvcCtx, errhp: *mut OCIError, loc: *mut OCILobLocator, flag: *mut u8) -> i32;
        fn OCILobIsTemporary(envhp: *mut OCIEnv, errhp: *mut OCIError, loc: *mut OCILobLocator, flag: *mut u8) -> i32;
        fn OCILobLoadFromFile2(svchp: *mut OCISvcCtx, errhp: *mut OCIError, dst: *mut OCILobLocator, src: *mut OCILobLocator, amount: u64, dst_off: u64, src_off: u64) -> i32;
        fn OCILobLocatorAssign(svchp: *mut OCISvcCtx, errhp: *mut OCIError, src: *const OCILobLocator, dst: *mut *mut OCILobLocator) -> i32;
        fn OCILobOpen(svchp: *mut OCISvcCtx, errhp: *mut OCIError, loc: *mut OCILobLocator, mode: u8) -> i32;
        fn OCILobRead2(svchp: *mut OCISvcCtx, errhp: *mut OCIError, loc: *mut OCILobLocator, byte_cnt: *mut u64, char_cnt: *mut u64, offset: u64, buf: *mut u8, buf_len: u64, piece: u8, ctx: *mut c_void, read_cb: *const c_void, csid: u16, csfrm: u8) -> i32;
        fn OCILobTrim2(svchp: *mut OCISvcCtx, errhp: *mut OCIError, loc: *mut OCILobLocator, len: u64) -> i32;
        fn OCILobWrite2(svchp: *mut OCISvcCtx, errhp: *mut OCIError, loc: *mut OCILobLocator, byte_cnt: *mut u64, char_cnt: *mut u64, offset: u64, buf: *const u8, buf_len: u64, piece: u8, ctx: *mut c_void, write_cb: *const c_void, csid: u16, csfrm: u8) -> i32;
        fn OCILobWriteAppend2(svchp: *mut OCISvcCtx, errhp: *mut OCIError, loc: *mut OCILobLocator, byte_cnt: *mut u64, char_cnt: *mut u64, buf: *const u8, buf_len: u64, piece: u8, ctx: *mut c_void, write_cb: *const c_void, csid: u16, csfrm: u8) -> i32;

        // Dates
        fn OCIDateAddDays(err: *mut OCIError, date: *const OCIDate, num_days: i32, result: *mut OCIDate) -> i32;
        fn OCIDateAddMonths(err: *mut OCIError, date: *const OCIDate, num_months: i32, result: *mut OCIDate) -> i32;
        fn OCIDateAssign(err: *mut OCIError, date: *const OCIDate, result: *mut OCIDate) -> i32;
        fn OCIDateCheck(err: *mut OCIError, date: *const OCIDate, valid: *mut u32) -> i32;
        fn OCIDateCompare(err: *mut OCIError, date1: *const OCIDate, date2: *const OCIDate, result: *mut i32) -> i32;
        fn OCIDateDaysBetween(err: *mut OCIError, date1: *const OCIDate, date2: *const OCIDate, result: *mut i32) -> i32;
        fn OCIDateFromText(err: *mut OCIError, txt: *const u8, txt_len: u32, fmt: *const u8, fmt_len: u8, lang: *const u8, lang_len: u32, result: *mut OCIDate) -> i32;
        fn OCIDateLastDay(err: *mut OCIError, date: *const OCIDate, result: *mut OCIDate) -> i32;
        fn OCIDateNextDay(err: *mut OCIError, date: *const OCIDate, day: *const u8, day_len: u32, result: *mut OCIDate) -> i32;
        fn OCIDateToText(err: *mut OCIError, date: *const OCIDate, fmt: *const u8, fmt_len: u8, lang: *const u8, lang_len: u32, buf_size: *mut u32, buf: *mut u8) -> i32;
        fn OCIDateSysDate(err: *mut OCIError, result: *mut OCIDate) -> i32;
        fn OCIDateZoneToZone(err: *mut OCIError, date1: *const OCIDate, zon1: *const u8, zon1_len: u32, zon2: *const u8, zon2_len: u32, date2: *mut OCIDate) -> i32;

        // Intervals
        fn OCIIntervalAdd(hndl: *mut c_void, err: *mut OCIError, addend1: *const OCIInterval, addend2: *const OCIInterval, result: *mut OCIInterval) -> i32;
        fn OCIIntervalAssign(hndl: *mut c_void, err: *mut OCIError, inpinter: *const OCIInterval, outinter: *mut OCIInterval) -> i32;
        fn OCIIntervalCheck(hndl: *mut c_void, err: *mut OCIError, interval: *const OCIInterval, valid: *mut u32) -> i32;
        fn OCIIntervalCompare(hndl: *mut c_void, err: *mut OCIError, inter1: *const OCIInterval, inter2: *const OCIInterval, result: *mut i32) -> i32;
        fn OCIIntervalFromText(hndl: *mut c_void, err: *mut OCIError, inpstring: *const u8, str_len: size_t, result: *mut OCIInterval) -> i32;
        fn OCIIntervalFromTZ(hndl: *mut c_void, err: *mut OCIError, inpstring: *const u8, str_len: size_t, result: *mut OCIInterval) -> i32;
        fn OCIIntervalGetDaySecond(hndl: *mut c_void, err: *mut OCIError, dy: *mut i32, hr: *mut i32, mm: *mut i32, ss: *mut i32, fsec: *mut i32, interval: *const OCIInterval) -> i32;
        fn OCIIntervalGetYearMonth(hndl: *mut c_void, err: *mut OCIError, yr: *mut i32, mnth: *mut i32, interval: *const OCIInterval) -> i32;
        fn OCIIntervalSetDaySecond(hndl: *mut c_void, err: *mut OCIError, dy: i32, hr: i32, mm: i32, ss: i32, fsec: i32, result: *mut OCIInterval) -> i32;
        fn OCIIntervalSetYearMonth(hndl: *mut c_void, err: *mut OCIError, yr: i32, mnth: i32, result: *mut OCIInterval) -> i32;
        fn OCIIntervalSubtract(hndl: *mut c_void, err: *mut OCIError, minuend: *const OCIInterval, subtrahend: *const OCIInterval, result: *mut OCIInterval) -> i32;
        fn OCIIntervalToText(hndl: *mut c_void, err: *mut OCIError, interval: *const OCIInterval, lfprec: u8, fsprec: u8, buffer: *mut u8, buflen: size_t, resultlen: *mut size_t) -> i32;

        // Timestamps
        fn OCIDateTimeAssign(hndl: *mut c_void, err: *mut OCIError, from: *const OCIDateTime, to: *mut OCIDateTime) -> i32;
        fn OCIDateTimeCheck(hndl: *mut c_void, err: *mut OCIError, date: *const OCIDateTime, valid: *mut u32) -> i32;
        fn OCIDateTimeCompare(hndl: *mut c_void, err: *mut OCIError, date1: *const OCIDateTime, date2: *const OCIDateTime, result: *mut i32) -> i32;
        fn OCIDateTimeConstruct(hndl: *mut c_void, err: *mut OCIError, datetime: *mut OCIDateTime, year: i16, month: u8, day: u8, hour: u8, min: u8, sec: u8, fsec: u32, timezone: *const u8, tz_len: size_t) -> i32;
        fn OCIDateTimeConvert(hndl: *mut c_void, err: *mut OCIError, indate: *const OCIDateTime, outdate: *mut OCIDateTime) -> i32;
        fn OCIDateTimeFromText(hndl: *mut c_void, err: *mut OCIError, date_str: *const u8, dstr_length: size_t, fmt: *const u8, fmt_length: u8, lang_name: *const u8, lang_length: size_t, datetime: *mut OCIDateTime) -> i32;
        fn OCIDateTimeGetDate(hndl: *mut c_void, err: *mut OCIError, datetime: *const OCIDateTime, year: *mut i16, month: *mut u8, day: *mut u8) -> i32;
        fn OCIDateTimeGetTime(hndl: *mut c_void, err: *mut OCIError, datetime: *const OCIDateTime, hour: *mut u8, min: *mut u8, sec: *mut u8, fsec: *mut u32) -> i32;
        fn OCIDateTimeGetTimeZoneName(hndl: *mut c_void, err: *mut OCIError, datetime: *const OCIDateTime, buf: *mut u8, buflen: *mut u32) -> i32;
        fn OCIDateTimeGetTimeZoneOffset(hndl: *mut c_void, err: *mut OCIError, datetime: *const OCIDateTime, hour: *mut i8, min: *mut i8) -> i32;
        fn OCIDateTimeIntervalAdd(hndl: *mut c_void, err: *mut OCIError, datetime: *const OCIDateTime, inter: *const OCIInterval, outdatetime: *mut OCIDateTime) -> i32;
        fn OCIDateTimeIntervalSub(hndl: *mut c_void, err: *mut OCIError, datetime: *const OCIDateTime, inter: *const OCIInterval, outdatetime: *mut OCIDateTime) -> i32;
        fn OCIDateTimeSubtract(hndl: *mut c_void, err: *mut OCIError, indate1: *const OCIDateTime, indate2: *const OCIDateTime, inter: *mut OCIInterval) -> i32;
        fn OCIDateTimeSysTimeStamp(hndl: *mut c_void, err: *mut OCIError, sys_date: *mut OCIDateTime) -> i32;
        fn OCIDateTimeToText(hndl: *mut c_void, err: *mut OCIError, date: *const OCIDateTime, fmt: *const u8, fmt_length: u8, fsprec: u8, lang_name: *const u8, lang_length: size_t, buf_size: *mut u32, buf: *mut u8) -> i32;

        // Numbers
        fn OCINumberAssign(err: *mut OCIError, number: *const OCINumber, result: *mut OCINumber) -> i32;
        fn OCINumberCmp(err: *mut OCIError, number1: *const OCINumber, number2: *const OCINumber, result: *mut i32) -> i32;
        fn OCINumberFromInt(err: *mut OCIError, inum: *const c_void, inum_length: u32, inum_s_flag: u32, number: *mut OCINumber) -> i32;
        fn OCINumberFromReal(err: *mut OCIError, rnum: *const c_void, rnum_length: u32, number: *mut OCINumber) -> i32;
        fn OCINumberFromText(err: *mut OCIError, txt: *const u8, txt_len: u32, fmt: *const u8, fmt_len: u32, nls_par: *const u8, nls_len: u32, number: *mut OCINumber) -> i32;
        fn OCINumberToInt(err: *mut OCIError, number: *const OCINumber, rsl_length: u32, rsl_flag: u32, rsl: *mut c_void) -> i32;
        fn OCINumberToReal(err: *mut OCIError, number: *const OCINumber, res_len: u32, result: *mut c_void) -> i32;
        fn OCINumberToText(err: *mut OCIError, number: *const OCINumber, fmt: *const u8, fmt_len: u32, nls_par: *const u8, nls_len: u32, buf_size: *mut u32, buf: *mut u8) -> i32;

        // Object strings and raws
        fn OCIStringAssignText(env: *mut OCIEnv, err: *mut OCIError, rhs: *const u8, rhs_len: u32, lhs: *mut *mut OCIString) -> i32;
        fn OCIStringPtr(env: *mut OCIEnv, txt: *const OCIString) -> *mut u8;
        fn OCIStringSize(env: *mut OCIEnv, txt: *const OCIString) -> u32;
        fn OCIRawAssignBytes(env: *mut OCIEnv, err: *mut OCIError, rhs: *const u8, rhs_len: u32, lhs: *mut *mut OCIRaw) -> i32;
        fn OCIRawPtr(env: *mut OCIEnv, raw: *const OCIRaw) -> *mut u8;
        fn OCIRawSize(env: *mut OCIEnv, raw: *const OCIRaw) -> u32;
        fn OCIStringResize(env: *mut OCIEnv, err: *mut OCIError, new_size: u32, str: *mut *mut OCIString) -> i32;
        fn OCIRawResize(env: *mut OCIEnv, err: *mut OCIError, new_size: u32, raw: *mut *mut OCIRaw) -> i32;

        // Objects
        fn OCITypeByName(env: *mut OCIEnv, err: *mut OCIError, svc: *const OCISvcCtx, schema_name: *const u8, s_length: u32, type_name: *const u8, t_length: u32, version_name: *const u8, v_length: u32, pin_duration: u16, get_option: u32, tdo: *mut *mut OCIType) -> i32;
        fn OCITypeByRef(env: *mut OCIEnv, err: *mut OCIError, type_ref: *const OCIRef, pin_duration: u16, get_option: u32, tdo: *mut *mut OCIType) -> i32;
        fn OCIObjectNew(env: *mut OCIEnv, err: *mut OCIError, svc: *const OCISvcCtx, typecode: u16, tdo: *mut OCIType, table: *mut c_void, duration: u16, value: u8, instance: *mut *mut c_void) -> i32;
        fn OCIObjectFree(env: *mut OCIEnv, err: *mut OCIError, instance: *mut c_void, flags: u16) -> i32;
        fn OCIObjectGetAttr(env: *mut OCIEnv, err: *mut OCIError, instance: *mut c_void, null_struct: *mut c_void, tdo: *mut OCIType, names: *const *const u8, lengths: *const u32, name_count: u32, indexes: *const u32, index_count: u32, attr_null_status: *mut OCIInd, attr_null_struct: *mut *mut c_void, attr_value: *mut *mut c_void, attr_tdo: *mut *mut OCIType) -> i32;
        fn OCIObjectSetAttr(env: *mut OCIEnv, err: *mut OCIError, instance: *mut c_void, null_struct: *mut c_void, tdo: *mut OCIType, names: *const *const u8, lengths: *const u32, name_count: u32, indexes: *const u32, index_count: u32, null_status: OCIInd, attr_null_struct: *const c_void, attr_value: *const c_void) -> i32;
        fn OCIObjectGetInd(env: *mut OCIEnv, err: *mut OCIError, instance: *mut c_void, null_struct: *mut *mut c_void) -> i32;
        fn OCIObjectCopy(env: *mut OCIEnv, err: *mut OCIError, svc: *const OCISvcCtx, source: *mut c_void, null_source: *mut c_void, target: *mut c_void, null_target: *mut c_void, tdo: *mut OCIType, duration: u16, option: u8) -> i32;
        fn OCICacheFree(env: *mut OCIEnv, err: *mut OCIError, svc: *const OCISvcCtx) -> i32;
        fn OCIObjectPin(env: *mut OCIEnv, err: *mut OCIError, object_ref: *mut OCIRef, corhdl: *mut c_void, pin_option: u32, pin_duration: u16, lock_option: u32, object: *mut *mut c_void) -> i32;
        fn OCIObjectUnpin(env: *mut OCIEnv, err: *mut OCIError, object: *mut c_void) -> i32;

        // References
        fn OCIRefAssign(env: *mut OCIEnv, err: *mut OCIError, source: *const OCIRef, target: *mut *mut OCIRef) -> i32;
        fn OCIRefIsNull(env: *mut OCIEnv, object_ref: *const OCIRef) -> i32;
        fn OCIRefClear(env: *mut OCIEnv, object_ref: *mut OCIRef) -> ();
        fn OCIRefHexSize(env: *mut OCIEnv, object_ref: *const OCIRef) -> u32;
        fn OCIRefToHex(env: *mut OCIEnv, err: *mut OCIError, object_ref: *const OCIRef, hex: *mut u8, hex_length: *mut u32) -> i32;

        // Collections
        fn OCICollSize(env: *mut OCIEnv, err: *mut OCIError, coll: *const OCIColl, size: *mut i32) -> i32;
        fn OCICollMax(env: *mut OCIEnv, coll: *const OCIColl) -> i32;
        fn OCICollGetItem(env: *mut OCIEnv, err: *mut OCIError, coll: *const OCIColl, index: i32, exists: *mut u8, elem: *mut *mut c_void, elemind: *mut *mut c_void) -> i32;
        fn OCICollAssignElem(env: *mut OCIEnv, err: *mut OCIError, index: i32, elem: *const c_void, elemind: *const c_void, coll: *mut OCIColl) -> i32;
        fn OCICollAppend(env: *mut OCIEnv, err: *mut OCIError, elem: *const c_void, elemind: *const c_void, coll: *mut OCIColl) -> i32;
        fn OCICollTrim(env: *mut OCIEnv, err: *mut OCIError, trim_num: i32, coll: *mut OCIColl) -> i32;
        fn OCICollAssign(env: *mut OCIEnv, err: *mut OCIError, rhs: *const OCIColl, lhs: *mut OCIColl) -> i32;
        fn OCITableSize(env: *mut OCIEnv, err: *mut OCIError, tbl: *const OCIColl, size: *mut i32) -> i32;
        fn OCITableDelete(env: *mut OCIEnv, err: *mut OCIError, index: i32, tbl: *mut OCIColl) -> i32;
        fn OCITableExists(env: *mut OCIEnv, err: *mut OCIError, tbl: *const OCIColl, index: i32, exists: *mut u8) -> i32;
        fn OCIIterCreate(env: *mut OCIEnv, err: *mut OCIError, coll: *const OCIColl, itr: *mut *mut OCIIter) -> i32;
        fn OCIIterDelete(env: *mut OCIEnv, err: *mut OCIError, itr: *mut *mut OCIIter) -> i32;
        fn OCIIterInit(env: *mut OCIEnv, err: *mut OCIError, coll: *const OCIColl, itr: *mut OCIIter) -> i32;
        fn OCIIterNext(env: *mut OCIEnv, err: *mut OCIError, itr: *mut OCIIter, elem: *mut *mut c_void, elemind: *mut *mut c_void, eoc: *mut i32) -> i32;
        fn OCIIterPrev(env: *mut OCIEnv, err: *mut OCIError, itr: *mut OCIIter, elem: *mut *mut c_void, elemind: *mut *mut c_void, boc: *mut i32) -> i32;

        // Advanced queuing
        fn OCIAQEnq(svchp: *mut OCISvcCtx, errhp: *mut OCIError, queue_name: *const u8, enqopt: *mut OCIAQEnqOptions, msgprop: *mut OCIAQMsgProperties, payload_tdo: *mut OCIType, payload: *mut *mut c_void, payload_ind: *mut *mut c_void, msgid: *mut *mut OCIRaw, flags: u32) -> i32;
        fn OCIAQDeq(svchp: *mut OCISvcCtx, errhp: *mut OCIError, queue_name: *const u8, deqopt: *mut OCIAQDeqOptions, msgprop: *mut OCIAQMsgProperties, payload_tdo: *mut OCIType, payload: *mut *mut c_void, payload_ind: *mut *mut c_void, msgid: *mut *mut OCIRaw, flags: u32) -> i32;
        fn OCIAQListen(svchp: *mut OCISvcCtx, errhp: *mut OCIError, agent_list: *mut *mut OCIAQAgent, num_agents: u32, wait: i32, agent: *mut *mut OCIAQAgent, flags: u32) -> i32;

        // Direct path
        fn OCIDirPathAbort(dpctx: *mut OCIDirPathCtx, errhp: *mut OCIError) -> i32;
        fn OCIDirPathDataSave(dpctx: *mut OCIDirPathCtx, errhp: *mut OCIError, action: u32) -> i32;
        fn OCIDirPathFinish(dpctx: *mut OCIDirPathCtx, errhp: *mut OCIError) -> i32;
        fn OCIDirPathPrepare(dpctx: *mut OCIDirPathCtx, svchp: *mut OCISvcCtx, errhp: *mut OCIError) -> i32;
        fn OCIDirPathLoadStream(dpctx: *mut OCIDirPathCtx, dpstr: *mut OCIDirPathStream, errhp: *mut OCIError) -> i32;
        fn OCIDirPathColArrayEntrySet(dpca: *mut OCIDirPathColArray, errhp: *mut OCIError, rownum: u32, col_idx: u16, cvalp: *mut u8, clen: u32, cflg: u8) -> i32;
        fn OCIDirPathColArrayReset(dpca: *mut OCIDirPathColArray, errhp: *mut OCIError) -> i32;
        fn OCIDirPathColArrayToStream(dpca: *mut OCIDirPathColArray, dpctx: *mut OCIDirPathCtx, dpstr: *mut OCIDirPathStream, errhp: *mut OCIError, rowcnt: u32, rowoff: u32) -> i32;
        fn OCIDirPathStreamReset(dpstr: *mut OCIDirPathStream, errhp: *mut OCIError) -> i32;
        fn OCIDirPathFlushRow(dpctx: *mut OCIDirPathCtx, errhp: *mut OCIError) -> i32;
    }
    optional {
        fn OCIClientVersion(major: *mut i32, minor: *mut i32, update: *mut i32, patch: *mut i32, port_update: *mut i32) -> () = ();
        fn OCIPing(svchp: *mut OCISvcCtx, errhp: *mut OCIError, mode: u32) -> i32 = OCI_INVALID_HANDLE;
        fn OCIServerRelease2(hndlp: *mut c_void, errhp: *mut OCIError, bufp: *mut u8, bufsz: u32, hndltype: u8, version: *mut u32, mode: u32) -> i32 = OCI_INVALID_HANDLE;
        fn OCIStmtGetNextResult(stmtp: *mut OCIStmt, errhp: *mut OCIError, result: *mut *mut c_void, rtype: *mut u32, mode: u32) -> i32 = OCI_NO_DATA;
        fn OCIDBStartup(svchp: *mut OCISvcCtx, errhp: *mut OCIError, admhp: *mut OCIAdmin, mode: u32, flags: u32) -> i32 = OCI_INVALID_HANDLE;
        fn OCIDBShutdown(svchp: *mut OCISvcCtx, errhp: *mut OCIError, admhp: *mut OCIAdmin, mode: u32) -> i32 = OCI_INVALID_HANDLE;
        fn xaoSvcCtx(dbname: *const u8) -> *mut OCISvcCtx = std::ptr::null_mut();
        fn xaoEnv(dbname: *const u8) -> *mut OCIEnv = std::ptr::null_mut();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_marker_wins() {
        let present = ["OCIEnvInit", "OCIThreadCreate", "OCIStmtPrepare2", "OCILobWrite2", "OCIClientVersion"];
        let version = detect_version(|name| present.contains(&name));
        assert_eq!(version, Some(OciVersion::new(10, 2, 0)));

        let version = detect_version(|name| name == "OCISodaOperKeysSet" || name == "OCIEnvInit");
        assert_eq!(version, Some(OciVersion::new(18, 3, 0)));
    }

    #[test]
    fn no_markers_no_version() {
        assert_eq!(detect_version(|_| false), None);
    }

    #[test]
    fn markers_are_ordered_newest_first() {
        let versions : Vec<OciVersion> = VERSION_MARKERS.iter()
            .map(|&(_, major, minor)| OciVersion::new(major, minor, 0))
            .collect();
        assert!(versions.windows(2).all(|pair| pair[0] > pair[1]));
    }

    #[test]
    fn library_path_uses_directory() {
        let path = library_path(Some(Path::new("/opt/oracle/instantclient")));
        assert!(path.starts_with("/opt/oracle/instantclient"));
        assert!(path.ends_with(OCI_LIB_NAME));
        assert_eq!(library_path(None), PathBuf::from(OCI_LIB_NAME));
    }

    #[test]
    fn missing_library_is_reported() {
        let res = open_library(Path::new("/nonexistent/dir/for/oci/libclntsh.so"));
        assert!(res.is_err());
    }
}
