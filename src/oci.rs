//! Oracle OCI

#![allow(dead_code)]

use libc::{c_void, c_long};
use crate::{Result, Error};

pub(crate) mod api;
pub(crate) mod ptr;
pub(crate) mod attr;
pub(crate) mod param;
pub(crate) mod handle;
pub(crate) mod desc;

pub(crate) use api::*;
pub(crate) use self::ptr::Ptr;
pub(crate) use handle::{Handle, HandleType};
pub(crate) use desc::{Descriptor, DescriptorType};
pub(crate) use param::Param;

pub(crate) const OCI_DEFAULT                : u32 = 0;

// Return codes
pub(crate) const OCI_SUCCESS                : i32 = 0;
pub(crate) const OCI_SUCCESS_WITH_INFO      : i32 = 1;
pub(crate) const OCI_NEED_DATA              : i32 = 99;
pub(crate) const OCI_NO_DATA                : i32 = 100;
pub(crate) const OCI_ERROR                  : i32 = -1;
pub(crate) const OCI_INVALID_HANDLE         : i32 = -2;
pub(crate) const OCI_STILL_EXECUTING        : i32 = -3123;
pub(crate) const OCI_CONTINUE               : i32 = -24200;

// Handle types
pub(crate) const OCI_HTYPE_ENV              : u32 = 1;
pub(crate) const OCI_HTYPE_ERROR            : u32 = 2;
pub(crate) const OCI_HTYPE_SVCCTX           : u32 = 3;
pub(crate) const OCI_HTYPE_STMT             : u32 = 4;
pub(crate) const OCI_HTYPE_BIND             : u32 = 5;
pub(crate) const OCI_HTYPE_DEFINE           : u32 = 6;
pub(crate) const OCI_HTYPE_DESCRIBE         : u32 = 7;
pub(crate) const OCI_HTYPE_SERVER           : u32 = 8;
pub(crate) const OCI_HTYPE_SESSION          : u32 = 9;
pub(crate) const OCI_HTYPE_AUTHINFO         : u32 = OCI_HTYPE_SESSION;
pub(crate) const OCI_HTYPE_TRANS            : u32 = 10;
pub(crate) const OCI_HTYPE_DIRPATH_CTX      : u32 = 14;
pub(crate) const OCI_HTYPE_DIRPATH_COLUMN_ARRAY : u32 = 15;
pub(crate) const OCI_HTYPE_DIRPATH_STREAM   : u32 = 16;
pub(crate) const OCI_HTYPE_CPOOL            : u32 = 26;
pub(crate) const OCI_HTYPE_SPOOL            : u32 = 27;
pub(crate) const OCI_HTYPE_ADMIN            : u32 = 28;

// Descriptor types
pub(crate) const OCI_DTYPE_LOB              : u32 = 50;  // lob locator
pub(crate) const OCI_DTYPE_RSET             : u32 = 52;  // result set descriptor
pub(crate) const OCI_DTYPE_PARAM            : u32 = 53;  // a parameter descriptor obtained from ocigparm
pub(crate) const OCI_DTYPE_ROWID            : u32 = 54;  // rowid descriptor
pub(crate) const OCI_DTYPE_FILE             : u32 = 56;  // File Lob locator
pub(crate) const OCI_DTYPE_AQENQ_OPTIONS    : u32 = 57;  // enqueue options
pub(crate) const OCI_DTYPE_AQDEQ_OPTIONS    : u32 = 58;  // dequeue options
pub(crate) const OCI_DTYPE_AQMSG_PROPERTIES : u32 = 59;  // message properties
pub(crate) const OCI_DTYPE_AQAGENT          : u32 = 60;  // aq agent
pub(crate) const OCI_DTYPE_INTERVAL_YM      : u32 = 62;  // Interval year month
pub(crate) const OCI_DTYPE_INTERVAL_DS      : u32 = 63;  // Interval day second
pub(crate) const OCI_DTYPE_DATE             : u32 = 65;  // Date
pub(crate) const OCI_DTYPE_TIMESTAMP        : u32 = 68;  // Timestamp
pub(crate) const OCI_DTYPE_TIMESTAMP_TZ     : u32 = 69;  // Timestamp with timezone
pub(crate) const OCI_DTYPE_TIMESTAMP_LTZ    : u32 = 70;  // Timestamp with local tz

// Handle attributes
pub(crate) const OCI_ATTR_OBJECT            : u32 = 2;
pub(crate) const OCI_ATTR_ENV               : u32 = 5;
pub(crate) const OCI_ATTR_SERVER            : u32 = 6;
pub(crate) const OCI_ATTR_SESSION           : u32 = 7;
pub(crate) const OCI_ATTR_TRANS             : u32 = 8;
pub(crate) const OCI_ATTR_ROW_COUNT         : u32 = 9;
pub(crate) const OCI_ATTR_SQLFNCODE         : u32 = 10;
pub(crate) const OCI_ATTR_PREFETCH_ROWS     : u32 = 11;
pub(crate) const OCI_ATTR_PREFETCH_MEMORY   : u32 = 13;
pub(crate) const OCI_ATTR_FSPRECISION       : u32 = 16;
pub(crate) const OCI_ATTR_LFPRECISION       : u32 = 17;
pub(crate) const OCI_ATTR_PARAM_COUNT       : u32 = 18;     // number of columns in the select list
pub(crate) const OCI_ATTR_ROWID             : u32 = 19;
pub(crate) const OCI_ATTR_USERNAME          : u32 = 22;
pub(crate) const OCI_ATTR_PASSWORD          : u32 = 23;
pub(crate) const OCI_ATTR_STMT_TYPE         : u32 = 24;
pub(crate) const OCI_ATTR_XID               : u32 = 27;
pub(crate) const OCI_ATTR_CHARSET_ID        : u32 = 31;
pub(crate) const OCI_ATTR_CHARSET_FORM      : u32 = 32;
pub(crate) const OCI_ATTR_CACHE_OPT_SIZE    : u32 = 34;
pub(crate) const OCI_ATTR_CACHE_MAX_SIZE    : u32 = 35;
pub(crate) const OCI_ATTR_ROWS_RETURNED     : u32 = 42;

// AQ attributes
pub(crate) const OCI_ATTR_VISIBILITY         : u32 = 47;
pub(crate) const OCI_ATTR_RELATIVE_MSGID     : u32 = 48;
pub(crate) const OCI_ATTR_SEQUENCE_DEVIATION : u32 = 49;
pub(crate) const OCI_ATTR_CONSUMER_NAME      : u32 = 50;
pub(crate) const OCI_ATTR_DEQ_MODE           : u32 = 51;
pub(crate) const OCI_ATTR_NAVIGATION         : u32 = 52;
pub(crate) const OCI_ATTR_WAIT               : u32 = 53;
pub(crate) const OCI_ATTR_DEQ_MSGID          : u32 = 54;
pub(crate) const OCI_ATTR_PRIORITY           : u32 = 55;
pub(crate) const OCI_ATTR_DELAY              : u32 = 56;
pub(crate) const OCI_ATTR_EXPIRATION         : u32 = 57;
pub(crate) const OCI_ATTR_CORRELATION        : u32 = 58;
pub(crate) const OCI_ATTR_ATTEMPTS           : u32 = 59;
pub(crate) const OCI_ATTR_RECIPIENT_LIST     : u32 = 60;
pub(crate) const OCI_ATTR_EXCEPTION_QUEUE    : u32 = 61;
pub(crate) const OCI_ATTR_ENQ_TIME           : u32 = 62;
pub(crate) const OCI_ATTR_MSG_STATE          : u32 = 63;
pub(crate) const OCI_ATTR_AGENT_NAME         : u32 = 64;
pub(crate) const OCI_ATTR_AGENT_ADDRESS      : u32 = 65;
pub(crate) const OCI_ATTR_AGENT_PROTOCOL     : u32 = 66;
pub(crate) const OCI_ATTR_SENDER_ID          : u32 = 68;
pub(crate) const OCI_ATTR_ORIGINAL_MSGID     : u32 = 69;

// Batch errors
pub(crate) const OCI_ATTR_NUM_DML_ERRORS    : u32 = 73;
pub(crate) const OCI_ATTR_DML_ROW_OFFSET    : u32 = 74;

// Direct path attributes
pub(crate) const OCI_ATTR_DATEFORMAT        : u32 = 75;
pub(crate) const OCI_ATTR_BUF_SIZE          : u32 = 77;
pub(crate) const OCI_ATTR_DIRPATH_MODE      : u32 = 78;
pub(crate) const OCI_ATTR_DIRPATH_NOLOG     : u32 = 79;
pub(crate) const OCI_ATTR_DIRPATH_PARALLEL  : u32 = 80;
pub(crate) const OCI_ATTR_NUM_ROWS          : u32 = 81;
pub(crate) const OCI_ATTR_COL_COUNT         : u32 = 82;
pub(crate) const OCI_ATTR_STREAM_OFFSET     : u32 = 83;
pub(crate) const OCI_ATTR_SUB_NAME          : u32 = 50;
pub(crate) const OCI_ATTR_NUM_COLS          : u32 = 102;
pub(crate) const OCI_ATTR_LIST_COLUMNS      : u32 = 103;
pub(crate) const OCI_ATTR_DCACHE_SIZE       : u32 = 304;
pub(crate) const OCI_ATTR_DCACHE_DISABLE    : u32 = 307;

// Describe attributes
pub(crate) const OCI_ATTR_COL_PROPERTIES    : u32 = 104;
pub(crate) const OCI_ATTR_REF_TDO           : u32 = 110;
pub(crate) const OCI_ATTR_PTYPE             : u32 = 123;
pub(crate) const OCI_ATTR_PARAM             : u32 = 124;
pub(crate) const OCI_ATTR_PARSE_ERROR_OFFSET: u32 = 129;
pub(crate) const OCI_ATTR_SERVER_STATUS     : u32 = 143;
pub(crate) const OCI_ATTR_CURRENT_POSITION  : u32 = 164;
pub(crate) const OCI_ATTR_STMTCACHESIZE     : u32 = 176;

// Connection pool attributes
pub(crate) const OCI_ATTR_CONN_NOWAIT       : u32 = 178;
pub(crate) const OCI_ATTR_CONN_BUSY_COUNT   : u32 = 179;
pub(crate) const OCI_ATTR_CONN_OPEN_COUNT   : u32 = 180;
pub(crate) const OCI_ATTR_CONN_TIMEOUT      : u32 = 181;
pub(crate) const OCI_ATTR_CONN_MIN          : u32 = 183;
pub(crate) const OCI_ATTR_CONN_MAX          : u32 = 184;
pub(crate) const OCI_ATTR_CONN_INCR         : u32 = 185;

pub(crate) const OCI_ATTR_BIND_COUNT        : u32 = 190;
pub(crate) const OCI_ATTR_ROWS_FETCHED      : u32 = 197;
pub(crate) const OCI_ATTR_SPOOL_STMTCACHESIZE : u32 = 208;
pub(crate) const OCI_ATTR_TYPECODE          : u32 = 216;
pub(crate) const OCI_ATTR_COLLECTION_TYPECODE : u32 = 217;
pub(crate) const OCI_ATTR_STMT_IS_RETURNING : u32 = 218;
pub(crate) const OCI_ATTR_CURRENT_SCHEMA    : u32 = 224;
pub(crate) const OCI_ATTR_COLLECTION_ELEMENT: u32 = 227;
pub(crate) const OCI_ATTR_NUM_TYPE_ATTRS    : u32 = 228;
pub(crate) const OCI_ATTR_LIST_TYPE_ATTRS   : u32 = 229;
pub(crate) const OCI_ATTR_IS_SUBTYPE        : u32 = 258;
pub(crate) const OCI_ATTR_SUPERTYPE_SCHEMA_NAME : u32 = 259;
pub(crate) const OCI_ATTR_SUPERTYPE_NAME    : u32 = 260;
pub(crate) const OCI_ATTR_CLIENT_IDENTIFIER : u32 = 278;
pub(crate) const OCI_ATTR_IS_FINAL_TYPE     : u32 = 279;
pub(crate) const OCI_ATTR_CHAR_USED         : u32 = 285;
pub(crate) const OCI_ATTR_CHAR_SIZE         : u32 = 286;

// Session pool attributes
pub(crate) const OCI_ATTR_SPOOL_TIMEOUT     : u32 = 308;
pub(crate) const OCI_ATTR_SPOOL_GETMODE     : u32 = 309;
pub(crate) const OCI_ATTR_SPOOL_BUSY_COUNT  : u32 = 310;
pub(crate) const OCI_ATTR_SPOOL_OPEN_COUNT  : u32 = 311;
pub(crate) const OCI_ATTR_SPOOL_MIN         : u32 = 312;
pub(crate) const OCI_ATTR_SPOOL_MAX         : u32 = 313;
pub(crate) const OCI_ATTR_SPOOL_INCR        : u32 = 314;

// Session attributes
pub(crate) const OCI_ATTR_MODULE            : u32 = 366;
pub(crate) const OCI_ATTR_ACTION            : u32 = 367;
pub(crate) const OCI_ATTR_CLIENT_INFO       : u32 = 368;
pub(crate) const OCI_ATTR_COLLECT_CALL_TIME : u32 = 369;
pub(crate) const OCI_ATTR_CALL_TIME         : u32 = 370;
pub(crate) const OCI_ATTR_ADMIN_PFILE       : u32 = 389;
pub(crate) const OCI_ATTR_DBNAME            : u32 = 391;
pub(crate) const OCI_ATTR_INSTNAME          : u32 = 392;
pub(crate) const OCI_ATTR_SERVICENAME       : u32 = 393;
pub(crate) const OCI_ATTR_DBDOMAIN          : u32 = 399;
pub(crate) const OCI_ATTR_DRIVER_NAME       : u32 = 424;
pub(crate) const OCI_ATTR_ENV_NLS_LANGUAGE  : u32 = 424;
pub(crate) const OCI_ATTR_ENV_NLS_TERRITORY : u32 = 425;
pub(crate) const OCI_ATTR_DEFAULT_LOBPREFETCH_SIZE : u32 = 438;
pub(crate) const OCI_ATTR_UB8_ROW_COUNT     : u32 = 457;
pub(crate) const OCI_ATTR_SPOOL_AUTH        : u32 = 460;
pub(crate) const OCI_ATTR_IMPLICIT_RESULT_COUNT : u32 = 463;
pub(crate) const OCI_ATTR_SQL_ID            : u32 = 504;
pub(crate) const OCI_ATTR_LOB_REMOTE        : u32 = 520;
pub(crate) const OCI_ATTR_LOBEMPTY          : u32 = 45;
pub(crate) const OCI_ATTR_CALL_TIMEOUT      : u32 = 531;

// Attributes common to Columns and Stored Procs
pub(crate) const OCI_ATTR_DATA_SIZE         : u32 =  1; // maximum size of the data
pub(crate) const OCI_ATTR_DATA_TYPE         : u32 =  2; // the SQL type of the column/argument
pub(crate) const OCI_ATTR_NAME              : u32 =  4; // the name of the column/argument
pub(crate) const OCI_ATTR_PRECISION         : u32 =  5; // precision if number type
pub(crate) const OCI_ATTR_SCALE             : u32 =  6; // scale if number type
pub(crate) const OCI_ATTR_IS_NULL           : u32 =  7; // is it null ?
pub(crate) const OCI_ATTR_TYPE_NAME         : u32 =  8; // name of the named data type or a package name for package private types
pub(crate) const OCI_ATTR_SCHEMA_NAME       : u32 =  9; // the schema name

// Flags coresponding to the column properties
pub(crate) const OCI_ATTR_COL_PROPERTY_IS_IDENTITY             : u64 = 0x01;
pub(crate) const OCI_ATTR_COL_PROPERTY_IS_GEN_ALWAYS           : u64 = 0x02;
pub(crate) const OCI_ATTR_COL_PROPERTY_IS_GEN_BY_DEF_ON_NULL   : u64 = 0x04;

// Opaque handles
#[repr(C)] pub struct OCIEnv                { _private: [u8; 0] }
#[repr(C)] pub struct OCIError              { _private: [u8; 0] }
#[repr(C)] pub struct OCISvcCtx             { _private: [u8; 0] }
#[repr(C)] pub struct OCIStmt               { _private: [u8; 0] }
#[repr(C)] pub struct OCIBind               { _private: [u8; 0] }
#[repr(C)] pub struct OCIDefine             { _private: [u8; 0] }
#[repr(C)] pub struct OCIDescribe           { _private: [u8; 0] }
#[repr(C)] pub struct OCIServer             { _private: [u8; 0] }
#[repr(C)] pub struct OCISession            { _private: [u8; 0] }
#[repr(C)] pub struct OCIAuthInfo           { _private: [u8; 0] }
#[repr(C)] pub struct OCITrans              { _private: [u8; 0] }
#[repr(C)] pub struct OCICPool              { _private: [u8; 0] }
#[repr(C)] pub struct OCISPool              { _private: [u8; 0] }
#[repr(C)] pub struct OCIAdmin              { _private: [u8; 0] }
#[repr(C)] pub struct OCIDirPathCtx         { _private: [u8; 0] }
#[repr(C)] pub struct OCIDirPathColArray    { _private: [u8; 0] }
#[repr(C)] pub struct OCIDirPathStream      { _private: [u8; 0] }

// Opaque descriptors and object types
#[repr(C)] pub struct OCIResult             { _private: [u8; 0] }
#[repr(C)] pub struct OCILobLocator         { _private: [u8; 0] }
#[repr(C)] pub struct OCIParam              { _private: [u8; 0] }
#[repr(C)] pub struct OCIRowid              { _private: [u8; 0] }
#[repr(C)] pub struct OCIDateTime           { _private: [u8; 0] }
#[repr(C)] pub struct OCIInterval           { _private: [u8; 0] }
#[repr(C)] pub struct OCIString             { _private: [u8; 0] }
#[repr(C)] pub struct OCIRaw                { _private: [u8; 0] }
#[repr(C)] pub struct OCIType               { _private: [u8; 0] }
#[repr(C)] pub struct OCIRef                { _private: [u8; 0] }
#[repr(C)] pub struct OCIColl               { _private: [u8; 0] }
#[repr(C)] pub struct OCIIter               { _private: [u8; 0] }
#[repr(C)] pub struct OCIAQEnqOptions       { _private: [u8; 0] }
#[repr(C)] pub struct OCIAQDeqOptions       { _private: [u8; 0] }
#[repr(C)] pub struct OCIAQMsgProperties    { _private: [u8; 0] }
#[repr(C)] pub struct OCIAQAgent            { _private: [u8; 0] }

// Virtual descriptors
pub struct OCICLobLocator           {}
pub struct OCIBLobLocator           {}
pub struct OCIBFileLocator          {}
pub struct OCITimestamp             {}
pub struct OCITimestampTZ           {}
pub struct OCITimestampLTZ          {}
pub struct OCIIntervalYearToMonth   {}
pub struct OCIIntervalDayToSecond   {}

/// Marker trait for OCI handles and descriptors
pub trait OCIStruct {}

macro_rules! mark_as_oci {
    ($($t:ty),+) => {
        $(
            impl OCIStruct for $t {}
        )+
    };
}

mark_as_oci!(OCIEnv, OCIError, OCISvcCtx, OCIStmt, OCIBind, OCIDefine, OCIDescribe, OCIServer, OCISession, OCIAuthInfo, OCITrans, OCICPool, OCISPool, OCIAdmin);
mark_as_oci!(OCIDirPathCtx, OCIDirPathColArray, OCIDirPathStream);
mark_as_oci!(OCIResult, OCILobLocator, OCIParam, OCIRowid, OCIDateTime, OCIInterval, OCIString, OCIRaw, OCIType, OCIRef, OCIColl, OCIIter);
mark_as_oci!(OCIAQEnqOptions, OCIAQDeqOptions, OCIAQMsgProperties, OCIAQAgent);
mark_as_oci!(OCICLobLocator, OCIBLobLocator, OCIBFileLocator, OCITimestamp, OCITimestampTZ, OCITimestampLTZ, OCIIntervalYearToMonth, OCIIntervalDayToSecond);

/// C mapping of the Oracle NUMBER
#[derive(Clone, Copy)]
#[repr(C)] pub struct OCINumber {
    pub(crate) bytes: [u8; 22]
}

impl OCINumber {
    pub(crate) fn new() -> Self {
        Self { bytes: [0; 22] }
    }
}

/// C mapping of the Oracle DATE type (SQLT_ODT)
#[derive(Debug, Clone, Copy, Default)]
#[repr(C)]
pub struct OCIDate {
    pub(crate) year: i16, // gregorian year: range is -4712 <= year <= 9999
    pub(crate) month: u8, // month: range is 1 <= month <= 12
    pub(crate) day:   u8, // day: range is 1 <= day <= 31
    pub(crate) hour:  u8, // hours: range is 0 <= hours <= 23
    pub(crate) min:   u8, // minutes: range is 0 <= minutes <= 59
    pub(crate) sec:   u8  // seconds: range is 0 <= seconds <= 59
}

pub(crate) const XID_DATA_SIZE : usize = 128;

/// C mapping of the X/Open transaction identifier
#[repr(C)]
pub(crate) struct OCIXid {
    pub(crate) format_id:    c_long,
    pub(crate) gtrid_length: c_long,
    pub(crate) bqual_length: c_long,
    pub(crate) data:         [u8; XID_DATA_SIZE],
}

pub(crate) type OCIInd = i16;

/// `OCIBindDynamic` callback that supplies IN data
pub(crate) type OCICallbackInBind = unsafe extern "C" fn(
    ictxp: *mut c_void, bindp: *mut OCIBind, iter: u32, index: u32,
    bufpp: *mut *mut c_void, alenp: *mut u32, piecep: *mut u8, indp: *mut *mut c_void
) -> i32;

/// `OCIBindDynamic` callback that receives OUT data
pub(crate) type OCICallbackOutBind = unsafe extern "C" fn(
    octxp: *mut c_void, bindp: *mut OCIBind, iter: u32, index: u32,
    bufpp: *mut *mut c_void, alenpp: *mut *mut u32, piecep: *mut u8,
    indpp: *mut *mut c_void, rcodepp: *mut *mut u16
) -> i32;

// Data types
pub(crate) const SQLT_CHR               : u16 = 1;   // (ORANET TYPE) character string
pub(crate) const SQLT_NUM               : u16 = 2;   // (ORANET TYPE) oracle numeric
pub(crate) const SQLT_INT               : u16 = 3;   // (ORANET TYPE) integer
pub(crate) const SQLT_FLT               : u16 = 4;   // (ORANET TYPE) Floating point number
pub(crate) const SQLT_STR               : u16 = 5;   // zero terminated string
pub(crate) const SQLT_VNU               : u16 = 6;   // NUM with preceding length byte
pub(crate) const SQLT_LNG               : u16 = 8;   // long
pub(crate) const SQLT_VCS               : u16 = 9;   // Variable character string
pub(crate) const SQLT_RID               : u16 = 11;  // rowid
pub(crate) const SQLT_DAT               : u16 = 12;  // date in oracle format
pub(crate) const SQLT_VBI               : u16 = 15;  // binary in VCS format
pub(crate) const SQLT_BFLOAT            : u16 = 21;  // Native Binary float
pub(crate) const SQLT_BDOUBLE           : u16 = 22;  // NAtive binary double
pub(crate) const SQLT_BIN               : u16 = 23;  // binary data(DTYBIN)
pub(crate) const SQLT_LBI               : u16 = 24;  // long binary
pub(crate) const SQLT_UIN               : u16 = 68;  // unsigned integer
pub(crate) const SQLT_LVC               : u16 = 94;  // Longer longs (char)
pub(crate) const SQLT_LVB               : u16 = 95;  // Longer long binary
pub(crate) const SQLT_AFC               : u16 = 96;  // Ansi fixed char
pub(crate) const SQLT_AVC               : u16 = 97;  // Ansi Var char
pub(crate) const SQLT_IBFLOAT           : u16 = 100; // binary float canonical
pub(crate) const SQLT_IBDOUBLE          : u16 = 101; // binary double canonical
pub(crate) const SQLT_CUR               : u16 = 102; // cursor  type
pub(crate) const SQLT_RDD               : u16 = 104; // rowid descriptor
pub(crate) const SQLT_NTY               : u16 = 108; // named object type, a.k.a. user-defined type
pub(crate) const SQLT_REF               : u16 = 110; // ref type
pub(crate) const SQLT_CLOB              : u16 = 112; // character lob
pub(crate) const SQLT_BLOB              : u16 = 113; // binary lob
pub(crate) const SQLT_BFILE             : u16 = 114; // binary file lob
pub(crate) const SQLT_CFILE             : u16 = 115; // character file lob
pub(crate) const SQLT_RSET              : u16 = 116; // result set type
pub(crate) const SQLT_NCO               : u16 = 122; // named collection type (varray or nested table)
pub(crate) const SQLT_VST               : u16 = 155; // OCIString type
pub(crate) const SQLT_ODT               : u16 = 156; // OCIDate type

// datetimes and intervals
pub(crate) const SQLT_DATE              : u16 = 184; // ANSI Date
pub(crate) const SQLT_TIME              : u16 = 185; // TIME
pub(crate) const SQLT_TIME_TZ           : u16 = 186; // TIME WITH TIME ZONE
pub(crate) const SQLT_TIMESTAMP         : u16 = 187; // TIMESTAMP
pub(crate) const SQLT_TIMESTAMP_TZ      : u16 = 188; // TIMESTAMP WITH TIME ZONE
pub(crate) const SQLT_INTERVAL_YM       : u16 = 189; // INTERVAL YEAR TO MONTH
pub(crate) const SQLT_INTERVAL_DS       : u16 = 190; // INTERVAL DAY TO SECOND
pub(crate) const SQLT_TIMESTAMP_LTZ     : u16 = 232; // TIMESTAMP WITH LOCAL TZ

pub(crate) const SQLT_PNTY              : u16 = 241; // pl/sql representation of named types
pub(crate) const SQLT_REC               : u16 = 250; // pl/sql 'record' (or %rowtype)
pub(crate) const SQLT_TAB               : u16 = 251; // pl/sql 'indexed table'
pub(crate) const SQLT_BOL               : u16 = 252; // pl/sql 'boolean'

// Type codes
pub(crate) const OCI_TYPECODE_REF       : u16 = 110;
pub(crate) const OCI_TYPECODE_DATE      : u16 = 12;
pub(crate) const OCI_TYPECODE_REAL      : u16 = 21;
pub(crate) const OCI_TYPECODE_DOUBLE    : u16 = 22;
pub(crate) const OCI_TYPECODE_FLOAT     : u16 = 4;
pub(crate) const OCI_TYPECODE_NUMBER    : u16 = 2;
pub(crate) const OCI_TYPECODE_DECIMAL   : u16 = 7;
pub(crate) const OCI_TYPECODE_INTEGER   : u16 = 3;
pub(crate) const OCI_TYPECODE_SMALLINT  : u16 = 246;
pub(crate) const OCI_TYPECODE_RAW       : u16 = 95;
pub(crate) const OCI_TYPECODE_VARCHAR2  : u16 = 9;
pub(crate) const OCI_TYPECODE_VARCHAR   : u16 = 1;
pub(crate) const OCI_TYPECODE_CHAR      : u16 = 96;
pub(crate) const OCI_TYPECODE_BFLOAT    : u16 = 100;
pub(crate) const OCI_TYPECODE_BDOUBLE   : u16 = 101;
pub(crate) const OCI_TYPECODE_VARRAY    : u16 = 247;
pub(crate) const OCI_TYPECODE_TABLE     : u16 = 248;
pub(crate) const OCI_TYPECODE_ITABLE    : u16 = 251;
pub(crate) const OCI_TYPECODE_CLOB      : u16 = 112;
pub(crate) const OCI_TYPECODE_BLOB      : u16 = 113;
pub(crate) const OCI_TYPECODE_BFILE     : u16 = 114;
pub(crate) const OCI_TYPECODE_OBJECT    : u16 = 108;
pub(crate) const OCI_TYPECODE_NAMEDCOLLECTION : u16 = 122;
pub(crate) const OCI_TYPECODE_TIMESTAMP : u16 = 187;
pub(crate) const OCI_TYPECODE_TIMESTAMP_TZ  : u16 = 188;
pub(crate) const OCI_TYPECODE_TIMESTAMP_LTZ : u16 = 232;
pub(crate) const OCI_TYPECODE_INTERVAL_YM   : u16 = 189;
pub(crate) const OCI_TYPECODE_INTERVAL_DS   : u16 = 190;

// Null indicator information
pub(crate) const OCI_IND_NOTNULL        : i16 = 0;
pub(crate) const OCI_IND_NULL           : i16 = -1;

// char set "form" information
pub(crate) const SQLCS_IMPLICIT         : u8 = 1;
pub(crate) const SQLCS_NCHAR            : u8 = 2;

// OBJECT Duration
pub(crate) const OCI_DURATION_SESSION   : u16 = 10;
pub(crate) const OCI_DURATION_TRANS     : u16 = 11;
pub(crate) const OCI_DURATION_STATEMENT : u16 = 13;

// Object pinning
pub(crate) const OCI_PIN_ANY            : u32 = 3;
pub(crate) const OCI_LOCK_NONE          : u32 = 1;

pub(crate) const OCI_OBJECTFREE_FORCE   : u16 = 0x0001;
pub(crate) const OCI_OBJECTFREE_NONULL  : u16 = 0x0002;
pub(crate) const OCI_TYPEGET_HEADER     : u32 = 0;
pub(crate) const OCI_TYPEGET_ALL        : u32 = 1;

// Number conversion flags
pub(crate) const OCI_NUMBER_UNSIGNED    : u32 = 0;
pub(crate) const OCI_NUMBER_SIGNED      : u32 = 2;

// Character Sets
pub(crate) const AL32UTF8               : u16 = 873;
pub(crate) const UTF8                   : u16 = 871;

// Initialization Modes
pub(crate) const OCI_THREADED           : u32 = 1;
pub(crate) const OCI_OBJECT             : u32 = 2;
pub(crate) const OCI_EVENTS             : u32 = 4;

// Credential Types
pub(crate) const OCI_CRED_RDBMS         : u32 = 1;
pub(crate) const OCI_CRED_EXT           : u32 = 2;

// Authentication modes
pub(crate) const OCI_SYSDBA             : u32 = 0x00000002;
pub(crate) const OCI_SYSOPER            : u32 = 0x00000004;
pub(crate) const OCI_PRELIM_AUTH        : u32 = 0x00000008;
pub(crate) const OCI_SYSASM             : u32 = 0x00008000;
pub(crate) const OCI_SYSBKP             : u32 = 0x00020000;
pub(crate) const OCI_SYSDGD             : u32 = 0x00040000;
pub(crate) const OCI_SYSKMT             : u32 = 0x00080000;
pub(crate) const OCI_SYSRAC             : u32 = 0x00100000;
pub(crate) const OCI_STMT_CACHE         : u32 = 0x00000040;
pub(crate) const OCI_AUTH               : u32 = 0x00000008;
pub(crate) const OCI_CPOOL              : u32 = 0x00000200;

// Server Handle Attribute Values
pub(crate) const OCI_SERVER_NOT_CONNECTED : u32 = 0;
pub(crate) const OCI_SERVER_NORMAL      : u32 = 1;

// Parsing Syntax Types
pub(crate) const OCI_NTV_SYNTAX         : u32 = 1;

// Statement prepare and execute modes
pub(crate) const OCI_STRLS_CACHE_DELETE : u32 = 0x0010;
pub(crate) const OCI_BATCH_ERRORS       : u32 = 0x00000080;
pub(crate) const OCI_COMMIT_ON_SUCCESS  : u32 = 0x00000020;
pub(crate) const OCI_DESCRIBE_ONLY      : u32 = 0x00000010;
pub(crate) const OCI_STMT_SCROLLABLE_READONLY : u32 = 0x00000008;
pub(crate) const OCI_PARSE_ONLY         : u32 = 0x00000100;

// Bind and define modes
pub(crate) const OCI_DATA_AT_EXEC       : u32 = 0x00000002;
pub(crate) const OCI_DYNAMIC_FETCH      : u32 = 0x00000002;

// Statement Types
pub(crate) const OCI_STMT_UNKNOWN       : u16 = 0;
pub(crate) const OCI_STMT_SELECT        : u16 = 1;
pub(crate) const OCI_STMT_UPDATE        : u16 = 2;
pub(crate) const OCI_STMT_DELETE        : u16 = 3;
pub(crate) const OCI_STMT_INSERT        : u16 = 4;
pub(crate) const OCI_STMT_CREATE        : u16 = 5;
pub(crate) const OCI_STMT_DROP          : u16 = 6;
pub(crate) const OCI_STMT_ALTER         : u16 = 7;
pub(crate) const OCI_STMT_BEGIN         : u16 = 8;
pub(crate) const OCI_STMT_DECLARE       : u16 = 9;
pub(crate) const OCI_STMT_CALL          : u16 = 10;
pub(crate) const OCI_STMT_MERGE         : u16 = 16;

// Fetch orientation
pub(crate) const OCI_FETCH_CURRENT      : u16 = 0x01;
pub(crate) const OCI_FETCH_NEXT         : u16 = 0x02;
pub(crate) const OCI_FETCH_FIRST        : u16 = 0x04;
pub(crate) const OCI_FETCH_LAST         : u16 = 0x08;
pub(crate) const OCI_FETCH_PRIOR        : u16 = 0x10;
pub(crate) const OCI_FETCH_ABSOLUTE     : u16 = 0x20;
pub(crate) const OCI_FETCH_RELATIVE     : u16 = 0x40;

// Transaction flags
pub(crate) const OCI_TRANS_NEW          : u32 = 0x00000001;
pub(crate) const OCI_TRANS_JOIN         : u32 = 0x00000002;
pub(crate) const OCI_TRANS_RESUME       : u32 = 0x00000004;
pub(crate) const OCI_TRANS_READONLY     : u32 = 0x00000100;
pub(crate) const OCI_TRANS_READWRITE    : u32 = 0x00000200;
pub(crate) const OCI_TRANS_SERIALIZABLE : u32 = 0x00000400;
pub(crate) const OCI_TRANS_LOOSE        : u32 = 0x00010000;
pub(crate) const OCI_TRANS_TIGHT        : u32 = 0x00020000;
pub(crate) const OCI_TRANS_TWOPHASE     : u32 = 0x01000000;

// Pools
pub(crate) const OCI_SPC_REINITIALIZE   : u32 = 0x0001;
pub(crate) const OCI_SPC_HOMOGENEOUS    : u32 = 0x0002;
pub(crate) const OCI_SPC_STMTCACHE      : u32 = 0x0004;
pub(crate) const OCI_SESSGET_SPOOL      : u32 = 0x0001;
pub(crate) const OCI_SESSGET_STMTCACHE  : u32 = 0x0004;
pub(crate) const OCI_SESSGET_CREDEXT    : u32 = 0x0010;
pub(crate) const OCI_SESSGET_SYSDBA     : u32 = 0x0100;
pub(crate) const OCI_SESSRLS_DROPSESS   : u32 = 0x0001;
pub(crate) const OCI_SESSRLS_RETAG      : u32 = 0x0002;
pub(crate) const OCI_SPD_FORCE          : u32 = 0x0001;
pub(crate) const OCI_CPOOL_REINITIALIZE : u32 = 0x0111;

pub(crate) const OCI_SPOOL_ATTRVAL_WAIT     : u8 = 0;
pub(crate) const OCI_SPOOL_ATTRVAL_NOWAIT   : u8 = 1;
pub(crate) const OCI_SPOOL_ATTRVAL_FORCEGET : u8 = 2;

// Describe
pub(crate) const OCI_OTYPE_NAME         : u8 = 1;
pub(crate) const OCI_PTYPE_UNK          : u8 = 0;
pub(crate) const OCI_PTYPE_TABLE        : u8 = 1;
pub(crate) const OCI_PTYPE_VIEW         : u8 = 2;
pub(crate) const OCI_PTYPE_TYPE         : u8 = 6;
pub(crate) const OCI_PTYPE_SYN          : u8 = 7;
pub(crate) const OCI_PTYPE_COL          : u8 = 9;
pub(crate) const OCI_PTYPE_LIST         : u8 = 11;
pub(crate) const OCI_PTYPE_TYPE_ATTR    : u8 = 12;
pub(crate) const OCI_PTYPE_TYPE_COLL    : u8 = 13;
pub(crate) const OCI_ATTR_LIST_ARGUMENTS: u32 = 108;

// Direct path
pub(crate) const OCI_DIRPATH_COL_COMPLETE : u8 = 0;
pub(crate) const OCI_DIRPATH_COL_NULL     : u8 = 1;
pub(crate) const OCI_DIRPATH_COL_PARTIAL  : u8 = 2;
pub(crate) const OCI_DIRPATH_COL_ERROR    : u8 = 3;
pub(crate) const OCI_DIRPATH_DATASAVE_SAVEONLY : u32 = 0;

// Advanced queuing
pub(crate) const OCI_DEQ_BROWSE             : u32 = 1;
pub(crate) const OCI_DEQ_LOCKED             : u32 = 2;
pub(crate) const OCI_DEQ_REMOVE             : u32 = 3;
pub(crate) const OCI_DEQ_REMOVE_NODATA      : u32 = 4;
pub(crate) const OCI_DEQ_FIRST_MSG          : u32 = 1;
pub(crate) const OCI_DEQ_NEXT_TRANSACTION   : u32 = 2;
pub(crate) const OCI_DEQ_NEXT_MSG           : u32 = 3;
pub(crate) const OCI_DEQ_WAIT_FOREVER       : i32 = -1;
pub(crate) const OCI_ENQ_IMMEDIATE          : u32 = 1;
pub(crate) const OCI_ENQ_ON_COMMIT          : u32 = 2;
pub(crate) const OCI_ENQ_BEFORE             : u32 = 2;
pub(crate) const OCI_ENQ_TOP                : u32 = 3;
pub(crate) const OCI_MSG_READY              : i32 = 0;
pub(crate) const OCI_MSG_WAITING            : i32 = 1;
pub(crate) const OCI_MSG_PROCESSED          : i32 = 2;
pub(crate) const OCI_MSG_EXPIRED            : i32 = 3;
pub(crate) const OCI_MSG_NO_DELAY           : i32 = 0;
pub(crate) const OCI_MSG_NO_EXPIRATION      : i32 = -1;

// Database startup and shutdown
pub(crate) const OCI_DBSTARTUPFLAG_FORCE    : u32 = 0x00000001;
pub(crate) const OCI_DBSTARTUPFLAG_RESTRICT : u32 = 0x00000002;
pub(crate) const OCI_DBSHUTDOWN_TRANSACTIONAL       : u32 = 1;
pub(crate) const OCI_DBSHUTDOWN_TRANSACTIONAL_LOCAL : u32 = 2;
pub(crate) const OCI_DBSHUTDOWN_IMMEDIATE   : u32 = 3;
pub(crate) const OCI_DBSHUTDOWN_ABORT       : u32 = 4;
pub(crate) const OCI_DBSHUTDOWN_FINAL       : u32 = 5;

// LOBs
pub(crate) const OCI_TEMP_BLOB              : u8 = 1;
pub(crate) const OCI_TEMP_CLOB              : u8 = 2;

pub(crate) const OCI_FILE_READONLY          : u8 = 1;
pub(crate) const OCI_LOB_READONLY           : u8 = 1;
pub(crate) const OCI_LOB_READWRITE          : u8 = 2;
pub(crate) const OCI_LOB_BUFFER_FREE        : u32 = 1;
pub(crate) const OCI_LOB_BUFFER_NOFREE      : u32 = 2;

pub(crate) const OCI_ONE_PIECE              : u8 = 0;
pub(crate) const OCI_FIRST_PIECE            : u8 = 1;
pub(crate) const OCI_NEXT_PIECE             : u8 = 2;
pub(crate) const OCI_LAST_PIECE             : u8 = 3;

pub(crate) const OCI_ERROR_MAXMSG_SIZE      : usize = 3072;
pub(crate) const OCI_ERR_AQ_DEQUEUE_TIMEOUT : i32 = 25228;
pub(crate) const OCI_ERR_AQ_LISTEN_TIMEOUT  : i32 = 25254;

/// Character set form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharSetForm {
    Undefined = 0,
    Implicit = 1,
    NChar = 2
}

impl From<u8> for CharSetForm {
    fn from(form: u8) -> Self {
        match form {
            SQLCS_IMPLICIT => CharSetForm::Implicit,
            SQLCS_NCHAR    => CharSetForm::NChar,
            _              => CharSetForm::Undefined,
        }
    }
}

/// LOB cache control flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cache {
    No  = 0,
    Yes = 1,
}

// https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/handle-and-descriptor-functions.html#GUID-C5BF55F7-A110-4CB5-9663-5056590F12B5
pub(crate) fn handle_alloc(env: *mut OCIEnv, handle: *mut *mut c_void, htype: u32) -> Result<()> {
    let res = unsafe { OCIHandleAlloc(env, handle, htype, 0, std::ptr::null()) };
    if res != OCI_SUCCESS {
        Err( Error::env(env, res) )
    } else {
        Ok(())
    }
}

// https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/handle-and-descriptor-functions.html#GUID-E9EF2766-E078-49A7-B1D1-738E4BA4814F
pub(crate) fn descriptor_alloc(env: *mut OCIEnv, desc: *mut *mut c_void, dtype: u32) -> Result<()> {
    let res = unsafe { OCIDescriptorAlloc(env, desc, dtype, 0, std::ptr::null()) };
    if res != OCI_SUCCESS {
        Err( Error::env(env, res) )
    } else {
        Ok(())
    }
}

// https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/handle-and-descriptor-functions.html#GUID-FA199A99-4D7A-42C2-BB0A-C20047B95DF9
pub(crate) fn attr_get(obj: *const c_void, obj_type: u32, val: *mut c_void, size: *mut u32, attr_type: u32, err: *mut OCIError) -> Result<()> {
    catch!{err =>
        OCIAttrGet(obj, obj_type, val, size, attr_type, err)
    }
    Ok(())
}

// https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/handle-and-descriptor-functions.html#GUID-3741D7BD-7652-4D7A-8813-AC2AEA8D3B03
pub(crate) fn attr_set(obj: *mut c_void, obj_type: u32, val: *const c_void, size: u32, attr_type: u32, err: *mut OCIError) -> Result<()> {
    catch!{err =>
        OCIAttrSet(obj, obj_type, val, size, attr_type, err)
    }
    Ok(())
}

// https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/handle-and-descriptor-functions.html#GUID-35D2FF91-139B-4A5C-97C8-8BC29866CCA4
pub(crate) fn param_get(obj: *const c_void, obj_type: u32, err: *mut OCIError, param: *mut *mut c_void, pos: u32) -> Result<()> {
    catch!{err =>
        OCIParamGet(obj, obj_type, err, param, pos)
    }
    Ok(())
}
