#![cfg_attr(not(doctest), doc=include_str!("../README.md"))]

#[macro_use]
mod err;
mod oci;
mod version;
mod list;
mod env;
mod conn;
mod pool;
mod transaction;
mod types;
mod lob;
mod column;
mod typeinfo;
mod object;
mod collection;
mod stmt;
mod database;
mod dirpath;
pub mod aq;

pub use err::{Error, ErrorKind, LibError, last_error};
pub use version::{Feature, OciVersion};
pub use env::{Environment, EnvOptions, FormatKind};
pub use conn::{Connection, ConnectionState, SessionMode, set_user_password};
pub use pool::{Pool, PoolKind};
pub use transaction::{Transaction, TransactionInfo, TransactionMode, Xid};
pub use types::{Ctx, Date, Number, RowID};
pub use lob::{LOB, BFile, InternalLob, LobOpenMode};
pub use column::{Column, ColumnType};
pub use typeinfo::{CollectionKind, TypeInfo, TypeInfoKind};
pub use object::{FromValue, Object, Ref, ToValue};
pub use collection::{Collection, CollectionIter};
pub use stmt::{Cursor, FetchMode, FromSql, Position, Row, Rows, SeekMode, Statement, StatementType, ToSql, ToSqlOut};
pub use database::{ShutdownFlag, ShutdownMode, StartupFlags, StartupMode, shutdown, startup};
pub use dirpath::{ConversionMode, DirPath, DirPathResult};
pub use oci::{Cache, CharSetForm};

pub type Result<T>        = std::result::Result<T, Error>;
pub type Timestamp<'a>    = types::timestamp::Timestamp<'a, oci::OCITimestamp>;
pub type TimestampTZ<'a>  = types::timestamp::Timestamp<'a, oci::OCITimestampTZ>;
pub type TimestampLTZ<'a> = types::timestamp::Timestamp<'a, oci::OCITimestampLTZ>;
pub type IntervalYM<'a>   = types::interval::Interval<'a, oci::OCIIntervalYearToMonth>;
pub type IntervalDS<'a>   = types::interval::Interval<'a, oci::OCIIntervalDayToSecond>;
/// Character LOB in the database character set.
pub type CLOB<'a>         = lob::LOB<'a, oci::OCICLobLocator>;
/**
    Character LOB in the national character set.

    OCI uses the same locator for CLOBs and NCLOBs, so this is the same type as `CLOB`.
    The character set form is chosen when the LOB is created: `LOB::temp_nclob` creates
    an NCLOB, while `temp` (even when called as `NCLOB::temp`) creates a CLOB. LOBs fetched
    from the database keep the form of their column. `LOB::is_nclob` tells them apart.
*/
pub type NCLOB<'a>        = lob::LOB<'a, oci::OCICLobLocator>;
pub type BLOB<'a>         = lob::LOB<'a, oci::OCIBLobLocator>;

/**
    Loads the OCI client library and returns a new environment with the default options.

    While there can be multiple environments, most applications most likely will
    need only one.

    As nothing can outlive its environment, when only one environment is used,
    it might be created either in `main` function:

    ```no_run
    fn main() {
        let oracle = oracall::env().expect("Oracle OCI environment");
        // ...
    }
    ```

    and passed around, or it might be created statically:

    ```no_run
    use oracall::{Environment, Result};
    use once_cell::sync::OnceCell;

    fn oracle() -> Result<&'static Environment> {
        static OCI_ENV: OnceCell<Environment> = OnceCell::new();
        OCI_ENV.get_or_try_init(||
            oracall::env()
        )
    }

    fn main() -> Result<()> {
        let oracle = oracle()?;
        // ...
        Ok(())
    }
    ```
*/
pub fn env() -> Result<Environment> {
    Environment::new()
}
