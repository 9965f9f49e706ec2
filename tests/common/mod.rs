#![allow(dead_code)]

/// Returns the database name, the user and the password of the test database,
/// or `None` when the database is not configured.
pub fn db_params() -> Option<(String, String, String)> {
    dotenvy::dotenv().ok();
    let dbname = std::env::var("DBNAME").ok()?;
    let dbuser = std::env::var("DBUSER").unwrap_or_else(|_| String::from("hr"));
    let dbpass = std::env::var("DBPASS").unwrap_or_else(|_| String::from("hr"));
    Some((dbname, dbuser, dbpass))
}

/// Drops a test object ignoring "does not exist" errors.
pub fn drop_quietly(conn: &oracall::Connection, ddl: &str) {
    let _ = conn.execute_immediate(ddl, ());
}

/// Returns the SYSDBA user and password when the tests may restart the database.
/// Restarts run only when `DBRESTART` is set along with `DBSYSUSER` and `DBSYSPASS`.
pub fn sysdba_params() -> Option<(String, String)> {
    dotenvy::dotenv().ok();
    std::env::var("DBRESTART").ok()?;
    let user = std::env::var("DBSYSUSER").ok()?;
    let pass = std::env::var("DBSYSPASS").ok()?;
    Some((user, pass))
}
