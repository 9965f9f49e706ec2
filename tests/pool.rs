mod common;

use oracall::*;

#[test]
fn session_pool() -> Result<()> {
    let (dbname, dbuser, dbpass) = match common::db_params() { Some(params) => params, None => return Ok(()) };
    let oracle = oracall::env()?;
    let pool = Pool::new(&oracle, PoolKind::Session, &dbname, &dbuser, &dbpass, SessionMode::DEFAULT, 0, 2, 1)?;
    assert_eq!(pool.kind(), PoolKind::Session);
    assert_eq!(pool.max(), 2);
    assert_eq!(oracle.pool_count(), 1);

    {
        let conn1 = pool.get_connection(None)?;
        let conn2 = pool.get_connection(None)?;
        assert_eq!(pool.busy_count()?, 2);
        conn1.ping()?;
        conn2.ping()?;
        assert_eq!(conn1.current_schema()?, dbuser.to_uppercase());
    }
    assert_eq!(pool.busy_count()?, 0);
    assert!(pool.open_count()? <= 2);

    pool.set_statement_cache_size(10)?;
    assert_eq!(pool.statement_cache_size()?, 10);
    drop(pool);
    assert_eq!(oracle.pool_count(), 0);
    Ok(())
}

#[test]
fn connection_pool() -> Result<()> {
    let (dbname, dbuser, dbpass) = match common::db_params() { Some(params) => params, None => return Ok(()) };
    let oracle = oracall::env()?;
    let pool = Pool::new(&oracle, PoolKind::Connection, &dbname, &dbuser, &dbpass, SessionMode::DEFAULT, 1, 4, 1)?;
    assert_eq!(pool.kind(), PoolKind::Connection);

    let workers : Vec<_> = (0..4).map(|_| pool.get_connection(None)).collect::<Result<_>>()?;
    for conn in workers.iter() {
        let mut stmt = conn.prepare("SELECT Count(*) FROM hr.regions")?;
        let mut rows = stmt.query(())?;
        let row = rows.next()?.expect("a row");
        let count : u32 = row.get(0)?.unwrap_or_default();
        assert!(count > 0);
    }
    Ok(())
}

#[test]
fn invalid_pool_size() -> Result<()> {
    let (dbname, dbuser, dbpass) = match common::db_params() { Some(params) => params, None => return Ok(()) };
    let oracle = oracall::env()?;
    let res = Pool::new(&oracle, PoolKind::Session, &dbname, &dbuser, &dbpass, SessionMode::DEFAULT, 0, 0, 1);
    let err = res.expect_err("max pool size is 0");
    assert_eq!(err.internal(), Some(&LibError::MinValue(0, 1)));
    Ok(())
}
