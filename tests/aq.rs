mod common;

use oracall::*;
use oracall::aq::{self, Agent, Dequeue, DequeueMode, Enqueue, Message, MessageState, Navigation, QueueOptions, QueueTableOptions, Visibility};

fn drop_queue(conn: &Connection) {
    let _ = aq::stop_queue(conn, "test_raw_q", true, true, false);
    let _ = aq::drop_queue(conn, "test_raw_q");
    let _ = aq::drop_queue_table(conn, "test_raw_qt", true);
}

#[test]
fn raw_messages() -> Result<()> {
    let (dbname, dbuser, dbpass) = match common::db_params() { Some(params) => params, None => return Ok(()) };
    let oracle = oracall::env()?;
    let conn = oracle.connect(&dbname, &dbuser, &dbpass)?;

    drop_queue(&conn);
    if let Err(err) = aq::create_queue_table(&conn, "test_raw_qt", "RAW", &QueueTableOptions::default()) {
        // the test user cannot administer queues
        if err.code() == 1031 || err.code() == 6550 {
            return Ok(());
        }
        return Err(err);
    }
    aq::create_queue(&conn, "test_raw_q", "test_raw_qt", &QueueOptions { max_retries: 3, ..Default::default() })?;
    aq::start_queue(&conn, "test_raw_q", true, true)?;

    let raw_type = conn.describe_type("SYS.RAW", TypeInfoKind::Type)?;
    let enq = Enqueue::new(&conn, &raw_type, "test_raw_q")?;
    enq.set_visibility(Visibility::OnCommit)?;
    assert_eq!(enq.visibility()?, Visibility::OnCommit);

    let mut ids = Vec::new();
    for (i, text) in ["first", "second", "third"].iter().enumerate() {
        let mut msg = Message::new(&conn, &raw_type)?;
        assert!(msg.raw()?.is_none());
        msg.set_raw(Some(text.as_bytes()))?;
        msg.set_priority(i as i32)?;
        msg.set_correlation("test")?;
        enq.put(&mut msg)?;
        assert!(!msg.id().is_empty());
        ids.push(msg.id().to_vec());
    }
    conn.commit()?;

    let mut deq = Dequeue::new(&conn, &raw_type, "test_raw_q")?;
    deq.set_navigation(Navigation::FirstMessage)?;
    deq.set_mode(DequeueMode::Browse)?;
    deq.set_wait_time(Some(0))?;
    assert_eq!(deq.wait_time()?, Some(0));
    let msg = deq.get()?.expect("first message");
    assert_eq!(msg.raw()?, Some(&b"first"[..]));
    assert_eq!(msg.state()?, MessageState::Ready);
    assert_eq!(msg.correlation()?, "test");

    deq.set_mode(DequeueMode::Remove)?;
    deq.set_correlation("test")?;
    let mut texts = Vec::new();
    while let Some(msg) = deq.get()? {
        assert!(ids.iter().any(|id| id == msg.id()));
        let text = msg.raw()?.map(|data| String::from_utf8_lossy(data).into_owned());
        texts.push(text.unwrap_or_default());
        deq.set_navigation(Navigation::NextMessage)?;
    }
    texts.sort();
    assert_eq!(texts, ["first", "second", "third"]);
    conn.commit()?;

    drop(deq);
    drop(enq);
    drop_queue(&conn);
    Ok(())
}

fn drop_object_queue(conn: &Connection) {
    let _ = aq::stop_queue(conn, "test_obj_q", true, true, false);
    let _ = aq::drop_queue(conn, "test_obj_q");
    let _ = aq::drop_queue_table(conn, "test_obj_qt", true);
    common::drop_quietly(conn, "DROP TYPE test_aq_msg");
}

#[test]
fn object_messages() -> Result<()> {
    let (dbname, dbuser, dbpass) = match common::db_params() { Some(params) => params, None => return Ok(()) };
    let oracle = oracall::env()?;
    let conn = oracle.connect(&dbname, &dbuser, &dbpass)?;

    drop_object_queue(&conn);
    conn.execute_immediate("CREATE TYPE test_aq_msg AS OBJECT (id NUMBER, body VARCHAR2(100))", ())?;
    if let Err(err) = aq::create_queue_table(&conn, "test_obj_qt", "test_aq_msg", &QueueTableOptions::default()) {
        drop_object_queue(&conn);
        if err.code() == 1031 || err.code() == 6550 {
            return Ok(());
        }
        return Err(err);
    }
    aq::create_queue(&conn, "test_obj_q", "test_obj_qt", &QueueOptions::default())?;
    aq::start_queue(&conn, "test_obj_q", true, true)?;

    let msg_type = conn.describe_type("test_aq_msg", TypeInfoKind::Type)?;
    let mut deq = Dequeue::new(&conn, &msg_type, "test_obj_q")?;
    deq.set_wait_time(Some(1))?;
    deq.set_visibility(Visibility::Immediate)?;

    // nothing to dequeue yet
    assert!(deq.get()?.is_none());
    let agent = Agent::new("", Some("test_obj_q"));
    assert!(agent.name().is_none());
    assert!(deq.listen(1).is_err());
    deq.set_agent_list(&[agent])?;
    assert!(deq.listen(1)?.is_none());

    let mut payload = Object::new(&conn, &msg_type)?;
    payload.set("id", &42)?;
    payload.set("body", "hello")?;
    let mut msg = Message::new(&conn, &msg_type)?;
    assert!(msg.object()?.is_none());
    assert!(msg.raw().is_err());
    msg.set_object(Some(&payload))?;

    let enq = Enqueue::new(&conn, &msg_type, "test_obj_q")?;
    enq.put(&mut msg)?;
    conn.commit()?;

    let found = deq.listen(5)?.expect("agent with a message");
    let address = found.address().unwrap_or_default().to_uppercase();
    assert!(address.contains("TEST_OBJ_Q"));

    let msg = deq.get()?.expect("object message");
    let obj = msg.object()?.expect("payload");
    let id : Option<i32> = obj.get("id")?;
    let body : Option<String> = obj.get("body")?;
    assert_eq!(id, Some(42));
    assert_eq!(body.as_deref(), Some("hello"));
    assert!(deq.get()?.is_none());
    conn.commit()?;

    drop(deq);
    drop(enq);
    drop_object_queue(&conn);
    Ok(())
}
