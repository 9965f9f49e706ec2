//! Dequeuing messages

use super::{Agent, Message, OciRaw, Visibility, agent, message::Payload, queue_name, raw_bytes};
use crate::{Connection, Error, Object, Result, env::Env, err::{self, LibError}, oci::*, typeinfo::TypeInfo};
use libc::c_void;
use std::{ffi::CString, fmt, ptr, sync::Arc};

/// What dequeuing does with the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DequeueMode {
    /// Reads the message without locking it
    Browse,
    /// Reads and locks the message for the current transaction
    Locked,
    /// Reads and removes the message
    Remove,
    /// Marks the message as removed without returning its payload
    RemoveNoData,
}

/// Which message is dequeued next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// The first available message that matches the search criteria
    FirstMessage,
    /// The first message of the next transaction group
    NextTransaction,
    /// The next message after the one last dequeued
    NextMessage,
}

/**
    Takes messages from a queue.

    # Example

    ```no_run
    use oracall::{TypeInfoKind, aq::{Dequeue, Navigation}};

    # let oracle = oracall::env()?;
    # let conn = oracle.connect("//localhost/ORCLPDB1", "hr", "hr")?;
    let raw_type = conn.describe_type("SYS.RAW", TypeInfoKind::Type)?;
    let mut deq = Dequeue::new(&conn, &raw_type, "hr.raw_q")?;
    deq.set_navigation(Navigation::FirstMessage)?;
    deq.set_wait_time(Some(1))?;
    while let Some(msg) = deq.get()? {
        let data = msg.raw()?.unwrap_or_default();
        println!("{} bytes", data.len());
    }
    # conn.commit()?;
    # Ok::<(),oracall::Error>(())
    ```
*/
pub struct Dequeue<'a> {
    conn: &'a Connection<'a>,
    info: Arc<TypeInfo>,
    name: CString,
    opts: Descriptor<OCIAQDeqOptions>,
    msg_id: OciRaw,
    agents: Vec<Descriptor<OCIAQAgent>>,
}

impl fmt::Debug for Dequeue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Dequeue").field("queue", &self.name).field("type", &self.info.full_name()).finish()
    }
}

impl<'a> Dequeue<'a> {
    /// Creates a dequeuer of messages of the type `info` describes.
    pub fn new(conn: &'a Connection<'a>, info: &Arc<TypeInfo>, queue: &str) -> Result<Self> {
        let name = queue_name(queue)?;
        let opts = Descriptor::<OCIAQDeqOptions>::new(conn.env_ptr())?;
        Ok( Self {
            conn, info: Arc::clone(info), name, opts,
            msg_id: OciRaw::new(conn.env_ptr(), conn.err_ptr()),
            agents: Vec::new(),
        } )
    }

    fn get_attr<V: attr::AttrGet>(&self, attr_type: u32) -> Result<V> {
        self.opts.get_attr(attr_type, self.conn.err_ptr())
    }

    fn set_attr<V: attr::AttrSet>(&self, attr_type: u32, attr_val: V) -> Result<()> {
        self.opts.set_attr(attr_type, attr_val, self.conn.err_ptr())
    }

    pub fn queue_name(&self) -> &str {
        self.name.to_str().unwrap_or_default()
    }

    pub fn consumer(&self) -> Result<String> {
        self.get_attr(OCI_ATTR_CONSUMER_NAME)
    }

    /// Sets the name of the subscriber whose messages are dequeued.
    pub fn set_consumer(&self, name: &str) -> Result<()> {
        self.set_attr(OCI_ATTR_CONSUMER_NAME, name)
    }

    pub fn correlation(&self) -> Result<String> {
        self.get_attr(OCI_ATTR_CORRELATION)
    }

    /// Dequeues only messages with a matching correlation. `%` and `_` are wildcards.
    pub fn set_correlation(&self, pattern: &str) -> Result<()> {
        self.set_attr(OCI_ATTR_CORRELATION, pattern)
    }

    pub fn relative_msg_id(&self) -> Result<Vec<u8>> {
        let raw : *mut OCIRaw = self.get_attr(OCI_ATTR_DEQ_MSGID)?;
        Ok( raw_bytes(self.conn.env_ptr(), raw).to_vec() )
    }

    /// Dequeues only the message with this id.
    pub fn set_relative_msg_id(&mut self, id: &[u8]) -> Result<()> {
        self.msg_id.assign(id)?;
        let raw = self.msg_id.as_mut_ptr();
        attr_set(
            self.opts.get() as *mut c_void, OCI_DTYPE_AQDEQ_OPTIONS,
            raw as *const c_void, 0, OCI_ATTR_DEQ_MSGID, self.conn.err_ptr()
        )
    }

    pub fn visibility(&self) -> Result<Visibility> {
        let val : u32 = self.get_attr(OCI_ATTR_VISIBILITY)?;
        Ok( Visibility::from_oci(val) )
    }

    pub fn set_visibility(&self, visibility: Visibility) -> Result<()> {
        self.set_attr(OCI_ATTR_VISIBILITY, visibility.oci_value())
    }

    pub fn mode(&self) -> Result<DequeueMode> {
        let val : u32 = self.get_attr(OCI_ATTR_DEQ_MODE)?;
        Ok( match val {
            OCI_DEQ_BROWSE        => DequeueMode::Browse,
            OCI_DEQ_LOCKED        => DequeueMode::Locked,
            OCI_DEQ_REMOVE_NODATA => DequeueMode::RemoveNoData,
            _                     => DequeueMode::Remove,
        } )
    }

    pub fn set_mode(&self, mode: DequeueMode) -> Result<()> {
        let val = match mode {
            DequeueMode::Browse       => OCI_DEQ_BROWSE,
            DequeueMode::Locked       => OCI_DEQ_LOCKED,
            DequeueMode::Remove       => OCI_DEQ_REMOVE,
            DequeueMode::RemoveNoData => OCI_DEQ_REMOVE_NODATA,
        };
        self.set_attr(OCI_ATTR_DEQ_MODE, val)
    }

    pub fn navigation(&self) -> Result<Navigation> {
        let val : u32 = self.get_attr(OCI_ATTR_NAVIGATION)?;
        Ok( match val {
            OCI_DEQ_FIRST_MSG        => Navigation::FirstMessage,
            OCI_DEQ_NEXT_TRANSACTION => Navigation::NextTransaction,
            _                        => Navigation::NextMessage,
        } )
    }

    pub fn set_navigation(&self, navigation: Navigation) -> Result<()> {
        let val = match navigation {
            Navigation::FirstMessage    => OCI_DEQ_FIRST_MSG,
            Navigation::NextTransaction => OCI_DEQ_NEXT_TRANSACTION,
            Navigation::NextMessage     => OCI_DEQ_NEXT_MSG,
        };
        self.set_attr(OCI_ATTR_NAVIGATION, val)
    }

    /// Returns how many seconds `get` waits for a message, `None` when it waits forever.
    pub fn wait_time(&self) -> Result<Option<u32>> {
        let secs : i32 = self.get_attr(OCI_ATTR_WAIT)?;
        Ok( if secs < 0 { None } else { Some(secs as u32) } )
    }

    pub fn set_wait_time(&self, secs: Option<u32>) -> Result<()> {
        let secs = secs.map(|secs| secs.min(i32::MAX as u32) as i32).unwrap_or(OCI_DEQ_WAIT_FOREVER);
        self.set_attr(OCI_ATTR_WAIT, secs)
    }

    /// Sets the agents `listen` waits for.
    pub fn set_agent_list(&mut self, agents: &[Agent]) -> Result<()> {
        self.agents = agent::descriptors(agents, self.conn.env_ptr(), self.conn.err_ptr())?;
        Ok(())
    }

    /**
        Dequeues the next message. Returns `None` when no message arrived before the wait
        time expired.
    */
    pub fn get(&mut self) -> Result<Option<Message<'a>>> {
        let err = self.conn.err_ptr();
        let mut msg = Message::new(self.conn, &self.info)?;
        let mut raw_ind = OCI_IND_NULL;
        let mut payload = ptr::null_mut::<c_void>();
        let mut ind = match msg.payload {
            Payload::Raw { .. } => &mut raw_ind as *mut OCIInd as *mut c_void,
            Payload::Object(_) => ptr::null_mut(),
        };
        let res = unsafe {
            OCIAQDeq(
                self.conn.svc_ptr(), err, self.name.as_ptr() as *const u8,
                self.opts.get(), msg.props_ptr(), self.info.tdo(),
                &mut payload, &mut ind, msg.id.as_mut_ptr(), OCI_DEFAULT
            )
        };
        if res == OCI_ERROR && err::oracle_code(err) == OCI_ERR_AQ_DEQUEUE_TIMEOUT {
            return Ok(None);
        }
        err::check(res, err)?;
        match &mut msg.payload {
            Payload::Raw { data, ind: msg_ind } => {
                *data = OciRaw::from_ptr(self.conn.env_ptr(), err, payload as *mut OCIRaw);
                *msg_ind = raw_ind;
            }
            Payload::Object(obj) => {
                if !payload.is_null() {
                    let not_null = ind.is_null() || unsafe { *(ind as *const OCIInd) } != OCI_IND_NULL;
                    let copy = if not_null {
                        Some( Object::from_instance(self.conn, &self.info, payload, ind) )
                    } else {
                        None
                    };
                    unsafe { OCIObjectFree(self.conn.env_ptr(), err, payload, OCI_OBJECTFREE_FORCE); }
                    *obj = copy.transpose()?;
                }
            }
        }
        log::debug!("dequeued message from {}", self.queue_name());
        Ok(Some(msg))
    }

    /**
        Waits up to `timeout` seconds for a message for any agent of the agent list.
        Returns the agent that has one, or `None` on timeout.
    */
    pub fn listen(&self, timeout: i32) -> Result<Option<Agent>> {
        if self.agents.is_empty() {
            return Err( Error::lib(LibError::ArgInvalidValue("agent list")) );
        }
        let err = self.conn.err_ptr();
        let mut list = agent::pointers(&self.agents);
        let mut found = ptr::null_mut::<OCIAQAgent>();
        let res = unsafe {
            OCIAQListen(self.conn.svc_ptr(), err, list.as_mut_ptr(), list.len() as u32, timeout, &mut found, OCI_DEFAULT)
        };
        if res == OCI_ERROR && err::oracle_code(err) == OCI_ERR_AQ_LISTEN_TIMEOUT {
            return Ok(None);
        }
        err::check(res, err)?;
        if found.is_null() {
            Ok(None)
        } else {
            Agent::from_ptr(found, err).map(Some)
        }
    }
}
