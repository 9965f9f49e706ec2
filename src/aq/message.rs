//! AQ messages

use super::{Agent, OciRaw, agent, raw_bytes};
use crate::{Connection, Date, Error, Object, Result, env::Env, err::LibError, oci::*, typeinfo::TypeInfo};
use libc::c_void;
use std::{fmt, ptr, sync::Arc};

static NULL_IND : OCIInd = OCI_IND_NULL;

/// State of a message as the queue reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageState {
    Ready,
    Waiting,
    Processed,
    Expired,
    Unknown,
}

impl From<i32> for MessageState {
    fn from(val: i32) -> Self {
        match val {
            OCI_MSG_READY     => MessageState::Ready,
            OCI_MSG_WAITING   => MessageState::Waiting,
            OCI_MSG_PROCESSED => MessageState::Processed,
            OCI_MSG_EXPIRED   => MessageState::Expired,
            _                 => MessageState::Unknown,
        }
    }
}

pub(crate) enum Payload<'a> {
    Raw { data: OciRaw, ind: OCIInd },
    Object(Option<Object<'a>>),
}

/// Whether `info` describes the `SYS.RAW` payload type.
pub(crate) fn is_raw_type(info: &TypeInfo) -> bool {
    info.typecode() == OCI_TYPECODE_RAW || (info.schema() == "SYS" && info.name() == "RAW")
}

/**
    Message that is enqueued or dequeued. Its payload is either RAW or an object of
    the type the queue was created with.

    # Example

    ```no_run
    use oracall::{TypeInfoKind, aq::{Enqueue, Message}};

    # let oracle = oracall::env()?;
    # let conn = oracle.connect("//localhost/ORCLPDB1", "hr", "hr")?;
    let raw_type = conn.describe_type("SYS.RAW", TypeInfoKind::Type)?;
    let mut msg = Message::new(&conn, &raw_type)?;
    msg.set_raw(Some(b"order 42"))?;
    msg.set_priority(1)?;
    msg.set_correlation("orders")?;

    let enq = Enqueue::new(&conn, &raw_type, "hr.raw_q")?;
    enq.put(&mut msg)?;
    assert!(!msg.id().is_empty());
    # conn.commit()?;
    # Ok::<(),oracall::Error>(())
    ```
*/
pub struct Message<'a> {
    conn: &'a Connection<'a>,
    info: Arc<TypeInfo>,
    props: Descriptor<OCIAQMsgProperties>,
    pub(crate) payload: Payload<'a>,
    pub(crate) id: OciRaw,
    original_id: OciRaw,
    agents: Vec<Descriptor<OCIAQAgent>>,
}

impl fmt::Debug for Message<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Message")
            .field("type", &self.info.full_name())
            .field("id", &self.id.as_bytes())
            .finish()
    }
}

impl<'a> Message<'a> {
    /// Creates a message with a NULL payload of the type `info` describes.
    pub fn new(conn: &'a Connection<'a>, info: &Arc<TypeInfo>) -> Result<Self> {
        let props = Descriptor::<OCIAQMsgProperties>::new(conn.env_ptr())?;
        let payload = if is_raw_type(info) {
            Payload::Raw { data: OciRaw::new(conn.env_ptr(), conn.err_ptr()), ind: OCI_IND_NULL }
        } else if info.is_collection() || info.tdo().is_null() {
            return Err( Error::lib(LibError::TypeInfoDatatype(info.full_name(), "object type")) );
        } else {
            Payload::Object(None)
        };
        Ok( Self {
            conn, info: Arc::clone(info), props, payload,
            id: OciRaw::new(conn.env_ptr(), conn.err_ptr()),
            original_id: OciRaw::new(conn.env_ptr(), conn.err_ptr()),
            agents: Vec::new(),
        } )
    }

    pub(crate) fn props_ptr(&self) -> *mut OCIAQMsgProperties {
        self.props.get()
    }

    pub fn type_info(&self) -> &Arc<TypeInfo> {
        &self.info
    }

    fn get_attr<V: attr::AttrGet>(&self, attr_type: u32) -> Result<V> {
        self.props.get_attr(attr_type, self.conn.err_ptr())
    }

    fn set_attr<V: attr::AttrSet>(&self, attr_type: u32, attr_val: V) -> Result<()> {
        self.props.set_attr(attr_type, attr_val, self.conn.err_ptr())
    }

    fn incompatible(&self, payload: &str) -> Error {
        Error::lib(LibError::NotCompatible(self.info.full_name(), payload.to_string()))
    }

    /// Returns the RAW payload, `None` if it is NULL.
    pub fn raw(&self) -> Result<Option<&[u8]>> {
        match &self.payload {
            Payload::Raw { ind, .. } if *ind == OCI_IND_NULL => Ok(None),
            Payload::Raw { data, .. } => Ok(Some(data.as_bytes())),
            Payload::Object(_) => Err( self.incompatible("RAW") ),
        }
    }

    /// Sets the RAW payload. `None` makes it NULL.
    pub fn set_raw(&mut self, bytes: Option<&[u8]>) -> Result<()> {
        if let Payload::Object(_) = self.payload {
            return Err( self.incompatible("RAW") );
        }
        if let Payload::Raw { data, ind } = &mut self.payload {
            match bytes {
                Some(bytes) => {
                    data.assign(bytes)?;
                    *ind = OCI_IND_NOTNULL;
                }
                None => *ind = OCI_IND_NULL,
            }
        }
        Ok(())
    }

    /// Returns the object payload, `None` if it is NULL.
    pub fn object(&self) -> Result<Option<&Object<'a>>> {
        match &self.payload {
            Payload::Object(obj) => Ok(obj.as_ref()),
            Payload::Raw { .. } => Err( self.incompatible("object") ),
        }
    }

    /// Sets the object payload to a copy of `obj`. `None` makes it NULL.
    pub fn set_object(&mut self, obj: Option<&Object>) -> Result<()> {
        if let Payload::Raw { .. } = self.payload {
            return Err( self.incompatible("object") );
        }
        let copy = match obj {
            Some(obj) if obj.type_info().tdo() != self.info.tdo() => {
                return Err( Error::lib(LibError::NotCompatible(self.info.full_name(), obj.type_info().full_name())) );
            }
            Some(obj) => Some( Object::from_instance(self.conn, &self.info, obj.instance(), obj.null_struct())? ),
            None => None,
        };
        self.payload = Payload::Object(copy);
        Ok(())
    }

    /// Instance and indicator pointers of the payload as `OCIAQEnq` takes them.
    pub(crate) fn payload_ptrs(&mut self) -> (*mut c_void, *mut c_void) {
        match &mut self.payload {
            Payload::Raw { data, ind } => (data.get() as *mut c_void, ind as *mut OCIInd as *mut c_void),
            Payload::Object(Some(obj)) => (obj.instance(), obj.null_struct()),
            Payload::Object(None) => (ptr::null_mut(), &NULL_IND as *const OCIInd as *mut c_void),
        }
    }

    /// Returns the number of dequeue attempts.
    pub fn attempts(&self) -> Result<i32> {
        self.get_attr(OCI_ATTR_ATTEMPTS)
    }

    /// Returns the number of seconds the message is delayed before it can be dequeued.
    pub fn delay(&self) -> Result<i32> {
        self.get_attr(OCI_ATTR_DELAY)
    }

    /// Sets the enqueue delay in seconds. 0 makes the message available immediately.
    pub fn set_delay(&mut self, secs: i32) -> Result<()> {
        self.set_attr(OCI_ATTR_DELAY, secs.max(OCI_MSG_NO_DELAY))
    }

    /// Returns the time the message was enqueued.
    pub fn enqueue_time(&self) -> Result<Date<'a>> {
        let date : OCIDate = self.get_attr(OCI_ATTR_ENQ_TIME)?;
        Ok( Date::from_oci(date, self.conn) )
    }

    /// Returns the number of seconds the message is available for dequeuing, `None` if it never expires.
    pub fn expiration(&self) -> Result<Option<i32>> {
        let secs : i32 = self.get_attr(OCI_ATTR_EXPIRATION)?;
        Ok( if secs == OCI_MSG_NO_EXPIRATION { None } else { Some(secs) } )
    }

    pub fn set_expiration(&mut self, secs: Option<i32>) -> Result<()> {
        self.set_attr(OCI_ATTR_EXPIRATION, secs.unwrap_or(OCI_MSG_NO_EXPIRATION))
    }

    pub fn state(&self) -> Result<MessageState> {
        let state : i32 = self.get_attr(OCI_ATTR_MSG_STATE)?;
        Ok( MessageState::from(state) )
    }

    /// Returns the priority. Smaller numbers mean higher priority.
    pub fn priority(&self) -> Result<i32> {
        self.get_attr(OCI_ATTR_PRIORITY)
    }

    pub fn set_priority(&mut self, priority: i32) -> Result<()> {
        self.set_attr(OCI_ATTR_PRIORITY, priority)
    }

    /// Returns the id assigned to the message when it was enqueued or dequeued.
    pub fn id(&self) -> &[u8] {
        self.id.as_bytes()
    }

    /// Returns the id of the message this one was propagated from.
    pub fn original_id(&self) -> Result<Vec<u8>> {
        let raw : *mut OCIRaw = self.get_attr(OCI_ATTR_ORIGINAL_MSGID)?;
        Ok( raw_bytes(self.conn.env_ptr(), raw).to_vec() )
    }

    pub fn set_original_id(&mut self, id: &[u8]) -> Result<()> {
        self.original_id.assign(id)?;
        self.set_attr(OCI_ATTR_ORIGINAL_MSGID, self.original_id.get())
    }

    pub fn correlation(&self) -> Result<String> {
        self.get_attr(OCI_ATTR_CORRELATION)
    }

    /// Sets the identifier that dequeuers can select the message by.
    pub fn set_correlation(&mut self, correlation: &str) -> Result<()> {
        self.set_attr(OCI_ATTR_CORRELATION, correlation)
    }

    /// Returns the queue the message is moved to when it cannot be processed.
    pub fn exception_queue(&self) -> Result<String> {
        self.get_attr(OCI_ATTR_EXCEPTION_QUEUE)
    }

    pub fn set_exception_queue(&mut self, queue: &str) -> Result<()> {
        self.set_attr(OCI_ATTR_EXCEPTION_QUEUE, queue)
    }

    pub fn sender(&self) -> Result<Option<Agent>> {
        let sender : *mut OCIAQAgent = self.get_attr(OCI_ATTR_SENDER_ID)?;
        if sender.is_null() {
            Ok(None)
        } else {
            Agent::from_ptr(sender, self.conn.err_ptr()).map(Some)
        }
    }

    pub fn set_sender(&mut self, sender: Option<&Agent>) -> Result<()> {
        match sender {
            Some(sender) => {
                let desc = sender.to_descriptor(self.conn.env_ptr(), self.conn.err_ptr())?;
                self.set_attr(OCI_ATTR_SENDER_ID, desc.get())?;
                self.agents.push(desc);
            }
            None => self.set_attr(OCI_ATTR_SENDER_ID, ptr::null_mut::<OCIAQAgent>())?,
        }
        Ok(())
    }

    /// Sets the recipients of the message, overriding the subscribers of the queue.
    pub fn set_consumers(&mut self, consumers: &[Agent]) -> Result<()> {
        let err = self.conn.err_ptr();
        let descs = agent::descriptors(consumers, self.conn.env_ptr(), err)?;
        let ptrs = agent::pointers(&descs);
        let list = if ptrs.is_empty() { ptr::null() } else { ptrs.as_ptr() as *const c_void };
        attr_set(self.props.get() as *mut c_void, OCI_DTYPE_AQMSG_PROPERTIES, list, ptrs.len() as u32, OCI_ATTR_RECIPIENT_LIST, err)?;
        self.agents.extend(descs);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_states() {
        assert_eq!(MessageState::from(OCI_MSG_READY), MessageState::Ready);
        assert_eq!(MessageState::from(OCI_MSG_EXPIRED), MessageState::Expired);
        assert_eq!(MessageState::from(42), MessageState::Unknown);
    }
}
