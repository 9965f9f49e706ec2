//! Enqueuing messages

use super::{Message, OciRaw, Visibility, queue_name, raw_bytes};
use crate::{Connection, Error, Result, env::Env, err::LibError, oci::*, typeinfo::TypeInfo};
use std::{ffi::CString, fmt, sync::Arc};

/// Position of an enqueued message relative to the other messages of the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceDeviation {
    /// Before the message set by `set_relative_msg_id`
    Before,
    /// Ahead of all other messages
    Top,
}

/**
    Puts messages into a queue.

    # Example

    ```no_run
    use oracall::{Object, TypeInfoKind, aq::{Enqueue, Message, Visibility}};

    # let oracle = oracall::env()?;
    # let conn = oracle.connect("//localhost/ORCLPDB1", "hr", "hr")?;
    let order_type = conn.describe_type("hr.order_t", TypeInfoKind::Type)?;
    let mut order = Object::new(&conn, &order_type)?;
    order.set("order_id", &42)?;

    let mut msg = Message::new(&conn, &order_type)?;
    msg.set_object(Some(&order))?;

    let enq = Enqueue::new(&conn, &order_type, "hr.orders_q")?;
    enq.set_visibility(Visibility::Immediate)?;
    enq.put(&mut msg)?;
    # Ok::<(),oracall::Error>(())
    ```
*/
pub struct Enqueue<'a> {
    conn: &'a Connection<'a>,
    info: Arc<TypeInfo>,
    name: CString,
    opts: Descriptor<OCIAQEnqOptions>,
    relative_id: OciRaw,
}

impl fmt::Debug for Enqueue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Enqueue").field("queue", &self.name).field("type", &self.info.full_name()).finish()
    }
}

impl<'a> Enqueue<'a> {
    /// Creates an enqueuer of messages of the type `info` describes.
    pub fn new(conn: &'a Connection<'a>, info: &Arc<TypeInfo>, queue: &str) -> Result<Self> {
        let name = queue_name(queue)?;
        let opts = Descriptor::<OCIAQEnqOptions>::new(conn.env_ptr())?;
        Ok( Self {
            conn, info: Arc::clone(info), name, opts,
            relative_id: OciRaw::new(conn.env_ptr(), conn.err_ptr()),
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

    pub fn visibility(&self) -> Result<Visibility> {
        let val : u32 = self.get_attr(OCI_ATTR_VISIBILITY)?;
        Ok( Visibility::from_oci(val) )
    }

    pub fn set_visibility(&self, visibility: Visibility) -> Result<()> {
        self.set_attr(OCI_ATTR_VISIBILITY, visibility.oci_value())
    }

    pub fn sequence_deviation(&self) -> Result<Option<SequenceDeviation>> {
        let val : u32 = self.get_attr(OCI_ATTR_SEQUENCE_DEVIATION)?;
        Ok( match val {
            OCI_ENQ_BEFORE => Some(SequenceDeviation::Before),
            OCI_ENQ_TOP    => Some(SequenceDeviation::Top),
            _              => None,
        } )
    }

    pub fn set_sequence_deviation(&self, deviation: SequenceDeviation) -> Result<()> {
        let val = match deviation {
            SequenceDeviation::Before => OCI_ENQ_BEFORE,
            SequenceDeviation::Top    => OCI_ENQ_TOP,
        };
        self.set_attr(OCI_ATTR_SEQUENCE_DEVIATION, val)
    }

    pub fn relative_msg_id(&self) -> Result<Vec<u8>> {
        let raw : *mut OCIRaw = self.get_attr(OCI_ATTR_RELATIVE_MSGID)?;
        Ok( raw_bytes(self.conn.env_ptr(), raw).to_vec() )
    }

    /// Sets the message that `SequenceDeviation::Before` places new messages ahead of.
    pub fn set_relative_msg_id(&mut self, id: &[u8]) -> Result<()> {
        self.relative_id.assign(id)?;
        let raw = self.relative_id.as_mut_ptr();
        attr_set(
            self.opts.get() as *mut libc::c_void, OCI_DTYPE_AQENQ_OPTIONS,
            raw as *const libc::c_void, 0, OCI_ATTR_RELATIVE_MSGID, self.conn.err_ptr()
        )
    }

    /// Enqueues the message. Its `id` is set to the id the queue assigned.
    pub fn put(&self, msg: &mut Message) -> Result<()> {
        if msg.type_info().tdo() != self.info.tdo() {
            return Err( Error::lib(LibError::NotCompatible(self.info.full_name(), msg.type_info().full_name())) );
        }
        let err = self.conn.err_ptr();
        let (mut payload, mut ind) = msg.payload_ptrs();
        let props = msg.props_ptr();
        catch!{err =>
            OCIAQEnq(
                self.conn.svc_ptr(), err, self.name.as_ptr() as *const u8,
                self.opts.get(), props, self.info.tdo(),
                &mut payload, &mut ind, msg.id.as_mut_ptr(), OCI_DEFAULT
            )
        }
        log::debug!("enqueued message into {}", self.queue_name());
        Ok(())
    }
}
