//! Queue administration through `DBMS_AQADM`

use crate::{Connection, Result};

/// Kind of a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueueType {
    #[default]
    Normal,
    /// Holds the messages that could not be processed
    Exception,
    NonPersistent,
}

impl QueueType {
    fn value(self) -> u32 {
        match self {
            QueueType::Normal        => 0,
            QueueType::Exception     => 1,
            QueueType::NonPersistent => 2,
        }
    }
}

/// Whether the messages of a transaction are dequeued as a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageGrouping {
    #[default]
    None,
    Transactional,
}

/// Which messages `purge_queue_table` removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryMode {
    Buffered,
    Persistent,
    #[default]
    All,
}

impl DeliveryMode {
    fn value(self) -> u32 {
        match self {
            DeliveryMode::Buffered   => 1,
            DeliveryMode::Persistent => 2,
            DeliveryMode::All        => 3,
        }
    }
}

/// Options of `create_queue`.
#[derive(Debug, Clone, Default)]
pub struct QueueOptions<'s> {
    pub queue_type: QueueType,
    /// Number of dequeue attempts before a message is moved to the exception queue
    pub max_retries: u32,
    /// Seconds before a failed message can be dequeued again
    pub retry_delay: u32,
    /// Seconds a dequeued message is kept in the queue table
    pub retention_time: u32,
    pub dependency_tracking: bool,
    pub comment: &'s str,
}

/// Options of `create_queue_table`.
#[derive(Debug, Clone, Default)]
pub struct QueueTableOptions<'s> {
    pub storage_clause: &'s str,
    pub sort_list: &'s str,
    pub multiple_consumers: bool,
    pub message_grouping: MessageGrouping,
    pub comment: &'s str,
    pub primary_instance: u32,
    pub secondary_instance: u32,
    pub compatible: &'s str,
}

/**
    Creates a queue in an existing queue table.

    # Example

    ```no_run
    use oracall::aq::{self, QueueOptions, QueueTableOptions};

    # let oracle = oracall::env()?;
    # let conn = oracle.connect("//localhost/ORCLPDB1", "hr", "hr")?;
    aq::create_queue_table(&conn, "hr.raw_qt", "RAW", &QueueTableOptions::default())?;
    aq::create_queue(&conn, "hr.raw_q", "hr.raw_qt", &QueueOptions { max_retries: 3, ..Default::default() })?;
    aq::start_queue(&conn, "hr.raw_q", true, true)?;
    # Ok::<(),oracall::Error>(())
    ```
*/
pub fn create_queue(conn: &Connection, queue: &str, queue_table: &str, opts: &QueueOptions) -> Result<()> {
    conn.execute_immediate("
        DECLARE
            v_dependency_tracking BOOLEAN := FALSE;
        BEGIN
            IF :dependency_tracking = 1 THEN
                v_dependency_tracking := TRUE;
            END IF;
            DBMS_AQADM.CREATE_QUEUE(
                queue_name          => :queue_name,
                queue_table         => :queue_table,
                queue_type          => :queue_type,
                max_retries         => :max_retries,
                retry_delay         => :retry_delay,
                retention_time      => :retention_time,
                dependency_tracking => v_dependency_tracking,
                comment             => :queue_comment
            );
        END;
    ", (
        ("queue_name", queue),
        ("queue_table", queue_table),
        ("queue_type", opts.queue_type.value()),
        ("max_retries", opts.max_retries),
        ("retry_delay", opts.retry_delay),
        ("retention_time", opts.retention_time),
        ("dependency_tracking", opts.dependency_tracking as i32),
        ("queue_comment", opts.comment),
    ))?;
    log::debug!("created queue {}", queue);
    Ok(())
}

/// Changes the retry and retention settings of a queue.
pub fn alter_queue(conn: &Connection, queue: &str, max_retries: u32, retry_delay: u32, retention_time: u32, comment: &str) -> Result<()> {
    conn.execute_immediate("
        BEGIN
            DBMS_AQADM.ALTER_QUEUE(
                queue_name     => :queue_name,
                max_retries    => :max_retries,
                retry_delay    => :retry_delay,
                retention_time => :retention_time,
                comment        => :queue_comment
            );
        END;
    ", (
        ("queue_name", queue),
        ("max_retries", max_retries),
        ("retry_delay", retry_delay),
        ("retention_time", retention_time),
        ("queue_comment", comment),
    ))?;
    Ok(())
}

pub fn drop_queue(conn: &Connection, queue: &str) -> Result<()> {
    conn.execute_immediate("
        BEGIN
            DBMS_AQADM.DROP_QUEUE(queue_name => :queue_name);
        END;
    ", ("queue_name", queue))?;
    log::debug!("dropped queue {}", queue);
    Ok(())
}

/// Enables enqueuing and/or dequeuing.
pub fn start_queue(conn: &Connection, queue: &str, enqueue: bool, dequeue: bool) -> Result<()> {
    conn.execute_immediate("
        DECLARE
            v_enqueue BOOLEAN := :enqueue = 1;
            v_dequeue BOOLEAN := :dequeue = 1;
        BEGIN
            DBMS_AQADM.START_QUEUE(
                queue_name => :queue_name,
                enqueue    => v_enqueue,
                dequeue    => v_dequeue
            );
        END;
    ", (
        ("enqueue", enqueue as i32),
        ("dequeue", dequeue as i32),
        ("queue_name", queue),
    ))?;
    Ok(())
}

/// Disables enqueuing and/or dequeuing. With `wait` the call waits for pending transactions.
pub fn stop_queue(conn: &Connection, queue: &str, enqueue: bool, dequeue: bool, wait: bool) -> Result<()> {
    conn.execute_immediate("
        DECLARE
            v_enqueue BOOLEAN := :enqueue = 1;
            v_dequeue BOOLEAN := :dequeue = 1;
            v_wait    BOOLEAN := :wait = 1;
        BEGIN
            DBMS_AQADM.STOP_QUEUE(
                queue_name => :queue_name,
                enqueue    => v_enqueue,
                dequeue    => v_dequeue,
                wait       => v_wait
            );
        END;
    ", (
        ("enqueue", enqueue as i32),
        ("dequeue", dequeue as i32),
        ("wait", wait as i32),
        ("queue_name", queue),
    ))?;
    Ok(())
}

/// Creates a queue table for messages of `payload_type`, which is `RAW` or an object type name.
pub fn create_queue_table(conn: &Connection, queue_table: &str, payload_type: &str, opts: &QueueTableOptions) -> Result<()> {
    let grouping = match opts.message_grouping {
        MessageGrouping::None          => 0u32,
        MessageGrouping::Transactional => 1u32,
    };
    conn.execute_immediate("
        DECLARE
            v_multiple_consumers BOOLEAN := :multiple_consumers = 1;
        BEGIN
            DBMS_AQADM.CREATE_QUEUE_TABLE(
                queue_table        => :queue_table,
                queue_payload_type => :payload_type,
                storage_clause     => :storage_clause,
                sort_list          => :sort_list,
                multiple_consumers => v_multiple_consumers,
                message_grouping   => :message_grouping,
                comment            => :queue_comment,
                primary_instance   => :primary_instance,
                secondary_instance => :secondary_instance,
                compatible         => :compatible
            );
        END;
    ", (
        ("multiple_consumers", opts.multiple_consumers as i32),
        ("queue_table", queue_table),
        ("payload_type", payload_type),
        ("storage_clause", opts.storage_clause),
        ("sort_list", opts.sort_list),
        ("message_grouping", grouping),
        ("queue_comment", opts.comment),
        ("primary_instance", opts.primary_instance),
        ("secondary_instance", opts.secondary_instance),
        ("compatible", opts.compatible),
    ))?;
    log::debug!("created queue table {}", queue_table);
    Ok(())
}

pub fn alter_queue_table(conn: &Connection, queue_table: &str, comment: &str, primary_instance: u32, secondary_instance: u32) -> Result<()> {
    conn.execute_immediate("
        BEGIN
            DBMS_AQADM.ALTER_QUEUE_TABLE(
                queue_table        => :queue_table,
                comment            => :queue_comment,
                primary_instance   => :primary_instance,
                secondary_instance => :secondary_instance
            );
        END;
    ", (
        ("queue_table", queue_table),
        ("queue_comment", comment),
        ("primary_instance", primary_instance),
        ("secondary_instance", secondary_instance),
    ))?;
    Ok(())
}

/// Drops a queue table. With `force` its queues are stopped and dropped first.
pub fn drop_queue_table(conn: &Connection, queue_table: &str, force: bool) -> Result<()> {
    conn.execute_immediate("
        DECLARE
            v_force BOOLEAN := :force = 1;
        BEGIN
            DBMS_AQADM.DROP_QUEUE_TABLE(
                queue_table => :queue_table,
                force       => v_force
            );
        END;
    ", (("force", force as i32), ("queue_table", queue_table)))?;
    log::debug!("dropped queue table {}", queue_table);
    Ok(())
}

/// Removes the messages that match `condition` (a WHERE clause over the `qtview` alias, or empty for all).
pub fn purge_queue_table(conn: &Connection, queue_table: &str, condition: &str, block: bool, mode: DeliveryMode) -> Result<()> {
    conn.execute_immediate("
        DECLARE
            v_purge_options DBMS_AQADM.AQ$_PURGE_OPTIONS_T;
        BEGIN
            v_purge_options.block := :block = 1;
            v_purge_options.delivery_mode := :delivery_mode;
            DBMS_AQADM.PURGE_QUEUE_TABLE(
                queue_table     => :queue_table,
                purge_condition => :purge_condition,
                purge_options   => v_purge_options
            );
        END;
    ", (
        ("block", block as i32),
        ("delivery_mode", mode.value()),
        ("queue_table", queue_table),
        ("purge_condition", condition),
    ))?;
    Ok(())
}

/// Upgrades or downgrades a queue table to the `compatible` release.
pub fn migrate_queue_table(conn: &Connection, queue_table: &str, compatible: &str) -> Result<()> {
    conn.execute_immediate("
        BEGIN
            DBMS_AQADM.MIGRATE_QUEUE_TABLE(
                queue_table => :queue_table,
                compatible  => :compatible
            );
        END;
    ", (("queue_table", queue_table), ("compatible", compatible)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_defaults() {
        let opts = QueueOptions::default();
        assert_eq!(opts.queue_type.value(), 0);
        assert!(!opts.dependency_tracking);
        assert_eq!(DeliveryMode::default().value(), 3);
        assert_eq!(QueueTableOptions::default().message_grouping, MessageGrouping::None);
    }
}
