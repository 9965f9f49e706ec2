//! AQ agents

use crate::{Result, oci::*};
use libc::c_void;

/**
    Producer or consumer of queued messages.

    # Example

    ```
    use oracall::aq::Agent;

    let agent = Agent::new("ORDERS_APP", None);
    assert_eq!(agent.name(), Some("ORDERS_APP"));
    assert_eq!(agent.address(), None);
    ```
*/
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Agent {
    name: Option<String>,
    address: Option<String>,
}

impl Agent {
    /// Creates an agent. `address` is the queue of a remote agent, `schema.queue@dblink`.
    pub fn new(name: &str, address: Option<&str>) -> Self {
        Self {
            name: Some(name.to_string()).filter(|name| !name.is_empty()),
            address: address.filter(|addr| !addr.is_empty()).map(String::from),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: Option<&str>) {
        self.name = name.filter(|name| !name.is_empty()).map(String::from);
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn set_address(&mut self, address: Option<&str>) {
        self.address = address.filter(|addr| !addr.is_empty()).map(String::from);
    }

    /// Reads the agent from a descriptor that OCI owns.
    pub(crate) fn from_ptr(agent: *mut OCIAQAgent, err: *mut OCIError) -> Result<Self> {
        let name : String = attr::get(OCI_ATTR_AGENT_NAME, OCI_DTYPE_AQAGENT, agent as *const c_void, err)?;
        let address : String = attr::get(OCI_ATTR_AGENT_ADDRESS, OCI_DTYPE_AQAGENT, agent as *const c_void, err)?;
        Ok( Self::new(&name, Some(&address)) )
    }

    /// Creates the OCI descriptor of the agent.
    pub(crate) fn to_descriptor(&self, env: *mut OCIEnv, err: *mut OCIError) -> Result<Descriptor<OCIAQAgent>> {
        let desc = Descriptor::<OCIAQAgent>::new(env)?;
        if let Some(name) = self.name.as_deref() {
            desc.set_attr(OCI_ATTR_AGENT_NAME, name, err)?;
        }
        if let Some(address) = self.address.as_deref() {
            desc.set_attr(OCI_ATTR_AGENT_ADDRESS, address, err)?;
        }
        Ok(desc)
    }
}

/// Creates descriptors for `agents`, keeping them alive in the returned vector.
pub(crate) fn descriptors(agents: &[Agent], env: *mut OCIEnv, err: *mut OCIError) -> Result<Vec<Descriptor<OCIAQAgent>>> {
    agents.iter().map(|agent| agent.to_descriptor(env, err)).collect()
}

pub(crate) fn pointers(descs: &[Descriptor<OCIAQAgent>]) -> Vec<*mut OCIAQAgent> {
    descs.iter().map(|desc| desc.get()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_parts_are_none() {
        let mut agent = Agent::new("", Some(""));
        assert_eq!(agent.name(), None);
        assert_eq!(agent.address(), None);
        agent.set_name(Some("RECEIVER"));
        agent.set_address(Some("hr.orders_q@remote"));
        assert_eq!(agent, Agent::new("RECEIVER", Some("hr.orders_q@remote")));
    }
}
