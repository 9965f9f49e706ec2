//! The ROWID data type identifies a particular row in a database table.

use crate::{Result, oci::*};
use std::fmt;

/// Converts a ROWID descriptor to its text form.
pub(crate) fn to_string(rowid: *mut OCIRowid, err: *mut OCIError) -> Result<String> {
    let mut txt = [0u8; 64];
    let mut len = txt.len() as u16;
    catch!{err =>
        OCIRowidToChar(rowid, txt.as_mut_ptr(), &mut len, err)
    }
    Ok( String::from_utf8_lossy(&txt[..len as usize]).into_owned() )
}

/**
    Represents ROWID.

    Fetched ROWIDs are kept in their text form, which can be used as an argument
    in SQL statements to query a row at the given ROWID.
*/
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RowID(String);

impl RowID {
    pub fn new(txt: impl Into<String>) -> Self {
        Self(txt.into())
    }

    pub(crate) fn from_descriptor(rowid: *mut OCIRowid, err: *mut OCIError) -> Result<Self> {
        to_string(rowid, err).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RowID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RowID {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rowid_text() {
        let rowid = RowID::new("AAAR5qAAEAAAAlWAAA");
        assert_eq!(rowid.to_string(), "AAAR5qAAEAAAAlWAAA");
        assert_eq!(rowid.as_str().len(), 18);
        assert!(RowID::default().is_empty());
    }
}
