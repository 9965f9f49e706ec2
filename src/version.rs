//! OCI client and server versions, and the features they gate.

use std::fmt;

/// Version of the OCI client library or of the database server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OciVersion {
    major: u32,
    minor: u32,
    update: u32,
}

impl OciVersion {
    pub const fn new(major: u32, minor: u32, update: u32) -> Self {
        Self { major, minor, update }
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }

    /// Returns the release update (or the revision for pre-18 releases).
    pub fn update(&self) -> u32 {
        self.update
    }

    /**
    Extracts the version from a server banner such as
    `Oracle Database 19c Enterprise Edition Release 19.0.0.0.0 - Production Version 19.3.0.0.0`.

    The last dotted number in the banner is used, as newer servers report the
    release update there.

    # Example

    ```
    use oracall::OciVersion;

    let banner = "Oracle Database 11g Express Edition Release 11.2.0.2.0 - 64bit Production";
    assert_eq!(OciVersion::from_banner(banner), Some(OciVersion::new(11, 2, 0)));
    ```
    */
    pub fn from_banner(banner: &str) -> Option<Self> {
        banner.split(|c: char| c.is_whitespace() || c == ',' || c == '-')
            .filter_map(Self::parse_dotted)
            .last()
    }

    /**
    Decodes the packed release number reported by `OCIServerRelease2`.

    Releases 18 and later pack the release update into the second byte, older
    releases pack a 4-bit maintenance release followed by an 8-bit revision.

    # Example

    ```
    use oracall::OciVersion;

    assert_eq!(OciVersion::from_server_release(0x0C10_0200), OciVersion::new(12, 1, 0));
    assert_eq!(OciVersion::from_server_release(0x130E_0000), OciVersion::new(19, 14, 0));
    ```
    */
    pub fn from_server_release(release: u32) -> Self {
        let major = (release >> 24) & 0xFF;
        if major >= 18 {
            Self::new(major, (release >> 16) & 0xFF, (release >> 12) & 0x0F)
        } else {
            Self::new(major, (release >> 20) & 0x0F, (release >> 12) & 0xFF)
        }
    }

    fn parse_dotted(word: &str) -> Option<Self> {
        let mut parts = word.split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        let update = parts.next()?.parse().ok()?;
        Some( Self::new(major, minor, update) )
    }
}

impl fmt::Display for OciVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.update)
    }
}

/// Functionality that depends on the version of the client library or the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    WideCharset,
    Timestamps,
    DirPathDateCache,
    StatementCaching,
    LobSize64,
    RemoteDbStartup,
    HighAvailability,
    Xa,
    ImplicitResults,
    ExtendedPlsqlTypes,
    CallTimeout,
}

impl Feature {
    /// Returns the lowest version that provides the feature.
    pub fn min_version(self) -> OciVersion {
        match self {
            Feature::WideCharset        => OciVersion::new(9, 0, 0),
            Feature::Timestamps         => OciVersion::new(9, 0, 0),
            Feature::DirPathDateCache   => OciVersion::new(9, 2, 0),
            Feature::StatementCaching   => OciVersion::new(9, 2, 0),
            Feature::LobSize64          => OciVersion::new(10, 1, 0),
            Feature::Xa                 => OciVersion::new(10, 1, 0),
            Feature::RemoteDbStartup    => OciVersion::new(10, 2, 0),
            Feature::HighAvailability   => OciVersion::new(10, 2, 0),
            Feature::ImplicitResults    => OciVersion::new(12, 1, 0),
            Feature::ExtendedPlsqlTypes => OciVersion::new(12, 1, 0),
            Feature::CallTimeout        => OciVersion::new(18, 1, 0),
        }
    }

    pub fn is_available(self, version: OciVersion) -> bool {
        version >= self.min_version()
    }

    pub fn name(self) -> &'static str {
        match self {
            Feature::WideCharset        => "Wide character set",
            Feature::Timestamps         => "Timestamps and intervals",
            Feature::DirPathDateCache   => "Direct path date cache",
            Feature::StatementCaching   => "Statement caching",
            Feature::LobSize64          => "Lobs larger than 4GB",
            Feature::RemoteDbStartup    => "Remote database startup/shutdown",
            Feature::HighAvailability   => "High availability",
            Feature::Xa                 => "XA connections",
            Feature::ImplicitResults    => "Implicit results",
            Feature::ExtendedPlsqlTypes => "Extended PL/SQL types",
            Feature::CallTimeout        => "Call timeout",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_are_ordered() {
        assert!(OciVersion::new(12, 1, 0) > OciVersion::new(11, 2, 4));
        assert!(OciVersion::new(19, 0, 0) < OciVersion::new(19, 3, 0));
        assert_eq!(OciVersion::new(10, 2, 0), OciVersion::new(10, 2, 0));
        assert_eq!(OciVersion::default().to_string(), "0.0.0");
        assert_eq!(OciVersion::new(21, 3, 0).to_string(), "21.3.0");
    }

    #[test]
    fn packed_server_releases() {
        assert_eq!(OciVersion::from_server_release(0x0C10_0200), OciVersion::new(12, 1, 0));
        assert_eq!(OciVersion::from_server_release(0x0B20_0400), OciVersion::new(11, 2, 0));
        assert_eq!(OciVersion::from_server_release(0x0C20_1000), OciVersion::new(12, 2, 1));
        assert_eq!(OciVersion::from_server_release(0x1303_0000), OciVersion::new(19, 3, 0));
        assert_eq!(OciVersion::from_server_release(0x130E_1000), OciVersion::new(19, 14, 1));
        assert_eq!(OciVersion::from_server_release(0x1500_0000), OciVersion::new(21, 0, 0));
    }

    #[test]
    fn banner_parsing() {
        let banner = "Oracle Database 19c Enterprise Edition Release 19.0.0.0.0 - Production\nVersion 19.3.0.0.0";
        assert_eq!(OciVersion::from_banner(banner), Some(OciVersion::new(19, 3, 0)));

        let banner = "Oracle Database 10g Release 10.2.0.1.0 - Production";
        assert_eq!(OciVersion::from_banner(banner), Some(OciVersion::new(10, 2, 0)));

        assert_eq!(OciVersion::from_banner("no version here"), None);
    }

    #[test]
    fn features_follow_versions() {
        let v11 = OciVersion::new(11, 2, 0);
        assert!(Feature::LobSize64.is_available(v11));
        assert!(Feature::StatementCaching.is_available(v11));
        assert!(!Feature::ImplicitResults.is_available(v11));
        assert!(!Feature::CallTimeout.is_available(OciVersion::new(12, 2, 0)));
        assert!(Feature::CallTimeout.is_available(OciVersion::new(18, 1, 0)));
        assert_eq!(Feature::Xa.to_string(), "XA connections");
    }
}
