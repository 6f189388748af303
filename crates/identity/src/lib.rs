//! Address parsing and canonicalisation.
//!
//! Addresses have the shape `user[:device]@server`. A device index names one
//! linked device of an account; quote participants and mention targets must
//! address the person, so [`resolve`] strips it.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Server for individual user accounts.
pub const USER_SERVER: &str = "s.whatsapp.net";
/// Server for group chats.
pub const GROUP_SERVER: &str = "g.us";
/// Legacy user server still seen in older payloads.
pub const LEGACY_USER_SERVER: &str = "c.us";
/// Server for broadcast lists and status updates.
pub const BROADCAST_SERVER: &str = "broadcast";
/// Server for hidden (linked-id) user identities.
pub const HIDDEN_USER_SERVER: &str = "lid";
/// Server for channels.
pub const NEWSLETTER_SERVER: &str = "newsletter";

const KNOWN_SERVERS: &[&str] = &[
    USER_SERVER,
    GROUP_SERVER,
    LEGACY_USER_SERVER,
    BROADCAST_SERVER,
    HIDDEN_USER_SERVER,
    NEWSLETTER_SERVER,
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid address {raw:?}: {reason}")]
    InvalidAddress { raw: String, reason: &'static str },
}

impl Error {
    fn invalid(raw: &str, reason: &'static str) -> Self {
        Self::InvalidAddress {
            raw: raw.to_string(),
            reason,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// A parsed chat or user address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address {
    user: String,
    device: Option<u16>,
    server: String,
}

impl Address {
    /// Build an address without a device index.
    pub fn new(user: impl Into<String>, server: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            device: None,
            server: server.into(),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn device(&self) -> Option<u16> {
        self.device
    }

    pub fn is_group(&self) -> bool {
        self.server == GROUP_SERVER
    }

    /// The same address with its device index removed.
    #[must_use]
    pub fn to_non_device(&self) -> Self {
        Self {
            user: self.user.clone(),
            device: None,
            server: self.server.clone(),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.device {
            Some(device) => write!(f, "{}:{}@{}", self.user, device, self.server),
            None => write!(f, "{}@{}", self.user, self.server),
        }
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        parse(&value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

/// Parse a raw address, keeping any device index.
pub fn parse(raw: &str) -> Result<Address> {
    let trimmed = raw.trim();
    let Some((local, server)) = trimmed.rsplit_once('@') else {
        return Err(Error::invalid(raw, "missing server"));
    };
    if server.is_empty() {
        return Err(Error::invalid(raw, "empty server"));
    }
    if !KNOWN_SERVERS.contains(&server) {
        return Err(Error::invalid(raw, "unrecognized server"));
    }

    let (user, device) = match local.split_once(':') {
        Some((user, device)) => {
            let device = device
                .parse::<u16>()
                .map_err(|_| Error::invalid(raw, "device suffix is not a number"))?;
            (user, Some(device))
        },
        None => (local, None),
    };
    if user.is_empty() {
        return Err(Error::invalid(raw, "empty user"));
    }

    Ok(Address {
        user: user.to_string(),
        device,
        server: server.to_string(),
    })
}

/// Parse a raw address and strip its device index.
///
/// Idempotent: resolving the display form of a resolved address yields the
/// same address.
pub fn resolve(raw: &str) -> Result<Address> {
    parse(raw).map(|address| address.to_non_device())
}

/// Address of the individual account behind a phone number.
pub fn from_phone_number(phone: &str) -> Result<Address> {
    let digits = phone.trim().trim_start_matches('+');
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::invalid(phone, "phone number must be digits"));
    }
    Ok(Address::new(digits, USER_SERVER))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case("555:2@s.whatsapp.net", "555@s.whatsapp.net")]
    #[case("555@s.whatsapp.net", "555@s.whatsapp.net")]
    #[case("123-456@g.us", "123-456@g.us")]
    #[case("  4917:12@lid ", "4917@lid")]
    #[case("status@broadcast", "status@broadcast")]
    fn resolve_strips_device(#[case] raw: &str, #[case] expected: &str) {
        let resolved = resolve(raw).unwrap();
        assert_eq!(resolved.to_string(), expected);
        assert_eq!(resolved.device(), None);
        assert_eq!(resolve(&resolved.to_string()).unwrap(), resolved);
    }

    #[rstest]
    #[case("")]
    #[case("555")]
    #[case("@s.whatsapp.net")]
    #[case(":3@s.whatsapp.net")]
    #[case("555@")]
    #[case("555@example.com")]
    #[case("555:abc@s.whatsapp.net")]
    fn invalid_addresses(#[case] raw: &str) {
        assert!(matches!(resolve(raw), Err(Error::InvalidAddress { .. })));
    }

    #[test]
    fn parse_keeps_device() {
        let address = parse("555:2@s.whatsapp.net").unwrap();
        assert_eq!(address.user(), "555");
        assert_eq!(address.device(), Some(2));
        assert_eq!(address.server(), USER_SERVER);
        assert_eq!(address.to_string(), "555:2@s.whatsapp.net");
    }

    #[test]
    fn group_detection() {
        assert!(parse("123@g.us").unwrap().is_group());
        assert!(!parse("123@s.whatsapp.net").unwrap().is_group());
    }

    #[test]
    fn phone_number_addresses() {
        assert_eq!(
            from_phone_number("+4915112345").unwrap().to_string(),
            "4915112345@s.whatsapp.net"
        );
        assert!(from_phone_number("49-151").is_err());
        assert!(from_phone_number("").is_err());
    }

    #[test]
    fn serde_uses_display_form() {
        let address = parse("555:2@s.whatsapp.net").unwrap();
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, "\"555:2@s.whatsapp.net\"");
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, address);
        assert!(serde_json::from_str::<Address>("\"nope\"").is_err());
    }
}
