// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Transport protocol selector for session lookups and filtering.

#[derive(Debug, thiserror::Error)]
pub enum ProtoError {
    #[error("no such transport protocol: {0}")]
    NoSuchProtocol(u8),
}

/// The transport protocols a NAT64 translator tracks sessions for.
///
/// The discriminants are the IANA IP protocol numbers, which is also how the
/// selector travels on the control channel.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum L4Proto {
    Icmp = 1,
    Tcp = 6,
    Udp = 17,
}

impl TryFrom<u8> for L4Proto {
    type Error = ProtoError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(L4Proto::Icmp),
            6 => Ok(L4Proto::Tcp),
            17 => Ok(L4Proto::Udp),
            v => Err(ProtoError::NoSuchProtocol(v)),
        }
    }
}

impl From<L4Proto> for u8 {
    fn from(proto: L4Proto) -> Self {
        proto as u8
    }
}

impl std::fmt::Display for L4Proto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            L4Proto::Icmp => "ICMP",
            L4Proto::Tcp => "TCP",
            L4Proto::Udp => "UDP",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proto_tag_round_trip() {
        for proto in [L4Proto::Icmp, L4Proto::Tcp, L4Proto::Udp] {
            assert_eq!(L4Proto::try_from(u8::from(proto)).unwrap(), proto);
        }
    }

    #[test]
    fn proto_tag_rejects_unknown() {
        assert!(L4Proto::try_from(0).is_err());
        assert!(L4Proto::try_from(255).is_err());
    }
}
