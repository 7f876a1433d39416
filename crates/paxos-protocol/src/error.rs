/// Protocol-level errors for the Paxos core.
///
/// Wraps transport errors and adds protocol-specific variants
/// (serialization, fragment framing).
#[derive(Debug, thiserror::Error)]
pub enum PaxosProtocolError {
    #[error("transport error: {0}")]
    Transport(#[from] paxos_transport::PaxosTransportError),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("invalid fragment from {from}: {reason}")]
    InvalidFragment {
        from: paxos_transport::Member,
        reason: String,
    },
}

impl From<rmp_serde::encode::Error> for PaxosProtocolError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        PaxosProtocolError::Serialization(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for PaxosProtocolError {
    fn from(e: rmp_serde::decode::Error) -> Self {
        PaxosProtocolError::Deserialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_invalid_fragment() {
        let err = PaxosProtocolError::InvalidFragment {
            from: "127.0.0.1:2440".parse().unwrap(),
            reason: "part 5 of 3".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid fragment from 127.0.0.1:2440: part 5 of 3"
        );
    }

    #[test]
    fn test_display_transport() {
        let err: PaxosProtocolError =
            paxos_transport::PaxosTransportError::InvalidMember("x".into()).into();
        assert_eq!(err.to_string(), "transport error: invalid member address: x");
    }

    #[test]
    fn test_decode_error_converts() {
        let err: PaxosProtocolError = rmp_serde::from_slice::<u64>(b"\xc1")
            .unwrap_err()
            .into();
        assert!(matches!(err, PaxosProtocolError::Deserialization(_)));
    }
}
