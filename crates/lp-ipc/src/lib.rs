//! Cross-document messaging between the preview host and the embedded document.

mod protocol;

pub use protocol::BridgeMessage;
pub use protocol::ElementPatch;
pub use protocol::SelectedElementDescriptor;
pub use protocol::StylePatch;
pub use protocol::StyleProperty;
pub use protocol::StyleSnapshot;

use lp_core::LivepatchError;
use lp_core::LpResult;
use std::sync::mpsc;
use tracing::debug;
use tracing::warn;

pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 64 * 1024;
pub const HARD_MAX_MESSAGE_BYTES: usize = 16 * 1024 * 1024;
const FRAME_PREFIX_BYTES: usize = 4;

/// Which side of the document boundary an endpoint belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeRole {
    Host,
    Embedded,
}

impl BridgeRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Embedded => "embedded",
        }
    }
}

/// Defines how the two sides communicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    pub role: BridgeRole,
    pub max_message_bytes: usize,
}

impl ChannelConfig {
    pub fn hardened(role: BridgeRole) -> LpResult<Self> {
        Self::with_limit(role, DEFAULT_MAX_MESSAGE_BYTES)
    }

    pub fn with_limit(role: BridgeRole, max_message_bytes: usize) -> LpResult<Self> {
        let config = Self {
            role,
            max_message_bytes,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> LpResult<()> {
        validate_max_message_bytes(self.max_message_bytes)
    }
}

pub fn validate_max_message_bytes(max_message_bytes: usize) -> LpResult<()> {
    if max_message_bytes == 0 {
        return Err(LivepatchError::new(
            "ipc.max_message_bytes_invalid",
            "channel max_message_bytes must be greater than zero",
        ));
    }

    if max_message_bytes > HARD_MAX_MESSAGE_BYTES {
        return Err(LivepatchError::new(
            "ipc.max_message_bytes_too_large",
            "channel max_message_bytes exceeds hard limit (16 MiB)",
        ));
    }

    Ok(())
}

/// In-memory endpoint that applies framing and message-size checks.
///
/// Delivery is fire-and-forget: sends never block and the receiving side
/// drains whatever has arrived when it next gets a turn.
#[derive(Debug)]
pub struct LocalBridgeEndpoint {
    tx: mpsc::Sender<Vec<u8>>,
    rx: mpsc::Receiver<Vec<u8>>,
    config: ChannelConfig,
}

impl LocalBridgeEndpoint {
    pub fn role(&self) -> BridgeRole {
        self.config.role
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    pub fn send(&self, message: &BridgeMessage) -> LpResult<()> {
        let frame = encode_message(message, self.config.max_message_bytes)?;
        debug!(role = self.config.role.as_str(), tag = message.tag(), "bridge send");
        self.send_frame(frame)
    }

    fn send_frame(&self, frame: Vec<u8>) -> LpResult<()> {
        self.tx.send(frame).map_err(|error| {
            LivepatchError::new(
                "ipc.send_failed",
                format!(
                    "failed to send message from {} endpoint: {error}",
                    self.config.role.as_str()
                ),
            )
        })
    }

    /// Returns every recognized message that has arrived, in arrival order.
    ///
    /// Malformed frames and unrecognized envelopes are dropped.
    pub fn drain(&self) -> Vec<BridgeMessage> {
        let mut out = Vec::new();
        while let Ok(frame) = self.rx.try_recv() {
            match decode_message(&frame, self.config.max_message_bytes) {
                Ok(Some(message)) => out.push(message),
                Ok(None) => {}
                Err(error) => warn!(
                    role = self.config.role.as_str(),
                    code = error.code,
                    "dropping malformed bridge frame: {}",
                    error.message
                ),
            }
        }
        out
    }
}

/// Creates paired in-memory bridge endpoints.
pub fn local_channel_pair(
    left: ChannelConfig,
    right: ChannelConfig,
) -> LpResult<(LocalBridgeEndpoint, LocalBridgeEndpoint)> {
    left.validate()?;
    right.validate()?;

    let (left_to_right_tx, left_to_right_rx) = mpsc::channel();
    let (right_to_left_tx, right_to_left_rx) = mpsc::channel();

    Ok((
        LocalBridgeEndpoint {
            tx: left_to_right_tx,
            rx: right_to_left_rx,
            config: left,
        },
        LocalBridgeEndpoint {
            tx: right_to_left_tx,
            rx: left_to_right_rx,
            config: right,
        },
    ))
}

/// Encodes a payload as a length-prefixed frame.
pub fn encode_frame(payload: &[u8], max_message_bytes: usize) -> LpResult<Vec<u8>> {
    if payload.len() > max_message_bytes {
        return Err(LivepatchError::new(
            "ipc.message_too_large",
            format!(
                "payload exceeds max_message_bytes ({} > {})",
                payload.len(),
                max_message_bytes
            ),
        ));
    }

    let len_u32 = u32::try_from(payload.len()).map_err(|_| {
        LivepatchError::new(
            "ipc.message_too_large",
            "payload length does not fit in 32-bit frame prefix",
        )
    })?;

    let mut out = Vec::with_capacity(FRAME_PREFIX_BYTES + payload.len());
    out.extend_from_slice(&len_u32.to_be_bytes());
    out.extend_from_slice(payload);
    Ok(out)
}

/// Decodes a length-prefixed frame and validates payload size.
pub fn decode_frame(frame: &[u8], max_message_bytes: usize) -> LpResult<Vec<u8>> {
    if frame.len() < FRAME_PREFIX_BYTES {
        return Err(LivepatchError::new(
            "ipc.frame_too_short",
            "frame is shorter than the 4-byte length prefix",
        ));
    }

    let mut len_bytes = [0_u8; FRAME_PREFIX_BYTES];
    len_bytes.copy_from_slice(&frame[..FRAME_PREFIX_BYTES]);
    let payload_len = u32::from_be_bytes(len_bytes) as usize;
    if payload_len > max_message_bytes {
        return Err(LivepatchError::new(
            "ipc.message_too_large",
            format!(
                "decoded payload exceeds max_message_bytes ({} > {})",
                payload_len, max_message_bytes
            ),
        ));
    }

    let expected = FRAME_PREFIX_BYTES + payload_len;
    if frame.len() != expected {
        return Err(LivepatchError::new(
            "ipc.frame_length_mismatch",
            format!(
                "frame length mismatch: expected {expected} bytes, got {}",
                frame.len()
            ),
        ));
    }

    Ok(frame[FRAME_PREFIX_BYTES..].to_vec())
}

/// Encodes a typed message as a framed JSON payload.
pub fn encode_message(message: &BridgeMessage, max_message_bytes: usize) -> LpResult<Vec<u8>> {
    let payload = serde_json::to_vec(message).map_err(|error| {
        LivepatchError::new(
            "ipc.message_encode_failed",
            format!("failed to encode {} message: {error}", message.tag()),
        )
    })?;
    encode_frame(&payload, max_message_bytes)
}

/// Decodes a framed message. Frame violations are errors; payloads that are
/// not a recognized envelope decode to `None`.
pub fn decode_message(frame: &[u8], max_message_bytes: usize) -> LpResult<Option<BridgeMessage>> {
    let payload = decode_frame(frame, max_message_bytes)?;
    Ok(parse_message(&payload))
}

/// Parses a JSON envelope, returning `None` for anything unrecognized.
pub fn parse_message(payload: &[u8]) -> Option<BridgeMessage> {
    match serde_json::from_slice::<BridgeMessage>(payload) {
        Ok(message) => Some(message),
        Err(error) => {
            debug!(%error, bytes = payload.len(), "ignoring unrecognized bridge message");
            None
        }
    }
}
