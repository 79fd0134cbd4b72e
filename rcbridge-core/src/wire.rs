//! Link frame codec: a 1-byte command tag followed by a fixed payload layout.
//!
//! The medium is lossy and decoding is the trust boundary against malformed
//! or replayed bursts: every decode error means "drop the frame, change no
//! state".

use crate::channel::{MAX_CHANNEL, MIN_CHANNEL};
use crate::peer::KEY_LEN;

/// Largest frame the radio substrate accepts, tag byte included.
pub const MTU: usize = 250;
/// Largest application payload: MTU minus the tag byte.
pub const MAX_PAYLOAD: usize = MTU - 1;

const TAG_SEARCH: u8 = 1;
const TAG_SEARCH_REPLY: u8 = 2;
const TAG_HOP_REQUEST: u8 = 3;
const TAG_HOP_REPLY: u8 = 4;
const TAG_DATA: u8 = 5;

/// One link frame. `Data` borrows its payload from the receive buffer, which
/// the substrate owns only for the duration of the upcall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame<'a> {
    /// Pre-pair discovery beacon, broadcast by the sender.
    Search,
    /// Receiver's answer to `Search`, carrying a freshly generated link key.
    SearchReply { key: [u8; KEY_LEN] },
    /// Sender asks the receiver to propose a new channel.
    HopRequest,
    /// Receiver's proposed channel; neither side has committed yet.
    HopReply { channel: u8 },
    /// Opaque application bytes.
    Data { payload: &'a [u8] },
}

impl<'a> Frame<'a> {
    /// Wrap an application payload, enforcing the 1..=249 byte window.
    pub fn data(payload: &'a [u8]) -> Result<Self, FrameEncodeError> {
        if payload.is_empty() {
            return Err(FrameEncodeError::EmptyPayload);
        }
        if payload.len() > MAX_PAYLOAD {
            return Err(FrameEncodeError::TooLarge(payload.len()));
        }
        Ok(Frame::Data { payload })
    }

    /// Serialize into a fresh buffer, tag byte first. Frames built through
    /// [`Frame::data`] or [`decode`] always fit the MTU.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Frame::Search => vec![TAG_SEARCH],
            Frame::SearchReply { key } => {
                let mut out = Vec::with_capacity(1 + KEY_LEN);
                out.push(TAG_SEARCH_REPLY);
                out.extend_from_slice(key);
                out
            }
            Frame::HopRequest => vec![TAG_HOP_REQUEST],
            Frame::HopReply { channel } => vec![TAG_HOP_REPLY, *channel],
            Frame::Data { payload } => {
                let mut out = Vec::with_capacity(1 + payload.len());
                out.push(TAG_DATA);
                out.extend_from_slice(payload);
                out
            }
        }
    }
}

/// Decode one frame from a receive buffer.
pub fn decode(bytes: &[u8]) -> Result<Frame<'_>, FrameDecodeError> {
    let (&tag, rest) = bytes.split_first().ok_or(FrameDecodeError::Empty)?;
    match tag {
        TAG_SEARCH if rest.is_empty() => Ok(Frame::Search),
        TAG_SEARCH_REPLY if rest.len() == KEY_LEN => {
            let mut key = [0u8; KEY_LEN];
            key.copy_from_slice(rest);
            Ok(Frame::SearchReply { key })
        }
        TAG_HOP_REQUEST if rest.is_empty() => Ok(Frame::HopRequest),
        TAG_HOP_REPLY if rest.len() == 1 => {
            let channel = rest[0];
            if !(MIN_CHANNEL..=MAX_CHANNEL).contains(&channel) {
                return Err(FrameDecodeError::BadChannel(channel));
            }
            Ok(Frame::HopReply { channel })
        }
        TAG_DATA if rest.len() <= MAX_PAYLOAD => Ok(Frame::Data { payload: rest }),
        TAG_SEARCH | TAG_SEARCH_REPLY | TAG_HOP_REQUEST | TAG_HOP_REPLY | TAG_DATA => {
            Err(FrameDecodeError::BadLength {
                tag,
                len: bytes.len(),
            })
        }
        _ => Err(FrameDecodeError::UnknownTag(tag)),
    }
}

/// Error building an outbound data frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FrameEncodeError {
    #[error("payload is empty")]
    EmptyPayload,
    #[error("payload of {0} bytes exceeds the limit")]
    TooLarge(usize),
}

/// Error decoding a frame. The caller drops the frame without a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FrameDecodeError {
    #[error("empty frame")]
    Empty,
    #[error("unknown command tag {0}")]
    UnknownTag(u8),
    #[error("length {len} does not match command tag {tag}")]
    BadLength { tag: u8, len: usize },
    #[error("proposed channel {0} is out of band")]
    BadChannel(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_all_commands() {
        let key = [7u8; KEY_LEN];
        let payload = [1u8, 2, 3];
        let frames = [
            Frame::Search,
            Frame::SearchReply { key },
            Frame::HopRequest,
            Frame::HopReply { channel: 11 },
            Frame::Data { payload: &payload },
        ];
        for frame in frames {
            let bytes = frame.encode();
            assert_eq!(decode(&bytes).unwrap(), frame);
        }
    }

    #[test]
    fn data_frame_layout() {
        let payload = vec![0xABu8; MAX_PAYLOAD];
        let bytes = Frame::data(&payload).unwrap().encode();
        assert_eq!(bytes.len(), MTU);
        assert_eq!(bytes[0], TAG_DATA);
        assert_eq!(&bytes[1..], &payload[..]);
    }

    #[test]
    fn data_constructor_enforces_window() {
        assert_eq!(Frame::data(&[]), Err(FrameEncodeError::EmptyPayload));
        let big = vec![0u8; MAX_PAYLOAD + 1];
        assert_eq!(Frame::data(&big), Err(FrameEncodeError::TooLarge(250)));
        assert!(Frame::data(&[0u8]).is_ok());
    }

    #[test]
    fn rejects_empty_and_unknown() {
        assert_eq!(decode(&[]), Err(FrameDecodeError::Empty));
        assert_eq!(decode(&[0]), Err(FrameDecodeError::UnknownTag(0)));
        assert_eq!(decode(&[6, 1, 2]), Err(FrameDecodeError::UnknownTag(6)));
    }

    #[test]
    fn rejects_wrong_lengths() {
        assert_eq!(
            decode(&[TAG_SEARCH, 0]),
            Err(FrameDecodeError::BadLength { tag: 1, len: 2 })
        );
        assert_eq!(
            decode(&[TAG_HOP_REQUEST, 0]),
            Err(FrameDecodeError::BadLength { tag: 3, len: 2 })
        );
        assert_eq!(
            decode(&[TAG_SEARCH_REPLY, 0, 1, 2]),
            Err(FrameDecodeError::BadLength { tag: 2, len: 4 })
        );
        let mut long = vec![0u8; 2 + KEY_LEN];
        long[0] = TAG_SEARCH_REPLY;
        assert!(matches!(
            decode(&long),
            Err(FrameDecodeError::BadLength { tag: 2, .. })
        ));
        assert_eq!(
            decode(&[TAG_HOP_REPLY]),
            Err(FrameDecodeError::BadLength { tag: 4, len: 1 })
        );
        assert_eq!(
            decode(&[TAG_HOP_REPLY, 7, 7]),
            Err(FrameDecodeError::BadLength { tag: 4, len: 3 })
        );
    }

    #[test]
    fn rejects_out_of_band_channel() {
        assert_eq!(
            decode(&[TAG_HOP_REPLY, 0]),
            Err(FrameDecodeError::BadChannel(0))
        );
        assert_eq!(
            decode(&[TAG_HOP_REPLY, 14]),
            Err(FrameDecodeError::BadChannel(14))
        );
        assert_eq!(
            decode(&[TAG_HOP_REPLY, 1]).unwrap(),
            Frame::HopReply { channel: 1 }
        );
        assert_eq!(
            decode(&[TAG_HOP_REPLY, 13]).unwrap(),
            Frame::HopReply { channel: 13 }
        );
    }

    #[test]
    fn data_accepts_empty_payload_on_receive() {
        // A bare DATA tag decodes to an empty delivery; only the send path
        // enforces a non-empty payload.
        assert_eq!(decode(&[TAG_DATA]).unwrap(), Frame::Data { payload: &[] });
    }

    #[test]
    fn rejects_oversized_data() {
        let mut big = vec![0u8; MTU + 1];
        big[0] = TAG_DATA;
        assert_eq!(
            decode(&big),
            Err(FrameDecodeError::BadLength { tag: 5, len: 251 })
        );
    }
}
