/*!
Message format definitions for the PQC key exchange.

Every message is a 5-byte header followed by its payload:
- Message Type (1 byte): see [`MessageType`]
- Payload Length (4 bytes, big-endian): length of the payload in bytes

There is no padding, so an encoded message is always `5 + length` bytes.
Decoding checks the type tag and the length bound before any payload
buffer is allocated. [`read_message_within`] bounds a whole message
receive by one deadline, so a peer trickling bytes cannot stretch it.
*/

use std::time::{Duration, Instant};

use byteorder::{BigEndian, ByteOrder};
use tracing::{debug, trace};

use crate::core::constants::sizes::{HEADER_SIZE, LENGTH_OFFSET};
use crate::core::error::{Error, FrameError, Result};
use crate::core::message::types::MessageType;
use crate::core::transport::{timeout_millis, Connection};
use crate::frame_err;

/// Protocol message header (5 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    /// Message type
    pub msg_type: MessageType,
    /// Payload length
    pub length: u32,
}

impl MessageHeader {
    /// Create a new message header
    pub fn new(msg_type: MessageType, length: u32) -> Self {
        Self { msg_type, length }
    }

    /// Convert the header to bytes (5 bytes)
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0] = self.msg_type.as_u8();
        BigEndian::write_u32(&mut bytes[LENGTH_OFFSET..HEADER_SIZE], self.length);
        bytes
    }

    /// Parse a header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return frame_err!(FrameError::Truncated {
                expected: HEADER_SIZE,
                actual: bytes.len(),
            });
        }

        let msg_type = match MessageType::from_u8(bytes[0]) {
            Some(t) => t,
            None => return frame_err!(FrameError::UnknownMessageType(bytes[0])),
        };
        let length = BigEndian::read_u32(&bytes[LENGTH_OFFSET..HEADER_SIZE]);

        Ok(Self { msg_type, length })
    }

    /// Check the declared length against `max_payload_len`
    pub fn checked_length(&self, max_payload_len: usize) -> Result<usize> {
        let length = self.length as usize;
        if length > max_payload_len {
            return frame_err!(FrameError::LengthOutOfRange {
                length: u64::from(self.length),
                max: max_payload_len,
            });
        }
        Ok(length)
    }
}

/// One framed unit on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    msg_type: MessageType,
    payload: Vec<u8>,
}

impl Message {
    /// Create a message; the payload must fit the 32-bit length field
    pub fn new(msg_type: MessageType, payload: Vec<u8>) -> Result<Self> {
        if u32::try_from(payload.len()).is_err() {
            return frame_err!(FrameError::LengthOutOfRange {
                length: payload.len() as u64,
                max: u32::MAX as usize,
            });
        }
        Ok(Self { msg_type, payload })
    }

    /// Get the message type
    pub fn msg_type(&self) -> MessageType {
        self.msg_type
    }

    /// Get the payload
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Take the payload
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    /// Header describing this message
    pub fn header(&self) -> MessageHeader {
        // Length was bounded by `new`
        MessageHeader::new(self.msg_type, self.payload.len() as u32)
    }

    /// Total encoded size
    pub fn encoded_len(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }

    /// Encode the message into a fresh buffer
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(&self.header().to_bytes());
        out.extend_from_slice(&self.payload);
        out
    }

    /// Decode one message from the front of `bytes`.
    ///
    /// Returns the message and the number of bytes consumed.
    pub fn decode(bytes: &[u8], max_payload_len: usize) -> Result<(Self, usize)> {
        let header = MessageHeader::from_bytes(bytes)?;
        let length = header.checked_length(max_payload_len)?;

        let available = bytes.len() - HEADER_SIZE;
        if available < length {
            return frame_err!(FrameError::Truncated {
                expected: length,
                actual: available,
            });
        }

        let mut payload = allocate(length)?;
        payload.extend_from_slice(&bytes[HEADER_SIZE..HEADER_SIZE + length]);
        Ok((
            Self {
                msg_type: header.msg_type,
                payload,
            },
            HEADER_SIZE + length,
        ))
    }
}

/// Allocate an empty buffer with exactly `len` bytes of capacity
fn allocate(len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len).map_err(|_| Error::AllocationFailed)?;
    Ok(buf)
}

/// Point in time by which a whole message must have arrived
#[derive(Debug, Clone, Copy)]
struct Deadline {
    at: Instant,
    timeout: Duration,
}

impl Deadline {
    fn after(timeout: Duration) -> Self {
        Self {
            at: Instant::now() + timeout,
            timeout,
        }
    }

    /// Time left, or `Timeout` once it has passed
    fn remaining(&self) -> Result<Duration> {
        let left = self.at.saturating_duration_since(Instant::now());
        if left.is_zero() {
            return Err(self.expired());
        }
        Ok(left)
    }

    fn expired(&self) -> Error {
        Error::Timeout(timeout_millis(Some(self.timeout)))
    }
}

/// Receive exactly `len` bytes; a closed stream before that is `Truncated`
fn receive_exact<C: Connection + ?Sized>(
    conn: &mut C,
    len: usize,
    deadline: Option<&Deadline>,
) -> Result<Vec<u8>> {
    let mut buf = allocate(len)?;
    while buf.len() < len {
        if let Some(deadline) = deadline {
            conn.set_receive_timeout(Some(deadline.remaining()?))?;
        }
        let chunk = conn
            .receive(len - buf.len())
            .map_err(|err| match (err, deadline) {
                (Error::Timeout(_), Some(deadline)) => deadline.expired(),
                (err, _) => err,
            })?;
        if chunk.is_empty() {
            return frame_err!(FrameError::Truncated {
                expected: len,
                actual: buf.len(),
            });
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

fn receive_message<C: Connection + ?Sized>(
    conn: &mut C,
    max_payload_len: usize,
    deadline: Option<&Deadline>,
) -> Result<Message> {
    let header_bytes = receive_exact(conn, HEADER_SIZE, deadline)?;
    let header = MessageHeader::from_bytes(&header_bytes)?;
    let length = header.checked_length(max_payload_len)?;
    trace!(msg_type = %header.msg_type, length, "received header");

    let payload = receive_exact(conn, length, deadline)?;
    debug!(msg_type = %header.msg_type, length, "received message");
    Ok(Message {
        msg_type: header.msg_type,
        payload,
    })
}

/// Read one message from a connection, honouring whatever receive
/// timeout the connection already carries
pub fn read_message<C: Connection + ?Sized>(conn: &mut C, max_payload_len: usize) -> Result<Message> {
    receive_message(conn, max_payload_len, None)
}

/// Read one message that must arrive in full within `timeout`.
///
/// The bound covers the header and the payload together, not each
/// individual receive. `None` waits forever. The connection's receive
/// timeout is left at `timeout` afterwards.
pub fn read_message_within<C: Connection + ?Sized>(
    conn: &mut C,
    max_payload_len: usize,
    timeout: Option<Duration>,
) -> Result<Message> {
    let Some(timeout) = timeout else {
        conn.set_receive_timeout(None)?;
        return receive_message(conn, max_payload_len, None);
    };

    let deadline = Deadline::after(timeout);
    let result = receive_message(conn, max_payload_len, Some(&deadline));
    let restored = conn.set_receive_timeout(Some(timeout));
    let message = result?;
    restored?;
    Ok(message)
}

/// Write one message to a connection
pub fn write_message<C: Connection + ?Sized>(conn: &mut C, message: &Message) -> Result<()> {
    conn.send(&message.encode())?;
    debug!(msg_type = %message.msg_type, length = message.payload.len(), "sent message");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transport::memory::MemoryConnection;
    use std::thread;

    const MAX: usize = 1568;

    #[test]
    fn test_header_layout() {
        let header = MessageHeader::new(MessageType::PublicKey, 1184);
        assert_eq!(header.to_bytes(), [0x01, 0x00, 0x00, 0x04, 0xA0]);

        let parsed = MessageHeader::from_bytes(&header.to_bytes()).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_encode_is_header_plus_payload() -> Result<()> {
        let message = Message::new(MessageType::Ciphertext, vec![0xAB; 1088])?;
        let encoded = message.encode();

        assert_eq!(encoded.len(), 5 + 1088);
        assert_eq!(encoded[0], 0x02);
        assert_eq!(&encoded[1..5], &1088u32.to_be_bytes());
        assert!(encoded[5..].iter().all(|&b| b == 0xAB));
        Ok(())
    }

    #[test]
    fn test_decode_round_trip() -> Result<()> {
        let message = Message::new(MessageType::PublicKey, (0..=255).collect())?;
        let (decoded, consumed) = Message::decode(&message.encode(), MAX)?;
        assert_eq!(decoded, message);
        assert_eq!(consumed, message.encoded_len());
        Ok(())
    }

    #[test]
    fn test_decode_truncated_header() {
        let result = Message::decode(&[0x01, 0x00, 0x00], MAX);
        assert!(matches!(
            result,
            Err(Error::Frame(FrameError::Truncated { expected: 5, actual: 3 }))
        ));
    }

    #[test]
    fn test_decode_truncated_payload() -> Result<()> {
        let message = Message::new(MessageType::PublicKey, vec![7u8; 1184])?;
        let encoded = message.encode();
        let result = Message::decode(&encoded[..5 + 1000], MAX);
        assert!(matches!(
            result,
            Err(Error::Frame(FrameError::Truncated { expected: 1184, actual: 1000 }))
        ));
        Ok(())
    }

    #[test]
    fn test_decode_unknown_type() {
        let result = Message::decode(&[0x09, 0, 0, 0, 0], MAX);
        assert!(matches!(result, Err(Error::Frame(FrameError::UnknownMessageType(0x09)))));
    }

    #[test]
    fn test_decode_length_out_of_range() {
        // Header alone is enough to reject; no payload follows
        let result = Message::decode(&[0x01, 0xFF, 0xFF, 0xFF, 0xFF], MAX);
        assert!(matches!(
            result,
            Err(Error::Frame(FrameError::LengthOutOfRange { length: 0xFFFF_FFFF, max: MAX }))
        ));
    }

    #[test]
    fn test_ack_decodes_with_empty_payload() -> Result<()> {
        let (decoded, consumed) = Message::decode(&[0x03, 0, 0, 0, 0], MAX)?;
        assert_eq!(decoded.msg_type(), MessageType::Ack);
        assert!(decoded.payload().is_empty());
        assert_eq!(consumed, 5);
        Ok(())
    }

    #[test]
    fn test_stream_round_trip() -> Result<()> {
        let (mut a, mut b) = MemoryConnection::pair();
        let first = Message::new(MessageType::PublicKey, vec![1u8; 800])?;
        let second = Message::new(MessageType::Ciphertext, vec![2u8; 768])?;

        write_message(&mut a, &first)?;
        write_message(&mut a, &second)?;

        assert_eq!(read_message(&mut b, MAX)?, first);
        assert_eq!(read_message(&mut b, MAX)?, second);
        Ok(())
    }

    #[test]
    fn test_stream_truncated_payload() -> Result<()> {
        let (mut a, mut b) = MemoryConnection::pair();
        let mut bytes = MessageHeader::new(MessageType::PublicKey, 1184).to_bytes().to_vec();
        bytes.extend_from_slice(&[0u8; 1000]);
        a.send(&bytes)?;
        a.close()?;

        let result = read_message(&mut b, MAX);
        assert!(matches!(
            result,
            Err(Error::Frame(FrameError::Truncated { expected: 1184, actual: 1000 }))
        ));
        Ok(())
    }

    #[test]
    fn test_stream_rejects_oversized_before_payload() -> Result<()> {
        let (mut a, mut b) = MemoryConnection::pair();
        a.send(&MessageHeader::new(MessageType::Ciphertext, 1_000_000).to_bytes())?;

        // No payload was ever sent, so reaching the payload read would block
        let result = read_message(&mut b, MAX);
        assert!(matches!(
            result,
            Err(Error::Frame(FrameError::LengthOutOfRange { length: 1_000_000, .. }))
        ));
        Ok(())
    }

    #[test]
    fn test_deadline_covers_whole_message() -> Result<()> {
        let (mut a, mut b) = MemoryConnection::pair();
        let mut bytes = MessageHeader::new(MessageType::PublicKey, 1184).to_bytes().to_vec();
        bytes.extend_from_slice(&[0u8; 1184]);

        // Each byte lands well inside the timeout, the message as a whole does not
        let trickle = thread::spawn(move || {
            for byte in bytes {
                thread::sleep(Duration::from_millis(60));
                if a.send(&[byte]).is_err() {
                    break;
                }
            }
        });

        let started = Instant::now();
        let result = read_message_within(&mut b, MAX, Some(Duration::from_millis(100)));
        assert!(matches!(result, Err(Error::Timeout(100))));
        assert!(started.elapsed() < Duration::from_secs(1));

        drop(b);
        trickle.join().expect("trickle thread panicked");
        Ok(())
    }

    #[test]
    fn test_read_within_timeout() -> Result<()> {
        let (mut a, mut b) = MemoryConnection::pair();
        let message = Message::new(MessageType::Ciphertext, vec![3u8; 768])?;
        write_message(&mut a, &message)?;

        let timeout = Some(Duration::from_secs(5));
        assert_eq!(read_message_within(&mut b, MAX, timeout)?, message);
        Ok(())
    }
}
