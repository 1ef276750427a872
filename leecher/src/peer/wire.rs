use std::io::{self, Read, Write};

use super::peer_message::{Message, MessageId};

/// Maximum accepted frame length, guarding against a peer announcing an
/// absurd length prefix and stalling the reader on a multi-gigabyte read.
const MAX_FRAME_LEN: u32 = 16_384 * 10;

#[derive(Debug)]
pub enum WireError {
    Io(io::Error),
    InvalidMessageId(u8),
    WrongLengthForId { id: u8, len: u32 },
    FrameTooLong(u32),
}

impl From<io::Error> for WireError {
    fn from(err: io::Error) -> Self {
        WireError::Io(err)
    }
}

/// Reads one framed peer message from `reader`.
///
/// Validates the length prefix against the id-specific payload shape described
/// by the wire protocol; a mismatch is a framing error, not a best-effort parse.
pub fn read_message<R: Read>(reader: &mut R) -> Result<Message, WireError> {
    let mut len_bytes = [0u8; 4];
    reader.read_exact(&mut len_bytes)?;
    let len = u32::from_be_bytes(len_bytes);

    if len == 0 {
        return Ok(Message::new(MessageId::KeepAlive, vec![]));
    }

    if len > MAX_FRAME_LEN {
        return Err(WireError::FrameTooLong(len));
    }

    let mut id_byte = [0u8; 1];
    reader.read_exact(&mut id_byte)?;

    let id = message_id_from_byte(id_byte[0]).ok_or(WireError::InvalidMessageId(id_byte[0]))?;

    let payload_len = (len - 1) as usize;
    let mut payload = vec![0u8; payload_len];
    reader.read_exact(&mut payload)?;

    validate_payload_len(&id, len)?;

    Ok(Message::new(id, payload))
}

fn validate_payload_len(id: &MessageId, len: u32) -> Result<(), WireError> {
    let expected = match id {
        MessageId::Choke
        | MessageId::Unchoke
        | MessageId::Interested
        | MessageId::NotInterested => Some(1),
        MessageId::Have => Some(5),
        MessageId::Request | MessageId::Cancel => Some(13),
        MessageId::Piece => None, // variable: index + begin + block, len >= 9
        MessageId::Bitfield => None, // variable
        MessageId::KeepAlive => Some(0),
    };

    match expected {
        Some(want) if want != len => Err(WireError::WrongLengthForId {
            id: id.clone() as i8 as u8,
            len,
        }),
        _ => {
            if matches!(id, MessageId::Piece) && len < 9 {
                Err(WireError::WrongLengthForId {
                    id: id.clone() as i8 as u8,
                    len,
                })
            } else {
                Ok(())
            }
        }
    }
}

fn message_id_from_byte(byte: u8) -> Option<MessageId> {
    match byte {
        0 => Some(MessageId::Choke),
        1 => Some(MessageId::Unchoke),
        2 => Some(MessageId::Interested),
        3 => Some(MessageId::NotInterested),
        4 => Some(MessageId::Have),
        5 => Some(MessageId::Bitfield),
        6 => Some(MessageId::Request),
        7 => Some(MessageId::Piece),
        8 => Some(MessageId::Cancel),
        _ => None,
    }
}

/// Writes one framed peer message to `writer`.
pub fn write_message<W: Write>(writer: &mut W, message: &Message) -> Result<(), WireError> {
    if message.id == MessageId::KeepAlive {
        writer.write_all(&0u32.to_be_bytes())?;
        return Ok(());
    }
    writer.write_all(&message.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn s1_keep_alive_round_trips() {
        let mut cursor = Cursor::new(vec![0u8, 0, 0, 0]);
        let msg = read_message(&mut cursor).unwrap();
        assert_eq!(msg.id, MessageId::KeepAlive);

        let mut out = vec![];
        write_message(&mut out, &msg).unwrap();
        assert_eq!(out, vec![0u8, 0, 0, 0]);
    }

    #[test]
    fn s2_have_message() {
        let bytes = [0x00, 0x00, 0x00, 0x05, 0x04, 0x00, 0x00, 0x00, 0xDE];
        let mut cursor = Cursor::new(bytes.to_vec());
        let msg = read_message(&mut cursor).unwrap();
        assert_eq!(msg.id, MessageId::Have);
        assert_eq!(u32::from_be_bytes(msg.payload.clone().try_into().unwrap()), 222);
    }

    #[test]
    fn s3_request_message() {
        let bytes = [
            0x00, 0x00, 0x00, 0x0D, 0x06, 0x00, 0x00, 0x04, 0x65, 0x00, 0x00, 0x0B, 0xA5, 0x00,
            0x00, 0x40, 0xA4,
        ];
        let mut cursor = Cursor::new(bytes.to_vec());
        let msg = read_message(&mut cursor).unwrap();
        assert_eq!(msg.id, MessageId::Request);
        assert_eq!(
            msg.payload,
            vec![0x00, 0x00, 0x04, 0x65, 0x00, 0x00, 0x0B, 0xA5, 0x00, 0x00, 0x40, 0xA4]
        );
    }

    #[test]
    fn s4_cancel_message() {
        let bytes = [
            0x00, 0x00, 0x00, 0x0D, 0x08, 0x00, 0x00, 0x04, 0x65, 0x00, 0x00, 0x0B, 0xA5, 0x00,
            0x00, 0x40, 0xA4,
        ];
        let mut cursor = Cursor::new(bytes.to_vec());
        let msg = read_message(&mut cursor).unwrap();
        assert_eq!(msg.id, MessageId::Cancel);
    }

    #[test]
    fn s5_bitfield_message() {
        let bytes = [0x00, 0x00, 0x00, 0x06, 0x05, 0x51, 0x00, 0x00, 0xDE, 0x00];
        let mut cursor = Cursor::new(bytes.to_vec());
        let msg = read_message(&mut cursor).unwrap();
        assert_eq!(msg.id, MessageId::Bitfield);
        assert_eq!(msg.payload, vec![0x51, 0x00, 0x00, 0xDE, 0x00]);
    }

    #[test]
    fn rejects_unknown_message_id() {
        let bytes = [0x00, 0x00, 0x00, 0x01, 0xFF];
        let mut cursor = Cursor::new(bytes.to_vec());
        assert!(matches!(
            read_message(&mut cursor),
            Err(WireError::InvalidMessageId(0xFF))
        ));
    }

    #[test]
    fn rejects_port_message_id() {
        let bytes = [0x00, 0x00, 0x00, 0x03, 0x09, 0x00, 0x00];
        let mut cursor = Cursor::new(bytes.to_vec());
        assert!(matches!(
            read_message(&mut cursor),
            Err(WireError::InvalidMessageId(0x09))
        ));
    }

    #[test]
    fn rejects_wrong_length_for_have() {
        // have with a 2-byte payload instead of 4
        let bytes = [0x00, 0x00, 0x00, 0x03, 0x04, 0x00, 0x00];
        let mut cursor = Cursor::new(bytes.to_vec());
        assert!(matches!(
            read_message(&mut cursor),
            Err(WireError::WrongLengthForId { id: 4, .. })
        ));
    }

    #[test]
    fn rejects_oversized_frame() {
        let bytes = (MAX_FRAME_LEN + 1).to_be_bytes();
        let mut cursor = Cursor::new(bytes.to_vec());
        assert!(matches!(
            read_message(&mut cursor),
            Err(WireError::FrameTooLong(_))
        ));
    }
}
