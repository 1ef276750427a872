use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use super::bt_peer::BtPeer;
use super::handshake::{FromHandshakeError, Handshake};
use super::peer_message::{Bitfield, Message, MessageId, Request};
use super::wire::{read_message, write_message, WireError};

#[derive(Debug)]
pub enum PeerSessionError {
    CouldNotConnectToPeer(std::io::Error),
    ErrorSettingStreamTimeout(std::io::Error),
    Handshake(FromHandshakeError),
    InfoHashMismatch,
    InvalidPieceIndex(u32),
    Wire(WireError),
}

impl From<WireError> for PeerSessionError {
    fn from(err: WireError) -> Self {
        PeerSessionError::Wire(err)
    }
}

/// One TCP connection to one peer, downloading pieces on behalf of a worker.
///
/// Owns its connection, its view of the peer's bitfield, and the choke state
/// of that view. Nothing here is shared across threads.
pub struct PeerSession {
    stream: TcpStream,
    peer_has: Bitfield,
    pub choked: bool,
}

impl PeerSession {
    /// Connects to `peer`, performs the handshake, and reads the peer's
    /// opening messages until its bitfield (or lack of one) is known.
    pub fn connect(
        peer: &BtPeer,
        local_peer_id: &str,
        info_hash: &[u8],
        num_pieces: u32,
        read_write_timeout: Duration,
    ) -> Result<Self, PeerSessionError> {
        let addr = format!("{}:{}", peer.ip, peer.port);
        let mut stream =
            TcpStream::connect(&addr).map_err(PeerSessionError::CouldNotConnectToPeer)?;

        stream
            .set_read_timeout(Some(read_write_timeout))
            .map_err(PeerSessionError::ErrorSettingStreamTimeout)?;
        stream
            .set_write_timeout(Some(read_write_timeout))
            .map_err(PeerSessionError::ErrorSettingStreamTimeout)?;

        let handshake = Handshake::new(info_hash.to_vec(), local_peer_id.as_bytes().to_vec());
        stream
            .write_all(&handshake.as_bytes())
            .map_err(PeerSessionError::CouldNotConnectToPeer)?;

        let mut handshake_buf = [0u8; 68];
        stream
            .read_exact(&mut handshake_buf)
            .map_err(PeerSessionError::CouldNotConnectToPeer)?;
        let their_handshake =
            Handshake::from_bytes(&handshake_buf).map_err(PeerSessionError::Handshake)?;

        if their_handshake.info_hash != info_hash {
            return Err(PeerSessionError::InfoHashMismatch);
        }

        let mut session = PeerSession {
            stream,
            peer_has: Bitfield::zeroed(num_pieces),
            choked: true,
        };

        session.receive_opening_messages()?;

        Ok(session)
    }

    /// Accepts zero or more leading `have` messages, then a `bitfield`, or
    /// tolerates the first message being neither (peer has nothing yet).
    fn receive_opening_messages(&mut self) -> Result<(), PeerSessionError> {
        loop {
            let message = read_message(&mut self.stream)?;
            match message.id {
                MessageId::Have => {
                    let index = decode_u32(&message.payload);
                    self.peer_has.set_bit(index, true);
                }
                MessageId::Bitfield => {
                    self.peer_has = Bitfield::new(message.payload);
                    return Ok(());
                }
                _ => {
                    self.handle_message(&message);
                    return Ok(());
                }
            }
        }
    }

    /// Returns whether the peer has the given piece.
    ///
    /// Fails with `InvalidPieceIndex` rather than panicking when `index` is
    /// out of range for the peer's bitfield.
    pub fn has_piece(&self, index: u32) -> Result<bool, PeerSessionError> {
        let byte_index = (index / 8) as usize;
        if byte_index >= self.peer_has.bitfield.len() {
            return Err(PeerSessionError::InvalidPieceIndex(index));
        }
        Ok(self.peer_has.has_piece(index))
    }

    pub fn set_piece(&mut self, index: u32) {
        self.peer_has.set_bit(index, true);
    }

    pub fn send_interested(&mut self) -> Result<(), PeerSessionError> {
        self.send(Message::new(MessageId::Interested, vec![]))
    }

    pub fn send_unchoke(&mut self) -> Result<(), PeerSessionError> {
        self.send(Message::new(MessageId::Unchoke, vec![]))
    }

    pub fn send_not_interested(&mut self) -> Result<(), PeerSessionError> {
        self.send(Message::new(MessageId::NotInterested, vec![]))
    }

    pub fn send_request(
        &mut self,
        index: u32,
        begin: u32,
        length: u32,
    ) -> Result<(), PeerSessionError> {
        let payload = Request::new(index, begin, length).as_bytes();
        self.send(Message::new(MessageId::Request, payload))
    }

    pub fn send_cancel(
        &mut self,
        index: u32,
        begin: u32,
        length: u32,
    ) -> Result<(), PeerSessionError> {
        let payload = Request::new(index, begin, length).as_bytes();
        self.send(Message::new(MessageId::Cancel, payload))
    }

    pub fn send_have(&mut self, index: u32) -> Result<(), PeerSessionError> {
        self.send(Message::new(MessageId::Have, index.to_be_bytes().to_vec()))
    }

    fn send(&mut self, message: Message) -> Result<(), PeerSessionError> {
        write_message(&mut self.stream, &message)?;
        Ok(())
    }

    /// Reads and handles exactly one message from the peer, returning it so
    /// the caller (the piece downloader) can react to `piece` arrivals.
    pub fn read_one_message(&mut self) -> Result<Message, PeerSessionError> {
        let message = read_message(&mut self.stream)?;
        self.handle_message(&message);
        Ok(message)
    }

    fn handle_message(&mut self, message: &Message) {
        match message.id {
            MessageId::Unchoke => self.choked = false,
            MessageId::Choke => self.choked = true,
            MessageId::Have => {
                let index = decode_u32(&message.payload);
                self.peer_has.set_bit(index, true);
            }
            MessageId::Bitfield => self.peer_has = Bitfield::new(message.payload.clone()),
            _ => {}
        }
    }
}

fn decode_u32(payload: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&payload[0..4]);
    u32::from_be_bytes(buf)
}
