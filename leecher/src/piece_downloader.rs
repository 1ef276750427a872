use std::time::{Duration, Instant};

use crate::peer::peer_message::MessageId;
use crate::peer::peer_session::{PeerSession, PeerSessionError};

const BLOCK_SIZE: u32 = 16384;
/// Fallback backlog size when the caller doesn't have a configured one.
pub const DEFAULT_MAX_BACKLOG: usize = 5;
const PIECE_DEADLINE: Duration = Duration::from_secs(30);

/// One unit of work handed out by the coordinator's task queue.
#[derive(Debug, Clone)]
pub struct PieceTask {
    pub index: u32,
    pub expected_hash: [u8; 20],
    pub length: u32,
}

/// A downloaded, not-yet-verified piece on its way back to the coordinator.
#[derive(Debug)]
pub struct CompletedPiece {
    pub index: u32,
    pub bytes: Vec<u8>,
}

#[derive(Debug)]
pub enum PieceDownloadError {
    Session(PeerSessionError),
    Timeout,
}

impl From<PeerSessionError> for PieceDownloadError {
    fn from(err: PeerSessionError) -> Self {
        PieceDownloadError::Session(err)
    }
}

/// Downloads a single piece from an already-handshaken session.
///
/// Keeps up to `max_backlog` block requests outstanding at once, refilling
/// the backlog as blocks arrive rather than waiting for a whole chunk to
/// land before requesting more - blocks may arrive out of order and are
/// written at their `begin` offset. While the peer has us choked, no new
/// requests are sent; backlog already in flight is not reset, so a choke
/// can strand outstanding requests that never arrive - only `PIECE_DEADLINE`
/// rescues the piece in that case. Gives up after `PIECE_DEADLINE`.
pub fn download_piece(
    session: &mut PeerSession,
    task: &PieceTask,
    max_backlog: usize,
) -> Result<Vec<u8>, PieceDownloadError> {
    let mut buffer = vec![0u8; task.length as usize];
    let mut requested: u32 = 0;
    let mut received: u32 = 0;
    let mut backlog: usize = 0;
    let deadline = Instant::now() + PIECE_DEADLINE;

    while received < task.length {
        if Instant::now() > deadline {
            return Err(PieceDownloadError::Timeout);
        }

        if !session.choked {
            while backlog < max_backlog && requested < task.length {
                let block_size = std::cmp::min(BLOCK_SIZE, task.length - requested);
                session.send_request(task.index, requested, block_size)?;
                requested += block_size;
                backlog += 1;
            }
        }

        let message = session.read_one_message()?;
        if let MessageId::Piece = message.id {
            let begin = decode_u32(&message.payload[4..8]);
            let block = &message.payload[8..];
            let begin = begin as usize;
            buffer[begin..begin + block.len()].copy_from_slice(block);
            received += block.len() as u32;
            backlog = backlog.saturating_sub(1);
        }
    }

    Ok(buffer)
}

fn decode_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    u32::from_be_bytes(buf)
}
