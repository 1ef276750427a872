use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use logger::logger_sender::LoggerSender;

use crate::integrity::verify_piece;
use crate::peer::bt_peer::BtPeer;
use crate::peer::peer_session::PeerSession;
use crate::piece_downloader::{download_piece, CompletedPiece, PieceDownloadError, PieceTask};
use crate::queue::WorkQueue;
use crate::torrent_parser::torrent::Torrent;

#[derive(Debug)]
pub enum CoordinatorError {
    NoPeersAvailable,
    PeersExhaustedBeforeCompletion { downloaded: usize, total: usize },
}

/// Orchestrates the concurrent download of every piece of `torrent`.
///
/// Seeds a FIFO task queue with one `PieceTask` per piece, spawns one worker
/// thread per assigned peer, and collects verified pieces off a results
/// queue until the whole file is assembled. Worker termination is driven by
/// a shared completed-piece counter rather than "is the task queue empty" -
/// an empty queue with in-flight downloads is not the same as being done.
pub fn download(
    torrent: &Torrent,
    peers: &[BtPeer],
    local_peer_id: &str,
    read_write_timeout: Duration,
    max_backlog: usize,
    max_peers: u32,
    logger: LoggerSender,
) -> Result<Vec<u8>, CoordinatorError> {
    if peers.is_empty() {
        return Err(CoordinatorError::NoPeersAvailable);
    }

    let num_pieces = torrent.total_pieces();
    let info_hash = torrent
        .get_info_hash_as_bytes()
        .unwrap_or_default();

    let tasks = Arc::new(WorkQueue::from_vec(
        (0..num_pieces)
            .map(|index| PieceTask {
                index,
                expected_hash: torrent.piece_hash(index),
                length: torrent.piece_len(index),
            })
            .collect(),
    ));
    let results: Arc<WorkQueue<Option<CompletedPiece>>> = Arc::new(WorkQueue::new());

    let cpu_count = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let worker_count = num_pieces
        .min((2 * cpu_count) as u32)
        .min(peers.len() as u32)
        .min(max_peers.max(1))
        .max(1) as usize;

    let num_completed = Arc::new(AtomicUsize::new(0));
    let active_workers = Arc::new(AtomicUsize::new(worker_count));

    let mut handles = Vec::with_capacity(worker_count);
    for i in 0..worker_count {
        let peer = peers[i % peers.len()].clone();
        let tasks = tasks.clone();
        let results = results.clone();
        let num_completed = num_completed.clone();
        let active_workers = active_workers.clone();
        let local_peer_id = local_peer_id.to_string();
        let info_hash = info_hash.clone();
        let logger = logger.clone();

        handles.push(thread::spawn(move || {
            worker_loop(
                &peer,
                &local_peer_id,
                &info_hash,
                num_pieces,
                read_write_timeout,
                max_backlog,
                &tasks,
                &results,
                &num_completed,
                &active_workers,
                &logger,
            )
        }));
    }

    let total = num_pieces as usize;
    let mut buffer = vec![0u8; torrent.length() as usize];
    let mut downloaded = 0usize;

    while downloaded < total {
        match results.dequeue() {
            Some(piece) => {
                let offset = piece.index as usize * torrent.piece_length() as usize;
                buffer[offset..offset + piece.bytes.len()].copy_from_slice(&piece.bytes);
                downloaded += 1;
                logger.info(&format!(
                    "[{}%] Downloaded piece #{}. {} of {}",
                    (downloaded * 100) / total,
                    piece.index,
                    downloaded,
                    total
                ));
            }
            None => {
                for handle in handles {
                    let _ = handle.join();
                }
                return Err(CoordinatorError::PeersExhaustedBeforeCompletion {
                    downloaded,
                    total,
                });
            }
        }
    }

    for handle in handles {
        let _ = handle.join();
    }

    Ok(buffer)
}

#[allow(clippy::too_many_arguments)]
fn worker_loop(
    peer: &BtPeer,
    local_peer_id: &str,
    info_hash: &[u8],
    num_pieces: u32,
    read_write_timeout: Duration,
    max_backlog: usize,
    tasks: &WorkQueue<PieceTask>,
    results: &WorkQueue<Option<CompletedPiece>>,
    num_completed: &AtomicUsize,
    active_workers: &AtomicUsize,
    logger: &LoggerSender,
) {
    let mut session = match PeerSession::connect(
        peer,
        local_peer_id,
        info_hash,
        num_pieces,
        read_write_timeout,
    ) {
        Ok(session) => session,
        Err(err) => {
            logger.warn(&format!("could not connect to {}:{}: {:?}", peer.ip, peer.port, err));
            retire(active_workers, num_completed, num_pieces, results);
            return;
        }
    };

    if let Err(err) = session.send_interested() {
        logger.warn(&format!("could not send interested to {}:{}: {:?}", peer.ip, peer.port, err));
        retire(active_workers, num_completed, num_pieces, results);
        return;
    }

    let mut consecutive_misses = 0usize;

    loop {
        if num_completed.load(Ordering::SeqCst) as u32 >= num_pieces {
            break;
        }

        let task = tasks.dequeue();

        if num_completed.load(Ordering::SeqCst) as u32 >= num_pieces {
            tasks.enqueue(task);
            break;
        }

        while session.choked {
            if let Err(err) = session.read_one_message() {
                logger.warn(&format!("peer {}:{} I/O error: {:?}", peer.ip, peer.port, err));
                tasks.enqueue(task);
                retire(active_workers, num_completed, num_pieces, results);
                return;
            }
        }

        let has_piece = session.has_piece(task.index).unwrap_or(false);
        if !has_piece {
            consecutive_misses += 1;
            let queue_len = tasks.len();
            tasks.enqueue(task);
            if consecutive_misses > queue_len {
                break;
            }
            continue;
        }
        consecutive_misses = 0;

        match download_piece(&mut session, &task, max_backlog) {
            Ok(bytes) => {
                if verify_piece(&bytes, &task.expected_hash) {
                    results.enqueue(Some(CompletedPiece {
                        index: task.index,
                        bytes,
                    }));
                    num_completed.fetch_add(1, Ordering::SeqCst);
                } else {
                    logger.warn(&format!("piece {} failed integrity check, requeueing", task.index));
                    tasks.enqueue(task);
                }
            }
            Err(PieceDownloadError::Timeout) => {
                logger.warn(&format!(
                    "peer {}:{} stalled on piece {}, requeueing",
                    peer.ip, peer.port, task.index
                ));
                tasks.enqueue(task);
            }
            Err(err) => {
                logger.warn(&format!(
                    "peer {}:{} failed piece {}: {:?}",
                    peer.ip, peer.port, task.index, err
                ));
                tasks.enqueue(task);
                retire(active_workers, num_completed, num_pieces, results);
                return;
            }
        }
    }

    retire(active_workers, num_completed, num_pieces, results);
}

fn retire(
    active_workers: &AtomicUsize,
    num_completed: &AtomicUsize,
    num_pieces: u32,
    results: &WorkQueue<Option<CompletedPiece>>,
) {
    let remaining = active_workers.fetch_sub(1, Ordering::SeqCst) - 1;
    if remaining == 0 && (num_completed.load(Ordering::SeqCst) as u32) < num_pieces {
        results.enqueue(None);
    }
}
