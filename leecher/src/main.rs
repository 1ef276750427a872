use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use rand::Rng;

use leecher::config::cfg::Cfg;
use leecher::coordinator;
use leecher::storage;
use leecher::torrent_parser::parser::TorrentParser;
use leecher::tracker::tracker_handler::TrackerHandler;
use logger::logger_receiver::Logger;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short, long)]
    file: String,
    #[arg(short, long)]
    config: String,
}

fn main() {
    let args = Args::parse();
    let file_path = PathBuf::from(args.file.trim());
    let config_path = args.config.trim();

    let torrent = TorrentParser::parse(
        file_path
            .to_str()
            .expect("file path is not valid UTF-8")
            .to_string(),
    )
    .expect("parser could not find the file");

    let config = Cfg::new(config_path).expect("config file not found or incomplete");

    let logger = Logger::new(&config.log_directory, config.max_log_file_kb_size)
        .expect("logger could not be created");
    let logger_sender = logger.new_sender();

    let client_peer_id = generate_peer_id();

    let tracker_handler = TrackerHandler::new(
        torrent.clone(),
        config.tcp_port as u32,
        client_peer_id.clone(),
    )
    .expect("could not build tracker handler from announce URL");

    println!("Requesting peers from tracker ...");
    let tracker_response = tracker_handler
        .get_peers_list()
        .expect("could not reach tracker");

    logger_sender.info(&format!(
        "tracker returned {} peers",
        tracker_response.peers.len()
    ));

    println!("Downloading {} ...", torrent.name());
    let file_contents = coordinator::download(
        &torrent,
        &tracker_response.peers,
        &client_peer_id,
        Duration::from_secs(config.read_write_seconds_timeout),
        config.pipelining_size as usize,
        config.max_peers_per_torrent,
        logger_sender.clone(),
    )
    .expect("download failed");

    let output_path = PathBuf::from(&config.download_directory).join(torrent.name());
    storage::save_file(&output_path, &file_contents).expect("could not write downloaded file");

    println!("Saved to {}", output_path.display());
}

/// Builds an Azureus-style peer id: a two-letter client tag, a four-digit
/// version, and twelve random alphanumeric characters.
fn generate_peer_id() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..12)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();
    format!("-TT0001-{}", suffix)
}
