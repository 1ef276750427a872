use std::fs::File;
use std::io;
use std::io::BufRead;
use std::io::BufReader;
use std::str::FromStr;

use super::constants;

/// `Cfg` struct containing the config file information, previusly created with `Cfg::new`.
///
/// - `tcp_port`: port to listen for incoming connections,
/// - `log_directory`: directory where the log files will be stored,
/// - `download_directory`: directory where the downloaded files will be stored,
/// - `pipelining_size`: number of request sent to a peer before waiting for the response,
/// - `read_write_seconds_timeout`: timeout in seconds for the read and write operations to a peer,
/// - `max_peers_per_torrent`: maximum number of simultaneous peers that a torrent can have,
/// - `max_log_file_kb_size`: max file size in kilobytes the log can have,
#[derive(Debug, Clone)]
pub struct Cfg {
    pub tcp_port: u16,
    pub log_directory: String,
    pub download_directory: String,
    pub pipelining_size: u32,
    pub read_write_seconds_timeout: u64,
    pub max_peers_per_torrent: u32,
    pub max_log_file_kb_size: u32,
}

impl Cfg {
    /// Builds a Cfg struct containing the config file information by the given path.
    /// The format of the config file must be: {config_name}={config_value} (without brackets).
    /// In case of success it returns a Cfg struct.
    ///
    /// It returns an io::Error if:
    /// - The path to the config file does not exist or could not be open/readed.
    /// - The confing file has wrong format.
    /// - A wrong config_name was in the config file.
    /// - tcp_port setting is not a valid number in the config file.
    /// - pipelining_size setting is not a valid number in the config file.
    /// - read_write_timeout setting is not a valid number in the config file.
    /// - max_peers_per_torrent  setting is not a valid number in the config file.
    /// - max_log_file_size setting is not a valid number in the config file.
    /// - Minimum number of correct settings were not reached.
    pub fn new(path: &str) -> io::Result<Self> {
        let mut cfg = Self {
            tcp_port: 0,
            log_directory: String::from(""),
            download_directory: String::from(""),
            pipelining_size: 0,
            read_write_seconds_timeout: 0,
            max_peers_per_torrent: 0,
            max_log_file_kb_size: 0,
        };

        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let mut settings_loaded = 0;

        for line in reader.lines() {
            let current_line = line?;
            let setting: Vec<&str> = current_line.split('=').collect();

            if setting.len() != 2 {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("Invalid config input: {}", current_line),
                ));
            }
            cfg = Self::load_setting(cfg, setting[0], setting[1])?;
            settings_loaded += 1;
        }
        if settings_loaded < constants::MIN_SETTINGS {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "Minimum number of correct settings were not reached: {}",
                    settings_loaded
                ),
            ));
        }
        Ok(cfg)
    }

    fn load_setting(mut self, name: &str, value: &str) -> io::Result<Self> {
        match name {
            constants::TCP_PORT => {
                self.tcp_port = self.parse_value(value, constants::TCP_PORT)?;
            }
            constants::LOG_DIRECTORY => self.log_directory = String::from(value),

            constants::DOWNLOAD_DIRECTORY => self.download_directory = String::from(value),

            constants::PIPELINING_SIZE => {
                self.pipelining_size = self.parse_value(value, constants::PIPELINING_SIZE)?;
            }

            constants::READ_WRITE_SECONDS_TIMEOUT => {
                self.read_write_seconds_timeout =
                    self.parse_value(value, constants::READ_WRITE_SECONDS_TIMEOUT)?;
            }

            constants::MAX_PEERS_PER_TORRENT => {
                self.max_peers_per_torrent =
                    self.parse_value(value, constants::MAX_PEERS_PER_TORRENT)?;
            }

            constants::MAX_LOG_FILE_KB_SIZE => {
                self.max_log_file_kb_size =
                    self.parse_value(value, constants::MAX_LOG_FILE_KB_SIZE)?;
            }

            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("Invalid config setting name: {}", name),
                ))
            }
        }
        Ok(self)
    }

    fn parse_value<F>(&self, value: &str, setting: &str) -> io::Result<F>
    where
        F: FromStr,
    {
        let parse = value.parse::<F>();
        match parse {
            Err(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!(
                        "Invalid setting: {}, is not a valid type: {}",
                        setting, value
                    ),
                ));
            }
            Ok(parse) => Ok(parse),
        }
    }
}
