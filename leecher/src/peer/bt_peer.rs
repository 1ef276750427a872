use bencoder::bencode::Bencode;

/// `BtPeer` struct containing individual BtPeer information.
///
/// To create a new `BtPeer` use the method builder `from()`.
#[derive(Debug, Clone)]
pub struct BtPeer {
    pub peer_id: Option<Vec<u8>>,
    pub ip: String,
    pub port: i64,
}

impl PartialEq for BtPeer {
    fn eq(&self, other: &Self) -> bool {
        self.ip == other.ip && self.port == other.port
    }
}

impl Eq for BtPeer {}

impl std::hash::Hash for BtPeer {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.ip.hash(state);
        self.port.hash(state);
    }
}

/// Posible `BtPeer` errors
#[derive(Debug)]
pub enum BtPeerError {
    InvalidPeerId,
    InvalidIp,
    InvalidPort,
    NotADict,
}

impl BtPeer {
    /// Builds a new `BtPeer` decoding a bencoded Vec<u8> cointaining the BtPeer information.
    pub fn new(ip: String, port: i64) -> Self {
        Self {
            peer_id: None,
            ip,
            port,
        }
    }

    /// Builds a new `BtPeer` from a bencoded peer from the tracker response peer list.
    ///
    ///
    /// It returns an `BtPeerError` if:
    /// - The peer ID is invalid.
    /// - The peer IP is invalid.
    /// - The peer Port is invalid.
    /// - The bencoded peer is not a Dict.
    pub fn from(bencode: Bencode) -> Result<BtPeer, BtPeerError> {
        let mut peer_id: Vec<u8> = Vec::new();
        let mut ip: String = String::new();
        let mut port: i64 = 0;

        let d = match bencode {
            Bencode::BDict(d) => d,
            _ => return Err(BtPeerError::NotADict),
        };

        for (k, v) in d.iter() {
            if k == b"peer id" {
                peer_id = Self::create_peer_id(v)?;
            } else if k == b"ip" {
                ip = Self::create_ip(v)?;
            } else if k == b"port" {
                port = Self::create_port(v)?;
            }
        }

        Ok(BtPeer {
            peer_id: Some(peer_id),
            ip,
            port,
        })
    }

    fn create_peer_id(bencode: &Bencode) -> Result<Vec<u8>, BtPeerError> {
        let peer_id = match bencode {
            Bencode::BString(s) => s.clone(),
            _ => return Err(BtPeerError::InvalidPeerId),
        };

        Ok(peer_id)
    }

    fn create_ip(bencode: &Bencode) -> Result<String, BtPeerError> {
        let ip = match bencode {
            Bencode::BString(s) => s,
            _ => return Err(BtPeerError::InvalidIp),
        };

        let ip = match String::from_utf8(ip.to_vec()) {
            Ok(s) => s,
            Err(_) => return Err(BtPeerError::InvalidIp),
        };

        Ok(ip)
    }

    fn create_port(bencode: &Bencode) -> Result<i64, BtPeerError> {
        let port = match bencode {
            Bencode::BNumber(n) => *n,
            _ => return Err(BtPeerError::InvalidPort),
        };

        Ok(port)
    }

}
