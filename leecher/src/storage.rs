use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Writes the assembled file to `path` in a single pass once every piece has
/// been verified and placed in `buffer`. There is no incremental or resumed
/// write path: the whole file lives in memory until the download completes.
pub fn save_file(path: &Path, buffer: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn writes_full_buffer_to_disk() {
        let dir = std::env::temp_dir().join(format!(
            "leecher_storage_test_{:?}",
            std::thread::current().id()
        ));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("output.bin");

        let data = b"hello torrent world".to_vec();
        save_file(&path, &data).unwrap();

        let written = fs::read(&path).unwrap();
        assert_eq!(written, data);

        fs::remove_dir_all(&dir).unwrap();
    }
}
