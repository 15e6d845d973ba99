//! Appends captured frames to a PCAP file readable by external tools.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use log::info;

const MAGIC: u32 = 0xa1b2_c3d4;
const VERSION_MAJOR: u16 = 2;
const VERSION_MINOR: u16 = 4;
const SNAPLEN: u32 = 4096;

/// LINKTYPE_IEEE802_15_4_WITHFCS.
const LINKTYPE: u32 = 195;

/// Writes captured frames to a PCAP file in IEEE 802.15.4 link-type
/// format.
///
/// All header integers are written big-endian; a reader sees the
/// big-endian magic and swaps accordingly. The file is opened lazily on
/// the first export if [`open`] was never called, written append-only with
/// a flush per record, and closed exactly once on [`close`] or drop.
///
/// [`open`]: PcapExporter::open
/// [`close`]: PcapExporter::close
#[derive(Debug, Default)]
pub struct PcapExporter {
    writer: Option<BufWriter<File>>,
}

impl PcapExporter {
    /// Create an exporter with no file open yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the PCAP file and write the 24-byte global header.
    ///
    /// With no path, the file is auto-named `radiolog-<millis>.pcap` in
    /// the current directory. An already-open file is closed first.
    pub fn open(&mut self, path: Option<&Path>) -> io::Result<()> {
        self.close()?;

        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let millis = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_millis())
                    .unwrap_or(0);
                PathBuf::from(format!("radiolog-{millis}.pcap"))
            }
        };
        info!("exporting to {}", path.display());

        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(&MAGIC.to_be_bytes())?;
        writer.write_all(&VERSION_MAJOR.to_be_bytes())?;
        writer.write_all(&VERSION_MINOR.to_be_bytes())?;
        writer.write_all(&0i32.to_be_bytes())?; // thiszone
        writer.write_all(&0u32.to_be_bytes())?; // sigfigs
        writer.write_all(&SNAPLEN.to_be_bytes())?;
        writer.write_all(&LINKTYPE.to_be_bytes())?;
        writer.flush()?;

        self.writer = Some(writer);
        Ok(())
    }

    /// Append one frame with its capture timestamp in microseconds.
    ///
    /// Opens an auto-named file first if none is open.
    pub fn export(&mut self, frame: &[u8], timestamp_us: u64) -> io::Result<()> {
        if self.writer.is_none() {
            self.open(None)?;
        }
        // open() either returned an error above or installed the writer.
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };

        writer.write_all(&((timestamp_us / 1_000_000) as u32).to_be_bytes())?;
        writer.write_all(&((timestamp_us % 1_000_000) as u32).to_be_bytes())?;
        writer.write_all(&(frame.len() as u32).to_be_bytes())?; // caplen
        writer.write_all(&(frame.len() as u32).to_be_bytes())?; // origlen
        writer.write_all(frame)?;
        writer.flush()
    }

    /// Flush and close the file, if one is open.
    pub fn close(&mut self) -> io::Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for PcapExporter {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
