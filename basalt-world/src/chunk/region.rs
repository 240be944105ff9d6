//! Region files: a 32×32 chunk grid per file.
//!
//! Layout: a 4 KiB offset table (3-byte sector offset + 1-byte sector
//! count per chunk), a 4 KiB timestamp table, then 4 KiB payload sectors.
//! Each chunk payload is `<4-byte length><1-byte compression><data>` where
//! compression 1 is gzip and 2 is zlib.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::ZlibEncoder;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use thiserror::Error;

const SECTOR_BYTES: usize = 4096;
const HEADER_SECTORS: u32 = 2;

/// Compression tag for gzip payloads.
const COMPRESSION_GZIP: u8 = 1;
/// Compression tag for zlib payloads; all new writes use this.
const COMPRESSION_ZLIB: u8 = 2;

/// Errors from region-file access.
#[derive(Debug, Error)]
pub enum RegionError {
    /// The offset table points outside the file.
    #[error("corrupted region header for chunk ({0}, {1})")]
    CorruptHeader(i32, i32),
    /// A payload declared an unknown compression tag.
    #[error("bad compression tag {0}")]
    BadCompression(u8),
    /// A payload length disagrees with its sector allocation.
    #[error("chunk payload length {len} exceeds {sectors} allocated sectors")]
    LengthMismatch {
        /// Declared payload length.
        len: u32,
        /// Sectors allocated in the header.
        sectors: u32,
    },
    /// A chunk grew past the representable 255 sectors.
    #[error("chunk payload too large: {0} bytes")]
    ChunkTooLarge(usize),
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Coordinate of a region file; each covers 32×32 chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionPos {
    /// Region X (chunk X >> 5).
    pub x: i32,
    /// Region Z (chunk Z >> 5).
    pub z: i32,
}

impl RegionPos {
    /// The region containing a chunk.
    #[must_use]
    pub const fn from_chunk(chunk_x: i32, chunk_z: i32) -> Self {
        Self {
            x: chunk_x >> 5,
            z: chunk_z >> 5,
        }
    }

    /// Standard file name, `r.<x>.<z>.mca`.
    #[must_use]
    pub fn filename(self) -> String {
        format!("r.{}.{}.mca", self.x, self.z)
    }
}

/// Index of a chunk within its region's tables.
const fn chunk_index(chunk_x: i32, chunk_z: i32) -> usize {
    ((chunk_x & 31) + (chunk_z & 31) * 32) as usize
}

/// One open region file with its parsed header tables.
struct RegionFile {
    file: File,
    offsets: [u32; 1024],
    timestamps: [u32; 1024],
    /// Occupancy map of payload sectors, indexed from sector 0 (header
    /// sectors are always taken).
    sector_used: Vec<bool>,
}

impl RegionFile {
    fn open(path: &Path) -> Result<Self, RegionError> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let len = file.metadata()?.len();
        if len < (SECTOR_BYTES * 2) as u64 {
            // Fresh file: write empty header tables.
            file.set_len((SECTOR_BYTES * 2) as u64)?;
            file.seek(SeekFrom::Start(0))?;
            file.write_all(&[0u8; SECTOR_BYTES * 2])?;
        }

        let mut header = [0u8; SECTOR_BYTES * 2];
        file.seek(SeekFrom::Start(0))?;
        file.read_exact(&mut header)?;

        let mut offsets = [0u32; 1024];
        let mut timestamps = [0u32; 1024];
        for i in 0..1024 {
            offsets[i] = u32::from_be_bytes([
                header[i * 4],
                header[i * 4 + 1],
                header[i * 4 + 2],
                header[i * 4 + 3],
            ]);
            let t = SECTOR_BYTES + i * 4;
            timestamps[i] =
                u32::from_be_bytes([header[t], header[t + 1], header[t + 2], header[t + 3]]);
        }

        let total_sectors = (file.metadata()?.len() as usize).div_ceil(SECTOR_BYTES);
        let mut sector_used = vec![false; total_sectors.max(HEADER_SECTORS as usize)];
        sector_used[0] = true;
        sector_used[1] = true;
        for &entry in &offsets {
            let start = (entry >> 8) as usize;
            let count = (entry & 0xFF) as usize;
            for sector in start..start + count {
                if sector < sector_used.len() {
                    sector_used[sector] = true;
                }
            }
        }

        Ok(Self {
            file,
            offsets,
            timestamps,
            sector_used,
        })
    }

    fn read_chunk(&mut self, chunk_x: i32, chunk_z: i32) -> Result<Option<Vec<u8>>, RegionError> {
        let entry = self.offsets[chunk_index(chunk_x, chunk_z)];
        if entry == 0 {
            return Ok(None);
        }
        let start = (entry >> 8) as u64;
        let sectors = entry & 0xFF;
        let file_len = self.file.metadata()?.len();
        if start * SECTOR_BYTES as u64 >= file_len {
            return Err(RegionError::CorruptHeader(chunk_x, chunk_z));
        }

        self.file.seek(SeekFrom::Start(start * SECTOR_BYTES as u64))?;
        let mut len_buf = [0u8; 4];
        self.file.read_exact(&mut len_buf)?;
        let payload_len = u32::from_be_bytes(len_buf);
        if payload_len == 0 || payload_len as usize > sectors as usize * SECTOR_BYTES {
            return Err(RegionError::LengthMismatch {
                len: payload_len,
                sectors,
            });
        }

        let mut tag = [0u8; 1];
        self.file.read_exact(&mut tag)?;
        let mut compressed = vec![0u8; payload_len as usize - 1];
        self.file.read_exact(&mut compressed)?;

        let mut data = Vec::new();
        match tag[0] {
            COMPRESSION_GZIP => {
                GzDecoder::new(&compressed[..]).read_to_end(&mut data)?;
            }
            COMPRESSION_ZLIB => {
                ZlibDecoder::new(&compressed[..]).read_to_end(&mut data)?;
            }
            other => return Err(RegionError::BadCompression(other)),
        }
        Ok(Some(data))
    }

    fn write_chunk(
        &mut self,
        chunk_x: i32,
        chunk_z: i32,
        data: &[u8],
        timestamp: u32,
    ) -> Result<(), RegionError> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data)?;
        let compressed = encoder.finish()?;

        let payload_len = compressed.len() + 1;
        let needed_sectors = (payload_len + 4).div_ceil(SECTOR_BYTES) as u32;
        if needed_sectors > 255 {
            return Err(RegionError::ChunkTooLarge(payload_len));
        }

        let index = chunk_index(chunk_x, chunk_z);
        let old_entry = self.offsets[index];
        let old_start = (old_entry >> 8) as usize;
        let old_count = (old_entry & 0xFF) as usize;

        // Reuse the old allocation when the chunk still fits; this keeps
        // re-saves from growing the file.
        let start = if old_count as u32 >= needed_sectors && old_entry != 0 {
            for sector in old_start + needed_sectors as usize..old_start + old_count {
                self.sector_used[sector] = false;
            }
            old_start
        } else {
            for sector in old_start..old_start + old_count {
                if sector < self.sector_used.len() {
                    self.sector_used[sector] = false;
                }
            }
            self.allocate(needed_sectors as usize)
        };

        self.file.seek(SeekFrom::Start((start * SECTOR_BYTES) as u64))?;
        self.file.write_all(&(payload_len as u32).to_be_bytes())?;
        self.file.write_all(&[COMPRESSION_ZLIB])?;
        self.file.write_all(&compressed)?;

        // Zero-pad to the sector boundary.
        let written = 4 + payload_len;
        let padding = needed_sectors as usize * SECTOR_BYTES - written;
        if padding > 0 {
            self.file.write_all(&vec![0u8; padding])?;
        }

        self.offsets[index] = ((start as u32) << 8) | needed_sectors;
        self.timestamps[index] = timestamp;
        self.write_header_entry(index)?;
        Ok(())
    }

    /// Finds `count` contiguous free sectors, growing the file as needed.
    fn allocate(&mut self, count: usize) -> usize {
        let mut run_start = HEADER_SECTORS as usize;
        let mut run_len = 0;
        for sector in HEADER_SECTORS as usize..self.sector_used.len() {
            if self.sector_used[sector] {
                run_start = sector + 1;
                run_len = 0;
            } else {
                run_len += 1;
                if run_len == count {
                    for s in run_start..run_start + count {
                        self.sector_used[s] = true;
                    }
                    return run_start;
                }
            }
        }
        // Append at the end.
        let start = self.sector_used.len().max(run_start);
        self.sector_used.resize(start + count, false);
        for s in start..start + count {
            self.sector_used[s] = true;
        }
        start
    }

    fn write_header_entry(&mut self, index: usize) -> Result<(), RegionError> {
        self.file.seek(SeekFrom::Start((index * 4) as u64))?;
        self.file.write_all(&self.offsets[index].to_be_bytes())?;
        self.file
            .seek(SeekFrom::Start((SECTOR_BYTES + index * 4) as u64))?;
        self.file.write_all(&self.timestamps[index].to_be_bytes())?;
        Ok(())
    }
}

/// Region store: opens region files on demand and keeps handles around.
pub struct RegionStore {
    base_path: PathBuf,
    regions: Mutex<FxHashMap<RegionPos, RegionFile>>,
}

impl RegionStore {
    /// Creates a store rooted at a `region/` directory.
    pub fn new(base_path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)?;
        Ok(Self {
            base_path,
            regions: Mutex::new(FxHashMap::default()),
        })
    }

    fn with_region<T>(
        &self,
        chunk_x: i32,
        chunk_z: i32,
        f: impl FnOnce(&mut RegionFile) -> Result<T, RegionError>,
    ) -> Result<T, RegionError> {
        let pos = RegionPos::from_chunk(chunk_x, chunk_z);
        let mut regions = self.regions.lock();
        if !regions.contains_key(&pos) {
            let region = RegionFile::open(&self.base_path.join(pos.filename()))?;
            regions.insert(pos, region);
        }
        let region = regions
            .get_mut(&pos)
            .unwrap_or_else(|| unreachable!("region inserted above"));
        f(region)
    }

    /// Reads a chunk's raw NBT bytes, `None` when absent.
    pub fn read_chunk(&self, chunk_x: i32, chunk_z: i32) -> Result<Option<Vec<u8>>, RegionError> {
        self.with_region(chunk_x, chunk_z, |region| region.read_chunk(chunk_x, chunk_z))
    }

    /// Writes a chunk's raw NBT bytes with a save timestamp.
    pub fn write_chunk(
        &self,
        chunk_x: i32,
        chunk_z: i32,
        data: &[u8],
        timestamp: u32,
    ) -> Result<(), RegionError> {
        self.with_region(chunk_x, chunk_z, |region| {
            region.write_chunk(chunk_x, chunk_z, data, timestamp)
        })
    }

    /// Whether a chunk exists on disk without reading its payload.
    pub fn chunk_exists(&self, chunk_x: i32, chunk_z: i32) -> Result<bool, RegionError> {
        self.with_region(chunk_x, chunk_z, |region| {
            Ok(region.offsets[chunk_index(chunk_x, chunk_z)] != 0)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("basalt-region-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn chunk_round_trip() {
        let dir = temp_dir("round-trip");
        let store = RegionStore::new(&dir).unwrap();
        let payload = vec![7u8; 10_000];
        store.write_chunk(3, -2, &payload, 42).unwrap();
        let read = store.read_chunk(3, -2).unwrap().unwrap();
        assert_eq!(read, payload);
        assert!(store.chunk_exists(3, -2).unwrap());
        assert!(!store.chunk_exists(4, -2).unwrap());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn negative_coordinates_share_region_correctly() {
        assert_eq!(RegionPos::from_chunk(-1, -1), RegionPos { x: -1, z: -1 });
        assert_eq!(RegionPos::from_chunk(-32, 0), RegionPos { x: -1, z: 0 });
        assert_eq!(chunk_index(-1, -1), 31 + 31 * 32);
    }

    #[test]
    fn resave_does_not_grow_file() {
        let dir = temp_dir("stable-alloc");
        let store = RegionStore::new(&dir).unwrap();
        let payload = vec![1u8; 8_000];
        store.write_chunk(0, 0, &payload, 1).unwrap();
        let len_first = fs::metadata(dir.join("r.0.0.mca")).unwrap().len();
        for stamp in 2..10 {
            store.write_chunk(0, 0, &payload, stamp).unwrap();
        }
        let len_after = fs::metadata(dir.join("r.0.0.mca")).unwrap().len();
        // Re-saving an unchanged chunk stays within one sector of the
        // original allocation.
        assert!(len_after <= len_first + SECTOR_BYTES as u64);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_chunk_reads_none() {
        let dir = temp_dir("missing");
        let store = RegionStore::new(&dir).unwrap();
        assert!(store.read_chunk(12, 12).unwrap().is_none());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn many_chunks_in_one_region() {
        let dir = temp_dir("many");
        let store = RegionStore::new(&dir).unwrap();
        for i in 0..16 {
            let payload = vec![i as u8; 3000 + i * 100];
            store.write_chunk(i as i32, 0, &payload, i as u32).unwrap();
        }
        for i in 0..16 {
            let read = store.read_chunk(i as i32, 0).unwrap().unwrap();
            assert_eq!(read.len(), 3000 + i * 100);
            assert!(read.iter().all(|&b| b == i as u8));
        }
        let _ = fs::remove_dir_all(dir);
    }
}
