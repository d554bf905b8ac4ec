//! End-to-end packing through a minimal table layer.

use std::fs::File;
use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use thdat_archive::{Archive, Packer, Version, pack};
use thdat_core::error::{Result, ThdatError};
use thdat_core::{Entry, EntryMethod, NameEncoding};

const HEADER_LEN: u64 = 16;

/// Writes a 16-byte header followed by entry data and a trailing table.
struct TablePacker {
    version: Version,
}

impl<W: Write + Seek> Packer<W> for TablePacker {
    fn version(&self) -> Version {
        self.version
    }

    fn begin(&mut self, writer: &mut W, _entry_count: usize) -> Result<u64> {
        writer.write_all(&[0u8; HEADER_LEN as usize])?;
        Ok(HEADER_LEN)
    }

    fn finish(&mut self, archive: &mut Archive<W>) -> Result<()> {
        let mut table = Vec::new();
        for entry in archive.entries() {
            let name = entry.encoded_name(NameEncoding::ShiftJis)?;
            let offset = entry
                .offset
                .ok_or_else(|| ThdatError::invalid_argument("unwritten entry"))?;
            table.extend_from_slice(&(name.len() as u16).to_le_bytes());
            table.extend_from_slice(&name);
            table.extend_from_slice(&(entry.size as u32).to_le_bytes());
            table.extend_from_slice(&(entry.compressed_size as u32).to_le_bytes());
            table.extend_from_slice(&(offset as u32).to_le_bytes());
            table.push(match entry.method {
                EntryMethod::Stored => 0,
                EntryMethod::Rle => 1,
                EntryMethod::Lzss => 2,
            });
        }

        let table_offset = archive.running_offset() as u32;
        let count = archive.entries().len() as u32;
        let version = archive.version().number();

        let writer = archive.writer_mut();
        writer.write_all(&table)?;
        writer.seek(SeekFrom::Start(0))?;
        writer.write_all(b"TDAT")?;
        writer.write_all(&version.to_le_bytes())?;
        writer.write_all(&count.to_le_bytes())?;
        writer.write_all(&table_offset.to_le_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

struct ParsedEntry {
    name: Vec<u8>,
    size: usize,
    zsize: usize,
    offset: usize,
    method: u8,
}

fn u32_at(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
}

fn parse(bytes: &[u8]) -> (u32, Vec<ParsedEntry>) {
    assert_eq!(&bytes[..4], b"TDAT");
    let version = u32_at(bytes, 4);
    let count = u32_at(bytes, 8) as usize;
    let mut pos = u32_at(bytes, 12) as usize;

    let mut entries = Vec::new();
    for _ in 0..count {
        let name_len = u16::from_le_bytes([bytes[pos], bytes[pos + 1]]) as usize;
        pos += 2;
        let name = bytes[pos..pos + name_len].to_vec();
        pos += name_len;
        entries.push(ParsedEntry {
            name,
            size: u32_at(bytes, pos) as usize,
            zsize: u32_at(bytes, pos + 4) as usize,
            offset: u32_at(bytes, pos + 8) as usize,
            method: bytes[pos + 12],
        });
        pos += 13;
    }
    (version, entries)
}

fn unpack(bytes: &[u8], entry: &ParsedEntry) -> Vec<u8> {
    let stored = &bytes[entry.offset..entry.offset + entry.zsize];
    match entry.method {
        0 => stored.to_vec(),
        1 => thdat_rle::decode(stored).unwrap(),
        2 => thdat_lzss::decode(stored, entry.size).unwrap(),
        other => panic!("unknown method {other}"),
    }
}

fn sample_inputs() -> Vec<(&'static str, Vec<u8>)> {
    vec![
        ("stage1.ecl", b"ins_1; ins_1; ins_1; ins_1; wait(30);".repeat(20)),
        ("title.anm", vec![0u8; 4096]),
        ("empty.txt", Vec::new()),
        ("random.bin", (0..777u32).map(|i| (i.wrapping_mul(2654435761) >> 13) as u8).collect()),
    ]
}

fn check_roundtrip(version: Version) {
    let inputs = sample_inputs();
    let mut packer = TablePacker { version };

    let archive = pack(
        Cursor::new(Vec::new()),
        &mut packer,
        inputs
            .iter()
            .map(|(name, data)| (Entry::file(*name, data.len() as u64), Cursor::new(data.clone()))),
    )
    .unwrap();

    assert_eq!(archive.base_offset(), HEADER_LEN);
    let offsets: Vec<_> = archive.entries().iter().map(|e| e.offset.unwrap()).collect();
    assert!(offsets.windows(2).all(|w| w[0] <= w[1]));
    let data_total: u64 = archive.entries().iter().map(|e| e.compressed_size).sum();
    assert_eq!(archive.running_offset(), HEADER_LEN + data_total);

    let bytes = archive.into_inner().into_inner();
    let (number, parsed) = parse(&bytes);
    assert_eq!(number, version.number());
    assert_eq!(parsed.len(), inputs.len());

    for (name, data) in &inputs {
        let entry = parsed
            .iter()
            .find(|e| e.name == name.as_bytes())
            .expect("entry missing from table");
        assert_eq!(entry.size, data.len());
        assert_eq!(&unpack(&bytes, entry), data);
    }
}

#[test]
fn test_pack_rle_version() {
    check_roundtrip(Version::Th02);
}

#[test]
fn test_pack_lzss_version() {
    check_roundtrip(Version::Th095);
}

#[test]
fn test_pack_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("th08.dat");
    let inputs = sample_inputs();

    let file = File::create(&path).unwrap();
    let mut packer = TablePacker {
        version: Version::Th08,
    };
    let archive = pack(
        file,
        &mut packer,
        inputs
            .iter()
            .map(|(name, data)| (Entry::file(*name, data.len() as u64), data.as_slice())),
    )
    .unwrap();
    drop(archive);

    let mut bytes = Vec::new();
    File::open(&path).unwrap().read_to_end(&mut bytes).unwrap();
    let (_, parsed) = parse(&bytes);
    for ((_, data), entry) in inputs.iter().zip(&parsed) {
        assert_eq!(&unpack(&bytes, entry), data);
    }
}

#[test]
fn test_short_input_aborts() {
    let mut packer = TablePacker {
        version: Version::Th06,
    };
    let result = pack(
        Cursor::new(Vec::new()),
        &mut packer,
        vec![(Entry::file("truncated", 100), Cursor::new(vec![1u8; 10]))],
    );
    assert!(matches!(result, Err(ThdatError::Io(_))));
}

#[test]
fn test_write_failure_surfaces_as_io() {
    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let mut archive = Archive::open(FullDisk, Version::Th06, 32, 1).unwrap();
    let index = archive.add_entry(Entry::file("a", 4)).unwrap();
    let err = archive.write_entry(index, vec![1, 2, 3, 4]).unwrap_err();
    assert!(err.is_io());
    // Bookkeeping is not rolled back after a failed write.
    assert_eq!(archive.entry(index).unwrap().offset, Some(32));
    assert_eq!(archive.running_offset(), 36);
}
