use noodles::bgzf;
use std::fs::File;
use std::io::{self, BufRead, Read, Seek, SeekFrom};
use std::path::Path;

const BGZF_HEADER_SIZE: usize = 18;

/// Check whether the stream starts with a BGZF block header. Rewinds afterwards.
pub fn is_bgzf<R: Read + Seek>(reader: &mut R) -> io::Result<bool> {
    let mut header = [0u8; BGZF_HEADER_SIZE];
    let result = match reader.read_exact(&mut header) {
        Ok(()) => {
            Ok(header[0..2] == [0x1f, 0x8b]      // gzip magic
                && header[2] == 0x08              // DEFLATE
                && header[3] == 0x04              // FEXTRA
                && header[10..12] == [0x06, 0x00] // XLEN=6
                && header[12..14] == [b'B', b'C'] // BC subfield
                && header[14..16] == [0x02, 0x00]) // SLEN=2
        }
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    };
    reader.seek(SeekFrom::Start(0))?;
    result
}

/// Count the variant records (non-header lines) of a BGZF-compressed VCF.
pub fn count_records(path: &Path) -> io::Result<usize> {
    let mut file = File::open(path).map_err(|e| {
        io::Error::new(
            e.kind(),
            format!("Failed to open merged VCF '{}': {}", path.display(), e),
        )
    })?;
    if !is_bgzf(&mut file)? {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("'{}' is not BGZF-compressed", path.display()),
        ));
    }

    let mut reader = bgzf::io::Reader::new(file);
    let mut line = Vec::new();
    let mut records = 0;
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        if !line.starts_with(b"#") && line.iter().any(|b| !b.is_ascii_whitespace()) {
            records += 1;
        }
    }

    Ok(records)
}
