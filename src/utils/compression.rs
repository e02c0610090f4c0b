use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Opens a file for buffered reading, decompressing it transparently when
/// niffler recognises a compression format.
pub fn open_reader(path: &Path) -> Result<Box<dyn BufRead>, niffler::Error> {
    let file = File::open(path)?;
    let reader: Box<dyn Read> = match niffler::get_reader(Box::new(file)) {
        Ok((reader, _compression)) => reader,
        // Too short to carry a magic number, so it cannot be compressed
        Err(niffler::Error::FileTooShort) => Box::new(File::open(path)?),
        Err(e) => return Err(e),
    };
    Ok(Box::new(BufReader::with_capacity(1024 * 1024, reader)))
}

/// Output stream, gzip-compressed or plain.
///
/// Dropping an [OutputWriter] discards errors from the final write; call
/// [OutputWriter::finish] to complete the stream and see them.
pub enum OutputWriter<W: Write = BufWriter<File>> {
    Plain(W),
    Gzip(GzEncoder<W>),
}

impl<W: Write> OutputWriter<W> {
    pub fn new(inner: W, gzip: bool) -> Self {
        if gzip {
            OutputWriter::Gzip(GzEncoder::new(inner, Compression::default()))
        } else {
            OutputWriter::Plain(inner)
        }
    }

    /// Writes the gzip trailer if any and flushes the underlying stream.
    pub fn finish(self) -> io::Result<W> {
        let mut inner = match self {
            OutputWriter::Plain(inner) => inner,
            OutputWriter::Gzip(encoder) => encoder.finish()?,
        };
        inner.flush()?;
        Ok(inner)
    }
}

impl<W: Write> Write for OutputWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputWriter::Plain(inner) => inner.write(buf),
            OutputWriter::Gzip(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputWriter::Plain(inner) => inner.flush(),
            OutputWriter::Gzip(encoder) => encoder.flush(),
        }
    }
}

/// Creates a buffered writer; paths ending in `.gz` are gzip-compressed.
pub fn create_writer(path: &Path) -> io::Result<OutputWriter> {
    let file = BufWriter::new(File::create(path)?);
    Ok(OutputWriter::new(file, is_gzip_path(path)))
}

fn is_gzip_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_gzip_round_trip_through_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.tsv.gz");

        let mut writer = create_writer(&path).unwrap();
        writer.write_all(b"strain\tcountry\nA\tUK\n").unwrap();
        writer.finish().unwrap();

        let raw = std::fs::read(&path).unwrap();
        assert_eq!(&raw[..2], &[0x1f, 0x8b], "expected gzip magic bytes");

        let mut text = String::new();
        open_reader(&path).unwrap().read_to_string(&mut text).unwrap();
        assert_eq!(text, "strain\tcountry\nA\tUK\n");
    }

    #[test]
    fn test_plain_file_is_read_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.nwk");
        std::fs::write(&path, "(A,B);").unwrap();

        let mut text = String::new();
        open_reader(&path).unwrap().read_to_string(&mut text).unwrap();
        assert_eq!(text, "(A,B);");
    }

    #[test]
    fn test_tiny_file_is_read_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.nwk");
        std::fs::write(&path, "A;").unwrap();

        let mut text = String::new();
        open_reader(&path).unwrap().read_to_string(&mut text).unwrap();
        assert_eq!(text, "A;");
    }

    /// Accepts writes until `broken` is set.
    struct Sink {
        broken: Rc<Cell<bool>>,
        bytes: Vec<u8>,
    }

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.broken.get() {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
            }
            self.bytes.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_gzip_trailer_failure_is_reported_by_finish() {
        let broken = Rc::new(Cell::new(false));
        let sink = Sink {
            broken: Rc::clone(&broken),
            bytes: Vec::new(),
        };
        let mut writer = OutputWriter::new(sink, true);
        writer.write_all(b"strain\tcolor\nA\tred\n").unwrap();
        writer.flush().unwrap();

        broken.set(true);
        assert!(writer.finish().is_err());
    }

    #[test]
    fn test_finish_returns_complete_gzip_stream() {
        let sink = Sink {
            broken: Rc::new(Cell::new(false)),
            bytes: Vec::new(),
        };
        let mut writer = OutputWriter::new(sink, true);
        writer.write_all(b"A\t0\n").unwrap();
        let sink = writer.finish().unwrap();

        let (mut reader, format) = niffler::get_reader(Box::new(io::Cursor::new(sink.bytes))).unwrap();
        assert_eq!(format, niffler::compression::Format::Gzip);
        let mut text = String::new();
        reader.read_to_string(&mut text).unwrap();
        assert_eq!(text, "A\t0\n");
    }
}
