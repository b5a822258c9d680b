use std::io::{Read, Write};

use flate2::{read::GzDecoder, write::GzEncoder};

/// Compression types supported for bucket files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    #[default]
    None,
    Gzip,
}

impl Compression {
    /// The file name suffix used for this compression.
    pub fn extension(&self) -> &'static str {
        match self {
            Compression::None => "txt",
            Compression::Gzip => "txt.gz",
        }
    }

    pub fn other(&self) -> Compression {
        match self {
            Compression::None => Compression::Gzip,
            Compression::Gzip => Compression::None,
        }
    }
}

/// Wrap `inner` to decompress what it reads.
pub fn reader<'a, T>(compression: Compression, inner: T) -> Box<dyn Read + 'a>
where
    T: Read + 'a,
{
    match compression {
        Compression::None => Box::new(inner),
        Compression::Gzip => Box::new(GzDecoder::new(inner)),
    }
}

pub enum Writer<T>
where
    T: Write,
{
    Uncompressed(T),
    Gzip(GzEncoder<T>),
}

impl<T> Writer<T>
where
    T: Write,
{
    pub fn new(compression: Compression, writer: T) -> Self {
        match compression {
            Compression::None => Self::Uncompressed(writer),
            Compression::Gzip => Self::Gzip(GzEncoder::new(writer, flate2::Compression::default())),
        }
    }

    /// Write any trailing compressed data and return the inner writer.
    pub fn finish(self) -> std::io::Result<T> {
        match self {
            Writer::Uncompressed(mut t) => {
                t.flush()?;
                Ok(t)
            }
            Writer::Gzip(t) => t.finish(),
        }
    }
}

impl<T> Write for Writer<T>
where
    T: Write,
{
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            Writer::Uncompressed(t) => t.write(buf),
            Writer::Gzip(t) => t.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Writer::Uncompressed(t) => t.flush(),
            Writer::Gzip(t) => t.flush(),
        }
    }
}

#[test]
pub fn gzip_round_trip() {
    let mut writer = Writer::new(Compression::Gzip, Vec::new());
    writer.write_all(b"square,plane,1,1,1\n1\n").unwrap();
    let bytes = writer.finish().unwrap();

    let mut out = String::new();
    reader(Compression::Gzip, &bytes[..])
        .read_to_string(&mut out)
        .unwrap();

    assert_eq!(out, "square,plane,1,1,1\n1\n");
}
