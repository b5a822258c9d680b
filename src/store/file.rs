use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, ErrorKind, Read, Write},
    path::{Path, PathBuf},
};

use hashbrown::HashMap;
use tempfile::NamedTempFile;

use crate::{
    bucket::{Bucket, BucketKey},
    collinearity::Collinearity,
    error::{Error, Result},
    geometry::Family,
};

use super::{
    compression::{reader, Writer},
    BucketStore, Compression, StoreConfig,
};

/// A [`BucketStore`] keeping one text file per bucket.
///
/// Files live at `<root>/<family>/<collinearity>/ancestor_<nn>_<kk>.txt`
/// (`.txt.gz` when gzip compressed). Each starts with a
/// `family,collinearity,n,k,row_count` header followed by one line per
/// shape.
///
/// A bucket is written to a uniquely named temporary file in the same
/// directory and then moved into place, so a file at the final path is never
/// half written by this store.
pub struct FileStore {
    config: StoreConfig,
}

impl FileStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Create the directory for every family and collinearity policy.
    pub fn create_folder_structure(&self) -> Result<()> {
        for family in Family::ALL {
            for collinearity in Collinearity::ALL {
                std::fs::create_dir_all(self.dir(family, collinearity))?;
            }
        }
        Ok(())
    }

    fn dir(&self, family: Family, collinearity: Collinearity) -> PathBuf {
        let mut dir = self.config.root.clone();
        dir.push(family.name());
        dir.push(collinearity.name());
        dir
    }

    fn file_name(key: BucketKey, compression: Compression) -> String {
        format!(
            "ancestor_{:02}_{:02}.{}",
            key.n,
            key.k,
            compression.extension()
        )
    }

    /// The path `key` is written to with the configured compression.
    pub fn path(&self, key: BucketKey) -> PathBuf {
        self.path_with(key, self.config.compression)
    }

    fn path_with(&self, key: BucketKey, compression: Compression) -> PathBuf {
        let mut path = self.dir(key.family, key.collinearity);
        path.push(Self::file_name(key, compression));
        path
    }

    /// Find the stored file for `key`, preferring the configured
    /// compression.
    fn existing(&self, key: BucketKey) -> Option<(PathBuf, Compression)> {
        let preferred = self.config.compression;
        [preferred, preferred.other()]
            .into_iter()
            .map(|c| (self.path_with(key, c), c))
            .find(|(path, _)| path.is_file())
    }

    fn open(&self, key: BucketKey) -> Result<Option<BufReader<Box<dyn Read>>>> {
        let Some((path, compression)) = self.existing(key) else {
            return Ok(None);
        };

        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(BufReader::new(reader(compression, file))))
    }

    fn read_header(key: BucketKey, reader: &mut impl BufRead) -> Result<usize> {
        let mut header = String::new();
        reader
            .read_line(&mut header)
            .map_err(|e| truncated(key, 0, 0, e))?;

        if !header.ends_with('\n') {
            return Err(Error::IncompleteBucket {
                key,
                expected: 0,
                found: 0,
            });
        }

        let (found, rows) = BucketKey::parse_header(&header)?;
        if found != key {
            return Err(Error::InvalidIdentifier(format!(
                "file for {key} has header for {found}"
            )));
        }

        Ok(rows)
    }

    /// Read the full bucket for `key`.
    ///
    /// Fails with [`Error::IncompleteBucket`] if the header row count does not
    /// match the amount of rows, or the file ends early.
    pub fn read(&self, key: BucketKey) -> Result<Option<Bucket>> {
        let Some(mut reader) = self.open(key)? else {
            return Ok(None);
        };

        let expected = Self::read_header(key, &mut reader)?;

        let mut shapes = HashMap::with_capacity(expected);
        for line in reader.lines() {
            let line = line.map_err(|e| truncated(key, expected, shapes.len(), e))?;
            if line.trim().is_empty() {
                continue;
            }
            let (id, ancestors) = Bucket::parse_line(key.family, &line)?;
            shapes.insert(id, ancestors);
        }

        if shapes.len() != expected {
            return Err(Error::IncompleteBucket {
                key,
                expected,
                found: shapes.len(),
            });
        }

        Ok(Some(Bucket::new(key, shapes)))
    }

    /// Count the body rows for `key`, checking them against the header.
    fn check(&self, key: BucketKey) -> Result<Option<()>> {
        let Some(mut reader) = self.open(key)? else {
            return Ok(None);
        };

        let expected = Self::read_header(key, &mut reader)?;

        let mut found = 0;
        for line in reader.lines() {
            let line = line.map_err(|e| truncated(key, expected, found, e))?;
            if !line.trim().is_empty() {
                found += 1;
            }
        }

        if found != expected {
            return Err(Error::IncompleteBucket {
                key,
                expected,
                found,
            });
        }

        Ok(Some(()))
    }

    /// Write `bucket` to a new temporary file in `dir`.
    fn write(&self, bucket: &Bucket, dir: &Path) -> Result<NamedTempFile> {
        let key = bucket.key();

        let temp = tempfile::Builder::new()
            .prefix(&format!(".{}.", Self::file_name(key, self.config.compression)))
            .suffix(".tmp")
            .tempfile_in(dir)?;

        let mut writer = BufWriter::new(Writer::new(self.config.compression, temp.as_file()));

        writeln!(writer, "{}", key.header(bucket.len()))?;
        for line in bucket.lines() {
            writeln!(writer, "{line}")?;
        }

        let file = writer
            .into_inner()
            .map_err(|e| e.into_error())?
            .finish()?;
        file.sync_all()?;

        Ok(temp)
    }
}

/// A read that ran out of data or hit undecodable bytes means the file was
/// cut short.
fn truncated(key: BucketKey, expected: usize, found: usize, e: io::Error) -> Error {
    match e.kind() {
        ErrorKind::UnexpectedEof | ErrorKind::InvalidData => Error::IncompleteBucket {
            key,
            expected,
            found,
        },
        _ => e.into(),
    }
}

impl BucketStore for FileStore {
    fn load(&self, key: BucketKey) -> Result<Option<Bucket>> {
        match self.read(key) {
            Ok(Some(bucket)) => {
                tracing::debug!(%key, rows = bucket.len(), "loaded bucket");
                Ok(Some(bucket))
            }
            Ok(None) => Ok(None),
            Err(e @ Error::IncompleteBucket { .. }) => {
                tracing::warn!(%key, "ignoring stored bucket: {e}");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn row_count(&self, key: BucketKey) -> Result<Option<usize>> {
        let Some(mut reader) = self.open(key)? else {
            return Ok(None);
        };

        match Self::read_header(key, &mut reader) {
            Ok(rows) => Ok(Some(rows)),
            Err(e @ Error::IncompleteBucket { .. }) => {
                tracing::warn!(%key, "ignoring stored bucket: {e}");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn is_complete(&self, key: BucketKey) -> Result<bool> {
        match self.check(key) {
            Ok(found) => Ok(found.is_some()),
            Err(e @ Error::IncompleteBucket { .. }) => {
                tracing::warn!(%key, "{e}");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Write the bucket to a temporary file next to its final path, then
    /// move it into place.
    ///
    /// If no file was stored for `key`, the move fails rather than replace a
    /// file another writer put there in the meantime. An incomplete file is
    /// replaced.
    fn save(&self, bucket: &Bucket) -> Result<()> {
        let key = bucket.key();

        if self.is_complete(key)? {
            return Err(Error::AlreadyExists(key));
        }

        let dir = self.dir(key.family, key.collinearity);
        std::fs::create_dir_all(&dir)?;

        let final_path = self.path(key);
        let replace = final_path.is_file();

        let temp = self.write(bucket, &dir)?;
        let persisted = if replace {
            temp.persist(&final_path)
        } else {
            temp.persist_noclobber(&final_path)
        };

        if let Err(e) = persisted {
            return Err(match e.error.kind() {
                ErrorKind::AlreadyExists => Error::AlreadyExists(key),
                _ => e.error.into(),
            });
        }

        // Drop any copy stored with the other compression.
        let stale = self.path_with(key, self.config.compression.other());
        if stale.is_file() {
            std::fs::remove_file(stale)?;
        }

        Ok(())
    }
}
