//! Sequence sources: ordered, rewindable streams of `(name, bases)` records.
//!
//! End of input is `Ok(None)`, distinct from a read error.

use bio::io::fasta;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

/// One named sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeqRecord {
    pub name: String,
    pub bases: Vec<u8>,
}

impl SeqRecord {
    pub fn new(name: impl Into<String>, bases: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bases: bases.into(),
        }
    }
}

/// Ordered, finite, rewindable record stream.
pub trait SequenceSource {
    /// Restart from the first record.
    fn rewind(&mut self) -> io::Result<()>;

    /// Next record, `Ok(None)` at end of input.
    fn next_record(&mut self) -> io::Result<Option<SeqRecord>>;
}

/// In-memory records.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    records: Vec<SeqRecord>,
    pos: usize,
}

impl MemorySource {
    pub fn new(records: Vec<SeqRecord>) -> Self {
        Self { records, pos: 0 }
    }
}

impl FromIterator<SeqRecord> for MemorySource {
    fn from_iter<I: IntoIterator<Item = SeqRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl SequenceSource for MemorySource {
    fn rewind(&mut self) -> io::Result<()> {
        self.pos = 0;
        Ok(())
    }

    fn next_record(&mut self) -> io::Result<Option<SeqRecord>> {
        let rec = self.records.get(self.pos).cloned();
        if rec.is_some() {
            self.pos += 1;
        }
        Ok(rec)
    }
}

type FastaRecords = fasta::Records<BufReader<Box<dyn Read>>>;

/// FASTA file source, plain or gzip-compressed (`.gz`). Rewinding reopens the file.
pub struct FastaSource {
    path: PathBuf,
    records: FastaRecords,
}

impl FastaSource {
    /// Open `path`. Fails if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let records = open_records(&path)?;
        Ok(Self { path, records })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn open_records(path: &Path) -> io::Result<FastaRecords> {
    const BUFFER_SIZE: usize = 1 << 20;

    let file = File::open(path)?;
    let reader: Box<dyn Read> = if path.extension().is_some_and(|e| e == "gz") {
        log::debug!("reading {} as gzip", path.display());
        Box::new(MultiGzDecoder::new(file))
    } else {
        Box::new(file)
    };
    let reader = BufReader::with_capacity(BUFFER_SIZE, reader);
    Ok(fasta::Reader::from_bufread(reader).records())
}

impl SequenceSource for FastaSource {
    fn rewind(&mut self) -> io::Result<()> {
        self.records = open_records(&self.path)?;
        Ok(())
    }

    fn next_record(&mut self) -> io::Result<Option<SeqRecord>> {
        match self.records.next() {
            Some(Ok(rec)) => Ok(Some(SeqRecord::new(rec.id(), rec.seq()))),
            Some(Err(e)) => Err(io::Error::new(io::ErrorKind::InvalidData, e)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    fn drain(src: &mut impl SequenceSource) -> Vec<SeqRecord> {
        let mut out = Vec::new();
        while let Some(rec) = src.next_record().unwrap() {
            out.push(rec);
        }
        out
    }

    #[test]
    fn memory_source_rewinds() {
        let mut src: MemorySource = vec![SeqRecord::new("a", "ACGT"), SeqRecord::new("b", "TT")]
            .into_iter()
            .collect();
        assert_eq!(drain(&mut src).len(), 2);
        assert_eq!(src.next_record().unwrap(), None);
        src.rewind().unwrap();
        assert_eq!(src.next_record().unwrap().unwrap().name, "a");
    }

    #[test]
    fn fasta_source_reads_and_rewinds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("te.fa");
        std::fs::write(&path, ">L1 family\nACGT\nTTGA\n>Alu\nGGCC\n").unwrap();

        let mut src = FastaSource::open(&path).unwrap();
        let recs = drain(&mut src);
        assert_eq!(
            recs,
            vec![SeqRecord::new("L1", "ACGTTTGA"), SeqRecord::new("Alu", "GGCC")]
        );
        src.rewind().unwrap();
        assert_eq!(drain(&mut src), recs);
    }

    #[test]
    fn fasta_source_reads_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("te.fa.gz");
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(b">SVA\nACGTAC\n").unwrap();
        std::fs::write(&path, enc.finish().unwrap()).unwrap();

        let mut src = FastaSource::open(&path).unwrap();
        assert_eq!(drain(&mut src), vec![SeqRecord::new("SVA", "ACGTAC")]);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FastaSource::open(dir.path().join("absent.fa")).is_err());
    }
}
