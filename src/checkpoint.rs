//! Line-oriented checkpoint persistence.
//!
//! Format: first line `MIN MAX`; every subsequent line is `lmax_committed
//! count_so_far`, appended once per commit-phase drain. On load, the last
//! line wins — a crash mid-write leaves at worst one dangling partial line,
//! which a `split_whitespace` + `parse` pair simply fails to match and
//! skips. No `serde` here: a two-column text format doesn't need a
//! structured binary codec.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{VampireError, VampireResult};

fn io_err(context: &'static str) -> impl FnOnce(std::io::Error) -> VampireError {
    move |source| VampireError::Io { context, source }
}

/// What a checkpoint file says about a previous, possibly interrupted, run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    pub min: u64,
    pub max: u64,
    pub lmax_committed: u64,
    pub count: u64,
}

impl Checkpoint {
    /// Read an existing checkpoint, if the file exists and has a usable header.
    pub fn load(path: &Path) -> VampireResult<Option<Checkpoint>> {
        if !path.exists() {
            return Ok(None);
        }
        let file = File::open(path).map_err(io_err("checkpoint read"))?;
        let mut lines = BufReader::new(file).lines();

        let header = match lines.next() {
            Some(line) => line.map_err(io_err("checkpoint read"))?,
            None => return Ok(None),
        };
        let mut header_fields = header.split_whitespace();
        let (min, max) = match (
            header_fields.next().and_then(|s| s.parse::<u64>().ok()),
            header_fields.next().and_then(|s| s.parse::<u64>().ok()),
        ) {
            (Some(min), Some(max)) => (min, max),
            _ => return Ok(None),
        };

        let mut lmax_committed = 0u64;
        let mut count = 0u64;
        for line in lines {
            let line = line.map_err(io_err("checkpoint read"))?;
            let mut fields = line.split_whitespace();
            if let (Some(a), Some(b)) = (fields.next(), fields.next()) {
                if let (Ok(a), Ok(b)) = (a.parse::<u64>(), b.parse::<u64>()) {
                    lmax_committed = a;
                    count = b;
                }
            }
        }

        Ok(Some(Checkpoint {
            min,
            max,
            lmax_committed,
            count,
        }))
    }
}

/// Append-only writer used by the commit phase. One `record` call per drain.
pub struct CheckpointWriter {
    file: BufWriter<File>,
}

impl CheckpointWriter {
    /// Open (creating if absent) the checkpoint file at `path`. Writes a
    /// fresh `MIN MAX` header unless `resuming` is set, in which case the
    /// existing header is left untouched and new records are appended.
    pub fn create(path: &Path, min: u64, max: u64, resuming: bool) -> VampireResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(io_err("checkpoint open"))?;
        let mut file = BufWriter::new(file);
        if !resuming {
            writeln!(file, "{min} {max}").map_err(io_err("checkpoint write"))?;
            file.flush().map_err(io_err("checkpoint write"))?;
        }
        Ok(Self { file })
    }

    pub fn record(&mut self, lmax_committed: u64, count: u64) -> VampireResult<()> {
        writeln!(self.file, "{lmax_committed} {count}").map_err(io_err("checkpoint write"))?;
        self.file.flush().map_err(io_err("checkpoint write"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn temp_path(name: &str) -> std::path::PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!(
            "helsing-checkpoint-test-{name}-{:?}",
            std::thread::current().id()
        ));
        p
    }

    #[test]
    fn missing_file_loads_as_none() {
        let path = temp_path("missing");
        let _ = std::fs::remove_file(&path);
        assert!(Checkpoint::load(&path).unwrap().is_none());
    }

    #[test]
    fn round_trips_header_and_last_record() {
        let path = temp_path("roundtrip");
        let _ = std::fs::remove_file(&path);

        {
            let mut writer = CheckpointWriter::create(&path, 1000, 9999, false).unwrap();
            writer.record(1999, 0).unwrap();
            writer.record(2999, 3).unwrap();
        }

        let checkpoint = Checkpoint::load(&path).unwrap().expect("checkpoint present");
        assert_eq!(checkpoint.min, 1000);
        assert_eq!(checkpoint.max, 9999);
        assert_eq!(checkpoint.lmax_committed, 2999);
        assert_eq!(checkpoint.count, 3);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn resuming_preserves_the_original_header() {
        let path = temp_path("resume");
        let _ = std::fs::remove_file(&path);

        {
            let mut writer = CheckpointWriter::create(&path, 1000, 9999, false).unwrap();
            writer.record(1999, 0).unwrap();
        }
        {
            let mut writer = CheckpointWriter::create(&path, 1000, 9999, true).unwrap();
            writer.record(2999, 3).unwrap();
        }

        let checkpoint = Checkpoint::load(&path).unwrap().expect("checkpoint present");
        assert_eq!(checkpoint.lmax_committed, 2999);
        assert_eq!(checkpoint.count, 3);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn trailing_partial_line_is_skipped() {
        let path = temp_path("partial");
        let _ = std::fs::remove_file(&path);

        {
            let mut file = File::create(&path).unwrap();
            writeln!(file, "1000 9999").unwrap();
            writeln!(file, "1999 5").unwrap();
            write!(file, "29").unwrap(); // no trailing newline, no second field
        }

        let checkpoint = Checkpoint::load(&path).unwrap().expect("checkpoint present");
        assert_eq!(checkpoint.lmax_committed, 1999);
        assert_eq!(checkpoint.count, 5);

        let _ = std::fs::remove_file(&path);
    }
}
