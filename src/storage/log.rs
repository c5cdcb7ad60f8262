use crate::core::BlockRecord;
use crate::error::{LedgerError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};

/// Read every block record from the log, strictly in file order.
///
/// A line that fails to parse is fatal unless it is the trailing line of the
/// file, which covers a crash mid-write of the last record. A record whose
/// stored hash does not match its block's content hash is corruption and is
/// always fatal, trailing or not.
pub fn read_records(reader: impl Read) -> Result<Vec<BlockRecord>> {
    let mut lines = Vec::new();
    for line in BufReader::new(reader).lines() {
        lines.push(line?);
    }

    let mut records = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        let is_trailing = idx + 1 == lines.len();

        let record: BlockRecord = match serde_json::from_str(line) {
            Ok(record) => record,
            Err(_) if is_trailing => break,
            Err(e) => {
                return Err(LedgerError::MalformedRecord {
                    line: idx + 1,
                    reason: e.to_string(),
                })
            }
        };

        let computed = record.value.hash()?;
        if record.key != computed {
            return Err(LedgerError::MalformedRecord {
                line: idx + 1,
                reason: format!(
                    "record hash {} does not match block content hash {computed}",
                    record.key
                ),
            });
        }

        records.push(record);
    }

    Ok(records)
}

/// Append one record as a single JSON line and flush it.
///
/// The whole line is written with one `write_all` so a reader never observes
/// a record interleaved with another write (single-writer discipline).
pub fn append_record(file: &mut File, record: &BlockRecord) -> Result<()> {
    let mut line = serde_json::to_vec(record)?;
    line.push(b'\n');

    file.write_all(&line)?;
    file.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Block, Hash, Transaction};
    use std::fs::OpenOptions;
    use tempfile::tempdir;

    fn sample_record(height: u64) -> BlockRecord {
        let block = Block::new(
            Hash::zero(),
            height,
            1_700_000_000,
            vec![Transaction::new("alice".into(), "bob".into(), 1, "")],
        );
        BlockRecord::new(block.hash().unwrap(), block)
    }

    #[test]
    fn test_append_then_read_round_trip() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("blocks.db");

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .unwrap();
        append_record(&mut file, &sample_record(0)).unwrap();
        append_record(&mut file, &sample_record(1)).unwrap();

        let records = read_records(File::open(&path).unwrap()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].value.header.height, 0);
        assert_eq!(records[1].value.header.height, 1);
    }

    #[test]
    fn test_truncated_trailing_line_is_tolerated() {
        let record = sample_record(0);
        let mut data = serde_json::to_vec(&record).unwrap();
        data.push(b'\n');
        data.extend_from_slice(b"{\"hash\": \"dead");

        let records = read_records(data.as_slice()).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_empty_log_is_empty_chain() {
        let records = read_records(&b""[..]).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_garbage_before_valid_record_is_fatal() {
        let record = sample_record(0);
        let mut data = b"not json\n".to_vec();
        data.extend(serde_json::to_vec(&record).unwrap());
        data.push(b'\n');

        let err = read_records(data.as_slice()).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::MalformedRecord { line: 1, .. }
        ));
    }

    #[test]
    fn test_hash_mismatch_is_fatal_even_when_trailing() {
        let mut record = sample_record(0);
        record.key = Hash::from([7u8; 32]);
        let mut data = serde_json::to_vec(&record).unwrap();
        data.push(b'\n');

        let err = read_records(data.as_slice()).unwrap_err();
        assert!(matches!(err, LedgerError::MalformedRecord { .. }));
    }
}
