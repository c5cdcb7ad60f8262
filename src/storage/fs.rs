use crate::error::Result;
use crate::storage::genesis;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory under the data dir holding genesis and the block log.
const DATABASE_DIR: &str = "database";
const GENESIS_FILE: &str = "genesis.json";
const BLOCKS_DB_FILE: &str = "blocks.db";

pub fn database_dir_path(data_dir: &Path) -> PathBuf {
    data_dir.join(DATABASE_DIR)
}

pub fn genesis_json_file_path(data_dir: &Path) -> PathBuf {
    database_dir_path(data_dir).join(GENESIS_FILE)
}

pub fn blocks_db_file_path(data_dir: &Path) -> PathBuf {
    database_dir_path(data_dir).join(BLOCKS_DB_FILE)
}

/// Provision a data directory: write the default genesis manifest and an
/// empty block log if the directory has not been initialized yet.
pub fn init_data_dir_if_not_exists(data_dir: &Path) -> Result<()> {
    let genesis_path = genesis_json_file_path(data_dir);
    if genesis_path.exists() {
        return Ok(());
    }

    info!("Initializing data dir at {}", data_dir.display());

    fs::create_dir_all(database_dir_path(data_dir))?;
    genesis::write_default_genesis(&genesis_path)?;
    fs::write(blocks_db_file_path(data_dir), b"")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_creates_layout() {
        let temp_dir = tempdir().unwrap();
        init_data_dir_if_not_exists(temp_dir.path()).unwrap();

        assert!(genesis_json_file_path(temp_dir.path()).exists());
        assert!(blocks_db_file_path(temp_dir.path()).exists());
        assert_eq!(
            fs::read(blocks_db_file_path(temp_dir.path())).unwrap(),
            b""
        );
    }

    #[test]
    fn test_init_leaves_existing_files_alone() {
        let temp_dir = tempdir().unwrap();
        init_data_dir_if_not_exists(temp_dir.path()).unwrap();

        fs::write(blocks_db_file_path(temp_dir.path()), b"existing\n").unwrap();
        init_data_dir_if_not_exists(temp_dir.path()).unwrap();

        assert_eq!(
            fs::read(blocks_db_file_path(temp_dir.path())).unwrap(),
            b"existing\n"
        );
    }
}
