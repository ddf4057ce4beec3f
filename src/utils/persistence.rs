use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Serialize};

use crate::errors::Result;

const TMP_SUFFIX: &str = "tmp";

/// Serializes `value` as pretty JSON and swaps it into place via a staged temp file.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    let tmp = tmp_path(path);
    write_file(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Reads a JSON document written by [`write_json_atomic`].
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

pub fn write_file(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trips_and_leaves_no_tmp_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("value.json");
        write_json_atomic(&path, &vec![1, 2, 3]).expect("write");
        let loaded: Vec<i32> = read_json(&path).expect("read");
        assert_eq!(loaded, vec![1, 2, 3]);
        assert!(!dir.path().join("nested").join("value.json.tmp").exists());
    }

    #[test]
    fn tmp_path_appends_suffix() {
        assert_eq!(
            tmp_path(Path::new("a/config.json")),
            PathBuf::from("a/config.json.tmp")
        );
        assert_eq!(tmp_path(Path::new("a/store")), PathBuf::from("a/store.tmp"));
    }
}
