//! [`TranscriptFile`]: a transcript persisted as a JSON array of turns.

use std::{
  ffi::OsString,
  io::ErrorKind,
  path::{Path, PathBuf},
};

use murmur_core::turn::{Transcript, Turn};

use crate::{Error, Result};

/// A transcript stored at a fixed path.
///
/// Holds no open handle; every call opens the file afresh.
#[derive(Debug, Clone)]
pub struct TranscriptFile {
  path:      PathBuf,
  max_turns: Option<usize>,
}

impl TranscriptFile {
  /// `max_turns` is applied to every transcript this file loads.
  pub fn new(path: impl Into<PathBuf>, max_turns: Option<usize>) -> Self {
    Self { path: path.into(), max_turns }
  }

  pub fn path(&self) -> &Path { &self.path }

  /// Read the transcript. A missing file is an empty transcript, not an
  /// error.
  pub async fn load(&self) -> Result<Transcript> {
    let bytes = match tokio::fs::read(&self.path).await {
      Ok(bytes) => bytes,
      Err(e) if e.kind() == ErrorKind::NotFound => {
        return Ok(Transcript::from_turns(Vec::new(), self.max_turns));
      }
      Err(source) => return Err(Error::Read { path: self.path.clone(), source }),
    };

    let turns: Vec<Turn> = serde_json::from_slice(&bytes)
      .map_err(|source| Error::Decode { path: self.path.clone(), source })?;
    Ok(Transcript::from_turns(turns, self.max_turns))
  }

  /// Overwrite the file with every turn in `transcript`.
  pub async fn save(&self, transcript: &Transcript) -> Result<()> {
    let json = serde_json::to_vec_pretty(transcript.turns())?;

    if let Some(parent) = self.path.parent()
      && !parent.as_os_str().is_empty()
    {
      tokio::fs::create_dir_all(parent)
        .await
        .map_err(|source| Error::Write { path: parent.to_path_buf(), source })?;
    }

    let tmp = self.temp_path();
    tokio::fs::write(&tmp, &json)
      .await
      .map_err(|source| Error::Write { path: tmp.clone(), source })?;
    tokio::fs::rename(&tmp, &self.path)
      .await
      .map_err(|source| Error::Write { path: self.path.clone(), source })?;
    Ok(())
  }

  fn temp_path(&self) -> PathBuf {
    let mut name = self.path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    self.path.with_file_name(name)
  }
}
