//! Persistence store: a fixed 512-byte save file of 256 native-endian words.
//!
//! The file is opened on first use and kept open until [`SaveStore::close`]
//! (machine reset) or drop. A missing or wrongly sized file is recreated
//! with zero content.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use hss_common_core::layout::{Word, SAVE_FILE_BYTES, SAVE_SLOTS};

use crate::error::{VmError, VmResult};
use crate::{info, warn};

/// Save file belonging to an image: same path, `.sav` extension.
pub fn save_path_for(image: &Path) -> PathBuf {
    image.with_extension("sav")
}

#[derive(Debug)]
pub struct SaveStore {
    path: PathBuf,
    file: Option<File>,
}

impl SaveStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    pub fn read(&mut self, slot: u16) -> VmResult<Word> {
        let mut word = [0; 1];
        self.read_range(slot, &mut word).map_err(|e| slot_error(e, slot))?;
        Ok(word[0])
    }

    pub fn write(&mut self, slot: u16, value: Word) -> VmResult<()> {
        self.write_range(slot, &[value]).map_err(|e| slot_error(e, slot))
    }

    /// Fill `out` from slots `start..start + out.len()`.
    pub fn read_range(&mut self, start: u16, out: &mut [Word]) -> VmResult<()> {
        check_range(start, out.len())?;
        if out.is_empty() {
            return Ok(());
        }

        let path = self.path.clone();
        let file = self.file()?;
        let mut bytes = vec![0u8; out.len() * 2];
        file.seek(SeekFrom::Start(start as u64 * 2))
            .and_then(|_| file.read_exact(&mut bytes))
            .map_err(|e| VmError::save(&path, e))?;
        for (word, pair) in out.iter_mut().zip(bytes.chunks_exact(2)) {
            *word = Word::from_ne_bytes([pair[0], pair[1]]);
        }
        Ok(())
    }

    /// Store `words` into slots `start..start + words.len()`.
    pub fn write_range(&mut self, start: u16, words: &[Word]) -> VmResult<()> {
        check_range(start, words.len())?;
        if words.is_empty() {
            return Ok(());
        }

        let path = self.path.clone();
        let file = self.file()?;
        let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_ne_bytes()).collect();
        file.seek(SeekFrom::Start(start as u64 * 2))
            .and_then(|_| file.write_all(&bytes))
            .map_err(|e| VmError::save(&path, e))
    }

    /// Flush and release the file. The next access reopens it.
    pub fn close(&mut self) -> VmResult<()> {
        if let Some(file) = self.file.take() {
            file.sync_all().map_err(|e| VmError::save(&self.path, e))?;
        }
        Ok(())
    }

    fn file(&mut self) -> VmResult<&mut File> {
        let file = match self.file.take() {
            Some(file) => file,
            None => open_save_file(&self.path).map_err(|e| VmError::save(&self.path, e))?,
        };
        Ok(self.file.insert(file))
    }
}

fn open_save_file(path: &Path) -> std::io::Result<File> {
    let existed = path.exists();
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;

    let len = file.metadata()?.len();
    if len != SAVE_FILE_BYTES as u64 {
        if existed {
            warn!(
                "save file {} is {} bytes, expected {}; recreating it",
                path.display(),
                len,
                SAVE_FILE_BYTES
            );
        } else {
            info!("creating save file {}", path.display());
        }
        file.set_len(0)?;
        file.set_len(SAVE_FILE_BYTES as u64)?;
    }
    Ok(file)
}

fn check_range(start: u16, len: usize) -> VmResult<()> {
    if start as usize + len > SAVE_SLOTS {
        return Err(VmError::SaveRangeOutOfBounds {
            start,
            len: len as u16,
        });
    }
    Ok(())
}

fn slot_error(e: VmError, slot: u16) -> VmError {
    match e {
        VmError::SaveRangeOutOfBounds { .. } => VmError::SaveSlotOutOfRange(slot),
        other => other,
    }
}
