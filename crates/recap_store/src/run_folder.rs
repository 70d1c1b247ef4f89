use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
    str::FromStr,
    sync::LazyLock,
};

use chrono::{NaiveDateTime, Timelike};
use regex::Regex;

use crate::{domain::ArtifactKind, error::StoreError};

const RUN_ID_FORMAT: &str = "%m%d%y_%H%M";

static RUN_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{6}_\d{4})(?:_([1-9]\d*))?$").unwrap());

/// Identifier of a run folder: `MMDDYY_HHMM`, plus `_N` when several runs
/// started in the same minute.
///
/// Ordering is chronological (minute first, then suffix). Comparing the folder
/// names as strings is not: `MMDDYY` breaks across year boundaries and `_10`
/// would sort before `_2`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunId {
    minute: NaiveDateTime,
    suffix: u32,
}

impl RunId {
    /// Base identifier (no suffix) for the wall-clock minute containing `now`
    pub fn at_minute(now: NaiveDateTime) -> Self {
        let minute = now
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(now);

        RunId { minute, suffix: 0 }
    }

    pub fn with_suffix(&self, suffix: u32) -> Self {
        RunId {
            minute: self.minute,
            suffix,
        }
    }

    pub fn minute(&self) -> NaiveDateTime {
        self.minute
    }

    /// `0` for the first run of a minute
    pub fn suffix(&self) -> u32 {
        self.suffix
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.minute.format(RUN_ID_FORMAT))?;
        if self.suffix > 0 {
            write!(f, "_{}", self.suffix)?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Not a run folder name: {0}")]
pub struct ParseRunIdError(String);

impl FromStr for RunId {
    type Err = ParseRunIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseRunIdError(s.to_string());

        let caps = RUN_ID_RE.captures(s).ok_or_else(invalid)?;
        let minute = NaiveDateTime::parse_from_str(&caps[1], RUN_ID_FORMAT)
            .map_err(|_| invalid())?;
        let suffix = match caps.get(2) {
            Some(m) => m.as_str().parse::<u32>().map_err(|_| invalid())?,
            None => 0,
        };

        Ok(RunId { minute, suffix })
    }
}

/// One invocation's output location.
#[derive(Debug, Clone)]
pub struct RunFolder {
    id: RunId,
    path: PathBuf,
}

impl RunFolder {
    /// Creates a fresh run folder below `output_root` for the minute of `now`,
    /// together with its `transcripts/` and `summaries/` subfolders.
    ///
    /// Candidates are tried as `<base>`, `<base>_1`, `<base>_2`, ... and each is
    /// claimed with a non-recursive `create_dir`, so an existing folder (from an
    /// earlier run in the same minute) is never reused.
    #[tracing::instrument(skip_all, fields(output_root = %output_root.as_ref().display()))]
    pub fn create(output_root: impl AsRef<Path>, now: NaiveDateTime) -> Result<Self, StoreError> {
        let output_root = output_root.as_ref();

        fs::create_dir_all(output_root).map_err(|source| StoreError::RunFolderCreation {
            path: output_root.to_path_buf(),
            source,
        })?;

        let base = RunId::at_minute(now);
        let mut suffix = 0;

        loop {
            let id = base.with_suffix(suffix);
            let path = output_root.join(id.to_string());

            match fs::create_dir(&path) {
                Ok(()) => return Self::init_subfolders(id, path),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    tracing::debug!(path = %path.display(), "Run folder taken, trying next suffix");
                    suffix += 1;
                }
                Err(source) => return Err(StoreError::RunFolderCreation { path, source }),
            }
        }
    }

    fn init_subfolders(id: RunId, path: PathBuf) -> Result<Self, StoreError> {
        for kind in ArtifactKind::ALL {
            let subfolder = path.join(kind.dir_name());

            if let Err(source) = fs::create_dir(&subfolder) {
                // never leave a run folder behind without both subfolders
                if let Err(e) = fs::remove_dir_all(&path) {
                    tracing::warn!(error = ?e, path = %path.display(), "Failed to remove incomplete run folder");
                }
                return Err(StoreError::RunFolderCreation {
                    path: subfolder,
                    source,
                });
            }
        }

        tracing::info!(run_folder = %path.display(), "Created run folder");
        Ok(RunFolder { id, path })
    }

    pub fn id(&self) -> &RunId {
        &self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn transcripts_dir(&self) -> PathBuf {
        self.path.join(ArtifactKind::Transcript.dir_name())
    }

    pub fn summaries_dir(&self) -> PathBuf {
        self.path.join(ArtifactKind::Summary.dir_name())
    }

    pub fn artifact_path(&self, kind: ArtifactKind, video_id: &str) -> PathBuf {
        self.path.join(kind.dir_name()).join(kind.file_name(video_id))
    }

    /// Writes a freshly produced artifact. A failed write removes whatever was
    /// partially written.
    pub fn write_artifact(
        &self,
        kind: ArtifactKind,
        video_id: &str,
        contents: &str,
    ) -> Result<PathBuf, StoreError> {
        let path = self.artifact_path(kind, video_id);

        if let Err(source) = fs::write(&path, contents) {
            let _ = fs::remove_file(&path);
            return Err(StoreError::Write { path, source });
        }

        Ok(path)
    }

    /// Copies an artifact from a prior run. The source is left untouched.
    pub fn copy_artifact(
        &self,
        kind: ArtifactKind,
        video_id: &str,
        from: &Path,
    ) -> Result<PathBuf, StoreError> {
        let to = self.artifact_path(kind, video_id);

        if let Err(source) = fs::copy(from, &to) {
            let _ = fs::remove_file(&to);
            return Err(StoreError::Copy {
                from: from.to_path_buf(),
                to,
                source,
            });
        }

        Ok(to)
    }
}
