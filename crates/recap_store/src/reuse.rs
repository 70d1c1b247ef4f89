use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use itertools::Itertools;

use crate::{domain::ArtifactKind, run_folder::RunId};

/// A location prior artifacts can be copied from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReuseSource {
    /// A datetime run folder from an earlier invocation
    RunFolder { id: RunId, path: PathBuf },
    /// The flat `transcripts/` + `summaries/` layout that predates run folders
    Legacy(PathBuf),
}

impl ReuseSource {
    pub fn root(&self) -> &Path {
        match self {
            ReuseSource::RunFolder { path, .. } => path,
            ReuseSource::Legacy(path) => path,
        }
    }

    pub fn artifact_dir(&self, kind: ArtifactKind) -> PathBuf {
        self.root().join(kind.dir_name())
    }
}

/// Lists the places to look for prior artifacts, in precedence order: run
/// folders under `output_root` newest first (skipping `exclude`, the folder of
/// the current run), then the legacy layout under `legacy_root`.
#[tracing::instrument(skip_all)]
pub fn reuse_sources(
    output_root: &Path,
    legacy_root: &Path,
    exclude: Option<&RunId>,
) -> Vec<ReuseSource> {
    let entries = match fs::read_dir(output_root) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(error = ?e, output_root = %output_root.display(), "No prior run folders");
            return vec![ReuseSource::Legacy(legacy_root.to_path_buf())];
        }
    };

    let mut sources = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter_map(|e| {
            let id = e.file_name().to_str()?.parse::<RunId>().ok()?;
            Some((id, e.path()))
        })
        .filter(|(id, _)| Some(id) != exclude)
        .sorted_by(|(a, _), (b, _)| b.cmp(a))
        .map(|(id, path)| ReuseSource::RunFolder { id, path })
        .collect::<Vec<_>>();

    sources.push(ReuseSource::Legacy(legacy_root.to_path_buf()));
    sources
}

/// Video id -> path of the most recent prior artifact.
#[derive(Debug, Default)]
pub struct ReuseIndex {
    transcripts: HashMap<String, PathBuf>,
    summaries: HashMap<String, PathBuf>,
}

impl ReuseIndex {
    /// Scans `sources` in order; the first source holding a non-blank artifact
    /// for a video id wins. Summaries are only indexed with `include_summaries`.
    /// Missing directories simply contribute nothing.
    #[tracing::instrument(skip(sources))]
    pub fn build(sources: &[ReuseSource], include_summaries: bool) -> Self {
        let mut index = ReuseIndex::default();

        for source in sources {
            scan_source(source, ArtifactKind::Transcript, &mut index.transcripts);
            if include_summaries {
                scan_source(source, ArtifactKind::Summary, &mut index.summaries);
            }
        }

        tracing::info!(
            sources = sources.len(),
            transcripts = index.transcripts.len(),
            summaries = index.summaries.len(),
            "Built reuse index"
        );

        index
    }

    pub fn transcript(&self, video_id: &str) -> Option<&Path> {
        self.transcripts.get(video_id).map(PathBuf::as_path)
    }

    pub fn summary(&self, video_id: &str) -> Option<&Path> {
        self.summaries.get(video_id).map(PathBuf::as_path)
    }

    pub fn transcript_count(&self) -> usize {
        self.transcripts.len()
    }

    pub fn summary_count(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcripts.is_empty() && self.summaries.is_empty()
    }
}

fn scan_source(source: &ReuseSource, kind: ArtifactKind, entries: &mut HashMap<String, PathBuf>) {
    let dir = source.artifact_dir(kind);
    let Ok(dir_entries) = fs::read_dir(&dir) else {
        return;
    };

    for entry in dir_entries.filter_map(|e| e.ok()) {
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        if !metadata.is_file() || metadata.len() == 0 {
            continue;
        }

        let file_name = entry.file_name();
        let Some(video_id) = file_name
            .to_str()
            .and_then(|name| kind.video_id_from_file_name(name))
        else {
            continue;
        };
        if entries.contains_key(video_id) {
            continue;
        }

        // a blank artifact is a failed earlier write, not a usable one
        let path = entry.path();
        if !has_content(&path) {
            tracing::debug!(path = %path.display(), "Ignoring blank artifact");
            continue;
        }

        entries.insert(video_id.to_string(), path);
    }
}

fn has_content(path: &Path) -> bool {
    fs::read_to_string(path)
        .map(|text| !text.trim().is_empty())
        .unwrap_or(false)
}
