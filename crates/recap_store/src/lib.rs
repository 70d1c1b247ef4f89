//! # Recap Store
//!
//! Filesystem layout for yt-recap runs. Each invocation writes into its own
//! date-stamped run folder below an output root:
//!
//! ```text
//! <output_root>/<MMDDYY_HHMM[_N]>/transcripts/<video_id>_transcript.txt
//! <output_root>/<MMDDYY_HHMM[_N]>/summaries/<video_id>_summary.md
//! ```
//!
//! Prior run folders (and the older flat `transcripts/` / `summaries/` layout)
//! are scanned into a [`ReuseIndex`] so artifacts can be copied forward instead
//! of being downloaded or generated again.

mod domain;
mod error;
mod reuse;
mod run_folder;

pub use domain::{ArtifactKind, Video};
pub use error::StoreError;
pub use reuse::{reuse_sources, ReuseIndex, ReuseSource};
pub use run_folder::{ParseRunIdError, RunFolder, RunId};
