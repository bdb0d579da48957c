//! Dataset traversal, pair loading, output writing, and the batch driver.
//!
//! A dataset root contains one directory per scene. Left/right images are
//! resolved against a fixed priority list of filename conventions covering
//! the common Middlebury layouts. The batch driver isolates failures per
//! scene: one broken scene never aborts the batch, and every outcome is
//! reported as a structured value rather than console output.

use crate::disparity::DisparityMap;
use crate::image::io::{load_gray_image, save_gray_image};
use crate::image::{OwnedImage, StereoPair};
use crate::matcher::SgmMatcher;
use crate::normalize::normalize_disparity;
use crate::trace::{trace_event, trace_span};
use crate::util::{SgmError, SgmResult};
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Filename conventions tried in order when resolving a scene.
const PAIR_CONVENTIONS: [(&str, &str); 4] = [
    ("im0.png", "im1.png"),
    ("im2.png", "im6.png"),
    ("left.png", "right.png"),
    ("view1.png", "view5.png"),
];

/// A located scene: identifier plus resolved image paths.
#[derive(Clone, Debug)]
pub struct SceneRecord {
    pub name: String,
    pub left_path: PathBuf,
    pub right_path: PathBuf,
}

/// Paths written for one successfully processed scene.
#[derive(Clone, Debug)]
pub struct SceneOutputs {
    pub left: PathBuf,
    pub right: PathBuf,
    pub disparity: PathBuf,
}

/// Outcome of one scene, success or failure, in enumeration order.
pub struct SceneOutcome {
    pub scene: String,
    pub result: SgmResult<SceneOutputs>,
    /// Non-fatal problems (e.g. a reference-image write that failed while
    /// the disparity output itself succeeded).
    pub warnings: Vec<String>,
}

/// Ordered per-scene outcomes of a batch run.
pub struct BatchReport {
    pub outcomes: Vec<SceneOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &SceneOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = &SceneOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(|o| o.result.is_err())
    }
}

/// Resolves the left/right paths of a single scene directory, trying each
/// filename convention in priority order.
pub fn resolve_scene(scene_dir: &Path) -> SgmResult<SceneRecord> {
    let name = scene_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    for (left, right) in PAIR_CONVENTIONS {
        let left_path = scene_dir.join(left);
        let right_path = scene_dir.join(right);
        if left_path.is_file() && right_path.is_file() {
            return Ok(SceneRecord {
                name,
                left_path,
                right_path,
            });
        }
    }
    Err(SgmError::SceneResolution { scene: name })
}

/// Enumerates scene directories under `dataset_root`, sorted lexically by
/// name so batch order is deterministic. Each entry resolves to a record or
/// to the resolution error that will be reported for it.
pub fn locate_scenes(dataset_root: &Path) -> SgmResult<Vec<(String, SgmResult<SceneRecord>)>> {
    let entries = fs::read_dir(dataset_root).map_err(|source| SgmError::Io {
        path: dataset_root.to_path_buf(),
        source,
    })?;

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();

    Ok(dirs
        .into_iter()
        .map(|dir| {
            let name = dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let record = resolve_scene(&dir);
            (name, record)
        })
        .collect())
}

/// Loads and validates a stereo pair from the record's paths.
pub fn load_stereo_pair(record: &SceneRecord) -> SgmResult<StereoPair> {
    let left = load_gray_image(&record.left_path)?;
    let right = load_gray_image(&record.right_path)?;
    StereoPair::new(left, right).map_err(|err| SgmError::Load {
        path: record.left_path.clone(),
        reason: err.to_string(),
    })
}

/// Writes the three per-scene outputs into `output_dir`, creating it if
/// absent. The reference-image writes are independent of the disparity
/// write: their failures are returned as warnings, while a failed disparity
/// write fails the scene.
pub fn write_outputs(
    scene: &str,
    output_dir: &Path,
    pair: &StereoPair,
    disparity: &OwnedImage,
) -> (SgmResult<SceneOutputs>, Vec<String>) {
    if let Err(source) = fs::create_dir_all(output_dir) {
        return (
            Err(SgmError::Io {
                path: output_dir.to_path_buf(),
                source,
            }),
            Vec::new(),
        );
    }

    let outputs = SceneOutputs {
        left: output_dir.join(format!("{scene}_left.png")),
        right: output_dir.join(format!("{scene}_right.png")),
        disparity: output_dir.join(format!("{scene}_disparity.png")),
    };

    let mut warnings = Vec::new();
    if let Err(err) = save_gray_image(pair.left(), &outputs.left) {
        warnings.push(err.to_string());
    }
    if let Err(err) = save_gray_image(pair.right(), &outputs.right) {
        warnings.push(err.to_string());
    }
    match save_gray_image(disparity, &outputs.disparity) {
        Ok(()) => (Ok(outputs), warnings),
        Err(err) => (Err(err), warnings),
    }
}

/// Runs the full pipeline for one resolved scene.
pub fn process_scene(
    matcher: &SgmMatcher,
    record: &SceneRecord,
    output_dir: &Path,
) -> (SgmResult<SceneOutputs>, Vec<String>) {
    let _guard = trace_span!("scene", scene = record.name.as_str()).entered();
    let pair = match load_stereo_pair(record) {
        Ok(pair) => pair,
        Err(err) => return (Err(err), Vec::new()),
    };
    let map: DisparityMap = match matcher.compute(&pair) {
        Ok(map) => map,
        Err(err) => return (Err(err), Vec::new()),
    };
    let normalized = normalize_disparity(&map);
    write_outputs(&record.name, output_dir, &pair, &normalized)
}

/// Processes every scene under `dataset_root`, never aborting on a single
/// failure. Outcomes come back in lexical scene order; with the `rayon`
/// feature enabled, scenes run on a worker pool and the order-preserving
/// collect keeps the report deterministic.
pub fn run_batch(
    matcher: &SgmMatcher,
    dataset_root: &Path,
    output_dir: &Path,
) -> SgmResult<BatchReport> {
    let scenes = locate_scenes(dataset_root)?;
    trace_event!("batch_start", scenes = scenes.len());

    let run_one = |(name, record): (String, SgmResult<SceneRecord>)| -> SceneOutcome {
        match record {
            Ok(record) => {
                let (result, warnings) = process_scene(matcher, &record, output_dir);
                SceneOutcome {
                    scene: name,
                    result,
                    warnings,
                }
            }
            Err(err) => SceneOutcome {
                scene: name,
                result: Err(err),
                warnings: Vec::new(),
            },
        }
    };

    #[cfg(feature = "rayon")]
    let outcomes: Vec<SceneOutcome> = scenes.into_par_iter().map(run_one).collect();

    #[cfg(not(feature = "rayon"))]
    let outcomes: Vec<SceneOutcome> = scenes.into_iter().map(run_one).collect();

    Ok(BatchReport { outcomes })
}
