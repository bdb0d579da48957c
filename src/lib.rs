//! sgmatch is a CPU-first semi-global matching (SGM) stereo disparity library.
//!
//! The pipeline computes windowed block-matching costs, aggregates them along
//! 4 or 8 scanline directions with discontinuity penalties, selects per-pixel
//! winners with sub-pixel refinement, and prunes unreliable pixels via
//! left-right consistency, uniqueness, and speckle filters. A batch driver
//! processes whole datasets of stereo scenes, with optional parallelism via
//! the `rayon` feature.

pub mod aggregate;
pub mod cost;
pub mod dataset;
pub mod disparity;
pub mod filter;
pub mod image;
pub mod normalize;
pub mod params;
pub mod select;
mod trace;
pub mod util;

mod matcher;

pub use disparity::DisparityMap;
pub use image::io::{load_gray_image, save_gray_image};
pub use image::{ImageView, OwnedImage, StereoPair};
pub use matcher::SgmMatcher;
pub use normalize::normalize_disparity;
pub use params::{AggregationPaths, SgmParams, DISPARITY_GRANULARITY};
pub use util::{SgmError, SgmResult};

pub use cost::{build_cost_volume, CostVolume, MatchDirection};
pub use dataset::{
    load_stereo_pair, locate_scenes, process_scene, resolve_scene, run_batch, write_outputs,
    BatchReport, SceneOutcome, SceneOutputs, SceneRecord,
};
