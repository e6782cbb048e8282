//! Python bindings for the ghmatch Generalized Hough shape matcher.
//!
//! Code images are passed as 2D `uint8` numpy arrays whose values are
//! orientation codes (0 = masked). Accumulators come back as `uint32` arrays.

use std::sync::Arc;

use numpy::{PyArray1, PyArray2, PyArrayMethods, PyReadonlyArray2, PyUntypedArrayMethods};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use ghmatch::{
    BuildConfig as RustBuildConfig, GhMatchError, IdealVotes, ImageView,
    LookupTable as RustLookupTable, Match as RustMatch, Matcher as RustMatcher,
    MatcherConfig as RustMatcherConfig, TableStrategy, VoteConfig as RustVoteConfig, VoteMode,
};

/// Convert a GhMatchError to a Python exception.
fn to_py_err(err: GhMatchError) -> PyErr {
    match err {
        GhMatchError::InvalidStep { .. } | GhMatchError::InvalidInput(_) => {
            PyValueError::new_err(err.to_string())
        }
        _ => PyRuntimeError::new_err(err.to_string()),
    }
}

fn codes_view<'a>(codes: &'a PyReadonlyArray2<'_, u8>) -> PyResult<ImageView<'a, u8>> {
    let shape = codes.shape();
    let height = shape[0];
    let width = shape[1];
    let data = codes.as_slice()?;
    ImageView::from_slice(data, width, height).map_err(to_py_err)
}

fn parse_build_config(strategy: &str, ideal: &str) -> PyResult<RustBuildConfig> {
    let strategy = match strategy.to_lowercase().as_str() {
        "weighted_merge" => TableStrategy::WeightedMerge,
        "unweighted_list" => TableStrategy::UnweightedList,
        _ => {
            return Err(PyValueError::new_err(
                "strategy must be 'weighted_merge' or 'unweighted_list'",
            ))
        }
    };
    let ideal = match ideal.to_lowercase().as_str() {
        "self_match" => IdealVotes::SelfMatch,
        "pixel_count" => IdealVotes::PixelCount,
        _ => {
            return Err(PyValueError::new_err(
                "ideal must be 'self_match' or 'pixel_count'",
            ))
        }
    };
    Ok(RustBuildConfig { strategy, ideal })
}

fn vote_config(step: usize, bounded: bool, parallel: bool) -> PyResult<RustVoteConfig> {
    let cfg = RustVoteConfig {
        step,
        mode: if bounded {
            VoteMode::Bounded
        } else {
            VoteMode::AllPixels
        },
        parallel,
    };
    cfg.validate().map_err(to_py_err)?;
    Ok(cfg)
}

/// Best match: template center, raw votes and confidence.
#[pyclass]
#[derive(Clone)]
pub struct Match {
    /// Column of the template center.
    #[pyo3(get)]
    pub x: usize,
    /// Row of the template center.
    #[pyo3(get)]
    pub y: usize,
    /// Raw vote count at the peak.
    #[pyo3(get)]
    pub votes: u32,
    /// Step-compensated confidence (1.0 = perfect self-match).
    #[pyo3(get)]
    pub confidence: f32,
}

#[pymethods]
impl Match {
    fn __repr__(&self) -> String {
        format!(
            "Match(x={}, y={}, votes={}, confidence={:.4})",
            self.x, self.y, self.votes, self.confidence
        )
    }
}

impl From<RustMatch> for Match {
    fn from(m: RustMatch) -> Self {
        Self {
            x: m.x,
            y: m.y,
            votes: m.votes,
            confidence: m.confidence,
        }
    }
}

/// Immutable Generalized Hough lookup table.
#[pyclass(frozen)]
pub struct LookupTable {
    inner: Arc<RustLookupTable>,
}

#[pymethods]
impl LookupTable {
    /// Build a table from an encoded template.
    ///
    /// Args:
    ///     template: 2D uint8 code array (height x width)
    ///     strategy: "weighted_merge" or "unweighted_list" (default: "weighted_merge")
    ///     ideal: "self_match" or "pixel_count" (default: "self_match")
    #[new]
    #[pyo3(signature = (template, strategy = "weighted_merge", ideal = "self_match"))]
    fn new(template: PyReadonlyArray2<'_, u8>, strategy: &str, ideal: &str) -> PyResult<Self> {
        let cfg = parse_build_config(strategy, ideal)?;
        let view = codes_view(&template)?;
        Ok(Self {
            inner: Arc::new(RustLookupTable::build(view, &cfg)),
        })
    }

    /// Template width.
    #[getter]
    fn width(&self) -> usize {
        self.inner.width()
    }

    /// Template height.
    #[getter]
    fn height(&self) -> usize {
        self.inner.height()
    }

    /// Normalization denominator for confidence.
    #[getter]
    fn ideal_votes(&self) -> u32 {
        self.inner.ideal_votes()
    }

    /// Number of non-zero template pixels.
    #[getter]
    fn pixel_count(&self) -> usize {
        self.inner.pixel_count()
    }

    /// Number of code slots.
    #[getter]
    fn num_codes(&self) -> usize {
        self.inner.num_codes()
    }

    /// Offsets stored for a code as (dx, dy, votes) tuples.
    fn entry(&self, code: usize) -> Vec<(i32, i32, u32)> {
        self.inner
            .entry(code)
            .iter()
            .map(|ov| (ov.dx, ov.dy, ov.votes))
            .collect()
    }

    fn __repr__(&self) -> String {
        format!(
            "LookupTable({}x{}, offsets={}, ideal_votes={})",
            self.inner.width(),
            self.inner.height(),
            self.inner.len(),
            self.inner.ideal_votes()
        )
    }
}

/// Per-frame matcher whose template can be replaced at any time.
#[pyclass]
pub struct Matcher {
    inner: RustMatcher,
}

#[pymethods]
impl Matcher {
    /// Create a matcher from an encoded template.
    ///
    /// Args:
    ///     template: 2D uint8 code array
    ///     step: sampling stride (default: 1)
    ///     bounded: only vote from pixels whose votes stay in frame (default: False)
    ///     parallel: row-parallel voting (default: False)
    ///     min_confidence: threshold used by `find_accepted` (default: 0.8)
    #[new]
    #[pyo3(signature = (
        template,
        step = 1,
        bounded = false,
        parallel = false,
        min_confidence = 0.8,
        strategy = "weighted_merge",
        ideal = "self_match"
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        template: PyReadonlyArray2<'_, u8>,
        step: usize,
        bounded: bool,
        parallel: bool,
        min_confidence: f32,
        strategy: &str,
        ideal: &str,
    ) -> PyResult<Self> {
        let cfg = RustMatcherConfig {
            build: parse_build_config(strategy, ideal)?,
            vote: vote_config(step, bounded, parallel)?,
            min_confidence,
        };
        let view = codes_view(&template)?;
        let inner = RustMatcher::from_template(view, cfg).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Replace the template; frames already running finish on the old one.
    fn rebuild(&self, template: PyReadonlyArray2<'_, u8>) -> PyResult<()> {
        let view = codes_view(&template)?;
        self.inner.rebuild(view);
        Ok(())
    }

    /// Snapshot of the current lookup table.
    #[getter]
    fn table(&self) -> LookupTable {
        LookupTable {
            inner: self.inner.table(),
        }
    }

    /// Locate the template in an encoded frame.
    fn find(&self, scene: PyReadonlyArray2<'_, u8>) -> PyResult<Match> {
        let view = codes_view(&scene)?;
        let found = self.inner.find(view).map_err(to_py_err)?;
        Ok(found.into())
    }

    /// Like `find` but returns None below `min_confidence`.
    fn find_accepted(&self, scene: PyReadonlyArray2<'_, u8>) -> PyResult<Option<Match>> {
        let view = codes_view(&scene)?;
        let found = self.inner.find_accepted(view).map_err(to_py_err)?;
        Ok(found.map(Match::from))
    }

    /// Vote a frame and return the accumulator as a uint32 array.
    fn vote<'py>(
        &self,
        py: Python<'py>,
        scene: PyReadonlyArray2<'py, u8>,
    ) -> PyResult<Bound<'py, PyArray2<u32>>> {
        let view = codes_view(&scene)?;
        let acc = self.inner.vote(view).map_err(to_py_err)?;
        let (width, height) = (acc.width(), acc.height());
        PyArray1::from_vec(py, acc.data().to_vec()).reshape([height, width])
    }

    fn __repr__(&self) -> String {
        let cfg = self.inner.config();
        format!(
            "Matcher(step={}, mode={:?}, min_confidence={})",
            cfg.vote.step, cfg.vote.mode, cfg.min_confidence
        )
    }
}

/// Vote an encoded frame against a table.
///
/// Args:
///     scene: 2D uint8 code array
///     table: LookupTable
///     step: sampling stride (default: 1)
///     bounded: only vote from pixels whose votes stay in frame (default: False)
///     parallel: row-parallel voting (default: False)
///
/// Returns:
///     (accumulator, Match) where accumulator is a uint32 array
#[pyfunction]
#[pyo3(signature = (scene, table, step = 1, bounded = false, parallel = false))]
fn vote<'py>(
    py: Python<'py>,
    scene: PyReadonlyArray2<'py, u8>,
    table: &LookupTable,
    step: usize,
    bounded: bool,
    parallel: bool,
) -> PyResult<(Bound<'py, PyArray2<u32>>, Match)> {
    let cfg = vote_config(step, bounded, parallel)?;
    let view = codes_view(&scene)?;
    let acc = ghmatch::vote(view, &table.inner, &cfg).map_err(to_py_err)?;
    let found = ghmatch::locate(&acc, &table.inner);
    let (width, height) = (acc.width(), acc.height());
    let votes = PyArray1::from_vec(py, acc.data().to_vec()).reshape([height, width])?;
    Ok((votes, found.into()))
}

/// Python module for ghmatch.
#[pymodule]
fn _ghmatch(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Match>()?;
    m.add_class::<LookupTable>()?;
    m.add_class::<Matcher>()?;
    m.add_function(wrap_pyfunction!(vote, m)?)?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
