//! Frame matcher with hot-swappable lookup tables.
//!
//! The current table sits behind `RwLock<Arc<LookupTable>>`. Every frame
//! clones the `Arc` once and votes against that snapshot, while
//! [`Matcher::rebuild`] builds the replacement without holding the lock and
//! only takes the write lock for the pointer swap. A frame in flight keeps
//! its old table alive until it finishes and can never see a partial one.

use std::sync::{Arc, PoisonError, RwLock};

use crate::code::Code;
use crate::image::ImageView;
use crate::search::{locate, Match};
use crate::table::{BuildConfig, LookupTable, TableBuilder};
use crate::trace::{trace_event, trace_span};
use crate::util::{GhMatchError, GhMatchResult};
use crate::vote::{vote, Accumulator, VoteConfig};

/// Configuration for [`Matcher`].
#[derive(Clone, Debug)]
pub struct MatcherConfig {
    /// Options used by [`Matcher::rebuild`].
    pub build: BuildConfig,
    /// Options used for every frame.
    pub vote: VoteConfig,
    /// Confidence a match must reach to be reported by [`Matcher::find_accepted`].
    pub min_confidence: f32,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            build: BuildConfig::default(),
            vote: VoteConfig::default(),
            min_confidence: 0.8,
        }
    }
}

impl MatcherConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> GhMatchResult<()> {
        self.vote.validate()?;
        if !self.min_confidence.is_finite() || self.min_confidence < 0.0 {
            return Err(GhMatchError::InvalidInput(
                "min_confidence must be finite and non-negative",
            ));
        }
        Ok(())
    }
}

/// Locates one template per frame and allows re-templating at any time.
pub struct Matcher {
    cfg: MatcherConfig,
    table: RwLock<Arc<LookupTable>>,
}

impl Matcher {
    /// Creates a matcher around an existing table with the default config.
    pub fn new(table: LookupTable) -> Self {
        Self {
            cfg: MatcherConfig::default(),
            table: RwLock::new(Arc::new(table)),
        }
    }

    /// Builds the initial table from an encoded template.
    pub fn from_template<C: Code>(
        template: ImageView<'_, C>,
        cfg: MatcherConfig,
    ) -> GhMatchResult<Self> {
        cfg.validate()?;
        let table = TableBuilder::new(cfg.build.clone()).build(template);
        Ok(Self {
            cfg,
            table: RwLock::new(Arc::new(table)),
        })
    }

    /// Replaces the matcher configuration after validating it.
    ///
    /// Build options only take effect on the next rebuild.
    pub fn with_config(mut self, cfg: MatcherConfig) -> GhMatchResult<Self> {
        cfg.validate()?;
        self.cfg = cfg;
        Ok(self)
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &MatcherConfig {
        &self.cfg
    }

    /// Returns a snapshot of the current table.
    pub fn table(&self) -> Arc<LookupTable> {
        Arc::clone(&self.table.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Builds a table from a new encoded template and swaps it in.
    ///
    /// Returns the table that was replaced. Frames already voting keep
    /// using it until they finish.
    pub fn rebuild<C: Code>(&self, template: ImageView<'_, C>) -> Arc<LookupTable> {
        let _span = trace_span!(
            "rebuild",
            width = template.width(),
            height = template.height()
        )
        .entered();
        let table = TableBuilder::new(self.cfg.build.clone()).build(template);
        self.replace_table(table)
    }

    /// Publishes an already built table and returns the previous one.
    pub fn replace_table(&self, table: LookupTable) -> Arc<LookupTable> {
        let next = Arc::new(table);
        let mut guard = self.table.write().unwrap_or_else(PoisonError::into_inner);
        let previous = std::mem::replace(&mut *guard, next);
        drop(guard);
        trace_event!(
            "table_swapped",
            previous_ideal = previous.ideal_votes()
        );
        previous
    }

    /// Votes a frame against the current table.
    pub fn vote<C: Code>(&self, scene: ImageView<'_, C>) -> GhMatchResult<Accumulator> {
        let table = self.table();
        vote(scene, &table, &self.cfg.vote)
    }

    /// Votes a frame and locates the best match.
    pub fn find<C: Code>(&self, scene: ImageView<'_, C>) -> GhMatchResult<Match> {
        self.find_with_accumulator(scene).map(|(m, _)| m)
    }

    /// Like [`Matcher::find`] but also returns the accumulator.
    pub fn find_with_accumulator<C: Code>(
        &self,
        scene: ImageView<'_, C>,
    ) -> GhMatchResult<(Match, Accumulator)> {
        let table = self.table();
        let acc = vote(scene, &table, &self.cfg.vote)?;
        let found = locate(&acc, &table);
        Ok((found, acc))
    }

    /// Returns the best match only if it reaches `min_confidence`.
    pub fn find_accepted<C: Code>(&self, scene: ImageView<'_, C>) -> GhMatchResult<Option<Match>> {
        let found = self.find(scene)?;
        Ok(found
            .is_accepted(self.cfg.min_confidence)
            .then_some(found))
    }
}
