use rayon::prelude::*;

use crate::{
    composition::layer::{AudioLayer, VisualLayer},
    config::settings::ProgramConfig,
    foundation::error::{ItemBuildError, ReelError, ReelResult},
    timeline::item::{ContentItem, ItemTimeline, ItemTimelineBuilder},
};

/// Result of building one content item, tagged with its script position.
#[derive(Debug)]
pub struct ItemOutcome {
    pub index: usize,
    pub label: String,
    pub result: Result<ItemTimeline, ItemBuildError>,
}

/// A successful item placed on the program time axis.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedItem {
    /// Program time at which the item's local `t = 0` lands.
    pub offset: f64,
    pub timeline: ItemTimeline,
}

/// Diagnostic record for an item that was skipped.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ItemFailure {
    pub index: usize,
    pub label: String,
    pub cause: String,
}

/// Final ordered sequence of item timelines.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgramTimeline {
    items: Vec<PlacedItem>,
    overlap: f64,
    total_duration: f64,
    failures: Vec<ItemFailure>,
}

impl ProgramTimeline {
    pub fn items(&self) -> &[PlacedItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Overlap between consecutive items, in seconds.
    pub fn overlap(&self) -> f64 {
        self.overlap
    }

    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    /// Items that were skipped, in script order.
    pub fn failures(&self) -> &[ItemFailure] {
        &self.failures
    }

    /// Every visual layer moved onto the program time axis, item by item.
    pub fn visual_layers(&self) -> Vec<VisualLayer> {
        self.items
            .iter()
            .flat_map(|p| p.timeline.visual().iter().map(|l| l.shifted(p.offset)))
            .collect()
    }

    /// Every audio layer moved onto the program time axis, item by item.
    pub fn audio_layers(&self) -> Vec<AudioLayer> {
        self.items
            .iter()
            .flat_map(|p| p.timeline.audio().iter().map(|l| l.shifted(p.offset)))
            .collect()
    }
}

/// Builds every item of a script and concatenates the survivors.
pub struct ProgramSequencer<'a> {
    builder: ItemTimelineBuilder<'a>,
    overlap: f64,
    parallel: bool,
    threads: Option<usize>,
}

impl<'a> ProgramSequencer<'a> {
    pub fn new(builder: ItemTimelineBuilder<'a>, program: &ProgramConfig) -> Self {
        Self {
            builder,
            overlap: program.item_overlap_secs,
            parallel: program.parallel,
            threads: program.threads,
        }
    }

    /// Build all items, returning one outcome per input in input order.
    ///
    /// Items are independent, so the parallel path only changes wall time.
    pub fn build_outcomes(&self, items: &[ContentItem]) -> ReelResult<Vec<ItemOutcome>> {
        let build_one = |(index, item): (usize, &ContentItem)| ItemOutcome {
            index,
            label: item.label(),
            result: self.builder.build(index, item),
        };

        if !self.parallel || items.len() < 2 {
            return Ok(items.iter().enumerate().map(build_one).collect());
        }

        let pool = build_thread_pool(self.threads)?;
        tracing::debug!(
            items = items.len(),
            threads = pool.current_num_threads(),
            "building items in parallel"
        );
        Ok(pool.install(|| items.par_iter().enumerate().map(build_one).collect()))
    }

    /// Build and assemble the whole program.
    #[tracing::instrument(skip_all, fields(items = items.len()))]
    pub fn build_program(&self, items: &[ContentItem]) -> ReelResult<ProgramTimeline> {
        let outcomes = self.build_outcomes(items)?;
        assemble(outcomes, self.overlap)
    }
}

/// Concatenate successful outcomes in index order.
///
/// Failed items are logged, recorded and skipped whatever their cause. Each item starts
/// `overlap` seconds before the previous one ends.
pub fn assemble(mut outcomes: Vec<ItemOutcome>, overlap: f64) -> ReelResult<ProgramTimeline> {
    if !overlap.is_finite() || overlap < 0.0 {
        return Err(ReelError::configuration(format!(
            "item overlap must be >= 0, got {overlap}"
        )));
    }
    outcomes.sort_by_key(|o| o.index);
    let attempted = outcomes.len();

    let mut items = Vec::with_capacity(attempted);
    let mut failures = Vec::new();
    let mut cursor = 0.0_f64;

    for outcome in outcomes {
        let timeline = match outcome.result {
            Ok(t) => t,
            Err(err) => {
                tracing::warn!(
                    item = outcome.index,
                    label = %outcome.label,
                    error = %err.cause,
                    "skipping item"
                );
                failures.push(ItemFailure {
                    index: outcome.index,
                    label: outcome.label,
                    cause: err.cause.to_string(),
                });
                continue;
            }
        };

        let duration = timeline.total_duration();
        if overlap >= duration {
            return Err(ReelError::configuration(format!(
                "item overlap {overlap}s is not shorter than item {} ({duration}s)",
                outcome.index
            )));
        }
        let offset = if items.is_empty() { 0.0 } else { cursor - overlap };
        cursor = offset + duration;
        items.push(PlacedItem { offset, timeline });
    }

    if items.is_empty() {
        return Err(ReelError::NoContent { attempted });
    }

    tracing::info!(
        items = items.len(),
        skipped = failures.len(),
        duration = cursor,
        "program assembled"
    );
    Ok(ProgramTimeline {
        items,
        overlap,
        total_duration: cursor,
        failures,
    })
}

fn build_thread_pool(threads: Option<usize>) -> ReelResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ReelError::configuration(
            "program 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ReelError::render(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/program.rs"]
mod tests;
