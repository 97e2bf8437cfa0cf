/// The review loop
///
/// One iteration:
/// 1. FETCH the next pending record (none left: STOP)
/// 2. RENDER the panels (map overlay for locations, downloaded image)
/// 3. PRESENT them and capture a key
/// 4. DECIDE the verdict and WRITE it back
///
/// Skipped and failed records go into a per-session exclusion set so the
/// next fetch moves past them instead of offering them again.

use image::RgbaImage;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::task;
use tracing::{debug, error, info, warn};

use super::presenter::{Panel, Presenter, LOCATION_TITLE, MAP_TITLE, POSTER_TITLE};
use crate::assets::AssetFetcher;
use crate::config::{FailurePolicy, ReviewSettings, Variant};
use crate::error::ReviewError;
use crate::overlay;
use crate::state::data::{RecordId, ReviewRecord, Tally, Verdict};
use crate::state::store::ReviewStore;

/// Outcome of a single loop iteration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// No pending record left
    Exhausted,
    /// The reviewer pressed a key for this record
    Reviewed { id: RecordId, verdict: Verdict },
    /// The record could not be shown and was passed over
    Failed { id: RecordId },
}

pub struct ReviewSession<S, F> {
    store: S,
    fetcher: F,
    settings: ReviewSettings,
    /// Only loaded for location reviews
    base_map: Option<Arc<RgbaImage>>,
    excluded: HashSet<RecordId>,
    tally: Tally,
}

impl<S: ReviewStore, F: AssetFetcher> ReviewSession<S, F> {
    pub fn new(
        store: S,
        fetcher: F,
        settings: ReviewSettings,
        base_map: Option<RgbaImage>,
    ) -> Self {
        Self {
            store,
            fetcher,
            settings,
            base_map: base_map.map(Arc::new),
            excluded: HashSet::new(),
            tally: Tally::default(),
        }
    }

    /// Review records until the store has no pending record left
    pub async fn run<P: Presenter>(mut self, presenter: &mut P) -> Result<Tally, ReviewError> {
        while self.step(presenter).await? != Step::Exhausted {}

        info!("✅ Review queue empty: {}", self.tally);
        Ok(self.tally)
    }

    /// Run one FETCH → RENDER → PRESENT → DECIDE → WRITE iteration
    pub async fn step<P: Presenter>(&mut self, presenter: &mut P) -> Result<Step, ReviewError> {
        let record = match self.store.next_pending(&self.excluded).await {
            Ok(Some(record)) => record,
            Ok(None) => return Ok(Step::Exhausted),
            Err(err) => {
                let malformed = match &err {
                    ReviewError::MalformedRecord { id, .. } => Some(id.clone()),
                    _ => None,
                };
                return match malformed {
                    Some(id) => self.pass_over(id, err),
                    None => Err(err),
                };
            }
        };

        debug_assert!(
            record.status.is_pending(),
            "store returned a decided record: {:?}",
            record
        );

        match record.marker {
            Some(coords) => info!(
                "📍 Reviewing {} at ({}, {}): {}",
                record.id, coords.x, coords.y, record.image_url
            ),
            None => info!("🖼️  Reviewing {}: {}", record.id, record.image_url),
        }

        let rendered = self.panels_for(&record).await;
        let panels = match rendered {
            Ok(panels) => panels,
            Err(err) if err.is_recoverable() => return self.pass_over(record.id, err),
            Err(err) => return Err(err),
        };

        info!("Press 'y' to approve, 'n' to reject, or any other key to skip...");
        let key = presenter.present(panels).await?;
        let verdict = Verdict::from_key(&key);
        debug!("Captured {:?} -> {:?}", key, verdict);

        match verdict.status_change(self.settings.variant) {
            Some(change) => {
                self.store.apply_decision(&record.id, &change).await?;
                match verdict {
                    Verdict::Approve => info!("👍 {} approved", record.id),
                    _ => info!("👎 {} rejected", record.id),
                }
            }
            None => {
                // Left pending for a later session
                self.excluded.insert(record.id.clone());
                info!("⏭️  Skipping {}", record.id);
            }
        }

        self.tally.record(verdict);
        Ok(Step::Reviewed {
            id: record.id,
            verdict,
        })
    }

    /// Apply the failure policy to a record that could not be shown
    fn pass_over(&mut self, id: RecordId, err: ReviewError) -> Result<Step, ReviewError> {
        match self.settings.on_error {
            FailurePolicy::Abort => {
                error!("❌ Aborting on record {}: {}", id, err);
                Err(err)
            }
            FailurePolicy::Skip => {
                warn!("⚠️  Passing over record {} (left pending): {}", id, err);
                self.excluded.insert(id.clone());
                self.tally.failed += 1;
                Ok(Step::Failed { id })
            }
        }
    }

    async fn panels_for(&self, record: &ReviewRecord) -> Result<Vec<Panel>, ReviewError> {
        match self.settings.variant {
            Variant::Location => {
                let coords = record
                    .marker
                    .ok_or_else(|| {
                        ReviewError::malformed(record.id.clone(), "missing coordinates")
                    })?;
                let map = self
                    .base_map
                    .clone()
                    .ok_or_else(|| ReviewError::internal("location review without a base map"))?;
                let scale = self.settings.coordinates;

                debug!("Map dimensions: width={}, height={}", map.width(), map.height());

                // Spawn blocking because drawing and resizing the map is CPU-bound
                let annotated =
                    task::spawn_blocking(move || overlay::render(&map, coords, scale)).await?;
                let photo = self.fetcher.fetch(&record.image_url).await?;

                Ok(vec![
                    Panel::new(MAP_TITLE, annotated),
                    Panel::new(LOCATION_TITLE, photo),
                ])
            }
            Variant::Poster => {
                let poster = self.fetcher.fetch(&record.image_url).await?;
                Ok(vec![Panel::new(POSTER_TITLE, poster)])
            }
        }
    }
}
