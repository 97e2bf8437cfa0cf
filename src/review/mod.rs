/// Review loop module
///
/// - The loop controller driving fetch/render/present/decide/write (session.rs)
/// - The presenter seam between the loop and the review window (presenter.rs)

pub mod presenter;
pub mod session;

pub use presenter::{Panel, Presenter};
pub use session::ReviewSession;

use tracing::info;

use crate::assets::{load_base_map, HttpFetcher};
use crate::config::{Settings, Variant};
use crate::error::ReviewError;
use crate::state::data::Tally;
use crate::state::store::MongoStore;

/// Set up the store, fetcher and base map, then review until the queue is empty.
///
/// Setup failures return before the first record is shown. The database
/// client is shut down whether or not the session succeeded.
pub async fn launch<P: Presenter>(
    settings: &Settings,
    presenter: &mut P,
) -> Result<Tally, ReviewError> {
    let review = settings.review.clone();

    let base_map = match review.variant {
        Variant::Location => Some(load_base_map(review.campus_map.clone()).await?),
        Variant::Poster => None,
    };
    let fetcher = HttpFetcher::new(review.fetch_timeout)?;
    let store = MongoStore::connect(&settings.database, review.variant).await?;

    info!(
        "🎨 Reviewing {:?} submissions (coordinates: {:?}, on error: {:?})",
        review.variant, review.coordinates, review.on_error
    );

    let outcome = ReviewSession::new(store.clone(), fetcher, review, base_map)
        .run(presenter)
        .await;

    store.shutdown().await;
    outcome
}
