use async_trait::async_trait;
use mongodb::bson::{self, doc, Bson, Document};
use mongodb::options::{ClientOptions, Tls, TlsOptions};
use mongodb::{Client, Collection};
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{debug, info};

use super::data::{
    Coordinates, LocationStatus, RecordId, ReviewRecord, ReviewStatus, StatusChange,
};
use crate::config::{DatabaseSettings, Variant};
use crate::error::ReviewError;

/// Source of pending submissions and sink for review decisions.
///
/// `excluded` holds the records already passed over in this session
/// (skipped or failed) so the same document is not offered twice.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Next record matching the pending predicate, `None` when the queue is empty
    async fn next_pending(
        &self,
        excluded: &HashSet<RecordId>,
    ) -> Result<Option<ReviewRecord>, ReviewError>;

    /// Write a decision back to a single record
    async fn apply_decision(&self, id: &RecordId, change: &StatusChange)
        -> Result<(), ReviewError>;
}

/// The MongoStore wraps one submission collection.
/// The client is opened by `connect` and must be closed with `shutdown`.
#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    collection: Collection<Document>,
    variant: Variant,
}

impl MongoStore {
    /// Connect to the database and verify it answers a ping
    pub async fn connect(
        settings: &DatabaseSettings,
        variant: Variant,
    ) -> Result<Self, ReviewError> {
        let mut options = ClientOptions::parse(&settings.uri)
            .await
            .map_err(|e| ReviewError::connection(format!("Invalid connection string: {}", e)))?;
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());

        if let Some(ca_file) = &settings.tls_ca_file {
            let mut tls = TlsOptions::default();
            tls.ca_file_path = Some(ca_file.clone());
            options.tls = Some(Tls::Enabled(tls));
        }

        let client = Client::with_options(options)
            .map_err(|e| ReviewError::connection(e.to_string()))?;

        let database = client.database(&settings.database);
        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| ReviewError::connection(e.to_string()))?;

        info!("📁 Connected to {}.{}", settings.database, settings.collection);

        Ok(MongoStore {
            collection: database.collection(&settings.collection),
            client,
            variant,
        })
    }

    /// Close all pooled connections
    pub async fn shutdown(self) {
        self.client.shutdown().await;
        debug!("Database client shut down");
    }
}

#[async_trait]
impl ReviewStore for MongoStore {
    async fn next_pending(
        &self,
        excluded: &HashSet<RecordId>,
    ) -> Result<Option<ReviewRecord>, ReviewError> {
        let filter = pending_filter(self.variant, excluded);
        let document = self
            .collection
            .find_one(filter)
            .await
            .map_err(|e| ReviewError::database("find pending", e.to_string()))?;

        document
            .map(|document| parse_record(self.variant, document))
            .transpose()
    }

    async fn apply_decision(
        &self,
        id: &RecordId,
        change: &StatusChange,
    ) -> Result<(), ReviewError> {
        let result = self
            .collection
            .update_one(doc! { "_id": id.as_bson().clone() }, change.update_document())
            .await
            .map_err(|e| ReviewError::database("update status", e.to_string()))?;

        if result.matched_count == 0 {
            return Err(ReviewError::database(
                "update status",
                format!("record {} no longer exists", id),
            ));
        }

        Ok(())
    }
}

/// Query matching records that still need a decision
pub fn pending_filter(variant: Variant, excluded: &HashSet<RecordId>) -> Document {
    let mut filter = match variant {
        Variant::Location => doc! { "status": LocationStatus::NeedsApproval.as_str() },
        Variant::Poster => doc! {
            "show": false,
            "$or": [
                { "cancel": false },
                { "cancel": { "$exists": false } },
            ],
        },
    };

    if !excluded.is_empty() {
        let ids: Vec<Bson> = excluded.iter().map(|id| id.as_bson().clone()).collect();
        filter.insert("_id", doc! { "$nin": ids });
    }

    filter
}

#[derive(Deserialize)]
struct LocationDocument {
    image: String,
    #[serde(rename = "xCoordinate")]
    x_coordinate: f64,
    #[serde(rename = "yCoordinate")]
    y_coordinate: f64,
    status: LocationStatus,
}

#[derive(Deserialize)]
struct PosterDocument {
    #[serde(rename = "posterUrl")]
    poster_url: String,
    show: bool,
    #[serde(default)]
    cancel: Option<bool>,
}

/// Convert a raw document into a review record.
///
/// Only checks that the fields the review needs exist with usable types.
/// The `_id` may be of any BSON type.
pub fn parse_record(variant: Variant, document: Document) -> Result<ReviewRecord, ReviewError> {
    let id = document
        .get("_id")
        .cloned()
        .map(RecordId::from)
        .ok_or_else(|| ReviewError::database("read pending", "document without _id"))?;

    match variant {
        Variant::Location => {
            let location: LocationDocument = bson::from_document(document)
                .map_err(|e| ReviewError::malformed(id.clone(), e.to_string()))?;
            Ok(ReviewRecord {
                id,
                image_url: location.image,
                marker: Some(Coordinates {
                    x: location.x_coordinate,
                    y: location.y_coordinate,
                }),
                status: ReviewStatus::Location(location.status),
            })
        }
        Variant::Poster => {
            let poster: PosterDocument = bson::from_document(document)
                .map_err(|e| ReviewError::malformed(id.clone(), e.to_string()))?;
            Ok(ReviewRecord {
                id,
                image_url: poster.poster_url,
                marker: None,
                status: ReviewStatus::Poster {
                    show: poster.show,
                    cancel: poster.cancel,
                },
            })
        }
    }
}
