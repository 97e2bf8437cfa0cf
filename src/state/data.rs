/// Shared data structures for the review state
///
/// These structs represent the data model that flows between
/// the database layer, the review loop and the UI layer.

use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Bson, Document};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::config::Variant;

/// Document key of a submission (MongoDB `_id`)
///
/// The raw value is passed back to the database untouched, whatever its BSON
/// type. Equality and hashing use its relaxed extended JSON form.
#[derive(Debug, Clone)]
pub struct RecordId {
    raw: Bson,
    key: String,
}

impl RecordId {
    pub fn as_bson(&self) -> &Bson {
        &self.raw
    }

    #[cfg(test)]
    pub fn new() -> Self {
        Self::from(ObjectId::new())
    }
}

impl From<Bson> for RecordId {
    fn from(raw: Bson) -> Self {
        let key = raw.clone().into_relaxed_extjson().to_string();
        Self { raw, key }
    }
}

impl From<ObjectId> for RecordId {
    fn from(oid: ObjectId) -> Self {
        Self::from(Bson::ObjectId(oid))
    }
}

impl PartialEq for RecordId {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for RecordId {}

impl Hash for RecordId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.raw {
            Bson::ObjectId(oid) => write!(f, "{}", oid.to_hex()),
            Bson::String(id) => write!(f, "{}", id),
            _ => write!(f, "{}", self.key),
        }
    }
}

/// Review status of a location submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationStatus {
    #[serde(rename = "needs approval")]
    NeedsApproval,
    #[serde(rename = "approved")]
    Approved,
    #[serde(rename = "rejected")]
    Rejected,
}

impl LocationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NeedsApproval => "needs approval",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// Current status of a submission as stored in the database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewStatus {
    Location(LocationStatus),
    /// Posters use two flags; `cancel` is absent on fresh submissions
    Poster { show: bool, cancel: Option<bool> },
}

impl ReviewStatus {
    /// Same predicate as the database filter in `store::pending_filter`
    pub fn is_pending(&self) -> bool {
        match *self {
            Self::Location(status) => status == LocationStatus::NeedsApproval,
            Self::Poster { show, cancel } => !show && cancel != Some(true),
        }
    }
}

/// Point on the base map, in the units stored on the record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
}

/// A submission waiting for review
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRecord {
    pub id: RecordId,
    /// Location photo or poster image
    pub image_url: String,
    /// Only set for location submissions
    pub marker: Option<Coordinates>,
    pub status: ReviewStatus,
}

/// A single key captured from the reviewer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPress {
    Char(char),
    /// Any non-character key (Escape, arrows, ...)
    Named(String),
}

/// What the reviewer decided for one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Approve,
    Reject,
    Skip,
}

impl Verdict {
    /// `y` approves, `n` rejects, every other key skips
    pub fn from_key(key: &KeyPress) -> Self {
        match key {
            KeyPress::Char('y') => Self::Approve,
            KeyPress::Char('n') => Self::Reject,
            _ => Self::Skip,
        }
    }

    /// The mutation to write back, `None` for a skip
    pub fn status_change(self, variant: Variant) -> Option<StatusChange> {
        match (self, variant) {
            (Self::Skip, _) => None,
            (Self::Approve, Variant::Location) => {
                Some(StatusChange::Location(LocationStatus::Approved))
            }
            (Self::Reject, Variant::Location) => {
                Some(StatusChange::Location(LocationStatus::Rejected))
            }
            (Self::Approve, Variant::Poster) => Some(StatusChange::Poster {
                show: true,
                cancel: None,
            }),
            (Self::Reject, Variant::Poster) => Some(StatusChange::Poster {
                show: false,
                cancel: Some(true),
            }),
        }
    }
}

/// Field updates applied by the decision writer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    Location(LocationStatus),
    /// `cancel: None` leaves the stored flag untouched
    Poster { show: bool, cancel: Option<bool> },
}

impl StatusChange {
    /// MongoDB update document for this change
    pub fn update_document(&self) -> Document {
        match *self {
            Self::Location(status) => doc! { "$set": { "status": status.as_str() } },
            Self::Poster { show, cancel: None } => doc! { "$set": { "show": show } },
            Self::Poster {
                show,
                cancel: Some(cancel),
            } => doc! { "$set": { "show": show, "cancel": cancel } },
        }
    }

    /// Apply the change to an in-memory status
    #[cfg(test)]
    pub fn apply_to(&self, status: &mut ReviewStatus) {
        match (*self, status) {
            (Self::Location(new_status), ReviewStatus::Location(current)) => {
                *current = new_status;
            }
            (
                Self::Poster {
                    show: new_show,
                    cancel: new_cancel,
                },
                ReviewStatus::Poster { show, cancel },
            ) => {
                *show = new_show;
                if new_cancel.is_some() {
                    *cancel = new_cancel;
                }
            }
            // A location change never applies to a poster and vice versa
            _ => {}
        }
    }
}

/// Counts of what happened during a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub approved: usize,
    pub rejected: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl Tally {
    pub fn record(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Approve => self.approved += 1,
            Verdict::Reject => self.rejected += 1,
            Verdict::Skip => self.skipped += 1,
        }
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} approved, {} rejected, {} skipped, {} failed",
            self.approved, self.rejected, self.skipped, self.failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_poster() -> ReviewStatus {
        ReviewStatus::Poster {
            show: false,
            cancel: None,
        }
    }

    #[test]
    fn test_verdict_from_key() {
        assert_eq!(Verdict::from_key(&KeyPress::Char('y')), Verdict::Approve);
        assert_eq!(Verdict::from_key(&KeyPress::Char('n')), Verdict::Reject);
        assert_eq!(Verdict::from_key(&KeyPress::Char('q')), Verdict::Skip);
        // Matching is case-sensitive
        assert_eq!(Verdict::from_key(&KeyPress::Char('Y')), Verdict::Skip);
        assert_eq!(
            Verdict::from_key(&KeyPress::Named("Escape".to_string())),
            Verdict::Skip
        );
    }

    #[test]
    fn test_pending_predicate() {
        assert!(ReviewStatus::Location(LocationStatus::NeedsApproval).is_pending());
        assert!(!ReviewStatus::Location(LocationStatus::Approved).is_pending());
        assert!(!ReviewStatus::Location(LocationStatus::Rejected).is_pending());

        assert!(fresh_poster().is_pending());
        assert!(ReviewStatus::Poster {
            show: false,
            cancel: Some(false)
        }
        .is_pending());
        assert!(!ReviewStatus::Poster {
            show: false,
            cancel: Some(true)
        }
        .is_pending());
        assert!(!ReviewStatus::Poster {
            show: true,
            cancel: None
        }
        .is_pending());
    }

    #[test]
    fn test_location_decisions() {
        let mut status = ReviewStatus::Location(LocationStatus::NeedsApproval);
        Verdict::Approve
            .status_change(Variant::Location)
            .unwrap()
            .apply_to(&mut status);
        assert_eq!(status, ReviewStatus::Location(LocationStatus::Approved));

        let mut status = ReviewStatus::Location(LocationStatus::NeedsApproval);
        Verdict::Reject
            .status_change(Variant::Location)
            .unwrap()
            .apply_to(&mut status);
        assert_eq!(status, ReviewStatus::Location(LocationStatus::Rejected));

        assert!(Verdict::Skip.status_change(Variant::Location).is_none());
    }

    #[test]
    fn test_poster_approve_never_cancels() {
        for cancel in [None, Some(false)] {
            let mut status = ReviewStatus::Poster { show: false, cancel };
            Verdict::Approve
                .status_change(Variant::Poster)
                .unwrap()
                .apply_to(&mut status);

            match status {
                ReviewStatus::Poster { show, cancel } => {
                    assert!(show);
                    assert_ne!(cancel, Some(true));
                }
                _ => panic!("poster status expected"),
            }
        }
    }

    #[test]
    fn test_poster_reject_hides_and_cancels() {
        for cancel in [None, Some(false)] {
            let mut status = ReviewStatus::Poster { show: false, cancel };
            Verdict::Reject
                .status_change(Variant::Poster)
                .unwrap()
                .apply_to(&mut status);
            assert_eq!(
                status,
                ReviewStatus::Poster {
                    show: false,
                    cancel: Some(true)
                }
            );
            assert!(!status.is_pending());
        }
    }

    #[test]
    fn test_update_documents() {
        let approve = Verdict::Approve.status_change(Variant::Location).unwrap();
        assert_eq!(
            approve.update_document(),
            doc! { "$set": { "status": "approved" } }
        );

        let approve = Verdict::Approve.status_change(Variant::Poster).unwrap();
        assert_eq!(approve.update_document(), doc! { "$set": { "show": true } });

        let reject = Verdict::Reject.status_change(Variant::Poster).unwrap();
        assert_eq!(
            reject.update_document(),
            doc! { "$set": { "show": false, "cancel": true } }
        );
    }

    #[test]
    fn test_record_id_keeps_any_bson_type() {
        let oid = ObjectId::new();
        let by_oid = RecordId::from(oid);
        assert_eq!(by_oid, RecordId::from(Bson::ObjectId(oid)));
        assert_eq!(by_oid.to_string(), oid.to_hex());

        let by_name = RecordId::from(Bson::String("poster-42".to_string()));
        assert_eq!(by_name.as_bson(), &Bson::String("poster-42".to_string()));
        assert_eq!(by_name.to_string(), "poster-42");

        let by_number = RecordId::from(Bson::Int32(42));
        assert_eq!(by_number.to_string(), "42");
        assert_ne!(by_number, by_name);
        assert_ne!(
            RecordId::from(Bson::String("42".to_string())),
            by_number,
            "string and integer keys are distinct"
        );

        let set: std::collections::HashSet<RecordId> =
            [by_name.clone(), by_number.clone(), by_name].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_location_status_serde_names() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            status: LocationStatus,
        }

        let document = mongodb::bson::to_document(&Wrapper {
            status: LocationStatus::NeedsApproval,
        })
        .unwrap();
        assert_eq!(document, doc! { "status": "needs approval" });

        let parsed: Wrapper =
            mongodb::bson::from_document(doc! { "status": "rejected" }).unwrap();
        assert_eq!(parsed.status, LocationStatus::Rejected);
    }
}
