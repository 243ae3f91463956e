//! Audit fields shared by tracked records
//!
//! Records embed [`Document`] with `#[serde(flatten)]` so its fields live at the top level
//! of the stored document.

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage key of the soft-delete marker
pub const DELETED_AT: &str = "deleted_at";

/// Identity plus creation, update and deletion timestamps.
///
/// `None` is the "unset" sentinel for every field and is omitted from the stored
/// document. A record whose `deleted_at` is unset is live.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<bson::DateTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<bson::DateTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<bson::DateTime>,
}

impl Document {
    pub fn id(&self) -> Option<ObjectId> {
        self.id
    }

    pub fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at.map(|t| t.to_chrono())
    }

    pub fn set_created_at(&mut self, t: DateTime<Utc>) {
        self.created_at = Some(bson::DateTime::from_chrono(t));
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at.map(|t| t.to_chrono())
    }

    pub fn set_updated_at(&mut self, t: DateTime<Utc>) {
        self.updated_at = Some(bson::DateTime::from_chrono(t));
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at.map(|t| t.to_chrono())
    }

    pub fn set_deleted_at(&mut self, t: DateTime<Utc>) {
        self.deleted_at = Some(bson::DateTime::from_chrono(t));
    }

    pub fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }
}
