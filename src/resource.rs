//
// resource.rs
// Orthanc-Client-rs
//
// Shared backbone of the entity proxies: identity, the lock-gated metadata cache, and the RemoteEntity trait.
//
// Thales Matheus Mendonça Santos - August 2026

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde_json::{Map, Value};

use crate::anonymize::{Anonymized, AnonymizeRequest};
use crate::client::ApiClient;
use crate::error::{Error, Result};
use crate::job::Job;
use crate::util;

/// One level of the archive hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Patient,
    Study,
    Series,
    Instance,
}

impl EntityKind {
    /// URL segment of the level's REST route.
    pub fn route(self) -> &'static str {
        match self {
            EntityKind::Patient => "patients",
            EntityKind::Study => "studies",
            EntityKind::Series => "series",
            EntityKind::Instance => "instances",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Patient => "Patient",
            EntityKind::Study => "Study",
            EntityKind::Series => "Series",
            EntityKind::Instance => "Instance",
        };
        f.write_str(name)
    }
}

/// Identity, shared client access, and the lazily cached metadata document
/// that every entity proxy embeds.
///
/// With `lock` enabled the first metadata read stores the document and later
/// reads are answered from memory until the cache is cleared. Without it
/// every read goes back to the server and nothing is retained.
pub struct Resource {
    kind: EntityKind,
    id: String,
    client: Arc<dyn ApiClient>,
    lock: bool,
    information: Option<Map<String, Value>>,
}

impl Resource {
    /// A resource can be built independently for any known identifier; the
    /// entity constructors are thin wrappers around this.
    pub fn new(kind: EntityKind, id: String, client: Arc<dyn ApiClient>, lock: bool) -> Self {
        Self {
            kind,
            id,
            client,
            lock,
            information: None,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn identifier(&self) -> &str {
        &self.id
    }

    pub fn lock(&self) -> bool {
        self.lock
    }

    pub(crate) fn client(&self) -> &Arc<dyn ApiClient> {
        &self.client
    }

    /// Drops the cached metadata document, forcing the next read to fetch.
    pub fn clear_cache(&mut self) {
        self.information = None;
    }

    pub(crate) fn set_lock(&mut self, lock: bool) {
        self.lock = lock;
        self.clear_cache();
    }

    /// Full metadata document of the entity.
    ///
    /// At most one fetch happens over the lifetime of a locked resource; an
    /// unlocked one re-fetches on every call and never retains the answer.
    pub fn main_information(&mut self) -> Result<Map<String, Value>> {
        if self.lock {
            if let Some(information) = &self.information {
                return Ok(information.clone());
            }
            let information = self.client.get_entity(self.kind, &self.id)?;
            self.information = Some(information.clone());
            return Ok(information);
        }
        self.client.get_entity(self.kind, &self.id)
    }

    /// Value of one main DICOM tag.
    ///
    /// Absent tags answer [`Error::TagMissing`] so probing optional
    /// attributes stays distinguishable from real failures.
    pub fn main_dicom_tag(&mut self, tag: &str) -> Result<String> {
        let information = self.main_information()?;
        let value = information
            .get("MainDicomTags")
            .and_then(Value::as_object)
            .and_then(|tags| tags.get(tag))
            .ok_or_else(|| Error::TagMissing(tag.to_string()))?;
        match value {
            Value::String(text) => Ok(text.clone()),
            other => Ok(other.to_string()),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.id)
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .field("lock", &self.lock)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Resource {
    /// Two proxies are the same logical entity when kind and identifier
    /// match; lock state and cache contents play no part.
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.id == other.id
    }
}

impl Eq for Resource {}

/// Reads a list of child identifiers out of a metadata document.
pub(crate) fn child_ids(information: &Map<String, Value>, field: &'static str) -> Result<Vec<String>> {
    information
        .get(field)
        .and_then(Value::as_array)
        .map(|ids| {
            ids.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .ok_or_else(|| {
            Error::UnexpectedResponse(format!("{field} missing from the metadata document"))
        })
}

/// Behavior shared by every entity proxy in the hierarchy.
///
/// Implementors embed a [`Resource`] and expose it through the two
/// accessors; everything else is provided on top of them.
pub trait RemoteEntity: Sized {
    /// Hierarchy level of the implementing proxy.
    const KIND: EntityKind;

    /// Builds a proxy for an already-known identifier.
    fn from_id(id: String, client: Arc<dyn ApiClient>, lock: bool) -> Self;

    fn resource(&self) -> &Resource;
    fn resource_mut(&mut self) -> &mut Resource;

    fn identifier(&self) -> &str {
        self.resource().identifier()
    }

    fn lock(&self) -> bool {
        self.resource().lock()
    }

    fn main_information(&mut self) -> Result<Map<String, Value>> {
        self.resource_mut().main_information()
    }

    fn main_dicom_tag(&mut self, tag: &str) -> Result<String> {
        self.resource_mut().main_dicom_tag(tag)
    }

    /// Labels attached to the entity. Servers predating label support report
    /// none.
    fn labels(&mut self) -> Result<Vec<String>> {
        let information = self.main_information()?;
        Ok(information
            .get("Labels")
            .and_then(Value::as_array)
            .map(|labels| {
                labels
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Attaches a label.
    ///
    /// The metadata cache of a locked proxy is NOT updated: the cached label
    /// list stays as fetched until the cache is cleared or the proxy is read
    /// unlocked. Managing that staleness is the caller's job.
    fn add_label(&self, label: &str) -> Result<()> {
        self.resource()
            .client()
            .put_label(Self::KIND, self.identifier(), label)
    }

    /// Detaches a label. Same cache caveat as [`RemoteEntity::add_label`].
    fn remove_label(&self, label: &str) -> Result<()> {
        self.resource()
            .client()
            .delete_label(Self::KIND, self.identifier(), label)
    }

    fn is_stable(&mut self) -> Result<bool> {
        let information = self.main_information()?;
        information
            .get("IsStable")
            .and_then(Value::as_bool)
            .ok_or_else(|| {
                Error::UnexpectedResponse("IsStable missing from the metadata document".to_string())
            })
    }

    /// Moment the entity last changed on the server.
    fn last_update(&mut self) -> Result<NaiveDateTime> {
        let information = self.main_information()?;
        let stamp = information
            .get("LastUpdate")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                Error::UnexpectedResponse(
                    "LastUpdate missing from the metadata document".to_string(),
                )
            })?;
        util::parse_timestamp(stamp)
    }

    /// Zip archive of the entity and everything below it.
    fn get_zip(&self) -> Result<Vec<u8>> {
        self.resource()
            .client()
            .get_archive(Self::KIND, self.identifier())
    }

    /// Asks the server for an anonymized copy.
    ///
    /// This is a fork: a brand-new entity (or the [`Job`] creating it, in
    /// asynchronous mode) is returned, and the proxy the method was called on
    /// keeps pointing at the original, untouched data.
    fn anonymize(&self, request: &AnonymizeRequest) -> Result<Anonymized<Self>> {
        let answer = self
            .resource()
            .client()
            .post_anonymize(Self::KIND, self.identifier(), request)?;
        let id = answer
            .get("ID")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::UnexpectedResponse("anonymize answer carries no ID".to_string()))?;
        let client = Arc::clone(self.resource().client());
        if request.asynchronous {
            return Ok(Anonymized::Job(Job::new(id.to_string(), client)));
        }
        Ok(Anonymized::Entity(Self::from_id(id.to_string(), client, false)))
    }
}
