//
// patient.rs
// Orthanc-Client-rs
//
// Patient proxy: top of the hierarchy, with module access, recycling protection, and study traversal.
//
// Thales Matheus Mendonça Santos - August 2026

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::client::{ApiClient, ModuleFormat};
use crate::error::{Error, Result};
use crate::resource::{child_ids, EntityKind, RemoteEntity, Resource};
use crate::study::Study;
use crate::util;

/// Proxy over one patient stored in the archive.
#[derive(Debug)]
pub struct Patient {
    base: Resource,
    studies: Option<Vec<Study>>,
}

impl Patient {
    pub fn new(id: impl Into<String>, client: Arc<dyn ApiClient>, lock: bool) -> Self {
        Self {
            base: Resource::new(EntityKind::Patient, id.into(), client, lock),
            studies: None,
        }
    }

    /// Switches caching on or off. Cached state is dropped on any toggle so a
    /// stale snapshot can never outlive the mode it was fetched under.
    pub fn set_lock(&mut self, lock: bool) {
        self.base.set_lock(lock);
        self.studies = None;
    }

    pub fn clear_cache(&mut self) {
        self.base.clear_cache();
        self.studies = None;
    }

    pub fn patient_id(&mut self) -> Result<String> {
        self.main_dicom_tag("PatientID")
    }

    pub fn name(&mut self) -> Result<String> {
        self.main_dicom_tag("PatientName")
    }

    pub fn birth_date(&mut self) -> Result<NaiveDate> {
        let date = self.main_dicom_tag("PatientBirthDate")?;
        util::parse_date(&date)
    }

    pub fn sex(&mut self) -> Result<String> {
        self.main_dicom_tag("PatientSex")
    }

    /// OtherPatientIDs, split on the DICOM multi-value separator.
    pub fn other_patient_ids(&mut self) -> Result<Vec<String>> {
        Ok(util::split_multi_value(&self.main_dicom_tag("OtherPatientIDs")?))
    }

    /// DICOM patient module (PatientName, PatientID, PatientBirthDate, ...).
    ///
    /// `simplify` and `short` are mutually exclusive; asking for both fails
    /// before anything is sent to the server.
    pub fn get_module(&self, simplify: bool, short: bool) -> Result<Map<String, Value>> {
        let format = match (simplify, short) {
            (true, true) => {
                return Err(Error::InvalidArgument(
                    "simplify and short cannot both be requested".to_string(),
                ))
            }
            (true, false) => ModuleFormat::Simplified,
            (false, true) => ModuleFormat::Short,
            (false, false) => ModuleFormat::Full,
        };
        self.base
            .client()
            .get_module(EntityKind::Patient, self.base.identifier(), format)
    }

    /// Whether the patient is protected against recycling.
    pub fn protected(&self) -> Result<bool> {
        Ok(self.base.client().get_protected(self.base.identifier())? == "1")
    }

    pub fn set_protected(&self, protected: bool) -> Result<()> {
        self.base
            .client()
            .set_protected(self.base.identifier(), protected)
    }

    /// Studies belonging to this patient.
    ///
    /// Locked: materialized once from the cached metadata document,
    /// constructed with the same lock flag, and lent out for navigation and
    /// pruning. Unlocked: re-fetched and rebuilt on every call.
    pub fn studies(&mut self) -> Result<&mut Vec<Study>> {
        if !self.base.lock() || self.studies.is_none() {
            let information = self.base.main_information()?;
            let lock = self.base.lock();
            let client = Arc::clone(self.base.client());
            let studies = child_ids(&information, "Studies")?
                .into_iter()
                .map(|id| Study::new(id, Arc::clone(&client), lock))
                .collect();
            self.studies = Some(studies);
        }
        Ok(self.studies.get_or_insert_with(Vec::new))
    }

    /// Drops cached studies that no longer hold any series.
    ///
    /// Purely local bookkeeping over lists already materialized under lock:
    /// no deletion request is ever sent, and nothing happens when the studies
    /// were never fetched. Studies whose series were never fetched survive.
    pub fn remove_empty_studies(&mut self) {
        if !self.base.lock() {
            return;
        }
        let Some(studies) = self.studies.as_mut() else {
            return;
        };
        for study in studies.iter_mut() {
            study.remove_empty_series();
        }
        studies.retain(|study| {
            study
                .cached_series()
                .map_or(true, |series| !series.is_empty())
        });
    }
}

impl RemoteEntity for Patient {
    const KIND: EntityKind = EntityKind::Patient;

    fn from_id(id: String, client: Arc<dyn ApiClient>, lock: bool) -> Self {
        Self::new(id, client, lock)
    }

    fn resource(&self) -> &Resource {
        &self.base
    }

    fn resource_mut(&mut self) -> &mut Resource {
        &mut self.base
    }
}

impl fmt::Display for Patient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.base, f)
    }
}

impl PartialEq for Patient {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base
    }
}

impl Eq for Patient {}
