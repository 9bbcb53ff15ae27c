//
// study.rs
// Orthanc-Client-rs
//
// Study proxy: per-study tags, the owning patient's summary, and series traversal.
//
// Thales Matheus Mendonça Santos - August 2026

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde_json::{Map, Value};

use crate::client::ApiClient;
use crate::error::{Error, Result};
use crate::resource::{child_ids, EntityKind, RemoteEntity, Resource};
use crate::series::Series;
use crate::util;

/// Proxy over one study stored in the archive.
#[derive(Debug)]
pub struct Study {
    base: Resource,
    series: Option<Vec<Series>>,
}

impl Study {
    pub fn new(id: impl Into<String>, client: Arc<dyn ApiClient>, lock: bool) -> Self {
        Self {
            base: Resource::new(EntityKind::Study, id.into(), client, lock),
            series: None,
        }
    }

    /// Switches caching on or off. Cached state is dropped on any toggle.
    pub fn set_lock(&mut self, lock: bool) {
        self.base.set_lock(lock);
        self.series = None;
    }

    pub fn clear_cache(&mut self) {
        self.base.clear_cache();
        self.series = None;
    }

    pub fn study_id(&mut self) -> Result<String> {
        self.main_dicom_tag("StudyID")
    }

    /// StudyInstanceUID.
    pub fn uid(&mut self) -> Result<String> {
        self.main_dicom_tag("StudyInstanceUID")
    }

    /// Study timestamp from StudyDate and, when recorded, StudyTime.
    pub fn date(&mut self) -> Result<NaiveDateTime> {
        let date = self.main_dicom_tag("StudyDate")?;
        let time = match self.main_dicom_tag("StudyTime") {
            Ok(time) => Some(time),
            Err(Error::TagMissing(_)) => None,
            Err(error) => return Err(error),
        };
        util::parse_datetime(&date, time.as_deref())
    }

    pub fn referring_physician_name(&mut self) -> Result<String> {
        self.main_dicom_tag("ReferringPhysicianName")
    }

    pub fn description(&mut self) -> Result<String> {
        self.main_dicom_tag("StudyDescription")
    }

    pub fn institution_name(&mut self) -> Result<String> {
        self.main_dicom_tag("InstitutionName")
    }

    pub fn requested_procedure_description(&mut self) -> Result<String> {
        self.main_dicom_tag("RequestedProcedureDescription")
    }

    pub fn accession_number(&mut self) -> Result<String> {
        self.main_dicom_tag("AccessionNumber")
    }

    /// Identifier of the patient owning this study.
    pub fn patient_identifier(&mut self) -> Result<String> {
        let information = self.main_information()?;
        information
            .get("ParentPatient")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                Error::UnexpectedResponse(
                    "ParentPatient missing from the metadata document".to_string(),
                )
            })
    }

    /// Summary of the owning patient's main tags, as carried on the study
    /// document itself.
    pub fn patient_information(&mut self) -> Result<Map<String, Value>> {
        let information = self.main_information()?;
        information
            .get("PatientMainDicomTags")
            .and_then(Value::as_object)
            .cloned()
            .ok_or_else(|| {
                Error::UnexpectedResponse(
                    "PatientMainDicomTags missing from the metadata document".to_string(),
                )
            })
    }

    /// Series belonging to this study. Same contract as
    /// [`Patient::studies`](crate::patient::Patient::studies).
    pub fn series(&mut self) -> Result<&mut Vec<Series>> {
        if !self.base.lock() || self.series.is_none() {
            let information = self.base.main_information()?;
            let lock = self.base.lock();
            let client = Arc::clone(self.base.client());
            let series = child_ids(&information, "Series")?
                .into_iter()
                .map(|id| Series::new(id, Arc::clone(&client), lock))
                .collect();
            self.series = Some(series);
        }
        Ok(self.series.get_or_insert_with(Vec::new))
    }

    pub(crate) fn cached_series(&self) -> Option<&[Series]> {
        self.series.as_deref()
    }

    /// Drops cached series that no longer hold any instances. Local cache
    /// bookkeeping only; series whose instances were never fetched survive.
    pub fn remove_empty_series(&mut self) {
        if !self.base.lock() {
            return;
        }
        let Some(list) = self.series.as_mut() else {
            return;
        };
        for series in list.iter_mut() {
            series.remove_empty_instances();
        }
        list.retain(|series| {
            series
                .cached_instances()
                .map_or(true, |instances| !instances.is_empty())
        });
    }
}

impl RemoteEntity for Study {
    const KIND: EntityKind = EntityKind::Study;

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

impl fmt::Display for Study {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.base, f)
    }
}

impl PartialEq for Study {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base
    }
}

impl Eq for Study {}
