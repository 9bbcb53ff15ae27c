//
// series.rs
// Orthanc-Client-rs
//
// Series proxy: acquisition-level tags and instance traversal.
//
// Thales Matheus Mendonça Santos - August 2026

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde_json::Value;

use crate::client::ApiClient;
use crate::error::{Error, Result};
use crate::instance::Instance;
use crate::resource::{child_ids, EntityKind, RemoteEntity, Resource};
use crate::util;

/// Proxy over one series stored in the archive.
#[derive(Debug)]
pub struct Series {
    base: Resource,
    instances: Option<Vec<Instance>>,
}

impl Series {
    pub fn new(id: impl Into<String>, client: Arc<dyn ApiClient>, lock: bool) -> Self {
        Self {
            base: Resource::new(EntityKind::Series, id.into(), client, lock),
            instances: None,
        }
    }

    /// Switches caching on or off. Cached state is dropped on any toggle.
    pub fn set_lock(&mut self, lock: bool) {
        self.base.set_lock(lock);
        self.instances = None;
    }

    pub fn clear_cache(&mut self) {
        self.base.clear_cache();
        self.instances = None;
    }

    fn int_tag(&mut self, tag: &str) -> Result<i32> {
        let value = self.main_dicom_tag(tag)?;
        util::parse_int(&value)
    }

    /// SeriesInstanceUID.
    pub fn uid(&mut self) -> Result<String> {
        self.main_dicom_tag("SeriesInstanceUID")
    }

    pub fn modality(&mut self) -> Result<String> {
        self.main_dicom_tag("Modality")
    }

    pub fn manufacturer(&mut self) -> Result<String> {
        self.main_dicom_tag("Manufacturer")
    }

    pub fn series_number(&mut self) -> Result<i32> {
        self.int_tag("SeriesNumber")
    }

    /// Series timestamp from SeriesDate and, when recorded, SeriesTime.
    pub fn date(&mut self) -> Result<NaiveDateTime> {
        let date = self.main_dicom_tag("SeriesDate")?;
        let time = match self.main_dicom_tag("SeriesTime") {
            Ok(time) => Some(time),
            Err(Error::TagMissing(_)) => None,
            Err(error) => return Err(error),
        };
        util::parse_datetime(&date, time.as_deref())
    }

    /// Identifier of the study owning this series.
    pub fn study_identifier(&mut self) -> Result<String> {
        let information = self.main_information()?;
        information
            .get("ParentStudy")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                Error::UnexpectedResponse(
                    "ParentStudy missing from the metadata document".to_string(),
                )
            })
    }

    pub fn performed_procedure_step_description(&mut self) -> Result<String> {
        self.main_dicom_tag("PerformedProcedureStepDescription")
    }

    pub fn protocol_name(&mut self) -> Result<String> {
        self.main_dicom_tag("ProtocolName")
    }

    pub fn station_name(&mut self) -> Result<String> {
        self.main_dicom_tag("StationName")
    }

    pub fn description(&mut self) -> Result<String> {
        self.main_dicom_tag("StudyDescription")
    }

    pub fn body_part_examined(&mut self) -> Result<String> {
        self.main_dicom_tag("BodyPartExamined")
    }

    pub fn sequence_name(&mut self) -> Result<String> {
        self.main_dicom_tag("SequenceName")
    }

    pub fn cardiac_number_of_images(&mut self) -> Result<i32> {
        self.int_tag("CardiacNumberOfImages")
    }

    pub fn images_in_acquisition(&mut self) -> Result<i32> {
        self.int_tag("ImagesInAcquisition")
    }

    pub fn number_of_temporal_positions(&mut self) -> Result<i32> {
        self.int_tag("NumberOfTemporalPositions")
    }

    pub fn number_of_slices(&mut self) -> Result<i32> {
        self.int_tag("NumberOfSlices")
    }

    pub fn number_of_time_slices(&mut self) -> Result<i32> {
        self.int_tag("NumberOfTimeSlices")
    }

    /// Direction cosines of the first row and column, as the six decimal
    /// values of ImageOrientationPatient.
    pub fn image_orientation_patient(&mut self) -> Result<Vec<f64>> {
        let orientation = self.main_dicom_tag("ImageOrientationPatient")?;
        util::split_multi_value(&orientation)
            .iter()
            .map(|part| util::parse_float(part))
            .collect()
    }

    pub fn series_type(&mut self) -> Result<String> {
        self.main_dicom_tag("SeriesType")
    }

    pub fn operators_name(&mut self) -> Result<String> {
        self.main_dicom_tag("OperatorsName")
    }

    pub fn acquisition_device_processing_description(&mut self) -> Result<String> {
        self.main_dicom_tag("AcquisitionDeviceProcessingDescription")
    }

    pub fn contrast_bolus_agent(&mut self) -> Result<String> {
        self.main_dicom_tag("ContrastBolusAgent")
    }

    /// Instances belonging to this series. Same contract as
    /// [`Patient::studies`](crate::patient::Patient::studies).
    pub fn instances(&mut self) -> Result<&mut Vec<Instance>> {
        if !self.base.lock() || self.instances.is_none() {
            let information = self.base.main_information()?;
            let lock = self.base.lock();
            let client = Arc::clone(self.base.client());
            let instances = child_ids(&information, "Instances")?
                .into_iter()
                .map(|id| Instance::new(id, Arc::clone(&client), lock))
                .collect();
            self.instances = Some(instances);
        }
        Ok(self.instances.get_or_insert_with(Vec::new))
    }

    pub(crate) fn cached_instances(&self) -> Option<&[Instance]> {
        self.instances.as_deref()
    }

    /// Leaf-level counterpart of the pruning sweeps. Instances have no
    /// children of their own, so there is nothing to drop; the method keeps
    /// the sweep uniform across the hierarchy.
    pub fn remove_empty_instances(&mut self) {}
}

impl RemoteEntity for Series {
    const KIND: EntityKind = EntityKind::Series;

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

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.base, f)
    }
}

impl PartialEq for Series {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base
    }
}

impl Eq for Series {}
