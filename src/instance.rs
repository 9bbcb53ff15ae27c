//
// instance.rs
// Orthanc-Client-rs
//
// Instance proxy: the leaf of the hierarchy, including raw DICOM file download and decoding.
//
// Thales Matheus Mendonça Santos - August 2026

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDateTime;
use dicom::object::DefaultDicomObject;
use serde_json::Value;

use crate::client::ApiClient;
use crate::error::{Error, Result};
use crate::resource::{EntityKind, RemoteEntity, Resource};
use crate::util;

/// Proxy over one instance (a single DICOM object) stored in the archive.
#[derive(Debug)]
pub struct Instance {
    base: Resource,
}

impl Instance {
    pub fn new(id: impl Into<String>, client: Arc<dyn ApiClient>, lock: bool) -> Self {
        Self {
            base: Resource::new(EntityKind::Instance, id.into(), client, lock),
        }
    }

    /// Switches caching on or off. Cached state is dropped on any toggle.
    pub fn set_lock(&mut self, lock: bool) {
        self.base.set_lock(lock);
    }

    pub fn clear_cache(&mut self) {
        self.base.clear_cache();
    }

    /// SOPInstanceUID.
    pub fn uid(&mut self) -> Result<String> {
        self.main_dicom_tag("SOPInstanceUID")
    }

    pub fn instance_number(&mut self) -> Result<i32> {
        let value = self.main_dicom_tag("InstanceNumber")?;
        util::parse_int(&value)
    }

    /// Creation timestamp from InstanceCreationDate and, when recorded,
    /// InstanceCreationTime.
    pub fn creation_date(&mut self) -> Result<NaiveDateTime> {
        let date = self.main_dicom_tag("InstanceCreationDate")?;
        let time = match self.main_dicom_tag("InstanceCreationTime") {
            Ok(time) => Some(time),
            Err(Error::TagMissing(_)) => None,
            Err(error) => return Err(error),
        };
        util::parse_datetime(&date, time.as_deref())
    }

    /// Identifier of the series owning this instance.
    pub fn series_identifier(&mut self) -> Result<String> {
        let information = self.main_information()?;
        information
            .get("ParentSeries")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                Error::UnexpectedResponse(
                    "ParentSeries missing from the metadata document".to_string(),
                )
            })
    }

    /// Size of the stored DICOM file in bytes.
    pub fn file_size(&mut self) -> Result<u64> {
        let information = self.main_information()?;
        information
            .get("FileSize")
            .and_then(Value::as_u64)
            .ok_or_else(|| {
                Error::UnexpectedResponse("FileSize missing from the metadata document".to_string())
            })
    }

    /// Raw bytes of the stored DICOM file.
    pub fn get_file(&self) -> Result<Vec<u8>> {
        self.base.client().get_file(self.base.identifier())
    }

    /// Downloads the stored file and decodes it into a DICOM object.
    pub fn get_dicom(&self) -> Result<DefaultDicomObject> {
        let bytes = self.get_file()?;
        // A complete DICOM file opens with a 128-byte preamble before the
        // DICM marker; the parser expects to start at the marker.
        let data = if bytes.get(128..132) == Some(&b"DICM"[..]) {
            &bytes[128..]
        } else {
            &bytes[..]
        };
        Ok(dicom::object::from_reader(data)?)
    }
}

impl RemoteEntity for Instance {
    const KIND: EntityKind = EntityKind::Instance;

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

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.base, f)
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base
    }
}

impl Eq for Instance {}
