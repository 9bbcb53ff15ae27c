use std::collections::BTreeMap;

use serde::Serialize;

use crate::job::Job;

/// Body of a server-side anonymization request.
///
/// Defaults mirror the server's: nothing removed, replaced, or kept, the
/// original entity preserved (`keep_source`), synchronous execution.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AnonymizeRequest {
    /// Tags to strip from the anonymized copy.
    pub remove: Vec<String>,
    /// Tags to overwrite with a fixed value.
    pub replace: BTreeMap<String, String>,
    /// Tags to carry over unchanged.
    pub keep: Vec<String>,
    /// Required to touch protected tags such as PatientID.
    pub force: bool,
    /// Run as a server job instead of waiting for the new entity.
    pub asynchronous: bool,
    pub keep_private_tags: bool,
    pub keep_source: bool,
    /// Job priority in asynchronous mode; lower values run first.
    pub priority: i32,
    /// Ignore errors during the individual steps of the job.
    pub permissive: bool,
    /// DICOM standard version to anonymize against; the server picks its
    /// default when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dicom_version: Option<String>,
}

impl Default for AnonymizeRequest {
    fn default() -> Self {
        Self {
            remove: Vec::new(),
            replace: BTreeMap::new(),
            keep: Vec::new(),
            force: false,
            asynchronous: false,
            keep_private_tags: false,
            keep_source: true,
            priority: 0,
            permissive: false,
            dicom_version: None,
        }
    }
}

/// Outcome of an anonymization fork: the new entity directly, or the job
/// creating it when the request was asynchronous.
#[derive(Debug)]
pub enum Anonymized<T> {
    Entity(T),
    Job(Job),
}

impl<T> Anonymized<T> {
    pub fn entity(self) -> Option<T> {
        match self {
            Anonymized::Entity(entity) => Some(entity),
            Anonymized::Job(_) => None,
        }
    }

    pub fn job(self) -> Option<Job> {
        match self {
            Anonymized::Job(job) => Some(job),
            Anonymized::Entity(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_with_server_field_names() {
        let request = AnonymizeRequest {
            remove: vec!["StudyDate".to_string()],
            ..Default::default()
        };

        let body = serde_json::to_value(&request).expect("serialize");
        assert_eq!(body["Remove"][0], "StudyDate");
        assert_eq!(body["KeepSource"], true);
        assert_eq!(body["Asynchronous"], false);
        assert_eq!(body["Priority"], 0);
        // Absent version must be omitted, not serialized as null.
        assert!(body.get("DicomVersion").is_none());
    }

    #[test]
    fn dicom_version_is_sent_when_set() {
        let request = AnonymizeRequest {
            dicom_version: Some("2021b".to_string()),
            ..Default::default()
        };

        let body = serde_json::to_value(&request).expect("serialize");
        assert_eq!(body["DicomVersion"], "2021b");
    }
}
