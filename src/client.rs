//
// client.rs
// Orthanc-Client-rs
//
// HTTP access to the archive: the ApiClient seam consumed by the resource tree plus the reqwest-backed implementation.
//
// Thales Matheus Mendonça Santos - August 2026

use std::time::Duration;

use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use reqwest::{Method, StatusCode};
use serde_json::{Map, Value};

use crate::anonymize::AnonymizeRequest;
use crate::error::{Error, Result};
use crate::resource::EntityKind;

/// Tag rendering requested from the module endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModuleFormat {
    #[default]
    Full,
    Simplified,
    Short,
}

impl ModuleFormat {
    fn query(self) -> Option<(&'static str, &'static str)> {
        match self {
            ModuleFormat::Full => None,
            ModuleFormat::Simplified => Some(("simplify", "true")),
            ModuleFormat::Short => Some(("short", "true")),
        }
    }
}

/// Narrow interface to the archive consumed by the resource tree.
///
/// Keeping the wire behind a trait lets tests drive the whole hierarchy
/// against an in-memory double while production code talks HTTP.
pub trait ApiClient {
    /// Full metadata document of one entity.
    fn get_entity(&self, kind: EntityKind, id: &str) -> Result<Map<String, Value>>;
    /// Zip archive of the entity and all of its descendants.
    fn get_archive(&self, kind: EntityKind, id: &str) -> Result<Vec<u8>>;
    /// Raw DICOM file of a single instance.
    fn get_file(&self, instance_id: &str) -> Result<Vec<u8>>;
    fn put_label(&self, kind: EntityKind, id: &str, label: &str) -> Result<()>;
    fn delete_label(&self, kind: EntityKind, id: &str, label: &str) -> Result<()>;
    /// Server-side anonymization; answers `{"ID": ..}` naming the new entity
    /// or the job creating it.
    fn post_anonymize(
        &self,
        kind: EntityKind,
        id: &str,
        request: &AnonymizeRequest,
    ) -> Result<Map<String, Value>>;
    fn get_module(&self, kind: EntityKind, id: &str, format: ModuleFormat)
        -> Result<Map<String, Value>>;
    /// Recycling protection, answered by the server as `"0"` or `"1"`.
    fn get_protected(&self, patient_id: &str) -> Result<String>;
    fn set_protected(&self, patient_id: &str, protected: bool) -> Result<()>;
    /// Status document of an asynchronous job.
    fn get_job(&self, job_id: &str) -> Result<Map<String, Value>>;
}

/// Blocking HTTP client for one archive server.
pub struct OrthancClient {
    http: HttpClient,
    base_url: String,
    credentials: Option<(String, String)>,
}

impl OrthancClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: HttpClient::new(),
            base_url,
            credentials: None,
        }
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Caps the duration of every request, connection setup included.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http = HttpClient::builder().timeout(timeout).build()?;
        Ok(self)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        tracing::debug!(%method, path, "archive request");
        let mut request = self.http.request(method, self.url(path));
        if let Some((username, password)) = &self.credentials {
            request = request.basic_auth(username, Some(password));
        }
        request
    }

    fn send(&self, request: RequestBuilder, path: &str) -> Result<Response> {
        let response = request.send()?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(path.to_string()));
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    fn get_json(&self, path: &str) -> Result<Value> {
        let response = self.send(self.request(Method::GET, path), path)?;
        Ok(response.json()?)
    }

    fn get_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let response = self.send(self.request(Method::GET, path), path)?;
        Ok(response.bytes()?.to_vec())
    }
}

fn as_object(value: Value, context: &str) -> Result<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(Error::UnexpectedResponse(format!(
            "{context}: expected a JSON object, got {other}"
        ))),
    }
}

impl ApiClient for OrthancClient {
    fn get_entity(&self, kind: EntityKind, id: &str) -> Result<Map<String, Value>> {
        let path = format!("{}/{}", kind.route(), id);
        let answer = self.get_json(&path)?;
        as_object(answer, &path)
    }

    fn get_archive(&self, kind: EntityKind, id: &str) -> Result<Vec<u8>> {
        self.get_bytes(&format!("{}/{}/archive", kind.route(), id))
    }

    fn get_file(&self, instance_id: &str) -> Result<Vec<u8>> {
        self.get_bytes(&format!("instances/{instance_id}/file"))
    }

    fn put_label(&self, kind: EntityKind, id: &str, label: &str) -> Result<()> {
        let path = format!("{}/{}/labels/{}", kind.route(), id, label);
        self.send(self.request(Method::PUT, &path), &path)?;
        Ok(())
    }

    fn delete_label(&self, kind: EntityKind, id: &str, label: &str) -> Result<()> {
        let path = format!("{}/{}/labels/{}", kind.route(), id, label);
        self.send(self.request(Method::DELETE, &path), &path)?;
        Ok(())
    }

    fn post_anonymize(
        &self,
        kind: EntityKind,
        id: &str,
        request: &AnonymizeRequest,
    ) -> Result<Map<String, Value>> {
        let path = format!("{}/{}/anonymize", kind.route(), id);
        let response = self.send(self.request(Method::POST, &path).json(request), &path)?;
        let answer = response.json()?;
        as_object(answer, &path)
    }

    fn get_module(
        &self,
        kind: EntityKind,
        id: &str,
        format: ModuleFormat,
    ) -> Result<Map<String, Value>> {
        let path = format!("{}/{}/module", kind.route(), id);
        let mut request = self.request(Method::GET, &path);
        if let Some(param) = format.query() {
            request = request.query(&[param]);
        }
        let response = self.send(request, &path)?;
        let answer = response.json()?;
        as_object(answer, &path)
    }

    fn get_protected(&self, patient_id: &str) -> Result<String> {
        let path = format!("patients/{patient_id}/protected");
        let response = self.send(self.request(Method::GET, &path), &path)?;
        Ok(response.text()?.trim().to_string())
    }

    fn set_protected(&self, patient_id: &str, protected: bool) -> Result<()> {
        let path = format!("patients/{patient_id}/protected");
        // The endpoint expects the literal numbers 1 / 0, not a JSON bool.
        let body = u32::from(protected);
        self.send(self.request(Method::PUT, &path).json(&body), &path)?;
        Ok(())
    }

    fn get_job(&self, job_id: &str) -> Result<Map<String, Value>> {
        let path = format!("jobs/{job_id}");
        let answer = self.get_json(&path)?;
        as_object(answer, &path)
    }
}
