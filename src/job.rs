//
// job.rs
// Orthanc-Client-rs
//
// Handle over asynchronous server jobs, with a blocking poll loop for callers that want the result.
//
// Thales Matheus Mendonça Santos - August 2026

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde_json::{Map, Value};

use crate::client::ApiClient;
use crate::error::{Error, Result};

/// Lifecycle states the archive reports for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Running,
    Success,
    Failure,
    Paused,
    Retry,
}

impl JobState {
    /// Terminal states need no further polling.
    pub fn is_done(self) -> bool {
        matches!(self, JobState::Success | JobState::Failure)
    }
}

impl FromStr for JobState {
    type Err = Error;

    fn from_str(state: &str) -> Result<Self> {
        match state {
            "Pending" => Ok(JobState::Pending),
            "Running" => Ok(JobState::Running),
            "Success" => Ok(JobState::Success),
            "Failure" => Ok(JobState::Failure),
            "Paused" => Ok(JobState::Paused),
            "Retry" => Ok(JobState::Retry),
            other => Err(Error::UnexpectedResponse(format!(
                "unknown job state '{other}'"
            ))),
        }
    }
}

/// Handle over one asynchronous server job, returned by operations requested
/// in non-blocking mode.
///
/// Nothing is cached: every accessor asks the server for the current job
/// document, since the whole point of the handle is watching it change.
pub struct Job {
    id: String,
    client: Arc<dyn ApiClient>,
}

impl Job {
    pub fn new(id: impl Into<String>, client: Arc<dyn ApiClient>) -> Self {
        Self {
            id: id.into(),
            client,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.id
    }

    /// Current job document.
    pub fn information(&self) -> Result<Map<String, Value>> {
        self.client.get_job(&self.id)
    }

    pub fn state(&self) -> Result<JobState> {
        let information = self.information()?;
        information
            .get("State")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                Error::UnexpectedResponse("State missing from the job document".to_string())
            })?
            .parse()
    }

    /// Payload produced by the job, e.g. the ID of a newly created entity.
    pub fn content(&self) -> Result<Map<String, Value>> {
        let information = self.information()?;
        information
            .get("Content")
            .and_then(Value::as_object)
            .cloned()
            .ok_or_else(|| {
                Error::UnexpectedResponse("Content missing from the job document".to_string())
            })
    }

    pub fn is_done(&self) -> Result<bool> {
        Ok(self.state()?.is_done())
    }

    /// Polls until the job reaches a terminal state, sleeping `poll_interval`
    /// between rounds, and returns that final state.
    pub fn block_until_completion(&self, poll_interval: Duration) -> Result<JobState> {
        loop {
            let state = self.state()?;
            if state.is_done() {
                return Ok(state);
            }
            thread::sleep(poll_interval);
        }
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Job({})", self.id)
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job").field("id", &self.id).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn states_parse_from_server_strings() {
        assert_eq!("Running".parse::<JobState>().unwrap(), JobState::Running);
        assert_eq!("Success".parse::<JobState>().unwrap(), JobState::Success);
        assert!("Exploded".parse::<JobState>().is_err());
    }

    #[test]
    fn only_terminal_states_are_done() {
        assert!(JobState::Success.is_done());
        assert!(JobState::Failure.is_done());
        assert!(!JobState::Pending.is_done());
        assert!(!JobState::Running.is_done());
        assert!(!JobState::Retry.is_done());
    }
}
