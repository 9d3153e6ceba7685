use field_boundary::{BoundaryCommand, PipelineConfig};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JobError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    Boundary(#[from] field_boundary::BoundaryError),
    #[error("Duplicate request name '{0}'")]
    DuplicateName(String),
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

/// One detection request to trace as part of a batch
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct JobEntry {
    /// Output file stem
    pub name: String,
    /// Path to the request JSON, relative to the job file
    pub path: PathBuf,
    /// Output dialect; defaults to a GeoJSON FeatureCollection
    #[serde(default)]
    pub command: BoundaryCommand,
}

/// Batch tracing job: a pipeline configuration and a list of requests
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct TraceJob {
    /// Output directory, relative to the job file
    pub output_dir: PathBuf,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    pub requests: Vec<JobEntry>,
}

impl TraceJob {
    /// Load TraceJob configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self, JobError> {
        let job: TraceJob = toml::from_str(content)?;
        job.validate()?;
        Ok(job)
    }

    /// Load TraceJob configuration from JSON string
    pub fn from_json(content: &str) -> Result<Self, JobError> {
        let job: TraceJob = serde_json::from_str(content)?;
        job.validate()?;
        Ok(job)
    }

    /// Auto-detect file format and load configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, JobError> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml(&fs::read_to_string(path_ref)?),
            Some("json") => Self::from_json(&fs::read_to_string(path_ref)?),
            _ => Err(JobError::UnsupportedFileFormat),
        }
    }

    /// Convert TraceJob to TOML string
    pub fn to_toml(&self) -> Result<String, JobError> {
        Ok(toml::to_string_pretty(&self)?)
    }

    fn validate(&self) -> Result<(), JobError> {
        self.pipeline.validate()?;

        let mut seen = std::collections::HashSet::new();
        for entry in &self.requests {
            if !seen.insert(entry.name.as_str()) {
                return Err(JobError::DuplicateName(entry.name.clone()));
            }
        }
        Ok(())
    }

    /// Resolve an entry's request path against the job file's directory
    pub fn resolve(&self, entry: &JobEntry, job_dir: &Path) -> PathBuf {
        job_dir.join(&entry.path)
    }

    /// Output directory resolved against the job file's directory
    pub fn resolve_output_dir(&self, job_dir: &Path) -> PathBuf {
        job_dir.join(&self.output_dir)
    }

    /// Output file for an entry, e.g. `<output_dir>/<name>.geojson`
    pub fn output_path(&self, entry: &JobEntry, job_dir: &Path) -> PathBuf {
        let extension = match entry.command {
            BoundaryCommand::TraceBoundaries | BoundaryCommand::TraceFeatureList => "geojson",
            BoundaryCommand::TracePaths => "json",
        };
        self.resolve_output_dir(job_dir).join(format!("{}.{}", entry.name, extension))
    }
}

/// Write pretty JSON to a file, or to stdout when no path is given
pub fn write_json(value: &serde_json::Value, output: Option<&Path>) -> Result<(), JobError> {
    let content = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => fs::write(path, content)?,
        None => println!("{}", content),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const JOB_TOML: &str = r#"
output_dir = "out"

[pipeline]
min_points_for_simplification = 10

[[requests]]
name = "north_field"
path = "requests/north_field.json"

[[requests]]
name = "weeds"
path = "/data/weeds.json"
command = { type = "trace_paths" }
"#;

    #[test]
    fn test_job_from_toml() {
        let job = TraceJob::from_toml(JOB_TOML).unwrap();
        assert_eq!(job.pipeline.min_points_for_simplification, 10);
        assert_eq!(job.requests.len(), 2);
        assert_eq!(job.requests[0].command, BoundaryCommand::TraceBoundaries);
        assert_eq!(job.requests[1].command, BoundaryCommand::TracePaths);
    }

    #[test]
    fn test_job_paths() {
        let job = TraceJob::from_toml(JOB_TOML).unwrap();
        let dir = Path::new("/jobs");
        assert_eq!(job.resolve(&job.requests[0], dir), PathBuf::from("/jobs/requests/north_field.json"));
        assert_eq!(job.resolve(&job.requests[1], dir), PathBuf::from("/data/weeds.json"));
        assert_eq!(job.output_path(&job.requests[0], dir), PathBuf::from("/jobs/out/north_field.geojson"));
        assert_eq!(job.output_path(&job.requests[1], dir), PathBuf::from("/jobs/out/weeds.json"));
    }

    #[test]
    fn test_output_dir_follows_job_file() {
        let mut job = TraceJob::from_toml(JOB_TOML).unwrap();
        let entry = job.requests[0].clone();

        assert_eq!(job.resolve_output_dir(Path::new("/a")), PathBuf::from("/a/out"));
        assert_eq!(job.output_path(&entry, Path::new("/b")), PathBuf::from("/b/out/north_field.geojson"));

        job.output_dir = PathBuf::from("/srv/boundaries");
        assert_eq!(job.output_path(&entry, Path::new("/a")), PathBuf::from("/srv/boundaries/north_field.geojson"));
    }

    #[test]
    fn test_job_from_json_defaults_pipeline() {
        let job = TraceJob::from_json(r#"{
            "output_dir": "out",
            "requests": [{"name": "a", "path": "a.json"}]
        }"#).unwrap();
        assert_eq!(job.pipeline, PipelineConfig::default());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = TraceJob::from_json(r#"{
            "output_dir": "out",
            "requests": [{"name": "a", "path": "a.json"}, {"name": "a", "path": "b.json"}]
        }"#);
        assert!(matches!(result, Err(JobError::DuplicateName(name)) if name == "a"));
    }

    #[test]
    fn test_job_toml_roundtrip() {
        let job = TraceJob::from_toml(JOB_TOML).unwrap();
        let again = TraceJob::from_toml(&job.to_toml().unwrap()).unwrap();
        assert_eq!(again, job);
    }
}
