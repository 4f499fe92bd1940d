//! Integration tests: registered jobs run end to end against a local HTTP
//! server and the local-filesystem store.

mod common;

use common::dataset_server::{DatasetServer, Reply};
use common::{fast_downloader, fast_retry, file_names};
use refsync_core::config::{Secret, StorageTarget, SyncConfig, Tuning, ENV_LICENSE_KEY};
use refsync_core::jobs::{self, DatasetJob, JobStatus, UploadPolicy};
use refsync_core::store::{build_object_store, Uploader};
use std::path::Path;
use tempfile::{tempdir, TempDir};

struct Env {
    urls: TempDir,
    temp: TempDir,
    store: TempDir,
}

impl Env {
    fn new() -> Self {
        Self {
            urls: tempdir().unwrap(),
            temp: tempdir().unwrap(),
            store: tempdir().unwrap(),
        }
    }

    fn config(&self, license_key: Option<&str>) -> SyncConfig {
        SyncConfig {
            gcp_project_id: "test-project".into(),
            gcs_bucket: "test-bucket".into(),
            maxmind_license_key: license_key.map(Secret::new),
            temp_dir: self.temp.path().to_path_buf(),
            urls_dir: self.urls.path().to_path_buf(),
            storage: StorageTarget::Local(self.store.path().to_path_buf()),
            tuning: Tuning::default(),
        }
    }

    fn write_side_file(&self, name: &str, body: &str) {
        std::fs::write(self.urls.path().join(name), body).unwrap();
    }

    fn job(&self, name: &str, cfg: &SyncConfig) -> DatasetJob {
        let uploader = Uploader::new(build_object_store(cfg).unwrap(), fast_retry());
        DatasetJob::new(jobs::lookup(name).unwrap(), cfg, uploader).with_downloader(fast_downloader())
    }

    fn bucket_dir(&self, prefix: &str) -> std::path::PathBuf {
        self.store.path().join("test-bucket").join(prefix)
    }
}

fn assert_empty_dir(dir: &Path) {
    assert_eq!(std::fs::read_dir(dir).unwrap().count(), 0, "{} not empty", dir.display());
}

#[tokio::test]
async fn side_file_job_uploads_successes_and_reports_failures() {
    let server = DatasetServer::start(vec![
        ("/numbering/sabc.csv", vec![Reply::ok("sabc rows")]),
        ("/numbering/s7.csv", vec![Reply::status(503), Reply::ok("s7 rows")]),
    ]);
    let env = Env::new();
    env.write_side_file(
        "ofcom-urls.txt",
        &format!(
            "# ofcom\n{}\n\n{}\n{}\n",
            server.url("/numbering/sabc.csv"),
            server.url("/numbering/missing.csv"),
            server.url("/numbering/s7.csv"),
        ),
    );
    let cfg = env.config(None);

    let outcome = jobs::run(&env.job("ofcom", &cfg), &cfg.temp_dir).await;

    assert_eq!(outcome.status, JobStatus::Success);
    assert_eq!(outcome.job, "ofcom");
    assert_eq!(outcome.downloaded, 2);
    assert_eq!(outcome.uploaded, 2);
    assert_eq!(outcome.files, vec!["sabc.csv", "s7.csv"]);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].contains("/numbering/missing.csv"));
    assert!(outcome.errors[0].contains("HTTP 404"));
    assert!(outcome.error.is_none());

    let uploaded = env.bucket_dir("codelist");
    assert_eq!(file_names(&uploaded), vec!["s7.csv", "sabc.csv"]);
    assert_eq!(std::fs::read(uploaded.join("s7.csv")).unwrap(), b"s7 rows");
    assert_empty_dir(env.temp.path());
}

#[tokio::test]
async fn abort_policy_behaves_like_continue_when_uploads_succeed() {
    let server = DatasetServer::start(vec![("/dump/countryInfo.txt", vec![Reply::ok("AD\tAND")])]);
    let env = Env::new();
    env.write_side_file("geonames-urls.txt", &server.url("/dump/countryInfo.txt"));
    let cfg = env.config(None);
    let job = env.job("geonames", &cfg).with_upload_policy(UploadPolicy::AbortOnError);

    let outcome = jobs::run(&job, &cfg.temp_dir).await;

    assert!(outcome.is_success());
    assert_eq!((outcome.downloaded, outcome.uploaded), (1, 1));
    assert!(env.bucket_dir("geonames").join("countryInfo.txt").is_file());
}

#[tokio::test]
async fn all_downloads_failing_is_still_a_completed_run() {
    let server = DatasetServer::start(vec![]);
    let env = Env::new();
    env.write_side_file("ofcom-urls.txt", &format!("{}\n", server.url("/nothing.csv")));
    let cfg = env.config(None);

    let outcome = jobs::run(&env.job("ofcom", &cfg), &cfg.temp_dir).await;

    assert!(outcome.is_success());
    assert_eq!((outcome.downloaded, outcome.uploaded), (0, 0));
    assert_eq!(outcome.errors.len(), 1);
    assert_empty_dir(env.temp.path());
}

#[tokio::test]
async fn missing_license_key_fails_before_any_request() {
    let server = DatasetServer::start(vec![]);
    let env = Env::new();
    env.write_side_file(
        "maxmind-urls.txt",
        &server.url("/app/geoip_download?edition_id=GeoLite2-City&license_key=YOUR_LICENSE_KEY"),
    );
    let cfg = env.config(None);

    let outcome = jobs::run(&env.job("maxmind", &cfg), &cfg.temp_dir).await;

    assert_eq!(outcome.status, JobStatus::Error);
    assert!(outcome.error.as_deref().unwrap().contains(ENV_LICENSE_KEY));
    assert!(server.targets().is_empty());
    assert_empty_dir(env.temp.path());
}

#[tokio::test]
async fn missing_or_empty_side_file_is_a_job_error() {
    let env = Env::new();
    let cfg = env.config(None);

    let outcome = jobs::run(&env.job("geonames", &cfg), &cfg.temp_dir).await;
    assert_eq!(outcome.status, JobStatus::Error);
    assert!(outcome.error.as_deref().unwrap().contains("geonames-urls.txt"));

    env.write_side_file("geonames-urls.txt", "\n# nothing yet\n\n");
    let outcome = jobs::run(&env.job("geonames", &cfg), &cfg.temp_dir).await;
    assert_eq!(outcome.status, JobStatus::Error);
    assert!(outcome.error.as_deref().unwrap().contains("no URLs found"));
    assert_empty_dir(env.temp.path());
}

#[tokio::test]
async fn outcome_json_shape() {
    let server = DatasetServer::start(vec![("/a.txt", vec![Reply::ok("a")])]);
    let env = Env::new();
    env.write_side_file("ofcom-urls.txt", &server.url("/a.txt"));
    let cfg = env.config(None);

    let outcome = jobs::run(&env.job("ofcom", &cfg), &cfg.temp_dir).await;
    let json = serde_json::to_value(&outcome).unwrap();

    assert_eq!(json["job"], "ofcom");
    assert_eq!(json["status"], "success");
    assert_eq!(json["downloaded"], 1);
    assert_eq!(json["uploaded"], 1);
    assert_eq!(json["files"], serde_json::json!(["a.txt"]));
    assert_eq!(json["errors"], serde_json::json!([]));
}
