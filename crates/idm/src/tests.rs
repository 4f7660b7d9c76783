//! Unit tests for the IDM bridge
//!
//! Installation lookup is exercised through in-memory software lists, header
//! fetching through a local mock server, and completion polling through
//! temporary directories. Nothing here launches a real IDM.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::tempdir;
use tokio_test::assert_ok;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::error::Result;
use crate::{Download, IDM_DISPLAY_NAME, Idm, IdmConfig, IdmError, InstalledApp, SoftwareList};

/// In-memory software list that counts how often it is queried
struct StaticSoftwareList {
    apps: Vec<InstalledApp>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl SoftwareList for StaticSoftwareList {
    async fn installed_software(&self) -> Result<Vec<InstalledApp>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.apps.clone())
    }
}

/// Software list whose first query fails and later queries succeed
struct FlakySoftwareList {
    apps: Vec<InstalledApp>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl SoftwareList for FlakySoftwareList {
    async fn installed_software(&self) -> Result<Vec<InstalledApp>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call == 0 {
            return Err(IdmError::SoftwareList {
                message: "registry unavailable".to_string(),
                source: None,
            });
        }
        Ok(self.apps.clone())
    }
}

fn idm_entry() -> InstalledApp {
    InstalledApp {
        name: IDM_DISPLAY_NAME.to_string(),
        uninstall_command: r"C:\Program Files (x86)\Internet Download Manager\Uninstall.exe"
            .to_string(),
    }
}

fn fast_config() -> IdmConfig {
    IdmConfig {
        poll_interval: Duration::from_millis(25),
        ..IdmConfig::default()
    }
}

/// Build a handle over a fixed software list, returning the query counter
fn idm_with_list(apps: Vec<InstalledApp>) -> (Idm, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let provider = StaticSoftwareList {
        apps,
        calls: calls.clone(),
    };
    let idm = Idm::with_software_list(fast_config(), Box::new(provider)).unwrap();
    (idm, calls)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

mod installation_tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn lookup_is_cached_after_the_first_query() {
        let (idm, calls) = idm_with_list(vec![idm_entry()]);

        let first = idm.verify_installed().await.unwrap();
        let second = idm.verify_installed().await.unwrap();

        assert!(first);
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn executable_path_is_derived_from_the_uninstall_command() {
        let (idm, _) = idm_with_list(vec![idm_entry()]);

        let executable = idm.executable_path().await.unwrap();
        assert_eq!(
            executable,
            PathBuf::from(r"C:\Program Files (x86)\Internet Download Manager\IDMan.exe")
        );
    }

    #[tokio::test]
    async fn quotes_around_the_uninstall_command_are_stripped() {
        let entry = InstalledApp {
            name: IDM_DISPLAY_NAME.to_string(),
            uninstall_command: r#""C:\idm\Uninstall.exe""#.to_string(),
        };
        let (idm, _) = idm_with_list(vec![entry]);

        let executable = idm.executable_path().await.unwrap();
        assert_eq!(executable, PathBuf::from(r"C:\idm\IDMan.exe"));
    }

    #[tokio::test]
    async fn name_match_is_exact() {
        let near_miss = InstalledApp {
            name: "Internet Download Manager 6".to_string(),
            uninstall_command: r"C:\idm\Uninstall.exe".to_string(),
        };
        let (idm, _) = idm_with_list(vec![near_miss]);

        assert!(!idm.verify_installed().await.unwrap());
    }

    #[tokio::test]
    async fn missing_idm_reports_not_installed() {
        let other = InstalledApp {
            name: "Some Other Tool".to_string(),
            uninstall_command: r"C:\other\Uninstall.exe".to_string(),
        };
        let (idm, _) = idm_with_list(vec![other]);

        assert!(!idm.verify_installed().await.unwrap());
        assert!(matches!(
            idm.executable_path().await,
            Err(IdmError::NotInstalled)
        ));
        assert!(matches!(
            idm.start_main_queue().await,
            Err(IdmError::NotInstalled)
        ));

        let download = Download::new("http://example.com/f.zip");
        assert!(matches!(
            idm.download(&download).await,
            Err(IdmError::NotInstalled)
        ));
    }

    // Regression: the original cached "installed = true" when the software
    // list query itself failed. A failed query must not be cached at all.
    #[tokio::test]
    async fn failed_query_is_not_cached_as_installed() {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = FlakySoftwareList {
            apps: vec![idm_entry()],
            calls: calls.clone(),
        };
        let idm = Idm::with_software_list(fast_config(), Box::new(provider)).unwrap();

        let first = idm.verify_installed().await;
        assert!(matches!(first, Err(IdmError::SoftwareList { .. })));

        // The failure was not cached, so the next call queries again
        let second = idm.verify_installed().await.unwrap();
        assert!(second);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalid_urls_are_rejected_before_lookup() {
        let (idm, calls) = idm_with_list(vec![idm_entry()]);

        let result = idm.add_to_queue("not a url").await;
        assert!(matches!(result, Err(IdmError::InvalidUrl { .. })));

        let download = Download::new("not a url");
        let result = idm.download(&download).await;
        assert!(matches!(result, Err(IdmError::InvalidUrl { .. })));

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}

mod file_name_tests {
    use super::*;

    async fn head_server(response: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/file"))
            .respond_with(response)
            .expect(1)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn file_name_is_resolved_and_headers_are_cached() {
        let response = ResponseTemplate::new(200)
            .insert_header("Content-Disposition", "attachment; filename=report.pdf");
        let server = head_server(response).await;

        let (idm, _) = idm_with_list(vec![idm_entry()]);
        let mut download = Download::new(format!("{}/file", server.uri()));

        idm.resolve_file_name(&mut download).await.unwrap();
        assert_eq!(download.file_name(), Some("report.pdf"));

        // Second resolution reuses the cached headers; the mock allows a
        // single HEAD and verifies on drop
        idm.resolve_file_name(&mut download).await.unwrap();
        assert_eq!(download.file_name(), Some("report.pdf"));
    }

    #[tokio::test]
    async fn missing_content_disposition_is_an_error_but_headers_stay_cached() {
        let server = head_server(ResponseTemplate::new(200)).await;

        let (idm, _) = idm_with_list(vec![idm_entry()]);
        let mut download = Download::new(format!("{}/file", server.uri()));

        let first = idm.resolve_file_name(&mut download).await;
        assert!(matches!(first, Err(IdmError::FileNameHeader)));

        // Still only one HEAD: the fetched headers were kept even though no
        // file name could be extracted from them
        let second = idm.resolve_file_name(&mut download).await;
        assert!(matches!(second, Err(IdmError::FileNameHeader)));
    }

    #[tokio::test]
    async fn non_200_status_is_reported() {
        let server = head_server(ResponseTemplate::new(404)).await;

        let (idm, _) = idm_with_list(vec![idm_entry()]);
        let mut download = Download::new(format!("{}/file", server.uri()));

        let result = idm.resolve_file_name(&mut download).await;
        assert!(matches!(
            result,
            Err(IdmError::UnexpectedStatus { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn unreachable_hosts_are_a_header_fetch_error() {
        let (idm, _) = idm_with_list(vec![idm_entry()]);
        // Port 1 is essentially never listening
        let mut download = Download::new("http://127.0.0.1:1/file");

        let result = idm.resolve_file_name(&mut download).await;
        assert!(matches!(result, Err(IdmError::HeaderFetch { .. })));
    }
}

mod wait_tests {
    use super::*;

    #[tokio::test]
    async fn waiting_requires_a_directory() {
        let (idm, _) = idm_with_list(vec![idm_entry()]);
        let mut download = Download::new("http://example.com/f.zip").with_file_name("f.zip");

        let result = idm
            .wait_for_finish(&mut download, Duration::from_millis(100))
            .await;
        assert!(matches!(result, Err(IdmError::PathNotProvided)));
    }

    #[tokio::test]
    async fn file_created_during_the_wait_is_detected() {
        init_tracing();
        let dir = tempdir().unwrap();
        let (idm, _) = idm_with_list(vec![idm_entry()]);

        let mut download = Download::new("http://example.com/f.zip")
            .with_directory(dir.path().to_string_lossy())
            .with_file_name("f.zip");
        let target = download.full_path().unwrap();

        let writer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(60)).await;
            tokio::fs::write(&target, b"payload").await.unwrap();
        });

        let result = idm
            .wait_for_finish(&mut download, Duration::from_secs(2))
            .await;
        writer.await.unwrap();
        assert_ok!(result);
    }

    #[tokio::test]
    async fn wait_times_out_when_the_file_never_appears() {
        init_tracing();
        let dir = tempdir().unwrap();
        let (idm, _) = idm_with_list(vec![idm_entry()]);

        let mut download = Download::new("http://example.com/f.zip")
            .with_directory(dir.path().to_string_lossy())
            .with_file_name("f.zip");

        let started = std::time::Instant::now();
        let result = idm
            .wait_for_finish(&mut download, Duration::from_millis(150))
            .await;
        let elapsed = started.elapsed();

        assert!(matches!(result, Err(IdmError::WaitTimeout { .. })));
        assert!(elapsed >= Duration::from_millis(140), "returned after {elapsed:?}");
        assert!(elapsed < Duration::from_secs(2), "returned after {elapsed:?}");
    }

    #[tokio::test]
    async fn wait_resolves_the_file_name_from_headers_when_missing() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/file"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Disposition", "attachment; filename=data.bin"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        tokio::fs::write(dir.path().join("data.bin"), b"payload")
            .await
            .unwrap();

        let (idm, _) = idm_with_list(vec![idm_entry()]);
        let mut download = Download::new(format!("{}/file", server.uri()))
            .with_directory(dir.path().to_string_lossy());

        let result = idm
            .wait_for_finish(&mut download, Duration::from_secs(2))
            .await;

        assert_ok!(result);
        assert_eq!(download.file_name(), Some("data.bin"));
    }
}
