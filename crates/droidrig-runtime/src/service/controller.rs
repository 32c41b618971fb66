//! Driver-server lifecycle.
//!
//! ```text
//! Stopped --start--> Starting --ready--> Running --stop--> Stopped
//!                       \---spawn/readiness failure---> Stopped
//! ```
//!
//! `start` on a running service and `stop` on a stopped one are no-ops.
//! The controller owns the child; dropping it kills the server.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use droidrig_core::{
    CommandRunner, OrchestratorError, OrchestratorResult, ServiceEndpoint, ServiceState, Settings,
};
use tokio::process::{Child, Command};
use tracing::{info, warn};

use super::readiness::wait_for_status;
use crate::availability::AvailabilityChecker;
use crate::process::stream::spawn_log_reader;
use crate::process::{DEFAULT_SHUTDOWN_GRACE, shutdown_child};

/// Fixed configuration of the driver server; never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub executable: String,
    pub host: String,
    pub port: u16,
    pub session_override: bool,
    pub log_level: String,
    /// `None` skips the readiness check.
    pub startup_timeout: Option<Duration>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl ServiceConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            executable: settings.service_executable.clone(),
            host: settings.service_host.clone(),
            port: settings.service_port,
            session_override: settings.session_override,
            log_level: settings.service_log_level.clone(),
            startup_timeout: settings.service_startup_timeout(),
        }
    }

    /// `<exe> --address <host> --port <port> [--session-override] --log-level <level>`
    pub fn argv(&self) -> Vec<String> {
        let mut argv = vec![
            self.executable.clone(),
            "--address".to_string(),
            self.host.clone(),
            "--port".to_string(),
            self.port.to_string(),
        ];
        if self.session_override {
            argv.push("--session-override".to_string());
        }
        argv.push("--log-level".to_string());
        argv.push(self.log_level.clone());
        argv
    }
}

/// Owns at most one running driver-server process.
pub struct ServiceController {
    config: ServiceConfig,
    availability: AvailabilityChecker,
    state: ServiceState,
    endpoint: Option<ServiceEndpoint>,
    child: Option<Child>,
}

impl std::fmt::Debug for ServiceController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceController")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("endpoint", &self.endpoint)
            .field("pid", &self.child.as_ref().and_then(Child::id))
            .finish_non_exhaustive()
    }
}

impl ServiceController {
    /// `runner` is only used to look the executable up on PATH.
    pub fn new(config: ServiceConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            config,
            availability: AvailabilityChecker::new(runner),
            state: ServiceState::Stopped,
            endpoint: None,
            child: None,
        }
    }

    pub const fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub const fn state(&self) -> ServiceState {
        self.state
    }

    /// Start the server, or return the existing endpoint if it is running.
    ///
    /// # Errors
    ///
    /// - `ExecutableNotFound` if the server program is unavailable
    /// - `ServiceStartFailed` if it fails to spawn or never becomes ready
    pub async fn start(&mut self) -> OrchestratorResult<ServiceEndpoint> {
        self.reap_if_exited();

        if let (ServiceState::Running, Some(endpoint)) = (self.state, &self.endpoint) {
            warn!(url = %endpoint.url, "Service already running, returning existing endpoint");
            return Ok(endpoint.clone());
        }

        if !self.availability.is_available(&self.config.executable).await {
            return Err(OrchestratorError::ExecutableNotFound {
                program: self.config.executable.clone(),
            });
        }

        let argv = self.config.argv();
        let command_line = argv.join(" ");
        self.state = ServiceState::Starting;
        info!(command = %command_line, "Starting service");

        let mut cmd = Command::new(&argv[0]);
        cmd.args(&argv[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                self.state = ServiceState::Stopped;
                return Err(OrchestratorError::ServiceStartFailed {
                    command: command_line,
                    reason: e.to_string(),
                });
            }
        };

        let source = format!("{}:{}", self.config.host, self.config.port);
        if let Some(stdout) = child.stdout.take() {
            spawn_log_reader(stdout, source.clone(), "stdout");
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_log_reader(stderr, source, "stderr");
        }

        let endpoint = ServiceEndpoint::new(self.config.host.clone(), self.config.port);

        if let Some(startup_timeout) = self.config.startup_timeout {
            if let Err(reason) = wait_for_status(&endpoint.url, startup_timeout, &mut child).await
            {
                if let Err(e) = shutdown_child(&mut child, DEFAULT_SHUTDOWN_GRACE).await {
                    warn!(error = %e, "Failed to shut down service that never became ready");
                }
                self.state = ServiceState::Stopped;
                return Err(OrchestratorError::ServiceStartFailed {
                    command: command_line,
                    reason,
                });
            }
        }

        info!(url = %endpoint.url, pid = ?child.id(), "Service running");
        self.child = Some(child);
        self.endpoint = Some(endpoint.clone());
        self.state = ServiceState::Running;
        Ok(endpoint)
    }

    /// Terminate the server if it is running.
    pub async fn stop(&mut self) {
        self.reap_if_exited();

        if self.state != ServiceState::Running {
            warn!("Service is not running, nothing to stop");
            return;
        }

        if let Some(mut child) = self.child.take() {
            match shutdown_child(&mut child, DEFAULT_SHUTDOWN_GRACE).await {
                Ok(status) => info!(%status, "Service stopped"),
                Err(e) => warn!(error = %e, "Error while stopping service"),
            }
        }
        self.endpoint = None;
        self.state = ServiceState::Stopped;
    }

    /// URL of the running server; `None` unless `Running`.
    pub fn endpoint_url(&mut self) -> Option<String> {
        self.reap_if_exited();
        self.endpoint.as_ref().map(|endpoint| endpoint.url.clone())
    }

    /// The running server's endpoint; `None` unless `Running`.
    pub fn endpoint(&mut self) -> Option<&ServiceEndpoint> {
        self.reap_if_exited();
        self.endpoint.as_ref()
    }

    /// Notice a server that died on its own and fall back to `Stopped`.
    fn reap_if_exited(&mut self) {
        let Some(child) = self.child.as_mut() else {
            return;
        };

        let exited = match child.try_wait() {
            Ok(Some(status)) => {
                warn!(%status, "Service exited unexpectedly");
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, "Failed to query service process, assuming it is gone");
                true
            }
        };

        if exited {
            self.child = None;
            self.endpoint = None;
            self.state = ServiceState::Stopped;
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::CommandExecutor;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Script that records each launch and then stays alive.
    fn fake_server(dir: &Path, body: &str) -> (PathBuf, PathBuf) {
        let launches = dir.join("launches");
        let script = dir.join("fake-appium");
        std::fs::write(
            &script,
            format!("#!/bin/sh\necho started >> {}\n{body}\n", launches.display()),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        (script, launches)
    }

    fn config(executable: &Path, port: u16, startup_timeout: Option<Duration>) -> ServiceConfig {
        ServiceConfig {
            executable: executable.to_string_lossy().into_owned(),
            port,
            startup_timeout,
            ..ServiceConfig::default()
        }
    }

    fn controller(config: ServiceConfig) -> ServiceController {
        ServiceController::new(config, Arc::new(CommandExecutor::new()))
    }

    async fn launch_count(path: &Path) -> usize {
        // Give the script a moment to write
        tokio::time::sleep(Duration::from_millis(300)).await;
        std::fs::read_to_string(path)
            .map(|s| s.lines().count())
            .unwrap_or(0)
    }

    #[test]
    fn test_default_argv() {
        let argv = ServiceConfig::default().argv();
        assert_eq!(
            argv,
            vec![
                "appium",
                "--address",
                "127.0.0.1",
                "--port",
                "4723",
                "--session-override",
                "--log-level",
                "info"
            ]
        );
    }

    #[tokio::test]
    async fn test_start_twice_spawns_once() {
        let dir = TempDir::new().unwrap();
        let (script, launches) = fake_server(dir.path(), "exec sleep 30");
        let mut service = controller(config(&script, 4723, None));

        let first = service.start().await.unwrap();
        let second = service.start().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.url, "http://127.0.0.1:4723/");
        assert_eq!(service.state(), ServiceState::Running);
        assert_eq!(launch_count(&launches).await, 1);

        service.stop().await;
        assert_eq!(service.state(), ServiceState::Stopped);
        assert_eq!(service.endpoint_url(), None);
    }

    #[tokio::test]
    async fn test_stop_when_stopped_is_noop() {
        let dir = TempDir::new().unwrap();
        let (script, launches) = fake_server(dir.path(), "exec sleep 30");
        let mut service = controller(config(&script, 4723, None));

        service.stop().await;
        service.stop().await;

        assert_eq!(service.state(), ServiceState::Stopped);
        assert_eq!(launch_count(&launches).await, 0);
    }

    #[tokio::test]
    async fn test_missing_executable() {
        let dir = TempDir::new().unwrap();
        let mut service = controller(config(&dir.path().join("nope"), 4723, None));

        let err = service.start().await.unwrap_err();
        assert!(matches!(err, OrchestratorError::ExecutableNotFound { .. }));
        assert_eq!(service.state(), ServiceState::Stopped);
    }

    #[tokio::test]
    async fn test_dead_service_is_reaped() {
        let dir = TempDir::new().unwrap();
        let (script, launches) = fake_server(dir.path(), "exit 0");
        let mut service = controller(config(&script, 4723, None));

        service.start().await.unwrap();
        assert_eq!(launch_count(&launches).await, 1);

        assert_eq!(service.endpoint_url(), None);
        assert_eq!(service.state(), ServiceState::Stopped);

        // A fresh start launches a new process
        service.start().await.unwrap();
        assert_eq!(launch_count(&launches).await, 2);
    }

    #[tokio::test]
    async fn test_readiness_timeout_fails_and_stops() {
        let dir = TempDir::new().unwrap();
        let (script, _) = fake_server(dir.path(), "exec sleep 30");

        // Reserve a port nobody listens on
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();

        let mut service = controller(config(&script, port, Some(Duration::from_secs(1))));
        let err = service.start().await.unwrap_err();

        assert!(matches!(err, OrchestratorError::ServiceStartFailed { .. }));
        assert_eq!(service.state(), ServiceState::Stopped);
        assert_eq!(service.endpoint_url(), None);
    }

    #[tokio::test]
    async fn test_unbounded_startup_timeout_fails_when_process_exits() {
        let dir = TempDir::new().unwrap();
        let (script, _) = fake_server(dir.path(), "exit 1");
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();

        let mut service = controller(config(&script, port, Some(Duration::MAX)));
        let err = service.start().await.unwrap_err();

        assert!(matches!(err, OrchestratorError::ServiceStartFailed { .. }));
        assert_eq!(service.state(), ServiceState::Stopped);
    }

    #[tokio::test]
    async fn test_readiness_success() {
        let dir = TempDir::new().unwrap();
        let (script, _) = fake_server(dir.path(), "exec sleep 30");

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let _ = socket
                    .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\n{}")
                    .await;
            }
        });

        let mut service = controller(config(&script, port, Some(Duration::from_secs(10))));
        let endpoint = service.start().await.unwrap();

        assert_eq!(endpoint.port, port);
        assert_eq!(service.state(), ServiceState::Running);
        service.stop().await;
    }
}
