use crate::domain::model::{CommandOutput, ImageName, RunRequest};
use crate::domain::ports::ContainerEngine;
use crate::utils::error::{ProbeError, Result};
use crate::utils::validation;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

const DOCKER_BINARY: &str = "docker";
const FALLBACK_DOCKER_PATH: &str = "/usr/bin/docker";

/// 透過 docker CLI 操作；參數一律以 argv 傳遞，不經過 shell
#[derive(Debug, Clone)]
pub struct DockerCli {
    binary: PathBuf,
}

impl DockerCli {
    pub fn new(binary: PathBuf) -> Self {
        Self { binary }
    }

    /// 明確指定的路徑優先，其次 PATH 上的 docker，最後 /usr/bin/docker
    pub fn locate(explicit: Option<PathBuf>) -> Self {
        let binary = explicit
            .or_else(|| find_on_path(DOCKER_BINARY))
            .unwrap_or_else(|| PathBuf::from(FALLBACK_DOCKER_PATH));
        tracing::debug!("Using container engine at {}", binary.display());
        Self { binary }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    async fn execute(&self, operation: &str, args: &[String]) -> Result<CommandOutput> {
        tracing::debug!("$ {} {}", self.binary.display(), args.join(" "));

        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .await
            .map_err(|e| ProbeError::EngineError {
                operation: operation.to_string(),
                details: format!("{}: {}", self.binary.display(), e),
            })?;

        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

fn find_on_path(binary: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(binary))
        .find(|candidate| candidate.is_file())
}

/// `run --rm [-e K=V]... [-v host:container]... <image> <command...>`
pub fn run_args(request: &RunRequest) -> Result<Vec<String>> {
    // 映像名稱在建構時已驗證，這裡再確認一次才交給引擎
    validation::validate_image_name(request.image.as_str())?;

    let mut args = vec!["run".to_string(), "--rm".to_string()];

    for (key, value) in &request.env {
        validation::validate_env_key("env", key)?;
        args.push("-e".to_string());
        args.push(format!("{}={}", key, value));
    }

    for mount in &request.mounts {
        args.push("-v".to_string());
        args.push(mount.to_arg());
    }

    args.push(request.image.as_str().to_string());
    args.extend(request.command.iter().cloned());
    Ok(args)
}

#[async_trait]
impl ContainerEngine for DockerCli {
    async fn image_exists(&self, image: &ImageName) -> Result<bool> {
        let args = vec![
            "image".to_string(),
            "inspect".to_string(),
            image.as_str().to_string(),
        ];
        let output = self.execute("image inspect", &args).await?;
        Ok(output.success())
    }

    async fn run(&self, request: &RunRequest) -> Result<CommandOutput> {
        let args = run_args(request)?;
        self.execute("run", &args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::VolumeMount;
    use std::collections::BTreeMap;

    #[test]
    fn test_run_args_layout() {
        let mut env = BTreeMap::new();
        env.insert("TEST_ENV".to_string(), "test_value".to_string());
        env.insert("ANSIBLE_STDOUT_CALLBACK".to_string(), "yaml".to_string());

        let request = RunRequest::new(ImageName::parse("ansible:test").unwrap(), &["env"])
            .with_env(env)
            .with_mount(VolumeMount {
                host_path: PathBuf::from("/tmp/playbooks"),
                container_path: "/playbooks".to_string(),
            });

        let args = run_args(&request).unwrap();
        assert_eq!(
            args,
            vec![
                "run",
                "--rm",
                "-e",
                "ANSIBLE_STDOUT_CALLBACK=yaml",
                "-e",
                "TEST_ENV=test_value",
                "-v",
                "/tmp/playbooks:/playbooks",
                "ansible:test",
                "env",
            ]
        );
    }

    #[test]
    fn test_run_args_rejects_bad_env_key() {
        let mut env = BTreeMap::new();
        env.insert("BAD KEY".to_string(), "x".to_string());
        let request =
            RunRequest::new(ImageName::parse("ansible:test").unwrap(), &["env"]).with_env(env);

        assert!(run_args(&request).is_err());
    }

    #[test]
    fn test_locate_prefers_explicit_path() {
        let cli = DockerCli::locate(Some(PathBuf::from("/opt/podman/bin/podman")));
        assert_eq!(cli.binary(), Path::new("/opt/podman/bin/podman"));
    }

    #[tokio::test]
    async fn test_missing_engine_is_engine_error() {
        let cli = DockerCli::new(PathBuf::from("/nonexistent/docker-for-probe-tests"));
        let image = ImageName::parse("ansible:test").unwrap();
        let result = cli.image_exists(&image).await;
        assert!(matches!(result, Err(ProbeError::EngineError { .. })));
    }
}
