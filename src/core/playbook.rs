use crate::domain::model::VolumeMount;
use crate::utils::error::{ProbeError, Result};
use std::path::{Path, PathBuf};

pub const SYNTAX_PLAYBOOK: &str = "test_syntax_playbook.yml";
pub const CONTAINER_MOUNT_POINT: &str = "/playbooks";

/// 已驗證、可掛載進 container 的語法檢查 playbook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybookMount {
    host_dir: PathBuf,
    file_name: String,
}

impl PlaybookMount {
    /// 只接受完全等於預期 basename 的檔名，且檔案必須存在
    pub fn resolve(dir: &Path, file_name: &str) -> Result<Self> {
        let invalid = || ProbeError::InvalidPlaybookPath {
            path: dir.join(file_name).display().to_string(),
        };

        if file_name.contains("..")
            || file_name.contains('/')
            || file_name.contains('\\')
            || file_name != SYNTAX_PLAYBOOK
        {
            return Err(invalid());
        }

        let host_dir = dir.canonicalize().map_err(|_| invalid())?;
        // `-v host:container` 以冒號分隔，路徑也必須是 UTF-8
        if !is_mountable(&host_dir) || !host_dir.join(file_name).is_file() {
            return Err(invalid());
        }

        Ok(Self {
            host_dir,
            file_name: file_name.to_string(),
        })
    }

    pub fn in_dir(dir: &Path) -> Result<Self> {
        Self::resolve(dir, SYNTAX_PLAYBOOK)
    }

    pub fn host_dir(&self) -> &Path {
        &self.host_dir
    }

    pub fn mount(&self) -> VolumeMount {
        VolumeMount {
            host_path: self.host_dir.clone(),
            container_path: CONTAINER_MOUNT_POINT.to_string(),
        }
    }

    pub fn container_path(&self) -> String {
        format!("{}/{}", CONTAINER_MOUNT_POINT, self.file_name)
    }
}

fn is_mountable(path: &Path) -> bool {
    path.to_str().is_some_and(|p| !p.contains(':'))
}
