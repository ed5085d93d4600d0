#![allow(dead_code)]

use ansible_image_probe::core::ContainerEngine;
use ansible_image_probe::domain::model::{CommandOutput, ImageName, RunRequest};
use ansible_image_probe::{ProbeError, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// 依指令前綴回應預先寫好輸出的假引擎，並記錄每次請求
#[derive(Clone, Default)]
pub struct ScriptedEngine {
    image_present: bool,
    responses: Vec<(String, CommandOutput)>,
    failing_prefixes: Vec<String>,
    requests: Arc<Mutex<Vec<RunRequest>>>,
}

pub fn ok(stdout: &str) -> CommandOutput {
    CommandOutput {
        exit_code: Some(0),
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

pub fn exit(code: i32, stderr: &str) -> CommandOutput {
    CommandOutput {
        exit_code: Some(code),
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

impl ScriptedEngine {
    pub fn with_image() -> Self {
        Self {
            image_present: true,
            ..Default::default()
        }
    }

    pub fn without_image() -> Self {
        Self::default()
    }

    pub fn respond(mut self, command_prefix: &str, output: CommandOutput) -> Self {
        self.responses.push((command_prefix.to_string(), output));
        self
    }

    /// 這個前綴的指令讓引擎本身出錯（例如 docker 執行失敗）
    pub fn fail_on(mut self, command_prefix: &str) -> Self {
        self.failing_prefixes.push(command_prefix.to_string());
        self
    }

    pub fn requests(&self) -> Vec<RunRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// 一個行為良好的 Alpine Ansible 映像
    pub fn healthy_alpine() -> Self {
        Self::with_image()
            .respond(
                "cat /etc/os-release",
                ok("NAME=\"Alpine Linux\"\nID=alpine\nVERSION_ID=3.20.0\n"),
            )
            .respond("apk info", ok("bash\ngit\npython3\nopenssh-client\n"))
            .respond("which curl", ok("/usr/bin/curl\n"))
            .respond("which git", ok("/usr/bin/git\n"))
            .respond("which bash", ok("/bin/bash\n"))
            .respond("which ssh", ok("/usr/bin/ssh\n"))
            .respond("which ansible", ok("/usr/bin/ansible\n"))
            .respond("which python", ok("/usr/bin/python\n"))
            .respond("which kubectl", exit(1, ""))
            .respond("which helm", exit(1, ""))
            .respond("python -c import ansible;", ok("ansible available\n"))
            .respond("python -c import yaml;", ok("yaml available\n"))
            .respond("python -c import jinja2;", ok("jinja2 available\n"))
            .respond(
                "python -c import netaddr;",
                exit(1, "ModuleNotFoundError: No module named 'netaddr'"),
            )
            .respond("python -c import jmespath;", ok("jmespath available\n"))
            .respond(
                "python -c import sys",
                ok("Modules successfully imported: ansible, jinja2, jmespath, yaml\n"),
            )
            .respond(
                "ansible --version",
                ok("ansible [core 2.17.1]\n  python version = 3.12.3\n"),
            )
            .respond("python --version", ok("Python 3.12.3\n"))
            .respond(
                "ansible-doc --list",
                ok("command  Execute commands on targets\nping     Try to connect to host\nsetup    Gathers facts\nshell    Execute shell commands\n"),
            )
            .respond(
                "env",
                ok("PATH=/usr/bin\nANSIBLE_FORCE_COLOR=True\nANSIBLE_STDOUT_CALLBACK=yaml\nTEST_ENV=test_value\n"),
            )
            .respond("id", ok("uid=1000(ansible) gid=1000(ansible) groups=1000(ansible)\n"))
            .respond("ansible-playbook --syntax-check", ok("\nplaybook: /playbooks/test_syntax_playbook.yml\n"))
            .respond(
                "ansible localhost -c local -m ping",
                ok("localhost | SUCCESS => {\n    \"ping\": \"pong\"\n}\n"),
            )
    }
}

#[async_trait]
impl ContainerEngine for ScriptedEngine {
    async fn image_exists(&self, _image: &ImageName) -> Result<bool> {
        Ok(self.image_present)
    }

    async fn run(&self, request: &RunRequest) -> Result<CommandOutput> {
        self.requests.lock().unwrap().push(request.clone());
        let command = request.command.join(" ");

        if self
            .failing_prefixes
            .iter()
            .any(|prefix| command.starts_with(prefix.as_str()))
        {
            return Err(ProbeError::EngineError {
                operation: "run".to_string(),
                details: "engine exploded".to_string(),
            });
        }

        Ok(self
            .responses
            .iter()
            .find(|(prefix, _)| command.starts_with(prefix.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_else(|| exit(127, "command not found")))
    }
}
