#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::Value;

use agentmcp_core::error::Result;
use agentmcp_core::model::{AgentModel, AgentResponse, AgentTaskRequest};
use agentmcp_core::transport::Message;

pub fn write_json(dir: &Path, file_name: &str, value: &Value) -> PathBuf {
    let path = dir.join(file_name);
    std::fs::write(&path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
    path
}

/// Records every request and answers with a fixed message.
#[derive(Default)]
pub struct RecordingModel {
    requests: Mutex<Vec<AgentTaskRequest>>,
}

impl RecordingModel {
    pub fn last_request(&self) -> AgentTaskRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request recorded")
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl AgentModel for RecordingModel {
    fn call(&self, request: &AgentTaskRequest) -> Result<AgentResponse> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(AgentResponse::new(vec![Message::assistant("ok")]))
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// `sh -c <script> <name>`: the script sees the provider flags as `"$@"`.
pub fn shell_command(script: &str, name: &str) -> Vec<String> {
    vec![
        "sh".to_string(),
        "-c".to_string(),
        script.to_string(),
        name.to_string(),
    ]
}
