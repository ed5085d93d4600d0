use crate::config::OutputFormat;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// JSON 輸出的共用外框
#[derive(Debug, Serialize)]
pub struct ReportEnvelope<'a, T: Serialize> {
    pub tool: &'a str,
    pub generated_at: DateTime<Utc>,
    pub success: bool,
    pub data: &'a T,
}

pub fn to_json<T: Serialize>(tool: &str, success: bool, data: &T) -> Result<String> {
    let envelope = ReportEnvelope {
        tool,
        generated_at: Utc::now(),
        success,
        data,
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

/// 依格式輸出到 stdout；文字版延後產生
pub fn emit<T, F>(format: OutputFormat, tool: &str, success: bool, data: &T, text: F) -> Result<()>
where
    T: Serialize,
    F: FnOnce() -> String,
{
    match format {
        OutputFormat::Text => println!("{}", text()),
        OutputFormat::Json => println!("{}", to_json(tool, success, data)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ImportTiming;
    use std::time::Duration;

    #[test]
    fn test_to_json_envelope() {
        let timings = vec![ImportTiming {
            module: "json".to_string(),
            duration: Some(Duration::from_millis(2)),
        }];

        let json = to_json("import-profile", true, &timings).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["tool"], "import-profile");
        assert_eq!(value["success"], true);
        assert_eq!(value["data"][0]["module"], "json");
        assert_eq!(value["data"][0]["duration_secs"], 0.002);
        assert!(value["generated_at"].as_str().unwrap().contains('T'));
    }
}
