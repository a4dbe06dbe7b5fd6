use std::io;

use rfmscore_engine::contracts::envelope::failure_from_error;
use rfmscore_engine::{EngineError, SuccessEnvelope};
use serde::Serialize;
use serde_json::json;

const JSON_VERSION: &str = "v1";

pub fn render_success_json(success: &SuccessEnvelope) -> io::Result<String> {
    let value = json!({
        "ok": true,
        "command": success.command,
        "version": JSON_VERSION,
        "data": success.data,
    });
    serialize_json_pretty(&value)
}

pub fn render_error_json(error: &EngineError) -> io::Result<String> {
    serialize_json_pretty(&failure_from_error(error))
}

fn serialize_json_pretty<T>(value: &T) -> io::Result<String>
where
    T: Serialize,
{
    serde_json::to_string_pretty(value).map_err(io::Error::other)
}
