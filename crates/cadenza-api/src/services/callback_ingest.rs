//! Parsing and recording of provider callbacks.
//!
//! Expected shape: `{code, msg, data: {task_id, callbackType, data}}`.
//! Every outcome is turned into a [`CallbackAck`]; nothing here produces an HTTP error.

use cadenza_core::{CallbackAck, CallbackRecord, CallbackType};
use chrono::Utc;
use serde_json::Value;

use super::callback_store::CallbackStore;

/// Extract the task id and record from a callback body.
///
/// `Ok(None)` means the payload is acceptable but carries no task id to store.
pub fn parse_callback(payload: &Value) -> Result<Option<(String, CallbackRecord)>, String> {
    let body = payload
        .as_object()
        .ok_or_else(|| "Callback payload must be a JSON object".to_string())?;

    let data = match body.get("data") {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Object(data)) => data,
        Some(_) => return Err("Callback `data` must be an object".to_string()),
    };

    let task_id = match data.get("task_id").and_then(Value::as_str) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => return Ok(None),
    };

    let record = CallbackRecord {
        code: body.get("code").and_then(Value::as_i64),
        message: body.get("msg").and_then(Value::as_str).map(str::to_string),
        callback_type: CallbackType::parse(data.get("callbackType").and_then(Value::as_str)),
        payload: data.get("data").cloned().unwrap_or(Value::Null),
        received_at: Utc::now(),
    };

    Ok(Some((task_id, record)))
}

/// Parse a raw callback body and record it.
pub async fn ingest_callback(store: &CallbackStore, body: &[u8]) -> CallbackAck {
    let payload: Value = match serde_json::from_slice(body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(error = %e, "Callback body is not valid JSON");
            return CallbackAck::error(format!("Invalid JSON payload: {}", e));
        }
    };

    match parse_callback(&payload) {
        Ok(Some((task_id, record))) => {
            let callback_type = record.callback_type.as_str().unwrap_or("none").to_string();
            let replaced = store.record(&task_id, record).await.is_some();
            tracing::info!(
                task_id = %task_id,
                callback_type = %callback_type,
                replaced,
                "Stored provider callback"
            );
            CallbackAck::received()
        }
        Ok(None) => {
            tracing::debug!("Callback without task id acknowledged");
            CallbackAck::received()
        }
        Err(message) => {
            tracing::warn!(error = %message, "Rejected malformed callback");
            CallbackAck::error(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_complete_callback() {
        let payload = json!({
            "code": 200,
            "msg": "All generated successfully.",
            "data": {
                "callbackType": "complete",
                "task_id": "task-1",
                "data": [{"id": "clip", "audio_url": "https://cdn/clip.mp3"}]
            }
        });

        let (task_id, record) = parse_callback(&payload).unwrap().unwrap();
        assert_eq!(task_id, "task-1");
        assert_eq!(record.code, Some(200));
        assert_eq!(record.message.as_deref(), Some("All generated successfully."));
        assert_eq!(record.callback_type, CallbackType::Complete);
        assert_eq!(record.payload[0]["audio_url"], "https://cdn/clip.mp3");
    }

    #[test]
    fn missing_task_id_is_not_an_error() {
        assert!(parse_callback(&json!({"code": 200, "data": {"callbackType": "complete"}}))
            .unwrap()
            .is_none());
        assert!(parse_callback(&json!({"code": 200, "data": {"task_id": ""}}))
            .unwrap()
            .is_none());
        assert!(parse_callback(&json!({"code": 200, "data": {"task_id": 42}}))
            .unwrap()
            .is_none());
        assert!(parse_callback(&json!({"code": 200})).unwrap().is_none());
        assert!(parse_callback(&json!({"code": 200, "data": null})).unwrap().is_none());
    }

    #[test]
    fn non_object_shapes_are_soft_errors() {
        assert!(parse_callback(&json!([1, 2, 3])).is_err());
        assert!(parse_callback(&json!({"data": "task-1"})).is_err());
    }

    #[tokio::test]
    async fn ingest_stores_record_and_acks() {
        let store = CallbackStore::new();
        let body = br#"{"code":501,"msg":"synthesis failed","data":{"callbackType":"error","task_id":"t-err"}}"#;

        let ack = ingest_callback(&store, body).await;
        assert_eq!(ack, CallbackAck::received());

        let record = store.get("t-err").await.unwrap();
        assert_eq!(record.callback_type, CallbackType::Error);
        assert_eq!(record.message.as_deref(), Some("synthesis failed"));
        assert_eq!(record.payload, Value::Null);
    }

    #[tokio::test]
    async fn ingest_reports_invalid_json_softly() {
        let store = CallbackStore::new();
        let ack = ingest_callback(&store, b"{not json").await;
        assert_eq!(ack.status, "error");
        assert!(ack.message.unwrap().contains("Invalid JSON"));
        assert!(store.is_empty().await);
    }
}
