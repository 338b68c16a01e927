use wasm_bindgen::prelude::*;

use crate::classifier;
use crate::error::Error;
use crate::summary::TransactionSummary;
use crate::types::TransactionEnvelope;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = JSON)]
    fn parse(s: &str) -> JsValue;
}

fn to_js(value: &serde_json::Value) -> JsValue {
    match serde_json::to_string(value) {
        Ok(json_str) => parse(&json_str),
        Err(_) => JsValue::NULL,
    }
}

fn summary_result(result: Result<TransactionSummary, Error>) -> JsValue {
    match result.and_then(|summary| serde_json::to_value(summary).map_err(Error::from)) {
        Ok(value) => to_js(&value),
        Err(e) => error_result(&e.to_string()),
    }
}

/// Summarize a `getTransaction` JSON response.
///
/// Returns the summary object, or `{ error }` when the transaction cannot be
/// analyzed.
#[wasm_bindgen]
pub fn analyze_transaction(json: &str) -> JsValue {
    summary_result(classifier::analyze_json(json))
}

/// Same as `analyze_transaction`, for a response that is already a JS object.
#[wasm_bindgen]
pub fn analyze_transaction_value(envelope: JsValue) -> JsValue {
    let envelope: TransactionEnvelope = match serde_wasm_bindgen::from_value(envelope) {
        Ok(envelope) => envelope,
        Err(e) => return error_result(&format!("Invalid transaction envelope: {e}")),
    };
    summary_result(classifier::analyze(&envelope))
}

fn error_result(msg: &str) -> JsValue {
    let obj = serde_json::json!({"error": msg});
    to_js(&obj)
}
