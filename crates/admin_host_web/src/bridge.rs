//! Browser transfer bridge: raw fetch, multipart upload and client-side downloads.
//!
//! The wasm build talks to `fetch`, `FormData` and object URLs through an inline JS module; the
//! native build returns errors so adapters stay constructible in tests and tooling.

use admin_host::{UploadPart, UploadReceipt};

#[cfg(target_arch = "wasm32")]
mod imp {
    use super::*;
    use js_sys::{Promise, Uint8Array};
    use serde::Serialize;
    use serde_wasm_bindgen::from_value;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;

    #[wasm_bindgen(inline_js = r#"
function fail(message) {
  throw new Error(message);
}

export async function jsFetchBytes(path) {
  const response = await fetch(path);
  if (!response.ok) {
    fail(`${response.status} ${response.statusText}: ${path}`);
  }
  return new Uint8Array(await response.arrayBuffer());
}

export async function jsUploadParts(endpoint, parts) {
  const formData = new FormData();
  for (const part of parts) {
    const blob = new Blob([new Uint8Array(part.bytes)], { type: part.mime });
    formData.append(part.field_name, blob, part.destination);
  }
  const response = await fetch(endpoint, { method: 'POST', body: formData });
  if (!response.ok) {
    fail(`${response.status} ${response.statusText}: ${endpoint}`);
  }
  return await response.json();
}

export function jsSaveDownload(fileName, mime, bytes) {
  const blob = new Blob([bytes], { type: mime });
  const url = URL.createObjectURL(blob);
  const link = document.createElement('a');
  link.href = url;
  link.download = fileName;
  link.style.display = 'none';
  document.body.appendChild(link);
  link.click();
  document.body.removeChild(link);
  setTimeout(() => URL.revokeObjectURL(url), 0);
}
"#)]
    extern "C" {
        #[wasm_bindgen(js_name = jsFetchBytes)]
        fn js_fetch_bytes(path: &str) -> Promise;
        #[wasm_bindgen(js_name = jsUploadParts)]
        fn js_upload_parts(endpoint: &str, parts: JsValue) -> Promise;
        #[wasm_bindgen(catch, js_name = jsSaveDownload)]
        fn js_save_download(file_name: &str, mime: &str, bytes: &[u8]) -> Result<(), JsValue>;
    }

    #[derive(Serialize)]
    struct WirePart<'a> {
        field_name: &'a str,
        destination: &'a str,
        mime: &'a str,
        bytes: &'a [u8],
    }

    async fn await_promise(promise: Promise) -> Result<JsValue, String> {
        JsFuture::from(promise).await.map_err(js_error_to_string)
    }

    pub(crate) fn js_error_to_string(err: JsValue) -> String {
        if let Some(text) = err.as_string() {
            return text;
        }
        if let Ok(message) = js_sys::Reflect::get(&err, &JsValue::from_str("message")) {
            if let Some(text) = message.as_string() {
                return text;
            }
        }
        format!("{err:?}")
    }

    pub async fn fetch_bytes(path: &str) -> Result<Vec<u8>, String> {
        let value = await_promise(js_fetch_bytes(path)).await?;
        Ok(Uint8Array::new(&value).to_vec())
    }

    pub async fn upload_parts(endpoint: &str, parts: &[UploadPart]) -> Result<UploadReceipt, String> {
        let wire = parts
            .iter()
            .map(|part| WirePart {
                field_name: &part.field_name,
                destination: &part.destination,
                mime: &part.mime,
                bytes: &part.bytes,
            })
            .collect::<Vec<_>>();
        let value = serde_wasm_bindgen::to_value(&wire).map_err(|e| e.to_string())?;
        let response = await_promise(js_upload_parts(endpoint, value)).await?;
        from_value(response).map_err(|e| e.to_string())
    }

    pub fn save_download(file_name: &str, mime: &str, bytes: &[u8]) -> Result<(), String> {
        js_save_download(file_name, mime, bytes).map_err(js_error_to_string)
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod imp {
    use super::*;

    fn unsupported(what: &str) -> String {
        format!("{what} is only available when compiled for wasm32")
    }

    pub async fn fetch_bytes(path: &str) -> Result<Vec<u8>, String> {
        Err(unsupported(&format!("fetching {path}")))
    }

    pub async fn upload_parts(
        endpoint: &str,
        _parts: &[UploadPart],
    ) -> Result<UploadReceipt, String> {
        Err(unsupported(&format!("uploading to {endpoint}")))
    }

    pub fn save_download(file_name: &str, _mime: &str, _bytes: &[u8]) -> Result<(), String> {
        Err(unsupported(&format!("downloading {file_name}")))
    }
}

#[cfg(target_arch = "wasm32")]
pub(crate) use imp::js_error_to_string;

/// Fetches `path` from the device file server.
pub async fn fetch_bytes(path: &str) -> Result<Vec<u8>, String> {
    imp::fetch_bytes(path).await
}

/// Posts `parts` as one multipart request to `endpoint`.
pub async fn upload_parts(endpoint: &str, parts: &[UploadPart]) -> Result<UploadReceipt, String> {
    imp::upload_parts(endpoint, parts).await
}

/// Offers `bytes` to the user as a download named `file_name`.
pub fn save_download(file_name: &str, mime: &str, bytes: &[u8]) -> Result<(), String> {
    imp::save_download(file_name, mime, bytes)
}
