//! HTTP 请求封装模块
//!
//! 使用 `web_sys::fetch` 实现 `HttpClient`，替代 `gloo-net`。

use async_trait::async_trait;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, FormData, Headers, Request, RequestInit, Response};

use crate::error::TransportError;
use crate::request::{HttpBody, HttpClient, HttpRequest, HttpResponse, MultipartFile};

/// 基于 `window.fetch` 的客户端
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchClient;

fn build_err(context: &str, e: JsValue) -> TransportError {
    TransportError::RequestBuild(format!("{}: {:?}", context, e))
}

/// 单文件表单；`Content-Type` 由浏览器按边界生成
fn form_data(file: &MultipartFile) -> Result<FormData, TransportError> {
    let bytes = js_sys::Uint8Array::from(file.bytes.as_slice());
    let parts = js_sys::Array::of1(&bytes);

    let props = BlobPropertyBag::new();
    if let Some(content_type) = &file.content_type {
        props.set_type(content_type);
    }
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &props)
        .map_err(|e| build_err("create Blob", e))?;

    let form = FormData::new().map_err(|e| build_err("create FormData", e))?;
    form.append_with_blob_and_filename(&file.field, &blob, &file.file_name)
        .map_err(|e| build_err("append file", e))?;
    Ok(form)
}

async fn read_text(response: &Response) -> Result<String, TransportError> {
    let promise = response
        .text()
        .map_err(|e| TransportError::ResponseRead(format!("{:?}", e)))?;

    let text = JsFuture::from(promise)
        .await
        .map_err(|e| TransportError::ResponseRead(format!("{:?}", e)))?;

    text.as_string()
        .ok_or_else(|| TransportError::ResponseRead("body is not a string".to_string()))
}

#[async_trait(?Send)]
impl HttpClient for FetchClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        let headers = Headers::new().map_err(|e| build_err("create Headers", e))?;
        for (key, value) in &req.headers {
            headers
                .set(key, value)
                .map_err(|e| build_err("set header", e))?;
        }

        let opts = RequestInit::new();
        opts.set_method(req.method.as_str());
        opts.set_headers(&headers.into());

        match &req.body {
            HttpBody::Empty => {}
            HttpBody::Text(body) => opts.set_body(&JsValue::from_str(body)),
            HttpBody::Multipart(file) => opts.set_body(&form_data(file)?.into()),
        }

        let request = Request::new_with_str_and_init(&req.url, &opts)
            .map_err(|e| build_err("create Request", e))?;

        let window = web_sys::window()
            .ok_or_else(|| TransportError::Network("window is unavailable".to_string()))?;

        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| {
                TransportError::Network(
                    e.as_string()
                        .or_else(|| {
                            e.dyn_ref::<js_sys::Error>()
                                .map(|err| String::from(err.message()))
                        })
                        .unwrap_or_else(|| format!("{:?}", e)),
                )
            })?;

        let response: Response = resp_value
            .dyn_into()
            .map_err(|e| TransportError::ResponseRead(format!("not a Response: {:?}", e)))?;

        let body = read_text(&response).await;
        Ok(finish_response(response.status(), response.status_text(), body))
    }
}

/// 状态码优先：响应体读取失败时以空响应体返回，401 等状态仍由调用方处理
fn finish_response(
    status: u16,
    status_text: String,
    body: Result<String, TransportError>,
) -> HttpResponse {
    let body = body.unwrap_or_else(|e| {
        log_warn!("[Http] Response body of a {} response was dropped: {}", status, e);
        String::new()
    });
    HttpResponse::new(status, body).with_status_text(status_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use crate::error::GatewayError;
    use crate::gateway::{Gateway, RequestOptions};
    use crate::testing::{MockHttpClient, RecordingNavigator, authenticated_store};

    #[test]
    fn unreadable_body_keeps_status() {
        let resp = finish_response(
            502,
            "Bad Gateway".to_string(),
            Err(TransportError::ResponseRead("stream aborted".into())),
        );
        assert_eq!(resp.status, 502);
        assert_eq!(resp.body, "");
        assert_eq!(resp.status_label(), "Bad Gateway");
    }

    #[tokio::test]
    async fn unauthorized_with_unreadable_body_still_expires_session() {
        let client = Rc::new(MockHttpClient::new());
        client.respond_with(finish_response(
            401,
            "Unauthorized".to_string(),
            Err(TransportError::ResponseRead("stream aborted".into())),
        ));
        let session = authenticated_store("tok");
        let nav = Rc::new(RecordingNavigator::at("/players"));
        let gateway = Gateway::new("http://api.test", client, session.clone(), nav.clone());

        let err = gateway
            .request("/api/admin/players", RequestOptions::default())
            .await
            .unwrap_err();

        assert_eq!(err, GatewayError::SessionExpired);
        assert!(!session.is_authenticated());
        assert_eq!(nav.log(), vec!["assign:/login".to_string()]);
    }
}
