//! 文件选择框读取

use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlInputElement;

use crate::request::MultipartFile;

/// 读取文件选择框中的第一个文件；未选择时返回 `Ok(None)`
pub async fn read_selected_file(
    input: &HtmlInputElement,
    field: &str,
) -> Result<Option<MultipartFile>, String> {
    let Some(file) = input.files().and_then(|files| files.get(0)) else {
        return Ok(None);
    };

    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| format!("Failed to read {}: {:?}", file.name(), e))?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();

    let content_type = file.type_();
    Ok(Some(MultipartFile {
        field: field.to_string(),
        file_name: file.name(),
        content_type: (!content_type.is_empty()).then_some(content_type),
        bytes,
    }))
}
