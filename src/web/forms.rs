//! Reading form fields out of the document.

use js_sys::{Array, Uint8Array};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, FormData, HtmlFormElement};

use crate::sync::FormPart;

fn entries(form: &HtmlFormElement) -> Result<Vec<(String, JsValue)>, JsValue> {
    let data = FormData::new_with_form(form)?;
    let Some(iter) = js_sys::try_iter(&data)? else {
        return Ok(Vec::new());
    };

    let mut fields = Vec::new();
    for entry in iter {
        let pair: Array = entry?.unchecked_into();
        let name = pair.get(0).as_string().unwrap_or_default();
        fields.push((name, pair.get(1)));
    }
    Ok(fields)
}

/// The form's string fields in document order. File inputs are skipped.
pub(crate) fn text_fields(form: &HtmlFormElement) -> Result<Vec<(String, String)>, JsValue> {
    Ok(entries(form)?
        .into_iter()
        .filter_map(|(name, value)| value.as_string().map(|value| (name, value)))
        .collect())
}

/// The whole form as multipart parts, with selected files read into memory.
/// A file input with nothing chosen still sends its empty, unnamed part.
pub(crate) async fn multipart_parts(form: &HtmlFormElement) -> Result<Vec<FormPart>, JsValue> {
    let mut parts = Vec::new();
    for (name, value) in entries(form)? {
        if let Some(text) = value.as_string() {
            parts.push(FormPart::Text { name, value: text });
            continue;
        }
        let Ok(file) = value.dyn_into::<File>() else {
            continue;
        };
        let file_name = file.name();
        let buffer = JsFuture::from(file.array_buffer()).await?;
        let mime = file.type_();
        parts.push(FormPart::File {
            name,
            file_name,
            mime: (!mime.is_empty()).then_some(mime),
            bytes: Uint8Array::new(&buffer).to_vec(),
        });
    }
    Ok(parts)
}
