//! wasm-bindgen exports.
//!
//! This module exposes the `TrimMultispaces` rewrite to JavaScript via `wasm-bindgen`, so it can
//! run as a step in a JS build pipeline. The underlying logic lives in the core crate.

use std::borrow::Cow;

use wasm_bindgen::prelude::*;

use trim_multispaces::{
    DEFAULT_CALLEE, Language as LanguageInner, TransformConfig as TransformConfigInner,
    transform, transform_no_sourcemap, transform_with_sourcemap,
};

/// Source language of the input code.
#[derive(Debug, Clone, Copy, serde::Deserialize, tsify::Tsify)]
#[tsify(from_wasm_abi)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Js,
    Ts,
    Tsx,
}

impl From<Language> for LanguageInner {
    fn from(val: Language) -> Self {
        match val {
            Language::Js => LanguageInner::JavaScript,
            Language::Ts => LanguageInner::TypeScript,
            Language::Tsx => LanguageInner::Tsx,
        }
    }
}

/// Configuration options for the rewrite.
#[derive(Debug, Clone, Default, serde::Deserialize, tsify::Tsify)]
#[tsify(from_wasm_abi)]
pub struct TransformConfig {
    /// Name of the function whose calls are rewritten (defaults to `TrimMultispaces`)
    #[serde(default)]
    #[tsify(optional)]
    pub callee: Option<String>,
}

impl From<TransformConfig> for TransformConfigInner {
    fn from(val: TransformConfig) -> Self {
        TransformConfigInner {
            callee: val
                .callee
                .map_or(Cow::Borrowed(DEFAULT_CALLEE), Cow::Owned),
        }
    }
}

/// Output from the wasm API when a sourcemap is requested.
#[derive(Debug, Clone, serde::Serialize, tsify::Tsify)]
#[tsify(into_wasm_abi)]
pub struct TransformOutput {
    /// The rewritten source.
    pub code: String,
    /// The generated/re-written sourcemap JSON.
    pub map: String,
}

fn to_js_error(e: trim_multispaces::TransformError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Rewrite `TrimMultispaces` calls and create a brand-new sourcemap.
///
/// `source_name` is recorded as the sourcemap's source filename.
#[wasm_bindgen(js_name = trimMultispaces)]
pub fn trim_multispaces(
    code: String,
    source_name: String,
    language: Language,
    config: TransformConfig,
) -> Result<TransformOutput, JsValue> {
    console_error_panic_hook::set_once();

    let res = transform(&code, &source_name, language.into(), &config.into())
        .map_err(to_js_error)?;
    Ok(TransformOutput {
        code: res.code,
        map: res.map,
    })
}

/// Rewrite `TrimMultispaces` calls without producing a sourcemap.
#[wasm_bindgen(js_name = trimMultispacesNoSourcemap)]
pub fn trim_multispaces_no_sourcemap(
    code: String,
    language: Language,
    config: TransformConfig,
) -> Result<String, JsValue> {
    console_error_panic_hook::set_once();

    transform_no_sourcemap(&code, language.into(), &config.into()).map_err(to_js_error)
}

/// Rewrite `TrimMultispaces` calls and carry `sourcemap` (the input's own map) through.
#[wasm_bindgen(js_name = trimMultispacesWithSourcemap)]
pub fn trim_multispaces_with_sourcemap(
    code: String,
    sourcemap: String,
    language: Language,
    config: TransformConfig,
) -> Result<TransformOutput, JsValue> {
    console_error_panic_hook::set_once();

    let res = transform_with_sourcemap(&code, &sourcemap, language.into(), &config.into())
        .map_err(to_js_error)?;
    Ok(TransformOutput {
        code: res.code,
        map: res.map,
    })
}
