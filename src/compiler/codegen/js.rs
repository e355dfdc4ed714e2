//! Client runtime generation.
//!
//! The script registers one handler per `⚡-call` endpoint and one updater
//! per `⚡-data` key, keyed by the same strings the HTML generator writes
//! into `data-api-call` and `data-dynamic`.

use indexmap::IndexSet;
use serde_json::Value;

use crate::compiler::ast::{Directive, Document};

pub const DEFAULT_API_BASE: &str = "/api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsOptions {
    /// Prefix for backend calls: a handler for `getData` fetches
    /// `<api_base>/getData`.
    pub api_base: String,
}

impl Default for JsOptions {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

/// Generates the client script with default options.
pub fn generate_js(document: &Document) -> String {
    generate_js_with(document, &JsOptions::default())
}

/// Generates the client script.
pub fn generate_js_with(document: &Document, options: &JsOptions) -> String {
    let mut endpoints: IndexSet<&str> = IndexSet::new();
    let mut keys: IndexSet<&str> = IndexSet::new();
    for directive in document.elements().flat_map(|element| element.directives()) {
        match directive {
            Directive::BackendCall { endpoint } => endpoints.insert(endpoint),
            Directive::DynamicData { key } => keys.insert(key),
        };
    }

    let api_base = options.api_base.trim_end_matches('/');
    let mut out = String::new();
    out.push_str("(function () {\n");
    out.push_str("  \"use strict\";\n\n");
    out.push_str(&format!("  const API_BASE = {};\n\n", js_string(api_base)));

    out.push_str("  const apiHandlers = {\n");
    for endpoint in &endpoints {
        out.push_str(&format!(
            "    {}: function (element, init) {{ return callApi({}, element, init); }},\n",
            js_string(endpoint),
            js_string(endpoint)
        ));
    }
    out.push_str("  };\n\n");

    out.push_str("  const dataBindings = {\n");
    for key in &keys {
        out.push_str(&format!(
            "    {}: function (value) {{ applyData({}, value); }},\n",
            js_string(key),
            js_string(key)
        ));
    }
    out.push_str("  };\n\n");

    out.push_str(RUNTIME);
    out.push_str("})();\n");
    out
}

/// A JSON string literal, which is also a valid JavaScript string literal.
fn js_string(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}

const RUNTIME: &str = r#"  function renderValue(element, value) {
    if (value === null || value === undefined) {
      element.textContent = "";
    } else if (typeof value === "object") {
      element.textContent = JSON.stringify(value);
    } else {
      element.textContent = String(value);
    }
  }

  function applyData(key, value) {
    document.querySelectorAll("[data-dynamic]").forEach(function (element) {
      if (element.getAttribute("data-dynamic") === key) {
        renderValue(element, value);
      }
    });
  }

  function setData(key, value) {
    if (Object.prototype.hasOwnProperty.call(dataBindings, key)) {
      dataBindings[key](value);
    }
  }

  function applyResponse(data) {
    if (data && typeof data === "object") {
      Object.keys(data).forEach(function (key) {
        setData(key, data[key]);
      });
    }
    return data;
  }

  function callApi(endpoint, element, init) {
    return fetch(API_BASE + "/" + encodeURIComponent(endpoint), init || {})
      .then(function (response) {
        if (!response.ok) {
          throw new Error(endpoint + ": HTTP " + response.status);
        }
        return response.json();
      })
      .then(applyResponse)
      .catch(function (error) {
        console.error("htmlx:", error);
        if (element) {
          element.setAttribute("data-error", String(error.message || error));
        }
      });
  }

  function postJson(body) {
    return {
      method: "POST",
      headers: { "Content-Type": "application/json" },
      body: JSON.stringify(body),
    };
  }

  function bindApiCall(element) {
    const endpoint = element.getAttribute("data-api-call");
    const handler = apiHandlers[endpoint];
    if (!handler) {
      return;
    }
    const tag = element.tagName.toLowerCase();
    if (tag === "form") {
      element.addEventListener("submit", function (event) {
        event.preventDefault();
        const body = {};
        new FormData(element).forEach(function (value, name) {
          body[name] = value;
        });
        handler(element, postJson(body));
      });
    } else if (tag === "button" || tag === "a" || tag === "input") {
      element.addEventListener("click", function (event) {
        event.preventDefault();
        handler(element, postJson({}));
      });
    } else {
      handler(element).then(function (data) {
        if (data !== undefined && !element.hasAttribute("data-dynamic")) {
          renderValue(element, data);
        }
      });
    }
  }

  function init() {
    document.querySelectorAll("[data-api-call]").forEach(bindApiCall);
  }

  window.htmlx = { apiHandlers: apiHandlers, dataBindings: dataBindings, setData: setData };

  if (document.readyState === "loading") {
    document.addEventListener("DOMContentLoaded", init);
  } else {
    init();
  }
"#;
