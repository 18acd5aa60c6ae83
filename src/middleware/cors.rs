// ABOUTME: CORS middleware configuration for HTTP API endpoints
// ABOUTME: Provides Cross-Origin Resource Sharing setup for browser clients
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use axum::http::{header::HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::HttpConfig;

/// Configure CORS settings for the API
///
/// Origins come from the `CORS_ORIGINS` environment variable. A single `*`
/// (or an empty list) allows any origin; otherwise only the listed origins
/// are accepted and credentials (the session cookie) are allowed.
///
/// # Examples
///
/// ```bash
/// # Allow all origins (development)
/// export CORS_ORIGINS="*"
///
/// # Allow specific origins (production)
/// export CORS_ORIGINS="https://nutrilog.example.com"
/// ```
#[must_use]
pub fn setup_cors(config: &HttpConfig) -> CorsLayer {
    let wildcard = config.cors_origins.is_empty() || config.cors_origins.iter().any(|o| o == "*");

    let origins: Vec<HeaderValue> = if wildcard {
        Vec::new()
    } else {
        config
            .cors_origins
            .iter()
            .filter_map(|s| {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    HeaderValue::from_str(trimmed).ok()
                }
            })
            .collect()
    };

    let layer = CorsLayer::new()
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("authorization"),
            HeaderName::from_static("x-requested-with"),
            HeaderName::from_static("accept"),
            HeaderName::from_static("origin"),
            HeaderName::from_static("access-control-request-method"),
            HeaderName::from_static("access-control-request-headers"),
            HeaderName::from_static("x-request-id"),
        ])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
            Method::PATCH,
        ]);

    if origins.is_empty() {
        // Credentials cannot be combined with a wildcard origin
        layer.allow_origin(AllowOrigin::any())
    } else {
        layer
            .allow_origin(AllowOrigin::list(origins))
            .allow_credentials(true)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn http_config(origins: &[&str]) -> HttpConfig {
        HttpConfig {
            cors_origins: origins.iter().map(|o| (*o).to_owned()).collect(),
            request_timeout: Duration::from_secs(30),
            max_body_bytes: 1024,
        }
    }

    #[test]
    fn test_wildcard_and_list_configs_build() {
        let _ = setup_cors(&http_config(&["*"]));
        let _ = setup_cors(&http_config(&[]));
        let _ = setup_cors(&http_config(&["https://a.example.com", " "]));
    }
}
