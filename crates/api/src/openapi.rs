// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! `OpenAPI` documentation endpoints

use axum::{Json, response::Html};
use utoipa::OpenApi;

use crate::docs::ApiDoc;

const SPEC_URL: &str = "/api-doc/openapi.json";
const SWAGGER_UI_VERSION: &str = "5.17.14";

/// `OpenAPI` specification endpoint
pub async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Swagger UI page rendering the specification served at [`SPEC_URL`]
pub async fn swagger_ui() -> Html<String> {
    let assets = format!("https://unpkg.com/swagger-ui-dist@{SWAGGER_UI_VERSION}");
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Spam Detection API</title>
    <link rel="stylesheet" href="{assets}/swagger-ui.css" />
</head>
<body style="margin: 0">
    <div id="swagger-ui"></div>
    <script src="{assets}/swagger-ui-bundle.js"></script>
    <script>
        window.onload = () => {{
            SwaggerUIBundle({{ url: '{SPEC_URL}', dom_id: '#swagger-ui', deepLinking: true }});
        }};
    </script>
</body>
</html>
"#
    ))
}
