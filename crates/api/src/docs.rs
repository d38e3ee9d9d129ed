// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! `OpenAPI` document definition

use utoipa::OpenApi;

use crate::{
    health::{HealthReport, HealthState, StoreStatus},
    routes::handlers::{self, ErrorBody, PredictRequest, ServiceInfo},
    service::PredictionOutcome,
};

/// `OpenAPI` document for the spam detection API
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "Spam Detection API",
        description = "Real-time spam/ham text classification"
    ),
    paths(
        handlers::root_handler,
        handlers::health_handler,
        handlers::predict_handler
    ),
    components(schemas(
        ServiceInfo,
        HealthReport,
        HealthState,
        StoreStatus,
        PredictRequest,
        PredictionOutcome,
        ErrorBody
    )),
    tags(
        (name = "service", description = "Service information"),
        (name = "health", description = "Health checks"),
        (name = "prediction", description = "Spam classification")
    )
)]
pub struct ApiDoc;
