//! Prometheus middleware that can be switched off at startup.
//!
//! Both branches box the inner service so the `App` type is the same whether
//! or not metrics were configured.

use std::sync::Arc;

use actix_service::boxed::{self, BoxService};
use actix_service::{Service, ServiceExt as _, Transform};
use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Compat;
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use futures_util::future::LocalBoxFuture;

type BoxedService = BoxService<ServiceRequest, ServiceResponse<BoxBody>, actix_web::Error>;

#[derive(Clone)]
pub(crate) enum OptionalMetrics {
    On(Arc<PrometheusMetrics>),
    Off,
}

impl From<Option<PrometheusMetrics>> for OptionalMetrics {
    fn from(metrics: Option<PrometheusMetrics>) -> Self {
        metrics.map_or(Self::Off, |m| Self::On(Arc::new(m)))
    }
}

/// Build the registry behind `GET /metrics`.
pub(crate) fn storefront_metrics() -> Result<PrometheusMetrics, String> {
    PrometheusMetricsBuilder::new("storefront")
        .endpoint("/metrics")
        .build()
        .map_err(|err| err.to_string())
}

impl<S, B> Transform<S, ServiceRequest> for OptionalMetrics
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = BoxedService;
    type Future = LocalBoxFuture<'static, Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        match self {
            Self::On(metrics) => {
                let pending = Compat::new((**metrics).clone()).new_transform(service);
                Box::pin(async move { Ok(boxed::service(pending.await?)) })
            }
            Self::Off => {
                let svc = service.map(ServiceResponse::<B>::map_into_boxed_body);
                Box::pin(async move { Ok(boxed::service(svc)) })
            }
        }
    }
}
