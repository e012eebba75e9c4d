//! Prometheus probe exporter for Intinor Direkt units.
//!
//! On each `GET /probe?serial=D0xxxx` request the exporter walks a fixed
//! set of REST resources on the Direkt cloud API for that unit, translates
//! the JSON responses into labeled gauges in a request-scoped registry,
//! and returns the registry in Prometheus text exposition format.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────┐     ┌───────────────────────────┐     ┌──────────────┐
//! │ /probe?serial= │────>│      gather pipeline      │────>│  exposition  │
//! │   (validate)   │     │ system, interfaces,       │     │  text body   │
//! └────────────────┘     │ inputs, outputs, encoders │     └──────────────┘
//!                        └───────────────────────────┘
//! ```
//!
//! Every probe builds its own registry; nothing is shared across requests
//! except the [`client::DeviceClient`] (static configuration only) and the
//! default registry holding the exporter's own self-metrics.

pub mod client;
pub mod config;
pub mod gather;
pub mod http;
pub mod metrics;
pub mod models;

pub use client::{ClientError, DeviceClient};
pub use config::ExporterConfig;
pub use gather::{GatherError, gather_metrics};
pub use http::create_router;
