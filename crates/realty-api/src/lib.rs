//! Query pipeline and its HTTP surface.

pub mod http;
pub mod pipeline;

pub use http::{QueryRequest, router, serve};
pub use pipeline::{
    Analysis, AnalysisMeta, AreaSeries, Health, Pipeline, PipelineError, TABLE_ROW_LIMIT,
};
