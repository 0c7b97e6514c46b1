//! CLI command implementations
//!
//! Each subcommand has its own module with a `run` function.

pub mod init;
pub mod ledger;
pub mod run;
pub mod status;

use crate::config::Config;
use crate::error::Result;
use crate::filter::ObjectFilter;
use crate::pipeline::{PipelineDriver, PipelineSettings};
use crate::store;

/// Connect to the configured store and wrap it in a driver
pub(crate) async fn build_driver(config: &Config) -> Result<PipelineDriver> {
    let store = store::connect(&config.provider_settings()?).await?;

    Ok(PipelineDriver::new(
        store,
        PipelineSettings {
            container: config.bucket_name.clone(),
            filter: ObjectFilter::new(&config.filter),
            sample_size: config.sample_size,
            split: config.split.clone(),
            url_ttl: config.url_ttl(),
        },
    ))
}
