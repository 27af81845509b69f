use anyhow::Context;
use depot_domain::config::ApiConfig;
use depot_kernel::config::load_config;
use depot_logger::{Logger, parse_level};
use depot_server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg: ApiConfig =
        load_config(Some("server")).context("Critical: Configuration is malformed")?;

    let logging = &cfg.logging;
    let _log = Logger::builder()
        .name(env!("CARGO_PKG_NAME"))
        .level(parse_level(&logging.level)?)
        .directive(logging.filter.clone())
        .directory(logging.directory.clone())
        .json(logging.json)
        .max_files(logging.max_files)
        .init()?;

    Server::builder().config(cfg).build().await?.run().await
}
