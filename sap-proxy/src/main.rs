use anyhow::Context;
use sap_proxy::{cli::ProxyArgs, logger, run::Proxy};

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    logger::init();

    let mut args = ProxyArgs::from_cli();
    args.or_env_mut()?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    let proxy = Proxy::init(args)?;
    let spawn_ctrlc_handler = true;
    rt.block_on(proxy.run(spawn_ctrlc_handler))
}
