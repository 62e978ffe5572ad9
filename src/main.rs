use clap::Parser;
use tracing::info;

use snaplink::config::{Args, StaticConfig, get_config, init_config, update_config};
use snaplink::runtime::run_server;
use snaplink::system::logging::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    if args.generate_config {
        println!("{}", StaticConfig::generate_sample_config());
        return Ok(());
    }

    init_config(&args.config);
    let mut config = (*get_config()).clone();
    args.apply(&mut config);
    if let Err(e) = config.validate() {
        eprintln!("{}", e.format_colored());
        std::process::exit(1);
    }
    update_config(config);
    let config = get_config();

    // guard 必须存活到进程退出，保证日志刷盘
    let _log_guard = match init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            std::process::exit(1);
        }
    };

    info!(
        "{} v{} starting ({} storage)",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        config.storage.backend
    );

    run_server(&config).await
}
