use user_accounts::config::load_config;
use user_accounts::server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config().map_err(|e| {
        log::error!("{e}");
        std::io::Error::other(e)
    })?;

    server::run(config).await.map_err(|e| {
        log::error!("{e}");
        std::io::Error::other(e)
    })
}
