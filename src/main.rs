use std::env;
use std::process;
use std::sync::Arc;

use env_logger::Env;
use log::{info, error};
use tiny_http::Server;

use fsrv::arg::Settings;
use fsrv::server::spawn_workers;
use fsrv::setup::{
    check_and_create_dir,
    prepare_tmp_dir,
};
use fsrv::size::human_readable_size;
use fsrv::store::Store;


fn fail(msg: &str, e: impl std::fmt::Display) -> ! {
    error!("{}: {}", msg, e);
    process::exit(1);
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let settings = Settings::from_args();

    if let Err(e) = check_and_create_dir(&settings.store) {
        fail("failed to create store directory", e);
    }
    let tmp_dir = match prepare_tmp_dir() {
        Ok(v) => v,
        Err(e) => fail("failed to prepare temporary directory", e),
    };
    // Spool large request bodies next to the binary, not in a possibly small system tmp.
    env::set_var("TMPDIR", &tmp_dir);

    let store = Arc::new(Store::new(settings.store_config()));

    let bind = format!("{}:{}", &settings.host, settings.port);
    let srv = match Server::http(bind.as_str()) {
        Ok(v) => Arc::new(v),
        Err(e) => fail("failed to start server", e),
    };

    info!("server started on {}", &bind);
    info!("store directory: {}", settings.store.display());
    info!("temporary directory: {}", tmp_dir.display());
    info!("advertised as: {}", settings.base_url());
    info!("max upload size: {} -> {}", settings.max_exponent, human_readable_size(settings.max_upload_size()));
    info!("delete enabled: {}", settings.delete_enabled);
    info!("worker threads: {}", settings.threads);

    let workers = match spawn_workers(srv, store, settings.threads) {
        Ok(v) => v,
        Err(e) => fail("failed to start workers", e),
    };
    for w in workers {
        if w.join().is_err() {
            error!("worker thread panicked");
        }
    }
}
