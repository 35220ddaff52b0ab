use std::io;
use std::sync::Arc;
use std::thread::{
    self,
    JoinHandle,
};

use log::{debug, error};
use tiny_http::{
    Request,
    Server,
};

use crate::request::process_method;
use crate::response::exec_response;
use crate::store::Store;

/// Serve a single request against the store.
pub fn handle(store: &Store, mut req: Request) {
    let method = req.method().clone();
    let url = req.url().to_string();
    let mut content_type: Option<String> = None;
    for h in req.headers() {
        if h.field.equiv("Content-Type") {
            content_type = Some(h.value.as_str().to_string());
        }
    }
    let expected_size = req.body_length();

    let r = process_method(store, &method, &url, content_type.as_deref(), expected_size, req.as_reader());
    exec_response(req, r);
}

fn work(srv: &Server, store: &Store) {
    loop {
        let req = match srv.recv() {
            Ok(v) => v,
            Err(e) => {
                error!("{}", e);
                break;
            },
        };
        debug!("{} {} from {:?}", req.method(), req.url(), req.remote_addr());
        handle(store, req);
    }
}

/// Start `count` threads taking requests off the same listener.
///
/// Every worker handles one request at a time, so up to `count` requests are in flight at once.
pub fn spawn_workers(srv: Arc<Server>, store: Arc<Store>, count: usize) -> io::Result<Vec<JoinHandle<()>>> {
    (0..count).map(|i| {
        let srv = Arc::clone(&srv);
        let store = Arc::clone(&store);
        thread::Builder::new()
            .name(format!("fsrv-worker-{}", i))
            .spawn(move || work(&srv, &store))
    }).collect()
}
