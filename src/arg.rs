use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use clap::{
    App,
    Arg,
    ArgMatches,
};

use crate::store::StoreConfig;

pub struct Settings {
    pub host: String,
    pub port: u16,
    pub store: PathBuf,
    pub delete_enabled: bool,
    pub hostname: String,
    pub max_exponent: u32,
    pub threads: usize,
}

const BIND_HOST: &str = "0.0.0.0";
const BIND_PORT: u16 = 8080;
const STORE_DIR: &str = "./store";
const MAX_EXPONENT: u32 = 32;
const MAX_EXPONENT_LIMIT: u32 = 62;
const THREADS: usize = 8;

fn default_hostname() -> String {
    match env::var("HOSTNAME") {
        Ok(v) if !v.is_empty() => v,
        _ => String::from("localhost"),
    }
}

fn validate_exponent(v: String) -> Result<(), String> {
    match v.parse::<u32>() {
        Ok(n) if n <= MAX_EXPONENT_LIMIT => Ok(()),
        _ => Err(format!("must be an integer between 0 and {}", MAX_EXPONENT_LIMIT)),
    }
}

fn validate_port(v: String) -> Result<(), String> {
    v.parse::<u16>().map(|_| ()).map_err(|e| e.to_string())
}

fn validate_threads(v: String) -> Result<(), String> {
    match v.parse::<usize>() {
        Ok(n) if n > 0 => Ok(()),
        _ => Err(String::from("must be a positive integer")),
    }
}

fn app<'a, 'b>() -> App<'a, 'b> {
    let mut o = App::new("fsrv");
    o = o.version(env!("CARGO_PKG_VERSION"));
    o = o.about("A simple HTTP file server with upload, download, and delete capabilities.");
    o = o.arg(
        Arg::with_name("port")
            .long("port")
            .short("p")
            .value_name("PORT")
            .help("Port to listen on")
            .takes_value(true)
            .validator(validate_port)
            );
    o = o.arg(
        Arg::with_name("bind")
            .long("bind")
            .short("b")
            .value_name("ADDR")
            .help("Host or ip to bind server to")
            .takes_value(true)
            );
    o = o.arg(
        Arg::with_name("store")
            .long("store")
            .short("s")
            .value_name("DIR")
            .help("Directory to store files in")
            .takes_value(true)
            );
    o = o.arg(
        Arg::with_name("delete")
            .long("delete")
            .short("d")
            .help("Enable deleting files from the web page")
            );
    o = o.arg(
        Arg::with_name("hostname")
            .long("hostname")
            .short("n")
            .value_name("NAME")
            .help("Server name used in links, defaults to the host name")
            .takes_value(true)
            );
    o = o.arg(
        Arg::with_name("max")
            .long("max")
            .short("m")
            .value_name("EXP")
            .help("Max upload size as a power of two, 32 means 1<<32 = 4 GB")
            .takes_value(true)
            .validator(validate_exponent)
            );
    o = o.arg(
        Arg::with_name("threads")
            .long("threads")
            .short("t")
            .value_name("N")
            .help("Number of request worker threads")
            .takes_value(true)
            .validator(validate_threads)
            );
    o
}

impl Settings {

    pub fn new() -> Settings {
        Settings {
            host: BIND_HOST.to_string(),
            port: BIND_PORT,
            store: PathBuf::from(STORE_DIR),
            delete_enabled: false,
            hostname: default_hostname(),
            max_exponent: MAX_EXPONENT,
            threads: THREADS,
        }
    }

    // Values were checked by the validators, parse failures cannot happen here.
    fn bind_from_args(&mut self, arg: &ArgMatches) {
        if let Some(v) = arg.value_of("bind") {
            self.host = v.to_string();
        }
        if let Some(v) = arg.value_of("port").and_then(|v| v.parse().ok()) {
            self.port = v;
        }
        if let Some(v) = arg.value_of("store") {
            self.store = PathBuf::from(v);
        }
        if arg.is_present("delete") {
            self.delete_enabled = true;
        }
        if let Some(v) = arg.value_of("hostname") {
            self.hostname = v.to_string();
        }
        if let Some(v) = arg.value_of("max").and_then(|v| v.parse().ok()) {
            self.max_exponent = v;
        }
        if let Some(v) = arg.value_of("threads").and_then(|v| v.parse().ok()) {
            self.threads = v;
        }
    }

    /// Parse the process arguments, exiting with a usage message on invalid input.
    pub fn from_args() -> Settings {
        let arg_matches = app().get_matches();
        let mut settings = Settings::new();
        settings.bind_from_args(&arg_matches);
        settings
    }

    /// Parse an explicit argument list, the first item being the program name.
    pub fn from_arg_list<I, T>(args: I) -> Result<Settings, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let arg_matches = app().get_matches_from_safe(args)?;
        let mut settings = Settings::new();
        settings.bind_from_args(&arg_matches);
        Ok(settings)
    }

    pub fn max_upload_size(&self) -> u64 {
        1u64 << self.max_exponent
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.hostname, self.port)
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            root: self.store.clone(),
            max_upload_size: self.max_upload_size(),
            delete_enabled: self.delete_enabled,
            base_url: self.base_url(),
        }
    }
}
