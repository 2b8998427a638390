use std::env;
use std::process;

use actix_web::{middleware, App, HttpServer};
use getopts::Options;

use trackservice::{api, create_db_pool, init_logging, Config, Result};

fn print_usage(program: &str, opts: Options) {
    let brief = format!("Usage: {} [options]", program);
    print!("{}", opts.usage(&brief));
}

fn run(bind_override: Option<String>) -> Result<()> {
    let mut config = Config::from_env()?;
    if let Some(bind_addr) = bind_override {
        config.bind_addr = bind_addr;
    }

    let pool = create_db_pool(&config)?;
    log::info!(
        "Serving tracks on http://{} with {} database connections",
        config.bind_addr,
        config.pool_size
    );

    HttpServer::new(move || {
        App::new()
            .data(pool.clone())
            .wrap(middleware::DefaultHeaders::new().header("Access-Control-Allow-Origin", "*"))
            .wrap(middleware::Logger::default())
            .configure(api::configure)
    })
    .bind(config.bind_addr.as_str())?
    .run()?;

    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt("b", "bind", "address to listen on", "ADDR");
    opts.optflag("h", "help", "print this help menu");
    let matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(f) => {
            eprintln!("{}", f);
            print_usage(&program, opts);
            process::exit(2);
        }
    };
    if matches.opt_present("h") {
        print_usage(&program, opts);
        return;
    }

    init_logging();

    if let Err(err) = run(matches.opt_str("b")) {
        log::error!("{}", err);
        process::exit(1);
    }
}
