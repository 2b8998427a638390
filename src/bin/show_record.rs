use getopts::Options;
use std::env;
use std::process;

use trackservice::models::{Entity, Track, TrackInfo};
use trackservice::queries::fetch_by_id;
use trackservice::serializers::{serialize_track, serialize_trackinfo};
use trackservice::{establish_connection, init_logging, Config, Error, Result};

fn print_usage(program: &str, opts: Options) {
    let brief = format!("Usage: {} [options]", program);
    print!("{}", opts.usage(&brief));
}

fn parse_id(value: &str) -> Option<i32> {
    match value.parse() {
        Ok(id) => Some(id),
        Err(_) => {
            eprintln!("Invalid id: {}", value);
            None
        }
    }
}

fn not_found<E: Entity>(id: i32) -> Error {
    Error::NotFound {
        table: E::TABLE_NAME,
        id,
    }
}

fn show(track_id: Option<i32>, info_id: Option<i32>) -> Result<()> {
    let config = Config::from_env()?;
    let db = establish_connection(&config.database_url)?;

    if let Some(id) = track_id {
        let track = fetch_by_id::<Track>(&db, id)?.ok_or_else(|| not_found::<Track>(id))?;
        let record = serialize_track(&track, &db)?;
        println!("{}", serde_json::to_string_pretty(&record)?);
    }

    if let Some(id) = info_id {
        let info = fetch_by_id::<TrackInfo>(&db, id)?.ok_or_else(|| not_found::<TrackInfo>(id))?;
        println!("{}", serde_json::to_string_pretty(&serialize_trackinfo(&info))?);
    }

    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt("t", "track", "track id", "ID");
    opts.optopt("i", "info", "track info id", "ID");
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

    let track_str = matches.opt_str("t");
    let info_str = matches.opt_str("i");
    if track_str == None && info_str == None {
        print_usage(&program, opts);
        return;
    }

    let track_id = match track_str {
        Some(s) => match parse_id(&s) {
            Some(id) => Some(id),
            None => process::exit(2),
        },
        None => None,
    };
    let info_id = match info_str {
        Some(s) => match parse_id(&s) {
            Some(id) => Some(id),
            None => process::exit(2),
        },
        None => None,
    };

    init_logging();

    if let Err(err) = show(track_id, info_id) {
        eprintln!("{}", err);
        process::exit(1);
    }
}
