use std::fs;
use std::io::{self, Read};
use std::path::Path;

use clap::{App, Arg};

use wpfunge::env::InputMode;
use wpfunge::interpreter::ProgramResult;
use wpfunge::playfield::strip_shebang;
use wpfunge::{CmdLineEnv, Dialect, Interpreter, Playfield};

fn main() {
    let arg_matches = App::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .about("Befunge-93 / Funge-98 interpreter")
        .arg(
            Arg::with_name("version")
                .short("v")
                .long("version")
                .help("Print version and exit")
                .display_order(0),
        )
        .arg(
            Arg::with_name("b93")
                .short("1")
                .long("b93")
                .help("Befunge-93 mode: fixed 80x25 torus")
                .display_order(1),
        )
        .arg(
            Arg::with_name("b98")
                .short("2")
                .long("b98")
                .help("Funge-98 mode (default): unbounded playfield")
                .conflicts_with("b93")
                .display_order(2),
        )
        .arg(
            Arg::with_name("debug")
                .short("d")
                .long("debug")
                .help("Run under the single-step debugger, optionally at RATE steps/second")
                .value_name("RATE")
                .takes_value(true)
                .min_values(0)
                .display_order(3),
        )
        .arg(
            Arg::with_name("warn")
                .short("w")
                .long("warn")
                .help("Print core diagnostics (unknown instructions, etc.) to stderr")
                .display_order(4),
        )
        .arg(
            Arg::with_name("PROGRAM")
                .help("Source file, '-' for stdin, or an inline program if no such file exists")
                .required(false),
        )
        .arg(
            Arg::with_name("ARGS")
                .help("Arguments available to '&' and '~'")
                .required(false)
                .multiple(true),
        )
        .get_matches();

    if arg_matches.is_present("version") {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        std::process::exit(0);
    }

    let filename = match arg_matches.value_of("PROGRAM") {
        Some(f) => f,
        None => {
            eprintln!("wpfunge: no PROGRAM given (see --help)");
            std::process::exit(2);
        }
    };

    let dialect = if arg_matches.is_present("b93") {
        Dialect::B93
    } else {
        Dialect::B98
    };

    let src = match read_source(filename) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("wpfunge: couldn't load '{}': {}", filename, e);
            std::process::exit(2);
        }
    };

    let mut playfield = Playfield::new(dialect);
    playfield.insert_block(strip_shebang(&src), 0, 0);

    let args: Vec<String> = arg_matches.values_of_lossy("ARGS").unwrap_or_default();
    let warn = arg_matches.is_present("warn");
    let env = CmdLineEnv::new(InputMode::Args(args), warn, false, false);

    let mut interpreter = Interpreter::new(playfield, env);

    let result = if let Some(rate_str) = arg_matches.value_of("debug") {
        let rate = rate_str.parse::<f64>().ok().filter(|r| *r > 0.0);
        wpfunge::debug::run(&mut interpreter, rate)
    } else if arg_matches.is_present("debug") {
        wpfunge::debug::run(&mut interpreter, None)
    } else {
        Ok(interpreter.run())
    };

    match result {
        Ok(ProgramResult::Done(code)) => std::process::exit(code),
        Err(e) => {
            eprintln!("wpfunge: debugger failed: {}", e);
            std::process::exit(2);
        }
    }
}

/// Load program source: `-` reads stdin, an existing file path is read from
/// disk, and anything else is treated as an inline program (so `wpfunge
/// '1+.@'` works without a temp file).
fn read_source(filename: &str) -> io::Result<String> {
    if filename == "-" {
        let mut s = String::new();
        io::stdin().read_to_string(&mut s)?;
        Ok(s)
    } else if Path::new(filename).is_file() {
        fs::read_to_string(filename)
    } else {
        Ok(filename.to_string())
    }
}
