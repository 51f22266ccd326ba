use std::env;
use std::fs;
use std::path::Path;
use std::process;

use log::{LevelFilter, Log, Metadata, Record};

use cancionero::layout::MonospaceMeasurer;
use cancionero::sheet::render_sheet;
use cancionero::{Config, Song, SongView, ViewMode};

const USAGE: &str = "Usage: cancionero <song-file> [--transpose N] [--key KEY] [--width COLS] [--columns N] [--config layout.yaml] [--export] [--verbose]";
const COLUMN_GAP: f64 = 4.0;

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

struct Options {
    input: String,
    transpose: i32,
    key: Option<String>,
    width: usize,
    columns: u8,
    config: Option<String>,
    export: bool,
    verbose: bool,
}

fn fail(message: &str) -> ! {
    eprintln!("{}", message);
    process::exit(1);
}

fn parse_args(args: &[String]) -> Options {
    let mut options = Options {
        input: String::new(),
        transpose: 0,
        key: None,
        width: 80,
        columns: 1,
        config: None,
        export: false,
        verbose: false,
    };

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| -> String {
            match iter.next() {
                Some(v) => v.clone(),
                None => fail(&format!("Missing value for {}\n{}", flag, USAGE)),
            }
        };
        match arg.as_str() {
            "--transpose" | "-t" => {
                let v = value(arg.as_str());
                options.transpose = v
                    .parse()
                    .unwrap_or_else(|_| fail(&format!("Invalid semitone offset '{}'", v)));
            }
            "--key" | "-k" => options.key = Some(value(arg.as_str())),
            "--width" | "-w" => {
                let v = value(arg.as_str());
                options.width = v
                    .parse()
                    .unwrap_or_else(|_| fail(&format!("Invalid width '{}'", v)));
            }
            "--columns" => {
                let v = value(arg.as_str());
                options.columns = match v.parse() {
                    Ok(n) if n > 0 => n,
                    _ => fail(&format!("Invalid column count '{}'", v)),
                };
            }
            "--config" | "-c" => options.config = Some(value(arg.as_str())),
            "--export" => options.export = true,
            "--verbose" | "-v" => options.verbose = true,
            "--help" | "-h" => {
                println!("{}", USAGE);
                process::exit(0);
            }
            flag if flag.starts_with('-') => fail(&format!("Unknown option '{}'\n{}", flag, USAGE)),
            path if options.input.is_empty() => options.input = path.to_string(),
            extra => fail(&format!("Unexpected argument '{}'\n{}", extra, USAGE)),
        }
    }

    if options.input.is_empty() {
        fail(USAGE);
    }
    options
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let options = parse_args(&args);

    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(if options.verbose { LevelFilter::Debug } else { LevelFilter::Warn });
    }

    let config = match &options.config {
        Some(path) => Config::load(Path::new(path)).unwrap_or_else(|e| fail(&format!("Error: {}", e))),
        None => Config::default(),
    };

    let source = match fs::read_to_string(&options.input) {
        Ok(content) => content,
        Err(e) => fail(&format!("Error reading file '{}': {}", options.input, e)),
    };

    let song = match Song::from_source(&source) {
        Ok(song) => song,
        Err(e) => fail(&format!("Error in '{}': {}", options.input, e)),
    };

    let mut view = SongView::with_measurer(song, config, Box::new(MonospaceMeasurer));
    if options.columns > 1 {
        view.set_view_mode(ViewMode::MultiColumn {
            columns: options.columns,
            gap: COLUMN_GAP,
        });
    }
    // Character columns don't shrink with the font, so there is nothing to fit
    view.notice_manual_scroll();
    view.set_offset(options.transpose);
    if let Some(key) = &options.key {
        view.select_key(key);
    }

    if options.export {
        print!("{}", view.song().transposed(view.offset()).to_source());
    } else {
        print!("{}", render_sheet(&view.render(options.width as f64)));
    }
}
