// Entry point and outer control loop.
//
// With `--view` the binary renders that view once (optionally exporting its
// series) and exits. Without it, a numbered menu lets the user switch views
// and change filters; every render is a fresh filter -> aggregate pass over
// the table loaded at startup.
mod aggregate;
mod config;
mod error;
mod filter;
mod loader;
mod output;
mod session;
mod types;
mod util;
mod view;

use clap::Parser;
use config::Cli;
use log::error;
use session::Session;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;
use view::View;

/// Print `prompt` and read one trimmed line. `None` on end of input.
fn read_line(prompt: &str) -> Option<String> {
    print!("{prompt}");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn render(session: &Session, rows: usize, export: Option<&Path>) -> bool {
    let report = match session.render() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Failed to load data: {e}");
            return false;
        }
    };
    output::print_report(&report, rows);
    if let Some(dir) = export {
        match output::export_report(&report, dir) {
            Ok(files) => println!("(Exported {} files to {})\n", files.len(), dir.display()),
            Err(e) => {
                eprintln!("Write error: {e}");
                return false;
            }
        }
    }
    true
}

fn choose_view(session: &mut Session) {
    for (i, view) in View::ALL.iter().enumerate() {
        println!("[{}] {}", i + 1, view.title());
    }
    let Some(choice) = read_line("View: ") else { return };
    match choice.parse::<usize>().ok().and_then(|n| View::ALL.get(n.wrapping_sub(1))) {
        Some(view) => session.select_view(*view),
        None => println!("Invalid choice. Please enter 1-{}.", View::ALL.len()),
    }
}

fn edit_range(session: &mut Session) {
    let current = session.filters().range;
    let Some(start) = read_line(&format!("Start date [{}]: ", current.start())) else { return };
    let Some(end) = read_line(&format!("End date [{}]: ", current.end())) else { return };
    let parse = |s: &str, fallback| {
        if s.is_empty() {
            Ok(fallback)
        } else {
            filter::parse_date(s)
        }
    };
    let result = parse(&start, current.start())
        .and_then(|s| Ok((s, parse(&end, current.end())?)))
        .and_then(|(s, e)| session.set_range(s, e));
    if let Err(e) = result {
        println!("{e}");
    }
}

fn edit_weather(session: &mut Session) {
    let Some(line) = read_line("Weather codes (e.g. 1,2,3,4 or none): ") else { return };
    match filter::parse_weather_set(&line) {
        Ok(set) => session.set_weather(set),
        Err(e) => println!("{e}"),
    }
}

fn edit_seasons(session: &mut Session) {
    let Some(line) = read_line("Seasons (e.g. spring,summer, all or none): ") else { return };
    match filter::parse_season_set(&line) {
        Ok(set) => session.set_seasons(set),
        Err(e) => println!("{e}"),
    }
}

fn interactive(session: &mut Session, rows: usize, export: Option<&Path>) {
    loop {
        println!("Current view: {}", session.view().title());
        println!("[1] Render current view");
        println!("[2] Select view");
        println!("[3] Set date range");
        println!("[4] Set weather conditions");
        println!("[5] Set seasons");
        println!("[6] Reset filters");
        println!("[0] Exit\n");
        let Some(choice) = read_line("Enter choice: ") else { break };
        match choice.as_str() {
            "1" => {
                render(session, rows, export);
            }
            "2" => choose_view(session),
            "3" => edit_range(session),
            "4" => edit_weather(session),
            "5" => edit_seasons(session),
            "6" => session.reset_filters(),
            "0" => break,
            _ => println!("Invalid choice. Please enter 0-6.\n"),
        }
    }
    println!("Exiting the program.");
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    let filters = match cli.filters() {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Invalid filters: {e}");
            return ExitCode::from(2);
        }
    };

    let mut session = Session::new(&cli.data, cli.view.unwrap_or(View::Overview), filters);
    match session.dataset() {
        Ok(ds) => {
            let report = ds.report();
            println!(
                "Processing dataset... ({} rows loaded from {}, temperature column '{}')\n",
                util::format_int(ds.len()),
                report.source.display(),
                report.temperature_column
            );
        }
        Err(e) => {
            error!("load failed: {e}");
            eprintln!("Failed to load file: {e}");
            return ExitCode::FAILURE;
        }
    }

    let export = cli.export.as_deref();
    if cli.view.is_some() {
        return if render(&session, cli.rows, export) {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        };
    }

    interactive(&mut session, cli.rows, export);
    ExitCode::SUCCESS
}
