use anyhow::{Context, Result};
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::env;
use std::fs;
use std::io::{self, Read};
use syllabus::SyllabusParser;
use syllabus::cli::{CliArgs, print_help, render_json, render_text};
use syllabus::config::{Config, OutputFormat};
use syllabus::context::StandardContext;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let cli = CliArgs::parse(args.get(1..).unwrap_or_default())?;

    if cli.help {
        print_help(args.first().map_or("syllabus", String::as_str));
        return Ok(());
    }

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let log_config = ConfigBuilder::new().set_time_level(LevelFilter::Off).build();
    if let Err(e) = TermLogger::init(level, log_config, TerminalMode::Stderr, ColorChoice::Auto) {
        eprintln!("Logger unavailable: {}", e);
    }

    let ctx = StandardContext::new(cli.root.clone());
    log::debug!("Config file: {}", Config::get_path_string(&ctx)?);
    let mut config = Config::load_or_default(&ctx)?;
    cli.apply(&mut config)?;

    let text = match &cli.input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read syllabus '{}'", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read syllabus from stdin")?;
            buf
        }
    };

    let parser = SyllabusParser::new(&config.options)?;
    let resolved = parser.options();
    log::debug!(
        "Timezone {}, default due time {}, semester starts in month {}",
        resolved.timezone,
        resolved.default_due_time.format("%H:%M"),
        resolved.semester_start_month
    );
    let records = parser.parse(&text);
    log::debug!("Parsed {} assignments", records.len());

    match config.format {
        OutputFormat::Json => println!("{}", render_json(&records)?),
        OutputFormat::Text => print!("{}", render_text(&records, config.review_threshold)),
    }
    Ok(())
}
