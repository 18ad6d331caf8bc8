mod args;

use anyhow::{Context, Result};
use atty::Stream;
use replace_text::render::{self, Theme};
use replace_text::{replacer, search};
use std::io::{self, Write};
use std::process;

/// Main entry point of the application
/// Handles argument parsing and executes the program with error handling
fn main() -> Result<()> {
    // Parse command line arguments
    let args = args::parse().context("Failed to parse arguments")?;

    init_logger(args.verbose);

    let color = !args.no_color && atty::is(Stream::Stdout);
    colored::control::set_override(color);
    let theme = Theme::detect(color);

    if let Err(e) = run(&args, &theme) {
        eprint!("{}", render::failure(&theme, &format!("Error: {:#}", e)));
        process::exit(1);
    }

    Ok(())
}

/// Install the `log` backend; `RUST_LOG` overrides the default level
fn init_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

/// Runs the main functionality based on the provided arguments
///
/// # Arguments
/// * `args` - Parsed command line arguments
/// * `theme` - Symbols and colors for the report
fn run(args: &args::Args, theme: &Theme) -> Result<()> {
    if let args::Mode::Search(term) = &args.mode {
        for entry in search::search_results(term) {
            println!("{}", entry);
        }
        return Ok(());
    }

    let conversion = replacer::convert_file(&args.in_file, &args.map_file)?;

    if !conversion.changed() {
        eprintln!("Warning: No replacements were made. Check if the patterns exist in the input.");
    }

    // Plain stdout mode prints the result and nothing else
    if args.target().is_none() && !args.dry_run {
        io::stdout().write_all(conversion.output.as_bytes())?;
        return Ok(());
    }

    let out_file = match &args.mode {
        args::Mode::File(path) => Some(path.as_path()),
        _ => None,
    };
    print!(
        "{}",
        render::command_banner(theme, args.dry_run, &args.in_file, &args.map_file, out_file)
    );

    let target = match args.target() {
        Some(target) if !args.dry_run => target,
        Some(target) => return preview(args, theme, &conversion, &target.display().to_string()),
        None => return preview(args, theme, &conversion, "stdout"),
    };

    println!("\n{}", render::progress_header(theme, &args.in_file, &target.display().to_string()));
    replacer::write_output(target, &conversion.output)?;
    print!("{}", render::finished(theme, target));

    Ok(())
}

/// Show what a run would produce without writing anything
fn preview(
    args: &args::Args,
    theme: &Theme,
    conversion: &replacer::Conversion,
    target: &str,
) -> Result<()> {
    println!("\n{}", render::progress_header(theme, &args.in_file, target));

    if args.diff {
        print!(
            "{}",
            render::unified_diff(theme, &conversion.input, &conversion.output)
        );
    } else {
        println!("{}", render::sample_output(theme, &conversion.output, args.lines));
    }

    Ok(())
}
