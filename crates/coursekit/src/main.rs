//! `ckit` - CLI for coursekit
//!
//! Each subcommand runs one of the three programs start to finish.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{Context, Result};
use clap::Parser;

use coursekit::cipher::{self, Verification};
use coursekit::cli::{
    AnalyzeCommand, CipherCommand, Cli, Command, ConfigCommand, DrawCommand, PatternCommand,
    WeatherCommand,
};
use coursekit::{init_logging, pattern, weather, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::Cipher(cmd) => handle_cipher(&config, cmd),
        Command::Weather(WeatherCommand::Analyze(cmd)) => handle_analyze(&config, &cmd),
        Command::Pattern(PatternCommand::Draw(cmd)) => handle_draw(&config, &cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn handle_cipher(config: &Config, cmd: CipherCommand) -> Result<()> {
    match cmd {
        CipherCommand::Encrypt { shifts, files } => {
            let keys = config.cipher.shifts(shifts.shift1, shifts.shift2)?;
            let paths = files.resolve(&config.cipher);
            cipher::encrypt_file(&paths.raw, &paths.encrypted, &paths.meta, keys)
                .context("encryption failed")?;
            println!(
                "Encrypted -> '{}' and metadata -> '{}' written.",
                paths.encrypted.display(),
                paths.meta.display()
            );
        }
        CipherCommand::Decrypt { shifts, files } => {
            let keys = config.cipher.shifts(shifts.shift1, shifts.shift2)?;
            let paths = files.resolve(&config.cipher);
            let report = cipher::decrypt_file(&paths.encrypted, &paths.decrypted, &paths.meta, keys)
                .context("decryption failed")?;
            println!("Decrypted -> '{}' written.", paths.decrypted.display());
            print!("{}", cipher::render_decrypt_report(&report));
        }
        CipherCommand::Verify { files } => {
            let paths = files.resolve(&config.cipher);
            let verification =
                cipher::verify_files(&paths.raw, &paths.decrypted).context("verification failed")?;
            print_verification(&paths.raw, &verification)?;
        }
        CipherCommand::Run { shifts, files } => {
            let keys = config.cipher.shifts(shifts.shift1, shifts.shift2)?;
            let paths = files.resolve(&config.cipher);
            let (report, verification) = cipher::run_pipeline(&paths, keys)?;
            println!(
                "Encrypted -> '{}', decrypted -> '{}'.",
                paths.encrypted.display(),
                paths.decrypted.display()
            );
            print!("{}", cipher::render_decrypt_report(&report));
            print_verification(&paths.raw, &verification)?;
        }
    }
    Ok(())
}

fn print_verification(original: &std::path::Path, verification: &Verification) -> Result<()> {
    print!("{}", cipher::render_verification(verification));
    verification.check(original)?;
    Ok(())
}

fn handle_analyze(config: &Config, cmd: &AnalyzeCommand) -> Result<()> {
    let mut config = config.clone();
    if let Some(dir) = &cmd.data_dir {
        config.weather.data_dir.clone_from(dir);
    }
    if let Some(dir) = &cmd.out_dir {
        config.weather.output_dir.clone_from(dir);
    }

    let files = weather::find_csv_files(&config.weather.data_dir)
        .with_context(|| format!("reading data folder '{}'", config.weather.data_dir.display()))?;
    if files.is_empty() {
        anyhow::bail!(
            "no CSV files found in '{}'",
            config.weather.data_dir.display()
        );
    }
    println!("Found {} CSV file(s) to process.", files.len());

    let analysis = weather::analyze_files(&files);

    let [averages, range, stability] = config.weather_outputs();
    weather::write_reports(&analysis, &averages, &range, &stability)?;

    print!("{}", weather::render_averages(&analysis.seasonal));
    print!("{}", weather::render_range(analysis.range.as_ref()));
    print!("{}", weather::render_stability(&analysis.stability));

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    }
    Ok(())
}

fn handle_draw(config: &Config, cmd: &DrawCommand) -> Result<()> {
    let settings = &config.pattern;
    let spec = settings.spec(cmd.sides, cmd.side_length, cmd.depth);
    let canvas = settings.canvas();
    let output = cmd.output.as_ref().unwrap_or(&settings.output);

    let segments = pattern::trace_pattern(&spec, &canvas, &settings.limits())?;
    pattern::render_svg(&segments, &canvas, output)?;

    println!(
        "Drew {} segment(s) (sides: {}, depth: {}) -> '{}'.",
        segments.len(),
        spec.sides,
        spec.depth,
        output.display()
    );
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                let show_key = |key: Option<i64>| key.map_or("unset".to_string(), |k| k.to_string());
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Cipher]");
                println!("  shift1:             {}", show_key(config.cipher.shift1));
                println!("  shift2:             {}", show_key(config.cipher.shift2));
                println!("  Raw file:           {}", config.cipher.raw_file.display());
                println!("  Encrypted file:     {}", config.cipher.encrypted_file.display());
                println!("  Metadata file:      {}", config.cipher.meta_file.display());
                println!("  Decrypted file:     {}", config.cipher.decrypted_file.display());
                println!();
                println!("[Weather]");
                println!("  Data folder:        {}", config.weather.data_dir.display());
                println!("  Output folder:      {}", config.weather.output_dir.display());
                println!();
                println!("[Pattern]");
                println!("  Sides:              {}", config.pattern.sides);
                println!("  Side length:        {}", config.pattern.side_length);
                println!(
                    "  Depth:              {} (max {})",
                    config.pattern.depth, config.pattern.max_depth
                );
                println!("  Max segments:       {}", config.pattern.max_segments);
                println!(
                    "  Canvas:             {}x{}",
                    config.pattern.width, config.pattern.height
                );
                println!("  Output:             {}", config.pattern.output.display());
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_existing(&path).context("configuration error")?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}
