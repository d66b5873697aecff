use anyhow::anyhow;
use clap::{ArgAction, Args, Parser, Subcommand};
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use once_cell::sync::Lazy;
use std::{
    io::Write,
    path::{Path, PathBuf},
};

/// Full version string including the crate version and git description.
///
/// # Examples
/// * `0.1.0-1ba958a-dirty` - while on a dirty branch
/// * `0.1.0-1ba958a` - with a fresh commit
/// * `0.1.0` - outside a git checkout
pub static FULL_VERSION: Lazy<String> = Lazy::new(|| {
    match option_env!("VERGEN_GIT_DESCRIBE") {
        Some(git_describe) if !git_describe.is_empty() && git_describe != "VERGEN_IDEMPOTENT_OUTPUT" => {
            format!("{}-{}", env!("CARGO_PKG_VERSION"), git_describe)
        }
        _ => env!("CARGO_PKG_VERSION").to_string(),
    }
});

#[derive(Parser, Debug)]
#[command(name="jacquard",
          version=&**FULL_VERSION,
          about="Normalizes, tags and combines somatic variant calls from VarScan, MuTect and Strelka",
          long_about = None,
          help_template = "{name} {version}\n{about-section}\n{usage-heading}\n    {usage}\n\n{all-args}{after-help}",
          )]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        global = true
    )]
    pub verbosity: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Merge, sort and mark high-confidence calls of one caller's per-sample VCFs
    Normalize(IoArgs),
    /// Add Jacquard allele frequency, depth and somatic FORMAT tags to each VCF
    Tag(IoArgs),
    /// Combine tags from multiple callers into consensus values and range z-scores
    Consensus(IoArgs),
    /// Keep only positions called high-confidence somatic by any caller
    #[command(name = "filter_hc_somatic")]
    FilterHcSomatic(IoArgs),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Normalize(_) => "normalize",
            Command::Tag(_) => "tag",
            Command::Consensus(_) => "consensus",
            Command::FilterHcSomatic(_) => "filter_hc_somatic",
        }
    }
}

#[derive(Args, Debug, Clone)]
#[command(arg_required_else_help(true))]
pub struct IoArgs {
    /// Input directory (or VCF file for consensus)
    #[arg(value_name = "INPUT", value_parser = check_path_exists)]
    pub input: PathBuf,

    /// Output directory (or VCF file for consensus)
    #[arg(value_name = "OUTPUT", value_parser = check_prefix_path)]
    pub output: PathBuf,

    /// Overwrite existing output
    #[arg(long = "force")]
    pub force: bool,
}

/// Initializes the verbosity level for logging based on the command-line arguments.
///
/// `-v` enables debug output and `-vv` enables trace output; `RUST_LOG` is still honored.
pub fn init_verbose(args: &Cli) {
    let filter_level: LevelFilter = match args.verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match record.level() {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };

            writeln!(
                buf,
                "{} [{}] {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(level),
                record.module_path().unwrap_or("unknown_module"),
                record.args()
            )
        })
        .filter_level(filter_level)
        .init();
}

fn check_path_exists(s: &str) -> anyhow::Result<PathBuf> {
    let path = Path::new(s);
    if !path.exists() {
        return Err(anyhow!("Path does not exist: {}", path.display()));
    }
    Ok(path.to_path_buf())
}

fn check_prefix_path(s: &str) -> anyhow::Result<PathBuf> {
    let path = Path::new(s);
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            return Err(anyhow!("Path does not exist: {}", parent_dir.display()));
        }
    }
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(args)
    }

    #[test]
    fn parses_each_subcommand() {
        let temp_dir = tempdir().expect("temp dir should be created");
        let input = temp_dir.path().to_string_lossy().into_owned();
        let output = temp_dir.path().join("out").to_string_lossy().into_owned();
        for name in ["normalize", "tag", "consensus", "filter_hc_somatic"] {
            let cli = parse(&["jacquard", name, &input, &output]).expect("CLI parse should succeed");
            assert_eq!(cli.command.name(), name);
        }
    }

    #[test]
    fn parses_force_and_verbosity() {
        let temp_dir = tempdir().expect("temp dir should be created");
        let input = temp_dir.path().to_string_lossy().into_owned();
        let output = temp_dir.path().join("out").to_string_lossy().into_owned();
        let cli = parse(&["jacquard", "-vv", "tag", &input, &output, "--force"])
            .expect("CLI parse should succeed");
        assert_eq!(cli.verbosity, 2);
        let Command::Tag(args) = cli.command else {
            panic!("expected tag command");
        };
        assert!(args.force);
    }

    #[test]
    fn rejects_missing_input() {
        let temp_dir = tempdir().expect("temp dir should be created");
        let input = temp_dir.path().join("absent").to_string_lossy().into_owned();
        let output = temp_dir.path().join("out").to_string_lossy().into_owned();
        assert!(parse(&["jacquard", "normalize", &input, &output]).is_err());
    }

    #[test]
    fn rejects_output_without_parent() {
        let temp_dir = tempdir().expect("temp dir should be created");
        let input = temp_dir.path().to_string_lossy().into_owned();
        let output = temp_dir
            .path()
            .join("missing")
            .join("out")
            .to_string_lossy()
            .into_owned();
        assert!(parse(&["jacquard", "tag", &input, &output]).is_err());
    }
}
