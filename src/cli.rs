use crate::corpus::{self, PREDICTION_FILE, TRUTH_FILE};
use crate::evaluate::ConfusionMatrix;
use crate::tokenize::tokenize;
use crate::{BayesFilter, Config, ConstantFilter, Filter, Normalizer, RandomFilter};
use clap::Parser;
use mail_parser::MessageParser;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterKind {
    /// word-frequency statistics
    Bayes,
    /// everything is OK
    Naive,
    /// everything is SPAM
    Paranoid,
    /// coin flip
    Random,
}

fn build_filter(kind: FilterKind, config: Config, seed: Option<u64>) -> Box<dyn Filter> {
    match kind {
        FilterKind::Bayes => Box::new(BayesFilter::new(config)),
        FilterKind::Naive => Box::new(ConstantFilter::naive()),
        FilterKind::Paranoid => Box::new(ConstantFilter::paranoid()),
        FilterKind::Random => Box::new(RandomFilter::new(seed)),
    }
}

fn cmd_run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let mut config = Config::builder();
    if let Some(threshold) = args.threshold {
        config = config.spam_threshold(threshold);
    }
    if let Some(rating) = args.unknown_rating {
        config = config.unknown_rating(rating);
    }
    if let Some(depth) = args.max_depth {
        config = config.max_depth(depth);
    }
    let mut filter = build_filter(args.filter, config.build(), args.seed);
    filter.train(&args.train_dir)?;
    let predictions = filter.test(&args.test_dir)?;
    let output = args.test_dir.join(PREDICTION_FILE);
    corpus::write_classification_to_file(&predictions, &output)?;
    info!(file = %output.display(), entries = predictions.len(), "prediction written");
    Ok(())
}

fn cmd_evaluate(dir: &Path) -> Result<(), Box<dyn Error>> {
    let truth = corpus::read_classification_from_file(&dir.join(TRUTH_FILE))?;
    let predictions = corpus::read_classification_from_file(&dir.join(PREDICTION_FILE))?;
    println!("{}", ConfusionMatrix::compute(&truth, &predictions));
    Ok(())
}

fn cmd_tokens(filename: &Path, config: &Config) -> Result<(), Box<dyn Error>> {
    for token in Normalizer::new(config).normalize_file(filename)? {
        println!("{token}");
    }
    Ok(())
}

fn cmd_dump(dump_args: &DumpArgs, config: &Config) -> Result<(), Box<dyn Error>> {
    let (dump_header, dump_body) = match (dump_args.header, dump_args.body) {
        (false, false) => (true, true),
        (dump_header, dump_body) => (dump_header, dump_body),
    };
    let raw = fs::read(&dump_args.filename)?;
    if dump_header
        && let Some(msg) = MessageParser::default().parse(&raw)
        && let Some(part) = msg.parts.first()
    {
        for h in &part.headers {
            println!("{}: {:?}", h.name, &h.value);
        }
    }
    if dump_body {
        for leaf in Normalizer::new(config).leaves(&raw)? {
            println!("==================================== {}", leaf.content_type);
            if dump_args.tokens {
                println!("{}", tokenize(&leaf.text).join(" "));
            } else if leaf.html && dump_args.dump_html {
                println!("{}", html2md::rewrite_html(&leaf.text, false));
            } else {
                println!("{}", leaf.text.trim());
            }
        }
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[derive(clap::Parser)]
#[command(version, about)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// directory with messages and `!truth.txt`
    train_dir: PathBuf,
    /// directory with messages, receives `!prediction.txt`
    test_dir: PathBuf,
    #[arg(short, long, value_enum, default_value_t = FilterKind::Bayes)]
    filter: FilterKind,
    /// spam probability at or above which a message is SPAM
    #[arg(long)]
    threshold: Option<f64>,
    /// rating of words never seen in training
    #[arg(long = "unknown-rating")]
    unknown_rating: Option<f64>,
    #[arg(long = "max-depth")]
    max_depth: Option<usize>,
    /// seed for the random filter
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(clap::Args, Debug)]
struct DumpArgs {
    filename: PathBuf,
    #[arg(short = 'H', long)]
    header: bool,
    #[arg(short, long)]
    body: bool,
    #[arg(long = "html")]
    dump_html: bool,
    /// print the tokens of each part instead of its text
    #[arg(short, long)]
    tokens: bool,
}

#[derive(clap::Subcommand)]
enum Command {
    /// train on one corpus and write predictions for another
    Run(RunArgs),
    /// compare `!prediction.txt` against `!truth.txt`
    Evaluate { dir: PathBuf },
    /// print the tokens of a message
    Tokens {
        filename: PathBuf,
        #[arg(long = "max-depth")]
        max_depth: Option<usize>,
    },
    Dump(DumpArgs),
}

pub fn xmain() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Command::Run(args) => cmd_run(&args),
        Command::Evaluate { dir } => cmd_evaluate(&dir),
        Command::Tokens {
            filename,
            max_depth,
        } => {
            let config = match max_depth {
                Some(depth) => Config::builder().max_depth(depth).build(),
                None => Config::default(),
            };
            cmd_tokens(&filename, &config)
        }
        Command::Dump(dump_args) => cmd_dump(&dump_args, &Config::default()),
    }
}
