use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use polyominoes::{
    draw::draw,
    report,
    validate::validate_range,
    Collinearity, Family, FileStore, ShapeId, StoreConfig,
};
use tracing_subscriber::EnvFilter;

mod enumerate;
use enumerate::enumerate;

#[derive(Clone, Parser)]
#[clap(version, about)]
pub struct Cli {
    /// The folder bucket files are kept in.
    #[clap(long, global = true, default_value = "data")]
    pub data_dir: PathBuf,

    /// Log more. Repeat for even more.
    #[clap(long, short, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors.
    #[clap(long, short, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[clap(subcommand)]
    pub command: Opts,
}

#[derive(Clone, Subcommand)]
pub enum Opts {
    /// Create every bucket up to a size, resuming from stored buckets
    Enumerate(EnumerateOpts),
    /// Print the n/k table of stored buckets
    Table(TableArgs),
    /// Print a sequence derived from stored buckets
    Sequence(SequenceArgs),
    /// Draw a shape from its identifier
    Draw(DrawArgs),
    /// Check the stored buckets for correctness
    Validate(ValidateArgs),
}

#[derive(Clone, Args)]
pub struct Selection {
    /// The lattice the shapes live on.
    #[clap(value_enum)]
    pub shape: Shape,

    /// Which lines count when measuring collinearity.
    #[clap(value_enum)]
    pub collinearity: Policy,
}

#[derive(Clone, Args)]
pub struct EnumerateOpts {
    #[clap(flatten)]
    pub selection: Selection,

    /// The largest amount of cells to enumerate shapes for.
    #[clap(long, short = 'n')]
    pub max_n: usize,

    /// Only create buckets with at most this many collinear cells.
    #[clap(long, short = 'k')]
    pub k_limit: Option<usize>,

    /// Compress written bucket files
    #[clap(long, short = 'z', value_enum, default_value = "none")]
    pub compression: Compression,

    /// Disable parallelism.
    #[clap(long, short = 'p')]
    pub no_parallelism: bool,
}

#[derive(Clone, Args)]
pub struct TableArgs {
    #[clap(flatten)]
    pub selection: Selection,

    #[clap(long, short = 'n')]
    pub max_n: usize,

    /// Only show columns up to this many collinear cells.
    #[clap(long, short = 'k')]
    pub k_limit: Option<usize>,
}

#[derive(Clone, Args)]
pub struct SequenceArgs {
    #[clap(flatten)]
    pub selection: Selection,

    #[clap(long, short = 'n')]
    pub max_n: usize,

    #[clap(long, value_enum, default_value = "row-totals")]
    pub kind: SequenceKind,

    /// Only count buckets up to this many collinear cells.
    #[clap(long, short = 'k')]
    pub k_limit: Option<usize>,
}

#[derive(Clone, Args)]
pub struct DrawArgs {
    #[clap(value_enum)]
    pub shape: Shape,

    /// The canonical identifier, rows separated by `-`.
    pub id: ShapeId,

    /// The character drawn for every cell.
    #[clap(long, default_value = "@")]
    pub pixel: char,
}

#[derive(Clone, Args)]
pub struct ValidateArgs {
    #[clap(flatten)]
    pub selection: Selection,

    #[clap(long, short = 'n')]
    pub max_n: usize,

    /// Only check buckets up to this many collinear cells.
    #[clap(long, short = 'k')]
    pub k_limit: Option<usize>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum Shape {
    Square,
    Hexagon,
}

impl From<Shape> for Family {
    fn from(value: Shape) -> Self {
        match value {
            Shape::Square => Family::Square,
            Shape::Hexagon => Family::Hexagon,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum Policy {
    Plane,
    Lattice,
}

impl From<Policy> for Collinearity {
    fn from(value: Policy) -> Self {
        match value {
            Policy::Plane => Collinearity::Plane,
            Policy::Lattice => Collinearity::Lattice,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum Compression {
    None,
    Gzip,
}

impl From<Compression> for polyominoes::Compression {
    fn from(value: Compression) -> Self {
        match value {
            Compression::None => polyominoes::Compression::None,
            Compression::Gzip => polyominoes::Compression::Gzip,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum SequenceKind {
    /// Bucket sizes, `k = 1..=n` for every `n`
    Triangle,
    /// The total of every `n`
    RowTotals,
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn table(store: &FileStore, args: &TableArgs) -> polyominoes::Result<()> {
    let family = args.selection.shape.into();
    let collinearity = args.selection.collinearity.into();

    let table = report::format_table(store, family, collinearity, args.max_n, args.k_limit)?;
    println!();
    print!("{table}");
    println!();

    Ok(())
}

fn sequence(store: &FileStore, args: &SequenceArgs) -> polyominoes::Result<()> {
    let family = args.selection.shape.into();
    let collinearity = args.selection.collinearity.into();

    let values = match args.kind {
        SequenceKind::Triangle => report::triangle(store, family, collinearity, args.max_n)?,
        SequenceKind::RowTotals => {
            report::row_totals(store, family, collinearity, args.max_n, args.k_limit)?
        }
    };

    println!("{}", report::format_sequence(&values));
    Ok(())
}

fn validate(store: &FileStore, args: &ValidateArgs) -> polyominoes::Result<bool> {
    let family = args.selection.shape.into();
    let collinearity = args.selection.collinearity.into();

    let reports = validate_range(store, family, collinearity, args.max_n, args.k_limit)?;

    let mut valid = true;
    for (key, report) in reports {
        let Some(report) = report else {
            println!("{key}: not stored, skipped");
            continue;
        };

        if report.is_ok() {
            println!("{key}: {} shapes, {} edges, valid", report.shapes, report.edges);
        } else {
            valid = false;
            println!("{key}: {} problems", report.problems.len());
            for problem in &report.problems {
                println!("    {problem}");
            }
        }
    }

    Ok(valid)
}

fn run(cli: Cli) -> polyominoes::Result<bool> {
    let store = |compression: polyominoes::Compression| {
        FileStore::new(StoreConfig::new(&cli.data_dir).with_compression(compression))
    };

    match &cli.command {
        Opts::Enumerate(opts) => {
            let store = store(opts.compression.into());
            enumerate(&store, opts)?;
        }
        Opts::Table(args) => table(&store(Default::default()), args)?,
        Opts::Sequence(args) => sequence(&store(Default::default()), args)?,
        Opts::Draw(args) => println!("{}", draw(args.shape.into(), &args.id, args.pixel)?),
        Opts::Validate(args) => return validate(&store(Default::default()), args),
    }

    Ok(true)
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    }
}
