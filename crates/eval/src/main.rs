use clap::Parser;
use hnsw_eval::{run, EvalOptions};
use hnswkit_core::{config, HnswConfig, NeighborSelection};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "hnsw-eval",
    about = "Build an HNSW index over a benchmark dataset and write the top-k neighbor ids of one query"
)]
struct Args {
    /// Directory holding `<dataset>_{train,base,test,query}.bin` files
    #[arg(short, long, default_value = config::DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Dataset name (file prefix)
    #[arg(long, default_value = config::DEFAULT_DATASET)]
    dataset: String,

    /// Links per node per layer (layer 0 uses 2 * M)
    #[arg(short, long, default_value_t = config::HNSW_DEFAULT_M)]
    m: usize,

    /// Candidate list size during construction
    #[arg(long, default_value_t = config::HNSW_DEFAULT_EF_CONSTRUCTION)]
    ef_construction: usize,

    /// Candidate list size during search (raised to k when smaller)
    #[arg(long, default_value_t = config::HNSW_DEFAULT_EF_SEARCH)]
    ef_search: usize,

    /// Number of neighbors to return
    #[arg(short, default_value_t = config::DEFAULT_K)]
    k: usize,

    /// Position of the query vector in the query split
    #[arg(long, default_value_t = 0)]
    query_index: usize,

    /// File the neighbor ids are written to, one per line
    #[arg(short, long, default_value = config::DEFAULT_OUTPUT_FILE)]
    output: PathBuf,

    /// Seed for layer assignment (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Backfill neighbor lists with the nearest rejected candidates
    #[arg(long, default_value_t = false)]
    lenient: bool,

    /// Also compute recall@k against an exact linear scan
    #[arg(long, default_value_t = false)]
    recall: bool,

    /// Warn when the dataset dimension differs from this value
    #[arg(long, default_value_t = config::EXPECTED_SIFT_DIMENSION)]
    expected_dim: usize,

    /// Emit logs as JSON lines
    #[arg(long, default_value_t = false)]
    json_logs: bool,

    /// Print the run summary as JSON on stdout
    #[arg(long, default_value_t = false)]
    report: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = EnvFilter::from_default_env()
        .add_directive("hnsw_eval=info".parse()?)
        .add_directive("hnswkit_core=info".parse()?);
    if args.json_logs {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = HnswConfig {
        ef_search: args.ef_search,
        selection: if args.lenient {
            NeighborSelection::Lenient
        } else {
            NeighborSelection::Strict
        },
        seed: args.seed,
        ..HnswConfig::new(args.m, args.ef_construction)
    };
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let options = EvalOptions {
        data_dir: args.data_dir,
        dataset: args.dataset,
        config,
        k: args.k,
        query_index: args.query_index,
        output: args.output,
        expected_dimension: Some(args.expected_dim),
        compute_recall: args.recall,
    };

    let report = match run(&options) {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Evaluation failed: {}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if args.report {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Top-{} indices written to {}",
            report.ids.len(),
            report.output.display()
        );
    }
    Ok(())
}
