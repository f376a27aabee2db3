use std::process;

use rayon::prelude::*;

use binenrich::enrichment::{Contrast, Record};
use binenrich::parser::identifiers;
use binenrich::{Analysis, EnrichmentConfig, ExpressionSets, Tree};

const HEADER: [&str; 12] = [
    "bin_code",
    "bin_name",
    "up",
    "down",
    "diff",
    "detected",
    "diff_enrichment",
    "diff_qval",
    "bias_enrichment",
    "bias_qval",
    "enriched",
    "bias",
];

/// Formats a single record as tab-separated row
fn row(record: &Record) -> String {
    let counts = record.counts();
    let mut cols = vec![
        record.code().to_string(),
        record.name().to_string(),
        counts.up.to_string(),
        counts.down.to_string(),
        counts.diff.to_string(),
        counts.detected.to_string(),
    ];
    for contrast in [Contrast::Diff, Contrast::Bias] {
        cols.push(
            record
                .enrichment(contrast)
                .map_or_else(String::new, |e| format!("{e:.3}")),
        );
        cols.push(
            record
                .qvalue(contrast)
                .map_or_else(String::new, |q| format!("{q:e}")),
        );
    }
    cols.push(record.is_enriched().to_string());
    cols.push(record.bias().to_string());
    debug_assert_eq!(cols.len(), HEADER.len());
    cols.join("\t")
}

fn main() {
    simple_logger::init_with_env().unwrap();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 5 {
        println!("Show enriched bins of differentially expressed genes\n\n");
        println!("Usage\nenrichment <MAPPING> <UP> <DOWN> <BACKGROUND> [<N RESULTS>]\n");
        println!("enrichment tests/mapping.tsv tests/up.txt tests/down.txt tests/background.txt");
        process::exit(1)
    }

    let tree = Tree::from_file(&args[1]).expect("mapping file must be valid");
    let up = identifiers::read_file(&args[2]).unwrap();
    let down = identifiers::read_file(&args[3]).unwrap();
    let background = identifiers::read_file(&args[4]).unwrap();
    let output_len = args
        .get(5)
        .map(|arg| arg.parse::<usize>().unwrap_or(20))
        .unwrap_or(20);

    let sets = ExpressionSets::directional(&up, &down, &background)
        .expect("up and down regulated genes must be disjoint");

    let report = Analysis::new(&tree, EnrichmentConfig::default())
        .run(&sets)
        .unwrap();

    println!("{}", HEADER.join("\t"));
    for record in report.records().iter().take(output_len) {
        println!("{}", row(record));
    }

    // the tree is shared by all analyses
    let alphas = [0.01, 0.05, 0.1, 0.25];
    let enriched: Vec<(f64, usize)> = alphas
        .par_iter()
        .map(|alpha| {
            let config = EnrichmentConfig::extended().with_alpha(*alpha);
            let report = Analysis::new(&tree, config).run(&sets).unwrap();
            (*alpha, report.enriched().count())
        })
        .collect();

    println!("\nBins: {}\nUnmapped: {}", tree.len() - 1, report.unmapped().len());
    for (alpha, count) in enriched {
        println!("Enriched bins at alpha {alpha}: {count}");
    }
}
