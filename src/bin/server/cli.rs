//! CLI mode for one-shot document analysis.

use crate::analyze::{load_pages, validate_extension};
use doc_lens::client::ModelKind;
use doc_lens::core::AnalysisConfig;
use doc_lens::doclens::{DocLens, DocLensResult};
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Analyze a local file (image or PDF) and present the results.
pub async fn process_file(
    path: &Path,
    config: AnalysisConfig,
    model: ModelKind,
    output_dir: Option<&Path>,
    output_format: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let start = Instant::now();

    validate_extension(path)?;
    let bytes = std::fs::read(path)?;
    info!("Read {} bytes from {}", bytes.len(), path.display());

    let pages = load_pages(&bytes)?;
    let prepare_time = start.elapsed();
    info!(
        "Prepared {} page image(s) in {:.2}ms",
        pages.len(),
        prepare_time.as_secs_f64() * 1000.0
    );

    let doclens = DocLens::new(config)?;

    info!("Submitting document to the analysis service...");
    let analysis_start = Instant::now();
    let result = doclens.analyze(&bytes, &pages, model).await?;
    info!(
        "Analysis completed in {:.2}ms",
        analysis_start.elapsed().as_secs_f64() * 1000.0
    );

    if let Some(dir) = output_dir {
        save_annotated_pages(&result, path, dir)?;
    }

    output_result(&result, output_format)?;

    info!(
        "Done in {:.2}ms total",
        start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(())
}

/// Write each annotated page as a PNG next to the input's stem.
fn save_annotated_pages(
    result: &DocLensResult,
    input: &Path,
    dir: &Path,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    std::fs::create_dir_all(dir)?;
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");

    for (index, page) in result.annotated_pages.iter().enumerate() {
        let output_path = dir.join(format!("{}_page_{}.png", stem, index + 1));
        page.save(&output_path)?;
        info!("Saved annotated page: {}", output_path.display());
    }

    Ok(())
}

/// Print the analysis per the requested output format.
fn output_result(
    result: &DocLensResult,
    format: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result.analysis)?);
        }
        "text" => {
            for line in &result.summary {
                println!("{line}");
            }
        }
        // pretty (default): summary lines with a small banner
        _ => {
            println!("Analysis summary");
            println!("================");
            for line in &result.summary {
                println!("{line}");
            }
        }
    }
    Ok(())
}
