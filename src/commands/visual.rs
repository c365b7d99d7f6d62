//! Image equation solving and PDF analysis handlers
//!
//! Reads a local file, encodes it as a base64 data URI, and sends it to the
//! matching multimodal capability.

use crate::capabilities::{create_capabilities, ImageEquationRequest, PdfRequest};
use crate::config::Config;
use crate::error::{CodeexError, Result};

use base64::Engine;
use colored::Colorize;
use std::path::Path;

/// Recognize and solve a math equation from an image file
pub async fn run_solve_image(config: Config, image: &Path) -> Result<()> {
    let photo_data_uri = encode_image_as_data_uri(image)?;
    let capabilities = create_capabilities(&config)?;

    println!("Analyzing {}...\n", image.display().to_string().cyan());

    let answer = capabilities
        .solve_image_equation(ImageEquationRequest { photo_data_uri })
        .await?;

    println!("{} {}", "Equation:".bold(), answer.recognized_equation);
    if answer.is_solvable {
        println!("\n{}", answer.solution_steps);
    } else {
        println!(
            "\n{}",
            "This does not look like a solvable equation.".yellow()
        );
        if !answer.solution_steps.is_empty() {
            println!("{}", answer.solution_steps);
        }
    }

    Ok(())
}

/// Answer a question about a PDF document
pub async fn run_analyze_pdf(config: Config, pdf: &Path, question: String) -> Result<()> {
    let pdf_data_uri = encode_pdf_as_data_uri(pdf)?;
    let capabilities = create_capabilities(&config)?;

    println!("Reading {}...\n", pdf.display().to_string().cyan());

    let answer = capabilities
        .analyze_pdf(PdfRequest {
            pdf_data_uri,
            question,
        })
        .await?;

    println!("{}", answer.answer);
    Ok(())
}

/// Read an image file and build a `data:<mime>;base64,` URI
///
/// The format is detected from the file contents, not the extension.
fn encode_image_as_data_uri(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .map_err(|e| CodeexError::Payload(format!("Failed to read {}: {}", path.display(), e)))?;

    let format = image::guess_format(&bytes).map_err(|e| {
        CodeexError::Payload(format!("{} is not a recognized image: {}", path.display(), e))
    })?;
    let mime = format.to_mime_type();

    let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
    Ok(format!("data:{};base64,{}", mime, encoded))
}

/// Read a PDF file and build a `data:application/pdf;base64,` URI
fn encode_pdf_as_data_uri(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .map_err(|e| CodeexError::Payload(format!("Failed to read {}: {}", path.display(), e)))?;

    if !bytes.starts_with(b"%PDF") {
        return Err(CodeexError::Payload(format!(
            "{} does not look like a PDF document",
            path.display()
        ))
        .into());
    }

    let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
    Ok(format!("data:application/pdf;base64,{}", encoded))
}
