// src/main.rs
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{debug, error, info, warn};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::ai::cache::{CachedClassifier, DEFAULT_CAPACITY};
use crate::ai::connector::Classifier;
use crate::ai::inference_api::InferenceClient;
use crate::config::{Config, Endpoint};
use crate::report::Mode;
use crate::upload::UploadedImage;

mod ai;
mod config;
mod report;
mod upload;

#[derive(Parser)]
#[command(name = "image-verdict")]
#[command(about = "Gender classification and AI-image detection via hosted inference models", long_about = None)]
struct Cli {
    #[command(flatten)]
    endpoints: EndpointArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct EndpointArgs {
    /// Hugging Face API token (default: $HUGGINGFACE_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Gender model URL (default: $GENDER_MODEL_URL or the hosted model)
    #[arg(long, global = true)]
    gender_url: Option<String>,

    /// Detector model URL (default: $DETECTOR_MODEL_URL or the hosted model)
    #[arg(long, global = true)]
    detector_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify the gender of the person in an image
    Gender {
        /// Image file (jpg, jpeg or png)
        image: PathBuf,

        /// Print the raw records as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Detect whether an image is AI-generated
    Detect {
        /// Image file (jpg, jpeg or png)
        image: PathBuf,

        /// Print the raw records as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// One-line verdict: artificial or human
    IsArtificial {
        /// Image file (jpg, jpeg or png)
        image: PathBuf,
    },
    /// Run simple interactive mode
    Interactive {
        /// Results remembered for repeated images (0 disables)
        #[arg(long, default_value_t = DEFAULT_CAPACITY)]
        cache_size: usize,
    },
}

fn main() -> Result<ExitCode> {
    // Initialize logging
    env_logger::init_from_env(
        env_logger::Env::default().filter_or("RUST_LOG", "info")
    );

    let cli = Cli::parse();

    let config = Config::resolve(
        cli.endpoints.api_key,
        cli.endpoints.gender_url,
        cli.endpoints.detector_url,
    )
    .context("configuration error")?;
    info!("Using {:?}", config);

    let client = InferenceClient::new(config).context("failed to build HTTP client")?;

    match cli.command {
        Commands::Gender { image, json } => run_once(client, Mode::Gender, &image, json),
        Commands::Detect { image, json } => run_once(client, Mode::Detector, &image, json),
        Commands::IsArtificial { image } => run_once(client, Mode::IsArtificial, &image, false),
        Commands::Interactive { cache_size } => {
            let mut classifier = CachedClassifier::new(client, cache_size);
            let stdin = io::stdin();
            run_interactive_mode(&mut classifier, stdin.lock(), &mut io::stdout())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run_once(mut client: InferenceClient, mode: Mode, image: &Path, json: bool) -> Result<ExitCode> {
    let succeeded = run_classification(&mut client, mode, image, json, &mut io::stdout())?;
    Ok(if succeeded { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// One upload, one request, one rendered answer. Returns `false` when the
/// attempt failed; the failure has already been logged and shown.
fn run_classification<C: Classifier, W: Write>(
    classifier: &mut C,
    mode: Mode,
    image: &Path,
    json: bool,
    out: &mut W,
) -> Result<bool> {
    let upload = match UploadedImage::from_path(image) {
        Ok(upload) => upload,
        Err(e) => {
            error!("Could not load {}: {}", image.display(), e);
            writeln!(out, "{}", mode.failure_message())?;
            return Ok(false);
        }
    };

    // only the gender model gets a re-encoded image
    let outcome = match mode {
        Mode::Gender => match upload.normalized() {
            Ok(buffer) => {
                debug!("Sending {} bytes of JPEG for {}", buffer.len(), upload.name());
                classifier.classify(Endpoint::Gender, buffer.as_bytes())
            }
            Err(e) => {
                error!("Could not normalize {}: {}", upload.name(), e);
                writeln!(out, "{}", mode.failure_message())?;
                return Ok(false);
            }
        },
        Mode::Detector | Mode::IsArtificial => {
            classifier.classify(Endpoint::Detector, upload.raw_bytes())
        }
    };

    match outcome {
        Ok(result) => {
            writeln!(out, "\n{}", report::header(mode, chrono::Local::now()))?;
            writeln!(out, "{}", report::render_output(mode, &result, json)?)?;
            Ok(true)
        }
        Err(e) => {
            error!("Classification failed: {}", e);
            if e.is_retryable() {
                warn!("This may be temporary; try the same image again in a moment");
            }
            writeln!(out, "{}", mode.failure_message())?;
            Ok(false)
        }
    }
}

fn run_interactive_mode<C: Classifier, R: BufRead, W: Write>(
    classifier: &mut CachedClassifier<C>,
    mut input: R,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "AI Image Tools - Interactive Mode")?;
    writeln!(out, "=================================")?;

    let mut line = String::new();

    // Main menu loop
    loop {
        writeln!(out, "\nMain Menu:")?;
        writeln!(out, "1. {}", Mode::Gender.title())?;
        writeln!(out, "2. {}", Mode::Detector.title())?;
        writeln!(out, "3. {}", Mode::IsArtificial.title())?;
        writeln!(out, "4. Exit")?;
        write!(out, "\nEnter your choice (1-4): ")?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        let mode = match line.trim() {
            "1" => Mode::Gender,
            "2" => Mode::Detector,
            "3" => Mode::IsArtificial,
            "4" => {
                writeln!(out, "Exiting")?;
                break;
            }
            _ => {
                writeln!(out, "Invalid choice. Please enter a number between 1 and 4.")?;
                continue;
            }
        };

        write!(out, "Choose an image (jpg, jpeg, png) or leave empty to cancel: ")?;
        out.flush()?;

        line.clear();
        input.read_line(&mut line)?;
        let path = line.trim();
        if path.is_empty() {
            continue;
        }

        writeln!(out, "{}...", if mode == Mode::Gender { "Classifying" } else { "Analyzing" })?;
        run_classification(classifier, mode, Path::new(path), false, out)?;
    }

    info!(
        "Session finished: {} cached result(s), {} cache hit(s)",
        classifier.len(),
        classifier.hits()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::error::{ClassifyError, ClassifyResult};
    use crate::ai::record::{Classification, Record};
    use clap::CommandFactory;
    use image::{DynamicImage, ImageOutputFormat, RgbImage};
    use std::io::Cursor;

    struct FakeClassifier {
        seen: Vec<(Endpoint, Vec<u8>)>,
        response: fn() -> ClassifyResult<Classification>,
    }

    impl Classifier for FakeClassifier {
        fn classify(&mut self, endpoint: Endpoint, image_data: &[u8]) -> ClassifyResult<Classification> {
            self.seen.push((endpoint, image_data.to_vec()));
            (self.response)()
        }
    }

    fn write_png(dir: &Path) -> (PathBuf, Vec<u8>) {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(8, 8))
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .unwrap();
        let path = dir.join("face.png");
        std::fs::write(&path, &bytes).unwrap();
        (path, bytes)
    }

    fn female() -> ClassifyResult<Classification> {
        Classification::from_records(vec![Record::new("female", 0.91), Record::new("male", 0.09)])
    }

    fn unavailable() -> ClassifyResult<Classification> {
        Err(ClassifyError::EmptyResult)
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    fn fake(response: fn() -> ClassifyResult<Classification>) -> FakeClassifier {
        FakeClassifier { seen: Vec::new(), response }
    }

    fn classify_to_string(
        classifier: &mut FakeClassifier,
        mode: Mode,
        path: &Path,
        json: bool,
    ) -> (bool, String) {
        let mut out = Vec::new();
        let ok = run_classification(classifier, mode, path, json, &mut out).unwrap();
        (ok, String::from_utf8(out).unwrap())
    }

    fn interact(classifier: &mut CachedClassifier<FakeClassifier>, script: &str) -> String {
        let mut out = Vec::new();
        run_interactive_mode(classifier, Cursor::new(script.as_bytes()), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn gender_sends_normalized_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let (path, raw) = write_png(dir.path());
        let mut fake = fake(female);

        let (ok, printed) = classify_to_string(&mut fake, Mode::Gender, &path, false);
        assert!(ok);
        assert!(printed.contains("API Response:"));
        assert!(printed.contains("likely to be **female** with a score of 0.91."));

        let (endpoint, sent) = &fake.seen[0];
        assert_eq!(*endpoint, Endpoint::Gender);
        assert_ne!(sent, &raw);
        assert_eq!(image::guess_format(sent).unwrap(), image::ImageFormat::Jpeg);
    }

    #[test]
    fn detector_sends_raw_upload() {
        let dir = tempfile::tempdir().unwrap();
        let (path, raw) = write_png(dir.path());
        let mut fake = fake(female);

        let (ok, _) = classify_to_string(&mut fake, Mode::IsArtificial, &path, false);
        assert!(ok);
        assert_eq!(fake.seen[0], (Endpoint::Detector, raw));
    }

    #[test]
    fn json_flag_prints_record_array() {
        let dir = tempfile::tempdir().unwrap();
        let (path, _) = write_png(dir.path());
        let mut fake = fake(female);

        let (ok, printed) = classify_to_string(&mut fake, Mode::Detector, &path, true);
        assert!(ok);
        let body = &printed[printed.find('[').unwrap()..];
        let records: Vec<Record> = serde_json::from_str(body.trim()).unwrap();
        assert_eq!(records, vec![Record::new("female", 0.91), Record::new("male", 0.09)]);
        assert!(!printed.contains("API Response:"));
    }

    #[test]
    fn failures_do_not_propagate() {
        let dir = tempfile::tempdir().unwrap();
        let (path, _) = write_png(dir.path());
        let mut fake = fake(unavailable);

        let (ok, printed) = classify_to_string(&mut fake, Mode::Detector, &path, true);
        assert!(!ok);
        assert_eq!(printed.trim(), report::DETECTOR_FAILURE);

        let (ok, printed) =
            classify_to_string(&mut fake, Mode::Gender, &dir.path().join("missing.jpg"), false);
        assert!(!ok);
        assert_eq!(printed.trim(), report::GENDER_FAILURE);
        assert_eq!(fake.seen.len(), 1);
    }

    #[test]
    fn interactive_session_reuses_cached_result() {
        let dir = tempfile::tempdir().unwrap();
        let (path, _) = write_png(dir.path());
        let path = path.display();
        let script = format!("1\n{path}\n9\n1\n{path}\n3\n\n4\n");

        let mut classifier = CachedClassifier::new(fake(female), 8);
        let printed = interact(&mut classifier, &script);

        assert_eq!(classifier.inner().seen.len(), 1);
        assert_eq!(classifier.hits(), 1);
        assert_eq!(printed.matches("likely to be **female**").count(), 2);
        assert!(printed.contains("Invalid choice"));
        assert!(printed.trim_end().ends_with("Exiting"));
    }

    #[test]
    fn interactive_failure_keeps_the_loop_going() {
        let dir = tempfile::tempdir().unwrap();
        let (path, _) = write_png(dir.path());
        let script = format!("3\n{}\n2\n{}\n", path.display(), dir.path().join("nope.bmp").display());

        let mut classifier = CachedClassifier::new(fake(unavailable), 8);
        let printed = interact(&mut classifier, &script);

        // ends on EOF without an explicit exit
        assert_eq!(printed.matches(report::DETECTOR_FAILURE).count(), 2);
        assert_eq!(classifier.inner().seen.len(), 1);
        assert_eq!(classifier.len(), 0);
    }
}
