/// Orchid Editor command-line entry point for native builds
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(e) = cli::run() {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

// Nothing to run on WASM, hosts use the library directly
#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::{Path, PathBuf};

    use clap::{Parser, Subcommand};
    use orchid_editor::save::{JsonFileSink, RecordList, SaveSink};
    use orchid_editor::script::{Script, ScriptError};
    use orchid_editor::{
        ConfigError, CropSize, EditorConfig, ExportError, FormatError, ImageEditor, ImageRecord,
        ImageSize, SaveStrategy, SnapshotCache, build_request,
    };

    #[derive(Parser)]
    #[command(name = "orchid-editor")]
    #[command(about = "Review and edit orchid detection boxes")]
    struct Cli {
        /// Configuration file (defaults to the user config directory)
        #[arg(long, value_name = "FILE", global = true)]
        config: Option<PathBuf>,

        #[command(subcommand)]
        command: Command,
    }

    #[derive(Subcommand)]
    enum Command {
        /// Replay an editing script against an analysed image
        Replay {
            /// Image record with its analysis
            #[arg(long, value_name = "JSON")]
            image: PathBuf,

            /// Events to replay
            #[arg(long, value_name = "JSON")]
            script: PathBuf,

            /// Where saved records are written (printed to stdout otherwise)
            #[arg(long, value_name = "JSON")]
            out: Option<PathBuf>,

            /// Image file to read the native size from
            #[arg(long, value_name = "FILE")]
            image_file: Option<PathBuf>,
        },

        /// Print the save request the backend needs to export a folder
        Export {
            /// Image records with their analysis
            #[arg(value_name = "JSON", required = true)]
            images: Vec<PathBuf>,

            /// global_best, global_all, custom_best or custom_all
            #[arg(long)]
            strategy: Option<SaveStrategy>,

            /// Minimum score in percent; drawn boxes always pass
            #[arg(long, value_name = "PERCENT")]
            threshold: Option<f32>,

            /// One directory per image instead of a flat archive
            #[arg(long)]
            organize: bool,

            /// Scale every crop, e.g. 256x512
            #[arg(long, value_name = "WxH")]
            resize: Option<CropSize>,

            /// Write the request here instead of stdout
            #[arg(long, value_name = "JSON")]
            out: Option<PathBuf>,
        },
    }

    #[derive(Debug, thiserror::Error)]
    pub enum CliError {
        #[error(transparent)]
        Config(#[from] ConfigError),

        #[error(transparent)]
        Script(#[from] ScriptError),

        #[error(transparent)]
        Format(#[from] FormatError),

        #[error(transparent)]
        Export(#[from] ExportError),

        #[error("JSON error: {0}")]
        Json(#[from] serde_json::Error),

        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),
    }

    pub fn run() -> Result<(), CliError> {
        let args = Cli::parse();

        let config = match &args.config {
            Some(path) => EditorConfig::load(path)?,
            None => EditorConfig::load_from_default_path().unwrap_or_default(),
        };
        env_logger::Builder::new()
            .filter_level(config.log_level.to_level_filter())
            .parse_default_env()
            .init();

        match args.command {
            Command::Replay {
                image,
                script,
                out,
                image_file,
            } => replay(&config, &image, &script, out, image_file.as_deref()),
            Command::Export {
                images,
                strategy,
                threshold,
                organize,
                resize,
                out,
            } => {
                let options = ExportOptions {
                    strategy,
                    threshold,
                    organize,
                    resize,
                };
                export(&config, &images, options, out.as_deref())
            }
        }
    }

    fn replay(
        config: &EditorConfig,
        image: &Path,
        script: &Path,
        out: Option<PathBuf>,
        image_file: Option<&Path>,
    ) -> Result<(), CliError> {
        let record = ImageRecord::load(image)?;
        let script = Script::load(script)?;

        let mut cache = SnapshotCache::new();
        let mut editor = ImageEditor::with_settings(record, &mut cache, config.editor);
        if let Some(path) = image_file {
            let (width, height) = image::image_dimensions(path).map_err(ScriptError::from)?;
            editor.set_image_size(ImageSize::new(width as f32, height as f32));
        }

        let to_stdout = out.is_none();
        let mut sink: Box<dyn SaveSink> = match out {
            Some(path) => Box::new(JsonFileSink::new(path)),
            None => Box::new(RecordList::default()),
        };
        let summary = script.replay(&mut editor, sink.as_mut())?;
        if summary.saves == 0 {
            log::warn!("Script never saved, nothing was written");
        }

        for conflict in editor.suggestions() {
            log::info!("Suggestion: {}", conflict.message);
        }
        if editor.has_unsaved_changes() {
            log::warn!("Script ended with unsaved changes");
        }

        if to_stdout {
            println!("{}", editor.record().to_json()?);
        }
        Ok(())
    }

    struct ExportOptions {
        strategy: Option<SaveStrategy>,
        threshold: Option<f32>,
        organize: bool,
        resize: Option<CropSize>,
    }

    fn export(
        config: &EditorConfig,
        images: &[PathBuf],
        options: ExportOptions,
        out: Option<&Path>,
    ) -> Result<(), CliError> {
        let records = images
            .iter()
            .map(|path| ImageRecord::load(path))
            .collect::<Result<Vec<_>, _>>()?;

        let strategy = options.strategy.unwrap_or(config.export.default_strategy);
        let threshold = options.threshold.or(config.export.default_threshold);
        let request = build_request(
            &records,
            strategy,
            threshold,
            options.organize,
            options.resize,
        )?;

        let json = serde_json::to_string_pretty(&request)?;
        match out {
            Some(path) => {
                std::fs::write(path, json)?;
                log::info!("Wrote save request to {:?}", path);
            }
            None => println!("{}", json),
        }
        Ok(())
    }
}
