use cam2ascii::camera::open_device;
use cam2ascii::cli::Args;
use cam2ascii::config::{Config, Settings};
use cam2ascii::error::AppError;
use cam2ascii::pipeline::Pipeline;
use cam2ascii::quit::QuitReason;
use cam2ascii::shutdown::{install_ctrlc_handler, Shutdown};
use clap::Parser;

fn main() {
    // Load .env before anything reads the environment (RUST_LOG included)
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    let code = match run(args) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    };
    std::process::exit(code);
}

fn run(args: Args) -> Result<(), AppError> {
    let config = Config::load(args.config.as_deref())?;
    let settings = Settings::resolve(&args, &config)?;
    log::debug!("Settings: {:?}", settings);

    let shutdown = Shutdown::new();
    install_ctrlc_handler(shutdown.clone())?;

    let device = open_device(&settings.device)?;
    let pipeline = Pipeline::prepare(&settings, device)?;
    eprintln!("{}", pipeline.format());

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| AppError::Task(format!("Failed to create async runtime: {}", e)))?;
    let result = rt.block_on(pipeline.run(
        std::io::stdout(),
        tokio::io::BufReader::new(tokio::io::stdin()),
        shutdown,
    ));
    // A pending stdin read would otherwise hold the runtime open.
    rt.shutdown_background();

    let report = result?;
    if report.quit == QuitReason::Requested {
        log::info!("Stopped by operator");
    }
    Ok(())
}
