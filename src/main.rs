use clap::Parser;
use rayon::ThreadPoolBuilder;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::exit;
use tracing::{error, info};
use validator::Validate;
use zipkeep::backup::backup_config::BackupConfig;
use zipkeep::backup::result_error::error::Error;
use zipkeep::backup::result_error::WithMsg;
use zipkeep::backup::runner::RunContext;

/// Simple program to create zipped backups and delete old versions
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Location of config file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,
}

fn main() {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let pool = ThreadPoolBuilder::new().build().unwrap();

    let ctx = File::open(&args.config)
        .map_err(Error::from)
        .with_msg(format!("Reading config failed: {:?}", &args.config))
        .and_then(|f| {
            serde_yml::from_reader::<_, BackupConfig>(f)
                .map_err(Error::from)
                .with_msg(format!("Parse YAML config failed: {:?}", &args.config))
        })
        .and_then(|bc| {
            bc.validate()
                .map_err(Error::from)
                .map(|_| bc)
                .with_msg(format!("Config validation failed: {:?}", &args.config))
        })
        .and_then(|bc| RunContext::new(bc, Path::new(".")));

    let ctx = match ctx {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("{e}");
            exit(1);
        }
    };

    let encryptor = ctx.config().encryptor.clone();
    let report = ctx.run(encryptor.as_ref(), &pool);
    info!(
        "Run complete: {} ok, {} skipped, {} failed",
        report.ok_count(),
        report.skipped_count(),
        report.failed_count()
    );
}
