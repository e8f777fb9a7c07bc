use anyhow::Result;
use clap::{Parser, ValueEnum};
use jmxdump::config::Config;
use jmxdump::error::DumpError;
use jmxdump::jolokia::{format_jolokia_error, Credentials, JolokiaClient, JolokiaSettings};
use jmxdump::mbean::{DumpOptions, Dumper, SerializeOptions, WriterSink};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Display a JSON formatted dictionary of all the attributes and their values
/// of all MBeans of a domain, or of all domains if no domain is given
#[derive(Parser, Debug)]
#[command(name = "jmxdump", version = jmxdump::VERSION, about, long_about = None)]
struct Args {
    /// Domain to dump (defaults to the session domain, then all domains)
    domain: Option<String>,

    /// Jolokia agent URL
    #[arg(short, long)]
    url: Option<String>,

    /// User for agent basic authentication
    #[arg(long)]
    user: Option<String>,

    /// Password for agent basic authentication
    #[arg(long)]
    password: Option<String>,

    /// Keep only numeric values
    #[arg(short, long)]
    values_only: bool,

    /// Number of MBeans fetched at once
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// HTTP timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Save the given domain as the session default
    #[arg(long, requires = "domain")]
    remember_domain: bool,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Cannot open log file {:?}: {}", log_path, e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("jmxdump {} started with log level: {:?}", jmxdump::VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("jmxdump").join("jmxdump.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".jmxdump").join("jmxdump.log");
    }
    PathBuf::from("jmxdump.log")
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("Dump failed: {:?}", err);
            eprintln!("Error: {}", describe_error(&err));
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> Result<()> {
    let mut config = Config::load();

    if args.remember_domain {
        if let Some(domain) = &args.domain {
            config.set_default_domain(domain)?;
            tracing::info!("Session default domain set to {}", domain);
        }
    }

    let url = config.effective_url(args.url.as_deref());
    let credentials = config
        .effective_user(args.user.as_deref())
        .map(|user| Credentials {
            user,
            password: config.effective_password(args.password.as_deref()),
        });
    let settings = JolokiaSettings {
        url,
        credentials,
        timeout: Duration::from_secs(config.effective_timeout_secs(args.timeout)),
    };

    let client = JolokiaClient::new(&settings)?;
    tracing::info!("Using agent: {}", client.url());

    let options = DumpOptions {
        domain: args.domain.clone(),
        default_domain: config.default_domain.clone(),
        serialize: SerializeOptions {
            values_only: args.values_only,
            max_depth: config.effective_max_depth(),
        },
        concurrency: config.effective_concurrency(args.concurrency),
    };

    let mut sink = WriterSink::stdout();
    Dumper::new(&client, options).run(&mut sink).await?;

    Ok(())
}

/// User-facing message for a failed run
fn describe_error(err: &anyhow::Error) -> String {
    if let Some(dump_error) = err.downcast_ref::<DumpError>() {
        let source = match dump_error {
            DumpError::DirectoryUnavailable(source) | DumpError::ConnectionLost(source) => source,
        };
        return format!("{} ({})", dump_error_title(dump_error), format_jolokia_error(source));
    }
    if let Some(fetch_error) = err.downcast_ref::<jmxdump::error::FetchError>() {
        return format_jolokia_error(fetch_error);
    }
    format!("{:#}", err)
}

fn dump_error_title(err: &DumpError) -> &'static str {
    match err {
        DumpError::DirectoryUnavailable(_) => "Cannot list MBeans",
        DumpError::ConnectionLost(_) => "Connection lost",
    }
}
