use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use vaxwatch::monitor::Monitor;
use vaxwatch::notify::{AlertNotifier, AlertSound, Pushbullet};
use vaxwatch::scraper::WebScraper;

#[derive(Parser)]
#[command(name = "vaxwatch")]
#[command(
    about = "Watches the vaccine appointment page and alerts when openings change",
    long_about = None
)]
struct Cli {
    #[arg(
        value_name = "PUSH",
        help = "Pass the literal value True to send Pushbullet notifications"
    )]
    push: Option<String>,

    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "info",
        help = "Set the logging level"
    )]
    log_level: LogLevel,

    #[arg(long, default_value = vaxwatch::DEFAULT_URL, help = "Appointment page to poll")]
    url: String,

    #[arg(
        long,
        default_value = vaxwatch::DEFAULT_KEY_FILE,
        help = "File whose first line is the Pushbullet API key"
    )]
    key_file: PathBuf,

    #[arg(
        long,
        default_value = vaxwatch::DEFAULT_SOUND_FILE,
        help = "Sound played when appointments change"
    )]
    sound: PathBuf,

    #[arg(long, help = "Command used to play the sound, e.g. \"ffplay -nodisp -autoexit\"")]
    player: Option<String>,

    #[arg(long, help = "Do not play a sound on changes")]
    mute: bool,

    #[arg(
        long,
        default_value_t = 30,
        help = "Seconds to wait between polls",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    interval: u64,
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

impl Cli {
    fn push_enabled(&self) -> bool {
        self.push.as_deref() == Some("True")
    }

    fn alert_sound(&self) -> AlertSound {
        if self.mute {
            return AlertSound::muted();
        }
        let sound = AlertSound::new(&self.sound);
        match &self.player {
            Some(player) => sound.with_player(player),
            None => sound,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .init();

    let scraper = WebScraper::with_url(&cli.url).unwrap_or_else(|e| {
        log::error!("Error creating scraper: {}", e);
        process::exit(1);
    });

    let pushbullet = Pushbullet::new().unwrap_or_else(|e| {
        log::error!("Error creating Pushbullet client: {}", e);
        process::exit(1);
    });

    let mut notifier = AlertNotifier::new(cli.alert_sound(), pushbullet);
    if cli.push_enabled() {
        log::info!(
            "Push notifications enabled, key read from {}",
            cli.key_file.display()
        );
        notifier = notifier.with_push_key_file(&cli.key_file);
    }

    log::info!("Watching {}", cli.url);

    let monitor =
        Monitor::new(scraper, notifier).interval(Duration::from_secs(cli.interval));

    if let Err(e) = monitor.run().await {
        log::error!("Stopped watching: {}", e);
        process::exit(1);
    }
}
