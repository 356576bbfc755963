pub mod monitor;
pub mod notify;
mod parser;
pub mod poll;
pub mod scraper;
pub mod types;

pub use monitor::{Monitor, MonitorError};
pub use parser::{ParseError, parse_appointments};
pub use scraper::{ScraperError, WebScraper};
pub use types::Snapshot;

pub const DEFAULT_URL: &str = "https://www.sandiegocounty.gov/content/sdc/hhsa/programs/phs/community_epidemiology/dc/2019-nCoV/vaccines/vax-schedule-appointment.html";

pub const DEFAULT_KEY_FILE: &str = "api.txt";

pub const DEFAULT_SOUND_FILE: &str = "alert.mp3";
