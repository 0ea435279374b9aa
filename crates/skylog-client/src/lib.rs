//! Consumer side of the Skylog API: HTTP client, TTL cache and loaders.

pub mod api;
pub mod cache;
pub mod clock;
pub mod error;
pub mod loader;
pub mod storage;
pub mod summary;

pub use api::WeatherApiClient;
pub use cache::{CacheEntry, CacheRead, CacheWrite, TtlCache, DEFAULT_TTL_MS, HISTORY_CACHE_KEY};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ClientError, ClientResult};
pub use loader::{
    FetchMode, FixedLocation, HistoryLoader, HistoryOutcome, HistorySource, LoadedWeather,
    LocationSource, WeatherLoader, DEFAULT_CITY,
};
pub use storage::{CacheStorage, FileStorage, MemoryStorage, StorageError};
pub use summary::{HistoryEntry, WeatherSummary};
