//! Background fetching: one task per submission, run on the tokio runtime so
//! the window never blocks, with results marshalled back to the UI thread
//! over an mpsc channel.

use std::sync::Arc;
use std::sync::mpsc::Sender;

use tokio::runtime::Handle;
use weather_core::{FetchError, ForecastDay, IconCache, Units, WeatherClient, WeatherSnapshot};

/// Days shown in the forecast strip after dropping the "today" entry.
pub const FORECAST_STRIP_DAYS: usize = 7;

/// Everything one submission produced, ready for display.
#[derive(Debug)]
pub struct FetchResult {
    pub snapshot: WeatherSnapshot,
    pub forecast: Vec<ForecastDay>,
    /// Icon bytes downloaded for this result that the window has not turned
    /// into textures yet.
    pub icons: Vec<(String, Arc<Vec<u8>>)>,
}

/// Completion message for one submission.
#[derive(Debug)]
pub struct FetchDone {
    pub seq: u64,
    pub city: String,
    pub result: Result<FetchResult, FetchError>,
}

/// Admits only the newest submission's completion.
///
/// Submissions are numbered monotonically; a completion is applied only if
/// its number exceeds the highest applied so far, so a slow early request
/// can never overwrite a fresher result.
#[derive(Debug, Default)]
pub struct LatestGate {
    next_seq: u64,
    applied: Option<u64>,
}

impl LatestGate {
    /// Number for the next submission.
    pub fn issue(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Whether a completion with `seq` may be applied; records it if so.
    pub fn admit(&mut self, seq: u64) -> bool {
        if self.applied.is_some_and(|applied| applied >= seq) {
            return false;
        }
        self.applied = Some(seq);
        true
    }
}

/// Spawn the fetch task for one submission. The completion lands on `tx`
/// and `repaint` wakes the UI thread to drain it.
#[allow(clippy::too_many_arguments)]
pub fn spawn_fetch(
    runtime: &Handle,
    tx: Sender<FetchDone>,
    repaint: egui::Context,
    client: Arc<WeatherClient>,
    icons: IconCache,
    city: String,
    units: Units,
    seq: u64,
) {
    runtime.spawn(async move {
        let result = run_fetch(&client, &icons, &city, units).await;
        if let Err(err) = &result {
            tracing::warn!(city = %city, %err, "fetch failed");
        }
        if tx.send(FetchDone { seq, city, result }).is_ok() {
            repaint.request_repaint();
        }
    });
}

async fn run_fetch(
    client: &WeatherClient,
    icons: &IconCache,
    city: &str,
    units: Units,
) -> Result<FetchResult, FetchError> {
    let snapshot = client.current(city, units).await?;

    let forecast = match snapshot.coord {
        Some(coord) => client.forecast(coord, units).await?,
        // Without coordinates the forecast endpoint cannot be queried;
        // show the current conditions alone.
        None => Vec::new(),
    };

    // Drop today's row; the strip shows the following days.
    let forecast: Vec<ForecastDay> = forecast
        .into_iter()
        .skip(1)
        .take(FORECAST_STRIP_DAYS)
        .collect();

    let mut wanted: Vec<&str> = vec![snapshot.icon.as_str()];
    for day in &forecast {
        if !wanted.contains(&day.icon.as_str()) {
            wanted.push(day.icon.as_str());
        }
    }

    let mut fetched = Vec::with_capacity(wanted.len());
    for icon_id in wanted {
        let bytes = icons.get_or_fetch(client.http(), icon_id).await?;
        fetched.push((icon_id.to_string(), bytes));
    }

    Ok(FetchResult {
        snapshot,
        forecast,
        icons: fetched,
    })
}
