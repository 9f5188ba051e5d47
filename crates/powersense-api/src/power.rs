// Period-average power endpoint

use tracing::debug;

use crate::client::TelemetryClient;
use crate::error::Error;
use crate::models::AvgPowerResponse;

impl TelemetryClient {
    /// Fetch the average power over the trailing `period_minutes` minutes.
    ///
    /// `GET /api/avg-power-consumption?period={minutes}`
    pub async fn fetch_avg_power(&self, period_minutes: u32) -> Result<AvgPowerResponse, Error> {
        let mut url = self.api_url("avg-power-consumption")?;
        url.query_pairs_mut()
            .append_pair("period", &period_minutes.to_string());
        debug!(period_minutes, "fetching period average power");
        self.get(url).await
    }
}
