// Sensor snapshot endpoint
//
// Latest readings plus the four history series for a rolling window.

use tracing::debug;

use crate::client::TelemetryClient;
use crate::error::Error;
use crate::models::SensorDataResponse;

impl TelemetryClient {
    /// Fetch the latest sensor snapshot with histories over the last
    /// `interval_hours` hours.
    ///
    /// `GET /api/sensor-data?interval={hours}`
    pub async fn fetch_sensor_data(&self, interval_hours: u32) -> Result<SensorDataResponse, Error> {
        let mut url = self.api_url("sensor-data")?;
        url.query_pairs_mut()
            .append_pair("interval", &interval_hours.to_string());
        debug!(interval_hours, "fetching sensor data");
        self.get(url).await
    }
}
