//! Batched Hauki opening hours fetching.

use std::collections::HashMap;

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use search_ingest_shared::{camelize, LinkedData, OpeningHours, OpeningHoursDay, OpeningHoursTimes};

use super::range::{subtract_all, DateTimeRange, Interval};
use crate::transport::{Transport, TransportError};

pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const NUMBER_OF_DAYS_TO_FETCH: u64 = 7;
pub const DEFAULT_TIME_ZONE: Tz = chrono_tz::Europe::Helsinki;

const RESOURCE_PREFIX: &str = "tprek";
const HAUKI_SERVICE: &str = "hauki";

/// Fetches venue opening hours in batches.
///
/// Construct it with every venue id that will be asked for, then call
/// [`get_opening_hours_and_link`](Self::get_opening_hours_and_link) once per
/// venue. Asking in the same order as the id list makes `N` venues cost
/// `ceil(N / batch_size)` requests.
pub struct OpeningHoursFetcher {
    transport: Transport,
    base_url: String,
    all_ids: Vec<String>,
    batch_size: usize,
    today: Option<NaiveDate>,
    cache: HashMap<String, Value>,
}

impl OpeningHoursFetcher {
    pub fn new<I, S>(transport: Transport, base_url: impl Into<String>, all_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        Self {
            transport,
            base_url: base_url.into(),
            all_ids: all_ids.into_iter().map(|id| id.to_string()).collect(),
            batch_size: DEFAULT_BATCH_SIZE,
            today: None,
            cache: HashMap::new(),
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Fix the first fetched day instead of using the local date.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn resource_url(&self, id: &str) -> String {
        format!("{}resource/{}:{}/", self.base_url, RESOURCE_PREFIX, id)
    }

    /// Opening hours of one venue plus the provenance of the raw data.
    ///
    /// Fetch failures are soft: the returned opening hours carry the URLs
    /// but no data, and the link is `None`.
    pub async fn get_opening_hours_and_link(
        &mut self,
        id: &str,
    ) -> (OpeningHours, Option<LinkedData>) {
        let resource_url = self.resource_url(id);
        let mut opening_hours = OpeningHours::empty(
            format!("{}opening_hours/", resource_url),
            format!("{}is_open_now/", resource_url),
        );

        let raw = match self.opening_hours_for(id).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(venue_id = %id, error = %e, "Could not fetch opening hours");
                return (opening_hours, None);
            }
        };

        let days: Vec<OpeningHoursDay> = match serde_json::from_value(raw.clone()) {
            Ok(days) => days,
            Err(e) => {
                warn!(venue_id = %id, error = %e, "Unexpected opening hours data");
                return (opening_hours, None);
            }
        };

        opening_hours.open_ranges = open_ranges(&days, DEFAULT_TIME_ZONE)
            .iter()
            .map(DateTimeRange::as_opening_hours_times_range)
            .collect();
        opening_hours.data = match camelize(raw.clone()) {
            Value::Array(days) => days,
            _ => Vec::new(),
        };

        let link = LinkedData::new(HAUKI_SERVICE, opening_hours.url.clone(), raw);
        (opening_hours, Some(link))
    }

    async fn opening_hours_for(&mut self, id: &str) -> Result<Value, TransportError> {
        if !self.cache.contains_key(id) {
            self.cache = self.fetch_next_batch(id).await?;
        }
        Ok(self.cache.get(id).cloned().unwrap_or_else(|| Value::Array(Vec::new())))
    }

    async fn fetch_next_batch(
        &mut self,
        start_id: &str,
    ) -> Result<HashMap<String, Value>, TransportError> {
        let ids = match self.all_ids.iter().position(|id| id == start_id) {
            Some(index) => {
                let end = (index + self.batch_size).min(self.all_ids.len());
                self.all_ids[index..end].to_vec()
            }
            None => {
                warn!(venue_id = %start_id, "Venue not in the id list, fetching it alone");
                self.all_ids.push(start_id.to_string());
                vec![start_id.to_string()]
            }
        };
        self.fetch(&ids).await
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn fetch(&self, ids: &[String]) -> Result<HashMap<String, Value>, TransportError> {
        let today = self
            .today
            .unwrap_or_else(|| Utc::now().with_timezone(&DEFAULT_TIME_ZONE).date_naive());
        let end_date = today + Days::new(NUMBER_OF_DAYS_TO_FETCH);
        let resources = ids
            .iter()
            .map(|id| format!("{}:{}", RESOURCE_PREFIX, id))
            .collect::<Vec<_>>()
            .join(",");

        let endpoint = format!("{}opening_hours/", self.base_url);
        let mut url = Url::parse(&endpoint)
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {}", endpoint, e)))?;
        url.query_pairs_mut()
            .append_pair("start_date", &today.to_string())
            .append_pair("end_date", &end_date.to_string())
            .append_pair("resource", &resources);

        let response = self.transport.request_json(url.as_str()).await?;

        let mut by_origin: HashMap<String, Value> = HashMap::new();
        for result in response.get("results").and_then(Value::as_array).into_iter().flatten() {
            if let Some(origin_id) = origin_id(result) {
                let hours = result
                    .get("opening_hours")
                    .cloned()
                    .unwrap_or(Value::Array(Vec::new()));
                by_origin.insert(origin_id, hours);
            }
        }
        debug!(requested = ids.len(), found = by_origin.len(), "Fetched opening hours batch");

        Ok(ids
            .iter()
            .map(|id| {
                let hours = by_origin.get(id).cloned().unwrap_or(Value::Array(Vec::new()));
                (id.clone(), hours)
            })
            .collect())
    }
}

/// Id of the resource in the unit registry, from its `origins` list.
fn origin_id(result: &Value) -> Option<String> {
    result
        .get("resource")?
        .get("origins")?
        .as_array()?
        .iter()
        .find(|origin| {
            origin.pointer("/data_source/id").and_then(Value::as_str) == Some(RESOURCE_PREFIX)
        })
        .and_then(|origin| match origin.get("origin_id")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

/// Open ranges of the given days: open windows minus closed windows.
pub fn open_ranges(days: &[OpeningHoursDay], time_zone: Tz) -> Vec<DateTimeRange> {
    let mut open = Vec::new();
    let mut closed = Vec::new();

    for day in days {
        for times in &day.times {
            let is_open = match times.resource_state.as_deref() {
                Some("open") => true,
                Some("closed") => false,
                _ => continue,
            };
            if let Some(range) = window_range(day.date, times, time_zone) {
                if is_open {
                    open.push(range);
                } else {
                    closed.push(range);
                }
            }
        }
    }

    subtract_all(open, &closed)
}

/// Absolute range of one window, or `None` when it is empty or malformed.
fn window_range(
    date: NaiveDate,
    times: &OpeningHoursTimes,
    time_zone: Tz,
) -> Option<DateTimeRange> {
    let next_day = date.checked_add_days(Days::new(1))?;

    let (start, end) = if times.full_day {
        (date.and_time(NaiveTime::MIN), next_day.and_time(NaiveTime::MIN))
    } else {
        let start_time = parse_time(times.start_time.as_deref()?)?;
        let end_time = parse_time(times.end_time.as_deref()?)?;
        if start_time == end_time {
            return None;
        }
        let end_date = if times.end_time_on_next_day { next_day } else { date };
        (date.and_time(start_time), end_date.and_time(end_time))
    };

    Interval::new(localize(time_zone, start)?, localize(time_zone, end)?)
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}

/// Local wall-clock time to an absolute time. Times skipped by a DST
/// transition move forward by an hour.
fn localize(time_zone: Tz, local: NaiveDateTime) -> Option<chrono::DateTime<Tz>> {
    time_zone
        .from_local_datetime(&local)
        .earliest()
        .or_else(|| time_zone.from_local_datetime(&(local + chrono::Duration::hours(1))).earliest())
}
