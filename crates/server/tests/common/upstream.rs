//! Scripted upstream source.

use async_trait::async_trait;
use std::sync::Mutex;
use tally_core::{FetchRange, RangeResponse};
use tally_upstream::{StatsSource, UpstreamError, UpstreamResult};

type Responder = Box<dyn Fn(&str, FetchRange) -> UpstreamResult<RangeResponse> + Send + Sync>;

/// A `StatsSource` answering from a closure and recording every request.
#[allow(dead_code)]
pub struct ScriptedSource {
    responder: Responder,
    calls: Mutex<Vec<(String, FetchRange)>>,
}

#[allow(dead_code)]
impl ScriptedSource {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&str, FetchRange) -> UpstreamResult<RangeResponse> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Reports `downloads` for every requested day.
    pub fn constant(downloads: i64) -> Self {
        Self::new(move |_, range| {
            Ok(RangeResponse::with_downloads(
                range.iter_days().map(|day| (day, downloads)),
            ))
        })
    }

    /// Reports no data for any range.
    pub fn no_data() -> Self {
        Self::new(|package, _| {
            Ok(RangeResponse::with_error(format!(
                "no stats for package {package} for this range (0008)"
            )))
        })
    }

    /// Answers every request with an HTTP status failure.
    pub fn failing(status: u16) -> Self {
        Self::new(move |_, _| {
            Err(UpstreamError::Status {
                status,
                body: "upstream down".to_string(),
            })
        })
    }

    /// Ranges requested so far, in order.
    pub fn calls(&self) -> Vec<(String, FetchRange)> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("calls lock poisoned").len()
    }
}

#[async_trait]
impl StatsSource for ScriptedSource {
    async fn fetch_range(
        &self,
        package: &str,
        range: FetchRange,
    ) -> UpstreamResult<RangeResponse> {
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .push((package.to_string(), range));
        (self.responder)(package, range)
    }
}
