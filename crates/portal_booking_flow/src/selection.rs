// --- File: crates/portal_booking_flow/src/selection.rs ---
//! One calendar widget: month view, date pick and time-slot pick.
//!
//! Fetches are split into `begin_*` (bumps the widget's ticket and marks the
//! state loading), a load through [`Loader`] that does not borrow the flow,
//! and `apply_*`. A response is only applied while its ticket is the latest
//! one issued, so the most recently requested month or date always wins
//! regardless of arrival order.

use crate::api::{BookingApi, ClientError};
use crate::calendar::{available_set, format_date, is_selectable, CalendarMonth};
use crate::retry::RetryPolicy;
use chrono::NaiveDate;
use portal_common::models::{AvailabilityDate, TimeSlot};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

pub const NO_AVAILABILITY_MESSAGE: &str =
    "No availability for this date. Please select another date.";

#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchState<T> {
    #[default]
    Idle,
    Loading,
    /// Retries are spent; the message is shown with a "try again" action.
    Error(String),
    Ready(T),
}

impl<T> FetchState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            FetchState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Error(message) => Some(message),
            _ => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SelectionError {
    #[error("{0} is not available")]
    DateUnavailable(String),

    #[error("Select a date first")]
    NoDateSelected,

    #[error("{0} is not an offered time slot")]
    SlotUnavailable(String),

    #[error("Select the design meeting date and time first")]
    LaunchInactive,
}

pub type ErrorCallback = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub struct DatesRequest {
    ticket: u64,
    pub month: CalendarMonth,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatesOutcome {
    ticket: u64,
    pub month: CalendarMonth,
    pub result: Result<Vec<AvailabilityDate>, ClientError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimesRequest {
    ticket: u64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimesOutcome {
    ticket: u64,
    pub date: NaiveDate,
    pub result: Result<Vec<TimeSlot>, ClientError>,
}

/// Performs a widget's fetches under its retry policy.
#[derive(Clone)]
pub struct Loader {
    api: Arc<dyn BookingApi>,
    policy: RetryPolicy,
}

impl Loader {
    pub async fn dates(&self, request: DatesRequest) -> DatesOutcome {
        let month = request.month.to_string();
        let result = self
            .policy
            .run(|| self.api.available_dates(&month), ClientError::is_retryable)
            .await;
        DatesOutcome {
            ticket: request.ticket,
            month: request.month,
            result,
        }
    }

    pub async fn times(&self, request: TimesRequest) -> TimesOutcome {
        let date = format_date(request.date);
        let result = self
            .policy
            .run(|| self.api.available_times(&date), ClientError::is_retryable)
            .await;
        TimesOutcome {
            ticket: request.ticket,
            date: request.date,
            result,
        }
    }
}

/// A rendered grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub selectable: bool,
    pub selected: bool,
}

pub struct SelectionFlow {
    loader: Loader,
    view: CalendarMonth,
    min_date: Option<NaiveDate>,
    dates: FetchState<Vec<AvailabilityDate>>,
    available: HashSet<NaiveDate>,
    selected_date: Option<NaiveDate>,
    times: FetchState<Vec<TimeSlot>>,
    selected_time: Option<String>,
    dates_ticket: u64,
    times_ticket: u64,
    on_error: Option<ErrorCallback>,
}

impl std::fmt::Debug for SelectionFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionFlow")
            .field("view", &self.view)
            .field("min_date", &self.min_date)
            .field("dates", &self.dates)
            .field("selected_date", &self.selected_date)
            .field("times", &self.times)
            .field("selected_time", &self.selected_time)
            .finish()
    }
}

impl SelectionFlow {
    pub fn new(api: Arc<dyn BookingApi>, view: CalendarMonth) -> Self {
        Self {
            loader: Loader {
                api,
                policy: RetryPolicy::default(),
            },
            view,
            min_date: None,
            dates: FetchState::Idle,
            available: HashSet::new(),
            selected_date: None,
            times: FetchState::Idle,
            selected_time: None,
            dates_ticket: 0,
            times_ticket: 0,
            on_error: None,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.loader.policy = policy;
        self
    }

    /// Called with the final message once a fetch has exhausted its retries.
    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(callback));
        self
    }

    pub fn loader(&self) -> Loader {
        self.loader.clone()
    }

    pub fn view(&self) -> CalendarMonth {
        self.view
    }

    pub fn min_date(&self) -> Option<NaiveDate> {
        self.min_date
    }

    pub fn dates(&self) -> &FetchState<Vec<AvailabilityDate>> {
        &self.dates
    }

    pub fn times(&self) -> &FetchState<Vec<TimeSlot>> {
        &self.times
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.selected_date
    }

    pub fn selected_time(&self) -> Option<&str> {
        self.selected_time.as_deref()
    }

    /// True when the slot list for the selected date came back empty.
    pub fn no_availability(&self) -> bool {
        self.times.ready().is_some_and(Vec::is_empty)
    }

    /// The notice shown in place of the slot list when the day has none.
    pub fn empty_slots_message(&self) -> Option<&'static str> {
        self.no_availability().then_some(NO_AVAILABILITY_MESSAGE)
    }

    fn report(&self, message: &str) {
        if let Some(callback) = &self.on_error {
            callback(message);
        }
    }

    pub fn is_selectable(&self, date: NaiveDate) -> bool {
        is_selectable(date, self.view, &self.available, self.min_date)
    }

    /// The days of the shown month in grid order, after the leading blanks.
    pub fn cells(&self) -> Vec<Option<DayCell>> {
        self.view
            .grid()
            .into_iter()
            .map(|cell| {
                cell.map(|date| DayCell {
                    date,
                    selectable: self.is_selectable(date),
                    selected: self.selected_date == Some(date),
                })
            })
            .collect()
    }

    fn clear_date(&mut self) {
        self.selected_date = None;
        self.selected_time = None;
        self.times = FetchState::Idle;
        // Invalidate any slot fetch still in flight.
        self.times_ticket += 1;
    }

    /// Sets the earliest selectable date. A selected date before it is dropped.
    pub fn set_min_date(&mut self, min_date: Option<NaiveDate>) {
        self.min_date = min_date;
        if let (Some(selected), Some(min)) = (self.selected_date, min_date) {
            if selected < min {
                self.clear_date();
            }
        }
    }

    pub fn begin_month(&mut self, month: CalendarMonth) -> DatesRequest {
        self.dates_ticket += 1;
        self.view = month;
        self.dates = FetchState::Loading;
        self.available.clear();
        DatesRequest {
            ticket: self.dates_ticket,
            month,
        }
    }

    /// Applies a month fetch. Returns false for a superseded response.
    pub fn apply_dates(&mut self, outcome: DatesOutcome) -> bool {
        if outcome.ticket != self.dates_ticket {
            debug!("discarding stale availability for {}", outcome.month);
            return false;
        }
        match outcome.result {
            Ok(dates) => {
                self.available = available_set(&dates);
                self.dates = FetchState::Ready(dates);
            }
            Err(err) => {
                self.dates = FetchState::Error(err.message().to_string());
                self.report(err.message());
            }
        }
        true
    }

    pub async fn show_month(&mut self, month: CalendarMonth) {
        let request = self.begin_month(month);
        let outcome = self.loader.dates(request).await;
        self.apply_dates(outcome);
    }

    pub async fn next_month(&mut self) {
        self.show_month(self.view.next()).await;
    }

    pub async fn previous_month(&mut self) {
        self.show_month(self.view.previous()).await;
    }

    /// The "try again" action for the month view.
    pub async fn retry_dates(&mut self) {
        self.show_month(self.view).await;
    }

    /// Picks a date, dropping any chosen slot, and marks its slots loading.
    pub fn begin_date(&mut self, date: NaiveDate) -> Result<TimesRequest, SelectionError> {
        if !self.is_selectable(date) {
            return Err(SelectionError::DateUnavailable(format_date(date)));
        }
        self.selected_date = Some(date);
        self.selected_time = None;
        self.times = FetchState::Loading;
        self.times_ticket += 1;
        Ok(TimesRequest {
            ticket: self.times_ticket,
            date,
        })
    }

    pub fn apply_times(&mut self, outcome: TimesOutcome) -> bool {
        if outcome.ticket != self.times_ticket {
            debug!("discarding stale slots for {}", outcome.date);
            return false;
        }
        match outcome.result {
            Ok(times) => self.times = FetchState::Ready(times),
            Err(err) => {
                self.times = FetchState::Error(err.message().to_string());
                self.report(err.message());
            }
        }
        true
    }

    pub async fn select_date(&mut self, date: NaiveDate) -> Result<(), SelectionError> {
        let request = self.begin_date(date)?;
        let outcome = self.loader.times(request).await;
        self.apply_times(outcome);
        Ok(())
    }

    /// The "try again" action for the slot list.
    pub async fn retry_times(&mut self) -> Result<(), SelectionError> {
        let date = self.selected_date.ok_or(SelectionError::NoDateSelected)?;
        self.select_date(date).await
    }

    /// Picks one of the offered slots and returns its datetime.
    pub fn select_time(&mut self, datetime: &str) -> Result<String, SelectionError> {
        if self.selected_date.is_none() {
            return Err(SelectionError::NoDateSelected);
        }
        let offered = self
            .times
            .ready()
            .is_some_and(|slots| slots.iter().any(|s| s.datetime == datetime));
        if !offered {
            return Err(SelectionError::SlotUnavailable(datetime.to_string()));
        }
        self.selected_time = Some(datetime.to_string());
        Ok(datetime.to_string())
    }

    /// Drops date and time selection; the month view stays.
    pub fn reset(&mut self) {
        self.clear_date();
    }
}
