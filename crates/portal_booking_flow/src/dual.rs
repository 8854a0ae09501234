// --- File: crates/portal_booking_flow/src/dual.rs ---
use crate::api::BookingApi;
use crate::calendar::{launch_min_date, CalendarMonth};
use crate::retry::RetryPolicy;
use crate::selection::{SelectionError, SelectionFlow};
use chrono::NaiveDate;
use std::sync::Arc;

/// Design meeting plus launch meeting.
///
/// The launch widget stays inert until the design meeting has a date and a
/// time; its earliest date follows the design date by seven days.
#[derive(Debug)]
pub struct DualSelection {
    design: SelectionFlow,
    launch: SelectionFlow,
}

impl DualSelection {
    pub fn new(api: Arc<dyn BookingApi>, view: CalendarMonth) -> Self {
        Self::from_flows(
            SelectionFlow::new(api.clone(), view),
            SelectionFlow::new(api, view),
        )
    }

    pub fn with_policy(
        api: Arc<dyn BookingApi>,
        view: CalendarMonth,
        policy: RetryPolicy,
    ) -> Self {
        Self::from_flows(
            SelectionFlow::new(api.clone(), view).with_policy(policy),
            SelectionFlow::new(api, view).with_policy(policy),
        )
    }

    pub fn from_flows(design: SelectionFlow, launch: SelectionFlow) -> Self {
        Self { design, launch }
    }

    pub fn design(&self) -> &SelectionFlow {
        &self.design
    }

    pub fn launch(&self) -> &SelectionFlow {
        &self.launch
    }

    pub fn launch_enabled(&self) -> bool {
        self.design.selected_date().is_some() && self.design.selected_time().is_some()
    }

    pub async fn show_design_month(&mut self, month: CalendarMonth) {
        self.design.show_month(month).await;
    }

    pub async fn select_design_date(&mut self, date: NaiveDate) -> Result<(), SelectionError> {
        self.design.select_date(date).await?;
        self.launch.set_min_date(Some(launch_min_date(date)));
        Ok(())
    }

    pub fn select_design_time(&mut self, datetime: &str) -> Result<String, SelectionError> {
        self.design.select_time(datetime)
    }

    /// Brings up the launch calendar on the month of its earliest date.
    pub async fn open_launch(&mut self) -> Result<(), SelectionError> {
        let min = self.launch_guard()?;
        let month = CalendarMonth::containing(min);
        if self.launch.view() != month || self.launch.dates().ready().is_none() {
            self.launch.show_month(month).await;
        }
        Ok(())
    }

    pub async fn show_launch_month(
        &mut self,
        month: CalendarMonth,
    ) -> Result<(), SelectionError> {
        self.launch_guard()?;
        self.launch.show_month(month).await;
        Ok(())
    }

    pub async fn select_launch_date(&mut self, date: NaiveDate) -> Result<(), SelectionError> {
        self.launch_guard()?;
        self.launch.select_date(date).await
    }

    /// Picks the launch slot; returns both datetimes once everything is chosen.
    pub fn select_launch_time(
        &mut self,
        datetime: &str,
    ) -> Result<Option<(String, String)>, SelectionError> {
        self.launch_guard()?;
        self.launch.select_time(datetime)?;
        Ok(self.selected_pair())
    }

    fn launch_guard(&self) -> Result<NaiveDate, SelectionError> {
        match (self.launch_enabled(), self.launch.min_date()) {
            (true, Some(min)) => Ok(min),
            _ => Err(SelectionError::LaunchInactive),
        }
    }

    /// `(design, launch)` datetimes when both meetings are fully chosen.
    pub fn selected_pair(&self) -> Option<(String, String)> {
        if !self.launch_enabled() {
            return None;
        }
        Some((
            self.design.selected_time()?.to_string(),
            self.launch.selected_time()?.to_string(),
        ))
    }

    pub fn reset(&mut self) {
        self.design.reset();
        self.launch.reset();
        self.launch.set_min_date(None);
    }
}
