#[cfg(test)]
mod tests {
    use crate::api::{BookingApi, ClientError, MockBookingApi};
    use crate::submission::{
        BookingStep, ContactForm, SubmissionError, SubmissionFlow, BOOKING_TIMEZONE,
        NO_SELECTION_MESSAGE,
    };
    use async_trait::async_trait;
    use portal_common::models::{
        AppointmentDetails, AppointmentType, AvailabilityDate, BookingConfirmation,
        BookingRequest, CheckAvailabilityResponse, TimeSlot, BOOKING_CONFIRMED_MESSAGE,
    };
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    const SLOT: &str = "2024-03-05T09:00:00-0600";

    fn form() -> ContactForm {
        ContactForm {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            phone: "5551234567".into(),
            notes: Some(String::new()),
        }
    }

    fn confirmation() -> BookingConfirmation {
        BookingConfirmation {
            appointment_id: 1234,
            datetime: SLOT.into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            phone: "5551234567".into(),
            message: BOOKING_CONFIRMED_MESSAGE.into(),
        }
    }

    #[tokio::test]
    async fn successful_booking_reaches_confirmation() {
        let mut api = MockBookingApi::new();
        api.expect_create_appointment()
            .times(1)
            .returning(|request| {
                assert_eq!(request.datetime, SLOT);
                assert_eq!(request.timezone, BOOKING_TIMEZONE);
                assert_eq!(request.notes, None);
                Ok(confirmation())
            });

        let mut flow = SubmissionFlow::new(Arc::new(api));
        flow.choose_datetime(SLOT);
        assert_eq!(flow.step(), BookingStep::Form);
        assert!(flow.can_go_back());

        let booked = flow.submit(form()).await.unwrap();
        assert_eq!(booked.appointment_id, 1234);
        assert_eq!(flow.step(), BookingStep::Confirm);
        assert_eq!(flow.error(), None);
        assert!(!flow.is_submitting());

        flow.schedule_another();
        assert_eq!(flow.step(), BookingStep::Select);
        assert_eq!(flow.selected_datetime(), None);
        assert!(flow.confirmation().is_none());
        assert_eq!(flow.form(), &ContactForm::default());
    }

    #[tokio::test]
    async fn rejected_booking_keeps_the_form() {
        let mut api = MockBookingApi::new();
        api.expect_create_appointment().times(1).returning(|_| {
            Err(ClientError::Status {
                status: 422,
                message: "The requested time slot is no longer available".into(),
            })
        });

        let mut flow = SubmissionFlow::new(Arc::new(api));
        flow.choose_datetime(SLOT);
        let err = flow.submit(form()).await.unwrap_err();

        assert_eq!(
            err,
            SubmissionError::Rejected("The requested time slot is no longer available".into())
        );
        assert_eq!(
            flow.error(),
            Some("The requested time slot is no longer available")
        );
        assert_eq!(flow.step(), BookingStep::Form);
        assert_eq!(flow.form(), &form());
        assert!(!flow.is_submitting());
    }

    #[tokio::test]
    async fn invalid_phone_never_reaches_the_server() {
        let mut api = MockBookingApi::new();
        api.expect_create_appointment().times(0);

        let mut flow = SubmissionFlow::new(Arc::new(api));
        flow.choose_datetime(SLOT);
        let mut bad = form();
        bad.phone = "555-1234".into();
        bad.email = "not-an-email".into();

        match flow.submit(bad.clone()).await {
            Err(SubmissionError::InvalidForm(errors)) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
                assert_eq!(fields, vec!["email", "phone"]);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(flow.form(), &bad);
    }

    #[tokio::test]
    async fn submitting_without_a_slot_is_guarded() {
        let mut api = MockBookingApi::new();
        api.expect_create_appointment().times(0);

        let mut flow = SubmissionFlow::new(Arc::new(api));
        flow.choose_datetime(SLOT);
        flow.back();
        assert_eq!(flow.step(), BookingStep::Select);
        assert_eq!(flow.selected_datetime(), None);

        let err = flow.submit(form()).await.unwrap_err();
        assert_eq!(err, SubmissionError::NoSelection);
        assert_eq!(flow.error(), Some(NO_SELECTION_MESSAGE));
    }

    #[tokio::test]
    async fn only_the_design_meeting_is_booked() {
        let mut api = MockBookingApi::new();
        api.expect_create_appointment()
            .times(1)
            .returning(|request| {
                assert_eq!(request.datetime, SLOT);
                Ok(confirmation())
            });

        let mut flow = SubmissionFlow::new(Arc::new(api));
        flow.choose_meetings(SLOT, "2024-03-12T09:00:00-0600");
        flow.submit(form()).await.unwrap();

        assert_eq!(flow.launch_datetime(), Some("2024-03-12T09:00:00-0600"));
        let closed = flow.close();
        assert_eq!(closed.confirmation.unwrap().appointment_id, 1234);
    }

    /// Never answers the first booking; books every later one.
    #[derive(Default)]
    struct HangsOnce {
        bookings: AtomicU32,
    }

    #[async_trait]
    impl BookingApi for HangsOnce {
        async fn appointment_type(&self) -> Result<AppointmentType, ClientError> {
            unimplemented!()
        }

        async fn available_dates(
            &self,
            _month: &str,
        ) -> Result<Vec<AvailabilityDate>, ClientError> {
            unimplemented!()
        }

        async fn available_times(&self, _date: &str) -> Result<Vec<TimeSlot>, ClientError> {
            unimplemented!()
        }

        async fn create_appointment(
            &self,
            _request: BookingRequest,
        ) -> Result<BookingConfirmation, ClientError> {
            if self.bookings.fetch_add(1, Ordering::SeqCst) == 0 {
                std::future::pending::<()>().await;
            }
            Ok(confirmation())
        }

        async fn appointment(&self, _id: &str) -> Result<AppointmentDetails, ClientError> {
            unimplemented!()
        }

        async fn check_availability(
            &self,
            _datetime: Option<String>,
        ) -> Result<CheckAvailabilityResponse, ClientError> {
            unimplemented!()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_submission_does_not_lock_the_form() {
        let api = Arc::new(HangsOnce::default());
        let mut flow = SubmissionFlow::new(api.clone());
        flow.choose_datetime(SLOT);

        let abandoned = tokio::time::timeout(Duration::from_secs(5), flow.submit(form())).await;
        assert!(abandoned.is_err());
        assert!(!flow.is_submitting());

        flow.schedule_another();
        flow.choose_datetime(SLOT);
        let booked = flow.submit(form()).await.unwrap();
        assert_eq!(booked.appointment_id, 1234);
        assert_eq!(api.bookings.load(Ordering::SeqCst), 2);
        assert_eq!(flow.step(), BookingStep::Confirm);
    }
}
