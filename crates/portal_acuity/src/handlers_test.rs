#[cfg(test)]
mod tests {
    use crate::relay::{MockRelay, RelayError, RelayMethod};
    use crate::routes::routes;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use portal_config::{AcuityConfig, AppConfig};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn configured() -> AppConfig {
        AppConfig {
            acuity: AcuityConfig {
                user_id: Some("1234".into()),
                api_key: Some("key".into()),
                appointment_type_id: Some("777".into()),
                calendar_id: Some("888".into()),
                timezone: Some("America/Chicago".into()),
                ..AcuityConfig::default()
            },
            ..AppConfig::default()
        }
    }

    fn app(config: AppConfig, relay: MockRelay) -> Router {
        routes(Arc::new(config), Arc::new(relay))
    }

    /// A relay that fails the test if anything reaches the provider.
    fn untouched_relay() -> MockRelay {
        let mut relay = MockRelay::new();
        relay.expect_send().times(0);
        relay
    }

    fn api_error(status_code: u16, message: &str) -> RelayError {
        RelayError::Api {
            status_code,
            message: message.to_string(),
            error: json!({ "message": message }),
        }
    }

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn booking_body(phone: &str) -> Value {
        json!({
            "datetime": "2024-03-05T09:00:00-0600",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com",
            "phone": phone,
            "timezone": "America/Chicago"
        })
    }

    #[tokio::test]
    async fn dates_are_relayed_with_configured_ids() {
        let mut relay = MockRelay::new();
        relay
            .expect_send()
            .times(1)
            .returning(|endpoint, request| {
                assert_eq!(endpoint, "/availability/dates");
                assert_eq!(request.method, RelayMethod::Get);
                assert_eq!(request.param_value("appointmentTypeID"), Some("777"));
                assert_eq!(request.param_value("month"), Some("2024-03"));
                assert_eq!(request.param_value("timezone"), Some("America/Chicago"));
                assert_eq!(request.param_value("calendarID"), Some("888"));
                Ok(json!(["2024-03-05", "2024-03-06"]))
            });

        let (status, body) = call(
            app(configured(), relay),
            get("/booking/availability/dates?month=2024-03"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"dates": [
                {"date": "2024-03-05", "available": true},
                {"date": "2024-03-06", "available": true}
            ]})
        );
    }

    #[tokio::test]
    async fn malformed_month_never_reaches_the_provider() {
        for uri in [
            "/booking/availability/dates?month=2024-1",
            "/booking/availability/dates?month=abcd-ef",
            "/booking/availability/dates",
        ] {
            let (status, body) = call(app(configured(), untouched_relay()), get(uri)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(body["error"], "Invalid request");
            assert_eq!(body["message"], "Month must be YYYY-MM format");
        }
    }

    #[tokio::test]
    async fn incomplete_config_fails_with_500() {
        let mut config = configured();
        config.acuity.calendar_id = None;

        let (status, body) = call(
            app(config, untouched_relay()),
            get("/booking/availability/times?date=2024-03-05"),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({"error": "Server configuration error", "message": "Acuity configuration incomplete"})
        );
    }

    #[tokio::test]
    async fn empty_day_yields_empty_times() {
        let mut relay = MockRelay::new();
        relay.expect_send().times(1).returning(|endpoint, request| {
            assert_eq!(endpoint, "/availability/times");
            assert_eq!(request.param_value("date"), Some("2024-03-05"));
            Ok(json!([]))
        });

        let (status, body) = call(
            app(configured(), relay),
            get("/booking/availability/times?date=2024-03-05"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"times": []}));
    }

    #[tokio::test]
    async fn malformed_date_is_rejected() {
        let (status, body) = call(
            app(configured(), untouched_relay()),
            get("/booking/availability/times?date=2024-3-5"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Date must be YYYY-MM-DD format");
    }

    #[tokio::test]
    async fn undecodable_query_gets_json_error_body() {
        for uri in [
            "/booking/availability/dates?month=2024-03&month=2024-04",
            "/booking/availability/times?date=2024-03-05&date=2024-03-06",
        ] {
            let response = app(configured(), untouched_relay())
                .oneshot(get(uri))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(
                response.headers()["content-type"],
                "application/json",
                "{}",
                uri
            );
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let body: Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(body["error"], "Invalid request");
            assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
        }
    }

    #[tokio::test]
    async fn formatted_phone_is_rejected_before_booking() {
        let (status, body) = call(
            app(configured(), untouched_relay()),
            post_json("/booking/appointments", booking_body("555-1234")),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"error": "Invalid booking request", "message": "Phone must be at least 10 digits"})
        );
    }

    #[tokio::test]
    async fn unparseable_booking_body_is_rejected() {
        let request = Request::builder()
            .method("POST")
            .uri("/booking/appointments")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = call(app(configured(), untouched_relay()), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid booking request");
    }

    #[tokio::test]
    async fn booking_coerces_ids_and_returns_201() {
        let mut relay = MockRelay::new();
        relay.expect_send().times(1).returning(|endpoint, request| {
            assert_eq!(endpoint, "/appointments");
            assert_eq!(request.method, RelayMethod::Post);
            let body = request.body.unwrap();
            assert_eq!(body["appointmentTypeID"], json!(777));
            assert_eq!(body["calendarID"], json!(888));
            assert_eq!(body["firstName"], "Ada");
            assert!(body.get("notes").is_none());
            Ok(json!({
                "id": 5551,
                "datetime": "2024-03-05T09:00:00-0600",
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": "ada@example.com",
                "phone": "5551234567",
                "timezone": "America/Chicago",
                "type": "Design Consultation"
            }))
        });

        let (status, body) = call(
            app(configured(), relay),
            post_json("/booking/appointments", booking_body("5551234567")),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["appointmentId"], 5551);
        assert_eq!(body["email"], "ada@example.com");
        assert_eq!(
            body["message"],
            "Your appointment has been scheduled successfully. A confirmation email will be sent to you shortly."
        );
    }

    #[tokio::test]
    async fn taken_slot_maps_to_422() {
        let mut relay = MockRelay::new();
        relay
            .expect_send()
            .times(1)
            .returning(|_, _| Err(api_error(422, "The time slot is not available")));

        let (status, body) = call(
            app(configured(), relay),
            post_json("/booking/appointments", booking_body("5551234567")),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body,
            json!({"error": "Time slot unavailable", "message": "The time slot is not available"})
        );
    }

    #[tokio::test]
    async fn provider_auth_failure_maps_to_401() {
        let mut relay = MockRelay::new();
        relay
            .expect_send()
            .times(1)
            .returning(|_, _| Err(api_error(401, "Unauthorized")));

        let (status, body) = call(
            app(configured(), relay),
            get("/booking/availability/dates?month=2024-03"),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body,
            json!({"error": "Authentication failed", "message": "Unable to authenticate with Acuity API"})
        );
    }

    #[tokio::test]
    async fn transport_failure_maps_to_500_with_flat_message() {
        let mut relay = MockRelay::new();
        relay.expect_send().times(1).returning(|_, _| {
            Err(RelayError::Transport {
                message: "Failed to connect to Acuity Scheduling API: timed out".into(),
            })
        });

        let (status, body) = call(
            app(configured(), relay),
            get("/booking/availability/times?date=2024-03-05"),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to fetch available times");
        assert_eq!(
            body["message"],
            "Failed to connect to Acuity Scheduling API: timed out"
        );
    }

    #[tokio::test]
    async fn appointment_type_is_selected_from_provider_list() {
        let mut relay = MockRelay::new();
        relay.expect_send().times(1).returning(|endpoint, _| {
            assert_eq!(endpoint, "/appointment-types");
            Ok(json!([
                {"id": 1, "name": "Intro", "duration": 15, "price": "0.00"},
                {"id": 777, "name": "Design Consultation", "duration": 60, "price": "150.00",
                 "description": "Kick-off", "color": "#fff"}
            ]))
        });

        let (status, body) = call(
            app(configured(), relay),
            get("/booking/appointment-type-details"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"id": 777, "name": "Design Consultation", "duration": 60,
                   "price": "150.00", "description": "Kick-off"})
        );
    }

    #[tokio::test]
    async fn unknown_appointment_type_is_404() {
        let mut relay = MockRelay::new();
        relay
            .expect_send()
            .times(1)
            .returning(|_, _| Ok(json!([{"id": 1, "name": "Intro", "duration": 15}])));

        let (status, body) = call(
            app(configured(), relay),
            get("/booking/appointment-type-details"),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({"error": "Appointment type not found", "message": "Appointment type 777 not found in Acuity"})
        );
    }

    #[tokio::test]
    async fn non_numeric_configured_type_is_404() {
        let mut config = configured();
        config.acuity.appointment_type_id = Some("consult".into());
        let mut relay = MockRelay::new();
        relay.expect_send().times(1).returning(|_, _| {
            Ok(json!([{"id": 777, "name": "Design Consultation", "duration": 60}]))
        });

        let (status, body) = call(
            app(config, relay),
            get("/booking/appointment-type-details"),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Appointment type consult not found in Acuity");
    }

    #[tokio::test]
    async fn unconfigured_appointment_type_is_500() {
        let mut config = configured();
        config.acuity.appointment_type_id = Some("  ".into());

        let (status, body) = call(
            app(config, untouched_relay()),
            get("/booking/appointment-type-details"),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Appointment type not configured");
    }

    #[tokio::test]
    async fn non_numeric_appointment_id_is_400() {
        let (status, body) = call(
            app(configured(), untouched_relay()),
            get("/booking/appointments/12ab"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"error": "Invalid request", "message": "Appointment ID must be a number"})
        );
    }

    #[tokio::test]
    async fn long_appointment_id_is_forwarded_as_given() {
        let mut relay = MockRelay::new();
        relay.expect_send().times(1).returning(|endpoint, _| {
            assert_eq!(endpoint, "/appointments/123456789012345678901234");
            Err(api_error(404, "Not Found"))
        });

        let (status, _) = call(
            app(configured(), relay),
            get("/booking/appointments/123456789012345678901234"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn missing_appointment_is_404() {
        let mut relay = MockRelay::new();
        relay.expect_send().times(1).returning(|endpoint, _| {
            assert_eq!(endpoint, "/appointments/42");
            Err(api_error(404, "Not Found"))
        });

        let (status, body) = call(app(configured(), relay), get("/booking/appointments/42")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({"error": "Appointment not found", "message": "The requested appointment could not be found"})
        );
    }

    #[tokio::test]
    async fn appointment_details_are_reshaped() {
        let mut relay = MockRelay::new();
        relay.expect_send().times(1).returning(|_, _| {
            Ok(json!({
                "id": 42,
                "datetime": "2024-03-05T09:00:00-0600",
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": "ada@example.com",
                "phone": "5551234567",
                "timezone": "America/Chicago",
                "appointmentTypeName": "Design Consultation",
                "status": "scheduled",
                "calendarID": 888
            }))
        });

        let (status, body) = call(app(configured(), relay), get("/booking/appointments/42")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 42);
        assert_eq!(body["appointmentTypeName"], "Design Consultation");
        assert_eq!(body["status"], "scheduled");
        assert!(body.get("calendarID").is_none());
    }

    #[tokio::test]
    async fn credential_probe_without_datetime_hits_me() {
        let mut relay = MockRelay::new();
        relay.expect_send().times(1).returning(|endpoint, _| {
            assert_eq!(endpoint, "/me");
            Ok(json!({"id": 1234, "email": "owner@example.com"}))
        });

        let (status, body) = call(
            app(configured(), relay),
            Request::builder()
                .method("POST")
                .uri("/booking/check-availability")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["provider"], "acuity");
        assert!(body["checkedAt"].is_string());
    }

    #[tokio::test]
    async fn slot_probe_forwards_to_check_times() {
        let mut relay = MockRelay::new();
        relay.expect_send().times(1).returning(|endpoint, request| {
            assert_eq!(endpoint, "/availability/check-times");
            let body = request.body.unwrap();
            assert_eq!(body["calendarID"], json!(888));
            Ok(json!({"datetime": "2024-03-05T09:00:00-0600", "valid": true}))
        });

        let (status, body) = call(
            app(configured(), relay),
            post_json(
                "/booking/check-availability",
                json!({"datetime": "2024-03-05T09:00:00-0600"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"ok": true, "datetime": "2024-03-05T09:00:00-0600", "valid": true})
        );
    }

    #[tokio::test]
    async fn slot_probe_validates_datetime() {
        let (status, body) = call(
            app(configured(), untouched_relay()),
            post_json("/booking/check-availability", json!({"datetime": "tomorrow"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid datetime format");
    }
}
