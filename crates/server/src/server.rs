use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use std::sync::Arc;

use crate::{applications, notifications, programs, reports, settings, transitions};
use engine::{Engine, users};
use notifier::Notifier;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub notifier: Arc<Notifier>,
    pub db: DatabaseConnection,
}

async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // Absent or malformed header answers 401, not the extractor's 400.
    let Some(auth_header) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user: Option<users::Model> = users::Entity::find()
        .filter(users::Column::Email.eq(auth_header.username()))
        .filter(users::Column::Password.eq(auth_header.password()))
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let Some(user) = user else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route(
            "/applications",
            get(applications::list).post(applications::submit),
        )
        .route("/applications/{id}", get(applications::detail))
        .route("/programs", get(programs::list))
        .route("/programs/{title}", put(programs::put))
        .route("/applications/{id}/resubmit", post(applications::resubmit))
        .route("/staff/queue", get(applications::pending_queue))
        .route("/staff/applications/{id}/approve", post(transitions::approve))
        .route("/staff/applications/{id}/reject", post(transitions::reject))
        .route("/staff/applications/{id}/remark", post(transitions::remark))
        .route("/reports", get(reports::report))
        .route("/reports/export", get(reports::export_csv))
        .route("/reports/export-pdf", get(reports::export_pdf))
        .route("/notifications", get(notifications::list))
        .route(
            "/notifications/{id}/read",
            post(notifications::mark_read),
        )
        .route("/settings", get(settings::list))
        .route("/settings/{key}", put(settings::put))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(engine: Arc<Engine>, notifier: Arc<Notifier>, db: DatabaseConnection) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, notifier, db, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Arc<Engine>,
    notifier: Arc<Notifier>,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine,
        notifier,
        db,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Arc<Engine>,
    notifier: Arc<Notifier>,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, notifier, db, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use base64::Engine as _;
    use http_body_util::BodyExt;
    use migration::MigratorTrait;
    use sea_orm::{ActiveValue, Database};
    use tower::ServiceExt;

    use super::*;

    async fn seed_user(db: &DatabaseConnection, email: &str, role: &str) {
        users::Entity::insert(users::ActiveModel {
            email: ActiveValue::Set(email.to_string()),
            password: ActiveValue::Set("secret".to_string()),
            first_name: ActiveValue::Set("Test".to_string()),
            last_name: ActiveValue::Set(role.to_string()),
            role: ActiveValue::Set(role.to_string()),
            contact_number: ActiveValue::Set(Some("09171234567".to_string())),
            ..Default::default()
        })
        .exec(db)
        .await
        .unwrap();
    }

    async fn test_state() -> ServerState {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        seed_user(&db, "maria@example.com", "applicant").await;
        seed_user(&db, "pedro@example.com", "applicant").await;
        seed_user(&db, "jun@example.com", "staff").await;
        seed_user(&db, "ana@example.com", "admin").await;

        let engine = Arc::new(
            Engine::builder()
                .database(db.clone())
                .build()
                .await
                .unwrap(),
        );
        let notifier = Arc::new(Notifier::builder(engine.clone(), "https://assista.test").build());
        ServerState {
            engine,
            notifier,
            db,
        }
    }

    fn basic(email: &str) -> String {
        let encoded =
            base64::engine::general_purpose::STANDARD.encode(format!("{email}:secret"));
        format!("Basic {encoded}")
    }

    fn request(method: &str, uri: &str, email: &str, body: Option<serde_json::Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, basic(email));
        match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(state: &ServerState, req: Request<Body>) -> axum::response::Response {
        router(state.clone()).oneshot(req).await.unwrap()
    }

    async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
        response
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    fn submission(program: &str) -> serde_json::Value {
        serde_json::json!({
            "first_name": "Maria",
            "last_name": "Santos",
            "contact_number": "09171234567",
            "email": "maria@example.com",
            "house_no": "12",
            "barangay": "Poblacion",
            "city": "San Pablo",
            "birth_date": "1990-05-01",
            "sex": "F",
            "civil_status": "Single",
            "program": program,
            "assistance_type": "Financial",
            "date_of_incident": "2026-01-10",
            "attachments": [
                { "slot": "valid_id", "path": "uploads/id.png" }
            ]
        })
    }

    async fn submit_as(state: &ServerState, email: &str, program: &str) -> i64 {
        let res = send(
            state,
            request("POST", "/applications", email, Some(submission(program))),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        body_json(res).await["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn missing_credentials_is_unauthorized() {
        let state = test_state().await;
        let res = send(
            &state,
            Request::builder()
                .uri("/applications")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        // A non-Basic scheme is treated the same as no credentials.
        let res = send(
            &state,
            Request::builder()
                .uri("/applications")
                .header(header::AUTHORIZATION, "Bearer not-a-basic-header")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let state = test_state().await;
        let encoded = base64::engine::general_purpose::STANDARD.encode("maria@example.com:wrong");
        let res = send(
            &state,
            Request::builder()
                .uri("/applications")
                .header(header::AUTHORIZATION, format!("Basic {encoded}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn applicants_never_see_each_others_records() {
        let state = test_state().await;
        submit_as(&state, "maria@example.com", "Chemotherapy").await;

        let mine = body_json(
            send(
                &state,
                request("GET", "/applications", "maria@example.com", None),
            )
            .await,
        )
        .await;
        assert_eq!(mine["applications"].as_array().unwrap().len(), 1);

        let theirs = body_json(
            send(
                &state,
                request("GET", "/applications", "pedro@example.com", None),
            )
            .await,
        )
        .await;
        assert!(theirs["applications"].as_array().unwrap().is_empty());

        // Staff see the whole set.
        let staff = body_json(
            send(
                &state,
                request("GET", "/applications", "jun@example.com", None),
            )
            .await,
        )
        .await;
        assert_eq!(staff["applications"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn approve_notifies_and_conflicts_on_second_review() {
        let state = test_state().await;
        let id = submit_as(&state, "maria@example.com", "Chemotherapy").await;

        let res = send(
            &state,
            request(
                "POST",
                &format!("/staff/applications/{id}/approve"),
                "jun@example.com",
                Some(serde_json::json!({ "amount_minor": 500_000 })),
            ),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await["status"], "approved");

        // Settled records refuse a second review.
        let res = send(
            &state,
            request(
                "POST",
                &format!("/staff/applications/{id}/reject"),
                "jun@example.com",
                Some(serde_json::json!({ "remarks": "too late" })),
            ),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CONFLICT);

        // The applicant got exactly one in-app notification.
        let inbox = body_json(
            send(
                &state,
                request("GET", "/notifications", "maria@example.com", None),
            )
            .await,
        )
        .await;
        let notifications = inbox["notifications"].as_array().unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0]["title"], "Application Approved");
        assert_eq!(
            notifications[0]["link"],
            format!("https://assista.test/applications/{id}")
        );
    }

    #[tokio::test]
    async fn applicants_cannot_review() {
        let state = test_state().await;
        let id = submit_as(&state, "maria@example.com", "Chemotherapy").await;

        let res = send(
            &state,
            request(
                "POST",
                &format!("/staff/applications/{id}/approve"),
                "maria@example.com",
                Some(serde_json::json!({ "amount_minor": 100 })),
            ),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn reject_requires_remarks() {
        let state = test_state().await;
        let id = submit_as(&state, "maria@example.com", "Chemotherapy").await;

        let res = send(
            &state,
            request(
                "POST",
                &format!("/staff/applications/{id}/reject"),
                "jun@example.com",
                Some(serde_json::json!({ "remarks": "   " })),
            ),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn csv_export_is_bom_prefixed_and_filter_pure() {
        let state = test_state().await;
        let chemo = submit_as(&state, "maria@example.com", "Chemotherapy").await;
        submit_as(&state, "maria@example.com", "Burial Assistance").await;

        let res = send(
            &state,
            request(
                "POST",
                &format!("/staff/applications/{chemo}/approve"),
                "jun@example.com",
                Some(serde_json::json!({ "amount_minor": 500_000 })),
            ),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);

        let res = send(
            &state,
            request(
                "GET",
                "/reports/export?status=approved&program=Chemotherapy",
                "jun@example.com",
                None,
            ),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let disposition = res
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains("Staff_Report_"));

        let body = body_bytes(res).await;
        assert_eq!(&body[..3], [0xEF, 0xBB, 0xBF]);

        let mut reader = csv::Reader::from_reader(&body[3..]);
        let headers = reader.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec![
                "Application ID",
                "Applicant Name",
                "Program Type",
                "Status",
                "Amount Released",
                "Date Submitted",
                "Date Approved",
                "Contact Number",
                "Barangay",
            ]
        );

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], chemo.to_string());
        assert_eq!(&rows[0][2], "Chemotherapy");
        assert_eq!(&rows[0][3], "Approved");
        assert_eq!(&rows[0][4], "5000.00");
        assert_eq!(&rows[0][7], "'09171234567");
    }

    #[tokio::test]
    async fn pdf_export_answers_with_a_pdf_document() {
        let state = test_state().await;
        submit_as(&state, "maria@example.com", "Chemotherapy").await;

        let res = send(
            &state,
            request("GET", "/reports/export-pdf", "ana@example.com", None),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/pdf"
        );
        let body = body_bytes(res).await;
        assert_eq!(&body[..5], b"%PDF-");
    }

    #[tokio::test]
    async fn programs_catalogue_is_listed_and_admin_managed() {
        let state = test_state().await;

        let res = send(
            &state,
            request("GET", "/programs", "maria@example.com", None),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let listing = body_json(res).await;
        assert!(
            listing["programs"]
                .as_array()
                .unwrap()
                .iter()
                .any(|p| p["title"] == "Chemotherapy")
        );

        // Titles outside the catalogue are refused at intake.
        let res = send(
            &state,
            request(
                "POST",
                "/applications",
                "maria@example.com",
                Some(submission("Karaoke Rental")),
            ),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let payload = serde_json::json!({
            "description": "School fees and supplies.",
            "requirements": ["Certificate of enrollment"],
            "default_amount_minor": 200_000,
            "is_active": true
        });
        let res = send(
            &state,
            request(
                "PUT",
                "/programs/Educational%20Assistance",
                "jun@example.com",
                Some(payload.clone()),
            ),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let res = send(
            &state,
            request(
                "PUT",
                "/programs/Educational%20Assistance",
                "ana@example.com",
                Some(payload),
            ),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await["title"], "Educational Assistance");
        submit_as(&state, "maria@example.com", "Educational Assistance").await;
    }

    #[tokio::test]
    async fn settings_are_admin_gated() {
        let state = test_state().await;

        let res = send(
            &state,
            request("GET", "/settings", "jun@example.com", None),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let res = send(
            &state,
            request(
                "PUT",
                "/settings/signatory_mayor",
                "ana@example.com",
                Some(serde_json::json!({ "value": "Hon. Vilma Fuentes" })),
            ),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        let settings = body_json(
            send(&state, request("GET", "/settings", "ana@example.com", None)).await,
        )
        .await;
        let updated = settings["settings"]
            .as_array()
            .unwrap()
            .iter()
            .find(|s| s["key"] == "signatory_mayor")
            .unwrap();
        assert_eq!(updated["value"], "Hon. Vilma Fuentes");
    }
}
