use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use smart_form_tester::common::{FixedClock, FixedScore};
use smart_form_tester::server::{self, config::UploadConfig, AppState};

const BOUNDARY: &str = "----smartformboundary";

/// 1x1 PNG.
const PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00, 0x00, 0x90,
    0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, 0x08, 0x99, 0x63, 0xF8,
    0x0F, 0x00, 0x00, 0x01, 0x01, 0x00, 0x00, 0x18, 0xDD, 0x8D, 0xB4,
];

struct FilePart<'a> {
    field: &'a str,
    file_name: &'a str,
    content_type: &'a str,
    bytes: &'a [u8],
}

fn multipart_body(fields: &[(&str, &str)], files: &[FilePart<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for file in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                file.field, file.file_name, file.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(file.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn submit_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/submit-form")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn app(dir: &TempDir, score: f64) -> Router {
    let upload = UploadConfig {
        dir: dir.path().to_path_buf(),
        ..UploadConfig::default()
    };
    let clock = FixedClock(Utc.with_ymd_and_hms(2024, 3, 4, 5, 6, 7).unwrap());
    server::router(AppState::new(
        upload,
        Arc::new(FixedScore(score)),
        Arc::new(clock),
    ))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn valid_fields<'a>() -> Vec<(&'a str, &'a str)> {
    vec![
        ("name", "John Doe"),
        ("email", "john@example.com"),
        ("password", "Strong@123"),
        ("category", "developer"),
        ("preferences", r#"["Newsletter"]"#),
    ]
}

#[tokio::test]
async fn test_health_check() {
    let dir = TempDir::new().unwrap();
    let request = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app(&dir, 0.5), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert_eq!(body["timestamp"], "2024-03-04T05:06:07.000Z");
}

#[tokio::test]
async fn test_submit_without_image() {
    let dir = TempDir::new().unwrap();
    let fields = vec![
        ("name", "Jane Smith"),
        ("email", "jane@example.com"),
        ("password", "Strong@456"),
        ("category", "designer"),
        ("preferences", r#"["Product Updates"]"#),
    ];

    let (status, body) = send(app(&dir, 0.5), submit_request(multipart_body(&fields, &[]))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Form submitted successfully");
    assert_eq!(body["data"]["name"], "Jane Smith");
    assert_eq!(body["data"]["category"], "designer");
    assert_eq!(body["data"]["preferences"][0], "Product Updates");
    assert_eq!(body["data"]["imageValidation"], Value::Null);
    assert_eq!(body["data"]["timestamp"], "2024-03-04T05:06:07.000Z");
}

#[tokio::test]
async fn test_submit_with_image_stores_file() {
    let dir = TempDir::new().unwrap();
    let file = FilePart {
        field: "image",
        file_name: "test.png",
        content_type: "image/png",
        bytes: PNG,
    };

    let (status, body) = send(
        app(&dir, 0.75),
        submit_request(multipart_body(&valid_fields(), &[file])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let image = &body["data"]["imageValidation"];
    let expected_name = format!(
        "{}-test.png",
        Utc.with_ymd_and_hms(2024, 3, 4, 5, 6, 7)
            .unwrap()
            .timestamp_millis()
    );
    assert_eq!(image["filename"], expected_name.as_str());
    assert_eq!(image["size"], PNG.len() as u64);
    assert_eq!(image["mimetype"], "image/png");
    assert_eq!(image["aiValidation"]["format"], "valid");
    assert_eq!(image["aiValidation"]["quality"], "high");
    assert_eq!(image["aiValidation"]["containsFace"], true);

    let stored = std::fs::read(dir.path().join(&expected_name)).unwrap();
    assert_eq!(stored, PNG);
}

#[tokio::test]
async fn test_contains_face_follows_score() {
    let dir = TempDir::new().unwrap();
    let file = FilePart {
        field: "image",
        file_name: "test.png",
        content_type: "image/png",
        bytes: PNG,
    };

    let (_, body) = send(
        app(&dir, 0.25),
        submit_request(multipart_body(&valid_fields(), &[file])),
    )
    .await;
    assert_eq!(body["data"]["imageValidation"]["aiValidation"]["containsFace"], false);
}

#[tokio::test]
async fn test_missing_required_fields() {
    let dir = TempDir::new().unwrap();
    let fields = vec![
        ("name", "John Doe"),
        ("password", "Strong@123"),
        ("category", "developer"),
    ];

    let (status, body) = send(app(&dir, 0.5), submit_request(multipart_body(&fields, &[]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("Missing required fields"));
}

#[tokio::test]
async fn test_empty_field_counts_as_missing() {
    let dir = TempDir::new().unwrap();
    let mut fields = valid_fields();
    fields[3] = ("category", "");

    let (status, body) = send(app(&dir, 0.5), submit_request(multipart_body(&fields, &[]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing required fields");
}

#[tokio::test]
async fn test_invalid_email() {
    let dir = TempDir::new().unwrap();
    let mut fields = valid_fields();
    fields[1] = ("email", "invalid-email");

    let (status, body) = send(app(&dir, 0.5), submit_request(multipart_body(&fields, &[]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid email format");
}

#[tokio::test]
async fn test_weak_password() {
    let dir = TempDir::new().unwrap();
    let mut fields = valid_fields();
    fields[2] = ("password", "weak");

    let (status, body) = send(app(&dir, 0.5), submit_request(multipart_body(&fields, &[]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Password does not meet requirements");
}

#[tokio::test]
async fn test_malformed_preferences_is_server_error() {
    let dir = TempDir::new().unwrap();
    let mut fields = valid_fields();
    fields[4] = ("preferences", "not json");

    let (status, body) = send(app(&dir, 0.5), submit_request(multipart_body(&fields, &[]))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Server error");
    assert!(body["error"].as_str().unwrap().contains("not json"));
}

#[tokio::test]
async fn test_rejects_disallowed_image_type() {
    let dir = TempDir::new().unwrap();
    let file = FilePart {
        field: "image",
        file_name: "anim.gif",
        content_type: "image/gif",
        bytes: b"GIF89a",
    };

    let (status, body) = send(
        app(&dir, 0.5),
        submit_request(multipart_body(&valid_fields(), &[file])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Only image files are allowed!");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_rejects_oversized_image() {
    let dir = TempDir::new().unwrap();
    let big = vec![0u8; 5 * 1024 * 1024 + 1];
    let file = FilePart {
        field: "image",
        file_name: "big.png",
        content_type: "image/png",
        bytes: &big,
    };

    let (status, body) = send(
        app(&dir, 0.5),
        submit_request(multipart_body(&valid_fields(), &[file])),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["message"], "File too large");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_rejects_unexpected_file_field() {
    let dir = TempDir::new().unwrap();
    let file = FilePart {
        field: "avatar",
        file_name: "me.png",
        content_type: "image/png",
        bytes: PNG,
    };

    let (status, body) = send(
        app(&dir, 0.5),
        submit_request(multipart_body(&valid_fields(), &[file])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Unexpected field");
}

#[tokio::test]
async fn test_empty_file_input_is_skipped() {
    let dir = TempDir::new().unwrap();
    let file = FilePart {
        field: "image",
        file_name: "",
        content_type: "application/octet-stream",
        bytes: b"",
    };

    let (status, body) = send(
        app(&dir, 0.5),
        submit_request(multipart_body(&valid_fields(), &[file])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["imageValidation"], Value::Null);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_rejects_second_image_part() {
    let dir = TempDir::new().unwrap();
    let first = FilePart {
        field: "image",
        file_name: "one.png",
        content_type: "image/png",
        bytes: PNG,
    };
    let second = FilePart {
        field: "image",
        file_name: "two.png",
        content_type: "image/png",
        bytes: PNG,
    };

    let (status, body) = send(
        app(&dir, 0.5),
        submit_request(multipart_body(&valid_fields(), &[first, second])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Unexpected field");
}

#[tokio::test]
async fn test_rejects_non_multipart_body() {
    let dir = TempDir::new().unwrap();
    let request = Request::builder()
        .method("POST")
        .uri("/api/submit-form")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"name":"John Doe"}"#))
        .unwrap();

    let (status, body) = send(app(&dir, 0.5), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Malformed multipart body"));
}

#[tokio::test]
async fn test_rejects_truncated_multipart_body() {
    let dir = TempDir::new().unwrap();
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\nJohn"
    );

    let (status, body) = send(app(&dir, 0.5), submit_request(body.into_bytes())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Malformed multipart body"));
}

#[tokio::test]
async fn test_preferences_echo_any_json_value() {
    let dir = TempDir::new().unwrap();
    let mut fields = valid_fields();
    fields[4] = ("preferences", "[1,2]");

    let (status, body) = send(app(&dir, 0.5), submit_request(multipart_body(&fields, &[]))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["preferences"], serde_json::json!([1, 2]));
}
