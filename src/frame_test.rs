use super::*;

#[test]
fn request_has_no_parent_or_ceremony() {
    let frame = Frame::request("ceremony:view", Data::new());
    assert_eq!(frame.syscall, "ceremony:view");
    assert_eq!(frame.status, Status::Request);
    assert!(frame.parent_id.is_none());
    assert!(frame.ceremony_id.is_none());
    assert!(frame.ts > 0);
}

#[test]
fn done_with_keeps_ceremony_and_payload() {
    let ceremony_id = Uuid::new_v4();
    let req = Frame::request("ceremony:act", Data::new()).with_ceremony_id(ceremony_id);
    let mut data = Data::new();
    data.insert("map".into(), serde_json::json!("Ascent"));

    let done = req.done_with(data);
    assert_eq!(done.parent_id, Some(req.id));
    assert_eq!(done.ceremony_id, Some(ceremony_id));
    assert_eq!(done.syscall, "ceremony:act");
    assert_eq!(done.status, Status::Done);
    assert_eq!(done.str_field("map"), Some("Ascent"));
}

#[test]
fn prefix_and_op() {
    let frame = Frame::request("ceremony:side", Data::new());
    assert_eq!(frame.prefix(), "ceremony");
    assert_eq!(frame.op(), "side");

    let bare = Frame::request("ping", Data::new());
    assert_eq!(bare.prefix(), "ping");
    assert_eq!(bare.op(), "");
}

#[test]
fn ceremony_id_is_omitted_when_unset() {
    let json = serde_json::to_value(Frame::request("ceremony:view", Data::new())).unwrap();
    assert!(json.get("ceremony_id").is_none());
    assert_eq!(json["status"], "request");
}

#[test]
fn minimal_client_frame_parses() {
    let raw = r#"{"id":"6f1c7d3e-8b1a-4c7e-9a51-0a4b2d1f9e11","parent_id":null,"ts":1,"syscall":"ceremony:view","status":"request"}"#;
    let frame: Frame = serde_json::from_str(raw).unwrap();
    assert!(frame.data.is_empty());
    assert!(frame.from.is_none());
}

#[test]
fn error_from_carries_code() {
    #[derive(Debug, thiserror::Error)]
    #[error("ceremony not found")]
    struct Missing;

    impl ErrorCode for Missing {
        fn error_code(&self) -> &'static str {
            "E_NOT_FOUND"
        }
    }

    let req = Frame::request("ceremony:view", Data::new());
    let err = req.error_from(&Missing);
    assert_eq!(err.status, Status::Error);
    assert_eq!(err.str_field(FRAME_CODE), Some("E_NOT_FOUND"));
    assert_eq!(err.str_field(FRAME_MESSAGE), Some("ceremony not found"));
    assert_eq!(err.data.get(FRAME_RETRYABLE).and_then(serde_json::Value::as_bool), Some(false));
}
