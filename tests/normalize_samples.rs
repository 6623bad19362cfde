//! End-to-end normalization of sample event documents.

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use winevent_normalize::core::resolve::Severity;
use winevent_normalize::{decode, normalize, DecodeError, InterpreterRegistry};

const SECURITY_4624: &str = include_str!("fixtures/security_4624.xml");
const SYSTEM_104: &str = include_str!("fixtures/system_104_userdata.xml");
const APPLICATION_1000: &str = include_str!("fixtures/application_1000_unrendered.xml");

#[test]
fn security_event_uses_rendering_and_details() {
    let entry = normalize(SECURITY_4624.as_bytes(), &InterpreterRegistry::default()).unwrap();
    assert_eq!(entry.severity, Severity::Info);
    assert_eq!(
        entry.timestamp,
        Utc.with_ymd_and_hms(2022, 9, 22, 7, 49, 32).unwrap()
            + chrono::Duration::nanoseconds(35_677_800)
    );

    let body = entry.body;
    assert_eq!(body["event_id"], json!({"qualifiers": 0, "id": 4624}));
    assert_eq!(
        body["provider"],
        json!({
            "name": "Microsoft-Windows-Security-Auditing",
            "guid": "{54849625-5478-4994-a5ba-3e3b0328c30d}",
            "event_source": ""
        })
    );
    assert_eq!(body["level"], json!("Information"));
    assert_eq!(body["task"], json!("Logon"));
    assert_eq!(body["opcode"], json!("Info"));
    assert_eq!(body["keywords"], json!(["Audit Success"]));
    assert_eq!(body["record_id"], json!(149161));
    assert_eq!(body["message"], json!("An account was successfully logged on."));
    assert_eq!(
        body["details"],
        json!({
            "Subject": {
                "Security ID": "SYSTEM",
                "Account Name": "DESKTOP-TEST$"
            },
            "Logon Information": {
                "Logon Type": "5",
                "Elevated Token": "Yes"
            }
        })
    );
    assert_eq!(body["execution"], json!({"process_id": 636, "thread_id": 7140}));
    assert_eq!(
        body["correlation"],
        json!({"activity_id": "{8cb1229f-ce57-0000-8437-b18c57ced801}"})
    );
    assert_eq!(
        body["event_data"],
        json!({
            "SubjectUserSid": "S-1-5-18",
            "SubjectUserName": "DESKTOP-TEST$",
            "LogonType": "5"
        })
    );
    // <Security /> without a UserID carries nothing.
    assert!(!body.contains_key("security"));
    assert!(!body.contains_key("user_data"));
}

#[test]
fn security_event_without_interpreters_keeps_raw_message() {
    let entry = normalize(SECURITY_4624.as_bytes(), &InterpreterRegistry::empty()).unwrap();
    let message = entry.body["message"].as_str().unwrap();
    assert!(message.starts_with("An account was successfully logged on.\r\n"));
    assert!(message.ends_with("Elevated Token:\t\tYes\r\n"));
    assert!(!entry.body.contains_key("details"));
}

#[test]
fn user_data_event_full_body() {
    let entry = normalize(SYSTEM_104.as_bytes(), &InterpreterRegistry::default()).unwrap();
    assert_eq!(entry.severity, Severity::Info);

    let expected = json!({
        "event_id": {"qualifiers": 0, "id": 104},
        "provider": {
            "name": "Microsoft-Windows-Eventlog",
            "guid": "{fc65ddd8-d6ef-4962-83d5-6e5cfe9ce148}",
            "event_source": ""
        },
        "system_time": "2024-03-01T09:15:02.6510000Z",
        "computer": "SRV01.corp.example",
        "channel": "System",
        "record_id": 2208,
        "level": "4",
        "message": "",
        "task": "104",
        "opcode": "0",
        "keywords": ["0x8000000000000000"],
        "event_data": {},
        "security": {"user_id": "S-1-5-21-3623811015-3361044348-30300820-1013"},
        "execution": {
            "process_id": 1208,
            "thread_id": 5512,
            "processor_id": 3,
            "kernel_time": 15,
            "user_time": 2
        },
        "user_data": {
            "tag": "UserData",
            "children": [{
                "tag": "LogFileCleared",
                "attributes": {
                    "xmlns": "http://manifests.microsoft.com/win/2004/08/windows/eventlog"
                },
                "children": [
                    {"tag": "SubjectUserName", "chardata": "admin"},
                    {"tag": "SubjectDomainName", "chardata": "CORP"},
                    {"tag": "Channel", "chardata": "Application"},
                    {"tag": "BackupPath"}
                ]
            }]
        }
    });
    assert_eq!(Value::Object(entry.body), expected);
}

#[test]
fn unrendered_event_falls_back_to_raw_fields() {
    let before = Utc::now();
    let entry = normalize(APPLICATION_1000.as_bytes(), &InterpreterRegistry::default()).unwrap();
    let after = Utc::now();

    assert_eq!(entry.severity, Severity::Error);
    assert!(entry.timestamp >= before && entry.timestamp <= after);

    let body = entry.body;
    assert_eq!(body["system_time"], json!("not-a-timestamp"));
    assert_eq!(body["level"], json!("2"));
    assert_eq!(body["task"], json!("100"));
    assert_eq!(body["opcode"], json!(""));
    assert_eq!(body["keywords"], json!(["0x80000000000000"]));
    assert_eq!(body["provider"]["event_source"], json!("Application Error"));
    assert_eq!(
        body["event_data"],
        json!({"AppName": "explorer2.exe", "ExceptionCode": "c0000005"})
    );
    let order: Vec<&String> = body["event_data"].as_object().unwrap().keys().collect();
    assert_eq!(order, vec!["AppName", "ExceptionCode"]);
    assert!(!body.contains_key("security"));
    assert!(!body.contains_key("execution"));
    assert!(!body.contains_key("details"));
    assert!(!body.contains_key("user_data"));
}

#[test]
fn body_key_order_is_stable() {
    let entry = normalize(SYSTEM_104.as_bytes(), &InterpreterRegistry::default()).unwrap();
    let keys: Vec<&str> = entry.body.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec![
            "event_id",
            "provider",
            "system_time",
            "computer",
            "channel",
            "record_id",
            "level",
            "message",
            "task",
            "opcode",
            "keywords",
            "event_data",
            "security",
            "execution",
            "user_data",
        ]
    );
}

#[test]
fn normalization_is_deterministic() {
    let registry = InterpreterRegistry::default();
    let a = normalize(SECURITY_4624.as_bytes(), &registry).unwrap();
    let b = normalize(SECURITY_4624.as_bytes(), &registry).unwrap();
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn concurrent_calls_share_one_registry() {
    let registry = &InterpreterRegistry::default();
    std::thread::scope(|s| {
        let handles: Vec<_> = [SECURITY_4624, SYSTEM_104, APPLICATION_1000]
            .into_iter()
            .map(|xml| s.spawn(move || normalize(xml.as_bytes(), registry).is_ok()))
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    });
}

#[test]
fn malformed_documents_fail_without_output() {
    let truncated = &SECURITY_4624.as_bytes()[..SECURITY_4624.len() / 2];
    let cases: [&[u8]; 4] = [
        truncated,
        b"<Event><System><EventID>1</EventID></System>",
        b"<Event><System></Event>",
        b"<Event attr=\"unterminated></Event>",
    ];
    for xml in cases {
        let err = decode(xml).unwrap_err();
        assert!(
            matches!(err, DecodeError::Document { .. }),
            "Expected wrapped decode error for {:?}",
            String::from_utf8_lossy(xml)
        );
    }
}

#[test]
fn empty_input_fails() {
    assert!(decode(b"").is_err());
}

#[test]
fn deeply_nested_user_data_is_kept() {
    let depth = 1_000;
    let xml = format!(
        "<Event><System><Channel>System</Channel></System><UserData>{}{}</UserData></Event>",
        "<n>".repeat(depth),
        "</n>".repeat(depth)
    );
    let entry = normalize(xml.as_bytes(), &InterpreterRegistry::default()).unwrap();

    let mut node = &entry.body["user_data"];
    let mut levels = 0;
    while let Some(child) = node.get("children").and_then(|c| c.get(0)) {
        node = child;
        levels += 1;
    }
    assert_eq!(levels, depth);
    assert_eq!(node, &json!({"tag": "n"}));
}

#[test]
fn padded_event_data_values_survive() {
    let xml = br#"<Event><EventData><Data Name="pad">  two  words  </Data></EventData></Event>"#;
    let entry = normalize(xml, &InterpreterRegistry::default()).unwrap();
    assert_eq!(entry.body["event_data"], json!({"pad": "  two  words  "}));
}
