use super::*;

#[test]
fn external_from_u32_ascii_hex_matches_known_vectors() {
    assert_eq!(external_from_u32_ascii_hex(1000), "31303030");
    assert_eq!(external_from_u32_ascii_hex(0), "30");
    assert_eq!(external_from_u32_ascii_hex(u32::MAX), "34323934393637323935");
}

#[test]
fn server_line_parses_ok_rejected_data_error_agree() {
    assert_eq!(
        ServerLine::parse("OK 1234deadbeef").unwrap(),
        ServerLine::Ok {
            guid: "1234deadbeef".into()
        }
    );
    assert_eq!(
        ServerLine::parse("REJECTED EXTERNAL DBUS_COOKIE_SHA1").unwrap(),
        ServerLine::Rejected {
            mechs: vec!["EXTERNAL".into(), "DBUS_COOKIE_SHA1".into()]
        }
    );
    assert_eq!(
        ServerLine::parse("DATA 6c6162656c").unwrap(),
        ServerLine::Data {
            hex: "6c6162656c".into()
        }
    );
    assert_eq!(
        ServerLine::parse("ERROR bad mechanism").unwrap(),
        ServerLine::Error {
            message: Some("bad mechanism".into())
        }
    );
    assert_eq!(ServerLine::parse("AGREE_UNIX_FD").unwrap(), ServerLine::AgreeUnixFd);
}

#[test]
fn server_line_rejects_unknown_command() {
    assert!(ServerLine::parse("WAT").is_err());
}

#[test]
fn client_line_renders_with_crlf() {
    assert_eq!(
        ClientLine::AuthExternal {
            hex: "31303030".into()
        }
        .to_line(),
        "AUTH EXTERNAL 31303030\r\n"
    );
    assert_eq!(ClientLine::Begin.to_line(), "BEGIN\r\n");
}
