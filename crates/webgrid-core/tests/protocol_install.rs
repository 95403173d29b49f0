//! Process-wide protocol installation.
//!
//! Kept in its own test binary: installation must happen before anything
//! reads the table.

use webgrid_core::protocol::{self, Protocol};
use webgrid_core::ProtocolError;

#[test]
fn test_install_once_then_read() {
    let custom = Protocol::from_toml("[fields]\nrow = \"r\"\ncol = \"c\"\n").unwrap();
    protocol::install(custom.clone()).unwrap();

    assert_eq!(protocol::protocol(), &custom);
    assert_eq!(protocol::protocol().fields.row, "r");
    assert!(matches!(
        protocol::install(Protocol::default()),
        Err(ProtocolError::AlreadyInstalled)
    ));
    assert_eq!(protocol::protocol().fields.col, "c");
}

#[test]
fn test_invalid_table_is_not_installed() {
    let mut bad = Protocol::default();
    bad.fields.val = bad.fields.cnt.clone();
    assert!(matches!(protocol::install(bad), Err(ProtocolError::Invalid(_))));
}
