//! Fuzz target: `Notification::from_str`
//!
//! Drives arbitrary UTF-8 text into the `title:body` parser and asserts
//! that it never panics, succeeds exactly when a ':' is present, never
//! leaves a ':' in the title, and returns trimmed halves.
//!
//! cargo fuzz run fuzz_notification_parse

#![no_main]

use izconnect::notify::Notification;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    match text.parse::<Notification>() {
        Ok(n) => {
            assert!(text.contains(':'));
            assert!(!n.title.contains(':'), "title must stop at the first ':'");
            assert_eq!(n.title, n.title.trim());
            assert_eq!(n.body, n.body.trim());
        }
        Err(_) => assert!(!text.contains(':')),
    }
});
