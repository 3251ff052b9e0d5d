#![allow(missing_docs)]

pub(crate) mod http;
pub(crate) mod logs;

pub(crate) use http::{get_logged_test_server, get_test_server, sign_up_user};
pub(crate) use logs::LogCapture;
