//! Integration tests for driveup-drive
//!
//! Uses wiremock to simulate the Google Drive v3 API and verifies
//! end-to-end behavior of folder listing and resumable uploads.

mod common;

mod test_list_children;
mod test_refresh;
mod test_upload;
