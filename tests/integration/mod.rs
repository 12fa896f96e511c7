//! Integration Tests
//!
//! End-to-end coverage of the analysis pipeline against a stub engine
//! script, plus the history lifecycle and report synthesis on real
//! directories.

mod support;

mod history_test;
mod pipeline_test;
mod report_test;
