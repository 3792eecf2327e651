//! HTTP-level tests against the full router with in-memory metadata.

mod helpers;

mod accounts_test;
mod diff_test;
mod directories_test;
mod files_test;
